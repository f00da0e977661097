//! Wallet connection state machine.
//!
//! The flow decides which screen the client shows:
//!
//! ```text
//! Disconnected ──connect──▶ ConnectedNoProfile ──submit_profile──▶ ConnectedWithProfile
//!      ▲                                                              │   ▲
//!      └────────────── logout / provider disconnect ◀─────────────────┘   │
//!                                                     restore / connect ──┘
//! ```
//!
//! It is re-entered on every start through [`ConnectionFlow::restore`].
//! Storage failures never abort a transition: reads fall back to "no user
//! yet" and are logged, while failed writes of user-initiated actions are
//! returned to the caller.

use std::sync::Arc;

use entities::{
    ActivityEntry, ActivityType, NewActivity, ProfileForm, Reward, UserRecord, normalize_address,
};
use integrations::{
    AddressFormat, Assistant, AssistantRequest, BalanceOracle, IntegrationError, WalletConnection,
    WalletProvider,
};
use rewards_store::{RewardsStore, StoreError};
use tracing::{debug, info, warn};

use crate::config::RewardsConfig;
use crate::error::{FlowError, FlowResult};

/// Which screen the client should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// No wallet connected: show the connect prompt.
    Disconnected,
    /// Wallet connected but unknown: show the profile form.
    ConnectedNoProfile {
        address: String,
        wallet_name: Option<String>,
    },
    /// Wallet connected and registered: show the dashboard.
    ConnectedWithProfile { user: UserRecord },
}

impl ConnectionState {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::ConnectedNoProfile { .. } => "connected without profile",
            Self::ConnectedWithProfile { .. } => "connected with profile",
        }
    }

    /// Wallet address of the connected wallet, if any.
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Disconnected => None,
            Self::ConnectedNoProfile { address, .. } => Some(address),
            Self::ConnectedWithProfile { user } => Some(&user.wallet_address),
        }
    }

    /// The registered user, if any.
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::ConnectedWithProfile { user } => Some(user),
            _ => None,
        }
    }
}

/// Drives the client between the connect prompt, the profile form and the
/// dashboard.
pub struct ConnectionFlow {
    store: RewardsStore,
    wallet: Arc<dyn WalletProvider>,
    balance_oracle: Arc<dyn BalanceOracle>,
    assistant: Arc<dyn Assistant>,
    rewards: RewardsConfig,
    address_format: AddressFormat,
    state: ConnectionState,
    last_error: Option<String>,
    balance: f64,
}

impl ConnectionFlow {
    /// Creates a flow in the `Disconnected` state.
    pub fn new(
        store: RewardsStore,
        wallet: Arc<dyn WalletProvider>,
        balance_oracle: Arc<dyn BalanceOracle>,
        assistant: Arc<dyn Assistant>,
        rewards: RewardsConfig,
    ) -> Self {
        Self {
            store,
            wallet,
            balance_oracle,
            assistant,
            rewards,
            address_format: AddressFormat::default(),
            state: ConnectionState::Disconnected,
            last_error: None,
            balance: 0.0,
        }
    }

    /// Only accept wallet addresses in `format`.
    pub fn with_address_format(mut self, format: AddressFormat) -> Self {
        self.address_format = format;
        self
    }

    /// Current state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Message of the last wallet error, for inline display.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Last fetched balance, `0` until fetched or after a failed fetch.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// The underlying store.
    pub fn store(&self) -> &RewardsStore {
        &self.store
    }

    /// Recent activity of the registered user, most recent first.
    pub fn activities(&self) -> Vec<ActivityEntry> {
        let Some(user) = self.state.user() else {
            return Vec::new();
        };
        self.store
            .get_activities(&user.wallet_address)
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read activity log");
                Vec::new()
            })
    }

    /// Reward catalog for the connected wallet, empty when disconnected.
    pub fn rewards(&self) -> Vec<Reward> {
        let Some(address) = self.state.address() else {
            return Vec::new();
        };
        self.store.get_rewards(address).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read rewards");
            Vec::new()
        })
    }

    /// Restores the previous session on start-up.
    ///
    /// A session user goes straight to the dashboard and collects the daily
    /// login bonus. A wallet the provider reports as connected wins over the
    /// session pointer when the two disagree, and is treated like a fresh
    /// connection.
    pub async fn restore(&mut self) -> &ConnectionState {
        let current = self.store.get_current_user().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read session user");
            None
        });
        let connected = self.wallet.public_key();

        match (current, connected) {
            (Some(user), Some(address)) if normalize_address(&address) != user.wallet_address => {
                info!(
                    session = %user.wallet_address,
                    wallet = %address,
                    "Provider reports a different wallet than the session"
                );
                self.restore_connection(address);
            }
            (Some(user), _) => {
                info!(wallet = %user.wallet_address, "Restoring session");
                let user = self.award_daily_login(user);
                self.state = ConnectionState::ConnectedWithProfile { user };
            }
            (None, Some(address)) => self.restore_connection(address),
            (None, None) => self.state = ConnectionState::Disconnected,
        }

        &self.state
    }

    fn restore_connection(&mut self, address: String) {
        if let Err(e) = self.address_format.validate(&address) {
            warn!(error = %e, "Ignoring connected wallet");
            self.last_error = Some(e.to_string());
            self.state = ConnectionState::Disconnected;
            return;
        }

        let connection = WalletConnection {
            address,
            wallet_name: Some(self.wallet.name().to_string()),
        };
        self.on_connected(connection);
    }

    /// Asks the wallet provider to connect.
    ///
    /// On failure the error is kept for display and the flow stays
    /// disconnected. There is no automatic retry.
    pub async fn connect(&mut self) -> FlowResult<&ConnectionState> {
        self.last_error = None;

        let result = if self.wallet.is_available() {
            self.wallet.connect().await
        } else {
            Err(IntegrationError::WalletNotInstalled(self.wallet.name().to_string()))
        };
        let result = match result {
            Ok(connection) => match self.address_format.validate(&connection.address) {
                Ok(()) => Ok(connection),
                Err(e) => {
                    if let Err(disconnect) = self.wallet.disconnect().await {
                        warn!(error = %disconnect, "Wallet disconnect failed");
                    }
                    Err(e)
                }
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(connection) => {
                self.on_connected(connection);
                Ok(&self.state)
            }
            Err(e) => {
                warn!(wallet = %self.wallet.name(), error = %e, "Wallet connection failed");
                self.last_error = Some(e.to_string());
                self.state = ConnectionState::Disconnected;
                Err(e.into())
            }
        }
    }

    fn on_connected(&mut self, connection: WalletConnection) {
        let existing = self.store.get_user(&connection.address).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to look up user; treating as new");
            None
        });

        match existing {
            Some(user) => {
                if let Err(e) = self.store.set_current(&user.wallet_address) {
                    warn!(error = %e, "Failed to store session pointer");
                }
                let user = self.award_daily_login(user);
                self.state = ConnectionState::ConnectedWithProfile { user };
            }
            None => {
                debug!(address = %connection.address, "No profile for wallet");
                if let Err(e) = self.store.clear_current() {
                    warn!(error = %e, "Failed to clear session pointer");
                }
                self.state = ConnectionState::ConnectedNoProfile {
                    address: connection.address,
                    wallet_name: connection.wallet_name,
                };
            }
        }
    }

    /// Counts today's login and awards the bonus if it is the first one.
    fn award_daily_login(&self, user: UserRecord) -> UserRecord {
        let address = user.wallet_address.clone();
        let streak = self.store.update_streak(&address).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to update streak");
            0
        });

        if streak > 0 {
            let bonus = self.rewards.daily_login_bonus;
            let activity = NewActivity::new(
                ActivityType::Login,
                format!("Daily login - Streak: {} days", streak),
                bonus,
            );
            if let Err(e) = self
                .store
                .save_activity(&address, activity)
                .and_then(|_| self.store.update_points(&address, bonus))
            {
                warn!(error = %e, "Failed to record daily login bonus");
            }
        }

        self.reload(user)
    }

    fn reload(&self, fallback: UserRecord) -> UserRecord {
        match self.store.get_user(&fallback.wallet_address) {
            Ok(Some(user)) => user,
            Ok(None) => fallback,
            Err(e) => {
                warn!(error = %e, "Failed to reload user");
                fallback
            }
        }
    }

    /// Submits the profile form.
    ///
    /// The first submission registers the wallet and awards the
    /// registration bonus. Later submissions edit the profile without a
    /// bonus. Invalid forms save nothing.
    pub async fn submit_profile(&mut self, form: ProfileForm) -> FlowResult<UserRecord> {
        let (address, wallet_name, registering) = match &self.state {
            ConnectionState::ConnectedNoProfile {
                address,
                wallet_name,
            } => (address.clone(), wallet_name.clone(), true),
            ConnectionState::ConnectedWithProfile { user } => {
                (user.wallet_address.clone(), None, false)
            }
            ConnectionState::Disconnected => {
                return Err(FlowError::InvalidState {
                    state: self.state.name(),
                    action: "submit a profile",
                });
            }
        };

        let mut profile = form.into_profile()?;
        if registering {
            profile.wallet_type = wallet_name;
        }

        let existed = self.store.get_user(&address)?.is_some();
        self.store.save_user(&address, &profile)?;

        if registering {
            if let Err(e) = self.grant_registration_bonus(&address) {
                // Undo the registration so the next attempt starts fresh
                if !existed {
                    warn!(wallet = %address, error = %e, "Registration failed; removing record");
                    if let Err(rollback) = self.store.remove_user(&address) {
                        warn!(error = %rollback, "Failed to remove partial registration");
                    }
                }
                return Err(e.into());
            }
        } else {
            self.store.save_activity(
                &address,
                NewActivity::new(ActivityType::ProfileUpdate, "Profile updated", 0),
            )?;
        }

        let user = self
            .store
            .get_user(&address)?
            .ok_or_else(|| StoreError::backend("user record missing right after save"))?;
        self.state = ConnectionState::ConnectedWithProfile { user: user.clone() };
        Ok(user)
    }

    fn grant_registration_bonus(&self, address: &str) -> Result<(), StoreError> {
        let bonus = self.rewards.registration_bonus;
        self.store.update_points(address, bonus)?;
        self.store.save_activity(
            address,
            NewActivity::new(ActivityType::Registration, "Profile created", bonus),
        )?;
        info!(wallet = %address, bonus, "Registered new user");
        Ok(())
    }

    /// Sends a message to the assistant and awards chat points.
    pub async fn chat(&mut self, request: AssistantRequest) -> FlowResult<String> {
        let address = match self.state.user() {
            Some(user) => user.wallet_address.clone(),
            None => {
                return Err(FlowError::InvalidState {
                    state: self.state.name(),
                    action: "chat",
                });
            }
        };

        let reply = self.assistant.respond(&request).await?;

        let points = self.rewards.ai_chat_points;
        let description = match &request.attachment {
            Some(_) => "Shared an attachment with the assistant".to_string(),
            None => "Chatted with the assistant".to_string(),
        };
        if let Err(e) = self
            .store
            .save_activity(&address, NewActivity::new(ActivityType::AiChat, description, points))
            .and_then(|_| self.store.update_points(&address, points))
        {
            warn!(error = %e, "Failed to record chat points");
        }

        if let ConnectionState::ConnectedWithProfile { user } = &self.state {
            let user = self.reload(user.clone());
            self.state = ConnectionState::ConnectedWithProfile { user };
        }

        Ok(reply)
    }

    /// Fetches the wallet balance. Errors are logged and shown as `0`.
    pub async fn refresh_balance(&mut self) -> f64 {
        let Some(address) = self.state.address().map(str::to_string) else {
            self.balance = 0.0;
            return self.balance;
        };

        self.balance = match self.balance_oracle.balance(&address).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(address = %address, error = %e, "Failed to fetch balance");
                0.0
            }
        };
        self.balance
    }

    /// Logs out: disconnects the wallet and clears the session pointer.
    ///
    /// The user record and history are kept.
    pub async fn logout(&mut self) {
        if let Err(e) = self.wallet.disconnect().await {
            warn!(error = %e, "Wallet disconnect failed");
        }
        self.reset();
    }

    /// Handles a disconnect reported by the wallet provider.
    pub fn handle_disconnect(&mut self) {
        info!("Wallet provider disconnected");
        self.reset();
    }

    fn reset(&mut self) {
        if let Err(e) = self.store.clear_current() {
            warn!(error = %e, "Failed to clear session pointer");
        }
        self.state = ConnectionState::Disconnected;
        self.last_error = None;
        self.balance = 0.0;
    }
}
