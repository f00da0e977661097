//! Wallet provider access

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{IntegrationError, IntegrationResult};

/// Result of a successful wallet connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnection {
    /// Public key / address reported by the wallet
    pub address: String,
    /// Human-readable wallet name, if the provider reports one
    pub wallet_name: Option<String>,
}

/// Wallet address formats the client accepts from a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFormat {
    /// Any address without whitespace
    #[default]
    Any,
    /// Base58-encoded 32-byte Solana/SVM public key
    Solana,
}

impl AddressFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Solana => "solana",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Some(Self::Any),
            "solana" | "svm" => Some(Self::Solana),
            _ => None,
        }
    }

    /// Checks that `address` is acceptable in this format
    pub fn validate(&self, address: &str) -> IntegrationResult<()> {
        let valid = match self {
            Self::Any => !address.is_empty() && !address.chars().any(char::is_whitespace),
            Self::Solana => is_valid_solana_address(address),
        };

        if valid {
            Ok(())
        } else {
            Err(IntegrationError::InvalidAddress(address.to_string()))
        }
    }
}

impl std::fmt::Display for AddressFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `address` is a base58 string decoding to a 32-byte public key
pub fn is_valid_solana_address(address: &str) -> bool {
    (32..=44).contains(&address.len())
        && bs58::decode(address)
            .into_vec()
            .map(|bytes| bytes.len() == 32)
            .unwrap_or(false)
}

/// Trait for browser-extension style wallet providers
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Provider name (e.g. "BackPack")
    fn name(&self) -> &str;

    /// Whether the provider is installed
    fn is_available(&self) -> bool;

    /// Asks the user to connect and returns the wallet address
    async fn connect(&self) -> IntegrationResult<WalletConnection>;

    /// Drops the connection
    async fn disconnect(&self) -> IntegrationResult<()>;

    /// Address of the connected wallet
    fn public_key(&self) -> Option<String>;

    /// Whether a wallet is connected
    fn is_connected(&self) -> bool {
        self.public_key().is_some()
    }
}

/// How [`MockWalletProvider`] answers a connect request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Approve and return the configured address
    Approve,
    /// User closes the prompt
    Reject,
    /// Extension missing
    NotInstalled,
    /// Provider throws with the given message
    Fail(String),
}

/// Simulated wallet provider for testing and offline use
#[derive(Debug)]
pub struct MockWalletProvider {
    name: String,
    address: RwLock<String>,
    behavior: RwLock<MockBehavior>,
    connected: RwLock<Option<String>>,
    connect_calls: AtomicUsize,
}

impl MockWalletProvider {
    /// Creates a provider that approves connections for `address`
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: RwLock::new(address.into()),
            behavior: RwLock::new(MockBehavior::Approve),
            connected: RwLock::new(None),
            connect_calls: AtomicUsize::new(0),
        }
    }

    /// Creates a provider that is already connected, as after a page reload
    pub fn connected(name: impl Into<String>, address: impl Into<String>) -> Self {
        let provider = Self::new(name, address);
        let address = provider.current_address();
        if let Ok(mut connected) = provider.connected.write() {
            *connected = Some(address);
        }
        provider
    }

    /// Sets the behavior for subsequent connect calls
    pub fn with_behavior(self, behavior: MockBehavior) -> Self {
        self.set_behavior(behavior);
        self
    }

    /// Changes the behavior for subsequent connect calls
    pub fn set_behavior(&self, behavior: MockBehavior) {
        if let Ok(mut current) = self.behavior.write() {
            *current = behavior;
        }
    }

    /// Switches the account the wallet will report
    pub fn set_address(&self, address: impl Into<String>) {
        if let Ok(mut current) = self.address.write() {
            *current = address.into();
        }
    }

    /// Number of connect attempts so far
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    fn current_address(&self) -> String {
        self.address.read().map(|a| a.clone()).unwrap_or_default()
    }

    fn current_behavior(&self) -> MockBehavior {
        self.behavior
            .read()
            .map(|b| b.clone())
            .unwrap_or(MockBehavior::Approve)
    }
}

#[async_trait]
impl WalletProvider for MockWalletProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        self.current_behavior() != MockBehavior::NotInstalled
    }

    async fn connect(&self) -> IntegrationResult<WalletConnection> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        match self.current_behavior() {
            MockBehavior::Approve => {
                let address = self.current_address();
                let mut connected = self
                    .connected
                    .write()
                    .map_err(|e| IntegrationError::Provider(format!("Lock poisoned: {}", e)))?;
                *connected = Some(address.clone());
                info!(wallet = %self.name, address = %address, "Wallet connected");
                Ok(WalletConnection {
                    address,
                    wallet_name: Some(self.name.clone()),
                })
            }
            MockBehavior::Reject => Err(IntegrationError::ConnectionRejected),
            MockBehavior::NotInstalled => Err(IntegrationError::WalletNotInstalled(self.name.clone())),
            MockBehavior::Fail(message) => Err(IntegrationError::Provider(message)),
        }
    }

    async fn disconnect(&self) -> IntegrationResult<()> {
        let mut connected = self
            .connected
            .write()
            .map_err(|e| IntegrationError::Provider(format!("Lock poisoned: {}", e)))?;
        *connected = None;
        debug!(wallet = %self.name, "Wallet disconnected");
        Ok(())
    }

    fn public_key(&self) -> Option<String> {
        self.connected.read().ok().and_then(|c| c.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let provider = MockWalletProvider::new("BackPack", "0xAAA");
        assert!(!provider.is_connected());

        let connection = provider.connect().await.unwrap();
        assert_eq!(connection.address, "0xAAA");
        assert_eq!(connection.wallet_name.as_deref(), Some("BackPack"));
        assert_eq!(provider.public_key().as_deref(), Some("0xAAA"));

        provider.disconnect().await.unwrap();
        assert!(!provider.is_connected());
    }

    #[tokio::test]
    async fn test_rejection() {
        let provider =
            MockWalletProvider::new("Phantom", "0xAAA").with_behavior(MockBehavior::Reject);

        let err = provider.connect().await.unwrap_err();
        assert!(matches!(err, IntegrationError::ConnectionRejected));
        assert!(!provider.is_connected());
        assert_eq!(provider.connect_calls(), 1);
    }

    #[tokio::test]
    async fn test_not_installed() {
        let provider =
            MockWalletProvider::new("MetaMask", "0xAAA").with_behavior(MockBehavior::NotInstalled);

        assert!(!provider.is_available());
        let err = provider.connect().await.unwrap_err();
        assert_eq!(err.to_string(), "Wallet not installed: MetaMask");
    }

    #[test]
    fn test_solana_addresses() {
        assert!(is_valid_solana_address("11111111111111111111111111111111"));
        assert!(is_valid_solana_address("So11111111111111111111111111111111111111112"));

        // Hex, too short, and characters outside the base58 alphabet
        assert!(!is_valid_solana_address("0xAAA"));
        assert!(!is_valid_solana_address("1111111111"));
        assert!(!is_valid_solana_address("0OIl1111111111111111111111111111111"));
    }

    #[test]
    fn test_address_format_validation() {
        assert!(AddressFormat::Any.validate("0xAAA").is_ok());
        assert!(AddressFormat::Any.validate("").is_err());
        assert!(AddressFormat::Any.validate("0x AAA").is_err());

        let err = AddressFormat::Solana.validate("0xAAA").unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidAddress(_)));
        assert_eq!(AddressFormat::parse("SVM"), Some(AddressFormat::Solana));
        assert_eq!(AddressFormat::parse("evm"), None);
    }

    #[test]
    fn test_preconnected() {
        let provider = MockWalletProvider::connected("BackPack", "0xBBB");
        assert_eq!(provider.public_key().as_deref(), Some("0xBBB"));
    }
}
