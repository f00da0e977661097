//! End-to-end session scenarios against the file-backed store.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use carvfi_client::config::RewardsConfig;
use carvfi_client::flow::{ConnectionFlow, ConnectionState};
use chrono::{DateTime, Utc};
use entities::{ActivityType, ProfileForm};
use integrations::{CannedAssistant, MockWalletProvider, StaticBalanceOracle};
use rewards_store::{JsonFileStore, ManualClock, RewardsStore, StoreConfig, StreakPolicy};

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Opens the store fresh from disk, as a page reload would.
fn open_flow(
    path: &Path,
    clock: Arc<ManualClock>,
    wallet: Arc<MockWalletProvider>,
    policy: StreakPolicy,
) -> ConnectionFlow {
    let kv = JsonFileStore::open(path).unwrap();
    let store = RewardsStore::with_config(
        Arc::new(kv),
        clock,
        StoreConfig::new().with_streak_policy(policy),
    );
    ConnectionFlow::new(
        store,
        wallet,
        Arc::new(StaticBalanceOracle::new()),
        Arc::new(CannedAssistant::new(Duration::ZERO)),
        RewardsConfig::default(),
    )
}

#[tokio::test]
async fn test_register_then_return_over_days() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let clock = Arc::new(ManualClock::new(at("2024-03-10T09:00:00Z")));
    let wallet = Arc::new(MockWalletProvider::new("BackPack", "0xAAA"));

    // Day 1: connect and register
    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::Continuous);
    let state = flow.connect().await.unwrap();
    assert!(matches!(state, ConnectionState::ConnectedNoProfile { .. }));

    let user = flow
        .submit_profile(ProfileForm::new("alice1", "a@b.com"))
        .await
        .unwrap();
    assert_eq!(user.wallet_address, "0xaaa");
    assert_eq!(user.points, 50);
    assert_eq!(user.streak, 1);

    let log = flow.activities();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].activity_type, ActivityType::Registration);
    assert_eq!(log[0].points, 50);

    // Same day reload: nothing new
    clock.advance(chrono::Duration::hours(3));
    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::Continuous);
    flow.restore().await;
    let user = flow.state().user().unwrap();
    assert_eq!(user.points, 50);
    assert_eq!(user.streak, 1);
    assert_eq!(flow.activities().len(), 1);

    // Next day reload: daily login bonus
    clock.advance(chrono::Duration::days(1));
    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::Continuous);
    flow.restore().await;
    let user = flow.state().user().unwrap();
    assert_eq!(user.points, 60);
    assert_eq!(user.streak, 2);
    assert_eq!(user.login_count, 2);

    let log = flow.activities();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].activity_type, ActivityType::Login);
    assert_eq!(log[0].description, "Daily login - Streak: 2 days");
}

#[tokio::test]
async fn test_logout_then_reconnect_finds_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let clock = Arc::new(ManualClock::new(at("2024-03-10T09:00:00Z")));
    let wallet = Arc::new(MockWalletProvider::new("BackPack", "0xAAA"));

    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::Continuous);
    flow.connect().await.unwrap();
    flow.submit_profile(ProfileForm::new("alice1", "a@b.com"))
        .await
        .unwrap();
    flow.logout().await;

    // After logout a reload shows the connect prompt
    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::Continuous);
    assert_eq!(flow.restore().await, &ConnectionState::Disconnected);

    // Reconnecting the same wallet skips the profile form
    clock.advance(chrono::Duration::days(1));
    let state = flow.connect().await.unwrap().clone();
    let user = state.user().unwrap();
    assert_eq!(user.username.as_deref(), Some("alice1"));
    assert_eq!(user.points, 60);
    assert_eq!(flow.activities().len(), 2);
}

#[tokio::test]
async fn test_gap_resets_streak_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let clock = Arc::new(ManualClock::new(at("2024-03-10T09:00:00Z")));
    let wallet = Arc::new(MockWalletProvider::new("BackPack", "0xAAA"));

    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::ResetOnGap);
    flow.connect().await.unwrap();
    flow.submit_profile(ProfileForm::new("alice1", "a@b.com"))
        .await
        .unwrap();

    clock.advance(chrono::Duration::days(1));
    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::ResetOnGap);
    flow.restore().await;
    assert_eq!(flow.state().user().unwrap().streak, 2);

    // Skip two days
    clock.advance(chrono::Duration::days(3));
    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::ResetOnGap);
    flow.restore().await;

    let user = flow.state().user().unwrap();
    assert_eq!(user.streak, 1);
    assert_eq!(user.points, 70);
    assert_eq!(flow.activities()[0].description, "Daily login - Streak: 1 days");
}

#[tokio::test]
async fn test_second_wallet_is_separate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let clock = Arc::new(ManualClock::new(at("2024-03-10T09:00:00Z")));
    let wallet = Arc::new(MockWalletProvider::new("BackPack", "0xAAA"));

    let mut flow = open_flow(&path, clock.clone(), wallet.clone(), StreakPolicy::Continuous);
    flow.connect().await.unwrap();
    flow.submit_profile(ProfileForm::new("alice1", "a@b.com"))
        .await
        .unwrap();
    flow.logout().await;

    wallet.set_address("0xBBB");
    flow.connect().await.unwrap();
    flow.submit_profile(ProfileForm::new("bob_22", "bob@b.com"))
        .await
        .unwrap();

    let users = flow.store().list_users().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(flow.store().current().unwrap().as_deref(), Some("0xbbb"));
    assert_eq!(flow.store().get_activities("0xAAA").unwrap().len(), 1);
    assert_eq!(flow.store().get_activities("0xBBB").unwrap().len(), 1);
}
