//! CARVFi client
//!
//! Ties the local rewards store to the wallet, balance and assistant
//! integrations, and drives them through the connection flow.

pub mod config;
pub mod error;
pub mod flow;

use std::sync::Arc;
use std::time::Duration;

use integrations::{Assistant, BalanceOracle, CannedAssistant, RpcBalanceOracle, WalletProvider};
use rewards_store::{JsonFileStore, RewardsStore, StoreResult, SystemClock};

use crate::config::Config;
use crate::flow::ConnectionFlow;

/// Opens the file-backed store described by `config`.
pub fn open_store(config: &Config) -> StoreResult<RewardsStore> {
    let kv = JsonFileStore::open(config.data_file.clone())?;

    Ok(RewardsStore::with_config(
        Arc::new(kv),
        Arc::new(SystemClock),
        config.store_config(),
    ))
}

/// Creates a connection flow with the production balance oracle and
/// assistant.
pub fn create_flow(
    config: &Config,
    store: RewardsStore,
    wallet: Arc<dyn WalletProvider>,
) -> ConnectionFlow {
    let balance: Arc<dyn BalanceOracle> = Arc::new(RpcBalanceOracle::new(&config.rpc_url));
    let assistant: Arc<dyn Assistant> = Arc::new(CannedAssistant::new(Duration::from_millis(
        config.assistant_delay_ms,
    )));

    ConnectionFlow::new(store, wallet, balance, assistant, config.rewards.clone())
        .with_address_format(config.address_format)
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
