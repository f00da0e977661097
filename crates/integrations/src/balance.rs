//! On-chain balance lookups

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{IntegrationError, IntegrationResult};

/// Base units per whole token (lamports per SOL/CARV)
pub const LAMPORTS_PER_TOKEN: f64 = 1_000_000_000.0;

/// Default Carv SVM testnet RPC endpoint
pub const DEFAULT_RPC_URL: &str = "https://rpc.testnet.carv.io/rpc";

/// Trait for querying a wallet's native token balance
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// Returns the balance of `address` in whole tokens
    async fn balance(&self, address: &str) -> IntegrationResult<f64>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (&'a str,),
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<BalanceResult>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct BalanceResult {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Balance oracle speaking Solana-style JSON-RPC (`getBalance`)
pub struct RpcBalanceOracle {
    rpc_url: String,
    http_client: reqwest::Client,
    request_id: AtomicU64,
}

impl RpcBalanceOracle {
    /// Creates an oracle for the given RPC endpoint
    pub fn new(rpc_url: &str) -> Self {
        Self {
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    /// Returns the endpoint URL
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl BalanceOracle for RpcBalanceOracle {
    async fn balance(&self, address: &str) -> IntegrationResult<f64> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id(),
            method: "getBalance",
            params: (address,),
        };

        debug!(address = %address, url = %self.rpc_url, "Querying balance");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| IntegrationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IntegrationError::Network(format!(
                "RPC endpoint returned status {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| IntegrationError::Deserialization(e.to_string()))?;

        lamports_from_response(body).map(lamports_to_tokens)
    }
}

fn lamports_from_response(body: RpcResponse) -> IntegrationResult<u64> {
    match (body.result, body.error) {
        (Some(result), _) => Ok(result.value),
        (None, Some(error)) => Err(IntegrationError::Rpc {
            code: error.code,
            message: error.message,
        }),
        (None, None) => Err(IntegrationError::Deserialization(
            "Response missing both result and error".to_string(),
        )),
    }
}

/// Converts base units to whole tokens
pub fn lamports_to_tokens(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_TOKEN
}

/// Fixed balances for testing and offline use
#[derive(Debug, Default)]
pub struct StaticBalanceOracle {
    balances: HashMap<String, f64>,
}

impl StaticBalanceOracle {
    /// Creates an oracle with no known balances
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a balance for `address` (matched case-insensitively)
    pub fn with_balance(mut self, address: &str, balance: f64) -> Self {
        self.balances.insert(address.to_lowercase(), balance);
        self
    }
}

#[async_trait]
impl BalanceOracle for StaticBalanceOracle {
    async fn balance(&self, address: &str) -> IntegrationResult<f64> {
        self.balances
            .get(&address.to_lowercase())
            .copied()
            .ok_or_else(|| IntegrationError::Rpc {
                code: -32602,
                message: format!("Unknown account {}", address),
            })
    }
}
