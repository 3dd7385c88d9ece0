use crate::{cache::FetchError, input::validate_rpc_url};
use alloy::{
    eips::{BlockId, BlockNumberOrTag},
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::{TransportError, http::Http},
};
use std::{
    future::Future,
    time::{Duration, Instant},
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

pub mod encoder;
pub mod safe;

/// Upper bound for any single remote read.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// How often the block watcher asks for the head block.
pub const BLOCK_POLL_INTERVAL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcHealth {
    pub healthy: bool,
    pub latency: Duration,
}

pub(crate) fn connect_provider(rpc_url: &str) -> Result<impl Provider, FetchError> {
    let url = validate_rpc_url(rpc_url).map_err(|err| FetchError::InvalidInput(err.0))?;
    let client = alloy::transports::http::reqwest::Client::builder()
        .user_agent(concat!("safe-terminal/", env!("CARGO_PKG_VERSION")))
        .timeout(RPC_TIMEOUT)
        .build()
        .map_err(|err| FetchError::Unexpected(err.to_string()))?;
    let transport = Http::with_client(client, url);
    Ok(ProviderBuilder::new().connect_client(RpcClient::new(transport, false)))
}

pub(crate) fn transport_error(context: &str, err: TransportError) -> FetchError {
    FetchError::Connectivity(format!("{context}: {err}"))
}

/// Runs `fut` under [`RPC_TIMEOUT`]; an elapsed timer becomes a retryable
/// [`FetchError::Timeout`].
pub async fn with_timeout<T, F>(fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(RPC_TIMEOUT, fut)
        .await
        .map_err(|_| FetchError::Timeout(RPC_TIMEOUT))?
}

pub async fn fetch_chain_id(rpc_url: &str) -> Result<u64, FetchError> {
    let provider = connect_provider(rpc_url)?;
    provider
        .get_chain_id()
        .await
        .map_err(|err| transport_error("failed to query chain id", err))
}

pub async fn fetch_block_number(rpc_url: &str) -> Result<u64, FetchError> {
    let provider = connect_provider(rpc_url)?;
    provider
        .get_block_number()
        .await
        .map_err(|err| transport_error("failed to query latest block number", err))
}

/// Probes the endpoint with a chain id request. An unreachable endpoint is a
/// health value, not an error; only a malformed URL fails.
pub async fn check_rpc_health(rpc_url: &str) -> Result<RpcHealth, FetchError> {
    let provider = connect_provider(rpc_url)?;
    let started = Instant::now();
    let healthy = match tokio::time::timeout(RPC_TIMEOUT, provider.get_chain_id()).await {
        Ok(Ok(_)) => true,
        Ok(Err(err)) => {
            debug!(%rpc_url, error = %err, "rpc health probe failed");
            false
        }
        Err(_) => false,
    };
    Ok(RpcHealth {
        healthy,
        latency: started.elapsed(),
    })
}

pub async fn has_code(rpc_url: &str, target: Address) -> Result<bool, FetchError> {
    let provider = connect_provider(rpc_url)?;
    let code = provider
        .get_code_at(target)
        .block_id(BlockId::Number(BlockNumberOrTag::Latest))
        .await
        .map_err(|err| transport_error("failed to query account code", err))?;
    Ok(!code.is_empty())
}

/// Push-style head block subscription. The polling task lives exactly as
/// long as this guard.
#[derive(Debug)]
pub struct BlockSubscription {
    rpc_url: String,
    task: JoinHandle<()>,
}

impl BlockSubscription {
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

impl Drop for BlockSubscription {
    fn drop(&mut self) {
        debug!(rpc_url = %self.rpc_url, "stopping block watcher");
        self.task.abort();
    }
}

/// Calls `on_block` whenever the head block number changes.
pub fn watch_block_number<F>(handle: &Handle, rpc_url: &str, on_block: F) -> BlockSubscription
where
    F: Fn(u64) + Send + 'static,
{
    let url = rpc_url.to_string();
    let task = handle.spawn(async move {
        let provider = match connect_provider(&url) {
            Ok(provider) => provider,
            Err(err) => {
                warn!(rpc_url = %url, error = %err, "block watcher not started");
                return;
            }
        };
        let mut ticker = tokio::time::interval(BLOCK_POLL_INTERVAL);
        let mut last_seen = None;
        loop {
            ticker.tick().await;
            match tokio::time::timeout(RPC_TIMEOUT, provider.get_block_number()).await {
                Ok(Ok(block)) if last_seen != Some(block) => {
                    last_seen = Some(block);
                    on_block(block);
                }
                Ok(Ok(_)) => {}
                Ok(Err(err)) => debug!(rpc_url = %url, error = %err, "block poll failed"),
                Err(_) => debug!(rpc_url = %url, "block poll timed out"),
            }
        }
    });
    BlockSubscription {
        rpc_url: rpc_url.to_string(),
        task,
    }
}
