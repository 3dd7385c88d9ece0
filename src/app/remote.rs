//! Catalogue of remote reads and the cache that serves them to the views.

use crate::{
    app::RefreshScope,
    cache::{FetchError, FetchTicket, QueryCache, QueryKey, QueryPolicy, QueryState, Resolution},
    chain::{self, RpcHealth, safe},
};
use alloy::primitives::Address;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

const SECOND: Duration = Duration::from_secs(1);
const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    ChainId,
    BlockNumber,
    RpcHealth,
    SafeOwners,
    SafeThreshold,
    SafeNonce,
    SafeDeployment,
    SafeVersion,
}

impl Resource {
    pub const SAFE: [Resource; 5] = [
        Resource::SafeOwners,
        Resource::SafeThreshold,
        Resource::SafeNonce,
        Resource::SafeDeployment,
        Resource::SafeVersion,
    ];

    pub fn policy(self) -> QueryPolicy {
        match self {
            Resource::ChainId => QueryPolicy::new(5 * MINUTE, 30 * MINUTE),
            Resource::BlockNumber => {
                QueryPolicy::new(10 * SECOND, 2 * MINUTE).refetch_every(12 * SECOND)
            }
            Resource::RpcHealth => {
                QueryPolicy::new(15 * SECOND, 5 * MINUTE).refetch_every(30 * SECOND)
            }
            Resource::SafeOwners | Resource::SafeThreshold => {
                QueryPolicy::new(MINUTE, 30 * MINUTE)
            }
            Resource::SafeNonce => QueryPolicy::new(10 * SECOND, 5 * MINUTE),
            Resource::SafeDeployment => QueryPolicy::new(5 * MINUTE, HOUR),
            Resource::SafeVersion => QueryPolicy::new(HOUR, 24 * HOUR),
        }
    }

    pub fn scope(self) -> RefreshScope {
        match self {
            Resource::ChainId | Resource::BlockNumber | Resource::RpcHealth => {
                RefreshScope::Blockchain
            }
            _ => RefreshScope::Safe,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Resource::ChainId => "chainId",
            Resource::BlockNumber => "blockNumber",
            Resource::RpcHealth => "health",
            Resource::SafeOwners => "owners",
            Resource::SafeThreshold => "threshold",
            Resource::SafeNonce => "nonce",
            Resource::SafeDeployment => "deployment",
            Resource::SafeVersion => "version",
        }
    }
}

/// One concrete read: a resource plus the parameters it is fetched with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub resource: Resource,
    pub rpc_url: String,
    pub safe: Option<Address>,
}

impl Target {
    pub fn chain(resource: Resource, rpc_url: &str) -> Self {
        Self {
            resource,
            rpc_url: rpc_url.to_string(),
            safe: None,
        }
    }

    pub fn safe(resource: Resource, safe: Address, rpc_url: &str) -> Self {
        Self {
            resource,
            rpc_url: rpc_url.to_string(),
            safe: Some(safe),
        }
    }

    pub fn key(&self) -> QueryKey {
        let mut segments = vec![
            self.resource.scope().prefix().to_string(),
            self.resource.name().to_string(),
        ];
        if let Some(safe) = self.safe {
            segments.push(format!("{safe:#x}"));
        }
        segments.push(self.rpc_url.clone());
        QueryKey::new(segments)
    }

    /// Performs the read, bounded by the RPC timeout.
    pub async fn fetch(self) -> Result<RemoteValue, FetchError> {
        let url = self.rpc_url.as_str();
        let safe_address = || {
            self.safe
                .ok_or_else(|| FetchError::InvalidInput("Safe address is not set".into()))
        };
        chain::with_timeout(async {
            Ok(match self.resource {
                Resource::ChainId => RemoteValue::ChainId(chain::fetch_chain_id(url).await?),
                Resource::BlockNumber => {
                    RemoteValue::BlockNumber(chain::fetch_block_number(url).await?)
                }
                Resource::RpcHealth => RemoteValue::Health(chain::check_rpc_health(url).await?),
                Resource::SafeOwners => {
                    RemoteValue::Owners(safe::fetch_owners(url, safe_address()?).await?)
                }
                Resource::SafeThreshold => {
                    RemoteValue::Threshold(safe::fetch_threshold(url, safe_address()?).await?)
                }
                Resource::SafeNonce => {
                    RemoteValue::Nonce(safe::fetch_nonce(url, safe_address()?).await?)
                }
                Resource::SafeDeployment => {
                    RemoteValue::Deployed(safe::is_deployed(url, safe_address()?).await?)
                }
                Resource::SafeVersion => {
                    RemoteValue::Version(safe::fetch_version(url, safe_address()?).await?)
                }
            })
        })
        .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteValue {
    ChainId(u64),
    BlockNumber(u64),
    Health(RpcHealth),
    Owners(Vec<Address>),
    Threshold(u64),
    Nonce(u64),
    Deployed(bool),
    Version(String),
}

/// A read the caller must start; its outcome goes back through
/// [`RemoteData::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub target: Target,
}

#[derive(Debug, Default)]
pub struct RemoteData {
    cache: QueryCache<RemoteValue>,
    targets: HashMap<QueryKey, Target>,
}

impl RemoteData {
    pub fn get(&mut self, target: &Target, now: Instant) -> (QueryState<RemoteValue>, Option<FetchRequest>) {
        let key = target.key();
        let lookup = self.cache.get(&key, target.resource.policy(), now);
        self.targets.entry(key).or_insert_with(|| target.clone());
        let request = lookup.fetch.map(|ticket| FetchRequest {
            ticket,
            target: target.clone(),
        });
        (lookup.state, request)
    }

    pub fn peek(&self, target: &Target, now: Instant) -> Option<QueryState<RemoteValue>> {
        self.cache.peek(&target.key(), now)
    }

    pub fn value(&self, target: &Target, now: Instant) -> Option<RemoteValue> {
        self.peek(target, now)
            .and_then(|state| state.value().cloned())
    }

    /// Stores a value pushed by a subscription.
    pub fn set(&mut self, target: &Target, value: RemoteValue, now: Instant) {
        let key = target.key();
        self.cache.set(&key, target.resource.policy(), value, now);
        self.targets.entry(key).or_insert_with(|| target.clone());
    }

    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<RemoteValue, FetchError>,
        now: Instant,
    ) -> Resolution {
        let error = result.as_ref().err().cloned();
        let resolution = self.cache.resolve(ticket, result, now);
        match (&resolution, error) {
            (Resolution::RetryScheduled { attempt, .. }, Some(error)) => {
                debug!(key = %ticket.key(), attempt, %error, "remote read failed, retrying")
            }
            (Resolution::Failed, Some(error)) => {
                warn!(key = %ticket.key(), %error, "remote read failed")
            }
            (Resolution::Discarded, _) => debug!(key = %ticket.key(), "stale completion discarded"),
            _ => {}
        }
        resolution
    }

    pub fn invalidate(&mut self, scope: RefreshScope) -> usize {
        let prefix = QueryKey::new([scope.prefix()]);
        self.targets.retain(|key, _| !key.starts_with(&prefix));
        let dropped = self.cache.invalidate(&prefix);
        debug!(scope = scope.prefix(), dropped, "cache invalidated");
        dropped
    }

    /// Due retries and background refreshes, ready to be started.
    pub fn poll(&mut self, now: Instant) -> Vec<FetchRequest> {
        let evicted = self.cache.evict_expired(now);
        if evicted > 0 {
            let cache = &self.cache;
            self.targets
                .retain(|key, _| cache.peek(key, now).is_some());
        }
        self.cache
            .poll(now)
            .into_iter()
            .filter_map(|ticket| {
                let target = self.targets.get(ticket.key())?.clone();
                Some(FetchRequest { ticket, target })
            })
            .collect()
    }

    pub fn retry_count(&self, target: &Target) -> Option<u32> {
        self.cache.retry_count(&target.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_MAX_RETRIES;

    const RPC: &str = "https://rpc.example";
    const SAFE: Address = Address::new([0xaa; 20]);

    #[test]
    fn keys_group_by_scope() {
        let owners = Target::safe(Resource::SafeOwners, SAFE, RPC).key();
        assert_eq!(
            owners.to_string(),
            format!("safe/owners/{SAFE:#x}/{RPC}")
        );
        let chain_id = Target::chain(Resource::ChainId, RPC).key();
        assert_eq!(chain_id.to_string(), format!("blockchain/chainId/{RPC}"));
    }

    #[test]
    fn policies_match_resource_volatility() {
        assert_eq!(Resource::BlockNumber.policy().refetch_interval, Some(12 * SECOND));
        assert_eq!(Resource::SafeNonce.policy().stale_after, 10 * SECOND);
        assert_eq!(Resource::SafeVersion.policy().expire_after, 24 * HOUR);
        assert!(Resource::SAFE.iter().all(|r| r.scope() == RefreshScope::Safe));
        assert_eq!(Resource::ChainId.policy().max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn safe_refresh_leaves_chain_reads_alone() {
        let now = Instant::now();
        let mut remote = RemoteData::default();
        let owners = Target::safe(Resource::SafeOwners, SAFE, RPC);
        let chain_id = Target::chain(Resource::ChainId, RPC);

        for target in [&owners, &chain_id] {
            let (_, request) = remote.get(target, now);
            let request = request.unwrap();
            let value = match target.resource {
                Resource::SafeOwners => RemoteValue::Owners(vec![SAFE]),
                _ => RemoteValue::ChainId(1),
            };
            remote.resolve(&request.ticket, Ok(value), now);
        }

        assert_eq!(remote.invalidate(RefreshScope::Safe), 1);
        assert_eq!(remote.value(&chain_id, now), Some(RemoteValue::ChainId(1)));
        let (state, request) = remote.get(&owners, now);
        assert!(state.is_pending());
        assert_eq!(request.map(|r| r.target), Some(owners));
    }

    #[test]
    fn retries_are_reissued_with_their_target() {
        let now = Instant::now();
        let mut remote = RemoteData::default();
        let nonce = Target::safe(Resource::SafeNonce, SAFE, RPC);
        let (_, request) = remote.get(&nonce, now);
        let request = request.unwrap();
        let resolution = remote.resolve(
            &request.ticket,
            Err(FetchError::Connectivity("down".into())),
            now,
        );
        let Resolution::RetryScheduled { at, .. } = resolution else {
            panic!("expected a retry");
        };
        assert!(remote.poll(now).is_empty());
        let due = remote.poll(at);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].target, nonce);
        assert_eq!(remote.retry_count(&nonce), Some(1));
    }

    #[test]
    fn pushed_block_numbers_are_served() {
        let now = Instant::now();
        let mut remote = RemoteData::default();
        let block = Target::chain(Resource::BlockNumber, RPC);
        remote.set(&block, RemoteValue::BlockNumber(42), now);
        let (state, request) = remote.get(&block, now);
        assert_eq!(state.value(), Some(&RemoteValue::BlockNumber(42)));
        assert!(request.is_none());
    }
}
