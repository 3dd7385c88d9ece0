use super::{
    RefreshScope,
    navigation::NavigationState,
    remote::{RemoteData, RemoteValue, Resource, Target},
};
use crate::pairing::WalletSession;
use alloy::primitives::Address;
use std::time::Instant;

/// Application state, split by domain.
#[derive(Debug, Default)]
pub struct AppState {
    pub network: NetworkState,
    pub wallet: WalletState,
    pub ui: NavigationState,
    pub safe_config: SafeConfig,
    pub remote: RemoteData,
    pub no_colors: bool,
}

#[derive(Debug, Default)]
pub struct NetworkState {
    pub rpc_url: Option<String>,
    /// Last chain id confirmed for `rpc_url`.
    pub chain_id: Option<u64>,
    /// True while a block watcher is attached to `rpc_url`.
    pub block_polling: bool,
}

#[derive(Debug, Default)]
pub struct WalletState {
    pub session: WalletSession,
    pub pairing_available: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct SafeConfig {
    pub address: Option<Address>,
}

impl AppState {
    pub fn chain_target(&self, resource: Resource) -> Option<Target> {
        self.network
            .rpc_url
            .as_deref()
            .map(|rpc_url| Target::chain(resource, rpc_url))
    }

    pub fn safe_target(&self, resource: Resource) -> Option<Target> {
        let rpc_url = self.network.rpc_url.as_deref()?;
        let safe = self.safe_config.address?;
        Some(Target::safe(resource, safe, rpc_url))
    }

    /// Cached value for `resource` without starting a read.
    pub fn cached(&self, resource: Resource, now: Instant) -> Option<RemoteValue> {
        let target = match resource.scope() {
            RefreshScope::Blockchain => self.chain_target(resource),
            RefreshScope::Safe => self.safe_target(resource),
        }?;
        self.remote.value(&target, now)
    }

    pub fn chain_id(&self, now: Instant) -> Option<u64> {
        match self.cached(Resource::ChainId, now) {
            Some(RemoteValue::ChainId(id)) => Some(id),
            _ => self.network.chain_id,
        }
    }

    /// Switches to another Safe. Reads keyed by the previous address are
    /// dropped. Returns true when the address changed.
    pub fn set_safe_address(&mut self, address: Address) -> bool {
        if self.safe_config.address == Some(address) {
            return false;
        }
        self.remote.invalidate(RefreshScope::Safe);
        self.safe_config.address = Some(address);
        true
    }

    /// Switches to a verified endpoint and seeds its chain id. Every read
    /// keyed by the previous endpoint is dropped. Returns true when the URL
    /// changed.
    pub fn set_rpc_url(&mut self, url: &str, chain_id: u64, now: Instant) -> bool {
        let changed = self.network.rpc_url.as_deref() != Some(url);
        if changed {
            self.remote.invalidate(RefreshScope::Blockchain);
            self.remote.invalidate(RefreshScope::Safe);
            self.network.rpc_url = Some(url.to_string());
        }
        self.network.chain_id = Some(chain_id);
        let target = Target::chain(Resource::ChainId, url);
        self.remote.set(&target, RemoteValue::ChainId(chain_id), now);
        changed
    }

    pub fn block_number(&self, now: Instant) -> Option<u64> {
        match self.cached(Resource::BlockNumber, now) {
            Some(RemoteValue::BlockNumber(block)) => Some(block),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_require_configuration() {
        let mut state = AppState::default();
        assert!(state.chain_target(Resource::ChainId).is_none());

        state.network.rpc_url = Some("https://rpc.example".into());
        assert!(state.chain_target(Resource::ChainId).is_some());
        assert!(state.safe_target(Resource::SafeOwners).is_none());

        state.safe_config.address = Some(Address::new([0x01; 20]));
        assert!(state.safe_target(Resource::SafeOwners).is_some());
    }

    #[test]
    fn chain_id_falls_back_to_verified_value() {
        let now = Instant::now();
        let mut state = AppState::default();
        state.network.rpc_url = Some("https://rpc.example".into());
        state.network.chain_id = Some(10);
        assert_eq!(state.chain_id(now), Some(10));

        let target = state.chain_target(Resource::ChainId).unwrap();
        state.remote.set(&target, RemoteValue::ChainId(1), now);
        assert_eq!(state.chain_id(now), Some(1));
    }

    fn seeded(state: &mut AppState, now: Instant) -> (Target, Target) {
        let owners = state.safe_target(Resource::SafeOwners).unwrap();
        let block = state.chain_target(Resource::BlockNumber).unwrap();
        state
            .remote
            .set(&owners, RemoteValue::Owners(vec![Address::new([0x02; 20])]), now);
        state.remote.set(&block, RemoteValue::BlockNumber(100), now);
        (owners, block)
    }

    fn configured() -> AppState {
        let mut state = AppState::default();
        state.network.rpc_url = Some("https://old.example".into());
        state.safe_config.address = Some(Address::new([0x01; 20]));
        state
    }

    #[test]
    fn new_safe_address_drops_reads_for_the_old_one() {
        let now = Instant::now();
        let mut state = configured();
        let (old_owners, block) = seeded(&mut state, now);

        assert!(!state.set_safe_address(Address::new([0x01; 20])));
        assert!(state.remote.value(&old_owners, now).is_some());

        assert!(state.set_safe_address(Address::new([0x03; 20])));
        assert_eq!(state.remote.value(&old_owners, now), None);
        let new_owners = state.safe_target(Resource::SafeOwners).unwrap();
        assert_ne!(new_owners, old_owners);
        assert_eq!(state.remote.value(&new_owners, now), None);
        assert_eq!(state.remote.value(&block, now), Some(RemoteValue::BlockNumber(100)));
    }

    #[test]
    fn new_rpc_url_drops_reads_and_seeds_chain_id() {
        let now = Instant::now();
        let mut state = configured();
        let (old_owners, old_block) = seeded(&mut state, now);

        assert!(state.set_rpc_url("https://new.example", 137, now));
        assert_eq!(state.remote.value(&old_owners, now), None);
        assert_eq!(state.remote.value(&old_block, now), None);
        assert_eq!(state.network.rpc_url.as_deref(), Some("https://new.example"));
        assert_eq!(state.network.chain_id, Some(137));

        let chain_id = Target::chain(Resource::ChainId, "https://new.example");
        assert_eq!(state.remote.value(&chain_id, now), Some(RemoteValue::ChainId(137)));
        assert_eq!(state.chain_id(now), Some(137));
    }

    #[test]
    fn reverifying_the_same_url_keeps_cached_reads() {
        let now = Instant::now();
        let mut state = configured();
        let (owners, block) = seeded(&mut state, now);

        assert!(!state.set_rpc_url("https://old.example", 1, now));
        assert!(state.remote.value(&owners, now).is_some());
        assert!(state.remote.value(&block, now).is_some());
        assert_eq!(state.chain_id(now), Some(1));
    }
}
