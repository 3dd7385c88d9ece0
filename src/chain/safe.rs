//! Read-only view of a Safe's on-chain configuration.

use super::{connect_provider, transport_error};
use crate::cache::FetchError;
use alloy::{
    contract,
    primitives::{Address, U256},
    sol,
};

sol! {
    #[sol(rpc)]
    interface ISafe {
        function getOwners() external view returns (address[] memory);
        function getThreshold() external view returns (uint256);
        function nonce() external view returns (uint256);
        function VERSION() external view returns (string memory);
    }
}

fn contract_error(context: &str, err: contract::Error) -> FetchError {
    match err {
        contract::Error::TransportError(inner) => transport_error(context, inner),
        other => FetchError::Contract(format!("{context}: {other}")),
    }
}

fn to_u64(context: &str, value: U256) -> Result<u64, FetchError> {
    u64::try_from(value).map_err(|_| FetchError::Contract(format!("{context}: value out of range")))
}

pub async fn fetch_owners(rpc_url: &str, safe: Address) -> Result<Vec<Address>, FetchError> {
    let provider = connect_provider(rpc_url)?;
    ISafe::new(safe, provider)
        .getOwners()
        .call()
        .await
        .map_err(|err| contract_error("failed to fetch Safe owners", err))
}

pub async fn fetch_threshold(rpc_url: &str, safe: Address) -> Result<u64, FetchError> {
    let provider = connect_provider(rpc_url)?;
    let threshold = ISafe::new(safe, provider)
        .getThreshold()
        .call()
        .await
        .map_err(|err| contract_error("failed to fetch Safe threshold", err))?;
    to_u64("Safe threshold", threshold)
}

pub async fn fetch_nonce(rpc_url: &str, safe: Address) -> Result<u64, FetchError> {
    let provider = connect_provider(rpc_url)?;
    let nonce = ISafe::new(safe, provider)
        .nonce()
        .call()
        .await
        .map_err(|err| contract_error("failed to fetch Safe nonce", err))?;
    to_u64("Safe nonce", nonce)
}

pub async fn fetch_version(rpc_url: &str, safe: Address) -> Result<String, FetchError> {
    let provider = connect_provider(rpc_url)?;
    ISafe::new(safe, provider)
        .VERSION()
        .call()
        .await
        .map_err(|err| contract_error("failed to fetch Safe version", err))
}

/// A Safe is deployed when its address holds code.
pub async fn is_deployed(rpc_url: &str, safe: Address) -> Result<bool, FetchError> {
    super::has_code(rpc_url, safe).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolCall;

    #[test]
    fn safe_selectors_match_deployed_contracts() {
        assert_eq!(ISafe::getOwnersCall::SELECTOR, [0xa0, 0xe6, 0x7e, 0x2b]);
        assert_eq!(ISafe::getThresholdCall::SELECTOR, [0xe7, 0x52, 0x35, 0xb8]);
        assert_eq!(ISafe::nonceCall::SELECTOR, [0xaf, 0xfe, 0xd0, 0xe0]);
        assert_eq!(ISafe::VERSIONCall::SELECTOR, [0xff, 0xa1, 0xad, 0x74]);
    }

    #[test]
    fn contract_failures_are_not_retried() {
        let err = contract_error("failed to fetch Safe owners", contract::Error::UnknownFunction("x".into()));
        assert!(matches!(err, FetchError::Contract(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn malformed_endpoint_fails_fast() {
        let err = fetch_owners("nope", Address::ZERO).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));
    }
}
