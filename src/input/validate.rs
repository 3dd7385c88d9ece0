use alloy::primitives::Address;
use reqwest::Url;
use std::str::FromStr;
use thiserror::Error;

/// Inline, non-fatal rejection of a field's content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Accepts `0x` followed by 40 hex digits. Mixed-case input must carry a valid
/// EIP-55 checksum; all-lower and all-upper input is accepted as is.
pub fn is_address(value: &str) -> bool {
    parse_address(value).is_some()
}

pub fn parse_address(value: &str) -> Option<Address> {
    let digits = value.strip_prefix("0x")?;
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(value, None).ok()
    } else {
        Address::from_str(value).ok()
    }
}

pub fn validate_address(value: &str) -> Result<Address, ValidationError> {
    parse_address(value).ok_or_else(|| ValidationError::new("Invalid Ethereum address format"))
}

pub fn validate_contract_address(value: &str) -> Result<Address, ValidationError> {
    parse_address(value).ok_or_else(|| ValidationError::new("Invalid contract address"))
}

pub fn validate_rpc_url(value: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(value.trim()).map_err(|_| ValidationError::new("Invalid URL format"))?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(ValidationError::new(
            "Invalid URL format (expected an http:// or https:// endpoint)",
        )),
    }
}

/// Only checks the JSON shape. Interpreting entries as ABI items happens in
/// the encoder.
pub fn validate_abi_json(value: &str) -> Result<(), ValidationError> {
    match serde_json::from_str::<serde_json::Value>(value.trim()) {
        Ok(serde_json::Value::Array(_)) | Ok(serde_json::Value::Object(_)) => Ok(()),
        _ => Err(ValidationError::new(
            "Invalid ABI format. Please provide a valid JSON ABI",
        )),
    }
}

pub fn accept_any(_value: &str) -> Result<(), ValidationError> {
    Ok(())
}
