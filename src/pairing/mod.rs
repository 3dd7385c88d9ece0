//! Wallet pairing: session state driven by events from a pairing provider.
//!
//! The provider negotiates the session with the remote wallet; this module
//! only observes its lifecycle events and mirrors them in [`WalletSession`].

use alloy::primitives::Address;
use std::{fmt, sync::Arc};
use thiserror::Error;
use tracing::{debug, info};

pub mod qr;
mod uri;

pub use uri::UriOnlyProvider;

pub const PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingEvent {
    /// A pairing URI is ready to be shown to the user.
    DisplayUri(String),
    Connect {
        accounts: Vec<Address>,
        chain_id: u64,
    },
    Disconnect,
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("Wallet pairing unavailable: {PROJECT_ID_ENV} is not set")]
    Unavailable,
    #[error("Pairing failed: {0}")]
    Provider(String),
}

/// Receives provider events. Called from whichever thread the provider runs on.
pub type EventSink = Arc<dyn Fn(PairingEvent) + Send + Sync>;

pub trait PairingProvider: Send {
    /// Starts a new pairing. Events are reported through `sink` for the
    /// lifetime of the session.
    fn connect(&mut self, sink: EventSink) -> Result<(), PairingError>;

    fn disconnect(&mut self) -> Result<(), PairingError>;
}

type ProviderFactory = Box<dyn Fn(&str) -> Box<dyn PairingProvider> + Send>;

/// Context-owned access point to the pairing provider. The provider is built
/// on first use, and only when a project id is configured.
pub struct PairingHandle {
    project_id: Option<String>,
    factory: ProviderFactory,
    provider: Option<Box<dyn PairingProvider>>,
}

impl fmt::Debug for PairingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairingHandle")
            .field("configured", &self.project_id.is_some())
            .field("initialized", &self.provider.is_some())
            .finish()
    }
}

impl PairingHandle {
    pub fn from_env() -> Self {
        let project_id = std::env::var(PROJECT_ID_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self::new(project_id, |project_id| {
            Box::new(UriOnlyProvider::new(project_id))
        })
    }

    pub fn new<F>(project_id: Option<String>, factory: F) -> Self
    where
        F: Fn(&str) -> Box<dyn PairingProvider> + Send + 'static,
    {
        Self {
            project_id,
            factory: Box::new(factory),
            provider: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.project_id.is_some()
    }

    fn provider(&mut self) -> Result<&mut Box<dyn PairingProvider>, PairingError> {
        let project_id = self.project_id.as_deref().ok_or(PairingError::Unavailable)?;
        if self.provider.is_none() {
            debug!("initializing pairing provider");
            self.provider = Some((self.factory)(project_id));
        }
        self.provider.as_mut().ok_or(PairingError::Unavailable)
    }

    pub fn connect(&mut self, sink: EventSink) -> Result<(), PairingError> {
        info!("starting wallet pairing");
        self.provider()?.connect(sink)
    }

    pub fn disconnect(&mut self) -> Result<(), PairingError> {
        match self.provider.as_mut() {
            Some(provider) => provider.disconnect(),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WalletSession {
    #[default]
    Unpaired,
    Pairing {
        uri: String,
    },
    Paired {
        address: Address,
        chain_id: u64,
    },
}

impl WalletSession {
    pub fn is_paired(&self) -> bool {
        matches!(self, WalletSession::Paired { .. })
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            WalletSession::Paired { address, .. } => Some(*address),
            _ => None,
        }
    }

    pub fn pairing_uri(&self) -> Option<&str> {
        match self {
            WalletSession::Pairing { uri } => Some(uri),
            _ => None,
        }
    }

    /// Folds one provider event into the session.
    pub fn apply(&mut self, event: PairingEvent) {
        let next = match (std::mem::take(self), event) {
            (WalletSession::Paired { address, chain_id }, PairingEvent::DisplayUri(_)) => {
                WalletSession::Paired { address, chain_id }
            }
            (_, PairingEvent::DisplayUri(uri)) => WalletSession::Pairing { uri },
            (_, PairingEvent::Connect { accounts, chain_id }) => match accounts.first() {
                Some(address) => WalletSession::Paired {
                    address: *address,
                    chain_id,
                },
                None => WalletSession::Unpaired,
            },
            (_, PairingEvent::Disconnect) => WalletSession::Unpaired,
            (WalletSession::Paired { chain_id, .. }, PairingEvent::AccountsChanged(accounts)) => {
                match accounts.first() {
                    Some(address) => WalletSession::Paired {
                        address: *address,
                        chain_id,
                    },
                    None => WalletSession::Unpaired,
                }
            }
            (WalletSession::Paired { address, .. }, PairingEvent::ChainChanged(chain_id)) => {
                WalletSession::Paired { address, chain_id }
            }
            (session, _) => session,
        };
        *self = next;
    }
}
