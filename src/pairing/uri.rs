use super::{EventSink, PairingError, PairingEvent, PairingProvider};
use alloy::hex;
use rand::Rng;
use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tracing::{debug, info};

/// How long a displayed pairing proposal stays valid.
const PAIRING_TTL: Duration = Duration::from_secs(300);

/// Builds WalletConnect v2 pairing URIs for display. The relay handshake that
/// turns a scanned URI into a session belongs to a relay-capable provider;
/// this one only advertises the proposal, so it never reports `Connect`.
pub struct UriOnlyProvider {
    project_id: String,
    active: Option<EventSink>,
}

impl fmt::Debug for UriOnlyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UriOnlyProvider")
            .field("project_id", &self.project_id)
            .field("active", &self.active.is_some())
            .finish()
    }
}

impl UriOnlyProvider {
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            active: None,
        }
    }
}

/// `wc:{topic}@2?relay-protocol=irn&symKey={key}&expiryTimestamp={unix}`
pub fn pairing_uri(topic: &[u8; 32], sym_key: &[u8; 32], expires_at: u64) -> String {
    format!(
        "wc:{}@2?relay-protocol=irn&symKey={}&expiryTimestamp={expires_at}",
        hex::encode(topic),
        hex::encode(sym_key)
    )
}

impl PairingProvider for UriOnlyProvider {
    fn connect(&mut self, sink: EventSink) -> Result<(), PairingError> {
        if self.active.is_some() {
            return Err(PairingError::Provider(
                "a pairing proposal is already active".into(),
            ));
        }
        let mut rng = rand::thread_rng();
        let topic: [u8; 32] = rng.r#gen();
        let sym_key: [u8; 32] = rng.r#gen();
        let expires_at = SystemTime::now()
            .checked_add(PAIRING_TTL)
            .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
            .map(|since| since.as_secs())
            .unwrap_or_default();

        let uri = pairing_uri(&topic, &sym_key, expires_at);
        info!(project_id = %self.project_id, topic = %hex::encode(topic), "pairing proposal created");
        sink(PairingEvent::DisplayUri(uri));
        self.active = Some(sink);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), PairingError> {
        if let Some(sink) = self.active.take() {
            debug!("pairing proposal withdrawn");
            sink(PairingEvent::Disconnect);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn uri_follows_pairing_format() {
        let uri = pairing_uri(&[0xab; 32], &[0x01; 32], 1_700_000_000);
        assert!(uri.starts_with(&format!("wc:{}@2?", "ab".repeat(32))));
        assert!(uri.contains("relay-protocol=irn"));
        assert!(uri.contains(&format!("symKey={}", "01".repeat(32))));
        assert!(uri.ends_with("expiryTimestamp=1700000000"));
    }

    #[test]
    fn connect_announces_uri_and_disconnect_withdraws_it() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorded = events.clone();
        let sink: EventSink = Arc::new(move |event| recorded.lock().unwrap().push(event));

        let mut provider = UriOnlyProvider::new("project");
        provider.connect(sink.clone()).unwrap();
        assert!(provider.connect(sink).is_err());
        provider.disconnect().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], PairingEvent::DisplayUri(uri) if uri.starts_with("wc:")));
        assert_eq!(events[1], PairingEvent::Disconnect);
    }
}
