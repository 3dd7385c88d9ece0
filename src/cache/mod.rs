//! Keyed cache of asynchronous read results.
//!
//! The cache never performs I/O itself. `get` answers with the current
//! tri-state and, when a network read is needed, hands out a [`FetchTicket`];
//! the caller runs the read and reports back through [`QueryCache::resolve`].
//! At most one ticket is outstanding per key, and a completion is only
//! accepted if its ticket is still the one the entry is waiting for.

use std::{
    collections::HashMap,
    fmt,
    time::{Duration, Instant},
};
use thiserror::Error;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Hierarchical cache key, e.g. `safe/owners/<address>/<rpc url>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Segment-wise prefix match: `safe` matches `safe/owners/..` but not
    /// `safeguard/..`.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Freshness and retry policy declared per resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub stale_after: Duration,
    pub expire_after: Duration,
    pub refetch_interval: Option<Duration>,
    pub max_retries: u32,
}

impl QueryPolicy {
    pub const fn new(stale_after: Duration, expire_after: Duration) -> Self {
        Self {
            stale_after,
            expire_after,
            refetch_interval: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub const fn refetch_every(mut self, interval: Duration) -> Self {
        self.refetch_interval = Some(interval);
        self
    }

    pub const fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// Delay before retry number `attempt` (zero based): 1s, 2s, 4s, ... capped at 30s.
pub fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    RETRY_BASE_DELAY.saturating_mul(factor).min(RETRY_MAX_DELAY)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Malformed request parameters. Never retried.
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Connectivity(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// The endpoint answered but the contract call itself failed. Never retried.
    #[error("{0}")]
    Contract(String),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Connectivity(_) | FetchError::Timeout(_) | FetchError::Unexpected(_)
        )
    }
}

/// Identifies one outstanding read for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    id: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<V> {
    Ready { value: V, stale: bool },
    Pending { previous: Option<V> },
    Failed { error: FetchError, previous: Option<V> },
}

impl<V> QueryState<V> {
    pub fn value(&self) -> Option<&V> {
        match self {
            QueryState::Ready { value, .. } => Some(value),
            QueryState::Pending { previous } | QueryState::Failed { previous, .. } => {
                previous.as_ref()
            }
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            QueryState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<V> {
    pub state: QueryState<V>,
    /// Set when the caller must start a read for this key.
    pub fetch: Option<FetchTicket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Stored,
    RetryScheduled { attempt: u32, at: Instant },
    Failed,
    /// The ticket was superseded (invalidation, push update, eviction).
    Discarded,
}

#[derive(Debug)]
struct Entry<V> {
    policy: QueryPolicy,
    value: Option<V>,
    fetched_at: Option<Instant>,
    settled_at: Option<Instant>,
    last_access: Instant,
    in_flight: Option<u64>,
    retry_count: u32,
    next_retry_at: Option<Instant>,
    last_error: Option<FetchError>,
}

impl<V> Entry<V> {
    fn new(policy: QueryPolicy, now: Instant) -> Self {
        Self {
            policy,
            value: None,
            fetched_at: None,
            settled_at: None,
            last_access: now,
            in_flight: None,
            retry_count: 0,
            next_retry_at: None,
            last_error: None,
        }
    }

    fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.next_retry_at.is_some()
    }

    fn age(&self, now: Instant) -> Option<Duration> {
        self.fetched_at.map(|at| now.saturating_duration_since(at))
    }

    fn expire_value(&mut self, now: Instant) {
        if self
            .age(now)
            .is_some_and(|age| age >= self.policy.expire_after)
        {
            self.value = None;
            self.fetched_at = None;
            self.last_error = None;
        }
    }
}

#[derive(Debug)]
pub struct QueryCache<V> {
    entries: HashMap<QueryKey, Entry<V>>,
    next_ticket: u64,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_ticket: 0,
        }
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `key`, issuing a fetch ticket when the value is
    /// missing, expired, or stale with no read already under way.
    pub fn get(&mut self, key: &QueryKey, policy: QueryPolicy, now: Instant) -> Lookup<V> {
        let next_ticket = &mut self.next_ticket;
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(policy, now));
        entry.policy = policy;
        entry.last_access = now;
        entry.expire_value(now);

        let stale = entry
            .age(now)
            .is_some_and(|age| age >= entry.policy.stale_after);
        let needs_fetch = !entry.is_busy()
            && entry.last_error.is_none()
            && (entry.value.is_none() || stale);

        let fetch = needs_fetch.then(|| {
            entry.retry_count = 0;
            issue(entry, key, next_ticket)
        });

        Lookup {
            state: state_of(entry, now),
            fetch,
        }
    }

    /// Read-only view used while rendering; never starts a read.
    pub fn peek(&self, key: &QueryKey, now: Instant) -> Option<QueryState<V>> {
        self.entries.get(key).map(|entry| state_of(entry, now))
    }

    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<V, FetchError>,
        now: Instant,
    ) -> Resolution {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            return Resolution::Discarded;
        };
        if entry.in_flight != Some(ticket.id) {
            return Resolution::Discarded;
        }
        entry.in_flight = None;

        match result {
            Ok(value) => {
                entry.value = Some(value);
                entry.fetched_at = Some(now);
                entry.settled_at = Some(now);
                entry.last_error = None;
                entry.retry_count = 0;
                Resolution::Stored
            }
            Err(error) if error.is_retryable() && entry.retry_count < entry.policy.max_retries => {
                let at = now + retry_delay(entry.retry_count);
                entry.retry_count += 1;
                entry.next_retry_at = Some(at);
                Resolution::RetryScheduled {
                    attempt: entry.retry_count,
                    at,
                }
            }
            Err(error) => {
                entry.last_error = Some(error);
                entry.settled_at = Some(now);
                Resolution::Failed
            }
        }
    }

    /// Stores a value pushed by a subscription. Any read in flight for the
    /// key is superseded.
    pub fn set(&mut self, key: &QueryKey, policy: QueryPolicy, value: V, now: Instant) {
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(policy, now));
        entry.policy = policy;
        entry.value = Some(value);
        entry.fetched_at = Some(now);
        entry.settled_at = Some(now);
        entry.in_flight = None;
        entry.next_retry_at = None;
        entry.retry_count = 0;
        entry.last_error = None;
    }

    /// Drops every entry under `prefix`. The next `get` on any of them
    /// fetches fresh, and completions of reads already under way are
    /// discarded.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    /// Tickets for retries whose backoff elapsed and for observed keys whose
    /// refetch interval elapsed.
    pub fn poll(&mut self, now: Instant) -> Vec<FetchTicket> {
        let next_ticket = &mut self.next_ticket;
        let mut due = Vec::new();
        for (key, entry) in self.entries.iter_mut() {
            if entry.in_flight.is_some() {
                continue;
            }
            if let Some(at) = entry.next_retry_at {
                if now >= at {
                    entry.next_retry_at = None;
                    due.push(issue(entry, key, next_ticket));
                }
                continue;
            }
            let Some(interval) = entry.policy.refetch_interval else {
                continue;
            };
            let observed = entry
                .settled_at
                .is_some_and(|settled| entry.last_access > settled);
            let elapsed = entry
                .settled_at
                .is_some_and(|settled| now.saturating_duration_since(settled) >= interval);
            if observed && elapsed {
                entry.retry_count = 0;
                due.push(issue(entry, key, next_ticket));
            }
        }
        due
    }

    /// Removes idle entries that nobody has read within their expiry window.
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.in_flight.is_some()
                || now.saturating_duration_since(entry.last_access) < entry.policy.expire_after
        });
        before - self.entries.len()
    }

    pub fn retry_count(&self, key: &QueryKey) -> Option<u32> {
        self.entries.get(key).map(|entry| entry.retry_count)
    }

    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn issue<V>(entry: &mut Entry<V>, key: &QueryKey, next_ticket: &mut u64) -> FetchTicket {
    *next_ticket += 1;
    entry.in_flight = Some(*next_ticket);
    FetchTicket {
        key: key.clone(),
        id: *next_ticket,
    }
}

fn state_of<V: Clone>(entry: &Entry<V>, now: Instant) -> QueryState<V> {
    let value = entry
        .age(now)
        .filter(|age| *age < entry.policy.expire_after)
        .and(entry.value.clone());
    match (&entry.last_error, value) {
        (Some(error), previous) if !entry.is_busy() => QueryState::Failed {
            error: error.clone(),
            previous,
        },
        (_, Some(value)) => {
            let stale = entry
                .age(now)
                .is_some_and(|age| age >= entry.policy.stale_after);
            QueryState::Ready { value, stale }
        }
        (_, None) => QueryState::Pending { previous: None },
    }
}
