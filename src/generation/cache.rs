//! Short-lived result cache keyed by request fingerprint.
//!
//! Only successful text is stored. Entries expire lazily: an expired entry
//! is ignored on read and overwritten on the next insert, nothing sweeps
//! the map in the background.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Number of leading (and trailing) characters folded into a fingerprint.
const FINGERPRINT_SAMPLE_CHARS: usize = 100;

/// Deterministic hash of (operation, truncated input, parameters).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Hash the operation name, the input's character length, its first and
    /// last 100 characters, and every parameter pair in order.
    pub fn compute(operation: &str, input: &str, params: &[(&str, &str)]) -> Self {
        let mut hasher = blake3::Hasher::new();
        let mut feed = |value: &str| {
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        };

        feed(operation);

        let input = input.trim();
        let char_count = input.chars().count();
        feed(&char_count.to_string());
        let head: String = input.chars().take(FINGERPRINT_SAMPLE_CHARS).collect();
        feed(&head);
        let tail: String = input
            .chars()
            .skip(char_count.saturating_sub(FINGERPRINT_SAMPLE_CHARS))
            .collect();
        feed(&tail);

        for (key, value) in params {
            feed(key);
            feed(value);
        }

        Fingerprint(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub value: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < self.ttl
    }
}

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<Fingerprint, CacheEntry>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<String> {
        let entries = self.entries.read();
        let entry = entries.get(fingerprint)?;
        if entry.is_fresh(Instant::now()) {
            trace!(fingerprint = %fingerprint.short(), "Cache hit");
            Some(entry.value.clone())
        } else {
            trace!(fingerprint = %fingerprint.short(), "Cache entry expired");
            None
        }
    }

    /// Store `value` unless a fresh entry already exists. Returns whether
    /// the value was stored.
    pub fn put(&self, fingerprint: Fingerprint, value: impl Into<String>, ttl: Duration) -> bool {
        if ttl.is_zero() {
            return false;
        }
        let now = Instant::now();
        let mut entries = self.entries.write();
        if entries.get(&fingerprint).is_some_and(|entry| entry.is_fresh(now)) {
            return false;
        }
        entries.insert(
            fingerprint,
            CacheEntry {
                fingerprint,
                value: value.into(),
                created_at: now,
                ttl,
            },
        );
        true
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
