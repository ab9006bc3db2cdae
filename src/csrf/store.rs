//! CSRF Token Store
//! Mission: Manage single-use, time-bounded CSRF challenge tokens in memory

use parking_lot::Mutex;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default challenge lifetime.
pub const DEFAULT_TOKEN_EXPIRY: Duration = Duration::from_secs(4 * 60 * 60);

/// Default interval for the background expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

struct CsrfChallenge {
    challenge_token: String,
    created_at: Instant,
    client_addr: String,
}

/// In-memory table of CSRF challenge pairs, keyed by session token.
///
/// Entries are consumed on successful validation (one-time use) and
/// garbage-collected by a periodic sweep so abandoned challenges cannot
/// grow memory without bound. All operations take the same lock, so
/// validate-then-delete is atomic per key: two concurrent validations of
/// one pair yield exactly one success.
pub struct CsrfTokenStore {
    entries: Mutex<HashMap<String, CsrfChallenge>>,
    expiry: Duration,
    enforce_client_binding: bool,
}

impl CsrfTokenStore {
    /// Create a store with the default 4-hour expiry and client-address
    /// binding disabled.
    pub fn new() -> Self {
        Self::with_policy(DEFAULT_TOKEN_EXPIRY, false)
    }

    /// Create a store with an explicit expiry window and binding policy.
    ///
    /// Binding stays off by default: clients behind shared or dynamic IPs
    /// would otherwise be falsely rejected. The address is still recorded
    /// on every challenge.
    pub fn with_policy(expiry: Duration, enforce_client_binding: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            expiry,
            enforce_client_binding,
        }
    }

    /// Issue a fresh challenge pair for a client.
    ///
    /// Both values are independent 256-bit random tokens, hex-encoded.
    /// Re-issuing for an existing session token replaces the old entry, so
    /// at most one challenge is live per session token.
    pub fn issue(&self, client_addr: &str) -> (String, String) {
        let session_token = generate_token();
        let challenge_token = generate_token();

        let mut entries = self.entries.lock();
        entries.insert(
            session_token.clone(),
            CsrfChallenge {
                challenge_token: challenge_token.clone(),
                created_at: Instant::now(),
                client_addr: client_addr.to_string(),
            },
        );

        (session_token, challenge_token)
    }

    /// Validate a challenge pair, consuming it on success.
    ///
    /// Fails if the session token is unknown, the challenge token does not
    /// match, the entry is older than the expiry window, or (when the
    /// binding policy is enabled) the client address differs.
    pub fn validate(&self, session_token: &str, challenge_token: &str, client_addr: &str) -> bool {
        let mut entries = self.entries.lock();

        let Some(entry) = entries.get(session_token) else {
            return false;
        };

        if entry.challenge_token != challenge_token {
            return false;
        }

        if entry.created_at.elapsed() > self.expiry {
            entries.remove(session_token);
            return false;
        }

        if self.enforce_client_binding && entry.client_addr != client_addr {
            return false;
        }

        // Valid: consume the entry so the pair can never be replayed.
        entries.remove(session_token);
        true
    }

    /// Remove all entries older than the expiry window. Returns the number
    /// of entries removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        let expiry = self.expiry;
        entries.retain(|_, e| e.created_at.elapsed() <= expiry);
        before - entries.len()
    }

    /// Number of live challenges (tests and diagnostics).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn the background expiry sweep on the given interval.
    pub fn spawn_sweeper(store: Arc<Self>, period: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.sweep();
                if removed > 0 {
                    debug!("🧹 CSRF sweep removed {} expired challenges", removed);
                }
            }
        });
    }
}

impl Default for CsrfTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a 256-bit cryptographically random token, hex-encoded (64 chars).
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
