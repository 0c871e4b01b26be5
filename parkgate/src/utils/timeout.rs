//! Timing defaults for the reader link.
//!
//! The terminal is driven by three periodic events (transport poll, auto
//! search, reply timeout); their default periods live here so the config
//! and tests agree on them.

use std::time::Duration;

/// How long to wait for a reply before retransmitting.
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 400;

/// Retransmissions before a command is declared failed.
pub const DEFAULT_MAX_REPLY_RETRIES: u32 = 2;

/// Transport poll period.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Automatic SearchCard period.
pub const DEFAULT_AUTO_SEARCH_INTERVAL_MS: u64 = 500;

/// Identical replies inside this window are one event.
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 800;

/// Reply signatures older than this are pruned.
pub const DEFAULT_DEDUP_RETENTION_MS: u64 = 3000;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convenience: default reply timeout as Duration.
pub fn default_reply_timeout() -> Duration {
    ms(DEFAULT_REPLY_TIMEOUT_MS)
}
