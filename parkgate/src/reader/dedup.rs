// parkgate/src/reader/dedup.rs

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::utils::bytes_to_hex;

/// Suppresses stale copies of replies already taken.
///
/// Every accepted reply is recorded under its signature (command and
/// payload) together with the block of the request it answered. A reply
/// carrying data is a duplicate when the same signature was accepted
/// within the window for a different block: a late copy of the block 1
/// read must never answer the block 2 read. A copy is dropped once: the
/// next identical reply is genuine (a blank card reads the same in both
/// blocks). Status-only acks and repeated answers to the same request stay
/// distinct events. Entries older than the retention period are pruned on
/// every call.
#[derive(Debug, Clone)]
pub struct DedupGuard {
    window: Duration,
    retention: Duration,
    seen: HashMap<String, (Option<u8>, Instant)>,
}

impl DedupGuard {
    pub fn new(window: Duration, retention: Duration) -> Self {
        Self {
            window,
            retention,
            seen: HashMap::new(),
        }
    }

    fn signature(command: u8, payload: &[u8]) -> String {
        format!("{}:{}", command, bytes_to_hex(payload))
    }

    /// Check and record. Returns true for a stale copy; otherwise records
    /// `now` and `block` for the signature and returns false.
    pub fn is_duplicate(
        &mut self,
        command: u8,
        block: Option<u8>,
        payload: &[u8],
        now: Instant,
    ) -> bool {
        self.prune(now);
        let sig = Self::signature(command, payload);
        if payload.len() > 1 {
            if let Some(&(seen_block, seen)) = self.seen.get(&sig) {
                if seen_block != block && now.saturating_duration_since(seen) <= self.window {
                    self.seen.remove(&sig);
                    return true;
                }
            }
        }
        self.seen.insert(sig, (block, now));
        false
    }

    pub fn prune(&mut self, now: Instant) {
        let retention = self.retention;
        self.seen
            .retain(|_, (_, seen)| now.saturating_duration_since(*seen) <= retention);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
