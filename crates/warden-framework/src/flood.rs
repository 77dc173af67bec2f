//! Per-chat flood gate.
//!
//! Each chat gets a counter over a fixed window. The first update from a
//! chat (or the first after its window expired) opens a new window with a
//! count of one; later updates in the same window increment the count and
//! are admitted while it stays within the threshold.
//!
//! State is split across shards picked by hashing the chat id, so chats in
//! different shards never contend. Each shard holds a bounded number of
//! entries: when a new chat arrives at a full shard, expired entries are
//! dropped first, then the entry with the oldest window.

use std::collections::HashMap;
use std::hash::{BuildHasher, RandomState};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use warden_core::ChatId;

/// Flood gate parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodConfig {
    /// Window length.
    pub window: Duration,
    /// Updates admitted per window, inclusive.
    pub threshold: u32,
    /// Number of independently locked shards.
    pub shards: usize,
    /// Upper bound on tracked chats across all shards.
    pub max_tracked_chats: usize,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(2),
            threshold: 10,
            shards: 16,
            max_tracked_chats: 10_000,
        }
    }
}

/// Counter for one chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodState {
    pub count: u32,
    pub window_start: Instant,
}

impl FloodState {
    fn fresh(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) > window
    }
}

type Shard = Mutex<HashMap<ChatId, FloodState>>;

/// Sharded per-chat admission control.
pub struct FloodGate {
    config: FloodConfig,
    shards: Box<[Shard]>,
    per_shard_cap: usize,
    hasher: RandomState,
}

impl FloodGate {
    /// Creates a gate. Zero shard or capacity values are raised to one.
    pub fn new(config: FloodConfig) -> Self {
        let shard_count = config.shards.max(1);
        let per_shard_cap = config.max_tracked_chats.div_ceil(shard_count).max(1);
        let shards = (0..shard_count)
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            config,
            shards,
            per_shard_cap,
            hasher: RandomState::new(),
        }
    }

    pub fn config(&self) -> &FloodConfig {
        &self.config
    }

    fn shard(&self, chat: ChatId) -> &Shard {
        let idx = (self.hasher.hash_one(chat) as usize) % self.shards.len();
        &self.shards[idx]
    }

    /// Records an update from `chat` at `now` and decides whether to admit it.
    ///
    /// Calls for the same chat must be made in arrival order.
    pub fn admit(&self, chat: ChatId, now: Instant) -> bool {
        let window = self.config.window;
        let mut shard = self.shard(chat).lock();

        if let Some(state) = shard.get_mut(&chat) {
            if state.is_expired(now, window) {
                *state = FloodState::fresh(now);
                return true;
            }
            state.count = state.count.saturating_add(1);
            let admitted = state.count <= self.config.threshold;
            if !admitted {
                trace!(chat_id = %chat, count = state.count, "Update throttled");
            }
            return admitted;
        }

        if shard.len() >= self.per_shard_cap {
            Self::make_room(&mut shard, now, window);
        }
        shard.insert(chat, FloodState::fresh(now));
        true
    }

    fn make_room(shard: &mut HashMap<ChatId, FloodState>, now: Instant, window: Duration) {
        let before = shard.len();
        shard.retain(|_, s| !s.is_expired(now, window));
        if shard.len() < before {
            return;
        }
        let oldest = shard
            .iter()
            .min_by_key(|(_, s)| s.window_start)
            .map(|(chat, _)| *chat);
        if let Some(chat) = oldest {
            debug!(chat_id = %chat, "Evicting oldest flood entry from full shard");
            shard.remove(&chat);
        }
    }

    /// Removes every entry whose window expired before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let window = self.config.window;
        let removed: usize = self
            .shards
            .iter()
            .map(|shard| {
                let mut shard = shard.lock();
                let before = shard.len();
                shard.retain(|_, s| !s.is_expired(now, window));
                before - shard.len()
            })
            .sum();
        if removed > 0 {
            debug!(removed, remaining = self.len(), "Swept expired flood entries");
        }
        removed
    }

    /// Current state for `chat`, if tracked.
    pub fn state(&self, chat: ChatId) -> Option<FloodState> {
        self.shard(chat).lock().get(&chat).copied()
    }

    /// Number of tracked chats.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FloodGate {
    fn default() -> Self {
        Self::new(FloodConfig::default())
    }
}

impl std::fmt::Debug for FloodGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloodGate")
            .field("config", &self.config)
            .field("tracked", &self.len())
            .finish()
    }
}
