//! The Message Store — append-only, insertion-ordered, session-local.
//!
//! All mutation happens on the UI thread from input handlers and the
//! per-frame `tick()`. Timers (highlight auto-clear, the periodic
//! resonance pulse) are deadline fields checked against a caller-supplied
//! clock, never background threads, so they are cancelable by overwrite
//! and cannot fire after the store is dropped. Tests drive the clock
//! directly.

use crate::encode::{self, Signature};

// ─── Constants ───────────────────────────────────────────────────────────────

/// How long a triggered highlight glows before auto-clearing (seconds).
pub const HIGHLIGHT_DURATION: f64 = 3.0;

/// Interval of the automatic resonance pulse on a random message.
pub const RESONANCE_INTERVAL: f64 = 8.0;

/// Wide scatter half-extents for seeded messages (appear in place).
const SEED_SCATTER: [f32; 3] = [6.0, 3.0, 4.0];

/// Tight scatter half-extents for user submissions (fly in from afar).
const USER_SCATTER: [f32; 3] = [2.5, 1.5, 1.5];

// ─── Message ─────────────────────────────────────────────────────────────────

/// One submitted message. `text` and `signature` are never mutated after
/// creation; only the spawn flag and the transient highlight change.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub signature: Signature,
    /// Resting position in the orb field.
    pub home: [f32; 3],
    /// True until the entry animation has completed.
    pub spawn_pending: bool,
    /// Clock time of insertion, for the fly-in animation.
    pub spawned_at: f64,
    pub highlighted: bool,
    highlight_until: Option<f64>,
}

/// Events surfaced by `tick()` for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreEvent {
    /// The periodic pulse picked this message.
    Resonance { id: u64 },
}

#[derive(Clone, Copy)]
enum SpawnKind {
    Seeded,
    User,
}

// ─── Store ───────────────────────────────────────────────────────────────────

pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
    next_resonance_at: f64,
    resonance_seq: u64,
}

/// Deterministic 0..1 value keyed off a seed. Same integer-mix idea as the
/// particle jitter in the orb field: no RNG, stable across runs.
fn scatter_hash(seed: u64) -> f32 {
    let x = seed.wrapping_mul(2654435761) ^ seed.wrapping_mul(340573321);
    ((x & 0xFFFF) as f32) / 65535.0
}

/// Place a message inside a bounding cube, keyed off its id.
fn scatter_position(id: u64, half_extents: [f32; 3]) -> [f32; 3] {
    let mut pos = [0.0f32; 3];
    for (axis, half) in half_extents.iter().enumerate() {
        let t = scatter_hash(id.wrapping_mul(37).wrapping_add(axis as u64 * 7919));
        pos[axis] = (t * 2.0 - 1.0) * half;
    }
    pos
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 0,
            next_resonance_at: RESONANCE_INTERVAL,
            resonance_seq: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Submit a user message. Blank/whitespace-only input is a silent
    /// no-op. Returns the new message id.
    pub fn submit(&mut self, text: &str, now: f64) -> Option<u64> {
        self.insert(text, now, SpawnKind::User)
    }

    /// Batch-insert the session's sample messages. Seeded messages appear
    /// in place rather than animating in.
    pub fn seed(&mut self, texts: &[&str], now: f64) {
        for text in texts {
            self.insert(text, now, SpawnKind::Seeded);
        }
    }

    fn insert(&mut self, text: &str, now: f64, kind: SpawnKind) -> Option<u64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            log::debug!("ignoring blank submission");
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        let signature = encode::encode(text);
        let (half_extents, spawn_pending) = match kind {
            SpawnKind::Seeded => (SEED_SCATTER, false),
            SpawnKind::User => (USER_SCATTER, true),
        };

        log::debug!(
            "message {id}: category {:?}, shape {:?}",
            signature.category,
            signature.shape
        );

        self.messages.push(Message {
            id,
            text: text.to_string(),
            signature,
            home: scatter_position(id, half_extents),
            spawn_pending,
            spawned_at: now,
            highlighted: false,
            highlight_until: None,
        });
        Some(id)
    }

    /// Mark a message's entry animation as finished.
    pub fn mark_spawned(&mut self, id: u64) {
        if let Some(m) = self.messages.iter_mut().find(|m| m.id == id) {
            m.spawn_pending = false;
        }
    }

    /// Highlight a message now; the highlight clears itself after
    /// `HIGHLIGHT_DURATION` unless re-triggered (which reschedules) or
    /// cleared explicitly.
    pub fn trigger_highlight(&mut self, id: u64, now: f64) {
        if let Some(m) = self.messages.iter_mut().find(|m| m.id == id) {
            m.highlighted = true;
            m.highlight_until = Some(now + HIGHLIGHT_DURATION);
        }
    }

    pub fn clear_highlight(&mut self, id: u64) {
        if let Some(m) = self.messages.iter_mut().find(|m| m.id == id) {
            m.highlighted = false;
            m.highlight_until = None;
        }
    }

    /// Per-frame update: expire highlights, fire the resonance pulse.
    pub fn tick(&mut self, now: f64) -> Vec<StoreEvent> {
        let mut events = Vec::new();

        for m in &mut self.messages {
            if let Some(deadline) = m.highlight_until {
                if now >= deadline {
                    m.highlighted = false;
                    m.highlight_until = None;
                }
            }
        }

        if now >= self.next_resonance_at {
            if !self.messages.is_empty() {
                let pick = scatter_hash(self.resonance_seq.wrapping_mul(977).wrapping_add(13));
                let idx = ((pick * self.messages.len() as f32) as usize)
                    .min(self.messages.len() - 1);
                let id = self.messages[idx].id;
                self.resonance_seq += 1;
                self.trigger_highlight(id, now);
                events.push(StoreEvent::Resonance { id });
            }
            self.next_resonance_at = now + RESONANCE_INTERVAL;
        }

        events
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_submissions_are_rejected() {
        let mut store = MessageStore::new();
        assert_eq!(store.submit("", 0.0), None);
        assert_eq!(store.submit("   ", 0.0), None);
        assert_eq!(store.submit("\t\n", 0.0), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn duplicate_text_distinct_ids_same_signature() {
        let mut store = MessageStore::new();
        let a = store.submit("hello", 0.0).expect("should accept");
        let b = store.submit("hello", 1.0).expect("should accept");
        assert_ne!(a, b);

        let msgs = store.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].id, a);
        assert_eq!(msgs[1].id, b);
        assert_eq!(msgs[0].signature, msgs[1].signature);
    }

    #[test]
    fn user_submissions_spawn_pending_within_bounds() {
        let mut store = MessageStore::new();
        let id = store.submit("hello", 2.0).expect("should accept");
        let m = store.get(id).expect("should exist");
        assert!(m.spawn_pending);
        assert_eq!(m.spawned_at, 2.0);
        for (axis, half) in USER_SCATTER.iter().enumerate() {
            assert!(m.home[axis].abs() <= *half, "axis {axis}");
        }
    }

    #[test]
    fn highlight_auto_clears_after_duration() {
        let mut store = MessageStore::new();
        let id = store.submit("hello", 0.0).expect("should accept");

        store.trigger_highlight(id, 1.0);
        assert!(store.get(id).unwrap().highlighted);

        // Still lit just before the deadline.
        store.tick(1.0 + HIGHLIGHT_DURATION - 0.01);
        assert!(store.get(id).unwrap().highlighted);

        // Cleared at/after the deadline, with no explicit clear call.
        store.tick(1.0 + HIGHLIGHT_DURATION);
        assert!(!store.get(id).unwrap().highlighted);
    }

    #[test]
    fn retrigger_reschedules_the_deadline() {
        let mut store = MessageStore::new();
        let id = store.submit("hello", 0.0).expect("should accept");

        store.trigger_highlight(id, 0.0);
        store.trigger_highlight(id, 2.0);

        // Original deadline passed, rescheduled one has not.
        store.tick(4.0);
        assert!(store.get(id).unwrap().highlighted);
        store.tick(2.0 + HIGHLIGHT_DURATION);
        assert!(!store.get(id).unwrap().highlighted);
    }

    #[test]
    fn explicit_clear_wins() {
        let mut store = MessageStore::new();
        let id = store.submit("hello", 0.0).expect("should accept");
        store.trigger_highlight(id, 0.0);
        store.clear_highlight(id);
        assert!(!store.get(id).unwrap().highlighted);
    }

    #[test]
    fn resonance_fires_on_interval_and_targets_existing_message() {
        let mut store = MessageStore::new();
        store.submit("one", 0.0);
        store.submit("two", 0.0);

        assert!(store.tick(RESONANCE_INTERVAL - 0.1).is_empty());

        let events = store.tick(RESONANCE_INTERVAL);
        assert_eq!(events.len(), 1);
        let StoreEvent::Resonance { id } = events[0];
        let m = store.get(id).expect("picked message must exist");
        assert!(m.highlighted);

        // Not again until another full interval elapses.
        assert!(store.tick(RESONANCE_INTERVAL + 1.0).is_empty());
        assert_eq!(store.tick(RESONANCE_INTERVAL * 2.0).len(), 1);
    }

    #[test]
    fn resonance_skips_empty_store() {
        let mut store = MessageStore::new();
        assert!(store.tick(RESONANCE_INTERVAL * 3.0).is_empty());
    }

    #[test]
    fn seed_scenario() {
        let mut store = MessageStore::new();
        store.seed(
            &[
                "Welcome to CipherCanvas",
                "Secrets hide in plain sight",
                "I am angry!",
                "Calm waves...",
            ],
            0.0,
        );

        let msgs = store.messages();
        assert_eq!(msgs.len(), 4);
        assert!(msgs.iter().all(|m| !m.spawn_pending));
        // Insertion order preserved.
        assert_eq!(msgs[0].text, "Welcome to CipherCanvas");
        assert_eq!(msgs[3].text, "Calm waves...");
        // Categories: default, secrecy, anger, calm.
        assert_eq!(msgs[0].signature.category, None);
        assert_eq!(msgs[1].signature.category, Some("SECRECY"));
        assert_eq!(msgs[2].signature.category, Some("ANGER"));
        assert_eq!(msgs[3].signature.category, Some("CALM"));
    }

    #[test]
    fn scatter_is_deterministic() {
        assert_eq!(scatter_position(5, SEED_SCATTER), scatter_position(5, SEED_SCATTER));
        // Neighbouring ids should not collapse onto one point.
        assert_ne!(scatter_position(1, SEED_SCATTER), scatter_position(2, SEED_SCATTER));
    }
}
