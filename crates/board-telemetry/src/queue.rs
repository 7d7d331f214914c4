//! Client-side event batching.
//!
//! ```text
//! Idle --enqueue--> Accumulating --debounce / overflow / page hidden--> Flushing --sent--> Idle
//! ```
//!
//! The queue only moves events between its buffer and an outbox of ready
//! batches. Sending is the caller's job (see `TelemetryPipeline`), which
//! keeps every state change synchronous and testable with a `ManualClock`.

use std::collections::{HashMap, VecDeque};
use std::mem;

use board_core::{Clock, CreativeId, Interval, OneShot, QueueConfig};
use tracing::debug;

use crate::event::{AdEvent, CollectorPayload, EventType};

/// Lifecycle state of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Nothing buffered, no timer armed.
    Idle,
    /// Events buffered, flush timer armed.
    Accumulating,
    /// Batches handed off or waiting to be sent.
    Flushing,
}

/// Result of [`EventQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Event appended to the buffer.
    Buffered,
    /// The buffer was full and was flushed before appending.
    FlushedThenBuffered,
    /// Same `(ad, event)` seen within the dedup window; dropped.
    Duplicate,
}

/// Events drained from the buffer in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub events: Vec<AdEvent>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Wire payload for this batch.
    pub fn into_payload(self) -> CollectorPayload {
        CollectorPayload::batch(self.events)
    }
}

type DedupKey = (CreativeId, EventType);

/// Buffers ad events and cuts them into batches.
#[derive(Debug)]
pub struct EventQueue<C: Clock> {
    clock: C,
    config: QueueConfig,
    buffer: Vec<AdEvent>,
    recent: HashMap<DedupKey, u64>,
    debounce: OneShot,
    sweep: Interval,
    outbox: VecDeque<Batch>,
    in_flight: usize,
}

impl<C: Clock> EventQueue<C> {
    /// Create an idle queue.
    pub fn new(clock: C, mut config: QueueConfig) -> Self {
        config.max_buffer = config.max_buffer.max(1);
        let debounce = OneShot::new(config.debounce());
        let sweep = Interval::new(config.sweep_interval());
        Self {
            clock,
            config,
            buffer: Vec::new(),
            recent: HashMap::new(),
            debounce,
            sweep,
            outbox: VecDeque::new(),
            in_flight: 0,
        }
    }

    /// Arm the periodic dedup sweep.
    pub fn start(&mut self) {
        self.sweep.start(self.clock.now_ms());
    }

    /// Clear every timer and drop pending state.
    pub fn dispose(&mut self) {
        self.debounce.disarm();
        self.sweep.stop();
        self.buffer.clear();
        self.recent.clear();
        self.outbox.clear();
        self.in_flight = 0;
    }

    /// Buffer an event.
    pub fn enqueue(&mut self, ad_id: impl Into<CreativeId>, event_type: EventType) -> Enqueued {
        let now = self.clock.now_ms();
        let ad_id = ad_id.into();
        let key = (ad_id, event_type);

        if let Some(&seen_at) = self.recent.get(&key) {
            if now.saturating_sub(seen_at) < self.config.dedup_window_ms {
                return Enqueued::Duplicate;
            }
        }

        let mut outcome = Enqueued::Buffered;
        if self.buffer.len() >= self.config.max_buffer {
            debug!(buffered = self.buffer.len(), "event buffer full, flushing early");
            self.flush_now();
            outcome = Enqueued::FlushedThenBuffered;
        }

        self.recent.insert(key.clone(), now);
        let (ad_id, event_type) = key;
        self.buffer.push(AdEvent { ad_id, event_type });
        self.debounce.arm_if_idle(now);
        outcome
    }

    /// Move the whole buffer into one ready batch.
    ///
    /// Returns the batch size, or `None` if nothing was buffered.
    pub fn flush_now(&mut self) -> Option<usize> {
        self.debounce.disarm();
        if self.buffer.is_empty() {
            return None;
        }

        let events = mem::take(&mut self.buffer);
        let len = events.len();
        self.outbox.push_back(Batch { events });
        debug!(batch_len = len, "event batch ready");
        Some(len)
    }

    /// The page is being hidden or left; flush without waiting for the
    /// debounce.
    pub fn page_hidden(&mut self) -> Option<usize> {
        self.flush_now()
    }

    /// Run due timers. Returns `true` if the debounce produced a batch.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now_ms();

        let flushed = if self.debounce.take_if_due(now) {
            self.flush_now().is_some()
        } else {
            false
        };

        if self.sweep.fire_if_due(now) {
            self.prune_recent(now);
        }

        flushed
    }

    /// Forget dedup entries older than twice the dedup window.
    pub fn prune_recent(&mut self, now: u64) -> usize {
        let horizon = self.config.dedup_window_ms.saturating_mul(2);
        let before = self.recent.len();
        self.recent.retain(|_, seen_at| now.saturating_sub(*seen_at) <= horizon);
        before - self.recent.len()
    }

    /// Hand every ready batch to the sender. They count as in flight until
    /// [`finish_send`](Self::finish_send).
    pub fn take_ready(&mut self) -> Vec<Batch> {
        let batches: Vec<Batch> = self.outbox.drain(..).collect();
        self.in_flight += batches.len();
        batches
    }

    /// Record that `count` in-flight batches completed, successfully or not.
    pub fn finish_send(&mut self, count: usize) {
        self.in_flight = self.in_flight.saturating_sub(count);
    }

    /// Whether batches are waiting in the outbox.
    pub fn has_ready(&self) -> bool {
        !self.outbox.is_empty()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueueState {
        if self.in_flight > 0 || !self.outbox.is_empty() {
            QueueState::Flushing
        } else if !self.buffer.is_empty() {
            QueueState::Accumulating
        } else {
            QueueState::Idle
        }
    }

    /// Buffered events not yet cut into a batch.
    pub fn buffered(&self) -> &[AdEvent] {
        &self.buffer
    }

    /// Number of tracked dedup entries.
    pub fn dedup_entries(&self) -> usize {
        self.recent.len()
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }
}
