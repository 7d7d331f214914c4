//! Wiring between the event queue, a collector and the tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use board_core::{Clock, CreativeId, QueueConfig};
use futures::future::join_all;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::collector::{CollectRequest, Collector};
use crate::event::EventType;
use crate::queue::{Enqueued, EventQueue, QueueState};

/// Outcome of one [`TelemetryPipeline::pump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Batches attempted.
    pub batches: usize,
    /// Events in batches the collector accepted.
    pub delivered: usize,
    /// Batches the collector rejected; these are dropped.
    pub failed: usize,
}

/// An [`EventQueue`] bound to a [`Collector`].
pub struct TelemetryPipeline<C: Clock> {
    queue: Mutex<EventQueue<C>>,
    collector: Arc<dyn Collector>,
    ready: Notify,
}

impl<C: Clock> TelemetryPipeline<C> {
    pub fn new(clock: C, config: QueueConfig, collector: Arc<dyn Collector>) -> Self {
        Self {
            queue: Mutex::new(EventQueue::new(clock, config)),
            collector,
            ready: Notify::new(),
        }
    }

    fn queue(&self) -> MutexGuard<'_, EventQueue<C>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an impression or click.
    pub fn enqueue(&self, ad_id: impl Into<CreativeId>, event_type: EventType) -> Enqueued {
        let (outcome, ready) = {
            let mut queue = self.queue();
            (queue.enqueue(ad_id, event_type), queue.has_ready())
        };
        if ready {
            self.ready.notify_one();
        }
        outcome
    }

    /// Cut the buffer into a batch without waiting for the debounce.
    pub fn flush(&self) -> Option<usize> {
        let flushed = self.queue().flush_now();
        if flushed.is_some() {
            self.ready.notify_one();
        }
        flushed
    }

    /// Flush now because the page is going away.
    pub fn page_hidden(&self) -> Option<usize> {
        let flushed = self.queue().page_hidden();
        if flushed.is_some() {
            self.ready.notify_one();
        }
        flushed
    }

    /// Run the queue's timers. Returns `true` if batches are ready to send.
    pub fn tick(&self) -> bool {
        let mut queue = self.queue();
        queue.poll();
        queue.has_ready()
    }

    /// Send every ready batch concurrently. Every request is keepalive so a
    /// batch in flight survives the page unloading.
    pub async fn pump(&self) -> PumpReport {
        let batches = self.queue().take_ready();
        if batches.is_empty() {
            return PumpReport::default();
        }

        let requests: Vec<CollectRequest> = batches
            .into_iter()
            .map(|batch| CollectRequest::new(batch.into_payload()).keepalive())
            .collect();

        let results = join_all(requests.iter().map(|r| self.collector.send(r))).await;

        let mut report = PumpReport {
            batches: requests.len(),
            ..PumpReport::default()
        };
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(()) => report.delivered += request.payload.len(),
                Err(e) => {
                    report.failed += 1;
                    warn!(error = %e, events = request.payload.len(), "dropping event batch");
                }
            }
        }

        self.queue().finish_send(report.batches);
        debug!(
            batches = report.batches,
            delivered = report.delivered,
            failed = report.failed,
            "pump finished"
        );
        report
    }

    /// Wait until a batch becomes ready outside the timer path.
    pub async fn notified(&self) {
        self.ready.notified().await;
    }

    pub fn start(&self) {
        self.queue().start();
    }

    /// Drop buffered events and stop the queue's timers.
    pub fn dispose(&self) {
        self.queue().dispose();
    }

    pub fn state(&self) -> QueueState {
        self.queue().state()
    }

    pub fn buffered_len(&self) -> usize {
        self.queue().buffered().len()
    }

    pub fn has_ready(&self) -> bool {
        self.queue().has_ready()
    }
}

/// Background task that ticks a pipeline and pumps ready batches.
pub struct QueueDriver;

impl QueueDriver {
    /// Start the pipeline and spawn its driver on the current runtime.
    pub fn spawn<C: Clock + 'static>(
        pipeline: Arc<TelemetryPipeline<C>>,
        tick: Duration,
    ) -> DriverHandle {
        pipeline.start();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        pipeline.tick();
                    }
                    _ = pipeline.notified() => {}
                }
                if pipeline.has_ready() {
                    pipeline.pump().await;
                }
            }
        });
        DriverHandle { task }
    }
}

/// Handle to a running [`QueueDriver`]. Dropping it stops the driver.
#[derive(Debug)]
pub struct DriverHandle {
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Stop the driver task.
    pub fn dispose(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MemoryCollector;
    use crate::event::AdEvent;
    use board_core::ManualClock;
    use futures::executor::block_on;

    fn build(
        clock: &ManualClock,
        config: QueueConfig,
    ) -> (Arc<TelemetryPipeline<ManualClock>>, Arc<MemoryCollector>) {
        let collector = Arc::new(MemoryCollector::new());
        let pipeline = Arc::new(TelemetryPipeline::new(
            clock.clone(),
            config,
            collector.clone(),
        ));
        (pipeline, collector)
    }

    #[test]
    fn test_pump_sends_one_batch() {
        let clock = ManualClock::new(0);
        let (pipeline, collector) = build(&clock, QueueConfig::default());

        for id in ["a", "b", "c", "d", "e"] {
            pipeline.enqueue(id, EventType::Impression);
            clock.advance_ms(50);
        }
        clock.advance_ms(50);
        assert!(pipeline.tick());

        let report = block_on(pipeline.pump());
        assert_eq!(report, PumpReport { batches: 1, delivered: 5, failed: 0 });

        let requests = collector.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].keepalive);
        assert_eq!(pipeline.state(), QueueState::Idle);
    }

    #[test]
    fn test_failed_batch_is_dropped() {
        let clock = ManualClock::new(0);
        let (pipeline, collector) = build(&clock, QueueConfig::default());
        collector.set_failing(true);

        pipeline.enqueue("a", EventType::Click);
        pipeline.page_hidden();
        let report = block_on(pipeline.pump());
        assert_eq!(report.failed, 1);
        assert_eq!(pipeline.state(), QueueState::Idle);

        // Nothing is retried once the collector recovers.
        collector.set_failing(false);
        assert_eq!(block_on(pipeline.pump()), PumpReport::default());
        assert!(collector.events().is_empty());
    }

    #[test]
    fn test_page_hidden_sends_keepalive() {
        let clock = ManualClock::new(0);
        let (pipeline, collector) = build(&clock, QueueConfig::default());

        pipeline.enqueue("a", EventType::Impression);
        assert_eq!(pipeline.page_hidden(), Some(1));
        block_on(pipeline.pump());

        let requests = collector.requests();
        assert!(requests[0].keepalive);
        assert_eq!(collector.events(), vec![AdEvent::impression("a")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_flushes_after_debounce() {
        let clock = ManualClock::new(0);
        let (pipeline, collector) = build(&clock, QueueConfig::default());
        let handle = QueueDriver::spawn(pipeline.clone(), Duration::from_millis(100));

        pipeline.enqueue("a", EventType::Impression);
        pipeline.enqueue("b", EventType::Click);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(collector.requests().is_empty());

        clock.advance_ms(300);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(
            collector.events(),
            vec![AdEvent::impression("a"), AdEvent::click("b")]
        );

        handle.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_sends_overflow_without_waiting() {
        let clock = ManualClock::new(0);
        let (pipeline, collector) =
            build(&clock, QueueConfig::default().with_max_buffer(2));
        let handle = QueueDriver::spawn(pipeline.clone(), Duration::from_secs(60));

        // Let the driver consume its immediate first tick.
        tokio::task::yield_now().await;

        pipeline.enqueue("a", EventType::Impression);
        pipeline.enqueue("b", EventType::Impression);
        pipeline.enqueue("c", EventType::Impression);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(collector.requests().len(), 1);
        assert_eq!(pipeline.buffered_len(), 1);
        handle.dispose();
    }
}
