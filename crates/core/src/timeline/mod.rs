use serde::{Deserialize, Serialize};

/// Opaque token returned by [`FrameScheduler::request_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

/// Host primitive that invokes a callback once per display refresh.
pub trait FrameScheduler {
    /// Asks for one callback on the next refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraws a pending request. Unknown or already fired handles are
    /// ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// In-memory [`FrameScheduler`] for headless drivers and tests.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the requests that fire on this refresh, in request order.
    /// Requests made while handling them fire on the following refresh.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|pending| *pending != handle);
    }
}

/// Monotonic simulated clock in milliseconds.
#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    pub time_ms: f64,
}

impl PlaybackClock {
    pub fn advance(&mut self, delta_ms: f64) {
        self.time_ms = (self.time_ms + delta_ms).max(0.0);
    }

    pub fn now(&self) -> f64 {
        self.time_ms
    }
}

/// One-shot timer with a label the owner uses to dispatch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub time_ms: f64,
    pub label: String,
}

impl ScheduledEvent {
    pub fn new(time_ms: f64, label: impl Into<String>) -> Self {
        Self {
            time_ms,
            label: label.into(),
        }
    }
}

/// Ordered list of one-shot timers.
#[derive(Debug, Default)]
pub struct Scheduler {
    events: Vec<ScheduledEvent>,
    next_event: usize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_events(&mut self, mut events: Vec<ScheduledEvent>) {
        events.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        self.events = events;
        self.next_event = 0;
    }

    /// Returns every event that became due at or before `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Vec<ScheduledEvent> {
        let mut due = Vec::new();
        while let Some(event) = self.events.get(self.next_event) {
            if now_ms < event.time_ms {
                break;
            }
            due.push(event.clone());
            self.next_event += 1;
        }
        due
    }

    /// Whether every event has fired.
    pub fn is_finished(&self) -> bool {
        self.next_event >= self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_fires_each_request_once() {
        let mut queue = FrameQueue::new();
        let first = queue.request_frame();
        let second = queue.request_frame();
        assert_ne!(first, second);

        assert_eq!(queue.take_due(), vec![first, second]);
        assert!(queue.take_due().is_empty());
    }

    #[test]
    fn cancelled_requests_never_fire() {
        let mut queue = FrameQueue::new();
        let handle = queue.request_frame();
        queue.cancel_frame(handle);
        queue.cancel_frame(handle);

        assert!(!queue.is_pending(handle));
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn clock_never_goes_negative() {
        let mut clock = PlaybackClock::default();
        clock.advance(16.0);
        clock.advance(-100.0);
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn scheduler_releases_events_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.set_events(vec![
            ScheduledEvent::new(1000.0, "late"),
            ScheduledEvent::new(200.0, "early"),
            ScheduledEvent::new(600.0, "middle"),
        ]);

        assert!(scheduler.tick(100.0).is_empty());
        let due: Vec<_> = scheduler.tick(650.0).into_iter().map(|e| e.label).collect();
        assert_eq!(due, ["early", "middle"]);
        assert!(!scheduler.is_finished());
        assert_eq!(scheduler.tick(1000.0)[0].label, "late");
        assert!(scheduler.is_finished());
    }
}
