use crate::domain::ports::{NotificationEvent, NotificationSink};
use std::sync::{Arc, Mutex};

/// Discards every event. The default when no push-notification layer is
/// attached.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _event: NotificationEvent) {}
}

/// Collects events so tests can assert on what a commit emitted.
#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().expect("sink poisoned").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, event: NotificationEvent) {
        self.events.lock().expect("sink poisoned").push(event);
    }
}
