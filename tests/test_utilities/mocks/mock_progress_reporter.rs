use comaudit::application::analyzers::CancellationToken;
use comaudit::ports::outbound::ProgressInfo;
use comaudit::prelude::*;
use std::sync::{Arc, Mutex};

/// Mock ProgressReporter for testing that captures messages and progress updates
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    pub messages: Arc<Mutex<Vec<String>>>,
    pub updates: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Progress updates for one operation, in report order
    pub fn updates_for(&self, operation: &str) -> Vec<ProgressInfo> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.operation == operation)
            .cloned()
            .collect()
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn report_progress(&self, info: &ProgressInfo) {
        self.updates.lock().unwrap().push(info.clone());
    }

    fn report_error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("Error: {}", message));
    }

    fn report_completion(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("Completed: {}", message));
    }
}

/// Cancels a token once a given number of progress updates have been seen
pub struct CancellingProgressReporter {
    token: CancellationToken,
    after: usize,
    pub seen: Mutex<usize>,
}

impl CancellingProgressReporter {
    pub fn new(token: CancellationToken, after: usize) -> Self {
        Self {
            token,
            after,
            seen: Mutex::new(0),
        }
    }
}

impl ProgressReporter for CancellingProgressReporter {
    fn report(&self, _message: &str) {}

    fn report_progress(&self, _info: &ProgressInfo) {
        let mut seen = self.seen.lock().unwrap();
        *seen += 1;
        if *seen >= self.after {
            self.token.cancel();
        }
    }

    fn report_error(&self, _message: &str) {}

    fn report_completion(&self, _message: &str) {}
}
