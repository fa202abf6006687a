use crate::ports::outbound::{ProgressInfo, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};

const BAR_TEMPLATE: &str =
    "   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {prefix}: {msg}";

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// This adapter implements the ProgressReporter port, writing progress
/// information to stderr so it doesn't interfere with report output on stdout.
/// Each operation gets its own indicatif bar; a new operation name finishes
/// the previous bar.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<(String, ProgressBar)>>,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<(String, ProgressBar)>> {
        self.progress_bar
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn bar_for(&self, info: &ProgressInfo) -> ProgressBar {
        let mut slot = self.lock();
        if let Some((operation, pb)) = slot.as_ref() {
            if operation == &info.operation {
                return pb.clone();
            }
            pb.finish_and_clear();
        }

        let pb = ProgressBar::new(info.total as u64);
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_prefix(info.operation.clone());
        *slot = Some((info.operation.clone(), pb.clone()));
        pb
    }

    fn finish(&self) {
        if let Some((_, pb)) = self.lock().take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn report_progress(&self, info: &ProgressInfo) {
        let pb = self.bar_for(info);
        pb.set_position(info.current as u64);
        if let Some(extra) = &info.extra {
            pb.set_message(extra.clone());
        }
    }

    fn report_error(&self, message: &str) {
        self.finish();
        eprintln!("{}", message);
    }

    fn report_completion(&self, message: &str) {
        self.finish();
        eprintln!();
        eprintln!("{}", message);
    }
}
