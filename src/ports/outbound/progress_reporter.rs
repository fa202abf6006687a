/// One progress update for a unit of pipeline work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressInfo {
    /// Human-readable name of the running operation
    pub operation: String,
    /// 1-based index of the unit just started
    pub current: usize,
    pub total: usize,
    /// Unit-specific detail, such as the component id
    pub extra: Option<String>,
}

impl ProgressInfo {
    pub fn new(operation: impl Into<String>, current: usize, total: usize) -> Self {
        Self {
            operation: operation.into(),
            current,
            total,
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Percentage of units started, 0 when there is nothing to do
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 * 100.0 / self.total as f64
        }
    }
}

/// ProgressReporter port for reporting progress during operations
///
/// This port abstracts progress reporting (e.g., to stderr) so the pipeline
/// stages can give feedback without knowing about the terminal.
pub trait ProgressReporter: Send + Sync {
    /// Reports a progress message
    ///
    /// # Arguments
    /// * `message` - The progress message to report
    fn report(&self, message: &str);

    /// Reports progress for one unit of work
    ///
    /// # Arguments
    /// * `info` - Operation name, position and optional detail
    fn report_progress(&self, info: &ProgressInfo);

    /// Reports an error or warning message
    ///
    /// # Arguments
    /// * `message` - The error/warning message
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    ///
    /// # Arguments
    /// * `message` - Completion message
    fn report_completion(&self, message: &str);
}
