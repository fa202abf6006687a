use crate::com_audit::domain::AuditReport;
use crate::shared::Result;

/// ReportFormatter port for rendering a finished audit
///
/// Implementations exist for the human-readable text report and for JSON.
pub trait ReportFormatter {
    /// Formats a report
    ///
    /// # Arguments
    /// * `report` - The complete audit report
    ///
    /// # Returns
    /// Formatted content as a string
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, report: &AuditReport) -> Result<String>;
}
