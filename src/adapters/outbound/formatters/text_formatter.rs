use crate::com_audit::domain::{AuditReport, RiskLevel, SecurityFinding, SecurityInfoResult};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use chrono::DateTime;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// TextFormatter adapter producing the human-readable audit report
///
/// Lists totals, the server-type breakdown and risk counts, followed by every
/// component that has findings. Findings within a component are ordered from
/// the most to the least severe.
pub struct TextFormatter {
    color: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self { color: false }
    }

    /// Enables ANSI colors on risk-level labels
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn risk_label(&self, level: RiskLevel) -> String {
        let label = level.as_str();
        if !self.color {
            return label.to_string();
        }
        match level {
            RiskLevel::Critical => label.red().bold().to_string(),
            RiskLevel::High => label.yellow().bold().to_string(),
            RiskLevel::Medium => label.cyan().to_string(),
            RiskLevel::Low => label.white().to_string(),
        }
    }

    /// Renders an RFC 3339 timestamp as `YYYY-MM-DD HH:MM:SS`, or verbatim if it does not parse
    fn display_time(timestamp: &str) -> String {
        DateTime::parse_from_rfc3339(timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|_| timestamp.to_string())
    }
}

/// Helper methods for rendering sections
impl TextFormatter {
    fn render_header(&self, out: &mut String, report: &AuditReport) -> std::fmt::Result {
        writeln!(out, "COM Security Analysis Report")?;
        writeln!(
            out,
            "Generated: {}",
            Self::display_time(&report.metadata.analysis_time)
        )?;
        writeln!(out, "Run ID: {}", report.metadata.run_id)?;
        writeln!(out)?;
        writeln!(
            out,
            "Machine Default Access Level: {}",
            report.machine.default_access_level
        )?;
        writeln!(out)
    }

    fn render_summary(&self, out: &mut String, report: &AuditReport) -> std::fmt::Result {
        let summary = report.summary();

        writeln!(out, "Total Objects Analyzed: {}", summary.total_objects)?;
        writeln!(
            out,
            "Objects Requiring Elevation: {}",
            summary.elevated_objects
        )?;

        writeln!(out, "\nServer Types:")?;
        for entry in &summary.server_types {
            writeln!(out, "  {}: {}", entry.server_type, entry.count)?;
        }

        if summary.security_risks.is_empty() {
            return writeln!(out, "\nNo security risks found.");
        }

        writeln!(
            out,
            "\nSecurity Risks Found: {} objects",
            summary.risky_objects
        )?;
        for entry in &summary.security_risks {
            writeln!(out, "  {}: {}", self.risk_label(entry.level), entry.count)?;
        }
        Ok(())
    }

    fn render_details(&self, out: &mut String, report: &AuditReport) -> std::fmt::Result {
        let risky: Vec<(&String, &SecurityInfoResult)> = report
            .security
            .iter()
            .filter(|(_, result)| !result.info.risks.is_empty())
            .collect();
        if risky.is_empty() {
            return Ok(());
        }

        writeln!(out, "\nDetailed Security Findings:")?;
        for (id, result) in risky {
            let name = report
                .component(id)
                .map(|c| c.name())
                .unwrap_or(&result.info.object_name);
            writeln!(out, "\nCLSID: {}", id)?;
            writeln!(out, "Name: {}", name)?;
            writeln!(out, "Owner: {}", result.info.owner)?;
            writeln!(out, "Trust Level: {}", result.info.trust_level)?;

            let mut risks: Vec<&SecurityFinding> = result.info.risks.iter().collect();
            risks.sort_by(|a, b| b.level.cmp(&a.level));
            for risk in risks {
                self.render_finding(out, risk)?;
            }
        }
        Ok(())
    }

    fn render_finding(&self, out: &mut String, risk: &SecurityFinding) -> std::fmt::Result {
        writeln!(out, "  Risk Level: {}", self.risk_label(risk.level))?;
        writeln!(out, "  Description: {}", risk.description)?;
        writeln!(out, "  Account: {}", risk.affected_account)?;
        writeln!(out, "  Remediation: {}", risk.remediation)?;
        writeln!(out)
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &AuditReport) -> Result<String> {
        let mut out = String::new();
        self.render_header(&mut out, report)
            .and_then(|_| self.render_summary(&mut out, report))
            .and_then(|_| self.render_details(&mut out, report))
            .map_err(|e| anyhow::anyhow!("Failed to render text report: {}", e))?;
        Ok(out)
    }
}
