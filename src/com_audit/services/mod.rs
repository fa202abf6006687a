mod report_builder;
mod risk_aggregator;

pub use report_builder::ReportBuilder;
pub use risk_aggregator::RiskAggregator;
