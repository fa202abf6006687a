/// Ports module defining interfaces for hexagonal architecture
///
/// The audit core only has driven (outbound) ports: the registry it reads,
/// the progress sink it reports to, and the formatter/presenter pair that
/// turn a finished report into output.
pub mod outbound;
