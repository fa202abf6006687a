/// Application layer - pipeline stages, use cases and DTOs
///
/// This layer orchestrates the domain policies and services and talks to
/// infrastructure only through ports.
pub mod analyzers;
pub mod dto;
pub mod factories;
pub mod use_cases;
