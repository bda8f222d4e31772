//! Core business logic - framework-agnostic classification, sales and reporting.

/// Pure settlement classification of a single sale
pub mod classifier;
/// Farm (tenant) request context
pub mod context;
/// Recent shipping addresses of repeat customers
pub mod delivery;
/// Partner and customer registration and name lookup
pub mod directory;
/// Settlement CSV export
pub mod export;
/// Display formatting helpers
pub mod format;
/// Aggregated settlement reports
pub mod report;
/// Sale creation, settlement and bulk delivery entry
pub mod sales;
