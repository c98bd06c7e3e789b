//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod log;
pub mod projection;
pub mod quote;
pub mod record;

// Re-export main types for cleaner imports
pub use cache::QuoteCache;
pub use config::ValuationSettings;
pub use projection::{DerivedMetrics, ProjectionError, Recommendation, YearProjection, project};
pub use quote::{Quote, QuoteProvider};
pub use record::{CompanyProfile, RecordStore, YearlyRecord};
