pub mod models;
pub mod config;
pub mod inspector;

// ========================================
// ANALYSIS
// ========================================

/// Selector probing, language detection, style and layout scoring
pub mod analysis;

/// Console, JSON and CI gate output
pub mod reporting;

pub use analysis::{AnalysisError, AnalysisOutcome, ConsistencyAnalyzer};
pub use config::{AnalysisProfile, ConfigError};
pub use inspector::{InspectionError, PageInspector};
pub use models::{Finding, FindingKind, LanguageState, Severity};
