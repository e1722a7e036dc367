//! Batch contract analysis over a shared content-addressed cache.
//!
//! Builds on `ilcontract-extract` and `ilcontract-storage`: each method is
//! looked up by fingerprint first and only extracted on a miss. Assemblies
//! are analyzed in parallel, one rayon task per method.
//!
//! The library never installs a `tracing` subscriber; embedding drivers do.

pub mod analyze;
pub mod config;
pub mod error;
pub mod report;

pub use analyze::{Analyzer, Assembly};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use report::{AssemblyReport, MethodReport, MethodStatus, PipelineDiagnostic, ResultSource};
