//! Configuration module for Accent Coach.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each external
//! service, `AppPaths` for cross-platform config directories, and TOML
//! persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AnalysisConfig, AppConfig, FeedbackConfig, SynthesisConfig};
