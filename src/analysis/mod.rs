//! Accent analysis — instruction building and the remote multimodal client.
//!
//! This module provides:
//! * [`CoachingMode`] — baseline diagnostic, scripted drill, or free speech.
//! * [`InstructionBuilder`] — composes the grading instruction text.
//! * [`AccentAnalyzer`] — async trait implemented by analysis backends.
//! * [`GeminiAnalyzer`] — hosted multimodal model client (audio + text in,
//!   free-form critique out).
//! * [`AnalysisReport`] — the opaque critique text, with length-bounded
//!   excerpt extraction for spoken feedback.
//! * [`AnalysisError`] / [`PromptError`] — typed failures.
//!
//! The critique's correctness is entirely the remote model's business; the
//! crate never parses the report beyond excerpting it for re-speech.

pub mod client;
pub mod prompt;
pub mod report;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{AccentAnalyzer, AnalysisError, GeminiAnalyzer};
pub use prompt::{CoachingMode, InstructionBuilder, PromptError};
pub use report::AnalysisReport;
