//! Accent Coach — coaching-session pipeline for a remote accent trainer.
//!
//! The crate wires four small pieces into one interactive session:
//!
//! * [`catalog`] — static lesson levels and drills (the curriculum).
//! * [`synth`] — speech-synthesis adapter for British/American reference
//!   audio.
//! * [`analysis`] — instruction builder plus the remote multimodal
//!   analysis client that grades a recorded attempt.
//! * [`session`] — the orchestrator: record → analyze → display, with an
//!   independent reference-audio side path and optional spoken feedback.
//!
//! The host environment (web UI, desktop shell, CLI) owns audio capture
//! and playback; this crate owns everything between "stop recording" and
//! "show the critique".

pub mod analysis;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod session;
pub mod synth;
