//! Speech synthesis — reference and feedback audio.
//!
//! * [`SpeechSynthesizer`] — async trait implemented by all backends.
//! * [`HttpSynthesizer`] — OpenAI-compatible `/v1/audio/speech` adapter.
//! * [`AccentRegion`] — locale tag selecting the reference accent.
//! * [`SynthesisError`] — typed failure surfaced to the session; callers
//!   treat every variant as non-fatal.

pub mod adapter;

pub use adapter::{AccentRegion, HttpSynthesizer, SpeechSynthesizer, SynthesisError};
