//! Coaching session — state machine and orchestrator.
//!
//! One session per connected user. The host sends [`SessionCommand`]s over
//! an mpsc channel; the [`SessionOrchestrator`] mutates the shared
//! [`SessionState`] and emits [`SessionEvent`]s. The static catalog is the
//! only state shared between sessions.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{SessionCommand, SessionEvent, SessionOrchestrator};
pub use state::{new_shared_session, SessionPhase, SessionState, SharedSession};
