//! Session state machine and shared session handle.
//!
//! [`SessionPhase`] drives the orchestrator's state machine; the host UI
//! reads it via [`SharedSession`] to render the appropriate view.

use std::sync::{Arc, Mutex};

use crate::analysis::AnalysisReport;
use crate::audio::AudioClip;

// ---------------------------------------------------------------------------
// SessionPhase
// ---------------------------------------------------------------------------

/// Phases of one coaching session.
///
/// The main path and the independent reference side path are:
///
/// ```text
/// Idle ──record──▶ Recording ──stop──▶ Captured ──analyze──▶ Analyzing
///                                                               │
///                                  ResultReady ◀───ok / error───┘
///
/// Idle ──reference──▶ Synthesizing ──ok──▶ ReferenceReady
///                           └──error──▶ Idle (displayable error)
/// ```
///
/// Selecting a different level from any phase resets to `Idle` and
/// discards in-flight work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for user action.
    Idle,

    /// The host is capturing the user's attempt.
    Recording,

    /// A recorded attempt is held, awaiting an explicit analyze action.
    Captured,

    /// The remote analysis call is in flight.
    Analyzing,

    /// A critique (or a displayable error) is being shown.
    ResultReady,

    /// Reference-audio synthesis is in flight (side path).
    Synthesizing,

    /// Reference audio has been handed to the host for playback.
    ReferenceReady,
}

impl SessionPhase {
    /// Returns `true` while an external call is outstanding.
    ///
    /// The host uses this to disable the analyze/reference actions while
    /// one is already running.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionPhase::Analyzing | SessionPhase::Synthesizing)
    }

    /// A short human-readable label for the host's status display.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::Recording => "Recording",
            SessionPhase::Captured => "Captured",
            SessionPhase::Analyzing => "Analyzing",
            SessionPhase::ResultReady => "Result",
            SessionPhase::Synthesizing => "Synthesizing",
            SessionPhase::ReferenceReady => "Reference",
        }
    }
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::Idle
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// One user's in-memory interaction state. Never persisted.
///
/// Held behind [`SharedSession`]; the orchestrator mutates it, the host
/// reads it. The credential lives here (and only here) for the lifetime
/// of the connection.
pub struct SessionState {
    /// Current phase of the session state machine.
    pub phase: SessionPhase,

    /// Id of the currently selected lesson level.
    pub level_id: String,

    /// Caller-supplied API credential. In memory only; never logged.
    pub credential: String,

    /// The captured attempt, held until an explicit analyze action.
    ///
    /// Moved out (single consumer) when analysis starts, discarded on a
    /// level switch.
    pub captured: Option<AudioClip>,

    /// The critique being shown when `phase == ResultReady`.
    pub result: Option<AnalysisReport>,

    /// Displayable error from the most recent failed action.
    pub error_message: Option<String>,

    /// Fencing counter. Bumped on every level switch; a spawned external
    /// call only publishes its outcome when the generation it started
    /// under is still current.
    pub generation: u64,
}

impl SessionState {
    /// Fresh session positioned at `level_id` with no credential.
    pub fn new(level_id: String) -> Self {
        Self {
            phase: SessionPhase::Idle,
            level_id,
            credential: String::new(),
            captured: None,
            result: None,
            error_message: None,
            generation: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// SharedSession
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Cheap to clone. Lock for a short critical section; never hold the lock
/// across an `.await` point.
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedSession`] positioned at `level_id`.
pub fn new_shared_session(level_id: String) -> SharedSession {
    Arc::new(Mutex::new(SessionState::new(level_id)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_external_calls_are_busy() {
        assert!(!SessionPhase::Idle.is_busy());
        assert!(!SessionPhase::Recording.is_busy());
        assert!(!SessionPhase::Captured.is_busy());
        assert!(SessionPhase::Analyzing.is_busy());
        assert!(!SessionPhase::ResultReady.is_busy());
        assert!(SessionPhase::Synthesizing.is_busy());
        assert!(!SessionPhase::ReferenceReady.is_busy());
    }

    #[test]
    fn labels_are_short_and_stable() {
        assert_eq!(SessionPhase::Idle.label(), "Idle");
        assert_eq!(SessionPhase::Analyzing.label(), "Analyzing");
        assert_eq!(SessionPhase::ResultReady.label(), "Result");
        assert_eq!(SessionPhase::ReferenceReady.label(), "Reference");
    }

    #[test]
    fn default_phase_is_idle() {
        assert_eq!(SessionPhase::default(), SessionPhase::Idle);
    }

    #[test]
    fn new_session_is_empty() {
        let state = SessionState::new("Week 1: The Foundation".into());
        assert_eq!(state.phase, SessionPhase::Idle);
        assert_eq!(state.level_id, "Week 1: The Foundation");
        assert!(state.credential.is_empty());
        assert!(state.captured.is_none());
        assert!(state.result.is_none());
        assert!(state.error_message.is_none());
        assert_eq!(state.generation, 0);
    }

    #[test]
    fn shared_session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedSession>();
    }

    #[test]
    fn shared_session_can_be_cloned_and_mutated() {
        let session = new_shared_session("Week 1: The Foundation".into());
        let session2 = Arc::clone(&session);

        session.lock().unwrap().phase = SessionPhase::Recording;
        assert_eq!(session2.lock().unwrap().phase, SessionPhase::Recording);
    }
}
