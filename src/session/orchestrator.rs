//! Session orchestrator — drives record → analyze → display, plus the
//! reference-audio side path and spoken feedback.
//!
//! [`SessionOrchestrator`] owns the [`SharedSession`] and responds to
//! [`SessionCommand`]s received over a `tokio::sync::mpsc` channel,
//! emitting [`SessionEvent`]s the host renders.
//!
//! # Flow
//!
//! ```text
//! StartRecording ──▶ FinishRecording(clip) ──▶ Analyze { mode, drill }
//!   └─▶ [Recording]      └─▶ [Captured]           └─▶ build instruction,
//!                                                     spawn remote call
//!                                                     [Analyzing]
//!                              ┌─ Ok  ──▶ [ResultReady] + AnalysisReady
//!                              └─ Err ──▶ [ResultReady] + displayable error
//!
//! RequestReference(drill) ──▶ spawn synthesis [Synthesizing]
//!                              ┌─ Ok  ──▶ [ReferenceReady] + clip
//!                              └─ Err ──▶ [Idle] + displayable error
//!                              (a held capture returns to [Captured])
//! ```
//!
//! Three rules the spawned calls obey:
//! * **Single flight** — a second analyze while one is outstanding is
//!   rejected, and analysis starts only from a held capture; the two
//!   synthesis actions never overlap an analysis result.
//! * **Generation fencing** — `SelectLevel` bumps the session generation
//!   and aborts outstanding tasks, so a stale outcome is never published
//!   into the new level's view.
//! * **Phase fencing** — a spawned completion writes the phase only while
//!   the session is still in the phase that completion belongs to.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::analysis::{AccentAnalyzer, CoachingMode, InstructionBuilder};
use crate::audio::AudioClip;
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::synth::{AccentRegion, SpeechSynthesizer};

use super::state::{SessionPhase, SharedSession};

// ---------------------------------------------------------------------------
// Commands and events
// ---------------------------------------------------------------------------

/// Commands sent from the host to the orchestrator.
#[derive(Debug)]
pub enum SessionCommand {
    /// Switch to another lesson level; discards in-flight work.
    SelectLevel(String),
    /// Provide or replace the in-memory API credential.
    SetCredential(String),
    /// The host started capturing audio.
    StartRecording,
    /// The host finished capturing; `clip` is the recorded attempt.
    FinishRecording(AudioClip),
    /// Synthesize reference audio for a drill of the current level.
    RequestReference { drill: String },
    /// Send the captured attempt for remote analysis.
    Analyze {
        mode: CoachingMode,
        drill: Option<String>,
    },
    /// Re-speak a truncated excerpt of the current critique.
    SpeakFeedback,
}

/// Events delivered from the orchestrator to the host.
#[derive(Debug)]
pub enum SessionEvent {
    /// The level switch took effect; the session is idle at the new level.
    LevelSelected(String),
    /// Recording has started.
    RecordingStarted,
    /// An attempt of `bytes` encoded bytes is held, awaiting analysis.
    Captured { bytes: usize },
    /// The remote analysis call is in flight.
    AnalysisStarted,
    /// The critique text, verbatim.
    AnalysisReady(String),
    /// Reference audio for the requested drill, ready for playback.
    ReferenceReady(AudioClip),
    /// Spoken-feedback audio, ready for playback.
    FeedbackAudioReady(AudioClip),
    /// A user-visible, non-fatal error message.
    Error(String),
}

// ---------------------------------------------------------------------------
// SessionOrchestrator
// ---------------------------------------------------------------------------

/// Drives one coaching session.
///
/// Create with [`SessionOrchestrator::new`], then call
/// [`run`](Self::run) inside a tokio task.
pub struct SessionOrchestrator {
    state: SharedSession,
    catalog: Arc<Catalog>,
    synth: Arc<dyn SpeechSynthesizer>,
    analyzer: Arc<dyn AccentAnalyzer>,
    builder: InstructionBuilder,
    accent: AccentRegion,
    speak_limit: usize,
    event_tx: mpsc::Sender<SessionEvent>,
    analysis_task: Option<JoinHandle<()>>,
    synth_task: Option<JoinHandle<()>>,
}

impl SessionOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    /// * `state`    — shared session state (also read by the host).
    /// * `catalog`  — the static curriculum, shared across sessions.
    /// * `synth`    — synthesis backend (e.g. `HttpSynthesizer`).
    /// * `analyzer` — analysis backend (e.g. `GeminiAnalyzer`).
    /// * `config`   — accent tag and feedback excerpt limit.
    /// * `event_tx` — channel the host listens on.
    pub fn new(
        state: SharedSession,
        catalog: Arc<Catalog>,
        synth: Arc<dyn SpeechSynthesizer>,
        analyzer: Arc<dyn AccentAnalyzer>,
        config: &AppConfig,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            state,
            catalog,
            synth,
            analyzer,
            builder: InstructionBuilder::new(),
            accent: AccentRegion::from_tag(&config.synthesis.accent),
            speak_limit: config.feedback.speak_limit_chars,
            event_tx,
            analysis_task: None,
            synth_task: None,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the orchestrator until `command_rx` is closed.
    ///
    /// Spawn as a tokio task from the host. Outstanding external calls are
    /// awaited before returning so shutdown never leaks a task.
    pub async fn run(mut self, mut command_rx: mpsc::Receiver<SessionCommand>) {
        while let Some(command) = command_rx.recv().await {
            match command {
                SessionCommand::SelectLevel(id) => self.handle_select_level(id).await,
                SessionCommand::SetCredential(credential) => {
                    log::debug!("session: credential updated");
                    self.state.lock().unwrap().credential = credential;
                }
                SessionCommand::StartRecording => self.handle_start_recording().await,
                SessionCommand::FinishRecording(clip) => {
                    self.handle_finish_recording(clip).await
                }
                SessionCommand::RequestReference { drill } => {
                    self.handle_request_reference(drill).await
                }
                SessionCommand::Analyze { mode, drill } => {
                    self.handle_analyze(mode, drill).await
                }
                SessionCommand::SpeakFeedback => self.handle_speak_feedback().await,
            }
        }

        if let Some(handle) = self.analysis_task.take() {
            let _ = handle.await;
        }
        if let Some(handle) = self.synth_task.take() {
            let _ = handle.await;
        }
        log::info!("session: command channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    /// Switch levels: validate, fence out in-flight work, reset to Idle.
    async fn handle_select_level(&mut self, id: String) {
        if let Err(e) = self.catalog.level(&id) {
            self.emit_error(e.to_string()).await;
            return;
        }

        // Abort outstanding external calls; the generation bump below
        // fences out any outcome that still manages to complete.
        if let Some(handle) = self.analysis_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.synth_task.take() {
            handle.abort();
        }

        {
            let mut st = self.state.lock().unwrap();
            st.generation += 1;
            st.phase = SessionPhase::Idle;
            st.level_id = id.clone();
            st.captured = None;
            st.result = None;
            st.error_message = None;
        }

        log::debug!("session: level selected: {id}");
        self.emit(SessionEvent::LevelSelected(id)).await;
    }

    /// Enter Recording, discarding any previous capture and result.
    async fn handle_start_recording(&mut self) {
        let busy = {
            let mut st = self.state.lock().unwrap();
            if st.phase.is_busy() {
                true
            } else {
                st.phase = SessionPhase::Recording;
                st.captured = None;
                st.result = None;
                st.error_message = None;
                false
            }
        };

        if busy {
            self.emit_error("cannot record while a call is in flight".into())
                .await;
        } else {
            self.emit(SessionEvent::RecordingStarted).await;
        }
    }

    /// Hold the captured attempt; analysis waits for an explicit action.
    async fn handle_finish_recording(&mut self, clip: AudioClip) {
        enum Outcome {
            NotRecording,
            Empty,
            Held(usize),
        }

        let outcome = {
            let mut st = self.state.lock().unwrap();
            if st.phase != SessionPhase::Recording {
                Outcome::NotRecording
            } else if clip.is_empty() {
                st.phase = SessionPhase::Idle;
                st.error_message = Some("recording was empty".into());
                Outcome::Empty
            } else {
                let bytes = clip.len();
                st.captured = Some(clip);
                st.phase = SessionPhase::Captured;
                Outcome::Held(bytes)
            }
        };

        match outcome {
            Outcome::NotRecording => {
                self.emit_error("no recording in progress".into()).await;
            }
            Outcome::Empty => {
                self.emit_error("recording was empty".into()).await;
            }
            Outcome::Held(bytes) => {
                log::debug!("session: captured {bytes} bytes");
                self.emit(SessionEvent::Captured { bytes }).await;
            }
        }
    }

    /// Side path: synthesize the drill's display text as reference audio.
    async fn handle_request_reference(&mut self, drill: String) {
        let (level_id, gen, blocked) = {
            let st = self.state.lock().unwrap();
            let blocked = st.phase.is_busy() || st.phase == SessionPhase::Recording;
            (st.level_id.clone(), st.generation, blocked)
        };

        if blocked {
            self.emit_error("cannot fetch reference audio right now".into())
                .await;
            return;
        }

        let text = match self
            .catalog
            .level(&level_id)
            .and_then(|level| level.drill(&drill))
        {
            Ok(d) => d.target.display_text().to_string(),
            Err(e) => {
                self.emit_error(e.to_string()).await;
                return;
            }
        };

        self.state.lock().unwrap().phase = SessionPhase::Synthesizing;

        let synth = Arc::clone(&self.synth);
        let state = Arc::clone(&self.state);
        let tx = self.event_tx.clone();
        let accent = self.accent;

        let handle = tokio::spawn(async move {
            let outcome = synth.synthesize(&text, accent).await;

            let event = {
                let mut st = state.lock().unwrap();
                if st.generation != gen || st.phase != SessionPhase::Synthesizing {
                    log::debug!("session: dropping stale reference audio");
                    return;
                }
                // A capture held across the side trip stays analyzable
                // and a displayed critique stays speakable; only an
                // otherwise-empty session lands on the reference phase.
                match outcome {
                    Ok(clip) => {
                        st.phase = if st.captured.is_some() {
                            SessionPhase::Captured
                        } else if st.result.is_some() {
                            SessionPhase::ResultReady
                        } else {
                            SessionPhase::ReferenceReady
                        };
                        SessionEvent::ReferenceReady(clip)
                    }
                    Err(e) => {
                        // Non-fatal: the session continues with no audio.
                        log::warn!("session: reference synthesis failed: {e}");
                        st.phase = if st.captured.is_some() {
                            SessionPhase::Captured
                        } else if st.result.is_some() {
                            SessionPhase::ResultReady
                        } else {
                            SessionPhase::Idle
                        };
                        st.error_message = Some(e.to_string());
                        SessionEvent::Error(e.to_string())
                    }
                }
            };
            let _ = tx.send(event).await;
        });
        self.synth_task = Some(handle);
    }

    /// Main path: build the instruction and spawn the remote analysis.
    async fn handle_analyze(&mut self, mode: CoachingMode, drill: Option<String>) {
        enum Taken {
            InFlight,
            SynthBusy,
            NothingCaptured,
            Clip(AudioClip, String, String, u64),
        }

        // Analysis starts from a held capture and from no other phase.
        let taken = {
            let mut st = self.state.lock().unwrap();
            match st.phase {
                SessionPhase::Analyzing => Taken::InFlight,
                SessionPhase::Synthesizing => Taken::SynthBusy,
                SessionPhase::Captured => match st.captured.take() {
                    // Single consumer: the clip is moved out and never
                    // reused.
                    Some(clip) => Taken::Clip(
                        clip,
                        st.level_id.clone(),
                        st.credential.clone(),
                        st.generation,
                    ),
                    None => Taken::NothingCaptured,
                },
                _ => Taken::NothingCaptured,
            }
        };

        let (clip, level_id, credential, gen) = match taken {
            Taken::InFlight => {
                self.emit_error("an analysis is already in flight".into())
                    .await;
                return;
            }
            Taken::SynthBusy => {
                self.emit_error(
                    "cannot analyze while reference audio is being fetched".into(),
                )
                .await;
                return;
            }
            Taken::NothingCaptured => {
                self.emit_error("nothing captured to analyze".into()).await;
                return;
            }
            Taken::Clip(clip, level_id, credential, gen) => (clip, level_id, credential, gen),
        };

        // level_id is always a valid catalog id once selected.
        let level = match self.catalog.level(&level_id) {
            Ok(l) => l.clone(),
            Err(e) => {
                self.fail_to_result_ready(e.to_string()).await;
                return;
            }
        };

        let (drill_name, target) = match &drill {
            Some(name) => match level.drill(name) {
                Ok(d) => (
                    Some(d.name.clone()),
                    d.target.phrase().map(str::to_string),
                ),
                Err(e) => {
                    // The clip was not sent anywhere; put it back. The
                    // guard must close before the await below.
                    {
                        let mut st = self.state.lock().unwrap();
                        st.captured = Some(clip);
                        st.phase = SessionPhase::Captured;
                    }
                    self.emit_error(e.to_string()).await;
                    return;
                }
            },
            None => (None, None),
        };

        let instruction = match self.builder.build(
            mode,
            &level,
            drill_name.as_deref(),
            target.as_deref(),
        ) {
            Ok(i) => i,
            Err(e) => {
                self.fail_to_result_ready(e.to_string()).await;
                return;
            }
        };

        {
            let mut st = self.state.lock().unwrap();
            st.phase = SessionPhase::Analyzing;
            st.error_message = None;
        }
        log::debug!("session: analyzing ({} mode)", mode.label());
        self.emit(SessionEvent::AnalysisStarted).await;

        let analyzer = Arc::clone(&self.analyzer);
        let state = Arc::clone(&self.state);
        let tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            let outcome = analyzer.analyze(&credential, &clip, &instruction).await;

            let event = {
                let mut st = state.lock().unwrap();
                if st.generation != gen || st.phase != SessionPhase::Analyzing {
                    log::debug!("session: dropping stale analysis outcome");
                    return;
                }
                st.phase = SessionPhase::ResultReady;
                match outcome {
                    Ok(report) => {
                        let text = report.text().to_string();
                        st.result = Some(report);
                        st.error_message = None;
                        SessionEvent::AnalysisReady(text)
                    }
                    Err(e) => {
                        // Terminal but displayable — never silently dropped.
                        log::warn!("session: analysis failed: {e}");
                        st.result = None;
                        st.error_message = Some(e.to_string());
                        SessionEvent::Error(e.to_string())
                    }
                }
            };
            let _ = tx.send(event).await;
        });
        self.analysis_task = Some(handle);
    }

    /// Re-speak a bounded excerpt of the critique. Failure here must not
    /// disturb the displayed result.
    async fn handle_speak_feedback(&mut self) {
        let excerpt = {
            let st = self.state.lock().unwrap();
            match (&st.phase, &st.result) {
                (SessionPhase::ResultReady, Some(report)) => Some((
                    report.spoken_excerpt(self.speak_limit).to_string(),
                    st.generation,
                )),
                _ => None,
            }
        };

        let (excerpt, gen) = match excerpt {
            Some(pair) => pair,
            None => {
                self.emit_error("no critique to speak".into()).await;
                return;
            }
        };

        let synth = Arc::clone(&self.synth);
        let state = Arc::clone(&self.state);
        let tx = self.event_tx.clone();
        let accent = self.accent;

        let handle = tokio::spawn(async move {
            let outcome = synth.synthesize(&excerpt, accent).await;

            let event = {
                let st = state.lock().unwrap();
                if st.generation != gen {
                    return;
                }
                // Phase and result stay untouched either way.
                match outcome {
                    Ok(clip) => SessionEvent::FeedbackAudioReady(clip),
                    Err(e) => {
                        log::warn!("session: feedback synthesis failed: {e}");
                        SessionEvent::Error(format!("spoken feedback failed: {e}"))
                    }
                }
            };
            let _ = tx.send(event).await;
        });
        self.synth_task = Some(handle);
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event).await;
    }

    async fn emit_error(&self, message: String) {
        log::warn!("session: {message}");
        self.emit(SessionEvent::Error(message)).await;
    }

    /// Record a displayable failure as the session's visible result.
    async fn fail_to_result_ready(&self, message: String) {
        {
            let mut st = self.state.lock().unwrap();
            st.phase = SessionPhase::ResultReady;
            st.result = None;
            st.error_message = Some(message.clone());
        }
        self.emit_error(message).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
