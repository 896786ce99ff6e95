//! Command-line host for Accent Coach.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the synthesis and analysis adapters from config.
//! 4. Spawn the session orchestrator and drive it over its channels.
//!
//! The credential comes from the `GEMINI_API_KEY` environment variable and
//! is handed to the session in memory only.
//!
//! # Usage
//!
//! ```text
//! accent-coach levels
//! accent-coach reference <level-id> <drill-name>
//! accent-coach coach <level-id> <audio.wav> [--drill <name>]
//!                                           [--mode baseline|drill|free]
//!                                           [--speak]
//! ```

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;

use accent_coach::{
    analysis::{AccentAnalyzer, CoachingMode, GeminiAnalyzer},
    audio::{AudioClip, TempClipFile},
    catalog::{Catalog, DIAGNOSTIC_PASSAGE},
    config::AppConfig,
    session::{new_shared_session, SessionCommand, SessionEvent, SessionOrchestrator},
    synth::{HttpSynthesizer, SpeechSynthesizer},
};

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

enum Invocation {
    Levels,
    Reference {
        level: String,
        drill: String,
    },
    Coach {
        level: String,
        audio_path: String,
        drill: Option<String>,
        mode: CoachingMode,
        speak: bool,
    },
}

fn usage() -> ! {
    eprintln!(
        "usage:\n  \
         accent-coach levels\n  \
         accent-coach reference <level-id> <drill-name>\n  \
         accent-coach coach <level-id> <audio.wav> [--drill <name>] \
         [--mode baseline|drill|free] [--speak]"
    );
    std::process::exit(2);
}

fn parse_mode(s: &str) -> Option<CoachingMode> {
    match s {
        "baseline" => Some(CoachingMode::Baseline),
        "drill" => Some(CoachingMode::Drill),
        "free" => Some(CoachingMode::Free),
        _ => None,
    }
}

fn parse_args() -> Invocation {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("levels") => Invocation::Levels,
        Some("reference") if args.len() == 3 => Invocation::Reference {
            level: args[1].clone(),
            drill: args[2].clone(),
        },
        Some("coach") if args.len() >= 3 => {
            let mut drill = None;
            let mut mode = None;
            let mut speak = false;

            let mut rest = args[3..].iter();
            while let Some(flag) = rest.next() {
                match flag.as_str() {
                    "--drill" => drill = rest.next().cloned().or_else(|| usage()),
                    "--mode" => {
                        mode = rest
                            .next()
                            .and_then(|m| parse_mode(m))
                            .or_else(|| usage())
                    }
                    "--speak" => speak = true,
                    _ => usage(),
                }
            }

            // A named drill implies drill mode unless told otherwise.
            let mode = mode.unwrap_or(if drill.is_some() {
                CoachingMode::Drill
            } else {
                CoachingMode::Baseline
            });

            Invocation::Coach {
                level: args[1].clone(),
                audio_path: args[2].clone(),
                drill,
                mode,
                speak,
            }
        }
        _ => usage(),
    }
}

// ---------------------------------------------------------------------------
// Session plumbing
// ---------------------------------------------------------------------------

struct Session {
    cmd_tx: mpsc::Sender<SessionCommand>,
    evt_rx: mpsc::Receiver<SessionEvent>,
}

fn start_session(config: &AppConfig, catalog: Arc<Catalog>) -> Result<Session> {
    let synth: Arc<dyn SpeechSynthesizer> = Arc::new(
        HttpSynthesizer::from_config(&config.synthesis)
            .context("building synthesis client")?,
    );
    let analyzer: Arc<dyn AccentAnalyzer> = Arc::new(
        GeminiAnalyzer::from_config(&config.analysis)
            .context("building analysis client")?,
    );

    let state = new_shared_session(catalog.first_level().id.clone());

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (evt_tx, evt_rx) = mpsc::channel(32);

    let orchestrator =
        SessionOrchestrator::new(state, catalog, synth, analyzer, config, evt_tx);
    tokio::spawn(orchestrator.run(cmd_rx));

    Ok(Session { cmd_tx, evt_rx })
}

async fn expect_event<F>(session: &mut Session, mut pred: F) -> Result<SessionEvent>
where
    F: FnMut(&SessionEvent) -> bool,
{
    while let Some(event) = session.evt_rx.recv().await {
        if pred(&event) {
            return Ok(event);
        }
        if let SessionEvent::Error(msg) = event {
            bail!("{msg}");
        }
    }
    bail!("session closed unexpectedly");
}

/// Write the clip to a temp file and hold it open until the user is done
/// listening; the file is deleted when this returns.
fn hand_off_for_playback(clip: &AudioClip) -> Result<()> {
    let tmp = TempClipFile::write(clip).context("writing playback file")?;
    println!("audio ready: {}", tmp.path().display());
    println!("press Enter when done (the file is deleted on exit)");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok();
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn render_levels(catalog: &Catalog) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Baseline passage (read aloud for the baseline recording):");
    let _ = writeln!(out, "  {DIAGNOSTIC_PASSAGE}");
    for level in catalog.levels() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", level.id);
        let _ = writeln!(out, "  focus: {}", level.focus);
        let _ = writeln!(out, "  {}", level.intro);
        for drill in &level.drills {
            let _ = writeln!(
                out,
                "  - {} — {}",
                drill.name,
                drill.target.display_text()
            );
        }
    }
    out
}

fn run_levels(catalog: &Catalog) {
    print!("{}", render_levels(catalog));
}

async fn run_reference(
    config: &AppConfig,
    catalog: Arc<Catalog>,
    level: String,
    drill: String,
) -> Result<()> {
    let mut session = start_session(config, catalog)?;

    session
        .cmd_tx
        .send(SessionCommand::SelectLevel(level))
        .await?;
    expect_event(&mut session, |e| matches!(e, SessionEvent::LevelSelected(_))).await?;

    session
        .cmd_tx
        .send(SessionCommand::RequestReference { drill })
        .await?;
    let event =
        expect_event(&mut session, |e| matches!(e, SessionEvent::ReferenceReady(_))).await?;

    if let SessionEvent::ReferenceReady(clip) = event {
        hand_off_for_playback(&clip)?;
    }
    Ok(())
}

async fn run_coach(
    config: &AppConfig,
    catalog: Arc<Catalog>,
    level: String,
    audio_path: String,
    drill: Option<String>,
    mode: CoachingMode,
    speak: bool,
) -> Result<()> {
    let credential = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let bytes = std::fs::read(&audio_path)
        .with_context(|| format!("reading recording {audio_path}"))?;

    let mut session = start_session(config, catalog)?;

    session
        .cmd_tx
        .send(SessionCommand::SelectLevel(level))
        .await?;
    expect_event(&mut session, |e| matches!(e, SessionEvent::LevelSelected(_))).await?;

    session
        .cmd_tx
        .send(SessionCommand::SetCredential(credential))
        .await?;
    session.cmd_tx.send(SessionCommand::StartRecording).await?;
    session
        .cmd_tx
        .send(SessionCommand::FinishRecording(AudioClip::captured_wav(
            bytes,
        )))
        .await?;
    expect_event(&mut session, |e| matches!(e, SessionEvent::Captured { .. })).await?;

    session
        .cmd_tx
        .send(SessionCommand::Analyze { mode, drill })
        .await?;
    let event =
        expect_event(&mut session, |e| matches!(e, SessionEvent::AnalysisReady(_))).await?;

    if let SessionEvent::AnalysisReady(critique) = &event {
        println!("{critique}");
    }

    if speak {
        session.cmd_tx.send(SessionCommand::SpeakFeedback).await?;
        match expect_event(&mut session, |e| {
            matches!(e, SessionEvent::FeedbackAudioReady(_))
        })
        .await
        {
            Ok(SessionEvent::FeedbackAudioReady(clip)) => hand_off_for_playback(&clip)?,
            Ok(_) => {}
            // The critique is already printed; spoken feedback is optional.
            Err(e) => log::warn!("spoken feedback unavailable: {e}"),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let invocation = parse_args();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let catalog = Arc::new(Catalog::builtin());

    match invocation {
        Invocation::Levels => {
            run_levels(&catalog);
            Ok(())
        }
        Invocation::Reference { level, drill } => {
            run_reference(&config, catalog, level, drill).await
        }
        Invocation::Coach {
            level,
            audio_path,
            drill,
            mode,
            speak,
        } => run_coach(&config, catalog, level, audio_path, drill, mode, speak).await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// The user performs the baseline read from this output, so the
    /// passage and each level's intro must both appear.
    #[test]
    fn levels_output_shows_passage_and_intros() {
        let catalog = Catalog::builtin();
        let out = render_levels(&catalog);

        assert!(out.contains(DIAGNOSTIC_PASSAGE));
        for level in catalog.levels() {
            assert!(out.contains(&level.id), "missing level {}", level.id);
            assert!(out.contains(&level.intro), "missing intro for {}", level.id);
        }
        assert!(out.contains("Target the total market effectively."));
    }
}
