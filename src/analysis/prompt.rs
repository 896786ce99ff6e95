//! Instruction builder for the remote accent grader.
//!
//! [`InstructionBuilder::build`] is a pure function of its inputs: the same
//! mode, level and target always yield byte-identical instruction text. The
//! builder never inspects audio — it only composes the text the remote
//! model grades against.
//!
//! Structure (in order):
//! 1. Coaching persona + tuned-ear habit list (all modes)
//! 2. Lesson context (level focus, drill name when present)
//! 3. Mode-specific grading section

use thiserror::Error;

use crate::catalog::LessonLevel;

// ---------------------------------------------------------------------------
// Rubric text
// ---------------------------------------------------------------------------

/// Persona and the habit list the grader's ear is tuned for.
const BASE_RUBRIC: &str = "\
You are an elite dialect coach training executives to speak with a \
sophisticated British (RP) accent.

YOUR EAR IS TUNED FOR THESE SPECIFIC HABITS:
1. **Retroflex Consonants:** Check whether T's and D's sound curled back. \
British T's must be crisp, with the tongue at the gum ridge.
2. **W/V Merger:** Check whether W and V are mixed up (\"vater\" for \
\"water\").
3. **Syllable Timing:** Staccato, machine-gun pacing is a fail. British \
English is stress-timed — rhythmic and slower.
4. **Rhoticity:** RP is non-rhotic; a pronounced R at the end of a word \
(\"carrr\") must be called out.";

/// Baseline diagnostic: 0-10 table plus one quick fix.
const BASELINE_SECTION: &str = "\
Analyze this diagnostic recording.
Output a Markdown table scoring the speaker (0-10) on:
1. **Vowel Roundness** (are the O's round?)
2. **Consonant Crispness** (are T's and D's soft or hard?)
3. **Rhythm** (too fast or staccato?)
4. **Intonation** (flat or melodic?)

Then give ONE major Quick Fix that will immediately make the speaker \
sound more executive.";

/// Free speech: gravitas critique, no script to compare against.
const FREE_SECTION: &str = "\
Analyze this free-form speech for executive gravitas. Ignore minor \
grammar. Focus on:
1. **Pace:** Is the speaker rushing?
2. **Fillers:** Listen for \"uh\", \"basically\", \"you know\".
3. **Tone:** Authoritative or pleading?

Give a Score (0-100), then rewrite the speaker's last sentence to be more \
concise and powerful.";

// ---------------------------------------------------------------------------
// CoachingMode
// ---------------------------------------------------------------------------

/// Which grading contract the instruction asks the remote model to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachingMode {
    /// Diagnostic read of the fixed trap passage; 0-10 table output.
    Baseline,
    /// Scripted phrase attempt; compared against the embedded target.
    Drill,
    /// Free speech; graded on pace, fillers and tone.
    Free,
}

impl CoachingMode {
    /// Short label for logs and the CLI.
    pub fn label(&self) -> &'static str {
        match self {
            CoachingMode::Baseline => "baseline",
            CoachingMode::Drill => "drill",
            CoachingMode::Free => "free",
        }
    }
}

// ---------------------------------------------------------------------------
// PromptError
// ---------------------------------------------------------------------------

/// Caller contract violations when building an instruction.
#[derive(Debug, Error, PartialEq)]
pub enum PromptError {
    /// Drill mode needs a target phrase to compare against.
    #[error("drill mode requires a target phrase")]
    MissingTarget,
}

// ---------------------------------------------------------------------------
// InstructionBuilder
// ---------------------------------------------------------------------------

/// Builds grading instructions for the remote analysis model.
///
/// # Example
/// ```rust
/// use accent_coach::analysis::{CoachingMode, InstructionBuilder};
/// use accent_coach::catalog::Catalog;
///
/// let catalog = Catalog::builtin();
/// let level = catalog.level("Week 1: The Foundation").unwrap();
///
/// let instruction = InstructionBuilder::new()
///     .build(
///         CoachingMode::Drill,
///         level,
///         Some("Drill A: The Crisp T"),
///         Some("Target the total market effectively."),
///     )
///     .unwrap();
/// assert!(instruction.contains("Target the total market effectively."));
/// ```
pub struct InstructionBuilder;

impl InstructionBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Compose the full instruction text for one analysis request.
    ///
    /// `target` is required in [`CoachingMode::Drill`] and ignored in the
    /// other modes; the drill target phrase appears in the output exactly
    /// once.
    pub fn build(
        &self,
        mode: CoachingMode,
        level: &LessonLevel,
        drill_name: Option<&str>,
        target: Option<&str>,
    ) -> Result<String, PromptError> {
        let mut out = String::with_capacity(2048);
        out.push_str(BASE_RUBRIC);

        out.push_str("\n\nLesson focus: ");
        out.push_str(&level.focus);
        if let Some(name) = drill_name {
            out.push_str("\nDrill: ");
            out.push_str(name);
        }
        out.push_str("\n\n");

        match mode {
            CoachingMode::Baseline => out.push_str(BASELINE_SECTION),
            CoachingMode::Free => out.push_str(FREE_SECTION),
            CoachingMode::Drill => {
                let target = target.ok_or(PromptError::MissingTarget)?;
                out.push_str(&format!(
                    "The user is attempting this phrase: \"{target}\"\n\
                     Compare their audio to the target British RP ideal.\n\n\
                     DID THEY FAIL?\n\
                     - A rolled R in a word where it should be silent: say so.\n\
                     - A hard, curled-back T: say so.\n\
                     - Rushed delivery: tell them to slow down.\n\n\
                     Give a Score (0-100) and strict feedback."
                ));
            }
        }

        Ok(out)
    }
}

impl Default for InstructionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn week_one() -> LessonLevel {
        Catalog::builtin()
            .level("Week 1: The Foundation")
            .unwrap()
            .clone()
    }

    #[test]
    fn drill_instruction_embeds_target_exactly_once() {
        let target = "Target the total market effectively.";
        let instruction = InstructionBuilder::new()
            .build(
                CoachingMode::Drill,
                &week_one(),
                Some("Drill A: The Crisp T"),
                Some(target),
            )
            .unwrap();

        assert_eq!(
            instruction.matches(target).count(),
            1,
            "target phrase must appear exactly once"
        );
    }

    #[test]
    fn drill_instruction_carries_score_and_rubric_headers() {
        let instruction = InstructionBuilder::new()
            .build(
                CoachingMode::Drill,
                &week_one(),
                Some("Drill A: The Crisp T"),
                Some("Target the total market effectively."),
            )
            .unwrap();

        assert!(instruction.contains("Score"));
        assert!(instruction.contains("Retroflex Consonants"));
        assert!(instruction.contains("W/V Merger"));
        assert!(instruction.contains("Syllable Timing"));
        assert!(instruction.contains("Rhoticity"));
        assert!(instruction.contains("Drill A: The Crisp T"));
    }

    #[test]
    fn build_is_deterministic() {
        let builder = InstructionBuilder::new();
        let level = week_one();
        let a = builder
            .build(
                CoachingMode::Drill,
                &level,
                Some("Drill A: The Crisp T"),
                Some("Target the total market effectively."),
            )
            .unwrap();
        let b = builder
            .build(
                CoachingMode::Drill,
                &level,
                Some("Drill A: The Crisp T"),
                Some("Target the total market effectively."),
            )
            .unwrap();
        assert_eq!(a, b, "identical inputs must yield byte-identical output");
    }

    #[test]
    fn drill_without_target_fails() {
        let err = InstructionBuilder::new()
            .build(CoachingMode::Drill, &week_one(), Some("Drill A"), None)
            .unwrap_err();
        assert_eq!(err, PromptError::MissingTarget);
    }

    #[test]
    fn baseline_needs_no_target() {
        let instruction = InstructionBuilder::new()
            .build(CoachingMode::Baseline, &week_one(), None, None)
            .unwrap();
        assert!(instruction.contains("diagnostic recording"));
        assert!(instruction.contains("Vowel Roundness"));
        assert!(!instruction.contains("attempting this phrase"));
    }

    #[test]
    fn free_mode_grades_gravitas() {
        let instruction = InstructionBuilder::new()
            .build(CoachingMode::Free, &week_one(), None, None)
            .unwrap();
        assert!(instruction.contains("executive gravitas"));
        assert!(instruction.contains("Fillers"));
        assert!(!instruction.contains("attempting this phrase"));
    }

    #[test]
    fn every_mode_carries_the_lesson_focus() {
        let level = week_one();
        for mode in [CoachingMode::Baseline, CoachingMode::Drill, CoachingMode::Free] {
            let target = (mode == CoachingMode::Drill).then_some("x");
            let instruction = InstructionBuilder::new()
                .build(mode, &level, None, target)
                .unwrap();
            assert!(
                instruction.contains(&level.focus),
                "{} instruction must carry the lesson focus",
                mode.label()
            );
        }
    }

    #[test]
    fn mode_labels() {
        assert_eq!(CoachingMode::Baseline.label(), "baseline");
        assert_eq!(CoachingMode::Drill.label(), "drill");
        assert_eq!(CoachingMode::Free.label(), "free");
    }
}
