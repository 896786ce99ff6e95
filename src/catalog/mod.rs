//! Static lesson catalog — levels, drills and target phrases.
//!
//! The curriculum is fixed at process start and shared read-only across
//! sessions. [`Catalog::builtin`] returns the built-in course; lookups go
//! through [`Catalog::level`] and [`LessonLevel::drill`], both failing with
//! [`CatalogError`] on unknown names.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Lookup failures against the static catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// No level with the given id exists.
    #[error("unknown lesson level: {0:?}")]
    NotFound(String),

    /// The level exists but has no drill with the given name.
    #[error("level {level:?} has no drill named {drill:?}")]
    UnknownDrill { level: String, drill: String },
}

// ---------------------------------------------------------------------------
// Drill / LessonLevel
// ---------------------------------------------------------------------------

/// What the user is asked to say in a drill.
#[derive(Debug, Clone, PartialEq)]
pub enum DrillTarget {
    /// A scripted sentence the attempt is compared against.
    Phrase(String),
    /// A free-speech directive; there is no script to compare against.
    FreeSpeech(String),
}

impl DrillTarget {
    /// The scripted sentence, when there is one.
    pub fn phrase(&self) -> Option<&str> {
        match self {
            DrillTarget::Phrase(p) => Some(p),
            DrillTarget::FreeSpeech(_) => None,
        }
    }

    /// The text shown to the user (script or directive).
    pub fn display_text(&self) -> &str {
        match self {
            DrillTarget::Phrase(p) => p,
            DrillTarget::FreeSpeech(d) => d,
        }
    }
}

/// One scripted phrase-practice unit within a level.
#[derive(Debug, Clone, PartialEq)]
pub struct Drill {
    pub name: String,
    pub target: DrillTarget,
}

/// One week of the course: a focus, an introductory message, and an
/// ordered set of drills.
#[derive(Debug, Clone)]
pub struct LessonLevel {
    pub id: String,
    pub focus: String,
    pub intro: String,
    pub drills: Vec<Drill>,
}

impl LessonLevel {
    /// Look up a drill by name.
    pub fn drill(&self, name: &str) -> Result<&Drill, CatalogError> {
        self.drills
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| CatalogError::UnknownDrill {
                level: self.id.clone(),
                drill: name.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Diagnostic passage
// ---------------------------------------------------------------------------

/// The baseline diagnostic passage. It deliberately stacks common
/// phonetic traps: "water" (W/V, flapped T), "authority" (th), "thirty"
/// (th + r), "detail" (dark L).
pub const DIAGNOSTIC_PASSAGE: &str = "The water strategy requires particular \
attention to detail. We must leverage our authority to alter the outcome \
significantly. Thirty-three thousand thoughts were theoretical.";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The full curriculum. Immutable after construction; safe to share
/// behind an `Arc` across sessions.
#[derive(Debug, Clone)]
pub struct Catalog {
    levels: Vec<LessonLevel>,
}

impl Catalog {
    /// The built-in three-week RP course.
    pub fn builtin() -> Self {
        let levels = vec![
            LessonLevel {
                id: "Week 1: The Foundation".into(),
                focus: "Consonant precision — crisp T's and the W/V split".into(),
                intro: "Retroflex T's and merged W/V are the two habits that \
                        give an accent away fastest. This week is about \
                        tongue placement."
                    .into(),
                drills: vec![
                    Drill {
                        name: "Drill A: The Crisp T".into(),
                        target: DrillTarget::Phrase(
                            "Target the total market effectively.".into(),
                        ),
                    },
                    Drill {
                        name: "Drill B: The W/V Distinction".into(),
                        target: DrillTarget::Phrase(
                            "We value the water strategy very highly.".into(),
                        ),
                    },
                ],
            },
            LessonLevel {
                id: "Week 2: The Rhythm".into(),
                focus: "Non-rhotic R and stress-timed pacing".into(),
                intro: "RP drops the R at the end of words and slows the \
                        syllable clock. Speed reads as nervousness; pauses \
                        read as authority."
                    .into(),
                drills: vec![
                    Drill {
                        name: "Drill A: The Non-Rhotic R".into(),
                        target: DrillTarget::Phrase(
                            "The car is parked in the centre of the harbour.".into(),
                        ),
                    },
                    Drill {
                        name: "Drill B: Executive Pace".into(),
                        target: DrillTarget::Phrase(
                            "I do not agree. We need to pause. And reflect.".into(),
                        ),
                    },
                ],
            },
            LessonLevel {
                id: "Week 3: The Boardroom".into(),
                focus: "Free-flow gravitas — pace, fillers, tone".into(),
                intro: "No script this week. The grader listens for rushing, \
                        hedging and filler words."
                    .into(),
                drills: vec![Drill {
                    name: "Drill A: Project Update".into(),
                    target: DrillTarget::FreeSpeech(
                        "Deliver a one-minute project update as if briefing \
                         the board."
                            .into(),
                    ),
                }],
            },
        ];
        Self { levels }
    }

    /// Ordered level ids, in course order.
    pub fn level_ids(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(|l| l.id.as_str())
    }

    /// All levels, in course order.
    pub fn levels(&self) -> impl Iterator<Item = &LessonLevel> {
        self.levels.iter()
    }

    /// Look up a level by id.
    pub fn level(&self, id: &str) -> Result<&LessonLevel, CatalogError> {
        self.levels
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// The first level of the course — the default selection for a new
    /// session.
    pub fn first_level(&self) -> &LessonLevel {
        &self.levels[0]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_course_order() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog.level_ids().collect();
        assert_eq!(
            ids,
            vec![
                "Week 1: The Foundation",
                "Week 2: The Rhythm",
                "Week 3: The Boardroom",
            ]
        );
    }

    #[test]
    fn week_one_crisp_t_has_exact_target() {
        let catalog = Catalog::builtin();
        let level = catalog.level("Week 1: The Foundation").unwrap();
        let drill = level.drill("Drill A: The Crisp T").unwrap();
        assert_eq!(
            drill.target.phrase(),
            Some("Target the total market effectively.")
        );
    }

    #[test]
    fn unknown_level_fails_with_not_found() {
        let catalog = Catalog::builtin();
        let err = catalog.level("Week 9: Does Not Exist").unwrap_err();
        assert_eq!(err, CatalogError::NotFound("Week 9: Does Not Exist".into()));
    }

    #[test]
    fn unknown_drill_names_level_and_drill() {
        let catalog = Catalog::builtin();
        let level = catalog.level("Week 1: The Foundation").unwrap();
        let err = level.drill("Drill Z").unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownDrill {
                level: "Week 1: The Foundation".into(),
                drill: "Drill Z".into(),
            }
        );
    }

    #[test]
    fn free_speech_drill_has_no_phrase() {
        let catalog = Catalog::builtin();
        let level = catalog.level("Week 3: The Boardroom").unwrap();
        let drill = level.drill("Drill A: Project Update").unwrap();
        assert!(drill.target.phrase().is_none());
        assert!(drill.target.display_text().contains("project update"));
    }

    #[test]
    fn first_level_is_week_one() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.first_level().id, "Week 1: The Foundation");
    }

    #[test]
    fn diagnostic_passage_carries_the_traps() {
        for trap in ["water", "authority", "Thirty", "detail"] {
            assert!(DIAGNOSTIC_PASSAGE.contains(trap), "missing trap {trap}");
        }
    }
}
