//! Opaque analysis report text.
//!
//! The remote model's critique conforms to the rubric by convention only —
//! no parser validates its structure. The single defined operation beyond
//! display is [`AnalysisReport::spoken_excerpt`]: a length-bounded prefix
//! used when the critique is re-synthesized as spoken feedback.

// ---------------------------------------------------------------------------
// AnalysisReport
// ---------------------------------------------------------------------------

/// Free-form critique text returned verbatim by the remote model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport(String);

impl AnalysisReport {
    pub fn new(text: String) -> Self {
        Self(text)
    }

    /// The full critique, verbatim.
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Prefix of at most `max_chars` characters for spoken feedback.
    ///
    /// Counts characters rather than bytes and never splits inside a
    /// multi-byte sequence, so the result is always valid UTF-8. No word
    /// boundary is guaranteed.
    pub fn spoken_excerpt(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.0[..byte_idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_never_exceeds_limit() {
        let report = AnalysisReport::new("Score: 72/100. Slow down.".into());
        for limit in 0..40 {
            assert!(report.spoken_excerpt(limit).chars().count() <= limit);
        }
    }

    #[test]
    fn short_report_is_returned_whole() {
        let report = AnalysisReport::new("Crisp.".into());
        assert_eq!(report.spoken_excerpt(220), "Crisp.");
    }

    #[test]
    fn excerpt_does_not_split_multibyte_chars() {
        // "naïve café" mixes 1- and 2-byte characters.
        let report = AnalysisReport::new("naïve café naïve café".into());
        for limit in 0..25 {
            // Slicing inside a multi-byte char would panic here.
            let excerpt = report.spoken_excerpt(limit);
            assert!(excerpt.chars().count() <= limit);
        }
    }

    #[test]
    fn zero_limit_yields_empty_excerpt() {
        let report = AnalysisReport::new("anything".into());
        assert_eq!(report.spoken_excerpt(0), "");
    }

    #[test]
    fn display_is_verbatim() {
        let text = "| Vowel Roundness | 6 |\nQuick Fix: round your O's.";
        let report = AnalysisReport::new(text.into());
        assert_eq!(report.to_string(), text);
        assert_eq!(report.text(), text);
    }
}
