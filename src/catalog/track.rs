use serde::Deserialize;
use std::collections::BTreeSet;

use super::CatalogError;
use crate::scoring::POINTS_PER_BUG;

/// 1-based line number inside a track's code sample
pub type LineNo = u32;

/// A known defect in a track's sample
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bug {
    pub line: LineNo,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// One playable unit: a code sample plus the ground-truth set of defective lines.
///
/// A `Track` can only be built through [`Track::new`], which rejects duplicate
/// bug lines and bug lines that fall outside the sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    id: String,
    language: String,
    title: String,
    code: String,
    bugs: Vec<Bug>,
    difficulty: Difficulty,
    defect_lines: BTreeSet<LineNo>,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        language: impl Into<String>,
        title: impl Into<String>,
        code: impl Into<String>,
        bugs: Vec<Bug>,
        difficulty: Difficulty,
    ) -> Result<Self, CatalogError> {
        let id = id.into();
        let code = code.into();
        let line_count = code.lines().count();

        let mut defect_lines = BTreeSet::new();
        for bug in &bugs {
            if bug.line == 0 || bug.line as usize > line_count {
                return Err(CatalogError::BugLineOutOfRange {
                    track: id,
                    line: bug.line,
                    line_count,
                });
            }
            if !defect_lines.insert(bug.line) {
                return Err(CatalogError::DuplicateBugLine {
                    track: id,
                    line: bug.line,
                });
            }
        }

        Ok(Self {
            id,
            language: language.into(),
            title: title.into(),
            code,
            bugs,
            difficulty,
            defect_lines,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name of the sample's programming language
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Bugs in catalog order
    pub fn bugs(&self) -> &[Bug] {
        &self.bugs
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }

    /// Numbered lines of the sample, starting at 1
    pub fn lines(&self) -> impl Iterator<Item = (LineNo, &str)> {
        self.code
            .lines()
            .enumerate()
            .map(|(idx, text)| (idx as LineNo + 1, text))
    }

    pub fn line(&self, line: LineNo) -> Option<&str> {
        if line == 0 {
            return None;
        }
        self.code.lines().nth(line as usize - 1)
    }

    pub fn defect_lines(&self) -> &BTreeSet<LineNo> {
        &self.defect_lines
    }

    pub fn is_defect(&self, line: LineNo) -> bool {
        self.defect_lines.contains(&line)
    }

    /// Points awarded when every defect is found
    pub fn max_score(&self) -> u32 {
        self.bugs.len() as u32 * POINTS_PER_BUG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn bug(line: LineNo) -> Bug {
        Bug {
            line,
            description: format!("bug on {line}"),
        }
    }

    #[test]
    fn test_track_new_valid() {
        let track = Track::new(
            "demo",
            "Rust",
            "Demo",
            "let a = 1;\nlet b = a / 0;\nprintln!(\"{b}\");",
            vec![bug(2)],
            Difficulty::Beginner,
        )
        .unwrap();

        assert_eq!(track.id(), "demo");
        assert_eq!(track.line_count(), 3);
        assert_eq!(track.line(2), Some("let b = a / 0;"));
        assert_eq!(track.line(0), None);
        assert_eq!(track.line(4), None);
        assert!(track.is_defect(2));
        assert!(!track.is_defect(1));
        assert_eq!(track.max_score(), 20);
    }

    #[test]
    fn test_lines_are_one_based() {
        let track = Track::new("t", "C", "t", "a\nb", vec![], Difficulty::Beginner).unwrap();
        let lines: Vec<_> = track.lines().collect();
        assert_eq!(lines, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn test_trailing_newline_does_not_add_a_line() {
        let track = Track::new("t", "C", "t", "a\nb\n", vec![bug(2)], Difficulty::Beginner)
            .unwrap();
        assert_eq!(track.line_count(), 2);
    }

    #[test]
    fn test_duplicate_bug_line_rejected() {
        let err = Track::new(
            "dup",
            "C",
            "t",
            "a\nb\nc",
            vec![bug(1), bug(3), bug(1)],
            Difficulty::Beginner,
        )
        .unwrap_err();

        assert_matches!(err, CatalogError::DuplicateBugLine { ref track, line: 1 } if track == "dup");
    }

    #[test]
    fn test_bug_line_past_end_rejected() {
        let err = Track::new("long", "C", "t", "a\nb", vec![bug(3)], Difficulty::Beginner)
            .unwrap_err();

        assert_matches!(
            err,
            CatalogError::BugLineOutOfRange {
                line: 3,
                line_count: 2,
                ..
            }
        );
    }

    #[test]
    fn test_bug_line_zero_rejected() {
        let err =
            Track::new("zero", "C", "t", "a", vec![bug(0)], Difficulty::Beginner).unwrap_err();
        assert_matches!(err, CatalogError::BugLineOutOfRange { line: 0, .. });
    }

    #[test]
    fn test_difficulty_display_and_deserialize() {
        assert_eq!(Difficulty::Intermediate.to_string(), "intermediate");
        let d: Difficulty = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(d, Difficulty::Advanced);
    }
}
