use std::collections::BTreeSet;

use crate::catalog::{Bug, LineNo, Track};

pub const POINTS_PER_BUG: u32 = 20;

/// How a single line of the sample is judged once the round is submitted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineMark {
    /// selected and a real defect
    Correct,
    /// selected but not a defect
    Incorrect,
    /// a defect that was not selected
    Missed,
    Neutral,
}

/// Frozen outcome of a submitted round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    /// true positives
    pub found: u32,
    /// defects in the track
    pub total: u32,
}

impl Score {
    pub fn points(&self) -> u32 {
        self.found * POINTS_PER_BUG
    }

    pub fn max_points(&self) -> u32 {
        self.total * POINTS_PER_BUG
    }

    /// `points / max_points` as a rounded percentage, 0 for a bug-free track
    pub fn accuracy_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.found * 200 + self.total) / (self.total * 2)
    }
}

/// Count selected lines that are real defects; false positives cost nothing.
pub fn score(truth: &BTreeSet<LineNo>, selected: &BTreeSet<LineNo>) -> Score {
    Score {
        found: truth.intersection(selected).count() as u32,
        total: truth.len() as u32,
    }
}

pub fn classify(line: LineNo, truth: &BTreeSet<LineNo>, selected: &BTreeSet<LineNo>) -> LineMark {
    match (selected.contains(&line), truth.contains(&line)) {
        (true, true) => LineMark::Correct,
        (true, false) => LineMark::Incorrect,
        (false, true) => LineMark::Missed,
        (false, false) => LineMark::Neutral,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BugFinding<'a> {
    pub bug: &'a Bug,
    pub found: bool,
}

/// Per-bug breakdown in catalog order
pub fn findings<'a>(track: &'a Track, selected: &BTreeSet<LineNo>) -> Vec<BugFinding<'a>> {
    track
        .bugs()
        .iter()
        .map(|bug| BugFinding {
            bug,
            found: selected.contains(&bug.line),
        })
        .collect()
}
