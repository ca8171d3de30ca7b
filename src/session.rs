use std::collections::BTreeSet;
use std::sync::Arc;

use crate::catalog::{LineNo, Track};
use crate::scoring::{self, LineMark, Score};

/// Coarse stage of a play-through
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    SelectingTrack,
    Playing,
    Submitted,
    Finished,
}

/// State shared by every phase that has a track
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub(crate) track: Arc<Track>,
    pub(crate) remaining_secs: u32,
    pub(crate) selected: BTreeSet<LineNo>,
}

impl Round {
    pub(crate) fn new(track: Arc<Track>, time_limit_secs: u32) -> Self {
        Self {
            track,
            remaining_secs: time_limit_secs,
            selected: BTreeSet::new(),
        }
    }

    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn selected(&self) -> &BTreeSet<LineNo> {
        &self.selected
    }
}

/// One play-through. Each variant only carries what is valid in that phase,
/// so there is no score before submission and no selection without a track.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    SelectingTrack,
    Playing {
        round: Round,
        started: bool,
    },
    Submitted {
        round: Round,
        score: Score,
    },
    Finished {
        round: Round,
        score: Score,
    },
}

impl Session {
    pub fn phase(&self) -> Phase {
        match self {
            Session::SelectingTrack => Phase::SelectingTrack,
            Session::Playing { .. } => Phase::Playing,
            Session::Submitted { .. } => Phase::Submitted,
            Session::Finished { .. } => Phase::Finished,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        match self {
            Session::SelectingTrack => None,
            Session::Playing { round, .. }
            | Session::Submitted { round, .. }
            | Session::Finished { round, .. } => Some(round),
        }
    }

    pub fn track(&self) -> Option<&Arc<Track>> {
        self.round().map(Round::track)
    }

    /// Whether the countdown has been started. Stays true after submission.
    pub fn started(&self) -> bool {
        match self {
            Session::SelectingTrack => false,
            Session::Playing { started, .. } => *started,
            Session::Submitted { .. } | Session::Finished { .. } => true,
        }
    }

    pub fn score(&self) -> Option<Score> {
        match self {
            Session::Submitted { score, .. } | Session::Finished { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.score().is_some()
    }

    /// Judgement of `line`; only available once the score is frozen
    pub fn line_mark(&self, line: LineNo) -> Option<LineMark> {
        match self {
            Session::Submitted { round, .. } | Session::Finished { round, .. } => Some(
                scoring::classify(line, round.track.defect_lines(), &round.selected),
            ),
            _ => None,
        }
    }
}

/// Read-only view handed to the presentation layer after every change
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub track: Option<Arc<Track>>,
    pub started: bool,
    pub remaining_secs: u32,
    pub time_limit_secs: u32,
    pub selected_lines: BTreeSet<LineNo>,
    /// points, 0 until submitted
    pub score: u32,
    pub result: Option<Score>,
    pub progress_percent: f64,
}
