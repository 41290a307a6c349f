//! Tournament, TournamentStatus, TournamentFormat and TournamentError.

use crate::models::dartboard::DartboardId;
use crate::models::entrant::{Entrant, EntrantId};
use crate::models::game::{GameMatch, MatchId, MatchStatus};
use crate::models::position::BracketPosition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Coarse error class, used to pick a response status.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
}

/// Errors that can occur during tournament operations. None of them leaves partial state.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Need at least 2 entrants to build a bracket (got {count})")]
    NotEnoughEntrants { count: usize },
    #[error("Unsupported tournament format: {0}")]
    UnsupportedFormat(String),
    #[error("Tournament is {status}; cannot {action}")]
    InvalidTournamentStatus {
        status: TournamentStatus,
        action: &'static str,
    },
    #[error("Entrant {0} appears more than once")]
    DuplicateEntrant(EntrantId),
    #[error("Winner {0} is not a participant of this match")]
    WinnerNotParticipant(EntrantId),
    #[error("{0} is not a participant of this match")]
    NotAParticipant(Uuid),
    #[error("Board number must be positive")]
    InvalidBoardNumber,

    #[error("Match is {from}; cannot {action}")]
    InvalidTransition {
        from: MatchStatus,
        action: &'static str,
    },
    #[error("Match {match_id} is already decided")]
    AlreadyCompleted { match_id: MatchId },
    #[error("Slot {position} is already occupied")]
    SlotOccupied { position: BracketPosition },
    #[error("Dartboard {0} is not available")]
    BoardUnavailable(DartboardId),
    #[error("Match {0} already holds a dartboard")]
    MatchHasBoard(MatchId),
    #[error("Match {0} has no dartboard assigned")]
    MatchHasNoBoard(MatchId),
    #[error("Dartboard {0} is assigned to an active match")]
    BoardInUse(DartboardId),
    #[error("A dartboard with number {0} already exists")]
    DuplicateBoardNumber(u32),
    #[error("Match changed since it was read (expected version {expected}, found {actual})")]
    StaleVersion { expected: u64, actual: u64 },

    #[error("Tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("No match at bracket position {0}")]
    PositionNotFound(BracketPosition),
    #[error("Dartboard {0} not found")]
    BoardNotFound(DartboardId),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            NotEnoughEntrants { .. }
            | UnsupportedFormat(_)
            | InvalidTournamentStatus { .. }
            | DuplicateEntrant(_)
            | WinnerNotParticipant(_)
            | NotAParticipant(_)
            | InvalidBoardNumber => ErrorKind::Validation,
            InvalidTransition { .. }
            | AlreadyCompleted { .. }
            | SlotOccupied { .. }
            | BoardUnavailable(_)
            | MatchHasBoard(_)
            | MatchHasNoBoard(_)
            | BoardInUse(_)
            | DuplicateBoardNumber(_)
            | StaleVersion { .. } => ErrorKind::Conflict,
            TournamentNotFound(_) | MatchNotFound(_) | PositionNotFound(_) | BoardNotFound(_) => {
                ErrorKind::NotFound
            }
        }
    }
}

/// Bracket format.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    SingleElimination,
    DoubleElimination,
    /// Recognised, but not something this engine builds brackets for.
    RoundRobin,
}

impl TournamentFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentFormat::SingleElimination => "single_elimination",
            TournamentFormat::DoubleElimination => "double_elimination",
            TournamentFormat::RoundRobin => "round_robin",
        }
    }
}

impl FromStr for TournamentFormat {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single_elimination" => Ok(TournamentFormat::SingleElimination),
            "double_elimination" => Ok(TournamentFormat::DoubleElimination),
            "round_robin" => Ok(TournamentFormat::RoundRobin),
            other => Err(TournamentError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Draft,
    Registration,
    /// Bracket generated; scoring actions allowed.
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Registration => "registration",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        })
    }
}

/// Full tournament state: entrants snapshot, every bracket match, and the outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    /// Entrants in seed order, captured when the bracket is generated.
    pub entrants: Vec<Entrant>,
    /// Smallest power of two holding every entrant; 0 before generation.
    pub bracket_size: u32,
    /// All matches in generation order: winners bracket round by round, then the losers
    /// bracket, then the grand final. `match_number` follows this order.
    pub matches: Vec<GameMatch>,
    pub champion_id: Option<EntrantId>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create a new tournament in Draft with no bracket.
    pub fn new(name: impl Into<String>, format: TournamentFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            status: TournamentStatus::Draft,
            entrants: Vec::new(),
            bracket_size: 0,
            matches: Vec::new(),
            champion_id: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Run `f` against a staged copy and keep the result only if it succeeds.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Tournament) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let mut staged = self.clone();
        let out = f(&mut staged)?;
        *self = staged;
        Ok(out)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn match_index(&self, id: MatchId) -> Result<usize, TournamentError> {
        self.matches
            .iter()
            .position(|m| m.id == id)
            .ok_or(TournamentError::MatchNotFound(id))
    }

    pub fn position_index(&self, position: BracketPosition) -> Result<usize, TournamentError> {
        self.matches
            .iter()
            .position(|m| m.bracket_position == position)
            .ok_or(TournamentError::PositionNotFound(position))
    }

    pub fn match_at(&self, position: BracketPosition) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.bracket_position == position)
    }

    pub fn entrant(&self, id: EntrantId) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.id == id)
    }

    /// Fail unless the tournament is in one of `allowed`.
    pub fn require_status(
        &self,
        allowed: &[TournamentStatus],
        action: &'static str,
    ) -> Result<(), TournamentError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(TournamentError::InvalidTournamentStatus {
                status: self.status,
                action,
            })
        }
    }

    /// Mark the tournament finished with a champion.
    pub(crate) fn crown(&mut self, champion: EntrantId) {
        self.champion_id = Some(champion);
        self.status = TournamentStatus::Completed;
        self.completed_at = Some(Utc::now());
        let name = self
            .entrant(champion)
            .map(|e| e.name.as_str())
            .unwrap_or("unknown");
        log::info!("Tournament {} completed; champion {} ({})", self.id, name, champion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_discards_changes_on_error() {
        let mut t = Tournament::new("Cup", TournamentFormat::SingleElimination);
        let result: Result<(), _> = t.transaction(|t| {
            t.name = "Changed".into();
            Err(TournamentError::NotEnoughEntrants { count: 1 })
        });
        assert!(result.is_err());
        assert_eq!(t.name, "Cup");
    }

    #[test]
    fn errors_classify_into_three_kinds() {
        assert_eq!(
            TournamentError::NotEnoughEntrants { count: 1 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            TournamentError::BoardUnavailable(Uuid::nil()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(TournamentError::MatchNotFound(Uuid::nil()).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unknown_format_is_unsupported() {
        assert_eq!(
            "swiss".parse::<TournamentFormat>(),
            Err(TournamentError::UnsupportedFormat("swiss".into()))
        );
        assert_eq!(
            "double_elimination".parse::<TournamentFormat>(),
            Ok(TournamentFormat::DoubleElimination)
        );
    }
}
