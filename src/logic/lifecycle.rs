//! Match lifecycle: arrivals, self-reports, scorer results, scores and cancellation.
//!
//! pending → waiting_for_players → in_progress → completed, with disputed branching off
//! in_progress and cancelled reachable from every non-terminal state.

use crate::logic::advancement;
use crate::models::{
    Consensus, EntrantId, MatchId, MatchStatus, SelfReport, Tournament, TournamentError,
    TournamentStatus,
};
use chrono::Utc;
use uuid::Uuid;

/// Scoring actions are only taken while the tournament is running.
pub(crate) fn require_running(t: &Tournament, action: &'static str) -> Result<(), TournamentError> {
    t.require_status(&[TournamentStatus::InProgress], action)
}

/// Reject a write based on a stale read of the match.
pub fn ensure_version(
    tournament: &Tournament,
    match_id: MatchId,
    expected: Option<u64>,
) -> Result<(), TournamentError> {
    let m = tournament
        .get_match(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    match expected {
        Some(expected) if expected != m.version => Err(TournamentError::StaleVersion {
            expected,
            actual: m.version,
        }),
        _ => Ok(()),
    }
}

/// Record that `actor` (entrant, team, or team member) is at the board.
/// Once both sides are there the match starts.
pub fn record_arrival(
    tournament: &mut Tournament,
    match_id: MatchId,
    actor: Uuid,
) -> Result<MatchStatus, TournamentError> {
    tournament.transaction(|t| {
        require_running(t, "record arrivals")?;
        let idx = t.match_index(match_id)?;
        let m = &mut t.matches[idx];
        let arrived = m
            .slot_of_actor(actor)
            .and_then(|slot| m.slot(slot).participant())
            .is_some_and(|p| p.arrived_at_board);
        match m.status {
            MatchStatus::WaitingForPlayers => {}
            // The arrival that started the match, sent again.
            MatchStatus::InProgress if arrived => return Ok(MatchStatus::InProgress),
            from => {
                return Err(TournamentError::InvalidTransition {
                    from,
                    action: "record an arrival",
                })
            }
        }
        let slot = m
            .slot_of_actor(actor)
            .ok_or(TournamentError::NotAParticipant(actor))?;
        if let Some(p) = m.slot_mut(slot).participant_mut() {
            if p.arrived_at_board {
                return Ok(m.status);
            }
            p.arrived_at_board = true;
        }
        m.touch();
        if m.participants().all(|p| p.arrived_at_board) {
            m.status = MatchStatus::InProgress;
            m.started_at = Some(Utc::now());
        }
        Ok(m.status)
    })
}

/// A side's own claim of a win or a loss.
///
/// Agreeing reports complete the match; contradicting ones move it to disputed. Repeating
/// an already recorded report is accepted without effect.
pub fn report_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    actor: Uuid,
    won: bool,
) -> Result<MatchStatus, TournamentError> {
    tournament.transaction(|t| {
        require_running(t, "report results")?;
        let idx = t.match_index(match_id)?;
        let m = &mut t.matches[idx];
        let slot = m
            .slot_of_actor(actor)
            .ok_or(TournamentError::NotAParticipant(actor))?;
        let report = SelfReport::from_won(won);
        let previous = m
            .slot(slot)
            .participant()
            .map(|p| p.reported_win)
            .unwrap_or_default();
        match m.status {
            MatchStatus::InProgress => {}
            status @ (MatchStatus::Completed | MatchStatus::Disputed) if previous == report => {
                return Ok(status);
            }
            from => {
                return Err(TournamentError::InvalidTransition {
                    from,
                    action: "report a result",
                })
            }
        }
        if let Some(p) = m.slot_mut(slot).participant_mut() {
            p.reported_win = report;
        }
        m.touch();

        match m.consensus() {
            Consensus::Incomplete => Ok(MatchStatus::InProgress),
            Consensus::Agreed { winner } => {
                advancement::complete_match(t, idx, winner)?;
                Ok(MatchStatus::Completed)
            }
            Consensus::Conflict => {
                m.status = MatchStatus::Disputed;
                log::info!(
                    "Match {} ({}) disputed: self-reports disagree",
                    m.id,
                    m.bracket_position
                );
                Ok(MatchStatus::Disputed)
            }
        }
    })
}

/// An authorised scorer records the winner of an in-progress match.
///
/// Recording the same winner again is a no-op; a different winner is a conflict.
pub fn record_winner(
    tournament: &mut Tournament,
    match_id: MatchId,
    winner_id: EntrantId,
) -> Result<(), TournamentError> {
    tournament.transaction(|t| {
        require_running(t, "record winners")?;
        let idx = t.match_index(match_id)?;
        let m = &t.matches[idx];
        match m.status {
            MatchStatus::Completed if m.winner_id == Some(winner_id) => return Ok(()),
            MatchStatus::Completed => return Err(TournamentError::AlreadyCompleted { match_id }),
            _ => {}
        }
        let slot = m
            .slot_of_entrant(winner_id)
            .ok_or(TournamentError::WinnerNotParticipant(winner_id))?;
        if m.status != MatchStatus::InProgress {
            return Err(TournamentError::InvalidTransition {
                from: m.status,
                action: "record a winner",
            });
        }
        advancement::complete_match(t, idx, slot)
    })
}

/// Store the legs/sets tally for one side. Informational only; never decides the match.
pub fn record_score(
    tournament: &mut Tournament,
    match_id: MatchId,
    entrant_id: EntrantId,
    legs_won: u32,
    sets_won: u32,
) -> Result<(), TournamentError> {
    tournament.transaction(|t| {
        require_running(t, "record scores")?;
        let idx = t.match_index(match_id)?;
        let m = &mut t.matches[idx];
        if m.status != MatchStatus::InProgress {
            return Err(TournamentError::InvalidTransition {
                from: m.status,
                action: "record a score",
            });
        }
        let slot = m
            .slot_of_entrant(entrant_id)
            .ok_or(TournamentError::NotAParticipant(entrant_id))?;
        if let Some(p) = m.slot_mut(slot).participant_mut() {
            p.legs_won = legs_won;
            p.sets_won = sets_won;
        }
        m.touch();
        Ok(())
    })
}

/// Admin cancellation of a match that has not finished.
pub fn cancel_match(tournament: &mut Tournament, match_id: MatchId) -> Result<(), TournamentError> {
    tournament.transaction(|t| {
        require_running(t, "cancel matches")?;
        let idx = t.match_index(match_id)?;
        let m = &mut t.matches[idx];
        if m.status.is_terminal() {
            return Err(TournamentError::InvalidTransition {
                from: m.status,
                action: "cancel",
            });
        }
        log::warn!("Match {} ({}) cancelled by admin", m.id, m.bracket_position);
        advancement::void_match(m);
        Ok(())
    })
}
