//! Dispute resolution: the only way out of `disputed`.

use crate::logic::advancement;
use crate::logic::lifecycle::require_running;
use crate::models::{EntrantId, MatchId, MatchStatus, Tournament, TournamentError};

/// An admin picks the winner of a disputed match, optionally with a note.
///
/// Advancement then runs exactly as for any other completion. Resolving an already
/// resolved match to the same winner is a no-op.
pub fn resolve_dispute(
    tournament: &mut Tournament,
    match_id: MatchId,
    winner_id: EntrantId,
    note: Option<String>,
) -> Result<(), TournamentError> {
    tournament.transaction(|t| {
        require_running(t, "resolve disputes")?;
        let idx = t.match_index(match_id)?;
        let m = &mut t.matches[idx];
        match m.status {
            MatchStatus::Disputed => {}
            MatchStatus::Completed if m.winner_id == Some(winner_id) => return Ok(()),
            MatchStatus::Completed => return Err(TournamentError::AlreadyCompleted { match_id }),
            from => {
                return Err(TournamentError::InvalidTransition {
                    from,
                    action: "resolve a dispute",
                })
            }
        }
        let slot = m
            .slot_of_entrant(winner_id)
            .ok_or(TournamentError::WinnerNotParticipant(winner_id))?;
        m.resolution_note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        log::info!(
            "Dispute on match {} ({}) resolved in favour of {}",
            m.id,
            m.bracket_position,
            winner_id
        );
        advancement::complete_match(t, idx, slot)
    })
}
