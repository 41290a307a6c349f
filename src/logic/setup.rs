//! Tournament-level status changes outside bracket play.

use crate::logic::advancement;
use crate::models::{Tournament, TournamentError, TournamentStatus};
use chrono::Utc;

/// Draft → Registration.
pub fn open_registration(tournament: &mut Tournament) -> Result<(), TournamentError> {
    tournament.require_status(&[TournamentStatus::Draft], "open registration")?;
    tournament.status = TournamentStatus::Registration;
    Ok(())
}

/// Admin cancellation: the tournament and every match that has not finished.
pub fn cancel_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    tournament.require_status(
        &[
            TournamentStatus::Draft,
            TournamentStatus::Registration,
            TournamentStatus::InProgress,
        ],
        "cancel the tournament",
    )?;
    for m in tournament.matches.iter_mut().filter(|m| !m.status.is_terminal()) {
        advancement::void_match(m);
    }
    tournament.status = TournamentStatus::Cancelled;
    tournament.completed_at = Some(Utc::now());
    log::warn!("Tournament {} cancelled", tournament.id);
    Ok(())
}
