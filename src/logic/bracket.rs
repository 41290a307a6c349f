//! Bracket generation: seeds entrants, creates every match with its fixed routing, and
//! resolves opening-round byes in the same pass.

use crate::logic::advancement;
use crate::logic::seeding::{seed_entrants, SeedingMethod};
use crate::logic::topology::{seed_order, BracketShape};
use crate::models::{
    Entrant, GameMatch, MatchParticipant, Side, Slot, SlotEntry, Tournament, TournamentError,
    TournamentStatus,
};
use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;

/// Generate the full bracket for `entrants` (seeded randomly within skill when asked).
///
/// The tournament must be in Draft or Registration; on success it is InProgress. Nothing
/// is written on failure.
pub fn generate_bracket(
    tournament: &mut Tournament,
    entrants: Vec<Entrant>,
    seeding: SeedingMethod,
) -> Result<(), TournamentError> {
    generate_bracket_with_rng(tournament, entrants, seeding, &mut rand::thread_rng())
}

/// [`generate_bracket`] with a caller-supplied random source.
pub fn generate_bracket_with_rng<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    entrants: Vec<Entrant>,
    seeding: SeedingMethod,
    rng: &mut R,
) -> Result<(), TournamentError> {
    tournament.transaction(|t| {
        t.require_status(
            &[TournamentStatus::Draft, TournamentStatus::Registration],
            "generate a bracket",
        )?;
        let shape = BracketShape::new(t.format, entrants.len())?;

        let mut seen = HashSet::with_capacity(entrants.len());
        for e in &entrants {
            if !seen.insert(e.id) {
                return Err(TournamentError::DuplicateEntrant(e.id));
            }
        }

        t.entrants = seed_entrants(entrants, seeding, rng);
        t.bracket_size = shape.bracket_size;
        t.matches = build_matches(t, &shape)?;
        seat_opening_round(t, &shape)?;

        t.status = TournamentStatus::InProgress;
        t.started_at = Some(Utc::now());
        log::info!(
            "Generated {} bracket for tournament {}: {} entrants, bracket size {}, {} matches",
            t.format.as_str(),
            t.id,
            t.entrants.len(),
            shape.bracket_size,
            t.matches.len()
        );

        advancement::settle_opening_round(t)
    })
}

fn build_matches(t: &Tournament, shape: &BracketShape) -> Result<Vec<GameMatch>, TournamentError> {
    shape
        .plan()
        .into_iter()
        .enumerate()
        .map(|(i, planned)| {
            let routing = shape
                .route(planned.position)
                .ok_or(TournamentError::PositionNotFound(planned.position))?;
            let mut m = GameMatch::new(
                t.id,
                planned.round_number,
                i as u32 + 1,
                planned.position,
                planned.round_name,
            );
            m.winner_to = routing.winner_to;
            m.loser_to = routing.loser_to;
            Ok(m)
        })
        .collect()
}

/// Place seeds into round one; seeds beyond the entrant count are ghosts.
fn seat_opening_round(t: &mut Tournament, shape: &BracketShape) -> Result<(), TournamentError> {
    let order = seed_order(shape.bracket_size);
    for (i, pair) in order.chunks_exact(2).enumerate() {
        let position = shape.first_round_position(i as u32 + 1);
        let idx = t.position_index(position)?;
        for (slot, &seed) in [Slot::One, Slot::Two].into_iter().zip(pair) {
            let entry = match t.entrants.get(seed as usize - 1) {
                Some(entrant) => {
                    SlotEntry::Filled(MatchParticipant::seat(Side::for_entrant(entrant), slot))
                }
                None => SlotEntry::Bye,
            };
            *t.matches[idx].slot_mut(slot) = entry;
        }
    }
    Ok(())
}
