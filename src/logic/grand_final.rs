//! Double-elimination grand final: the decider (GF1) and the conditional reset (GF2).
//!
//! GF1 seats the winners-bracket champion in slot one and the losers-bracket champion in
//! slot two. If slot one wins, nobody has a second loss to give and GF2 is cancelled.
//! If slot two wins, both finalists have one loss and GF2 is played with the same seating.

use crate::logic::advancement::{self, Settled};
use crate::models::{BracketPosition, Slot, SlotRef, Tournament, TournamentError};

/// Handle a completed GF1 at index `idx`.
pub(crate) fn decide(t: &mut Tournament, idx: usize) -> Result<Vec<Settled>, TournamentError> {
    let gf1 = &t.matches[idx];
    let winner_id = gf1.winner_id.ok_or(TournamentError::InvalidTransition {
        from: gf1.status,
        action: "decide the grand final without a winner",
    })?;
    let winner_slot = gf1
        .slot_of_entrant(winner_id)
        .ok_or(TournamentError::WinnerNotParticipant(winner_id))?;
    let sides: Vec<_> = [Slot::One, Slot::Two]
        .into_iter()
        .map(|s| gf1.slot(s).participant().map(|p| p.side.clone()))
        .collect();
    let reset_idx = t.position_index(BracketPosition::GrandFinalReset)?;

    match winner_slot {
        Slot::One => {
            advancement::void_match(&mut t.matches[reset_idx]);
            t.crown(winner_id);
            Ok(Vec::new())
        }
        Slot::Two if t.matches[reset_idx].status.is_terminal() => {
            log::warn!(
                "Tournament {}: GF2 was cancelled before GF1 finished; GF1 decides the title",
                t.id
            );
            t.crown(winner_id);
            Ok(Vec::new())
        }
        Slot::Two => {
            log::info!(
                "Tournament {}: losers-bracket champion took GF1; bracket reset to GF2",
                t.id
            );
            let mut follow_ups = Vec::new();
            for (slot, side) in [Slot::One, Slot::Two].into_iter().zip(sides) {
                let target = SlotRef::new(BracketPosition::GrandFinalReset, slot);
                follow_ups.extend(advancement::seat(t, target, side)?);
            }
            Ok(follow_ups)
        }
    }
}

/// Handle a completed GF2 at index `idx`: its winner takes the tournament.
pub(crate) fn finish_reset(t: &mut Tournament, idx: usize) -> Result<(), TournamentError> {
    let gf2 = &t.matches[idx];
    let winner_id = gf2.winner_id.ok_or(TournamentError::InvalidTransition {
        from: gf2.status,
        action: "finish the grand final reset without a winner",
    })?;
    t.crown(winner_id);
    Ok(())
}
