//! Advancement: on every completion, write the winner (and loser) into the slots fixed at
//! generation time, and keep resolving byes until nothing else settles by itself.

use crate::logic::grand_final;
use crate::models::{
    BracketPosition, GameMatch, MatchParticipant, MatchStatus, Side, Slot, SlotEntry, SlotRef,
    Tournament, TournamentError,
};
use chrono::Utc;
use std::collections::VecDeque;

/// A match that reached a terminal state and still has to feed its targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Settled {
    /// Completed with a winner.
    Completed(usize),
    /// Cancelled because both slots were ghosts; forwards a ghost.
    Voided(usize),
}

/// What a match should do after one of its slots changed.
enum SlotOutcome {
    Wait,
    Ready,
    Bye(Slot),
    Void,
}

fn mark_completed(m: &mut GameMatch, winner: Slot) -> Result<(), TournamentError> {
    let winner_id = m
        .slot(winner)
        .participant()
        .map(MatchParticipant::entrant_id)
        .ok_or(TournamentError::InvalidTransition {
            from: m.status,
            action: "complete without a seated winner",
        })?;
    m.winner_id = Some(winner_id);
    m.status = MatchStatus::Completed;
    m.completed_at = Some(Utc::now());
    m.touch();
    Ok(())
}

/// Cancel a match that will never be played.
pub(crate) fn void_match(m: &mut GameMatch) {
    m.status = MatchStatus::Cancelled;
    m.completed_at = Some(Utc::now());
    m.touch();
}

/// Complete match `idx` with the side in `winner` and run the whole downstream cascade.
pub(crate) fn complete_match(
    t: &mut Tournament,
    idx: usize,
    winner: Slot,
) -> Result<(), TournamentError> {
    mark_completed(&mut t.matches[idx], winner)?;
    cascade(t, Settled::Completed(idx))
}

/// Resolve opening-round byes right after generation.
pub(crate) fn settle_opening_round(t: &mut Tournament) -> Result<(), TournamentError> {
    let opening: Vec<usize> = t
        .matches
        .iter()
        .enumerate()
        .filter(|(_, m)| {
            matches!(
                m.bracket_position,
                BracketPosition::Main { round: 1, .. } | BracketPosition::Winners { round: 1, .. }
            )
        })
        .map(|(i, _)| i)
        .collect();
    for idx in opening {
        if let Some(settled) = settle_slots(t, idx)? {
            cascade(t, settled)?;
        }
    }
    Ok(())
}

fn cascade(t: &mut Tournament, first: Settled) -> Result<(), TournamentError> {
    let mut queue = VecDeque::from([first]);
    while let Some(settled) = queue.pop_front() {
        let follow_ups = match settled {
            Settled::Completed(idx) => route_result(t, idx)?,
            Settled::Voided(idx) => route_void(t, idx)?,
        };
        queue.extend(follow_ups);
    }
    Ok(())
}

fn route_result(t: &mut Tournament, idx: usize) -> Result<Vec<Settled>, TournamentError> {
    match t.matches[idx].bracket_position {
        BracketPosition::GrandFinal => return grand_final::decide(t, idx),
        BracketPosition::GrandFinalReset => {
            grand_final::finish_reset(t, idx)?;
            return Ok(Vec::new());
        }
        _ => {}
    }
    let m = &t.matches[idx];
    let winner_id = m.winner_id.ok_or(TournamentError::InvalidTransition {
        from: m.status,
        action: "advance without a winner",
    })?;
    let winner_slot = m
        .slot_of_entrant(winner_id)
        .ok_or(TournamentError::WinnerNotParticipant(winner_id))?;
    let winner_side = m.slot(winner_slot).participant().map(|p| p.side.clone());
    let loser_side = m.slot(winner_slot.other()).participant().map(|p| p.side.clone());
    let (winner_to, loser_to) = (m.winner_to, m.loser_to);

    let Some(winner_to) = winner_to else {
        // Only the single-elimination final routes nowhere.
        t.crown(winner_id);
        return Ok(Vec::new());
    };
    let mut follow_ups = Vec::new();
    follow_ups.extend(seat(t, winner_to, winner_side)?);
    if let Some(loser_to) = loser_to {
        follow_ups.extend(seat(t, loser_to, loser_side)?);
    }
    Ok(follow_ups)
}

fn route_void(t: &mut Tournament, idx: usize) -> Result<Vec<Settled>, TournamentError> {
    let m = &t.matches[idx];
    let targets: Vec<SlotRef> = m.winner_to.into_iter().chain(m.loser_to).collect();
    let mut follow_ups = Vec::new();
    for target in targets {
        follow_ups.extend(seat(t, target, None)?);
    }
    Ok(follow_ups)
}

/// Write `side` (or a ghost when `None`) into `target`.
///
/// Re-seating the same entrant is a no-op; anything else in an occupied slot is a
/// conflict. Returns the target if it settled by itself as a result.
pub(crate) fn seat(
    t: &mut Tournament,
    target: SlotRef,
    side: Option<Side>,
) -> Result<Option<Settled>, TournamentError> {
    let idx = t.position_index(target.position)?;
    let m = &mut t.matches[idx];
    if m.status.is_terminal() {
        log::warn!(
            "Not seating into {} of tournament {}: match is {}",
            target.position,
            m.tournament_id,
            m.status
        );
        return Ok(None);
    }
    let current = m.slot(target.slot);
    let repeat = match (current, &side) {
        (SlotEntry::Bye, None) => true,
        (SlotEntry::Filled(p), Some(s)) => p.entrant_id() == s.entrant_id(),
        _ => false,
    };
    if repeat {
        return Ok(None);
    }
    if !current.is_open() {
        return Err(TournamentError::SlotOccupied {
            position: target.position,
        });
    }
    log::debug!(
        "Seating {} into {} slot {}",
        side.as_ref()
            .map(|s| s.entrant_id().to_string())
            .unwrap_or_else(|| "bye".to_string()),
        target.position,
        target.slot.number()
    );
    *m.slot_mut(target.slot) = match side {
        Some(side) => SlotEntry::Filled(MatchParticipant::seat(side, target.slot)),
        None => SlotEntry::Bye,
    };
    m.touch();
    settle_slots(t, idx)
}

/// Decide whether match `idx` resolves itself now that its slots changed.
fn settle_slots(t: &mut Tournament, idx: usize) -> Result<Option<Settled>, TournamentError> {
    let m = &mut t.matches[idx];
    if m.status.is_terminal() {
        return Ok(None);
    }
    let filled = |s: &SlotEntry| s.participant().is_some();
    let outcome = match (&m.slots[0], &m.slots[1]) {
        (one, two) if filled(one) && filled(two) => SlotOutcome::Ready,
        (one, two) if filled(one) && two.is_bye() => SlotOutcome::Bye(Slot::One),
        (one, two) if one.is_bye() && filled(two) => SlotOutcome::Bye(Slot::Two),
        (one, two) if one.is_bye() && two.is_bye() => SlotOutcome::Void,
        _ => SlotOutcome::Wait,
    };
    match outcome {
        SlotOutcome::Wait => Ok(None),
        SlotOutcome::Ready => {
            if m.status == MatchStatus::Pending && m.dartboard_id.is_some() {
                m.status = MatchStatus::WaitingForPlayers;
            }
            Ok(None)
        }
        SlotOutcome::Bye(winner) => {
            log::debug!("{} auto-completes as a bye", m.bracket_position);
            mark_completed(m, winner)?;
            Ok(Some(Settled::Completed(idx)))
        }
        SlotOutcome::Void => {
            log::debug!("{} has two ghosts; cancelled", m.bracket_position);
            void_match(m);
            Ok(Some(Settled::Voided(idx)))
        }
    }
}
