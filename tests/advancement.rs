//! Integration tests for advancement: winners and losers reach their slots, byes cascade,
//! and the grand final decides the champion.

mod common;

use common::{at, entrant_in, losses, play, play_out, pool_with_boards, started};
use dart_bracket_engine::{
    cancel_match, GameMatch, MatchStatus, Slot, SlotEntry, Tournament, TournamentFormat, TournamentStatus,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SINGLE: TournamentFormat = TournamentFormat::SingleElimination;
const DOUBLE: TournamentFormat = TournamentFormat::DoubleElimination;

type Pick = Box<dyn FnMut(&GameMatch) -> Slot>;

fn strategies() -> Vec<(&'static str, Pick)> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut flip = false;
    let top: Pick = Box::new(|_: &GameMatch| Slot::One);
    let bottom: Pick = Box::new(|_: &GameMatch| Slot::Two);
    let alternating: Pick = Box::new(move |_: &GameMatch| {
        flip = !flip;
        if flip {
            Slot::One
        } else {
            Slot::Two
        }
    });
    let random: Pick = Box::new(move |_: &GameMatch| if rng.gen_bool(0.5) { Slot::One } else { Slot::Two });
    vec![("top", top), ("bottom", bottom), ("alternating", alternating), ("random", random)]
}

/// Every routed result landed where the match says it goes.
fn assert_routes_honoured(t: &Tournament) {
    for m in t.matches.iter().filter(|m| m.status.is_terminal()) {
        let winner = m.winner_id;
        if let Some(target) = m.winner_to {
            let entry = t.match_at(target.position).unwrap().slot(target.slot);
            match winner {
                Some(id) => assert_eq!(
                    entry.participant().map(|p| p.entrant_id()),
                    Some(id),
                    "{} winner missing from {}",
                    m.bracket_position,
                    target.position
                ),
                None if m.status == MatchStatus::Cancelled => assert!(entry.is_bye()),
                None => unreachable!(),
            }
        }
        if let Some(target) = m.loser_to {
            let entry = t.match_at(target.position).unwrap().slot(target.slot);
            let loser = m
                .participants()
                .map(|p| p.entrant_id())
                .find(|id| Some(*id) != winner);
            match loser {
                Some(id) => assert_eq!(entry.participant().map(|p| p.entrant_id()), Some(id)),
                None => assert!(entry.is_bye(), "{} should forward a ghost", m.bracket_position),
            }
        }
    }
}

#[test]
fn single_elimination_plays_out_to_one_champion() {
    for n in 2..=20 {
        for (name, pick) in strategies() {
            let mut t = started(SINGLE, n);
            play_out(&mut t, pick);
            assert_eq!(t.status, TournamentStatus::Completed, "n = {n}, {name}");
            assert!(t.matches.iter().all(|m| m.status == MatchStatus::Completed));
            let champion = t.champion_id.unwrap();
            let lost = losses(&t);
            assert_eq!(lost[&champion], 0);
            for e in t.entrants.iter().filter(|e| e.id != champion) {
                assert_eq!(lost[&e.id], 1, "n = {n}, {name}: {}", e.name);
            }
            assert_routes_honoured(&t);
        }
    }
}

#[test]
fn double_elimination_eliminates_on_the_second_loss() {
    for n in 2..=20 {
        for (name, pick) in strategies() {
            let mut t = started(DOUBLE, n);
            play_out(&mut t, pick);
            assert_eq!(t.status, TournamentStatus::Completed, "n = {n}, {name}");
            assert!(t.matches.iter().all(|m| m.status.is_terminal()));
            let champion = t.champion_id.unwrap();
            let lost = losses(&t);
            assert!(lost[&champion] <= 1);
            for e in t.entrants.iter().filter(|e| e.id != champion) {
                assert_eq!(lost[&e.id], 2, "n = {n}, {name}: {}", e.name);
            }
            assert_routes_honoured(&t);
        }
    }
}

#[test]
fn winner_is_written_into_the_next_round() {
    let mut t = started(SINGLE, 4);
    let mut pool = pool_with_boards(2);
    let semi = at(&t, "R1M2");
    play(&mut t, &mut pool, semi.id, Slot::Two);
    let final_match = at(&t, "R2M1");
    assert_eq!(entrant_in(&final_match, Slot::Two), entrant_in(&semi, Slot::Two));
    assert!(final_match.slot(Slot::One).is_open());
    assert_eq!(final_match.status, MatchStatus::Pending);
}

#[test]
fn winners_bracket_loser_drops_into_losers_bracket() {
    let mut t = started(DOUBLE, 8);
    let mut pool = pool_with_boards(2);
    let m = at(&t, "WR1M3");
    play(&mut t, &mut pool, m.id, Slot::One);
    let winners_next = at(&t, "WR2M2");
    assert_eq!(entrant_in(&winners_next, Slot::One), entrant_in(&m, Slot::One));
    let losers_next = at(&t, "LR1M2");
    assert_eq!(entrant_in(&losers_next, Slot::One), entrant_in(&m, Slot::Two));
}

#[test]
fn grand_final_won_from_winners_bracket_ends_the_tournament() {
    let mut t = started(DOUBLE, 4);
    play_out(&mut t, |_| Slot::One);
    let gf1 = at(&t, "GF1");
    let gf2 = at(&t, "GF2");
    assert_eq!(gf1.status, MatchStatus::Completed);
    assert_eq!(gf2.status, MatchStatus::Cancelled);
    assert!(gf2.slots.iter().all(SlotEntry::is_open));
    assert_eq!(t.champion_id, gf1.winner_id);
    assert_eq!(t.champion_id, Some(t.entrants[0].id));
    assert!(t.completed_at.is_some());
}

#[test]
fn grand_final_won_from_losers_bracket_forces_a_reset() {
    let mut t = started(DOUBLE, 4);
    let mut pool = pool_with_boards(1);
    // Top seed runs the winners bracket, then loses the first grand final.
    for code in ["WR1M1", "WR1M2", "WR2M1", "LR1M1", "LR2M1"] {
        let id = at(&t, code).id;
        play(&mut t, &mut pool, id, Slot::One);
    }
    let gf1 = at(&t, "GF1");
    let winners_champion = entrant_in(&gf1, Slot::One);
    let losers_champion = entrant_in(&gf1, Slot::Two);
    play(&mut t, &mut pool, gf1.id, Slot::Two);

    assert_eq!(t.status, TournamentStatus::InProgress);
    assert!(t.champion_id.is_none());
    let gf2 = at(&t, "GF2");
    assert_eq!(gf2.status, MatchStatus::Pending);
    assert_eq!(entrant_in(&gf2, Slot::One), winners_champion);
    assert_eq!(entrant_in(&gf2, Slot::Two), losers_champion);

    play(&mut t, &mut pool, gf2.id, Slot::One);
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.champion_id, Some(winners_champion));
}

#[test]
fn cancelled_reset_lets_the_first_grand_final_decide() {
    let mut t = started(DOUBLE, 4);
    let mut pool = pool_with_boards(1);
    for code in ["WR1M1", "WR1M2", "WR2M1", "LR1M1", "LR2M1"] {
        let id = at(&t, code).id;
        play(&mut t, &mut pool, id, Slot::One);
    }
    let gf2 = at(&t, "GF2").id;
    cancel_match(&mut t, gf2).unwrap();

    let gf1 = at(&t, "GF1");
    let losers_champion = entrant_in(&gf1, Slot::Two);
    play(&mut t, &mut pool, gf1.id, Slot::Two);

    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.champion_id, Some(losers_champion));
    assert_eq!(at(&t, "GF2").status, MatchStatus::Cancelled);
}

#[test]
fn reset_winner_from_losers_bracket_is_champion() {
    let mut t = started(DOUBLE, 2);
    play_out(&mut t, |_| Slot::Two);
    assert_eq!(at(&t, "GF2").status, MatchStatus::Completed);
    // P2 takes the opening match, then P1 wins both grand finals from the losers side.
    assert_eq!(t.champion_id, Some(t.entrants[0].id));
    assert_eq!(losses(&t)[&t.entrants[0].id], 1);
    assert_eq!(losses(&t)[&t.entrants[1].id], 2);
}

#[test]
fn two_ghosts_cancel_a_losers_match_and_pass_a_ghost_on() {
    let t = started(DOUBLE, 5);
    let void = at(&t, "LR1M2");
    assert_eq!(void.status, MatchStatus::Cancelled);
    assert!(void.winner_id.is_none());
    assert!(void.slots.iter().all(SlotEntry::is_bye));
    assert!(at(&t, "LR2M2").slot(Slot::One).is_bye());

    let waiting = at(&t, "LR1M1");
    assert!(waiting.slot(Slot::One).is_bye());
    assert!(waiting.slot(Slot::Two).is_open());
    assert_eq!(waiting.status, MatchStatus::Pending);
}

#[test]
fn ghost_opponent_in_losers_bracket_completes_on_arrival_of_the_loser() {
    let mut t = started(DOUBLE, 5);
    let mut pool = pool_with_boards(1);
    let m = at(&t, "WR1M2");
    play(&mut t, &mut pool, m.id, Slot::One);
    let fed = at(&t, "LR1M1");
    assert_eq!(fed.status, MatchStatus::Completed);
    assert_eq!(fed.winner_id, Some(entrant_in(&m, Slot::Two)));
    assert_eq!(entrant_in(&at(&t, "LR2M1"), Slot::One), entrant_in(&m, Slot::Two));
}

#[test]
fn completion_bumps_version_of_every_written_match() {
    let mut t = started(SINGLE, 4);
    let mut pool = pool_with_boards(1);
    let before = at(&t, "R2M1").version;
    let id = at(&t, "R1M1").id;
    play(&mut t, &mut pool, id, Slot::One);
    assert!(at(&t, "R2M1").version > before);
}
