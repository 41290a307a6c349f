//! Bracket topology: which matches exist for a given size, and where every result goes.
//!
//! Routing is a pure function of the bracket shape and a match's own position. It is
//! evaluated once at generation time and stored on each match.

use crate::models::{BracketPosition, Slot, SlotRef, TournamentError, TournamentFormat};

/// Destinations of a match's winner and loser. Empty for championship matches.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Routing {
    pub winner_to: Option<SlotRef>,
    pub loser_to: Option<SlotRef>,
}

/// A match the generator will create.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlannedMatch {
    pub position: BracketPosition,
    /// Play order: a match never depends on a match with a higher round number.
    pub round_number: u32,
    pub round_name: String,
}

/// Size and format of a bracket. Everything else is derived from these.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BracketShape {
    pub format: TournamentFormat,
    pub bracket_size: u32,
    /// log2(bracket_size): rounds of the main (or winners) bracket.
    pub winners_rounds: u32,
}

impl BracketShape {
    /// Shape for `entrant_count` entrants. Rejects fewer than 2 entrants and round robin.
    pub fn new(format: TournamentFormat, entrant_count: usize) -> Result<Self, TournamentError> {
        if format == TournamentFormat::RoundRobin {
            return Err(TournamentError::UnsupportedFormat(format.as_str().to_string()));
        }
        if entrant_count < 2 {
            return Err(TournamentError::NotEnoughEntrants {
                count: entrant_count,
            });
        }
        let bracket_size = (entrant_count as u32).next_power_of_two();
        Ok(Self {
            format,
            bracket_size,
            winners_rounds: bracket_size.trailing_zeros(),
        })
    }

    fn is_double(&self) -> bool {
        self.format == TournamentFormat::DoubleElimination
    }

    /// 2 × (winners_rounds − 1) in double elimination, else none.
    pub fn losers_rounds(&self) -> u32 {
        if self.is_double() {
            2 * (self.winners_rounds - 1)
        } else {
            0
        }
    }

    pub fn matches_in_winners_round(&self, round: u32) -> u32 {
        self.bracket_size >> round
    }

    /// Losers rounds come in pairs of equal size, halving every pair.
    pub fn matches_in_losers_round(&self, round: u32) -> u32 {
        self.bracket_size >> ((round + 1) / 2 + 1)
    }

    pub fn total_matches(&self) -> u32 {
        let main = self.bracket_size - 1;
        if self.is_double() {
            let losers: u32 = (1..=self.losers_rounds())
                .map(|r| self.matches_in_losers_round(r))
                .sum();
            main + losers + 2
        } else {
            main
        }
    }

    /// Round-1 coordinate of the `index`-th (1-based) opening match.
    pub fn first_round_position(&self, index: u32) -> BracketPosition {
        if self.is_double() {
            BracketPosition::Winners { round: 1, index }
        } else {
            BracketPosition::Main { round: 1, index }
        }
    }

    pub fn contains(&self, position: BracketPosition) -> bool {
        let k = self.winners_rounds;
        match position {
            BracketPosition::Main { round, index } => {
                !self.is_double()
                    && (1..=k).contains(&round)
                    && (1..=self.matches_in_winners_round(round)).contains(&index)
            }
            BracketPosition::Winners { round, index } => {
                self.is_double()
                    && (1..=k).contains(&round)
                    && (1..=self.matches_in_winners_round(round)).contains(&index)
            }
            BracketPosition::Losers { round, index } => {
                self.is_double()
                    && (1..=self.losers_rounds()).contains(&round)
                    && (1..=self.matches_in_losers_round(round)).contains(&index)
            }
            BracketPosition::GrandFinal | BracketPosition::GrandFinalReset => self.is_double(),
        }
    }

    /// Every match of the bracket in creation order: main/winners rounds, losers rounds,
    /// then the grand final pair.
    pub fn plan(&self) -> Vec<PlannedMatch> {
        let k = self.winners_rounds;
        let mut planned = Vec::with_capacity(self.total_matches() as usize);
        for round in 1..=k {
            for index in 1..=self.matches_in_winners_round(round) {
                let position = if self.is_double() {
                    BracketPosition::Winners { round, index }
                } else {
                    BracketPosition::Main { round, index }
                };
                planned.push(PlannedMatch {
                    position,
                    round_number: round,
                    round_name: self.round_name(position),
                });
            }
        }
        if !self.is_double() {
            return planned;
        }
        let l = self.losers_rounds();
        for round in 1..=l {
            for index in 1..=self.matches_in_losers_round(round) {
                let position = BracketPosition::Losers { round, index };
                planned.push(PlannedMatch {
                    position,
                    round_number: round + 1,
                    round_name: self.round_name(position),
                });
            }
        }
        let grand_final_round = k.max(l + 1) + 1;
        for (offset, position) in [BracketPosition::GrandFinal, BracketPosition::GrandFinalReset]
            .into_iter()
            .enumerate()
        {
            planned.push(PlannedMatch {
                position,
                round_number: grand_final_round + offset as u32,
                round_name: self.round_name(position),
            });
        }
        planned
    }

    /// Human-readable round label.
    pub fn round_name(&self, position: BracketPosition) -> String {
        let k = self.winners_rounds;
        match position {
            BracketPosition::Main { round, .. } => {
                if round == k {
                    "Final".to_string()
                } else if k > 1 && round == k - 1 {
                    "Semi-Final".to_string()
                } else if k > 2 && round == k - 2 {
                    "Quarter-Final".to_string()
                } else {
                    format!("Round {}", round)
                }
            }
            BracketPosition::Winners { round, .. } => {
                if round == k {
                    "Winners Final".to_string()
                } else {
                    format!("Winners Round {}", round)
                }
            }
            BracketPosition::Losers { round, .. } => {
                if round == self.losers_rounds() {
                    "Losers Final".to_string()
                } else {
                    format!("Losers Round {}", round)
                }
            }
            BracketPosition::GrandFinal => "Grand Final".to_string(),
            BracketPosition::GrandFinalReset => "Grand Final Reset".to_string(),
        }
    }

    /// Where the winner (and, in double elimination, the loser) of `position` goes.
    ///
    /// Total over the bracket: `None` only for positions outside it. The grand final
    /// pair has no table routes; the decider is resolved separately.
    pub fn route(&self, position: BracketPosition) -> Option<Routing> {
        if !self.contains(position) {
            return None;
        }
        let k = self.winners_rounds;
        let l = self.losers_rounds();
        let halve = |i: u32| (i + 1) / 2;
        let routing = match position {
            BracketPosition::Main { round, index } => Routing {
                winner_to: (round < k).then(|| {
                    SlotRef::new(
                        BracketPosition::Main {
                            round: round + 1,
                            index: halve(index),
                        },
                        Slot::for_source_index(index),
                    )
                }),
                loser_to: None,
            },
            BracketPosition::Winners { round, index } => {
                let winner_to = if round < k {
                    SlotRef::new(
                        BracketPosition::Winners {
                            round: round + 1,
                            index: halve(index),
                        },
                        Slot::for_source_index(index),
                    )
                } else {
                    SlotRef::new(BracketPosition::GrandFinal, Slot::One)
                };
                let loser_to = if l == 0 {
                    SlotRef::new(BracketPosition::GrandFinal, Slot::Two)
                } else if round == 1 {
                    SlotRef::new(
                        BracketPosition::Losers {
                            round: 1,
                            index: halve(index),
                        },
                        Slot::for_source_index(index),
                    )
                } else {
                    // Drop-in rounds take winners-bracket losers in reverse order.
                    let count = self.matches_in_winners_round(round);
                    SlotRef::new(
                        BracketPosition::Losers {
                            round: 2 * (round - 1),
                            index: count - index + 1,
                        },
                        Slot::Two,
                    )
                };
                Routing {
                    winner_to: Some(winner_to),
                    loser_to: Some(loser_to),
                }
            }
            BracketPosition::Losers { round, index } => {
                let winner_to = if round == l {
                    SlotRef::new(BracketPosition::GrandFinal, Slot::Two)
                } else if round % 2 == 1 {
                    SlotRef::new(BracketPosition::Losers { round: round + 1, index }, Slot::One)
                } else {
                    SlotRef::new(
                        BracketPosition::Losers {
                            round: round + 1,
                            index: halve(index),
                        },
                        Slot::for_source_index(index),
                    )
                };
                Routing {
                    winner_to: Some(winner_to),
                    loser_to: None,
                }
            }
            BracketPosition::GrandFinal | BracketPosition::GrandFinalReset => Routing::default(),
        };
        Some(routing)
    }
}

/// Standard elimination seeding: seed order of the round-1 slots, top seed first.
///
/// Seed `s` always meets `size + 1 - s` in round 1, and the top two seeds can only meet
/// in the final.
pub fn seed_order(bracket_size: u32) -> Vec<u32> {
    let mut order = vec![1];
    while (order.len() as u32) < bracket_size {
        let sum = order.len() as u32 * 2 + 1;
        order = order.iter().flat_map(|&s| [s, sum - s]).collect();
    }
    order
}
