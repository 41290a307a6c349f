//! Seed order for a bracket: as listed by the organiser, or by skill level.

use crate::models::Entrant;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// How entrants are ordered into seeds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Use the given order, or each entrant's explicit seed when every entrant has one.
    #[default]
    AsListed,
    /// Highest skill first; random order among equal skill levels.
    BySkill,
}

/// Order `entrants` into seeds and number them 1..=N.
pub fn seed_entrants<R: Rng + ?Sized>(
    mut entrants: Vec<Entrant>,
    method: SeedingMethod,
    rng: &mut R,
) -> Vec<Entrant> {
    match method {
        SeedingMethod::AsListed => {
            if entrants.iter().all(|e| e.seed.is_some()) {
                entrants.sort_by_key(|e| e.seed);
            }
        }
        SeedingMethod::BySkill => {
            // Shuffle first; the stable sort keeps that order within a skill level.
            entrants.shuffle(rng);
            entrants.sort_by_key(|e| Reverse(e.skill_level));
        }
    }
    for (i, e) in entrants.iter_mut().enumerate() {
        e.seed = Some(i as u32 + 1);
    }
    entrants
}
