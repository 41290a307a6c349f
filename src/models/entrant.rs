//! Entrant data: a single player or a paired team, as handed over by the registry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bracket entrant (player id for singles, team id for doubles).
pub type EntrantId = Uuid;

/// Unique identifier for an individual player inside a team.
pub type PlayerId = Uuid;

/// One player of a doubles team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub player_id: PlayerId,
    pub name: String,
    /// 1 or 2 within the team.
    pub team_position: u8,
}

/// Who stands behind an entrant.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Roster {
    #[default]
    Single,
    Team { members: Vec<TeamMember> },
}

/// A bracket entrant. Owned by the external registry; the engine only reads it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub name: String,
    /// 1-based seed. Assigned at bracket generation if absent.
    #[serde(default)]
    pub seed: Option<u32>,
    /// Used by skill seeding; higher is stronger.
    #[serde(default)]
    pub skill_level: u32,
    #[serde(default)]
    pub roster: Roster,
}

impl Entrant {
    /// A single-player entrant with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            seed: None,
            skill_level: 0,
            roster: Roster::Single,
        }
    }

    /// A doubles team. Members are numbered 1.. in the given order.
    pub fn team(name: impl Into<String>, members: Vec<(PlayerId, String)>) -> Self {
        let members = members
            .into_iter()
            .enumerate()
            .map(|(i, (player_id, name))| TeamMember {
                player_id,
                name,
                team_position: (i + 1) as u8,
            })
            .collect();
        Self {
            roster: Roster::Team { members },
            ..Self::new(name)
        }
    }

    pub fn with_skill(mut self, skill_level: u32) -> Self {
        self.skill_level = skill_level;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}
