//! Bracket coordinates: `R{r}M{i}`, `WR{r}M{i}`, `LR{r}M{i}`, `GF1`, `GF2`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of the two participant slots of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    One,
    Two,
}

impl Slot {
    /// 0-based array index.
    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }

    /// Odd 1-based source indices feed slot one, even ones slot two.
    pub fn for_source_index(index: u32) -> Slot {
        if index % 2 == 1 {
            Slot::One
        } else {
            Slot::Two
        }
    }

    /// 1 or 2, as rendered.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Which bracket a position belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSide {
    Main,
    Winners,
    Losers,
    GrandFinal,
}

/// A match coordinate. Ordered by bracket, then round, then index.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BracketPosition {
    /// Single elimination `R{round}M{index}`.
    Main { round: u32, index: u32 },
    /// Double elimination winners bracket `WR{round}M{index}`.
    Winners { round: u32, index: u32 },
    /// Double elimination losers bracket `LR{round}M{index}`.
    Losers { round: u32, index: u32 },
    /// `GF1`
    GrandFinal,
    /// `GF2`
    GrandFinalReset,
}

impl BracketPosition {
    pub fn side(&self) -> BracketSide {
        match self {
            BracketPosition::Main { .. } => BracketSide::Main,
            BracketPosition::Winners { .. } => BracketSide::Winners,
            BracketPosition::Losers { .. } => BracketSide::Losers,
            BracketPosition::GrandFinal | BracketPosition::GrandFinalReset => BracketSide::GrandFinal,
        }
    }

    /// True for any coordinate that only exists in double elimination.
    pub fn is_double_elimination(&self) -> bool {
        !matches!(self, BracketPosition::Main { .. })
    }
}

impl fmt::Display for BracketPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketPosition::Main { round, index } => write!(f, "R{}M{}", round, index),
            BracketPosition::Winners { round, index } => write!(f, "WR{}M{}", round, index),
            BracketPosition::Losers { round, index } => write!(f, "LR{}M{}", round, index),
            BracketPosition::GrandFinal => write!(f, "GF1"),
            BracketPosition::GrandFinalReset => write!(f, "GF2"),
        }
    }
}

/// A string that is not a bracket coordinate.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid bracket position: {0}")]
pub struct ParsePositionError(pub String);

/// Parses the `R{n}M{n}` tail shared by all round-based codes.
fn parse_round_index(s: &str) -> Option<(u32, u32)> {
    let rest = s.strip_prefix('R')?;
    let (round, index) = rest.split_once('M')?;
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(round) || !all_digits(index) {
        return None;
    }
    let round: u32 = round.parse().ok()?;
    let index: u32 = index.parse().ok()?;
    if round == 0 || index == 0 {
        return None;
    }
    Some((round, index))
}

impl FromStr for BracketPosition {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePositionError(s.to_string());
        match s {
            "GF1" => Ok(BracketPosition::GrandFinal),
            "GF2" => Ok(BracketPosition::GrandFinalReset),
            _ => {
                if let Some(rest) = s.strip_prefix('W') {
                    let (round, index) = parse_round_index(rest).ok_or_else(err)?;
                    Ok(BracketPosition::Winners { round, index })
                } else if let Some(rest) = s.strip_prefix('L') {
                    let (round, index) = parse_round_index(rest).ok_or_else(err)?;
                    Ok(BracketPosition::Losers { round, index })
                } else {
                    let (round, index) = parse_round_index(s).ok_or_else(err)?;
                    Ok(BracketPosition::Main { round, index })
                }
            }
        }
    }
}

impl TryFrom<String> for BracketPosition {
    type Error = ParsePositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BracketPosition> for String {
    fn from(value: BracketPosition) -> Self {
        value.to_string()
    }
}

/// A specific slot of a specific match: the destination of a routed winner or loser.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SlotRef {
    pub position: BracketPosition,
    pub slot: Slot,
}

impl SlotRef {
    pub fn new(position: BracketPosition, slot: Slot) -> Self {
        Self { position, slot }
    }
}
