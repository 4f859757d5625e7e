//! d20 attribute checks.

use rand::Rng;
use std::fmt;

use crate::types::ATTRIBUTES;

/// Lowest and highest starting attribute score
pub const STARTING_SCORE_RANGE: std::ops::RangeInclusive<i32> = 8..=18;

/// Standard ability modifier: floor((score - 10) / 2)
pub fn modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Roll a fresh set of starting attributes
pub fn roll_attributes(rng: &mut impl Rng) -> Vec<(String, i32)> {
    ATTRIBUTES
        .iter()
        .map(|name| (name.to_string(), rng.gen_range(STARTING_SCORE_RANGE)))
        .collect()
}

/// Outcome of comparing a check total against a difficulty class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "Success"),
            Outcome::Failure => write!(f, "Failure"),
        }
    }
}

/// A resolved `roll <STAT> [DC]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatCheck {
    pub die: i32,
    pub modifier: i32,
    pub total: i32,
    pub dc: Option<i32>,
}

impl StatCheck {
    /// Resolve a check with an already-rolled die
    pub fn resolve(score: i32, die: i32, dc: Option<i32>) -> Self {
        let modifier = modifier(score);
        Self {
            die,
            modifier,
            total: die + modifier,
            dc,
        }
    }

    /// Roll a d20 and resolve
    pub fn roll(score: i32, dc: Option<i32>, rng: &mut impl Rng) -> Self {
        Self::resolve(score, rng.gen_range(1..=20), dc)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.dc.map(|dc| {
            if self.total >= dc {
                Outcome::Success
            } else {
                Outcome::Failure
            }
        })
    }
}

impl fmt::Display for StatCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rolled 1d20 ({}) {:+} = {}",
            self.die, self.modifier, self.total
        )?;
        if let (Some(dc), Some(outcome)) = (self.dc, self.outcome()) {
            write!(f, " vs DC {}: {}", dc, outcome)?;
        }
        Ok(())
    }
}
