//! Piece tier table
//!
//! Static per-tier data: relative size factor and fusion score, rank-ordered.
//! The table is validated once when built; every lookup after that is a plain
//! indexed read. The last rank is the terminal tier and never fuses.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Immutable attributes of one tier rank
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierEntry {
    /// Multiplier applied to the base piece diameter
    pub size_factor: f32,
    /// Points paid when two pieces of this tier fuse
    pub score: u32,
}

/// Rank-ordered tier data, validated at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    entries: Vec<TierEntry>,
}

impl TierTable {
    /// Build a validated table: at least two tiers, size factors
    /// non-decreasing, scores positive and strictly increasing.
    pub fn new(entries: Vec<TierEntry>) -> Result<Self, GameError> {
        if entries.len() < 2 {
            return Err(GameError::InvalidTier(entries.len() as u8));
        }
        for (rank, entry) in entries.iter().enumerate() {
            if entry.score == 0 {
                return Err(GameError::InvalidScore(rank as u8));
            }
            if rank > 0 {
                let prev = &entries[rank - 1];
                if entry.score <= prev.score {
                    return Err(GameError::InvalidScore(rank as u8));
                }
                if entry.size_factor < prev.size_factor {
                    return Err(GameError::InvalidTier(rank as u8));
                }
            }
        }
        Ok(Self { entries })
    }

    /// The 10-tier reference progression. Ranks 0..=6 grow 30% per tier;
    /// the last three jump to 3.5x / 4.0x / 5.0x.
    pub fn standard() -> Self {
        let scores: [u32; 10] = [10, 15, 20, 30, 50, 100, 500, 1000, 4000, 10000];
        let entries = scores
            .iter()
            .enumerate()
            .map(|(rank, &score)| {
                let size_factor = match rank {
                    0..=6 => 1.3 + rank as f32 * 0.3,
                    7 => 3.5,
                    8 => 4.0,
                    _ => 5.0,
                };
                TierEntry { size_factor, score }
            })
            .collect();
        // Literal data; `test_standard_table_validates` keeps it honest.
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank of the terminal tier (the last entry)
    pub fn terminal(&self) -> u8 {
        (self.entries.len() - 1) as u8
    }

    pub fn is_terminal(&self, tier: u8) -> bool {
        tier == self.terminal()
    }

    pub fn contains(&self, tier: u8) -> bool {
        (tier as usize) < self.entries.len()
    }

    /// Size factor lookup; `InvalidTier` outside the table
    pub fn size_factor(&self, tier: u8) -> Result<f32, GameError> {
        self.entries
            .get(tier as usize)
            .map(|e| e.size_factor)
            .ok_or(GameError::InvalidTier(tier))
    }

    /// Score lookup; `InvalidScore` when undefined or non-positive
    pub fn score(&self, tier: u8) -> Result<u32, GameError> {
        match self.entries.get(tier as usize) {
            Some(entry) if entry.score > 0 => Ok(entry.score),
            _ => Err(GameError::InvalidScore(tier)),
        }
    }

    /// The tier a fusion of `tier` produces; `None` for the terminal tier
    pub fn next(&self, tier: u8) -> Option<u8> {
        if self.contains(tier) && !self.is_terminal(tier) {
            Some(tier + 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_validates() {
        let table = TierTable::standard();
        let revalidated = TierTable::new(table.entries.clone());
        assert!(revalidated.is_ok(), "reference table must pass validation");
        assert_eq!(table.len(), 10);
        assert_eq!(table.terminal(), 9);
    }

    #[test]
    fn test_score_and_size_lookups() {
        let table = TierTable::standard();
        assert_eq!(table.score(0), Ok(10));
        assert_eq!(table.score(9), Ok(10000));
        assert!((table.size_factor(0).unwrap() - 1.3).abs() < 1e-6);
        assert!((table.size_factor(9).unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_lookups_fail() {
        let table = TierTable::standard();
        assert_eq!(table.size_factor(10), Err(GameError::InvalidTier(10)));
        assert_eq!(table.score(10), Err(GameError::InvalidScore(10)));
    }

    #[test]
    fn test_next_tier_progression() {
        let table = TierTable::standard();
        assert_eq!(table.next(0), Some(1));
        assert_eq!(table.next(8), Some(9));
        assert_eq!(table.next(9), None, "terminal tier never fuses");
        assert_eq!(table.next(42), None);
    }

    #[test]
    fn test_validation_rejects_bad_tables() {
        let entry = |size_factor, score| TierEntry { size_factor, score };

        assert!(TierTable::new(vec![entry(1.0, 10)]).is_err(), "one tier is not a game");
        assert_eq!(
            TierTable::new(vec![entry(1.0, 10), entry(1.2, 10)]),
            Err(GameError::InvalidScore(1)),
            "scores must strictly increase"
        );
        assert_eq!(
            TierTable::new(vec![entry(1.0, 0), entry(1.2, 10)]),
            Err(GameError::InvalidScore(0)),
            "scores must be positive"
        );
        assert_eq!(
            TierTable::new(vec![entry(2.0, 10), entry(1.0, 20)]),
            Err(GameError::InvalidTier(1)),
            "size factors must not shrink with rank"
        );
    }
}
