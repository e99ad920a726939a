use std::fmt;
use std::str::FromStr;

use crate::error::RecordError;

/// Number of decades tracked per name.
pub const NDECADES: usize = 10;

/// Year of the first tracked decade.
pub const START_DECADE: u16 = 1900;

/// Largest rank stored in the data set.
pub const MAX_RANK: u16 = 1000;

/// Popularity of a name in one decade.
///
/// The data file encodes "not in the top `MAX_RANK`" as `0`; that sentinel is
/// kept out of every coordinate computation by giving it its own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rank {
    Ranked(u16),
    Unranked,
}

impl Rank {
    /// Build a rank from its on-disk value, rejecting anything above `MAX_RANK`.
    pub fn from_raw(value: i64) -> Result<Self, RecordError> {
        match value {
            0 => Ok(Rank::Unranked),
            v if v > 0 && v <= MAX_RANK as i64 => Ok(Rank::Ranked(v as u16)),
            _ => Err(RecordError::RankOutOfRange {
                value,
                max: MAX_RANK,
            }),
        }
    }

    /// The value as written in the data file (`0` for unranked).
    pub fn raw(self) -> u16 {
        match self {
            Rank::Ranked(n) => n,
            Rank::Unranked => 0,
        }
    }

    pub fn is_ranked(self) -> bool {
        matches!(self, Rank::Ranked(_))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

/// A name together with its rank in each tracked decade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankSeries {
    name: String,
    ranks: [Rank; NDECADES],
}

impl RankSeries {
    /// The name is stored lowercased so it can serve as the lookup key.
    pub fn new(name: &str, ranks: [Rank; NDECADES]) -> Self {
        Self {
            name: name.to_lowercase(),
            ranks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ranks(&self) -> &[Rank; NDECADES] {
        &self.ranks
    }

    /// Rank in the given decade index. Panics if `decade >= NDECADES`.
    pub fn rank(&self, decade: usize) -> Rank {
        self.ranks[decade]
    }

    /// Calendar year that starts decade `decade`.
    pub fn decade_year(decade: usize) -> u32 {
        START_DECADE as u32 + 10 * decade as u32
    }
}

impl AsRef<RankSeries> for RankSeries {
    fn as_ref(&self) -> &RankSeries {
        self
    }
}

impl fmt::Display for RankSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.name)?;
        for (i, rank) in self.ranks.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", rank)?;
        }
        f.write_str("]")
    }
}

impl FromStr for RankSeries {
    type Err = RecordError;

    /// Parse `name r0 r1 ... r9`, whitespace separated.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != NDECADES + 1 {
            return Err(RecordError::WrongTokenCount {
                expected: NDECADES,
                found: tokens.len(),
            });
        }

        let mut ranks = [Rank::Unranked; NDECADES];
        for (slot, token) in ranks.iter_mut().zip(&tokens[1..]) {
            let value: i64 = token.parse().map_err(|_| RecordError::InvalidRank {
                token: (*token).to_string(),
            })?;
            *slot = Rank::from_raw(value)?;
        }

        Ok(RankSeries::new(tokens[0], ranks))
    }
}
