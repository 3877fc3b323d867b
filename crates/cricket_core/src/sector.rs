//! Sector identifiers, game settings and fixed-size per-sector tallies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// Highest numbered sector on a dartboard.
pub const MAX_NUMBER: u8 = 20;

/// Hit count at which a sector is closed for a player.
pub const CLOSED: u8 = 3;

/// Numbered slots plus one distinguished slot for the bull.
const SLOTS: usize = MAX_NUMBER as usize + 1;
const BULL_SLOT: usize = MAX_NUMBER as usize;

/// A target zone: a numbered sector or the bullseye.
///
/// Serialized as its label (`"20"`, `"Bull"`), which is the format used in
/// stored game records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sector {
    /// A numbered sector, `1..=20`.
    Number(u8),
    /// The bullseye.
    Bull,
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sector::Number(n) => write!(f, "{}", n),
            Sector::Bull => write!(f, "Bull"),
        }
    }
}

/// Error parsing a sector label.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Invalid sector '{}'", input)]
pub struct SectorParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Sector {
    type Err = SectorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("bull") || trimmed.eq_ignore_ascii_case("b") {
            return Ok(Sector::Bull);
        }
        match trimmed.parse::<u8>() {
            Ok(n) if (1..=MAX_NUMBER).contains(&n) => Ok(Sector::Number(n)),
            _ => Err(SectorParseError {
                input: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Sector {
    type Error = SectorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sector> for String {
    fn from(sector: Sector) -> Self {
        sector.to_string()
    }
}

/// Highest accepted bull value. Keeps scores far from `u32` overflow.
pub const MAX_BULL_POINTS: u32 = 100;

/// Sector configuration, fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Highest numbered sector in play.
    pub highest_sector: u8,
    /// Lowest numbered sector in play.
    pub lowest_sector: u8,
    /// Points awarded for a scoring bull hit.
    pub bull_points: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            highest_sector: MAX_NUMBER,
            lowest_sector: 15,
            bull_points: 25,
        }
    }
}

/// Reasons a game cannot be set up.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SetupError {
    /// A player name is empty.
    #[display("Player at index {} has an empty name", index)]
    EmptyName {
        /// Index of the offending player.
        index: usize,
    },
    /// The numbered sector range is not within `1..=20` or is inverted.
    #[display("Invalid sector range {}..={}", lowest, highest)]
    InvalidRange {
        /// Configured lowest sector.
        lowest: u8,
        /// Configured highest sector.
        highest: u8,
    },
    /// Bull hits must be worth something.
    #[display("Bull points must be positive")]
    ZeroBullPoints,
    /// Bull value above [`MAX_BULL_POINTS`].
    #[display("Bull points {} exceed the maximum of {}", points, MAX_BULL_POINTS)]
    BullPointsTooHigh {
        /// Configured bull value.
        points: u32,
    },
}

impl GameSettings {
    /// Creates settings for the given range and bull value.
    #[instrument]
    pub fn new(highest_sector: u8, lowest_sector: u8, bull_points: u32) -> Self {
        Self {
            highest_sector,
            lowest_sector,
            bull_points,
        }
    }

    /// Checks that the configuration describes a playable board.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] for an empty or out-of-range sector range or a
    /// bull value outside `1..=MAX_BULL_POINTS`.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.lowest_sector == 0
            || self.highest_sector > MAX_NUMBER
            || self.lowest_sector > self.highest_sector
        {
            return Err(SetupError::InvalidRange {
                lowest: self.lowest_sector,
                highest: self.highest_sector,
            });
        }
        if self.bull_points == 0 {
            return Err(SetupError::ZeroBullPoints);
        }
        if self.bull_points > MAX_BULL_POINTS {
            return Err(SetupError::BullPointsTooHigh {
                points: self.bull_points,
            });
        }
        Ok(())
    }

    /// Returns true if the sector is in play.
    pub fn contains(&self, sector: Sector) -> bool {
        match sector {
            Sector::Number(n) => (self.lowest_sector..=self.highest_sector).contains(&n),
            Sector::Bull => true,
        }
    }

    /// Sectors in play, highest number first, bull last.
    pub fn sectors(&self) -> impl Iterator<Item = Sector> + use<> {
        (self.lowest_sector..=self.highest_sector)
            .rev()
            .map(Sector::Number)
            .chain(std::iter::once(Sector::Bull))
    }

    /// Number of sectors in play, bull included.
    pub fn sector_count(&self) -> usize {
        usize::from(self.highest_sector.saturating_sub(self.lowest_sector)) + 2
    }

    /// Points a scoring hit on this sector is worth.
    pub fn points(&self, sector: Sector) -> u32 {
        match sector {
            Sector::Number(n) => u32::from(n),
            Sector::Bull => self.bull_points,
        }
    }
}

/// Per-sector counters stored in a fixed array.
///
/// Numbered sectors live at `sector - lowest`, the bull has its own slot.
/// Sectors outside the configured range read as zero and ignore writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorTally {
    lowest: u8,
    highest: u8,
    counts: [u8; SLOTS],
}

impl SectorTally {
    /// Creates an all-zero tally for the configured sectors.
    pub fn new(settings: &GameSettings) -> Self {
        Self {
            lowest: settings.lowest_sector,
            highest: settings.highest_sector,
            counts: [0; SLOTS],
        }
    }

    fn slot(&self, sector: Sector) -> Option<usize> {
        match sector {
            Sector::Number(n) if (self.lowest..=self.highest).contains(&n) => {
                Some(usize::from(n - self.lowest))
            }
            Sector::Number(_) => None,
            Sector::Bull => Some(BULL_SLOT),
        }
    }

    /// Returns the count for a sector.
    pub fn get(&self, sector: Sector) -> u8 {
        self.slot(sector).map_or(0, |i| self.counts[i])
    }

    pub(crate) fn increment(&mut self, sector: Sector) {
        if let Some(i) = self.slot(sector) {
            self.counts[i] = self.counts[i].saturating_add(1);
        }
    }

    pub(crate) fn decrement(&mut self, sector: Sector) {
        if let Some(i) = self.slot(sector) {
            self.counts[i] = self.counts[i].saturating_sub(1);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.counts = [0; SLOTS];
    }

    /// Iterates `(sector, count)` over every configured sector.
    pub fn iter(&self) -> impl Iterator<Item = (Sector, u8)> + '_ {
        (self.lowest..=self.highest)
            .rev()
            .map(Sector::Number)
            .chain(std::iter::once(Sector::Bull))
            .map(|s| (s, self.get(s)))
    }

    /// Sectors with a non-zero count.
    pub fn touched(&self) -> Vec<Sector> {
        self.iter().filter(|(_, c)| *c > 0).map(|(s, _)| s).collect()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| u32::from(c)).sum()
    }
}
