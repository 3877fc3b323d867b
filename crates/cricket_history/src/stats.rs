//! Cross-game statistics per player name.

use std::collections::BTreeMap;

use cricket_core::Sector;
use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::GameRecord;

/// Aggregated statistics for one player name.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct PlayerStats {
    games_played: u32,
    games_won: u32,
    min_rounds: u32,
    max_rounds: u32,
    avg_rounds: f64,
    min_mpr: f64,
    max_mpr: f64,
    avg_mpr: f64,
    /// Average hits per game on each sector, counting only the games in
    /// which the player hit that sector at all.
    sector_accuracy: BTreeMap<Sector, f64>,
}

impl PlayerStats {
    /// Calculates win rate as a percentage (0.0–100.0).
    #[instrument(skip(self))]
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            (f64::from(self.games_won) / f64::from(self.games_played)) * 100.0
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    games_played: u32,
    games_won: u32,
    rounds: Vec<u32>,
    mprs: Vec<f64>,
    sector_totals: BTreeMap<Sector, (u32, u32)>,
}

impl Accumulator {
    fn finish(self) -> PlayerStats {
        let games = f64::from(self.games_played.max(1));
        PlayerStats {
            games_played: self.games_played,
            games_won: self.games_won,
            min_rounds: self.rounds.iter().copied().min().unwrap_or(0),
            max_rounds: self.rounds.iter().copied().max().unwrap_or(0),
            avg_rounds: self.rounds.iter().map(|&r| f64::from(r)).sum::<f64>() / games,
            min_mpr: self.mprs.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max_mpr: self.mprs.iter().copied().reduce(f64::max).unwrap_or(0.0),
            avg_mpr: self.mprs.iter().sum::<f64>() / games,
            sector_accuracy: self
                .sector_totals
                .into_iter()
                .map(|(sector, (hits, games))| (sector, f64::from(hits) / f64::from(games)))
                .collect(),
        }
    }
}

/// Accumulates per-player statistics over a set of records.
///
/// Players are matched by name. Sector accuracy is normalized by the
/// number of games in which the sector was hit, not by games played, so it
/// reads as "hits per game when going for this sector".
#[instrument(skip(records), fields(records = records.len()))]
pub fn aggregate_statistics(records: &[GameRecord]) -> BTreeMap<String, PlayerStats> {
    let mut players: BTreeMap<String, Accumulator> = BTreeMap::new();

    for record in records {
        for (index, summary) in record.players().iter().enumerate() {
            let acc = players.entry(summary.name().clone()).or_default();
            acc.games_played += 1;
            if record.winner().as_ref().is_some_and(|w| *w.id() == index) {
                acc.games_won += 1;
            }
            acc.rounds.push(record.player_rounds(index) as u32);
            acc.mprs.push(*summary.mpr());
            for (sector, hits) in record.sector_hits(index) {
                let entry = acc.sector_totals.entry(sector).or_insert((0, 0));
                entry.0 += hits;
                entry.1 += 1;
            }
        }
    }

    debug!(players = players.len(), "Statistics accumulated");
    let stats: BTreeMap<_, _> = players
        .into_iter()
        .map(|(name, acc)| (name, acc.finish()))
        .collect();
    info!(players = stats.len(), "Aggregated statistics computed");
    stats
}
