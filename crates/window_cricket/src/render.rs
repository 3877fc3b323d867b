//! Plain-text views of stored records and statistics for the batch
//! subcommands.

use std::collections::BTreeMap;

use cricket_core::Mark;
use cricket_history::{GameRecord, PlayerStats};

/// One line per stored game for `list`.
pub fn record_line(index: usize, name: &str) -> String {
    format!("{:>3}. {}", index + 1, name)
}

/// Marks of one turn, scoring ones with their points.
pub fn turn_line(turn: &[Mark]) -> String {
    turn.iter()
        .map(|m| {
            if m.was_scoring {
                format!("{}+{}", m.sector, m.points)
            } else {
                m.sector.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn with_newlines(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

/// Full summary of a stored game, with every turn.
pub fn record_details(name: &str, record: &GameRecord) -> String {
    let mut lines = vec![name.to_string()];
    for (i, player) in record.players().iter().enumerate() {
        lines.push(format!(
            "  P{} {:<16} score {:>4}  MPR {:.2}",
            i + 1,
            player.name(),
            player.score(),
            player.mpr()
        ));
    }
    lines.push(match record.winner() {
        Some(winner) => format!("  Winner: {} ({})", winner.name(), winner.score()),
        None => "  Aborted".to_string(),
    });

    let settings = record.settings();
    lines.push(format!(
        "  Sectors {}..{} and bull worth {}, {} rounds",
        settings.highest_sector,
        settings.lowest_sector,
        settings.bull_points,
        record.rounds()
    ));
    for (turn_index, turn) in record.turns().enumerate() {
        let thrower = &record.players()[turn_index % 2];
        lines.push(format!(
            "  R{:<3} {:<16} {}",
            turn_index / 2 + 1,
            thrower.name(),
            turn_line(turn)
        ));
    }
    if !record.open_turn().is_empty() {
        lines.push("  (last turn not ended)".to_string());
    }
    with_newlines(lines)
}

/// Statistics table for `stats`.
pub fn stats_table(stats: &BTreeMap<String, PlayerStats>) -> String {
    if stats.is_empty() {
        return "No games recorded\n".to_string();
    }

    let mut lines = Vec::new();
    for (name, s) in stats {
        lines.push(format!(
            "{}: {} played, {} won ({:.1}%)",
            name,
            s.games_played(),
            s.games_won(),
            s.win_rate()
        ));
        lines.push(format!(
            "  rounds min {} max {} avg {:.1}",
            s.min_rounds(),
            s.max_rounds(),
            s.avg_rounds()
        ));
        lines.push(format!(
            "  MPR    min {:.2} max {:.2} avg {:.2}",
            s.min_mpr(),
            s.max_mpr(),
            s.avg_mpr()
        ));
        let accuracy = s
            .sector_accuracy()
            .iter()
            .map(|(sector, avg)| format!("{} {:.1}", sector, avg))
            .collect::<Vec<_>>()
            .join(", ");
        if !accuracy.is_empty() {
            lines.push(format!("  hits per game: {}", accuracy));
        }
    }
    with_newlines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cricket_core::{CricketGame, GameSettings, Sector};
    use cricket_history::{GameOutcome, aggregate_statistics};

    fn game() -> CricketGame {
        let mut game = CricketGame::new("Verano", "Invierno", GameSettings::default()).unwrap();
        for _ in 0..4 {
            game.apply_hit(Sector::Number(20));
        }
        game.apply_hit(Sector::Bull);
        game
    }

    #[test]
    fn test_record_details_lists_turns() {
        let record = GameRecord::from_game(&game(), GameOutcome::Aborted).unwrap();
        let details = record_details("game.json", &record);
        assert!(details.starts_with("game.json\n"));
        assert!(details.contains("Aborted"));
        assert!(details.contains("R1   Verano           20 20 20 20+20 Bull\n"));
        assert!(details.ends_with("(last turn not ended)\n"));
    }

    #[test]
    fn test_record_details_after_ended_turn() {
        let mut game = game();
        game.end_turn();
        let record = GameRecord::from_game(&game, GameOutcome::Aborted).unwrap();
        let details = record_details("game.json", &record);
        assert!(details.contains("1 rounds"));
        assert!(!details.contains("not ended"));
    }

    #[test]
    fn test_stats_table_lines() {
        let record = GameRecord::from_game(&game(), GameOutcome::Aborted).unwrap();
        let table = stats_table(&aggregate_statistics(&[record]));
        assert!(table.contains("Verano: 1 played, 0 won (0.0%)\n"));
        assert!(table.contains("  hits per game: 20 4.0, Bull 1.0\n"));
        assert!(table.ends_with('\n'));
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(stats_table(&BTreeMap::new()), "No games recorded\n");
    }
}
