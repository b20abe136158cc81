//! Output formatting utilities for CLI.

// Averages over game counts are display-only
#![allow(clippy::cast_precision_loss)]

use std::fmt::Write;
use std::time::Duration;

use gridcoin::simulation::{Ending, SimulationResult, SimulationSpec, Strategy};
use serde::Serialize;

/// Per-team tallies.
#[derive(Debug, Clone)]
pub(super) struct TeamStats {
    /// Team name.
    name: String,
    /// Strategy the team played.
    strategy: Strategy,
    /// Games won outright.
    wins: u64,
    /// Sum of final scores.
    total_score: u64,
    /// Sum of squared final scores, for the standard deviation.
    score_sq_sum: u64,
}

/// Aggregated simulation statistics.
#[derive(Debug)]
pub(super) struct SimulationStats {
    /// Games that finished without error.
    pub(super) games_played: u64,
    /// Games that failed to run.
    failures: u64,
    /// Games with no strict winner.
    draws: u64,
    /// Games that ended with every coin collected.
    cleared: u64,
    /// Total rounds across all games.
    total_rounds: u64,
    /// Per-team tallies, in team order.
    teams: Vec<TeamStats>,
}

impl SimulationStats {
    /// Create empty stats for the teams of a spec.
    pub(super) fn new(spec: &SimulationSpec) -> Self {
        let teams = (0..spec.teams)
            .map(|t| TeamStats {
                name: format!("Team{t}"),
                strategy: if t < spec.greedy_teams {
                    Strategy::Greedy
                } else {
                    Strategy::Random
                },
                wins: 0,
                total_score: 0,
                score_sq_sum: 0,
            })
            .collect();
        Self {
            games_played: 0,
            failures: 0,
            draws: 0,
            cleared: 0,
            total_rounds: 0,
            teams,
        }
    }

    /// Add a finished game.
    pub(super) fn add_result(&mut self, result: &SimulationResult) {
        self.games_played += 1;
        self.total_rounds += u64::from(result.rounds);
        if result.ending == Ending::AllCoinsCollected {
            self.cleared += 1;
        }
        if result.winner.is_none() {
            self.draws += 1;
        }

        for team in &mut self.teams {
            let score = u64::from(result.scores.get(&team.name).copied().unwrap_or(0));
            team.total_score += score;
            team.score_sq_sum += score * score;
            if result.winner.as_ref() == Some(&team.name) {
                team.wins += 1;
            }
        }
    }

    /// Count a game that failed to run.
    pub(super) fn add_failure(&mut self) {
        self.failures += 1;
    }

    fn ratio(&self, count: u64) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        count as f64 / self.games_played as f64
    }

    /// Average game length.
    pub(super) fn avg_rounds(&self) -> f64 {
        self.ratio(self.total_rounds)
    }

    fn avg_score(&self, team: &TeamStats) -> f64 {
        self.ratio(team.total_score)
    }

    fn score_std_dev(&self, team: &TeamStats) -> f64 {
        let mean = self.avg_score(team);
        let variance = self.ratio(team.score_sq_sum) - mean * mean;
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Throughput over a run.
    pub(super) fn games_per_sec(&self, duration: Duration) -> f64 {
        let secs = duration.as_secs_f64();
        if secs > 0.0 {
            (self.games_played + self.failures) as f64 / secs
        } else {
            0.0
        }
    }
}

/// JSON-serializable per-team stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonTeamStats {
    team: String,
    strategy: Strategy,
    wins: u64,
    win_rate: f64,
    avg_score: f64,
    score_std_dev: f64,
}

/// JSON-serializable simulation report.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimulationReport<'a> {
    base_seed: u64,
    games_played: u64,
    failures: u64,
    draws: u64,
    cleared: u64,
    avg_rounds: f64,
    teams: Vec<JsonTeamStats>,
    games: Vec<&'a SimulationResult>,
}

impl<'a> JsonSimulationReport<'a> {
    /// Create from stats and the individual results.
    pub(super) fn new(
        base_seed: u64,
        stats: &SimulationStats,
        games: Vec<&'a SimulationResult>,
    ) -> Self {
        let teams = stats
            .teams
            .iter()
            .map(|t| JsonTeamStats {
                team: t.name.clone(),
                strategy: t.strategy,
                wins: t.wins,
                win_rate: stats.ratio(t.wins),
                avg_score: stats.avg_score(t),
                score_std_dev: stats.score_std_dev(t),
            })
            .collect();
        Self {
            base_seed,
            games_played: stats.games_played,
            failures: stats.failures,
            draws: stats.draws,
            cleared: stats.cleared,
            avg_rounds: stats.avg_rounds(),
            teams,
            games,
        }
    }
}

/// Format simulation stats as human-readable text.
pub(super) fn format_simulation_text(stats: &SimulationStats) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Simulation Results ({} games)", stats.games_played);
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for team in &stats.teams {
        let _ = writeln!(
            output,
            "  {} ({:?}): {:.1}% ({} wins)",
            team.name,
            team.strategy,
            stats.ratio(team.wins) * 100.0,
            team.wins
        );
    }
    let _ = writeln!(
        output,
        "  Draws: {} ({:.1}%)\n",
        stats.draws,
        stats.ratio(stats.draws) * 100.0
    );

    output.push_str("Average Scores:\n");
    for team in &stats.teams {
        let _ = writeln!(
            output,
            "  {}: {:.1} (+/- {:.1})",
            team.name,
            stats.avg_score(team),
            stats.score_std_dev(team)
        );
    }

    let _ = writeln!(
        output,
        "\nAll coins collected: {:.1}% of games",
        stats.ratio(stats.cleared) * 100.0
    );
    let _ = writeln!(output, "Average Game Length: {:.0} rounds", stats.avg_rounds());
    if stats.failures > 0 {
        let _ = writeln!(output, "Failed games: {}", stats.failures);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn result(winner: Option<&str>, a: u32, b: u32, ending: Ending) -> SimulationResult {
        SimulationResult {
            seed: 0,
            rounds: 10,
            ending,
            scores: BTreeMap::from([("Team0".to_string(), a), ("Team1".to_string(), b)]),
            winner: winner.map(str::to_string),
            strategies: BTreeMap::new(),
            publications: 0,
        }
    }

    #[test]
    fn test_stats_aggregate() {
        let mut stats = SimulationStats::new(&SimulationSpec::default());
        stats.add_result(&result(Some("Team0"), 6, 4, Ending::AllCoinsCollected));
        stats.add_result(&result(None, 2, 2, Ending::RoundLimit));
        stats.add_failure();

        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.teams[0].wins, 1);
        assert_eq!(stats.draws, 1);
        assert!((stats.avg_score(&stats.teams[0]) - 4.0).abs() < f64::EPSILON);
        assert!((stats.avg_rounds() - 10.0).abs() < f64::EPSILON);

        let text = format_simulation_text(&stats);
        assert!(text.contains("Team0 (Greedy): 50.0% (1 wins)"));
        assert!(text.contains("Failed games: 1"));
    }
}
