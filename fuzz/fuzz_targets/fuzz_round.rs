#![no_main]

//! Round resolution fuzzer.
//!
//! Generates a level from fuzzed dimensions and counts, then plays fuzzed
//! rounds against it. After every round the board must still satisfy the
//! game invariants and the score plus remaining coins must equal the
//! starting coin value.

use arbitrary::Arbitrary;
use gridcoin::LevelConfig;
use gridcoin::game::{Direction, GameState, RoundBuffer, check_invariants, resolve_round};
use gridcoin::lobby::generate_level;
use libfuzzer_sys::fuzz_target;

/// Structured input for round fuzzing.
#[derive(Arbitrary, Debug)]
struct RoundInput {
    width: u8,
    height: u8,
    walls: u8,
    coins: [u8; 3],
    players: u8,
    seed: u64,
    /// Each round is a list of (player index, direction index).
    rounds: Vec<Vec<(u8, u8)>>,
}

fuzz_target!(|input: RoundInput| {
    let level = LevelConfig {
        width: i16::from(input.width % 16) + 1,
        height: i16::from(input.height % 16) + 1,
        walls: u16::from(input.walls % 32),
        coins: input.coins.map(|c| u16::from(c % 8)),
        seed: None,
    };
    let roster: Vec<(String, String)> = (0..(input.players % 8) + 1)
        .map(|i| (format!("P{i}"), format!("T{}", i % 3)))
        .collect();

    // Levels that do not fit are rejected up front, which is fine.
    let Ok((board, placements)) = generate_level(&level, input.seed, &roster) else {
        return;
    };
    let mut state = GameState::new(board, placements).expect("generated level is valid");
    let initial_value = state.board().coin_value();
    assert!(check_invariants(&state).is_empty());

    for moves in input.rounds.iter().take(32) {
        let mut buffer = RoundBuffer::new();
        for &(player, direction) in moves.iter().take(16) {
            let name = &state.players()[usize::from(player) % state.player_count()].name;
            buffer.submit(name.clone(), Direction::ALL[usize::from(direction) % 4]);
        }

        let report = resolve_round(&mut state, &buffer).expect("buffer only names players");
        let violations = check_invariants(&state);
        assert!(violations.is_empty(), "round {}: {violations:?}", report.round);
        assert_eq!(state.total_score() + state.board().coin_value(), initial_value);

        if report.game_over {
            assert_eq!(state.board().coin_count(), 0);
            break;
        }
    }
});
