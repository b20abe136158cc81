//! Property-based tests for round resolution.
//!
//! These tests generate random boards, placements and move sequences and
//! check the rules that must hold after every round.
//! Run with: cargo test --release prop_resolve

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use gridcoin::game::{
    check_invariants, project_view, resolve_round, Board, Cell, CoinTier, Coord, Direction,
    GameState, MoveOutcome, PendingMove, Placement, RoundBuffer,
};

const SIZE: i16 = 8;

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn cell() -> impl Strategy<Value = Coord> {
    (0..SIZE, 0..SIZE).prop_map(|(row, col)| Coord::new(row, col))
}

/// A board with walls and coins plus distinct start cells, all disjoint.
fn game() -> impl Strategy<Value = GameState> {
    (
        prop::collection::btree_set(cell(), 0..10),
        prop::collection::btree_set(cell(), 0..12),
        prop::collection::btree_set(cell(), 1..6),
    )
        .prop_map(|(walls, coins, starts)| {
            let mut board = Board::new(SIZE, SIZE).unwrap();
            let starts: Vec<Coord> = starts.into_iter().filter(|c| !walls.contains(c)).collect();
            for wall in &walls {
                board.add_wall(*wall);
            }
            for (i, coin) in coins.iter().enumerate() {
                if !starts.contains(coin) {
                    board.place_coin(*coin, CoinTier::ALL[i % 3]);
                }
            }
            let placements: Vec<Placement> = starts
                .iter()
                .enumerate()
                .map(|(i, at)| Placement::new(format!("P{i}"), format!("T{}", i % 2), *at))
                .collect();
            (board, placements)
        })
        .prop_filter("needs a player", |(_, placements)| !placements.is_empty())
        .prop_map(|(board, placements)| GameState::new(board, placements).unwrap())
}

/// Moves as (player index, direction); indices wrap onto the player list.
fn rounds() -> impl Strategy<Value = Vec<Vec<(usize, Direction)>>> {
    prop::collection::vec(prop::collection::vec((0usize..8, direction()), 0..8), 1..12)
}

fn buffer_for(state: &GameState, moves: &[(usize, Direction)]) -> RoundBuffer {
    let mut buffer = RoundBuffer::new();
    for (index, direction) in moves {
        let player = &state.players()[index % state.player_count()];
        buffer.submit(player.name.clone(), *direction);
    }
    buffer
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// No double occupancy, no player on a wall or off the board, no coin
    /// left under a player.
    #[test]
    fn prop_rounds_keep_invariants(mut state in game(), rounds in rounds()) {
        for moves in &rounds {
            let buffer = buffer_for(&state, moves);
            resolve_round(&mut state, &buffer).unwrap();
            let violations = check_invariants(&state);
            prop_assert!(violations.is_empty(), "{violations:?}");
        }
    }

    /// Coins only disappear, and every point scored matches one collected
    /// coin of that tier.
    #[test]
    fn prop_scores_match_collected_coins(mut state in game(), rounds in rounds()) {
        let initial_value = state.board().coin_value();
        let mut collected = 0;

        for moves in &rounds {
            let before = state.board().coin_count();
            let buffer = buffer_for(&state, moves);
            let report = resolve_round(&mut state, &buffer).unwrap();
            let after = state.board().coin_count();

            prop_assert!(after <= before);
            prop_assert_eq!(before - after, report.coins_collected().count());
            collected += report.coins_collected().map(|(_, tier)| tier.value()).sum::<u32>();
        }

        prop_assert_eq!(state.total_score(), collected);
        prop_assert_eq!(state.total_score() + state.board().coin_value(), initial_value);
    }

    /// A rejected move leaves the player where it was; an accepted move is
    /// exactly one step.
    #[test]
    fn prop_moves_are_single_steps(mut state in game(), moves in prop::collection::vec((0usize..8, direction()), 1..8)) {
        let buffer = buffer_for(&state, &moves);
        let report = resolve_round(&mut state, &buffer).unwrap();

        for resolved in &report.moves {
            let now = state.player(&resolved.player).unwrap().position;
            match resolved.outcome {
                MoveOutcome::Moved { from, to, .. } => {
                    prop_assert_eq!(to, from.step(resolved.direction));
                    prop_assert_eq!(now, to);
                }
                MoveOutcome::Rejected { at, .. } => {
                    prop_assert_eq!(now, at);
                }
            }
        }
    }

    /// Swapping the order of two moves at a contested cell swaps who gets it.
    #[test]
    fn prop_first_arrival_wins(row in 0..SIZE, col in 1..SIZE - 1, tier in 0usize..3) {
        let target = Coord::new(row, col);
        let mut board = Board::new(SIZE, SIZE).unwrap();
        board.place_coin(target, CoinTier::ALL[tier]);
        let placements = vec![
            Placement::new("A", "red", target.step(Direction::Left)),
            Placement::new("B", "blue", target.step(Direction::Right)),
        ];
        let game = GameState::new(board, placements).unwrap();

        for (first, second, winner) in [("A", "B", "red"), ("B", "A", "blue")] {
            let mut state = game.clone();
            let moves = [
                PendingMove { player: first.into(), direction: if first == "A" { Direction::Right } else { Direction::Left } },
                PendingMove { player: second.into(), direction: if second == "A" { Direction::Right } else { Direction::Left } },
            ];
            resolve_round(&mut state, &moves).unwrap();
            prop_assert_eq!(state.player(first).unwrap().position, target);
            prop_assert_eq!(state.team(winner).unwrap().score(), CoinTier::ALL[tier].value());
            prop_assert!(state.is_game_over());
        }
    }

    /// Out-of-bounds view cells are exactly those off the board.
    #[test]
    fn prop_view_clipping(state in game()) {
        for player in state.players() {
            let view = project_view(&state, &player.name).unwrap();
            let outside: BTreeSet<Coord> = view
                .iter()
                .filter(|(_, cell)| *cell == Cell::OutOfBounds)
                .map(|(coord, _)| coord)
                .collect();
            let expected: BTreeSet<Coord> = view
                .iter()
                .map(|(coord, _)| coord)
                .filter(|coord| !state.board().in_bounds(*coord))
                .collect();
            prop_assert_eq!(outside, expected);
            prop_assert_eq!(view.at(0, 0), Some(Cell::Own));
        }
    }
}
