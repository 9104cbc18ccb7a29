//! Property-based tests for the search tree.
//!
//! Every tree produced by a search must keep its statistics and links
//! consistent, whatever the position, seed or iteration budget.

use std::collections::BTreeSet;
use std::time::Duration;

use nogo_core::{
    Board, Game, MCTSOptions, Move, MonteCarloTreeSearch, NoGo, NodeId, Player, RolloutPolicy,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

/// A position reached by random legal play on a 5x5 board, with the side to act.
fn arb_position() -> impl Strategy<Value = (Board, Player)> {
    (any::<u64>(), 0usize..14).prop_map(|(seed, plies)| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut board = Board::new(5);
        let mut to_act = Player::Black;
        let mut moves = Vec::new();
        for _ in 0..plies {
            NoGo::generate_moves(&board, to_act, &mut moves);
            if moves.is_empty() {
                break;
            }
            let position = moves[rng.gen_range(0..moves.len())];
            NoGo::apply(&mut board, &Move::new(position, to_act)).unwrap();
            to_act = to_act.opponent();
        }
        (board, to_act)
    })
}

fn options(cycles: u32, seed: u64) -> MCTSOptions {
    MCTSOptions::default()
        .with_cycles(cycles)
        .with_time_budget(Duration::from_secs(600))
        .with_seed(seed)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_tree_statistics_consistent(
        (board, to_act) in arb_position(),
        cycles in 0u32..120,
        seed in any::<u64>(),
    ) {
        let mut mcts = MonteCarloTreeSearch::<NoGo>::new(to_act, options(cycles, seed));
        let result = mcts.search(&board).unwrap();
        let tree = &result.tree;

        prop_assert_eq!(result.stats.iterations, cycles + 1);
        prop_assert_eq!(tree.root().visits, cycles + 1);
        prop_assert_eq!(result.stats.tree_size, tree.len());

        for (id, node) in tree.nodes() {
            prop_assert!(node.wins <= node.visits);
            let child_visits: u32 = tree.children(id).map(|c| c.visits).sum();
            prop_assert!(child_visits <= node.visits);
            for &child in &node.children {
                prop_assert_eq!(tree.get(child).parent, Some(id));
                prop_assert_eq!(tree.get(child).mover, node.mover.opponent());
            }
            if id != NodeId::ROOT {
                prop_assert!(node.position.is_some());
                prop_assert!(node.visits >= 1);
            }
        }
    }

    #[test]
    fn prop_root_moves_partition_legal_set(
        (board, to_act) in arb_position(),
        cycles in 0u32..60,
        seed in any::<u64>(),
    ) {
        let mut mcts = MonteCarloTreeSearch::<NoGo>::new(to_act, options(cycles, seed));
        let result = mcts.search(&board).unwrap();
        let root = result.tree.root();

        let mut legal = Vec::new();
        NoGo::generate_moves(&board, to_act, &mut legal);
        let legal = legal.into_iter().collect::<BTreeSet<_>>();

        let expanded = result
            .tree
            .children(NodeId::ROOT)
            .filter_map(|c| c.position)
            .collect::<BTreeSet<_>>();
        let untried = root.untried_moves().iter().copied().collect::<BTreeSet<_>>();
        prop_assert!(expanded.is_disjoint(&untried));
        prop_assert_eq!(expanded.len(), root.children.len());
        prop_assert_eq!(&expanded | &untried, legal.clone());

        match result.best {
            Some(m) => {
                prop_assert_eq!(m.player, to_act);
                prop_assert!(legal.contains(&m.position));
                prop_assert!(expanded.contains(&m.position));
            }
            None => prop_assert!(legal.is_empty()),
        }
    }

    #[test]
    fn prop_select_best_child_is_pure(
        (board, to_act) in arb_position(),
        seed in any::<u64>(),
    ) {
        let mut mcts = MonteCarloTreeSearch::<NoGo>::new(to_act, options(80, seed));
        let result = mcts.search(&board).unwrap();
        let tree = &result.tree;
        for (id, node) in tree.nodes() {
            if !node.has_children() {
                continue;
            }
            let visits_before = tree.children(id).map(|c| c.visits).collect::<Vec<_>>();
            let first = tree.select_best_child(id);
            prop_assert_eq!(first, tree.select_best_child(id));
            prop_assert!(node.children.contains(&first));
            let visits_after = tree.children(id).map(|c| c.visits).collect::<Vec<_>>();
            prop_assert_eq!(visits_before, visits_after);
        }
    }

    #[test]
    fn prop_rollout_terminates_within_cell_count(
        (board, to_act) in arb_position(),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut scratch = board.clone();
        let result = RolloutPolicy::rollout::<NoGo, _>(&mut scratch, to_act, &mut rng).unwrap();
        prop_assert!(result.plies <= NoGo::cell_count(&board));
        prop_assert_eq!(scratch.stones(), board.stones() + result.plies);
    }
}
