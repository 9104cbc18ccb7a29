//! End-to-end decisions through the public API.

use std::time::Duration;

use nogo_core::{
    Agent, AgentKind, Board, Game, MCTSOptions, Move, MonteCarloTreeSearch, NoGo, NodeId, Player,
    Strategy,
};

/// Options where the iteration cap, not the clock, ends the search.
fn options(cycles: u32, seed: u64) -> MCTSOptions {
    MCTSOptions::default()
        .with_cycles(cycles)
        .with_exploration_constant(0.25)
        .with_time_budget(Duration::from_secs(600))
        .with_seed(seed)
}

fn decide(board: &Board, player: Player, options: MCTSOptions) -> Option<Move> {
    MonteCarloTreeSearch::<NoGo>::new(player, options)
        .choose_move(board)
        .unwrap()
}

#[test]
fn empty_board_decision_is_reproducible() {
    let board = Board::new(5);
    let first = decide(&board, Player::Black, options(200, 20211));
    let second = decide(&board, Player::Black, options(200, 20211));
    assert_eq!(first, second);
    // Pinned: any change to the rng stream, expansion order or UCT moves this.
    assert_eq!(first, Some(Move::new(21, Player::Black)));

    let m = first.unwrap();
    assert_eq!(m.player, Player::Black);
    assert!(m.position < 25);
    assert!(NoGo::is_legal(&board, &m));
}

#[test]
fn reproducible_through_agent_config() {
    let board = Board::new(5);
    let run = || {
        let mut agent =
            Agent::<NoGo>::from_args(AgentKind::Mcts, "role=black T=200 exp=0.25 seed=20211")
                .unwrap();
        agent.set_timeout(Duration::from_secs(600));
        agent.choose_move(&board).unwrap()
    };
    assert_eq!(run(), run());
    assert_eq!(run(), decide(&board, Player::Black, options(200, 20211)));
}

#[test]
fn single_legal_move_is_always_chosen() {
    let board = Board::from_rows(&["XO", ".."]);
    for cycles in [0, 1, 10, 200] {
        assert_eq!(
            decide(&board, Player::Black, options(cycles, 8)),
            Some(Move::new(2, Player::Black)),
            "cycles = {}",
            cycles
        );
    }
}

#[test]
fn single_legal_move_on_larger_board() {
    // White at b1 would take the last liberty of the black wall; c2 is the only way out.
    let board = Board::from_rows(&["XXO", "X.O", "XO."]);
    let mut moves = Vec::new();
    NoGo::generate_moves(&board, Player::White, &mut moves);
    assert_eq!(moves, vec![8]);
    for cycles in [0, 3, 300] {
        assert_eq!(
            decide(&board, Player::White, options(cycles, 1)),
            Some(Move::new(8, Player::White))
        );
    }
    // Black has nowhere to go on the same board.
    assert_eq!(decide(&board, Player::Black, options(50, 1)), None);
}

#[test]
fn no_legal_move_returns_none() {
    let board = Board::from_rows(&["XX", ".O"]);
    assert_eq!(decide(&board, Player::Black, options(100, 3)), None);
    assert_eq!(decide(&Board::new(1), Player::White, options(0, 3)), None);
}

#[test]
fn chosen_move_is_the_most_visited_root_child() {
    let board = Board::from_rows(&["X....", ".O...", ".....", "...X.", "....O"]);
    let mut mcts = MonteCarloTreeSearch::<NoGo>::new(Player::Black, options(400, 77));
    let result = mcts.search(&board).unwrap();
    let best = result.best.unwrap();

    assert!(NoGo::is_legal(&board, &best));
    let max_visits = result
        .tree
        .children(NodeId::ROOT)
        .map(|child| child.visits)
        .max()
        .unwrap();
    let chosen = result
        .tree
        .children(NodeId::ROOT)
        .find(|child| child.position == Some(best.position))
        .unwrap();
    assert_eq!(chosen.visits, max_visits);
    assert_eq!(chosen.mover, Player::Black);
}

#[test]
fn search_finds_the_only_winning_move() {
    // Black may play a0, b0 or a1. After a0 or b0 white wins by force;
    // after a1 every line ends with white stuck.
    let board = Board::from_rows(&["..X", ".OX", "OOX"]);
    let mut moves = Vec::new();
    NoGo::generate_moves(&board, Player::Black, &mut moves);
    assert_eq!(moves, vec![0, 1, 3]);

    for seed in 0..5 {
        let mut mcts = MonteCarloTreeSearch::<NoGo>::new(Player::Black, options(300, seed));
        let result = mcts.search(&board).unwrap();
        assert_eq!(result.best, Some(Move::new(3, Player::Black)), "seed {}", seed);
        for child in result.tree.children(NodeId::ROOT) {
            if child.position == Some(3) {
                assert_eq!(child.wins, child.visits);
            } else {
                assert_eq!(child.wins, 0);
            }
        }
    }
}
