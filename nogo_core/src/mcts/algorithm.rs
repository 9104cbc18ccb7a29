use std::marker::PhantomData;
use std::time::{Duration, Instant};

use log::{debug, log_enabled, warn, Level};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::node::{NodeId, Tree};
use super::rollout_policy::RolloutPolicy;

use crate::error::{Error, Result};
use crate::interface::{Game, Move, Player, Strategy};

/// Options for MonteCarloTreeSearch.
#[derive(Clone, Debug)]
pub struct MCTSOptions {
    cycles: u32,
    exploration_constant: f64,
    time_budget: Duration,
    // None means seed from entropy.
    seed: Option<u64>,
}

impl Default for MCTSOptions {
    fn default() -> Self {
        Self {
            cycles: 1000,
            exploration_constant: 0.25,
            time_budget: Duration::from_secs(1),
            seed: None,
        }
    }
}

impl MCTSOptions {
    /// Set the iteration cap. The search runs up to `cycles + 1` iterations,
    /// since the cap is checked after each one.
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }

    /// Weight of the exploration term in the UCT score.
    /// Non-finite values would turn scores into NaN; they are ignored.
    pub fn with_exploration_constant(mut self, c: f64) -> Self {
        if c.is_finite() {
            self.exploration_constant = c;
        } else {
            warn!("ignoring exploration constant {}: not finite", c);
        }
        self
    }

    /// Wall-clock budget per decision. Checked between iterations only,
    /// so one slow iteration may overrun it.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Seed the random source for reproducible searches.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn exploration_constant(&self) -> f64 {
        self.exploration_constant
    }

    pub fn time_budget(&self) -> Duration {
        self.time_budget
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SearchStats {
    pub iterations: u32,
    pub elapsed: Duration,
    pub tree_size: usize,
}

/// Everything one decision produced. The tree is handed out for inspection
/// only; nothing is carried over to the next decision.
pub struct SearchResult<G: Game> {
    pub tree: Tree<G>,
    pub stats: SearchStats,
    /// The most visited root child, or None when there was nothing to play.
    pub best: Option<Move>,
}

pub struct MonteCarloTreeSearch<G: Game> {
    player: Player,
    options: MCTSOptions,
    // The only random source of the search; expansion and rollouts both draw from it.
    rng: ChaCha8Rng,
    game: PhantomData<G>,
}

impl<G: Game> MonteCarloTreeSearch<G> {
    pub fn new(player: Player, options: MCTSOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            player,
            options,
            rng,
            game: PhantomData,
        }
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn options(&self) -> &MCTSOptions {
        &self.options
    }

    /// Build a fresh tree for `state` with `self.player` to act and grow it
    /// until the time or iteration budget runs out.
    pub fn search(&mut self, state: &G::S) -> Result<SearchResult<G>> {
        let start_time = Instant::now();
        let mut tree = Tree::new(state, self.player, self.options.exploration_constant);

        let mut iterations = 0;
        loop {
            self.simulate_once(&mut tree, state)?;
            iterations += 1;
            if start_time.elapsed() >= self.options.time_budget
                || iterations > self.options.cycles
            {
                break;
            }
        }

        let stats = SearchStats {
            iterations,
            elapsed: start_time.elapsed(),
            tree_size: tree.len(),
        };
        let best = tree
            .most_visited_child(NodeId::ROOT)
            .and_then(|node| node.position)
            .map(|position| Move::new(position, self.player));
        Ok(SearchResult { tree, stats, best })
    }

    fn play(state: &mut G::S, m: Move) -> Result<()> {
        G::apply(state, &m).map_err(|reason| Error::IllegalMove { m, reason })
    }

    // One selection, expansion, simulation and backpropagation pass on a scratch copy of `state`.
    fn simulate_once(&mut self, tree: &mut Tree<G>, state: &G::S) -> Result<()> {
        let mut scratch = state.clone();
        let mut node = NodeId::ROOT;

        // selection
        while !tree.get(node).has_untried_moves() && tree.get(node).has_children() {
            node = tree.select_best_child(node);
            let child = tree.get(node);
            if let Some(position) = child.position {
                Self::play(&mut scratch, Move::new(position, child.mover))?;
            }
        }

        // expansion
        if let Some((mover, position)) = tree.pop_untried_move(node, &mut self.rng) {
            Self::play(&mut scratch, Move::new(position, mover))?;
            node = tree.add_child(node, &scratch, mover, position);
        }

        // simulation
        let to_act = tree.get(node).mover.opponent();
        let rollout = RolloutPolicy::rollout::<G, _>(&mut scratch, to_act, &mut self.rng)?;

        // backpropagation
        tree.backpropagate(node, rollout.winner);
        Ok(())
    }

    fn log_summary(state: &G::S, result: &SearchResult<G>) {
        let stats = &result.stats;
        let rate = f64::from(stats.iterations) / stats.elapsed.as_secs_f64().max(f64::EPSILON);
        debug!(
            "Did {} simulations in {:.2?} with {:.1} rollouts/sec, {} nodes",
            stats.iterations, stats.elapsed, rate, stats.tree_size
        );
        // Sort moves by visit count, largest first.
        let mut children = result
            .tree
            .children(NodeId::ROOT)
            .map(|node| (node.visits, node.wins, node.position))
            .collect::<Vec<_>>();
        children.sort_by_key(|t| !t.0);

        // Dump stats about the top 10 nodes.
        for (visits, wins, position) in children.into_iter().take(10) {
            let win_rate = f64::from(wins) / f64::from(visits.max(1));
            let cell = position.map_or_else(|| "-".to_string(), |p| G::notation(state, p));
            debug!("{:>6} visits, {:.02}% wins: {}", visits, win_rate * 100.0, cell);
        }
    }
}

impl<G: Game> Strategy<G> for MonteCarloTreeSearch<G> {
    fn choose_move(&mut self, state: &G::S) -> Result<Option<Move>> {
        let result = self.search(state)?;
        if log_enabled!(Level::Debug) {
            Self::log_summary(state, &result);
        }
        Ok(result.best)
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.options.time_budget = timeout;
    }
}
