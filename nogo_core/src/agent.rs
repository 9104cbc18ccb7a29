//! The decision makers that can take a seat at the board.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use log::info;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::interface::{Game, Move, Player, Strategy};
use crate::mcts::algorithm::MonteCarloTreeSearch;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentKind {
    Random,
    Mcts,
}

impl AgentKind {
    /// Name used when the configuration does not set one.
    pub fn default_name(self) -> &'static str {
        match self {
            AgentKind::Random => "random",
            AgentKind::Mcts => "mcts",
        }
    }
}

impl Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.default_name())
    }
}

impl FromStr for AgentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(AgentKind::Random),
            "mcts" => Ok(AgentKind::Mcts),
            other => Err(Error::UnknownAgent(other.to_string())),
        }
    }
}

/// Puts a legal stone on a random cell.
pub struct RandomPlayer {
    role: Player,
    space: Vec<usize>,
    rng: ChaCha8Rng,
}

impl RandomPlayer {
    pub fn new(config: &AgentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            role: config.role,
            space: Vec::new(),
            rng,
        }
    }
}

impl<G: Game> Strategy<G> for RandomPlayer {
    fn choose_move(&mut self, state: &G::S) -> Result<Option<Move>> {
        let cells = G::cell_count(state);
        if self.space.len() != cells {
            self.space = (0..cells).collect();
        }
        self.space.shuffle(&mut self.rng);
        let role = self.role;
        Ok(self
            .space
            .iter()
            .map(|&position| Move::new(position, role))
            .find(|m| G::is_legal(state, m)))
    }
}

pub enum Agent<G: Game> {
    Random(RandomPlayer),
    Mcts(MonteCarloTreeSearch<G>),
}

impl<G: Game> Agent<G> {
    pub fn new(kind: AgentKind, config: &AgentConfig) -> Self {
        match kind {
            AgentKind::Random => {
                info!("{} using random ({})", config.role, config.name);
                Agent::Random(RandomPlayer::new(config))
            }
            AgentKind::Mcts => {
                info!(
                    "{} using mcts with cycles({}) exp({:.2}) ({})",
                    config.role, config.cycles, config.exploration_constant, config.name
                );
                Agent::Mcts(MonteCarloTreeSearch::new(config.role, config.options()))
            }
        }
    }

    /// Parse `args` as an [`AgentConfig`] and build the agent.
    pub fn from_args(kind: AgentKind, args: &str) -> Result<Self> {
        let config = AgentConfig::parse(kind.default_name(), args)?;
        Ok(Self::new(kind, &config))
    }

    pub fn role(&self) -> Player {
        match self {
            Agent::Random(player) => player.role,
            Agent::Mcts(mcts) => mcts.player(),
        }
    }
}

impl<G: Game> Strategy<G> for Agent<G> {
    fn choose_move(&mut self, state: &G::S) -> Result<Option<Move>> {
        match self {
            Agent::Random(player) => Strategy::<G>::choose_move(player, state),
            Agent::Mcts(mcts) => mcts.choose_move(state),
        }
    }

    fn set_timeout(&mut self, timeout: Duration) {
        if let Agent::Mcts(mcts) = self {
            mcts.set_timeout(timeout);
        }
    }
}
