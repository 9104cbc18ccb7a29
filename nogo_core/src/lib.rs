pub mod agent;
pub mod arena;
pub mod config;
mod error;
pub mod interface;
mod mcts;
pub mod nogo;

pub use agent::{Agent, AgentKind, RandomPlayer};
pub use config::AgentConfig;
pub use error::{Error, Result};
pub use interface::{Game, Illegal, Move, Player, Strategy};
pub use mcts::algorithm::{MCTSOptions, MonteCarloTreeSearch, SearchResult, SearchStats};
pub use mcts::node::{Node, NodeId, Tree};
pub use mcts::rollout_policy::{Rollout, RolloutPolicy};
pub use nogo::{Board, NoGo};
