//! The common structures and traits.

use std::fmt::{Debug, Display};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// One of the two sides of the game.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::Black => write!(f, "black"),
            Player::White => write!(f, "white"),
        }
    }
}

impl FromStr for Player {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "black" => Ok(Player::Black),
            "white" => Ok(Player::White),
            other => Err(Error::InvalidRole(other.to_string())),
        }
    }
}

/// A stone placed on a cell by a player.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub position: usize,
    pub player: Player,
}

impl Move {
    pub fn new(position: usize, player: Player) -> Self {
        Self { position, player }
    }
}

impl Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.player, self.position)
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stone = match self.player {
            Player::Black => 'B',
            Player::White => 'W',
        };
        write!(f, "{}({})", stone, self.position)
    }
}

/// Why the board refused a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Illegal {
    OutOfBounds,
    Occupied,
    /// The placed stone's group would have no liberty.
    Suicide,
    /// An adjacent opponent group would lose its last liberty.
    Capture,
}

impl Display for Illegal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Illegal::OutOfBounds => "out of bounds",
            Illegal::Occupied => "cell occupied",
            Illegal::Suicide => "suicide",
            Illegal::Capture => "capture",
        };
        f.write_str(reason)
    }
}

/// Defines the rules of a placement game played on a fixed set of cells.
///
/// This is meant to be defined on an empty newtype so that the search can be
/// driven by any board that answers legality queries, without knowing its rules.
pub trait Game: Sized {
    /// The type of the game state.
    type S: Clone;

    /// Number of cells on the board; positions are `0..cell_count`.
    fn cell_count(state: &Self::S) -> usize;

    /// Apply a move in place. The state is left untouched when the move is illegal.
    fn apply(state: &mut Self::S, m: &Move) -> std::result::Result<(), Illegal>;

    /// Whether `m` could be applied to `state`.
    fn is_legal(state: &Self::S, m: &Move) -> bool {
        let mut after = state.clone();
        Self::apply(&mut after, m).is_ok()
    }

    /// Generate the legal positions for `player` at the given state, in ascending order.
    fn generate_moves(state: &Self::S, player: Player, moves: &mut Vec<usize>) {
        moves.clear();
        moves.extend(
            (0..Self::cell_count(state)).filter(|&pos| Self::is_legal(state, &Move::new(pos, player))),
        );
    }

    /// Return a human-readable notation for this position.
    fn notation(_state: &Self::S, position: usize) -> String {
        position.to_string()
    }
}

/// Defines a method of choosing a move for the current player.
pub trait Strategy<G: Game> {
    /// Returns `None` when there is no legal move left, which loses the game.
    fn choose_move(&mut self, state: &G::S) -> Result<Option<Move>>;

    /// For strategies that ponder until a deadline, set the timeout.
    /// This can be changed between calls to choose_move.
    fn set_timeout(&mut self, _timeout: Duration) {}
}
