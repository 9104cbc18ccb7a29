use rand::{seq::SliceRandom, Rng};

use crate::error::{Error, Result};
use crate::interface::{Game, Move, Player};

/// Outcome of one playout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollout {
    pub winner: Player,
    pub plies: usize,
}

pub struct RolloutPolicy;

/// Uniform random rollout policy for Monte Carlo Tree Search.
impl RolloutPolicy {
    /// Pick a legal cell for `player` uniformly at random.
    /// The provided move vec is for scratch space.
    fn random_move<G: Game, R: Rng + ?Sized>(
        state: &G::S,
        player: Player,
        move_scratch: &mut Vec<usize>,
        rng: &mut R,
    ) -> Option<usize> {
        G::generate_moves(state, player, move_scratch);
        move_scratch.choose(rng).copied()
    }

    /// Play random stones, alternating from `to_act`, until someone cannot move.
    /// The player left without a move loses.
    ///
    /// Every ply fills a cell, so this stops within `cell_count` plies.
    pub fn rollout<G: Game, R: Rng + ?Sized>(
        state: &mut G::S,
        to_act: Player,
        rng: &mut R,
    ) -> Result<Rollout> {
        let mut moves = Vec::new();
        let mut player = to_act;
        let mut plies = 0;
        while let Some(position) = Self::random_move::<G, R>(state, player, &mut moves, rng) {
            let m = Move::new(position, player);
            G::apply(state, &m).map_err(|reason| Error::IllegalMove { m, reason })?;
            player = player.opponent();
            plies += 1;
        }
        Ok(Rollout {
            winner: player.opponent(),
            plies,
        })
    }
}
