use std::cmp::Reverse;
use std::marker::PhantomData;

use rand::Rng;

use super::utils::first_best;
use crate::interface::{Game, Player};

/// Index of a node inside its [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

pub struct Node {
    // The player whose stone led here from the parent.
    // At the root this is the opponent of the side to act.
    pub mover: Player,
    // The cell played to get from the parent to here.
    // Only None at the root.
    pub position: Option<usize>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    // Legal cells for `mover.opponent()` not yet turned into children.
    // Filled once on creation, only ever drained.
    untried: Vec<usize>,
    pub visits: u32,
    // Rollouts won by `mover`.
    pub wins: u32,
}

impl Node {
    fn new<G: Game>(
        state: &G::S,
        mover: Player,
        position: Option<usize>,
        parent: Option<NodeId>,
    ) -> Self {
        let mut untried = Vec::new();
        G::generate_moves(state, mover.opponent(), &mut untried);
        Node {
            mover,
            position,
            parent,
            children: Vec::new(),
            untried,
            visits: 0,
            wins: 0,
        }
    }

    pub fn has_untried_moves(&self) -> bool {
        !self.untried.is_empty()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn untried_moves(&self) -> &[usize] {
        &self.untried
    }

    pub fn update(&mut self, win: bool) {
        self.visits += 1;
        self.wins += u32::from(win);
    }

    fn uct_score(&self, exploration_constant: f64, ln_parent_visits: f64) -> f64 {
        if self.visits == 0 {
            // Avoid NaNs.
            return f64::INFINITY;
        }
        let visits = f64::from(self.visits);
        f64::from(self.wins) / visits + exploration_constant * (ln_parent_visits / visits).sqrt()
    }
}

/// Search tree for a single decision.
///
/// Nodes live in one growable arena and link to each other by [`NodeId`],
/// so pushing new children never invalidates the links held by older ones.
pub struct Tree<G: Game> {
    nodes: Vec<Node>,
    exploration_constant: f64,
    game: PhantomData<G>,
}

impl<G: Game> Tree<G> {
    /// Create the root for `state`, where `to_act` is the side about to move.
    pub fn new(state: &G::S, to_act: Player, exploration_constant: f64) -> Self {
        let root = Node::new::<G>(state, to_act.opponent(), None, None);
        Self {
            nodes: vec![root],
            exploration_constant,
            game: PhantomData,
        }
    }

    pub fn root(&self) -> &Node {
        self.get(NodeId::ROOT)
    }

    /// # Panics
    /// Panics if the NodeId belongs to another tree.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is created with the tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn exploration_constant(&self) -> f64 {
        self.exploration_constant
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
        self.get(id).children.iter().map(|&c| self.get(c))
    }

    /// Take one untried move out of the pool, uniformly at random.
    /// Returns the player who will make it and the cell.
    pub fn pop_untried_move<R: Rng + ?Sized>(
        &mut self,
        id: NodeId,
        rng: &mut R,
    ) -> Option<(Player, usize)> {
        let node = &mut self.nodes[id.0];
        if node.untried.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..node.untried.len());
        let position = node.untried.swap_remove(i);
        Some((node.mover.opponent(), position))
    }

    /// `state` must already have `position` played by `mover`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        state: &G::S,
        mover: Player,
        position: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(Node::new::<G>(state, mover, Some(position), Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Choose best child based on UCT, ties going to the earliest child.
    ///
    /// # Panics
    /// Panics if the node has no children.
    pub fn select_best_child(&self, id: NodeId) -> NodeId {
        let node = self.get(id);
        // Keep this numerator non-negative.
        let ln_visits = f64::from(node.visits).ln().max(0.0);
        let c = self.exploration_constant;
        let best = first_best(&node.children, |&child| {
            self.get(child).uct_score(c, ln_visits)
        });
        match best {
            Some(&child) => child,
            None => panic!("select_best_child called on a node without children"),
        }
    }

    /// Credit one rollout to `from` and every ancestor up to the root.
    pub fn backpropagate(&mut self, from: NodeId, winner: Player) {
        let mut cur = Some(from);
        while let Some(id) = cur {
            let node = &mut self.nodes[id.0];
            node.update(winner == node.mover);
            cur = node.parent;
        }
    }

    /// The child with the most visits, ties going to the lowest cell.
    pub fn most_visited_child(&self, id: NodeId) -> Option<&Node> {
        self.children(id)
            .max_by_key(|n| (n.visits, Reverse(n.position)))
    }
}
