//! Complete games between two agents.
//!
//! Games are independent of each other: every game seats freshly built agents
//! with their own search state, so a batch of games can be spread over a
//! thread pool while each individual search stays single-threaded.

use std::fmt::Display;
use std::time::Duration;

use log::{debug, info};
use rayon::prelude::*;

use crate::agent::{Agent, AgentKind};
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::interface::{Game, Move, Player, Strategy};
use crate::nogo::{check_size, Board, NoGo, DEFAULT_SIZE};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub moves: Vec<Move>,
    pub winner: Player,
}

/// Play one game to the end. Black moves first; a side that has no move loses.
pub fn play_game<G, B, W>(black: &mut B, white: &mut W, mut state: G::S) -> Result<GameRecord>
where
    G: Game,
    B: Strategy<G>,
    W: Strategy<G>,
{
    let mut moves = Vec::new();
    let mut to_act = Player::Black;
    loop {
        let agent: &mut dyn Strategy<G> = match to_act {
            Player::Black => &mut *black,
            Player::White => &mut *white,
        };
        let Some(m) = agent.choose_move(&state)? else {
            debug!("{} has no move after {} plies", to_act, moves.len());
            return Ok(GameRecord {
                moves,
                winner: to_act.opponent(),
            });
        };
        if m.player != to_act {
            return Err(Error::WrongTurn {
                m,
                expected: to_act,
            });
        }
        G::apply(&mut state, &m).map_err(|reason| Error::IllegalMove { m, reason })?;
        debug!("{} plays {}", to_act, G::notation(&state, m.position));
        moves.push(m);
        to_act = to_act.opponent();
    }
}

/// Which agent sits on one side of the board and how it is configured.
#[derive(Clone, Debug)]
pub struct AgentSpec {
    pub kind: AgentKind,
    /// `key=value` tokens, see [`AgentConfig::parse`]. The role is set by the seat.
    pub args: String,
}

impl AgentSpec {
    pub fn new(kind: AgentKind, args: impl Into<String>) -> Self {
        Self {
            kind,
            args: args.into(),
        }
    }

    fn config(&self, role: Player) -> Result<AgentConfig> {
        AgentConfig::parse(
            self.kind.default_name(),
            &format!("{} role={}", self.args, role),
        )
    }
}

/// Options for a batch of games.
#[derive(Clone, Debug)]
pub struct ArenaOptions {
    black: AgentSpec,
    white: AgentSpec,
    games: usize,
    size: usize,
    // None means use num_cpus.
    num_threads: Option<usize>,
    // None keeps each agent's own budget.
    time_budget: Option<Duration>,
}

impl ArenaOptions {
    pub fn new(black: AgentSpec, white: AgentSpec) -> Self {
        Self {
            black,
            white,
            games: 1,
            size: DEFAULT_SIZE,
            num_threads: None,
            time_budget: None,
        }
    }

    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    pub fn with_board_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// How many games to run at once. Defaults to num_cpus.
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Override the per-move time budget of search agents.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    // Seeds are offset by the game index so games differ but stay reproducible.
    fn seat(&self, kind: AgentKind, config: &AgentConfig, game: usize) -> Agent<NoGo> {
        let mut config = config.clone();
        config.seed = config.seed.map(|seed| seed.wrapping_add(game as u64));
        let mut agent = Agent::new(kind, &config);
        if let Some(budget) = self.time_budget {
            Strategy::<NoGo>::set_timeout(&mut agent, budget);
        }
        agent
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaSummary {
    pub games: usize,
    pub black_wins: usize,
    pub white_wins: usize,
    pub total_plies: usize,
}

impl ArenaSummary {
    pub fn from_records(records: &[GameRecord]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.games += 1;
            match record.winner {
                Player::Black => summary.black_wins += 1,
                Player::White => summary.white_wins += 1,
            }
            summary.total_plies += record.moves.len();
            summary
        })
    }

    pub fn average_plies(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_plies as f64 / self.games as f64
    }
}

impl Display for ArenaSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = |wins: usize| 100.0 * wins as f64 / self.games.max(1) as f64;
        write!(
            f,
            "{} games: black {} ({:.1}%), white {} ({:.1}%), {:.1} plies per game",
            self.games,
            self.black_wins,
            pct(self.black_wins),
            self.white_wins,
            pct(self.white_wins),
            self.average_plies()
        )
    }
}

/// Play `games` games on fresh boards and return every record, in game order.
pub fn run_games(options: &ArenaOptions) -> Result<Vec<GameRecord>> {
    // Bad configuration fails here, before any game starts.
    check_size(options.size)?;
    let black_config = options.black.config(Player::Black)?;
    let white_config = options.white.config(Player::White)?;

    let num_threads = options.num_threads.unwrap_or_else(num_cpus::get);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()?;
    info!(
        "Playing {} games of {} ({}) vs {} ({}) on {}x{} with {} threads",
        options.games,
        black_config.name,
        options.black.kind,
        white_config.name,
        options.white.kind,
        options.size,
        options.size,
        num_threads
    );

    pool.install(|| {
        (0..options.games)
            .into_par_iter()
            .map(|game| -> Result<GameRecord> {
                let mut black = options.seat(options.black.kind, &black_config, game);
                let mut white = options.seat(options.white.kind, &white_config, game);
                let record =
                    play_game::<NoGo, _, _>(&mut black, &mut white, Board::new(options.size))?;
                info!(
                    "game {} won by {} in {} plies",
                    game,
                    record.winner,
                    record.moves.len()
                );
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()
    })
}

pub fn run_arena(options: &ArenaOptions) -> Result<ArenaSummary> {
    let records = run_games(options)?;
    Ok(ArenaSummary::from_records(&records))
}
