use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use nogo_core::{
    arena::{run_arena, AgentSpec, ArenaOptions},
    nogo::check_size,
    Agent, AgentKind, Board, Error, Game, Move, NoGo, Player, Strategy,
};

/// NoGo played by Monte Carlo Tree Search agents.
#[derive(Parser)]
#[command(name = "nogo")]
#[command(about = "Play NoGo against or between Monte Carlo Tree Search agents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a batch of games between two agents and report the results.
    Arena {
        /// Agent playing black (mcts or random).
        #[arg(long, default_value = "mcts")]
        black: AgentKind,

        /// Options for black, e.g. "T=2000 exp=0.3 seed=1".
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        black_args: String,

        /// Agent playing white (mcts or random).
        #[arg(long, default_value = "random")]
        white: AgentKind,

        /// Options for white.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        white_args: String,

        /// Number of games to play.
        #[arg(short, long, default_value = "10")]
        games: usize,

        /// Board width and height.
        #[arg(short, long, default_value = "9")]
        size: usize,

        /// Games played at once. Defaults to the number of CPUs.
        #[arg(long)]
        threads: Option<usize>,

        /// Seconds each search agent may think per move.
        #[arg(long)]
        time_budget: Option<f64>,
    },
    /// Play against an agent from the terminal.
    Play {
        /// Agent to play against (mcts or random).
        #[arg(long, default_value = "mcts")]
        agent: AgentKind,

        /// Options for the agent, e.g. "T=2000 seed=1".
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        agent_args: String,

        /// The color you play. Black moves first.
        #[arg(long, default_value = "black")]
        human: Player,

        /// Board width and height.
        #[arg(short, long, default_value = "9")]
        size: usize,

        /// Seconds the agent may think per move.
        #[arg(long)]
        time_budget: Option<f64>,
    },
}

fn budget(seconds: Option<f64>) -> Result<Option<Duration>> {
    seconds
        .map(|s| Duration::try_from_secs_f64(s).with_context(|| format!("invalid time budget {}", s)))
        .transpose()
}

fn human_play(board: &Board, human: Player) -> Result<Move> {
    let mut input = String::new();
    print!("enter a move (e.g. \"c 3\"): ");
    std::io::stdout().flush()?;
    loop {
        input.clear();
        if std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read line")?
            == 0
        {
            bail!("input closed before the game ended");
        }
        match board.parse_position(&input) {
            Ok(position) if NoGo::is_legal(board, &Move::new(position, human)) => {
                return Ok(Move::new(position, human));
            }
            Ok(_) => println!("illegal move, re enter:"),
            Err(e) => println!("{}, re enter:", e),
        }
    }
}

fn play(
    kind: AgentKind,
    args: &str,
    human: Player,
    size: usize,
    time_budget: Option<Duration>,
) -> Result<()> {
    let mut board = Board::new(size);
    let agent_role = human.opponent();
    let mut agent = Agent::<NoGo>::from_args(kind, &format!("{} role={}", args, agent_role))
        .context("invalid agent configuration")?;
    if let Some(budget) = time_budget {
        agent.set_timeout(budget);
    }

    println!("{}", board);
    let mut to_act = Player::Black;
    let mut legal = Vec::new();
    let loser = loop {
        let m = if to_act == human {
            NoGo::generate_moves(&board, human, &mut legal);
            if legal.is_empty() {
                break human;
            }
            human_play(&board, human)?
        } else {
            match agent.choose_move(&board)? {
                Some(m) => {
                    println!("best move: {}", board.notation(m.position));
                    m
                }
                None => break agent_role,
            }
        };
        NoGo::apply(&mut board, &m).map_err(|reason| Error::IllegalMove { m, reason })?;
        println!("{}", board);
        to_act = to_act.opponent();
    };

    println!(
        "{} has no legal move, {} wins the game!",
        loser,
        loser.opponent()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    match Cli::parse().command {
        Commands::Arena {
            black,
            black_args,
            white,
            white_args,
            games,
            size,
            threads,
            time_budget,
        } => {
            check_size(size)?;
            let mut options = ArenaOptions::new(
                AgentSpec::new(black, black_args),
                AgentSpec::new(white, white_args),
            )
            .with_games(games)
            .with_board_size(size);
            if let Some(threads) = threads {
                options = options.with_num_threads(threads);
            }
            if let Some(budget) = budget(time_budget)? {
                options = options.with_time_budget(budget);
            }
            let summary = run_arena(&options).context("arena failed")?;
            info!("Arena finished");
            println!("{}", summary);
        }
        Commands::Play {
            agent,
            agent_args,
            human,
            size,
            time_budget,
        } => {
            check_size(size)?;
            play(agent, &agent_args, human, size, budget(time_budget)?)?;
        }
    }
    Ok(())
}
