use anyhow::{Context, Result};
use clap::Parser;
use pengu_simulator::bots::play_bot_match;
use pengu_simulator::{Arcade, ArcadeConfig};
use pengu_types::minigame::{GameType, Outcome, Role, Wager};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Runs bot matches through a local pengu arcade",
    long_about = None
)]
struct Args {
    /// Game to play (tic_tac_toe, connect4, uno, monopoly, blackjack, battleship).
    #[arg(short, long, default_value = "tic_tac_toe")]
    game: GameType,

    /// Number of matches to play.
    #[arg(short, long, default_value_t = 10)]
    matches: u32,

    /// Coins staked by each seat.
    #[arg(short, long, default_value_t = 0)]
    wager: u64,

    /// Seed phrase for match seeds (overrides the config file).
    #[arg(long)]
    seed_phrase: Option<String>,

    /// Base seed for bot decisions.
    #[arg(long, default_value_t = 0)]
    bot_seed: u64,

    /// Moves per match before it is reported unfinished.
    #[arg(long, default_value_t = 5_000)]
    max_moves: u32,

    /// Path to a YAML arcade config.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print each match report as a JSON line on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn build_config(args: &Args) -> Result<ArcadeConfig> {
    let mut config = match &args.config {
        Some(path) => ArcadeConfig::load(path)
            .with_context(|| format!("Could not load config file {}", path.display()))?,
        None => ArcadeConfig::default(),
    };
    if let Some(seed_phrase) = &args.seed_phrase {
        config.seed_phrase = seed_phrase.clone();
    }
    config.validate().context("Invalid arcade config")?;
    Ok(config)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    wins: [u32; 2],
    draws: u32,
    aborted: u32,
    unfinished: u32,
    moves: u64,
}

impl Tally {
    fn record(&mut self, outcome: Option<Outcome>, moves: u32) {
        self.moves += u64::from(moves);
        match outcome {
            Some(Outcome::Winner(role)) => self.wins[role.index()] += 1,
            Some(Outcome::Draw) => self.draws += 1,
            Some(Outcome::Aborted) => self.aborted += 1,
            None => self.unfinished += 1,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = build_config(&args)?;
    info!(game = %args.game, matches = args.matches, wager = args.wager, "starting bot run");

    let mut arcade = Arcade::try_new(config).context("Invalid arcade config")?;
    let mut tally = Tally::default();
    for i in 0..args.matches {
        let seed = args.bot_seed.wrapping_add(u64::from(i) * 2);
        let report = play_bot_match(
            &mut arcade,
            args.game,
            Wager::coins(args.wager),
            seed,
            args.max_moves,
        )
        .with_context(|| format!("bot match {i} failed"))?;
        if args.json {
            println!(
                "{}",
                serde_json::to_string(&report).context("could not serialize report")?
            );
        }
        if report.outcome.is_none() {
            warn!(match_id = report.match_id, moves = report.moves, "match hit the move cap");
        }
        tally.record(report.outcome, report.moves);
    }

    info!(
        game = %args.game,
        player1_wins = tally.wins[Role::Player1.index()],
        player2_wins = tally.wins[Role::Player2.index()],
        draws = tally.draws,
        aborted = tally.aborted,
        unfinished = tally.unfinished,
        avg_moves = tally.moves / u64::from(args.matches.max(1)),
        "bot run complete"
    );
    Ok(())
}
