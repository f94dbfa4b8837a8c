use std::io::{self, Write};
use std::path::PathBuf;

use argh::{FromArgValue, FromArgs};
use interval_store::{driver, Assignment, DriverConfig, Error, IntervalStore, Replayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `begin:end:value` triple given on the command line
#[derive(Debug)]
struct AssignSpec(Assignment);

impl FromArgValue for AssignSpec {
    fn from_arg_value(value: &str) -> Result<Self, String> {
        let mut parts = value.splitn(3, ':');
        let (Some(begin), Some(end), Some(ch)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected begin:end:value, got {:?}", value));
        };
        driver::parse_interactive(&format!("{} {} {}", begin, end, ch))
            .map(AssignSpec)
            .map_err(|e| e.to_string())
    }
}

#[derive(FromArgs, Debug)]
#[argh(description = "canonical interval map driver")]
struct Cli {
    #[argh(
        option,
        default = "'A'",
        description = "value of every key not explicitly assigned (default: A)"
    )]
    default: char,

    #[argh(switch, description = "skip the canonical-form check after each replayed input")]
    no_verify: bool,

    #[argh(subcommand)]
    command: Option<Command>,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Command {
    Interactive(Interactive),
    Replay(Replay),
    Query(Query),
}

#[derive(FromArgs, Debug)]
#[argh(
    subcommand,
    name = "interactive",
    description = "read two integers and a char, assign them, report the store"
)]
struct Interactive {
    #[argh(switch, description = "do not print the input prompt")]
    no_prompt: bool,
}

#[derive(FromArgs, Debug)]
#[argh(
    subcommand,
    name = "replay",
    description = "replay fuzz inputs (files or directories) into one store"
)]
struct Replay {
    #[argh(positional, description = "input files or corpus directories")]
    paths: Vec<PathBuf>,
}

#[derive(FromArgs, Debug)]
#[argh(
    subcommand,
    name = "query",
    description = "apply assignments in order, then look up keys"
)]
struct Query {
    #[argh(option, description = "assignment as begin:end:value, repeatable")]
    assign: Vec<AssignSpec>,

    #[argh(positional, description = "keys to look up")]
    keys: Vec<i32>,
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

/// Handle interactive command
fn handle_interactive(config: &DriverConfig) -> Result<(), Error> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    driver::run_session(config, &mut input, &mut output)?;
    Ok(())
}

/// Handle replay command
fn handle_replay(config: &DriverConfig, args: &Replay) -> Result<(), Error> {
    if args.paths.is_empty() {
        return Err(Error::Config("Missing input path".to_string()));
    }

    let mut replayer = Replayer::new(config.clone());
    for path in &args.paths {
        info!(path = %path.display(), "replaying");
        replayer.feed_path(path)?;
    }
    println!("{}", replayer.report());
    Ok(())
}

/// Handle query command
fn handle_query(config: &DriverConfig, args: &Query) -> Result<(), Error> {
    let mut store = IntervalStore::new(config.default_value);
    for AssignSpec(assignment) in &args.assign {
        info!(%assignment, "assigning");
        store.try_assign(assignment.begin, assignment.end, assignment.value)?;
    }

    let mut output = io::stdout().lock();
    for key in &args.keys {
        writeln!(output, "{}: {}", key, store.lookup(key).escape_ascii())?;
    }
    writeln!(output, "Is canonical: {}", store.is_canonical())?;
    writeln!(output, "Size: {}", store.size())?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    enable_tracing();

    let cli: Cli = argh::from_env();
    let mut config = DriverConfig::default().with_default_char(cli.default)?;
    config.verify_canonical = !cli.no_verify;

    // Dispatch command
    let result = match &cli.command {
        None => handle_interactive(&config),
        Some(Command::Interactive(args)) => {
            config.prompt = !args.no_prompt;
            handle_interactive(&config)
        }
        Some(Command::Replay(args)) => handle_replay(&config, args),
        Some(Command::Query(args)) => handle_query(&config, args),
    };

    // Handle errors
    if let Err(err) = result {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    Ok(())
}
