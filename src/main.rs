use aql::Policy;
use aql::cli::{self, CheckOptions, CheckResult, CliError};
use clap::{Parser as ClapParser, Subcommand};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use tracing::debug;

#[derive(ClapParser)]
#[command(name = "aql")]
#[command(about = "AQL - filter JSON test results with Allure Query Language expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a query and filter JSON records with it
    Check {
        /// The AQL query to run
        query: String,

        /// JSON records (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// JSON object with values for context functions, e.g. '{"me()": "ana"}'
        #[arg(short, long)]
        context: Option<String>,

        /// JSON file restricting which parts of the language are allowed
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't filter
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the token stream of a query as JSON
    Tokens {
        /// The AQL query to tokenize
        query: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            context,
            policy,
            pretty,
            syntax_only,
        } => run_check(query, input, context, policy, pretty, syntax_only),
        Commands::Tokens { query } => cli::execute_tokens(&query).and_then(|tokens| {
            println!("{}", serde_json::to_string_pretty(&tokens)?);
            Ok(())
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn load_policy(path: Option<PathBuf>) -> Result<Option<Policy>, CliError> {
    let Some(path) = path else {
        return Ok(None);
    };
    debug!(path = %path.display(), "loading policy");
    let json = fs::read_to_string(&path)?;
    Ok(Some(Policy::from_json(&json)?))
}

fn run_check(
    query: String,
    input: Option<String>,
    context: Option<String>,
    policy: Option<PathBuf>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        query,
        input,
        context,
        policy: load_policy(policy)?,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
