/*!
Main binary for jsondig.
*/

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::generate;
use clap_verbosity_flag::Verbosity;
use memmap2::Mmap;
use serde_json::Value;
use std::io::stdout;
use std::{
    fs::File,
    io::{self, IsTerminal, Read},
    path::PathBuf,
};

use jsondig::{
    formats::{self, InputFormat},
    path::PathQuery,
    tree, with_keys, without_keys, write_colored_result,
};

/// Extract values from a document with a slash-delimited path.
#[derive(Parser)]
#[command(name = "jdig", version, about, long_about = None)]
#[command(
    arg_required_else_help = true,
    disable_help_subcommand = true,
    subcommand_negates_reqs = true
)]
struct Args {
    /// Optional subcommands
    #[command(subcommand)]
    command: Option<Commands>,
    /// Path expression (e.g., "servers/{*}/ip")
    #[arg(required = true)]
    path: Option<String>,
    #[arg(value_name = "FILE")]
    /// Optional path to the input document. If omitted, reads from STDIN
    input: Option<PathBuf>,
    /// Value returned when the path leads nowhere. Parsed as JSON, falling
    /// back to a plain string
    #[arg(short, long, value_name = "JSON", default_value = "null")]
    default: String,
    /// Formatter applied to the result. Only the first one given is used
    #[arg(short, long = "formatter", value_name = "NAME")]
    formatters: Vec<String>,
    /// Input format. Inferred from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<InputFormat>,
    /// Keep only these top-level keys of the document before querying
    #[arg(long, value_delimiter = ',', value_name = "KEY")]
    with_keys: Vec<String>,
    /// Drop these top-level keys of the document before querying
    #[arg(long, value_delimiter = ',', value_name = "KEY")]
    without_keys: Vec<String>,
    /// Do not pretty-print the JSON output, instead use compact
    #[arg(long, action = ArgAction::SetTrue)]
    compact: bool,
    /// Render the result as a tree of boxes
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "compact")]
    tree: bool,
    /// Disable colored output
    #[arg(long, action = ArgAction::SetTrue)]
    no_color: bool,
    /// Print how the path is split into segments and exit
    #[arg(long, action = ArgAction::SetTrue)]
    explain: bool,
    #[command(flatten)]
    verbose: Verbosity,
}

/// Available subcommands for `jdig`
#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions for the given shell to stdout.
    Completions { shell: clap_complete::Shell },
}

/// Entry point for main binary.
///
/// This parses the command line arguments and evaluates the path. If no file
/// is given, the document is read from STDIN. The result is printed to STDOUT,
/// with formatting determined by the command line arguments.
fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    if let Some(Commands::Completions { shell }) = args.command {
        let mut cmd = Args::command();
        generate(shell, &mut cmd, "jdig", &mut stdout().lock());
        return Ok(());
    }

    let query: PathQuery = args
        .path
        .as_deref()
        .ok_or_else(|| {
            anyhow::anyhow!("Path required unless using subcommand")
        })?
        .parse()
        .with_context(|| "Failed to parse path")?;

    if args.explain {
        println!("{}", serde_json::to_string_pretty(query.segments())?);
        return Ok(());
    }

    let default = parse_default(&args.default);

    let format = args
        .format
        .or_else(|| args.input.as_deref().and_then(InputFormat::from_path))
        .unwrap_or_default();

    let mut document = match &args.input {
        Some(path) => {
            let file = File::open(path).with_context(|| {
                format!("Failed to open file {}", path.display())
            })?;
            // SAFETY: the map is only read while decoding
            let mmap = unsafe { Mmap::map(&file) }.with_context(|| {
                format!("Failed to read file {}", path.display())
            })?;
            formats::decode(&mmap, format)
        }
        None => {
            if io::stdin().is_terminal() {
                // No piped input and no file specified
                let mut cmd = Args::command();
                return Ok(cmd.print_help()?);
            }
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .with_context(|| "Failed to read from STDIN")?;
            formats::decode(&buffer, format)
        }
    }
    .with_context(|| "Failed to decode input document")?;

    if !args.with_keys.is_empty() {
        document = with_keys(&document, &args.with_keys);
    }
    if !args.without_keys.is_empty() {
        document = without_keys(&document, &args.without_keys);
    }

    let result = query.evaluate(&document, &default, &args.formatters);

    if args.tree {
        println!("{}", tree::render(&result));
        return Ok(());
    }

    if args.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    write_colored_result(&mut stdout().lock(), &result, !args.compact)
}

/// Parses the `--default` argument as JSON; anything that is not valid JSON
/// becomes a string.
fn parse_default(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| {
        log::debug!("Default `{raw}` is not JSON, using it as a string");
        Value::String(raw.to_string())
    })
}
