//! Measura command line
//!
//! Commands:
//! - eval: read calculator lines from stdin and print normalised results
//! - config FILE: print every option of an INI file as a quantity
//!
//! `--json` prints one JSON object per line instead of text.
//! Logging goes to stderr, filtered by `MEASURA_LOG` or `RUST_LOG`.

mod eval;

use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use measura_config::QuantityConfig;
use measura_units::Quantity;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
usage: measura [--json] <command>

commands:
  eval           evaluate quantities read from stdin, one per line
                 <quantity> | <quantity> <op> <quantity> | <quantity> -> <unit>
  config FILE    print every option of an INI file as a quantity

options:
  --json         print JSON lines
  -h, --help     show this message
  -V, --version  show the version";

enum Command {
    Eval,
    Config(String),
    Help,
    Version,
}

struct Args {
    command: Command,
    json: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut json = false;
    let mut positional = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => return Ok(Args { command: Command::Help, json }),
            "-V" | "--version" => return Ok(Args { command: Command::Version, json }),
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("eval") => Command::Eval,
        Some("config") => Command::Config(positional.next().ok_or("config needs a FILE argument")?),
        Some(other) => return Err(format!("unknown command '{}'", other)),
        None => return Err("missing command".to_string()),
    };
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument '{}'", extra));
    }
    Ok(Args { command, json })
}

/// Log filter from MEASURA_LOG, then RUST_LOG, defaulting to warnings only
fn init_tracing() {
    let filter = EnvFilter::try_from_env("MEASURA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    let result = match args.command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(true)
        }
        Command::Version => {
            println!("measura {}", VERSION);
            Ok(true)
        }
        Command::Eval => run_eval(args.json),
        Command::Config(path) => run_config(&path, args.json),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[derive(Serialize)]
struct EvalOutput<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Evaluate stdin line by line. Returns false if any line failed.
fn run_eval(json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut ok = true;

    for (idx, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() || input.starts_with('#') {
            continue;
        }

        let evaluated = eval::eval_line(input);
        if let Err(e) = &evaluated {
            warn!(line = idx + 1, error = %e, "evaluation failed");
            ok = false;
        }

        if json {
            let output = EvalOutput {
                input,
                result: evaluated.as_ref().ok(),
                error: evaluated.as_ref().err().map(ToString::to_string),
            };
            writeln!(stdout, "{}", serde_json::to_string(&output)?)?;
        } else {
            match &evaluated {
                Ok(q) => writeln!(stdout, "{}", q)?,
                Err(e) => eprintln!("line {}: {}", idx + 1, e),
            }
        }
    }
    Ok(ok)
}

#[derive(Serialize)]
struct ConfigOutput<'a> {
    section: &'a str,
    option: &'a str,
    quantity: &'a Quantity,
}

/// Print each option of each section. Returns false if any value failed.
fn run_config(path: &str, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let config = QuantityConfig::read_file(path)?;
    let mut stdout = io::stdout().lock();
    let mut ok = true;

    for section in config.sections() {
        debug!(section, "printing section");
        if !json {
            writeln!(stdout, "[{}]", section)?;
        }
        for option in config.options(section)? {
            let quantity = match config.get_float(section, option) {
                Ok(q) => q,
                Err(e) => {
                    eprintln!("[{}] {}: {}", section, option, e);
                    ok = false;
                    continue;
                }
            };
            if json {
                let output = ConfigOutput { section, option, quantity: &quantity };
                writeln!(stdout, "{}", serde_json::to_string(&output)?)?;
            } else {
                writeln!(stdout, "{} = {}", option, quantity)?;
            }
        }
    }
    Ok(ok)
}
