//! ludics CLI tool
//!
//! Runs a JSON move log through the engine and prints the result as JSON.
//!
//! Usage:
//!   ludics compile <move-log.json> [--dialogue <id>]
//!   ludics step <move-log.json> [--fuel <n>] [--dialogue <id>]

use std::path::{Path, PathBuf};

use ludics_design::{Design, Move};
use ludics_engine::{Engine, EngineConfig, StepRequest};
use ludics_interaction::Trace;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_DIALOGUE: &str = "cli";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Compile {
        log: PathBuf,
        dialogue: String,
    },
    Step {
        log: PathBuf,
        dialogue: String,
        fuel: Option<u32>,
    },
}

/// Output of `ludics step`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepOutput<'a> {
    pos_design: &'a Design,
    neg_design: &'a Design,
    trace: Trace,
}

fn print_usage() {
    eprintln!("ludics - run move logs through the interaction engine");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  ludics compile <move-log.json> [--dialogue <id>]");
    eprintln!("        Print the compiled designs");
    eprintln!("  ludics step <move-log.json> [--fuel <n>] [--dialogue <id>]");
    eprintln!("        Compile, then step the first two designs against each other");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG  Log filter, written to stderr (default: ludics=info)");
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let name = args.first().ok_or("missing command")?;
    let log = args
        .get(1)
        .map(PathBuf::from)
        .ok_or_else(|| format!("{} requires a move log path", name))?;

    let mut dialogue = DEFAULT_DIALOGUE.to_string();
    let mut fuel = None;
    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let value = rest
            .next()
            .ok_or_else(|| format!("{} requires a value", flag))?;
        match flag.as_str() {
            "--dialogue" => dialogue = value.clone(),
            "--fuel" if name == "step" => {
                fuel = Some(
                    value
                        .parse::<u32>()
                        .map_err(|e| format!("invalid fuel {:?}: {}", value, e))?,
                );
            }
            _ => return Err(format!("unknown option {}", flag)),
        }
    }

    match name.as_str() {
        "compile" => Ok(Command::Compile { log, dialogue }),
        "step" => Ok(Command::Step {
            log,
            dialogue,
            fuel,
        }),
        other => Err(format!("unknown command {}", other)),
    }
}

fn read_log(path: &Path) -> Result<Vec<Move>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid move log {}: {}", path.display(), e))
}

fn run(command: Command) -> Result<String, String> {
    let mut engine = Engine::new(EngineConfig::default());
    match command {
        Command::Compile { log, dialogue } => {
            let moves = read_log(&log)?;
            let update = engine
                .compile(dialogue, &moves, None)
                .map_err(|e| e.to_string())?;
            let designs = update
                .design_ids
                .iter()
                .map(|id| engine.design(*id))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&designs).map_err(|e| e.to_string())
        }
        Command::Step {
            log,
            dialogue,
            fuel,
        } => {
            let moves = read_log(&log)?;
            let update = engine
                .compile(dialogue.clone(), &moves, None)
                .map_err(|e| e.to_string())?;
            let &[pos, neg, ..] = update.design_ids.as_slice() else {
                return Err(format!(
                    "need two participants to step, found {}",
                    update.design_ids.len()
                ));
            };

            let mut request = StepRequest::new(dialogue, pos, neg);
            request.fuel = fuel;
            let trace = engine.step(&request).map_err(|e| e.to_string())?;
            tracing::info!(status = trace.status.as_str(), pairs = trace.len(), "stepped");

            let output = StepOutput {
                pos_design: engine.design(pos).map_err(|e| e.to_string())?,
                neg_design: engine.design(neg).map_err(|e| e.to_string())?,
                trace,
            };
            serde_json::to_string_pretty(&output).map_err(|e| e.to_string())
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ludics=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || matches!(args[0].as_str(), "-h" | "--help" | "help") {
        print_usage();
        std::process::exit(1);
    }

    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    match run(command) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_step_with_flags() {
        let command = parse_args(&args(&["step", "log.json", "--fuel", "3", "--dialogue", "d7"]));
        assert_eq!(
            command,
            Ok(Command::Step {
                log: PathBuf::from("log.json"),
                dialogue: "d7".into(),
                fuel: Some(3),
            })
        );
    }

    #[test]
    fn compile_defaults_dialogue() {
        assert_eq!(
            parse_args(&args(&["compile", "log.json"])),
            Ok(Command::Compile {
                log: PathBuf::from("log.json"),
                dialogue: DEFAULT_DIALOGUE.into(),
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&["step"])).is_err());
        assert!(parse_args(&args(&["step", "log.json", "--fuel"])).is_err());
        assert!(parse_args(&args(&["step", "log.json", "--fuel", "lots"])).is_err());
        assert!(parse_args(&args(&["compile", "log.json", "--fuel", "3"])).is_err());
        assert!(parse_args(&args(&["frobnicate", "log.json"])).is_err());
    }
}
