//! CLI tool to check, format and evaluate docklett templates.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

use docklett::{Environment, Error, Value};

/// docklett renders Dockerfile templates: `@SET`/`@IF` directives select
/// which instruction lines end up in the output.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Show debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate templates and print the surviving instruction lines
    Run {
        /// Predefine a string variable, like a build argument
        #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_define)]
        define: Vec<(String, String)>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Scan and parse templates without running them
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print templates in canonical formatting
    Fmt {
        /// Only report whether each file is already formatted
        #[arg(long)]
        check: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Dump the token stream
    Tokens {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the syntax tree
    Ast {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Command {
    fn files(&self) -> &[PathBuf] {
        match self {
            Self::Run { files, .. }
            | Self::Check { files }
            | Self::Fmt { files, .. }
            | Self::Tokens { files }
            | Self::Ast { files } => files,
        }
    }
}

fn parse_define(arg: &str) -> Result<(String, String), String> {
    let Some((name, value)) = arg.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got '{arg}'"));
    };
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    if !valid {
        return Err(format!("invalid variable name '{name}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(()) => Ok(()),
        Err(e) => bail!("Failed to init logger: {e}"),
    }
}

fn report(path: &Path, content: &str, error: &Error) {
    for diagnostic in error.diagnostics() {
        eprint!("{}", diagnostic.render(content));
    }
    eprintln!("{}: {} error(s)", path.display(), error.diagnostics().len());
}

/// Run one command on one file. `Ok(false)` means docklett errors were
/// reported; `Err` is an I/O failure.
fn process(command: &Command, path: &Path) -> Result<bool> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path.display().to_string();
    info!("processing {name}");

    let outcome = match command {
        Command::Run { define, .. } => {
            let mut environment = Environment::new();
            for (var, value) in define {
                environment.define(var.clone(), Value::from(value.as_str()));
            }
            docklett::run_with(&content, &name, environment).map(|lines| {
                for line in lines {
                    println!("{line}");
                }
                true
            })
        }
        Command::Check { .. } => docklett::parse_str(&content, &name).map(|statements| {
            eprintln!("{name}: valid ({} statement(s))", statements.len());
            true
        }),
        Command::Fmt { check, .. } => docklett::parse_str(&content, &name).map(|statements| {
            let formatted = docklett::format(&statements);
            if !*check {
                print!("{formatted}");
                return true;
            }
            let formatted_ok = formatted == content;
            if formatted_ok {
                eprintln!("{name}: formatted");
            } else {
                eprintln!("{name}: not formatted");
            }
            formatted_ok
        }),
        Command::Tokens { .. } => docklett::scan(&content, &name)
            .map(|tokens| {
                for token in tokens {
                    println!(
                        "{}:{}\t{:?}\t{:?}",
                        token.position.line, token.position.column, token.kind, token.lexeme
                    );
                }
                true
            })
            .map_err(Error::from),
        Command::Ast { .. } => docklett::parse_str(&content, &name).map(|statements| {
            print!("{}", docklett::print_tree(&statements));
            true
        }),
    };

    match outcome {
        Ok(ok) => Ok(ok),
        Err(error) => {
            report(path, &content, &error);
            Ok(false)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.debug) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let mut had_error = false;

    for path in args.command.files() {
        match process(&args.command, path) {
            Ok(true) => {}
            Ok(false) => had_error = true,
            Err(e) => {
                eprintln!("{}: {e:#}", path.display());
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
