//! `symterm`: a standalone driver that parses and evaluates a program, or
//! drops into an interactive read-eval-print loop.
//!
//! This binary is a thin wrapper: argument parsing and I/O live here, all
//! parsing and evaluation logic lives in the library crates it depends on.
//!
//! # Exit Codes
//!
//! - `0` - success
//! - `1` - parse or evaluation error

use std::io::{self, BufRead, Write};

use clap::Parser;
use symterm_kernel::eval::Evaluator;
use symterm_kernel::input_form;
use symterm_syntax::parse;

/// Command-line interface for the symterm evaluator.
#[derive(Parser)]
#[command(name = "symterm")]
#[command(about = "Parse and evaluate symterm programs", long_about = None)]
#[command(version)]
struct Cli {
    /// Program text to evaluate. When omitted, reads an interactive
    /// read-eval-print loop from stdin.
    program: Option<String>,

    /// Increase log verbosity (`-v` info, `-vv` debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).init();

    let result = match cli.program {
        Some(program) => run_once(&program),
        None => run_repl(),
    };
    if let Err(code) = result {
        std::process::exit(code);
    }
}

fn run_once(program: &str) -> Result<(), i32> {
    let mut evaluator = Evaluator::new();
    symterm_stdlib::register_all(&evaluator);
    match eval_source(&mut evaluator, program) {
        Ok(value) => {
            println!("{}", input_form::render(&value));
            Ok(())
        }
        Err(msg) => {
            eprintln!("Error: {msg}");
            Err(1)
        }
    }
}

fn run_repl() -> Result<(), i32> {
    let mut evaluator = Evaluator::new();
    symterm_stdlib::register_all(&evaluator);
    let stdin = io::stdin();
    print!("symterm> ");
    let _ = io::stdout().flush();
    for line in stdin.lock().lines() {
        let line = line.map_err(|_| 1)?;
        if !line.trim().is_empty() {
            match eval_source(&mut evaluator, &line) {
                Ok(value) => println!("{}", input_form::render(&value)),
                Err(msg) => eprintln!("Error: {msg}"),
            }
        }
        print!("symterm> ");
        let _ = io::stdout().flush();
    }
    println!();
    Ok(())
}

fn eval_source(evaluator: &mut Evaluator, source: &str) -> Result<symterm_kernel::expr::Expr, String> {
    let expr = parse(source).map_err(|e| e.to_string())?;
    log::debug!("parsed: {}", input_form::render(&expr));
    Ok(evaluator.evaluate(&expr))
}
