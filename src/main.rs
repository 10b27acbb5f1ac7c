use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;

use pisscript::logging::{LogFilter, LogFormat, LogLevel, LogSink, LoggerCore};
use pisscript::{lexer, load_source, parse, run_with_logger, Diagnostic, Outcome, PissError, Source};

/// pisscript - the language of the household restroom
#[derive(Parser)]
#[command(name = "pisscript")]
#[command(version)]
#[command(about = "An esoteric programming language designed around the household restroom", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run a .piss file directly
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a .piss program
    Run {
        /// The .piss file to run
        file: PathBuf,
    },

    /// Check a .piss file for syntax errors without running it
    Check {
        /// The .piss file to check
        file: PathBuf,
    },

    /// Show tokens from the lexer (for debugging)
    Tokens {
        /// The .piss file to tokenize
        file: PathBuf,
    },

    /// Show parsed statements (for debugging)
    Statements {
        /// The .piss file to parse
        file: PathBuf,
    },

    /// Run a .piss program with every statement logged to stderr
    Trace {
        /// The .piss file to trace
        file: PathBuf,

        /// Emit log records as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Run { file }) => run_file(&file),
        Some(Commands::Check { file }) => check_file(&file),
        Some(Commands::Tokens { file }) => show_tokens(&file),
        Some(Commands::Statements { file }) => show_statements(&file),
        Some(Commands::Trace { file, json }) => trace_file(&file, json),
        None => match cli.file {
            Some(file) => run_file(&file),
            None => {
                eprintln!("{}", "Error: no input files specified".red());
                process::exit(2);
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{}", e.red());
        process::exit(1);
    }
}

fn run_file(path: &PathBuf) -> Result<(), String> {
    let source = read_file(path)?;
    let (outcome, _) = run_with_logger(&source, LoggerCore::from_env());
    finish(&source, outcome)
}

fn trace_file(path: &PathBuf, json: bool) -> Result<(), String> {
    let source = read_file(path)?;
    let logger = LoggerCore {
        format: if json { LogFormat::Json } else { LogFormat::Text },
        timestamps: true,
        filter: LogFilter::new(LogLevel::Trace),
        sinks: vec![LogSink::Stderr],
    };

    let (outcome, interpreter) = run_with_logger(&source, logger);
    if outcome.is_completed() {
        eprintln!(
            "{} {} statements run, {} lines of output",
            "Flushed.".green().bold(),
            interpreter.program_counter(),
            interpreter.get_output().len()
        );
    }
    finish(&source, outcome)
}

fn check_file(path: &PathBuf) -> Result<(), String> {
    let source = read_file(path)?;

    let tokens = lexer::lex(&source.text).map_err(|e| report(&source, &e))?;
    println!("{} Lexing passed ({} tokens)", "✓".green(), tokens.len());

    let program = parse(&source.text).map_err(|e| report(&source, &e))?;
    println!(
        "{} Parsing passed ({} statements)",
        "✓".green(),
        program.len()
    );

    println!("\n{} {} looks clean", "Flushed.".green().bold(), path.display());
    Ok(())
}

fn show_tokens(path: &PathBuf) -> Result<(), String> {
    let source = read_file(path)?;
    let tokens = lexer::lex(&source.text).map_err(|e| report(&source, &e))?;

    println!("{}", "Tokens:".cyan().bold());
    println!("{}", "─".repeat(50));

    for token in &tokens {
        println!(
            "{:4}  {:10} {}",
            token.line,
            token.kind.name().green(),
            format!("{:?}", token.text).dimmed()
        );
    }

    println!("{}", "─".repeat(50));
    println!("Total: {} tokens", tokens.len());

    Ok(())
}

fn show_statements(path: &PathBuf) -> Result<(), String> {
    let source = read_file(path)?;
    let program = parse(&source.text).map_err(|e| report(&source, &e))?;

    println!("{}", "Statements:".cyan().bold());
    println!("{}", "─".repeat(50));

    for statement in &program.statements {
        println!("{:4}  {}", statement.line, statement);
    }

    println!("{}", "─".repeat(50));
    println!("Total: {} statements", program.len());

    Ok(())
}

/// Turn an outcome into what the process does next. A memory fault
/// takes the whole process down.
fn finish(source: &Source, outcome: Outcome) -> Result<(), String> {
    match outcome {
        Outcome::Completed => Ok(()),
        Outcome::Failed(error) => Err(report(source, &error)),
        Outcome::Aborted { fault, line } => {
            eprintln!("{}:{}: {}", source.name, line, fault);
            process::abort();
        }
    }
}

fn report(source: &Source, error: &PissError) -> String {
    Diagnostic::from_error(source, error).to_string()
}

fn read_file(path: &PathBuf) -> Result<Source, String> {
    match path.extension() {
        Some(ext) if ext == "piss" => {}
        Some(ext) => eprintln!(
            "{}: File should have .piss extension, but got .{}",
            "Warning".yellow(),
            ext.to_string_lossy()
        ),
        None => eprintln!(
            "{}: File should have .piss extension, but it has none",
            "Warning".yellow()
        ),
    }

    load_source(path).map_err(|e| format!("Error: {}", e))
}
