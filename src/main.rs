use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::scanner::Scanner;
use rox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array instead of one per line
        #[arg(long)]
        json: bool,
    },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },
}

/// Reads the contents of a file into a String
fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // One line per record: module (crate prefix stripped), source line, message
    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Returns the process exit code.
fn tokenize(filename: &PathBuf, json: bool) -> Result<i32> {
    info!("Running Tokenize subcommand");
    let source = read_file(filename)?;
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut tokenized = true;

    for item in Scanner::new(&source) {
        match item {
            Ok(token) => {
                if !json {
                    println!("{}", token);
                }
                tokens.push(token);
            }
            Err(e) => {
                tokenized = false;
                debug!("Tokenization debug: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    if json {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, &tokens).context("Failed to write JSON")?;
        writeln!(handle)?;
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");
        return Ok(65);
    }

    info!("Tokenization completed successfully");
    Ok(0)
}

/// Returns the process exit code.
fn run(filename: &PathBuf) -> Result<i32> {
    info!("Running Run subcommand");
    let source = read_file(filename)?;

    let stdout = io::stdout();
    match rox::run(&source, stdout.lock()) {
        Ok(()) => {
            info!("Program executed successfully");
            Ok(0)
        }
        Err(e) => {
            debug!("Run debug: {}", e);
            eprintln!("{}", e);
            Ok(e.exit_code())
        }
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json)?,
        Commands::Run { filename } => run(filename)?,
    };

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
