use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use kite::builtin_functions::default_builtins;
use kite_source::Source;
use tracing::{info, Level};

/// Interpreter for kite programs.
#[derive(Parser)]
#[command(name = "kite", version)]
struct Cli {
    /// Source file. Read from stdin when neither a file nor `--code` is given
    #[arg(value_name = "FILE", conflicts_with = "code")]
    input: Option<PathBuf>,

    /// Program text passed inline
    #[arg(short, long)]
    code: Option<String>,

    /// Print the syntax tree before validating
    #[arg(long)]
    dump_ast: bool,

    /// Parse and validate without executing
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    fn read_source(&self) -> Result<String> {
        if let Some(code) = &self.code {
            return Ok(code.clone());
        }
        match &self.input {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            None => {
                let mut content = String::new();
                io::stdin()
                    .read_to_string(&mut content)
                    .context("failed to read stdin")?;
                Ok(content)
            }
        }
    }
}

/// Returns `true` when the program ran (or, with `--check`, validated) without errors.
fn interpret(cli: &Cli, source: &Source) -> bool {
    if cli.dump_ast {
        // errors are reported by the real run below
        let scratch = Source::new(source.content);
        if let Ok(program) = kite::parse(&scratch) {
            eprintln!("{:#?}", program);
        }
    }

    let builtins = default_builtins();
    let result = if cli.check {
        kite::check(source, &builtins)
    } else {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        kite::interpret_with(source, &builtins, &mut out)
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            info!("{}", err);
            false
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(io::stderr)
        .init();

    let content = cli.read_source()?;
    let source = Source::new(&content);
    let ok = interpret(&cli, &source);

    eprint!("{}", source.errors);
    if !ok {
        let count = source.errors.errors().len();
        eprintln!("{}", style(format!("{} error(s)", count)).red().bold());
        process::exit(1);
    }
    Ok(())
}
