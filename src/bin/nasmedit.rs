use std::{
    error::Error,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use nasmedit::{outline, Config, Editor, PatternSet};
use tracing::Level;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Editor settings (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// One of `TRACE`, `DEBUG`, `INFO`, `WARN`, or `ERROR`
    #[arg(short, long, global = true, default_value_t = Level::INFO)]
    log_level: Level,
}

#[derive(Subcommand)]
enum Command {
    /// Print the classified regions of every line
    Highlight {
        /// Assembly source file
        source: PathBuf,
    },

    /// Re-indent every line
    Indent {
        /// Assembly source file
        source: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List label, macro and define declarations
    Outline {
        /// Assembly source file
        source: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = main_real(args) {
        tracing::error!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn read_source(path: &Path) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(path).map_err(|e| format!("cant open file: {e}"))?)
}

fn main_real(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // the shared patterns unless the config adds words of its own
    let custom;
    let patterns = if config.keywords.is_empty() {
        PatternSet::nasm()
    } else {
        custom = PatternSet::compile(&config.keyword_tables()?)?;
        &custom
    };

    match args.command {
        Command::Highlight { source } => {
            let text = read_source(&source)?;
            let editor = Editor::new(&text, patterns, config);
            let mut out = BufWriter::new(io::stdout());
            for (index, regions) in editor.highlight().into_iter().enumerate() {
                let line = editor.buffer().line(index).unwrap_or_default();
                for region in regions {
                    writeln!(
                        out,
                        "{}:{}-{} {} {}",
                        index + 1,
                        region.range.start + 1,
                        region.range.end,
                        region.category,
                        &line[region.range.clone()]
                    )?;
                }
            }
            out.flush()?;
        }
        Command::Indent { source, output } => {
            let text = read_source(&source)?;
            let mut editor = Editor::new(&text, patterns, config);
            let lines = editor.buffer().line_count();
            tracing::trace!("indenting {lines} line(s) of {}", source.display());
            editor.indent_region(0..lines);
            let mut output: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(
                    File::options()
                        .write(true)
                        .create(true)
                        .truncate(true)
                        .open(path)
                        .map_err(|e| format!("cant open file: {e}"))?,
                )),
                None => Box::new(io::stdout()),
            };
            output.write_all(editor.into_text().as_bytes())?;
            output.flush()?;
        }
        Command::Outline { source } => {
            let text = read_source(&source)?;
            let editor = Editor::new(&text, patterns, config);
            let entries = editor.outline();
            let mut out = BufWriter::new(io::stdout());
            for entry in outline::index(&entries).values() {
                writeln!(out, "{} {} {}", entry.pos, entry.kind, entry.name)?;
            }
            out.flush()?;
        }
    }
    Ok(())
}
