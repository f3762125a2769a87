use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use std::io;
use std::path::{is_separator, PathBuf};
use std::process::ExitCode;
use waypoint_core::{
    decode, nth_or_last, rank, Entry, FrecencyUpdater, RankPolicy, TabResolution, TAB_SEPARATOR,
};

mod config;
mod data;
mod error;
mod report;

pub use config::{Config, DATA_DIR_ENV, SOURCED_ENV};
pub use data::{DataFile, BACKUP_THRESHOLD};
pub use error::{DataError, Result as DataResult};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Jump to frequently visited directories", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory fragments to jump to
    directory: Vec<String>,

    /// Add PATH to the database
    #[arg(short, long, value_name = "PATH")]
    add: Option<String>,

    /// Increase the current directory's weight (default 10)
    #[arg(short, long, value_name = "WEIGHT", num_args = 0..=1, value_parser = parse_weight)]
    increase: Option<Option<f64>>,

    /// Decrease the current directory's weight (default 15)
    #[arg(short, long, value_name = "WEIGHT", num_args = 0..=1, value_parser = parse_weight)]
    decrease: Option<Option<f64>>,

    /// Print tab-completion candidates for the last fragment
    #[arg(long)]
    complete: bool,

    /// Remove entries for directories that no longer exist
    #[arg(long)]
    purge: bool,

    /// Show database entries and their weights
    #[arg(short, long)]
    stat: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only errors (stdout is reserved for the shell)
    #[arg(short, long)]
    quiet: bool,
}

fn parse_weight(raw: &str) -> std::result::Result<f64, String> {
    let weight: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight must be a non-negative number, got {raw}"));
    }
    Ok(weight)
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

pub fn main_entry() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    if !config::is_shell_sourced() {
        eprintln!(
            "waypoint: shell integration not loaded; source waypoint.bash from your shell startup file"
        );
        return Ok(ExitCode::from(1));
    }

    let config = Config::from_env()?;
    log::debug!("Data file {}", config.data_path.display());
    let data = DataFile::new(&config);
    let updater = FrecencyUpdater::new(&data).with_home(config.home.clone());

    if let Some(path) = &cli.add {
        updater
            .add(path)
            .with_context(|| format!("Failed to add {path}"))?;
    } else if let Some(weight) = cli.increase {
        let entry = updater.increase(&current_dir()?, weight)?;
        print_stdout(&report::render_entry(&entry))?;
    } else if let Some(weight) = cli.decrease {
        let entry = updater.decrease(&current_dir()?, weight)?;
        print_stdout(&report::render_entry(&entry))?;
    } else if cli.complete {
        let entries = updater.load()?.entries();
        complete(&entries, cli.directory.last().map_or("", String::as_str))?;
    } else if cli.purge {
        let removed = updater.purge()?;
        print_stdout(&format!("Purged {removed} entries."))?;
    } else if cli.stat {
        let store = updater.load()?;
        let cwd = std::env::current_dir().ok();
        print_stdout(&report::render_stat(&store, cwd.as_deref(), data.data_path()))?;
    } else {
        let entries = updater.load()?.entries();
        let target = jump(&entries, &cli.directory, &RankPolicy::from_current_dir());
        print_stdout(&target)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn current_dir() -> Result<String> {
    let dir: PathBuf = std::env::current_dir().context("Current directory is unavailable")?;
    Ok(dir.to_string_lossy().into_owned())
}

/// Completion mode: existence checks are skipped, missing directories are
/// still worth cycling through.
fn complete(entries: &[Entry], needle: &str) -> Result<()> {
    let policy = RankPolicy::from_current_dir().check_existence(false);
    match decode(needle, TAB_SEPARATOR).resolve(entries, &policy, TAB_SEPARATOR) {
        TabResolution::Path(path) => print_stdout(&path)?,
        TabResolution::Menu(lines) => {
            for line in lines {
                print_stdout(&line)?;
            }
        }
        TabResolution::NoMatch => log::debug!("No completion for {needle:?}"),
    }
    Ok(())
}

/// Resolve the jump target for `directory`, falling back to `.`.
fn jump(entries: &[Entry], directory: &[String], policy: &RankPolicy) -> String {
    let mut fragments: Vec<String> = directory
        .iter()
        .map(|f| f.trim_end_matches(is_separator).to_string())
        .collect();
    if fragments.is_empty() {
        fragments.push(String::new());
    }

    let last = fragments.last().cloned().unwrap_or_default();
    let token = decode(&last, TAB_SEPARATOR);

    let target = if let Some(path) = token.path {
        Some(path)
    } else if let Some(index) = token.index.or_else(|| {
        // `j foo__` and `j foo__0` pick the first completion entry.
        last.contains(TAB_SEPARATOR).then_some(1)
    }) {
        let fragment = [token.fragment.clone()];
        nth_or_last(rank(entries, &fragment, policy), index).map(|e| e.path.clone())
    } else {
        rank(entries, &fragments, policy).next().map(|e| e.path.clone())
    };

    target.unwrap_or_else(|| ".".to_string())
}
