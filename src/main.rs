use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use mdpstats::config::ToolConfig;
use mdpstats::report::{self, ExperienceSummary};
use mdpstats::ExperienceTable;


/// Command line argument parser.
#[derive(Parser, Debug)]
#[command(about = "Build empirical MDP models from recorded experience", long_about = None)]
pub struct Args {
    /// Path to TOML configuration file.
    config_path: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands
}


#[derive(Subcommand, Debug)]
enum Commands {
    /// Load an experience table and print its totals.
    Check { table: PathBuf },
    /// Derive the transition and reward model from a table.
    Derive {
        table: PathBuf,
        /// Write sanity dumps of the table and model to the debug directory.
        #[arg(long)]
        debug: bool,
    },
    /// Derive the model and write its reachable transitions as CSV.
    Export { table: PathBuf, output: PathBuf },
    /// Add one observed transition to a table, creating it if needed.
    Record {
        table: PathBuf,
        s: usize,
        s1: usize,
        a: usize,
        #[arg(allow_negative_numbers = true)]
        reward: f64,
    },
}


fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level)
    ).init();

    let config = ToolConfig::load(&args.config_path)
        .with_context(|| format!("Reading {}", args.config_path.display()))?;

    match &args.command {
        Commands::Check { table } => {
            let table = load_table(&config, table)?;
            println!("{}", ExperienceSummary::from_table(&table));
        }
        Commands::Derive { table, debug } => derive(&config, table, *debug)?,
        Commands::Export { table, output } => {
            let model = load_table(&config, table)?.derive_model();
            let file = File::create(output)
                .with_context(|| format!("Creating {}", output.display()))?;
            report::write_model_csv(&model, BufWriter::new(file))
                .with_context(|| format!("Writing {}", output.display()))?;
            info!("Model written to {}.", output.display());
        }
        Commands::Record { table, s, s1, a, reward } => {
            record(&config, table, (*s, *s1, *a), *reward)?;
        }
    }
    Ok(())
}


fn load_table(config: &ToolConfig, path: &Path) -> Result<ExperienceTable> {
    info!("Loading table {}.", path.display());
    let mut table = ExperienceTable::new(config.n_states, config.n_actions);
    let file = File::open(path)
        .with_context(|| format!("Opening {}", path.display()))?;
    table.read_from(BufReader::new(file))
        .with_context(|| format!("Could not load table {}", path.display()))?;
    info!("Table loaded correctly.");
    Ok(table)
}


fn save_table(table: &ExperienceTable, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Creating {}", path.display()))?;
    table.write_to(BufWriter::new(file))
        .with_context(|| format!("Writing {}", path.display()))?;
    Ok(())
}


fn derive(config: &ToolConfig, path: &Path, debug: bool) -> Result<()> {
    // A missing debug directory only disables the dumps.
    let debug_dir = if debug {
        match fs::create_dir_all(&config.debug_dir) {
            Ok(()) => Some(config.debug_dir.as_path()),
            Err(e) => {
                warn!("Could not create directory '{}', debug files will not be created: {}",
                      config.debug_dir.display(), e);
                None
            }
        }
    } else {
        None
    };

    let table = load_table(config, path)?;
    if let Some(dir) = debug_dir {
        save_table(&table, &dir.join("table_sanity.txt"))?;
    }

    let model = table.derive_model();
    info!("MDP extracted.");

    if let Some(dir) = debug_dir {
        let dumps = [
            ("transitionprobabilities_sanity.txt", model.transitions()),
            ("rewardsnormalized_sanity.txt", model.rewards()),
        ];
        for (name, tensor) in dumps {
            let out_path = dir.join(name);
            let file = File::create(&out_path)
                .with_context(|| format!("Creating {}", out_path.display()))?;
            report::write_tensor_dump(
                tensor, config.precision, config.columns, BufWriter::new(file)
            ).with_context(|| format!("Writing {}", out_path.display()))?;
        }
        info!("Debug files written to {}.", dir.display());
    }
    println!("{}", ExperienceSummary::from_table(&table));
    Ok(())
}


fn record(
    config: &ToolConfig, path: &Path, (s, s1, a): (usize, usize, usize), reward: f64
) -> Result<()> {
    if s >= config.n_states || s1 >= config.n_states {
        bail!("States must be below {} (got {} -> {}).", config.n_states, s, s1);
    }
    if a >= config.n_actions {
        bail!("Action must be below {} (got {}).", config.n_actions, a);
    }
    if !reward.is_finite() {
        bail!("Reward must be finite (got {}).", reward);
    }
    let mut table = if path.exists() {
        load_table(config, path)?
    } else {
        info!("Starting new table {}.", path.display());
        ExperienceTable::new(config.n_states, config.n_actions)
    };
    table.accumulate(s, s1, a, reward);
    save_table(&table, path)?;
    info!("Recorded transition {} -> {} under action {}.", s, s1, a);
    Ok(())
}
