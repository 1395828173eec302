use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrysalis::commands::{self, OutputFormat};
use chrysalis::engine::{Creature, EngineSettings};
use chrysalis::{CatalogReloader, ChrysalisConfig, SharedCatalog};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: chrysalis.ron when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog file, overriding the configured path
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print JSON instead of RON
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the catalog
    Inspect {
        /// Keep running and print a new summary whenever the catalog changes
        #[arg(long)]
        watch: bool,
    },
    /// Evolve a creature by one level
    Evolve {
        /// Creature file (.ron or .json)
        creature: PathBuf,

        #[arg(long)]
        wallet: String,

        /// Target level (default: current level + 1)
        #[arg(long)]
        target: Option<u8>,

        /// Print the evolved creature instead of the evolution result
        #[arg(long)]
        apply: bool,
    },
    /// Breed two creatures into an egg
    Breed {
        parent_a: PathBuf,
        parent_b: PathBuf,

        #[arg(long)]
        wallet: String,

        #[arg(long, default_value = "0")]
        nonce: u64,

        /// Print the egg as a creature with this id instead of the metadata
        #[arg(long)]
        egg_id: Option<String>,
    },
    /// Offer hatch options for an egg
    Hatch {
        /// Egg file (.ron or .json)
        egg: PathBuf,

        #[arg(long)]
        wallet: String,

        #[arg(long, default_value = "0")]
        nonce: u64,

        /// Number of options (default from configuration)
        #[arg(long)]
        count: Option<usize>,

        /// Hatch into this option and print the new creature
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Hatch a fresh creature and evolve it to the terminal level
    Simulate {
        #[arg(long)]
        wallet: String,

        #[arg(long, default_value = "sim-1")]
        id: String,

        /// Level-0 family (default: drawn at random)
        #[arg(long)]
        family: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ChrysalisConfig::load(args.config.as_deref())?;
    if let Some(path) = &args.catalog {
        config.catalog.path = path.clone();
    }

    let filter = if args.verbose || config.logging.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let catalog = SharedCatalog::load(&config.catalog.path)
        .with_context(|| format!("Failed to load catalog {}", config.catalog.path.display()))?;
    let settings = config.engine_settings();
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Ron
    };

    match args.command {
        Command::Inspect { watch } => {
            println!("{}", commands::render(&commands::inspect(&catalog.snapshot()), format)?);
            if watch {
                watch_catalog(&config, &catalog, format)?;
            }
        }
        Command::Evolve {
            creature,
            wallet,
            target,
            apply,
        } => {
            let mut creature: Creature = commands::read_record(&creature)?;
            let result = commands::evolve(&settings, &catalog.snapshot(), &creature, &wallet, target)?;
            if apply {
                creature.apply_evolution(&result, commands::now_timestamp())?;
                println!("{}", commands::render(&creature, format)?);
            } else {
                println!("{}", commands::render(&result, format)?);
            }
        }
        Command::Breed {
            parent_a,
            parent_b,
            wallet,
            nonce,
            egg_id,
        } => {
            let parent_a: Creature = commands::read_record(&parent_a)?;
            let parent_b: Creature = commands::read_record(&parent_b)?;
            let egg = commands::breed(&settings, &parent_a, &parent_b, &wallet, nonce)?;
            match egg_id {
                Some(id) => println!("{}", commands::render(&egg.into_egg(id), format)?),
                None => println!("{}", commands::render(&egg, format)?),
            }
        }
        Command::Hatch {
            egg,
            wallet,
            nonce,
            count,
            pick,
        } => {
            let egg: Creature = commands::read_record(&egg)?;
            hatch(&settings, &catalog, &egg, &wallet, nonce, count, pick, format)?;
        }
        Command::Simulate { wallet, id, family } => {
            let report = commands::simulate(&settings, &catalog.snapshot(), &wallet, &id, family.as_deref())?;
            println!("{}", commands::render(&report, format)?);
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn hatch(
    settings: &EngineSettings,
    catalog: &SharedCatalog,
    egg: &Creature,
    wallet: &str,
    nonce: u64,
    count: Option<usize>,
    pick: Option<usize>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let catalog = catalog.snapshot();
    let proposal = commands::propose_hatch(settings, &catalog, egg, wallet, nonce, count)?;
    match pick {
        Some(index) => {
            let creature = commands::hatch(settings, &catalog, egg, &proposal, index)?;
            println!("{}", commands::render(&creature, format)?);
        }
        None => println!("{}", commands::render(&proposal, format)?),
    }
    Ok(())
}

/// Poll the catalog file forever, printing a summary after each reload
fn watch_catalog(
    config: &ChrysalisConfig,
    catalog: &SharedCatalog,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let interval = config.catalog.reload_interval();
    let mut reloader = CatalogReloader::new(&config.catalog.path, interval);
    log::info!(
        "Watching {} (every {:?})",
        reloader.path().display(),
        interval
    );

    loop {
        std::thread::sleep(interval.max(Duration::from_millis(200)));
        match reloader.poll(catalog) {
            Ok(true) => println!("{}", commands::render(&commands::inspect(&catalog.snapshot()), format)?),
            Ok(false) => {}
            Err(err) => log::warn!("Catalog reload failed, keeping previous catalog: {err}"),
        }
    }
}
