//! Sword Forge - randomized sword assembly from the command line
//!
//! # Commands
//!
//! - `sword-forge init <library.ron>` - Write a sample template library
//! - `sword-forge validate <library.ron>` - Check every authored template for anchors
//! - `sword-forge randomize <library.ron>` - Populate the pools and build a random sword
//! - `sword-forge import <library.ron> <composite>` - Import one authored sword's parts

mod report;
mod workshop;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sword_core::{ImportOutcome, PartKind, TemplateLibrary};

use crate::report::SwordReport;
use crate::workshop::Workshop;

/// Sword Forge - assemble swords from modular part templates
#[derive(Parser)]
#[command(name = "sword-forge")]
#[command(about = "Assemble swords from modular part templates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample template library
    Init {
        /// Output path
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check every authored template for Start and End anchors
    Validate {
        /// Template library (RON)
        library: PathBuf,
    },

    /// Build random swords from the library's pools
    Randomize {
        /// Template library (RON)
        library: PathBuf,
        /// Seed overriding the library setting
        #[arg(long)]
        seed: Option<u64>,
        /// Rebuild this many times, keeping only the last sword
        #[arg(long, default_value_t = 1)]
        rebuilds: u32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import the parts of one authored sword and show what the pools gained
    Import {
        /// Template library (RON)
        library: PathBuf,
        /// Name of the composite in the library
        composite: String,
    },
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sword_forge=info,sword_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init { path, force } => init(path, force),
        Commands::Validate { library } => validate(library),
        Commands::Randomize {
            library,
            seed,
            rebuilds,
            json,
        } => randomize(library, seed, rebuilds, json),
        Commands::Import { library, composite } => import(library, &composite),
    }
}

fn init(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    TemplateLibrary::sample().save(&path)?;
    println!("Wrote sample library to {}", path.display());
    Ok(())
}

fn validate(path: PathBuf) -> Result<()> {
    let library = TemplateLibrary::load(&path)?;
    let workshop = Workshop::open(&library, false)?;

    let mut invalid = 0;
    for &kind in PartKind::all() {
        for (name, ok) in workshop.candidate_status(kind) {
            let mark = if ok { "ok" } else { "missing Start/End" };
            println!("{:<7} {:<24} {}", kind, name, mark);
            if !ok {
                invalid += 1;
            }
        }
    }
    if invalid > 0 {
        bail!("{invalid} template(s) failed validation");
    }
    Ok(())
}

fn randomize(path: PathBuf, seed: Option<u64>, rebuilds: u32, json: bool) -> Result<()> {
    let library = TemplateLibrary::load(&path)?;
    let mut workshop = Workshop::open(&library, true)?;
    let epsilon = library.settings.epsilon;

    let mut rng = match seed.or(library.settings.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..rebuilds.max(1) {
        workshop.generator.randomize(&mut workshop.scene, &mut rng)?;
    }

    let sword = workshop
        .generator
        .sword()
        .context("generator holds no sword after randomize")?;
    let report = SwordReport::new(&workshop.scene, sword, epsilon)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    if !report.connected {
        bail!("seams exceed tolerance {epsilon}");
    }
    Ok(())
}

fn import(path: PathBuf, composite: &str) -> Result<()> {
    let library = TemplateLibrary::load(&path)?;
    let mut workshop = Workshop::open(&library, false)?;
    let root = workshop
        .composite(composite)
        .with_context(|| format!("no composite named '{composite}' in {}", path.display()))?;

    for pass in ["first", "second"] {
        let report = workshop.generator.import_template(&workshop.scene, root);
        println!("{pass} import: {} new template(s)", report.added());
        for &kind in PartKind::all() {
            let outcome = match report.outcome(kind) {
                ImportOutcome::Added => "added",
                ImportOutcome::Duplicate => "already pooled",
                ImportOutcome::Invalid => "missing Start/End",
                ImportOutcome::Missing => "not present",
                ImportOutcome::Generated => "part of the generated sword",
            };
            println!("  {:<7} {}", kind, outcome);
        }
    }
    Ok(())
}
