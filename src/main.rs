mod config;
mod error;
mod events;
mod menu;
mod metadata;
mod store;
mod walker;

use crate::config::AppConfig;
use crate::events::LogSink;
use crate::store::AssetStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "image-gallery", about = "Keeps a folder of images and their metadata in sync")]
struct Cli {
    /// Overrides the configured storage directory
    #[arg(long, global = true)]
    storage_dir: Option<String>,

    /// Overrides the configured index file
    #[arg(long, global = true)]
    index_file: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy an image into the gallery
    Add {
        path: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Remove the first image with this title
    Delete { title: String },
    /// Show every image with its size
    List,
    /// Rewrite the index file from the catalog
    Save,
    /// Re-read the index file
    Load,
    /// Compare the storage directory against the catalog
    Audit,
    /// Interactive menu (default)
    Menu,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::new()?.with_overrides(cli.storage_dir, cli.index_file);

    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting image-gallery");

    let mut store = AssetStore::open(&config.storage_directory, &config.index_file, Box::new(LogSink))?;
    let mut stdout = std::io::stdout();

    match cli.command.unwrap_or(Command::Menu) {
        Command::Add {
            path,
            title,
            description,
        } => {
            store.add_asset(&path, &title, &description)?;
            println!("Image added.");
        }
        Command::Delete { title } => {
            if store.delete_asset(&title)? {
                println!("Image deleted.");
            } else {
                println!("Image not found.");
            }
        }
        Command::List => menu::print_gallery(&store, &mut stdout)?,
        Command::Save => {
            store.persist()?;
            println!("Metadata saved.");
        }
        Command::Load => {
            store.reload()?;
            println!("Metadata loaded.");
        }
        Command::Audit => {
            let report = store.audit()?;
            for name in &report.orphans {
                println!("Orphan file: {}", name);
            }
            for name in &report.missing {
                println!("Missing file: {}", name);
            }
            if report.is_consistent() {
                println!("Storage is consistent.");
            }
        }
        Command::Menu => {
            let stdin = std::io::stdin();
            menu::run_menu(&mut store, &mut stdin.lock(), &mut stdout)?;
        }
    }

    store.close();
    info!("Image-gallery finished");

    Ok(())
}
