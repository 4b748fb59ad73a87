//! Persisted MIDI channel settings.

use anyhow::Context;
use clap::{Args, Subcommand};
use duet_config::{default_store_path, load_store, save_store};
use duet_platform::{
    CHANNEL_ADDRESS, ChannelMode, ERASED, MemoryStore, OMNI_ADDRESS, PersistentStore,
};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct StoreArgs {
    #[command(subcommand)]
    command: StoreCommand,
}

#[derive(Subcommand, Debug)]
enum StoreCommand {
    /// Print the stored channel and omni flag
    Show {
        /// Store image; defaults to the user store
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Erase the store image, returning the synth to omni
    Reset {
        /// Store image; defaults to the user store
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

pub fn run(args: StoreArgs) -> anyhow::Result<()> {
    match args.command {
        StoreCommand::Show { store } => show(&store.unwrap_or_else(default_store_path)),
        StoreCommand::Reset { store } => reset(&store.unwrap_or_else(default_store_path)),
    }
}

fn describe_byte(byte: u8) -> String {
    if byte == ERASED {
        "erased".to_string()
    } else {
        byte.to_string()
    }
}

fn show(path: &Path) -> anyhow::Result<()> {
    let store = load_store(path)
        .with_context(|| format!("failed to load store image {}", path.display()))?;

    println!("Store image: {}", path.display());
    if !path.is_file() {
        println!("  (no image on disk, showing an erased store)");
    }
    println!("  channel byte: {}", describe_byte(store.read(CHANNEL_ADDRESS)));
    println!("  omni flag:    {}", describe_byte(store.read(OMNI_ADDRESS)));
    match ChannelMode::stored(&store) {
        ChannelMode::Omni => println!("  listening:    omni"),
        ChannelMode::Channel(channel) => println!("  listening:    channel {channel}"),
    }
    Ok(())
}

fn reset(path: &Path) -> anyhow::Result<()> {
    save_store(path, &MemoryStore::new())
        .with_context(|| format!("failed to write store image {}", path.display()))?;
    tracing::info!(path = %path.display(), "store image erased");
    println!("Erased {}", path.display());
    Ok(())
}
