//! Offline rendering of a score.

use crate::player::ScorePlayer;
use anyhow::Context;
use clap::Args;
use duet_config::{
    InstrumentConfig, Score, default_config_path, default_store_path, load_store, save_store,
};
use duet_synth::Instrument;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Score to play (TOML)
    #[arg(value_name = "SCORE")]
    score: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Instrument config (TOML); defaults to the user config if present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persistent store image; defaults to the user store
    #[arg(long)]
    store: Option<PathBuf>,

    /// Leave the store image untouched after rendering
    #[arg(long)]
    no_persist: bool,
}

/// Peak and clipping counters over the rendered signal.
#[derive(Debug, Default)]
struct RenderStats {
    samples: u64,
    peak: u16,
    clipped: u64,
}

impl RenderStats {
    fn observe(&mut self, sample: i16) {
        self.samples += 1;
        self.peak = self.peak.max(sample.unsigned_abs());
        if sample == i16::MAX || sample == i16::MIN {
            self.clipped += 1;
        }
    }

    fn peak_dbfs(&self) -> f32 {
        if self.peak == 0 {
            return f32::NEG_INFINITY;
        }
        20.0 * (f32::from(self.peak) / 32768.0).log10()
    }
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => InstrumentConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => InstrumentConfig::load_or_default(default_config_path())
            .context("failed to load the default config")?,
    };
    let score = Score::load(&args.score)
        .with_context(|| format!("failed to load score {}", args.score.display()))?;

    let store_path = args.store.clone().unwrap_or_else(default_store_path);
    let store = load_store(&store_path)
        .with_context(|| format!("failed to load store image {}", store_path.display()))?;

    let rates = config.rates();
    let ticks = score.control_ticks(rates.control_rate);
    tracing::info!(
        score = %args.score.display(),
        events = score.events.len(),
        ticks,
        audio_rate = rates.audio_rate,
        "rendering"
    );

    let mut duet = Instrument::boot(rates, store, &config.sense_lines);
    let mut player = ScorePlayer::new(&score, &config.pots);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: rates.audio_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&args.output, spec)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let pb = ProgressBar::new(ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ticks ({eta})")?
            .progress_chars("##-"),
    );

    let mut block = vec![0i16; duet.samples_per_tick()];
    let mut stats = RenderStats::default();
    let control_rate = u64::from(rates.control_rate);
    for tick in 0..ticks {
        player.advance_to(tick * 1000 / control_rate);
        duet.run_tick(&mut player, &mut block);
        for &sample in &block {
            writer.write_sample(sample)?;
            stats.observe(sample);
        }
        if tick % 64 == 0 {
            pb.set_position(tick);
        }
    }
    pb.finish_with_message("done");
    writer
        .finalize()
        .with_context(|| format!("failed to finish {}", args.output.display()))?;

    if player.remaining_events() > 0 {
        tracing::warn!(
            unplayed = player.remaining_events(),
            "score events never reached before the end of the render"
        );
    }
    if player.pending_midi() > 0 {
        tracing::warn!(
            pending = player.pending_midi(),
            "score ended with MIDI messages still queued"
        );
    }

    println!(
        "Rendered {} ({} samples, {:.2}s)",
        args.output.display(),
        stats.samples,
        stats.samples as f32 / rates.audio_rate as f32
    );
    println!(
        "  Peak {:.1} dBFS, {} clipped samples",
        stats.peak_dbfs(),
        stats.clipped
    );

    let store = duet.into_store();
    if args.no_persist {
        tracing::debug!("store image left untouched");
    } else if store.is_dirty() {
        save_store(&store_path, &store)
            .with_context(|| format!("failed to save store image {}", store_path.display()))?;
        println!("  Saved store image {}", store_path.display());
    }

    Ok(())
}
