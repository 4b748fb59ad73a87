//! Front-panel pot listing.

use clap::Args;
use duet_platform::{ANALOG_FULL_SCALE, Pot};

#[derive(Args, Debug)]
pub struct PotsArgs {
    /// Also show what each pot reads at this raw position (0-1023)
    #[arg(long, value_parser = clap::value_parser!(u16).range(0..=i64::from(ANALOG_FULL_SCALE)))]
    raw: Option<u16>,
}

pub fn run(args: &PotsArgs) -> anyhow::Result<()> {
    println!("Front-panel pots (polled in this order, one per control tick):\n");
    match args.raw {
        Some(raw) => println!(
            "  {:<5} {:<13} {:<5} {:<14} at {raw}",
            "index", "pot", "line", "range"
        ),
        None => println!("  {:<5} {:<13} {:<5} range", "index", "pot", "line"),
    }

    for (index, pot) in Pot::ROUND_ROBIN.into_iter().enumerate() {
        let (min, max) = pot.range_map().range();
        let range = if pot.unit().is_empty() {
            format!("{min}..{max}")
        } else {
            format!("{min}..{max} {}", pot.unit())
        };
        match args.raw {
            Some(raw) => println!(
                "  {index:<5} {:<13} {:<5} {range:<14} {}",
                pot.name(),
                pot.analog_channel(),
                pot.map(raw)
            ),
            None => println!("  {index:<5} {:<13} {:<5} {range}", pot.name(), pot.analog_channel()),
        }
    }

    Ok(())
}
