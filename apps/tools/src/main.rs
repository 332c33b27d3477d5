use std::collections::BTreeMap;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::domain::{TimeSlot, SLOT_CAPACITY};
use storage::Storage;

#[derive(Parser, Debug)]
#[command(about = "Operator tasks against the bookings store database")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://./data/bookings.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every stored booking.
    List,
    /// Per-slot occupancy, flagging slots above capacity and unknown labels.
    Occupancy,
    /// Delete every stored booking.
    Purge {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::List => {
            for booking in storage.list_bookings().await? {
                println!(
                    "{}\t{}\t{}\troom {}\t{} people\tcreated {}",
                    booking.id,
                    booking.time,
                    booking.name,
                    booking.room_number,
                    booking.number_of_people,
                    booking.created_at.to_rfc3339()
                );
            }
        }
        Command::Occupancy => {
            let mut counts: BTreeMap<Option<TimeSlot>, Vec<String>> = BTreeMap::new();
            for booking in storage.list_bookings().await? {
                counts
                    .entry(TimeSlot::from_label(&booking.time))
                    .or_default()
                    .push(booking.time);
            }
            for slot in TimeSlot::all() {
                let count = counts.get(&Some(slot)).map_or(0, Vec::len);
                let flag = if count > SLOT_CAPACITY { "  over capacity" } else { "" };
                println!("{slot}\t{count}/{SLOT_CAPACITY}{flag}");
            }
            if let Some(unknown) = counts.get(&None) {
                println!("outside slot registry: {}", unknown.join(", "));
            }
        }
        Command::Purge { yes } => {
            if !yes {
                anyhow::bail!("refusing to purge without --yes");
            }
            let removed = storage.purge_bookings().await?;
            println!("removed {removed} bookings");
        }
    }

    Ok(())
}
