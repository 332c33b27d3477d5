use std::io::Write as _;

use anyhow::Result;
use clap::Parser;
use client_core::{ActionOutcome, BookingBoard, BookingForm, BookingStore, HttpBookingStore};
use shared::domain::TimeSlot;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

mod command;

use command::{parse_command, Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Restaurant table bookings, grouped by dinner slot")]
struct Args {
    #[arg(long, env = "BOOKINGS_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
}

struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Reads one answer; an empty answer falls back to `default`. `None` on end of input.
    async fn ask(&mut self, question: &str, default: Option<&str>) -> Result<Option<String>> {
        match default {
            Some(default) => print!("{question} [{default}]: "),
            None => print!("{question}: "),
        }
        std::io::stdout().flush()?;

        let Some(answer) = self.lines.next_line().await? else {
            return Ok(None);
        };
        let answer = answer.trim();
        Ok(Some(match default {
            Some(default) if answer.is_empty() => default.to_string(),
            _ => answer.to_string(),
        }))
    }

    async fn collect_form(&mut self, prefill: Option<&BookingForm>) -> Result<Option<BookingForm>> {
        let Some(name) = self
            .ask("Customer name", prefill.map(|form| form.name.as_str()))
            .await?
        else {
            return Ok(None);
        };
        let Some(room_number) = self
            .ask("Room number", prefill.map(|form| form.room_number.as_str()))
            .await?
        else {
            return Ok(None);
        };
        let Some(number_of_people) = self
            .ask(
                "Number of people",
                prefill.map(|form| form.number_of_people.as_str()),
            )
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(BookingForm::new(name, room_number, number_of_people)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let args = Args::parse();

    let store = HttpBookingStore::new(&args.server_url)?;
    let mut board = BookingBoard::new(store);
    board.load().await;
    print!("{}", board.view());
    println!("{HELP}");

    let mut console = Console::new();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = console.lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };

        match command {
            Command::Show => print!("{}", board.view()),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::ClearAll => {
                board.clear_all();
                print!("{}", board.view());
            }
            Command::Add(slot) => add(&mut board, &mut console, slot).await?,
            Command::Edit(slot, index) => edit(&mut board, &mut console, slot, index).await?,
            Command::Delete(slot, index) => {
                let outcome = board.delete(slot, index).await;
                report(&board, slot, index, &outcome);
            }
        }
    }

    Ok(())
}

async fn add<S: BookingStore>(
    board: &mut BookingBoard<S>,
    console: &mut Console,
    slot: TimeSlot,
) -> Result<()> {
    if !board.can_add(slot) {
        println!("Maximum bookings reached for this time slot.");
        return Ok(());
    }
    let Some(form) = console.collect_form(None).await? else {
        return Ok(());
    };
    let outcome = board.add(slot, &form).await;
    report(board, slot, 0, &outcome);
    Ok(())
}

async fn edit<S: BookingStore>(
    board: &mut BookingBoard<S>,
    console: &mut Console,
    slot: TimeSlot,
    index: usize,
) -> Result<()> {
    let Some(existing) = board.booking_at(slot, index) else {
        report(board, slot, index, &ActionOutcome::NoSuchBooking);
        return Ok(());
    };
    let prefill = BookingForm::from(existing);
    let Some(form) = console.collect_form(Some(&prefill)).await? else {
        return Ok(());
    };
    let outcome = board.edit(slot, index, &form).await;
    report(board, slot, index, &outcome);
    Ok(())
}

/// Store failures are only logged; the view is simply left as it was.
fn report<S: BookingStore>(
    board: &BookingBoard<S>,
    slot: TimeSlot,
    index: usize,
    outcome: &ActionOutcome,
) {
    match outcome {
        ActionOutcome::Applied => print!("{}", board.view()),
        ActionOutcome::Rejected(errors) => {
            println!("Booking not saved:");
            for error in errors {
                println!("  - {error}");
            }
        }
        ActionOutcome::NoSuchBooking => println!("No booking #{} at {slot}.", index + 1),
        ActionOutcome::Failed => {}
    }
}
