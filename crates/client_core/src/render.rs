use std::{collections::BTreeMap, fmt};

use shared::domain::{Booking, TimeSlot, SLOT_CAPACITY};

/// Plain-text rendering of every slot in chronological order.
pub struct BoardView<'a> {
    pub(crate) slots: &'a BTreeMap<TimeSlot, Vec<Booking>>,
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, bookings) in self.slots {
            write_slot(f, *slot, bookings)?;
        }
        Ok(())
    }
}

fn write_slot(f: &mut fmt::Formatter<'_>, slot: TimeSlot, bookings: &[Booking]) -> fmt::Result {
    writeln!(f, "{slot} [{}/{SLOT_CAPACITY}]", bookings.len())?;
    if bookings.is_empty() {
        return writeln!(f, "  No bookings yet for this time slot.");
    }

    writeln!(f, "  {:>2}  {:<24} {:<8} {:>6}", "#", "Name", "Room", "People")?;
    for (index, booking) in bookings.iter().enumerate() {
        writeln!(
            f,
            "  {:>2}  {:<24} {:<8} {:>6}",
            index + 1,
            booking.name,
            booking.room_number,
            booking.number_of_people
        )?;
    }
    if bookings.len() >= SLOT_CAPACITY {
        writeln!(f, "  Maximum bookings reached for this time slot.")?;
    }
    Ok(())
}
