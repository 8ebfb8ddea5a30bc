// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned reply text for the booking dialog.

use kerb_core::{Booking, Reply, ReplyChoice};

use crate::machine::{SELECT_BOOK_CAB, SELECT_MY_BOOKINGS};

pub const MENU_PROMPT: &str = "Hi! I can book you a cab. What would you like to do?";
pub const PROMPT_PICKUP: &str = "Where should we pick you up?";
pub const PROMPT_DROP: &str = "Where are you headed?";
pub const PROMPT_TIME: &str = "When do you need the cab?";
pub const NO_BOOKINGS: &str = "You have no bookings yet. Send \"book cab\" to make one.";
pub const RESET_NOTICE: &str = "Sorry, something went wrong with that booking. Let's start over.";

/// The idle-step main menu.
pub fn main_menu() -> Reply {
    Reply::Interactive {
        prompt: MENU_PROMPT.to_string(),
        choices: vec![
            ReplyChoice::new(SELECT_BOOK_CAB, "Book a cab"),
            ReplyChoice::new(SELECT_MY_BOOKINGS, "My bookings"),
        ],
    }
}

/// Time prompt with quick-pick buttons. Free text is still accepted.
pub fn time_menu() -> Reply {
    Reply::Interactive {
        prompt: PROMPT_TIME.to_string(),
        choices: vec![
            ReplyChoice::new("now", "Now"),
            ReplyChoice::new("later", "Later"),
        ],
    }
}

pub fn confirmation(booking: &Booking) -> String {
    format!(
        "Your cab is booked!\n\nBooking id: {}\nPickup: {}\nDrop-off: {}\nTime: {}\nFare: {}",
        booking.id, booking.pickup, booking.drop_off, booking.ride_time, booking.fare
    )
}

/// Render recent bookings, newest first, one line per booking.
pub fn history(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return NO_BOOKINGS.to_string();
    }
    let mut lines = vec!["Your recent bookings:".to_string()];
    for booking in bookings {
        lines.push(format!(
            "{}: {} to {} at {} ({})",
            booking.id, booking.pickup, booking.drop_off, booking.ride_time, booking.status
        ));
    }
    lines.join("\n")
}
