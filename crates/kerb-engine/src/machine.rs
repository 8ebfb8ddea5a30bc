// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The booking dialog state machine.
//!
//! `advance` is a pure function over the session: it mutates the step and
//! draft in place and tells the caller what to send. Everything with side
//! effects (storage, dispatch) lives in the turn runner.

use kerb_core::{BookingDraft, Session, Step};

use crate::timeparse;

/// Button id for starting a booking from the main menu.
pub const SELECT_BOOK_CAB: &str = "book_cab";
/// Button id for listing recent bookings from the main menu.
pub const SELECT_MY_BOOKINGS: &str = "my_bookings";

/// What the turn runner should do after one step of the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send the main menu.
    Menu,
    /// Ask for the pickup location.
    PromptPickup,
    /// Ask for the drop-off location.
    PromptDrop,
    /// Ask for the ride time.
    PromptTime,
    /// Send the sender's recent bookings.
    History,
    /// Persist a booking from the completed draft, then confirm.
    Finalize(BookingDraft),
    /// The stored draft disagreed with the step; the session was reset.
    ResetCorrupt,
}

fn is_book_command(input: &str) -> bool {
    let folded = input.trim().to_lowercase();
    folded == SELECT_BOOK_CAB || folded == "book cab" || folded == "book a cab"
}

fn is_history_command(input: &str) -> bool {
    let folded = input.trim().to_lowercase();
    folded == SELECT_MY_BOOKINGS || folded == "my bookings"
}

/// Advance one turn of the booking dialog.
///
/// Empty input never advances a step: the same prompt is re-issued and the
/// partial draft is left alone. Unrecognized input at the idle step falls
/// back to the menu rather than erroring.
pub fn advance(session: &mut Session, input: Option<&str>) -> Outcome {
    match session.step {
        Step::Idle => match input {
            Some(text) if is_book_command(text) => {
                session.step = Step::AwaitingPickup;
                Outcome::PromptPickup
            }
            Some(text) if is_history_command(text) => Outcome::History,
            _ => Outcome::Menu,
        },
        Step::AwaitingPickup => match input {
            None => Outcome::PromptPickup,
            Some(text) => {
                session.pickup = Some(text.to_string());
                session.step = Step::AwaitingDrop;
                Outcome::PromptDrop
            }
        },
        Step::AwaitingDrop => match input {
            None => Outcome::PromptDrop,
            Some(text) => {
                session.drop_off = Some(text.to_string());
                session.step = Step::AwaitingTime;
                Outcome::PromptTime
            }
        },
        Step::AwaitingTime => match input {
            None => Outcome::PromptTime,
            Some(text) => {
                let (Some(pickup), Some(drop_off)) =
                    (session.pickup.take(), session.drop_off.take())
                else {
                    session.reset();
                    return Outcome::ResetCorrupt;
                };
                let draft = BookingDraft {
                    pickup,
                    drop_off,
                    ride_time: timeparse::normalize(text),
                };
                session.reset();
                Outcome::Finalize(draft)
            }
        },
    }
}
