// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Kerb workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for an outbound message, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Where a sender currently is in the booking dialog.
///
/// The step value must agree with how many draft fields are filled:
/// `awaiting-drop` implies pickup is set, `awaiting-time` implies pickup
/// and drop-off are set. A row violating this is treated as corrupt and
/// reset by the engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Start state: main menu, commands accepted.
    #[default]
    Idle,
    /// Waiting for the pickup location.
    AwaitingPickup,
    /// Waiting for the drop-off location.
    AwaitingDrop,
    /// Waiting for the ride time.
    AwaitingTime,
}

/// Per-sender conversation state: current step plus the partially-filled
/// booking draft accumulated across turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Sender address; one session per sender.
    pub sender: String,
    pub step: Step,
    pub pickup: Option<String>,
    pub drop_off: Option<String>,
    pub ride_time: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last save.
    pub updated_at: String,
}

impl Session {
    /// A fresh session at the idle step with an empty draft.
    pub fn fresh(sender: &str, now: &str) -> Self {
        Self {
            sender: sender.to_string(),
            step: Step::Idle,
            pickup: None,
            drop_off: None,
            ride_time: None,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Clear the draft and return to the idle step.
    pub fn reset(&mut self) {
        self.step = Step::Idle;
        self.pickup = None;
        self.drop_off = None;
        self.ride_time = None;
    }

    /// Whether the filled draft fields agree with the current step.
    pub fn draft_is_consistent(&self) -> bool {
        match self.step {
            Step::Idle => true,
            Step::AwaitingPickup => self.pickup.is_none() && self.drop_off.is_none(),
            Step::AwaitingDrop => self.pickup.is_some() && self.drop_off.is_none(),
            Step::AwaitingTime => self.pickup.is_some() && self.drop_off.is_some(),
        }
    }
}

/// A completed draft, ready to become a [`Booking`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub pickup: String,
    pub drop_off: String,
    /// Normalized or raw time string.
    pub ride_time: String,
}

/// Lifecycle status of a booking. Only `pending` is assigned by the dialog;
/// the other values exist for out-of-band updates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// A finalized booking record, owned by the booking repository.
///
/// Ids are a fixed prefix plus four random digits; uniqueness is
/// best-effort and not enforced by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub sender: String,
    pub pickup: String,
    pub drop_off: String,
    pub ride_time: String,
    pub status: BookingStatus,
    pub fare: i64,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A chat user, created lazily on first contact and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub sender: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

/// One decoded inbound webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundTurn {
    /// Sender address (provider prefix already stripped).
    pub sender: String,
    /// Free-text message body, if any.
    pub body: Option<String>,
    /// Interactive button/list selection id, if any.
    pub selection: Option<String>,
    /// Profile display name reported by the provider.
    pub sender_name: Option<String>,
}

impl InboundTurn {
    /// The effective input for this turn, trimmed.
    ///
    /// An interactive selection takes precedence over the free-text body
    /// when both are present. Whitespace-only input counts as absent.
    pub fn input(&self) -> Option<&str> {
        self.selection
            .as_deref()
            .or(self.body.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A single selectable choice in an interactive reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyChoice {
    /// Stable id returned by the provider when the button is tapped.
    pub id: String,
    /// Label rendered on the button.
    pub label: String,
}

impl ReplyChoice {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// An outbound reply produced by one state-machine turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message.
    Text(String),
    /// Prompt with selectable buttons.
    Interactive {
        prompt: String,
        choices: Vec<ReplyChoice>,
    },
}
