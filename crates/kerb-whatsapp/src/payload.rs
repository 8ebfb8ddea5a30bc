// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook payload decoding.
//!
//! Two envelope shapes are accepted: the Cloud API JSON envelope
//! (`entry[].changes[].value.messages[]`) and the Twilio sandbox form
//! encoding (`From`/`Body` fields). Deliveries that carry no user message,
//! such as status-only notifications, decode to `None` rather than an
//! error so the webhook still acknowledges them.

use serde::Deserialize;

use kerb_core::{InboundTurn, KerbError};

/// Decode a raw webhook body into at most one inbound turn.
///
/// The content type selects the envelope: form-encoded bodies go through
/// the Twilio decoder, everything else is treated as Cloud API JSON.
pub fn decode(content_type: Option<&str>, body: &[u8]) -> Result<Option<InboundTurn>, KerbError> {
    let is_form = content_type
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);
    if is_form {
        decode_form(body)
    } else {
        decode_cloud(body)
    }
}

/// Decode a Cloud API JSON envelope.
///
/// Only the first message of the first change is used; the Cloud API
/// delivers one message per webhook call in practice.
pub fn decode_cloud(body: &[u8]) -> Result<Option<InboundTurn>, KerbError> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| KerbError::Decode(format!("invalid webhook JSON: {e}")))?;

    for entry in envelope.entry {
        for change in entry.changes {
            let value = change.value;
            let sender_name = value
                .contacts
                .first()
                .and_then(|c| c.profile.as_ref())
                .and_then(|p| p.name.clone());
            if let Some(message) = value.messages.into_iter().next() {
                let Some(sender) = message.from else {
                    continue;
                };
                let selection = message.interactive.and_then(|i| {
                    i.button_reply.or(i.list_reply).map(|reply| reply.id)
                });
                return Ok(Some(InboundTurn {
                    sender,
                    body: message.text.map(|t| t.body),
                    selection,
                    sender_name,
                }));
            }
        }
    }
    Ok(None)
}

/// Decode a Twilio sandbox form body.
///
/// The `whatsapp:` prefix on the sender address is stripped so sessions
/// key on the bare number regardless of envelope.
pub fn decode_form(body: &[u8]) -> Result<Option<InboundTurn>, KerbError> {
    let form: TwilioForm = serde_urlencoded::from_bytes(body)
        .map_err(|e| KerbError::Decode(format!("invalid webhook form body: {e}")))?;

    let Some(from) = form.from else {
        return Ok(None);
    };
    let sender = from
        .strip_prefix("whatsapp:")
        .unwrap_or(&from)
        .to_string();
    Ok(Some(InboundTurn {
        sender,
        body: form.body,
        selection: form.button_payload,
        sender_name: form.profile_name,
    }))
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    #[serde(default)]
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    contacts: Vec<Contact>,
    #[serde(default)]
    messages: Vec<CloudMessage>,
}

#[derive(Debug, Deserialize)]
struct Contact {
    profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudMessage {
    from: Option<String>,
    text: Option<TextBody>,
    interactive: Option<Interactive>,
}

#[derive(Debug, Deserialize)]
struct TextBody {
    body: String,
}

#[derive(Debug, Deserialize)]
struct Interactive {
    button_reply: Option<SelectionRef>,
    list_reply: Option<SelectionRef>,
}

#[derive(Debug, Deserialize)]
struct SelectionRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TwilioForm {
    from: Option<String>,
    body: Option<String>,
    button_payload: Option<String>,
    profile_name: Option<String>,
}
