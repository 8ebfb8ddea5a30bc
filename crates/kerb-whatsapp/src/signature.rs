// SPDX-FileCopyrightText: 2026 Kerb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook payload signature verification.
//!
//! Meta signs every webhook delivery with an `X-Hub-Signature-256` header
//! of the form `sha256=<hex>`, an HMAC-SHA256 of the raw request body
//! keyed with the app secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify an `X-Hub-Signature-256` header value against the raw body.
///
/// Returns false for a missing `sha256=` prefix, malformed hex, or a
/// digest mismatch. Comparison is constant-time.
pub fn verify(app_secret: &str, body: &[u8], header: &str) -> bool {
    let Some(hex_digest) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .expect("HMAC accepts keys of any size");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
