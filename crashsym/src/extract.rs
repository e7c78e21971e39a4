//! Address extraction from crash report text
//!
//! Apple crash reports list frames like
//!
//! ```text
//! 0   App    0x0000000103450b5c 0x0000000102514000 + 16010076
//! ```
//!
//! where the first hex token is the runtime address and the trailing decimal
//! is its offset from the image load address. A single pattern scans the
//! whole text: a `0x` token followed, on the same line, by the next
//! standalone decimal integer.

use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

use crate::domain::AddressRecord;

const ADDRESS_PATTERN: &str = r"(0x[0-9a-fA-F]+)[^\n]*?\b(\d+)\b";

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("address pattern is valid"))
}

/// Scan `text` for address/offset pairs
///
/// Records come back in text order and are never deduplicated. An offset
/// token that overflows 64 bits falls back to zero.
#[must_use]
pub fn extract(text: &str) -> Vec<AddressRecord> {
    let mut records = Vec::new();

    for caps in address_pattern().captures_iter(text) {
        let (Some(whole), Some(hex), Some(dec)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };

        let token = hex.as_str();
        let address = u64::from_str_radix(&token[2..], 16).ok();
        if address.is_none() {
            warn!("Address {token} does not fit in 64 bits");
        }

        let offset = dec.as_str().parse::<u64>().unwrap_or_else(|e| {
            warn!("Failed to parse offset '{}' after {token}: {e}, using 0", dec.as_str());
            0
        });

        let base = whole.start();
        records.push(AddressRecord {
            original_line: whole.as_str().to_string(),
            span: whole.range(),
            token: hex.start() - base..hex.end() - base,
            address,
            offset,
        });
    }

    debug!("Extracted {} address records", records.len());
    records
}
