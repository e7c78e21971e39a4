//! Core records flowing through the pipeline
//!
//! Extraction produces [`AddressRecord`]s, resolution maps each one to a
//! [`ResolvedRecord`]. Neither is mutated after construction.

use std::fmt;
use std::ops::Range;

use super::errors::ResolveError;

/// A runtime address paired with its offset inside the loaded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    /// Exact matched substring of the crash text
    pub original_line: String,
    /// Byte span of `original_line` in the crash text
    pub span: Range<usize>,
    /// Byte range of the hex address token inside `original_line`
    pub token: Range<usize>,
    /// Parsed address, `None` if the token does not fit in 64 bits
    pub address: Option<u64>,
    /// Offset of `address` from the image load address
    pub offset: u64,
}

impl AddressRecord {
    /// The address token as written in the crash text, `0x` prefix included
    #[must_use]
    pub fn address_token(&self) -> &str {
        &self.original_line[self.token.clone()]
    }

    /// Load address of the image containing this address
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidAddress`] if the address did not parse or
    /// the offset is larger than the address.
    pub fn load_address(&self) -> Result<u64, ResolveError> {
        self.address.and_then(|addr| addr.checked_sub(self.offset)).ok_or_else(|| {
            ResolveError::InvalidAddress {
                address: self.address_token().to_string(),
                offset: self.offset,
            }
        })
    }
}

/// Outcome of resolving one [`AddressRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
    pub record: AddressRecord,
    /// Computed load address, when the record got that far
    pub load_address: Option<u64>,
    /// Trimmed resolver output on success
    pub outcome: Result<String, ResolveError>,
}

impl ResolvedRecord {
    /// Build a record that failed before reaching the resolver
    #[must_use]
    pub fn failed(record: AddressRecord, error: ResolveError) -> Self {
        Self { record, load_address: None, outcome: Err(error) }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Text that replaces `original_line` in the crash report
    ///
    /// On success the address token is swapped for the symbol text and the
    /// rest of the matched line is kept. On failure the whole line becomes
    /// the error message.
    #[must_use]
    pub fn resolved_text(&self) -> String {
        match &self.outcome {
            Ok(symbol) => {
                let line = &self.record.original_line;
                let token = &self.record.token;
                let mut text = String::with_capacity(line.len() + symbol.len());
                text.push_str(&line[..token.start]);
                text.push_str(symbol);
                text.push_str(&line[token.end..]);
                text
            }
            Err(e) => e.to_string(),
        }
    }
}

impl fmt::Display for ResolvedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resolved_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str, address: Option<u64>, offset: u64) -> AddressRecord {
        let end = line.find(' ').unwrap_or(line.len());
        AddressRecord {
            original_line: line.to_string(),
            span: 0..line.len(),
            token: 0..end,
            address,
            offset,
        }
    }

    #[test]
    fn test_load_address_round_trip() {
        let rec = record("0x103450b5c 1000", Some(0x1_0345_0b5c), 1000);
        let load = rec.load_address().unwrap();
        assert_eq!(load + rec.offset, 0x1_0345_0b5c);
    }

    #[test]
    fn test_zero_offset_keeps_address() {
        let rec = record("0x1000 x", Some(0x1000), 0);
        assert_eq!(rec.load_address().unwrap(), 0x1000);
    }

    #[test]
    fn test_offset_larger_than_address_is_invalid() {
        let rec = record("0x10 32", Some(0x10), 32);
        assert_eq!(
            rec.load_address(),
            Err(ResolveError::InvalidAddress { address: "0x10".to_string(), offset: 32 })
        );
    }

    #[test]
    fn test_resolved_text_replaces_only_token() {
        let rec = record("0x1000 + 42", Some(0x1000), 42);
        let resolved = ResolvedRecord {
            record: rec,
            load_address: Some(0xfd6),
            outcome: Ok("main (in App) (main.m:7)".to_string()),
        };
        assert_eq!(resolved.resolved_text(), "main (in App) (main.m:7) + 42");
    }

    #[test]
    fn test_failed_record_renders_error() {
        let rec = record("0x1000 42", Some(0x1000), 42);
        let resolved = ResolvedRecord::failed(rec, ResolveError::ToolNotFound);
        assert!(!resolved.is_resolved());
        assert_eq!(resolved.to_string(), "atos command not found");
    }
}
