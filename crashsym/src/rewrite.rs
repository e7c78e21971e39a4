//! Substituting resolved symbols back into the crash text
//!
//! Every record carries the byte span it was extracted from. Replacements
//! are applied against the untouched original, right to left, so earlier
//! spans stay valid and repeated identical frames each get their own
//! result.

use log::debug;

use crate::domain::ResolvedRecord;

/// Rebuild `original` with each record's span replaced by its resolved text
///
/// Spans that overlap an earlier one, fall outside `original`, or no longer
/// match the recorded line are skipped and left verbatim.
#[must_use]
pub fn rewrite(original: &str, resolved: &[ResolvedRecord]) -> String {
    let mut ordered: Vec<&ResolvedRecord> = resolved.iter().collect();
    ordered.sort_by_key(|r| r.record.span.start);

    let mut accepted: Vec<&ResolvedRecord> = Vec::with_capacity(ordered.len());
    let mut last_end = 0;
    for item in ordered {
        let span = &item.record.span;
        if span.start < last_end {
            debug!("Skipping overlapping span {span:?}");
            continue;
        }
        if original.get(span.clone()) != Some(item.record.original_line.as_str()) {
            debug!("Skipping stale span {span:?}");
            continue;
        }
        last_end = span.end;
        accepted.push(item);
    }

    let mut text = original.to_string();
    for item in accepted.iter().rev() {
        text.replace_range(item.record.span.clone(), &item.resolved_text());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResolveError;
    use crate::extract::extract;

    fn resolve_all(
        text: &str,
        f: impl Fn(&str) -> Result<String, ResolveError>,
    ) -> Vec<ResolvedRecord> {
        extract(text)
            .into_iter()
            .map(|record| {
                let outcome = f(record.address_token());
                ResolvedRecord { load_address: record.load_address().ok(), record, outcome }
            })
            .collect()
    }

    #[test]
    fn test_surrounding_text_is_kept() {
        let text = "Thread 0 Crashed:\n0   App  0x1000 0x0 + 16\nBinary Images:\n";
        let resolved = resolve_all(text, |addr| Ok(format!("f_{addr}")));
        assert_eq!(
            rewrite(text, &resolved),
            "Thread 0 Crashed:\n0   App  f_0x1000 0x0 + 16\nBinary Images:\n"
        );
    }

    #[test]
    fn test_identical_lines_get_their_own_results() {
        let text = "0x10 1\n0x10 1\n";
        let mut resolved = resolve_all(text, |_| Ok(String::new()));
        resolved[0].outcome = Ok("first".to_string());
        resolved[1].outcome = Ok("second".to_string());
        assert_eq!(rewrite(text, &resolved), "first 1\nsecond 1\n");
    }

    #[test]
    fn test_errors_replace_whole_match() {
        let text = "a 0x10 1 b";
        let resolved = resolve_all(text, |_| Err(ResolveError::ToolNotFound));
        assert_eq!(rewrite(text, &resolved), "a atos command not found b");
    }

    #[test]
    fn test_order_of_records_does_not_matter() {
        let text = "0x10 1\n0x20 2\n";
        let mut resolved = resolve_all(text, |addr| Ok(addr.replace("0x", "sym")));
        let forward = rewrite(text, &resolved);
        resolved.reverse();
        assert_eq!(rewrite(text, &resolved), forward);
        assert_eq!(forward, "sym10 1\nsym20 2\n");
    }

    #[test]
    fn test_overlapping_and_stale_spans_are_skipped() {
        let text = "0x10 1\n0x20 2\n";
        let mut resolved = resolve_all(text, |_| Ok("X".to_string()));
        let mut overlap = resolved[0].clone();
        overlap.record.span.start += 1;
        overlap.record.original_line = text[overlap.record.span.clone()].to_string();
        resolved.push(overlap);
        resolved[1].record.original_line = "something else".to_string();

        assert_eq!(rewrite(text, &resolved), "X 1\n0x20 2\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(rewrite("", &[]), "");
    }
}
