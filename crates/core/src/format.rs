//! Source formatting - renders a unique-source map into one context string

use tracing::warn;

use crate::source::UniqueSourceMap;

/// Rough heuristic: four characters per token.
const CHARS_PER_TOKEN: usize = 4;

/// Marker appended when raw content is cut at the character limit.
const TRUNCATION_MARKER: &str = "... [truncated]";

/// Render the sources, in map order, into a single human/LLM-readable block.
///
/// Each source gets a 1-based index, title, url and content. When
/// `include_raw_content` is set, the raw content is also emitted, truncated
/// to `max_tokens_per_source * 4` characters with a truncation marker when
/// cut. A source without raw content renders an empty block and logs a
/// warning instead of failing.
///
/// The result is whitespace-trimmed at the edges; nothing is escaped.
pub fn format_sources(
    sources: &UniqueSourceMap,
    max_tokens_per_source: usize,
    include_raw_content: bool,
) -> String {
    let mut formatted_text = String::from("Sources:\n\n");

    for (i, (url, source)) in sources.iter().enumerate() {
        formatted_text.push_str(&format!("Source {}:\n\n", i + 1));
        formatted_text.push_str(&format!("Title: {}\n\n", source.title));
        formatted_text.push_str(&format!("URL: {}\n\n", url));
        formatted_text.push_str(&format!(
            "Most relevant content from source:\n{}\n==\n\n",
            source.content
        ));

        if include_raw_content {
            let char_limit = max_tokens_per_source * CHARS_PER_TOKEN;
            let raw_content = match source.raw_content.as_deref() {
                Some(raw) => truncate_chars(raw, char_limit),
                None => {
                    warn!(url = %url, "no raw_content found for source");
                    String::new()
                }
            };
            formatted_text.push_str(&format!(
                "Full source content limited to {} tokens:\n {}\n\n",
                max_tokens_per_source, raw_content
            ));
        }

        formatted_text.push_str("====================================\n\n");
    }

    formatted_text.trim().to_string()
}

/// Truncate to `limit` characters (not bytes), appending the marker when cut.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str(TRUNCATION_MARKER);
        truncated
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceRecord, UniqueSourceMap};

    fn map_with(records: Vec<SourceRecord>) -> UniqueSourceMap {
        records
            .into_iter()
            .map(|record| (record.url.clone(), record))
            .collect()
    }

    #[test]
    fn renders_indexed_blocks_in_map_order() {
        let sources = map_with(vec![
            SourceRecord::new("https://a.com", "Alpha", "first"),
            SourceRecord::new("https://b.com", "Beta", "second"),
        ]);

        let text = format_sources(&sources, 100, false);
        let a_pos = text.find("Source 1:").unwrap();
        let b_pos = text.find("Source 2:").unwrap();
        assert!(a_pos < b_pos);
        assert!(text.contains("Title: Alpha"));
        assert!(text.contains("URL: https://b.com"));
        assert!(!text.contains("Full source content"));
    }

    #[test]
    fn truncation_boundary_is_exactly_four_chars_per_token() {
        let sources = map_with(vec![
            SourceRecord::new("https://a.com", "Alpha", "short").with_raw_content("0123456789"),
        ]);

        let text = format_sources(&sources, 1, true);
        assert!(text.contains("\n 0123... [truncated]\n"));
        assert!(!text.contains("01234"));
    }

    #[test]
    fn raw_content_under_limit_is_not_marked() {
        let sources = map_with(vec![
            SourceRecord::new("https://a.com", "Alpha", "short").with_raw_content("tiny"),
        ]);

        let text = format_sources(&sources, 10, true);
        assert!(text.contains("\n tiny\n"));
        assert!(!text.contains(TRUNCATION_MARKER));
    }

    #[test]
    fn missing_raw_content_renders_empty_without_error() {
        let sources = map_with(vec![SourceRecord::new("https://a.com", "Alpha", "short")]);

        let text = format_sources(&sources, 1, true);
        assert!(text.contains("Full source content limited to 1 tokens:\n \n"));
    }

    #[test]
    fn multibyte_raw_content_truncates_on_char_boundary() {
        let sources = map_with(vec![
            SourceRecord::new("https://a.com", "Alpha", "short").with_raw_content("héllo wörld"),
        ]);

        let text = format_sources(&sources, 1, true);
        assert!(text.contains("héll... [truncated]"));
    }

    #[test]
    fn output_is_edge_trimmed() {
        let sources = map_with(vec![SourceRecord::new("https://a.com", "Alpha", "short")]);

        let text = format_sources(&sources, 100, false);
        assert!(text.starts_with("Sources:"));
        assert!(text.ends_with("===================================="));
    }

    #[test]
    fn empty_map_renders_bare_header() {
        let text = format_sources(&UniqueSourceMap::new(), 100, true);
        assert_eq!(text, "Sources:");
    }
}
