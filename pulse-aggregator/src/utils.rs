/// Text normalization shared by the source adapters
pub mod text {
    use scraper::Html;

    /// Keep at most `max_chars` characters. Never splits a character.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => text[..byte_idx].to_string(),
            None => text.to_string(),
        }
    }

    /// Collapse line breaks and runs of whitespace into single spaces.
    pub fn single_line(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Visible text of an HTML fragment with runs of whitespace collapsed.
    pub fn strip_html(html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        fragment
            .root_element()
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// True if `text` holds at least one CJK unified ideograph.
    pub fn contains_cjk(text: &str) -> bool {
        text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
    }

    /// Prefix titles written without any Chinese characters with `[EN]`.
    pub fn mark_english_title(title: &str) -> String {
        if contains_cjk(title) {
            title.to_string()
        } else {
            format!("[EN] {}", title)
        }
    }

    /// Parse a human-formatted count such as `1,234`. Anything else is 0.
    pub fn parse_count(text: &str) -> u64 {
        text.trim().replace(',', "").parse().unwrap_or(0)
    }

    /// First `YYYY-MM-DD` worth of characters of a timestamp string.
    pub fn date_prefix(timestamp: &str) -> String {
        truncate_chars(timestamp, 10)
    }

}
