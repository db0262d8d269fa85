pub mod categories_template;

/// Escapes text for use inside element content or quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Shortens a label to at most `max_chars` characters, marking the cut with "...".
pub fn trim_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let kept: String = label.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b class=\"x\">Tom & Jerry's</b>"),
            "&lt;b class=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/b&gt;"
        );
    }

    #[test]
    fn long_labels_are_cut_by_characters() {
        assert_eq!(trim_label("Sports", 50), "Sports");
        assert_eq!(trim_label(&"x".repeat(50), 50), "x".repeat(50));

        let cut = trim_label(&"y".repeat(60), 50);
        assert_eq!(cut.chars().count(), 50);
        assert!(cut.ends_with("yyy..."));

        assert_eq!(trim_label("体育新闻频道", 5), "体育...");
    }
}
