//! Context windowing shared by every extractor
//!
//! The `context` of an entity is the source text within
//! [`CONTEXT_RADIUS`] characters on either side of the match, trimmed.

/// Characters kept on each side of a match
pub const CONTEXT_RADIUS: usize = 50;

/// Return the trimmed text around the byte span `start..end`.
///
/// Offsets past the end of `text` are clipped, and offsets inside a
/// UTF-8 sequence snap back to the previous char boundary.
pub fn context_window(text: &str, start: usize, end: usize) -> String {
    let end = floor_boundary(text, end.min(text.len()));
    let start = floor_boundary(text, start.min(end));

    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_RADIUS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);

    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_RADIUS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    text[from..to].trim().to_string()
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_whole_text() {
        let text = "  call me at 555-1234  ";
        assert_eq!(context_window(text, 13, 21), "call me at 555-1234");
    }

    #[test]
    fn test_radius_is_clipped() {
        let before = "a".repeat(80);
        let after = "b".repeat(80);
        let text = format!("{before}MATCH{after}");
        let ctx = context_window(&text, 80, 85);

        assert_eq!(ctx, format!("{}MATCH{}", "a".repeat(50), "b".repeat(50)));
    }

    #[test]
    fn test_multibyte_characters() {
        let text = format!("{}转账到账户{}", "钱".repeat(60), "号".repeat(60));
        let start = "钱".repeat(60).len();
        let end = start + "转账到账户".len();
        let ctx = context_window(&text, start, end);

        assert_eq!(ctx.chars().count(), 50 + 5 + 50);
        assert!(ctx.contains("转账到账户"));
    }

    #[test]
    fn test_out_of_range_offsets() {
        assert_eq!(context_window("abc", 10, 20), "abc");
        assert_eq!(context_window("", 0, 0), "");
    }
}
