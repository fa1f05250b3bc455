//! Emoji glyph lookup by gemoji shortcode.

use emojis::get_by_shortcode;

/// Returns the emoji for `shortcode`, or an empty string for an unknown code.
pub fn glyph(shortcode: &str) -> &'static str {
    get_by_shortcode(shortcode)
        .map(|emoji| emoji.as_str())
        .unwrap_or_default()
}
