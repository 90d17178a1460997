//! String utility functions.

use unicode_segmentation::UnicodeSegmentation;

/// Returns the number of user-perceived characters in a string.
///
/// Counts extended grapheme clusters, so a base letter followed by
/// combining marks counts once whether the text arrived precomposed or
/// decomposed. This is the length used when validating form input.
///
/// # Examples
///
/// ```
/// use formspec_core::utils::text::glyph_length;
///
/// assert_eq!(glyph_length("műemlék"), 7);
/// assert_eq!(glyph_length("Bärfuß"), 6);
/// assert_eq!(glyph_length("Ba\u{308}rfuß"), 6);
/// ```
pub fn glyph_length(s: &str) -> usize {
    s.graphemes(true).count()
}
