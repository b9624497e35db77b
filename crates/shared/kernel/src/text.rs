//! Whitespace normalisation for captured process output and long messages.

/// Collapses runs of spaces, tabs and single newlines into one space.
///
/// Blank lines (two or more consecutive newlines, possibly with whitespace between
/// them) survive as a single `\n\n` paragraph break. The result is trimmed.
///
/// ```rust
/// use sim_kernel::text::compress_multiline;
///
/// let raw = "  psql: error:\n\tthe database system\n  is starting up\n\n\nretrying  ";
/// assert_eq!(
///     compress_multiline(raw),
///     "psql: error: the database system is starting up\n\nretrying"
/// );
/// ```
#[must_use]
pub fn compress_multiline(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .split(|line| line.is_empty())
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| {
            paragraph.iter().flat_map(|line| line.split_whitespace()).collect::<Vec<_>>().join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
