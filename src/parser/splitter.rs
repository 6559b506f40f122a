use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Anchor that opens every booking record: a dotted date followed by "Booked"
    static ref ANCHOR: Regex = Regex::new(r"\d+\.\d+\.\d+ Booked").expect("invalid anchor regex");
}

/// Split pasted text into individual event blocks.
///
/// Each block starts at its own date anchor and runs to the next anchor (or the
/// end of input), so every block keeps the date that opened it. Input order is
/// preserved. Text before the first anchor is discarded. When no anchor is
/// present at all, the whole trimmed input is treated as a single block.
pub fn split_blocks(input: &str) -> Vec<String> {
    let starts: Vec<usize> = ANCHOR.find_iter(input).map(|m| m.start()).collect();

    if starts.is_empty() {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![trimmed.to_string()];
    }

    let mut blocks = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(input.len());
        let block = input[start..end].trim();
        if !block.is_empty() {
            blocks.push(block.to_string());
        }
    }

    blocks
}
