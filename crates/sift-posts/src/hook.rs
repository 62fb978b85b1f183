//! Hook extraction: the opening line of a caption, bounded in length.
//!
//! All positions and lengths are counted in `char`s.

pub const DEFAULT_HOOK_LENGTH: usize = 50;

const BREAK_MARKERS: &[&str] = &["\n", "!", "?", "...", "#"];
const ELLIPSIS: &str = "...";

/// Extract the hook from `caption`.
///
/// The first occurrence of each break marker is a candidate when it sits
/// strictly inside `(0, max_length)`; the earliest candidate ends the hook,
/// marker included. Without a candidate, short captions are returned as-is
/// and long ones are cut at the last space within `max_length` chars (or
/// hard-cut) and suffixed with `...`.
#[must_use]
pub fn extract_hook(caption: &str, max_length: usize) -> String {
    let caption = caption.trim();
    if caption.is_empty() {
        return String::new();
    }

    let earliest_break = BREAK_MARKERS
        .iter()
        .filter_map(|marker| {
            let byte = caption.find(marker)?;
            let pos = caption[..byte].chars().count();
            (pos > 0 && pos < max_length).then_some((pos, byte + marker.len()))
        })
        .min_by_key(|&(pos, _)| pos);

    if let Some((_, end)) = earliest_break {
        return caption[..end].trim().to_string();
    }

    if caption.chars().count() <= max_length {
        return caption.to_string();
    }

    let last_space = caption
        .char_indices()
        .take(max_length + 1)
        .enumerate()
        .filter(|&(pos, (_, c))| pos > 0 && c == ' ')
        .map(|(_, (byte, _))| byte)
        .last();

    let cut = last_space.unwrap_or_else(|| byte_offset(caption, max_length));
    format!("{}{ELLIPSIS}", caption[..cut].trim())
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(byte, _)| byte)
}
