//! Greedy, lossless splitting of section text into provider-sized chunks

use std::num::NonZeroUsize;

use super::model::{Chunk, Section};

/// Split a section into chunks of at most `max_len` characters.
///
/// Concatenating the returned chunks in order reproduces `section.text`.
pub fn chunk_section(section: &Section, max_len: NonZeroUsize) -> Vec<Chunk> {
    split_text(&section.text, max_len)
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| Chunk {
            section_ordinal: section.ordinal,
            ordinal,
            text: text.to_string(),
        })
        .collect()
}

/// Split `text` into slices of at most `max_len` chars, preferring whitespace boundaries
pub fn split_text(text: &str, max_len: NonZeroUsize) -> Vec<&str> {
    let max_len = max_len.get();
    let mut pieces = Vec::new();
    let mut rest = text;

    loop {
        // Byte offset of the first char past the window, if the rest is too long
        let limit = match rest.char_indices().nth(max_len) {
            Some((offset, _)) => offset,
            None => {
                pieces.push(rest);
                return pieces;
            }
        };

        let split_at = boundary_before(rest, limit);
        let (head, tail) = rest.split_at(split_at);
        pieces.push(head);
        rest = tail;
    }
}

/// Last whitespace boundary within `text[..=limit]`, or a hard split at `limit`
fn boundary_before(text: &str, limit: usize) -> usize {
    let mut boundary = text[..limit]
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .last()
        .map(|(offset, c)| offset + c.len_utf8());

    if text[limit..].starts_with(char::is_whitespace) {
        boundary = Some(limit);
    }

    match boundary {
        // An all-whitespace head would be an empty request for the provider
        Some(at) if text[..at].chars().any(|c| !c.is_whitespace()) => at,
        _ => limit,
    }
}
