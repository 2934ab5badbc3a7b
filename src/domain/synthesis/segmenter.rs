//! Splits a source into named sections on `---------- <label>` separator lines

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Section, Source};
use super::naming::UniqueNames;

/// Minimum run of dashes that makes a separator line
pub const MIN_SEPARATOR_DASHES: usize = 10;

/// Dash run, then end of line or whitespace and a label
static SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*-{{{},}}(?:\s+(?P<label>.*?))?\s*$",
        MIN_SEPARATOR_DASHES
    ))
    .unwrap()
});

/// Returns the trimmed label if `line` is a separator line
pub fn parse_separator(line: &str) -> Option<String> {
    SEPARATOR.captures(line).map(|caps| {
        caps.name("label")
            .map(|label| label.as_str().trim().to_string())
            .unwrap_or_default()
    })
}

struct RawSection {
    label: Option<String>,
    text: String,
}

/// Segment a source into ordered, non-blank, uniquely named sections.
///
/// Text with no separator line yields one section holding the raw text
/// verbatim. An empty result means the source has nothing to synthesize.
pub fn segment(source: &Source) -> Vec<Section> {
    let mut raw_sections: Vec<RawSection> = Vec::new();
    let mut current = RawSection {
        label: None,
        text: String::new(),
    };
    let mut saw_separator = false;

    for line in source.raw_text.lines() {
        match parse_separator(line) {
            Some(label) => {
                saw_separator = true;
                raw_sections.push(std::mem::replace(
                    &mut current,
                    RawSection {
                        label: Some(label),
                        text: String::new(),
                    },
                ));
            }
            None => {
                current.text.push_str(line);
                current.text.push('\n');
            }
        }
    }
    raw_sections.push(current);

    if !saw_separator {
        if source.raw_text.trim().is_empty() {
            return Vec::new();
        }
        return vec![Section {
            name: source.display_name.clone(),
            text: source.raw_text.clone(),
            ordinal: 0,
            implicit: true,
        }];
    }

    let mut names = UniqueNames::new();
    raw_sections
        .into_iter()
        .filter_map(|raw| {
            let text = raw.text.trim();
            (!text.is_empty()).then(|| (raw.label, text.to_string()))
        })
        .enumerate()
        .map(|(ordinal, (label, text))| {
            let (base, implicit) = match label {
                None => (source.display_name.clone(), true),
                Some(label) if label.is_empty() => (format!("section_{}", ordinal + 1), false),
                Some(label) => (label, false),
            };
            Section {
                name: names.claim(&base),
                text,
                ordinal,
                implicit,
            }
        })
        .collect()
}
