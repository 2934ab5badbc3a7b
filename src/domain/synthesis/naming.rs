//! Name helpers shared by section naming, output file naming and upload handling

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static UNSAFE_COMPONENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_-]").unwrap());

/// Hands out names unique within one scope, suffixing `_2`, `_3`, ... on collision
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }

        let mut suffix = 2;
        loop {
            let candidate = format!("{}_{}", base, suffix);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Replace everything outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize_component(name: &str) -> String {
    let cleaned = UNSAFE_COMPONENT.replace_all(name.trim(), "_").into_owned();
    if cleaned.is_empty() {
        "audio".to_string()
    } else {
        cleaned
    }
}

/// Filename without its last extension
pub fn file_stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

/// Reduce a client-supplied filename to a flat ASCII name safe to echo back
/// and to use in generated filenames
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .filter(|c| c.is_ascii())
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
