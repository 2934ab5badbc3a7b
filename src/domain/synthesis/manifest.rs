use super::model::{AudioArtifact, SectionResult, Source, SourceOrigin};
use super::naming::{file_stem, sanitize_component, UniqueNames};

/// What happened to one submitted source
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    Synthesized(Vec<SectionResult>),
    Rejected(String),
}

/// Per-source input to the manifest, in submission order
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub display_name: String,
    pub origin: SourceOrigin,
    pub outcome: SourceOutcome,
}

impl SourceReport {
    pub fn synthesized(source: &Source, results: Vec<SectionResult>) -> Self {
        Self {
            display_name: source.display_name.clone(),
            origin: source.origin,
            outcome: SourceOutcome::Synthesized(results),
        }
    }

    pub fn rejected(display_name: impl Into<String>, origin: SourceOrigin, reason: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            origin,
            outcome: SourceOutcome::Rejected(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub source_index: usize,
    /// Set only when more than one source was submitted
    pub source_name: Option<String>,
    pub section_name: String,
    pub section_ordinal: usize,
    /// Section label, `None` when the section stands for the whole source
    pub part_name: Option<String>,
    /// Collision-safe output name without extension
    pub file_stem: String,
    pub artifact: AudioArtifact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestError {
    pub source_index: usize,
    /// Set when the source is a file or more than one source was submitted
    pub source_name: Option<String>,
    /// `None` when the whole source was refused
    pub section_name: Option<String>,
    pub section_ordinal: Option<usize>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub display_name: String,
    pub origin: SourceOrigin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// All submitted sources, in submission order
    pub sources: Vec<SourceSummary>,
    pub successes: Vec<ManifestEntry>,
    pub errors: Vec<ManifestError>,
    /// More than one artifact was produced
    pub is_multipart: bool,
    /// More than one source or section was submitted, or the text carried separators
    pub is_sectioned: bool,
}

impl Manifest {
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.errors.is_empty()
    }

    pub fn is_partial_failure(&self) -> bool {
        !self.successes.is_empty() && !self.errors.is_empty()
    }

    /// Demote a success to an error, e.g. when its artifact could not be stored
    pub fn demote(&mut self, index: usize, detail: String) {
        if index >= self.successes.len() {
            return;
        }
        let entry = self.successes.remove(index);
        let source_name = match (&entry.source_name, self.sources.get(entry.source_index)) {
            (Some(name), _) => Some(name.clone()),
            (None, Some(source)) if source.origin == SourceOrigin::File => {
                Some(source.display_name.clone())
            }
            _ => None,
        };
        let error = ManifestError {
            source_index: entry.source_index,
            source_name,
            section_name: Some(entry.section_name),
            section_ordinal: Some(entry.section_ordinal),
            detail,
        };

        let key = (error.source_index, error.section_ordinal);
        let position = self
            .errors
            .iter()
            .position(|e| (e.source_index, e.section_ordinal) > key)
            .unwrap_or(self.errors.len());
        self.errors.insert(position, error);
        self.is_multipart = self.successes.len() > 1;
    }
}

/// Flatten per-source results into one manifest. Pure and infallible.
pub fn build(reports: Vec<SourceReport>) -> Manifest {
    let multi_source = reports.len() > 1;
    let mut file_names = UniqueNames::new();
    let mut successes = Vec::new();
    let mut errors = Vec::new();
    let mut is_sectioned = multi_source;
    let sources = reports
        .iter()
        .map(|r| SourceSummary {
            display_name: r.display_name.clone(),
            origin: r.origin,
        })
        .collect();

    for (source_index, report) in reports.into_iter().enumerate() {
        let attributed = multi_source.then(|| report.display_name.clone());
        let error_source = (multi_source || report.origin == SourceOrigin::File)
            .then(|| report.display_name.clone());

        let results = match report.outcome {
            SourceOutcome::Rejected(reason) => {
                errors.push(ManifestError {
                    source_index,
                    source_name: error_source,
                    section_name: None,
                    section_ordinal: None,
                    detail: reason,
                });
                continue;
            }
            SourceOutcome::Synthesized(results) => results,
        };
        is_sectioned |= results.len() > 1 || results.iter().any(|r| !r.implicit);

        for result in results {
            match result.outcome {
                Ok(artifact) => {
                    let base = output_stem(
                        &report.display_name,
                        report.origin,
                        &result.section_name,
                        result.implicit,
                    );
                    successes.push(ManifestEntry {
                        source_index,
                        source_name: attributed.clone(),
                        part_name: (!result.implicit).then(|| result.section_name.clone()),
                        section_name: result.section_name,
                        section_ordinal: result.ordinal,
                        file_stem: file_names.claim(&base),
                        artifact,
                    });
                }
                Err(detail) => errors.push(ManifestError {
                    source_index,
                    source_name: error_source.clone(),
                    section_name: Some(result.section_name),
                    section_ordinal: Some(result.ordinal),
                    detail,
                }),
            }
        }
    }

    let is_multipart = successes.len() > 1;

    tracing::debug!(
        success_count = successes.len(),
        error_count = errors.len(),
        is_multipart,
        is_sectioned,
        "Manifest built"
    );

    Manifest {
        sources,
        successes,
        errors,
        is_multipart,
        is_sectioned,
    }
}

fn output_stem(display_name: &str, origin: SourceOrigin, section_name: &str, implicit: bool) -> String {
    match (origin, implicit) {
        (SourceOrigin::File, true) => sanitize_component(file_stem(display_name)),
        (SourceOrigin::File, false) => format!(
            "{}_{}",
            sanitize_component(file_stem(display_name)),
            sanitize_component(section_name)
        ),
        (SourceOrigin::Inline, true) => sanitize_component(section_name).to_lowercase(),
        (SourceOrigin::Inline, false) => sanitize_component(section_name),
    }
}
