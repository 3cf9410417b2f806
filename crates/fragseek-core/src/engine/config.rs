use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Default tolerance on the squared inter-stem distance pre-filter, in
/// square Angstroms.
pub const DEFAULT_DISTANCE_TOLERANCE_SQ: f64 = 64.0;

/// Default acceptance tolerance on the stem RMSD, in Angstroms.
pub const DEFAULT_RMSD_TOLERANCE: f64 = 0.5;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Parameter '{0}' must be positive")]
    NonPositive(&'static str),
}

/// How database fragments are represented for matching and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentKind {
    /// Cα-trace only; full-atom detail comes from source files or an
    /// external backbone reconstruction.
    #[default]
    CaOnly,
    /// Fragments already carry all their atoms.
    AllAtom,
}

/// Parameters shared by all three query modes.
///
/// A match is accepted only when every continuity filter holds for all
/// index gaps in the candidate and the final RMSD is within
/// `rmsd_tolerance`; the remaining fields control the cheap pre-filter and
/// the optional full-atom fine verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Acceptance threshold on the aligned stem RMSD, in Angstroms.
    pub rmsd_tolerance: f64,
    /// Tolerance on squared inter-stem distances during pre-filtering, in
    /// square Angstroms.
    pub distance_tolerance_sq: f64,
    /// Optional regular expression applied to the matched one-letter
    /// sequence; non-matching candidates are rejected post-alignment.
    pub sequence_filter: Option<String>,
    /// Directory holding full-atom source structures as
    /// `<dir>/<segment>.pdb`; enables fine verification when set.
    pub source_dir: Option<PathBuf>,
    /// When a source directory is set, emit the whole source structure per
    /// match instead of just the matched span.
    pub include_full_source: bool,
    /// Fragment representation of the database.
    pub fragment_kind: FragmentKind,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rmsd_tolerance: DEFAULT_RMSD_TOLERANCE,
            distance_tolerance_sq: DEFAULT_DISTANCE_TOLERANCE_SQ,
            sequence_filter: None,
            source_dir: None,
            include_full_source: false,
            fragment_kind: FragmentKind::CaOnly,
        }
    }
}

#[derive(Default)]
pub struct SearchConfigBuilder {
    rmsd_tolerance: Option<f64>,
    distance_tolerance_sq: Option<f64>,
    sequence_filter: Option<String>,
    source_dir: Option<PathBuf>,
    include_full_source: bool,
    fragment_kind: FragmentKind,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rmsd_tolerance(mut self, tolerance: f64) -> Self {
        self.rmsd_tolerance = Some(tolerance);
        self
    }

    pub fn distance_tolerance_sq(mut self, tolerance: f64) -> Self {
        self.distance_tolerance_sq = Some(tolerance);
        self
    }

    pub fn sequence_filter(mut self, pattern: impl Into<String>) -> Self {
        self.sequence_filter = Some(pattern.into());
        self
    }

    pub fn source_dir(mut self, dir: PathBuf) -> Self {
        self.source_dir = Some(dir);
        self
    }

    pub fn include_full_source(mut self, include: bool) -> Self {
        self.include_full_source = include;
        self
    }

    pub fn fragment_kind(mut self, kind: FragmentKind) -> Self {
        self.fragment_kind = kind;
        self
    }

    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let rmsd_tolerance = self.rmsd_tolerance.unwrap_or(DEFAULT_RMSD_TOLERANCE);
        if rmsd_tolerance <= 0.0 {
            return Err(ConfigError::NonPositive("rmsd_tolerance"));
        }
        let distance_tolerance_sq = self
            .distance_tolerance_sq
            .unwrap_or(DEFAULT_DISTANCE_TOLERANCE_SQ);
        if distance_tolerance_sq <= 0.0 {
            return Err(ConfigError::NonPositive("distance_tolerance_sq"));
        }

        Ok(SearchConfig {
            rmsd_tolerance,
            distance_tolerance_sq,
            sequence_filter: self.sequence_filter,
            source_dir: self.source_dir,
            include_full_source: self.include_full_source,
            fragment_kind: self.fragment_kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_documented_tolerances() {
        let config = SearchConfig::default();
        assert_eq!(config.rmsd_tolerance, 0.5);
        assert_eq!(config.distance_tolerance_sq, 64.0);
        assert!(config.sequence_filter.is_none());
        assert!(config.source_dir.is_none());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = SearchConfigBuilder::new()
            .rmsd_tolerance(1.2)
            .distance_tolerance_sq(25.0)
            .sequence_filter("G.G")
            .fragment_kind(FragmentKind::AllAtom)
            .build()
            .unwrap();
        assert_eq!(config.rmsd_tolerance, 1.2);
        assert_eq!(config.distance_tolerance_sq, 25.0);
        assert_eq!(config.sequence_filter.as_deref(), Some("G.G"));
        assert_eq!(config.fragment_kind, FragmentKind::AllAtom);
    }

    #[test]
    fn non_positive_tolerances_are_rejected() {
        assert_eq!(
            SearchConfigBuilder::new().rmsd_tolerance(0.0).build(),
            Err(ConfigError::NonPositive("rmsd_tolerance"))
        );
        assert_eq!(
            SearchConfigBuilder::new()
                .distance_tolerance_sq(-1.0)
                .build(),
            Err(ConfigError::NonPositive("distance_tolerance_sq"))
        );
    }
}
