use crate::cli::SearchArgs;
use crate::error::{CliError, Result};
use fragseek::engine::config::{FragmentKind, SearchConfig, SearchConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional TOML configuration file. Every field can be overridden on the
/// command line; precedence is CLI > file > built-in default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub search: SearchSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SearchSection {
    pub rmsd_tolerance: Option<f64>,
    pub distance_tolerance_sq: Option<f64>,
    pub sequence_filter: Option<String>,
    pub source_dir: Option<PathBuf>,
    pub include_full_source: Option<bool>,
    pub fragment_kind: Option<FragmentKind>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

/// Builds the final search configuration from the config file (when
/// given) and the command-line arguments.
pub fn resolve_config(args: &SearchArgs, regex: Option<&str>) -> Result<SearchConfig> {
    let file = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let section = file.search;

    let mut builder = SearchConfigBuilder::new();
    if let Some(tolerance) = args.rmsd_tol.or(section.rmsd_tolerance) {
        builder = builder.rmsd_tolerance(tolerance);
    }
    if let Some(tolerance) = args.dist_tol_sq.or(section.distance_tolerance_sq) {
        builder = builder.distance_tolerance_sq(tolerance);
    }
    if let Some(filter) = regex.map(str::to_string).or(section.sequence_filter) {
        builder = builder.sequence_filter(filter);
    }
    if let Some(dir) = args.source_dir.clone().or(section.source_dir) {
        builder = builder.source_dir(dir);
    }
    builder = builder
        .include_full_source(args.full_file || section.include_full_source.unwrap_or(false));
    let fragment_kind = if args.all_atom {
        FragmentKind::AllAtom
    } else {
        section.fragment_kind.unwrap_or_default()
    };
    builder = builder.fragment_kind(fragment_kind);

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}
