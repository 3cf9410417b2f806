use clap::{Args, Parser, Subcommand};
use fragseek::engine::query::StemSpecifier;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "FragSeek CLI - structural-fragment search over protein backbone databases.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel scanning.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find fragments anchored by three fixed stem residues.
    Spot(SpotArgs),
    /// Find fragments matching a fixed-width span of the query structure.
    Linear(LinearArgs),
    /// Find fragments bracketed by two stem groups with a gap between them.
    Stems(StemsArgs),
}

/// Inputs and tolerances shared by every search mode.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Path to the query structure (PDB).
    #[arg(short = 'i', long, required = true, value_name = "PATH")]
    pub query: PathBuf,

    /// Fragment database structures (PDB). The file stem of each path is
    /// used as its segment identifier.
    #[arg(short, long, required = true, num_args = 1.., value_name = "PATH")]
    pub database: Vec<PathBuf>,

    /// Directory to write matched fragments into, one PDB per match,
    /// named by provenance key.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the RMSD acceptance tolerance, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub rmsd_tol: Option<f64>,

    /// Override the squared-distance pre-filter tolerance, in square
    /// Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub dist_tol_sq: Option<f64>,

    /// Directory of full-atom source structures (<dir>/<segment>.pdb);
    /// enables the full-atom fine check on every match.
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// With --source-dir, emit the whole source structure per match
    /// instead of just the matched span.
    #[arg(long)]
    pub full_file: bool,

    /// Treat database fragments as all-atom instead of Cα-only.
    #[arg(long)]
    pub all_atom: bool,
}

/// Arguments for the `spot` subcommand.
#[derive(Args, Debug)]
pub struct SpotArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// The three stem residues, as CHAIN:RESNUM[ICODE] (e.g. A:72, A:72B).
    #[arg(short, long = "stem", required = true, num_args = 1.., value_name = "CHAIN:RES")]
    pub stems: Vec<StemSpecifier>,

    /// Maximum number of database residues allowed between consecutive
    /// stems.
    #[arg(long, default_value_t = 10, value_name = "INT")]
    pub max_gap: usize,
}

/// Arguments for the `linear` subcommand.
#[derive(Args, Debug)]
pub struct LinearArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// First residue of the query span, as CHAIN:RESNUM[ICODE].
    #[arg(long, required = true, value_name = "CHAIN:RES")]
    pub start: StemSpecifier,

    /// Last residue of the query span, as CHAIN:RESNUM[ICODE].
    #[arg(long, required = true, value_name = "CHAIN:RES")]
    pub end: StemSpecifier,

    /// Regular expression the matched one-letter sequence must contain.
    #[arg(short = 'r', long, value_name = "REGEX")]
    pub regex: Option<String>,
}

/// Arguments for the `stems` subcommand.
#[derive(Args, Debug)]
pub struct StemsArgs {
    #[command(flatten)]
    pub search: SearchArgs,

    /// The stem residues, as CHAIN:RESNUM[ICODE]. The first half form the
    /// N-terminal group, the second half the C-terminal group.
    #[arg(short, long = "stem", required = true, num_args = 2.., value_name = "CHAIN:RES")]
    pub stems: Vec<StemSpecifier>,

    /// Number of residues expected between the stem groups. Defaults to
    /// the numbering distance between the inner stems.
    #[arg(long, value_name = "INT")]
    pub residues_between: Option<usize>,

    /// Regular expression the matched one-letter sequence must contain.
    #[arg(short = 'r', long, value_name = "REGEX")]
    pub regex: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn spot_arguments_parse() {
        let cli = Cli::parse_from([
            "fragseek", "spot", "-i", "query.pdb", "-d", "a.pdb", "b.pdb", "-s", "A:10", "A:14",
            "A:18", "--max-gap", "5",
        ]);
        let Commands::Spot(args) = cli.command else {
            panic!("expected spot subcommand");
        };
        assert_eq!(args.stems.len(), 3);
        assert_eq!(args.max_gap, 5);
        assert_eq!(args.search.database.len(), 2);
    }

    #[test]
    fn linear_arguments_parse_with_insertion_codes() {
        let cli = Cli::parse_from([
            "fragseek",
            "linear",
            "-i",
            "query.pdb",
            "-d",
            "db.pdb",
            "--start",
            "A:100B",
            "--end",
            "A:110",
        ]);
        let Commands::Linear(args) = cli.command else {
            panic!("expected linear subcommand");
        };
        assert_eq!(args.start.insertion_code, Some('B'));
        assert_eq!(args.end.residue_number, 110);
    }
}
