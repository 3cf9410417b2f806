use crate::cli::StemsArgs;
use crate::commands::common;
use crate::config;
use crate::error::Result;
use fragseek::workflows::search;
use tracing::info;

pub fn run(args: StemsArgs) -> Result<()> {
    let search_config = config::resolve_config(&args.search, args.regex.as_deref())?;
    let query_system = common::load_query(&args.search.query)?;
    let database = common::load_database(&args.search.database)?;

    println!(
        "Searching for fragments bracketed by {} stem residues...",
        args.stems.len()
    );
    info!(
        residues_between = args.residues_between,
        "Invoking the variable-gap search workflow"
    );
    let report = search::search_between_stems(
        &query_system,
        &database,
        &args.stems,
        args.residues_between,
        &search_config,
        None,
        &common::reporter(),
    )?;

    common::emit_results(&report, args.search.out_dir.as_deref())
}
