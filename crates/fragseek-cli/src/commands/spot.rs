use crate::cli::SpotArgs;
use crate::commands::common;
use crate::config;
use crate::error::Result;
use fragseek::workflows::search;
use tracing::info;

pub fn run(args: SpotArgs) -> Result<()> {
    let search_config = config::resolve_config(&args.search, None)?;
    let query_system = common::load_query(&args.search.query)?;
    let database = common::load_database(&args.search.database)?;

    println!("Searching for fragments anchored by {} stems...", args.stems.len());
    info!(max_gap = args.max_gap, "Invoking the spot search workflow");
    let report = search::search_spot(
        &query_system,
        &database,
        &args.stems,
        args.max_gap,
        &search_config,
        &common::reporter(),
    )?;

    common::emit_results(&report, args.search.out_dir.as_deref())
}
