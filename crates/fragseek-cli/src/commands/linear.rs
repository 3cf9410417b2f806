use crate::cli::LinearArgs;
use crate::commands::common;
use crate::config;
use crate::error::Result;
use fragseek::workflows::search;
use tracing::info;

pub fn run(args: LinearArgs) -> Result<()> {
    let search_config = config::resolve_config(&args.search, args.regex.as_deref())?;
    let query_system = common::load_query(&args.search.query)?;
    let database = common::load_database(&args.search.database)?;

    println!(
        "Searching for fragments matching span {} .. {}...",
        args.start, args.end
    );
    info!("Invoking the linear search workflow");
    let report = search::search_linear(
        &query_system,
        &database,
        args.start,
        args.end,
        &search_config,
        &common::reporter(),
    )?;

    common::emit_results(&report, args.search.out_dir.as_deref())
}
