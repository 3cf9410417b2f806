use crate::error::{CliError, Result};
use fragseek::core::io::pdb::{PdbFile, PdbMetadata};
use fragseek::core::io::traits::MolecularFile;
use fragseek::core::models::system::MolecularSystem;
use fragseek::engine::database::FragmentDatabase;
use fragseek::engine::progress::{Progress, ProgressReporter};
use fragseek::engine::results::SearchReport;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn load_query(path: &Path) -> Result<MolecularSystem> {
    info!("Loading query structure from {:?}", path);
    let (system, _) = PdbFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(system)
}

/// Loads every database structure and flattens them into one record
/// store. The file stem of each path becomes its segment identifier.
pub fn load_database(paths: &[PathBuf]) -> Result<FragmentDatabase> {
    let mut systems = Vec::with_capacity(paths.len());
    for path in paths {
        let segment = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                CliError::Argument(format!("Database path has no file name: {}", path.display()))
            })?;
        let (system, _) = PdbFile::read_from_path(path).map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })?;
        systems.push((segment, system));
    }
    let database =
        FragmentDatabase::from_systems(systems.iter().map(|(id, sys)| (id.as_str(), sys)))?;
    info!(
        structures = paths.len(),
        residues = database.len(),
        "Fragment database loaded"
    );
    Ok(database)
}

pub fn reporter<'a>() -> ProgressReporter<'a> {
    ProgressReporter::with_callback(Box::new(|event| match event {
        Progress::ScanStart { total_steps } => info!(total_steps, "Scan started"),
        Progress::ScanFinish => info!("Scan finished"),
        Progress::Message(message) => info!("{message}"),
        Progress::ScanIncrement => {}
    }))
}

/// Prints the match summary and, when an output directory is given,
/// writes each matched fragment as `<key>.pdb`.
pub fn emit_results(report: &SearchReport, out_dir: Option<&Path>) -> Result<()> {
    for m in report.matches() {
        let backbone = m
            .backbone_rmsd
            .map_or_else(|| " ".repeat(9), |bb| format!("{bb:9.3}"));
        println!(
            "({:4} and chain {} and resi {:3}-{:3}) {:8.3}{}  {}",
            m.segment_id,
            m.start.chain_id,
            m.start.residue_number,
            m.end.residue_number,
            m.rmsd,
            backbone,
            m.sequence
        );
    }

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)?;
        let metadata = PdbMetadata::default();
        for m in report.matches() {
            let path = dir.join(format!("{}.pdb", m.key));
            PdbFile::write_to_path(&m.to_system(), &metadata, &path).map_err(|e| {
                CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                }
            })?;
        }
        info!(matches = report.num_matches(), dir = %dir.display(), "Wrote matched fragments");
    }

    println!("Number of successful fragments: {:10}", report.num_matches());
    Ok(())
}
