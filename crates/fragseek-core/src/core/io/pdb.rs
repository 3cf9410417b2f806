use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::{Atom, AtomRole};
use crate::core::models::system::MolecularSystem;
use crate::core::utils::codes;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Header and remark lines preserved verbatim from the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    pub header_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Line is too short for an ATOM/HETATM record (needs coordinate columns 31-54)")]
    LineTooShort,
    #[error("Invalid integer in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
}

/// Minimal fixed-column PDB reader/writer.
///
/// Parses ATOM/HETATM records from the first model only (reading stops at
/// ENDMDL); alternate locations other than ' ' and 'A' are skipped. The
/// writer emits standard 80-column ATOM records with TER cards at chain
/// boundaries.
pub struct PdbFile;

fn field<'a>(line: &'a str, range: std::ops::Range<usize>) -> Option<&'a str> {
    line.get(range)
}

fn parse_int(line: &str, range: std::ops::Range<usize>, line_no: usize) -> Result<isize, PdbError> {
    let raw = field(line, range.clone()).unwrap_or("").trim();
    raw.parse().map_err(|_| PdbError::Parse {
        line: line_no,
        kind: PdbParseErrorKind::InvalidInt {
            columns: format!("{}-{}", range.start + 1, range.end),
            value: raw.to_string(),
        },
    })
}

fn parse_float(line: &str, range: std::ops::Range<usize>, line_no: usize) -> Result<f64, PdbError> {
    let raw = field(line, range.clone()).unwrap_or("").trim();
    raw.parse().map_err(|_| PdbError::Parse {
        line: line_no,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", range.start + 1, range.end),
            value: raw.to_string(),
        },
    })
}

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut system = MolecularSystem::new();
        let mut metadata = PdbMetadata::default();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let record = line.get(0..6).unwrap_or(&line).trim_end();

            match record {
                "ATOM" | "HETATM" => {
                    if line.len() < 54 {
                        return Err(PdbError::Parse {
                            line: line_no,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }

                    let alt_loc = line.as_bytes()[16] as char;
                    if alt_loc != ' ' && alt_loc != 'A' {
                        continue;
                    }

                    let atom_name = field(&line, 12..16).unwrap_or("").trim().to_string();
                    let residue_name = field(&line, 17..20).unwrap_or("").trim().to_string();
                    let chain = line.as_bytes()[21] as char;
                    let residue_number = parse_int(&line, 22..26, line_no)?;
                    let icode = match line.as_bytes()[26] as char {
                        ' ' => None,
                        c => Some(c),
                    };
                    let x = parse_float(&line, 30..38, line_no)?;
                    let y = parse_float(&line, 38..46, line_no)?;
                    let z = parse_float(&line, 46..54, line_no)?;

                    let chain_id = system.add_chain(chain);
                    let residue_id = system
                        .add_residue(chain_id, residue_number, icode, &residue_name)
                        .expect("chain inserted above");

                    let role = if codes::is_backbone_atom(&atom_name) {
                        AtomRole::Backbone
                    } else {
                        AtomRole::Sidechain
                    };
                    let atom = Atom::new(&atom_name, residue_id, Point3::new(x, y, z))
                        .with_role(role);
                    system.add_atom_to_residue(residue_id, atom);
                }
                "ENDMDL" => break,
                "HEADER" | "TITLE" | "REMARK" | "COMPND" => {
                    metadata.header_lines.push(line);
                }
                _ => {}
            }
        }

        Ok((system, metadata))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in &metadata.header_lines {
            writeln!(writer, "{}", line)?;
        }

        let mut serial = 0usize;
        let mut previous_chain: Option<char> = None;

        for &residue_id in system.ordered_residues() {
            let residue = system.residue(residue_id).expect("ordered residue exists");
            let chain = system.chain(residue.chain_id).expect("residue has chain");

            if let Some(prev) = previous_chain {
                if prev != chain.id {
                    writeln!(writer, "TER")?;
                }
            }
            previous_chain = Some(chain.id);

            for &atom_id in residue.atoms() {
                let atom = system.atom(atom_id).expect("residue atom exists");
                serial += 1;

                // Short atom names start one column in, per PDB convention.
                let name_field = if atom.name.len() >= 4 {
                    atom.name.clone()
                } else {
                    format!(" {:<3}", atom.name)
                };
                let element = atom
                    .name
                    .chars()
                    .find(|c| c.is_ascii_alphabetic())
                    .unwrap_or(' ');

                writeln!(
                    writer,
                    "ATOM  {:>5} {:<4} {:>3} {}{:>4}{}   {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}          {:>2}",
                    serial,
                    name_field,
                    residue.name,
                    chain.id,
                    residue.number,
                    residue.insertion_code.unwrap_or(' '),
                    atom.position.x,
                    atom.position.y,
                    atom.position.z,
                    1.0,
                    0.0,
                    element,
                )?;
            }
        }

        writeln!(writer, "TER")?;
        writeln!(writer, "END")?;
        Ok(())
    }
}
