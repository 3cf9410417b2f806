use super::error::EngineError;
use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use itertools::Itertools;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Names one anchor residue in the query structure: chain, residue number,
/// and optional insertion code. Parsed from strings like `A:72` or `A:72B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StemSpecifier {
    pub chain_id: char,
    pub residue_number: isize,
    pub insertion_code: Option<char>,
}

#[derive(Debug, Error, PartialEq)]
#[error("Invalid stem specifier '{0}': expected '<chain>:<residue>[icode]', e.g. 'A:72' or 'A:72B'")]
pub struct ParseStemError(String);

impl FromStr for StemSpecifier {
    type Err = ParseStemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseStemError(s.to_string());
        let (chain, rest) = s.split_once(':').ok_or_else(err)?;
        let mut chain_chars = chain.chars();
        let chain_id = chain_chars.next().ok_or_else(err)?;
        if chain_chars.next().is_some() {
            return Err(err());
        }

        let rest = rest.trim();
        let (digits, icode) = match rest.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => (&rest[..rest.len() - 1], Some(c)),
            _ => (rest, None),
        };
        let residue_number = digits.parse().map_err(|_| err())?;
        Ok(Self {
            chain_id,
            residue_number,
            insertion_code: icode,
        })
    }
}

impl fmt::Display for StemSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.residue_number)?;
        if let Some(icode) = self.insertion_code {
            write!(f, "{}", icode)?;
        }
        Ok(())
    }
}

impl StemSpecifier {
    /// Resolves this specifier to a residue in the query structure.
    pub fn resolve(&self, system: &MolecularSystem) -> Result<ResidueId, EngineError> {
        system
            .find_residue(self.chain_id, self.residue_number, self.insertion_code)
            .ok_or(EngineError::StemNotFound { spec: *self })
    }
}

fn atom_position(
    system: &MolecularSystem,
    residue_id: ResidueId,
    spec: StemSpecifier,
    name: &'static str,
) -> Result<Point3<f64>, EngineError> {
    let atom_id = system
        .find_atom_in_residue(residue_id, name)
        .ok_or(EngineError::MissingAtom { spec, atom: name })?;
    Ok(system.atom(atom_id).expect("atom id from residue").position)
}

fn backbone_triplet(
    system: &MolecularSystem,
    spec: StemSpecifier,
) -> Result<[Point3<f64>; 3], EngineError> {
    let residue_id = spec.resolve(system)?;
    Ok([
        atom_position(system, residue_id, spec, "N")?,
        atom_position(system, residue_id, spec, "CA")?,
        atom_position(system, residue_id, spec, "C")?,
    ])
}

fn ca_position(
    system: &MolecularSystem,
    spec: StemSpecifier,
) -> Result<Point3<f64>, EngineError> {
    let residue_id = spec.resolve(system)?;
    atom_position(system, residue_id, spec, "CA")
}

/// The spot-search query: three fixed stem residues.
///
/// Captures the stem Cα anchors, the pairwise squared distances reused as
/// the pruning filter, and the nine stem backbone atoms used by the
/// full-atom fine check.
#[derive(Debug, Clone)]
pub struct SpotQuery {
    pub stem_ca: [Point3<f64>; 3],
    /// Squared Cα distances for stem pairs (0,1), (0,2), (1,2).
    pub stem_distance_sq: [f64; 3],
    /// N/CA/C of each stem, in stem order.
    pub stem_backbone: Vec<Point3<f64>>,
}

impl SpotQuery {
    pub fn build(
        system: &MolecularSystem,
        stems: &[StemSpecifier],
    ) -> Result<Self, EngineError> {
        let [first, second, third]: [StemSpecifier; 3] =
            stems
                .try_into()
                .map_err(|_| EngineError::StemCount {
                    expected: "exactly 3",
                    actual: stems.len(),
                })?;

        let mut stem_backbone = Vec::with_capacity(9);
        for spec in [first, second, third] {
            stem_backbone.extend(backbone_triplet(system, spec)?);
        }

        let stem_ca = [
            ca_position(system, first)?,
            ca_position(system, second)?,
            ca_position(system, third)?,
        ];
        let stem_distance_sq = [
            (stem_ca[0] - stem_ca[1]).norm_squared(),
            (stem_ca[0] - stem_ca[2]).norm_squared(),
            (stem_ca[1] - stem_ca[2]).norm_squared(),
        ];
        debug!(?stem_distance_sq, "Built spot query");

        Ok(Self {
            stem_ca,
            stem_distance_sq,
            stem_backbone,
        })
    }
}

/// The linear-search query: a fixed-width Cα span between two named
/// endpoints of the query structure.
#[derive(Debug, Clone)]
pub struct SpanQuery {
    /// Cα trace from start to end, inclusive.
    pub ca_trace: Vec<Point3<f64>>,
}

impl SpanQuery {
    pub fn build(
        system: &MolecularSystem,
        start: StemSpecifier,
        end: StemSpecifier,
    ) -> Result<Self, EngineError> {
        let start_id = start.resolve(system)?;
        let end_id = end.resolve(system)?;
        let start_index = system
            .residue_position_index(start_id)
            .expect("resolved residue is ordered");
        let end_index = system
            .residue_position_index(end_id)
            .expect("resolved residue is ordered");
        if end_index < start_index {
            return Err(EngineError::InvalidSpan { start, end });
        }

        let mut ca_trace = Vec::with_capacity(end_index - start_index + 1);
        for &residue_id in &system.ordered_residues()[start_index..=end_index] {
            let residue = system.residue(residue_id).expect("ordered residue exists");
            let chain = system.chain(residue.chain_id).expect("residue has chain");
            let spec = StemSpecifier {
                chain_id: chain.id,
                residue_number: residue.number,
                insertion_code: residue.insertion_code,
            };
            ca_trace.push(atom_position(system, residue_id, spec, "CA")?);
        }
        debug!(span = ca_trace.len(), "Built linear query");

        Ok(Self { ca_trace })
    }

    /// Number of index steps between the endpoints.
    pub fn separation(&self) -> usize {
        self.ca_trace.len() - 1
    }
}

/// The variable-gap query: an N-terminal and a C-terminal stem group with
/// an explicit or inferred number of residues expected between them.
#[derive(Debug, Clone)]
pub struct StemGroupQuery {
    pub stem1_ca: Vec<Point3<f64>>,
    pub stem2_ca: Vec<Point3<f64>>,
    /// Squared cross-group Cα distances, stem1-major order.
    pub stem_distance_sq: Vec<f64>,
    /// N/CA/C of the first and last stem residues.
    pub terminal_backbone: Vec<Point3<f64>>,
    /// Number of residues expected between the groups.
    pub gap: usize,
}

impl StemGroupQuery {
    pub fn build(
        system: &MolecularSystem,
        stems: &[StemSpecifier],
        residues_between: Option<usize>,
    ) -> Result<Self, EngineError> {
        if stems.len() < 2 || stems.len() % 2 != 0 {
            return Err(EngineError::StemCount {
                expected: "an even count of at least 2",
                actual: stems.len(),
            });
        }
        let group_size = stems.len() / 2;
        if group_size < 2 {
            warn!(
                group_size,
                "Stem groups of a single residue make the alignment poorly constrained"
            );
        }

        let (group1, group2) = stems.split_at(group_size);
        let stem1_ca = group1
            .iter()
            .map(|&spec| ca_position(system, spec))
            .collect::<Result<Vec<_>, _>>()?;
        let stem2_ca = group2
            .iter()
            .map(|&spec| ca_position(system, spec))
            .collect::<Result<Vec<_>, _>>()?;

        let mut terminal_backbone = Vec::with_capacity(6);
        terminal_backbone.extend(backbone_triplet(system, stems[0])?);
        terminal_backbone.extend(backbone_triplet(system, stems[stems.len() - 1])?);

        let gap = match residues_between {
            Some(gap) => gap,
            None => {
                let inner1 = group1[group_size - 1];
                let inner2 = group2[0];
                let inferred = inner2.residue_number - inner1.residue_number - 1;
                usize::try_from(inferred).map_err(|_| EngineError::InvalidSpan {
                    start: inner1,
                    end: inner2,
                })?
            }
        };
        debug!(gap, group_size, "Built variable-gap query");

        let stem_distance_sq = stem1_ca
            .iter()
            .cartesian_product(stem2_ca.iter())
            .map(|(c, n)| (c - n).norm_squared())
            .collect();

        Ok(Self {
            stem1_ca,
            stem2_ca,
            stem_distance_sq,
            terminal_backbone,
            gap,
        })
    }

    /// Total window width a database candidate must have.
    pub fn window_len(&self) -> usize {
        self.stem1_ca.len() + self.gap + self.stem2_ca.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    fn spec(chain: char, number: isize) -> StemSpecifier {
        StemSpecifier {
            chain_id: chain,
            residue_number: number,
            insertion_code: None,
        }
    }

    /// A chain of `count` glycines with N/CA/C laid out along the x axis.
    fn line_system(count: isize) -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let chain_id = system.add_chain('A');
        for i in 0..count {
            let residue_id = system
                .add_residue(chain_id, i + 1, None, "GLY")
                .unwrap();
            let x = 3.8 * i as f64;
            for (name, offset) in [("N", -0.5), ("CA", 0.0), ("C", 0.5)] {
                system.add_atom_to_residue(
                    residue_id,
                    Atom::new(name, residue_id, Point3::new(x + offset, 0.0, 0.0)),
                );
            }
        }
        system
    }

    #[test]
    fn stem_specifier_parses_plain_and_icode_forms() {
        assert_eq!("A:72".parse::<StemSpecifier>().unwrap(), spec('A', 72));
        assert_eq!(
            "B:100C".parse::<StemSpecifier>().unwrap(),
            StemSpecifier {
                chain_id: 'B',
                residue_number: 100,
                insertion_code: Some('C'),
            }
        );
        assert_eq!("A:-5".parse::<StemSpecifier>().unwrap(), spec('A', -5));
    }

    #[test]
    fn stem_specifier_rejects_malformed_input() {
        for bad in ["", "A", "A:", "AB:5", ":5", "A:x"] {
            assert!(bad.parse::<StemSpecifier>().is_err(), "accepted '{bad}'");
        }
    }

    #[test]
    fn stem_specifier_display_round_trips() {
        for text in ["A:72", "B:100C"] {
            let parsed: StemSpecifier = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn spot_query_computes_pairwise_distances() {
        let system = line_system(9);
        let stems = [spec('A', 2), spec('A', 5), spec('A', 8)];
        let query = SpotQuery::build(&system, &stems).unwrap();
        let step = 3.8f64;
        assert!((query.stem_distance_sq[0] - (3.0 * step).powi(2)).abs() < 1e-9);
        assert!((query.stem_distance_sq[1] - (6.0 * step).powi(2)).abs() < 1e-9);
        assert!((query.stem_distance_sq[2] - (3.0 * step).powi(2)).abs() < 1e-9);
        assert_eq!(query.stem_backbone.len(), 9);
    }

    #[test]
    fn spot_query_requires_exactly_three_stems() {
        let system = line_system(9);
        let err = SpotQuery::build(&system, &[spec('A', 1), spec('A', 2)]).unwrap_err();
        assert!(matches!(err, EngineError::StemCount { actual: 2, .. }));
    }

    #[test]
    fn missing_stem_residue_is_reported() {
        let system = line_system(5);
        let stems = [spec('A', 1), spec('A', 3), spec('A', 42)];
        let err = SpotQuery::build(&system, &stems).unwrap_err();
        assert!(matches!(err, EngineError::StemNotFound { .. }));
    }

    #[test]
    fn span_query_collects_inclusive_trace() {
        let system = line_system(10);
        let query = SpanQuery::build(&system, spec('A', 3), spec('A', 7)).unwrap();
        assert_eq!(query.ca_trace.len(), 5);
        assert_eq!(query.separation(), 4);
    }

    #[test]
    fn span_query_rejects_reversed_endpoints() {
        let system = line_system(10);
        let err = SpanQuery::build(&system, spec('A', 7), spec('A', 3)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSpan { .. }));
    }

    #[test]
    fn stem_group_query_infers_gap_from_numbering() {
        let system = line_system(12);
        let stems = [spec('A', 1), spec('A', 2), spec('A', 8), spec('A', 9)];
        let query = StemGroupQuery::build(&system, &stems, None).unwrap();
        assert_eq!(query.gap, 5);
        assert_eq!(query.window_len(), 9);
        assert_eq!(query.stem_distance_sq.len(), 4);
        assert_eq!(query.terminal_backbone.len(), 6);
    }

    #[test]
    fn stem_group_query_accepts_explicit_gap() {
        let system = line_system(12);
        let stems = [spec('A', 1), spec('A', 2), spec('A', 8), spec('A', 9)];
        let query = StemGroupQuery::build(&system, &stems, Some(3)).unwrap();
        assert_eq!(query.gap, 3);
        assert_eq!(query.window_len(), 7);
    }

    #[test]
    fn stem_group_query_rejects_odd_counts() {
        let system = line_system(12);
        let stems = [spec('A', 1), spec('A', 2), spec('A', 8)];
        let err = StemGroupQuery::build(&system, &stems, None).unwrap_err();
        assert!(matches!(err, EngineError::StemCount { actual: 3, .. }));
    }
}
