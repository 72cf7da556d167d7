use super::memory::InMemoryTrajectory;
use super::traits::{TrajectoryError, TrajectoryFile};
use crate::core::models::topology::{AtomRecord, TopologyBuilder, TopologyError};
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

/// Largest hydrogen-to-heavy-atom distance (Å) accepted when guessing missing bonds.
pub const DEFAULT_HYDROGEN_ATTACH_DISTANCE: f64 = 1.2;

const MIN_ATOM_LINE_LEN: usize = 54;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),
    #[error("Invalid trajectory: {0}")]
    Trajectory(#[from] TrajectoryError),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
    #[error("Invalid CONECT serial '{0}'")]
    InvalidConectSerial(String),
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Reader for multi-model PDB trajectories.
///
/// Each `MODEL`/`ENDMDL` block is one frame; a file without `MODEL` records is a single
/// frame. The first model defines the topology. The segment identifier is read from
/// columns 73-76 and falls back to the chain identifier when blank. Bonds come from
/// `CONECT` records and, optionally, from attaching hydrogens to their nearest heavy atom.
#[derive(Debug, Clone, Default)]
pub struct PdbFile {
    hydrogen_attach_distance: Option<f64>,
}

impl PdbFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables bond guessing for hydrogens left without a `CONECT` partner.
    pub fn with_guessed_hydrogen_bonds(mut self, max_distance: f64) -> Self {
        self.hydrogen_attach_distance = Some(max_distance);
        self
    }
}

impl TrajectoryFile for PdbFile {
    type Output = InMemoryTrajectory;
    type Error = PdbError;

    fn read_from(&self, reader: &mut impl BufRead) -> Result<Self::Output, Self::Error> {
        let mut builder = TopologyBuilder::new();
        let mut serial_to_index: HashMap<usize, usize> = HashMap::new();
        let mut conect: Vec<(usize, usize)> = Vec::new();

        let mut models: Vec<Vec<Point3<f64>>> = Vec::new();
        let mut current: Vec<Point3<f64>> = Vec::new();
        let mut topology_done = false;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" | "HETATM" => {
                    if line.len() < MIN_ATOM_LINE_LEN {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort,
                        });
                    }
                    let alt_loc = slice_and_trim(&line, 16, 17);
                    if !alt_loc.is_empty() && alt_loc != "A" {
                        continue;
                    }

                    let x = parse_coordinate(&line, line_num, 30, 38)?;
                    let y = parse_coordinate(&line, line_num, 38, 46)?;
                    let z = parse_coordinate(&line, line_num, 46, 54)?;
                    current.push(Point3::new(x, y, z));

                    if topology_done {
                        continue;
                    }

                    let name = slice_and_trim(&line, 12, 16);
                    if name.is_empty() {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::MissingRequiredField {
                                columns: "13-16".into(),
                            },
                        });
                    }
                    let res_name = slice_and_trim(&line, 17, 21);
                    let chain_id = slice_and_trim(&line, 21, 22);
                    let res_id_str = slice_and_trim(&line, 22, 26);
                    let res_id: isize = res_id_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "23-26".into(),
                            value: res_id_str.into(),
                        },
                    })?;
                    let seg_id = match slice_and_trim(&line, 72, 76) {
                        "" => chain_id,
                        seg => seg,
                    };

                    let index =
                        builder.add_atom(AtomRecord::new(name, res_id, res_name, seg_id));
                    if let Ok(serial) = slice_and_trim(&line, 6, 11).parse::<usize>() {
                        serial_to_index.insert(serial, index);
                    }
                }
                "MODEL" => {
                    if !current.is_empty() {
                        return Err(PdbError::Inconsistency(format!(
                            "MODEL on line {line_num} opened before the previous model was closed"
                        )));
                    }
                }
                "ENDMDL" => {
                    topology_done = true;
                    models.push(std::mem::take(&mut current));
                }
                "CONECT" => {
                    let serials = line
                        .split_whitespace()
                        .skip(1)
                        .map(|s| {
                            s.parse::<usize>().map_err(|_| PdbError::Parse {
                                line: line_num,
                                kind: PdbParseErrorKind::InvalidConectSerial(s.into()),
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    if let Some((&origin, partners)) = serials.split_first() {
                        conect.extend(partners.iter().map(|&partner| (origin, partner)));
                    }
                }
                "END" => break,
                _ => {}
            }
        }
        if !current.is_empty() {
            models.push(current);
        }
        if builder.atom_count() == 0 {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }

        for (a_serial, b_serial) in conect {
            let resolve = |serial: usize| {
                serial_to_index.get(&serial).copied().ok_or_else(|| {
                    PdbError::Inconsistency(format!("CONECT references unknown atom serial {serial}"))
                })
            };
            let (a, b) = (resolve(a_serial)?, resolve(b_serial)?);
            if a != b {
                builder.add_bond(a, b);
            }
        }
        if let (Some(max_distance), Some(first_model)) =
            (self.hydrogen_attach_distance, models.first())
        {
            let added = builder.guess_hydrogen_bonds(first_model, max_distance)?;
            debug!("Attached {} hydrogens to their nearest heavy atom.", added);
        }

        let topology = builder.build()?;
        debug!(
            "Read PDB trajectory: {} atoms, {} bonds, {} models.",
            topology.len(),
            topology.bond_count(),
            models.len()
        );
        Ok(InMemoryTrajectory::new(topology, models)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::traits::TrajectoryProvider;
    use std::io::Write;

    fn atom_line(serial: usize, name: &str, resname: &str, resid: isize, pos: [f64; 3], segid: &str) -> String {
        format!(
            "ATOM  {:>5} {:<4}{:1}{:<4}{:1}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}      {:<4}",
            serial, name, "", resname, "A", resid, pos[0], pos[1], pos[2], 1.0, 0.0, segid
        )
    }

    fn two_model_pdb() -> String {
        let mut lines = Vec::new();
        for (model, shift) in [(1, 0.0), (2, 1.0)] {
            lines.push(format!("MODEL     {model:>4}"));
            lines.push(atom_line(1, "N", "SER", 1, [shift, 0.0, 0.0], "PROA"));
            lines.push(atom_line(2, "HN", "SER", 1, [shift + 1.0, 0.0, 0.0], "PROA"));
            lines.push(atom_line(3, "O", "GLY", 7, [shift + 3.0, 0.0, 0.0], ""));
            lines.push("ENDMDL".to_string());
        }
        lines.push("CONECT    1    2".to_string());
        lines.push("END".to_string());
        lines.join("\n")
    }

    #[test]
    fn reads_models_topology_and_bonds() {
        let pdb = two_model_pdb();
        let trajectory = PdbFile::new().read_from(&mut pdb.as_bytes()).unwrap();
        let topology = trajectory.topology();

        assert_eq!(trajectory.frame_count(), 2);
        assert_eq!(topology.len(), 3);
        assert_eq!(topology.name(1), Some("HN"));
        assert_eq!(topology.residue_id(2), Some(7));
        assert_eq!(topology.residue_name(2), Some("GLY"));
        assert_eq!(topology.segment_id(0), Some("PROA"));
        assert_eq!(topology.segment_id(2), Some("A"));
        assert_eq!(topology.bonded(0), Some(&[1][..]));
        assert_eq!(trajectory.positions(1).unwrap()[2].x, 4.0);
    }

    #[test]
    fn single_model_without_model_records() {
        let pdb = [
            atom_line(1, "CA", "ALA", 1, [0.0, 0.0, 0.0], "P1"),
            atom_line(2, "CB", "ALA", 1, [1.5, 0.0, 0.0], "P1"),
        ]
        .join("\n");
        let trajectory = PdbFile::new().read_from(&mut pdb.as_bytes()).unwrap();
        assert_eq!(trajectory.frame_count(), 1);
        assert_eq!(trajectory.topology().bond_count(), 0);
    }

    #[test]
    fn alternate_locations_beyond_the_first_are_skipped() {
        let mut alt_b = atom_line(2, "CB", "ALA", 1, [9.0, 0.0, 0.0], "P1");
        alt_b.replace_range(16..17, "B");
        let mut alt_a = atom_line(2, "CB", "ALA", 1, [1.5, 0.0, 0.0], "P1");
        alt_a.replace_range(16..17, "A");
        let pdb = [atom_line(1, "CA", "ALA", 1, [0.0; 3], "P1"), alt_a, alt_b].join("\n");

        let trajectory = PdbFile::new().read_from(&mut pdb.as_bytes()).unwrap();
        assert_eq!(trajectory.topology().len(), 2);
        assert_eq!(trajectory.positions(0).unwrap()[1].x, 1.5);
    }

    #[test]
    fn guesses_missing_hydrogen_bonds_when_enabled() {
        let pdb = [
            atom_line(1, "OG", "SER", 1, [0.0; 3], "P1"),
            atom_line(2, "HG1", "SER", 1, [0.96, 0.0, 0.0], "P1"),
        ]
        .join("\n");
        let plain = PdbFile::new().read_from(&mut pdb.as_bytes()).unwrap();
        assert_eq!(plain.topology().bond_count(), 0);

        let guessed = PdbFile::new()
            .with_guessed_hydrogen_bonds(DEFAULT_HYDROGEN_ATTACH_DISTANCE)
            .read_from(&mut pdb.as_bytes())
            .unwrap();
        assert_eq!(guessed.topology().bonded_hydrogens(0).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn models_with_different_atom_counts_are_rejected() {
        let pdb = [
            "MODEL        1".to_string(),
            atom_line(1, "CA", "ALA", 1, [0.0; 3], "P1"),
            atom_line(2, "CB", "ALA", 1, [1.5, 0.0, 0.0], "P1"),
            "ENDMDL".to_string(),
            "MODEL        2".to_string(),
            atom_line(1, "CA", "ALA", 1, [0.0; 3], "P1"),
            "ENDMDL".to_string(),
        ]
        .join("\n");
        let result = PdbFile::new().read_from(&mut pdb.as_bytes());
        assert!(matches!(
            result,
            Err(PdbError::Trajectory(TrajectoryError::AtomCountMismatch {
                frame: 1,
                expected: 2,
                found: 1
            }))
        ));
    }

    #[test]
    fn malformed_records_report_line_numbers() {
        let mut bad = atom_line(1, "CA", "ALA", 1, [0.0; 3], "P1");
        bad.replace_range(30..38, "  abc.de");
        let pdb = format!("REMARK test\n{bad}");
        let result = PdbFile::new().read_from(&mut pdb.as_bytes());
        assert!(matches!(
            result,
            Err(PdbError::Parse {
                line: 2,
                kind: PdbParseErrorKind::InvalidFloat { .. }
            })
        ));

        let short = "ATOM      1  CA  ALA A   1";
        assert!(matches!(
            PdbFile::new().read_from(&mut short.as_bytes()),
            Err(PdbError::Parse {
                line: 1,
                kind: PdbParseErrorKind::LineTooShort
            })
        ));
    }

    #[test]
    fn conect_to_unknown_serial_is_an_error() {
        let pdb = format!(
            "{}\nCONECT    1   42",
            atom_line(1, "CA", "ALA", 1, [0.0; 3], "P1")
        );
        assert!(matches!(
            PdbFile::new().read_from(&mut pdb.as_bytes()),
            Err(PdbError::Inconsistency(_))
        ));
    }

    #[test]
    fn empty_input_is_missing_atoms() {
        assert!(matches!(
            PdbFile::new().read_from(&mut "REMARK nothing\nEND\n".as_bytes()),
            Err(PdbError::MissingRecord(_))
        ));
    }

    #[test]
    fn reads_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", two_model_pdb()).unwrap();
        let trajectory = PdbFile::new().read_from_path(file.path()).unwrap();
        assert_eq!(trajectory.frame_count(), 2);
    }
}
