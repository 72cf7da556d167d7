use crate::core::utils::identifiers;
use nalgebra::Point3;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TopologyError {
    #[error("Bond references atom index {index}, but the topology only holds {len} atoms")]
    BondOutOfRange { index: usize, len: usize },
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Expected {expected} positions for bond guessing, found {found}")]
    PositionCountMismatch { expected: usize, found: usize },
}

/// Per-atom attributes supplied by a trajectory source when building a [`Topology`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomRecord {
    /// The atom name (e.g., "CA", "OG1", "HN").
    pub name: String,
    /// The residue sequence number from the source file.
    pub residue_id: isize,
    /// The residue name (e.g., "ALA").
    pub residue_name: String,
    /// The segment identifier the atom belongs to.
    pub segment_id: String,
}

impl AtomRecord {
    pub fn new(name: &str, residue_id: isize, residue_name: &str, segment_id: &str) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            residue_name: residue_name.to_string(),
            segment_id: segment_id.to_string(),
        }
    }
}

/// Whole-system atom attribute arrays, indexed by global atom index.
///
/// A topology is created once per run and never mutated afterwards; the detection
/// engine shares it read-only between all workers. Every accessor returns `None` for
/// an index outside the system instead of panicking, so that callers can turn a
/// malformed index map into a proper error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    names: Vec<String>,
    residue_ids: Vec<isize>,
    residue_names: Vec<String>,
    segment_ids: Vec<String>,
    bonds: Vec<Vec<usize>>,
    backbone: Vec<bool>,
}

impl Topology {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.names.len()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn residue_id(&self, index: usize) -> Option<isize> {
        self.residue_ids.get(index).copied()
    }

    pub fn residue_name(&self, index: usize) -> Option<&str> {
        self.residue_names.get(index).map(String::as_str)
    }

    pub fn segment_id(&self, index: usize) -> Option<&str> {
        self.segment_ids.get(index).map(String::as_str)
    }

    /// Global indices of the atoms bonded to `index`, in ascending order.
    pub fn bonded(&self, index: usize) -> Option<&[usize]> {
        self.bonds.get(index).map(Vec::as_slice)
    }

    pub fn is_backbone(&self, index: usize) -> Option<bool> {
        self.backbone.get(index).copied()
    }

    pub fn is_hydrogen(&self, index: usize) -> Option<bool> {
        self.name(index).map(identifiers::is_hydrogen_name)
    }

    /// Hydrogen atoms covalently bonded to `index`.
    pub fn bonded_hydrogens(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.bonded(index)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|&neighbor| self.is_hydrogen(neighbor).unwrap_or(false))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn residue_ids(&self) -> &[isize] {
        &self.residue_ids
    }

    pub fn residue_names(&self) -> &[String] {
        &self.residue_names
    }

    pub fn segment_ids(&self) -> &[String] {
        &self.segment_ids
    }

    /// Number of unique bonds in the topology.
    pub fn bond_count(&self) -> usize {
        self.bonds.iter().map(Vec::len).sum::<usize>() / 2
    }
}

/// Incrementally assembles a [`Topology`] from atom records and bonds.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    atoms: Vec<AtomRecord>,
    bonds: BTreeSet<(usize, usize)>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an atom and returns its global index.
    pub fn add_atom(&mut self, record: AtomRecord) -> usize {
        self.atoms.push(record);
        self.atoms.len() - 1
    }

    /// Registers an undirected bond. Duplicates are merged when the topology is built.
    pub fn add_bond(&mut self, a: usize, b: usize) -> &mut Self {
        self.bonds.insert((a.min(b), a.max(b)));
        self
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Bonds every unbonded hydrogen to the closest heavy atom of its own residue.
    ///
    /// A hydrogen is only attached when that heavy atom lies within `max_distance`.
    /// Hydrogens that already carry a bond are left untouched.
    ///
    /// # Return
    ///
    /// The number of bonds added.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::PositionCountMismatch`] if `positions` does not hold
    /// exactly one position per atom.
    pub fn guess_hydrogen_bonds(
        &mut self,
        positions: &[Point3<f64>],
        max_distance: f64,
    ) -> Result<usize, TopologyError> {
        if positions.len() != self.atoms.len() {
            return Err(TopologyError::PositionCountMismatch {
                expected: self.atoms.len(),
                found: positions.len(),
            });
        }

        let bonded: BTreeSet<usize> = self.bonds.iter().flat_map(|&(a, b)| [a, b]).collect();
        let mut guessed = Vec::new();

        for (h_idx, hydrogen) in self.atoms.iter().enumerate() {
            if !identifiers::is_hydrogen_name(&hydrogen.name) || bonded.contains(&h_idx) {
                continue;
            }
            let closest = self
                .atoms
                .iter()
                .enumerate()
                .filter(|(idx, atom)| {
                    *idx != h_idx
                        && !identifiers::is_hydrogen_name(&atom.name)
                        && atom.residue_id == hydrogen.residue_id
                        && atom.segment_id == hydrogen.segment_id
                })
                .map(|(idx, _)| (idx, (positions[idx] - positions[h_idx]).norm()))
                .filter(|(_, dist)| *dist <= max_distance)
                .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2));

            if let Some((heavy_idx, _)) = closest {
                guessed.push((heavy_idx, h_idx));
            }
        }

        let added = guessed.len();
        for (heavy_idx, h_idx) in guessed {
            self.add_bond(heavy_idx, h_idx);
        }
        Ok(added)
    }

    pub fn build(self) -> Result<Topology, TopologyError> {
        let len = self.atoms.len();
        let mut bonds = vec![Vec::new(); len];
        for &(a, b) in &self.bonds {
            if a == b {
                return Err(TopologyError::SelfBond(a));
            }
            if b >= len {
                return Err(TopologyError::BondOutOfRange { index: b, len });
            }
            bonds[a].push(b);
            bonds[b].push(a);
        }
        for neighbors in &mut bonds {
            neighbors.sort_unstable();
        }

        let mut topology = Topology {
            names: Vec::with_capacity(len),
            residue_ids: Vec::with_capacity(len),
            residue_names: Vec::with_capacity(len),
            segment_ids: Vec::with_capacity(len),
            bonds,
            backbone: Vec::with_capacity(len),
        };
        for atom in self.atoms {
            topology.backbone.push(
                identifiers::is_protein_residue(&atom.residue_name)
                    && identifiers::is_backbone_atom(&atom.name),
            );
            topology.names.push(atom.name);
            topology.residue_ids.push(atom.residue_id);
            topology.residue_names.push(atom.residue_name);
            topology.segment_ids.push(atom.segment_id);
        }
        Ok(topology)
    }
}
