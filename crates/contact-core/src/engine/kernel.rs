use super::config::KernelParams;
use super::error::KernelError;
use crate::core::models::atom_contact::{AtomContact, HydrogenBond};
use crate::core::models::frame::{FrameData, SelectionFrame};
use crate::core::models::topology::Topology;
use crate::core::utils::geometry::{DistanceMatrix, angle_at, distance_weight};
use crate::core::utils::identifiers;
use std::collections::HashMap;
use tracing::trace;

/// Residue-id separation below which same-segment pairs are dropped in self-interaction mode.
pub const MIN_SELF_RESIDUE_SEPARATION: isize = 5;

/// One selection of a frame together with a lazily built global-to-local lookup.
struct Side<'f> {
    frame: &'f SelectionFrame,
    lookup: Option<HashMap<usize, usize>>,
}

impl<'f> Side<'f> {
    fn new(frame: &'f SelectionFrame) -> Self {
        Self {
            frame,
            lookup: None,
        }
    }

    fn local_index(&mut self, global: usize) -> Option<usize> {
        let frame = self.frame;
        self.lookup
            .get_or_insert_with(|| frame.global_to_local())
            .get(&global)
            .copied()
    }
}

/// Finds all heavy-atom contacts of one frame.
///
/// Atom `A` of every emitted contact comes from the first selection and atom `B` from
/// the second. Pairs are produced in row-major order of the distance matrix.
///
/// # Errors
///
/// Returns [`KernelError`] if the frame payload is inconsistent, an index is not part of
/// the topology, or a hydrogen bonded to a candidate atom has no position in the
/// selection of that atom.
pub fn detect_frame_contacts(
    frame_id: usize,
    frame: &FrameData,
    topology: &Topology,
    params: &KernelParams,
) -> Result<Vec<AtomContact>, KernelError> {
    for side in [&frame.first, &frame.second] {
        if !side.is_consistent() {
            return Err(KernelError::MalformedFrame {
                frame: frame_id,
                positions: side.positions.len(),
                indices: side.indices.len(),
            });
        }
    }
    if frame.first.is_empty() || frame.second.is_empty() {
        return Ok(Vec::new());
    }

    let matrix = DistanceMatrix::compute(&frame.first.positions, &frame.second.positions);
    let mut first = Side::new(&frame.first);
    let mut second = Side::new(&frame.second);
    let mut contacts = Vec::new();

    for (i, j, distance) in matrix.pairs_within(params.cutoff) {
        let a = frame.first.indices[i];
        let b = frame.second.indices[j];
        let name_a = atom_name(topology, frame_id, a)?;
        let name_b = atom_name(topology, frame_id, b)?;

        if a == b || identifiers::is_hydrogen_name(name_a) || identifiers::is_hydrogen_name(name_b)
        {
            continue;
        }
        if params.self_interaction && (a > b || is_near_in_sequence(topology, a, b)) {
            continue;
        }

        let mut hydrogen_bonds = Vec::new();
        if identifiers::is_hydrogen_bond_capable(name_a)
            && identifiers::is_hydrogen_bond_capable(name_b)
        {
            for hydrogen in topology.bonded_hydrogens(a) {
                let h = first
                    .local_index(hydrogen)
                    .ok_or(KernelError::UnresolvedHydrogen {
                        frame: frame_id,
                        hydrogen,
                        heavy: a,
                    })?;
                let h_distance = matrix.get(h, j);
                let angle = angle_at(
                    &frame.first.positions[h],
                    &frame.second.positions[j],
                    &frame.first.positions[i],
                );
                if accepts(params, h_distance, angle) {
                    hydrogen_bonds.push(HydrogenBond::new(
                        a,
                        b,
                        hydrogen,
                        h_distance,
                        angle,
                        params.hbond_cutoff,
                        params.hbond_angle,
                    ));
                }
            }
            for hydrogen in topology.bonded_hydrogens(b) {
                let h = second
                    .local_index(hydrogen)
                    .ok_or(KernelError::UnresolvedHydrogen {
                        frame: frame_id,
                        hydrogen,
                        heavy: b,
                    })?;
                let h_distance = matrix.get(i, h);
                let angle = angle_at(
                    &frame.second.positions[h],
                    &frame.first.positions[i],
                    &frame.second.positions[j],
                );
                if accepts(params, h_distance, angle) {
                    hydrogen_bonds.push(HydrogenBond::new(
                        b,
                        a,
                        hydrogen,
                        h_distance,
                        angle,
                        params.hbond_cutoff,
                        params.hbond_angle,
                    ));
                }
            }
        }

        contacts.push(AtomContact::new(
            frame_id,
            distance,
            distance_weight(distance),
            a,
            b,
            hydrogen_bonds,
        ));
    }

    trace!(frame = frame_id, contacts = contacts.len(), "Frame processed.");
    Ok(contacts)
}

fn atom_name(topology: &Topology, frame: usize, index: usize) -> Result<&str, KernelError> {
    topology.name(index).ok_or(KernelError::AtomOutOfRange {
        frame,
        index,
        len: topology.len(),
    })
}

fn is_near_in_sequence(topology: &Topology, a: usize, b: usize) -> bool {
    match (
        topology.segment_id(a),
        topology.segment_id(b),
        topology.residue_id(a),
        topology.residue_id(b),
    ) {
        (Some(seg_a), Some(seg_b), Some(res_a), Some(res_b)) => {
            seg_a == seg_b && (res_a - res_b).abs() < MIN_SELF_RESIDUE_SEPARATION
        }
        _ => false,
    }
}

#[inline]
fn accepts(params: &KernelParams, distance: f64, angle: f64) -> bool {
    distance <= params.hbond_cutoff && angle >= params.hbond_angle
}
