use super::error::EngineError;
use crate::core::models::atom_contact::AtomContact;
use crate::core::models::contact::{Contact, ContactPartner};
use crate::core::models::topology::Topology;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Collapses the frame-ordered per-frame contact lists into one [`Contact`] per atom pair.
///
/// Pairs are keyed by the ordered `(A, B)` global index pair. Every contact gets a score
/// array with one entry per frame, holding the weight of the frames it was observed in
/// and zero elsewhere. Contacts are returned in order of first appearance.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] if entry `f` of `frames` contains an observation of
/// another frame or one that cannot be stored, and [`EngineError::UnknownAtom`] for atoms missing from the topology.
#[instrument(skip_all, name = "contact_aggregation", fields(frames = frames.len()))]
pub fn aggregate(
    frames: &[Vec<AtomContact>],
    topology: &Topology,
) -> Result<Vec<Contact>, EngineError> {
    let frame_count = frames.len();
    let mut positions: HashMap<(usize, usize), usize> = HashMap::new();
    let mut contacts: Vec<Contact> = Vec::new();

    for (frame, frame_contacts) in frames.iter().enumerate() {
        for atom_contact in frame_contacts {
            if atom_contact.frame() != frame {
                return Err(EngineError::Internal(format!(
                    "Contact of frame {} found in the slot of frame {}",
                    atom_contact.frame(),
                    frame
                )));
            }
            let key = atom_contact.key();
            let slot = match positions.get(&key) {
                Some(&slot) => slot,
                None => {
                    let partner = |index: usize| {
                        ContactPartner::from_topology(topology, index)
                            .ok_or(EngineError::UnknownAtom(index))
                    };
                    contacts.push(Contact::new(partner(key.0)?, partner(key.1)?, frame_count));
                    positions.insert(key, contacts.len() - 1);
                    contacts.len() - 1
                }
            };
            if !contacts[slot].record(atom_contact.clone()) {
                return Err(EngineError::Internal(format!(
                    "Contact of frame {} lies outside a score array of {} frames",
                    atom_contact.frame(),
                    frame_count
                )));
            }
        }
    }

    debug!(contacts = contacts.len(), "Aggregated atom contacts.");
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom_contact::HydrogenBond;
    use crate::core::models::topology::{AtomRecord, TopologyBuilder};

    fn topology() -> Topology {
        let mut builder = TopologyBuilder::new();
        builder.add_atom(AtomRecord::new("N", 1, "SER", "A"));
        builder.add_atom(AtomRecord::new("HN", 1, "SER", "A"));
        builder.add_atom(AtomRecord::new("CB", 2, "ALA", "A"));
        builder.add_atom(AtomRecord::new("O", 20, "GLY", "B"));
        builder.add_atom(AtomRecord::new("CA", 20, "GLY", "B"));
        builder.build().unwrap()
    }

    fn observed(frame: usize, a: usize, b: usize, weight: f64) -> AtomContact {
        AtomContact::new(frame, 4.0, weight, a, b, Vec::new())
    }

    #[test]
    fn scores_are_filled_per_frame_with_zero_gaps() {
        let frames = vec![
            vec![observed(0, 0, 3, 0.9)],
            vec![],
            vec![observed(2, 0, 3, 0.4), observed(2, 2, 4, 0.7)],
        ];
        let contacts = aggregate(&frames, &topology()).unwrap();

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].key(), (0, 3));
        assert_eq!(contacts[0].scores(), &[0.9, 0.0, 0.4]);
        assert_eq!(contacts[0].atom_contacts().len(), 2);
        assert_eq!(contacts[1].key(), (2, 4));
        assert_eq!(contacts[1].scores(), &[0.0, 0.0, 0.7]);
        assert!(contacts.iter().all(|c| c.frame_count() == 3));
    }

    #[test]
    fn ordered_pairs_are_distinct_contacts() {
        let frames = vec![vec![observed(0, 3, 0, 0.5), observed(0, 0, 3, 0.6)]];
        let contacts = aggregate(&frames, &topology()).unwrap();
        let keys: Vec<_> = contacts.iter().map(Contact::key).collect();
        assert_eq!(keys, vec![(3, 0), (0, 3)]);
    }

    #[test]
    fn hydrogen_bonds_and_residue_identity_are_kept() {
        let hbond = HydrogenBond::new(0, 3, 1, 1.9, 165.0, 2.5, 120.0);
        let frames = vec![vec![AtomContact::new(0, 2.9, 0.99, 0, 3, vec![hbond])]];
        let contacts = aggregate(&frames, &topology()).unwrap();

        let contact = &contacts[0];
        assert_eq!(contact.residue_a().name, "SER");
        assert_eq!(contact.residue_b().segment, "B");
        assert_eq!(contact.partner_b().atom_name, "O");
        assert_eq!(contact.hbond_frames(), vec![1]);
    }

    #[test]
    fn misplaced_frame_ids_are_rejected() {
        let frames = vec![vec![], vec![observed(0, 0, 3, 0.5)]];
        assert!(matches!(
            aggregate(&frames, &topology()),
            Err(EngineError::Internal(_))
        ));
    }

    #[test]
    fn unknown_atoms_are_rejected() {
        let frames = vec![vec![observed(0, 0, 42, 0.5)]];
        assert!(matches!(
            aggregate(&frames, &topology()),
            Err(EngineError::UnknownAtom(42))
        ));
    }

    #[test]
    fn no_frames_yields_no_contacts() {
        assert!(aggregate(&[], &topology()).unwrap().is_empty());
    }
}
