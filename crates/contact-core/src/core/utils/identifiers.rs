use phf::{Set, phf_set};

/// Leading character of hydrogen atom names.
pub const HYDROGEN_NAME_PREFIX: char = 'H';

/// Elements (first character of the atom name) that may act as hydrogen bond donor or acceptor.
static HYDROGEN_BOND_ELEMENTS: Set<&'static str> = phf_set! { "N", "O", "S" };

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "CA", "C", "O", "OXT", "OT1", "OT2", "NT",
};

static PROTEIN_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
    "HSD", "HSE", "HSP", "HID", "HIE", "HIP", "CYX", "ASH", "GLH", "LYN",
};

static HYDROPHOBIC_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ALA", "VAL", "LEU", "ILE", "MET", "PHE", "TRP", "PRO",
};

static POSITIVE_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ARG", "LYS", "HSP", "HIP",
};

static NEGATIVE_RESIDUE_NAMES: Set<&'static str> = phf_set! {
    "ASP", "GLU",
};

/// Hydrogens are recognized by name only, which is how topologies without element
/// records are handled as well.
#[inline]
pub fn is_hydrogen_name(atom_name: &str) -> bool {
    atom_name.starts_with(HYDROGEN_NAME_PREFIX)
}

pub fn is_hydrogen_bond_capable(atom_name: &str) -> bool {
    atom_name
        .get(..1)
        .is_some_and(|element| HYDROGEN_BOND_ELEMENTS.contains(element))
}

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

pub fn is_protein_residue(residue_name: &str) -> bool {
    PROTEIN_RESIDUE_NAMES.contains(residue_name.trim())
}

pub fn is_hydrophobic_residue(residue_name: &str) -> bool {
    HYDROPHOBIC_RESIDUE_NAMES.contains(residue_name.trim())
}

/// Formal side-chain charge sign of a residue: `1`, `-1` or `0`.
pub fn residue_charge(residue_name: &str) -> i8 {
    let name = residue_name.trim();
    if POSITIVE_RESIDUE_NAMES.contains(name) {
        1
    } else if NEGATIVE_RESIDUE_NAMES.contains(name) {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydrogen_names_are_detected_by_prefix() {
        assert!(is_hydrogen_name("H"));
        assert!(is_hydrogen_name("HN"));
        assert!(is_hydrogen_name("HG21"));
        assert!(!is_hydrogen_name("CA"));
        assert!(!is_hydrogen_name("OH"));
        assert!(!is_hydrogen_name(""));
    }

    #[test]
    fn hydrogen_bond_capability_uses_first_character() {
        assert!(is_hydrogen_bond_capable("N"));
        assert!(is_hydrogen_bond_capable("OD1"));
        assert!(is_hydrogen_bond_capable("SG"));
        assert!(!is_hydrogen_bond_capable("CA"));
        assert!(!is_hydrogen_bond_capable("HN"));
        assert!(!is_hydrogen_bond_capable(""));
    }

    #[test]
    fn backbone_atoms_are_recognized() {
        for name in ["N", "CA", "C", "O", "OXT", " CA "] {
            assert!(is_backbone_atom(name), "{name} should be backbone");
        }
        for name in ["CB", "OG", "ca", ""] {
            assert!(!is_backbone_atom(name), "{name} should not be backbone");
        }
    }

    #[test]
    fn residue_charges_follow_side_chain_chemistry() {
        assert_eq!(residue_charge("LYS"), 1);
        assert_eq!(residue_charge("ARG"), 1);
        assert_eq!(residue_charge("GLU"), -1);
        assert_eq!(residue_charge("ASP"), -1);
        assert_eq!(residue_charge("ALA"), 0);
        assert_eq!(residue_charge("HOH"), 0);
    }

    #[test]
    fn residue_classes_are_disjoint_where_expected() {
        assert!(is_hydrophobic_residue("LEU"));
        assert!(!is_hydrophobic_residue("SER"));
        assert!(is_protein_residue("HSD"));
        assert!(!is_protein_residue("TIP3"));
    }
}
