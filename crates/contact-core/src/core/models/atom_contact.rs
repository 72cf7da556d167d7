/// A hydrogen-mediated interaction detected between the two atoms of an [`AtomContact`].
///
/// All indices are global atom indices. The distance is measured between the hydrogen
/// and the acceptor, the angle at the hydrogen between donor and acceptor.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrogenBond {
    donor: usize,
    acceptor: usize,
    hydrogen: usize,
    distance: f64,
    angle: f64,
    cutoff_distance: f64,
    cutoff_angle: f64,
}

impl HydrogenBond {
    pub fn new(
        donor: usize,
        acceptor: usize,
        hydrogen: usize,
        distance: f64,
        angle: f64,
        cutoff_distance: f64,
        cutoff_angle: f64,
    ) -> Self {
        Self {
            donor,
            acceptor,
            hydrogen,
            distance,
            angle,
            cutoff_distance,
            cutoff_angle,
        }
    }

    pub fn donor(&self) -> usize {
        self.donor
    }

    pub fn acceptor(&self) -> usize {
        self.acceptor
    }

    pub fn hydrogen(&self) -> usize {
        self.hydrogen
    }

    /// Hydrogen–acceptor distance in Angstroms.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Donor–hydrogen–acceptor angle in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn cutoff_distance(&self) -> f64 {
        self.cutoff_distance
    }

    pub fn cutoff_angle(&self) -> f64 {
        self.cutoff_angle
    }
}

/// One heavy-atom contact observed in a single frame.
///
/// Atom `a` always comes from the first selection and atom `b` from the second one.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomContact {
    frame: usize,
    distance: f64,
    weight: f64,
    atom_a: usize,
    atom_b: usize,
    hydrogen_bonds: Vec<HydrogenBond>,
}

impl AtomContact {
    pub fn new(
        frame: usize,
        distance: f64,
        weight: f64,
        atom_a: usize,
        atom_b: usize,
        hydrogen_bonds: Vec<HydrogenBond>,
    ) -> Self {
        Self {
            frame,
            distance,
            weight,
            atom_a,
            atom_b,
            hydrogen_bonds,
        }
    }

    /// Trajectory frame the contact was observed in.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn atom_a(&self) -> usize {
        self.atom_a
    }

    pub fn atom_b(&self) -> usize {
        self.atom_b
    }

    /// The ordered `(a, b)` global index pair identifying this contact across frames.
    pub fn key(&self) -> (usize, usize) {
        (self.atom_a, self.atom_b)
    }

    pub fn hydrogen_bonds(&self) -> &[HydrogenBond] {
        &self.hydrogen_bonds
    }
}
