use super::atom_contact::AtomContact;
use super::topology::Topology;
use crate::core::utils::identifiers;
use itertools::Itertools;
use std::fmt;

/// Identity of the residue an atom of a contact belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueInfo {
    pub id: isize,
    pub name: String,
    pub segment: String,
}

impl fmt::Display for ResidueInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.segment, self.name, self.id)
    }
}

/// One side of a [`Contact`]: the atom and the residue it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPartner {
    pub atom_index: usize,
    pub atom_name: String,
    pub residue: ResidueInfo,
    pub is_backbone: bool,
}

impl ContactPartner {
    /// Looks up the partner attributes of `atom_index` in the topology.
    pub fn from_topology(topology: &Topology, atom_index: usize) -> Option<Self> {
        Some(Self {
            atom_index,
            atom_name: topology.name(atom_index)?.to_string(),
            residue: ResidueInfo {
                id: topology.residue_id(atom_index)?,
                name: topology.residue_name(atom_index)?.to_string(),
                segment: topology.segment_id(atom_index)?.to_string(),
            },
            is_backbone: topology.is_backbone(atom_index)?,
        })
    }
}

/// Which parts of the two residues are in contact.
///
/// Variants are declared in the lexical order of their labels, which is the order used
/// when sorting contacts by this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackboneSidechainType {
    BackboneBackbone,
    BackboneSidechain,
    SidechainBackbone,
    SidechainSidechain,
}

impl BackboneSidechainType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BackboneBackbone => "bb-bb",
            Self::BackboneSidechain => "bb-sc",
            Self::SidechainBackbone => "sc-bb",
            Self::SidechainSidechain => "sc-sc",
        }
    }
}

impl fmt::Display for BackboneSidechainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chemical character of a contact, declared in the lexical order of its labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactType {
    HydrogenBond,
    Hydrophobic,
    Other,
    SaltBridge,
}

impl ContactType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HydrogenBond => "hbond",
            Self::Hydrophobic => "hydrophobic",
            Self::Other => "other",
            Self::SaltBridge => "saltbr",
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Settings that turn per-frame scores into times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeParameters {
    /// Simulated time covered by one frame, in nanoseconds.
    pub ns_per_frame: f64,
    /// A frame counts as "in contact" when its score is strictly above this value.
    pub threshold: f64,
}

impl TimeParameters {
    pub fn new(ns_per_frame: f64, threshold: f64) -> Self {
        Self {
            ns_per_frame,
            threshold,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TimeStatistics {
    total_time: Option<(TimeParameters, f64)>,
    mean_lifetime: Option<(TimeParameters, f64)>,
    median_lifetime: Option<(TimeParameters, f64)>,
}

/// A contact between two atoms aggregated over the whole trajectory.
///
/// The score array always spans the analyzed frame window: frames in which the pair
/// was not observed contribute a score of zero. The contributing [`AtomContact`]s keep
/// their original trajectory frame ids; [`Contact::first_frame`] maps them onto the
/// score array after the window has been narrowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    partner_a: ContactPartner,
    partner_b: ContactPartner,
    scores: Vec<f64>,
    first_frame: usize,
    atom_contacts: Vec<AtomContact>,
    time_stats: TimeStatistics,
}

impl Contact {
    /// Creates a contact with an all-zero score array of `frame_count` entries.
    pub fn new(partner_a: ContactPartner, partner_b: ContactPartner, frame_count: usize) -> Self {
        Self {
            partner_a,
            partner_b,
            scores: vec![0.0; frame_count],
            first_frame: 0,
            atom_contacts: Vec::new(),
            time_stats: TimeStatistics::default(),
        }
    }

    /// Stores the weight of a single-frame observation in its score slot.
    ///
    /// # Return
    ///
    /// `false` (and nothing is recorded) if the observation lies outside the score array.
    pub fn record(&mut self, atom_contact: AtomContact) -> bool {
        let Some(slot) = atom_contact
            .frame()
            .checked_sub(self.first_frame)
            .filter(|&slot| slot < self.scores.len())
        else {
            return false;
        };
        self.scores[slot] = atom_contact.weight();
        self.atom_contacts.push(atom_contact);
        self.invalidate_time_statistics();
        true
    }

    pub fn key(&self) -> (usize, usize) {
        (self.partner_a.atom_index, self.partner_b.atom_index)
    }

    pub fn partner_a(&self) -> &ContactPartner {
        &self.partner_a
    }

    pub fn partner_b(&self) -> &ContactPartner {
        &self.partner_b
    }

    pub fn residue_a(&self) -> &ResidueInfo {
        &self.partner_a.residue
    }

    pub fn residue_b(&self) -> &ResidueInfo {
        &self.partner_b.residue
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn frame_count(&self) -> usize {
        self.scores.len()
    }

    /// Trajectory frame that corresponds to the first score entry.
    pub fn first_frame(&self) -> usize {
        self.first_frame
    }

    pub fn atom_contacts(&self) -> &[AtomContact] {
        &self.atom_contacts
    }

    /// Multiplies the score array element-wise by `profile`.
    ///
    /// Callers are expected to check that `profile` has one entry per score; extra
    /// entries on either side are ignored.
    pub fn scale_scores(&mut self, profile: &[f64]) {
        for (score, factor) in self.scores.iter_mut().zip(profile) {
            *score *= factor;
        }
        self.invalidate_time_statistics();
    }

    /// Narrows the score array to the `[lower, upper)` slice of the current window.
    ///
    /// Bounds are clamped to the array. Observations outside the new window are dropped.
    pub fn restrict_to_window(&mut self, lower: usize, upper: usize) {
        let upper = upper.min(self.scores.len());
        let lower = lower.min(upper);
        self.scores = self.scores[lower..upper].to_vec();

        let start = self.first_frame + lower;
        let end = self.first_frame + upper;
        self.atom_contacts
            .retain(|ac| ac.frame() >= start && ac.frame() < end);
        self.first_frame = start;
        self.invalidate_time_statistics();
    }

    pub fn mean_score(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    pub fn median_score(&self) -> f64 {
        median(&self.scores)
    }

    /// Time spent in contact: `ns_per_frame` for every frame scoring above the threshold.
    ///
    /// The result is cached on the contact until the scores change.
    pub fn total_time(&mut self, params: TimeParameters) -> f64 {
        if let Some((cached_params, value)) = self.time_stats.total_time {
            if cached_params == params {
                return value;
            }
        }
        let active = self
            .scores
            .iter()
            .filter(|&&score| score > params.threshold)
            .count();
        let value = active as f64 * params.ns_per_frame;
        self.time_stats.total_time = Some((params, value));
        value
    }

    /// Durations of all uninterrupted stretches of frames scoring above the threshold.
    pub fn lifetimes(&self, params: TimeParameters) -> Vec<f64> {
        let runs = self
            .scores
            .iter()
            .chunk_by(|&&score| score > params.threshold);
        (&runs)
            .into_iter()
            .filter(|(active, _)| *active)
            .map(|(_, run)| run.count() as f64 * params.ns_per_frame)
            .collect()
    }

    pub fn mean_lifetime(&mut self, params: TimeParameters) -> f64 {
        if let Some((cached_params, value)) = self.time_stats.mean_lifetime {
            if cached_params == params {
                return value;
            }
        }
        let lifetimes = self.lifetimes(params);
        let value = if lifetimes.is_empty() {
            0.0
        } else {
            lifetimes.iter().sum::<f64>() / lifetimes.len() as f64
        };
        self.time_stats.mean_lifetime = Some((params, value));
        value
    }

    pub fn median_lifetime(&mut self, params: TimeParameters) -> f64 {
        if let Some((cached_params, value)) = self.time_stats.median_lifetime {
            if cached_params == params {
                return value;
            }
        }
        let value = median(&self.lifetimes(params));
        self.time_stats.median_lifetime = Some((params, value));
        value
    }

    pub fn cached_total_time(&self) -> Option<f64> {
        self.time_stats.total_time.map(|(_, value)| value)
    }

    pub fn cached_mean_lifetime(&self) -> Option<f64> {
        self.time_stats.mean_lifetime.map(|(_, value)| value)
    }

    pub fn cached_median_lifetime(&self) -> Option<f64> {
        self.time_stats.median_lifetime.map(|(_, value)| value)
    }

    /// Number of hydrogen bonds in each frame of the current window.
    pub fn hbond_frames(&self) -> Vec<usize> {
        let mut counts = vec![0; self.scores.len()];
        for ac in &self.atom_contacts {
            if let Some(count) = ac
                .frame()
                .checked_sub(self.first_frame)
                .and_then(|slot| counts.get_mut(slot))
            {
                *count += ac.hydrogen_bonds().len();
            }
        }
        counts
    }

    /// Percentage of frames that carry at least one hydrogen bond.
    pub fn hbond_percentage(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let frames_with_hbond = self.hbond_frames().iter().filter(|&&n| n > 0).count();
        100.0 * frames_with_hbond as f64 / self.scores.len() as f64
    }

    pub fn has_hydrogen_bond(&self) -> bool {
        self.atom_contacts
            .iter()
            .any(|ac| !ac.hydrogen_bonds().is_empty())
    }

    pub fn backbone_sidechain_type(&self) -> BackboneSidechainType {
        match (self.partner_a.is_backbone, self.partner_b.is_backbone) {
            (true, true) => BackboneSidechainType::BackboneBackbone,
            (true, false) => BackboneSidechainType::BackboneSidechain,
            (false, true) => BackboneSidechainType::SidechainBackbone,
            (false, false) => BackboneSidechainType::SidechainSidechain,
        }
    }

    pub fn contact_type(&self) -> ContactType {
        let charge_a = identifiers::residue_charge(&self.partner_a.residue.name);
        let charge_b = identifiers::residue_charge(&self.partner_b.residue.name);
        if charge_a * charge_b < 0 {
            ContactType::SaltBridge
        } else if self.has_hydrogen_bond() {
            ContactType::HydrogenBond
        } else if identifiers::is_hydrophobic_residue(&self.partner_a.residue.name)
            && identifiers::is_hydrophobic_residue(&self.partner_b.residue.name)
        {
            ContactType::Hydrophobic
        } else {
            ContactType::Other
        }
    }

    fn invalidate_time_statistics(&mut self) {
        self.time_stats = TimeStatistics::default();
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::atom_contact::HydrogenBond;

    const EPS: f64 = 1e-12;

    pub(crate) fn partner(atom_index: usize, atom: &str, resid: isize, resname: &str) -> ContactPartner {
        ContactPartner {
            atom_index,
            atom_name: atom.to_string(),
            residue: ResidueInfo {
                id: resid,
                name: resname.to_string(),
                segment: "A".to_string(),
            },
            is_backbone: identifiers::is_backbone_atom(atom),
        }
    }

    pub(crate) fn contact_with_scores(scores: &[f64]) -> Contact {
        let mut contact = Contact::new(
            partner(0, "CB", 1, "ALA"),
            partner(1, "CB", 10, "LEU"),
            scores.len(),
        );
        for (frame, &score) in scores.iter().enumerate() {
            if score != 0.0 {
                contact.record(AtomContact::new(frame, 4.0, score, 0, 1, Vec::new()));
            }
        }
        contact
    }

    #[test]
    fn record_writes_weight_into_frame_slot() {
        let contact = contact_with_scores(&[0.5, 0.0, 0.25]);
        assert_eq!(contact.scores(), &[0.5, 0.0, 0.25]);
        assert_eq!(contact.atom_contacts().len(), 2);
        assert_eq!(contact.key(), (0, 1));
    }

    #[test]
    fn record_rejects_frames_outside_the_window() {
        let mut contact = contact_with_scores(&[0.0, 0.0]);
        assert!(!contact.record(AtomContact::new(2, 3.0, 0.9, 0, 1, Vec::new())));
        assert_eq!(contact.scores(), &[0.0, 0.0]);
        assert!(contact.atom_contacts().is_empty());
    }

    #[test]
    fn mean_and_median_scores() {
        let contact = contact_with_scores(&[0.2, 0.0, 0.6, 0.4]);
        assert!((contact.mean_score() - 0.3).abs() < EPS);
        assert!((contact.median_score() - 0.3).abs() < EPS);

        let odd = contact_with_scores(&[0.9, 0.1, 0.5]);
        assert!((odd.median_score() - 0.5).abs() < EPS);
    }

    #[test]
    fn statistics_of_empty_score_array_are_zero() {
        let mut contact = contact_with_scores(&[]);
        let params = TimeParameters::new(1.0, 0.0);
        assert_eq!(contact.mean_score(), 0.0);
        assert_eq!(contact.median_score(), 0.0);
        assert_eq!(contact.total_time(params), 0.0);
        assert_eq!(contact.mean_lifetime(params), 0.0);
        assert_eq!(contact.hbond_percentage(), 0.0);
    }

    #[test]
    fn total_time_counts_frames_above_threshold() {
        let mut contact = contact_with_scores(&[0.9, 0.1, 0.0, 0.7, 0.8]);
        assert!((contact.total_time(TimeParameters::new(0.5, 0.0)) - 2.0).abs() < EPS);
        assert!((contact.total_time(TimeParameters::new(0.5, 0.5)) - 1.5).abs() < EPS);
        assert_eq!(contact.cached_total_time(), Some(1.5));
    }

    #[test]
    fn lifetimes_are_uninterrupted_runs() {
        let mut contact = contact_with_scores(&[0.9, 0.9, 0.0, 0.8, 0.0, 0.7, 0.7, 0.7]);
        let params = TimeParameters::new(2.0, 0.0);

        assert_eq!(contact.lifetimes(params), vec![4.0, 2.0, 6.0]);
        assert!((contact.mean_lifetime(params) - 4.0).abs() < EPS);
        assert!((contact.median_lifetime(params) - 4.0).abs() < EPS);
        assert_eq!(contact.cached_mean_lifetime(), Some(4.0));
        assert_eq!(contact.cached_median_lifetime(), Some(4.0));
    }

    #[test]
    fn changing_scores_invalidates_cached_time_statistics() {
        let mut contact = contact_with_scores(&[0.9, 0.9]);
        let params = TimeParameters::new(1.0, 0.5);
        assert_eq!(contact.total_time(params), 2.0);

        contact.scale_scores(&[1.0, 0.1]);
        assert_eq!(contact.cached_total_time(), None);
        assert_eq!(contact.total_time(params), 1.0);
    }

    #[test]
    fn restrict_to_window_truncates_scores_and_observations() {
        let mut contact = contact_with_scores(&[0.1, 0.2, 0.3, 0.4, 0.5]);
        contact.restrict_to_window(1, 4);
        assert_eq!(contact.scores(), &[0.2, 0.3, 0.4]);
        assert_eq!(contact.first_frame(), 1);
        assert_eq!(contact.atom_contacts().len(), 3);

        contact.restrict_to_window(1, 100);
        assert_eq!(contact.scores(), &[0.3, 0.4]);
        assert_eq!(contact.first_frame(), 2);
        assert!(contact.atom_contacts().iter().all(|ac| ac.frame() >= 2));
    }

    #[test]
    fn hbond_frames_follow_the_window() {
        let mut contact = Contact::new(partner(0, "N", 1, "SER"), partner(5, "O", 9, "GLY"), 3);
        let hbond = HydrogenBond::new(0, 5, 1, 1.9, 170.0, 2.5, 120.0);
        contact.record(AtomContact::new(0, 2.9, 0.9, 0, 5, vec![hbond.clone()]));
        contact.record(AtomContact::new(2, 3.1, 0.8, 0, 5, vec![hbond.clone(), hbond]));

        assert_eq!(contact.hbond_frames(), vec![1, 0, 2]);
        assert!((contact.hbond_percentage() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(contact.contact_type(), ContactType::HydrogenBond);

        contact.restrict_to_window(1, 3);
        assert_eq!(contact.hbond_frames(), vec![0, 2]);
    }

    #[test]
    fn contact_type_prefers_salt_bridges() {
        let contact = Contact::new(partner(0, "NZ", 3, "LYS"), partner(1, "OE1", 8, "GLU"), 1);
        assert_eq!(contact.contact_type(), ContactType::SaltBridge);

        let hydrophobic = contact_with_scores(&[0.5]);
        assert_eq!(hydrophobic.contact_type(), ContactType::Hydrophobic);

        let other = Contact::new(partner(0, "OG", 3, "SER"), partner(1, "CB", 8, "ALA"), 1);
        assert_eq!(other.contact_type(), ContactType::Other);
    }

    #[test]
    fn backbone_sidechain_type_is_ordered() {
        let bb_sc = Contact::new(partner(0, "CA", 1, "ALA"), partner(1, "CB", 8, "ALA"), 1);
        let sc_bb = Contact::new(partner(0, "CB", 1, "ALA"), partner(1, "O", 8, "ALA"), 1);
        assert_eq!(
            bb_sc.backbone_sidechain_type(),
            BackboneSidechainType::BackboneSidechain
        );
        assert_eq!(
            sc_bb.backbone_sidechain_type(),
            BackboneSidechainType::SidechainBackbone
        );
        assert!(BackboneSidechainType::BackboneBackbone < BackboneSidechainType::SidechainSidechain);
        assert_eq!(sc_bb.backbone_sidechain_type().to_string(), "sc-bb");
    }

    #[test]
    fn partner_is_resolved_from_topology() {
        use crate::core::models::topology::{AtomRecord, TopologyBuilder};
        let mut builder = TopologyBuilder::new();
        builder.add_atom(AtomRecord::new("CA", 42, "GLY", "PROB"));
        let topology = builder.build().unwrap();

        let resolved = ContactPartner::from_topology(&topology, 0).unwrap();
        assert_eq!(resolved.residue.to_string(), "PROB:GLY42");
        assert!(resolved.is_backbone);
        assert!(ContactPartner::from_topology(&topology, 1).is_none());
    }
}
