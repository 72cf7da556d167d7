use crate::core::models::contact::{Contact, TimeParameters};
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One line of the contact summary table.
///
/// Time columns are left empty when no [`TimeParameters`] are supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactRow {
    pub segid_a: String,
    pub resname_a: String,
    pub resid_a: isize,
    pub atom_a: String,
    pub segid_b: String,
    pub resname_b: String,
    pub resid_b: isize,
    pub atom_b: String,
    pub bb_sc_type: String,
    pub contact_type: String,
    pub mean_score: f64,
    pub median_score: f64,
    pub hbond_percentage: f64,
    pub total_time: Option<f64>,
    pub mean_lifetime: Option<f64>,
    pub median_lifetime: Option<f64>,
}

impl ContactRow {
    pub fn from_contact(contact: &mut Contact, time: Option<TimeParameters>) -> Self {
        let (total_time, mean_lifetime, median_lifetime) = match time {
            Some(params) => (
                Some(contact.total_time(params)),
                Some(contact.mean_lifetime(params)),
                Some(contact.median_lifetime(params)),
            ),
            None => (None, None, None),
        };
        let a = contact.partner_a();
        let b = contact.partner_b();
        Self {
            segid_a: a.residue.segment.clone(),
            resname_a: a.residue.name.clone(),
            resid_a: a.residue.id,
            atom_a: a.atom_name.clone(),
            segid_b: b.residue.segment.clone(),
            resname_b: b.residue.name.clone(),
            resid_b: b.residue.id,
            atom_b: b.atom_name.clone(),
            bb_sc_type: contact.backbone_sidechain_type().to_string(),
            contact_type: contact.contact_type().to_string(),
            mean_score: contact.mean_score(),
            median_score: contact.median_score(),
            hbond_percentage: contact.hbond_percentage(),
            total_time,
            mean_lifetime,
            median_lifetime,
        }
    }
}

/// Column names of [`ContactRow`], in field order.
pub const HEADER: [&str; 16] = [
    "segid_a",
    "resname_a",
    "resid_a",
    "atom_a",
    "segid_b",
    "resname_b",
    "resid_b",
    "atom_b",
    "bb_sc_type",
    "contact_type",
    "mean_score",
    "median_score",
    "hbond_percentage",
    "total_time",
    "mean_lifetime",
    "median_lifetime",
];

/// Writes one CSV row per contact, preceded by a header line.
///
/// The header is written even when `contacts` is empty.
pub fn write_contacts<W: Write>(
    writer: W,
    contacts: &mut [Contact],
    time: Option<TimeParameters>,
) -> Result<(), TableError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for contact in contacts.iter_mut() {
        csv_writer.serialize(ContactRow::from_contact(contact, time))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::contact::tests::contact_with_scores;

    #[test]
    fn writes_header_and_rows() {
        let mut contacts = vec![contact_with_scores(&[0.5, 0.0, 1.0, 0.5])];
        let mut out = Vec::new();
        write_contacts(&mut out, &mut contacts, Some(TimeParameters::new(0.5, 0.0))).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "segid_a,resname_a,resid_a,atom_a,segid_b,resname_b,resid_b,atom_b,bb_sc_type,\
                 contact_type,mean_score,median_score,hbond_percentage,total_time,mean_lifetime,\
                 median_lifetime"
            )
        );
        assert_eq!(
            lines.next(),
            Some("A,ALA,1,CB,A,LEU,10,CB,sc-sc,hydrophobic,0.5,0.5,0.0,1.5,0.75,0.75")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_contact_set_still_gets_a_header() {
        let mut out = Vec::new();
        write_contacts(&mut out, &mut [], None).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}\n", HEADER.join(",")));
    }

    #[test]
    fn header_matches_serialized_field_order() {
        let mut contacts = vec![contact_with_scores(&[1.0])];
        let mut out = Vec::new();
        write_contacts(&mut out, &mut contacts, None).unwrap();

        let text = String::from_utf8(out).unwrap();
        let rows: Vec<_> = text.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].split(',').count(), HEADER.len());
    }

    #[test]
    fn time_columns_are_empty_without_time_parameters() {
        let mut contacts = vec![contact_with_scores(&[1.0])];
        let mut out = Vec::new();
        write_contacts(&mut out, &mut contacts, None).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with("1.0,1.0,0.0,,,"));
    }
}
