use super::error::PipelineError;
use crate::core::models::contact::{BackboneSidechainType, Contact, ContactType, TimeParameters};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    MeanScore,
    MedianScore,
    BackboneSidechainType,
    ContactType,
    ResidueA,
    ResidueB,
    TotalTime,
    MeanLifetime,
    MedianLifetime,
}

impl SortKey {
    pub const ALL: [SortKey; 9] = [
        Self::MeanScore,
        Self::MedianScore,
        Self::BackboneSidechainType,
        Self::ContactType,
        Self::ResidueA,
        Self::ResidueB,
        Self::TotalTime,
        Self::MeanLifetime,
        Self::MedianLifetime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MeanScore => "mean",
            Self::MedianScore => "median",
            Self::BackboneSidechainType => "bb/sc type",
            Self::ContactType => "contact type",
            Self::ResidueA => "resid A",
            Self::ResidueB => "resid B",
            Self::TotalTime => "total time",
            Self::MeanLifetime => "mean lifetime",
            Self::MedianLifetime => "median lifetime",
        }
    }

    /// Whether the key is a time statistic that needs [`TimeParameters`].
    pub fn requires_time_parameters(&self) -> bool {
        matches!(
            self,
            Self::TotalTime | Self::MeanLifetime | Self::MedianLifetime
        )
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = PipelineError;

    /// Accepts the labels case-insensitively, with `-` or `_` in place of spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|key| key.label().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| PipelineError::InvalidSortKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SortValue {
    Number(f64),
    Residue(isize),
    BackboneSidechain(BackboneSidechainType),
    Type(ContactType),
}

impl SortValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Residue(a), Self::Residue(b)) => a.cmp(b),
            (Self::BackboneSidechain(a), Self::BackboneSidechain(b)) => a.cmp(b),
            (Self::Type(a), Self::Type(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Orders contacts by one key.
///
/// The sort is stable in both directions: contacts with equal keys keep their input
/// order. `descending` is used as given; there is no separate direction type.
#[derive(Debug, Clone, PartialEq)]
pub struct Sorting {
    pub key: SortKey,
    pub descending: bool,
    time: Option<TimeParameters>,
}

impl Sorting {
    pub fn new(key: SortKey, descending: bool) -> Self {
        Self {
            key,
            descending,
            time: None,
        }
    }

    pub fn with_time_parameters(mut self, params: TimeParameters) -> Self {
        self.time = Some(params);
        self
    }

    pub fn set_time_parameters(&mut self, ns_per_frame: f64, threshold: f64) {
        self.time = Some(TimeParameters::new(ns_per_frame, threshold));
    }

    pub fn time_parameters(&self) -> Option<TimeParameters> {
        self.time
    }

    /// Sorts the contacts, caching time statistics on each contact for time keys.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingTimeParameters`] for a time key when no time
    /// parameters have been set.
    pub fn sort(&self, contacts: Vec<Contact>) -> Result<Vec<Contact>, PipelineError> {
        let time = match (self.key.requires_time_parameters(), self.time) {
            (true, None) => {
                return Err(PipelineError::MissingTimeParameters {
                    key: self.key.label(),
                });
            }
            (_, time) => time,
        };

        let mut keyed: Vec<(SortValue, Contact)> = contacts
            .into_iter()
            .map(|mut contact| (self.value_of(&mut contact, time), contact))
            .collect();

        if self.descending {
            keyed.sort_by(|(a, _), (b, _)| b.compare(a));
        } else {
            keyed.sort_by(|(a, _), (b, _)| a.compare(b));
        }
        Ok(keyed.into_iter().map(|(_, contact)| contact).collect())
    }

    fn value_of(&self, contact: &mut Contact, time: Option<TimeParameters>) -> SortValue {
        match (self.key, time) {
            (SortKey::MeanScore, _) => SortValue::Number(contact.mean_score()),
            (SortKey::MedianScore, _) => SortValue::Number(contact.median_score()),
            (SortKey::BackboneSidechainType, _) => {
                SortValue::BackboneSidechain(contact.backbone_sidechain_type())
            }
            (SortKey::ContactType, _) => SortValue::Type(contact.contact_type()),
            (SortKey::ResidueA, _) => SortValue::Residue(contact.residue_a().id),
            (SortKey::ResidueB, _) => SortValue::Residue(contact.residue_b().id),
            (SortKey::TotalTime, Some(params)) => SortValue::Number(contact.total_time(params)),
            (SortKey::MeanLifetime, Some(params)) => {
                SortValue::Number(contact.mean_lifetime(params))
            }
            (SortKey::MedianLifetime, Some(params)) => {
                SortValue::Number(contact.median_lifetime(params))
            }
            (SortKey::TotalTime | SortKey::MeanLifetime | SortKey::MedianLifetime, None) => {
                SortValue::Number(f64::NAN)
            }
        }
    }
}
