use super::error::{FilterError, PipelineError};
use crate::core::models::contact::{Contact, TimeParameters};
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::debug;

/// Sentinel accepted by the name and range selectors to leave a side unconstrained.
pub const ALL_SENTINEL: &str = "all";

fn is_all(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case(ALL_SENTINEL)
}

fn split_list(raw: &str) -> Result<Vec<&str>, FilterError> {
    raw.split(',')
        .map(str::trim)
        .map(|item| {
            if item.is_empty() {
                Err(FilterError::EmptyEntry(raw.to_string()))
            } else {
                Ok(item)
            }
        })
        .collect()
}

/// Residue names accepted on one side of a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSelector {
    All,
    Names(Vec<String>),
}

impl NameSelector {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.iter().any(|n| n == name),
        }
    }
}

impl FromStr for NameSelector {
    type Err = FilterError;

    /// Parses `"all"` or a comma-separated list such as `"ALA,GLY"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_all(s) {
            return Ok(Self::All);
        }
        Ok(Self::Names(
            split_list(s)?.into_iter().map(str::to_string).collect(),
        ))
    }
}

/// Residue ids accepted on one side of a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSelector {
    All,
    Ranges(Vec<RangeInclusive<isize>>),
}

impl RangeSelector {
    pub fn contains(&self, id: isize) -> bool {
        match self {
            Self::All => true,
            Self::Ranges(ranges) => ranges.iter().any(|r| r.contains(&id)),
        }
    }
}

impl FromStr for RangeSelector {
    type Err = FilterError;

    /// Parses `"all"` or comma-separated inclusive ranges such as `"10-20,30-35,42"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_all(s) {
            return Ok(Self::All);
        }
        let ranges = split_list(s)?
            .into_iter()
            .map(parse_range)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::Ranges(ranges))
    }
}

fn parse_range(item: &str) -> Result<RangeInclusive<isize>, FilterError> {
    let invalid = || FilterError::InvalidRange(item.to_string());
    // Skip the first character so that a leading minus sign is not taken as the separator.
    let (lo, hi) = match item.get(1..).and_then(|rest| rest.find('-')) {
        Some(pos) => (&item[..=pos], &item[pos + 2..]),
        None => (item, item),
    };
    let lo: isize = lo.trim().parse().map_err(|_| invalid())?;
    let hi: isize = hi.trim().parse().map_err(|_| invalid())?;
    if lo > hi {
        return Err(invalid());
    }
    Ok(lo..=hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Greater,
    Smaller,
    Equal,
    NotEqual,
}

impl ComparisonOperator {
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Greater => value > threshold,
            Self::Smaller => value < threshold,
            Self::Equal => value == threshold,
            Self::NotEqual => value != threshold,
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greater" | ">" => Ok(Self::Greater),
            "smaller" | "<" => Ok(Self::Smaller),
            "equal" | "==" | "=" => Ok(Self::Equal),
            "not equal" | "not-equal" | "!=" => Ok(Self::NotEqual),
            _ => Err(FilterError::InvalidOperator(s.to_string())),
        }
    }
}

/// Aggregate statistic a threshold filter is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdMetric {
    TotalTime(TimeParameters),
    MeanScore,
    MedianScore,
}

impl ThresholdMetric {
    /// Resolves a metric by name (`"total time"`, `"mean"`, `"median"`).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingTimeParameters`] when `"total time"` is requested
    /// without time parameters.
    pub fn from_name(name: &str, time: Option<TimeParameters>) -> Result<Self, PipelineError> {
        match name.trim().to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "total time" => time
                .map(Self::TotalTime)
                .ok_or(PipelineError::MissingTimeParameters { key: "total time" }),
            "mean" | "mean score" => Ok(Self::MeanScore),
            "median" | "median score" => Ok(Self::MedianScore),
            _ => Err(FilterError::InvalidMetric(name.to_string()).into()),
        }
    }

    fn evaluate(&self, contact: &mut Contact) -> f64 {
        match self {
            Self::TotalTime(params) => contact.total_time(*params),
            Self::MeanScore => contact.mean_score(),
            Self::MedianScore => contact.median_score(),
        }
    }
}

/// A predicate over contacts. Applying a filter never changes the kept contacts' scores.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    ResidueName {
        a: NameSelector,
        b: NameSelector,
    },
    ResidueRange {
        a: RangeSelector,
        b: RangeSelector,
    },
    Threshold {
        metric: ThresholdMetric,
        operator: ComparisonOperator,
        value: f64,
    },
}

impl Filter {
    /// Builds a residue-name filter from two `"all"`/comma-list strings.
    pub fn residue_names(a: &str, b: &str) -> Result<Self, FilterError> {
        Ok(Self::ResidueName {
            a: a.parse()?,
            b: b.parse()?,
        })
    }

    /// Builds a residue-range filter from two `"all"`/range-list strings.
    pub fn residue_ranges(a: &str, b: &str) -> Result<Self, FilterError> {
        Ok(Self::ResidueRange {
            a: a.parse()?,
            b: b.parse()?,
        })
    }

    fn keeps(&self, contact: &mut Contact) -> bool {
        match self {
            Self::ResidueName { a, b } => {
                a.matches(&contact.residue_a().name) && b.matches(&contact.residue_b().name)
            }
            Self::ResidueRange { a, b } => {
                a.contains(contact.residue_a().id) && b.contains(contact.residue_b().id)
            }
            Self::Threshold {
                metric,
                operator,
                value,
            } => operator.compare(metric.evaluate(contact), *value),
        }
    }

    /// Returns the contacts the filter keeps, in their original order.
    pub fn apply(&self, contacts: Vec<Contact>) -> Vec<Contact> {
        let before = contacts.len();
        let kept: Vec<Contact> = contacts
            .into_iter()
            .filter_map(|mut contact| self.keeps(&mut contact).then_some(contact))
            .collect();
        debug!(before, after = kept.len(), "Filter applied.");
        kept
    }
}

/// Restricts every contact to the `[lower, upper)` frame window of its score array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    lower: usize,
    upper: usize,
}

impl FrameWindow {
    pub fn new(lower: usize, upper: usize) -> Result<Self, FilterError> {
        if lower > upper {
            return Err(FilterError::InvalidFrameWindow { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> usize {
        self.lower
    }

    pub fn upper(&self) -> usize {
        self.upper
    }

    /// Truncates the score arrays in place. Bounds beyond the array are clamped.
    pub fn apply(&self, contacts: &mut [Contact]) {
        for contact in contacts.iter_mut() {
            contact.restrict_to_window(self.lower, self.upper);
        }
    }
}
