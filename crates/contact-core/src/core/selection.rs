//! Atom selection language used to pick the two atom groups of a detection run.
//!
//! Expressions follow the usual molecular-dynamics conventions:
//! - `all`                 every atom
//! - `name CA CB`          atom names (a trailing `*` matches any suffix, e.g. `name H*`)
//! - `resname ALA GLY`     residue names
//! - `resid 1-10 15 -3:2`  residue ids, single values or inclusive ranges
//! - `segid PROA`          segment identifiers
//! - `backbone`            protein backbone atoms
//! - `protein`             atoms of standard amino acid residues
//! - `hydrogen`            atoms whose name starts with `H`
//! - `around 4.5 <expr>`   atoms within 4.5 Å of `<expr>`, excluding `<expr>` itself
//!
//! Combinators: `and`, `or`, `not` and parentheses. `and` binds tighter than `or`.
//! A selection containing `around` depends on coordinates and has to be re-evaluated
//! for every frame; all other selections depend on the topology only.

use super::models::topology::Topology;
use super::utils::identifiers;
use nalgebra::Point3;
use phf::{Set, phf_set};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum SelectionError {
    #[error("Selection expression is empty")]
    Empty,
    #[error("Unexpected end of selection expression")]
    UnexpectedEnd,
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },
    #[error("Keyword '{0}' requires at least one value")]
    MissingValue(String),
    #[error("Invalid residue id or range '{0}'")]
    InvalidResid(String),
    #[error("Invalid distance '{0}' after 'around'")]
    InvalidRadius(String),
    #[error("Missing closing parenthesis")]
    UnclosedParenthesis,
    #[error("Selection needs {expected} atom positions, but {found} were supplied")]
    PositionCountMismatch { expected: usize, found: usize },
}

static KEYWORDS: Set<&'static str> = phf_set! {
    "and", "or", "not", "(", ")", "all", "name", "resname", "resid", "segid",
    "backbone", "protein", "hydrogen", "around",
};

#[derive(Debug, Clone, PartialEq)]
enum NamePattern {
    Exact(String),
    Prefix(String),
}

impl NamePattern {
    fn new(raw: &str) -> Self {
        match raw.strip_suffix('*') {
            Some(prefix) => Self::Prefix(prefix.to_ascii_uppercase()),
            None => Self::Exact(raw.to_string()),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(name) => name.eq_ignore_ascii_case(value),
            Self::Prefix(prefix) => value.to_ascii_uppercase().starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResidRange {
    start: isize,
    end: isize,
}

impl ResidRange {
    fn parse(raw: &str) -> Result<Self, SelectionError> {
        let invalid = || SelectionError::InvalidResid(raw.to_string());
        // A leading '-' is a sign, not a range separator.
        let separator = raw
            .get(1..)
            .and_then(|rest| rest.find(['-', ':']))
            .map(|pos| pos + 1);
        let (start, end) = match separator {
            Some(pos) => (
                raw[..pos].parse().map_err(|_| invalid())?,
                raw[pos + 1..].parse().map_err(|_| invalid())?,
            ),
            None => {
                let id = raw.parse().map_err(|_| invalid())?;
                (id, id)
            }
        };
        if start > end {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }

    fn contains(&self, id: isize) -> bool {
        (self.start..=self.end).contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Selector {
    All,
    Name(Vec<NamePattern>),
    ResName(Vec<NamePattern>),
    ResId(Vec<ResidRange>),
    SegId(Vec<NamePattern>),
    Backbone,
    Protein,
    Hydrogen,
    Around(f64, Box<Selector>),
    Not(Box<Selector>),
    And(Box<Selector>, Box<Selector>),
    Or(Box<Selector>, Box<Selector>),
}

impl Selector {
    fn is_dynamic(&self) -> bool {
        match self {
            Self::Around(..) => true,
            Self::Not(inner) => inner.is_dynamic(),
            Self::And(l, r) | Self::Or(l, r) => l.is_dynamic() || r.is_dynamic(),
            _ => false,
        }
    }

    fn mask(
        &self,
        topology: &Topology,
        positions: &[Point3<f64>],
    ) -> Result<Vec<bool>, SelectionError> {
        let n = topology.len();
        let per_atom =
            |predicate: &dyn Fn(usize) -> bool| -> Vec<bool> { (0..n).map(predicate).collect() };

        let mask = match self {
            Self::All => vec![true; n],
            Self::Name(patterns) => per_atom(&|i| {
                let name = topology.name(i).unwrap_or_default();
                patterns.iter().any(|p| p.matches(name))
            }),
            Self::ResName(patterns) => per_atom(&|i| {
                let name = topology.residue_name(i).unwrap_or_default();
                patterns.iter().any(|p| p.matches(name))
            }),
            Self::SegId(patterns) => per_atom(&|i| {
                let segment = topology.segment_id(i).unwrap_or_default();
                patterns.iter().any(|p| p.matches(segment))
            }),
            Self::ResId(ranges) => per_atom(&|i| {
                topology
                    .residue_id(i)
                    .is_some_and(|id| ranges.iter().any(|r| r.contains(id)))
            }),
            Self::Backbone => per_atom(&|i| topology.is_backbone(i).unwrap_or(false)),
            Self::Protein => per_atom(&|i| {
                topology
                    .residue_name(i)
                    .is_some_and(identifiers::is_protein_residue)
            }),
            Self::Hydrogen => per_atom(&|i| topology.is_hydrogen(i).unwrap_or(false)),
            Self::Around(radius, inner) => {
                if positions.len() != n {
                    return Err(SelectionError::PositionCountMismatch {
                        expected: n,
                        found: positions.len(),
                    });
                }
                let inner = inner.mask(topology, positions)?;
                let centers: Vec<&Point3<f64>> = positions
                    .iter()
                    .zip(&inner)
                    .filter_map(|(p, &selected)| selected.then_some(p))
                    .collect();
                let radius_sq = radius * radius;
                positions
                    .iter()
                    .zip(&inner)
                    .map(|(p, &selected)| {
                        !selected
                            && centers
                                .iter()
                                .any(|c| (*c - p).norm_squared() <= radius_sq)
                    })
                    .collect()
            }
            Self::Not(inner) => inner
                .mask(topology, positions)?
                .into_iter()
                .map(|selected| !selected)
                .collect(),
            Self::And(l, r) => {
                let right = r.mask(topology, positions)?;
                l.mask(topology, positions)?
                    .into_iter()
                    .zip(right)
                    .map(|(a, b)| a && b)
                    .collect()
            }
            Self::Or(l, r) => {
                let right = r.mask(topology, positions)?;
                l.mask(topology, positions)?
                    .into_iter()
                    .zip(right)
                    .map(|(a, b)| a || b)
                    .collect()
            }
        };
        Ok(mask)
    }
}

/// A parsed atom selection expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    expression: String,
    root: Selector,
}

impl Selection {
    pub fn parse(expression: &str) -> Result<Self, SelectionError> {
        let tokens = tokenize(expression);
        if tokens.is_empty() {
            return Err(SelectionError::Empty);
        }
        let mut parser = Parser::new(tokens);
        let root = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(SelectionError::UnexpectedToken {
                token: token.to_string(),
                position: parser.pos,
            });
        }
        Ok(Self {
            expression: expression.trim().to_string(),
            root,
        })
    }

    /// The expression text this selection was parsed from.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the result depends on atom positions and changes between frames.
    pub fn is_dynamic(&self) -> bool {
        self.root.is_dynamic()
    }

    /// Returns the ascending global indices of all atoms matching the selection.
    ///
    /// `positions` must hold one position per topology atom when the selection is
    /// dynamic; static selections ignore it.
    pub fn evaluate(
        &self,
        topology: &Topology,
        positions: &[Point3<f64>],
    ) -> Result<Vec<usize>, SelectionError> {
        let mask = self.root.mask(topology, positions)?;
        Ok(mask
            .into_iter()
            .enumerate()
            .filter_map(|(idx, selected)| selected.then_some(idx))
            .collect())
    }
}

impl FromStr for Selection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '(' || ch == ')' {
            tokens.push(ch.to_string());
            chars.next();
            continue;
        }
        let mut word = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            word.push(c);
            chars.next();
        }
        tokens.push(word);
    }
    tokens
}

struct Parser {
    tokens: Vec<String>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<String>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn peek_is(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.eq_ignore_ascii_case(keyword))
    }

    fn advance(&mut self) -> Option<String> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<Selector, SelectionError> {
        let mut left = self.parse_and()?;
        while self.peek_is("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Selector::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Selector, SelectionError> {
        let mut left = self.parse_unary()?;
        while self.peek_is("and") {
            self.advance();
            let right = self.parse_unary()?;
            left = Selector::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Selector, SelectionError> {
        if self.peek_is("not") {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Selector::Not(Box::new(inner)));
        }
        if self.peek_is("around") {
            self.advance();
            let raw = self.advance().ok_or(SelectionError::UnexpectedEnd)?;
            let radius: f64 = raw
                .parse()
                .ok()
                .filter(|r: &f64| r.is_finite() && *r >= 0.0)
                .ok_or(SelectionError::InvalidRadius(raw))?;
            let inner = self.parse_unary()?;
            return Ok(Selector::Around(radius, Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Selector, SelectionError> {
        let position = self.pos;
        let token = self.advance().ok_or(SelectionError::UnexpectedEnd)?;
        let keyword = token.to_ascii_lowercase();

        match keyword.as_str() {
            "(" => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(t) if t == ")" => Ok(inner),
                    _ => Err(SelectionError::UnclosedParenthesis),
                }
            }
            "all" => Ok(Selector::All),
            "backbone" => Ok(Selector::Backbone),
            "protein" => Ok(Selector::Protein),
            "hydrogen" => Ok(Selector::Hydrogen),
            "name" => Ok(Selector::Name(self.parse_patterns(&keyword)?)),
            "resname" => Ok(Selector::ResName(self.parse_patterns(&keyword)?)),
            "segid" => Ok(Selector::SegId(self.parse_patterns(&keyword)?)),
            "resid" => {
                let ranges = self
                    .parse_values(&keyword)?
                    .iter()
                    .map(|v| ResidRange::parse(v))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Selector::ResId(ranges))
            }
            _ => Err(SelectionError::UnexpectedToken { token, position }),
        }
    }

    fn parse_patterns(&mut self, keyword: &str) -> Result<Vec<NamePattern>, SelectionError> {
        Ok(self
            .parse_values(keyword)?
            .iter()
            .map(|v| NamePattern::new(v))
            .collect())
    }

    /// Consumes the non-keyword values following a keyword (`name CA CB C`).
    fn parse_values(&mut self, keyword: &str) -> Result<Vec<String>, SelectionError> {
        let mut values = Vec::new();
        while let Some(token) = self.peek() {
            if KEYWORDS.contains(token.to_ascii_lowercase().as_str()) {
                break;
            }
            if let Some(value) = self.advance() {
                values.push(value);
            }
        }
        if values.is_empty() {
            return Err(SelectionError::MissingValue(keyword.to_string()));
        }
        Ok(values)
    }
}
