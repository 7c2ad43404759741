/// Shared data structures for the inspection state
///
/// These structs represent the data model that flows between
/// the data source, the store and the UI layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a subject (a property under inspection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u32);

/// Identifier of a before/after pair, unique within its subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(pub u32);

/// Identifier of an anomaly, unique within its pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnomalyId(pub u32);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a subject inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectStatus {
    Completed,
    InProgress,
    ToVerify,
}

impl SubjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            SubjectStatus::Completed => "Completed",
            SubjectStatus::InProgress => "In progress",
            SubjectStatus::ToVerify => "To verify",
        }
    }
}

/// Decision an inspector records for one pair
///
/// A pair with no decision yet carries `None` instead of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Compliant,
    ToVerify,
    NonCompliant,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Compliant,
        Classification::ToVerify,
        Classification::NonCompliant,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Classification::Compliant => "compliant",
            Classification::ToVerify => "to verify",
            Classification::NonCompliant => "non-compliant",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a detected anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A 2-D position, either in pixels or normalized depending on the data set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A detected irregularity attached to a pair
///
/// Anomalies are supplied by the data source and never modified here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: AnomalyId,
    /// Free-form category ("scratch", "stain", ...)
    pub kind: String,
    pub location: Point2,
    /// Optional outline polygon around the anomaly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<Vec<Point2>>,
    pub severity: Severity,
    pub description: String,
    /// Reference to a close-up image (path or URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Anomaly {
    /// Close-up to show next to the description, `fallback` when none was taken
    pub fn close_up<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.thumbnail.as_deref().unwrap_or(fallback)
    }
}

/// Photo quality assessment, each axis from 0 (unusable) to 5 (excellent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityBadges {
    pub sharpness: u8,
    pub lighting: u8,
    pub angle: u8,
}

impl QualityBadges {
    pub const MAX: u8 = 5;

    pub fn is_valid(&self) -> bool {
        self.sharpness <= Self::MAX && self.lighting <= Self::MAX && self.angle <= Self::MAX
    }
}

/// One room's before/after comparison, the unit of classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub id: PairId,
    /// Room name shown to the inspector (e.g., "Kitchen")
    pub room: String,
    /// Move-in photo reference
    pub before: String,
    /// Move-out photo reference
    pub after: String,
    /// Per-pair conformity score (0-100)
    pub score: u8,
    /// None until the inspector classifies the pair
    #[serde(default)]
    pub status: Option<Classification>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
    pub quality: QualityBadges,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A property under inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub address: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    /// Aggregate conformity score (0-100), supplied by the data source
    pub conformity_score: u8,
    pub status: SubjectStatus,
    pub pairs: Vec<Pair>,
}

impl Subject {
    /// Find a pair by id
    #[cfg(test)]
    pub fn pair(&self, id: PairId) -> Option<&Pair> {
        self.pairs.iter().find(|pair| pair.id == id)
    }

    /// Position of a pair in the ordered sequence
    pub fn pair_index(&self, id: PairId) -> Option<usize> {
        self.pairs.iter().position(|pair| pair.id == id)
    }

    /// Number of pairs that already carry a classification
    pub fn classified_count(&self) -> usize {
        self.pairs.iter().filter(|pair| pair.status.is_some()).count()
    }
}
