/// Inspection data sources
///
/// Subjects come either from a JSON data set on disk or from the
/// built-in demo set. Either way this is a one-shot load: nothing is
/// refetched once the store is built.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use super::data::{
    Anomaly, AnomalyId, Classification, Pair, PairId, Point2, QualityBadges, Severity, Subject,
    SubjectId, SubjectStatus,
};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read data set {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse data set {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("subject {subject}: {reason}")]
    Invalid { subject: SubjectId, reason: String },
}

/// Load and validate a JSON array of subjects
pub fn load_subjects(path: &Path) -> Result<Vec<Subject>, SourceError> {
    let json = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let subjects: Vec<Subject> =
        serde_json::from_str(&json).map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    for subject in &subjects {
        validate(subject)?;
    }

    info!(path = %path.display(), count = subjects.len(), "data set loaded");
    Ok(subjects)
}

/// Check the invariants serde cannot express
pub fn validate(subject: &Subject) -> Result<(), SourceError> {
    let invalid = |reason: String| SourceError::Invalid {
        subject: subject.id,
        reason,
    };

    if subject.conformity_score > 100 {
        return Err(invalid(format!(
            "conformity score {} exceeds 100",
            subject.conformity_score
        )));
    }

    let mut seen = HashSet::new();
    for pair in &subject.pairs {
        if !seen.insert(pair.id) {
            return Err(invalid(format!("duplicate pair id {}", pair.id)));
        }
        if pair.score > 100 {
            return Err(invalid(format!("pair {} score {} exceeds 100", pair.id, pair.score)));
        }
        if !pair.quality.is_valid() {
            return Err(invalid(format!(
                "pair {} quality ratings must be between 0 and {}",
                pair.id,
                QualityBadges::MAX
            )));
        }
    }

    Ok(())
}

const ROOMS: [&str; 11] = [
    "Living room",
    "Kitchen",
    "Bedroom 1",
    "Bedroom 2",
    "Bathroom",
    "Toilet",
    "Entrance",
    "Hallway",
    "Office",
    "Laundry",
    "Balcony",
];

const STREETS: [&str; 6] = [
    "Rivoli",
    "la Paix",
    "Vaugirard",
    "Montmartre",
    "Saint-Germain",
    "Raspail",
];

/// Deterministic demo data set: six subjects with 8 to 11 rooms each.
///
/// Anomaly coordinates are pixels in an 800x600 reference frame.
pub fn demo_subjects() -> Vec<Subject> {
    let statuses = [
        SubjectStatus::Completed,
        SubjectStatus::InProgress,
        SubjectStatus::ToVerify,
    ];

    (0..6u32)
        .map(|i| {
            let entry_month = i % 12 + 1;
            let exit_month = (i + 6) % 12 + 1;
            Subject {
                id: SubjectId(i + 1),
                address: format!(
                    "{} rue de {}, 750{}{} Paris",
                    10 + i,
                    STREETS[i as usize % STREETS.len()],
                    i % 9 + 1,
                    i % 2
                ),
                entry_date: date(2024, entry_month, 1),
                exit_date: date(2024, exit_month, 15),
                conformity_score: (60 + (i * 7) % 40) as u8,
                status: statuses[i as usize % statuses.len()],
                pairs: demo_pairs(i, 8 + (i as usize * 3) % 4),
            }
        })
        .collect()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn demo_pairs(seed: u32, count: usize) -> Vec<Pair> {
    let preset = [
        Classification::Compliant,
        Classification::ToVerify,
        Classification::NonCompliant,
    ];

    ROOMS
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, room)| {
            let n = i as u32;
            let mix = seed * 31 + n * 17;
            Pair {
                id: PairId(n + 1),
                room: room.to_string(),
                before: format!("https://images.example.com/entry/{}-{}.jpg", seed + 1, n + 1),
                after: format!("https://images.example.com/exit/{}-{}.jpg", seed + 1, n + 1),
                score: (60 + mix % 40) as u8,
                status: preset.get(i).copied(),
                anomalies: demo_anomalies(mix, (mix % 4) as usize),
                quality: QualityBadges {
                    sharpness: (3 + mix % 2) as u8,
                    lighting: (2 + mix % 3) as u8,
                    angle: (4 + mix % 2) as u8,
                },
                note: None,
            }
        })
        .collect()
}

fn demo_anomalies(mix: u32, count: usize) -> Vec<Anomaly> {
    let kinds = [
        ("scratch", "Scratch on the parquet floor", Severity::Medium),
        ("stain", "Stain on the wall", Severity::Low),
        ("broken", "Broken door handle", Severity::High),
        ("dirt", "Dirt marks", Severity::Low),
    ];

    kinds
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, (kind, description, severity))| {
            let offset = (mix + i as u32 * 97) as f32;
            let x = 100.0 + (offset * 13.0) % 600.0;
            let y = 100.0 + (offset * 7.0) % 400.0;
            Anomaly {
                id: AnomalyId(i as u32 + 1),
                kind: kind.to_string(),
                location: Point2::new(x, y),
                outline: Some(vec![
                    Point2::new(x - 20.0, y - 15.0),
                    Point2::new(x + 25.0, y - 5.0),
                    Point2::new(x + 10.0, y + 25.0),
                ]),
                severity: *severity,
                description: description.to_string(),
                thumbnail: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::subject_with_pairs;
    use std::io::Write;

    #[test]
    fn test_demo_subjects_are_valid() {
        let subjects = demo_subjects();
        assert_eq!(subjects.len(), 6);

        for subject in &subjects {
            validate(subject).unwrap();
            assert!((8..=11).contains(&subject.pairs.len()));
            assert_eq!(subject.classified_count(), 3);
        }
    }

    #[test]
    fn test_demo_subjects_are_deterministic() {
        assert_eq!(demo_subjects(), demo_subjects());
    }

    #[test]
    fn test_load_round_trips_through_file() {
        let subjects = vec![subject_with_pairs(7, 2)];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&subjects).unwrap().as_bytes())
            .unwrap();

        let loaded = load_subjects(file.path()).unwrap();

        assert_eq!(loaded, subjects);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_subjects(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[{ \"id\": 1 ").unwrap();

        let err = load_subjects(file.path()).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[test]
    fn test_duplicate_pair_ids_rejected() {
        let mut subject = subject_with_pairs(1, 2);
        subject.pairs[1].id = PairId(1);

        let err = validate(&subject).unwrap_err();
        assert!(err.to_string().contains("duplicate pair id 1"));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let mut subject = subject_with_pairs(1, 1);
        subject.pairs[0].quality.lighting = 9;
        assert!(validate(&subject).is_err());

        let mut subject = subject_with_pairs(1, 1);
        subject.conformity_score = 120;
        assert!(validate(&subject).is_err());
    }
}
