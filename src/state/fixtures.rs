//! Small hand-built subjects for unit tests

use chrono::NaiveDate;

use super::data::{
    Anomaly, AnomalyId, Pair, PairId, Point2, QualityBadges, Severity, Subject, SubjectId,
    SubjectStatus,
};

pub fn pair(id: u32) -> Pair {
    Pair {
        id: PairId(id),
        room: format!("Room {id}"),
        before: format!("before/{id}.jpg"),
        after: format!("after/{id}.jpg"),
        score: 75,
        status: None,
        anomalies: Vec::new(),
        quality: QualityBadges {
            sharpness: 4,
            lighting: 3,
            angle: 5,
        },
        note: None,
    }
}

/// A subject with pairs numbered `1..=pair_count`, none classified
pub fn subject_with_pairs(id: u32, pair_count: u32) -> Subject {
    Subject {
        id: SubjectId(id),
        address: format!("{id} Test Street"),
        entry_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        exit_date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
        conformity_score: 80,
        status: SubjectStatus::InProgress,
        pairs: (1..=pair_count).map(pair).collect(),
    }
}

pub fn anomaly(id: u32, x: f32, y: f32, outline: Option<Vec<Point2>>) -> Anomaly {
    Anomaly {
        id: AnomalyId(id),
        kind: "stain".to_string(),
        location: Point2::new(x, y),
        outline,
        severity: Severity::Medium,
        description: "Stain on the wall".to_string(),
        thumbnail: None,
    }
}
