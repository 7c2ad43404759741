use std::collections::BTreeMap;

use tracing::{debug, info};

use super::data::{Classification, PairId, Subject, SubjectId};

/// The InspectionStore owns every subject under inspection
/// and remembers which one is currently active.
///
/// The active subject is kept as an id into the canonical map, so
/// a classification only ever touches one copy of the subject.
#[derive(Debug, Default)]
pub struct InspectionStore {
    subjects: BTreeMap<SubjectId, Subject>,
    active: Option<SubjectId>,
}

impl InspectionStore {
    /// Create a store from a one-shot data source load.
    /// Later subjects with a duplicate id replace earlier ones.
    pub fn new(subjects: Vec<Subject>) -> Self {
        let subjects: BTreeMap<_, _> = subjects
            .into_iter()
            .map(|subject| (subject.id, subject))
            .collect();

        info!(count = subjects.len(), "inspection store loaded");

        Self {
            subjects,
            active: None,
        }
    }

    /// All subjects, ordered by id
    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn get(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.get(&id)
    }

    /// The currently selected subject, if any
    pub fn active(&self) -> Option<&Subject> {
        self.active.and_then(|id| self.subjects.get(&id))
    }

    /// Make `id` the active subject.
    ///
    /// An unknown id leaves the current selection untouched and
    /// returns `None`; callers must check.
    pub fn select_subject(&mut self, id: SubjectId) -> Option<&Subject> {
        if !self.subjects.contains_key(&id) {
            debug!(%id, "select_subject: unknown subject");
            return None;
        }

        self.active = Some(id);
        self.subjects.get(&id)
    }

    /// Select the first subject when nothing is active yet
    pub fn select_first(&mut self) -> Option<&Subject> {
        let first = *self.subjects.keys().next()?;
        self.select_subject(first)
    }

    /// Record a classification for one pair of the active subject.
    ///
    /// Status and note are overwritten (last write wins). Returns `false`
    /// without touching anything when there is no active subject or the
    /// pair does not belong to it.
    pub fn apply_classification(
        &mut self,
        pair_id: PairId,
        status: Classification,
        note: Option<String>,
    ) -> bool {
        let Some(active) = self.active else {
            debug!(%pair_id, "apply_classification: no active subject");
            return false;
        };

        let Some(pair) = self
            .subjects
            .get_mut(&active)
            .and_then(|subject| subject.pairs.iter_mut().find(|pair| pair.id == pair_id))
        else {
            debug!(%pair_id, subject = %active, "apply_classification: pair not in active subject");
            return false;
        };

        pair.status = Some(status);
        pair.note = note;

        info!(subject = %active, %pair_id, %status, "pair classified");
        true
    }
}
