/// Navigation and classification workflow over one subject's pairs
///
/// The session is a cursor over the active subject's pair sequence plus
/// transient UI state for the pair under the cursor. Classifying a pair
/// (other than the last one) hands out an `AdvanceTicket`; the UI fires it
/// back after a short delay and the session moves on, unless the cursor
/// was moved in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::data::{Classification, Pair, PairId, Subject, SubjectId};
use super::notify::{Level, Notifier, OP_CLASSIFY};
use super::store::InspectionStore;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Token for one pending auto-advance of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    session: u64,
    seq: u64,
}

/// Per-pair transient state, reset whenever the cursor moves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCursor {
    pub index: usize,
    pub draft_note: String,
    pub show_heatmap: bool,
    pub show_contours: bool,
}

#[derive(Debug)]
pub struct ComparisonSession {
    id: u64,
    subject: SubjectId,
    len: usize,
    cursor: SessionCursor,
    pending: Option<AdvanceTicket>,
    issued: u64,
}

impl ComparisonSession {
    /// Start a session over `subject`.
    ///
    /// Returns `None` for a subject without pairs (nothing to compare).
    /// A deep-linked pair that belongs to the subject becomes the starting
    /// position; anything else starts at the first pair.
    pub fn start(subject: &Subject, deep_link: Option<PairId>) -> Option<Self> {
        if subject.pairs.is_empty() {
            debug!(subject = %subject.id, "no pairs to compare");
            return None;
        }

        let index = deep_link
            .and_then(|pair_id| subject.pair_index(pair_id))
            .unwrap_or(0);

        Some(Self {
            id: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            subject: subject.id,
            len: subject.pairs.len(),
            cursor: SessionCursor {
                index,
                ..SessionCursor::default()
            },
            pending: None,
            issued: 0,
        })
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject
    }

    pub fn cursor(&self) -> &SessionCursor {
        &self.cursor
    }

    pub fn index(&self) -> usize {
        self.cursor.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn can_go_previous(&self) -> bool {
        self.cursor.index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.cursor.index + 1 < self.len
    }

    pub fn has_pending_advance(&self) -> bool {
        self.pending.is_some()
    }

    /// The pair under the cursor, read from the store's active subject
    pub fn current_pair<'a>(&self, store: &'a InspectionStore) -> Option<&'a Pair> {
        store
            .active()
            .filter(|subject| subject.id == self.subject)
            .and_then(|subject| subject.pairs.get(self.cursor.index))
    }

    pub fn go_previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.move_to(self.cursor.index - 1);
        true
    }

    pub fn go_next(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.move_to(self.cursor.index + 1);
        true
    }

    fn move_to(&mut self, index: usize) {
        if self.pending.take().is_some() {
            debug!(session = self.id, "pending auto-advance cancelled");
        }
        self.cursor = SessionCursor {
            index,
            ..SessionCursor::default()
        };
    }

    pub fn set_draft_note(&mut self, note: String) {
        self.cursor.draft_note = note;
    }

    pub fn toggle_heatmap(&mut self) {
        self.cursor.show_heatmap = !self.cursor.show_heatmap;
    }

    pub fn toggle_contours(&mut self) {
        self.cursor.show_contours = !self.cursor.show_contours;
    }

    /// Commit `status` (and the draft note) for the pair under the cursor.
    ///
    /// Returns a ticket to fire after the auto-advance delay, or `None` on
    /// the last pair or when there is no pair to classify. A new ticket
    /// supersedes any earlier pending one.
    pub fn classify(
        &mut self,
        store: &mut InspectionStore,
        status: Classification,
        notifier: &mut impl Notifier,
    ) -> Option<AdvanceTicket> {
        let (pair_id, room) = match self.current_pair(store) {
            Some(pair) => (pair.id, pair.room.clone()),
            None => {
                debug!(session = self.id, "classify: no active pair");
                return None;
            }
        };

        let draft = &self.cursor.draft_note;
        let note = (!draft.trim().is_empty()).then(|| draft.clone());

        if !store.apply_classification(pair_id, status, note) {
            return None;
        }

        notifier.notify(OP_CLASSIFY, Level::Success, format!("{room} marked as {status}"));

        if !self.can_go_next() {
            return None;
        }

        self.issued += 1;
        let ticket = AdvanceTicket {
            session: self.id,
            seq: self.issued,
        };
        self.pending = Some(ticket);
        Some(ticket)
    }

    /// Fire a previously issued ticket.
    ///
    /// Only the pending ticket of this session advances the cursor; stale,
    /// superseded, cancelled or foreign tickets are ignored.
    pub fn fire_auto_advance(&mut self, ticket: AdvanceTicket) -> bool {
        if self.pending != Some(ticket) {
            debug!(session = self.id, ?ticket, "ignoring stale auto-advance");
            return false;
        }
        self.pending = None;
        self.go_next()
    }

    /// Cancel anything still scheduled before the session goes away
    pub fn teardown(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::subject_with_pairs;
    use crate::state::notify::NotificationCenter;

    fn setup(pairs: u32) -> (InspectionStore, ComparisonSession) {
        let mut store = InspectionStore::new(vec![subject_with_pairs(1, pairs)]);
        let subject = store.select_subject(SubjectId(1)).unwrap();
        let session = ComparisonSession::start(subject, None).unwrap();
        (store, session)
    }

    fn status_of(store: &InspectionStore, index: usize) -> Option<Classification> {
        store.active().unwrap().pairs[index].status
    }

    #[test]
    fn test_empty_subject_cannot_start() {
        let subject = subject_with_pairs(1, 0);
        assert!(ComparisonSession::start(&subject, None).is_none());
    }

    #[test]
    fn test_deep_link_sets_cursor() {
        let subject = subject_with_pairs(1, 4);

        let linked = ComparisonSession::start(&subject, Some(PairId(3))).unwrap();
        assert_eq!(linked.index(), 2);

        let unresolved = ComparisonSession::start(&subject, Some(PairId(99))).unwrap();
        assert_eq!(unresolved.index(), 0);
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let (_store, mut session) = setup(3);

        assert!(!session.go_previous());
        assert_eq!(session.index(), 0);

        assert!(session.go_next());
        assert!(session.go_next());
        assert!(!session.go_next());
        assert_eq!(session.index(), 2);

        assert!(session.go_previous());
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_moving_resets_transient_state() {
        let (_store, mut session) = setup(3);
        session.set_draft_note("Scuff near the door".into());
        session.toggle_heatmap();
        session.toggle_contours();

        session.go_next();

        assert_eq!(
            session.cursor(),
            &SessionCursor {
                index: 1,
                ..SessionCursor::default()
            }
        );
    }

    #[test]
    fn test_toggles_are_independent() {
        let (_store, mut session) = setup(2);
        session.toggle_heatmap();
        assert!(session.cursor().show_heatmap);
        assert!(!session.cursor().show_contours);

        session.toggle_heatmap();
        session.toggle_contours();
        assert!(!session.cursor().show_heatmap);
        assert!(session.cursor().show_contours);
    }

    #[test]
    fn test_classify_then_auto_advance() {
        let (mut store, mut session) = setup(3);
        let mut notes = NotificationCenter::default();

        let ticket = session
            .classify(&mut store, Classification::Compliant, &mut notes)
            .expect("ticket for non-last pair");

        assert_eq!(status_of(&store, 0), Some(Classification::Compliant));
        assert_eq!(session.index(), 0);
        assert_eq!(
            notes.latest().map(|n| n.message.as_str()),
            Some("Room 1 marked as compliant")
        );

        assert!(session.fire_auto_advance(ticket));
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_classify_records_draft_note() {
        let (mut store, mut session) = setup(3);
        let mut notes = NotificationCenter::default();
        session.set_draft_note("Hole in the plaster".into());

        let ticket = session
            .classify(&mut store, Classification::NonCompliant, &mut notes)
            .unwrap();

        let pair = &store.active().unwrap().pairs[0];
        assert_eq!(pair.note.as_deref(), Some("Hole in the plaster"));

        // Draft survives until the cursor moves
        assert_eq!(session.cursor().draft_note, "Hole in the plaster");
        session.fire_auto_advance(ticket);
        assert!(session.cursor().draft_note.is_empty());
    }

    #[test]
    fn test_blank_draft_commits_no_note() {
        let (mut store, mut session) = setup(2);
        let mut notes = NotificationCenter::default();
        session.set_draft_note("   ".into());

        session.classify(&mut store, Classification::ToVerify, &mut notes);

        assert!(store.active().unwrap().pairs[0].note.is_none());
    }

    #[test]
    fn test_draft_note_committed_as_typed() {
        let (mut store, mut session) = setup(2);
        let mut notes = NotificationCenter::default();
        session.set_draft_note("  Hole in the plaster ".into());

        session.classify(&mut store, Classification::NonCompliant, &mut notes);

        let pair = &store.active().unwrap().pairs[0];
        assert_eq!(pair.note.as_deref(), Some("  Hole in the plaster "));
        assert_eq!(pair.note.as_deref(), Some(session.cursor().draft_note.as_str()));
    }

    #[test]
    fn test_last_pair_does_not_schedule_advance() {
        let (mut store, mut session) = setup(2);
        let mut notes = NotificationCenter::default();
        session.go_next();

        let ticket = session.classify(&mut store, Classification::Compliant, &mut notes);

        assert!(ticket.is_none());
        assert_eq!(status_of(&store, 1), Some(Classification::Compliant));
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_manual_move_cancels_pending_advance() {
        let (mut store, mut session) = setup(3);
        let mut notes = NotificationCenter::default();

        let ticket = session
            .classify(&mut store, Classification::Compliant, &mut notes)
            .unwrap();
        session.go_next();
        assert_eq!(session.index(), 1);

        // The delayed advance must not push the cursor to 2
        assert!(!session.fire_auto_advance(ticket));
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_previous_then_classify_targets_new_cursor() {
        let (mut store, mut session) = setup(3);
        let mut notes = NotificationCenter::default();
        session.go_next();

        session.go_previous();
        session.classify(&mut store, Classification::NonCompliant, &mut notes);

        assert_eq!(status_of(&store, 0), Some(Classification::NonCompliant));
        assert_eq!(status_of(&store, 1), None);
    }

    #[test]
    fn test_rapid_reclassification_advances_once() {
        let (mut store, mut session) = setup(3);
        let mut notes = NotificationCenter::default();

        let first = session
            .classify(&mut store, Classification::ToVerify, &mut notes)
            .unwrap();
        let second = session
            .classify(&mut store, Classification::Compliant, &mut notes)
            .unwrap();

        assert_eq!(status_of(&store, 0), Some(Classification::Compliant));

        // Superseded ticket is ignored, the latest one advances exactly once
        assert!(!session.fire_auto_advance(first));
        assert!(session.fire_auto_advance(second));
        assert!(!session.fire_auto_advance(second));
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_teardown_drops_pending_ticket() {
        let (mut store, mut session) = setup(3);
        let mut notes = NotificationCenter::default();

        let ticket = session
            .classify(&mut store, Classification::Compliant, &mut notes)
            .unwrap();
        session.teardown();

        assert!(!session.has_pending_advance());
        assert!(!session.fire_auto_advance(ticket));
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn test_ticket_from_other_session_is_ignored() {
        let (mut store, mut old) = setup(3);
        let mut notes = NotificationCenter::default();
        let ticket = old
            .classify(&mut store, Classification::Compliant, &mut notes)
            .unwrap();

        let subject = store.active().unwrap();
        let mut fresh = ComparisonSession::start(subject, None).unwrap();

        assert!(!fresh.fire_auto_advance(ticket));
        assert_eq!(fresh.index(), 0);
    }

    #[test]
    fn test_classify_without_matching_active_subject_is_noop() {
        let mut store =
            InspectionStore::new(vec![subject_with_pairs(1, 2), subject_with_pairs(2, 2)]);
        let subject = store.select_subject(SubjectId(1)).unwrap();
        let mut session = ComparisonSession::start(subject, None).unwrap();
        let mut notes = NotificationCenter::default();

        store.select_subject(SubjectId(2));
        let ticket = session.classify(&mut store, Classification::Compliant, &mut notes);

        assert!(ticket.is_none());
        assert!(store.subjects().all(|s| s.classified_count() == 0));
        assert!(notes.latest().is_none());
    }
}
