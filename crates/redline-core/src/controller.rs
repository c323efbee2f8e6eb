//! Lifecycle of diff sessions.
//!
//! The [`DiffController`] owns every open session, mounts their fragments
//! into an [`EditableSurface`], and resolves them when the user accepts a
//! suggestion, rejects them all, or closes the diff. The surface is handed
//! in on each call; the controller keeps no reference to it.
//!
//! Sessions live in an arena keyed by [`DiffId`]. Starting a new diff makes
//! it the active one, but older fragments stay mounted and can still be
//! resolved by id.

use std::collections::HashMap;
use std::fmt;

use crate::anchor::{SavedSelection, DEFAULT_CONTEXT_CHARS};
use crate::fragment::{self, DiffAction, DiffFragment, DiffId, SuggestionId};
use crate::suggest::{self, Suggestion};
use crate::surface::EditableSurface;

/// Tunables for diff presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Chars of context captured on each side of a selection.
    pub context_chars: usize,
    /// Whether fragments carry accept/reject/close affordances.
    pub show_actions: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
            show_actions: true,
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffState {
    Idle,
    /// A diff is open; the id is the most recently created session.
    Active(DiffId),
}

/// One proposed rewrite of a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSession {
    pub diff_id: DiffId,
    pub original_text: String,
    pub suggestions: Vec<Suggestion>,
    /// Where the span was selected; `None` for sessions created without a
    /// surface.
    pub saved_selection: Option<SavedSelection>,
}

type AcceptFn = Box<dyn FnMut(&str, &DiffId)>;
type ResolveFn = Box<dyn FnMut(&DiffId)>;

/// Observers notified when a session ends. Each fires at most once per
/// session; `reset` fires none.
#[derive(Default)]
pub struct DiffCallbacks {
    on_accept: Option<AcceptFn>,
    on_reject: Option<ResolveFn>,
    on_close: Option<ResolveFn>,
}

impl fmt::Debug for DiffCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffCallbacks")
            .field("on_accept", &self.on_accept.is_some())
            .field("on_reject", &self.on_reject.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// Result of routing a [`DiffAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The suggestion text that replaced the original.
    Accepted(String),
    Rejected,
    Closed,
    /// Unknown or already finalized session, or an out-of-range suggestion.
    Ignored,
}

/// Which callback a finalized session reports to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Reject,
    Close,
}

/// Creates, mounts and resolves diff sessions.
#[derive(Debug, Default)]
pub struct DiffController {
    sessions: HashMap<DiffId, DiffSession>,
    active: Option<DiffId>,
    options: DiffOptions,
    callbacks: DiffCallbacks,
}

impl DiffController {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Registers the accept observer, called with the chosen text.
    pub fn on_accept(mut self, f: impl FnMut(&str, &DiffId) + 'static) -> Self {
        self.callbacks.on_accept = Some(Box::new(f));
        self
    }

    /// Registers the reject observer.
    pub fn on_reject(mut self, f: impl FnMut(&DiffId) + 'static) -> Self {
        self.callbacks.on_reject = Some(Box::new(f));
        self
    }

    /// Registers the close observer.
    pub fn on_close(mut self, f: impl FnMut(&DiffId) + 'static) -> Self {
        self.callbacks.on_close = Some(Box::new(f));
        self
    }

    pub fn options(&self) -> DiffOptions {
        self.options
    }

    pub fn state(&self) -> DiffState {
        match &self.active {
            Some(id) => DiffState::Active(id.clone()),
            None => DiffState::Idle,
        }
    }

    /// Id of the most recently created, still open session.
    pub fn active_id(&self) -> Option<&DiffId> {
        self.active.as_ref()
    }

    pub fn session(&self, id: &DiffId) -> Option<&DiffSession> {
        self.sessions.get(id)
    }

    /// Number of open sessions, mounted or detached.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Presentation of an open session.
    pub fn fragment(&self, id: &DiffId) -> Option<DiffFragment> {
        let session = self.sessions.get(id)?;
        Some(fragment::build(
            &session.diff_id,
            &session.original_text,
            &session.suggestions,
            self.options.show_actions,
        ))
    }

    /// Opens a session proposing `ai_text` as a rewrite of `original`.
    ///
    /// Returns `None` if the response holds no suggestions.
    pub fn create_diff(&mut self, original: &str, ai_text: &str) -> Option<DiffId> {
        let suggestions = suggest::parse_response(ai_text);
        if suggestions.is_empty() {
            tracing::warn!("AI response contained no suggestions; no diff created");
            return None;
        }

        let diff_id = DiffId::generate();
        tracing::debug!(diff_id = %diff_id, count = suggestions.len(), "diff session created");
        self.sessions.insert(
            diff_id.clone(),
            DiffSession {
                diff_id: diff_id.clone(),
                original_text: original.to_string(),
                suggestions,
                saved_selection: None,
            },
        );
        self.active = Some(diff_id.clone());
        Some(diff_id)
    }

    /// Replaces the current selection of `surface` with a diff fragment.
    ///
    /// Returns `None` without touching the surface if nothing is selected,
    /// the response is empty, or the span cannot be mounted.
    pub fn insert_diff_at_selection<S: EditableSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        ai_text: &str,
    ) -> Option<DiffId> {
        let Some(saved) = SavedSelection::save(surface, self.options.context_chars) else {
            tracing::warn!("No selection to propose a rewrite for");
            return None;
        };
        self.insert_diff_at_anchor(surface, &saved, ai_text)
    }

    /// Like [`insert_diff_at_selection`](Self::insert_diff_at_selection),
    /// for a selection captured earlier, e.g. before awaiting the AI.
    ///
    /// If the span cannot be found any more the session is still kept,
    /// detached, as the active one; [`reattach`](Self::reattach) retries.
    pub fn insert_diff_at_anchor<S: EditableSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        saved: &SavedSelection,
        ai_text: &str,
    ) -> Option<DiffId> {
        let diff_id = self.create_diff(&saved.text, ai_text)?;
        if let Some(session) = self.sessions.get_mut(&diff_id) {
            session.saved_selection = Some(saved.clone());
        }
        self.mount(surface, &diff_id).then_some(diff_id)
    }

    /// Retries mounting a detached session.
    ///
    /// Returns true if the fragment is mounted afterwards.
    pub fn reattach<S: EditableSurface + ?Sized>(&mut self, surface: &mut S, id: &DiffId) -> bool {
        if !self.sessions.contains_key(id) {
            tracing::debug!(diff_id = %id, "reattach ignored for unknown diff");
            return false;
        }
        if surface.fragment_range(id).is_some() {
            return true;
        }
        self.mount(surface, id)
    }

    fn mount<S: EditableSurface + ?Sized>(&self, surface: &mut S, id: &DiffId) -> bool {
        let Some(session) = self.sessions.get(id) else {
            return false;
        };
        let Some(saved) = &session.saved_selection else {
            tracing::warn!(diff_id = %id, "diff has no anchor to mount at");
            return false;
        };
        let Some(range) = saved.locate_in(&surface.content()) else {
            tracing::warn!(diff_id = %id, "selected text no longer found; diff left detached");
            return false;
        };

        let rendered = fragment::build(
            id,
            &session.original_text,
            &session.suggestions,
            self.options.show_actions,
        )
        .to_string();
        match surface.mount_fragment(range, id, &rendered) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(diff_id = %id, "Failed to mount diff fragment: {e}");
                false
            }
        }
    }

    /// Resolves a session with one of its suggestions.
    ///
    /// Returns the chosen text, or `None` for an unknown session or
    /// suggestion, in which case nothing changes. A session whose fragment
    /// is not mounted also returns `None` and stays open until it is
    /// reattached.
    pub fn accept_suggestion<S: EditableSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: &DiffId,
        suggestion_id: SuggestionId,
    ) -> Option<String> {
        let Some(session) = self.sessions.get(id) else {
            tracing::debug!(diff_id = %id, "accept ignored for unknown diff");
            return None;
        };
        let Some(text) = session.suggestions.get(suggestion_id.0).cloned() else {
            tracing::debug!(
                diff_id = %id,
                suggestion = suggestion_id.display_number(),
                "accept ignored for unknown suggestion"
            );
            return None;
        };

        self.settle(surface, id, &text)?;
        if let Some(cb) = self.callbacks.on_accept.as_mut() {
            cb(&text, id);
        }
        Some(text)
    }

    /// Restores the original text as an explicit rejection.
    ///
    /// Returns false if the session is unknown, already finalized, or its
    /// fragment is not mounted.
    pub fn reject_all<S: EditableSurface + ?Sized>(&mut self, surface: &mut S, id: &DiffId) -> bool {
        self.restore_original(surface, id, Resolution::Reject)
    }

    /// Restores the original text without judgment.
    ///
    /// Returns false if the session is unknown, already finalized, or its
    /// fragment is not mounted.
    pub fn close_diff<S: EditableSurface + ?Sized>(&mut self, surface: &mut S, id: &DiffId) -> bool {
        self.restore_original(surface, id, Resolution::Close)
    }

    /// Restores the original text of every open session and returns to
    /// idle. No observers are notified.
    pub fn reset<S: EditableSurface + ?Sized>(&mut self, surface: &mut S) {
        let mut sessions: Vec<DiffSession> = self.sessions.drain().map(|(_, s)| s).collect();
        sessions.sort_by(|a, b| a.diff_id.cmp(&b.diff_id));
        for session in &sessions {
            if let Err(e) = surface.unmount_fragment(&session.diff_id, &session.original_text) {
                tracing::warn!(diff_id = %session.diff_id, "Failed to restore diff fragment: {e}");
            }
        }
        if !sessions.is_empty() {
            tracing::debug!(count = sessions.len(), "diff sessions reset");
        }
        self.active = None;
    }

    /// Routes a user action to its session.
    pub fn dispatch<S: EditableSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: &DiffId,
        action: DiffAction,
    ) -> DispatchOutcome {
        if !self.sessions.contains_key(id) {
            tracing::debug!(diff_id = %id, ?action, "action ignored for unknown or finalized diff");
            return DispatchOutcome::Ignored;
        }
        match action {
            DiffAction::Accept(suggestion_id) => self
                .accept_suggestion(surface, id, suggestion_id)
                .map_or(DispatchOutcome::Ignored, DispatchOutcome::Accepted),
            DiffAction::Reject if self.reject_all(surface, id) => DispatchOutcome::Rejected,
            DiffAction::Close if self.close_diff(surface, id) => DispatchOutcome::Closed,
            DiffAction::Reject | DiffAction::Close => DispatchOutcome::Ignored,
        }
    }

    fn restore_original<S: EditableSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: &DiffId,
        resolution: Resolution,
    ) -> bool {
        let Some(original) = self.sessions.get(id).map(|s| s.original_text.clone()) else {
            tracing::debug!(diff_id = %id, ?resolution, "ignored for unknown or finalized diff");
            return false;
        };
        if self.settle(surface, id, &original).is_none() {
            return false;
        }

        let cb = match resolution {
            Resolution::Reject => self.callbacks.on_reject.as_mut(),
            Resolution::Close => self.callbacks.on_close.as_mut(),
        };
        if let Some(cb) = cb {
            cb(id);
        }
        true
    }

    /// Removes a session from the arena, leaving idle if it was active.
    fn finish(&mut self, id: &DiffId) -> Option<DiffSession> {
        let session = self.sessions.remove(id)?;
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        Some(session)
    }

    /// Swaps a session's fragment for `text` and removes the session.
    ///
    /// An anchored session whose fragment is not mounted, or cannot be
    /// replaced, stays open and `None` is returned. Sessions created
    /// without a surface finalize without touching it.
    fn settle<S: EditableSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        id: &DiffId,
        text: &str,
    ) -> Option<DiffSession> {
        if self.sessions.get(id)?.saved_selection.is_some() {
            match surface.unmount_fragment(id, text) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(diff_id = %id, "diff fragment not in the surface; reattach before resolving");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(diff_id = %id, "Failed to replace diff fragment: {e}");
                    return None;
                }
            }
        }
        self.finish(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::document::Document;
    use crate::surface::TextRange;

    const TWO_OPTIONS: &str = "1. The cat sat quietly.\n2. The cat rested.";

    #[derive(Default)]
    struct Recorder {
        accepted: Vec<(String, DiffId)>,
        rejected: Vec<DiffId>,
        closed: Vec<DiffId>,
    }

    fn recording_controller() -> (DiffController, Rc<RefCell<Recorder>>) {
        let rec = Rc::new(RefCell::new(Recorder::default()));
        let (a, r, c) = (Rc::clone(&rec), Rc::clone(&rec), Rc::clone(&rec));
        let controller = DiffController::new(DiffOptions::default())
            .on_accept(move |text, id| a.borrow_mut().accepted.push((text.to_string(), id.clone())))
            .on_reject(move |id| r.borrow_mut().rejected.push(id.clone()))
            .on_close(move |id| c.borrow_mut().closed.push(id.clone()));
        (controller, rec)
    }

    fn selected(text: &str, range: TextRange) -> Document {
        let mut doc = Document::from(text);
        doc.select_range(range).unwrap();
        doc
    }

    #[test]
    fn test_end_to_end_accept() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("The cat sat.", TextRange::new(0, 12));

        let id = ctl.insert_diff_at_selection(&mut doc, TWO_OPTIONS).unwrap();
        assert_eq!(ctl.state(), DiffState::Active(id.clone()));
        assert_eq!(
            doc.text(),
            "~~The cat sat.~~\n[1] The cat sat quietly.\n[2] The cat rested.\n\
             [accept 1] [accept 2] [reject] [close]"
        );

        let chosen = ctl.accept_suggestion(&mut doc, &id, SuggestionId(1));
        assert_eq!(chosen.as_deref(), Some("The cat rested."));
        assert_eq!(doc.text(), "The cat rested.");
        assert_eq!(ctl.state(), DiffState::Idle);
        assert_eq!(ctl.session_count(), 0);

        let rec = rec.borrow();
        assert_eq!(rec.accepted, vec![("The cat rested.".to_string(), id)]);
        assert!(rec.rejected.is_empty());
        assert!(rec.closed.is_empty());
    }

    #[test]
    fn test_create_diff_empty_response() {
        let mut ctl = DiffController::default();
        assert!(ctl.create_diff("x", "  \n ").is_none());
        assert_eq!(ctl.state(), DiffState::Idle);
        assert_eq!(ctl.session_count(), 0);
    }

    #[test]
    fn test_create_diff_without_surface() {
        let mut ctl = DiffController::default();
        let id = ctl.create_diff("old", TWO_OPTIONS).unwrap();
        let session = ctl.session(&id).unwrap();
        assert_eq!(session.original_text, "old");
        assert_eq!(session.suggestions.len(), 2);
        assert!(session.saved_selection.is_none());

        let fragment = ctl.fragment(&id).unwrap();
        assert_eq!(fragment.blocks.len(), 2);
        assert_eq!(fragment.actions.len(), 4);
    }

    #[test]
    fn test_no_selection_leaves_surface_alone() {
        let mut ctl = DiffController::default();
        let mut doc = Document::from("nothing selected");
        assert!(ctl.insert_diff_at_selection(&mut doc, TWO_OPTIONS).is_none());
        assert_eq!(doc.text(), "nothing selected");
        assert_eq!(ctl.state(), DiffState::Idle);
        assert_eq!(ctl.session_count(), 0);
    }

    #[test]
    fn test_reject_is_idempotent() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("Keep. Old. Keep.", TextRange::new(6, 10));
        let id = ctl.insert_diff_at_selection(&mut doc, "New.").unwrap();
        assert_ne!(doc.text(), "Keep. Old. Keep.");

        assert!(ctl.reject_all(&mut doc, &id));
        assert_eq!(doc.text(), "Keep. Old. Keep.");
        assert!(!ctl.reject_all(&mut doc, &id));
        assert!(!ctl.close_diff(&mut doc, &id));
        assert!(ctl.accept_suggestion(&mut doc, &id, SuggestionId(0)).is_none());
        assert_eq!(doc.text(), "Keep. Old. Keep.");
        assert_eq!(rec.borrow().rejected, vec![id]);
        assert!(rec.borrow().closed.is_empty());
        assert!(rec.borrow().accepted.is_empty());
    }

    #[test]
    fn test_close_restores_original() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("a b c", TextRange::new(2, 3));
        let id = ctl.insert_diff_at_selection(&mut doc, "B").unwrap();
        assert!(ctl.close_diff(&mut doc, &id));
        assert_eq!(doc.text(), "a b c");
        assert_eq!(rec.borrow().closed, vec![id]);
    }

    #[test]
    fn test_unknown_suggestion_keeps_session() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("The cat sat.", TextRange::new(0, 12));
        let id = ctl.insert_diff_at_selection(&mut doc, TWO_OPTIONS).unwrap();
        let mounted = doc.text();

        assert!(ctl.accept_suggestion(&mut doc, &id, SuggestionId(5)).is_none());
        assert_eq!(doc.text(), mounted);
        assert_eq!(ctl.state(), DiffState::Active(id));
        assert!(rec.borrow().accepted.is_empty());
    }

    #[test]
    fn test_hidden_actions() {
        let mut ctl = DiffController::new(DiffOptions {
            show_actions: false,
            ..DiffOptions::default()
        });
        let mut doc = selected("The cat sat.", TextRange::new(0, 12));
        ctl.insert_diff_at_selection(&mut doc, TWO_OPTIONS).unwrap();
        assert_eq!(
            doc.text(),
            "~~The cat sat.~~\n[1] The cat sat quietly.\n[2] The cat rested."
        );
    }

    #[test]
    fn test_relocation_failure_then_reattach() {
        let mut ctl = DiffController::default();
        let mut doc = selected("alpha beta gamma", TextRange::new(6, 10));
        let saved = SavedSelection::save(&doc, 10).unwrap();

        doc.set_content("alpha gamma");
        assert!(ctl.insert_diff_at_anchor(&mut doc, &saved, "BETA").is_none());
        assert_eq!(doc.text(), "alpha gamma");
        let id = ctl.active_id().cloned().unwrap();
        assert_eq!(ctl.session_count(), 1);
        assert!(!ctl.reattach(&mut doc, &id));

        doc.set_content("alpha beta gamma");
        assert!(ctl.reattach(&mut doc, &id));
        assert_eq!(doc.mounted_fragments(), 1);
        assert!(ctl.reattach(&mut doc, &id));
        assert_eq!(doc.mounted_fragments(), 1);

        assert_eq!(
            ctl.accept_suggestion(&mut doc, &id, SuggestionId(0)).as_deref(),
            Some("BETA")
        );
        assert_eq!(doc.text(), "alpha BETA gamma");
    }

    #[test]
    fn test_anchor_survives_edit_while_waiting() {
        let mut ctl = DiffController::default();
        let mut doc = selected("Title\nThe cat sat.", TextRange::new(6, 18));
        let saved = SavedSelection::save(&doc, 50).unwrap();

        doc.move_to_char(0);
        doc.insert_text("Draft: ");
        let id = ctl.insert_diff_at_anchor(&mut doc, &saved, TWO_OPTIONS).unwrap();
        ctl.accept_suggestion(&mut doc, &id, SuggestionId(0));
        assert_eq!(doc.text(), "Draft: Title\nThe cat sat quietly.");
    }

    #[test]
    fn test_older_session_stays_addressable() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("First. Second.", TextRange::new(0, 6));
        let a = ctl.insert_diff_at_selection(&mut doc, "Primo.").unwrap();

        let start = doc.text().find("Second.").unwrap();
        doc.select_range(TextRange::new(start, start + 7)).unwrap();
        let b = ctl.insert_diff_at_selection(&mut doc, "Secondo.").unwrap();
        assert_eq!(ctl.state(), DiffState::Active(b.clone()));
        assert_eq!(doc.mounted_fragments(), 2);

        assert_eq!(
            ctl.accept_suggestion(&mut doc, &a, SuggestionId(0)).as_deref(),
            Some("Primo.")
        );
        assert_eq!(ctl.state(), DiffState::Active(b.clone()));
        assert!(ctl.close_diff(&mut doc, &b));
        assert_eq!(doc.text(), "Primo. Second.");
        assert_eq!(ctl.state(), DiffState::Idle);
        assert_eq!(rec.borrow().accepted.len(), 1);
        assert_eq!(rec.borrow().closed, vec![b]);
    }

    #[test]
    fn test_reset_restores_everything_silently() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("one two", TextRange::new(0, 3));
        ctl.insert_diff_at_selection(&mut doc, "1").unwrap();
        let start = doc.text().rfind("two").unwrap();
        doc.select_range(TextRange::new(start, start + 3)).unwrap();
        ctl.insert_diff_at_selection(&mut doc, "2").unwrap();

        ctl.reset(&mut doc);
        assert_eq!(doc.text(), "one two");
        assert_eq!(ctl.state(), DiffState::Idle);
        assert_eq!(ctl.session_count(), 0);
        assert_eq!(doc.mounted_fragments(), 0);
        let rec = rec.borrow();
        assert!(rec.accepted.is_empty() && rec.rejected.is_empty() && rec.closed.is_empty());
    }

    #[test]
    fn test_lost_fragment_keeps_session_until_reattached() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("The cat sat.", TextRange::new(0, 12));
        let id = ctl.insert_diff_at_selection(&mut doc, TWO_OPTIONS).unwrap();

        assert!(doc.undo());
        assert_eq!(doc.text(), "The cat sat.");
        assert_eq!(ctl.accept_suggestion(&mut doc, &id, SuggestionId(0)), None);
        assert!(!ctl.reject_all(&mut doc, &id));
        assert_eq!(doc.text(), "The cat sat.");
        assert_eq!(ctl.session_count(), 1);
        assert_eq!(ctl.state(), DiffState::Active(id.clone()));
        assert!(rec.borrow().accepted.is_empty() && rec.borrow().rejected.is_empty());

        assert!(ctl.reattach(&mut doc, &id));
        assert_eq!(
            ctl.accept_suggestion(&mut doc, &id, SuggestionId(0)).as_deref(),
            Some("The cat sat quietly.")
        );
        assert_eq!(doc.text(), "The cat sat quietly.");
        assert_eq!(rec.borrow().accepted.len(), 1);
        assert_eq!(ctl.session_count(), 0);
    }

    #[test]
    fn test_detached_session_ignores_actions() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("alpha beta gamma", TextRange::new(6, 10));
        let saved = SavedSelection::save(&doc, 10).unwrap();

        doc.set_content("alpha gamma");
        assert!(ctl.insert_diff_at_anchor(&mut doc, &saved, "BETA").is_none());
        let id = ctl.active_id().cloned().unwrap();

        assert_eq!(ctl.accept_suggestion(&mut doc, &id, SuggestionId(0)), None);
        assert_eq!(
            ctl.dispatch(&mut doc, &id, DiffAction::Close),
            DispatchOutcome::Ignored
        );
        assert_eq!(doc.text(), "alpha gamma");
        assert_eq!(ctl.session_count(), 1);
        let rec = rec.borrow();
        assert!(rec.accepted.is_empty() && rec.rejected.is_empty() && rec.closed.is_empty());
    }

    #[test]
    fn test_unanchored_session_finalizes_without_surface() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = Document::from("Untouched.");
        let id = ctl.create_diff("old", TWO_OPTIONS).unwrap();

        assert_eq!(
            ctl.accept_suggestion(&mut doc, &id, SuggestionId(1)).as_deref(),
            Some("The cat rested.")
        );
        assert_eq!(doc.text(), "Untouched.");
        assert_eq!(ctl.session_count(), 0);
        assert_eq!(rec.borrow().accepted.len(), 1);
    }

    #[test]
    fn test_dispatch_routes_and_ignores() {
        let (mut ctl, rec) = recording_controller();
        let mut doc = selected("The cat sat.", TextRange::new(0, 12));
        let id = ctl.insert_diff_at_selection(&mut doc, TWO_OPTIONS).unwrap();

        let stranger = DiffId::from("diff-unknown");
        assert_eq!(
            ctl.dispatch(&mut doc, &stranger, DiffAction::Reject),
            DispatchOutcome::Ignored
        );
        assert_eq!(
            ctl.dispatch(&mut doc, &id, DiffAction::Accept(SuggestionId(9))),
            DispatchOutcome::Ignored
        );
        assert_eq!(
            ctl.dispatch(&mut doc, &id, DiffAction::Accept(SuggestionId(0))),
            DispatchOutcome::Accepted("The cat sat quietly.".to_string())
        );
        assert_eq!(
            ctl.dispatch(&mut doc, &id, DiffAction::Close),
            DispatchOutcome::Ignored
        );
        assert_eq!(doc.text(), "The cat sat quietly.");
        assert_eq!(rec.borrow().accepted.len(), 1);
        assert!(rec.borrow().closed.is_empty());
    }

    #[test]
    fn test_dispatch_reject_and_close() {
        let mut ctl = DiffController::default();
        let mut doc = selected("x y", TextRange::new(0, 1));
        let a = ctl.insert_diff_at_selection(&mut doc, "X").unwrap();
        assert_eq!(ctl.dispatch(&mut doc, &a, DiffAction::Reject), DispatchOutcome::Rejected);

        doc.select_range(TextRange::new(2, 3)).unwrap();
        let b = ctl.insert_diff_at_selection(&mut doc, "Y").unwrap();
        assert_eq!(ctl.dispatch(&mut doc, &b, DiffAction::Close), DispatchOutcome::Closed);
        assert_eq!(doc.text(), "x y");
    }
}
