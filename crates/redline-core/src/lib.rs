/// Diff-editing engine: proposes AI rewrites of a selected span inline,
/// as a struck original plus numbered suggestions, and resolves them on
/// accept, reject, or close.
///
/// The concrete surface is [`Document`], a rope buffer with a cursor,
/// fragment marks, and debounced snapshot history.
pub mod anchor;
pub mod buffer;
pub mod controller;
pub mod cursor;
pub mod document;
pub mod fragment;
pub mod history;
pub mod locator;
pub mod marks;
pub mod suggest;
pub mod surface;

pub use anchor::SavedSelection;
pub use controller::{
    DiffCallbacks, DiffController, DiffOptions, DiffSession, DiffState, DispatchOutcome,
};
pub use document::Document;
pub use fragment::{DiffAction, DiffFragment, DiffId, SuggestionId};
pub use surface::{EditableSurface, TextRange};
