//! Presentation of a diff session.
//!
//! A [`DiffFragment`] is a purely descriptive view of a session: the struck
//! original, one block per suggestion, and optional action affordances. Every
//! block and affordance carries the owning [`DiffId`] so a presentation layer
//! can hand user actions straight back to the controller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a diff session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiffId(String);

impl DiffId {
    /// Allocates a fresh, globally unique id.
    pub fn generate() -> Self {
        Self(format!("diff-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DiffId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for DiffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a suggestion within its session, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestionId(pub usize);

impl SuggestionId {
    /// The 1-based number shown to users.
    pub fn display_number(&self) -> usize {
        self.0 + 1
    }
}

/// A user action addressed to a diff session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "suggestion", rename_all = "snake_case")]
pub enum DiffAction {
    /// Replace the original with the given suggestion.
    Accept(SuggestionId),
    /// Restore the original, as an explicit rejection.
    Reject,
    /// Restore the original without judgment.
    Close,
}

/// Addressable handle of one suggestion block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestionHandle {
    pub diff_id: DiffId,
    pub suggestion_id: SuggestionId,
}

/// One candidate as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionBlock {
    pub handle: SuggestionHandle,
    pub text: String,
}

/// A clickable affordance; carries no behavior of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAffordance {
    pub diff_id: DiffId,
    pub action: DiffAction,
    pub label: String,
}

/// Renderable description of a diff session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFragment {
    pub diff_id: DiffId,
    /// Original text, shown struck through.
    pub original: String,
    /// Suggestions in presentation order.
    pub blocks: Vec<SuggestionBlock>,
    /// Empty when actions are hidden.
    pub actions: Vec<ActionAffordance>,
}

/// Builds the fragment for a session.
pub fn build(
    diff_id: &DiffId,
    original: &str,
    suggestions: &[String],
    show_actions: bool,
) -> DiffFragment {
    let blocks: Vec<SuggestionBlock> = suggestions
        .iter()
        .enumerate()
        .map(|(i, text)| SuggestionBlock {
            handle: SuggestionHandle {
                diff_id: diff_id.clone(),
                suggestion_id: SuggestionId(i),
            },
            text: text.clone(),
        })
        .collect();

    let actions = if show_actions {
        let mut actions: Vec<ActionAffordance> = blocks
            .iter()
            .map(|b| ActionAffordance {
                diff_id: diff_id.clone(),
                action: DiffAction::Accept(b.handle.suggestion_id),
                label: format!("accept {}", b.handle.suggestion_id.display_number()),
            })
            .collect();
        actions.push(ActionAffordance {
            diff_id: diff_id.clone(),
            action: DiffAction::Reject,
            label: "reject".to_string(),
        });
        actions.push(ActionAffordance {
            diff_id: diff_id.clone(),
            action: DiffAction::Close,
            label: "close".to_string(),
        });
        actions
    } else {
        Vec::new()
    };

    DiffFragment {
        diff_id: diff_id.clone(),
        original: original.to_string(),
        blocks,
        actions,
    }
}

/// Plain-text rendering, used by text-only surfaces.
///
/// ```text
/// ~~The cat sat.~~
/// [1] The cat sat quietly.
/// [2] The cat rested.
/// [accept 1] [accept 2] [reject] [close]
/// ```
impl fmt::Display for DiffFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~~{}~~", self.original)?;
        for block in &self.blocks {
            write!(
                f,
                "\n[{}] {}",
                block.handle.suggestion_id.display_number(),
                block.text
            )?;
        }
        if !self.actions.is_empty() {
            let labels: Vec<String> = self
                .actions
                .iter()
                .map(|a| format!("[{}]", a.label))
                .collect();
            write!(f, "\n{}", labels.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestions() -> Vec<String> {
        vec![
            "The cat sat quietly.".to_string(),
            "The cat rested.".to_string(),
        ]
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = DiffId::generate();
        let b = DiffId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("diff-"));
    }

    #[test]
    fn test_blocks_carry_handles() {
        let id = DiffId::from("d1");
        let fragment = build(&id, "The cat sat.", &suggestions(), false);
        assert_eq!(fragment.blocks.len(), 2);
        assert_eq!(fragment.blocks[1].handle.diff_id, id);
        assert_eq!(fragment.blocks[1].handle.suggestion_id, SuggestionId(1));
        assert_eq!(fragment.blocks[1].text, "The cat rested.");
        assert!(fragment.actions.is_empty());
    }

    #[test]
    fn test_actions_when_shown() {
        let id = DiffId::from("d1");
        let fragment = build(&id, "The cat sat.", &suggestions(), true);
        let actions: Vec<DiffAction> = fragment.actions.iter().map(|a| a.action).collect();
        assert_eq!(
            actions,
            vec![
                DiffAction::Accept(SuggestionId(0)),
                DiffAction::Accept(SuggestionId(1)),
                DiffAction::Reject,
                DiffAction::Close,
            ]
        );
        assert!(fragment.actions.iter().all(|a| a.diff_id == id));
    }

    #[test]
    fn test_plain_rendering() {
        let fragment = build(&DiffId::from("d1"), "The cat sat.", &suggestions(), true);
        assert_eq!(
            fragment.to_string(),
            "~~The cat sat.~~\n[1] The cat sat quietly.\n[2] The cat rested.\n\
             [accept 1] [accept 2] [reject] [close]"
        );
    }

    #[test]
    fn test_plain_rendering_without_actions() {
        let fragment = build(&DiffId::from("d1"), "old", &["new".to_string()], false);
        assert_eq!(fragment.to_string(), "~~old~~\n[1] new");
    }
}
