//! Model listeners attached to the term lifecycle.

use chrono::Utc;

use crate::event::{Event, EventBinding, EventListener, names};
use crate::models::TermDraft;

/// Stamps `created` on new terms and `updated` on every save.
#[derive(Debug, Default)]
pub struct TimestampBehavior;

impl EventListener<TermDraft> for TimestampBehavior {
    fn name(&self) -> &str {
        "Timestamp"
    }

    fn implemented_events(&self) -> Vec<EventBinding> {
        vec![EventBinding::new(names::MODEL_BEFORE_SAVE)]
    }

    fn handle(&self, event: &mut Event<'_, TermDraft>) -> anyhow::Result<()> {
        let now = Utc::now().timestamp();
        let draft = &mut *event.subject;
        if draft.is_new() || draft.created.is_none() {
            draft.created = Some(now);
        }
        draft.updated = Some(now);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::event::EventManager;
    use serde_json::Map;
    use std::sync::Arc;

    #[test]
    fn new_draft_gets_both_timestamps() {
        let mut manager = EventManager::new();
        manager.on(Arc::new(TimestampBehavior));

        let mut draft = TermDraft::new("Rust", "rust");
        manager.dispatch(names::MODEL_BEFORE_SAVE, &mut draft, Map::new());

        assert!(draft.created.is_some());
        assert_eq!(draft.created, draft.updated);
    }

    #[test]
    fn existing_draft_keeps_created() {
        let mut manager = EventManager::new();
        manager.on(Arc::new(TimestampBehavior));

        let mut draft = TermDraft {
            id: Some(3),
            created: Some(10),
            updated: Some(10),
            ..TermDraft::new("Rust", "rust")
        };
        manager.dispatch(names::MODEL_BEFORE_SAVE, &mut draft, Map::new());

        assert_eq!(draft.created, Some(10));
        assert!(draft.updated.unwrap() > 10);
    }
}
