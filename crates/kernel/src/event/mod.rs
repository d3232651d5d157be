//! Named event dispatch.
//!
//! Listeners declare which events they implement and at what priority. When
//! an event is dispatched, listeners run in priority order (lower = earlier)
//! until one stops propagation.

mod manager;

pub use manager::{
    DEFAULT_EVENT_PRIORITY, DispatchOutcome, Event, EventBinding, EventListener, EventManager,
};

/// Event names used by the kernel.
pub mod names {
    /// Before a layout's content is rendered; listeners rewrite `content`.
    pub const LAYOUT_BEFORE_FILTER: &str = "Helper.Layout.beforeFilter";

    /// After a layout's content filters ran.
    pub const LAYOUT_AFTER_FILTER: &str = "Helper.Layout.afterFilter";

    /// Before a model row is written. Stopping aborts the save.
    pub const MODEL_BEFORE_SAVE: &str = "Model.beforeSave";

    /// After a model row is written.
    pub const MODEL_AFTER_SAVE: &str = "Model.afterSave";

    /// Before a model row is deleted. Stopping aborts the delete.
    pub const MODEL_BEFORE_DELETE: &str = "Model.beforeDelete";

    /// After a model row is deleted.
    pub const MODEL_AFTER_DELETE: &str = "Model.afterDelete";
}
