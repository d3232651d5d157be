//! Cross-plugin hooks.
//!
//! Plugins attach components, helpers, behaviors and plain properties to
//! controllers and tables they do not own. Every hook is merged into the
//! [`Configure`](crate::configure::Configure) tree under
//! `Hook.controller_properties` or `Hook.table_properties`, where the request
//! lifecycle picks it up.

mod registry;
mod spec;

pub use registry::{
    CONTROLLER_PROPERTIES, HookRegistry, TABLE_PROPERTIES, WILDCARD,
};
pub use spec::{ComponentOptions, ComponentSpec, DEFAULT_PRIORITY};
