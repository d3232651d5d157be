//! Menus: storage, layout loading and the `[menu:alias]` view helper.

mod component;
mod helper;
mod memory_store;
mod pg_store;
mod shortcode;
mod store;

pub use component::{LayoutMenu, MenusComponent, MenusForLayout};
pub use helper::{MenuOptions, MenusHelper};
pub use memory_store::MemoryMenuStore;
pub use pg_store::PgMenuStore;
pub use shortcode::{Shortcode, aliases_in, parse_attributes, parse_shortcodes, replace_shortcodes};
pub use store::MenuStore;
