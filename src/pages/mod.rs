//! Page registration.
//!
//! Collection builders hand every derived page to a [`PageSink`]. The binary
//! uses [`PageStore`], which keeps the live page set in memory and mirrors it
//! to a JSON manifest:
//!
//! ```text
//! CollectionBuilder ──create_page/delete_page──► PageStore ──version──► manifest writer
//! ```

mod discover;
mod store;
mod types;

pub use discover::{ComponentRoute, discover_components};
pub use store::PageStore;
pub use types::{PAGE_PARAMS_KEY, PageRequest, PageSink};
