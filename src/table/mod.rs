//! The table session and the events it reports.

pub mod event;
pub mod session;

pub use event::TableEvent;
pub use session::{Table, TableSnapshot};
