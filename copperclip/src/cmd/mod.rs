//! Undoable board operations: the structural edit layer and the paste and
//! removal engines built on it.

pub mod edit;
pub mod paste;
pub mod remove;
pub mod transaction;

pub use edit::{EditGroup, StructuralEdit};
pub use paste::{PasteBoardItems, PASTE_TITLE};
pub use remove::{plan_removal, RemovalPlan, RemoveBoardItems, SubSegment, REMOVE_TITLE};
pub use transaction::{EditSink, Transaction};
