//! Copperclip - connectivity-preserving copy, paste and removal of PCB copper
//!
//! This library keeps the copper network of a board consistent while parts
//! of it are copied, pasted or deleted. A partial selection is split into
//! self-contained pieces, serialized to a versioned clipboard format and
//! rebuilt elsewhere with fresh identities. A partial delete replaces the
//! affected net segments by their surviving connected pieces.
//!
//! # Quick Start
//!
//! ```no_run
//! use copperclip::prelude::*;
//!
//! # fn run(project: &mut Project) -> Result<(), CopperclipError> {
//! let options = ClipboardOptions::default();
//! let mime = CopperclipCore::copy_to_mime(project, Point::default(), &options)?;
//! CopperclipCore::paste_from_mime(project, &mime, Point::from_mm(10, 0), &options)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Network splitter**: layer-aware partition of partially selected nets
//! - **Clipboard codec**: exact S-expression round trip, versioned media type
//! - **Paste and removal**: transactional, undoable edit groups

pub mod board;
pub mod circuit;
pub mod clipboard;
pub mod cmd;
pub mod core;
pub mod geometry;
pub mod parser;
pub mod project;
pub mod splitter;

// Re-export main types
pub use board::{AnchorId, Board, BoardError, ItemRef, NetSegment, PadId, SelectionQuery};
pub use circuit::{Circuit, CircuitIdentifier};
pub use clipboard::{BoardClipboardData, BoardClipboardDataBuilder, CodecError, MimeData};
pub use cmd::{EditGroup, PasteBoardItems, RemovalPlan, RemoveBoardItems, Transaction};
pub use self::core::{ClipboardOptions, CopperclipCore, CopperclipError};
pub use project::Project;
pub use splitter::{NetSegmentSplitter, Segment};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::geometry::Point;
    pub use crate::{
        BoardClipboardData, ClipboardOptions, CopperclipCore, CopperclipError, EditGroup, MimeData, Project,
    };
}
