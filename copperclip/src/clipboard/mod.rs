//! Board clipboard: snapshot types, the builder that copies a selection and
//! the text/media type codec.

pub mod builder;
pub mod codec;
pub mod data;

pub use builder::BoardClipboardDataBuilder;
pub use codec::{media_type, CodecError, MimeData, MIME_TYPE_BASE, ROOT_TAG};
pub use data::{BoardClipboardData, ClipAnchor, ClipNetSegment, ClipPlane, ClipTrace, ClipboardSummary};
