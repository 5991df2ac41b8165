//! Clipboard operations shared by every front end.
//! Works on an in-memory [`Project`]; no GUI or file-format dependencies.

use std::path::Path;
use tracing::info;

use crate::board::{BoardError, SelectionQuery};
use crate::clipboard::{BoardClipboardData, BoardClipboardDataBuilder, CodecError, MimeData};
use crate::cmd::{EditGroup, PasteBoardItems, RemoveBoardItems};
use crate::geometry::Point;
use crate::parser::ParseError;
use crate::project::Project;

#[derive(Debug, thiserror::Error)]
pub enum CopperclipError {
    #[error("Malformed clipboard data: {0}")]
    MalformedSnapshot(String),
    #[error("Clipboard data is from version {found}, this is version {expected}")]
    UnsupportedVersion { expected: String, found: String },
    #[error("Cannot paste into this board: {0}")]
    DestinationConflict(String),
    #[error("Invariant violation: {0}")]
    Invariant(#[from] BoardError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CodecError> for CopperclipError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::UnsupportedVersion { expected, found } => CopperclipError::UnsupportedVersion { expected, found },
            other => CopperclipError::MalformedSnapshot(other.to_string()),
        }
    }
}

impl From<ParseError> for CopperclipError {
    fn from(e: ParseError) -> Self {
        CopperclipError::MalformedSnapshot(e.to_string())
    }
}

/// Options for clipboard operations.
#[derive(Clone, Debug)]
pub struct ClipboardOptions {
    /// Version written into and expected from the clipboard media type.
    pub app_version: String,
    /// Net class for nets that pasting has to create.
    pub default_net_class: String,
}

impl Default for ClipboardOptions {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            default_net_class: "default".to_string(),
        }
    }
}

/// Copy, paste, cut and delete on a project.
pub struct CopperclipCore;

impl CopperclipCore {
    /// Snapshot of the board's current selection.
    pub fn copy_selection(project: &Project, cursor_pos: Point) -> Result<BoardClipboardData, CopperclipError> {
        let data = BoardClipboardDataBuilder::new(project).generate(cursor_pos)?;
        info!(
            net_segments = data.net_segments.len(),
            planes = data.planes.len(),
            "Copied board selection"
        );
        Ok(data)
    }

    /// Copy the selection straight into transport form.
    pub fn copy_to_mime(project: &Project, cursor_pos: Point, options: &ClipboardOptions) -> Result<MimeData, CopperclipError> {
        Ok(Self::copy_selection(project, cursor_pos)?.to_mime_data(&options.app_version))
    }

    /// Paste transport data so that the snapshot's cursor position lands on
    /// `cursor_pos`. Returns `Ok(None)` if `mime` holds no board data.
    pub fn paste_from_mime(
        project: &mut Project,
        mime: &MimeData,
        cursor_pos: Point,
        options: &ClipboardOptions,
    ) -> Result<Option<EditGroup>, CopperclipError> {
        let Some(data) = BoardClipboardData::from_mime_data(mime, &options.app_version)? else {
            return Ok(None);
        };
        let offset = cursor_pos.checked_sub(data.cursor_pos).ok_or_else(|| {
            CopperclipError::MalformedSnapshot(format!("cursor position {} is out of range", data.cursor_pos))
        })?;
        PasteBoardItems::new(data, offset).execute(project, options).map(Some)
    }

    /// Remove the selected items, splitting partially removed net segments.
    pub fn remove_selection(project: &mut Project) -> Result<EditGroup, CopperclipError> {
        let selection = SelectionQuery::from_board(&project.board);
        RemoveBoardItems::from_selection(&selection).execute(project)
    }

    /// Copy then remove the selection. Nothing is removed if copying fails.
    pub fn cut_selection(
        project: &mut Project,
        cursor_pos: Point,
        options: &ClipboardOptions,
    ) -> Result<(MimeData, EditGroup), CopperclipError> {
        let mime = Self::copy_to_mime(project, cursor_pos, options)?;
        let group = Self::remove_selection(project)?;
        Ok((mime, group))
    }

    /// Read a clipboard text file.
    pub fn read_clipboard_file(path: &Path) -> Result<BoardClipboardData, CopperclipError> {
        let text = std::fs::read_to_string(path)?;
        Ok(BoardClipboardData::from_text(&text)?)
    }

    pub fn write_clipboard_file(path: &Path, data: &BoardClipboardData) -> Result<(), CopperclipError> {
        std::fs::write(path, data.to_text())?;
        Ok(())
    }
}
