use std::collections::BTreeSet;
use tracing::{error, warn};

use super::edit::{EditGroup, StructuralEdit};
use crate::board::ItemRef;
use crate::core::CopperclipError;
use crate::project::Project;

/// Where the engines send their structural edits.
///
/// [`Transaction`] is the real implementation; tests wrap it to inject
/// failures at a chosen edit.
pub trait EditSink {
    fn project(&self) -> &Project;
    fn execute(&mut self, edit: StructuralEdit) -> Result<(), CopperclipError>;
    fn select(&mut self, item: ItemRef) -> bool;
    fn clear_selection(&mut self);
}

/// Scope guard around a series of structural edits.
///
/// Edits are applied immediately. Dropping the transaction without calling
/// [`Transaction::commit`] reverts them in reverse order and restores the
/// selection it started with.
pub struct Transaction<'a> {
    project: &'a mut Project,
    title: String,
    applied: Vec<StructuralEdit>,
    initial_selection: BTreeSet<ItemRef>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    pub fn begin(project: &'a mut Project, title: impl Into<String>) -> Self {
        let initial_selection = project.board.selection().clone();
        Self {
            project,
            title: title.into(),
            applied: Vec::new(),
            initial_selection,
            committed: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn applied(&self) -> &[StructuralEdit] {
        &self.applied
    }

    pub fn commit(mut self) -> EditGroup {
        self.committed = true;
        EditGroup {
            title: std::mem::take(&mut self.title),
            edits: std::mem::take(&mut self.applied),
        }
    }

    fn rollback(&mut self) {
        if !self.applied.is_empty() {
            warn!(title = %self.title, edits = self.applied.len(), "Rolling back transaction");
        }
        while let Some(edit) = self.applied.pop() {
            if let Err(e) = edit.revert(self.project) {
                error!(edit = edit.description(), error = %e, "Failed to revert structural edit");
            }
        }
        self.project.board.restore_selection(std::mem::take(&mut self.initial_selection));
    }
}

impl EditSink for Transaction<'_> {
    fn project(&self) -> &Project {
        &*self.project
    }

    fn execute(&mut self, edit: StructuralEdit) -> Result<(), CopperclipError> {
        if let Err(e) = edit.apply(self.project) {
            error!(edit = edit.description(), error = %e, "Structural edit failed");
            return Err(CopperclipError::Invariant(e));
        }
        self.applied.push(edit);
        Ok(())
    }

    fn select(&mut self, item: ItemRef) -> bool {
        self.project.board.select(item)
    }

    fn clear_selection(&mut self) {
        self.project.board.clear_selection();
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}
