//! Reversible structural edits
//!
//! Every change the paste and removal engines make to a [`Project`] is one
//! of these. An edit carries everything needed to undo it, so a list of
//! applied edits can be rolled back in reverse order or replayed.

use uuid::Uuid;

use crate::board::{BoardError, Hole, NetLine, NetPoint, NetSegment, Plane, Polygon, StrokeText, Via};
use crate::circuit::{NetClass, NetSignal};
use crate::project::Project;

#[derive(Debug, Clone, PartialEq)]
pub enum StructuralEdit {
    AddNetClass(NetClass),
    AddNetSignal(NetSignal),
    AddNetSegment(NetSegment),
    RemoveNetSegment(NetSegment),
    AddNetSegmentElements {
        segment: Uuid,
        vias: Vec<Via>,
        netpoints: Vec<NetPoint>,
        netlines: Vec<NetLine>,
    },
    AddPlane(Plane),
    RemovePlane(Plane),
    AddPolygon(Polygon),
    RemovePolygon(Polygon),
    AddStrokeText(StrokeText),
    RemoveStrokeText(StrokeText),
    AddHole(Hole),
    RemoveHole(Hole),
}

impl StructuralEdit {
    pub fn apply(&self, project: &mut Project) -> Result<(), BoardError> {
        let board = &mut project.board;
        match self {
            StructuralEdit::AddNetClass(class) => project.circuit.add_net_class(class.clone()),
            StructuralEdit::AddNetSignal(signal) => project.circuit.add_net_signal(signal.clone()),
            StructuralEdit::AddNetSegment(segment) => board.add_net_segment(segment.clone()),
            StructuralEdit::RemoveNetSegment(segment) => board.remove_net_segment(&segment.uuid()).map(drop),
            StructuralEdit::AddNetSegmentElements { segment, vias, netpoints, netlines } => {
                board.add_net_segment_elements(segment, vias, netpoints, netlines)
            }
            StructuralEdit::AddPlane(plane) => board.add_plane(plane.clone()),
            StructuralEdit::RemovePlane(plane) => board.remove_plane(&plane.uuid).map(drop),
            StructuralEdit::AddPolygon(polygon) => board.add_polygon(polygon.clone()),
            StructuralEdit::RemovePolygon(polygon) => board.remove_polygon(&polygon.uuid).map(drop),
            StructuralEdit::AddStrokeText(text) => board.add_stroke_text(text.clone()),
            StructuralEdit::RemoveStrokeText(text) => board.remove_stroke_text(&text.uuid).map(drop),
            StructuralEdit::AddHole(hole) => board.add_hole(hole.clone()),
            StructuralEdit::RemoveHole(hole) => board.remove_hole(&hole.uuid).map(drop),
        }
    }

    pub fn revert(&self, project: &mut Project) -> Result<(), BoardError> {
        let board = &mut project.board;
        match self {
            StructuralEdit::AddNetClass(class) => project.circuit.remove_net_class(&class.uuid).map(drop),
            StructuralEdit::AddNetSignal(signal) => project.circuit.remove_net_signal(&signal.uuid).map(drop),
            StructuralEdit::AddNetSegment(segment) => board.remove_net_segment(&segment.uuid()).map(drop),
            StructuralEdit::RemoveNetSegment(segment) => board.add_net_segment(segment.clone()),
            StructuralEdit::AddNetSegmentElements { segment, vias, netpoints, netlines } => {
                let vias: Vec<Uuid> = vias.iter().map(|v| v.uuid).collect();
                let netpoints: Vec<Uuid> = netpoints.iter().map(|p| p.uuid).collect();
                let netlines: Vec<Uuid> = netlines.iter().map(|l| l.uuid).collect();
                board.remove_net_segment_elements(segment, &vias, &netpoints, &netlines)
            }
            StructuralEdit::AddPlane(plane) => board.remove_plane(&plane.uuid).map(drop),
            StructuralEdit::RemovePlane(plane) => board.add_plane(plane.clone()),
            StructuralEdit::AddPolygon(polygon) => board.remove_polygon(&polygon.uuid).map(drop),
            StructuralEdit::RemovePolygon(polygon) => board.add_polygon(polygon.clone()),
            StructuralEdit::AddStrokeText(text) => board.remove_stroke_text(&text.uuid).map(drop),
            StructuralEdit::RemoveStrokeText(text) => board.add_stroke_text(text.clone()),
            StructuralEdit::AddHole(hole) => board.remove_hole(&hole.uuid).map(drop),
            StructuralEdit::RemoveHole(hole) => board.add_hole(hole.clone()),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StructuralEdit::AddNetClass(_) => "Add net class",
            StructuralEdit::AddNetSignal(_) => "Add net signal",
            StructuralEdit::AddNetSegment(_) => "Add net segment",
            StructuralEdit::RemoveNetSegment(_) => "Remove net segment",
            StructuralEdit::AddNetSegmentElements { .. } => "Add net segment elements",
            StructuralEdit::AddPlane(_) => "Add plane",
            StructuralEdit::RemovePlane(_) => "Remove plane",
            StructuralEdit::AddPolygon(_) => "Add polygon",
            StructuralEdit::RemovePolygon(_) => "Remove polygon",
            StructuralEdit::AddStrokeText(_) => "Add stroke text",
            StructuralEdit::RemoveStrokeText(_) => "Remove stroke text",
            StructuralEdit::AddHole(_) => "Add hole",
            StructuralEdit::RemoveHole(_) => "Remove hole",
        }
    }
}

/// The edits of one committed top-level operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EditGroup {
    pub title: String,
    pub edits: Vec<StructuralEdit>,
}

impl EditGroup {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Revert all edits, last one first.
    pub fn undo(&self, project: &mut Project) -> Result<(), BoardError> {
        self.edits.iter().rev().try_for_each(|edit| edit.revert(project))
    }

    /// Re-apply all edits in their original order.
    pub fn redo(&self, project: &mut Project) -> Result<(), BoardError> {
        self.edits.iter().try_for_each(|edit| edit.apply(project))
    }
}
