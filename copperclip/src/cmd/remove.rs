//! Partial removal of board items
//!
//! Removing some vias or net lines of a net segment can leave the rest in
//! several disconnected pieces. The segment is then replaced by one new
//! segment per surviving piece so that every segment stays connected.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};
use uuid::Uuid;

use super::edit::{EditGroup, StructuralEdit};
use super::transaction::{EditSink, Transaction};
use crate::board::{AnchorId, BoardError, ItemKind, NetLine, NetPoint, NetSegment, SelectionQuery, Via};
use crate::core::CopperclipError;
use crate::project::Project;
use crate::splitter::NetSegmentSplitter;

pub const REMOVE_TITLE: &str = "Remove Board Items";

/// Vias and net lines to remove from one segment.
type SegmentRemoval = (BTreeSet<Uuid>, BTreeSet<Uuid>);

/// One surviving piece of a partially removed net segment, with the
/// original identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubSegment {
    pub vias: Vec<Via>,
    pub netpoints: Vec<NetPoint>,
    pub netlines: Vec<NetLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalPlan {
    RemoveWhole,
    Split(Vec<SubSegment>),
}

/// Net lines that go away when `removed_vias` and `removed_netlines` are
/// removed: the requested lines plus every line attached to a removed via.
fn expand_removed_netlines(
    segment: &NetSegment,
    removed_vias: &BTreeSet<Uuid>,
    removed_netlines: &BTreeSet<Uuid>,
) -> BTreeSet<Uuid> {
    let mut netlines: BTreeSet<Uuid> = removed_netlines
        .iter()
        .filter(|uuid| segment.netline(uuid).is_some())
        .copied()
        .collect();
    for via in removed_vias {
        netlines.extend(segment.netlines_of(&AnchorId::Via(*via)));
    }
    netlines
}

/// Work out what remains of `segment` after the removal.
pub fn plan_removal(segment: &NetSegment, removed_vias: &BTreeSet<Uuid>, removed_netlines: &BTreeSet<Uuid>) -> RemovalPlan {
    let removed_netlines = expand_removed_netlines(segment, removed_vias, removed_netlines);
    let all_vias_removed = segment.vias().all(|via| removed_vias.contains(&via.uuid));
    let all_netlines_removed = segment.netlines().all(|line| removed_netlines.contains(&line.uuid));
    if all_vias_removed && all_netlines_removed {
        return RemovalPlan::RemoveWhole;
    }

    let mut splitter = NetSegmentSplitter::new();
    for via in segment.vias().filter(|via| !removed_vias.contains(&via.uuid)) {
        splitter.add_via(via.uuid);
    }
    for netline in segment.netlines().filter(|line| !removed_netlines.contains(&line.uuid)) {
        splitter.add_netline(netline.uuid);
    }

    let pieces = splitter
        .split(segment)
        .into_iter()
        .map(|piece| SubSegment {
            vias: piece.vias().filter_map(|uuid| segment.via(&uuid)).cloned().collect(),
            netpoints: piece.junctions().filter_map(|uuid| segment.netpoint(&uuid)).cloned().collect(),
            netlines: piece.netlines.iter().filter_map(|uuid| segment.netline(uuid)).cloned().collect(),
        })
        .collect();
    RemovalPlan::Split(pieces)
}

/// Removes vias, net lines, planes, polygons, stroke texts and holes in one
/// transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveBoardItems {
    vias: BTreeSet<Uuid>,
    netlines: BTreeSet<Uuid>,
    planes: BTreeSet<Uuid>,
    polygons: BTreeSet<Uuid>,
    stroke_texts: BTreeSet<Uuid>,
    holes: BTreeSet<Uuid>,
}

impl RemoveBoardItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_selection(selection: &SelectionQuery) -> Self {
        let mut cmd = Self::new();
        for selected in selection.net_segments.values() {
            cmd.vias.extend(selected.vias.iter().copied());
            cmd.netlines.extend(selected.netlines.iter().copied());
        }
        cmd.planes = selection.planes.clone();
        cmd.polygons = selection.polygons.clone();
        cmd.stroke_texts = selection.stroke_texts.clone();
        cmd.holes = selection.holes.clone();
        cmd
    }

    pub fn via(mut self, uuid: Uuid) -> Self {
        self.vias.insert(uuid);
        self
    }

    pub fn netline(mut self, uuid: Uuid) -> Self {
        self.netlines.insert(uuid);
        self
    }

    pub fn plane(mut self, uuid: Uuid) -> Self {
        self.planes.insert(uuid);
        self
    }

    pub fn polygon(mut self, uuid: Uuid) -> Self {
        self.polygons.insert(uuid);
        self
    }

    pub fn stroke_text(mut self, uuid: Uuid) -> Self {
        self.stroke_texts.insert(uuid);
        self
    }

    pub fn hole(mut self, uuid: Uuid) -> Self {
        self.holes.insert(uuid);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.vias.is_empty()
            && self.netlines.is_empty()
            && self.planes.is_empty()
            && self.polygons.is_empty()
            && self.stroke_texts.is_empty()
            && self.holes.is_empty()
    }

    pub fn execute(&self, project: &mut Project) -> Result<EditGroup, CopperclipError> {
        let mut tx = Transaction::begin(project, REMOVE_TITLE);
        self.execute_in(&mut tx)?;
        let group = tx.commit();
        info!(edits = group.edits.len(), "Removed board items");
        Ok(group)
    }

    pub fn execute_in<S: EditSink + ?Sized>(&self, sink: &mut S) -> Result<(), CopperclipError> {
        for (segment_uuid, (vias, netlines)) in self.group_by_segment(sink.project())? {
            let segment = sink
                .project()
                .board
                .net_segment(&segment_uuid)
                .cloned()
                .ok_or(BoardError::NotFound { kind: ItemKind::NetSegment, uuid: segment_uuid })?;
            let plan = plan_removal(&segment, &vias, &netlines);
            sink.execute(StructuralEdit::RemoveNetSegment(segment.clone()))?;
            match plan {
                RemovalPlan::RemoveWhole => {
                    debug!(segment = %segment_uuid, "Removing whole net segment");
                }
                RemovalPlan::Split(pieces) => {
                    debug!(segment = %segment_uuid, pieces = pieces.len(), "Splitting net segment");
                    for piece in pieces {
                        rebuild_piece(sink, segment.net_signal(), piece)?;
                    }
                }
            }
        }

        let board = &sink.project().board;
        let mut edits = Vec::new();
        for uuid in &self.planes {
            let plane = board.plane(uuid).ok_or(BoardError::NotFound { kind: ItemKind::Plane, uuid: *uuid })?;
            edits.push(StructuralEdit::RemovePlane(plane.clone()));
        }
        for uuid in &self.polygons {
            let polygon = board.polygon(uuid).ok_or(BoardError::NotFound { kind: ItemKind::Polygon, uuid: *uuid })?;
            edits.push(StructuralEdit::RemovePolygon(polygon.clone()));
        }
        for uuid in &self.stroke_texts {
            let text = board
                .stroke_text(uuid)
                .ok_or(BoardError::NotFound { kind: ItemKind::StrokeText, uuid: *uuid })?;
            edits.push(StructuralEdit::RemoveStrokeText(text.clone()));
        }
        for uuid in &self.holes {
            let hole = board.hole(uuid).ok_or(BoardError::NotFound { kind: ItemKind::Hole, uuid: *uuid })?;
            edits.push(StructuralEdit::RemoveHole(hole.clone()));
        }
        for edit in edits {
            sink.execute(edit)?;
        }
        Ok(())
    }

    /// Requested vias and net lines keyed by the segment owning them.
    fn group_by_segment(&self, project: &Project) -> Result<BTreeMap<Uuid, SegmentRemoval>, BoardError> {
        let board = &project.board;
        let mut groups: BTreeMap<Uuid, SegmentRemoval> = BTreeMap::new();
        for uuid in &self.vias {
            let segment = board
                .net_segment_of_via(uuid)
                .ok_or(BoardError::NotFound { kind: ItemKind::Via, uuid: *uuid })?;
            groups.entry(segment.uuid()).or_default().0.insert(*uuid);
        }
        for uuid in &self.netlines {
            let segment = board
                .net_segment_of_netline(uuid)
                .ok_or(BoardError::NotFound { kind: ItemKind::NetLine, uuid: *uuid })?;
            groups.entry(segment.uuid()).or_default().1.insert(*uuid);
        }
        Ok(groups)
    }
}

/// Add a new segment for a surviving piece. Vias keep their identity; net
/// points and net lines get fresh ones.
fn rebuild_piece<S: EditSink + ?Sized>(sink: &mut S, net_signal: Uuid, piece: SubSegment) -> Result<(), CopperclipError> {
    let segment = NetSegment::new(Uuid::new_v4(), net_signal);
    let segment_uuid = segment.uuid();
    sink.execute(StructuralEdit::AddNetSegment(segment))?;

    let mut junctions: HashMap<Uuid, Uuid> = HashMap::new();
    let netpoints: Vec<NetPoint> = piece
        .netpoints
        .into_iter()
        .map(|netpoint| {
            let uuid = Uuid::new_v4();
            junctions.insert(netpoint.uuid, uuid);
            NetPoint { uuid, ..netpoint }
        })
        .collect();
    let remap = |anchor: AnchorId| -> Result<AnchorId, BoardError> {
        match anchor {
            AnchorId::Junction(old) => junctions
                .get(&old)
                .map(|new| AnchorId::Junction(*new))
                .ok_or(BoardError::NotFound { kind: ItemKind::NetPoint, uuid: old }),
            AnchorId::Via(_) | AnchorId::Pad(_) => Ok(anchor),
        }
    };
    let netlines = piece
        .netlines
        .into_iter()
        .map(|line| {
            Ok(NetLine {
                uuid: Uuid::new_v4(),
                start: remap(line.start)?,
                end: remap(line.end)?,
                ..line
            })
        })
        .collect::<Result<Vec<_>, BoardError>>()?;

    sink.execute(StructuralEdit::AddNetSegmentElements {
        segment: segment_uuid,
        vias: piece.vias,
        netpoints,
        netlines,
    })
}
