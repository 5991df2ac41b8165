use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::data::{BoardClipboardData, ClipAnchor, ClipNetSegment, ClipPlane, ClipTrace};
use crate::board::{AnchorId, BoardError, ItemKind, NetPoint, NetSegment, SegmentSelection, SelectionQuery};
use crate::circuit::CircuitIdentifier;
use crate::geometry::Point;
use crate::project::Project;
use crate::splitter::{NetSegmentSplitter, Segment};

/// Copies selected board content into a self-contained snapshot.
pub struct BoardClipboardDataBuilder<'a> {
    project: &'a Project,
}

impl<'a> BoardClipboardDataBuilder<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    /// Snapshot of the board's current selection.
    pub fn generate(&self, cursor_pos: Point) -> Result<BoardClipboardData, BoardError> {
        self.generate_from(&self.project.board.selection_query(), cursor_pos)
    }

    pub fn generate_from(&self, selection: &SelectionQuery, cursor_pos: Point) -> Result<BoardClipboardData, BoardError> {
        let board = &self.project.board;
        let mut data = BoardClipboardData::new(board.uuid(), cursor_pos);

        for (segment_uuid, selected) in &selection.net_segments {
            let segment = board
                .net_segment(segment_uuid)
                .ok_or(BoardError::NotFound { kind: ItemKind::NetSegment, uuid: *segment_uuid })?;
            data.net_segments.extend(self.copy_segment(segment, selected)?);
        }

        for uuid in &selection.planes {
            let plane = board.plane(uuid).ok_or(BoardError::NotFound { kind: ItemKind::Plane, uuid: *uuid })?;
            data.planes.push(ClipPlane {
                uuid: plane.uuid,
                layer: plane.layer.clone(),
                net_name: self.net_name(&plane.net_signal)?,
                outline: plane.outline.clone(),
                min_width: plane.min_width,
                min_clearance: plane.min_clearance,
                keep_orphans: plane.keep_orphans,
                priority: plane.priority,
                connect_style: plane.connect_style,
            });
        }
        for uuid in &selection.polygons {
            let polygon = board.polygon(uuid).ok_or(BoardError::NotFound { kind: ItemKind::Polygon, uuid: *uuid })?;
            data.polygons.push(polygon.clone());
        }
        for uuid in &selection.stroke_texts {
            let text = board
                .stroke_text(uuid)
                .ok_or(BoardError::NotFound { kind: ItemKind::StrokeText, uuid: *uuid })?;
            data.stroke_texts.push(text.clone());
        }
        for uuid in &selection.holes {
            let hole = board.hole(uuid).ok_or(BoardError::NotFound { kind: ItemKind::Hole, uuid: *uuid })?;
            data.holes.push(hole.clone());
        }

        debug!(
            net_segments = data.net_segments.len(),
            planes = data.planes.len(),
            "Generated clipboard data"
        );
        Ok(data)
    }

    fn net_name(&self, net_signal: &Uuid) -> Result<CircuitIdentifier, BoardError> {
        self.project
            .circuit
            .net_signal(net_signal)
            .map(|signal| signal.name.clone())
            .ok_or(BoardError::NotFound { kind: ItemKind::NetSignal, uuid: *net_signal })
    }

    fn copy_segment(&self, segment: &NetSegment, selected: &SegmentSelection) -> Result<Vec<ClipNetSegment>, BoardError> {
        let mut splitter = NetSegmentSplitter::new();
        for via in &selected.vias {
            splitter.add_via(*via);
        }
        for netline in &selected.netlines {
            splitter.add_netline(*netline);
        }
        let net_name = self.net_name(&segment.net_signal())?;
        splitter
            .split(segment)
            .iter()
            .map(|piece| self.copy_piece(segment, selected, piece, net_name.clone()))
            .collect()
    }

    fn copy_piece(
        &self,
        segment: &NetSegment,
        selected: &SegmentSelection,
        piece: &Segment,
        net_name: CircuitIdentifier,
    ) -> Result<ClipNetSegment, BoardError> {
        let mut clip = ClipNetSegment::new(net_name);
        let mut replacements: HashMap<AnchorId, ClipAnchor> = HashMap::new();

        for anchor in &piece.anchors {
            let replacement = match anchor {
                AnchorId::Via(uuid) if selected.vias.contains(uuid) => {
                    let via = segment.via(uuid).ok_or(BoardError::NotFound { kind: ItemKind::Via, uuid: *uuid })?;
                    clip.vias.push(via.clone());
                    ClipAnchor::Via(*uuid)
                }
                AnchorId::Junction(uuid) => {
                    let netpoint = segment
                        .netpoint(uuid)
                        .ok_or(BoardError::NotFound { kind: ItemKind::NetPoint, uuid: *uuid })?;
                    clip.junctions.push(netpoint.clone());
                    ClipAnchor::Junction(*uuid)
                }
                // Excluded vias and pads stay behind; a fresh junction keeps
                // the trace ends in place.
                AnchorId::Via(_) | AnchorId::Pad(_) => {
                    let position = self.project.board.anchor_position(segment, anchor).ok_or_else(|| {
                        BoardError::UnresolvedAnchor {
                            netline: piece.netlines.first().copied().unwrap_or_default(),
                            anchor: *anchor,
                        }
                    })?;
                    let junction = NetPoint { uuid: Uuid::new_v4(), position };
                    clip.junctions.push(junction.clone());
                    ClipAnchor::Junction(junction.uuid)
                }
            };
            replacements.insert(*anchor, replacement);
        }

        for uuid in &piece.netlines {
            let netline = segment
                .netline(uuid)
                .ok_or(BoardError::NotFound { kind: ItemKind::NetLine, uuid: *uuid })?;
            let resolve = |anchor: &AnchorId| {
                replacements.get(anchor).copied().ok_or(BoardError::UnresolvedAnchor {
                    netline: netline.uuid,
                    anchor: *anchor,
                })
            };
            clip.traces.push(ClipTrace {
                uuid: netline.uuid,
                layer: netline.layer.clone(),
                width: netline.width,
                start: resolve(&netline.start)?,
                end: resolve(&netline.end)?,
            });
        }
        Ok(clip)
    }
}
