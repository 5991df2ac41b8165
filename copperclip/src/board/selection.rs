//! Selected board items
//!
//! The editor's selection is kept on the board as a set of [`ItemRef`]s.
//! [`SelectionQuery`] resolves it into the groups the copy and removal
//! engines work on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "uuid", rename_all = "snake_case")]
pub enum ItemRef {
    Via(Uuid),
    NetPoint(Uuid),
    NetLine(Uuid),
    Plane(Uuid),
    Polygon(Uuid),
    StrokeText(Uuid),
    Hole(Uuid),
}

/// Selected vias and net lines of one net segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentSelection {
    pub vias: BTreeSet<Uuid>,
    pub netlines: BTreeSet<Uuid>,
}

impl SegmentSelection {
    pub fn is_empty(&self) -> bool {
        self.vias.is_empty() && self.netlines.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionQuery {
    /// Keyed by net segment uuid.
    pub net_segments: BTreeMap<Uuid, SegmentSelection>,
    pub planes: BTreeSet<Uuid>,
    pub polygons: BTreeSet<Uuid>,
    pub stroke_texts: BTreeSet<Uuid>,
    pub holes: BTreeSet<Uuid>,
}

impl SelectionQuery {
    /// Group the board's current selection. Net points are not collected:
    /// they follow the net lines attached to them.
    pub fn from_board(board: &Board) -> Self {
        Self::from_items(board, board.selection().iter())
    }

    /// Group an explicit list of items. Items not found on the board are
    /// skipped.
    pub fn from_items<'a>(board: &Board, items: impl IntoIterator<Item = &'a ItemRef>) -> Self {
        let mut query = SelectionQuery::default();
        for item in items {
            match item {
                ItemRef::Via(uuid) => {
                    if let Some(seg) = board.net_segment_of_via(uuid) {
                        query.net_segments.entry(seg.uuid()).or_default().vias.insert(*uuid);
                    }
                }
                ItemRef::NetLine(uuid) => {
                    if let Some(seg) = board.net_segment_of_netline(uuid) {
                        query.net_segments.entry(seg.uuid()).or_default().netlines.insert(*uuid);
                    }
                }
                ItemRef::NetPoint(_) => {}
                ItemRef::Plane(uuid) if board.plane(uuid).is_some() => {
                    query.planes.insert(*uuid);
                }
                ItemRef::Polygon(uuid) if board.polygon(uuid).is_some() => {
                    query.polygons.insert(*uuid);
                }
                ItemRef::StrokeText(uuid) if board.stroke_text(uuid).is_some() => {
                    query.stroke_texts.insert(*uuid);
                }
                ItemRef::Hole(uuid) if board.hole(uuid).is_some() => {
                    query.holes.insert(*uuid);
                }
                ItemRef::Plane(_) | ItemRef::Polygon(_) | ItemRef::StrokeText(_) | ItemRef::Hole(_) => {}
            }
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self.net_segments.values().all(SegmentSelection::is_empty)
            && self.planes.is_empty()
            && self.polygons.is_empty()
            && self.stroke_texts.is_empty()
            && self.holes.is_empty()
    }
}
