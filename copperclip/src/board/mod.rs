//! Board data model
//!
//! The live board: layer stack, device pads, net segments and the loose
//! items (planes, polygons, stroke texts, holes). Every mutating method
//! validates completely before it changes anything, so a failed call leaves
//! the board untouched. Callers outside this crate go through
//! [`crate::cmd`] structural edits instead of calling these directly.

pub mod anchor;
pub mod items;
pub mod net_segment;
pub mod selection;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub use anchor::{AnchorId, PadId};
pub use items::{ConnectStyle, Hole, NetLine, NetPoint, Pad, Plane, Polygon, StrokeText, Via, ViaShape};
pub use net_segment::NetSegment;
pub use selection::{ItemRef, SegmentSelection, SelectionQuery};

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Via,
    NetPoint,
    NetLine,
    NetSegment,
    Pad,
    Plane,
    Polygon,
    StrokeText,
    Hole,
    NetClass,
    NetSignal,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Via => "Via",
            ItemKind::NetPoint => "Net point",
            ItemKind::NetLine => "Net line",
            ItemKind::NetSegment => "Net segment",
            ItemKind::Pad => "Pad",
            ItemKind::Plane => "Plane",
            ItemKind::Polygon => "Polygon",
            ItemKind::StrokeText => "Stroke text",
            ItemKind::Hole => "Hole",
            ItemKind::NetClass => "Net class",
            ItemKind::NetSignal => "Net signal",
        };
        f.write_str(name)
    }
}

/// Structural invariant violations of the board or circuit. These signal a
/// bug in the caller, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{kind} {uuid} already exists")]
    Duplicate { kind: ItemKind, uuid: Uuid },
    #[error("{kind} {uuid} does not exist")]
    NotFound { kind: ItemKind, uuid: Uuid },
    #[error("{kind} name '{name}' is already in use")]
    DuplicateName { kind: ItemKind, name: String },
    #[error("Net line {netline} references unknown {anchor}")]
    UnresolvedAnchor { netline: Uuid, anchor: AnchorId },
    #[error("Net line {0} starts and ends at the same anchor")]
    DegenerateNetLine(Uuid),
    #[error("{0} still has net lines attached")]
    AnchorInUse(AnchorId),
    #[error("Layer '{0}' is not a copper layer of the board")]
    NotACopperLayer(String),
    #[error("Layer '{0}' does not exist on the board")]
    UnknownLayer(String),
    #[error("{kind} {uuid} is still in use")]
    InUse { kind: ItemKind, uuid: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub copper: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new(&["top_cu", "bot_cu"], &["top_legend", "bot_legend", "brd_outlines"])
    }
}

impl LayerStack {
    pub fn new(copper: &[&str], other: &[&str]) -> Self {
        let layers = copper
            .iter()
            .map(|name| Layer { name: name.to_string(), copper: true })
            .chain(other.iter().map(|name| Layer { name: name.to_string(), copper: false }))
            .collect();
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name == name)
    }

    pub fn is_copper(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name == name && l.copper)
    }

    fn check_copper(&self, name: &str) -> Result<(), BoardError> {
        if self.is_copper(name) {
            Ok(())
        } else {
            Err(BoardError::NotACopperLayer(name.to_string()))
        }
    }

    fn check_exists(&self, name: &str) -> Result<(), BoardError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(BoardError::UnknownLayer(name.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    uuid: Uuid,
    name: String,
    layers: LayerStack,
    pads: BTreeMap<PadId, Pad>,
    net_segments: BTreeMap<Uuid, NetSegment>,
    planes: BTreeMap<Uuid, Plane>,
    polygons: BTreeMap<Uuid, Polygon>,
    stroke_texts: BTreeMap<Uuid, StrokeText>,
    holes: BTreeMap<Uuid, Hole>,
    selection: BTreeSet<ItemRef>,
}

impl Board {
    pub fn new(uuid: Uuid, name: impl Into<String>) -> Self {
        Self::with_layers(uuid, name, LayerStack::default())
    }

    pub fn with_layers(uuid: Uuid, name: impl Into<String>, layers: LayerStack) -> Self {
        Self {
            uuid,
            name: name.into(),
            layers,
            pads: BTreeMap::new(),
            net_segments: BTreeMap::new(),
            planes: BTreeMap::new(),
            polygons: BTreeMap::new(),
            stroke_texts: BTreeMap::new(),
            holes: BTreeMap::new(),
            selection: BTreeSet::new(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    // --- Pads ---------------------------------------------------------------

    /// Pads come with placed devices, which are managed outside this crate.
    pub fn add_pad(&mut self, pad: Pad) -> Result<(), BoardError> {
        if self.pads.contains_key(&pad.id) {
            return Err(BoardError::Duplicate { kind: ItemKind::Pad, uuid: pad.id.pad });
        }
        self.pads.insert(pad.id, pad);
        Ok(())
    }

    pub fn pad(&self, id: &PadId) -> Option<&Pad> {
        self.pads.get(id)
    }

    pub fn pads(&self) -> impl Iterator<Item = &Pad> {
        self.pads.values()
    }

    /// Position of any anchor on the board.
    pub fn anchor_position(&self, segment: &NetSegment, anchor: &AnchorId) -> Option<Point> {
        match anchor {
            AnchorId::Pad(id) => self.pads.get(id).map(|pad| pad.position),
            AnchorId::Via(_) | AnchorId::Junction(_) => segment.anchor_position(anchor),
        }
    }

    // --- Net segments -------------------------------------------------------

    pub fn net_segments(&self) -> impl Iterator<Item = &NetSegment> {
        self.net_segments.values()
    }

    pub fn net_segment(&self, uuid: &Uuid) -> Option<&NetSegment> {
        self.net_segments.get(uuid)
    }

    pub fn net_segment_count(&self) -> usize {
        self.net_segments.len()
    }

    pub fn net_segment_of_via(&self, via: &Uuid) -> Option<&NetSegment> {
        self.net_segments.values().find(|seg| seg.via(via).is_some())
    }

    pub fn net_segment_of_netline(&self, netline: &Uuid) -> Option<&NetSegment> {
        self.net_segments.values().find(|seg| seg.netline(netline).is_some())
    }

    pub fn net_segment_of_netpoint(&self, netpoint: &Uuid) -> Option<&NetSegment> {
        self.net_segments.values().find(|seg| seg.netpoint(netpoint).is_some())
    }

    /// Board-wide uniqueness and layer checks for elements about to be
    /// registered in any segment.
    fn check_new_elements(&self, vias: &[Via], netpoints: &[NetPoint], netlines: &[NetLine]) -> Result<(), BoardError> {
        for via in vias {
            if self.net_segment_of_via(&via.uuid).is_some() {
                return Err(BoardError::Duplicate { kind: ItemKind::Via, uuid: via.uuid });
            }
        }
        for netpoint in netpoints {
            if self.net_segment_of_netpoint(&netpoint.uuid).is_some() {
                return Err(BoardError::Duplicate { kind: ItemKind::NetPoint, uuid: netpoint.uuid });
            }
        }
        for netline in netlines {
            if self.net_segment_of_netline(&netline.uuid).is_some() {
                return Err(BoardError::Duplicate { kind: ItemKind::NetLine, uuid: netline.uuid });
            }
            self.layers.check_copper(&netline.layer)?;
        }
        Ok(())
    }

    /// Add a net segment together with whatever elements it already holds.
    pub fn add_net_segment(&mut self, segment: NetSegment) -> Result<(), BoardError> {
        if self.net_segments.contains_key(&segment.uuid()) {
            return Err(BoardError::Duplicate { kind: ItemKind::NetSegment, uuid: segment.uuid() });
        }
        let vias: Vec<Via> = segment.vias().cloned().collect();
        let netpoints: Vec<NetPoint> = segment.netpoints().cloned().collect();
        let netlines: Vec<NetLine> = segment.netlines().cloned().collect();
        self.check_new_elements(&vias, &netpoints, &netlines)?;
        for netline in &netlines {
            for anchor in [netline.start, netline.end] {
                if let AnchorId::Pad(id) = anchor {
                    if !self.pads.contains_key(&id) {
                        return Err(BoardError::UnresolvedAnchor { netline: netline.uuid, anchor });
                    }
                }
            }
        }
        self.net_segments.insert(segment.uuid(), segment);
        Ok(())
    }

    /// Remove a whole net segment and return it.
    pub fn remove_net_segment(&mut self, uuid: &Uuid) -> Result<NetSegment, BoardError> {
        let segment = self
            .net_segments
            .remove(uuid)
            .ok_or(BoardError::NotFound { kind: ItemKind::NetSegment, uuid: *uuid })?;
        self.selection.retain(|item| !item_in_segment(item, &segment));
        Ok(segment)
    }

    pub fn add_net_segment_elements(
        &mut self,
        segment: &Uuid,
        vias: &[Via],
        netpoints: &[NetPoint],
        netlines: &[NetLine],
    ) -> Result<(), BoardError> {
        if !self.net_segments.contains_key(segment) {
            return Err(BoardError::NotFound { kind: ItemKind::NetSegment, uuid: *segment });
        }
        self.check_new_elements(vias, netpoints, netlines)?;
        let pads = &self.pads;
        let pad_exists = |anchor: &AnchorId| match anchor {
            AnchorId::Pad(id) => pads.contains_key(id),
            AnchorId::Via(_) | AnchorId::Junction(_) => false,
        };
        match self.net_segments.get_mut(segment) {
            Some(seg) => seg.add_elements(vias, netpoints, netlines, pad_exists),
            None => Err(BoardError::NotFound { kind: ItemKind::NetSegment, uuid: *segment }),
        }
    }

    pub fn remove_net_segment_elements(
        &mut self,
        segment: &Uuid,
        vias: &[Uuid],
        netpoints: &[Uuid],
        netlines: &[Uuid],
    ) -> Result<(), BoardError> {
        let seg = self
            .net_segments
            .get_mut(segment)
            .ok_or(BoardError::NotFound { kind: ItemKind::NetSegment, uuid: *segment })?;
        seg.remove_elements(vias, netpoints, netlines)?;
        for uuid in vias {
            self.selection.remove(&ItemRef::Via(*uuid));
        }
        for uuid in netpoints {
            self.selection.remove(&ItemRef::NetPoint(*uuid));
        }
        for uuid in netlines {
            self.selection.remove(&ItemRef::NetLine(*uuid));
        }
        Ok(())
    }

    // --- Loose items --------------------------------------------------------

    pub fn planes(&self) -> impl Iterator<Item = &Plane> {
        self.planes.values()
    }

    pub fn plane(&self, uuid: &Uuid) -> Option<&Plane> {
        self.planes.get(uuid)
    }

    pub fn add_plane(&mut self, plane: Plane) -> Result<(), BoardError> {
        if self.planes.contains_key(&plane.uuid) {
            return Err(BoardError::Duplicate { kind: ItemKind::Plane, uuid: plane.uuid });
        }
        self.layers.check_copper(&plane.layer)?;
        self.planes.insert(plane.uuid, plane);
        Ok(())
    }

    pub fn remove_plane(&mut self, uuid: &Uuid) -> Result<Plane, BoardError> {
        let plane = self
            .planes
            .remove(uuid)
            .ok_or(BoardError::NotFound { kind: ItemKind::Plane, uuid: *uuid })?;
        self.selection.remove(&ItemRef::Plane(*uuid));
        Ok(plane)
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons.values()
    }

    pub fn polygon(&self, uuid: &Uuid) -> Option<&Polygon> {
        self.polygons.get(uuid)
    }

    pub fn add_polygon(&mut self, polygon: Polygon) -> Result<(), BoardError> {
        if self.polygons.contains_key(&polygon.uuid) {
            return Err(BoardError::Duplicate { kind: ItemKind::Polygon, uuid: polygon.uuid });
        }
        self.layers.check_exists(&polygon.layer)?;
        self.polygons.insert(polygon.uuid, polygon);
        Ok(())
    }

    pub fn remove_polygon(&mut self, uuid: &Uuid) -> Result<Polygon, BoardError> {
        let polygon = self
            .polygons
            .remove(uuid)
            .ok_or(BoardError::NotFound { kind: ItemKind::Polygon, uuid: *uuid })?;
        self.selection.remove(&ItemRef::Polygon(*uuid));
        Ok(polygon)
    }

    pub fn stroke_texts(&self) -> impl Iterator<Item = &StrokeText> {
        self.stroke_texts.values()
    }

    pub fn stroke_text(&self, uuid: &Uuid) -> Option<&StrokeText> {
        self.stroke_texts.get(uuid)
    }

    pub fn add_stroke_text(&mut self, text: StrokeText) -> Result<(), BoardError> {
        if self.stroke_texts.contains_key(&text.uuid) {
            return Err(BoardError::Duplicate { kind: ItemKind::StrokeText, uuid: text.uuid });
        }
        self.layers.check_exists(&text.layer)?;
        self.stroke_texts.insert(text.uuid, text);
        Ok(())
    }

    pub fn remove_stroke_text(&mut self, uuid: &Uuid) -> Result<StrokeText, BoardError> {
        let text = self
            .stroke_texts
            .remove(uuid)
            .ok_or(BoardError::NotFound { kind: ItemKind::StrokeText, uuid: *uuid })?;
        self.selection.remove(&ItemRef::StrokeText(*uuid));
        Ok(text)
    }

    pub fn holes(&self) -> impl Iterator<Item = &Hole> {
        self.holes.values()
    }

    pub fn hole(&self, uuid: &Uuid) -> Option<&Hole> {
        self.holes.get(uuid)
    }

    pub fn add_hole(&mut self, hole: Hole) -> Result<(), BoardError> {
        if self.holes.contains_key(&hole.uuid) {
            return Err(BoardError::Duplicate { kind: ItemKind::Hole, uuid: hole.uuid });
        }
        self.holes.insert(hole.uuid, hole);
        Ok(())
    }

    pub fn remove_hole(&mut self, uuid: &Uuid) -> Result<Hole, BoardError> {
        let hole = self
            .holes
            .remove(uuid)
            .ok_or(BoardError::NotFound { kind: ItemKind::Hole, uuid: *uuid })?;
        self.selection.remove(&ItemRef::Hole(*uuid));
        Ok(hole)
    }

    // --- Selection ----------------------------------------------------------

    pub fn contains_item(&self, item: &ItemRef) -> bool {
        match item {
            ItemRef::Via(uuid) => self.net_segment_of_via(uuid).is_some(),
            ItemRef::NetPoint(uuid) => self.net_segment_of_netpoint(uuid).is_some(),
            ItemRef::NetLine(uuid) => self.net_segment_of_netline(uuid).is_some(),
            ItemRef::Plane(uuid) => self.planes.contains_key(uuid),
            ItemRef::Polygon(uuid) => self.polygons.contains_key(uuid),
            ItemRef::StrokeText(uuid) => self.stroke_texts.contains_key(uuid),
            ItemRef::Hole(uuid) => self.holes.contains_key(uuid),
        }
    }

    /// Select an item. Returns `false` if the item is not on the board.
    pub fn select(&mut self, item: ItemRef) -> bool {
        if self.contains_item(&item) {
            self.selection.insert(item);
            true
        } else {
            false
        }
    }

    pub fn deselect(&mut self, item: &ItemRef) {
        self.selection.remove(item);
    }

    pub fn is_selected(&self, item: &ItemRef) -> bool {
        self.selection.contains(item)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &BTreeSet<ItemRef> {
        &self.selection
    }

    pub(crate) fn restore_selection(&mut self, selection: BTreeSet<ItemRef>) {
        self.selection = selection.into_iter().filter(|item| self.contains_item(item)).collect();
    }

    /// Query over the currently selected items.
    pub fn selection_query(&self) -> SelectionQuery {
        SelectionQuery::from_board(self)
    }
}

fn item_in_segment(item: &ItemRef, segment: &NetSegment) -> bool {
    match item {
        ItemRef::Via(uuid) => segment.via(uuid).is_some(),
        ItemRef::NetPoint(uuid) => segment.netpoint(uuid).is_some(),
        ItemRef::NetLine(uuid) => segment.netline(uuid).is_some(),
        ItemRef::Plane(_) | ItemRef::Polygon(_) | ItemRef::StrokeText(_) | ItemRef::Hole(_) => false,
    }
}
