use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use super::edit::{EditGroup, StructuralEdit};
use super::transaction::{EditSink, Transaction};
use crate::board::{AnchorId, BoardError, Hole, ItemRef, NetLine, NetPoint, NetSegment, Plane, Polygon, StrokeText, Via};
use crate::circuit::{CircuitIdentifier, NetClass, NetSignal};
use crate::clipboard::{BoardClipboardData, ClipAnchor, ClipNetSegment, ClipPlane};
use crate::core::{ClipboardOptions, CopperclipError};
use crate::geometry::Point;
use crate::project::Project;

pub const PASTE_TITLE: &str = "Paste Board Elements";

/// Rebuilds a clipboard snapshot on a board.
///
/// Everything is created with fresh identities, moved by `offset` and
/// selected. Net segments and planes are attached to the net with the same
/// name, which is created if the circuit has none.
#[derive(Debug, Clone)]
pub struct PasteBoardItems {
    data: BoardClipboardData,
    offset: Point,
}

impl PasteBoardItems {
    pub fn new(data: BoardClipboardData, offset: Point) -> Self {
        Self { data, offset }
    }

    pub fn data(&self) -> &BoardClipboardData {
        &self.data
    }

    /// Paste in a single transaction. On error the project is left as it
    /// was.
    pub fn execute(&self, project: &mut Project, options: &ClipboardOptions) -> Result<EditGroup, CopperclipError> {
        let mut tx = Transaction::begin(project, PASTE_TITLE);
        let pasted = self.execute_in(&mut tx, options)?;
        let group = tx.commit();
        info!(items = pasted.len(), edits = group.edits.len(), "Pasted board elements");
        Ok(group)
    }

    /// Send the paste edits to `sink` and return the created items. The
    /// snapshot is validated before the first edit.
    pub fn execute_in<S: EditSink + ?Sized>(
        &self,
        sink: &mut S,
        options: &ClipboardOptions,
    ) -> Result<Vec<ItemRef>, CopperclipError> {
        self.data
            .validate()
            .map_err(|e| CopperclipError::MalformedSnapshot(e.to_string()))?;

        sink.clear_selection();
        let mut pasted = Vec::new();
        for segment in &self.data.net_segments {
            self.paste_net_segment(sink, options, segment, &mut pasted)?;
        }
        for plane in &self.data.planes {
            self.paste_plane(sink, options, plane, &mut pasted)?;
        }
        for polygon in &self.data.polygons {
            check_layer_exists(sink, &polygon.layer)?;
            let path = polygon.path.checked_translated(self.offset).ok_or_else(|| self.out_of_range("polygon"))?;
            let copy = Polygon {
                uuid: Uuid::new_v4(),
                path,
                ..polygon.clone()
            };
            pasted.push(ItemRef::Polygon(copy.uuid));
            sink.execute(StructuralEdit::AddPolygon(copy))?;
        }
        for text in &self.data.stroke_texts {
            check_layer_exists(sink, &text.layer)?;
            let copy = StrokeText {
                uuid: Uuid::new_v4(),
                position: self.translate(text.position)?,
                ..text.clone()
            };
            pasted.push(ItemRef::StrokeText(copy.uuid));
            sink.execute(StructuralEdit::AddStrokeText(copy))?;
        }
        for hole in &self.data.holes {
            let copy = Hole {
                uuid: Uuid::new_v4(),
                position: self.translate(hole.position)?,
                ..hole.clone()
            };
            pasted.push(ItemRef::Hole(copy.uuid));
            sink.execute(StructuralEdit::AddHole(copy))?;
        }

        for item in &pasted {
            sink.select(*item);
        }
        Ok(pasted)
    }

    fn translate(&self, position: Point) -> Result<Point, CopperclipError> {
        position.checked_translated(self.offset).ok_or_else(|| {
            CopperclipError::MalformedSnapshot(format!(
                "position {} moved by {} is out of range",
                position, self.offset
            ))
        })
    }

    fn out_of_range(&self, what: &str) -> CopperclipError {
        CopperclipError::MalformedSnapshot(format!("{} outline moved by {} is out of range", what, self.offset))
    }

    fn paste_net_segment<S: EditSink + ?Sized>(
        &self,
        sink: &mut S,
        options: &ClipboardOptions,
        segment: &ClipNetSegment,
        pasted: &mut Vec<ItemRef>,
    ) -> Result<(), CopperclipError> {
        let net_signal = resolve_net_signal(sink, options, &segment.net_name)?;
        let new_segment = NetSegment::new(Uuid::new_v4(), net_signal);
        let segment_uuid = new_segment.uuid();
        sink.execute(StructuralEdit::AddNetSegment(new_segment))?;

        let mut remap: HashMap<ClipAnchor, AnchorId> = HashMap::new();
        let mut vias = Vec::with_capacity(segment.vias.len());
        for via in &segment.vias {
            let copy = Via {
                uuid: Uuid::new_v4(),
                position: self.translate(via.position)?,
                ..via.clone()
            };
            remap.insert(ClipAnchor::Via(via.uuid), AnchorId::Via(copy.uuid));
            vias.push(copy);
        }
        let mut netpoints = Vec::with_capacity(segment.junctions.len());
        for junction in &segment.junctions {
            let copy = NetPoint {
                uuid: Uuid::new_v4(),
                position: self.translate(junction.position)?,
            };
            remap.insert(ClipAnchor::Junction(junction.uuid), AnchorId::Junction(copy.uuid));
            netpoints.push(copy);
        }

        let mut netlines = Vec::with_capacity(segment.traces.len());
        for trace in &segment.traces {
            if !sink.project().board.layers().is_copper(&trace.layer) {
                return Err(CopperclipError::DestinationConflict(format!(
                    "copper layer '{}' does not exist on the board",
                    trace.layer
                )));
            }
            let uuid = Uuid::new_v4();
            let resolve = |anchor: &ClipAnchor| {
                remap.get(anchor).copied().ok_or_else(|| {
                    let unresolved = match anchor {
                        ClipAnchor::Via(uuid) => AnchorId::Via(*uuid),
                        ClipAnchor::Junction(uuid) => AnchorId::Junction(*uuid),
                    };
                    CopperclipError::Invariant(BoardError::UnresolvedAnchor { netline: uuid, anchor: unresolved })
                })
            };
            netlines.push(NetLine {
                uuid,
                start: resolve(&trace.start)?,
                end: resolve(&trace.end)?,
                layer: trace.layer.clone(),
                width: trace.width,
            });
        }

        pasted.extend(vias.iter().map(|v| ItemRef::Via(v.uuid)));
        pasted.extend(netpoints.iter().map(|p| ItemRef::NetPoint(p.uuid)));
        pasted.extend(netlines.iter().map(|l| ItemRef::NetLine(l.uuid)));
        debug!(
            net = %segment.net_name,
            vias = vias.len(),
            netpoints = netpoints.len(),
            netlines = netlines.len(),
            "Pasting net segment"
        );
        sink.execute(StructuralEdit::AddNetSegmentElements {
            segment: segment_uuid,
            vias,
            netpoints,
            netlines,
        })
    }

    fn paste_plane<S: EditSink + ?Sized>(
        &self,
        sink: &mut S,
        options: &ClipboardOptions,
        plane: &ClipPlane,
        pasted: &mut Vec<ItemRef>,
    ) -> Result<(), CopperclipError> {
        if !sink.project().board.layers().is_copper(&plane.layer) {
            return Err(CopperclipError::DestinationConflict(format!(
                "copper layer '{}' does not exist on the board",
                plane.layer
            )));
        }
        let outline = plane.outline.checked_translated(self.offset).ok_or_else(|| self.out_of_range("plane"))?;
        let net_signal = resolve_net_signal(sink, options, &plane.net_name)?;
        let copy = Plane {
            uuid: Uuid::new_v4(),
            layer: plane.layer.clone(),
            net_signal,
            outline,
            min_width: plane.min_width,
            min_clearance: plane.min_clearance,
            keep_orphans: plane.keep_orphans,
            priority: plane.priority,
            connect_style: plane.connect_style,
        };
        pasted.push(ItemRef::Plane(copy.uuid));
        sink.execute(StructuralEdit::AddPlane(copy))
    }
}

fn check_layer_exists<S: EditSink + ?Sized>(sink: &S, layer: &str) -> Result<(), CopperclipError> {
    if sink.project().board.layers().contains(layer) {
        Ok(())
    } else {
        Err(CopperclipError::DestinationConflict(format!(
            "layer '{}' does not exist on the board",
            layer
        )))
    }
}

/// Net signal named `name`, created together with the default net class if
/// needed.
fn resolve_net_signal<S: EditSink + ?Sized>(
    sink: &mut S,
    options: &ClipboardOptions,
    name: &CircuitIdentifier,
) -> Result<Uuid, CopperclipError> {
    if let Some(signal) = sink.project().circuit.net_signal_by_name(name.as_str()) {
        return Ok(signal.uuid);
    }

    let net_class = match sink.project().circuit.net_class_by_name(&options.default_net_class) {
        Some(class) => class.uuid,
        None => {
            let class_name = CircuitIdentifier::new(options.default_net_class.as_str())
                .map_err(|e| CopperclipError::DestinationConflict(e.to_string()))?;
            let class = NetClass { uuid: Uuid::new_v4(), name: class_name };
            let uuid = class.uuid;
            sink.execute(StructuralEdit::AddNetClass(class))?;
            uuid
        }
    };
    let signal = NetSignal {
        uuid: Uuid::new_v4(),
        name: name.clone(),
        net_class,
    };
    let uuid = signal.uuid;
    debug!(net = %name, "Creating net signal for pasted copper");
    sink.execute(StructuralEdit::AddNetSignal(signal))?;
    Ok(uuid)
}
