//! Clipboard snapshot types
//!
//! A snapshot is an owned copy of selected board content. It refers to
//! nothing outside itself: nets are kept by name, and trace endpoints only
//! point at vias and junctions of the same clipboard net segment.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use uuid::Uuid;

use super::codec::CodecError;
use crate::board::{ConnectStyle, Hole, NetPoint, Polygon, StrokeText, Via};
use crate::circuit::CircuitIdentifier;
use crate::geometry::{Path, Point, PositiveLength, UnsignedLength};

/// Endpoint of a clipboard trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "uuid", rename_all = "snake_case")]
pub enum ClipAnchor {
    Via(Uuid),
    Junction(Uuid),
}

impl ClipAnchor {
    pub fn uuid(&self) -> Uuid {
        match self {
            ClipAnchor::Via(uuid) | ClipAnchor::Junction(uuid) => *uuid,
        }
    }
}

impl fmt::Display for ClipAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipAnchor::Via(uuid) => write!(f, "via {}", uuid),
            ClipAnchor::Junction(uuid) => write!(f, "junction {}", uuid),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipTrace {
    pub uuid: Uuid,
    pub layer: String,
    pub width: PositiveLength,
    pub start: ClipAnchor,
    pub end: ClipAnchor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipNetSegment {
    pub net_name: CircuitIdentifier,
    pub vias: Vec<Via>,
    pub junctions: Vec<NetPoint>,
    pub traces: Vec<ClipTrace>,
}

impl ClipNetSegment {
    pub fn new(net_name: CircuitIdentifier) -> Self {
        Self {
            net_name,
            vias: Vec::new(),
            junctions: Vec::new(),
            traces: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipPlane {
    pub uuid: Uuid,
    pub layer: String,
    pub net_name: CircuitIdentifier,
    pub outline: Path,
    pub min_width: UnsignedLength,
    pub min_clearance: UnsignedLength,
    pub keep_orphans: bool,
    pub priority: i32,
    pub connect_style: ConnectStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardClipboardData {
    pub board_uuid: Uuid,
    pub cursor_pos: Point,
    pub net_segments: Vec<ClipNetSegment>,
    pub planes: Vec<ClipPlane>,
    pub polygons: Vec<Polygon>,
    pub stroke_texts: Vec<StrokeText>,
    pub holes: Vec<Hole>,
}

/// Item counts of a snapshot, e.g. for the command line inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClipboardSummary {
    pub board: Uuid,
    pub cursor: Point,
    pub net_segments: usize,
    pub vias: usize,
    pub junctions: usize,
    pub traces: usize,
    pub planes: usize,
    pub polygons: usize,
    pub stroke_texts: usize,
    pub holes: usize,
    pub nets: BTreeSet<String>,
}

impl BoardClipboardData {
    pub fn new(board_uuid: Uuid, cursor_pos: Point) -> Self {
        Self {
            board_uuid,
            cursor_pos,
            net_segments: Vec::new(),
            planes: Vec::new(),
            polygons: Vec::new(),
            stroke_texts: Vec::new(),
            holes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.net_segments.is_empty()
            && self.planes.is_empty()
            && self.polygons.is_empty()
            && self.stroke_texts.is_empty()
            && self.holes.is_empty()
    }

    /// Check that identities are unique and every trace endpoint exists in
    /// its own net segment. Reports the first problem found.
    pub fn validate(&self) -> Result<(), CodecError> {
        let mut seen = HashSet::new();
        let mut unique = |uuid: Uuid| {
            if seen.insert(uuid) {
                Ok(())
            } else {
                Err(CodecError::DuplicateIdentity(uuid))
            }
        };

        for segment in &self.net_segments {
            let mut anchors = HashSet::new();
            for via in &segment.vias {
                unique(via.uuid)?;
                anchors.insert(ClipAnchor::Via(via.uuid));
            }
            for junction in &segment.junctions {
                unique(junction.uuid)?;
                anchors.insert(ClipAnchor::Junction(junction.uuid));
            }
            for trace in &segment.traces {
                unique(trace.uuid)?;
                for anchor in [trace.start, trace.end] {
                    if !anchors.contains(&anchor) {
                        return Err(CodecError::DanglingReference {
                            trace: trace.uuid,
                            anchor: anchor.to_string(),
                        });
                    }
                }
                if trace.start == trace.end {
                    return Err(CodecError::InvalidValue {
                        field: "trace".to_string(),
                        value: trace.uuid.to_string(),
                        reason: "starts and ends at the same anchor".to_string(),
                    });
                }
            }
        }
        for plane in &self.planes {
            unique(plane.uuid)?;
        }
        for polygon in &self.polygons {
            unique(polygon.uuid)?;
        }
        for text in &self.stroke_texts {
            unique(text.uuid)?;
        }
        for hole in &self.holes {
            unique(hole.uuid)?;
        }
        Ok(())
    }

    pub fn summary(&self) -> ClipboardSummary {
        let nets = self
            .net_segments
            .iter()
            .map(|s| s.net_name.to_string())
            .chain(self.planes.iter().map(|p| p.net_name.to_string()))
            .collect();
        ClipboardSummary {
            board: self.board_uuid,
            cursor: self.cursor_pos,
            net_segments: self.net_segments.len(),
            vias: self.net_segments.iter().map(|s| s.vias.len()).sum(),
            junctions: self.net_segments.iter().map(|s| s.junctions.len()).sum(),
            traces: self.net_segments.iter().map(|s| s.traces.len()).sum(),
            planes: self.planes.len(),
            polygons: self.polygons.len(),
            stroke_texts: self.stroke_texts.len(),
            holes: self.holes.len(),
            nets,
        }
    }
}
