//! Net line anchors.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A pad of a placed device. Pads are owned by their footprint and only
/// referenced by net lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PadId {
    pub device: Uuid,
    pub pad: Uuid,
}

impl PadId {
    pub fn new(device: Uuid, pad: Uuid) -> Self {
        Self { device, pad }
    }
}

/// Something a net line can end at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnchorId {
    Via(Uuid),
    /// A net point: bend or branch point of traces on one layer.
    Junction(Uuid),
    Pad(PadId),
}

impl AnchorId {
    pub fn is_pad(&self) -> bool {
        matches!(self, AnchorId::Pad(_))
    }

    pub fn as_via(&self) -> Option<Uuid> {
        match self {
            AnchorId::Via(uuid) => Some(*uuid),
            AnchorId::Junction(_) | AnchorId::Pad(_) => None,
        }
    }

    pub fn as_junction(&self) -> Option<Uuid> {
        match self {
            AnchorId::Junction(uuid) => Some(*uuid),
            AnchorId::Via(_) | AnchorId::Pad(_) => None,
        }
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorId::Via(uuid) => write!(f, "via {}", uuid),
            AnchorId::Junction(uuid) => write!(f, "junction {}", uuid),
            AnchorId::Pad(pad) => write!(f, "pad {}/{}", pad.device, pad.pad),
        }
    }
}
