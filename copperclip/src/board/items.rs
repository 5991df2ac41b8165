//! Board item definitions
//!
//! Plain data; ownership and registration rules live in [`super::Board`] and
//! [`super::NetSegment`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::anchor::{AnchorId, PadId};
use crate::geometry::{Angle, Path, Point, PositiveLength, UnsignedLength};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViaShape {
    Round,
    Square,
    Octagon,
}

impl fmt::Display for ViaShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViaShape::Round => "round",
            ViaShape::Square => "square",
            ViaShape::Octagon => "octagon",
        };
        f.write_str(name)
    }
}

impl FromStr for ViaShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round" => Ok(ViaShape::Round),
            "square" => Ok(ViaShape::Square),
            "octagon" => Ok(ViaShape::Octagon),
            other => Err(format!("unknown via shape '{}'", other)),
        }
    }
}

/// Plated hole; connects copper on all layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Via {
    pub uuid: Uuid,
    pub position: Point,
    pub shape: ViaShape,
    pub size: PositiveLength,
    pub drill_diameter: PositiveLength,
}

/// Net point (junction). Carries no copper of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetPoint {
    pub uuid: Uuid,
    pub position: Point,
}

/// A trace segment on one copper layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetLine {
    pub uuid: Uuid,
    pub start: AnchorId,
    pub end: AnchorId,
    pub layer: String,
    pub width: PositiveLength,
}

impl NetLine {
    /// The endpoint opposite to `anchor`, or `None` if `anchor` is not an
    /// endpoint of this line.
    pub fn other_end(&self, anchor: &AnchorId) -> Option<AnchorId> {
        if self.start == *anchor {
            Some(self.end)
        } else if self.end == *anchor {
            Some(self.start)
        } else {
            None
        }
    }

    pub fn touches(&self, anchor: &AnchorId) -> bool {
        self.start == *anchor || self.end == *anchor
    }
}

/// Footprint pad as seen by the copper network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pad {
    pub id: PadId,
    pub position: Point,
    pub net_signal: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectStyle {
    None,
    Solid,
}

impl fmt::Display for ConnectStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectStyle::None => f.write_str("none"),
            ConnectStyle::Solid => f.write_str("solid"),
        }
    }
}

impl FromStr for ConnectStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ConnectStyle::None),
            "solid" => Ok(ConnectStyle::Solid),
            other => Err(format!("unknown connect style '{}'", other)),
        }
    }
}

/// Copper fill area bound to a net signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plane {
    pub uuid: Uuid,
    pub layer: String,
    pub net_signal: Uuid,
    pub outline: Path,
    pub min_width: UnsignedLength,
    pub min_clearance: UnsignedLength,
    pub keep_orphans: bool,
    pub priority: i32,
    pub connect_style: ConnectStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    pub uuid: Uuid,
    pub layer: String,
    pub line_width: UnsignedLength,
    pub is_filled: bool,
    pub is_grab_area: bool,
    pub path: Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeText {
    pub uuid: Uuid,
    pub layer: String,
    pub text: String,
    pub position: Point,
    pub rotation: Angle,
    pub height: PositiveLength,
    pub stroke_width: UnsignedLength,
    pub mirrored: bool,
}

/// Non-plated hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hole {
    pub uuid: Uuid,
    pub position: Point,
    pub diameter: PositiveLength,
}
