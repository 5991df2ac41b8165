//! Clipboard text format and media type
//!
//! Snapshots travel as a pretty-printed S-expression rooted at
//! `(copperclip_clipboard_board ...)`. On the transport they are stored
//! under a media type that carries the producing application version;
//! payloads of any other version are refused instead of being guessed at.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use super::data::{BoardClipboardData, ClipAnchor, ClipNetSegment, ClipPlane, ClipTrace};
use crate::board::{Hole, NetPoint, Polygon, StrokeText, Via};
use crate::geometry::{Path, Point, Vertex};
use crate::parser::{self, ParseError, SExp};

pub const ROOT_TAG: &str = "copperclip_clipboard_board";
pub const MIME_TYPE_BASE: &str = "application/x-copperclip-clipboard.board";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Syntax error: {0}")]
    Sexp(#[from] ParseError),
    #[error("Missing '{field}' in '{node}'")]
    MissingField { node: String, field: String },
    #[error("Invalid {field} '{value}': {reason}")]
    InvalidValue { field: String, value: String, reason: String },
    #[error("Trace {trace} references {anchor}, which is not part of its net segment")]
    DanglingReference { trace: Uuid, anchor: String },
    #[error("Identity {0} is used more than once")]
    DuplicateIdentity(Uuid),
    #[error("Clipboard data is from version {found}, expected version {expected}")]
    UnsupportedVersion { expected: String, found: String },
    #[error("Clipboard payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Media type under which snapshots of `app_version` are stored.
pub fn media_type(app_version: &str) -> String {
    format!("{}; version={}", MIME_TYPE_BASE, app_version)
}

/// Version part of a board clipboard media type, `None` for other types.
fn media_type_version(media_type: &str) -> Option<&str> {
    let rest = media_type.strip_prefix(MIME_TYPE_BASE)?;
    let rest = rest.trim_start().strip_prefix(';')?;
    rest.trim().strip_prefix("version=")
}

/// Transport container: payloads keyed by media type plus an optional plain
/// text rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MimeData {
    formats: BTreeMap<String, Vec<u8>>,
    text: Option<String>,
}

impl MimeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, media_type: impl Into<String>, data: Vec<u8>) {
        self.formats.insert(media_type.into(), data);
    }

    pub fn data(&self, media_type: &str) -> Option<&[u8]> {
        self.formats.get(media_type).map(Vec::as_slice)
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.formats.keys().map(String::as_str)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

// --- Reading helpers ---------------------------------------------------------

fn missing(node: &SExp, field: &str) -> CodecError {
    CodecError::MissingField {
        node: node.name().unwrap_or("?").to_string(),
        field: field.to_string(),
    }
}

fn invalid(field: &str, value: &str, reason: impl Display) -> CodecError {
    CodecError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_atom<T>(field: &str, value: &str) -> Result<T, CodecError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e| invalid(field, value, e))
}

/// Value of the child `(key VALUE)`.
fn read<T>(node: &SExp, key: &str) -> Result<T, CodecError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = node.value_at(key).ok_or_else(|| missing(node, key))?;
    parse_atom(key, value)
}

/// Positional argument `index` of `node` itself.
fn read_arg<T>(node: &SExp, index: usize, field: &str) -> Result<T, CodecError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = node.arg(index).and_then(SExp::as_atom).ok_or_else(|| missing(node, field))?;
    parse_atom(field, value)
}

fn read_uuid(node: &SExp) -> Result<Uuid, CodecError> {
    read_arg(node, 0, "uuid")
}

fn read_point(node: &SExp, key: &str) -> Result<Point, CodecError> {
    let child = node.get(key).ok_or_else(|| missing(node, key))?;
    Ok(Point::new(read_arg(child, 0, "x")?, read_arg(child, 1, "y")?))
}

fn read_path(node: &SExp) -> Result<Path, CodecError> {
    node.get_all("vertex")
        .into_iter()
        .map(|vertex| {
            Ok(Vertex {
                pos: read_point(vertex, "position")?,
                angle: read(vertex, "angle")?,
            })
        })
        .collect::<Result<Vec<_>, CodecError>>()
        .map(Path::new)
}

fn read_clip_anchor(node: &SExp, key: &str) -> Result<ClipAnchor, CodecError> {
    let end = node.get(key).ok_or_else(|| missing(node, key))?;
    if let Some(via) = end.get("via") {
        Ok(ClipAnchor::Via(read_uuid(via)?))
    } else if let Some(junction) = end.get("junction") {
        Ok(ClipAnchor::Junction(read_uuid(junction)?))
    } else {
        Err(missing(end, "via|junction"))
    }
}

// --- Writing helpers ---------------------------------------------------------

fn point_node(name: &str, point: Point) -> SExp {
    SExp::node(name)
        .with(SExp::token(point.x.to_string()))
        .with(SExp::token(point.y.to_string()))
}

fn uuid_node(name: &str, uuid: Uuid) -> SExp {
    SExp::pair(name, uuid)
}

fn push_path(node: &mut SExp, path: &Path) {
    for vertex in path.vertices() {
        node.push(
            SExp::node("vertex")
                .with(point_node("position", vertex.pos))
                .with(SExp::pair("angle", vertex.angle)),
        );
    }
}

fn clip_anchor_node(name: &str, anchor: ClipAnchor) -> SExp {
    let target = match anchor {
        ClipAnchor::Via(uuid) => uuid_node("via", uuid),
        ClipAnchor::Junction(uuid) => uuid_node("junction", uuid),
    };
    SExp::node(name).with(target)
}

// --- Item mapping ------------------------------------------------------------

fn via_to_sexp(via: &Via) -> SExp {
    uuid_node("via", via.uuid)
        .with(point_node("position", via.position))
        .with(SExp::pair("size", via.size))
        .with(SExp::pair("drill", via.drill_diameter))
        .with(SExp::pair("shape", via.shape))
}

fn via_from_sexp(node: &SExp) -> Result<Via, CodecError> {
    Ok(Via {
        uuid: read_uuid(node)?,
        position: read_point(node, "position")?,
        shape: read(node, "shape")?,
        size: read(node, "size")?,
        drill_diameter: read(node, "drill")?,
    })
}

fn trace_to_sexp(trace: &ClipTrace) -> SExp {
    uuid_node("trace", trace.uuid)
        .with(SExp::pair("layer", &trace.layer))
        .with(SExp::pair("width", trace.width))
        .with(clip_anchor_node("from", trace.start))
        .with(clip_anchor_node("to", trace.end))
}

fn trace_from_sexp(node: &SExp) -> Result<ClipTrace, CodecError> {
    Ok(ClipTrace {
        uuid: read_uuid(node)?,
        layer: read(node, "layer")?,
        width: read(node, "width")?,
        start: read_clip_anchor(node, "from")?,
        end: read_clip_anchor(node, "to")?,
    })
}

fn net_segment_to_sexp(segment: &ClipNetSegment) -> SExp {
    let mut node = SExp::node("netsegment").with(SExp::string_pair("net", segment.net_name.as_str()));
    for via in &segment.vias {
        node.push(via_to_sexp(via));
    }
    for junction in &segment.junctions {
        node.push(uuid_node("junction", junction.uuid).with(point_node("position", junction.position)));
    }
    for trace in &segment.traces {
        node.push(trace_to_sexp(trace));
    }
    node
}

fn net_segment_from_sexp(node: &SExp) -> Result<ClipNetSegment, CodecError> {
    let mut segment = ClipNetSegment::new(read(node, "net")?);
    for via in node.get_all("via") {
        segment.vias.push(via_from_sexp(via)?);
    }
    for junction in node.get_all("junction") {
        segment.junctions.push(NetPoint {
            uuid: read_uuid(junction)?,
            position: read_point(junction, "position")?,
        });
    }
    for trace in node.get_all("trace") {
        segment.traces.push(trace_from_sexp(trace)?);
    }
    Ok(segment)
}

fn plane_to_sexp(plane: &ClipPlane) -> SExp {
    let mut node = uuid_node("plane", plane.uuid)
        .with(SExp::pair("layer", &plane.layer))
        .with(SExp::string_pair("net", plane.net_name.as_str()))
        .with(SExp::pair("priority", plane.priority))
        .with(SExp::pair("min_width", plane.min_width))
        .with(SExp::pair("min_clearance", plane.min_clearance))
        .with(SExp::pair("keep_orphans", plane.keep_orphans))
        .with(SExp::pair("connect_style", plane.connect_style));
    push_path(&mut node, &plane.outline);
    node
}

fn plane_from_sexp(node: &SExp) -> Result<ClipPlane, CodecError> {
    Ok(ClipPlane {
        uuid: read_uuid(node)?,
        layer: read(node, "layer")?,
        net_name: read(node, "net")?,
        outline: read_path(node)?,
        min_width: read(node, "min_width")?,
        min_clearance: read(node, "min_clearance")?,
        keep_orphans: read(node, "keep_orphans")?,
        priority: read(node, "priority")?,
        connect_style: read(node, "connect_style")?,
    })
}

fn polygon_to_sexp(polygon: &Polygon) -> SExp {
    let mut node = uuid_node("polygon", polygon.uuid)
        .with(SExp::pair("layer", &polygon.layer))
        .with(SExp::pair("width", polygon.line_width))
        .with(SExp::pair("fill", polygon.is_filled))
        .with(SExp::pair("grab_area", polygon.is_grab_area));
    push_path(&mut node, &polygon.path);
    node
}

fn polygon_from_sexp(node: &SExp) -> Result<Polygon, CodecError> {
    Ok(Polygon {
        uuid: read_uuid(node)?,
        layer: read(node, "layer")?,
        line_width: read(node, "width")?,
        is_filled: read(node, "fill")?,
        is_grab_area: read(node, "grab_area")?,
        path: read_path(node)?,
    })
}

fn stroke_text_to_sexp(text: &StrokeText) -> SExp {
    uuid_node("stroke_text", text.uuid)
        .with(SExp::pair("layer", &text.layer))
        .with(SExp::pair("height", text.height))
        .with(SExp::pair("stroke_width", text.stroke_width))
        .with(point_node("position", text.position))
        .with(SExp::pair("rotation", text.rotation))
        .with(SExp::pair("mirror", text.mirrored))
        .with(SExp::string_pair("value", text.text.as_str()))
}

fn stroke_text_from_sexp(node: &SExp) -> Result<StrokeText, CodecError> {
    Ok(StrokeText {
        uuid: read_uuid(node)?,
        layer: read(node, "layer")?,
        text: node.value_at("value").ok_or_else(|| missing(node, "value"))?.to_string(),
        position: read_point(node, "position")?,
        rotation: read(node, "rotation")?,
        height: read(node, "height")?,
        stroke_width: read(node, "stroke_width")?,
        mirrored: read(node, "mirror")?,
    })
}

fn hole_to_sexp(hole: &Hole) -> SExp {
    uuid_node("hole", hole.uuid)
        .with(point_node("position", hole.position))
        .with(SExp::pair("diameter", hole.diameter))
}

fn hole_from_sexp(node: &SExp) -> Result<Hole, CodecError> {
    Ok(Hole {
        uuid: read_uuid(node)?,
        position: read_point(node, "position")?,
        diameter: read(node, "diameter")?,
    })
}

impl BoardClipboardData {
    pub fn to_sexp(&self) -> SExp {
        let mut root = SExp::node(ROOT_TAG)
            .with(point_node("cursor_position", self.cursor_pos))
            .with(uuid_node("board", self.board_uuid));
        for segment in &self.net_segments {
            root.push(net_segment_to_sexp(segment));
        }
        for plane in &self.planes {
            root.push(plane_to_sexp(plane));
        }
        for polygon in &self.polygons {
            root.push(polygon_to_sexp(polygon));
        }
        for text in &self.stroke_texts {
            root.push(stroke_text_to_sexp(text));
        }
        for hole in &self.holes {
            root.push(hole_to_sexp(hole));
        }
        root
    }

    /// Decode and validate a snapshot tree. Unknown child nodes are skipped.
    pub fn from_sexp(root: &SExp) -> Result<Self, CodecError> {
        if root.name() != Some(ROOT_TAG) {
            return Err(invalid("root", root.name().unwrap_or(""), format!("expected '{}'", ROOT_TAG)));
        }
        let mut data = BoardClipboardData::new(read(root, "board")?, read_point(root, "cursor_position")?);
        for node in root.get_all("netsegment") {
            data.net_segments.push(net_segment_from_sexp(node)?);
        }
        for node in root.get_all("plane") {
            data.planes.push(plane_from_sexp(node)?);
        }
        for node in root.get_all("polygon") {
            data.polygons.push(polygon_from_sexp(node)?);
        }
        for node in root.get_all("stroke_text") {
            data.stroke_texts.push(stroke_text_from_sexp(node)?);
        }
        for node in root.get_all("hole") {
            data.holes.push(hole_from_sexp(node)?);
        }
        data.validate()?;
        Ok(data)
    }

    pub fn to_text(&self) -> String {
        self.to_sexp().to_pretty_string()
    }

    pub fn from_text(text: &str) -> Result<Self, CodecError> {
        Self::from_sexp(&parser::parse(text)?)
    }

    /// Payload under the versioned media type plus a plain text copy.
    pub fn to_mime_data(&self, app_version: &str) -> MimeData {
        let text = self.to_text();
        let mut mime = MimeData::new();
        mime.set_data(media_type(app_version), text.clone().into_bytes());
        mime.set_text(text);
        mime
    }

    /// `Ok(None)` if `mime` holds no board clipboard data at all.
    pub fn from_mime_data(mime: &MimeData, app_version: &str) -> Result<Option<Self>, CodecError> {
        let expected = media_type(app_version);
        if let Some(bytes) = mime.data(&expected) {
            let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
            return Self::from_text(text).map(Some);
        }
        match mime.formats().find_map(media_type_version) {
            Some(found) => Err(CodecError::UnsupportedVersion {
                expected: app_version.to_string(),
                found: found.to_string(),
            }),
            None => Ok(None),
        }
    }
}
