//! Pasting clipboard snapshots into a project

mod common;

use common::*;
use copperclip::board::{AnchorId, Board, Hole, ItemRef, LayerStack, NetPoint, Polygon};
use copperclip::clipboard::{BoardClipboardData, ClipAnchor, ClipNetSegment, ClipTrace};
use copperclip::cmd::{EditSink, PasteBoardItems, StructuralEdit, Transaction};
use copperclip::geometry::{Length, Path, Point, UnsignedLength};
use copperclip::{ClipboardOptions, CopperclipCore, CopperclipError, Project};
use uuid::Uuid;

/// Forwards to a transaction but fails the edit after `remaining` successful
/// ones.
struct FailingSink<'a> {
    inner: Transaction<'a>,
    remaining: usize,
}

impl EditSink for FailingSink<'_> {
    fn project(&self) -> &Project {
        self.inner.project()
    }

    fn execute(&mut self, edit: StructuralEdit) -> Result<(), CopperclipError> {
        if self.remaining == 0 {
            return Err(CopperclipError::DestinationConflict("injected failure".to_string()));
        }
        self.remaining -= 1;
        self.inner.execute(edit)
    }

    fn select(&mut self, item: ItemRef) -> bool {
        self.inner.select(item)
    }

    fn clear_selection(&mut self) {
        self.inner.clear_selection()
    }
}

/// Via at (0,0), junction at (10,0) and a 0.2 mm top layer trace between
/// them, on net "GND".
fn via_junction_snapshot() -> BoardClipboardData {
    let via = via_at(0, 0);
    let junction = NetPoint { uuid: Uuid::new_v4(), position: Point::from_mm(10, 0) };
    let mut seg = ClipNetSegment::new("GND".parse().unwrap());
    seg.traces.push(ClipTrace {
        uuid: Uuid::new_v4(),
        layer: "top_cu".to_string(),
        width: um(200),
        start: ClipAnchor::Via(via.uuid),
        end: ClipAnchor::Junction(junction.uuid),
    });
    seg.vias.push(via);
    seg.junctions.push(junction);
    let mut data = BoardClipboardData::new(Uuid::new_v4(), Point::default());
    data.net_segments.push(seg);
    data
}

fn rich_snapshot() -> BoardClipboardData {
    let mut data = via_junction_snapshot();
    let mut vcc = ClipNetSegment::new("VCC".parse().unwrap());
    vcc.vias.push(via_at(3, 3));
    data.net_segments.push(vcc);
    data.polygons.push(Polygon {
        uuid: Uuid::new_v4(),
        layer: "top_legend".to_string(),
        line_width: UnsignedLength::new(Length::from_um(100)).unwrap(),
        is_filled: false,
        is_grab_area: true,
        path: Path::rect(Point::default(), Length::from_mm(1), Length::from_mm(1)),
    });
    data.holes.push(Hole { uuid: Uuid::new_v4(), position: Point::from_mm(2, 2), diameter: um(1000) });
    data
}

#[test]
fn test_paste_creates_net_and_translated_copper() {
    init_tracing();
    let mut project = empty_project();
    let data = via_junction_snapshot();
    let original = &data.net_segments[0];

    let group = PasteBoardItems::new(data.clone(), Point::from_mm(5, 5))
        .execute(&mut project, &ClipboardOptions::default())
        .unwrap();
    assert_eq!(group.title, "Paste Board Elements");

    let gnd = project.circuit.net_signal_by_name("GND").expect("net created");
    assert_eq!(project.circuit.net_class(&gnd.net_class).unwrap().name.as_str(), "default");

    assert_eq!(project.board.net_segment_count(), 1);
    let segment = project.board.net_segments().next().unwrap();
    assert_eq!(segment.net_signal(), gnd.uuid);

    let via = segment.vias().next().unwrap();
    assert_eq!(via.position, Point::from_mm(5, 5));
    assert_ne!(via.uuid, original.vias[0].uuid);
    assert_eq!(via.size, original.vias[0].size);
    let junction = segment.netpoints().next().unwrap();
    assert_eq!(junction.position, Point::from_mm(15, 5));
    assert_ne!(junction.uuid, original.junctions[0].uuid);

    let trace = segment.netlines().next().unwrap();
    assert_eq!(trace.start, AnchorId::Via(via.uuid));
    assert_eq!(trace.end, AnchorId::Junction(junction.uuid));
    assert_eq!(trace.width, um(200));
    assert_eq!(trace.layer, "top_cu");
    assert_ne!(trace.uuid, original.traces[0].uuid);

    for item in [
        ItemRef::Via(via.uuid),
        ItemRef::NetPoint(junction.uuid),
        ItemRef::NetLine(trace.uuid),
    ] {
        assert!(project.board.is_selected(&item));
    }
    assert!(segment.is_connected());
}

#[test]
fn test_paste_reuses_existing_net() {
    let mut project = empty_project();
    let existing = add_net(&mut project, "GND");
    PasteBoardItems::new(via_junction_snapshot(), Point::default())
        .execute(&mut project, &ClipboardOptions::default())
        .unwrap();
    assert_eq!(project.circuit.net_signals().count(), 1);
    assert_eq!(project.board.net_segments().next().unwrap().net_signal(), existing);
}

#[test]
fn test_paste_twice_gives_distinct_identities() {
    let mut project = empty_project();
    let cmd = PasteBoardItems::new(rich_snapshot(), Point::default());
    cmd.execute(&mut project, &ClipboardOptions::default()).unwrap();
    cmd.execute(&mut project, &ClipboardOptions::default()).unwrap();
    assert_eq!(project.board.net_segment_count(), 4);
    assert_eq!(project.board.holes().count(), 2);
    assert_eq!(project.circuit.net_signals().count(), 2);
}

#[test]
fn test_paste_replaces_selection() {
    let mut project = empty_project();
    let hole = Hole { uuid: Uuid::new_v4(), position: Point::default(), diameter: um(500) };
    project.board.add_hole(hole.clone()).unwrap();
    project.board.select(ItemRef::Hole(hole.uuid));

    PasteBoardItems::new(via_junction_snapshot(), Point::default())
        .execute(&mut project, &ClipboardOptions::default())
        .unwrap();
    assert!(!project.board.is_selected(&ItemRef::Hole(hole.uuid)));
    assert_eq!(project.board.selection().len(), 3);
}

#[test]
fn test_failure_at_any_edit_leaves_project_unchanged() {
    let mut project = empty_project();
    let hole = Hole { uuid: Uuid::new_v4(), position: Point::default(), diameter: um(500) };
    project.board.add_hole(hole.clone()).unwrap();
    project.board.select(ItemRef::Hole(hole.uuid));
    let before = project.clone();

    let cmd = PasteBoardItems::new(rich_snapshot(), Point::from_mm(1, 1));
    let total = {
        let mut scratch = project.clone();
        cmd.execute(&mut scratch, &ClipboardOptions::default()).unwrap().edits.len()
    };
    assert!(total > 5);

    for n in 0..total {
        let mut attempt = project.clone();
        {
            let mut sink = FailingSink {
                inner: Transaction::begin(&mut attempt, "Paste"),
                remaining: n,
            };
            let result = cmd.execute_in(&mut sink, &ClipboardOptions::default());
            assert!(result.is_err(), "paste should fail at edit {}", n);
        }
        assert_eq!(attempt, before, "project changed after failure at edit {}", n);
    }
}

#[test]
fn test_missing_layer_is_destination_conflict() {
    let board = Board::with_layers(Uuid::new_v4(), "single", LayerStack::new(&["top_cu"], &["top_legend"]));
    let mut project = Project::new(empty_project().circuit, board);
    let before = project.clone();

    let mut data = rich_snapshot();
    data.net_segments[0].traces[0].layer = "bot_cu".to_string();
    let err = PasteBoardItems::new(data, Point::default())
        .execute(&mut project, &ClipboardOptions::default())
        .unwrap_err();
    assert!(matches!(err, CopperclipError::DestinationConflict(_)));
    assert_eq!(project, before);
}

#[test]
fn test_malformed_snapshot_applies_nothing() {
    let mut project = empty_project();
    let before = project.clone();
    let mut data = via_junction_snapshot();
    data.net_segments[0].junctions.clear();

    let err = PasteBoardItems::new(data, Point::default())
        .execute(&mut project, &ClipboardOptions::default())
        .unwrap_err();
    assert!(matches!(err, CopperclipError::MalformedSnapshot(_)));
    assert_eq!(project, before);
}

#[test]
fn test_undo_redo_paste() {
    let mut project = empty_project();
    let empty = project.clone();
    let group = PasteBoardItems::new(rich_snapshot(), Point::default())
        .execute(&mut project, &ClipboardOptions::default())
        .unwrap();
    project.board.clear_selection();
    let pasted = project.clone();

    group.undo(&mut project).unwrap();
    assert_eq!(project, empty);
    group.redo(&mut project).unwrap();
    assert_eq!(project, pasted);
}

#[test]
fn test_copy_paste_through_mime_data() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let (a, b) = (via_at(0, 0), via_at(4, 0));
    let w = line(v(&a), v(&b), "bot_cu");
    add_segment(&mut project, net, &[a.clone(), b.clone()], &[], &[w.clone()]);
    for item in [ItemRef::Via(a.uuid), ItemRef::Via(b.uuid), ItemRef::NetLine(w.uuid)] {
        project.board.select(item);
    }

    let options = ClipboardOptions::default();
    let mime = CopperclipCore::copy_to_mime(&project, Point::from_mm(1, 0), &options).unwrap();
    let group = CopperclipCore::paste_from_mime(&mut project, &mime, Point::from_mm(11, 10), &options)
        .unwrap()
        .expect("board data present");
    assert!(!group.is_empty());
    assert_eq!(project.board.net_segment_count(), 2);

    let pasted = project
        .board
        .net_segments()
        .find(|s| s.via(&a.uuid).is_none())
        .unwrap();
    let mut positions: Vec<Point> = pasted.vias().map(|v| v.position).collect();
    positions.sort_by_key(|p| p.x);
    assert_eq!(positions, vec![Point::from_mm(10, 10), Point::from_mm(14, 10)]);
}

#[test]
fn test_paste_of_other_version_is_rejected() {
    let mut project = empty_project();
    let before = project.clone();
    let mime = via_junction_snapshot().to_mime_data("0.0.1-old");
    let options = ClipboardOptions { app_version: "9.9.9".to_string(), ..ClipboardOptions::default() };

    let err = CopperclipCore::paste_from_mime(&mut project, &mime, Point::default(), &options).unwrap_err();
    assert!(matches!(err, CopperclipError::UnsupportedVersion { ref found, .. } if found == "0.0.1-old"));
    assert_eq!(project, before);
}

#[test]
fn test_paste_with_overflowing_positions_is_rejected() {
    let mut project = empty_project();
    let before = project.clone();
    let text = format!(
        "(copperclip_clipboard_board\n (cursor_position 9000000000000 0)\n (board {})\n (hole {}\n  (position -9000000000000 0)\n  (diameter 1.0)\n )\n)\n",
        Uuid::new_v4(),
        Uuid::new_v4()
    );
    let options = ClipboardOptions::default();
    let mime = BoardClipboardData::from_text(&text).unwrap().to_mime_data(&options.app_version);

    let err = CopperclipCore::paste_from_mime(&mut project, &mime, Point::default(), &options).unwrap_err();
    assert!(matches!(err, CopperclipError::MalformedSnapshot(_)));
    assert_eq!(project, before);
}

#[test]
fn test_overflow_after_net_creation_rolls_back() {
    let mut project = empty_project();
    let before = project.clone();
    let mut data = via_junction_snapshot();
    data.net_segments[0].junctions[0].position = Point::new(Length::from_nm(i64::MAX), Length::default());

    let err = PasteBoardItems::new(data, Point::from_mm(1, 0))
        .execute(&mut project, &ClipboardOptions::default())
        .unwrap_err();
    assert!(matches!(err, CopperclipError::MalformedSnapshot(_)));
    assert_eq!(project, before);
}
