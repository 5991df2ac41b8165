//! Copying board selections and the clipboard text format

mod common;

use common::*;
use copperclip::board::{ConnectStyle, Hole, ItemRef, Plane, Polygon};
use copperclip::clipboard::{BoardClipboardData, BoardClipboardDataBuilder, ClipAnchor, ClipNetSegment, CodecError};
use copperclip::geometry::{Length, Path, Point, UnsignedLength};
use copperclip::CopperclipCore;
use uuid::Uuid;

#[test]
fn test_copy_whole_segment_keeps_identities() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let via = via_at(0, 0);
    let junction = junction_at(10, 0);
    let w = line(v(&via), j(&junction), "top_cu");
    add_segment(&mut project, net, &[via.clone()], &[junction.clone()], &[w.clone()]);
    project.board.select(ItemRef::Via(via.uuid));
    project.board.select(ItemRef::NetLine(w.uuid));

    let data = BoardClipboardDataBuilder::new(&project)
        .generate(Point::from_mm(1, 1))
        .unwrap();

    assert_eq!(data.board_uuid, project.board.uuid());
    assert_eq!(data.cursor_pos, Point::from_mm(1, 1));
    assert_eq!(data.net_segments.len(), 1);
    let seg = &data.net_segments[0];
    assert_eq!(seg.net_name.as_str(), "GND");
    assert_eq!(seg.vias, vec![via.clone()]);
    assert_eq!(seg.junctions, vec![junction.clone()]);
    assert_eq!(seg.traces.len(), 1);
    assert_eq!(seg.traces[0].uuid, w.uuid);
    assert_eq!(seg.traces[0].start, ClipAnchor::Via(via.uuid));
    assert_eq!(seg.traces[0].end, ClipAnchor::Junction(junction.uuid));
    assert!(data.validate().is_ok());
}

#[test]
fn test_unselected_via_is_replaced_per_piece() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let via = via_at(0, 0);
    let (left, right) = (junction_at(-5, 0), junction_at(5, 0));
    let top = line(j(&left), v(&via), "top_cu");
    let bot = line(v(&via), j(&right), "bot_cu");
    add_segment(&mut project, net, &[via.clone()], &[left, right], &[top.clone(), bot.clone()]);
    project.board.select(ItemRef::NetLine(top.uuid));
    project.board.select(ItemRef::NetLine(bot.uuid));

    let data = CopperclipCore::copy_selection(&project, Point::default()).unwrap();

    assert_eq!(data.net_segments.len(), 2);
    let mut replacements = Vec::new();
    for seg in &data.net_segments {
        assert!(seg.vias.is_empty());
        assert_eq!(seg.traces.len(), 1);
        assert_eq!(seg.junctions.len(), 2);
        let stand_in = seg
            .junctions
            .iter()
            .find(|p| p.position == via.position)
            .expect("junction in place of the via");
        assert_ne!(stand_in.uuid, via.uuid);
        replacements.push(stand_in.uuid);
    }
    assert_ne!(replacements[0], replacements[1]);
    assert!(data.validate().is_ok());
}

#[test]
fn test_pad_endpoint_becomes_junction() {
    let mut project = empty_project();
    let net = add_net(&mut project, "SIG");
    let pad = add_pad(&mut project, 7, 7);
    let junction = junction_at(0, 7);
    let w = line(j(&junction), pad, "top_cu");
    add_segment(&mut project, net, &[], &[junction], &[w.clone()]);
    project.board.select(ItemRef::NetLine(w.uuid));

    let data = CopperclipCore::copy_selection(&project, Point::default()).unwrap();
    let seg = &data.net_segments[0];
    assert_eq!(seg.junctions.len(), 2);
    assert!(seg.junctions.iter().any(|p| p.position == Point::from_mm(7, 7)));
    assert!(data.validate().is_ok());
}

#[test]
fn test_selected_isolated_via_is_copied_alone() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let (a, b) = (via_at(0, 0), via_at(5, 0));
    let w = line(v(&a), v(&b), "top_cu");
    add_segment(&mut project, net, &[a.clone(), b.clone()], &[], &[w]);
    project.board.select(ItemRef::Via(b.uuid));

    let data = CopperclipCore::copy_selection(&project, Point::default()).unwrap();
    assert_eq!(data.net_segments.len(), 1);
    assert_eq!(data.net_segments[0].vias, vec![b]);
    assert!(data.net_segments[0].traces.is_empty());
}

#[test]
fn test_copy_loose_items_with_plane_net_name() {
    let mut project = empty_project();
    let net = add_net(&mut project, "VCC");
    let plane = Plane {
        uuid: Uuid::new_v4(),
        layer: "bot_cu".to_string(),
        net_signal: net,
        outline: Path::rect(Point::default(), Length::from_mm(10), Length::from_mm(5)),
        min_width: UnsignedLength::new(Length::from_um(200)).unwrap(),
        min_clearance: UnsignedLength::new(Length::from_um(300)).unwrap(),
        keep_orphans: false,
        priority: 2,
        connect_style: ConnectStyle::Solid,
    };
    let hole = Hole { uuid: Uuid::new_v4(), position: Point::from_mm(3, 3), diameter: um(3200) };
    project.board.add_plane(plane.clone()).unwrap();
    project.board.add_hole(hole.clone()).unwrap();
    project.board.select(ItemRef::Plane(plane.uuid));
    project.board.select(ItemRef::Hole(hole.uuid));

    let data = CopperclipCore::copy_selection(&project, Point::default()).unwrap();
    assert_eq!(data.planes.len(), 1);
    assert_eq!(data.planes[0].net_name.as_str(), "VCC");
    assert_eq!(data.planes[0].outline, plane.outline);
    assert_eq!(data.holes, vec![hole]);
}

#[test]
fn test_empty_selection_gives_empty_snapshot() {
    let project = empty_project();
    let data = CopperclipCore::copy_selection(&project, Point::default()).unwrap();
    assert!(data.is_empty());
    let decoded = BoardClipboardData::from_text(&data.to_text()).unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn test_round_trip_many_segments_with_isolated_via() {
    let mut project = empty_project();
    let gnd = add_net(&mut project, "GND");
    let vcc = add_net(&mut project, "VCC");

    let (a, b, c) = (via_at(0, 0), via_at(5, 0), via_at(10, 0));
    let p = junction_at(5, 5);
    let w1 = line(v(&a), v(&b), "top_cu");
    let w2 = line(v(&b), j(&p), "bot_cu");
    add_segment(&mut project, gnd, &[a.clone(), b.clone(), c.clone()], &[p], &[w1.clone(), w2.clone()]);
    let lonely = via_at(20, 20);
    add_segment(&mut project, vcc, &[lonely.clone()], &[], &[]);
    let polygon = Polygon {
        uuid: Uuid::new_v4(),
        layer: "top_legend".to_string(),
        line_width: UnsignedLength::new(Length::from_um(100)).unwrap(),
        is_filled: true,
        is_grab_area: false,
        path: Path::rect(Point::from_mm(-1, -1), Length::from_mm(2), Length::from_mm(2)),
    };
    project.board.add_polygon(polygon.clone()).unwrap();

    for item in [
        ItemRef::Via(a.uuid),
        ItemRef::Via(c.uuid),
        ItemRef::Via(lonely.uuid),
        ItemRef::NetLine(w1.uuid),
        ItemRef::NetLine(w2.uuid),
        ItemRef::Polygon(polygon.uuid),
    ] {
        assert!(project.board.select(item));
    }

    let data = CopperclipCore::copy_selection(&project, Point::from_mm(2, 2)).unwrap();
    // a-w1-b(excluded, top only), b(excluded)-w2-p, c alone, lonely alone.
    assert_eq!(data.net_segments.len(), 4);
    assert_eq!(data.summary().vias, 3);

    let text = data.to_text();
    let decoded = BoardClipboardData::from_text(&text).unwrap();
    assert_eq!(decoded, data);
    assert_eq!(decoded.to_text(), text);
}

#[test]
fn test_fixture_decodes() {
    let data = CopperclipCore::read_clipboard_file(&fixture_path("two_nets.clipboard")).unwrap();
    assert_eq!(data.net_segments.len(), 2);
    assert_eq!(data.net_segments[1].vias.len(), 1);
    assert_eq!(data.polygons[0].path.vertices().len(), 3);
    assert_eq!(data.holes[0].diameter, um(3200));
}

#[test]
fn test_fixture_with_dangling_trace_is_rejected() {
    let text = std::fs::read_to_string(fixture_path("dangling_trace.clipboard")).unwrap();
    let err = BoardClipboardData::from_text(&text).unwrap_err();
    assert!(matches!(err, CodecError::DanglingReference { .. }));
}

#[test]
fn test_invalid_net_name_is_rejected() {
    let mut data = BoardClipboardData::new(Uuid::new_v4(), Point::default());
    data.net_segments.push(ClipNetSegment::new("GND".parse().unwrap()));
    let text = data.to_text().replace("\"GND\"", "\"has space\"");
    assert!(matches!(
        BoardClipboardData::from_text(&text),
        Err(CodecError::InvalidValue { ref field, .. }) if field == "net"
    ));
}
