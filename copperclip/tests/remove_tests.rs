//! Removing board items and splitting what remains

mod common;

use common::*;
use copperclip::board::{AnchorId, Hole, ItemRef, StrokeText};
use copperclip::clipboard::BoardClipboardData;
use copperclip::cmd::{plan_removal, RemovalPlan, RemoveBoardItems, SubSegment};
use copperclip::geometry::{Angle, Length, Point, UnsignedLength};
use copperclip::{ClipboardOptions, CopperclipCore, CopperclipError};
use std::collections::BTreeSet;
use uuid::Uuid;

#[test]
fn test_removing_via_leaves_other_via_alone() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let (a, b) = (via_at(0, 0), via_at(5, 0));
    let w = line(v(&a), v(&b), "top_cu");
    let seg = add_segment(&mut project, net, &[a.clone(), b.clone()], &[], &[w]);

    let segment = project.board.net_segment(&seg).unwrap();
    let plan = plan_removal(segment, &BTreeSet::from([a.uuid]), &BTreeSet::new());
    assert_eq!(
        plan,
        RemovalPlan::Split(vec![SubSegment { vias: vec![b.clone()], netpoints: vec![], netlines: vec![] }])
    );

    RemoveBoardItems::new().via(a.uuid).execute(&mut project).unwrap();
    assert_eq!(project.board.net_segment_count(), 1);
    let remaining = project.board.net_segments().next().unwrap();
    assert_eq!(remaining.vias().collect::<Vec<_>>(), vec![&b]);
    assert_eq!(remaining.netline_count(), 0);
    assert_eq!(remaining.net_signal(), net);
}

#[test]
fn test_removing_via_keeps_rest_of_network() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let (a, b) = (via_at(0, 0), via_at(5, 0));
    let junction = junction_at(5, 5);
    let w = line(v(&a), v(&b), "top_cu");
    let w2 = line(v(&b), j(&junction), "top_cu");
    let seg = add_segment(&mut project, net, &[a.clone(), b.clone()], &[junction.clone()], &[w, w2.clone()]);

    let segment = project.board.net_segment(&seg).unwrap();
    let plan = plan_removal(segment, &BTreeSet::from([a.uuid]), &BTreeSet::new());
    assert_eq!(
        plan,
        RemovalPlan::Split(vec![SubSegment {
            vias: vec![b.clone()],
            netpoints: vec![junction.clone()],
            netlines: vec![w2.clone()],
        }])
    );

    RemoveBoardItems::new().via(a.uuid).execute(&mut project).unwrap();
    let remaining = project.board.net_segments().next().unwrap();
    assert_ne!(remaining.uuid(), seg);
    assert_eq!(remaining.via(&b.uuid), Some(&b));
    let rebuilt = remaining.netlines().next().unwrap();
    let new_junction = remaining.netpoints().next().unwrap();
    assert_ne!(rebuilt.uuid, w2.uuid);
    assert_ne!(new_junction.uuid, junction.uuid);
    assert_eq!(new_junction.position, junction.position);
    assert_eq!(rebuilt.start, AnchorId::Via(b.uuid));
    assert_eq!(rebuilt.end, AnchorId::Junction(new_junction.uuid));
    assert!(remaining.is_connected());
}

#[test]
fn test_removing_all_copper_removes_segment() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let (a, b) = (via_at(0, 0), via_at(5, 0));
    let junction = junction_at(2, 2);
    let w1 = line(v(&a), j(&junction), "top_cu");
    let w2 = line(j(&junction), v(&b), "top_cu");
    let seg = add_segment(&mut project, net, &[a.clone(), b.clone()], &[junction], &[w1.clone(), w2.clone()]);

    let segment = project.board.net_segment(&seg).unwrap();
    let plan = plan_removal(segment, &BTreeSet::from([a.uuid, b.uuid]), &BTreeSet::new());
    assert_eq!(plan, RemovalPlan::RemoveWhole);

    RemoveBoardItems::new()
        .netline(w1.uuid)
        .netline(w2.uuid)
        .via(a.uuid)
        .via(b.uuid)
        .execute(&mut project)
        .unwrap();
    assert_eq!(project.board.net_segment_count(), 0);
    // The net itself stays in the circuit.
    assert!(project.circuit.net_signal(&net).is_some());
}

#[test]
fn test_removing_lines_only_leaves_vias_as_singletons() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let (a, b) = (via_at(0, 0), via_at(5, 0));
    let w = line(v(&a), v(&b), "bot_cu");
    add_segment(&mut project, net, &[a.clone(), b.clone()], &[], &[w.clone()]);

    RemoveBoardItems::new().netline(w.uuid).execute(&mut project).unwrap();
    assert_eq!(project.board.net_segment_count(), 2);
    for segment in project.board.net_segments() {
        assert_eq!(segment.via_count(), 1);
        assert_eq!(segment.netline_count(), 0);
    }
}

#[test]
fn test_wire_to_pad_survives_removal_of_other_branch() {
    let mut project = empty_project();
    let net = add_net(&mut project, "SIG");
    let pad = add_pad(&mut project, 0, 0);
    let via = via_at(5, 0);
    let junction = junction_at(0, 5);
    let to_pad = line(v(&via), pad, "top_cu");
    let branch = line(v(&via), j(&junction), "top_cu");
    add_segment(&mut project, net, &[via.clone()], &[junction], &[to_pad.clone(), branch.clone()]);

    RemoveBoardItems::new().netline(branch.uuid).execute(&mut project).unwrap();
    let remaining = project.board.net_segments().next().unwrap();
    assert_eq!(remaining.netpoints().count(), 0);
    let line = remaining.netlines().next().unwrap();
    assert_eq!(line.start, v(&via));
    assert_eq!(line.end, pad);
}

#[test]
fn test_loose_items_are_removed() {
    let mut project = empty_project();
    let hole = Hole { uuid: Uuid::new_v4(), position: Point::default(), diameter: um(1000) };
    let text = StrokeText {
        uuid: Uuid::new_v4(),
        layer: "top_legend".to_string(),
        text: "R1".to_string(),
        position: Point::from_mm(1, 1),
        rotation: Angle::default(),
        height: um(1000),
        stroke_width: UnsignedLength::new(Length::from_um(150)).unwrap(),
        mirrored: false,
    };
    project.board.add_hole(hole.clone()).unwrap();
    project.board.add_stroke_text(text.clone()).unwrap();

    RemoveBoardItems::new()
        .hole(hole.uuid)
        .stroke_text(text.uuid)
        .execute(&mut project)
        .unwrap();
    assert_eq!(project.board.holes().count(), 0);
    assert_eq!(project.board.stroke_texts().count(), 0);
}

#[test]
fn test_unknown_item_removes_nothing() {
    let mut project = empty_project();
    let hole = Hole { uuid: Uuid::new_v4(), position: Point::default(), diameter: um(1000) };
    project.board.add_hole(hole.clone()).unwrap();
    let before = project.clone();

    let err = RemoveBoardItems::new()
        .hole(hole.uuid)
        .polygon(Uuid::new_v4())
        .execute(&mut project)
        .unwrap_err();
    assert!(matches!(err, CopperclipError::Invariant(_)));
    assert_eq!(project, before);
}

#[test]
fn test_remove_selection_and_undo() {
    let mut project = empty_project();
    let net = add_net(&mut project, "GND");
    let (a, b, c) = (via_at(0, 0), via_at(5, 0), via_at(10, 0));
    let w1 = line(v(&a), v(&b), "top_cu");
    let w2 = line(v(&b), v(&c), "top_cu");
    add_segment(&mut project, net, &[a.clone(), b.clone(), c.clone()], &[], &[w1, w2]);
    let hole = Hole { uuid: Uuid::new_v4(), position: Point::default(), diameter: um(1000) };
    project.board.add_hole(hole.clone()).unwrap();
    project.board.select(ItemRef::Via(b.uuid));
    project.board.select(ItemRef::Hole(hole.uuid));
    let before = project.clone();

    let group = CopperclipCore::remove_selection(&mut project).unwrap();
    assert_eq!(group.title, "Remove Board Items");
    assert_eq!(project.board.net_segment_count(), 2);
    assert!(project.board.hole(&hole.uuid).is_none());
    assert!(project.board.selection().is_empty());

    group.undo(&mut project).unwrap();
    // Undo restores the items but not the selection.
    project.board.select(ItemRef::Via(b.uuid));
    project.board.select(ItemRef::Hole(hole.uuid));
    assert_eq!(project, before);
}

#[test]
fn test_cut_copies_then_removes() {
    let mut project = empty_project();
    let net = add_net(&mut project, "VCC");
    let (a, b) = (via_at(0, 0), via_at(5, 0));
    let w = line(v(&a), v(&b), "top_cu");
    add_segment(&mut project, net, &[a.clone(), b.clone()], &[], &[w.clone()]);
    for item in [ItemRef::Via(a.uuid), ItemRef::Via(b.uuid), ItemRef::NetLine(w.uuid)] {
        project.board.select(item);
    }

    let options = ClipboardOptions::default();
    let (mime, _group) = CopperclipCore::cut_selection(&mut project, Point::default(), &options).unwrap();
    assert_eq!(project.board.net_segment_count(), 0);

    let data = BoardClipboardData::from_mime_data(&mime, &options.app_version)
        .unwrap()
        .expect("board data present");
    assert_eq!(data.net_segments.len(), 1);
    assert_eq!(data.net_segments[0].vias.len(), 2);
    assert_eq!(data.net_segments[0].traces[0].uuid, w.uuid);
}
