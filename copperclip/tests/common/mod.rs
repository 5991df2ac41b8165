//! Shared helpers for building boards in integration tests.

#![allow(dead_code)]

use copperclip::board::{AnchorId, NetLine, NetPoint, NetSegment, Pad, PadId, Via, ViaShape};
use copperclip::circuit::{NetClass, NetSignal};
use copperclip::geometry::{Length, Point, PositiveLength};
use copperclip::Project;
use std::path::PathBuf;
use uuid::Uuid;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn um(value: i64) -> PositiveLength {
    PositiveLength::new(Length::from_um(value)).unwrap()
}

pub fn via_at(x: i64, y: i64) -> Via {
    Via {
        uuid: Uuid::new_v4(),
        position: Point::from_mm(x, y),
        shape: ViaShape::Round,
        size: um(700),
        drill_diameter: um(300),
    }
}

pub fn junction_at(x: i64, y: i64) -> NetPoint {
    NetPoint {
        uuid: Uuid::new_v4(),
        position: Point::from_mm(x, y),
    }
}

pub fn line(start: AnchorId, end: AnchorId, layer: &str) -> NetLine {
    NetLine {
        uuid: Uuid::new_v4(),
        start,
        end,
        layer: layer.to_string(),
        width: um(200),
    }
}

pub fn v(via: &Via) -> AnchorId {
    AnchorId::Via(via.uuid)
}

pub fn j(netpoint: &NetPoint) -> AnchorId {
    AnchorId::Junction(netpoint.uuid)
}

/// Empty project with a "default" net class.
pub fn empty_project() -> Project {
    let mut project = Project::empty("main");
    project
        .circuit
        .add_net_class(NetClass {
            uuid: Uuid::new_v4(),
            name: "default".parse().unwrap(),
        })
        .unwrap();
    project
}

/// Add a net signal in the default class and return its uuid.
pub fn add_net(project: &mut Project, name: &str) -> Uuid {
    let class = project.circuit.net_class_by_name("default").unwrap().uuid;
    let signal = NetSignal {
        uuid: Uuid::new_v4(),
        name: name.parse().unwrap(),
        net_class: class,
    };
    let uuid = signal.uuid;
    project.circuit.add_net_signal(signal).unwrap();
    uuid
}

/// Add a net segment with the given elements and return its uuid.
pub fn add_segment(
    project: &mut Project,
    net_signal: Uuid,
    vias: &[Via],
    netpoints: &[NetPoint],
    netlines: &[NetLine],
) -> Uuid {
    let segment = NetSegment::new(Uuid::new_v4(), net_signal);
    let uuid = segment.uuid();
    project.board.add_net_segment(segment).unwrap();
    project
        .board
        .add_net_segment_elements(&uuid, vias, netpoints, netlines)
        .unwrap();
    uuid
}

pub fn add_pad(project: &mut Project, x: i64, y: i64) -> AnchorId {
    let id = PadId::new(Uuid::new_v4(), Uuid::new_v4());
    project
        .board
        .add_pad(Pad {
            id,
            position: Point::from_mm(x, y),
            net_signal: None,
        })
        .unwrap();
    AnchorId::Pad(id)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
