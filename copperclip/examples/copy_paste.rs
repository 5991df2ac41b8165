//! Copy a routed net, paste it elsewhere and cut part of it again.

use anyhow::Context;
use copperclip::board::{AnchorId, ItemRef, NetLine, NetPoint, NetSegment, Via, ViaShape};
use copperclip::circuit::{NetClass, NetSignal};
use copperclip::geometry::{Length, PositiveLength};
use copperclip::prelude::*;
use uuid::Uuid;

fn um(value: i64) -> anyhow::Result<PositiveLength> {
    Ok(PositiveLength::new(Length::from_um(value))?)
}

fn main() -> anyhow::Result<()> {
    let mut project = Project::empty("demo");
    let class = NetClass { uuid: Uuid::new_v4(), name: "default".parse()? };
    let signal = NetSignal { uuid: Uuid::new_v4(), name: "GND".parse()?, net_class: class.uuid };
    project.circuit.add_net_class(class)?;
    project.circuit.add_net_signal(signal.clone())?;

    let via = Via {
        uuid: Uuid::new_v4(),
        position: Point::from_mm(0, 0),
        shape: ViaShape::Round,
        size: um(700)?,
        drill_diameter: um(300)?,
    };
    let junction = NetPoint { uuid: Uuid::new_v4(), position: Point::from_mm(10, 0) };
    let trace = NetLine {
        uuid: Uuid::new_v4(),
        start: AnchorId::Via(via.uuid),
        end: AnchorId::Junction(junction.uuid),
        layer: "top_cu".to_string(),
        width: um(200)?,
    };
    let segment = NetSegment::new(Uuid::new_v4(), signal.uuid);
    let segment_uuid = segment.uuid();
    project.board.add_net_segment(segment)?;
    project
        .board
        .add_net_segment_elements(&segment_uuid, &[via.clone()], &[junction], &[trace.clone()])?;

    project.board.select(ItemRef::Via(via.uuid));
    project.board.select(ItemRef::NetLine(trace.uuid));

    let options = ClipboardOptions::default();
    let mime = CopperclipCore::copy_to_mime(&project, Point::from_mm(0, 0), &options)?;
    println!("Clipboard formats:");
    for format in mime.formats() {
        println!("  {}", format);
    }
    println!("\n{}", mime.text().context("clipboard has no text")?);

    let group = CopperclipCore::paste_from_mime(&mut project, &mime, Point::from_mm(20, 5), &options)?
        .context("clipboard holds no board data")?;
    println!("{}: {} edits", group.title, group.edits.len());
    println!("Net segments on board: {}", project.board.net_segment_count());

    let (_, cut) = CopperclipCore::cut_selection(&mut project, Point::from_mm(20, 5), &options)?;
    println!("{}: {} edits", cut.title, cut.edits.len());
    println!("Net segments on board: {}", project.board.net_segment_count());

    cut.undo(&mut project)?;
    println!("After undo: {} net segments", project.board.net_segment_count());
    Ok(())
}
