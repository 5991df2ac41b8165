//! Net segment splitter
//!
//! Partitions a subset of a net segment (the *included* vias and net lines)
//! into maximal connected pieces. The copy engine uses it to turn a partial
//! selection into self-contained clipboard segments; the removal engine uses
//! it to find what survives a partial delete.
//!
//! Traversal rules:
//!
//! * Only included net lines are ever consumed; each one lands in exactly
//!   one segment.
//! * Junctions and included vias conduct through every incident net line.
//! * An excluded via conducts only on the layer of the net line it was
//!   entered through. Lines on other layers stay available for another
//!   segment, so the same excluded via can show up in several segments.
//! * Pads end a branch. A pad can show up in several segments.
//! * Included vias never reached by any line become singleton segments.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::board::AnchorId;

/// Read-only connectivity view the splitter walks over.
pub trait AnchorGraph {
    /// Net lines attached to `anchor`, in a stable order.
    fn netlines_of(&self, anchor: &AnchorId) -> Vec<Uuid>;
    fn endpoints(&self, netline: &Uuid) -> Option<(AnchorId, AnchorId)>;
    fn layer(&self, netline: &Uuid) -> Option<&str>;
}

/// One connected piece: the anchors it touches in discovery order and the
/// net lines it consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub anchors: Vec<AnchorId>,
    pub netlines: Vec<Uuid>,
}

impl Segment {
    pub fn vias(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.anchors.iter().filter_map(AnchorId::as_via)
    }

    pub fn junctions(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.anchors.iter().filter_map(AnchorId::as_junction)
    }

    pub fn contains_anchor(&self, anchor: &AnchorId) -> bool {
        self.anchors.contains(anchor)
    }
}

/// Included elements keep their insertion order for deterministic output;
/// the sets only answer membership.
#[derive(Debug, Clone, Default)]
pub struct NetSegmentSplitter {
    vias: Vec<Uuid>,
    via_set: HashSet<Uuid>,
    netlines: Vec<Uuid>,
    netline_set: HashSet<Uuid>,
}

impl NetSegmentSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include a via. Adding the same via twice has no effect.
    pub fn add_via(&mut self, via: Uuid) {
        if self.via_set.insert(via) {
            self.vias.push(via);
        }
    }

    /// Include a net line. Adding the same line twice has no effect.
    pub fn add_netline(&mut self, netline: Uuid) {
        if self.netline_set.insert(netline) {
            self.netlines.push(netline);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vias.is_empty() && self.netlines.is_empty()
    }

    /// Partition the included elements. Deterministic for a given insertion
    /// order and graph.
    pub fn split<G: AnchorGraph + ?Sized>(&self, graph: &G) -> Vec<Segment> {
        let mut available: HashMap<Uuid, (AnchorId, AnchorId)> = HashMap::with_capacity(self.netlines.len());
        for netline in &self.netlines {
            match graph.endpoints(netline) {
                Some(ends) => {
                    available.insert(*netline, ends);
                }
                None => warn!(netline = %netline, "Ignoring net line that is not part of the segment"),
            }
        }

        let mut segments = Vec::new();
        let mut reached_vias: HashSet<Uuid> = HashSet::new();

        for seed in &self.netlines {
            let Some((start, end)) = available.remove(seed) else {
                continue;
            };
            let mut segment = Segment { anchors: Vec::new(), netlines: vec![*seed] };
            let mut seen: HashSet<AnchorId> = HashSet::new();
            // Both ends are entered through the seed line; the end pushed
            // last is explored first.
            let mut stack = vec![(end, *seed), (start, *seed)];
            while let Some((anchor, entered_through)) = stack.pop() {
                if seen.insert(anchor) {
                    segment.anchors.push(anchor);
                }
                if let Some(via) = anchor.as_via() {
                    reached_vias.insert(via);
                }
                let layer_lock = match anchor {
                    AnchorId::Pad(_) => continue,
                    AnchorId::Via(uuid) if !self.via_set.contains(&uuid) => graph.layer(&entered_through),
                    AnchorId::Via(_) | AnchorId::Junction(_) => None,
                };
                for netline in graph.netlines_of(&anchor) {
                    if !available.contains_key(&netline) {
                        continue;
                    }
                    if let Some(lock) = layer_lock {
                        if graph.layer(&netline) != Some(lock) {
                            continue;
                        }
                    }
                    let Some((a, b)) = available.remove(&netline) else {
                        continue;
                    };
                    segment.netlines.push(netline);
                    let other = if a == anchor { b } else { a };
                    stack.push((other, netline));
                }
            }
            debug!(
                anchors = segment.anchors.len(),
                netlines = segment.netlines.len(),
                "Split off connected segment"
            );
            segments.push(segment);
        }

        for via in &self.vias {
            if !reached_vias.contains(via) {
                segments.push(Segment { anchors: vec![AnchorId::Via(*via)], netlines: Vec::new() });
            }
        }
        segments
    }
}
