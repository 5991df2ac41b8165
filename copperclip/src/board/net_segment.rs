//! Net segments
//!
//! A net segment is one connected piece of copper of a net signal: vias, net
//! points and the net lines between them (plus the pads those lines end at).
//! Connectivity is indexed in a `petgraph` stable graph whose nodes are
//! anchors and whose edges are net lines, so "which lines touch this anchor"
//! is a neighbourhood query instead of a scan.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use super::anchor::AnchorId;
use super::items::{NetLine, NetPoint, Via};
use super::{BoardError, ItemKind};
use crate::geometry::Point;
use crate::splitter::AnchorGraph;

#[derive(Debug, Clone)]
pub struct NetSegment {
    uuid: Uuid,
    net_signal: Uuid,
    vias: BTreeMap<Uuid, Via>,
    netpoints: BTreeMap<Uuid, NetPoint>,
    netlines: BTreeMap<Uuid, NetLine>,
    graph: StableUnGraph<AnchorId, Uuid>,
    nodes: HashMap<AnchorId, NodeIndex>,
    edges: HashMap<Uuid, EdgeIndex>,
}

impl PartialEq for NetSegment {
    // The graph is derived from the net lines.
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.net_signal == other.net_signal
            && self.vias == other.vias
            && self.netpoints == other.netpoints
            && self.netlines == other.netlines
    }
}

impl NetSegment {
    pub fn new(uuid: Uuid, net_signal: Uuid) -> Self {
        Self {
            uuid,
            net_signal,
            vias: BTreeMap::new(),
            netpoints: BTreeMap::new(),
            netlines: BTreeMap::new(),
            graph: StableUnGraph::default(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn net_signal(&self) -> Uuid {
        self.net_signal
    }

    pub fn vias(&self) -> impl Iterator<Item = &Via> {
        self.vias.values()
    }

    pub fn netpoints(&self) -> impl Iterator<Item = &NetPoint> {
        self.netpoints.values()
    }

    pub fn netlines(&self) -> impl Iterator<Item = &NetLine> {
        self.netlines.values()
    }

    pub fn via(&self, uuid: &Uuid) -> Option<&Via> {
        self.vias.get(uuid)
    }

    pub fn netpoint(&self, uuid: &Uuid) -> Option<&NetPoint> {
        self.netpoints.get(uuid)
    }

    pub fn netline(&self, uuid: &Uuid) -> Option<&NetLine> {
        self.netlines.get(uuid)
    }

    pub fn via_count(&self) -> usize {
        self.vias.len()
    }

    pub fn netline_count(&self) -> usize {
        self.netlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vias.is_empty() && self.netpoints.is_empty() && self.netlines.is_empty()
    }

    /// Position of a via or net point of this segment. Pads are owned by the
    /// board, see [`super::Board::anchor_position`].
    pub fn anchor_position(&self, anchor: &AnchorId) -> Option<Point> {
        match anchor {
            AnchorId::Via(uuid) => self.vias.get(uuid).map(|v| v.position),
            AnchorId::Junction(uuid) => self.netpoints.get(uuid).map(|p| p.position),
            AnchorId::Pad(_) => None,
        }
    }

    /// Net lines attached to `anchor`, in ascending uuid order.
    pub fn netlines_of(&self, anchor: &AnchorId) -> Vec<Uuid> {
        let Some(&node) = self.nodes.get(anchor) else {
            return Vec::new();
        };
        let mut lines: Vec<Uuid> = self.graph.edges(node).map(|edge| *edge.weight()).collect();
        lines.sort();
        lines
    }

    fn owns_anchor(&self, anchor: &AnchorId) -> bool {
        match anchor {
            AnchorId::Via(uuid) => self.vias.contains_key(uuid),
            AnchorId::Junction(uuid) => self.netpoints.contains_key(uuid),
            AnchorId::Pad(_) => false,
        }
    }

    /// Register new elements. Either all of them are added or, on error,
    /// none. `pad_exists` resolves pad endpoints against the board.
    pub(super) fn add_elements(
        &mut self,
        vias: &[Via],
        netpoints: &[NetPoint],
        netlines: &[NetLine],
        pad_exists: impl Fn(&AnchorId) -> bool,
    ) -> Result<(), BoardError> {
        let mut new_anchors = HashSet::new();
        for via in vias {
            if self.vias.contains_key(&via.uuid) || !new_anchors.insert(AnchorId::Via(via.uuid)) {
                return Err(BoardError::Duplicate { kind: ItemKind::Via, uuid: via.uuid });
            }
        }
        for netpoint in netpoints {
            if self.netpoints.contains_key(&netpoint.uuid) || !new_anchors.insert(AnchorId::Junction(netpoint.uuid)) {
                return Err(BoardError::Duplicate { kind: ItemKind::NetPoint, uuid: netpoint.uuid });
            }
        }
        let mut new_lines = HashSet::new();
        for netline in netlines {
            if self.netlines.contains_key(&netline.uuid) || !new_lines.insert(netline.uuid) {
                return Err(BoardError::Duplicate { kind: ItemKind::NetLine, uuid: netline.uuid });
            }
            if netline.start == netline.end {
                return Err(BoardError::DegenerateNetLine(netline.uuid));
            }
            for anchor in [netline.start, netline.end] {
                let resolvable = match anchor {
                    AnchorId::Via(_) | AnchorId::Junction(_) => {
                        self.owns_anchor(&anchor) || new_anchors.contains(&anchor)
                    }
                    AnchorId::Pad(_) => pad_exists(&anchor),
                };
                if !resolvable {
                    return Err(BoardError::UnresolvedAnchor { netline: netline.uuid, anchor });
                }
            }
        }

        for via in vias {
            self.insert_node(AnchorId::Via(via.uuid));
            self.vias.insert(via.uuid, via.clone());
        }
        for netpoint in netpoints {
            self.insert_node(AnchorId::Junction(netpoint.uuid));
            self.netpoints.insert(netpoint.uuid, netpoint.clone());
        }
        for netline in netlines {
            let a = self.insert_node(netline.start);
            let b = self.insert_node(netline.end);
            let edge = self.graph.add_edge(a, b, netline.uuid);
            self.edges.insert(netline.uuid, edge);
            self.netlines.insert(netline.uuid, netline.clone());
        }
        Ok(())
    }

    /// Unregister elements. Anchors may only be removed once no remaining
    /// net line touches them. Either all are removed or none.
    pub(super) fn remove_elements(
        &mut self,
        vias: &[Uuid],
        netpoints: &[Uuid],
        netlines: &[Uuid],
    ) -> Result<(), BoardError> {
        for uuid in vias {
            if !self.vias.contains_key(uuid) {
                return Err(BoardError::NotFound { kind: ItemKind::Via, uuid: *uuid });
            }
        }
        for uuid in netpoints {
            if !self.netpoints.contains_key(uuid) {
                return Err(BoardError::NotFound { kind: ItemKind::NetPoint, uuid: *uuid });
            }
        }
        let removed_lines: HashSet<Uuid> = netlines.iter().copied().collect();
        for uuid in netlines {
            if !self.netlines.contains_key(uuid) {
                return Err(BoardError::NotFound { kind: ItemKind::NetLine, uuid: *uuid });
            }
        }
        let anchors = vias
            .iter()
            .map(|uuid| AnchorId::Via(*uuid))
            .chain(netpoints.iter().map(|uuid| AnchorId::Junction(*uuid)));
        for anchor in anchors {
            if self.netlines_of(&anchor).iter().any(|line| !removed_lines.contains(line)) {
                return Err(BoardError::AnchorInUse(anchor));
            }
        }

        for uuid in &removed_lines {
            if let (Some(edge), Some(netline)) = (self.edges.remove(uuid), self.netlines.remove(uuid)) {
                self.graph.remove_edge(edge);
                // Pads only live in the graph while lines reference them.
                for pad in [netline.start, netline.end].into_iter().filter(AnchorId::is_pad) {
                    self.remove_node_if_unused(pad);
                }
            }
        }
        for uuid in vias {
            self.vias.remove(uuid);
            self.remove_node_if_unused(AnchorId::Via(*uuid));
        }
        for uuid in netpoints {
            self.netpoints.remove(uuid);
            self.remove_node_if_unused(AnchorId::Junction(*uuid));
        }
        Ok(())
    }

    fn insert_node(&mut self, anchor: AnchorId) -> NodeIndex {
        if let Some(&node) = self.nodes.get(&anchor) {
            return node;
        }
        let node = self.graph.add_node(anchor);
        self.nodes.insert(anchor, node);
        node
    }

    fn remove_node_if_unused(&mut self, anchor: AnchorId) {
        if let Some(&node) = self.nodes.get(&anchor) {
            if self.graph.edges(node).next().is_none() && !self.owns_anchor(&anchor) {
                self.graph.remove_node(node);
                self.nodes.remove(&anchor);
            }
        }
    }

    /// Whether all vias and net points are reachable from each other through
    /// this segment's net lines. Pads do not conduct for this check. Empty
    /// segments and single vias count as connected.
    pub fn is_connected(&self) -> bool {
        let mut owned = self
            .vias
            .keys()
            .map(|uuid| AnchorId::Via(*uuid))
            .chain(self.netpoints.keys().map(|uuid| AnchorId::Junction(*uuid)));
        let Some(first) = owned.next() else {
            return true;
        };
        let Some(&start) = self.nodes.get(&first) else {
            return false;
        };
        let mut reached = HashSet::from([first]);
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for next in self.graph.neighbors(node) {
                let Some(anchor) = self.graph.node_weight(next) else {
                    continue;
                };
                if reached.insert(*anchor) && !anchor.is_pad() {
                    stack.push(next);
                }
            }
        }
        owned.all(|anchor| reached.contains(&anchor))
    }
}

impl AnchorGraph for NetSegment {
    fn netlines_of(&self, anchor: &AnchorId) -> Vec<Uuid> {
        NetSegment::netlines_of(self, anchor)
    }

    fn endpoints(&self, netline: &Uuid) -> Option<(AnchorId, AnchorId)> {
        self.netlines.get(netline).map(|line| (line.start, line.end))
    }

    fn layer(&self, netline: &Uuid) -> Option<&str> {
        self.netlines.get(netline).map(|line| line.layer.as_str())
    }
}
