use uuid::Uuid;

use crate::board::Board;
use crate::circuit::Circuit;

/// The unit structural edits apply to: one circuit and the board whose
/// copper belongs to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub circuit: Circuit,
    pub board: Board,
}

impl Project {
    pub fn new(circuit: Circuit, board: Board) -> Self {
        Self { circuit, board }
    }

    /// Empty circuit and an empty board with the default layer stack.
    pub fn empty(board_name: &str) -> Self {
        Self::new(Circuit::new(), Board::new(Uuid::new_v4(), board_name))
    }

    /// Name of the net signal a net segment or plane is bound to.
    pub fn net_name(&self, net_signal: &Uuid) -> Option<&str> {
        self.circuit.net_signal(net_signal).map(|s| s.name.as_str())
    }
}
