//! Net classes and net signals
//!
//! Pasted copper is re-attached to nets by exact name; this module owns the
//! name lookup and the creation of missing nets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::board::{BoardError, ItemKind};

const MAX_IDENTIFIER_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid circuit identifier: '{0}'")]
pub struct InvalidIdentifier(pub String);

/// A net or net class name: 1 to 32 characters out of
/// `[-a-zA-Z0-9_+/!?@#$]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CircuitIdentifier(String);

impl CircuitIdentifier {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let name = name.into();
        let valid_char = |c: char| c.is_ascii_alphanumeric() || "-_+/!?@#$".contains(c);
        if name.is_empty() || name.chars().count() > MAX_IDENTIFIER_LEN || !name.chars().all(valid_char) {
            return Err(InvalidIdentifier(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CircuitIdentifier {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CircuitIdentifier::new(s)
    }
}

impl TryFrom<String> for CircuitIdentifier {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CircuitIdentifier::new(value)
    }
}

impl From<CircuitIdentifier> for String {
    fn from(value: CircuitIdentifier) -> Self {
        value.0
    }
}

impl fmt::Display for CircuitIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetClass {
    pub uuid: Uuid,
    pub name: CircuitIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSignal {
    pub uuid: Uuid,
    pub name: CircuitIdentifier,
    pub net_class: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Circuit {
    net_classes: BTreeMap<Uuid, NetClass>,
    net_signals: BTreeMap<Uuid, NetSignal>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn net_classes(&self) -> impl Iterator<Item = &NetClass> {
        self.net_classes.values()
    }

    pub fn net_signals(&self) -> impl Iterator<Item = &NetSignal> {
        self.net_signals.values()
    }

    pub fn net_class(&self, uuid: &Uuid) -> Option<&NetClass> {
        self.net_classes.get(uuid)
    }

    pub fn net_signal(&self, uuid: &Uuid) -> Option<&NetSignal> {
        self.net_signals.get(uuid)
    }

    pub fn net_class_by_name(&self, name: &str) -> Option<&NetClass> {
        self.net_classes.values().find(|c| c.name.as_str() == name)
    }

    pub fn net_signal_by_name(&self, name: &str) -> Option<&NetSignal> {
        self.net_signals.values().find(|s| s.name.as_str() == name)
    }

    pub fn add_net_class(&mut self, net_class: NetClass) -> Result<(), BoardError> {
        if self.net_classes.contains_key(&net_class.uuid) {
            return Err(BoardError::Duplicate { kind: ItemKind::NetClass, uuid: net_class.uuid });
        }
        if self.net_class_by_name(net_class.name.as_str()).is_some() {
            return Err(BoardError::DuplicateName {
                kind: ItemKind::NetClass,
                name: net_class.name.to_string(),
            });
        }
        self.net_classes.insert(net_class.uuid, net_class);
        Ok(())
    }

    pub fn remove_net_class(&mut self, uuid: &Uuid) -> Result<NetClass, BoardError> {
        if self.net_signals.values().any(|s| s.net_class == *uuid) {
            return Err(BoardError::InUse { kind: ItemKind::NetClass, uuid: *uuid });
        }
        self.net_classes
            .remove(uuid)
            .ok_or(BoardError::NotFound { kind: ItemKind::NetClass, uuid: *uuid })
    }

    pub fn add_net_signal(&mut self, net_signal: NetSignal) -> Result<(), BoardError> {
        if self.net_signals.contains_key(&net_signal.uuid) {
            return Err(BoardError::Duplicate { kind: ItemKind::NetSignal, uuid: net_signal.uuid });
        }
        if !self.net_classes.contains_key(&net_signal.net_class) {
            return Err(BoardError::NotFound { kind: ItemKind::NetClass, uuid: net_signal.net_class });
        }
        if self.net_signal_by_name(net_signal.name.as_str()).is_some() {
            return Err(BoardError::DuplicateName {
                kind: ItemKind::NetSignal,
                name: net_signal.name.to_string(),
            });
        }
        self.net_signals.insert(net_signal.uuid, net_signal);
        Ok(())
    }

    /// Callers must make sure no board item still refers to the signal.
    pub fn remove_net_signal(&mut self, uuid: &Uuid) -> Result<NetSignal, BoardError> {
        self.net_signals
            .remove(uuid)
            .ok_or(BoardError::NotFound { kind: ItemKind::NetSignal, uuid: *uuid })
    }
}
