//! Opcode canonicalization.
//!
//! Every distinct opcode bit pattern seen during a run gets a small dense
//! id. Dictionary parsing and n-gram generation intern opcodes through the
//! same table, so ids from different files and patterns are comparable as
//! long as they come from one table.

use crate::bits::BitSequence;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Canonical opcode identifier.
pub type OpcodeId = usize;

/// Run-wide mapping from opcode bits to dense ids.
///
/// Ids are assigned in first-observation order starting at 0 and never
/// change. Lookups take a shared lock; interning a new opcode takes the
/// exclusive lock, so the table can be shared across threads by reference.
#[derive(Debug, Default)]
pub struct OpcodeTable {
    ids: RwLock<HashMap<BitSequence, OpcodeId>>,
}

impl OpcodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `opcode` if it has been observed.
    pub fn lookup(&self, opcode: &BitSequence) -> Option<OpcodeId> {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(opcode)
            .copied()
    }

    /// Id of `opcode`, assigning the next free id on first observation.
    pub fn intern(&self, opcode: &BitSequence) -> OpcodeId {
        if let Some(id) = self.lookup(opcode) {
            return id;
        }
        let mut ids = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        let next = ids.len();
        *ids.entry(opcode.clone()).or_insert(next)
    }

    /// Number of distinct opcodes observed.
    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no opcode has been observed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
