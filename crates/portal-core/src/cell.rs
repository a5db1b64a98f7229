//! The fixed 4x4 cell universe and its static inner-to-outer reveal mapping.
//!
//! Ids run 1..=16 in row-major order. A [`GridLayout`] assigns every id one
//! [`Role`]: the ids that own a target set are inner (interactive), all
//! others are outer. The mapping is configuration, built once and never
//! derived at runtime.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PortalError, Result};

/// Number of cells per grid row and column.
pub const GRID_SIDE: u8 = 4;

/// Total number of positional cells.
pub const CELL_COUNT: u8 = GRID_SIDE * GRID_SIDE;

/// Identifier of one grid position, guaranteed to lie in `1..=16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CellId(u8);

impl CellId {
    #[must_use]
    pub const fn new(id: u8) -> Option<Self> {
        if id >= 1 && id <= CELL_COUNT {
            Some(Self(id))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based `(row, col)` position in the grid.
    #[must_use]
    pub const fn position(self) -> (u8, u8) {
        ((self.0 - 1) / GRID_SIDE, (self.0 - 1) % GRID_SIDE)
    }

    #[must_use]
    pub const fn from_position(row: u8, col: u8) -> Option<Self> {
        if row >= GRID_SIDE || col >= GRID_SIDE {
            return None;
        }
        Some(Self(row * GRID_SIDE + col + 1))
    }

    /// Every id in ascending order.
    pub fn all() -> impl Iterator<Item = CellId> {
        (1..=CELL_COUNT).map(CellId)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for CellId {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("cell id {value} outside 1..={CELL_COUNT}"))
    }
}

impl From<CellId> for u8 {
    fn from(id: CellId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Outer,
    Inner,
}

/// Static inner-cell to target-outer-cells mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    groups: Vec<(CellId, BTreeSet<CellId>)>,
}

impl GridLayout {
    /// Build a layout from `(inner, targets)` pairs.
    ///
    /// Inner ids must be distinct, target sets non-empty, and no target may
    /// itself be an inner id. Overlapping target sets are allowed.
    pub fn new(mapping: impl IntoIterator<Item = (u8, Vec<u8>)>) -> Result<Self> {
        let mut groups: Vec<(CellId, BTreeSet<CellId>)> = Vec::new();
        for (inner, targets) in mapping {
            let inner_id = CellId::new(inner)
                .ok_or_else(|| PortalError::config(format!("inner cell {inner} out of range")))?;
            if groups.iter().any(|(existing, _)| *existing == inner_id) {
                return Err(PortalError::DuplicateId {
                    catalog: "grid layout",
                    id: inner_id.to_string(),
                });
            }
            let mut set = BTreeSet::new();
            for target in targets {
                let target_id = CellId::new(target).ok_or_else(|| {
                    PortalError::config(format!("target cell {target} out of range"))
                })?;
                set.insert(target_id);
            }
            if set.is_empty() {
                return Err(PortalError::config(format!(
                    "inner cell {inner_id} has no target cells"
                )));
            }
            groups.push((inner_id, set));
        }

        for (inner, targets) in &groups {
            if let Some(clash) = targets
                .iter()
                .find(|target| groups.iter().any(|(other, _)| other == *target))
            {
                return Err(PortalError::config(format!(
                    "cell {clash} is both inner and a target of inner cell {inner}"
                )));
            }
        }

        Ok(Self { groups })
    }

    #[must_use]
    pub fn role(&self, id: CellId) -> Role {
        if self.groups.iter().any(|(inner, _)| *inner == id) {
            Role::Inner
        } else {
            Role::Outer
        }
    }

    #[must_use]
    pub fn is_inner(&self, id: CellId) -> bool {
        self.role(id) == Role::Inner
    }

    #[must_use]
    pub fn is_outer(&self, id: CellId) -> bool {
        self.role(id) == Role::Outer
    }

    /// Target set of an inner cell; `None` for outer cells.
    #[must_use]
    pub fn targets(&self, inner: CellId) -> Option<&BTreeSet<CellId>> {
        self.groups
            .iter()
            .find(|(id, _)| *id == inner)
            .map(|(_, targets)| targets)
    }

    /// Inner cells whose target set contains `outer`.
    pub fn owners(&self, outer: CellId) -> impl Iterator<Item = CellId> + '_ {
        self.groups
            .iter()
            .filter(move |(_, targets)| targets.contains(&outer))
            .map(|(inner, _)| *inner)
    }

    pub fn inner_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.groups.iter().map(|(inner, _)| *inner)
    }

    pub fn outer_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        CellId::all().filter(move |id| self.is_outer(*id))
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            groups: [
                (6, [1, 2, 5]),
                (7, [3, 4, 8]),
                (10, [9, 13, 14]),
                (11, [12, 15, 16]),
            ]
            .into_iter()
            .map(|(inner, targets)| {
                (
                    CellId(inner),
                    targets.into_iter().map(CellId).collect::<BTreeSet<_>>(),
                )
            })
            .collect(),
        }
    }
}
