//! Production lines and the static line registry.

use std::collections::HashMap;
use std::sync::Arc;

use common::LineId;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// A resource with a fixed daily unit capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionLine {
    pub id: LineId,
    pub name: String,
    pub daily_capacity: u32,
}

impl ProductionLine {
    pub fn new(id: impl Into<LineId>, name: impl Into<String>, daily_capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            daily_capacity,
        }
    }
}

impl std::fmt::Display for ProductionLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Read-only set of production lines, in configuration order, indexed by id.
///
/// Cloning shares the underlying list and index.
#[derive(Debug, Clone, Default)]
pub struct LineRegistry {
    lines: Arc<[ProductionLine]>,
    index: Arc<HashMap<LineId, usize>>,
}

impl LineRegistry {
    /// Builds a registry, rejecting zero capacities and duplicate ids.
    pub fn new(lines: Vec<ProductionLine>) -> Result<Self> {
        let mut index = HashMap::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            if line.daily_capacity == 0 {
                return Err(DomainError::validation(
                    "dailyCapacity",
                    format!("line {} must have a positive daily capacity", line.id),
                ));
            }
            if index.insert(line.id.clone(), position).is_some() {
                return Err(DomainError::validation(
                    "id",
                    format!("line {} is configured more than once", line.id),
                ));
            }
        }

        Ok(Self {
            lines: lines.into(),
            index: Arc::new(index),
        })
    }

    /// Returns the line with the given id.
    pub fn get(&self, id: &LineId) -> Result<&ProductionLine> {
        self.find(id)
            .ok_or_else(|| DomainError::not_found("ProductionLine", id))
    }

    pub fn find(&self, id: &LineId) -> Option<&ProductionLine> {
        self.index.get(id).map(|&position| &self.lines[position])
    }

    pub fn all(&self) -> &[ProductionLine] {
        &self.lines
    }

    /// Returns the summed daily capacity of every line.
    pub fn total_capacity(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.daily_capacity))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
