//! Role pool and positional role assignment.

use serde::{Deserialize, Serialize};

/// A label drawn from the externally supplied role pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

impl Role {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The rendered assignment for one entry: either an editable selector
/// pre-set to the assigned role, or a single locked read-only choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBinding {
    pub role: Role,
    pub locked: bool,
    /// Choices offered by the selector. Locked bindings carry exactly the
    /// assigned role; editable bindings carry the whole pool.
    pub choices: Vec<Role>,
}

/// Deterministically maps an entry's index to a role from a finite pool.
#[derive(Debug, Clone)]
pub struct RoleAssigner {
    pool: Vec<Role>,
    locked: bool,
}

impl RoleAssigner {
    pub fn new(pool: Vec<Role>, locked: bool) -> Self {
        Self { pool, locked }
    }

    pub fn pool(&self) -> &[Role] {
        &self.pool
    }

    /// Round-robin keyed by position: `pool[index % pool.len()]`.
    /// An empty pool assigns nothing.
    pub fn assign(&self, index: usize) -> Option<RoleBinding> {
        if self.pool.is_empty() {
            return None;
        }
        let role = self.pool[index % self.pool.len()].clone();
        let choices = if self.locked {
            vec![role.clone()]
        } else {
            self.pool.clone()
        };
        Some(RoleBinding {
            role,
            locked: self.locked,
            choices,
        })
    }
}
