//! The ordered sequence of entries: growth, removal, and renumbering.

use uuid::Uuid;

use crate::catalog::{FetchOutcome, FetchRequest};
use crate::entry::{Entry, EntrySchema};
use crate::errors::{FormsetError, FormsetResult};
use crate::roles::RoleAssigner;

/// Owns the authoritative entry order, enforces the minimum-size floor, and
/// performs add/remove/reindex as one transaction. The exposed total count is
/// always computed from the live sequence, never tracked separately.
#[derive(Debug)]
pub struct EntryCollection {
    schema: EntrySchema,
    prefix: String,
    entry_label: String,
    min_size: usize,
    roles: RoleAssigner,
    entries: Vec<Entry>,
}

impl EntryCollection {
    /// Builds the initial collection. `initial_count` must cover the floor,
    /// and the schema must describe at least one field; both are init-time
    /// preconditions, not runtime conditions.
    pub fn new(
        schema: EntrySchema,
        prefix: impl Into<String>,
        entry_label: impl Into<String>,
        min_size: usize,
        initial_count: usize,
        roles: RoleAssigner,
    ) -> FormsetResult<Self> {
        if min_size == 0 {
            return Err(FormsetError::InvalidConfig(
                "minimum size must be at least 1".into(),
            ));
        }
        if initial_count < min_size {
            return Err(FormsetError::InvalidConfig(format!(
                "initial count {initial_count} is below the minimum of {min_size}"
            )));
        }
        if schema.fields.is_empty() {
            return Err(FormsetError::MissingTemplate);
        }
        let mut collection = Self {
            schema,
            prefix: prefix.into(),
            entry_label: entry_label.into(),
            min_size,
            roles,
            entries: Vec::with_capacity(initial_count),
        };
        for _ in 0..initial_count {
            collection.push_entry();
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Current entry count, the value the server-facing total field mirrors.
    pub fn total_forms(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, id: Uuid) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn entry_mut(&mut self, id: Uuid) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|entry| entry.id() == id)
    }

    pub fn entry_at(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Appends one group (`min_size` fresh entries) at sequential indices.
    pub fn add_group(&mut self) -> Vec<FetchRequest> {
        let mut fetches = Vec::new();
        for _ in 0..self.min_size {
            if let Some(request) = self.push_entry() {
                fetches.push(request);
            }
        }
        tracing::debug!(total = self.entries.len(), "group added");
        fetches
    }

    /// Removes the last group in display order. Fails with
    /// [`FormsetError::MinimumViolation`] and no mutation at the floor.
    pub fn remove_group(&mut self) -> FormsetResult<()> {
        if self.entries.len() <= self.min_size {
            return Err(FormsetError::MinimumViolation {
                required: self.min_size,
            });
        }
        let keep = self.entries.len() - self.min_size;
        self.entries.truncate(keep);
        self.renumber();
        tracing::debug!(total = self.entries.len(), "group removed");
        Ok(())
    }

    /// Removes exactly one entry. Fails with
    /// [`FormsetError::MinimumViolation`] and no mutation at the floor.
    pub fn remove_one(&mut self, id: Uuid) -> FormsetResult<()> {
        if self.entries.len() <= self.min_size {
            return Err(FormsetError::MinimumViolation {
                required: self.min_size,
            });
        }
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id() == id)
            .ok_or(FormsetError::UnknownEntry(id))?;
        self.entries.remove(position);
        self.renumber();
        tracing::debug!(total = self.entries.len(), "entry removed");
        Ok(())
    }

    /// Re-binds per-entry state invalidated by structural changes: the
    /// remove affordance and the package selector. Selector binding is
    /// clear-then-rebuild, so repeating it never duplicates option fields.
    pub fn rebind(&mut self) -> Vec<FetchRequest> {
        let removable = self.min_size == 1;
        let mut fetches = Vec::new();
        for entry in &mut self.entries {
            entry.removable = removable;
            if let Some(request) = entry.bind_packages() {
                fetches.push(request);
            }
        }
        fetches
    }

    /// Routes a completed fetch to its entry. Outcomes for entries that no
    /// longer exist are discarded. Returns whether anything was applied.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) -> bool {
        match self.entry_mut(outcome.entry) {
            Some(entry) => entry.apply_fetch(outcome),
            None => {
                tracing::debug!(
                    entry = %outcome.entry,
                    package = outcome.package,
                    "discarding option fetch for a removed entry"
                );
                false
            }
        }
    }

    fn push_entry(&mut self) -> Option<FetchRequest> {
        let index = self.entries.len();
        let mut entry = Entry::from_schema(index, &self.prefix, &self.schema);
        entry.removable = self.min_size == 1;
        entry.role = self.roles.assign(index);
        entry.header = self.header_for(index);
        let fetch = entry.bind_packages();
        self.entries.push(entry);
        fetch
    }

    /// Renumbers survivors to the dense range `0..len` in display order,
    /// recomputing headers and positional role assignments.
    fn renumber(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.index() != index {
                entry.set_index(index);
            }
            entry.header = format!("{} {}", self.entry_label, index + 1);
            entry.role = self.roles.assign(index);
        }
    }

    fn header_for(&self, index: usize) -> String {
        format!("{} {}", self.entry_label, index + 1)
    }
}
