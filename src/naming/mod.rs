//! Structured field identifiers for formset entries.
//!
//! Every field belonging to entry `i` carries the pattern
//! `<prefix>-<i>-<key>`. Identifier attributes additionally carry an `id_`
//! lead token; label `for` references use the bare pattern. Reindexing is a
//! transformation over this structured form, so renumbering can never touch
//! fields that belong to a different prefix.

use serde::{Deserialize, Serialize};

/// The three attribute syntaxes an identifier can appear under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// A plain `name` attribute: `prefix-i-key`.
    Name,
    /// An `id` attribute: `id_prefix-i-key`.
    Id,
    /// A label `for` reference: bare `prefix-i-key`.
    LabelFor,
}

/// A parsed field identifier: prefix, positional index, and field key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    pub prefix: String,
    pub index: usize,
    pub key: String,
}

impl FieldName {
    pub fn new(prefix: impl Into<String>, index: usize, key: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            index,
            key: key.into(),
        }
    }

    /// Renders the identifier under the given attribute syntax.
    pub fn render(&self, kind: AttributeKind) -> String {
        match kind {
            AttributeKind::Id => format!("id_{}-{}-{}", self.prefix, self.index, self.key),
            AttributeKind::Name | AttributeKind::LabelFor => {
                format!("{}-{}-{}", self.prefix, self.index, self.key)
            }
        }
    }

    /// Parses a raw attribute value against a known prefix.
    ///
    /// Returns `None` when the value belongs to a different prefix or does
    /// not follow the `<prefix>-<digits>-<key>` grammar. Keys may themselves
    /// contain dashes (`option-5-name`).
    pub fn parse(raw: &str, prefix: &str, kind: AttributeKind) -> Option<Self> {
        let bare = match kind {
            AttributeKind::Id => raw.strip_prefix("id_")?,
            AttributeKind::Name | AttributeKind::LabelFor => raw,
        };
        let rest = bare.strip_prefix(prefix)?.strip_prefix('-')?;
        let (digits, key) = rest.split_once('-')?;
        if digits.is_empty() || key.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let index = digits.parse().ok()?;
        Some(Self::new(prefix, index, key))
    }

    /// Rewrites the embedded positional index.
    pub fn reindex(&mut self, new_index: usize) {
        self.index = new_index;
    }
}

/// One concrete occurrence of a field identifier in an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub name: FieldName,
    pub attribute: AttributeKind,
}

impl FieldRef {
    pub fn new(name: FieldName, attribute: AttributeKind) -> Self {
        Self { name, attribute }
    }

    pub fn render(&self) -> String {
        self.name.render(self.attribute)
    }
}
