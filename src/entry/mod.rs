//! Entry schema, the entry factory, and per-entry state.
//!
//! Entries are manufactured from a declarative [`EntrySchema`] rather than by
//! cloning an already-rendered sibling, so there is no hidden dependency on
//! "the first form happens to be the template".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{FetchOutcome, FetchRequest, PackageId, PackageOption};
use crate::naming::{AttributeKind, FieldName, FieldRef};
use crate::roles::RoleBinding;
use crate::selector::{PackageSelector, PackageState};

/// Key of the hidden field carrying the package selection.
pub const PACKAGE_FIELD_KEY: &str = "package";

/// Placeholder shown as the disabled default of every option choice field.
pub const OPTION_PLACEHOLDER: &str = "Select an option";

/// Rendering of a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldWidget {
    Text,
    Email,
    Date,
    Choice(Vec<String>),
    Hidden,
}

/// Declarative description of one field in an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    pub widget: FieldWidget,
    /// Initial value a freshly manufactured entry carries. User-entered
    /// values never survive manufacture; defaults (typically on hidden
    /// fields) do.
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>, widget: FieldWidget) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            widget,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn labelled(&self) -> bool {
        !matches!(self.widget, FieldWidget::Hidden)
    }
}

/// The canonical shape every entry is built from: field definitions plus the
/// package choices offered to each entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySchema {
    pub fields: Vec<FieldSpec>,
    pub packages: Vec<PackageId>,
}

impl EntrySchema {
    pub fn new(fields: Vec<FieldSpec>, packages: Vec<PackageId>) -> Self {
        Self { fields, packages }
    }

    /// The athlete registration surface: personal details, the hidden
    /// package selection, and the role selector.
    pub fn athlete(packages: Vec<PackageId>) -> Self {
        let fields = vec![
            FieldSpec::new("first_name", "First name", FieldWidget::Text),
            FieldSpec::new("last_name", "Last name", FieldWidget::Text),
            FieldSpec::new("team", "Team", FieldWidget::Text),
            FieldSpec::new("email", "Email", FieldWidget::Email),
            FieldSpec::new("phone", "Phone", FieldWidget::Text),
            FieldSpec::new(
                "sex",
                "Sex",
                FieldWidget::Choice(vec!["Male".into(), "Female".into()]),
            ),
            FieldSpec::new("dob", "Date of birth", FieldWidget::Date),
            FieldSpec::new("hometown", "Hometown", FieldWidget::Text),
            FieldSpec::new(PACKAGE_FIELD_KEY, "Package", FieldWidget::Hidden),
            FieldSpec::new("role", "Role", FieldWidget::Choice(Vec::new())),
        ];
        Self::new(fields, packages)
    }
}

/// One fetched option rendered onto an entry: a label, a choice field, and a
/// hidden carrier holding the option's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionField {
    pub option_id: i64,
    pub label: String,
    pub allowed_values: Vec<String>,
}

impl OptionField {
    pub fn from_wire(option: PackageOption) -> Self {
        Self {
            option_id: option.id,
            label: option.name,
            allowed_values: option.allowed_values,
        }
    }

    /// Name of the choice field: `<prefix>-<i>-option-<id>`.
    pub fn value_field(&self, prefix: &str, index: usize) -> FieldName {
        FieldName::new(prefix, index, format!("option-{}", self.option_id))
    }

    /// Name of the hidden carrier: `<prefix>-<i>-option-<id>-name`. Its
    /// value is the option's display name, which the serving side expects
    /// alongside the chosen value.
    pub fn name_carrier(&self, prefix: &str, index: usize) -> FieldName {
        FieldName::new(prefix, index, format!("option-{}-name", self.option_id))
    }

    pub fn placeholder(&self) -> &'static str {
        OPTION_PLACEHOLDER
    }
}

/// One repeatable sub-form unit.
///
/// `id` is stable for the entry's whole lifetime; `index` is its current
/// display position and is rewritten on every renumbering. Every field
/// identifier embeds the current index.
#[derive(Debug, Clone)]
pub struct Entry {
    id: Uuid,
    index: usize,
    prefix: String,
    pub header: String,
    pub fields: Vec<FieldRef>,
    pub values: BTreeMap<String, String>,
    pub removable: bool,
    pub role: Option<RoleBinding>,
    pub option_fields: Vec<OptionField>,
    selector: PackageSelector,
}

impl Entry {
    /// Manufactures a fresh entry at `index`. Field identifiers are derived
    /// from the schema; values start cleared apart from schema defaults.
    pub fn from_schema(index: usize, prefix: &str, schema: &EntrySchema) -> Self {
        let mut fields = Vec::new();
        let mut values = BTreeMap::new();
        for spec in &schema.fields {
            let name = FieldName::new(prefix, index, &spec.key);
            fields.push(FieldRef::new(name.clone(), AttributeKind::Name));
            fields.push(FieldRef::new(name.clone(), AttributeKind::Id));
            if spec.labelled() {
                fields.push(FieldRef::new(name, AttributeKind::LabelFor));
            }
            if let Some(default) = &spec.default {
                values.insert(spec.key.clone(), default.clone());
            }
        }
        let selector = match values.get(PACKAGE_FIELD_KEY).and_then(|v| v.parse().ok()) {
            Some(package) => PackageSelector::with_selection(schema.packages.clone(), package),
            None => PackageSelector::new(schema.packages.clone()),
        };
        Self {
            id: Uuid::new_v4(),
            index,
            prefix: prefix.to_string(),
            header: String::new(),
            fields,
            values,
            removable: true,
            role: None,
            option_fields: Vec::new(),
            selector,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn package_state(&self) -> &PackageState {
        self.selector.state()
    }

    pub fn package_selection(&self) -> Option<PackageId> {
        self.selector.selection()
    }

    pub fn package_choices(&self) -> &[PackageId] {
        self.selector.choices()
    }

    /// Derived identifier for one of this entry's fields.
    pub fn field_name(&self, key: &str) -> FieldName {
        FieldName::new(&self.prefix, self.index, key)
    }

    /// Rewrites the positional index embedded in every field identifier.
    pub(crate) fn set_index(&mut self, new_index: usize) {
        self.index = new_index;
        for field in &mut self.fields {
            field.name.reindex(new_index);
        }
    }

    /// Chooses a package: updates the hidden selection field, clears the
    /// previously rendered option fields, and opens a new fetch generation.
    pub fn select_package(&mut self, package: PackageId) -> FetchRequest {
        self.values
            .insert(PACKAGE_FIELD_KEY.to_string(), package.to_string());
        self.option_fields.clear();
        self.selector.begin(self.id, package)
    }

    /// Binds the package selector, returning the fetch to dispatch if the
    /// binding triggered a selection.
    ///
    /// A pre-set selection is re-triggered in full — rendered option fields
    /// from before the manufacture are never trusted. With exactly one
    /// package choice and no prior selection, that choice is auto-selected.
    pub fn bind_packages(&mut self) -> Option<FetchRequest> {
        if let Some(current) = self.selector.selection() {
            return Some(self.select_package(current));
        }
        if let [only] = self.selector.choices() {
            let only = *only;
            return Some(self.select_package(only));
        }
        None
    }

    /// Applies a completed fetch. Stale outcomes — a generation that has
    /// been superseded, or a package that no longer matches — are discarded
    /// as no-ops. Returns whether the outcome was applied.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) -> bool {
        if !self.selector.accepts(&outcome) {
            tracing::debug!(
                entry = %self.id,
                package = outcome.package,
                seq = outcome.seq,
                "discarding stale option fetch"
            );
            return false;
        }
        match outcome.result {
            Ok(response) => {
                self.option_fields = response
                    .package_options
                    .into_iter()
                    .map(OptionField::from_wire)
                    .collect();
                self.selector.finish_ready();
            }
            Err(err) => {
                tracing::warn!(entry = %self.id, package = outcome.package, %err, "option fetch failed");
                self.option_fields.clear();
                self.selector.finish_failed();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PackageOptionsResponse;

    fn schema() -> EntrySchema {
        EntrySchema::athlete(vec![1, 2])
    }

    #[test]
    fn factory_builds_index_consistent_fields() {
        let entry = Entry::from_schema(3, "athlete", &schema());
        assert!(!entry.fields.is_empty());
        for field in &entry.fields {
            assert_eq!(field.name.index, 3);
            assert_eq!(field.name.prefix, "athlete");
        }
        assert_eq!(
            entry.field_name("email").render(AttributeKind::Id),
            "id_athlete-3-email"
        );
    }

    #[test]
    fn hidden_fields_carry_no_label_reference() {
        let entry = Entry::from_schema(0, "athlete", &schema());
        assert!(!entry.fields.iter().any(|f| {
            f.name.key == PACKAGE_FIELD_KEY && f.attribute == AttributeKind::LabelFor
        }));
    }

    #[test]
    fn set_index_rewrites_every_identifier() {
        let mut entry = Entry::from_schema(2, "athlete", &schema());
        entry.set_index(0);
        assert!(entry.fields.iter().all(|f| f.name.index == 0));
    }

    #[test]
    fn schema_default_survives_manufacture_and_restores_selection() {
        let mut custom = schema();
        if let Some(spec) = custom.fields.iter_mut().find(|s| s.key == PACKAGE_FIELD_KEY) {
            spec.default = Some("2".into());
        }
        let mut entry = Entry::from_schema(0, "athlete", &custom);
        assert_eq!(entry.package_selection(), Some(2));
        // Binding re-triggers the full transition rather than trusting
        // whatever was rendered before.
        let request = entry.bind_packages().unwrap();
        assert_eq!(request.package, 2);
        assert!(matches!(
            entry.package_state(),
            PackageState::OptionsLoading { package: 2, .. }
        ));
    }

    #[test]
    fn auto_select_fires_with_a_single_choice() {
        let single = EntrySchema::athlete(vec![9]);
        let mut entry = Entry::from_schema(0, "athlete", &single);
        let request = entry.bind_packages().expect("auto-select");
        assert_eq!(request.package, 9);
    }

    #[test]
    fn no_auto_select_with_multiple_choices() {
        let mut entry = Entry::from_schema(0, "athlete", &schema());
        assert!(entry.bind_packages().is_none());
        assert_eq!(entry.package_state(), &PackageState::Unselected);
    }

    #[test]
    fn selecting_clears_previous_option_fields() {
        let mut entry = Entry::from_schema(0, "athlete", &schema());
        let request = entry.select_package(1);
        let response = PackageOptionsResponse {
            package_options: vec![PackageOption {
                id: 5,
                name: "Size".into(),
                allowed_values: vec!["S".into(), "M".into()],
            }],
        };
        assert!(entry.apply_fetch(request.resolve(Ok(response))));
        assert_eq!(entry.option_fields.len(), 1);

        entry.select_package(2);
        assert!(entry.option_fields.is_empty());
    }

    #[test]
    fn option_field_names_follow_the_convention() {
        let field = OptionField {
            option_id: 5,
            label: "Size".into(),
            allowed_values: vec!["S".into(), "M".into()],
        };
        assert_eq!(
            field.value_field("athlete", 0).render(AttributeKind::Name),
            "athlete-0-option-5"
        );
        assert_eq!(
            field.name_carrier("athlete", 0).render(AttributeKind::Name),
            "athlete-0-option-5-name"
        );
        assert_eq!(field.placeholder(), OPTION_PLACEHOLDER);
    }
}
