//! Top-level orchestration: user intents, the server-facing total-count
//! field, and the auxiliary UI state that must track every mutation.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::catalog::{FetchOutcome, FetchRequest, OptionCatalog, PackageId};
use crate::collection::EntryCollection;
use crate::config::FormsetConfig;
use crate::entry::EntrySchema;
use crate::errors::{FormsetError, FormsetResult};
use crate::roles::RoleAssigner;

/// Seconds a minimum-violation warning stays visible before auto-dismissing.
pub const ALERT_DISMISS_SECS: i64 = 4;

/// A user intent against the formset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Add,
    RemoveOne(Uuid),
    RemoveGroup,
}

/// A transient, self-dismissing warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    shown_at: DateTime<Utc>,
}

impl Alert {
    fn new(message: String, now: DateTime<Utc>) -> Self {
        Self {
            message,
            shown_at: now,
        }
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now - self.shown_at >= Duration::seconds(ALERT_DISMISS_SECS)
    }
}

/// The well-known management field the server-side binding protocol reads:
/// `<prefix>-TOTAL_FORMS`, holding the entry count as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalFormsField {
    prefix: String,
    value: String,
}

impl TotalFormsField {
    fn new(prefix: &str, count: usize) -> Self {
        Self {
            prefix: prefix.to_string(),
            value: count.to_string(),
        }
    }

    pub fn name(&self) -> String {
        format!("{}-TOTAL_FORMS", self.prefix)
    }

    pub fn id(&self) -> String {
        format!("id_{}-TOTAL_FORMS", self.prefix)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn set(&mut self, count: usize) {
        self.value = count.to_string();
    }
}

/// Wires user intents to collection operations and keeps the server-facing
/// count and auxiliary UI consistent with the result.
#[derive(Debug)]
pub struct FormsetController {
    collection: EntryCollection,
    total_forms: TotalFormsField,
    group_remove_visible: bool,
    alert: Option<Alert>,
}

impl FormsetController {
    /// Builds the controller from validated configuration and the entry
    /// schema. Call [`FormsetController::bind`] afterwards to run the
    /// initial selector pass and collect any fetches it dispatches.
    pub fn new(config: &FormsetConfig, schema: EntrySchema) -> FormsetResult<Self> {
        config.validate()?;
        let roles = RoleAssigner::new(config.roles.clone(), config.roles_locked);
        let collection = EntryCollection::new(
            schema,
            &config.prefix,
            &config.entry_label,
            config.min_participants,
            config.initial_count,
            roles,
        )?;
        let total_forms = TotalFormsField::new(&config.prefix, collection.total_forms());
        let group_remove_visible = collection.len() > collection.min_size();
        Ok(Self {
            collection,
            total_forms,
            group_remove_visible,
            alert: None,
        })
    }

    pub fn collection(&self) -> &EntryCollection {
        &self.collection
    }

    pub fn total_forms(&self) -> &TotalFormsField {
        &self.total_forms
    }

    /// Whether the group-removal affordance is shown. Only meaningful once
    /// the collection has grown past its floor.
    pub fn group_remove_visible(&self) -> bool {
        self.group_remove_visible
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Initial binding pass over every entry, equivalent to re-attaching
    /// handlers after the page's structure changed. Returns fetches to
    /// dispatch for auto-selected or restored package selections.
    pub fn bind(&mut self) -> Vec<FetchRequest> {
        self.collection.rebind()
    }

    /// Handles a user intent. Minimum violations never mutate anything and
    /// surface as a transient alert instead of an error; returned fetches
    /// belong to newly added entries whose selector auto-fired.
    pub fn handle(&mut self, intent: Intent, now: DateTime<Utc>) -> Vec<FetchRequest> {
        match intent {
            Intent::Add => {
                let fetches = self.collection.add_group();
                self.sync();
                fetches
            }
            Intent::RemoveGroup => {
                match self.collection.remove_group() {
                    Ok(()) => self.sync(),
                    Err(err) => self.report_removal_failure(err, false, now),
                }
                Vec::new()
            }
            Intent::RemoveOne(id) => {
                match self.collection.remove_one(id) {
                    Ok(()) => self.sync(),
                    Err(err) => self.report_removal_failure(err, true, now),
                }
                Vec::new()
            }
        }
    }

    /// Opens a package selection on an entry, returning the tagged fetch for
    /// the embedding to dispatch.
    pub fn begin_select(&mut self, entry: Uuid, package: PackageId) -> FormsetResult<FetchRequest> {
        let entry = self
            .collection
            .entry_mut(entry)
            .ok_or(FormsetError::UnknownEntry(entry))?;
        Ok(entry.select_package(package))
    }

    /// Applies a completed fetch, discarding it when stale. Never an error:
    /// a response for a removed or re-targeted entry is a no-op.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) -> bool {
        self.collection.apply_fetch(outcome)
    }

    /// Blocking convenience for synchronous transports: select, fetch, and
    /// apply in one step. Returns whether the response was applied.
    pub fn select_package(
        &mut self,
        entry: Uuid,
        package: PackageId,
        catalog: &dyn OptionCatalog,
    ) -> FormsetResult<bool> {
        let request = self.begin_select(entry, package)?;
        let outcome = request.dispatch(catalog);
        Ok(self.apply_fetch(outcome))
    }

    /// Clears the warning once its dismiss interval has elapsed.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.alert.as_ref().is_some_and(|alert| alert.expired(now)) {
            self.alert = None;
        }
    }

    /// Synchronizes derived state after a completed mutation: the
    /// total-count field exactly once, and the group-removal visibility.
    fn sync(&mut self) {
        self.total_forms.set(self.collection.total_forms());
        self.group_remove_visible = self.collection.len() > self.collection.min_size();
    }

    fn report_removal_failure(&mut self, err: FormsetError, single: bool, now: DateTime<Utc>) {
        match err {
            FormsetError::MinimumViolation { required } => {
                let message = if single {
                    format!(
                        "This race requires at least {required} participant(s). You can't remove more."
                    )
                } else {
                    format!("This race requires at least {required} participant(s).")
                };
                tracing::warn!(required, "removal blocked by participant minimum");
                self.alert = Some(Alert::new(message, now));
            }
            err => {
                // The affordance outlived its entry; nothing to mutate.
                tracing::warn!(%err, "removal intent ignored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_forms_field_follows_the_binding_protocol() {
        let field = TotalFormsField::new("athlete", 3);
        assert_eq!(field.name(), "athlete-TOTAL_FORMS");
        assert_eq!(field.id(), "id_athlete-TOTAL_FORMS");
        assert_eq!(field.value(), "3");
    }

    #[test]
    fn alert_expires_after_the_dismiss_interval() {
        let now = Utc::now();
        let alert = Alert::new("warning".into(), now);
        assert!(!alert.expired(now + Duration::seconds(ALERT_DISMISS_SECS - 1)));
        assert!(alert.expired(now + Duration::seconds(ALERT_DISMISS_SECS)));
    }
}
