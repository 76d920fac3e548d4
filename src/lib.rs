#![doc(test(attr(deny(warnings))))]

//! Roster Core implements the dynamic formset engine behind registration
//! forms: a repeatable collection of entry sub-forms with dense positional
//! indexing, a server-facing total-count field, per-entry package selection
//! resolved through an option catalog, and role assignment from a shared
//! pool.

pub mod catalog;
pub mod collection;
pub mod config;
pub mod controller;
pub mod entry;
pub mod errors;
pub mod naming;
pub mod roles;
pub mod selector;

pub use catalog::{OptionCatalog, PackageId, PackageOption, PackageOptionsResponse, StaticCatalog};
pub use collection::EntryCollection;
pub use config::FormsetConfig;
pub use controller::{FormsetController, Intent};
pub use entry::{Entry, EntrySchema, FieldSpec, FieldWidget, OptionField};
pub use errors::{FormsetError, FormsetResult};
pub use roles::{Role, RoleAssigner, RoleBinding};
pub use selector::PackageState;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        init_tracing();
        tracing::info!("Roster Core tracing initialized.");
    });
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::from_default_env().add_directive("roster_core=info".parse().unwrap());

    fmt().with_env_filter(filter).init();
}
