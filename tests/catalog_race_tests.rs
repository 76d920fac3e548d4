use chrono::Utc;
use roster_core::{
    catalog::{CatalogError, CatalogResult},
    entry::OPTION_PLACEHOLDER,
    naming::AttributeKind,
    EntrySchema, FormsetConfig, FormsetController, Intent, OptionCatalog, PackageOption,
    PackageState, StaticCatalog,
};

struct FailingCatalog;

impl OptionCatalog for FailingCatalog {
    fn fetch_options(&self, _package: i64) -> CatalogResult {
        Err(CatalogError::Transport("connection reset".into()))
    }
}

fn size_catalog() -> StaticCatalog {
    let mut catalog = StaticCatalog::new();
    catalog.insert(
        1,
        vec![PackageOption {
            id: 5,
            name: "Size".into(),
            allowed_values: vec!["S".into(), "M".into()],
        }],
    );
    catalog
}

fn controller(initial_count: usize, packages: Vec<i64>) -> FormsetController {
    let config = FormsetConfig {
        initial_count,
        ..FormsetConfig::default()
    };
    FormsetController::new(&config, EntrySchema::athlete(packages)).unwrap()
}

#[test]
fn selecting_a_package_renders_its_option_fields() {
    let mut controller = controller(1, vec![1, 2]);
    let entry_id = controller.collection().entry_at(0).unwrap().id();

    let applied = controller
        .select_package(entry_id, 1, &size_catalog())
        .unwrap();
    assert!(applied);

    let entry = controller.collection().entry_at(0).unwrap();
    assert_eq!(entry.package_state(), &PackageState::OptionsReady { package: 1 });
    assert_eq!(entry.values.get("package").unwrap(), "1");

    assert_eq!(entry.option_fields.len(), 1);
    let option = &entry.option_fields[0];
    assert_eq!(option.label, "Size");
    assert_eq!(option.allowed_values, ["S", "M"]);
    assert_eq!(option.placeholder(), OPTION_PLACEHOLDER);
    assert_eq!(
        option.value_field("athlete", 0).render(AttributeKind::Name),
        "athlete-0-option-5"
    );
    assert_eq!(
        option.name_carrier("athlete", 0).render(AttributeKind::Name),
        "athlete-0-option-5-name"
    );
}

#[test]
fn reselecting_before_completion_discards_the_first_response() {
    let mut controller = controller(1, vec![1, 2]);
    let entry_id = controller.collection().entry_at(0).unwrap().id();
    let catalog = size_catalog();

    let first = controller.begin_select(entry_id, 1).unwrap();
    let second = controller.begin_select(entry_id, 2).unwrap();

    // The older response arrives late and must not render.
    assert!(!controller.apply_fetch(first.dispatch(&catalog)));
    let entry = controller.collection().entry_at(0).unwrap();
    assert!(matches!(
        entry.package_state(),
        PackageState::OptionsLoading { package: 2, .. }
    ));

    assert!(controller.apply_fetch(second.dispatch(&catalog)));
    let entry = controller.collection().entry_at(0).unwrap();
    assert_eq!(entry.package_state(), &PackageState::OptionsReady { package: 2 });
    // Package 2 is unknown to the catalog: ready, zero options.
    assert!(entry.option_fields.is_empty());
}

#[test]
fn a_response_for_a_removed_entry_is_discarded() {
    let mut controller = controller(2, vec![1, 2]);
    let doomed = controller.collection().entry_at(1).unwrap().id();

    let request = controller.begin_select(doomed, 1).unwrap();
    controller.handle(Intent::RemoveOne(doomed), Utc::now());

    assert!(!controller.apply_fetch(request.dispatch(&size_catalog())));
    assert_eq!(controller.collection().len(), 1);
}

#[test]
fn transport_failure_is_visible_and_retryable() {
    let mut controller = controller(1, vec![1, 2]);
    let entry_id = controller.collection().entry_at(0).unwrap().id();

    let applied = controller
        .select_package(entry_id, 1, &FailingCatalog)
        .unwrap();
    assert!(applied);
    let entry = controller.collection().entry_at(0).unwrap();
    assert_eq!(entry.package_state(), &PackageState::FetchFailed { package: 1 });
    assert!(entry.option_fields.is_empty());

    // Reselecting the package retries.
    controller.select_package(entry_id, 1, &size_catalog()).unwrap();
    let entry = controller.collection().entry_at(0).unwrap();
    assert_eq!(entry.package_state(), &PackageState::OptionsReady { package: 1 });
    assert_eq!(entry.option_fields.len(), 1);
}

#[test]
fn rebinding_rebuilds_rather_than_appends() {
    // A single package choice auto-selects at bind time.
    let mut controller = controller(1, vec![1]);
    let catalog = size_catalog();

    for request in controller.bind() {
        controller.apply_fetch(request.dispatch(&catalog));
    }
    assert_eq!(
        controller.collection().entry_at(0).unwrap().option_fields.len(),
        1
    );

    // Binding again re-triggers the full transition; option fields must not
    // accumulate.
    for request in controller.bind() {
        controller.apply_fetch(request.dispatch(&catalog));
    }
    let entry = controller.collection().entry_at(0).unwrap();
    assert_eq!(entry.option_fields.len(), 1);
    assert_eq!(entry.package_state(), &PackageState::OptionsReady { package: 1 });
}

#[test]
fn added_entries_auto_select_a_sole_package() {
    let mut controller = controller(1, vec![7]);
    let fetches = controller.handle(Intent::Add, Utc::now());
    assert_eq!(fetches.len(), 1);
    assert_eq!(fetches[0].package, 7);
    let added = controller.collection().entry_at(1).unwrap();
    assert_eq!(fetches[0].entry, added.id());
}

#[test]
fn reindexing_keeps_option_field_names_current() {
    let mut controller = controller(2, vec![1, 2]);
    let second = controller.collection().entry_at(1).unwrap().id();
    controller.select_package(second, 1, &size_catalog()).unwrap();

    let first = controller.collection().entry_at(0).unwrap().id();
    controller.handle(Intent::RemoveOne(first), Utc::now());

    // The surviving entry moved from index 1 to 0; option field names are
    // derived from the live index.
    let entry = controller.collection().entry_at(0).unwrap();
    assert_eq!(entry.id(), second);
    let option = &entry.option_fields[0];
    assert_eq!(
        option
            .value_field(entry.prefix(), entry.index())
            .render(AttributeKind::Name),
        "athlete-0-option-5"
    );
}
