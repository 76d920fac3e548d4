//! Per-entry package-selection state machine.

use uuid::Uuid;

use crate::catalog::{FetchOutcome, FetchRequest, PackageId};

/// Lifecycle of a package selection.
///
/// `Selected` is the restored-but-unbound state: an entry manufactured with a
/// pre-set selection sits here until binding re-triggers the full transition.
/// `FetchFailed` is retryable — reselecting the package starts a fresh fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageState {
    Unselected,
    Selected { package: PackageId },
    OptionsLoading { package: PackageId, seq: u64 },
    OptionsReady { package: PackageId },
    FetchFailed { package: PackageId },
}

/// Binds an entry's mutually-exclusive package choices to its hidden
/// selection field and tracks the option-fetch generation.
#[derive(Debug, Clone)]
pub struct PackageSelector {
    choices: Vec<PackageId>,
    state: PackageState,
    seq: u64,
}

impl PackageSelector {
    pub fn new(choices: Vec<PackageId>) -> Self {
        Self {
            choices,
            state: PackageState::Unselected,
            seq: 0,
        }
    }

    /// Restores a selector around an already-chosen package (e.g. an entry
    /// manufactured from a pre-filled source).
    pub fn with_selection(choices: Vec<PackageId>, package: PackageId) -> Self {
        Self {
            choices,
            state: PackageState::Selected { package },
            seq: 0,
        }
    }

    pub fn choices(&self) -> &[PackageId] {
        &self.choices
    }

    pub fn state(&self) -> &PackageState {
        &self.state
    }

    /// Currently chosen package, if any, regardless of fetch progress.
    pub fn selection(&self) -> Option<PackageId> {
        match self.state {
            PackageState::Unselected => None,
            PackageState::Selected { package }
            | PackageState::OptionsLoading { package, .. }
            | PackageState::OptionsReady { package }
            | PackageState::FetchFailed { package } => Some(package),
        }
    }

    /// Records a selection and opens a new fetch generation. Any in-flight
    /// fetch from an earlier generation becomes stale.
    pub(crate) fn begin(&mut self, entry: Uuid, package: PackageId) -> FetchRequest {
        self.seq += 1;
        self.state = PackageState::OptionsLoading {
            package,
            seq: self.seq,
        };
        tracing::debug!(entry = %entry, package, seq = self.seq, "package selected, options loading");
        FetchRequest {
            entry,
            seq: self.seq,
            package,
        }
    }

    /// Whether an outcome belongs to the fetch currently in flight.
    pub(crate) fn accepts(&self, outcome: &FetchOutcome) -> bool {
        matches!(
            self.state,
            PackageState::OptionsLoading { package, seq }
                if seq == outcome.seq && package == outcome.package
        )
    }

    pub(crate) fn finish_ready(&mut self) {
        if let PackageState::OptionsLoading { package, .. } = self.state {
            self.state = PackageState::OptionsReady { package };
        }
    }

    pub(crate) fn finish_failed(&mut self) {
        if let PackageState::OptionsLoading { package, .. } = self.state {
            self.state = PackageState::FetchFailed { package };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reselection_invalidates_the_previous_generation() {
        let entry = Uuid::new_v4();
        let mut selector = PackageSelector::new(vec![1, 2]);
        let first = selector.begin(entry, 1);
        let second = selector.begin(entry, 2);

        let stale = first.resolve(Ok(Default::default()));
        assert!(!selector.accepts(&stale));
        let live = second.resolve(Ok(Default::default()));
        assert!(selector.accepts(&live));
    }

    #[test]
    fn restored_selection_reports_its_package() {
        let selector = PackageSelector::with_selection(vec![7], 7);
        assert_eq!(selector.selection(), Some(7));
        assert_eq!(selector.state(), &PackageState::Selected { package: 7 });
    }

    #[test]
    fn failure_lands_in_a_retryable_state() {
        let entry = Uuid::new_v4();
        let mut selector = PackageSelector::new(vec![1]);
        selector.begin(entry, 1);
        selector.finish_failed();
        assert_eq!(selector.state(), &PackageState::FetchFailed { package: 1 });
        // Retry opens a fresh generation.
        let retry = selector.begin(entry, 1);
        assert_eq!(retry.seq, 2);
    }
}
