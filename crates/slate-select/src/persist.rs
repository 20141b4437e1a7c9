#![forbid(unsafe_code)]

//! Opt-in persistence for selection state.
//!
//! A [`Persistable`] component can snapshot its user-facing state into a
//! versioned envelope and restore it later — across sessions when the
//! `state-persistence` feature (serde) is enabled, or in memory through a
//! [`StateStore`] otherwise.
//!
//! # Design Invariants
//!
//! 1. **Round-trip fidelity**: `restore_state(save_state())` must
//!    reproduce equivalent observable state. Derived data (resolved
//!    positions, visual selection) may be recomputed; the selection
//!    membership and filter text must survive.
//! 2. **Graceful version mismatch**: a stored envelope whose version does
//!    not match the component's current [`state_version`] is discarded in
//!    favor of `Default`, never migrated in place and never a panic.
//! 3. **Key uniqueness**: two distinct component instances must produce
//!    distinct [`StateKey`] values.
//! 4. **No side effects**: `save_state` is a pure read; `restore_state`
//!    only mutates the component.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Version mismatch | Component upgraded | `Default::default()` |
//! | Missing state | First run, key changed | `Default::default()` |
//! | Unmatched selection key | Entity left the container | Entry dropped |
//! | Duplicate key | Two instances share an id | Last write wins (logged) |
//!
//! [`state_version`]: Persistable::state_version

use ahash::AHashMap;
use core::fmt;

use slate_core::{Container, FilterableContainer, SelectableEntity};
use tracing::debug;

use crate::ListView;
use crate::selection::SelectablesList;

/// Unique identifier for a component's persisted state: the component
/// type name paired with an instance-unique id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    /// Component type name (e.g. `"SelectablesList"`).
    pub component: &'static str,
    /// Instance-unique identifier.
    pub instance: String,
}

impl StateKey {
    /// Create a key from a component type and instance id.
    #[must_use]
    pub fn new(component: &'static str, instance: impl Into<String>) -> Self {
        Self {
            component,
            instance: instance.into(),
        }
    }

    /// Canonical string form: `"component::instance"`.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.component, self.instance)
    }
}

/// Contract for components with persistable user-facing state.
pub trait Persistable: Sized {
    /// The persisted state payload. `Default` is the fallback for
    /// missing or version-mismatched state.
    type State: Default;

    /// Unique key for this instance. Distinct instances must return
    /// distinct keys.
    fn state_key(&self) -> StateKey;

    /// Snapshot the current user-facing state. Pure read.
    fn save_state(&self) -> Self::State;

    /// Restore from a snapshot, clamping or dropping anything the
    /// current data no longer supports.
    fn restore_state(&mut self, state: Self::State);

    /// Schema version; bump on incompatible `State` changes. Mismatched
    /// stored state is discarded in favor of `Default`.
    fn state_version() -> u32 {
        1
    }
}

/// Version-tagged wrapper around a persisted state payload.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct StateEnvelope<S> {
    /// Schema version recorded at save time.
    pub version: u32,
    /// The state payload.
    pub data: S,
}

impl<S> StateEnvelope<S> {
    /// Snapshot a component into a versioned envelope.
    pub fn pack<W: Persistable<State = S>>(component: &W) -> Self {
        Self {
            version: W::state_version(),
            data: component.save_state(),
        }
    }

    /// The payload if the version matches the component's current
    /// schema, otherwise `Default`.
    pub fn unpack_or_default<W: Persistable<State = S>>(self) -> S
    where
        S: Default,
    {
        if self.version == W::state_version() {
            self.data
        } else {
            debug!(
                "discarding persisted state v{} (current v{})",
                self.version,
                W::state_version()
            );
            S::default()
        }
    }
}

impl<S: Default> Default for StateEnvelope<S> {
    fn default() -> Self {
        Self {
            version: 1,
            data: S::default(),
        }
    }
}

/// In-memory registry of persisted component state, keyed by
/// [`StateKey`].
#[derive(Debug, Default)]
pub struct StateStore<S> {
    entries: AHashMap<StateKey, StateEnvelope<S>>,
}

impl<S: Clone + Default> StateStore<S> {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// Snapshot `component` under its own key. Last write wins.
    pub fn save<W: Persistable<State = S>>(&mut self, component: &W) {
        let key = component.state_key();
        if self.entries.contains_key(&key) {
            debug!("state store overwriting {key}");
        }
        self.entries.insert(key, StateEnvelope::pack(component));
    }

    /// Restore `component` from its stored envelope, falling back to
    /// `Default` state when nothing (or a mismatched version) is stored.
    pub fn restore<W: Persistable<State = S>>(&self, component: &mut W) {
        let state = self
            .entries
            .get(&component.state_key())
            .cloned()
            .map_or_else(S::default, StateEnvelope::unpack_or_default::<W>);
        component.restore_state(state);
    }

    /// Remove the envelope stored under `key`, returning its payload.
    pub fn remove(&mut self, key: &StateKey) -> Option<S> {
        self.entries.remove(key).map(|envelope| envelope.data)
    }

    /// Number of stored envelopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no envelopes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Selection state ─────────────────────────────────────────────────

/// Persisted snapshot of a [`SelectablesList`]: the selected entities'
/// descriptions (selection order) and the active filter text.
///
/// Descriptions are the stable key across sessions — entity values may be
/// recreated, but an entry whose description no longer matches anything
/// in the container is dropped on restore.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SelectionState {
    /// Descriptions of the selected entities, in selection order.
    pub selected: Vec<String>,
    /// Filter text active at save time.
    pub filter: Option<String>,
}

impl<C, V> Persistable for SelectablesList<C, V>
where
    C: FilterableContainer,
    C::Item: Clone,
    V: ListView,
{
    type State = SelectionState;

    fn state_key(&self) -> StateKey {
        StateKey::new("SelectablesList", self.instance_id())
    }

    fn save_state(&self) -> SelectionState {
        SelectionState {
            selected: self
                .selected()
                .iter()
                .map(|entity| entity.describe().into_owned())
                .collect(),
            filter: self.data_source().filter_text().map(str::to_owned),
        }
    }

    fn restore_state(&mut self, state: SelectionState) {
        // Match descriptions against the unfiltered storage so that
        // entries hidden by the saved filter are restored too.
        self.data_source_mut().apply_filter(None);

        let mut restored = Vec::new();
        if let Some(container) = self.data_source().container() {
            for key in &state.selected {
                let mut found: Option<C::Item> = None;
                container.enumerate(|_, item| {
                    if found.is_none() && item.describe().as_ref() == key.as_str() {
                        found = Some(item.clone());
                    }
                });
                match found {
                    Some(entity) => restored.push(entity),
                    None => debug!("persisted selection entry no longer present, dropped"),
                }
            }
        }
        self.set_selected_entries(restored);

        // Re-applies the filter, reloads the widget, and reflects the
        // restored selection at its current positions.
        self.search_text_changed(state.filter.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockView, Person};
    use slate_core::{FilterableVec, Position};

    // ── Test component ──────────────────────────────────────────────

    #[derive(Default)]
    struct Counter {
        id: String,
        value: u32,
        max: u32,
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct CounterState {
        value: u32,
    }

    impl Persistable for Counter {
        type State = CounterState;

        fn state_key(&self) -> StateKey {
            StateKey::new("Counter", &self.id)
        }

        fn save_state(&self) -> CounterState {
            CounterState { value: self.value }
        }

        fn restore_state(&mut self, state: CounterState) {
            self.value = state.value.min(self.max);
        }
    }

    struct CounterV2(Counter);

    impl Persistable for CounterV2 {
        type State = CounterState;

        fn state_key(&self) -> StateKey {
            StateKey::new("Counter", &self.0.id)
        }

        fn save_state(&self) -> CounterState {
            self.0.save_state()
        }

        fn restore_state(&mut self, state: CounterState) {
            self.0.restore_state(state);
        }

        fn state_version() -> u32 {
            2
        }
    }

    // ── StateKey ────────────────────────────────────────────────────

    #[test]
    fn state_key_uniqueness() {
        let a = StateKey::new("SelectablesList", "people");
        let b = StateKey::new("SelectablesList", "tags");
        let c = StateKey::new("Counter", "people");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, StateKey::new("SelectablesList", "people"));
    }

    #[test]
    fn state_key_canonical_form() {
        let key = StateKey::new("SelectablesList", "people");
        assert_eq!(key.canonical(), "SelectablesList::people");
        assert_eq!(key.to_string(), "SelectablesList::people");
    }

    // ── Envelope ────────────────────────────────────────────────────

    #[test]
    fn envelope_round_trip() {
        let counter = Counter {
            id: "main".into(),
            value: 7,
            max: 10,
        };
        let envelope = StateEnvelope::pack(&counter);
        assert_eq!(envelope.version, 1);
        assert_eq!(envelope.unpack_or_default::<Counter>(), CounterState { value: 7 });
    }

    #[test]
    fn envelope_version_mismatch_falls_back_to_default() {
        let stored = StateEnvelope {
            version: 1,
            data: CounterState { value: 9 },
        };
        assert_eq!(stored.unpack_or_default::<CounterV2>(), CounterState::default());
    }

    #[test]
    fn envelope_default_is_version_one() {
        let envelope = StateEnvelope::<CounterState>::default();
        assert_eq!(envelope.version, 1);
        assert_eq!(envelope.data, CounterState::default());
    }

    #[test]
    fn restore_clamps_to_current_bounds() {
        let mut counter = Counter {
            id: "main".into(),
            value: 0,
            max: 5,
        };
        counter.restore_state(CounterState { value: 100 });
        assert_eq!(counter.value, 5);
    }

    // ── StateStore ──────────────────────────────────────────────────

    #[test]
    fn store_save_restore_round_trip() {
        let mut store = StateStore::new();
        let mut counter = Counter {
            id: "main".into(),
            value: 4,
            max: 10,
        };
        store.save(&counter);
        assert_eq!(store.len(), 1);

        counter.value = 0;
        store.restore(&mut counter);
        assert_eq!(counter.value, 4);
    }

    #[test]
    fn restore_missing_state_uses_default() {
        let store: StateStore<CounterState> = StateStore::new();
        let mut counter = Counter {
            id: "unseen".into(),
            value: 3,
            max: 10,
        };
        store.restore(&mut counter);
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn store_last_write_wins() {
        let mut store = StateStore::new();
        let mut counter = Counter {
            id: "main".into(),
            value: 1,
            max: 10,
        };
        store.save(&counter);
        counter.value = 2;
        store.save(&counter);
        assert_eq!(store.len(), 1);

        counter.value = 0;
        store.restore(&mut counter);
        assert_eq!(counter.value, 2);
    }

    #[test]
    fn store_remove_returns_payload() {
        let mut store = StateStore::new();
        let counter = Counter {
            id: "main".into(),
            value: 6,
            max: 10,
        };
        store.save(&counter);

        let removed = store.remove(&counter.state_key());
        assert_eq!(removed, Some(CounterState { value: 6 }));
        assert!(store.is_empty());
    }

    // ── SelectablesList integration ─────────────────────────────────

    fn people_list() -> SelectablesList<FilterableVec<Person>, MockView> {
        let container = FilterableVec::new(vec![
            Person::new(1, "Ada"),
            Person::new(2, "Grace"),
            Person::new(3, "Edsger"),
        ]);
        SelectablesList::new(Some(container), MockView::default())
            .with_multiselection(true)
            .with_instance_id("people")
    }

    #[test]
    fn selection_state_round_trip() {
        let mut list = people_list();
        list.select(&Person::new(2, "Grace"), Position::new(0, 1));
        list.select(&Person::new(1, "Ada"), Position::new(0, 0));
        list.search_text_changed(Some("a"));

        let saved = list.save_state();
        assert_eq!(saved.selected, vec!["Grace".to_string(), "Ada".to_string()]);
        assert_eq!(saved.filter.as_deref(), Some("a"));

        let mut fresh = people_list();
        fresh.restore_state(saved);

        assert!(fresh.is_selected(&Person::new(2, "Grace")));
        assert!(fresh.is_selected(&Person::new(1, "Ada")));
        assert_eq!(fresh.selected().len(), 2);
        assert_eq!(fresh.data_source().filter_text(), Some("a"));
        // Visual selection reflects the restored entries under the filter.
        assert_eq!(
            fresh.view().selected,
            vec![Position::new(0, 1), Position::new(0, 0)]
        );
    }

    #[test]
    fn restore_drops_unmatched_entries() {
        let mut list = people_list();
        list.restore_state(SelectionState {
            selected: vec!["Grace".to_string(), "Nobody".to_string()],
            filter: None,
        });
        assert_eq!(list.selected().len(), 1);
        assert!(list.is_selected(&Person::new(2, "Grace")));
    }

    #[test]
    fn restore_recovers_entries_hidden_by_saved_filter() {
        let mut list = people_list();
        list.select(&Person::new(3, "Edsger"), Position::new(0, 2));
        list.search_text_changed(Some("grace")); // hides Edsger

        let saved = list.save_state();
        let mut fresh = people_list();
        fresh.restore_state(saved);

        assert!(fresh.is_selected(&Person::new(3, "Edsger")));
        // Hidden under the restored filter, so not visually selected.
        assert!(fresh.view().selected.is_empty());
    }

    #[test]
    fn controller_state_key_uses_instance_id() {
        let list = people_list();
        assert_eq!(list.state_key().canonical(), "SelectablesList::people");
    }

    #[test]
    fn store_round_trips_controller_state() {
        let mut store: StateStore<SelectionState> = StateStore::new();
        let mut list = people_list();
        list.select(&Person::new(1, "Ada"), Position::new(0, 0));
        store.save(&list);

        let mut fresh = people_list();
        store.restore(&mut fresh);
        assert!(fresh.is_selected(&Person::new(1, "Ada")));
    }
}
