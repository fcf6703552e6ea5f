//! Timer store - owns the timer collection and its state transitions

use timerbox_core::models::{NewTimer, Timer, TimerUpdate};
use timerbox_core::storage::TimerStorage;

use super::observer::{StoreChange, StoreObserver};

/// Ordered timer collection plus the observers notified after each mutation.
///
/// Operations that target an id which is not present are silent no-ops and
/// report `false`.
#[derive(Default)]
pub struct TimerStore {
    timers: Vec<Timer>,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl TimerStore {
    /// Create an empty store with no observers
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_timers(timers: Vec<Timer>) -> Self {
        Self {
            timers,
            observers: Vec::new(),
        }
    }

    /// Load the persisted collection, falling back to an empty one on any failure
    pub fn load(storage: &TimerStorage) -> Self {
        let timers = match storage.load() {
            Ok(timers) => {
                tracing::info!(
                    "Loaded {} timers from storage key '{}'",
                    timers.len(),
                    storage.key()
                );
                timers
            }
            Err(e) => {
                tracing::error!(
                    "Error loading timers from storage key '{}': {}",
                    storage.key(),
                    e
                );
                Vec::new()
            }
        };

        Self::from_timers(timers)
    }

    /// Replace the collection with what `storage` currently holds, without
    /// notifying observers. On a load failure the in-memory collection is kept.
    pub fn reload(&mut self, storage: &TimerStorage) -> bool {
        match storage.load() {
            Ok(timers) => {
                if timers != self.timers {
                    tracing::debug!(
                        "Picked up external changes under '{}' ({} -> {} timers)",
                        storage.key(),
                        self.timers.len(),
                        timers.len()
                    );
                    self.timers = timers;
                }
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Keeping in-memory timers, reload of '{}' failed: {}",
                    storage.key(),
                    e
                );
                false
            }
        }
    }

    pub fn with_observer(mut self, observer: impl StoreObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn get(&self, id: &str) -> Option<&Timer> {
        self.timers.iter().find(|timer| timer.id == id)
    }

    /// Timers whose id starts with `prefix`, in collection order
    pub fn matching_prefix(&self, prefix: &str) -> Vec<&Timer> {
        self.timers
            .iter()
            .filter(|timer| timer.id.starts_with(prefix))
            .collect()
    }

    /// True when at least one timer would be decremented by the next tick
    pub fn has_running(&self) -> bool {
        self.timers.iter().any(Timer::is_counting_down)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn add(&mut self, input: NewTimer) -> Timer {
        let timer = Timer::new(input);
        tracing::debug!("Adding timer {} ({}s)", timer.id, timer.duration);

        self.timers.push(timer.clone());
        self.emit(StoreChange::Added(timer.clone()));

        timer
    }

    /// Remove a timer. The collection is persisted even when nothing matched.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        let removed = self.timers.len() != before;

        if !removed {
            tracing::debug!("delete: timer {} not found", id);
        }

        self.emit(StoreChange::Deleted {
            id: id.to_string(),
            removed,
        });

        removed
    }

    /// Flip the running flag. A completed timer can be flipped on, but
    /// `tick` never decrements it.
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(timer) = self.find_mut(id) else {
            tracing::debug!("toggle: timer {} not found", id);
            return false;
        };

        timer.toggle();
        let is_running = timer.is_running;

        self.emit(StoreChange::Toggled {
            id: id.to_string(),
            is_running,
        });

        true
    }

    /// Advance every counting-down timer by one second, in lockstep.
    ///
    /// Returns the ids of timers that reached zero on this tick.
    pub fn tick(&mut self) -> Vec<String> {
        let completed: Vec<String> = self
            .timers
            .iter_mut()
            .filter_map(|timer| timer.tick().then(|| timer.id.clone()))
            .collect();

        for id in &completed {
            tracing::info!("Timer {} completed", id);
        }

        self.emit(StoreChange::Ticked {
            completed: completed.clone(),
        });

        completed
    }

    pub fn restart(&mut self, id: &str) -> bool {
        let Some(timer) = self.find_mut(id) else {
            tracing::debug!("restart: timer {} not found", id);
            return false;
        };

        timer.restart();
        self.emit(StoreChange::Restarted { id: id.to_string() });

        true
    }

    /// Apply `update`, then stop the timer and re-arm it with its full duration
    pub fn edit(&mut self, id: &str, update: TimerUpdate) -> bool {
        let Some(timer) = self.find_mut(id) else {
            tracing::debug!("edit: timer {} not found", id);
            return false;
        };

        timer.apply_update(update);
        self.emit(StoreChange::Edited { id: id.to_string() });

        true
    }

    /// Remove every timer
    pub fn clear(&mut self) {
        let count = self.timers.len();
        self.timers.clear();
        tracing::debug!("Cleared {} timers", count);

        self.emit(StoreChange::Cleared);
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Timer> {
        self.timers.iter_mut().find(|timer| timer.id == id)
    }

    fn emit(&self, change: StoreChange) {
        for observer in &self.observers {
            observer.on_change(&change, &self.timers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use timerbox_core::storage::{KeyValueStore, MemoryStore};

    use crate::store::PersistObserver;

    fn new_timer(title: &str, duration: u32) -> NewTimer {
        NewTimer {
            title: title.to_string(),
            description: format!("{} description", title),
            duration,
        }
    }

    /// Captures every change for assertions
    #[derive(Clone, Default)]
    struct Recorder {
        changes: Arc<Mutex<Vec<StoreChange>>>,
    }

    impl StoreObserver for Recorder {
        fn on_change(&self, change: &StoreChange, _timers: &[Timer]) {
            self.changes.lock().unwrap().push(change.clone());
        }
    }

    fn assert_bounds(store: &TimerStore) {
        for timer in store.timers() {
            assert!(timer.remaining_time <= timer.duration);
        }
    }

    #[test]
    fn test_add_initializes_timer() {
        let mut store = TimerStore::new();
        let timer = store.add(new_timer("Tea", 60));

        assert_eq!(timer.remaining_time, 60);
        assert!(!timer.is_running);
        assert_eq!(store.timers(), &[timer]);
    }

    #[test]
    fn test_add_preserves_insertion_order_and_unique_ids() {
        let mut store = TimerStore::new();
        let a = store.add(new_timer("a", 1));
        let b = store.add(new_timer("b", 2));
        let c = store.add(new_timer("c", 3));

        let ids: Vec<&str> = store.timers().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), b.id.as_str(), c.id.as_str()]);
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
    }

    #[test]
    fn test_add_then_delete_restores_collection() {
        let mut store = TimerStore::new();
        store.add(new_timer("keep", 30));
        let before = store.timers().to_vec();

        let added = store.add(new_timer("temp", 10));
        assert!(store.delete(&added.id));
        assert_eq!(store.timers(), before.as_slice());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut store = TimerStore::new();
        store.add(new_timer("a", 5));
        let before = store.timers().to_vec();

        assert!(!store.delete("does-not-exist"));
        assert_eq!(store.timers(), before.as_slice());
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let mut store = TimerStore::new();
        let timer = store.add(new_timer("a", 5));

        assert!(store.toggle(&timer.id));
        assert!(store.get(&timer.id).unwrap().is_running);
        assert!(store.toggle(&timer.id));
        assert!(!store.get(&timer.id).unwrap().is_running);
        assert!(!store.toggle("missing"));
    }

    #[test]
    fn test_countdown_scenario() {
        let mut store = TimerStore::new();
        let timer = store.add(new_timer("Minute", 60));
        store.toggle(&timer.id);

        for _ in 0..59 {
            assert!(store.tick().is_empty());
        }
        let current = store.get(&timer.id).unwrap();
        assert_eq!(current.remaining_time, 1);
        assert!(current.is_running);

        assert_eq!(store.tick(), vec![timer.id.clone()]);
        let current = store.get(&timer.id).unwrap();
        assert_eq!(current.remaining_time, 0);
        assert!(!current.is_running);

        // Completion is reported once only
        for _ in 0..5 {
            assert!(store.tick().is_empty());
        }
        assert_bounds(&store);
    }

    #[test]
    fn test_tick_advances_running_timers_in_lockstep() {
        let mut store = TimerStore::new();
        let a = store.add(new_timer("a", 10));
        let b = store.add(new_timer("b", 3));
        let idle = store.add(new_timer("idle", 10));
        store.toggle(&a.id);
        store.toggle(&b.id);

        store.tick();
        store.tick();

        assert_eq!(store.get(&a.id).unwrap().remaining_time, 8);
        assert_eq!(store.get(&b.id).unwrap().remaining_time, 1);
        assert_eq!(store.get(&idle.id).unwrap().remaining_time, 10);

        assert_eq!(store.tick(), vec![b.id.clone()]);
        assert_eq!(store.get(&a.id).unwrap().remaining_time, 7);
        assert!(store.get(&a.id).unwrap().is_running);
    }

    #[test]
    fn test_toggle_completed_timer_does_not_resume() {
        let mut store = TimerStore::new();
        let timer = store.add(new_timer("a", 1));
        store.toggle(&timer.id);
        store.tick();

        assert!(store.toggle(&timer.id));
        assert!(store.get(&timer.id).unwrap().is_running);
        assert!(!store.has_running());

        assert!(store.tick().is_empty());
        assert_eq!(store.get(&timer.id).unwrap().remaining_time, 0);
    }

    #[test]
    fn test_restart_from_any_state() {
        let mut store = TimerStore::new();
        let timer = store.add(new_timer("a", 3));

        // Running, mid-countdown
        store.toggle(&timer.id);
        store.tick();
        assert!(store.restart(&timer.id));
        let current = store.get(&timer.id).unwrap();
        assert_eq!(current.remaining_time, 3);
        assert!(!current.is_running);

        // Completed
        store.toggle(&timer.id);
        for _ in 0..3 {
            store.tick();
        }
        assert!(store.restart(&timer.id));
        let current = store.get(&timer.id).unwrap();
        assert_eq!(current.remaining_time, 3);
        assert!(!current.is_running);

        assert!(!store.restart("missing"));
    }

    #[test]
    fn test_edit_with_duration() {
        let mut store = TimerStore::new();
        let timer = store.add(new_timer("a", 60));
        store.toggle(&timer.id);
        store.tick();

        assert!(store.edit(
            &timer.id,
            TimerUpdate {
                title: Some("b".to_string()),
                description: None,
                duration: Some(120),
            },
        ));

        let current = store.get(&timer.id).unwrap();
        assert_eq!(current.title, "b");
        assert_eq!(current.description, "a description");
        assert_eq!(current.duration, 120);
        assert_eq!(current.remaining_time, 120);
        assert!(!current.is_running);
        assert_eq!(current.id, timer.id);
        assert_eq!(current.created_at, timer.created_at);
    }

    #[test]
    fn test_edit_without_duration_rearms() {
        let mut store = TimerStore::new();
        let timer = store.add(new_timer("a", 45));
        store.toggle(&timer.id);
        for _ in 0..10 {
            store.tick();
        }

        assert!(store.edit(
            &timer.id,
            TimerUpdate {
                description: Some("new".to_string()),
                ..TimerUpdate::default()
            },
        ));

        let current = store.get(&timer.id).unwrap();
        assert_eq!(current.remaining_time, 45);
        assert!(!current.is_running);
        assert!(!store.edit("missing", TimerUpdate::default()));
    }

    #[test]
    fn test_clear() {
        let mut store = TimerStore::new();
        store.add(new_timer("a", 1));
        store.add(new_timer("b", 2));

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_matching_prefix() {
        let mut store = TimerStore::new();
        let timer = store.add(new_timer("a", 1));
        store.add(new_timer("b", 2));

        let matches = store.matching_prefix(&timer.id[..8]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, timer.id);
        assert_eq!(store.matching_prefix("").len(), 2);
    }

    #[test]
    fn test_observers_see_each_change() {
        let recorder = Recorder::default();
        let mut store = TimerStore::new().with_observer(recorder.clone());

        let timer = store.add(new_timer("a", 2));
        store.toggle(&timer.id);
        store.tick();
        store.tick();
        store.restart(&timer.id);
        store.edit(&timer.id, TimerUpdate::default());
        store.delete("missing");
        store.delete(&timer.id);
        store.clear();

        let changes = recorder.changes.lock().unwrap();
        assert_eq!(changes.len(), 9);
        assert!(matches!(changes[0], StoreChange::Added(_)));
        assert!(matches!(
            changes[1],
            StoreChange::Toggled {
                is_running: true,
                ..
            }
        ));
        assert_eq!(
            changes[3],
            StoreChange::Ticked {
                completed: vec![timer.id.clone()]
            }
        );
        assert!(matches!(
            changes[6],
            StoreChange::Deleted { removed: false, .. }
        ));
        assert!(matches!(changes[7], StoreChange::Deleted { removed: true, .. }));
        assert_eq!(changes[8], StoreChange::Cleared);
    }

    #[test]
    fn test_missing_id_operations_do_not_notify() {
        let recorder = Recorder::default();
        let mut store = TimerStore::new().with_observer(recorder.clone());

        store.toggle("missing");
        store.restart("missing");
        store.edit("missing", TimerUpdate::default());

        assert!(recorder.changes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_persists_after_every_mutation() {
        let backend = Arc::new(MemoryStore::new());
        let storage = TimerStorage::with_default_key(backend.clone());
        let mut store =
            TimerStore::load(&storage).with_observer(PersistObserver::new(storage.clone()));

        let timer = store.add(new_timer("a", 5));
        assert_eq!(storage.load().unwrap(), store.timers());

        store.toggle(&timer.id);
        store.tick();
        let persisted = storage.load().unwrap();
        assert_eq!(persisted[0].remaining_time, 4);
        assert!(persisted[0].is_running);

        store.delete(&timer.id);
        assert_eq!(backend.get("timers").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_load_falls_back_to_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("timers", "not json at all").unwrap();

        let store = TimerStore::load(&TimerStorage::with_default_key(backend));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_restores_previous_session() {
        let backend = Arc::new(MemoryStore::new());
        let storage = TimerStorage::with_default_key(backend);

        let mut first =
            TimerStore::load(&storage).with_observer(PersistObserver::new(storage.clone()));
        let timer = first.add(new_timer("a", 30));
        first.toggle(&timer.id);

        let second = TimerStore::load(&storage);
        assert_eq!(second.timers(), first.timers());
    }

    #[test]
    fn test_bounds_hold_across_mixed_operations() {
        let mut store = TimerStore::new();
        let a = store.add(new_timer("a", 3));
        assert_bounds(&store);
        let b = store.add(new_timer("b", 10));
        assert_bounds(&store);

        let steps: Vec<Box<dyn Fn(&mut TimerStore) + '_>> = vec![
            Box::new(|s| {
                s.toggle(&a.id);
            }),
            Box::new(|s| {
                s.toggle(&b.id);
            }),
            Box::new(|s| {
                s.tick();
            }),
            Box::new(|s| {
                s.tick();
            }),
            Box::new(|s| {
                s.edit(
                    &b.id,
                    TimerUpdate {
                        duration: Some(4),
                        ..TimerUpdate::default()
                    },
                );
            }),
            Box::new(|s| {
                s.toggle(&b.id);
            }),
            Box::new(|s| {
                s.tick();
            }),
            Box::new(|s| {
                s.tick();
            }),
            Box::new(|s| {
                s.toggle(&a.id);
            }),
            Box::new(|s| {
                s.tick();
            }),
            Box::new(|s| {
                s.restart(&a.id);
            }),
            Box::new(|s| {
                s.edit(
                    &a.id,
                    TimerUpdate {
                        duration: Some(1),
                        ..TimerUpdate::default()
                    },
                );
            }),
            Box::new(|s| {
                s.toggle(&a.id);
            }),
            Box::new(|s| {
                s.tick();
            }),
            Box::new(|s| {
                s.delete(&b.id);
            }),
            Box::new(|s| {
                s.tick();
            }),
        ];

        for step in &steps {
            step(&mut store);
            assert_bounds(&store);
            for timer in store.timers() {
                if timer.remaining_time == 0 {
                    assert!(!timer.is_counting_down());
                }
            }
        }

        let a = store.get(&a.id).unwrap();
        assert_eq!((a.duration, a.remaining_time), (1, 0));
        assert!(store.get(&b.id).is_none());
    }

    #[test]
    fn test_reload_picks_up_external_changes() {
        let storage = TimerStorage::with_default_key(Arc::new(MemoryStore::new()));
        let mut store =
            TimerStore::load(&storage).with_observer(PersistObserver::new(storage.clone()));
        let timer = store.add(new_timer("a", 30));
        store.toggle(&timer.id);

        let mut other =
            TimerStore::load(&storage).with_observer(PersistObserver::new(storage.clone()));
        other.toggle(&timer.id);

        let recorder = Recorder::default();
        store.add_observer(Box::new(recorder.clone()));
        assert!(store.reload(&storage));
        assert!(!store.get(&timer.id).unwrap().is_running);
        assert!(recorder.changes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reload_keeps_memory_on_bad_data() {
        let backend = Arc::new(MemoryStore::new());
        let storage = TimerStorage::with_default_key(backend.clone());
        let mut store = TimerStore::new();
        store.add(new_timer("a", 30));
        let before = store.timers().to_vec();

        backend.set("timers", "[{broken").unwrap();
        assert!(!store.reload(&storage));
        assert_eq!(store.timers(), before.as_slice());
    }
}
