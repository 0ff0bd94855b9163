//! L4 Atomic Layer: condition-scoped setup/teardown registry
//!
//! Each registration pairs a setup value with the teardown its activation
//! produced. The registry only decides *when* a setup or teardown runs; the
//! [`ConditionHandler`] decides *what* running it means.

use tracing::debug;

use crate::host::{ConditionMatcher, WatchId};
use crate::media::MediaQuery;

/// Executes setups and teardowns on behalf of the registry
pub trait ConditionHandler<S, T> {
    fn matcher(&mut self) -> &mut dyn ConditionMatcher;

    /// Run a setup; the returned teardown is stored until deactivation
    fn setup(&mut self, setup: &S) -> Option<T>;

    fn teardown(&mut self, teardown: T);
}

#[derive(Debug)]
struct Registration<S, T> {
    setup: S,
    teardown: Option<T>,
}

#[derive(Debug)]
struct Condition<S, T> {
    query: MediaQuery,
    watch: Option<WatchId>,
    active: bool,
    registrations: Vec<Registration<S, T>>,
}

impl<S, T> Condition<S, T> {
    fn activate<H: ConditionHandler<S, T> + ?Sized>(&mut self, handler: &mut H) {
        self.active = true;
        for registration in &mut self.registrations {
            registration.teardown = handler.setup(&registration.setup);
        }
    }

    fn deactivate<H: ConditionHandler<S, T> + ?Sized>(&mut self, handler: &mut H) {
        self.active = false;
        for registration in self.registrations.iter_mut().rev() {
            if let Some(teardown) = registration.teardown.take() {
                handler.teardown(teardown);
            }
        }
    }
}

/// Set of independently evaluated viewport conditions
#[derive(Debug)]
pub struct ConditionRegistry<S, T> {
    conditions: Vec<Condition<S, T>>,
}

impl<S, T> Default for ConditionRegistry<S, T> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }
}

impl<S, T> ConditionRegistry<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setup under `query`, running it right away when the condition
    /// currently holds. The first registration for a query starts watching it.
    pub fn register<H>(&mut self, query: MediaQuery, setup: S, handler: &mut H)
    where
        H: ConditionHandler<S, T> + ?Sized,
    {
        let index = match self.conditions.iter().position(|c| c.query == query) {
            Some(index) => index,
            None => {
                let (watch, active) = if query.is_always() {
                    (None, true)
                } else {
                    let matcher = handler.matcher();
                    let watch = matcher.watch(query);
                    (Some(watch), matcher.matches(&query))
                };
                debug!(query = %query, active, "Registered condition");
                self.conditions.push(Condition {
                    query,
                    watch,
                    active,
                    registrations: Vec::new(),
                });
                self.conditions.len() - 1
            }
        };

        let condition = &mut self.conditions[index];
        let teardown = if condition.active {
            handler.setup(&setup)
        } else {
            None
        };
        condition.registrations.push(Registration { setup, teardown });
    }

    /// Apply a matcher notification. Returns whether the condition flipped;
    /// notifications that repeat the current state are ignored so setups and
    /// teardowns strictly alternate.
    pub fn on_change<H>(&mut self, query: &MediaQuery, matches: bool, handler: &mut H) -> bool
    where
        H: ConditionHandler<S, T> + ?Sized,
    {
        let Some(condition) = self
            .conditions
            .iter_mut()
            .find(|c| c.query == *query && !c.query.is_always())
        else {
            return false;
        };
        if condition.active == matches {
            return false;
        }

        debug!(query = %query, matches, "Condition changed");
        if matches {
            condition.activate(handler);
        } else {
            condition.deactivate(handler);
        }
        true
    }

    pub fn is_active(&self, query: &MediaQuery) -> bool {
        self.conditions
            .iter()
            .any(|c| c.query == *query && c.active)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Tear everything down, newest first, and stop every watch
    pub fn revert_all<H>(&mut self, handler: &mut H)
    where
        H: ConditionHandler<S, T> + ?Sized,
    {
        while let Some(mut condition) = self.conditions.pop() {
            if condition.active {
                condition.deactivate(handler);
            }
            if let Some(watch) = condition.watch.take() {
                handler.matcher().unwatch(watch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{PointerKind, Viewport};

    #[derive(Default)]
    struct Recorder {
        viewport: Viewport,
        watches: Vec<(WatchId, MediaQuery)>,
        next_watch: u64,
        log: Vec<String>,
    }

    impl ConditionMatcher for Recorder {
        fn matches(&self, query: &MediaQuery) -> bool {
            self.viewport.matches(query)
        }

        fn watch(&mut self, query: MediaQuery) -> WatchId {
            self.next_watch += 1;
            let id = WatchId(self.next_watch);
            self.watches.push((id, query));
            id
        }

        fn unwatch(&mut self, watch: WatchId) {
            self.watches.retain(|(id, _)| *id != watch);
        }
    }

    impl ConditionHandler<&'static str, String> for Recorder {
        fn matcher(&mut self) -> &mut dyn ConditionMatcher {
            self
        }

        fn setup(&mut self, setup: &&'static str) -> Option<String> {
            self.log.push(format!("setup {}", setup));
            Some(format!("teardown {}", setup))
        }

        fn teardown(&mut self, teardown: String) {
            self.log.push(teardown);
        }
    }

    #[test]
    fn test_always_runs_immediately_and_ignores_changes() {
        let mut recorder = Recorder::default();
        let mut registry = ConditionRegistry::new();

        registry.register(MediaQuery::Always, "a", &mut recorder);
        assert_eq!(recorder.log, vec!["setup a"]);
        assert!(recorder.watches.is_empty());

        assert!(!registry.on_change(&MediaQuery::Always, false, &mut recorder));
        assert_eq!(recorder.log.len(), 1);

        registry.revert_all(&mut recorder);
        assert_eq!(recorder.log, vec!["setup a", "teardown a"]);
    }

    #[test]
    fn test_inactive_condition_waits_for_change() {
        let mut recorder = Recorder {
            viewport: Viewport::new(500.0, 800.0, PointerKind::Fine),
            ..Default::default()
        };
        let mut registry = ConditionRegistry::new();
        let query = MediaQuery::at_least(768.0);

        registry.register(query, "clone", &mut recorder);
        registry.register(query, "animate", &mut recorder);
        assert!(recorder.log.is_empty());
        assert_eq!(recorder.watches.len(), 1);

        assert!(registry.on_change(&query, true, &mut recorder));
        assert_eq!(recorder.log, vec!["setup clone", "setup animate"]);

        recorder.log.clear();
        assert!(registry.on_change(&query, false, &mut recorder));
        assert_eq!(recorder.log, vec!["teardown animate", "teardown clone"]);
    }

    #[test]
    fn test_repeated_notifications_alternate() {
        let mut recorder = Recorder::default();
        let mut registry = ConditionRegistry::new();
        let query = MediaQuery::AnyPointer(PointerKind::Fine);

        registry.register(query, "resize", &mut recorder);
        assert!(registry.is_active(&query));

        assert!(!registry.on_change(&query, true, &mut recorder));
        assert!(registry.on_change(&query, false, &mut recorder));
        assert!(!registry.on_change(&query, false, &mut recorder));
        assert!(registry.on_change(&query, true, &mut recorder));

        assert_eq!(
            recorder.log,
            vec!["setup resize", "teardown resize", "setup resize"]
        );
    }

    #[test]
    fn test_revert_all_unwatches() {
        let mut recorder = Recorder::default();
        let mut registry = ConditionRegistry::new();

        registry.register(MediaQuery::AnyPointer(PointerKind::Coarse), "rotate", &mut recorder);
        registry.register(MediaQuery::AnyPointer(PointerKind::Fine), "resize", &mut recorder);
        assert_eq!(recorder.watches.len(), 2);

        registry.revert_all(&mut recorder);
        assert!(recorder.watches.is_empty());
        assert!(registry.is_empty());
        assert_eq!(recorder.log, vec!["setup resize", "teardown resize"]);
    }
}
