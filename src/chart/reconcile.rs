//! Keyed enter/update/exit reconciliation
//!
//! A `Reconciler` owns the mapping from stable key to element state. Each
//! tick, the new snapshot's keys are classified against the mapping as it was
//! *before* the tick:
//! - enter: key is new, an element is created
//! - update: key is already rendered (including an element still animating out)
//! - exit: key is rendered but missing from the snapshot
//!
//! Exiting elements stay in the mapping, flagged, until `sweep` sees that
//! their exit animation has completed.

use super::error::{ChartError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

/// Result of classifying one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join<K> {
    pub enter: Vec<K>,
    pub update: Vec<K>,
    pub exit: Vec<K>,
}

impl<K> Default for Join<K> {
    fn default() -> Self {
        Self {
            enter: Vec::new(),
            update: Vec::new(),
            exit: Vec::new(),
        }
    }
}

impl<K> Join<K> {
    /// (enter, update, exit) sizes
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.enter.len(), self.update.len(), self.exit.len())
    }
}

#[derive(Debug, Clone)]
struct Binding<S> {
    state: S,
    exiting: bool,
}

/// Stable key → element state, diffed each tick
#[derive(Debug, Clone)]
pub struct Reconciler<K, S> {
    bindings: BTreeMap<K, Binding<S>>,
}

impl<K, S> Default for Reconciler<K, S> {
    fn default() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }
}

impl<K, S> Reconciler<K, S>
where
    K: Ord + Clone + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `keys` against the rendered set without changing it
    ///
    /// Enter and update keep snapshot order; exit follows key order.
    pub fn classify<'a, I>(&self, keys: I) -> Result<Join<K>>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut seen = BTreeSet::new();
        let mut join = Join::default();

        for key in keys {
            if !seen.insert(key) {
                return Err(ChartError::DuplicateKey(format!("{:?}", key)));
            }
            if self.bindings.contains_key(key) {
                join.update.push(key.clone());
            } else {
                join.enter.push(key.clone());
            }
        }

        join.exit = self
            .bindings
            .keys()
            .filter(|k| !seen.contains(*k))
            .cloned()
            .collect();

        Ok(join)
    }

    /// Reconcile a snapshot
    ///
    /// All keys are classified first; only then are the callbacks run, so no
    /// element created in this tick is ever treated as previous state.
    /// On a duplicate key nothing is changed.
    pub fn reconcile<T, FK, FE, FU, FX>(
        &mut self,
        items: &[T],
        key_of: FK,
        mut on_enter: FE,
        mut on_update: FU,
        mut on_exit: FX,
    ) -> Result<Join<K>>
    where
        FK: Fn(&T) -> K,
        FE: FnMut(&T) -> S,
        FU: FnMut(&T, &mut S),
        FX: FnMut(&K, &mut S),
    {
        let keys: Vec<K> = items.iter().map(key_of).collect();
        let join = self.classify(keys.iter())?;
        let entering: BTreeSet<&K> = join.enter.iter().collect();

        for (item, key) in items.iter().zip(keys.iter()) {
            if entering.contains(key) {
                let state = on_enter(item);
                self.bindings.insert(
                    key.clone(),
                    Binding {
                        state,
                        exiting: false,
                    },
                );
            } else if let Some(binding) = self.bindings.get_mut(key) {
                binding.exiting = false;
                on_update(item, &mut binding.state);
            }
        }

        for key in &join.exit {
            if let Some(binding) = self.bindings.get_mut(key) {
                binding.exiting = true;
                on_exit(key, &mut binding.state);
            }
        }

        Ok(join)
    }

    /// Destroy exiting elements whose exit animation is done
    pub fn sweep<F>(&mut self, is_done: F) -> Vec<K>
    where
        F: Fn(&S) -> bool,
    {
        let finished: Vec<K> = self
            .bindings
            .iter()
            .filter(|(_, b)| b.exiting && is_done(&b.state))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &finished {
            self.bindings.remove(key);
        }
        finished
    }

    pub fn get(&self, key: &K) -> Option<&S> {
        self.bindings.get(key).map(|b| &b.state)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut S> {
        self.bindings.get_mut(key).map(|b| &mut b.state)
    }

    pub fn is_exiting(&self, key: &K) -> bool {
        self.bindings.get(key).map_or(false, |b| b.exiting)
    }

    /// All rendered elements (live and exiting) in key order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &S)> {
        self.bindings.iter().map(|(k, b)| (k, &b.state))
    }

    /// Keys of every rendered element
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.bindings.keys()
    }

    /// Rendered elements, including those animating out
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Rendered elements that are not exiting
    pub fn live_len(&self) -> usize {
        self.bindings.values().filter(|b| !b.exiting).count()
    }
}
