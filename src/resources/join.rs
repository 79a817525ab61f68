//! The join barrier that turns N independent loads into one scene assembly.
//!
//! Every load is registered up front as a [`LoadTask`]. Completions may arrive
//! in any order; the barrier fires exactly once, the first time every task is
//! settled, and hands out a [`LoadedSet`] whose slots follow registration
//! order so the assembled scene never depends on which load finished last.

use crate::{error::OverlayError, resources::ResourceKey};

/// What happens to the barrier when one of its loads fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave the failed slot empty and fire once the other tasks are settled.
    #[default]
    Exclude,
    /// Abort the barrier on the first failure. It never fires afterwards.
    Abort,
}

#[derive(Debug)]
pub enum LoadState<A> {
    Pending,
    Loaded(A),
    Failed(String),
}

/// One registered load. Moves out of `Pending` exactly once.
#[derive(Debug)]
pub struct LoadTask<A> {
    key: ResourceKey,
    state: LoadState<A>,
}

impl<A> LoadTask<A> {
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn state(&self) -> &LoadState<A> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, LoadState::Pending)
    }
}

/// The result of a fired barrier, one slot per registered task.
#[derive(Debug)]
pub struct LoadedSet<A> {
    slots: Vec<(ResourceKey, Option<A>)>,
}

impl<A> LoadedSet<A> {
    pub fn get(&self, key: &ResourceKey) -> Option<&A> {
        self.slots
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, asset)| asset.as_ref())
    }

    /// Keys in slot order together with their asset, failed loads included.
    pub fn slots(&self) -> impl Iterator<Item = (&ResourceKey, Option<&A>)> {
        self.slots.iter().map(|(k, a)| (k, a.as_ref()))
    }

    pub fn loaded_keys(&self) -> Vec<&ResourceKey> {
        self.slots
            .iter()
            .filter(|(_, a)| a.is_some())
            .map(|(k, _)| k)
            .collect()
    }

    /// Keys whose load failed and that were excluded from assembly.
    pub fn missing(&self) -> Vec<&ResourceKey> {
        self.slots
            .iter()
            .filter(|(_, a)| a.is_none())
            .map(|(k, _)| k)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Outcome of feeding one completion into the barrier.
#[derive(Debug)]
pub enum JoinStatus<A> {
    Waiting { remaining: usize },
    /// Produced exactly once per barrier.
    Ready(LoadedSet<A>),
    /// The barrier already fired or was aborted; the completion is ignored.
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Waiting,
    Fired,
    Aborted,
}

/// Fires only when a completion settles the last pending task, so an empty
/// join set never fires.
pub struct JoinBarrier<A> {
    tasks: Vec<LoadTask<A>>,
    policy: FailurePolicy,
    phase: Phase,
    on_all_loaded: Option<Box<dyn FnOnce(&LoadedSet<A>)>>,
}

impl<A> JoinBarrier<A> {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            tasks: Vec::new(),
            policy,
            phase: Phase::Waiting,
            on_all_loaded: None,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Adds a task to the join set. Only possible before the barrier settles.
    pub fn register(&mut self, key: ResourceKey) -> Result<&LoadTask<A>, OverlayError> {
        if self.phase != Phase::Waiting {
            return Err(OverlayError::BarrierSettled(key));
        }
        if self.tasks.iter().any(|task| task.key == key) {
            return Err(OverlayError::DuplicateResource(key));
        }
        self.tasks.push(LoadTask {
            key,
            state: LoadState::Pending,
        });
        let idx = self.tasks.len() - 1;
        Ok(&self.tasks[idx])
    }

    /// Registers a callback invoked with the loaded set at the moment the barrier fires.
    pub fn on_all_loaded(&mut self, callback: impl FnOnce(&LoadedSet<A>) + 'static) {
        if self.on_all_loaded.is_some() {
            log::warn!("Replacing an already registered on_all_loaded callback.");
        }
        self.on_all_loaded = Some(Box::new(callback));
    }

    pub fn tasks(&self) -> &[LoadTask<A>] {
        &self.tasks
    }

    pub fn remaining(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_pending()).count()
    }

    pub fn has_fired(&self) -> bool {
        self.phase == Phase::Fired
    }

    pub fn is_aborted(&self) -> bool {
        self.phase == Phase::Aborted
    }

    pub fn on_loaded(&mut self, key: &ResourceKey, asset: A) -> Result<JoinStatus<A>, OverlayError> {
        if self.phase != Phase::Waiting {
            log::warn!("{} finished loading after the scene was already settled.", key);
            return Ok(JoinStatus::Settled);
        }
        let task = self.task_mut(key)?;
        if !task.is_pending() {
            log::warn!("{} reported completion twice, keeping the first result.", key);
            return Ok(self.status());
        }
        task.state = LoadState::Loaded(asset);
        Ok(self.try_fire())
    }

    pub fn on_load_failed(
        &mut self,
        key: &ResourceKey,
        error: anyhow::Error,
    ) -> Result<JoinStatus<A>, OverlayError> {
        if self.phase != Phase::Waiting {
            log::warn!("{} failed after the scene was already settled: {:#}", key, error);
            return Ok(JoinStatus::Settled);
        }
        let policy = self.policy;
        let task = self.task_mut(key)?;
        if !task.is_pending() {
            log::warn!("{} reported a failure after it already settled: {:#}", key, error);
            return Ok(self.status());
        }
        let reason = format!("{:#}", error);
        task.state = LoadState::Failed(reason.clone());
        match policy {
            FailurePolicy::Exclude => {
                log::warn!("{} failed to load and is left out of the scene: {}", key, reason);
                Ok(self.try_fire())
            }
            FailurePolicy::Abort => {
                log::error!("{} failed to load, aborting scene assembly: {}", key, reason);
                self.phase = Phase::Aborted;
                self.on_all_loaded = None;
                Err(OverlayError::AssemblyAborted {
                    key: key.clone(),
                    reason,
                })
            }
        }
    }

    fn task_mut(&mut self, key: &ResourceKey) -> Result<&mut LoadTask<A>, OverlayError> {
        self.tasks
            .iter_mut()
            .find(|task| &task.key == key)
            .ok_or_else(|| OverlayError::UnknownResource(key.clone()))
    }

    fn status(&self) -> JoinStatus<A> {
        JoinStatus::Waiting {
            remaining: self.remaining(),
        }
    }

    fn try_fire(&mut self) -> JoinStatus<A> {
        let remaining = self.remaining();
        if remaining > 0 {
            return JoinStatus::Waiting { remaining };
        }
        self.phase = Phase::Fired;
        let slots = std::mem::take(&mut self.tasks)
            .into_iter()
            .map(|task| match task.state {
                LoadState::Loaded(asset) => (task.key, Some(asset)),
                _ => (task.key, None),
            })
            .collect();
        let set = LoadedSet { slots };
        log::info!(
            "All {} loads settled ({} missing), assembling scene.",
            set.len(),
            set.missing().len()
        );
        if let Some(callback) = self.on_all_loaded.take() {
            callback(&set);
        }
        JoinStatus::Ready(set)
    }
}
