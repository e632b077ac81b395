use std::collections::HashMap;

use log::info;

use crate::{
    snapshot::{local_state, recorder, reproducer},
    EntityId, ReproduceReport, RuntimeContext, Snapshot, SnapshotConfig, SnapshotError,
    SpawnHooks,
};

/// Owns the snapshot taken from one runtime context.
///
/// Construct one per context and hand it to whatever orchestrates the
/// migration. The manager remembers the identity remaps of its last
/// reproduction so local state can follow remapped entities.
pub struct SnapshotManager {
    config: SnapshotConfig,
    snapshot: Option<Snapshot>,
    recorded_of: HashMap<EntityId, EntityId>,
}

impl SnapshotManager {
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            config,
            snapshot: None,
            recorded_of: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Records every live entity, replacing any previous snapshot.
    pub fn record<C: RuntimeContext>(&mut self, context: &C) {
        self.replace(recorder::capture(context));
    }

    /// Records the live entities for which `predicate` holds.
    pub fn record_filtered<C, P>(&mut self, context: &C, predicate: P)
    where
        C: RuntimeContext,
        P: FnMut(&C::Entity) -> bool,
    {
        self.replace(recorder::capture_filtered(context, predicate));
    }

    fn replace(&mut self, snapshot: Snapshot) {
        self.recorded_of.clear();
        self.snapshot = Some(snapshot);
    }

    pub fn is_reproducible(&self) -> bool {
        self.snapshot
            .as_ref()
            .map(Snapshot::is_reproducible)
            .unwrap_or(false)
    }

    pub fn has_local_state(&self) -> bool {
        self.snapshot
            .as_ref()
            .map(Snapshot::has_local_state)
            .unwrap_or(false)
    }

    /// Respawns the recorded entities into `context` using the configured
    /// identity policy.
    pub fn reproduce<C: RuntimeContext>(
        &mut self,
        context: &mut C,
        hooks: &mut SpawnHooks<C>,
    ) -> Result<ReproduceReport, SnapshotError> {
        let snapshot = self.snapshot.as_ref().ok_or(SnapshotError::NothingRecorded)?;
        let report = reproducer::try_reproduce(snapshot, context, hooks, &self.config)?;

        for (recorded, live) in &report.remaps {
            self.recorded_of.insert(*live, *recorded);
        }

        Ok(report)
    }

    /// Restores recorded local state onto the live entities of `context`,
    /// following identities remapped by the last [`SnapshotManager::reproduce`].
    pub fn reproduce_local_state<C: RuntimeContext>(
        &mut self,
        context: &mut C,
        clear_after: bool,
    ) -> Result<usize, SnapshotError> {
        let snapshot = self.snapshot.as_mut().ok_or(SnapshotError::NothingRecorded)?;
        local_state::try_apply_local_state_remapped(
            snapshot,
            context,
            &self.recorded_of,
            clear_after,
        )
    }

    /// Releases the recorded snapshot and remap history.
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.recorded_of.clear();
    }

    /// Moves local state held by the manager of a context that is being
    /// replaced into `context`, then drops that manager. Does nothing and
    /// returns false when there is no previous manager or it holds no local
    /// state.
    pub fn carry_local_state<C: RuntimeContext>(
        previous: &mut Option<SnapshotManager>,
        context: &mut C,
    ) -> Result<bool, SnapshotError> {
        let Some(manager) = previous.as_mut() else {
            return Ok(false);
        };
        if !manager.has_local_state() {
            return Ok(false);
        }

        let applied = manager.reproduce_local_state(context, true)?;
        info!(
            "Carried local state of {} behaviors over to the new context",
            applied
        );

        *previous = None;
        Ok(true)
    }
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self::new(SnapshotConfig::default())
    }
}
