use std::collections::BTreeMap;

use crate::{
    BehaviorKey, EntityId, OpaqueState, PrefabId, SnapshotError, Tick, Transform, Velocity,
};

/// Networked and local state recorded for one behavior.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MigratedState {
    pub networked: OpaqueState,
    pub local: OpaqueState,
}

impl MigratedState {
    pub fn new(networked: OpaqueState, local: OpaqueState) -> Self {
        Self { networked, local }
    }
}

/// Detached, point-in-time record of a set of replicated entities.
///
/// Every attribute map is keyed by entities that also appear in the prefab
/// map. The recorded entity set is derived from that map and never stored
/// on its own. Maps are ordered by identity so replay order is deterministic.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    capture_tick: Tick,
    prefab_of: BTreeMap<EntityId, PrefabId>,
    transform_of: BTreeMap<EntityId, Transform>,
    velocity_of: BTreeMap<EntityId, Velocity>,
    state_of: BTreeMap<BehaviorKey, MigratedState>,
    local_state_consumed: bool,
}

impl Snapshot {
    pub(crate) fn new(capture_tick: Tick) -> Self {
        Self {
            capture_tick,
            ..Self::default()
        }
    }

    /// Assembles a snapshot from previously extracted parts, checking that no
    /// attribute is orphaned.
    pub fn from_parts(
        capture_tick: Tick,
        prefab_of: BTreeMap<EntityId, PrefabId>,
        transform_of: BTreeMap<EntityId, Transform>,
        velocity_of: BTreeMap<EntityId, Velocity>,
        state_of: BTreeMap<BehaviorKey, MigratedState>,
    ) -> Result<Self, SnapshotError> {
        let snapshot = Self {
            capture_tick,
            prefab_of,
            transform_of,
            velocity_of,
            state_of,
            local_state_consumed: false,
        };
        snapshot.check_invariants()?;
        Ok(snapshot)
    }

    pub(crate) fn record_entity(
        &mut self,
        entity_id: EntityId,
        prefab_id: PrefabId,
        transform: Transform,
    ) {
        self.prefab_of.insert(entity_id, prefab_id);
        self.transform_of.insert(entity_id, transform);
    }

    pub(crate) fn record_velocity(&mut self, entity_id: EntityId, velocity: Velocity) {
        debug_assert!(self.prefab_of.contains_key(&entity_id));
        self.velocity_of.insert(entity_id, velocity);
    }

    pub(crate) fn record_state(&mut self, key: BehaviorKey, state: MigratedState) {
        debug_assert!(self.prefab_of.contains_key(&key.entity));
        self.state_of.insert(key, state);
    }

    pub fn capture_tick(&self) -> Tick {
        self.capture_tick
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.prefab_of.keys()
    }

    pub fn contains(&self, entity_id: &EntityId) -> bool {
        self.prefab_of.contains_key(entity_id)
    }

    pub fn len(&self) -> usize {
        self.prefab_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefab_of.is_empty()
    }

    pub fn prefab_of(&self, entity_id: &EntityId) -> Option<&PrefabId> {
        self.prefab_of.get(entity_id)
    }

    pub fn prefabs(&self) -> &BTreeMap<EntityId, PrefabId> {
        &self.prefab_of
    }

    pub fn transform_of(&self, entity_id: &EntityId) -> Option<&Transform> {
        self.transform_of.get(entity_id)
    }

    pub fn velocity_of(&self, entity_id: &EntityId) -> Option<&Velocity> {
        self.velocity_of.get(entity_id)
    }

    pub fn state_of(&self, key: &BehaviorKey) -> Option<&OpaqueState> {
        self.state_of.get(key).map(|state| &state.networked)
    }

    pub fn local_state_of(&self, key: &BehaviorKey) -> Option<&OpaqueState> {
        self.state_of.get(key).map(|state| &state.local)
    }

    pub fn states(&self) -> impl Iterator<Item = (&BehaviorKey, &MigratedState)> + '_ {
        self.state_of.iter()
    }

    pub fn state_count(&self) -> usize {
        self.state_of.len()
    }

    pub fn velocity_count(&self) -> usize {
        self.velocity_of.len()
    }

    pub fn is_reproducible(&self) -> bool {
        !self.prefab_of.is_empty()
    }

    pub fn has_local_state(&self) -> bool {
        !self.local_state_consumed && !self.state_of.is_empty()
    }

    pub fn local_state_consumed(&self) -> bool {
        self.local_state_consumed
    }

    /// Checks that every recorded attribute belongs to a recorded entity.
    pub fn check_invariants(&self) -> Result<(), SnapshotError> {
        if let Some(entity_id) = self
            .transform_of
            .keys()
            .find(|entity_id| !self.prefab_of.contains_key(entity_id))
        {
            return Err(SnapshotError::InvariantViolation {
                entity_id: entity_id.value(),
                attribute: "transform",
            });
        }
        if let Some(entity_id) = self
            .velocity_of
            .keys()
            .find(|entity_id| !self.prefab_of.contains_key(entity_id))
        {
            return Err(SnapshotError::InvariantViolation {
                entity_id: entity_id.value(),
                attribute: "velocity",
            });
        }
        if let Some(key) = self
            .state_of
            .keys()
            .find(|key| !self.prefab_of.contains_key(&key.entity))
        {
            return Err(SnapshotError::InvariantViolation {
                entity_id: key.entity.value(),
                attribute: "state",
            });
        }
        Ok(())
    }

    /// Releases every recorded map. The capture tick is kept.
    pub fn clear(&mut self) {
        self.prefab_of.clear();
        self.transform_of.clear();
        self.velocity_of.clear();
        self.state_of.clear();
    }

    pub(crate) fn consume_local_state(&mut self) {
        self.clear();
        self.local_state_consumed = true;
    }
}
