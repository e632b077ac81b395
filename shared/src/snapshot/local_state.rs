use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    BehaviorKey, Capabilities, EntityId, ReplicatedEntity, RuntimeContext, Snapshot,
    SnapshotError,
};

/// Restores recorded local state onto the live entities of `context`.
///
/// Only `set_local_state` is called; networked state is left alone and no
/// entity is created or destroyed. With `clear_after` the snapshot is
/// released afterwards and any further call fails with
/// [`SnapshotError::LocalStateConsumed`]. Returns how many behaviors were
/// updated.
pub fn try_apply_local_state<C: RuntimeContext>(
    snapshot: &mut Snapshot,
    context: &mut C,
    clear_after: bool,
) -> Result<usize, SnapshotError> {
    try_apply_local_state_remapped(snapshot, context, &HashMap::new(), clear_after)
}

/// Same as [`try_apply_local_state`], but live identities found in
/// `recorded_of` are translated back to the identity they were recorded
/// under before looking up their state.
pub fn try_apply_local_state_remapped<C: RuntimeContext>(
    snapshot: &mut Snapshot,
    context: &mut C,
    recorded_of: &HashMap<EntityId, EntityId>,
    clear_after: bool,
) -> Result<usize, SnapshotError> {
    if snapshot.local_state_consumed() {
        return Err(SnapshotError::LocalStateConsumed);
    }

    let mut applied = 0;

    for entity_id in context.live_entities() {
        let recorded_id = recorded_of.get(&entity_id).copied().unwrap_or(entity_id);
        let Some(entity) = context.entity_mut(&entity_id) else {
            continue;
        };

        for behavior_id in entity.behavior_ids() {
            let Some(local) = snapshot.local_state_of(&BehaviorKey::new(recorded_id, behavior_id))
            else {
                continue;
            };
            let Some(behavior) = entity.behavior_mut(&behavior_id) else {
                continue;
            };
            if !behavior
                .capabilities()
                .contains(Capabilities::STATE_MIGRATABLE)
            {
                continue;
            }
            match behavior.state_migratable_mut() {
                Some(migratable) => {
                    migratable.set_local_state(local.clone());
                    applied += 1;
                }
                None => warn!(
                    "Behavior {:?} on entity {:?} is not state migratable, local state dropped",
                    behavior_id, entity_id
                ),
            }
        }
    }

    debug!("Applied local state to {} behaviors", applied);

    if clear_after {
        snapshot.consume_local_state();
    }

    Ok(applied)
}

/// Restores recorded local state onto the live entities of `context`.
///
/// # Panics
///
/// Panics if the snapshot's local state was already consumed.
pub fn apply_local_state<C: RuntimeContext>(
    snapshot: &mut Snapshot,
    context: &mut C,
    clear_after: bool,
) -> usize {
    try_apply_local_state(snapshot, context, clear_after)
        .expect("local state of this snapshot was already consumed")
}
