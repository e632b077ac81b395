use log::{debug, info, warn};

use crate::{
    snapshot::recorder::warn_missing_accessor, tick_diff, tick_less_than, BehaviorId,
    BehaviorKey, Capabilities, EntityId, IdentityPolicy, ReplicatedEntity, RuntimeContext,
    Snapshot, SnapshotConfig, SnapshotError, Tick, Transform, Velocity,
};

type SpawnHook<'a, C> = Box<dyn FnMut(&mut C, &EntityId) + 'a>;

/// Caller code run around every entity the reproducer brings back.
///
/// `before_spawn` sees the entity after its state was restored but before it
/// is attached to the simulation. `after_spawn` runs once it is attached.
/// Entities whose prefab cannot be instantiated get neither call.
pub struct SpawnHooks<'a, C> {
    before_spawn: Option<SpawnHook<'a, C>>,
    after_spawn: Option<SpawnHook<'a, C>>,
}

impl<'a, C> SpawnHooks<'a, C> {
    pub fn new() -> Self {
        Self {
            before_spawn: None,
            after_spawn: None,
        }
    }

    pub fn on_before_spawn(mut self, hook: impl FnMut(&mut C, &EntityId) + 'a) -> Self {
        self.before_spawn = Some(Box::new(hook));
        self
    }

    pub fn on_after_spawn(mut self, hook: impl FnMut(&mut C, &EntityId) + 'a) -> Self {
        self.after_spawn = Some(Box::new(hook));
        self
    }

    fn before_spawn(&mut self, context: &mut C, entity_id: &EntityId) {
        if let Some(hook) = self.before_spawn.as_mut() {
            hook(context, entity_id);
        }
    }

    fn after_spawn(&mut self, context: &mut C, entity_id: &EntityId) {
        if let Some(hook) = self.after_spawn.as_mut() {
            hook(context, entity_id);
        }
    }
}

impl<'a, C> Default for SpawnHooks<'a, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single reproduction did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReproduceReport {
    /// Ticks stepped while waiting for the capture tick.
    pub caught_up_ticks: u16,
    /// Entities the transport had already restored, rehydrated in place.
    pub resumed: Vec<EntityId>,
    /// `(recorded, final)` identities of respawned entities.
    pub spawned: Vec<(EntityId, EntityId)>,
    /// Recorded entities whose prefab could not be instantiated.
    pub skipped: Vec<EntityId>,
    /// `(old, new)` pairs delivered to `on_identity_remapped`.
    pub remaps: Vec<(EntityId, EntityId)>,
}

impl ReproduceReport {
    /// Identity a recorded entity ended up with, if it was brought back.
    pub fn final_identity(&self, recorded: &EntityId) -> Option<EntityId> {
        if self.resumed.contains(recorded) {
            return Some(*recorded);
        }
        self.spawned
            .iter()
            .find(|(old, _)| old == recorded)
            .map(|(_, new)| *new)
    }
}

/// Brings the entities recorded in `snapshot` back into `context`.
///
/// 1. Steps `context` until it has reached the capture tick.
/// 2. Rehydrates resumed entities that were recorded, in place.
/// 3. Instantiates every remaining entity from its prefab, applying the
///    identity policy per entity.
/// 4. Restores velocity and networked state on each of them, running
///    `hooks` around the attach.
/// 5. Once the whole batch exists, notifies every rehydrated behavior of
///    each identity remap.
///
/// The snapshot is only read, so it can be reproduced more than once, until
/// its local state is consumed. After that it fails with
/// [`SnapshotError::LocalStateConsumed`] without touching `context`.
pub fn try_reproduce<C: RuntimeContext>(
    snapshot: &Snapshot,
    context: &mut C,
    hooks: &mut SpawnHooks<C>,
    config: &SnapshotConfig,
) -> Result<ReproduceReport, SnapshotError> {
    if snapshot.local_state_consumed() {
        return Err(SnapshotError::LocalStateConsumed);
    }
    snapshot.check_invariants()?;

    let mut report = ReproduceReport {
        caught_up_ticks: catch_up(context, snapshot.capture_tick(), config.max_catch_up_ticks)?,
        ..ReproduceReport::default()
    };

    if !snapshot.is_reproducible() {
        warn!("Reproducing a snapshot with no recorded entities");
        return Ok(report);
    }

    let mut pending = snapshot.prefabs().clone();
    let mut rehydrated: Vec<(EntityId, BehaviorId)> = Vec::new();

    for entity_id in context.resumed_entities() {
        if pending.remove(&entity_id).is_none() {
            continue;
        }

        let transform = recorded_transform(snapshot, &entity_id);
        if let Some(entity) = context.entity_mut(&entity_id) {
            write_transform(entity, &transform);
        }
        rehydrate(snapshot, context, &entity_id, &entity_id, &mut rehydrated);

        hooks.before_spawn(context, &entity_id);
        context.attach(&entity_id);
        hooks.after_spawn(context, &entity_id);

        report.resumed.push(entity_id);
    }

    for (recorded_id, prefab_id) in pending {
        let transform = recorded_transform(snapshot, &recorded_id);
        let Some(new_id) = context.instantiate(&prefab_id, &transform) else {
            warn!(
                "Prefab {:?} of entity {:?} could not be instantiated, skipping it",
                prefab_id, recorded_id
            );
            report.skipped.push(recorded_id);
            continue;
        };

        let final_id = match config.identity_policy {
            IdentityPolicy::ForceMatch => {
                if new_id == recorded_id || context.reassign_identity(&new_id, recorded_id) {
                    recorded_id
                } else {
                    warn!(
                        "Context refused to move entity {:?} back to {:?}, remapping instead",
                        new_id, recorded_id
                    );
                    report.remaps.push((recorded_id, new_id));
                    new_id
                }
            }
            IdentityPolicy::Remap => {
                report.remaps.push((recorded_id, new_id));
                new_id
            }
        };

        rehydrate(snapshot, context, &recorded_id, &final_id, &mut rehydrated);

        hooks.before_spawn(context, &final_id);
        context.attach(&final_id);
        hooks.after_spawn(context, &final_id);

        report.spawned.push((recorded_id, final_id));
    }

    if config.notify_remaps && !report.remaps.is_empty() {
        notify_remaps(context, &rehydrated, &report.remaps);
    }

    info!(
        "Reproduced snapshot from tick {}: {} resumed, {} spawned, {} skipped, {} remapped",
        snapshot.capture_tick(),
        report.resumed.len(),
        report.spawned.len(),
        report.skipped.len(),
        report.remaps.len()
    );

    Ok(report)
}

/// Brings the entities recorded in `snapshot` back into `context`.
///
/// # Panics
///
/// Panics on any error [`try_reproduce`] would return.
pub fn reproduce<C: RuntimeContext>(
    snapshot: &Snapshot,
    context: &mut C,
    hooks: &mut SpawnHooks<C>,
    config: &SnapshotConfig,
) -> ReproduceReport {
    try_reproduce(snapshot, context, hooks, config).expect("snapshot could not be reproduced")
}

/// Spins the context forward until it is no longer behind `target`.
/// Returns the number of ticks stepped.
fn catch_up<C: RuntimeContext>(
    context: &mut C,
    target: Tick,
    limit: u16,
) -> Result<u16, SnapshotError> {
    let start = context.current_tick();
    if !tick_less_than(start, target) {
        return Ok(0);
    }

    let outstanding = tick_diff(start, target).unsigned_abs();
    if outstanding > limit {
        return Err(SnapshotError::CatchUpTooFar { outstanding, limit });
    }

    for _ in 0..outstanding {
        context.step();
        if !tick_less_than(context.current_tick(), target) {
            break;
        }
    }

    let current = context.current_tick();
    if tick_less_than(current, target) {
        return Err(SnapshotError::TickStalled { current, target });
    }

    let stepped = tick_diff(start, current).unsigned_abs();
    debug!("Stepped {} ticks to reach capture tick {}", stepped, target);
    Ok(stepped)
}

fn recorded_transform(snapshot: &Snapshot, entity_id: &EntityId) -> Transform {
    snapshot
        .transform_of(entity_id)
        .copied()
        .unwrap_or(Transform::IDENTITY)
}

/// Restores velocity and networked state recorded under `recorded_id` onto
/// the entity now living under `final_id`.
fn rehydrate<C: RuntimeContext>(
    snapshot: &Snapshot,
    context: &mut C,
    recorded_id: &EntityId,
    final_id: &EntityId,
    rehydrated: &mut Vec<(EntityId, BehaviorId)>,
) {
    let Some(entity) = context.entity_mut(final_id) else {
        warn!("Entity {:?} vanished before it could be rehydrated", final_id);
        return;
    };

    if let Some(velocity) = snapshot.velocity_of(recorded_id) {
        write_velocity(entity, velocity);
    }

    for behavior_id in entity.behavior_ids() {
        let Some(state) = snapshot.state_of(&BehaviorKey::new(*recorded_id, behavior_id)) else {
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
                migratable.set_state(state.clone());
                rehydrated.push((*final_id, behavior_id));
            }
            None => warn_missing_accessor(final_id, &behavior_id, "state migratable"),
        }
    }
}

fn write_transform<E: ReplicatedEntity + ?Sized>(entity: &mut E, transform: &Transform) {
    let behavior_id = entity
        .find_behavior(Capabilities::POSITION_ROTATION)
        .or_else(|| entity.find_behavior(Capabilities::POSITION));
    let Some(behavior_id) = behavior_id else {
        return;
    };
    let entity_id = entity.identity();
    match entity
        .behavior_mut(&behavior_id)
        .and_then(|behavior| behavior.transform_mut())
    {
        Some(target) => target.write_transform(transform),
        None => warn_missing_accessor(&entity_id, &behavior_id, "transform"),
    }
}

/// Same precedence as capture: a 3D body first, falling back to a planar
/// one when there is none or it exposes no accessor.
fn write_velocity<E: ReplicatedEntity + ?Sized>(entity: &mut E, velocity: &Velocity) {
    if !write_velocity_3d(entity, velocity) {
        write_velocity_2d(entity, velocity);
    }
}

fn write_velocity_3d<E: ReplicatedEntity + ?Sized>(entity: &mut E, velocity: &Velocity) -> bool {
    let Some(behavior_id) = entity.find_behavior(Capabilities::PHYSICS_3D) else {
        return false;
    };
    let entity_id = entity.identity();
    match entity
        .behavior_mut(&behavior_id)
        .and_then(|behavior| behavior.physics_body_mut())
    {
        Some(body) => {
            body.write_velocity(velocity.linear);
            body.write_angular_velocity(velocity.angular);
            true
        }
        None => {
            warn_missing_accessor(&entity_id, &behavior_id, "3D physics body");
            false
        }
    }
}

fn write_velocity_2d<E: ReplicatedEntity + ?Sized>(entity: &mut E, velocity: &Velocity) {
    let Some(behavior_id) = entity.find_behavior(Capabilities::PHYSICS_2D) else {
        return;
    };
    let entity_id = entity.identity();
    match entity
        .behavior_mut(&behavior_id)
        .and_then(|behavior| behavior.physics_body_2d_mut())
    {
        Some(body) => {
            body.write_velocity(velocity.linear.planar());
            body.write_angular_velocity(velocity.angular.z);
        }
        None => warn_missing_accessor(&entity_id, &behavior_id, "2D physics body"),
    }
}

fn notify_remaps<C: RuntimeContext>(
    context: &mut C,
    rehydrated: &[(EntityId, BehaviorId)],
    remaps: &[(EntityId, EntityId)],
) {
    for (entity_id, behavior_id) in rehydrated {
        let Some(migratable) = context
            .entity_mut(entity_id)
            .and_then(|entity| entity.behavior_mut(behavior_id))
            .and_then(|behavior| behavior.state_migratable_mut())
        else {
            continue;
        };
        for (old, new) in remaps {
            migratable.on_identity_remapped(*old, *new);
        }
    }
}
