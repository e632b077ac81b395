/// PROPERTY-BASED TESTS: Snapshot invariants
///
/// Uses proptest to verify capture and reproduction across random entity
/// sets with random capability subsets.
///
/// Key invariants:
/// 1. No attribute is ever recorded for an entity without a prefab
/// 2. Only resolvable entities are recorded
/// 3. Every respawned behavior receives exactly the state it was captured with
/// 4. Each rehydrated behavior hears about each remap exactly once

use proptest::prelude::*;
use reprise_shared::{
    capture, reproduce, Capabilities, EntityId, OpaqueState, PrefabId, Quat, SnapshotConfig,
    SpawnHooks, StateValue, Transform, Vec3,
};
use reprise_test::{assert_no_orphans, CallEvent, TestBehavior, TestEntityBuilder, TestWorld};

#[derive(Clone, Debug)]
struct EntityPlan {
    registered: bool,
    capabilities: Capabilities,
    hp: i64,
    position: (f32, f32, f32),
}

fn capabilities_strategy() -> impl Strategy<Value = Capabilities> {
    (0u8..32).prop_map(Capabilities::from_bits_truncate)
}

fn entity_strategy() -> impl Strategy<Value = EntityPlan> {
    (
        any::<bool>(),
        capabilities_strategy(),
        any::<i64>(),
        (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0),
    )
        .prop_map(|(registered, capabilities, hp, position)| EntityPlan {
            registered,
            capabilities,
            hp,
            position,
        })
}

/// One behavior per declared capability, each carrying a single flag.
fn template_of(capabilities: Capabilities) -> Vec<(u16, Capabilities)> {
    capabilities
        .iter()
        .enumerate()
        .map(|(index, flag)| (index as u16 + 1, flag))
        .collect()
}

fn build_world(plans: &[EntityPlan]) -> TestWorld {
    let mut world = TestWorld::at_tick(500);
    for (index, plan) in plans.iter().enumerate() {
        let prefab = PrefabId::new(index as u32 + 1);
        let template = template_of(plan.capabilities);
        if plan.registered {
            world.register_prefab(prefab, &template);
        }

        let (x, y, z) = plan.position;
        let builder = template.iter().fold(
            TestEntityBuilder::new(prefab.value()),
            |builder, (behavior_id, flag)| {
                builder.behavior(
                    TestBehavior::new(*behavior_id, *flag)
                        .with_transform(Transform::new(Vec3::new(x, y, z), Quat::IDENTITY))
                        .with_velocity(Vec3::new(x, 0.0, z), Vec3::new(0.0, 0.0, y))
                        .with_state(OpaqueState::new(vec![
                            StateValue::from("hp"),
                            StateValue::from(plan.hp),
                        ]))
                        .with_local_state(OpaqueState::new(vec![StateValue::from(index as i64)])),
                )
            },
        );
        world.spawn(EntityId::new(index as u64 + 1), builder.build());
    }
    world
}

fn target_world(plans: &[EntityPlan]) -> TestWorld {
    let mut world = TestWorld::at_tick(500).with_next_id(10_000);
    for (index, plan) in plans.iter().enumerate() {
        world.register_prefab(
            PrefabId::new(index as u32 + 1),
            &template_of(plan.capabilities),
        );
    }
    world
}

proptest! {
    /// Every recorded attribute belongs to a recorded entity
    #[test]
    fn prop_capture_has_no_orphans(plans in prop::collection::vec(entity_strategy(), 0..12)) {
        let world = build_world(&plans);

        let snapshot = capture(&world);

        assert_no_orphans(&snapshot);
        prop_assert!(snapshot.check_invariants().is_ok());
    }

    /// Only entities with a registered prefab are recorded, with the
    /// attributes their capabilities allow
    #[test]
    fn prop_capture_counts_match_capabilities(plans in prop::collection::vec(entity_strategy(), 0..12)) {
        let world = build_world(&plans);

        let snapshot = capture(&world);

        let registered: Vec<&EntityPlan> = plans.iter().filter(|plan| plan.registered).collect();
        prop_assert_eq!(snapshot.len(), registered.len());

        let with_state = registered
            .iter()
            .filter(|plan| plan.capabilities.contains(Capabilities::STATE_MIGRATABLE))
            .count();
        prop_assert_eq!(snapshot.state_count(), with_state);

        let with_body = registered
            .iter()
            .filter(|plan| plan.capabilities.has_physics_body())
            .count();
        prop_assert_eq!(snapshot.velocity_count(), with_body);
    }

    /// Respawned behaviors receive exactly the captured networked state
    #[test]
    fn prop_round_trip_restores_state(plans in prop::collection::vec(entity_strategy(), 1..10)) {
        let snapshot = capture(&build_world(&plans));
        let mut world = target_world(&plans);

        let report = reproduce(
            &snapshot,
            &mut world,
            &mut SpawnHooks::new(),
            &SnapshotConfig::default(),
        );

        prop_assert_eq!(report.spawned.len(), snapshot.len());
        prop_assert!(report.skipped.is_empty());

        let recaptured = capture(&world);
        for (recorded, live) in &report.spawned {
            let entity = world.get(live).unwrap();
            for (key, state) in snapshot.states().filter(|(key, _)| key.entity == *recorded) {
                let behavior = entity.test_behavior(key.behavior.value()).unwrap();
                prop_assert_eq!(&behavior.state, &state.networked);
            }
            prop_assert_eq!(recaptured.transform_of(live), snapshot.transform_of(recorded));
            prop_assert_eq!(recaptured.velocity_of(live), snapshot.velocity_of(recorded));
        }
    }

    /// Each rehydrated behavior is notified once per remap pair
    #[test]
    fn prop_remap_notifications_are_complete(plans in prop::collection::vec(entity_strategy(), 1..10)) {
        let snapshot = capture(&build_world(&plans));
        let mut world = target_world(&plans);

        let report = reproduce(
            &snapshot,
            &mut world,
            &mut SpawnHooks::new(),
            &SnapshotConfig::default(),
        );

        let events = world.events();
        let rehydrated = events
            .iter()
            .filter(|event| matches!(event, CallEvent::SetState { .. }))
            .count();
        let remapped = events
            .iter()
            .filter(|event| matches!(event, CallEvent::Remapped { .. }))
            .count();
        prop_assert_eq!(remapped, rehydrated * report.remaps.len());

        for (old, new) in &report.remaps {
            prop_assert_eq!(report.final_identity(old), Some(*new));
        }
    }
}
