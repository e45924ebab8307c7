use std::collections::HashMap;

use glam::Vec3;

use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsBody, PhysicsWorld};
use crate::core::types::{EntityId, IdAllocator};
use crate::game::ball::{BallId, BallState};
use crate::table::layout::TableLayout;

struct BallSlot {
    entity: EntityId,
    body: Option<PhysicsBody>,
    state: BallState,
}

/// Canonical mapping from ball identity to physical body.
///
/// Identity lookups go through an explicit map rather than array position,
/// so removing and re-creating a body never disturbs any other ball.
pub struct BallRegistry {
    balls: HashMap<BallId, BallSlot>,
}

fn ball_material(layout: &TableLayout) -> ColliderMaterial {
    let volume = 4.0 / 3.0 * std::f32::consts::PI * layout.ball_radius.powi(3);
    ColliderMaterial {
        restitution: 0.9,
        friction: 0.05,
        density: layout.ball_mass / volume,
    }
}

fn ball_desc(layout: &TableLayout, pos: Vec3, asleep: bool) -> BodyDesc {
    BodyDesc::dynamic(ColliderDesc::Ball { radius: layout.ball_radius })
        .with_position(pos)
        .with_ccd(true)
        .with_asleep(asleep)
        .with_linear_damping(layout.ball_linear_damping)
        .with_angular_damping(layout.ball_angular_damping)
}

impl BallRegistry {
    pub fn new() -> Self {
        Self { balls: HashMap::new() }
    }

    /// Discard every existing ball body and recreate the cue ball plus the
    /// 15-ball rack at the lattice positions, all asleep.
    pub fn reset_rack(
        &mut self,
        world: &mut PhysicsWorld,
        layout: &TableLayout,
        ids: &mut IdAllocator,
    ) {
        for (_, slot) in self.balls.drain() {
            if let Some(body) = slot.body {
                world.remove_body(&body);
            }
        }

        let material = ball_material(layout);

        let cue_id = ids.next();
        let cue_body = world.create_body(
            cue_id,
            &ball_desc(layout, layout.break_spot(), true),
            material,
        );
        self.balls.insert(
            BallId::CUE,
            BallSlot { entity: cue_id, body: Some(cue_body), state: BallState::OnTable },
        );

        for (number, pos) in layout.rack_positions() {
            let id = ids.next();
            let body = world.create_body(id, &ball_desc(layout, pos, true), material);
            self.balls.insert(
                BallId(number),
                BallSlot { entity: id, body: Some(body), state: BallState::OnTable },
            );
        }

        log::info!("rack reset: {} balls on the table", self.balls.len());
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn state(&self, id: BallId) -> Option<BallState> {
        self.balls.get(&id).map(|s| s.state)
    }

    /// The physical body of a ball, absent while the ball is pocketed.
    pub fn body(&self, id: BallId) -> Option<&PhysicsBody> {
        self.balls.get(&id).and_then(|s| s.body.as_ref())
    }

    /// Resolve a physics entity id back to a ball identity.
    pub fn ball_for_entity(&self, entity: EntityId) -> Option<BallId> {
        self.balls
            .iter()
            .find(|(_, slot)| slot.entity == entity)
            .map(|(id, _)| *id)
    }

    /// Current position of an on-table ball.
    pub fn position(&self, id: BallId, world: &PhysicsWorld) -> Option<Vec3> {
        self.body(id).map(|body| world.body_position(body))
    }

    /// Balls currently in play, with their bodies.
    pub fn on_table(&self) -> impl Iterator<Item = (BallId, &PhysicsBody)> {
        self.balls.iter().filter_map(|(id, slot)| {
            match (slot.state, slot.body.as_ref()) {
                (BallState::OnTable, Some(body)) => Some((*id, body)),
                _ => None,
            }
        })
    }

    /// Count of object balls still in play.
    pub fn object_balls_remaining(&self) -> usize {
        self.on_table().filter(|(id, _)| !id.is_cue()).count()
    }

    /// Detach a ball from the simulation and mark it pocketed.
    pub fn remove(&mut self, id: BallId, world: &mut PhysicsWorld) {
        if let Some(slot) = self.balls.get_mut(&id) {
            if let Some(body) = slot.body.take() {
                world.remove_body(&body);
            }
            slot.state = BallState::Pocketed;
            log::debug!("ball {:?} removed from play", id);
        }
    }

    /// Place a ball at a point with zero velocity, re-creating its body if
    /// the ball had been removed.
    pub fn reposition(
        &mut self,
        id: BallId,
        pos: Vec3,
        world: &mut PhysicsWorld,
        layout: &TableLayout,
        ids: &mut IdAllocator,
    ) {
        let Some(slot) = self.balls.get_mut(&id) else {
            return;
        };
        match slot.body.as_ref() {
            Some(body) => {
                world.teleport(body, pos);
            }
            None => {
                let entity = ids.next();
                let body = world.create_body(entity, &ball_desc(layout, pos, false), ball_material(layout));
                slot.entity = entity;
                slot.body = Some(body);
            }
        }
        slot.state = BallState::OnTable;
    }
}

impl Default for BallRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PhysicsWorld, TableLayout, IdAllocator, BallRegistry) {
        let layout = TableLayout::default();
        let mut world = PhysicsWorld::new(Vec3::new(0.0, -9.82, 0.0));
        world.set_dt(1.0 / 60.0);
        let mut ids = IdAllocator::new();
        let mut registry = BallRegistry::new();
        registry.reset_rack(&mut world, &layout, &mut ids);
        (world, layout, ids, registry)
    }

    #[test]
    fn rack_integrity_sixteen_balls_all_asleep() {
        let (world, _, _, registry) = setup();
        assert_eq!(registry.len(), 16);
        assert_eq!(registry.object_balls_remaining(), 15);
        for (_, body) in registry.on_table() {
            assert!(world.is_sleeping(body));
        }
    }

    #[test]
    fn ball_eight_occupies_the_row_three_center_slot() {
        let (world, layout, _, registry) = setup();
        let pos = registry.position(BallId(8), &world).unwrap();
        let expected_z =
            layout.rack_start_z() - 2.0 * layout.ball_spacing() * 3.0_f32.sqrt() / 2.0;
        assert!(pos.x.abs() < 1e-5);
        assert!((pos.z - expected_z).abs() < 1e-5);
    }

    #[test]
    fn cue_ball_spawns_on_the_break_spot() {
        let (world, layout, _, registry) = setup();
        let pos = registry.position(BallId::CUE, &world).unwrap();
        assert!((pos - layout.break_spot()).length() < 1e-5);
    }

    #[test]
    fn remove_detaches_the_body() {
        let (mut world, _, _, mut registry) = setup();
        let before = world.body_count();

        registry.remove(BallId(5), &mut world);

        assert_eq!(registry.state(BallId(5)), Some(BallState::Pocketed));
        assert!(registry.body(BallId(5)).is_none());
        assert!(registry.position(BallId(5), &world).is_none());
        assert_eq!(world.body_count(), before - 1);
    }

    #[test]
    fn reposition_recreates_a_removed_ball() {
        let (mut world, layout, mut ids, mut registry) = setup();
        registry.remove(BallId::CUE, &mut world);

        registry.reposition(BallId::CUE, layout.break_spot(), &mut world, &layout, &mut ids);

        assert_eq!(registry.state(BallId::CUE), Some(BallState::OnTable));
        let pos = registry.position(BallId::CUE, &world).unwrap();
        assert!((pos - layout.break_spot()).length() < 1e-5);
        let body = registry.body(BallId::CUE).unwrap();
        assert_eq!(world.velocity(body), Vec3::ZERO);
    }

    #[test]
    fn reposition_moves_an_existing_ball_and_zeroes_velocity() {
        let (mut world, layout, mut ids, mut registry) = setup();
        let body = *registry.body(BallId(3)).unwrap();
        world.set_velocity(&body, Vec3::new(1.0, 0.0, 0.0));

        let target = Vec3::new(0.2, layout.ball_radius, 0.5);
        registry.reposition(BallId(3), target, &mut world, &layout, &mut ids);

        let pos = registry.position(BallId(3), &world).unwrap();
        assert!((pos - target).length() < 1e-5);
        assert_eq!(world.velocity(&body), Vec3::ZERO);
    }

    #[test]
    fn reset_rack_revives_pocketed_balls() {
        let (mut world, layout, mut ids, mut registry) = setup();
        registry.remove(BallId(1), &mut world);
        registry.remove(BallId::CUE, &mut world);

        registry.reset_rack(&mut world, &layout, &mut ids);

        assert_eq!(registry.len(), 16);
        assert_eq!(registry.state(BallId(1)), Some(BallState::OnTable));
        assert_eq!(registry.state(BallId::CUE), Some(BallState::OnTable));
    }

    #[test]
    fn entity_lookup_round_trips() {
        let (_, _, _, registry) = setup();
        for (id, _) in registry.on_table() {
            let entity = registry.balls.get(&id).unwrap().entity;
            assert_eq!(registry.ball_for_entity(entity), Some(id));
        }
    }
}
