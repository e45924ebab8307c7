use crate::core::physics::PhysicsWorld;
use crate::game::registry::BallRegistry;
use crate::table::layout::TableLayout;

/// Stateless "table at rest" predicate, queried once per tick.
///
/// A ball counts as moving when its linear speed exceeds the small linear
/// threshold OR its angular speed exceeds the larger angular one. Sleeping
/// bodies report zero velocities, so a fresh rack is settled by definition.
#[derive(Debug, Clone, Copy)]
pub struct SettleDetector {
    pub linear_threshold: f32,
    pub angular_threshold: f32,
}

impl SettleDetector {
    pub fn new(linear_threshold: f32, angular_threshold: f32) -> Self {
        Self { linear_threshold, angular_threshold }
    }

    pub fn from_layout(layout: &TableLayout) -> Self {
        Self::new(layout.linear_rest_threshold, layout.angular_rest_threshold)
    }

    /// `true` when no on-table ball satisfies either motion condition.
    pub fn is_settled(&self, registry: &BallRegistry, world: &PhysicsWorld) -> bool {
        for (_, body) in registry.on_table() {
            if world.velocity(body).length() > self.linear_threshold {
                return false;
            }
            if world.angular_velocity(body).length() > self.angular_threshold {
                return false;
            }
        }
        true
    }
}
