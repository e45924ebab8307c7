use std::collections::HashSet;

use glam::Vec3;

use crate::core::physics::{BodyDesc, ColliderDesc, ColliderMaterial, PhysicsWorld};
use crate::core::types::{EntityId, IdAllocator};
use crate::table::layout::TableLayout;

/// Bed felt: low bounce, a little friction.
const BED_MATERIAL: ColliderMaterial = ColliderMaterial {
    restitution: 0.7,
    friction: 0.1,
    density: 1.0,
};

/// Cushion rubber: lively bounce, grabbier than the bed.
const CUSHION_MATERIAL: ColliderMaterial = ColliderMaterial {
    restitution: 0.8,
    friction: 0.2,
    density: 1.0,
};

/// How far the pocket trigger cylinder is sunk below the bed.
const TRIGGER_SINK: f32 = 0.1;
const TRIGGER_HALF_HEIGHT: f32 = 0.25;

/// Static bodies making up the table, identified for contact routing.
pub struct TableBodies {
    /// Entity ids of the six pocket sensor volumes.
    pub pocket_triggers: HashSet<EntityId>,
}

/// Build the bed, cushions and pocket triggers into the physics world.
///
/// The bed is exactly the playing surface; there is no floor beyond it, so a
/// ball crossing the rim at a pocket gap drops into the trigger volume below.
pub fn build_table(
    world: &mut PhysicsWorld,
    layout: &TableLayout,
    ids: &mut IdAllocator,
) -> TableBodies {
    // Bed, top face at y = 0
    let bed = BodyDesc::fixed(ColliderDesc::Cuboid {
        half_x: layout.width / 2.0,
        half_y: 0.05,
        half_z: layout.length / 2.0,
    })
    .with_position(Vec3::new(0.0, -0.05, 0.0));
    world.create_body(ids.next(), &bed, BED_MATERIAL);

    let t = layout.cushion_thickness;
    let h = layout.cushion_height;
    let cushion_y = h / 2.0 + 0.05;

    // End cushions (head and foot rails), narrowed to leave the corner gaps
    let end_half_x = (layout.width - layout.hole_radius * 2.0) / 2.0;
    for z_sign in [1.0f32, -1.0] {
        let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
            half_x: end_half_x,
            half_y: h / 2.0,
            half_z: t / 2.0,
        })
        .with_position(Vec3::new(0.0, cushion_y, z_sign * (layout.length / 2.0 + t / 2.0)));
        world.create_body(ids.next(), &desc, CUSHION_MATERIAL);
    }

    // Side cushions, two segments per rail with gaps at the side pockets
    // and corners
    let seg_half_z = (layout.length - layout.hole_radius * 5.0) / 4.0;
    let seg_center_z = layout.length / 4.0 + layout.hole_radius * 1.25;
    let side_x = layout.width / 2.0 + t / 2.0;
    for x_sign in [1.0f32, -1.0] {
        for z_sign in [1.0f32, -1.0] {
            let desc = BodyDesc::fixed(ColliderDesc::Cuboid {
                half_x: t / 2.0,
                half_y: h / 2.0,
                half_z: seg_half_z,
            })
            .with_position(Vec3::new(x_sign * side_x, cushion_y, z_sign * seg_center_z));
            world.create_body(ids.next(), &desc, CUSHION_MATERIAL);
        }
    }

    // Pocket triggers: sensor cylinders sunk below the rim openings
    let mut pocket_triggers = HashSet::new();
    for center in layout.pocket_centers() {
        let id = ids.next();
        let desc = BodyDesc::fixed(ColliderDesc::CylinderY {
            half_height: TRIGGER_HALF_HEIGHT,
            radius: layout.pocket_trigger_radius(),
        })
        .with_position(Vec3::new(center.x, -TRIGGER_SINK, center.z))
        .with_sensor(true);
        world.create_body(id, &desc, ColliderMaterial::default());
        pocket_triggers.insert(id);
    }

    log::debug!(
        "table built: bed + 6 cushions + {} pocket triggers",
        pocket_triggers.len()
    );

    TableBodies { pocket_triggers }
}
