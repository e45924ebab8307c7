use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity-to-slot mapping of the rack, row by row from the apex.
/// Ball 8 is fixed at the center of the third row.
pub const RACK_ORDER: [u8; 15] = [1, 2, 3, 4, 8, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15];

/// Errors produced while loading a table layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("malformed layout JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid layout: {0}")]
    Invalid(&'static str),
}

/// Table geometry and tuning in one place.
///
/// Everything the engine needs to build the table and run a game:
/// dimensions, rack lattice, pocket positions, shot scaling and motion
/// thresholds. Loadable from JSON at runtime; the defaults match a
/// two-by-four-unit table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// Playing surface extent along X.
    pub width: f32,
    /// Playing surface extent along Z.
    pub length: f32,
    /// Pocket hole radius. The sensor trigger is slightly smaller.
    pub hole_radius: f32,
    pub ball_radius: f32,
    /// Mass of one ball in kilograms.
    pub ball_mass: f32,
    pub cushion_thickness: f32,
    pub cushion_height: f32,
    /// Upper bound of the shot power scale.
    pub max_power: f32,
    /// Linear factor converting clamped power into impulse magnitude.
    pub impulse_scale: f32,
    /// A ball is "moving" above this linear speed.
    pub linear_rest_threshold: f32,
    /// Angular threshold, larger than the linear one; rolling balls keep
    /// angular motion longer and a shared threshold misfires either way.
    pub angular_rest_threshold: f32,
    /// Depth below the bed at which a ball counts as off the table.
    pub drop_margin: f32,
    /// Felt friction approximation applied to ball bodies.
    pub ball_linear_damping: f32,
    pub ball_angular_damping: f32,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            width: 2.0,
            length: 4.0,
            hole_radius: 0.08,
            ball_radius: 0.028,
            ball_mass: 0.17,
            cushion_thickness: 0.1,
            cushion_height: 0.15,
            max_power: 100.0,
            impulse_scale: 0.05,
            linear_rest_threshold: 0.01,
            angular_rest_threshold: 0.1,
            drop_margin: 0.5,
            ball_linear_damping: 0.8,
            ball_angular_damping: 0.8,
        }
    }
}

impl TableLayout {
    /// Parse a layout from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let layout: TableLayout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.width <= 0.0 || self.length <= 0.0 {
            return Err(LayoutError::Invalid("table dimensions must be positive"));
        }
        if self.ball_radius <= 0.0 || self.ball_mass <= 0.0 {
            return Err(LayoutError::Invalid("ball radius and mass must be positive"));
        }
        if self.hole_radius <= self.ball_radius {
            return Err(LayoutError::Invalid("pockets must be wider than a ball"));
        }
        if self.max_power <= 0.0 || self.impulse_scale <= 0.0 {
            return Err(LayoutError::Invalid("shot scaling must be positive"));
        }
        Ok(())
    }

    /// Where the cue ball spawns and returns after a scratch: the head side,
    /// a quarter length from center plus a small clearance.
    pub fn break_spot(&self) -> Vec3 {
        Vec3::new(0.0, self.ball_radius, self.length / 4.0 + 0.1)
    }

    /// Z coordinate of the rack apex, on the foot side.
    pub fn rack_start_z(&self) -> f32 {
        -self.length / 4.0
    }

    /// Center distance between racked balls (a slightly loose rack).
    pub fn ball_spacing(&self) -> f32 {
        self.ball_radius * 2.05
    }

    /// Lattice positions of the 15 object balls: five rows spreading from
    /// the apex toward the foot rail, paired with their ball numbers.
    pub fn rack_positions(&self) -> Vec<(u8, Vec3)> {
        let spacing = self.ball_spacing();
        let row_depth = spacing * 3.0_f32.sqrt() / 2.0;
        let start_z = self.rack_start_z();

        let mut out = Vec::with_capacity(15);
        let mut slot = 0usize;
        for row in 0..5u32 {
            for b in 0..=row {
                let x = (b as f32 - row as f32 / 2.0) * spacing;
                let z = start_z - row as f32 * row_depth;
                out.push((RACK_ORDER[slot], Vec3::new(x, self.ball_radius, z)));
                slot += 1;
            }
        }
        out
    }

    /// Pocket centers at bed level: four corners plus the two side midpoints.
    pub fn pocket_centers(&self) -> [Vec3; 6] {
        let hw = self.width / 2.0;
        let hl = self.length / 2.0;
        [
            Vec3::new(hw, 0.0, hl),
            Vec3::new(-hw, 0.0, hl),
            Vec3::new(hw, 0.0, -hl),
            Vec3::new(-hw, 0.0, -hl),
            Vec3::new(hw, 0.0, 0.0),
            Vec3::new(-hw, 0.0, 0.0),
        ]
    }

    /// Radius of the pocket sensor volume, a touch under the visual hole so
    /// near misses rattle out instead of dropping.
    pub fn pocket_trigger_radius(&self) -> f32 {
        self.hole_radius * 0.9
    }
}
