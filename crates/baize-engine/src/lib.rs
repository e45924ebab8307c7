//! Baize: a headless billiards engine.
//!
//! The engine owns a rigid-body world (rapier3d), a racked set of sixteen
//! balls, pocket sensors and the turn rules of a casual pool game. It has
//! no renderer and no input layer; a host drives [`TableSession::tick`]
//! at a fixed rate and reads back positions and the scoreboard.
//!
//! ```no_run
//! use baize_engine::{GameMode, TableLayout, TableSession};
//! use glam::Vec3;
//!
//! let mut session = TableSession::new(TableLayout::default());
//! session.start_game(GameMode::TwoPlayer);
//! session.take_shot(Vec3::new(0.0, 0.0, -1.0), 75.0);
//! loop {
//!     session.tick(1.0 / 60.0);
//!     if session.can_shoot() {
//!         break;
//!     }
//! }
//! ```

pub mod core;
pub mod game;
pub mod table;

pub use crate::core::physics::{
    BodyContact, BodyDesc, BodyType, ColliderDesc, ColliderMaterial, PhysicsBody, PhysicsWorld,
};
pub use crate::core::time::FixedTimestep;
pub use crate::core::types::{EntityId, IdAllocator};

pub use crate::table::build::{build_table, TableBodies};
pub use crate::table::layout::{LayoutError, TableLayout, RACK_ORDER};

pub use crate::game::ball::{BallId, BallState, GameMode, Player};
pub use crate::game::pockets::PocketTracker;
pub use crate::game::registry::BallRegistry;
pub use crate::game::rules::{resolve, StatusMessage, Turn, TurnResolution, TurnState};
pub use crate::game::session::{TableSession, GRAVITY};
pub use crate::game::settle::SettleDetector;
