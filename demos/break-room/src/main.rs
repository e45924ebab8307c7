//! Headless demo: two players trade scripted shots until a few turns have
//! played out, logging every lifecycle transition along the way.

use baize_engine::{FixedTimestep, GameMode, StatusMessage, TableLayout, TableSession};
use glam::Vec3;

const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u32 = 60 * 120; // two minutes of simulated play

/// A small spread of aim directions so consecutive shots scatter the pack
/// differently instead of replaying the break.
const SHOTS: [(f32, f32, f32); 6] = [
    (0.0, -1.0, 100.0),
    (0.15, -1.0, 60.0),
    (-0.2, -1.0, 70.0),
    (0.4, -0.8, 55.0),
    (-0.35, -0.9, 65.0),
    (0.05, -1.0, 45.0),
];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut session = TableSession::new(TableLayout::default());
    session.start_game(GameMode::TwoPlayer);

    let mut timestep = FixedTimestep::new(FRAME_DT);
    let mut shot_index = 0usize;
    let mut last_status = session.status();

    for _ in 0..MAX_FRAMES {
        for _ in 0..timestep.advance(FRAME_DT) {
            session.tick(timestep.dt());
        }

        if session.status() != last_status {
            last_status = session.status();
            log::info!(
                "[{:?}] {} | scores {:?} | {} object balls left",
                session.active_player(),
                last_status,
                session.scores(),
                session.object_balls_remaining()
            );
        }

        if session.can_shoot() {
            if shot_index >= SHOTS.len() || session.object_balls_remaining() == 0 {
                break;
            }
            let (x, z, power) = SHOTS[shot_index];
            shot_index += 1;
            session.take_shot(Vec3::new(x, 0.0, z), power);
        }
    }

    if last_status == StatusMessage::BallsMoving {
        log::warn!("demo ended while balls were still moving");
    }
    let (p1, p2) = session.scores();
    println!("final score: player one {p1}, player two {p2}");
}
