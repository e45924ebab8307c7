use std::collections::HashSet;

use glam::Vec3;

use crate::core::physics::{BodyContact, PhysicsWorld};
use crate::core::types::{EntityId, IdAllocator};
use crate::game::ball::{BallId, BallState, GameMode, Player};
use crate::game::pockets::PocketTracker;
use crate::game::registry::BallRegistry;
use crate::game::rules::{self, StatusMessage, Turn, TurnState};
use crate::game::settle::SettleDetector;
use crate::table::build::build_table;
use crate::table::layout::TableLayout;

/// Standard downward gravity for a table in the XZ plane.
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.82, 0.0);

/// One complete billiards session: physics world, ball registry and turn
/// rules behind a single control surface.
///
/// Drive it with `tick` once per frame; everything else is the minimal API
/// an input or UI layer needs: `can_shoot`, `take_shot`, `reset_table` and
/// the scoreboard observables.
pub struct TableSession {
    layout: TableLayout,
    world: PhysicsWorld,
    ids: IdAllocator,
    pocket_triggers: HashSet<EntityId>,
    registry: BallRegistry,
    tracker: PocketTracker,
    settle: SettleDetector,
    turn: Turn,
    state: TurnState,
    status: StatusMessage,
    contacts: Vec<BodyContact>,
}

impl TableSession {
    /// Build the table and rack up, starting in practice mode.
    pub fn new(layout: TableLayout) -> Self {
        let mut world = PhysicsWorld::new(GRAVITY);
        let mut ids = IdAllocator::new();
        let table = build_table(&mut world, &layout, &mut ids);
        let mut registry = BallRegistry::new();
        registry.reset_rack(&mut world, &layout, &mut ids);

        let settle = SettleDetector::from_layout(&layout);
        Self {
            layout,
            world,
            ids,
            pocket_triggers: table.pocket_triggers,
            registry,
            tracker: PocketTracker::new(),
            settle,
            turn: Turn::new(GameMode::Practice),
            state: TurnState::AwaitingShot,
            status: StatusMessage::YourTurn,
            contacts: Vec::new(),
        }
    }

    /// Start a fresh game: scores zeroed, player one breaks.
    pub fn start_game(&mut self, mode: GameMode) {
        self.turn = Turn::new(mode);
        self.reset_table();
        log::info!("game started ({:?})", mode);
    }

    /// Rebuild the rack and re-arm shooting. Scores and the active player
    /// carry over, matching a mid-game table reset.
    pub fn reset_table(&mut self) {
        self.registry
            .reset_rack(&mut self.world, &self.layout, &mut self.ids);
        self.tracker.drain();
        self.state = TurnState::AwaitingShot;
        self.turn.can_shoot = true;
        self.status = StatusMessage::YourTurn;
    }

    /// Advance the simulation by one fixed step and, on the motion-to-rest
    /// edge, resolve the finished shot.
    pub fn tick(&mut self, dt: f32) {
        self.world.set_dt(dt);

        let mut contacts = std::mem::take(&mut self.contacts);
        contacts.clear();
        self.world.step_into(&mut contacts);
        self.route_pocket_contacts(&contacts);
        self.contacts = contacts;

        self.sweep_fallen_balls();

        if self.state == TurnState::BallsInMotion {
            if self.settle.is_settled(&self.registry, &self.world) {
                self.state = TurnState::Resolving;
                self.resolve_settled();
                self.state = TurnState::AwaitingShot;
            } else {
                self.status = StatusMessage::BallsMoving;
            }
        }
    }

    /// Whether input should allow a shot attempt right now.
    pub fn can_shoot(&self) -> bool {
        self.state == TurnState::AwaitingShot
            && self.turn.can_shoot
            && self.settle.is_settled(&self.registry, &self.world)
    }

    /// Strike the cue ball. `direction` is projected into the table plane
    /// and normalized; `power` is clamped to the layout's scale before
    /// conversion to an impulse. Returns `false` without any state change
    /// when shooting is not permitted or the shot is degenerate.
    pub fn take_shot(&mut self, direction: Vec3, power: f32) -> bool {
        if !self.can_shoot() {
            log::debug!("shot rejected: not your turn or balls still moving");
            return false;
        }

        let dir = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        let magnitude = power.clamp(0.0, self.layout.max_power) * self.layout.impulse_scale;
        if dir == Vec3::ZERO || magnitude <= 0.0 {
            log::debug!("shot rejected: degenerate direction or zero power");
            return false;
        }

        let Some(body) = self.registry.body(BallId::CUE).copied() else {
            log::warn!("shot rejected: cue ball is not on the table");
            return false;
        };

        let pos = self.world.body_position(&body);
        // Contact point trails the center opposite the shot direction,
        // lending a slight roll bias without modeling real spin.
        let hit_point = pos - dir * (self.layout.ball_radius * 0.5);

        self.world.wake(&body);
        self.world.apply_impulse_at_point(&body, dir * magnitude, hit_point);

        self.turn.can_shoot = false;
        self.state = TurnState::BallsInMotion;
        self.status = StatusMessage::BallsMoving;
        log::info!(
            "shot taken by {:?}: dir=({:.2}, {:.2}) impulse={:.3}",
            self.turn.active,
            dir.x,
            dir.z,
            magnitude
        );
        true
    }

    /// Cue ball position for aim-line rendering, absent while pocketed.
    pub fn cue_ball_position(&self) -> Option<Vec3> {
        self.registry.position(BallId::CUE, &self.world)
    }

    pub fn mode(&self) -> GameMode {
        self.turn.mode
    }

    pub fn active_player(&self) -> Player {
        self.turn.active
    }

    pub fn score(&self, player: Player) -> u32 {
        self.turn.score(player)
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.turn.score(Player::One), self.turn.score(Player::Two))
    }

    pub fn status(&self) -> StatusMessage {
        self.status
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn object_balls_remaining(&self) -> usize {
        self.registry.object_balls_remaining()
    }

    // -- shot lifecycle internals --

    /// Record-and-remove for every ball that began touching a pocket
    /// trigger this step. Removal is synchronous so a pocketed ball can
    /// neither re-trigger nor hold up settle detection.
    fn route_pocket_contacts(&mut self, contacts: &[BodyContact]) {
        let mut hits: Vec<BallId> = Vec::new();
        for contact in contacts.iter().filter(|c| c.started) {
            let other = if self.pocket_triggers.contains(&contact.entity_a) {
                contact.entity_b
            } else if self.pocket_triggers.contains(&contact.entity_b) {
                contact.entity_a
            } else {
                continue;
            };
            // Events for balls already removed this shot are ignored
            if let Some(ball) = self.registry.ball_for_entity(other) {
                if self.registry.state(ball) == Some(BallState::OnTable) {
                    hits.push(ball);
                }
            }
        }
        for ball in hits {
            self.pocket_ball(ball);
        }
    }

    fn pocket_ball(&mut self, ball: BallId) {
        if self.tracker.record(ball) {
            self.registry.remove(ball, &mut self.world);
            log::info!("ball {} pocketed", ball.0);
        }
    }

    /// Kill-plane sweep: a ball that slipped past every trigger and fell
    /// off the world still counts as pocketed (the cue ball then takes the
    /// foul path at resolution).
    fn sweep_fallen_balls(&mut self) {
        let floor = -self.layout.drop_margin;
        let fallen: Vec<BallId> = self
            .registry
            .on_table()
            .filter(|(_, body)| self.world.body_position(body).y < floor)
            .map(|(id, _)| id)
            .collect();
        for ball in fallen {
            log::warn!("ball {} fell off the table; treating as pocketed", ball.0);
            self.pocket_ball(ball);
        }
    }

    /// The turn resolution algorithm, run exactly once per settle event.
    fn resolve_settled(&mut self) {
        let pocketed = self.tracker.drain();
        let resolution = rules::resolve(&mut self.turn, &pocketed);

        if resolution.foul {
            self.registry.reposition(
                BallId::CUE,
                self.layout.break_spot(),
                &mut self.world,
                &self.layout,
                &mut self.ids,
            );
        }

        // Safety net in case removal raced ahead of the foul respot: the
        // cue ball must be on the table before the next shot.
        let needs_respot = match self.registry.position(BallId::CUE, &self.world) {
            None => true,
            Some(pos) => pos.y < -self.layout.drop_margin,
        };
        if needs_respot {
            log::warn!("cue ball missing at resolution; respotting");
            self.registry.reposition(
                BallId::CUE,
                self.layout.break_spot(),
                &mut self.world,
                &self.layout,
                &mut self.ids,
            );
        }

        self.status = resolution.status;
        log::info!(
            "shot resolved: {} point(s) to {:?}, {}",
            resolution.points,
            if resolution.switched { self.turn.active.other() } else { self.turn.active },
            self.status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn session(mode: GameMode) -> TableSession {
        let mut s = TableSession::new(TableLayout::default());
        s.start_game(mode);
        s
    }

    /// Put the session in flight as if a shot had been taken, without
    /// disturbing the sleeping rack.
    fn force_in_flight(s: &mut TableSession) {
        s.state = TurnState::BallsInMotion;
        s.turn.can_shoot = false;
        s.status = StatusMessage::BallsMoving;
    }

    #[test]
    fn fresh_session_is_ready_to_shoot() {
        let s = session(GameMode::TwoPlayer);
        assert!(s.can_shoot());
        assert_eq!(s.object_balls_remaining(), 15);
        assert_eq!(s.status(), StatusMessage::YourTurn);
        assert_eq!(s.active_player(), Player::One);
        let cue = s.cue_ball_position().unwrap();
        assert!((cue - s.layout.break_spot()).length() < 1e-5);
    }

    #[test]
    fn shot_flips_state_and_disarms_shooting() {
        let mut s = session(GameMode::TwoPlayer);
        assert!(s.take_shot(Vec3::new(0.0, 0.0, -1.0), 50.0));
        assert_eq!(s.state(), TurnState::BallsInMotion);
        assert_eq!(s.status(), StatusMessage::BallsMoving);
        assert!(!s.can_shoot());
    }

    #[test]
    fn shot_while_in_flight_is_a_no_op() {
        let mut s = session(GameMode::TwoPlayer);
        assert!(s.take_shot(Vec3::new(0.0, 0.0, -1.0), 50.0));

        let body = *s.registry.body(BallId::CUE).unwrap();
        let vel_before = s.world.velocity(&body);
        assert!(vel_before.length() > 0.0);

        assert!(!s.take_shot(Vec3::new(1.0, 0.0, 0.0), 100.0));
        assert_eq!(s.world.velocity(&body), vel_before);
        assert_eq!(s.state(), TurnState::BallsInMotion);
    }

    #[test]
    fn degenerate_shots_are_rejected() {
        let mut s = session(GameMode::TwoPlayer);
        assert!(!s.take_shot(Vec3::ZERO, 50.0));
        assert!(!s.take_shot(Vec3::new(0.0, 1.0, 0.0), 50.0)); // straight up
        assert!(!s.take_shot(Vec3::new(0.0, 0.0, -1.0), 0.0));
        assert!(s.can_shoot());
        assert_eq!(s.state(), TurnState::AwaitingShot);
    }

    #[test]
    fn power_is_clamped_to_the_layout_maximum() {
        let mut s = session(GameMode::TwoPlayer);
        assert!(s.take_shot(Vec3::new(0.0, 0.0, -1.0), 1e6));
        let body = *s.registry.body(BallId::CUE).unwrap();
        let max_speed =
            s.layout.max_power * s.layout.impulse_scale / s.layout.ball_mass;
        assert!(s.world.velocity(&body).length() <= max_speed * 1.01);
    }

    #[test]
    fn empty_settle_switches_the_turn_once() {
        let mut s = session(GameMode::TwoPlayer);
        force_in_flight(&mut s);

        s.tick(DT);
        assert_eq!(s.state(), TurnState::AwaitingShot);
        assert_eq!(s.status(), StatusMessage::TurnSwitched);
        assert_eq!(s.active_player(), Player::Two);
        assert!(s.can_shoot());

        // Further ticks at rest never resolve again
        for _ in 0..5 {
            s.tick(DT);
        }
        assert_eq!(s.status(), StatusMessage::TurnSwitched);
        assert_eq!(s.active_player(), Player::Two);
        assert_eq!(s.scores(), (0, 0));
    }

    #[test]
    fn scenario_break_pockets_two_object_balls() {
        let mut s = session(GameMode::TwoPlayer);
        force_in_flight(&mut s);
        s.pocket_ball(BallId(4));
        s.pocket_ball(BallId(11));

        s.tick(DT);

        assert_eq!(s.scores(), (2, 0));
        assert_eq!(s.active_player(), Player::One);
        assert_eq!(s.status(), StatusMessage::TurnContinues);
        assert!(s.tracker.is_empty());
        assert!(s.can_shoot());
        assert_eq!(s.object_balls_remaining(), 13);
    }

    #[test]
    fn scenario_scratch_with_object_ball() {
        let mut s = session(GameMode::TwoPlayer);
        force_in_flight(&mut s);
        s.pocket_ball(BallId::CUE);
        s.pocket_ball(BallId(6));

        s.tick(DT);

        assert_eq!(s.scores(), (0, 0));
        assert_eq!(s.status(), StatusMessage::Foul);
        assert_eq!(s.active_player(), Player::Two);
        assert_eq!(s.object_balls_remaining(), 14);

        // Cue ball respotted at the break spot with zero velocity
        let cue = s.cue_ball_position().unwrap();
        assert!((cue - s.layout.break_spot()).length() < 1e-5);
        let body = *s.registry.body(BallId::CUE).unwrap();
        assert_eq!(s.world.velocity(&body), Vec3::ZERO);
        assert!(s.can_shoot());
    }

    #[test]
    fn scenario_nothing_pocketed_in_practice_keeps_the_turn() {
        let mut s = session(GameMode::Practice);
        force_in_flight(&mut s);

        s.tick(DT);

        assert_eq!(s.status(), StatusMessage::YourTurn);
        assert_eq!(s.active_player(), Player::One);
        assert_eq!(s.scores(), (0, 0));
    }

    #[test]
    fn duplicate_pocket_records_count_once() {
        let mut s = session(GameMode::TwoPlayer);
        force_in_flight(&mut s);
        s.pocket_ball(BallId(9));
        s.pocket_ball(BallId(9));

        s.tick(DT);
        assert_eq!(s.scores(), (1, 0));
    }

    #[test]
    fn fallen_object_ball_is_swept_and_scored() {
        let mut s = session(GameMode::TwoPlayer);
        force_in_flight(&mut s);
        // Simulate a ball that tunneled past the triggers and fell
        let below = Vec3::new(0.3, -1.0, 0.0);
        s.registry
            .reposition(BallId(3), below, &mut s.world, &s.layout, &mut s.ids);

        s.tick(DT);

        assert_eq!(s.registry.state(BallId(3)), Some(BallState::Pocketed));
        assert_eq!(s.scores(), (1, 0));
        assert_eq!(s.status(), StatusMessage::TurnContinues);
    }

    #[test]
    fn fallen_cue_ball_takes_the_foul_path() {
        let mut s = session(GameMode::TwoPlayer);
        force_in_flight(&mut s);
        let below = Vec3::new(0.0, -1.0, 0.0);
        s.registry
            .reposition(BallId::CUE, below, &mut s.world, &s.layout, &mut s.ids);

        s.tick(DT);

        assert_eq!(s.status(), StatusMessage::Foul);
        assert_eq!(s.active_player(), Player::Two);
        let cue = s.cue_ball_position().unwrap();
        assert!((cue - s.layout.break_spot()).length() < 1e-5);
    }

    #[test]
    fn reset_table_keeps_scores_and_rebuilds_the_rack() {
        let mut s = session(GameMode::TwoPlayer);
        force_in_flight(&mut s);
        s.pocket_ball(BallId(4));
        s.tick(DT);
        assert_eq!(s.scores(), (1, 0));

        s.reset_table();
        assert_eq!(s.scores(), (1, 0));
        assert_eq!(s.object_balls_remaining(), 15);
        assert!(s.can_shoot());
        assert_eq!(s.status(), StatusMessage::YourTurn);
    }

    #[test]
    fn start_game_zeroes_the_scoreboard() {
        let mut s = session(GameMode::TwoPlayer);
        force_in_flight(&mut s);
        s.pocket_ball(BallId(4));
        s.tick(DT);

        s.start_game(GameMode::TwoPlayer);
        assert_eq!(s.scores(), (0, 0));
        assert_eq!(s.active_player(), Player::One);
        assert_eq!(s.object_balls_remaining(), 15);
    }

    #[test]
    fn break_shot_eventually_settles_and_resolves() {
        let mut s = session(GameMode::TwoPlayer);
        assert!(s.take_shot(Vec3::new(0.0, 0.0, -1.0), 100.0));

        let mut settled = false;
        for _ in 0..6000 {
            s.tick(DT);
            if s.state() == TurnState::AwaitingShot {
                settled = true;
                break;
            }
        }

        assert!(settled, "break shot never settled");
        assert!(s.can_shoot());
        assert_ne!(s.status(), StatusMessage::BallsMoving);
        assert!(s.tracker.is_empty());
        // Cue ball is back in play whatever happened
        assert!(s.cue_ball_position().is_some());
    }
}
