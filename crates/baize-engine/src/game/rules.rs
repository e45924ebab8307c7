use std::collections::HashSet;
use std::fmt;

use crate::game::ball::{BallId, GameMode, Player};

/// Where the shot lifecycle currently stands.
///
/// `Resolving` exists only for the duration of one resolution pass on the
/// motion-to-rest edge; observers never see it across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingShot,
    BallsInMotion,
    Resolving,
}

/// Human-readable status pushed to the UI after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    BallsMoving,
    YourTurn,
    Foul,
    TurnContinues,
    TurnSwitched,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusMessage::BallsMoving => "balls are moving",
            StatusMessage::YourTurn => "your turn to shoot",
            StatusMessage::Foul => "cue ball pocketed, foul",
            StatusMessage::TurnContinues => "turn continues",
            StatusMessage::TurnSwitched => "turn passes to the other player",
        };
        f.write_str(text)
    }
}

/// The mutable game state: active player, scores, shooting permission.
/// Created at game start and mutated on every settle cycle.
#[derive(Debug, Clone)]
pub struct Turn {
    pub mode: GameMode,
    pub active: Player,
    pub can_shoot: bool,
    scores: [u32; 2],
}

impl Turn {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            active: Player::One,
            can_shoot: true,
            scores: [0, 0],
        }
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    fn award(&mut self, player: Player, points: u32) {
        self.scores[player.index()] += points;
    }

    fn switch(&mut self) {
        self.active = self.active.other();
    }
}

/// What one settle cycle concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnResolution {
    pub foul: bool,
    /// Points awarded this shot (0 on a foul, regardless of object balls).
    pub points: u32,
    pub switched: bool,
    pub status: StatusMessage,
}

/// Apply the scoring, foul and turn-switch policy for one finished shot.
///
/// A scratch voids the shot's scoring entirely: even if object balls
/// dropped alongside the cue ball, no points are awarded and, in
/// two-player mode, the turn passes unconditionally. Without a foul, each
/// pocketed object ball is worth one point to the shooter, and an empty
/// pocket set hands the table over. Practice mode never transfers the turn.
///
/// The caller is responsible for the physical side effects (the cue ball
/// respot after a scratch); this function only decides the outcome.
pub fn resolve(turn: &mut Turn, pocketed: &HashSet<BallId>) -> TurnResolution {
    let multiplayer = turn.mode == GameMode::TwoPlayer;

    if pocketed.contains(&BallId::CUE) {
        let switched = multiplayer;
        if switched {
            turn.switch();
        }
        turn.can_shoot = true;
        log::info!("foul: cue ball pocketed; no points awarded");
        return TurnResolution {
            foul: true,
            points: 0,
            switched,
            status: StatusMessage::Foul,
        };
    }

    let points = pocketed.iter().filter(|id| !id.is_cue()).count() as u32;
    turn.award(turn.active, points);

    let switched = multiplayer && points == 0;
    if switched {
        turn.switch();
    }
    turn.can_shoot = true;

    let status = if !multiplayer {
        StatusMessage::YourTurn
    } else if switched {
        StatusMessage::TurnSwitched
    } else {
        StatusMessage::TurnContinues
    };

    TurnResolution {
        foul: false,
        points,
        switched,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u8]) -> HashSet<BallId> {
        ids.iter().map(|&n| BallId(n)).collect()
    }

    #[test]
    fn pocketed_object_balls_score_one_point_each() {
        let mut turn = Turn::new(GameMode::TwoPlayer);
        let res = resolve(&mut turn, &set(&[4, 11]));

        assert!(!res.foul);
        assert_eq!(res.points, 2);
        assert!(!res.switched);
        assert_eq!(res.status, StatusMessage::TurnContinues);
        assert_eq!(turn.score(Player::One), 2);
        assert_eq!(turn.active, Player::One);
    }

    #[test]
    fn empty_pocket_set_passes_the_turn() {
        let mut turn = Turn::new(GameMode::TwoPlayer);
        let res = resolve(&mut turn, &set(&[]));

        assert_eq!(res.points, 0);
        assert!(res.switched);
        assert_eq!(res.status, StatusMessage::TurnSwitched);
        assert_eq!(turn.active, Player::Two);
    }

    #[test]
    fn scratch_voids_scoring_and_passes_the_turn() {
        let mut turn = Turn::new(GameMode::TwoPlayer);
        let res = resolve(&mut turn, &set(&[0, 6]));

        assert!(res.foul);
        assert_eq!(res.points, 0);
        assert!(res.switched);
        assert_eq!(res.status, StatusMessage::Foul);
        assert_eq!(turn.score(Player::One), 0);
        assert_eq!(turn.score(Player::Two), 0);
        assert_eq!(turn.active, Player::Two);
    }

    #[test]
    fn scratch_with_many_object_balls_still_scores_nothing() {
        let mut turn = Turn::new(GameMode::TwoPlayer);
        let res = resolve(&mut turn, &set(&[0, 1, 2, 3]));
        assert!(res.foul);
        assert_eq!(res.points, 0);
        assert_eq!(turn.score(Player::One), 0);
    }

    #[test]
    fn practice_mode_never_switches() {
        let mut turn = Turn::new(GameMode::Practice);

        let res = resolve(&mut turn, &set(&[]));
        assert!(!res.switched);
        assert_eq!(res.status, StatusMessage::YourTurn);
        assert_eq!(turn.active, Player::One);

        let res = resolve(&mut turn, &set(&[0]));
        assert!(res.foul);
        assert!(!res.switched);
        assert_eq!(turn.active, Player::One);
    }

    #[test]
    fn score_is_monotonic_across_shots() {
        let mut turn = Turn::new(GameMode::TwoPlayer);
        let shots: [&[u8]; 5] = [&[3], &[], &[0, 9], &[1, 2, 15], &[]];

        let mut last = (0, 0);
        for shot in shots {
            resolve(&mut turn, &set(shot));
            let now = (turn.score(Player::One), turn.score(Player::Two));
            assert!(now.0 >= last.0 && now.1 >= last.1, "score decreased: {:?} -> {:?}", last, now);
            last = now;
        }
    }

    #[test]
    fn points_go_to_the_player_who_took_the_shot() {
        let mut turn = Turn::new(GameMode::TwoPlayer);
        // Player one misses, turn passes
        resolve(&mut turn, &set(&[]));
        assert_eq!(turn.active, Player::Two);
        // Player two pots ball 5
        let res = resolve(&mut turn, &set(&[5]));
        assert_eq!(res.points, 1);
        assert_eq!(turn.score(Player::Two), 1);
        assert_eq!(turn.score(Player::One), 0);
        assert_eq!(turn.active, Player::Two);
    }

    #[test]
    fn resolution_rearms_shooting() {
        let mut turn = Turn::new(GameMode::TwoPlayer);
        turn.can_shoot = false;
        resolve(&mut turn, &set(&[7]));
        assert!(turn.can_shoot);
    }
}
