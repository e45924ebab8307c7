/// Ball identity. `0` is always the cue ball; object balls are 1–15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(pub u8);

impl BallId {
    pub const CUE: BallId = BallId(0);

    pub fn is_cue(self) -> bool {
        self == Self::CUE
    }
}

/// Liveness of a ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallState {
    OnTable,
    Pocketed,
}

/// One of the two seats at the table. In practice mode only player one is
/// meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

/// Game mode chosen at the start of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Solo practice: no turn transfer ever happens.
    Practice,
    /// Two players alternating per the turn rules.
    TwoPlayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cue_ball_is_zero() {
        assert!(BallId(0).is_cue());
        assert!(!BallId(8).is_cue());
    }

    #[test]
    fn other_player_round_trips() {
        assert_eq!(Player::One.other(), Player::Two);
        assert_eq!(Player::Two.other().other(), Player::Two);
    }
}
