use crate::domain::{ProfileId, UserId};

pub const DEFAULT_RATING: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DF",
            Position::Midfielder => "MF",
            Position::Forward => "FW",
        }
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GK" => Ok(Position::Goalkeeper),
            "DF" => Ok(Position::Defender),
            "MF" => Ok(Position::Midfielder),
            "FW" => Ok(Position::Forward),
            other => Err(format!("Unknown position: {}", other)),
        }
    }
}

/// A confirmed attendee as seen by the balancing engine.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub user_id: UserId,
    pub profile_id: Option<ProfileId>,
    pub rating: i32,
    pub position: Position,
    pub can_be_goalkeeper: bool,
}

impl Player {
    /// A player without a profile in the event's group.
    pub fn without_profile(user_id: UserId) -> Self {
        Self {
            user_id,
            profile_id: None,
            rating: DEFAULT_RATING,
            position: Position::Midfielder,
            can_be_goalkeeper: false,
        }
    }

    pub fn is_explicit_goalkeeper(&self) -> bool {
        self.position == Position::Goalkeeper
    }

    pub fn is_voluntary_goalkeeper(&self) -> bool {
        self.position != Position::Goalkeeper && self.can_be_goalkeeper
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
