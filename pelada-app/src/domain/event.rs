use chrono::{DateTime, Utc};

use crate::domain::{EventId, GroupId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventFormat {
    Futsal,
    Fut7,
    Fut11,
}

impl EventFormat {
    pub fn field_players_per_team(&self) -> usize {
        match self {
            EventFormat::Futsal => 4,
            EventFormat::Fut7 => 6,
            EventFormat::Fut11 => 10,
        }
    }

    /// Field players plus the goalkeeper slot.
    pub fn players_per_team_with_goalkeeper(&self) -> usize {
        self.field_players_per_team() + 1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventFormat::Futsal => "FUTSAL",
            EventFormat::Fut7 => "FUT7",
            EventFormat::Fut11 => "FUT11",
        }
    }
}

impl std::str::FromStr for EventFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FUTSAL" => Ok(EventFormat::Futsal),
            "FUT7" => Ok(EventFormat::Fut7),
            "FUT11" => Ok(EventFormat::Fut11),
            other => Err(format!("Unknown event format: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub id: EventId,
    pub group_id: GroupId,
    pub title: String,
    pub format: EventFormat,
    pub teams_generated_at: Option<DateTime<Utc>>,
}
