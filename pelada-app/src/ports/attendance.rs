use crate::domain::{EventId, RepoError, UserId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    Go,
    Maybe,
    No,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Go => "GO",
            AttendanceStatus::Maybe => "MAYBE",
            AttendanceStatus::No => "NO",
        }
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GO" => Ok(AttendanceStatus::Go),
            "MAYBE" => Ok(AttendanceStatus::Maybe),
            "NO" => Ok(AttendanceStatus::No),
            other => Err(format!("Unknown attendance status: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub user_id: UserId,
    pub status: AttendanceStatus,
}

#[async_trait::async_trait]
pub trait AttendanceRepository {
    /// Attendance of the event with status GO, in a stable order.
    async fn list_confirmed(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, RepoError>;
}
