use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pelada_app::{
    domain::{
        EventId,
        team::{Team, TeamMember},
    },
    workflow::teams::{generate::GenerateTeamsUseCase, get::GetTeamsUseCase},
};
use uuid::Uuid;

use crate::{AppState, ServiceError, auth::Auth};

#[derive(serde::Serialize, Debug)]
pub struct TeamInfo {
    pub id: i64,
    pub event_id: String,
    pub name: String,
    pub total_rating: i32,
    pub members: Vec<TeamMemberInfo>,
}

#[derive(serde::Serialize, Debug)]
pub struct TeamMemberInfo {
    pub user_id: String,
    pub profile_id: Option<i64>,
    pub is_goalkeeper: bool,
}

impl From<TeamMember> for TeamMemberInfo {
    fn from(member: TeamMember) -> Self {
        Self {
            user_id: member.user_id.to_string(),
            profile_id: member.profile_id.map(|id| id.0),
            is_goalkeeper: member.is_goalkeeper,
        }
    }
}

impl From<Team> for TeamInfo {
    fn from(team: Team) -> Self {
        Self {
            id: team.id.0,
            event_id: team.event_id.to_string(),
            name: team.name,
            total_rating: team.total_rating,
            members: team.members.into_iter().map(TeamMemberInfo::from).collect(),
        }
    }
}

pub async fn generate_teams(
    Auth(user): Auth,
    State(app): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Vec<TeamInfo>>), ServiceError> {
    let teams = app
        .app
        .teams_generate_use_case
        .generate_teams(user.user_id, EventId(event_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(teams.into_iter().map(TeamInfo::from).collect()),
    ))
}

pub async fn get_teams(
    Auth(user): Auth,
    State(app): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<TeamInfo>>, ServiceError> {
    let teams = app
        .app
        .teams_get_use_case
        .get_teams(user.user_id, EventId(event_id))
        .await?;
    Ok(Json(teams.into_iter().map(TeamInfo::from).collect()))
}
