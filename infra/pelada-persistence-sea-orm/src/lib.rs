use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema,
    sea_query::Index,
};

pub mod attendance;
pub mod chat;
pub mod entity;
pub mod events;
pub mod membership;
pub mod profiles;
pub mod teams;

use entity::{
    attendance as attendance_entity, chat_message, event, group_member, player_profile, team,
    team_member,
};

pub async fn create_db_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(5).sqlx_logging(false);
    Database::connect(opt).await
}

/// Creates every table and unique index that does not exist yet.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());
    let mut statements = vec![
        schema.create_table_from_entity(event::Entity),
        schema.create_table_from_entity(group_member::Entity),
        schema.create_table_from_entity(player_profile::Entity),
        schema.create_table_from_entity(attendance_entity::Entity),
        schema.create_table_from_entity(team::Entity),
        schema.create_table_from_entity(team_member::Entity),
        schema.create_table_from_entity(chat_message::Entity),
    ];
    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(&*statement).await?;
    }

    let indexes = [
        Index::create()
            .name("ux_group_members_group_user")
            .table(group_member::Entity)
            .col(group_member::Column::GroupId)
            .col(group_member::Column::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_player_profiles_group_user")
            .table(player_profile::Entity)
            .col(player_profile::Column::GroupId)
            .col(player_profile::Column::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_attendance_event_user")
            .table(attendance_entity::Entity)
            .col(attendance_entity::Column::EventId)
            .col(attendance_entity::Column::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_team_members_team_user")
            .table(team_member::Entity)
            .col(team_member::Column::TeamId)
            .col(team_member::Column::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ];
    for index in indexes.iter() {
        db.execute(index).await?;
    }
    Ok(())
}

pub(crate) fn storage_error(e: DbErr) -> pelada_app::domain::RepoError {
    pelada_app::domain::RepoError::StorageError(e.to_string())
}
