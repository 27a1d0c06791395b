use std::sync::Arc;

use log::{LevelFilter, info};
use log4rs::{
    Config,
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};
use pelada_api::{AppState, ws::WsService};
use pelada_app::build_application;
use pelada_auth_jwt::JwtTokenValidator;
use pelada_persistence_sea_orm::{
    attendance::AttendanceRepositoryImpl, chat::ChatMessageRepositoryImpl, create_db_pool,
    create_schema, events::EventRepositoryImpl,
    membership::GroupMembershipRepositoryImpl, profiles::PlayerProfileRepositoryImpl,
    teams::TeamRepositoryImpl,
};

use crate::config::ServerConfig;

mod config;

const LOG_SIZE_LIMIT: u64 = 10 * 1024 * 1024; // 10 MB

const LOG_FILE_COUNT: u32 = 3;

fn init_logger(config: &ServerConfig) {
    let stderr_level = LevelFilter::Info;
    let file_level = LevelFilter::Debug;

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();

    let trigger = SizeTrigger::new(LOG_SIZE_LIMIT);
    let roller = FixedWindowRoller::builder()
        .build(&config.log_archive_pattern, LOG_FILE_COUNT)
        .expect("Invalid LOG_ARCHIVE_PATTERN");
    let policy = CompoundPolicy::new(Box::new(trigger), Box::new(roller));

    let logfile = log4rs::append::rolling_file::RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t} - {m}{n}")))
        .build(&config.log_file_path, Box::new(policy))
        .expect("Failed to open log file");

    let log_config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(file_level)))
                .build("logfile", Box::new(logfile)),
        )
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(stderr_level)))
                .build("stderr", Box::new(stderr)),
        )
        .build(
            Root::builder()
                .appender("logfile")
                .appender("stderr")
                .build(LevelFilter::Debug),
        )
        .expect("Invalid logger configuration");

    let _handle = log4rs::init_config(log_config).expect("Failed to initialize logger");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env().expect("Invalid configuration");
    init_logger(&config);

    let db = create_db_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    create_schema(&db)
        .await
        .expect("Failed to create database tables");

    let event_repo = Arc::new(EventRepositoryImpl::new(db.clone()));
    let membership_repo = Arc::new(GroupMembershipRepositoryImpl::new(db.clone()));
    let attendance_repo = Arc::new(AttendanceRepositoryImpl::new(db.clone()));
    let profile_repo = Arc::new(PlayerProfileRepositoryImpl::new(db.clone()));
    let team_repo = Arc::new(TeamRepositoryImpl::new(db.clone()));
    let chat_repo = Arc::new(ChatMessageRepositoryImpl::new(db));

    let ws_service = Arc::new(WsService::new());
    let token_validator = Arc::new(JwtTokenValidator::new(config.jwt_secret.as_bytes()));

    let app = Arc::new(build_application(
        ws_service.clone(),
        token_validator.clone(),
        event_repo,
        membership_repo,
        attendance_repo,
        profile_repo,
        team_repo,
        chat_repo,
    ));

    info!("Starting application");

    let state = AppState {
        app,
        ws: ws_service,
        auth: token_validator,
    };
    if let Err(e) = pelada_api::run(state, &config.host, config.http_port, shutdown_signal()).await
    {
        log::error!("API server failed: {}", e);
    }
}
