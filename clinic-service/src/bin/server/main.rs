use std::sync::Arc;

use clinic_service::config::Config;
use clinic_service::domain::auth::service::AuthService;
use clinic_service::domain::auth::service::AuthSettings;
use clinic_service::domain::document::service::DocumentService;
use clinic_service::domain::link::service::LinkService;
use clinic_service::domain::user::service::UserService;
use clinic_service::inbound::http::router::create_router;
use clinic_service::inbound::http::router::AppState;
use clinic_service::outbound::clock::SystemClock;
use clinic_service::outbound::mailer::LogMailer;
use clinic_service::outbound::repositories::PostgresDocumentRepository;
use clinic_service::outbound::repositories::PostgresLinkRepository;
use clinic_service::outbound::repositories::PostgresSessionStore;
use clinic_service::outbound::repositories::PostgresUserRepository;
use clinic_service::outbound::storage::FsFileStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "clinic-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        base_url = %config.server.base_url,
        storage_root = %config.storage.root,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let signing_secret = config.security.signing_secret();
    let jwt = Arc::new(auth::JwtHandler::new(&signing_secret));

    let users = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let sessions = Arc::new(PostgresSessionStore::new(pg_pool.clone()));
    let links = Arc::new(PostgresLinkRepository::new(pg_pool.clone()));
    let documents = Arc::new(PostgresDocumentRepository::new(pg_pool));
    let files = Arc::new(FsFileStore::new(config.storage.root.clone()));
    let mailer = Arc::new(LogMailer::new(
        config.mail.from_email.clone(),
        config.mail.from_name.clone(),
    ));
    let clock = Arc::new(SystemClock);

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&sessions),
        Arc::clone(&users),
        mailer,
        Arc::clone(&clock),
        &signing_secret,
        AuthSettings {
            issuer: config.server.base_url.clone(),
            token_pepper: config.security.token_pepper.clone(),
            access_token_ttl_secs: config.security.access_token_ttl_secs,
            refresh_token_ttl_days: config.security.refresh_token_ttl_days,
            reset_token_ttl_minutes: config.security.reset_token_ttl_minutes,
            reset_link_url: config.security.reset_link_url.clone(),
        },
    ));
    let user_service = Arc::new(UserService::new(Arc::clone(&users)));
    let link_service = Arc::new(LinkService::new(
        links,
        Arc::clone(&users),
        Arc::clone(&clock),
    ));
    let document_service = Arc::new(DocumentService::new(
        documents,
        files,
        clock,
        config.server.base_url.clone(),
    ));

    let state = AppState {
        auth_service,
        user_service,
        link_service,
        document_service,
        users,
        jwt,
    };

    let address = format!("0.0.0.0:{}", config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Http server listening");

    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
