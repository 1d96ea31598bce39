use std::sync::Arc;

use auth::Authenticator;
use session_service::config::Config;
use session_service::domain::session::ports::SessionServicePort;
use session_service::domain::session::service::SessionService;
use session_service::domain::user::models::EmailAddress;
use session_service::domain::user::ports::UserRepository;
use session_service::domain::user::ports::UserServicePort;
use session_service::domain::user::service::UserService;
use session_service::inbound::http::router::create_router;
use session_service::outbound::repositories::InMemoryUserRepository;
use session_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const MAX_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        in_memory = config.database.in_memory,
        access_ttl_minutes = config.jwt.access_ttl_minutes,
        refresh_ttl_days = config.jwt.refresh_ttl_days,
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new(config.jwt.codec()));

    if config.database.in_memory {
        tracing::warn!("Using in-memory user directory, accounts are lost on restart");
        serve(
            &config,
            authenticator,
            Arc::new(InMemoryUserRepository::new()),
        )
        .await
    } else {
        let pg_pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(&config.database.url)
            .await?;
        tracing::info!(
            max_connections = MAX_CONNECTIONS,
            database = "postgresql",
            "Database connection pool created"
        );

        sqlx::migrate!("./migrations").run(&pg_pool).await?;
        tracing::info!(database = "postgresql", "Database migrations completed");

        serve(
            &config,
            authenticator,
            Arc::new(PostgresUserRepository::new(pg_pool)),
        )
        .await
    }
}

async fn serve<UR>(
    config: &Config,
    authenticator: Arc<Authenticator>,
    user_repository: Arc<UR>,
) -> Result<(), anyhow::Error>
where
    UR: UserRepository,
{
    let user_service = Arc::new(UserService::new(Arc::clone(&user_repository)));
    let session_service = Arc::new(SessionService::new(authenticator, user_repository));

    if let Some(admin) = &config.admin {
        let email = EmailAddress::new(admin.email.clone())?;
        if user_service
            .ensure_admin(email.clone(), admin.password.clone())
            .await?
        {
            tracing::info!(email = %email, "Bootstrap administrator created");
        }
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let session_service: Arc<dyn SessionServicePort> = session_service;
    let user_service: Arc<dyn UserServicePort> = user_service;
    let http_application = create_router(session_service, user_service);

    axum::serve(http_listener, http_application).await?;
    tracing::info!("Server exited");

    Ok(())
}
