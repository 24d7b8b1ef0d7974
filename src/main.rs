use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_portal::api::router;
use course_portal::auth::TokenCodec;
use course_portal::config::Config;
use course_portal::mail::{HttpMailer, Mailer, NoopMailer};
use course_portal::sheets::{HttpSheetSink, NoopSheetSink, SheetSink};
use course_portal::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_portal=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(HttpMailer::new(mail.clone())?),
        None => {
            info!("mail config not set, notifications disabled");
            Arc::new(NoopMailer)
        }
    };

    let sheets: Arc<dyn SheetSink> = match &config.sheets {
        Some(sheets) => Arc::new(HttpSheetSink::new(sheets.clone())?),
        None => Arc::new(NoopSheetSink),
    };

    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    let state = AppState {
        db: pool.clone(),
        tokens: TokenCodec::new(&config.token_secret),
        mailer,
        sheets,
        config: Arc::new(config),
    };

    let app = router(state).layer(cors);

    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
