use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenCodec;
use crate::config::Config;
use crate::mail::Mailer;
use crate::sheets::SheetSink;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: TokenCodec,
    pub mailer: Arc<dyn Mailer>,
    pub sheets: Arc<dyn SheetSink>,
    pub config: Arc<Config>,
}
