use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::payments::{PaymentGateway, StripeGateway};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        if config.jwt.access_secret.is_none() || config.jwt.refresh_secret.is_none() {
            warn!("jwt signing secrets incomplete; session endpoints will answer with internal errors");
        }

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }

        let gateway = StripeGateway::new(&config.payments).context("build payment client")?;
        if !config.payments.key_matches_environment() {
            warn!(
                environment = %gateway.environment(),
                "payment secret key does not look like a key for this environment"
            );
        }
        info!(environment = %gateway.environment(), "payment gateway ready");

        Ok(Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db)),
            Arc::new(gateway),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            config,
            users,
            payments,
        }
    }
}
