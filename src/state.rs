use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::mail::{LogMailer, Mailer};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing with existing schema");
        }

        let store = Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>;
        let mailer = Arc::new(LogMailer::new(&config.mail)) as Arc<dyn Mailer>;

        Ok(Self {
            store,
            mailer,
            config,
        })
    }

    pub fn from_parts(
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::auth::repo::testing::MemUserStore;
        use crate::mail::testing::RecordingMailer;

        Self::from_parts(
            Arc::new(MemUserStore::new()),
            Arc::new(RecordingMailer::new()),
            Arc::new(AppConfig::test()),
        )
    }
}
