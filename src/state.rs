use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::auth::CredentialService;
use crate::config::AppConfig;
use crate::database::{DatabaseError, PgReferenceStore, PgUserRepository, ReferenceStore, UserRepository};
use crate::ingest::IngestPipeline;

/// Everything a request handler needs, cloned into each request by axum.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub reference: Arc<dyn ReferenceStore>,
    pub credentials: CredentialService,
    pub ingest: IngestPipeline,
    schema_ready: Arc<OnceCell<()>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        reference: Arc<dyn ReferenceStore>,
    ) -> Self {
        let credentials = CredentialService::new(users, config.security.bcrypt_cost);
        let ingest = IngestPipeline::new(reference.clone());

        Self {
            config: Arc::new(config),
            reference,
            credentials,
            ingest,
            schema_ready: Arc::new(OnceCell::new()),
        }
    }

    /// State backed by Postgres stores sharing `pool`.
    pub fn with_pool(config: AppConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgReferenceStore::new(pool)),
        )
    }

    /// Create the tables the first time any caller asks; later calls are free.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        self.schema_ready
            .get_or_try_init(|| self.reference.initialize())
            .await?;
        Ok(())
    }
}
