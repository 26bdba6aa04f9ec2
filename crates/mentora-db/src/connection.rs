//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Where the matching store lives. Every field can be overridden by a
/// `MENTORA_DB_*` variable, see [`DbConfig::from_env`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `MENTORA_DB_URL`, host and port of the WebSocket endpoint.
    pub url: String,
    /// `MENTORA_DB_NAMESPACE`
    pub namespace: String,
    /// `MENTORA_DB_DATABASE`
    pub database: String,
    /// `MENTORA_DB_USER`, signed in as a root user.
    pub username: String,
    /// `MENTORA_DB_PASSWORD`
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "mentora".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Overlay `MENTORA_DB_*` environment variables on the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, fallback: String| std::env::var(name).unwrap_or(fallback);
        Self {
            url: var("MENTORA_DB_URL", defaults.url),
            namespace: var("MENTORA_DB_NAMESPACE", defaults.namespace),
            database: var("MENTORA_DB_DATABASE", defaults.database),
            username: var("MENTORA_DB_USER", defaults.username),
            password: var("MENTORA_DB_PASSWORD", defaults.password),
        }
    }
}

/// Root-authenticated client shared by the server and the backfill CLI.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open the WebSocket client and select the matching namespace and
    /// database. Migrations are run separately by the caller.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to matching store"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!(namespace = %config.namespace, "Matching store ready");

        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
