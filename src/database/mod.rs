pub mod durability;

use crate::config::Config;
use crate::utils::AppError;
use mongodb::bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};

pub const COMMENTS: &str = "comments";
pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";

/// Shared handle to the mflix database. Cloning is cheap: the driver's
/// connection pool lives behind an `Arc` inside `Database`.
#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    /// Connects, pings the server and makes sure the indexes the services
    /// depend on exist.
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let mongodb = Self::lazy(config).await?;

        mongodb.db.run_command(doc! { "ping": 1 }).await?;
        log::info!("✅ Connected to MongoDB database: {}", config.database_name);

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Builds the handle without touching the network; the driver connects on
    /// first use.
    pub async fn lazy(config: &Config) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(&config.database_url).await?;

        client_options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        client_options.max_pool_size = Some(config.max_pool_size);
        client_options.min_pool_size = Some(config.min_pool_size);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));
        client_options.connect_timeout = Some(config.timeout);
        client_options.server_selection_timeout = Some(config.timeout);

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database_name);

        Ok(Self { db })
    }

    /// Creates necessary indexes. The unique ones back the invariants the
    /// services rely on: one user per email, one session per token.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        let unique = || IndexOptions::builder().unique(true).build();

        let indexes: [(&str, Document, Option<IndexOptions>); 5] = [
            (USERS, doc! { "email": 1 }, Some(unique())),
            (SESSIONS, doc! { "jwt": 1 }, Some(unique())),
            (SESSIONS, doc! { "user_id": 1 }, None),
            (COMMENTS, doc! { "email": 1 }, None),
            (COMMENTS, doc! { "movie_id": 1 }, None),
        ];

        for (collection, keys, options) in indexes {
            let description = format!("{}({:?})", collection, keys.keys().collect::<Vec<_>>());
            let index = match options {
                Some(options) => IndexModel::builder().keys(keys).options(options).build(),
                None => IndexModel::builder().keys(keys).build(),
            };

            match self.collection::<Document>(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index ready: {}", description),
                Err(e) if is_index_conflict(&e) => {
                    log::debug!("   ℹ️  Index already exists with other options: {} ({})", description, e)
                }
                Err(e) => return Err(e.into()),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn health_check(&self) -> Result<bool, AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(true)
    }
}

// IndexOptionsConflict / IndexKeySpecsConflict
fn is_index_conflict(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Command(command_error) => matches!(command_error.code, 85 | 86),
        _ => false,
    }
}
