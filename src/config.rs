use crate::utils::AppError;
use std::{env, str::FromStr, time::Duration};

const DEFAULT_DATABASE: &str = "sample_mflix";

/// Runtime settings, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::InvalidArgument("DATABASE_URL must be set".to_string()))?;

        let database_name = env::var("MONGODB_DATABASE").unwrap_or_else(|_| {
            database_name_from_uri(&database_url)
                .unwrap_or(DEFAULT_DATABASE)
                .to_string()
        });

        let allowed_origins = split_origins(
            &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: var_or("PORT", 8080)?,
            database_url,
            database_name,
            max_pool_size: var_or("MONGODB_MAX_POOL_SIZE", 20)?,
            min_pool_size: var_or("MONGODB_MIN_POOL_SIZE", 5)?,
            timeout: Duration::from_secs(var_or("MONGODB_TIMEOUT_SECS", 5)?),
            allowed_origins,
        })
    }

    /// Settings for a database at `uri`, everything else defaulted.
    pub fn for_database(uri: &str, database_name: &str) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_url: uri.to_string(),
            database_name: database_name.to_string(),
            max_pool_size: 20,
            min_pool_size: 0,
            timeout: Duration::from_secs(5),
            allowed_origins: Vec::new(),
        }
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::InvalidArgument(format!("Invalid {} value '{}': {}", key, raw, e))),
        Err(_) => {
            log::debug!("{} not set, using default", key);
            Ok(default)
        }
    }
}

/// Database name from the path of a connection string, e.g.
/// `mongodb://host:27017/sample_mflix?retryWrites=true`.
fn database_name_from_uri(uri: &str) -> Option<&str> {
    let rest = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
    let (_, path) = rest.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_comes_from_uri_path() {
        assert_eq!(
            database_name_from_uri("mongodb+srv://u:p@cluster0.example.net/sample_mflix?retryWrites=true"),
            Some("sample_mflix")
        );
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/mflix"), Some("mflix"));
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/"), None);
        assert_eq!(database_name_from_uri("mongodb://localhost:27017"), None);
        assert_eq!(database_name_from_uri("mongodb://localhost:27017/?w=majority"), None);
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            split_origins("http://a.test, http://b.test ,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn numeric_variables_fall_back_and_reject_garbage() {
        env::remove_var("MFLIX_TEST_UNSET_PORT");
        assert_eq!(var_or::<u16>("MFLIX_TEST_UNSET_PORT", 8080).unwrap(), 8080);

        env::set_var("MFLIX_TEST_BAD_POOL", "many");
        let err = var_or::<u32>("MFLIX_TEST_BAD_POOL", 20).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        env::remove_var("MFLIX_TEST_BAD_POOL");
    }
}
