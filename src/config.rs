//! Configuration for the clinic back-office client

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

/// Names of the remote tables, one per record kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub closure_dates: String,
    pub mr_closure_dates: String,
    pub time_slots: String,
    pub working_hours: String,
    pub mr_weekdays: String,
    pub doctor_messages: String,
    pub contact_messages: String,
    pub mr_appointments: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            closure_dates: "closure_dates".to_string(),
            mr_closure_dates: "mr_closure_dates".to_string(),
            time_slots: "time_slots".to_string(),
            working_hours: "working_hours".to_string(),
            mr_weekdays: "mr_weekdays".to_string(),
            doctor_messages: "doctor_messages".to_string(),
            contact_messages: "contact_messages".to_string(),
            mr_appointments: "mr_appointments".to_string(),
        }
    }
}

/// Connection settings for the hosted data store.
/// It's recommended to load these values from environment variables.
#[derive(Debug, Clone)]
pub struct ClinicConfig {
    /// The base URL of the Supabase project
    pub url: Url,

    /// The anonymous API key
    pub anon_key: String,

    /// Signed-in user's token; row-level policies on the server decide
    /// what it may read and write
    pub access_token: Option<String>,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    pub tables: TableNames,
}

impl ClinicConfig {
    /// Creates a new configuration, validating the URL.
    pub fn new(url_str: &str, anon_key: String) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key,
            access_token: None,
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            tables: TableNames::default(),
        })
    }

    /// Reads `SUPABASE_URL`, `SUPABASE_ANON_KEY` and, if present,
    /// `SUPABASE_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let url_str = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;

        let config = Self::new(&url_str, anon_key)?;
        Ok(match std::env::var("SUPABASE_ACCESS_TOKEN") {
            Ok(token) if !token.is_empty() => config.with_access_token(&token),
            _ => config,
        })
    }

    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotenv::dotenv;

    #[test]
    fn config_new_valid() {
        dotenv().ok();

        let url = "http://localhost:12345";
        let config = ClinicConfig::new(url, "dummy-anon-key".to_string()).unwrap();

        // Url::parse adds a trailing slash when the path is empty
        assert_eq!(config.url.to_string(), format!("{}/", url));
        assert_eq!(config.anon_key, "dummy-anon-key");
        assert_eq!(config.db_schema, "public");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.tables.mr_closure_dates, "mr_closure_dates");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn config_new_invalid_url() {
        let config = ClinicConfig::new("not a valid url", "key".to_string());
        match config.err().unwrap() {
            Error::Url(_) => {}
            other => panic!("Expected Url error, got {:?}", other),
        }
    }

    #[test]
    fn config_new_empty_key() {
        let config = ClinicConfig::new("http://localhost:54321", String::new());
        match config.err().unwrap() {
            Error::Config(msg) => assert!(msg.contains("anon_key cannot be empty")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn builder_options_apply() {
        let tables = TableNames {
            time_slots: "clinic_time_slots".to_string(),
            ..TableNames::default()
        };
        let config = ClinicConfig::new("https://example.supabase.co", "key".to_string())
            .unwrap()
            .with_access_token("jwt")
            .with_request_timeout(None)
            .with_db_schema("clinic")
            .with_tables(tables);

        assert_eq!(config.access_token.as_deref(), Some("jwt"));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.db_schema, "clinic");
        assert_eq!(config.tables.time_slots, "clinic_time_slots");
    }
}
