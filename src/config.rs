use std::net::IpAddr;

use crate::submission::extractor::{ExtractorConfig, SemanticField};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub log_level: String,
    pub extractor: ExtractorConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("FORMSINK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid FORMSINK_HOST: {e}"))?;

        // PORT is what most hosting platforms inject.
        let port_raw = std::env::var("FORMSINK_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "5000".to_string());
        let port: u16 = port_raw
            .parse()
            .map_err(|e| format!("Invalid FORMSINK_PORT: {e}"))?;

        let max_body_size: usize = env_or("FORMSINK_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid FORMSINK_MAX_BODY_SIZE: {e}"))?;

        let db_max_connections: u32 = env_or("FORMSINK_DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid FORMSINK_DB_MAX_CONNECTIONS: {e}"))?;

        let db_acquire_timeout_secs: u64 = env_or("FORMSINK_DB_ACQUIRE_TIMEOUT_SECS", "5")
            .parse()
            .map_err(|e| format!("Invalid FORMSINK_DB_ACQUIRE_TIMEOUT_SECS: {e}"))?;

        let log_level = env_or("FORMSINK_LOG_LEVEL", "info");

        let mut extractor = ExtractorConfig::default();
        if let Ok(table) = std::env::var("FORMSINK_KEYED_FIELDS") {
            extractor.keyed_fields = parse_keyed_fields(&table)?;
        }

        Ok(Config {
            database_url,
            host,
            port,
            max_body_size,
            db_max_connections,
            db_acquire_timeout_secs,
            log_level,
            extractor,
        })
    }
}

/// Parse `q3_nombre=name,q4_email=email,...` into an identifier table.
pub fn parse_keyed_fields(raw: &str) -> Result<Vec<(String, SemanticField)>, String> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|entry| {
            let (key, field) = entry
                .split_once('=')
                .ok_or_else(|| format!("Invalid FORMSINK_KEYED_FIELDS entry '{entry}': expected key=field"))?;
            let field = SemanticField::parse(field.trim()).ok_or_else(|| {
                format!("Invalid FORMSINK_KEYED_FIELDS entry '{entry}': unknown field '{}'", field.trim())
            })?;
            Ok((key.trim().to_string(), field))
        })
        .collect()
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_fields_table_parses() {
        let table = parse_keyed_fields("q8_nombre=name, q9_email=email,q10_fecha=submittedAt").unwrap();
        assert_eq!(
            table,
            vec![
                ("q8_nombre".to_string(), SemanticField::Name),
                ("q9_email".to_string(), SemanticField::Email),
                ("q10_fecha".to_string(), SemanticField::SubmittedAt),
            ]
        );
    }

    #[test]
    fn keyed_fields_table_rejects_unknown_field() {
        let err = parse_keyed_fields("q3_nombre=nickname").unwrap_err();
        assert!(err.contains("unknown field 'nickname'"));
    }

    #[test]
    fn keyed_fields_table_rejects_missing_separator() {
        assert!(parse_keyed_fields("q3_nombre").is_err());
    }
}
