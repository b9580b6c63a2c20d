use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_DATABASE_URI: &str = "sqlite:///journal.db";
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Where the store lives, resolved from a `DATABASE_URI`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Accepts `sqlite:///relative.db`, `sqlite:////absolute.db`,
    /// `sqlite://` / `sqlite:///:memory:` and bare filesystem paths.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(Error::Config("database uri cannot be empty".to_string()));
        }

        let path = match uri.strip_prefix("sqlite://") {
            Some(rest) => match rest.strip_prefix('/') {
                Some(path) => path,
                None if rest.is_empty() => return Ok(DatabaseLocation::Memory),
                None => {
                    return Err(Error::Config(format!(
                        "unsupported database uri '{uri}': expected sqlite:///<path>"
                    )));
                }
            },
            None if uri.contains("://") => {
                return Err(Error::Config(format!(
                    "unsupported database scheme in '{uri}': only sqlite is available"
                )));
            }
            None => uri,
        };

        if path.is_empty() || path == ":memory:" {
            return Ok(DatabaseLocation::Memory);
        }

        Ok(DatabaseLocation::File(PathBuf::from(path)))
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_uri: String,
    /// HMAC key used to sign bearer tokens. Read-only once the server starts.
    pub secret_key: String,
    pub token_ttl_secs: i64,
    /// Prefix prepended to every hypermedia link. Empty keeps links relative.
    pub link_base: String,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn database(&self) -> Result<DatabaseLocation> {
        DatabaseLocation::parse(&self.database_uri)
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(Error::Config("secret key cannot be empty".to_string()));
        }
        if self.token_ttl_secs <= 0 {
            return Err(Error::Config(
                "token ttl must be a positive number of seconds".to_string(),
            ));
        }
        self.database()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_uri: DEFAULT_DATABASE_URI.to_string(),
            secret_key: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            link_base: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relative_sqlalchemy_uri() {
        let location = DatabaseLocation::parse("sqlite:///journal.db").unwrap();
        assert_eq!(location, DatabaseLocation::File(PathBuf::from("journal.db")));
    }

    #[test]
    fn test_parse_absolute_sqlalchemy_uri() {
        let location = DatabaseLocation::parse("sqlite:////var/lib/journal.db").unwrap();
        assert_eq!(
            location,
            DatabaseLocation::File(PathBuf::from("/var/lib/journal.db"))
        );
    }

    #[test]
    fn test_parse_memory_variants() {
        assert_eq!(
            DatabaseLocation::parse("sqlite://").unwrap(),
            DatabaseLocation::Memory
        );
        assert_eq!(
            DatabaseLocation::parse("sqlite:///:memory:").unwrap(),
            DatabaseLocation::Memory
        );
        assert_eq!(
            DatabaseLocation::parse(":memory:").unwrap(),
            DatabaseLocation::Memory
        );
    }

    #[test]
    fn test_parse_bare_path() {
        let location = DatabaseLocation::parse("./data/journal.db").unwrap();
        assert_eq!(
            location,
            DatabaseLocation::File(PathBuf::from("./data/journal.db"))
        );
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(DatabaseLocation::parse("postgresql://localhost/journal").is_err());
        assert!(DatabaseLocation::parse("").is_err());
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = ServerConfig::default();
        assert!(config.validate().is_err());

        let config = ServerConfig {
            secret_key: "k".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
