use crate::document::{Document, PropertiesDocument};
use crate::errors::{ErrorKind, PolyError, PolyResult};
use secure_string::SecureString;
use serde::{Deserialize, Deserializer};
use std::fmt::Debug;

/// Connection settings consumed by a backend at `connect()`.
///
/// Backends take only what they need: the SQLite adapter reads `file`
/// (`None` means an in-memory database), a networked document store reads
/// host, port, credentials and database names. The password is held in a
/// [SecureString] so it is zeroed on drop and hidden from `Debug` output.
///
/// The configuration is deserializable with `serde` and can also be read
/// from a [Document], which is how it is usually loaded from a JSON config
/// file.
///
/// # Examples
///
/// ```rust
/// use polystore::doc;
/// use polystore::DatabaseConfig;
///
/// let config = DatabaseConfig::default()
///     .with_database("game")
///     .with_user("admin")
///     .with_password("s3cret");
/// assert_eq!(config.host(), "localhost");
///
/// let loaded = DatabaseConfig::from_document(&doc! { host: "db.local", port: 27017 }).unwrap();
/// assert_eq!(loaded.port(), Some(27017));
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    host: String,
    port: Option<u16>,
    user: Option<String>,
    #[serde(deserialize_with = "deserialize_password")]
    password: Option<SecureString>,
    database: String,
    auth_database: Option<String>,
    file: Option<String>,
}

fn deserialize_password<'de, D>(deserializer: D) -> Result<Option<SecureString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecureString::from))
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            host: "localhost".to_string(),
            port: None,
            user: None,
            password: None,
            database: String::new(),
            auth_database: None,
            file: None,
        }
    }
}

impl DatabaseConfig {
    /// Reads a configuration from a document.
    ///
    /// Missing keys keep their defaults. Keys with the wrong type make the
    /// whole configuration invalid.
    pub fn from_document(document: &Document) -> PolyResult<DatabaseConfig> {
        serde_json::from_value(document.to_json_value()).map_err(|err| {
            log::error!("Invalid database configuration: {}", err);
            PolyError::new(
                &format!("Invalid database configuration: {}", err),
                ErrorKind::ConfigurationError,
            )
        })
    }

    /// Reads a configuration from flat properties, using the same key names
    /// as [DatabaseConfig::from_document].
    ///
    /// # Errors
    ///
    /// * [ErrorKind::ConfigurationError] if `port` is not a valid port number.
    pub fn from_properties(properties: &PropertiesDocument) -> PolyResult<DatabaseConfig> {
        let mut config = DatabaseConfig::default();
        if let Some(host) = properties.get_string("host") {
            config.host = host;
        }
        if let Some(port) = properties.get_string("port") {
            let port = port.trim().parse::<u16>().map_err(|err| {
                log::error!("Invalid port '{}' in database configuration: {}", port, err);
                PolyError::wrap(
                    &format!("Invalid port '{}' in database configuration", port),
                    ErrorKind::ConfigurationError,
                    err,
                )
            })?;
            config.port = Some(port);
        }
        config.user = properties.get_string("user");
        config.password = properties.get_string("password").map(SecureString::from);
        if let Some(database) = properties.get_string("database") {
            config.database = database;
        }
        config.auth_database = properties.get_string("auth_database");
        config.file = properties.get_string("file");
        Ok(config)
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(SecureString::from(password));
        self
    }

    pub fn with_database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    pub fn with_auth_database(mut self, auth_database: &str) -> Self {
        self.auth_database = Some(auth_database.to_string());
        self
    }

    /// Sets the database file for file based backends.
    pub fn with_file(mut self, file: &str) -> Self {
        self.file = Some(file.to_string());
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the port, or the backend's default when none was configured.
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&SecureString> {
        self.password.as_ref()
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// The database holding the user's credentials, defaulting to the
    /// target database.
    pub fn auth_database(&self) -> &str {
        self.auth_database.as_deref().unwrap_or(&self.database)
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}

impl Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("database", &self.database)
            .field("auth_database", &self.auth_database)
            .field("file", &self.file)
            .finish()
    }
}

/// Names the table and columns behind a keyed single-value accessor.
///
/// A row is located by `key_field` and its value read from `value_field`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseAccessConfig {
    table: String,
    key_field: String,
    value_field: String,
}

impl DatabaseAccessConfig {
    pub fn new(table: &str, key_field: &str, value_field: &str) -> Self {
        DatabaseAccessConfig {
            table: table.to_string(),
            key_field: key_field.to_string(),
            value_field: value_field.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn value_field(&self) -> &str {
        &self.value_field
    }
}
