use envconfig::Envconfig;
use std::{collections::HashMap, fmt, path::PathBuf, str::FromStr};
use thiserror::Error;

/// Raw variables as read by envconfig. Typed fields are parsed afterwards in
/// [`Config::from_vars`] so their errors keep their detail.
#[derive(Envconfig)]
struct EnvVars {
    #[envconfig(from = "PROJECT_NAME")]
    project_name: String,

    #[envconfig(from = "LISTEN_ADDRESS", default = "0.0.0.0:8000")]
    listen_address: String,

    #[envconfig(from = "API_PREFIX", default = "")]
    api_prefix: String,

    #[envconfig(from = "FRONTEND_HOST", default = "http://localhost:5173")]
    frontend_host: String,

    #[envconfig(from = "ENVIRONMENT", default = "local")]
    environment: String,

    #[envconfig(from = "BACKEND_CORS_ORIGINS", default = "")]
    backend_cors_origins: String,

    #[envconfig(from = "SQLITE_DB_PATH")]
    sqlite_db_path: Option<String>,

    #[envconfig(from = "IMAGE_DB", default = "../imageDB")]
    image_db: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub project_name: String,
    pub listen_address: String,
    pub api_prefix: String,
    pub frontend_host: String,
    pub environment: Environment,
    pub backend_cors_origins: CorsOrigins,
    pub sqlite_db_path: Option<String>,
    pub image_db: String,
}

impl Config {
    /// Loads the config from the process environment. Variables set to an
    /// empty string are treated as unset, and variables that aren't valid
    /// unicode are skipped.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let env = EnvVars::init_from_hashmap(&vars)?;

        Ok(Self {
            project_name: env.project_name,
            listen_address: env.listen_address,
            api_prefix: env.api_prefix,
            frontend_host: env.frontend_host,
            environment: env.environment.parse()?,
            backend_cors_origins: env.backend_cors_origins.parse()?,
            sqlite_db_path: env.sqlite_db_path,
            image_db: env.image_db,
        })
    }

    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.image_db)
    }

    pub fn all_cors_origins(&self) -> Vec<String> {
        self.backend_cors_origins
            .0
            .iter()
            .map(|origin| origin.trim_end_matches('/').to_owned())
            .chain(std::iter::once(self.frontend_host.clone()))
            .collect()
    }

    /// Connection URI for the optional SQLite database. Nothing in the upload
    /// path connects to it.
    pub fn database_uri(&self) -> Option<String> {
        self.sqlite_db_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("sqlite:///{path}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_owned())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Staging => "staging",
            Self::Production => "production",
        };
        f.write_str(name)
    }
}

/// Allowed CORS origins.
///
/// Parses either a JSON array of strings (`["http://a", "http://b"]`) or a
/// comma-separated list (`http://a, http://b`). A blank value is an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsOrigins(pub Vec<String>);

impl FromStr for CorsOrigins {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Ok(Self::default());
        }

        if s.starts_with('[') {
            let origins: Vec<String> = serde_json::from_str(s)
                .map_err(|err| ConfigError::InvalidCorsOrigins(err.to_string()))?;
            return Ok(Self(origins));
        }

        s.split(',')
            .map(str::trim)
            .map(|origin| {
                if origin.is_empty() {
                    Err(ConfigError::InvalidCorsOrigins(format!(
                        "empty origin in {s:?}"
                    )))
                } else {
                    Ok(origin.to_owned())
                }
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envconfig::Error),
    #[error("Invalid environment {0:?}, expected one of local, staging, production")]
    InvalidEnvironment(String),
    #[error("Invalid CORS origins: {0}")]
    InvalidCorsOrigins(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        Config::from_vars(vars.iter().copied())
    }

    #[test]
    fn defaults() {
        let config = config(&[("PROJECT_NAME", "imagedb")]).unwrap();

        assert_eq!(config.project_name, "imagedb");
        assert_eq!(config.listen_address, "0.0.0.0:8000");
        assert_eq!(config.api_prefix, "");
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.upload_dir(), PathBuf::from("../imageDB"));
        assert_eq!(config.database_uri(), None);
        assert_eq!(config.all_cors_origins(), vec!["http://localhost:5173"]);
    }

    #[test]
    fn project_name_is_required() {
        assert!(matches!(config(&[]), Err(ConfigError::Env(_))));
    }

    #[test]
    fn empty_values_are_ignored() {
        let config = config(&[
            ("PROJECT_NAME", "imagedb"),
            ("ENVIRONMENT", ""),
            ("FRONTEND_HOST", ""),
            ("SQLITE_DB_PATH", ""),
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.frontend_host, "http://localhost:5173");
        assert_eq!(config.database_uri(), None);
    }

    #[test]
    fn invalid_environment() {
        let err = config(&[("PROJECT_NAME", "imagedb"), ("ENVIRONMENT", "dev")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Invalid environment "dev", expected one of local, staging, production"#
        );
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn database_uri_from_sqlite_path() {
        let config = config(&[
            ("PROJECT_NAME", "imagedb"),
            ("SQLITE_DB_PATH", "/var/lib/app.db"),
        ])
        .unwrap();

        assert_eq!(
            config.database_uri().as_deref(),
            Some("sqlite:////var/lib/app.db")
        );
    }

    #[test]
    fn cors_origins_comma_separated() {
        let origins: CorsOrigins = "http://a.test, http://b.test/".parse().unwrap();
        assert_eq!(origins.0, vec!["http://a.test", "http://b.test/"]);
    }

    #[test]
    fn cors_origins_json_list() {
        let origins: CorsOrigins = r#"["http://a.test", "http://b.test"]"#.parse().unwrap();
        assert_eq!(origins.0, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn cors_origins_rejects_garbage() {
        assert!("[1, 2]".parse::<CorsOrigins>().is_err());
        assert!("[\"http://a.test\"".parse::<CorsOrigins>().is_err());
        assert!("http://a.test,,http://b.test".parse::<CorsOrigins>().is_err());
        assert_eq!("  ".parse::<CorsOrigins>().unwrap(), CorsOrigins::default());
    }

    #[test]
    fn all_cors_origins_strips_trailing_slash() {
        let config = config(&[
            ("PROJECT_NAME", "imagedb"),
            ("BACKEND_CORS_ORIGINS", "http://a.test/,http://b.test"),
            ("FRONTEND_HOST", "https://app.test"),
        ])
        .unwrap();

        assert_eq!(
            config.all_cors_origins(),
            vec!["http://a.test", "http://b.test", "https://app.test"]
        );
    }

    #[test]
    fn invalid_cors_origins_keep_detail() {
        let err = config(&[
            ("PROJECT_NAME", "imagedb"),
            ("BACKEND_CORS_ORIGINS", "http://a.test,,http://b.test"),
        ])
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidCorsOrigins(_)));
        assert!(err.to_string().contains("empty origin"));
    }
}
