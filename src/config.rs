use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Upper bound on token lifetime: one year
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

impl SecurityConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            bail!(
                "TOKEN_TTL_HOURS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS,
                self.token_ttl_hours
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub word_list_path: String,
    pub rules: GameRules,
}

/// Limits governing registration and play
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameRules {
    pub max_guesses_per_word: usize,
    pub max_words_per_day: usize,
    pub word_length: usize,
    pub min_username_length: usize,
    pub min_password_length: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_guesses_per_word: 5,
            max_words_per_day: 3,
            word_length: 5,
            min_username_length: 5,
            min_password_length: 5,
        }
    }
}

impl GameRules {
    /// Layer `GAME_*` environment variables over the defaults,
    /// e.g. `GAME_MAX_WORDS_PER_DAY=5`.
    pub fn from_env() -> Result<Self> {
        let defaults = GameRules::default();
        let rules: GameRules = config::Config::builder()
            .set_default("max_guesses_per_word", defaults.max_guesses_per_word as u64)?
            .set_default("max_words_per_day", defaults.max_words_per_day as u64)?
            .set_default("word_length", defaults.word_length as u64)?
            .set_default("min_username_length", defaults.min_username_length as u64)?
            .set_default("min_password_length", defaults.min_password_length as u64)?
            .add_source(config::Environment::with_prefix("GAME").try_parsing(true))
            .build()
            .context("Failed to read GAME_* settings")?
            .try_deserialize()
            .context("GAME_* settings must be positive integers")?;

        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_guesses_per_word", self.max_guesses_per_word),
            ("max_words_per_day", self.max_words_per_day),
            ("word_length", self.word_length),
            ("min_username_length", self.min_username_length),
            ("min_password_length", self.min_password_length),
        ];
        for (name, value) in fields {
            if value == 0 {
                bail!("game rule {} must be greater than zero", name);
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
        };

        let security = SecurityConfig {
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set")?,
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .context("TOKEN_TTL_HOURS must be a number")?,
        };
        security.validate()?;

        let game = GameConfig {
            word_list_path: env::var("WORD_LIST_PATH")
                .unwrap_or_else(|_| "./words.txt".to_string()),
            rules: GameRules::from_env()?,
        };

        Ok(Config {
            database,
            server,
            security,
            game,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = GameRules::default();
        assert_eq!(rules.max_guesses_per_word, 5);
        assert_eq!(rules.max_words_per_day, 3);
        assert_eq!(rules.word_length, 5);
        assert_eq!(rules.min_username_length, 5);
        assert_eq!(rules.min_password_length, 5);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_zero_rule_rejected() {
        let rules = GameRules {
            max_words_per_day: 0,
            ..GameRules::default()
        };
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("max_words_per_day"));
    }

    #[test]
    fn test_token_ttl_bounds() {
        let security = |token_ttl_hours| SecurityConfig {
            jwt_secret: "secret".to_string(),
            token_ttl_hours,
        };
        assert!(security(1).validate().is_ok());
        assert!(security(MAX_TOKEN_TTL_HOURS).validate().is_ok());

        for bad in [0, -5, MAX_TOKEN_TTL_HOURS + 1, i64::MAX] {
            let err = security(bad).validate().unwrap_err();
            assert!(err.to_string().contains("TOKEN_TTL_HOURS"));
        }
    }

    #[test]
    fn test_server_addr() {
        let config = Config {
            database: DatabaseConfig {
                url: "postgres://localhost/lexiquest".to_string(),
                max_connections: 5,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            security: SecurityConfig {
                jwt_secret: "secret".to_string(),
                token_ttl_hours: 24,
            },
            game: GameConfig {
                word_list_path: "./words.txt".to_string(),
                rules: GameRules::default(),
            },
        };
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(config.database_url(), "postgres://localhost/lexiquest");
    }
}
