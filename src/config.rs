use crate::error::{env_error, AppResult, Error};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use toml;

/// Default port for the HTTP server
pub const DEFAULT_PORT: u16 = 3000;

/// Screens that are enabled unless the overlay file says otherwise
const DEFAULT_SCREENS: [&str; 10] = [
    "orders",
    "reservations",
    "tables",
    "events",
    "staff",
    "inventory",
    "purchases",
    "shifts",
    "suppliers",
    "menu",
];

/// Main configuration structure for the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on
    pub port: u16,
    /// Secret for signing session tokens
    pub jwt_secret: String,
    /// Session token lifetime in minutes
    pub token_expiration_minutes: i64,
    /// Username for the seeded admin account
    pub admin_username: String,
    /// Password for the seeded admin account
    pub admin_password: String,
    /// Username for the seeded manager account
    pub manager_username: String,
    /// Password for the seeded manager account
    pub manager_password: String,
    /// Map of back-office screen names to their enabled status
    pub screens: HashMap<String, bool>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| env_error("JWT_SECRET"))?;
        let admin_username =
            env::var("ADMIN_USERNAME").map_err(|_| env_error("ADMIN_USERNAME"))?;
        let admin_password =
            env::var("ADMIN_PASSWORD").map_err(|_| env_error("ADMIN_PASSWORD"))?;
        let manager_username =
            env::var("MANAGER_USERNAME").map_err(|_| env_error("MANAGER_USERNAME"))?;
        let manager_password =
            env::var("MANAGER_PASSWORD").map_err(|_| env_error("MANAGER_PASSWORD"))?;

        // Parse numeric values
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid PORT value: {}", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        let token_expiration_minutes = match env::var("TOKEN_EXPIRATION_MINUTES") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                Error::Config(format!("Invalid TOKEN_EXPIRATION_MINUTES value: {}", raw))
            })?,
            Err(_) => 60 * 24,
        };

        // Initialize default screens
        let mut screens = HashMap::new();
        for screen in DEFAULT_SCREENS {
            screens.insert(screen.to_string(), true);
        }

        // Load screen configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/screens.toml") {
            if let Ok(file_screens) = toml::from_str::<HashMap<String, bool>>(&content) {
                // Merge with defaults
                for (key, value) in file_screens {
                    screens.insert(key, value);
                }
            }
        }

        Ok(Config {
            port,
            jwt_secret,
            token_expiration_minutes,
            admin_username,
            admin_password,
            manager_username,
            manager_password,
            screens,
        })
    }

    /// Check if a back-office screen is enabled
    pub fn is_screen_enabled(&self, name: &str) -> bool {
        *self.screens.get(name).unwrap_or(&false)
    }

    /// Update screen enabled status
    pub fn set_screen_enabled(&mut self, name: &str, enabled: bool) -> AppResult<()> {
        self.screens.insert(name.to_string(), enabled);
        self.save_screens()
    }

    /// Save screen configuration to file
    fn save_screens(&self) -> AppResult<()> {
        // Create config directory if it doesn't exist
        if !Path::new("config").exists() {
            fs::create_dir("config")?;
        }

        let toml_str = toml::to_string(&self.screens)?;
        fs::write("config/screens.toml", toml_str)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mutates process environment; the other tests build Config by hand and
    // never read env, so no serialization is needed.
    #[test]
    fn test_invalid_port_is_a_config_error() {
        env::set_var("JWT_SECRET", "s");
        env::set_var("ADMIN_USERNAME", "a");
        env::set_var("ADMIN_PASSWORD", "a");
        env::set_var("MANAGER_USERNAME", "m");
        env::set_var("MANAGER_PASSWORD", "m");
        env::set_var("PORT", "not-a-port");

        let err = Config::load().unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {:?}", err);
        assert!(err.to_string().contains("PORT"));

        env::remove_var("PORT");
    }
}
