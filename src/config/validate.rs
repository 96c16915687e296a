use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if let Some(auth) = cfg.auth.as_ref() {
        if auth.jwt_secret.trim().is_empty() {
            errors.push("auth.jwt_secret must not be empty".to_string());
        }

        if let Some(refresh_secret) = auth.jwt_refresh_secret.as_ref() {
            if refresh_secret.trim().is_empty() {
                errors.push(
                    "auth.jwt_refresh_secret must not be empty when set".to_string(),
                );
            }
        }
    }

    if let Some(google) = cfg.google.as_ref() {
        if google.client_id.trim().is_empty() {
            errors.push("google.client_id must not be empty".to_string());
        }

        if google.client_secret.trim().is_empty() {
            errors.push("google.client_secret must not be empty".to_string());
        }

        if google.redirect_uri.trim().is_empty() {
            errors.push("google.redirect_uri must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::config::{AppConfig, AuthConfig, DatabaseConfig, GoogleConfig};

    #[test]
    fn default_config_is_valid() {
        let cfg = AppConfig::default();
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn rejects_empty_jwt_secret() {
        let cfg = AppConfig {
            auth: Some(AuthConfig {
                jwt_secret: "  ".to_string(),
                jwt_refresh_secret: None,
            }),
            ..Default::default()
        };

        let err = validate(&cfg).expect_err("validation should fail");
        assert!(err.to_string().contains("auth.jwt_secret"));
    }

    #[test]
    fn rejects_min_idle_above_max_connections() {
        let cfg = AppConfig {
            database: Some(DatabaseConfig {
                url: "postgres://localhost/sprintdeck".to_string(),
                max_connections: 2,
                min_idle: 5,
            }),
            ..Default::default()
        };

        let err = validate(&cfg).expect_err("validation should fail");
        assert!(err.to_string().contains("database.min_idle"));
    }

    #[test]
    fn rejects_blank_google_fields() {
        let cfg = AppConfig {
            google: Some(GoogleConfig {
                client_id: "".to_string(),
                client_secret: "secret".to_string(),
                redirect_uri: "https://example.com/cb".to_string(),
                frontend_callback_url: "/".to_string(),
            }),
            ..Default::default()
        };

        let err = validate(&cfg).expect_err("validation should fail");
        assert!(err.to_string().contains("google.client_id"));
    }
}
