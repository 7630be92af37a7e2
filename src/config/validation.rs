//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Route entries are absolute paths
//! - Origins and identity endpoints are parseable URLs
//! - Value ranges (timeouts > 0, addresses valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::tenant::TenantType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: route entry {value:?} must start with '/'")]
    RelativePath { field: String, value: String },

    #[error("{field}: invalid URL {value:?}")]
    InvalidUrl { field: String, value: String },

    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: String, value: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: String },

    #[error("identity.profile_url must contain {{user_id}}")]
    MissingUserIdPlaceholder,
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstream.address", &config.upstream.address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    for tenant in TenantType::ALL {
        if let Some(origin) = config.app.origin_for(tenant) {
            check_url(&mut errors, &format!("app origin ({tenant})"), origin);
        }
    }

    let routes = &config.routes;
    check_paths(&mut errors, "routes.public", &routes.public);
    check_path(&mut errors, "routes.sign_in_path", &routes.sign_in_path);
    check_path(&mut errors, "routes.sign_up_path", &routes.sign_up_path);
    for tenant in TenantType::ALL {
        let field = match tenant {
            TenantType::Main => "routes.protected.authenticated".to_string(),
            other => format!("routes.protected.{other}"),
        };
        check_paths(&mut errors, &field, routes.protected.for_tenant(tenant));
    }
    for rule in &routes.access {
        check_path(&mut errors, "routes.access.prefix", &rule.prefix);
    }

    if config.identity.enabled {
        check_url(&mut errors, "identity.session_url", &config.identity.session_url);
        if !config.identity.profile_url.contains("{user_id}") {
            errors.push(ValidationError::MissingUserIdPlaceholder);
        } else {
            let probe = config.identity.profile_url.replace("{user_id}", "probe");
            check_url(&mut errors, "identity.profile_url", &probe);
        }
        if config.identity.timeout_ms == 0 {
            errors.push(ValidationError::ZeroTimeout {
                field: "identity.timeout_ms".to_string(),
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.request_secs".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_paths(errors: &mut Vec<ValidationError>, field: &str, paths: &[String]) {
    for path in paths {
        check_path(errors, field, path);
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &str, path: &str) {
    if !path.starts_with('/') {
        errors.push(ValidationError::RelativePath {
            field: field.to_string(),
            value: path.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if Url::parse(value).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}
