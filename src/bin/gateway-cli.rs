use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

use tenant_gateway::config::{load_config, GatewayConfig};
use tenant_gateway::identity::{SessionCredentials, StaticIdentityProvider};
use tenant_gateway::routing::{
    classify, rewrite_path, RequestContext, Role, RoutePolicy, RoutingEngine,
};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Offline inspection of the tenant gateway's routing policy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a request would be routed
    Explain {
        /// Host header, e.g. creator.example.com
        #[arg(long)]
        host: String,
        /// Request target, e.g. /campaigns?status=active
        #[arg(long, default_value = "/")]
        path: String,
        /// Pretend the caller is signed in with this role
        #[arg(long)]
        role: Option<Role>,
        /// Configuration file (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Load and validate a configuration file
    CheckConfig { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Explain {
            host,
            path,
            role,
            config,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => GatewayConfig::default(),
            };
            let report = explain(&config, &host, &path, role).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::CheckConfig { path } => match load_config(&path) {
            Ok(_) => println!("{}: ok", path.display()),
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

async fn explain(
    config: &GatewayConfig,
    host: &str,
    target: &str,
    role: Option<Role>,
) -> serde_json::Value {
    let policy = Arc::new(RoutePolicy::from_config(&config.routes, &config.app));
    let identity = Arc::new(match role {
        Some(role) => StaticIdentityProvider::signed_in("cli-user", role),
        None => StaticIdentityProvider::anonymous(),
    });
    let engine = RoutingEngine::new(policy.clone(), identity.clone(), Duration::from_secs(1));

    let tenant = classify(host);
    let rewritten = rewrite_path(target, tenant);
    let ctx = RequestContext::new(host, target);
    let outcome = engine.decide(&ctx, &SessionCredentials::default()).await;

    json!({
        "host": host,
        "target": target,
        "tenant": tenant,
        "rewritten": rewritten,
        "public": policy.is_public(&rewritten),
        "protected": policy.is_protected(&rewritten),
        "role": role,
        "decision": outcome.decision,
        "identity_calls": identity.total_calls(),
    })
}
