// CLI argument parsing and definitions

use clap::{Parser, Subcommand};
use kb_orchestrator::{Procedure, WorkflowParams};
use std::path::PathBuf;

/// Environment variable that overrides `worker.bind_addr` when `--bind` is absent.
pub const BIND_ENV: &str = "KB_WORKER_BIND";

#[derive(Debug, Clone, Parser)]
#[command(name = "kb-api")]
#[command(about = "Kuboard namespace creation and authorization worker")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to config.yaml (defaults to $KB_CONFIG, then config/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the workflow HTTP API (the default)
    Serve {
        /// Override worker.bind_addr and $KB_WORKER_BIND
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one procedure to completion and print its report
    Run {
        /// KuboardNamespaceAuthorize, KuboardNamespaceCreate, or a kebab-case alias
        procedure: Procedure,
        #[arg(long)]
        cluster: String,
        #[arg(long)]
        namespace: String,
        /// LDAP user name to authorize
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "view")]
        role: String,
    },
}

impl Args {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { bind: None })
    }
}

impl Command {
    /// Procedure and parameters for `run`.
    pub fn workflow(&self) -> Option<(Procedure, WorkflowParams)> {
        match self {
            Command::Run {
                procedure,
                cluster,
                namespace,
                user,
                role,
            } => Some((
                *procedure,
                WorkflowParams {
                    cluster_id: cluster.clone(),
                    namespace: namespace.clone(),
                    user: user.clone(),
                    role: role.clone(),
                },
            )),
            Command::Serve { .. } => None,
        }
    }
}

/// Listen address: `--bind`, then `KB_WORKER_BIND`, then the configured one.
pub fn bind_addr(flag: Option<String>, configured: &str) -> String {
    flag.or_else(|| std::env::var(BIND_ENV).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| configured.to_string())
}
