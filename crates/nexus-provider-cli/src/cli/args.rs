use clap::{Args, Parser, Subcommand};
use nexus_provider::ProviderConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "nexus-provider",
    version,
    about = "Manage Nexus Repository capabilities and content selectors from plan/state JSON"
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Nexus base URL (without /service/rest)
    #[arg(long, env = "NEXUS_URL", default_value = "http://localhost:8081", global = true)]
    pub url: String,

    #[arg(long, env = "NEXUS_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(long, env = "NEXUS_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Server version hint, e.g. "3.84.0-01 (PRO)"; skips the version probe
    #[arg(long, env = "NEXUS_VERSION", global = true)]
    pub server_version: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "NEXUS_TIMEOUT", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Skip TLS certificate verification
    #[arg(long, env = "NEXUS_INSECURE", global = true)]
    pub insecure: bool,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> ProviderConfig {
        let mut config = ProviderConfig::default()
            .with_url(self.url.clone())
            .with_credentials(
                self.username.clone().unwrap_or_default(),
                self.password.clone().unwrap_or_default(),
            )
            .with_timeout_secs(self.timeout);
        if let Some(version) = &self.server_version {
            config = config.with_server_version(version.clone());
        }
        config.insecure = self.insecure;
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List resource and data source type names
    Resources,
    /// Print the schema of a resource type as JSON
    Schema(SchemaArgs),
    /// Check a plan without contacting the server
    Validate(PlanArgs),
    Create(PlanArgs),
    Read(StateArgs),
    Update(UpdateArgs),
    Delete(StateArgs),
    /// Build state for an existing object (capability id or selector name)
    Import(ImportArgs),
    /// Read a data source
    Data(DataArgs),
    Version,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Resource type, e.g. capability_base_url
    pub type_name: String,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    pub type_name: String,

    /// Plan JSON file ("-" for stdin)
    #[arg(long)]
    pub plan: PathBuf,
}

#[derive(Args, Debug)]
pub struct StateArgs {
    pub type_name: String,

    /// State JSON file ("-" for stdin)
    #[arg(long)]
    pub state: PathBuf,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub type_name: String,

    #[arg(long)]
    pub plan: PathBuf,

    #[arg(long)]
    pub state: PathBuf,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub type_name: String,

    /// Capability id or content selector name
    pub id: String,
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// content_selector or content_selectors
    pub type_name: String,

    /// Data source config JSON file; defaults to {}
    #[arg(long)]
    pub config: Option<PathBuf>,
}
