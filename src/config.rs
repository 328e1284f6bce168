use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "message-board")]
#[command(about = "Shared message board with throttled posting and reserved names")]
pub struct Args {
    // Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    // Reserved usernames, one `username=hash` per line
    #[arg(short, long, default_value = "credentials.env")]
    pub credentials: PathBuf,

    // Global max accepted requests per window
    #[arg(long, default_value_t = 250)]
    pub global_capacity: usize,

    // Global window in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub global_window: u64,

    // Per-client max posts per window
    #[arg(long, default_value_t = 5)]
    pub client_limit: usize,

    // Per-client window in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub client_window: u64,

    // Upper bound on tracked client windows
    #[arg(long, default_value_t = 10_000)]
    pub max_clients: usize,

    // Idle client sweep interval in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval: u64,

    // Default log filter, RUST_LOG wins when set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    // Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    // Print a credential hash for PLAINTEXT and exit
    #[arg(long, value_name = "PLAINTEXT")]
    pub hash_password: Option<String>,
}

impl Args {
    pub fn global_window(&self) -> Duration {
        Duration::from_secs(self.global_window)
    }

    pub fn client_window(&self) -> Duration {
        Duration::from_secs(self.client_window)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
