use clap::Parser;
use std::net::IpAddr;
use std::num::NonZeroUsize;

use users_api::Config;

/// Serve the users HTTP API
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
}

impl Cli {
    pub fn override_config(&self, config: &mut Config) {
        if let Some(address) = self.address {
            config.address = address;
        }

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
    }
}
