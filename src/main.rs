mod config;
mod feedapi;
mod identity;
mod metrics;
mod repl;
mod storage;
mod sync;
mod twoface;

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate guard;

use crate::config::Config;
use crate::feedapi::http::HttpClient;
use crate::identity::firebase::FirebaseProvider;
use crate::storage::file::FileStorage;
use crate::sync::Synchronizer;
use std::io::{self, BufRead};
use std::time::Duration;
use tracing::{info, Level};

fn main() {
    let args: Vec<_> = std::env::args().collect();
    guard!(let [_, config_file_path, ..] = &args[..] else {
        eprintln!("First argument should be path to config file");
        return
    });

    let config = match Config::from_file(config_file_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    // Set up logger output. Logs go to stderr, stdout belongs to the front end.
    let level = config.log_level.parse().unwrap_or(Level::INFO);
    let subscriber_builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr);
    if config.human_logs {
        subscriber_builder.init();
    } else {
        subscriber_builder.json().init();
    }

    info!("starting feedsync");

    let mut sys = actix_rt::System::new("feedsync");
    // block_on wants a 'static future, so the config and stdin move into it.
    let result = sys.block_on(async move {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        run(config, &mut lines).await
    });
    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(
    config: Config,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let api = HttpClient::new(&config.api_base, timeout, config.max_body_size)?;
    let identity =
        FirebaseProvider::new(&config.identity.endpoint, &config.identity.api_key, timeout)?;
    let storage = FileStorage::new(&config.storage_dir)?;
    let sync = Synchronizer::new(api, identity, storage);

    info!(api_base = config.api_base.as_str(), "feed API configured");
    repl::serve(&sync, lines, &mut io::stdout()).await
}
