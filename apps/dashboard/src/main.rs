use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use shared::{domain::UserId, error::ApiException};
use sor_api::{ApiContext, SystemClock};
use storage::{Seed, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod render;
mod shell;

use controller::Controller;
use render::RenderOptions;

#[derive(Parser, Debug)]
#[command(name = "sor-dashboard", about = "School operation request dashboard")]
struct Cli {
    #[arg(long, default_value = "dashboard.toml")]
    config: PathBuf,
    /// User to act as on start-up.
    #[arg(long)]
    user: Option<String>,
    /// JSON seed replacing the built-in sample data.
    #[arg(long)]
    seed: Option<PathBuf>,
    /// Read commands from a file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load_settings(&cli.config);
    if let Some(user) = cli.user {
        settings.initial_user = user;
    }
    if let Some(seed) = cli.seed {
        settings.seed_path = Some(seed);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(io::stderr)
        .init();

    let storage = match &settings.seed_path {
        Some(path) => Storage::from_seed_file(path)?,
        None => Storage::new(Seed::builtin(Utc::now()))?,
    };
    info!(
        branches = storage.branches().len(),
        users = storage.users().len(),
        requests = storage.requests().len(),
        "store loaded"
    );

    let api = ApiContext::new(storage, SystemClock);
    let mut controller = Controller::new(api, &UserId::from(settings.initial_user.as_str()))
        .map_err(ApiException::from)
        .context("cannot start session")?;

    let opts = RenderOptions {
        currency: settings.currency.clone(),
        activity_limit: settings.activity_limit,
    };
    let mut stdout = io::stdout().lock();
    match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            shell::run(&mut controller, &opts, BufReader::new(file), &mut stdout)
        }
        None => shell::run(&mut controller, &opts, io::stdin().lock(), &mut stdout),
    }
}
