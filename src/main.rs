// ABOUTME: CLI entrypoint for octomirror command
// ABOUTME: Handles error exit codes and command dispatch

use clap::Parser;
use octomirror::{
    api::GithubClient,
    auth::resolve_token,
    cli::{Cli, Commands},
    config::Settings,
    notice::NoticeManager,
    storage::Vault,
    sync::SyncEngine,
    Error, Result,
};
use std::thread;
use std::time::Duration;

fn main() {
    if let Err(e) = run() {
        eprintln!("octomirror: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command() {
        Commands::Sync => {
            let settings = Settings::load(cli.config.clone())?;
            let notices = NoticeManager::new(settings.sync_notice_mode);
            let client = build_client(&cli, &settings)?;
            let vault = open_vault(&cli, &settings)?;

            let engine = SyncEngine::new(&settings, &client, &vault, &notices);
            engine.sync_all()?;
        }
        Commands::Watch { every } => {
            let settings = Settings::load(cli.config.clone())?;
            let minutes = match every {
                Some(m) if m > 0 => m,
                _ if settings.sync_interval > 0 => settings.sync_interval,
                _ => {
                    return Err(Error::Config(
                        "No sync interval configured. Pass --every or set syncInterval".into(),
                    ))
                }
            };

            let notices = NoticeManager::new(settings.sync_notice_mode);
            let client = build_client(&cli, &settings)?;
            let vault = open_vault(&cli, &settings)?;
            let engine = SyncEngine::new(&settings, &client, &vault, &notices);

            if settings.sync_on_startup {
                if let Err(e) = engine.sync_all() {
                    notices.error(&format!("Sync failed: {}", e));
                }
            }
            loop {
                thread::sleep(Duration::from_secs(minutes * 60));
                if let Err(e) = engine.sync_all() {
                    notices.error(&format!("Sync failed: {}", e));
                }
            }
        }
        Commands::Repos => {
            let settings = Settings::load(cli.config.clone())?;
            if settings.repositories.is_empty() {
                println!("No repositories configured");
            }
            for repo in &settings.repositories {
                let mut tracked = Vec::new();
                if repo.track_issues {
                    tracked.push(format!("issues ({})", repo.issue_update_mode.as_str()));
                }
                if repo.track_pull_request {
                    tracked.push(format!(
                        "pull requests ({})",
                        repo.pull_request_update_mode.as_str()
                    ));
                }
                if tracked.is_empty() {
                    println!("{}: nothing tracked", repo.repository);
                } else {
                    println!("{}: {}", repo.repository, tracked.join(", "));
                }
            }
        }
        Commands::Init => {
            let path = Settings::config_path(cli.config.clone())?;
            if path.exists() {
                return Err(Error::Config(format!(
                    "Config already exists at {}",
                    path.display()
                )));
            }
            let written = Settings::default().save(Some(path))?;
            println!("Wrote starter config to {}", written.display());
        }
    }

    Ok(())
}

fn build_client(cli: &Cli, settings: &Settings) -> Result<GithubClient> {
    let token = resolve_token(cli.token.clone(), settings)?;
    let mut client = GithubClient::new(token, Some(cli.api_base.clone()))?;

    if cli.no_throttle {
        client = client.disable_throttle();
    } else if let Some((min, max)) = cli.throttle_ms {
        client = client.with_throttle(min, max);
    }

    Ok(client)
}

fn open_vault(cli: &Cli, settings: &Settings) -> Result<Vault> {
    Vault::new(cli.vault.clone().or_else(|| settings.vault_dir.clone()))
}
