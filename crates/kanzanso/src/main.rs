//! `kanzanso` - CLI for the kanzanso wellness service
//!
//! This binary runs the HTTP server and provides maintenance commands for the
//! database and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use kanzanso::api::{self, AppState};
use kanzanso::cli::{Cli, Command, ConfigCommand, ServeCommand};
use kanzanso::{init_logging, seed, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, &serve_cmd).await,
        Command::Seed => handle_seed(&config),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening database {}", path.display()))
}

async fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    cmd.apply(&mut config);
    config.validate()?;

    let storage = open_storage(&config)?;
    seed::run(&storage, &config)?;

    let state = AppState::from_config(&config, storage)?;
    api::serve(&config, state).await?;
    Ok(())
}

fn handle_seed(config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    let storage = open_storage(config)?;
    let report = seed::run_at(&storage, config, chrono::Utc::now())?;

    if report.is_empty() {
        println!("Database already seeded, nothing to do.");
    } else {
        println!("Seeded {}", storage.path().display());
        println!("  Demo account:    {}", report.demo_user);
        println!("  Todos:           {}", report.todos);
        println!("  Journal entries: {}", report.journal_entries);
        println!("  Quotes:          {}", report.quotes);
        println!("  Weather moods:   {}", report.weather_moods);
        println!("  Questions:       {}", report.questions);
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("kanzanso status");
        println!("---------------");
        println!("Database:      {}", storage.path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Documents:     {}", stats.total_documents);
        for collection in &stats.collections {
            println!("  {:<20} {}", collection.name, collection.documents);
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let shown = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", shown.bind_address());
                println!("  CORS origins:       {}", display_origins(&shown));
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", shown.database_path().display());
                println!();
                println!("[Auth]");
                println!("  Token TTL (hours):  {}", shown.auth.token_ttl_hours);
                println!("  Demo tokens:        {}", shown.auth.demo_tokens);
                println!(
                    "  Secret:             {}",
                    shown.auth.jwt_secret.as_deref().unwrap_or("(generated)")
                );
                println!();
                println!("[External]");
                println!("  Quote source:       {}", shown.quotes.external_enabled);
                println!("  Music catalog:      {}", shown.music_enabled());
                println!("  Music login:        {}", shown.music_login_enabled());
                println!();
                println!("[Seed]");
                println!("  Enabled:            {}", shown.seed.enabled);
                println!("  Demo email:         {}", shown.seed.demo_email);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)).and_then(|c| c.validate().map(|()| c)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn display_origins(config: &Config) -> String {
    if config.server.cors_origins.is_empty() {
        "any".to_string()
    } else {
        config.server.cors_origins.join(", ")
    }
}
