use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use storefront_api::{
    config, db,
    events::{Event, EventSender},
    services::{access::AccessService, users::UserService},
};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "storefront-admin", about = "Storefront maintenance tasks", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Insert the built-in staff access levels that do not exist yet
    SeedAccessLevels,
    /// Create a staff account at the given access level
    CreateAdmin(CreateAdminArgs),
}

#[derive(Args)]
struct CreateAdminArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long, default_value = "Store")]
    first_name: String,
    #[arg(long, default_value = "Admin")]
    last_name: String,
    #[arg(long, default_value_t = 1)]
    level: i32,
}

#[derive(Serialize)]
struct CreatedAccount {
    id: uuid::Uuid,
    email: String,
    access_level: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config().context("failed to load application config")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let db_pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;
    let db = Arc::new(db_pool);

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&db).await.context("migration failed")?;
            println!("Migrations applied");
        }
        Commands::SeedAccessLevels => {
            let inserted = AccessService::new(db.clone())
                .seed_defaults()
                .await
                .context("failed to seed access levels")?;
            if cli.json {
                print_json(&serde_json::json!({ "inserted": inserted }))?;
            } else {
                println!("Inserted {} access level(s)", inserted);
            }
        }
        Commands::CreateAdmin(args) => {
            let (event_tx, mut event_rx) = mpsc::channel::<Event>(8);
            tokio::spawn(async move {
                while let Some(event) = event_rx.recv().await {
                    debug!(target: "storefront_admin", event = ?event, "received event");
                }
            });
            let users = UserService::new(db.clone(), Arc::new(EventSender::new(event_tx)));
            let user = users
                .create_user_with_level(
                    &args.email,
                    &args.password,
                    &args.first_name,
                    &args.last_name,
                    args.level,
                )
                .await
                .context("failed to create account")?;

            let created = CreatedAccount {
                id: user.id,
                email: user.email,
                access_level: user.access_level,
            };
            if cli.json {
                print_json(&created)?;
            } else {
                println!(
                    "Created {} (id {}) at access level {}",
                    created.email, created.id, created.access_level
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
