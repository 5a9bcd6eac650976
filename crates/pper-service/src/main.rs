//! `pper`: group membership administration and expiry sweeper.
//!
//! # Usage
//!
//! ```
//! pper serve
//! pper group create VIP --prefix VIP
//! pper player join 1f0c7e3a-5d6b-4c8e-9a31-2b7d4e6f8a90 Steve
//! pper player set-group Steve VIP 30d 12h
//! pper player info Steve --json
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pper_core::{duration::expiry_after, player::Player};
use pper_service::{App, LogNotifier, MembershipService, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "pper", version, about = "Group membership with timed expiry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pper.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run the expiry sweeper until interrupted.
  Serve,
  #[command(subcommand)]
  Group(GroupCommand),
  #[command(subcommand)]
  Player(PlayerCommand),
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
  Create {
    name:   String,
    #[arg(long, default_value = "")]
    prefix: String,
  },
  SetPrefix {
    name:   String,
    prefix: String,
  },
  List,
  /// Everyone who has ever held the group.
  Members { name: String },
}

#[derive(Subcommand, Debug)]
enum PlayerCommand {
  /// Register a connection, assigning the default group if needed.
  Join { uuid: Uuid, name: String },
  /// Move a player (uuid or display name) into a group.
  SetGroup {
    player:   String,
    group:    String,
    /// Lifetime tokens such as `30d 12h`; permanent if omitted.
    lifetime: Vec<String>,
  },
  Info {
    player: String,
    #[arg(long)]
    json:   bool,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to load {}", cli.config.display()))?;
  let path = settings.database_path.clone();
  let app = App::open(settings)
    .with_context(|| format!("failed to open store at {}", path.display()))?;

  match cli.command {
    Command::Serve => serve(&app).await,
    Command::Group(cmd) => group(&app, cmd),
    Command::Player(cmd) => player(&app, cmd),
  }
}

async fn serve(app: &App) -> Result<()> {
  let handle = app.sweeper(Arc::new(LogNotifier)).spawn();
  tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
  tracing::info!("shutting down");
  handle.shutdown().await;
  Ok(())
}

// ─── Groups ───────────────────────────────────────────────────────────────────

fn group(app: &App, cmd: GroupCommand) -> Result<()> {
  match cmd {
    GroupCommand::Create { name, prefix } => {
      let group = app.groups.create(&name, &prefix)?;
      println!("created {} (id {})", group.name, group.id);
    }
    GroupCommand::SetPrefix { name, prefix } => {
      let group = app.groups.update_prefix(&name, &prefix)?;
      println!("{} prefix is now {:?}", group.name, group.prefix);
    }
    GroupCommand::List => {
      for g in app.groups.all_groups() {
        println!("{:>4}  {:<16} {:?}", g.id, g.name, g.prefix);
      }
    }
    GroupCommand::Members { name } => {
      for p in app.groups.players_in_group(&name)? {
        println!("{}  {}", p.uuid, p.display_name);
      }
    }
  }
  Ok(())
}

// ─── Players ──────────────────────────────────────────────────────────────────

fn player(app: &App, cmd: PlayerCommand) -> Result<()> {
  let svc = &app.memberships;
  match cmd {
    PlayerCommand::Join { uuid, name } => {
      match svc.ensure_active(MembershipService::to_player(uuid, &name))? {
        Some(s) => println!("{}{} is in {}", s.display_prefix(), s.player_name, s.group_name),
        None => println!("{name} has no active group"),
      }
    }
    PlayerCommand::SetGroup { player, group, lifetime } => {
      let player = lookup(svc, &player)?;
      let group = app.groups.group_by_name(&group)?;
      let expires_at = if lifetime.is_empty() {
        None
      } else {
        Some(expiry_after(
          chrono::Utc::now(),
          lifetime.iter().map(String::as_str),
        )?)
      };
      let s = svc.add_membership(&player, &group, expires_at)?;
      match s.expires_at {
        Some(at) => println!("{} is in {} until {at}", s.player_name, s.group_name),
        None => println!("{} is in {}", s.player_name, s.group_name),
      }
    }
    PlayerCommand::Info { player, json } => {
      let player = lookup(svc, &player)?;
      let active = svc.resolve_active(&player.uuid)?;
      if json {
        let out = serde_json::json!({ "player": player, "active": active });
        println!("{}", serde_json::to_string_pretty(&out)?);
      } else {
        println!("{}  {}  first seen {}", player.uuid, player.display_name, player.created_at);
        match active {
          Some(s) => println!(
            "  {} since {}{}",
            s.group_name,
            s.since,
            s.expires_at.map(|e| format!(", expires {e}")).unwrap_or_default()
          ),
          None => println!("  no active group"),
        }
      }
    }
  }
  Ok(())
}

/// Resolve a uuid or display name to a stored player.
fn lookup(svc: &MembershipService, key: &str) -> Result<Player> {
  let found = match Uuid::parse_str(key) {
    Ok(uuid) => svc.find_player(&uuid.hyphenated().to_string())?,
    Err(_) => svc.find_player_by_name(key)?,
  };
  match found {
    Some(p) => Ok(p),
    None => bail!("unknown player {key:?}"),
  }
}
