use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use huddle::client::{RelayClient, RoomPresence};
use huddle::model::ServerEvent;
use huddle::server::ServerConfig;
use huddle::utils::random_nickname;
use huddle::{Nickname, RoomId};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle", about = "Room chat and WebRTC signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server.
    Serve {
        /// Overrides HUDDLE_BIND.
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Overrides HUDDLE_HISTORY_LIMIT.
        #[arg(long)]
        history_limit: Option<usize>,
    },

    /// Print random nicknames.
    Nickname {
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    /// Join a room from the terminal. `/nick NAME` renames, `/quit` leaves.
    Chat {
        #[arg(long, default_value = "ws://127.0.0.1:3000/ws")]
        url: String,

        #[arg(long)]
        room: i64,

        #[arg(long)]
        nickname: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve {
            bind,
            history_limit,
        } => {
            let mut config = ServerConfig::from_env().context("Invalid relay configuration")?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(limit) = history_limit {
                config.history_limit = limit;
            }

            println!(
                "{} {}",
                "Starting huddle relay on".green().bold(),
                config.bind_addr
            );
            huddle::server::serve(config).await?;
        }

        Commands::Nickname { count } => {
            for _ in 0..count {
                println!("{}", random_nickname());
            }
        }

        Commands::Chat {
            url,
            room,
            nickname,
        } => {
            let nickname = match nickname {
                Some(n) => Nickname::try_from(n).context("Invalid nickname")?,
                None => random_nickname(),
            };
            chat(&url, RoomId(room), nickname).await?;
        }
    }

    Ok(())
}

async fn chat(url: &str, room: RoomId, nickname: Nickname) -> Result<()> {
    let (client, mut events) = RelayClient::connect(url)
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;

    let mut presence = RoomPresence::new();
    presence.set_own(nickname.clone());
    client.join_room(room, nickname)?;
    info!("Joined room {}", room);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    println!("{}", "Relay closed the connection".red());
                    break;
                };
                presence.apply(&event);
                print_event(&event);
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "/quit" {
                    break;
                }

                let Some(current) = presence.own().cloned() else { break };
                if let Some(candidate) = line.strip_prefix("/nick ") {
                    match presence.validate_rename(candidate) {
                        Ok(Some(renamed)) => {
                            client.change_nickname(room, current, renamed.clone())?;
                            presence.set_own(renamed);
                        }
                        Ok(None) => {}
                        Err(e) => println!("{}", e.to_string().yellow()),
                    }
                } else {
                    client.send_message(room, current, line, None)?;
                }
            }
        }
    }

    client.close();
    Ok(())
}

fn print_event(event: &ServerEvent) {
    match event {
        ServerEvent::MessageHistory(messages) => {
            for m in messages {
                println!("{} {}", format!("{}:", m.nickname).dimmed(), m.content.dimmed());
            }
        }
        ServerEvent::NewMessage(m) => {
            println!("{} {}", format!("{}:", m.nickname).cyan().bold(), m.content);
        }
        ServerEvent::UserJoined(n) => println!("{}", format!("* {} joined", n.nickname).green()),
        ServerEvent::UserLeft(n) => println!("{}", format!("* {} left", n.nickname).yellow()),
        ServerEvent::NicknameChanged {
            old_nickname,
            new_nickname,
        } => println!(
            "{}",
            format!("* {old_nickname} is now {new_nickname}").blue()
        ),
        ServerEvent::Error(notice) => println!("{}", notice.red()),
        _ => {}
    }
}
