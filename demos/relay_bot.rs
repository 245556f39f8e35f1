//! Bot that answers private messages
//!
//! Usage:
//! ```bash
//! REALMLINK_ACCESS_TOKEN=... REALMLINK_CLIENT_TOKEN=... \
//!     cargo run --example relay_bot -- config.json
//! ```
//!
//! The config file is created with defaults on first run. Set `RUST_LOG` to
//! adjust verbosity (`RUST_LOG=realmlink_client=debug`).

use realmlink::client::chat::{ChatKind, ChatMessage};
use realmlink::client::config::ClientConfig;
use realmlink::client::credentials::{Credentials, StaticCredentials};
use realmlink::client::dispatch::{Dispatcher, SubscriberError};
use realmlink::client::plugin::{Extension, ExtensionError};
use realmlink::client::{Client, ClientHandle};
use realmlink::protocol::messages::incoming::{MapInfo, Text};
use realmlink::protocol::messages::outgoing::PlayerText;
use tracing_subscriber::EnvFilter;

/// Answers every private message with a canned reply
struct Relay {
    reply: String,
}

impl Extension for Relay {
    fn name(&self) -> &str {
        "relay"
    }

    fn install(&mut self, dispatcher: &mut Dispatcher, handle: &ClientHandle) -> Result<(), ExtensionError> {
        let handle = handle.clone();
        let reply = self.reply.clone();
        dispatcher.on::<Text, _>(move |text| {
            let message = ChatMessage::from_text(text);
            if message.kind != ChatKind::Private || message.sender.is_empty() {
                return Ok(());
            }
            let answer = PlayerText {
                text: format!("/tell {} {}", message.sender, reply),
            };
            handle
                .try_send(&answer)
                .map_err(|e| SubscriberError::new(e.to_string()))
        });

        dispatcher.on::<MapInfo, _>(|info| {
            tracing::info!(map = %info.name, players = info.max_players, "Entered map");
            Ok(())
        });
        Ok(())
    }
}

fn credentials_from_env() -> Credentials {
    let var = |name: &str| std::env::var(name).unwrap_or_default();
    Credentials {
        access_token: var("REALMLINK_ACCESS_TOKEN"),
        client_token: var("REALMLINK_CLIENT_TOKEN"),
        character_id: var("REALMLINK_CHARACTER_ID").parse().ok(),
        ..Credentials::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = ClientConfig::load(&path)?;
    config.save(&path)?;

    let mut client = Client::new(config, StaticCredentials::new(credentials_from_env()))?.with_config_path(&path);
    client.add_extension(Relay {
        reply: "I am a bot, my owner will get back to you".to_string(),
    });

    let handle = client.handle();
    let mut session = tokio::spawn(client.run());

    tokio::select! {
        result = &mut session => result??,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, disconnecting");
            handle.disconnect().await?;
            session.await??;
        }
    }
    Ok(())
}
