//! `freebox chat send|messages|rooms` – chat over the REST endpoints.

use anyhow::Result;
use freebox_core::api;
use freebox_core::events::Event;
use url::Url;

use super::{blocking, printer_bus};
use crate::cli::ChatCommand;

pub async fn run_chat(server: &Url, command: ChatCommand) -> Result<()> {
    let (bus, _) = printer_bus();
    let base = server.clone();
    match command {
        ChatCommand::Send {
            message,
            room,
            username,
        } => {
            let sent = blocking(move || {
                api::post_message(&base, username.as_deref(), &message, &room)
            })
            .await?;
            bus.emit(&Event::ChatMessage(sent));
        }
        ChatCommand::Messages { room, limit } => {
            let label = room.clone();
            let messages = blocking(move || api::fetch_messages(&base, &room, limit)).await?;
            if messages.is_empty() {
                println!("No messages in {label} yet.");
            }
            // Server order is newest first.
            for message in messages.into_iter().rev() {
                bus.emit(&Event::ChatMessage(message));
            }
        }
        ChatCommand::Rooms => {
            let rooms = blocking(move || api::list_rooms(&base)).await?;
            for room in rooms {
                if room.description.is_empty() {
                    println!("{:<12} {}", room.id, room.name);
                } else {
                    println!("{:<12} {}  ({})", room.id, room.name, room.description);
                }
            }
        }
    }
    Ok(())
}
