//! Command and message handlers for the Telegram bot.

use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::digest::DigestOutcome;
use crate::replies;
use crate::state::BotState;
use crate::transport::deliver;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,

    #[command(description = "Show this help message")]
    Help,

    #[command(description = "Send the commit summary for the last 24 hours")]
    Summary,
}

/// Handle the /start command.
pub async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
    info!(chat_id = %msg.chat.id, user = ?msg.from.as_ref().map(|u| &u.username), "START command received");
    deliver(&bot, msg.chat.id, replies::WELCOME).await;
    Ok(())
}

/// Handle the /help command.
pub async fn handle_help(bot: Bot, msg: Message) -> ResponseResult<()> {
    debug!(chat_id = %msg.chat.id, "HELP command received");
    let help_text = replies::help(&Command::descriptions().to_string());
    deliver(&bot, msg.chat.id, &help_text).await;
    Ok(())
}

/// Handle the /summary command: run the digest now.
pub async fn handle_summary(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    info!(chat_id = %msg.chat.id, "SUMMARY command received");
    deliver(
        &bot,
        msg.chat.id,
        "Generating commit summary for the last 24 hours...",
    )
    .await;

    if state.digest().run(Utc::now()).await == DigestOutcome::NoTarget {
        deliver(
            &bot,
            msg.chat.id,
            "⚠️ TARGET_CHAT_ID is not configured, so there is nowhere to send the summary.",
        )
        .await;
    }
    Ok(())
}

/// Handle commands that start with / but are not registered.
pub async fn handle_unknown_command(bot: Bot, msg: Message) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        info!(cmd = %text, "Unrecognized command - sending response");
        deliver(&bot, msg.chat.id, &replies::unknown_command(text)).await;
    }
    Ok(())
}

/// Handle regular (non-command) text messages.
pub async fn handle_message(bot: Bot, msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    debug!(chat_id = %msg.chat.id, text = %text, "Got message");
    if let Some(reply) = state.router().route(msg.chat.id, text).await {
        deliver(&bot, msg.chat.id, &reply).await;
    }
    Ok(())
}

/// Dispatch commands to appropriate handlers.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg).await,
        Command::Help => handle_help(bot, msg).await,
        Command::Summary => handle_summary(bot, msg, state).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse() {
        assert!(matches!(Command::parse("/start", "pmbot"), Ok(Command::Start)));
        assert!(matches!(Command::parse("/help", "pmbot"), Ok(Command::Help)));
        assert!(matches!(
            Command::parse("/summary@pmbot", "pmbot"),
            Ok(Command::Summary)
        ));
        assert!(Command::parse("/connect", "pmbot").is_err());
    }

    #[test]
    fn test_descriptions_list_all_commands() {
        let descriptions = Command::descriptions().to_string();
        assert!(descriptions.contains("/start"));
        assert!(descriptions.contains("/help"));
        assert!(descriptions.contains("/summary"));
    }
}
