//! Main Telegram bot implementation.

use std::sync::Arc;

use chrono::Utc;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use tracing::{info, warn};

use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::handlers::{handle_command, handle_message, handle_unknown_command, Command};
use crate::scheduler::{digest_loop, DigestSchedule};
use crate::state::{create_shared_state, BotState};

/// The project manager bot.
pub struct ProjectBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Shared state across handlers.
    state: Arc<BotState>,
    /// When the daily digest fires.
    schedule: DigestSchedule,
    /// Run the digest once after startup.
    summary_on_startup: bool,
}

impl ProjectBot {
    /// Create a new bot from configuration.
    ///
    /// Fails with [`BotError::NoToken`] when no bot token is configured; every
    /// other missing setting only degrades the features that need it.
    pub fn new(config: &BotConfig) -> Result<Self> {
        let token = config.require_token()?;
        let bot = Bot::new(token);
        let schedule = DigestSchedule::parse(&config.digest_cron, &config.digest_timezone)?;
        let state = create_shared_state(config, Arc::new(bot.clone()))?;

        Ok(Self {
            bot,
            state,
            schedule,
            summary_on_startup: config.summary_on_startup,
        })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| BotError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Shared state used by the handlers.
    pub fn state(&self) -> &Arc<BotState> {
        &self.state
    }

    /// Start the bot in polling mode. Returns after Ctrl+C.
    ///
    /// Updates from one chat are handled in arrival order; different chats are
    /// handled concurrently.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting bot in polling mode...");

        // Daily digest task
        let digest = Arc::clone(self.state.digest());
        let schedule = self.schedule.clone();
        tokio::spawn(async move {
            digest_loop(schedule, digest).await;
        });

        if self.summary_on_startup {
            info!("Manually triggering daily commit summary on startup");
            let digest = Arc::clone(self.state.digest());
            tokio::spawn(async move {
                let outcome = digest.run(Utc::now()).await;
                info!(?outcome, "Startup digest finished");
            });
        }

        let state_for_commands = Arc::clone(&self.state);
        let state_for_messages = Arc::clone(&self.state);

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let state = Arc::clone(&state_for_commands);
                        info!(chat_id = %msg.chat.id, "Command matched: {:?}", cmd);
                        async move { handle_command(bot, msg, cmd, state).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        // Starts with / but didn't parse as a known command
                        msg.text().map(|t| t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(|bot: Bot, msg: Message| async move {
                        handle_unknown_command(bot, msg).await
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| {
                        msg.text().map(|t| !t.starts_with('/')).unwrap_or(false)
                    })
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_messages);
                        async move { handle_message(bot, msg, state).await }
                    }),
            );

        info!("Bot is running! Press Ctrl+C to stop.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
