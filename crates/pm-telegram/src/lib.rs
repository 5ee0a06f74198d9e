//! Telegram front-end for a GitHub issue tracker.
//!
//! Short `#` commands typed in a chat become tracker operations, and a daily
//! digest of recent commits is posted to one configured chat.
//!
//! # Environment Variables
//!
//! Required:
//! - `BOT_TOKEN`: Bot token from @BotFather
//!
//! Optional:
//! - `GITHUB_PAT`, `GITHUB_OWNER`, `GITHUB_REPO`: tracker access
//! - `TARGET_CHAT_ID`: chat that receives the daily digest
//! - `DIGEST_CRON` / `DIGEST_TIMEZONE`: digest schedule (default `0 0 7 * * *`, `Asia/Kolkata`)
//! - `DIALOGUE_TIMEOUT_SECS`: reset abandoned `#assign` dialogues (default 900, 0 = never)
//! - `RUN_MANUAL_SUMMARY_ON_STARTUP`: send the digest once on startup
//!
//! # Chat commands
//!
//! - `#todo <title>` - create an issue
//! - `#close <number>` / `#reopen <number>` - change an issue's state
//! - `#assign` - start a dialogue that asks for the issue number and the username
//! - `/start`, `/help`, `/summary`
//!
//! # Example
//!
//! ```no_run
//! use pm_telegram::{BotConfig, ProjectBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::new().with_bot_token("123:abc").with_offline(true);
//!     let bot = ProjectBot::new(&config)?;
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod digest;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod replies;
pub mod router;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod transport;

pub use bot::ProjectBot;
pub use config::BotConfig;
pub use digest::{format_digest, DigestOutcome, DigestService};
pub use error::{BotError, Result};
pub use router::CommandRouter;
pub use session::{ChatSession, DialogueStep, SessionStore};
pub use state::{create_shared_state, BotState};
pub use transport::{Notifier, TransportFailure};
