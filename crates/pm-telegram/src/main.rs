//! Project manager bot binary.
//!
//! Start the bot with:
//! ```bash
//! BOT_TOKEN=xxx GITHUB_PAT=xxx GITHUB_OWNER=acme GITHUB_REPO=widgets cargo run -p pm-telegram
//! ```

use std::time::Duration;

use clap::Parser;
use pm_telegram::config::{DEFAULT_DIGEST_CRON, DEFAULT_DIGEST_TIMEZONE};
use pm_telegram::{BotConfig, ProjectBot};
use pm_tracker::{GitHubSettings, DEFAULT_API_URL};
use teloxide::types::ChatId;
use tracing_subscriber::EnvFilter;

/// Project manager bot - manage GitHub issues from Telegram
#[derive(Parser, Debug)]
#[command(name = "pm-telegram")]
#[command(about = "Telegram bot that manages GitHub issues and posts a daily commit digest")]
struct Args {
    /// Telegram bot token from @BotFather
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_PAT", hide_env_values = true)]
    github_token: Option<String>,

    /// Repository owner
    #[arg(long, env = "GITHUB_OWNER")]
    github_owner: Option<String>,

    /// Repository name
    #[arg(long, env = "GITHUB_REPO")]
    github_repo: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    github_api_url: String,

    /// Chat that receives the daily commit digest
    #[arg(long, env = "TARGET_CHAT_ID", allow_hyphen_values = true)]
    target_chat_id: Option<i64>,

    /// Digest schedule (cron with seconds field)
    #[arg(long, env = "DIGEST_CRON", default_value = DEFAULT_DIGEST_CRON)]
    digest_cron: String,

    /// Timezone for the digest schedule and commit times
    #[arg(long, env = "DIGEST_TIMEZONE", default_value = DEFAULT_DIGEST_TIMEZONE)]
    digest_timezone: String,

    /// Seconds before an abandoned #assign dialogue is reset (0 = never)
    #[arg(long, env = "DIALOGUE_TIMEOUT_SECS", default_value = "900")]
    dialogue_timeout_secs: u64,

    /// Send the digest once right after startup
    #[arg(long, env = "RUN_MANUAL_SUMMARY_ON_STARTUP")]
    summary_on_startup: bool,

    /// Use an in-memory tracker instead of GitHub
    #[arg(long)]
    offline: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> BotConfig {
        let mut config = BotConfig::new()
            .with_github(GitHubSettings {
                token: self.github_token,
                owner: self.github_owner,
                repo: self.github_repo,
                api_url: Some(self.github_api_url),
            })
            .with_digest_schedule(self.digest_cron, self.digest_timezone)
            .with_dialogue_timeout(Duration::from_secs(self.dialogue_timeout_secs))
            .with_summary_on_startup(self.summary_on_startup)
            .with_offline(self.offline);

        if let Some(token) = self.bot_token {
            config = config.with_bot_token(token);
        }
        if let Some(chat_id) = self.target_chat_id {
            config = config.with_target_chat(ChatId(chat_id));
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env.local or .env before clap reads the environment
    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let args = Args::parse();

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => "pm_telegram=info,pm_tracker=info,teloxide=warn",
        1 => "pm_telegram=debug,pm_tracker=debug,teloxide=info",
        2 => "pm_telegram=trace,pm_tracker=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = args.into_config();
    for warning in config.warnings() {
        tracing::warn!("{}", warning);
    }

    let bot = match ProjectBot::new(&config) {
        Ok(bot) => bot,
        Err(e) => {
            tracing::error!(error = %e, "FATAL: cannot start bot");
            return Err(e.into());
        }
    };

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[robot] Project Manager Bot");
            println!("   Bot: @{}", username);
            println!("   Repository: {}", bot.state().router().tracker().repository());
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n[phone] Send /help in Telegram to see the commands");
    println!("   Press Ctrl+C to stop\n");

    bot.start_polling().await?;

    Ok(())
}
