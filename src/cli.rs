use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "watermark-bot")]
#[command(author, version, about = "Telegram bot that overlays your watermark onto photos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot
    Run {
        /// Receive updates through WEBHOOK_URL instead of long polling
        #[arg(long)]
        webhook: bool,
    },

    /// Apply database migrations and exit
    Migrate,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["watermark-bot"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_run_with_webhook() {
        let cli = Cli::try_parse_from(["watermark-bot", "run", "--webhook"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Run { webhook: true }));
    }

    #[test]
    fn test_migrate() {
        let cli = Cli::try_parse_from(["watermark-bot", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }
}
