use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::{IsTerminal, Read};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use syuting_chat::config::Config;
use syuting_chat::events::MessageKind;
use syuting_chat::render::{self, LinkStyle};
use syuting_chat::session::{ChatSession, SubmitOutcome};
use syuting_chat::store::Message;
use syuting_chat::transport::WebhookClient;

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "SYUTING_LOG";

#[derive(Parser)]
#[command(name = "syuting-chat")]
#[command(version)]
#[command(about = "Chat with the syuting.film AI assistant", long_about = None)]
struct Cli {
    /// Assistant webhook URL, overriding the config file and SYUTING_ENDPOINT
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Send one message and print the rendered reply
    Send {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Render reply text locally, reading stdin when no text is given
    Render { text: Option<String> },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Render { text }) = cli.command {
        init_stderr_logging();
        let text = render_input(text, std::io::stdin().lock())?;
        println!("{}", format_reply(&text, stdout_link_style()));
        return Ok(());
    }

    let mut config = Config::load()?;
    config.apply_env_override(cli.endpoint);

    match cli.command {
        None | Some(Commands::Chat) => {
            init_file_logging(&config)?;
            syuting_chat::ui::run(config).await
        }
        Some(Commands::Send { text }) => {
            init_stderr_logging();
            send_once(&config, &text.join(" ")).await
        }
        Some(Commands::Config) => {
            println!("# {}", config.config_path().display());
            print!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);
            Ok(())
        }
        Some(Commands::Render { .. }) => Ok(()),
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// The TUI owns the terminal, so logs go to a file
fn init_file_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("syuting_chat=info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("syuting_chat=warn"))
        .with_writer(std::io::stderr)
        .init();
}

/// OSC 8 links only when stdout is a terminal
fn stdout_link_style() -> LinkStyle {
    if std::io::stdout().is_terminal() {
        LinkStyle::Osc8
    } else {
        LinkStyle::Inline
    }
}

/// Rendered reply text for stdout
fn format_reply(text: &str, links: LinkStyle) -> String {
    render::to_text(&render::layout(&render::render(text)), links)
}

/// Text given on the command line, or everything on `input`
fn render_input(text: Option<String>, mut input: impl Read) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            input
                .read_to_string(&mut buf)
                .context("Failed to read reply text from stdin")?;
            Ok(buf)
        }
    }
}

/// Printable text for the last message of a one-shot exchange
fn reply_output(reply: &Message, links: LinkStyle) -> Result<String> {
    match reply.kind {
        MessageKind::Assistant => Ok(format_reply(&reply.text, links)),
        MessageKind::User | MessageKind::Error => Err(anyhow!(reply.text.clone())),
    }
}

async fn send_once(config: &Config, text: &str) -> Result<()> {
    let client = WebhookClient::new(config)?;
    let mut session = ChatSession::new(Arc::new(client));

    if session.submit(text) == SubmitOutcome::Empty {
        bail!("Nothing to send: the message is empty");
    }
    session.wait_for_reply().await;

    let reply = session.store().last().context("No reply was recorded")?;
    println!("{}", reply_output(reply, stdout_link_style())?);
    Ok(())
}
