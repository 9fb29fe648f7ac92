use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod models;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the web chat server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8501")]
        port: String,
    },
    /// Start a chat session in the terminal
    Chat {
        /// Model label or ID, defaults to the first model in the table
        #[arg(long)]
        model: Option<String>,

        /// Hugging Face API key, defaults to HF_API_KEY
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List the available models
    Models {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // A missing .env file is fine, the environment is used as is
    dotenvy::dotenv().ok();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Chat { model, api_key }) => {
            chat::run(model, api_key).await?;
        }
        Some(Command::Models {}) => {
            models::run()?;
        }
        None => {}
    }

    Ok(())
}
