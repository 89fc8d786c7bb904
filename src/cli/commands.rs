use clap::{Parser, Subcommand};

/// `chatline` - message segmentation and link previews for an AI chat client.
#[derive(Parser, Debug)]
#[command(name = "chatline")]
#[command(version = "0.1.0")]
#[command(about = "Backend for an AI chat client: code-block segmentation and link previews.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway serving /api/preview
    Gateway {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Split a message into text and code segments, printed as JSON
    Segments {
        /// Message text (read from stdin when omitted)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// List the links found in the prose of a message
    Links {
        /// Message text (read from stdin when omitted)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Fetch one URL and print its preview as JSON
    Preview {
        /// Absolute http(s) URL
        url: String,
    },
}
