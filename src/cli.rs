use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Also append log lines to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the Prometheus text exposition after the command finishes
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Route a chat message through the actions and print the reply
    Ask {
        text: String,

        /// Directory for reply attachments
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Print the token address a message refers to
    Resolve { text: String },
    /// Fetch the most representative trading pair
    Pair(PairArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct PairArgs {
    /// Free-text search, ranked
    #[arg(long)]
    pub query: Option<String>,

    /// Token address
    #[arg(long)]
    pub token: Option<String>,

    /// Chain followed by one or more pair addresses
    #[arg(long, num_args = 2.., value_names = ["CHAIN", "ADDRESSES"])]
    pub pair: Option<Vec<String>>,
}
