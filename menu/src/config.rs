use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "splay-menu", about = "Interactive key store backed by a splay tree")]
pub struct Config {
    /// Don't print the menu before each command.
    #[arg(long)]
    pub no_prompt: bool,

    /// Tracing filter directives written to stderr, e.g. `splay_tree=trace`.
    #[arg(long = "log", env = "RUST_LOG")]
    pub rust_log: Option<String>,

    /// Keys inserted before the first command is read.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub preload: Vec<i64>,
}
