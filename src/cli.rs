use clap::Parser;

#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Option<Subcommands>,
}

#[derive(clap::Subcommand)]
pub enum Subcommands {
    /// Run the built-in perft test suite.
    Perft,
    /// Count the nodes reachable after each root move of a position.
    Splitperft {
        /// The depth to count to.
        depth: usize,
        /// The position to count from - if omitted, the starting position is used.
        #[clap(long, value_name = "FEN")]
        fen: Option<String>,
    },
}
