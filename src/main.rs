#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::module_name_repetitions
)]

//! Cerastes, a UCI chess engine written in Rust.

mod attacks;
mod board;
mod chessmove;
mod cli;
mod errors;
mod lookups;
mod perft;
mod piece;
mod search;
mod squareset;
mod uci;
mod util;

/// The name of the engine.
pub static NAME: &str = "Cerastes";
/// The version of the engine.
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    if std::env::args_os().len() == 1 {
        // fast path to UCI:
        return uci::main_loop();
    }

    let cli = <cli::Cli as clap::Parser>::parse();

    match cli.subcommand {
        Some(cli::Subcommands::Perft) => perft::gamut(),
        Some(cli::Subcommands::Splitperft { depth, fen }) => {
            perft::split_perft_main(depth, fen.as_deref())
        }
        None => uci::main_loop(),
    }
}
