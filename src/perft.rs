//! The correctness oracle for move generation: count the leaves of the
//! legal move tree to a fixed depth and compare against known-good totals.

use std::time::Instant;

use anyhow::{ensure, Context};

use crate::board::{movegen::MoveList, Board};

/// Known-good node counts. The second position is the "kiwipete" stress
/// test for castling, pins and en passant; the last two lean on promotions.
static SUITE: &[(&str, &[(usize, u64)])] = &[
    (
        Board::STARTING_FEN,
        &[(1, 20), (2, 400), (3, 8_902), (4, 197_281), (5, 4_865_609)],
    ),
    (
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        &[(1, 48), (2, 2_039), (3, 97_862)],
    ),
    (
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        &[(4, 43_238), (5, 674_624)],
    ),
    (
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        &[(4, 422_333)],
    ),
];

pub fn perft(pos: &mut Board, depth: usize) -> u64 {
    #[cfg(debug_assertions)]
    pos.check_validity();

    if depth == 0 {
        return 1;
    }

    let mut move_list = MoveList::new();
    pos.generate_moves(&mut move_list);

    let mut count = 0;
    for m in move_list.iter_moves() {
        let snapshot = pos.snapshot();
        if !pos.make_move(m) {
            continue;
        }
        count += perft(pos, depth - 1);
        pos.restore(&snapshot);
    }

    count
}

/// Perft with a per-root-move breakdown, the format move-generator
/// debugging sessions live on.
pub fn split_perft(pos: &mut Board, depth: usize) -> u64 {
    debug_assert!(depth > 0);
    let start = Instant::now();

    let mut move_list = MoveList::new();
    pos.generate_moves(&mut move_list);

    let mut total = 0;
    for m in move_list.iter_moves() {
        let snapshot = pos.snapshot();
        if !pos.make_move(m) {
            continue;
        }
        let count = perft(pos, depth - 1);
        pos.restore(&snapshot);
        println!("{m}: {count}");
        total += count;
    }

    println!();
    println!("nodes: {total}");
    println!("time: {}ms", start.elapsed().as_millis());
    total
}

pub fn split_perft_main(depth: usize, fen: Option<&str>) -> anyhow::Result<()> {
    let mut pos = Board::from_fen(fen.unwrap_or(Board::STARTING_FEN))
        .with_context(|| "failed to parse the position to count from")?;
    ensure!(depth > 0, "depth must be at least 1");
    split_perft(&mut pos, depth);
    Ok(())
}

/// Runs the whole built-in suite, failing loudly on the first mismatch.
pub fn gamut() -> anyhow::Result<()> {
    for &(fen, expectations) in SUITE {
        let mut pos =
            Board::from_fen(fen).with_context(|| format!("bad suite position: {fen}"))?;
        println!("{fen}");
        for &(depth, expected) in expectations {
            let start = Instant::now();
            let count = perft(&mut pos, depth);
            let millis = start.elapsed().as_millis();
            ensure!(
                count == expected,
                "perft({depth}) of {fen} returned {count}, expected {expected}"
            );
            println!("  perft({depth}) = {count} ({millis}ms)");
        }
    }
    println!("all counts check out.");
    Ok(())
}

mod tests {
    #[allow(dead_code)]
    fn run(fen: &str, depth: usize) -> u64 {
        let mut pos = crate::board::Board::from_fen(fen).unwrap();
        super::perft(&mut pos, depth)
    }

    #[test]
    fn perft_depth_zero_is_one() {
        use crate::board::Board;
        assert_eq!(run(Board::STARTING_FEN, 0), 1);
    }

    #[test]
    fn perft_startpos_shallow() {
        use crate::board::Board;
        assert_eq!(run(Board::STARTING_FEN, 1), 20);
        assert_eq!(run(Board::STARTING_FEN, 2), 400);
        assert_eq!(run(Board::STARTING_FEN, 3), 8_902);
        assert_eq!(run(Board::STARTING_FEN, 4), 197_281);
    }

    #[test]
    fn perft_startpos_deep() {
        use crate::board::Board;
        assert_eq!(run(Board::STARTING_FEN, 5), 4_865_609);
    }

    #[test]
    fn perft_kiwipete() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        assert_eq!(run(fen, 1), 48);
        assert_eq!(run(fen, 2), 2_039);
        assert_eq!(run(fen, 3), 97_862);
    }

    #[test]
    fn perft_endgame_pins() {
        let fen = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
        assert_eq!(run(fen, 4), 43_238);
        assert_eq!(run(fen, 5), 674_624);
    }

    #[test]
    fn perft_promotion_heavy() {
        let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
        assert_eq!(run(fen, 4), 422_333);
    }

    #[test]
    fn perft_restores_the_position() {
        use crate::board::Board;
        let mut pos = Board::from_fen(Board::STARTING_FEN).unwrap();
        let reference = pos.clone();
        super::perft(&mut pos, 3);
        assert_eq!(pos, reference);
    }
}
