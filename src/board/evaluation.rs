//! Static evaluation: material plus piece-square tables, from the point of
//! view of the side to move.

use super::Board;
use crate::piece::{Colour, Piece};

/// Mate scores are this far from zero, minus the ply at which they occur.
pub const MATE_SCORE: i32 = 49_000;
pub const DRAW_SCORE: i32 = 0;

/// Signed material values, so black pieces subtract themselves.
static MATERIAL: [i32; 12] = [
    100, 300, 350, 500, 1000, 10000, -100, -300, -350, -500, -1000, -10000,
];

#[rustfmt::skip]
static PAWN_PST: [i32; 64] = [
    90,  90,  90,  90,  90,  90,  90,  90,
    30,  30,  30,  40,  40,  30,  30,  30,
    20,  20,  20,  30,  30,  30,  20,  20,
    10,  10,  10,  20,  20,  10,  10,  10,
     5,   5,  10,  20,  20,   5,   5,   5,
     0,   0,   0,   5,   5,   0,   0,   0,
     0,   0,   0, -10, -10,   0,   0,   0,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
static KNIGHT_PST: [i32; 64] = [
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,  10,  10,   0,   0,  -5,
    -5,   5,  20,  20,  20,  20,   5,  -5,
    -5,  10,  20,  30,  30,  20,  10,  -5,
    -5,  10,  20,  30,  30,  20,  10,  -5,
    -5,   5,  20,  10,  10,  20,   5,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5, -10,   0,   0,   0,   0, -10,  -5,
];

#[rustfmt::skip]
static BISHOP_PST: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     0,   0,   0,   0,   0,   0,   0,   0,
     0,   0,   0,  10,  10,   0,   0,   0,
     0,   0,  10,  20,  20,  10,   0,   0,
     0,   0,  10,  20,  20,  10,   0,   0,
     0,  10,   0,   0,   0,   0,  10,   0,
     0,  30,   0,   0,   0,   0,  30,   0,
     0,   0, -10,   0,   0, -10,   0,   0,
];

#[rustfmt::skip]
static ROOK_PST: [i32; 64] = [
    50,  50,  50,  50,  50,  50,  50,  50,
    50,  50,  50,  50,  50,  50,  50,  50,
     0,   0,  10,  20,  20,  10,   0,   0,
     0,   0,  10,  20,  20,  10,   0,   0,
     0,   0,  10,  20,  20,  10,   0,   0,
     0,   0,  10,  20,  20,  10,   0,   0,
     0,   0,  10,  20,  20,  10,   0,   0,
     0,   0,   0,  20,  20,   0,   0,   0,
];

#[rustfmt::skip]
static KING_PST: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     0,   0,   5,   5,   5,   5,   0,   0,
     0,   5,   5,  10,  10,   5,   5,   0,
     0,   5,  10,  20,  20,  10,   5,   0,
     0,   5,  10,  20,  20,  10,   5,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   5,   5,  -5,  -5,   0,   5,   0,
     0,   0,   5,   0, -15,   0,  10,   0,
];

impl Board {
    /// Scores the position for the side to move, in centipawns. The tables
    /// are written from white's point of view; black squares are mirrored
    /// vertically. Queens carry material only.
    pub fn evaluate(&self) -> i32 {
        let mut score = 0;

        for piece in Piece::all() {
            for sq in self.piece_bb(piece).iter() {
                score += MATERIAL[piece];
                score += match piece {
                    Piece::WP => PAWN_PST[sq.index()],
                    Piece::WN => KNIGHT_PST[sq.index()],
                    Piece::WB => BISHOP_PST[sq.index()],
                    Piece::WR => ROOK_PST[sq.index()],
                    Piece::WK => KING_PST[sq.index()],
                    Piece::BP => -PAWN_PST[sq.flip_rank().index()],
                    Piece::BN => -KNIGHT_PST[sq.flip_rank().index()],
                    Piece::BB => -BISHOP_PST[sq.flip_rank().index()],
                    Piece::BR => -ROOK_PST[sq.flip_rank().index()],
                    Piece::BK => -KING_PST[sq.flip_rank().index()],
                    Piece::WQ | Piece::BQ => 0,
                };
            }
        }

        if self.turn() == Colour::White {
            score
        } else {
            -score
        }
    }
}

mod tests {
    #[test]
    fn the_start_is_balanced() {
        use crate::board::Board;
        let pos = Board::from_fen(Board::STARTING_FEN).unwrap();
        assert_eq!(pos.evaluate(), 0);
    }

    #[test]
    fn flipping_the_side_negates_the_score() {
        use crate::board::Board;
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8",
            "6k1/5ppp/8/8/8/8/5PPP/R6K",
        ];
        for placement in fens {
            let white = Board::from_fen(&format!("{placement} w - - 0 1")).unwrap();
            let black = Board::from_fen(&format!("{placement} b - - 0 1")).unwrap();
            assert_eq!(white.evaluate(), -black.evaluate(), "failed for {placement}");
        }
    }

    #[test]
    fn material_counts() {
        use crate::board::Board;
        // white is a rook up, and it is white to move.
        let up = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(up.evaluate() > 400);
        // same position, black to move: the score flips.
        let down = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
        assert!(down.evaluate() < -400);
    }

    #[test]
    fn the_score_survives_a_reparse() {
        use crate::board::Board;
        let pos =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let reparsed = Board::from_fen(&pos.fen()).unwrap();
        assert_eq!(pos.evaluate(), reparsed.evaluate());
    }
}
