#![allow(clippy::cast_possible_truncation)]

/// Implements a C-style for loop, for use in const fn.
#[macro_export]
macro_rules! cfor {
    ($init: stmt; $cond: expr; $step: expr; $body: block) => {
        {
            $init
            #[allow(while_true)]
            while $cond {
                $body;

                $step;
            }
        }
    }
}

/// Castling-rights masks, indexed by square. Making a move ANDs the current
/// rights with the mask of both its source and its target square, which
/// strips the relevant rights whenever a king or rook moves or is captured.
#[rustfmt::skip]
pub static CASTLING_RIGHTS: [u8; 64] = [
     7, 15, 15, 15,  3, 15, 15, 11,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    13, 15, 15, 15, 12, 15, 15, 14,
];

const fn init_mvv_lva() -> [[i32; 12]; 12] {
    let mut scores = [[0; 12]; 12];
    cfor!(let mut attacker = 0; attacker < 12; attacker += 1; {
        cfor!(let mut victim = 0; victim < 12; victim += 1; {
            // most valuable victim first, least valuable attacker as tiebreak:
            // PxQ = 505, KxQ = 500, PxP = 105, KxP = 100.
            scores[attacker][victim] = 100 * (victim as i32 % 6 + 1) + 5 - attacker as i32 % 6;
        });
    });
    scores
}

/// Capture ordering scores, indexed by `[attacker][victim]`.
pub static MVV_LVA: [[i32; 12]; 12] = init_mvv_lva();

mod tests {
    #[test]
    fn castling_masks_strip_the_right_bits() {
        use super::CASTLING_RIGHTS;
        use crate::board::{BKCA, BQCA, WKCA, WQCA};
        use crate::util::Square;
        // king moves strip both rights for the side.
        assert_eq!(0b1111 & CASTLING_RIGHTS[Square::E1.index()], BKCA | BQCA);
        assert_eq!(0b1111 & CASTLING_RIGHTS[Square::E8.index()], WKCA | WQCA);
        // rook moves strip one.
        assert_eq!(0b1111 & CASTLING_RIGHTS[Square::H1.index()], WQCA | BKCA | BQCA);
        assert_eq!(0b1111 & CASTLING_RIGHTS[Square::A8.index()], WKCA | WQCA | BKCA);
        // everything else strips nothing.
        assert_eq!(CASTLING_RIGHTS[Square::E4.index()], 0b1111);
    }

    #[test]
    fn capture_ordering() {
        use super::MVV_LVA;
        use crate::piece::Piece;
        // pawn takes queen beats queen takes queen, which beats pawn takes pawn.
        assert!(MVV_LVA[Piece::WP][Piece::BQ] > MVV_LVA[Piece::WQ][Piece::BQ]);
        assert!(MVV_LVA[Piece::WQ][Piece::BQ] > MVV_LVA[Piece::WP][Piece::BP]);
        assert_eq!(MVV_LVA[Piece::WP][Piece::BQ], 505);
        assert_eq!(MVV_LVA[Piece::BK][Piece::WP], 100);
    }
}
