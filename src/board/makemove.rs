use super::Board;
use crate::{
    chessmove::Move,
    lookups::CASTLING_RIGHTS,
    piece::{Colour, Piece, PieceType},
    squareset::SquareSet,
    util::Square,
};

/// A saved copy of the position, taken before a move and held in the
/// caller's stack frame. Restoring it is the whole of unmake, so every
/// call site pairs one snapshot with one restore. The move counter is
/// deliberately not part of it.
#[derive(Clone)]
pub struct Snapshot {
    pieces: [SquareSet; 12],
    occupancies: [SquareSet; 3],
    side: Colour,
    ep_sq: Square,
    castle_perm: u8,
}

impl Board {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pieces: self.pieces,
            occupancies: self.occupancies,
            side: self.side,
            ep_sq: self.ep_sq,
            castle_perm: self.castle_perm,
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.pieces = snapshot.pieces;
        self.occupancies = snapshot.occupancies;
        self.side = snapshot.side;
        self.ep_sq = snapshot.ep_sq;
        self.castle_perm = snapshot.castle_perm;
    }

    /// Applies a pseudo-legal move. If the move would leave the mover's own
    /// king attacked it is rolled back and `false` is returned, with the
    /// board unchanged.
    pub fn make_move(&mut self, m: Move) -> bool {
        #[cfg(debug_assertions)]
        self.check_validity();

        let rollback = self.snapshot();

        let from = m.from();
        let to = m.to();
        let piece = m.piece();
        let side = piece.colour();
        debug_assert_eq!(side, self.side);

        self.pieces[piece] = self.pieces[piece].remove_square(from).add_square(to);

        if m.is_capture() && !m.is_ep() {
            for pt in PieceType::all() {
                let victim = Piece::new(side.flip(), pt);
                if self.pieces[victim].contains_square(to) {
                    self.pieces[victim] = self.pieces[victim].remove_square(to);
                    break;
                }
            }
        }

        if let Some(promoted) = m.promoted() {
            self.pieces[piece] = self.pieces[piece].remove_square(to);
            self.pieces[promoted] = self.pieces[promoted].add_square(to);
        }

        if m.is_ep() {
            // the captured pawn sits behind the target square.
            let (victim, victim_sq) = if side == Colour::White {
                (Piece::BP, to.add(8))
            } else {
                (Piece::WP, to.sub(8))
            };
            self.pieces[victim] = self.pieces[victim].remove_square(victim_sq);
        }

        if m.is_castle() {
            let (rook, rook_from, rook_to) = match to {
                Square::G1 => (Piece::WR, Square::H1, Square::F1),
                Square::C1 => (Piece::WR, Square::A1, Square::D1),
                Square::G8 => (Piece::BR, Square::H8, Square::F8),
                Square::C8 => (Piece::BR, Square::A8, Square::D8),
                _ => {
                    debug_assert!(false, "castling to a non-castling square");
                    self.restore(&rollback);
                    return false;
                }
            };
            self.pieces[rook] = self.pieces[rook].remove_square(rook_from).add_square(rook_to);
        }

        self.castle_perm &= CASTLING_RIGHTS[from.index()];
        self.castle_perm &= CASTLING_RIGHTS[to.index()];

        self.rebuild_occupancies();

        if self.in_check(side) {
            self.restore(&rollback);
            return false;
        }

        self.ep_sq = if m.is_double_push() {
            if side == Colour::White {
                from.sub(8)
            } else {
                from.add(8)
            }
        } else {
            Square::NONE
        };

        self.side = side.flip();
        self.ply_count += 1;

        true
    }
}

mod tests {
    #[test]
    fn make_then_restore_is_identity() {
        use crate::board::{movegen::MoveList, Board};
        let fens = [
            Board::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        ];
        for fen in fens {
            let mut pos = Board::from_fen(fen).unwrap();
            let reference = pos.clone();
            let mut list = MoveList::new();
            pos.generate_moves(&mut list);
            for m in list.iter_moves() {
                let snap = pos.snapshot();
                if pos.make_move(m) {
                    pos.restore(&snap);
                }
                assert_eq!(pos, reference, "make/restore of {m} changed {fen}");
            }
        }
    }

    #[test]
    fn legality_is_enforced() {
        use crate::board::Board;
        // the knight on d2 is pinned to the king by the rook on d8.
        let mut pos = Board::from_fen("3r3k/8/8/8/8/8/3N4/3K4 w - - 0 1").unwrap();
        let m = pos.parse_uci("d2f3").unwrap();
        assert!(!pos.make_move(m));
        assert_eq!(pos, Board::from_fen("3r3k/8/8/8/8/8/3N4/3K4 w - - 0 1").unwrap());
        // a king step off the pin file is fine.
        let m = pos.parse_uci("d1e1").unwrap();
        assert!(pos.make_move(m));
    }

    #[test]
    fn the_mover_is_never_left_in_check() {
        use crate::board::{movegen::MoveList, Board};
        use crate::piece::Colour;
        let mut pos =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let mut list = MoveList::new();
        pos.generate_moves(&mut list);
        for m in list.iter_moves() {
            let snap = pos.snapshot();
            if pos.make_move(m) {
                assert!(!pos.in_check(Colour::White), "{m} left white in check");
                assert_eq!(pos.turn(), Colour::Black);
                pos.restore(&snap);
            }
        }
    }

    #[test]
    fn double_push_sets_the_en_passant_square() {
        use crate::board::Board;
        use crate::util::Square;
        let mut pos = Board::from_fen(Board::STARTING_FEN).unwrap();
        let m = pos.parse_uci("e2e4").unwrap();
        assert!(pos.make_move(m));
        assert_eq!(pos.ep_sq(), Square::E3);
        // a quiet reply clears it again.
        let m = pos.parse_uci("g8f6").unwrap();
        assert!(pos.make_move(m));
        assert_eq!(pos.ep_sq(), Square::NONE);
        assert_eq!(pos.ply_count(), 2);
    }

    #[test]
    fn en_passant_removes_the_right_pawn() {
        use crate::board::Board;
        use crate::piece::Piece;
        use crate::util::Square;
        let mut pos =
            Board::from_fen("rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let m = pos.parse_uci("e5d6").unwrap();
        assert!(m.is_ep());
        assert!(pos.make_move(m));
        assert!(pos.piece_bb(Piece::WP).contains_square(Square::D6));
        assert!(!pos.piece_bb(Piece::BP).contains_square(Square::D5));
        assert_eq!(pos.piece_at(Square::D5), None);
    }

    #[test]
    fn castling_moves_the_rook_and_burns_the_rights() {
        use crate::board::Board;
        use crate::piece::Piece;
        use crate::util::Square;
        let mut pos =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let m = pos.parse_uci("e1g1").unwrap();
        assert!(m.is_castle());
        assert!(pos.make_move(m));
        assert!(pos.piece_bb(Piece::WK).contains_square(Square::G1));
        assert!(pos.piece_bb(Piece::WR).contains_square(Square::F1));
        assert!(!pos.piece_bb(Piece::WR).contains_square(Square::H1));
        assert_eq!(pos.castle_perm() & 0b0011, 0);

        // a rook move burns one side's right only.
        let mut pos =
            Board::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let m = pos.parse_uci("a1b1").unwrap();
        assert!(pos.make_move(m));
        assert_eq!(pos.castle_perm(), crate::board::WKCA | crate::board::BKCA | crate::board::BQCA);
    }

    #[test]
    fn promotion_replaces_the_pawn() {
        use crate::board::Board;
        use crate::piece::Piece;
        use crate::util::Square;
        let mut pos = Board::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let m = pos.parse_uci("a7a8n").unwrap();
        assert!(pos.make_move(m));
        assert!(pos.piece_bb(Piece::WN).contains_square(Square::A8));
        assert!(pos.piece_bb(Piece::WP).is_empty());
    }
}
