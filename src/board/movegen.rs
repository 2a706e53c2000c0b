use std::cmp::Reverse;
use std::ops::Index;

use arrayvec::ArrayVec;

use super::{Board, BKCA, BQCA, WKCA, WQCA};
use crate::{
    attacks,
    chessmove::Move,
    piece::{Colour, Piece, PieceType},
    squareset::SquareSet,
    util::Square,
};

pub const MAX_POSITION_MOVES: usize = 256;

const WHITE_PROMOTIONS: [Piece; 4] = [Piece::WQ, Piece::WR, Piece::WB, Piece::WN];
const BLACK_PROMOTIONS: [Piece; 4] = [Piece::BQ, Piece::BR, Piece::BB, Piece::BN];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveListEntry {
    pub mov: Move,
    pub score: i32,
}

/// A fixed-capacity buffer of scored pseudo-legal moves. No legal chess
/// position produces more than 256 of them.
#[derive(Clone, Default)]
pub struct MoveList {
    inner: ArrayVec<MoveListEntry, MAX_POSITION_MOVES>,
}

impl MoveList {
    pub fn new() -> Self {
        Self { inner: ArrayVec::new() }
    }

    fn push(&mut self, m: Move) {
        if self.inner.try_push(MoveListEntry { mov: m, score: 0 }).is_err() {
            debug_assert!(false, "move list overflow");
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.inner.iter().map(|entry| entry.mov)
    }

    pub fn entries_mut(&mut self) -> &mut [MoveListEntry] {
        &mut self.inner
    }

    /// Sorts the list so the highest-scored moves come first.
    pub fn sort(&mut self) {
        self.inner.sort_unstable_by_key(|entry| Reverse(entry.score));
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, index: usize) -> &Self::Output {
        &self.inner[index].mov
    }
}

impl Board {
    /// Emits every pseudo-legal move for the side to move. Moves that leave
    /// the mover's own king attacked are weeded out by `make_move`.
    pub fn generate_moves(&self, move_list: &mut MoveList) {
        #[cfg(debug_assertions)]
        self.check_validity();

        self.generate_pawn_moves(move_list);
        self.generate_king_moves(move_list);
        for pt in [
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
        ] {
            self.generate_piece_moves(Piece::new(self.side, pt), move_list);
        }
    }

    fn generate_pawn_moves(&self, move_list: &mut MoveList) {
        let side = self.side;
        let piece = Piece::new(side, PieceType::Pawn);
        let (promo_rank, start_rank, promotions) = if side == Colour::White {
            (SquareSet::RANK_7, SquareSet::RANK_2, &WHITE_PROMOTIONS)
        } else {
            (SquareSet::RANK_2, SquareSet::RANK_7, &BLACK_PROMOTIONS)
        };
        let enemies = self.occupancy(side.flip());

        for from in self.pieces[piece].iter() {
            if let Some(to) = from.pawn_push(side) {
                if !self.occupied().contains_square(to) {
                    if promo_rank.contains_square(from) {
                        for &promo in promotions {
                            move_list.push(Move::new(from, to, piece, Some(promo), 0));
                        }
                    } else {
                        move_list.push(Move::new(from, to, piece, None, 0));
                        if start_rank.contains_square(from) {
                            if let Some(double) = to.pawn_push(side) {
                                if !self.occupied().contains_square(double) {
                                    move_list.push(Move::new(
                                        from,
                                        double,
                                        piece,
                                        None,
                                        Move::DOUBLE_PUSH_FLAG,
                                    ));
                                }
                            }
                        }
                    }
                }
            }

            for to in (attacks::pawn(side, from) & enemies).iter() {
                if promo_rank.contains_square(from) {
                    for &promo in promotions {
                        move_list.push(Move::new(from, to, piece, Some(promo), Move::CAPTURE_FLAG));
                    }
                } else {
                    move_list.push(Move::new(from, to, piece, None, Move::CAPTURE_FLAG));
                }
            }

            if self.ep_sq != Square::NONE && attacks::pawn(side, from).contains_square(self.ep_sq) {
                move_list.push(Move::new(
                    from,
                    self.ep_sq,
                    piece,
                    None,
                    Move::CAPTURE_FLAG | Move::EN_PASSANT_FLAG,
                ));
            }
        }
    }

    fn generate_king_moves(&self, move_list: &mut MoveList) {
        let side = self.side;
        let piece = Piece::new(side, PieceType::King);
        let enemies = self.occupancy(side.flip());

        for from in self.pieces[piece].iter() {
            let moves = attacks::king(from) - self.occupancy(side);
            for to in moves.iter() {
                if enemies.contains_square(to) {
                    move_list.push(Move::new(from, to, piece, None, Move::CAPTURE_FLAG));
                } else {
                    move_list.push(Move::new(from, to, piece, None, 0));
                }
            }
        }

        self.generate_castling_moves(move_list);
    }

    /// Castling needs the squares between king and rook empty and the king's
    /// origin and crossing square unattacked. The landing square is left to
    /// the legality check in `make_move`.
    fn generate_castling_moves(&self, move_list: &mut MoveList) {
        let side = self.side;
        let piece = Piece::new(side, PieceType::King);
        let occupied = self.occupied();

        if side == Colour::White {
            if self.castle_perm & WKCA != 0
                && !occupied.contains_square(Square::F1)
                && !occupied.contains_square(Square::G1)
                && !self.sq_attacked(Square::E1, Colour::Black)
                && !self.sq_attacked(Square::F1, Colour::Black)
            {
                move_list.push(Move::new(Square::E1, Square::G1, piece, None, Move::CASTLE_FLAG));
            }
            if self.castle_perm & WQCA != 0
                && !occupied.contains_square(Square::D1)
                && !occupied.contains_square(Square::C1)
                && !occupied.contains_square(Square::B1)
                && !self.sq_attacked(Square::E1, Colour::Black)
                && !self.sq_attacked(Square::D1, Colour::Black)
            {
                move_list.push(Move::new(Square::E1, Square::C1, piece, None, Move::CASTLE_FLAG));
            }
        } else {
            if self.castle_perm & BKCA != 0
                && !occupied.contains_square(Square::F8)
                && !occupied.contains_square(Square::G8)
                && !self.sq_attacked(Square::E8, Colour::White)
                && !self.sq_attacked(Square::F8, Colour::White)
            {
                move_list.push(Move::new(Square::E8, Square::G8, piece, None, Move::CASTLE_FLAG));
            }
            if self.castle_perm & BQCA != 0
                && !occupied.contains_square(Square::D8)
                && !occupied.contains_square(Square::C8)
                && !occupied.contains_square(Square::B8)
                && !self.sq_attacked(Square::E8, Colour::White)
                && !self.sq_attacked(Square::D8, Colour::White)
            {
                move_list.push(Move::new(Square::E8, Square::C8, piece, None, Move::CASTLE_FLAG));
            }
        }
    }

    fn generate_piece_moves(&self, piece: Piece, move_list: &mut MoveList) {
        let side = piece.colour();
        let enemies = self.occupancy(side.flip());
        let blockers = self.occupied();

        for from in self.pieces[piece].iter() {
            let attack_set = match piece.piece_type() {
                PieceType::Knight => attacks::knight(from),
                PieceType::Bishop => attacks::bishop(from, blockers),
                PieceType::Rook => attacks::rook(from, blockers),
                PieceType::Queen => attacks::queen(from, blockers),
                PieceType::Pawn | PieceType::King => {
                    debug_assert!(false, "pawns and kings have dedicated generators");
                    return;
                }
            };
            for to in (attack_set - self.occupancy(side)).iter() {
                if enemies.contains_square(to) {
                    move_list.push(Move::new(from, to, piece, None, Move::CAPTURE_FLAG));
                } else {
                    move_list.push(Move::new(from, to, piece, None, 0));
                }
            }
        }
    }
}

mod tests {
    #[allow(dead_code)]
    fn legal_moves(fen: &str) -> Vec<crate::chessmove::Move> {
        use super::MoveList;
        use crate::board::Board;
        let mut pos = Board::from_fen(fen).unwrap();
        let mut list = MoveList::new();
        pos.generate_moves(&mut list);
        let mut legal = Vec::new();
        for m in list.iter_moves() {
            let snap = pos.snapshot();
            if pos.make_move(m) {
                pos.restore(&snap);
                legal.push(m);
            }
        }
        legal
    }

    #[test]
    fn twenty_moves_from_the_start() {
        use crate::board::Board;
        let moves = legal_moves(Board::STARTING_FEN);
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().filter(|m| m.is_double_push()).count() == 8);
    }

    #[test]
    fn promotions_come_in_fours() {
        let moves = legal_moves("8/P7/8/8/8/8/8/k6K w - - 0 1");
        let promos: Vec<String> = moves
            .iter()
            .filter(|m| m.promoted().is_some())
            .map(std::string::ToString::to_string)
            .collect();
        assert_eq!(promos.len(), 4);
        for text in ["a7a8q", "a7a8r", "a7a8b", "a7a8n"] {
            assert!(promos.iter().any(|p| p == text), "missing {text}");
        }
    }

    #[test]
    fn en_passant_is_generated() {
        let moves = legal_moves(
            "rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        );
        let ep: Vec<_> = moves.iter().filter(|m| m.is_ep()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to_string(), "e5d6");
        assert!(ep[0].is_capture());
    }

    #[test]
    fn castling_both_ways() {
        let moves =
            legal_moves("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let castles: Vec<String> = moves
            .iter()
            .filter(|m| m.is_castle())
            .map(std::string::ToString::to_string)
            .collect();
        assert_eq!(castles.len(), 2);
        assert!(castles.contains(&"e1g1".to_string()));
        assert!(castles.contains(&"e1c1".to_string()));
    }

    #[test]
    fn castling_through_attacks_is_rejected() {
        // the queen on f3 covers f1 and d1, so neither castle may be generated.
        let moves = legal_moves("4k3/8/8/8/8/5q2/8/R3K2R w KQ - 0 1");
        assert!(moves.iter().all(|m| !m.is_castle()));
    }

    #[test]
    fn castling_landing_on_attack_is_rejected_by_make() {
        use super::MoveList;
        use crate::board::Board;
        // g1 is covered by the bishop on b6, but e1 and f1 are clean: the
        // generator emits the kingside castle and make throws it out.
        let fen = "4k3/8/1b6/8/8/8/8/4K2R w K - 0 1";
        let mut pos = Board::from_fen(fen).unwrap();
        let mut list = MoveList::new();
        pos.generate_moves(&mut list);
        let castle = list.iter_moves().find(|m| m.is_castle());
        let castle = castle.expect("castle should be pseudo-legal here");
        assert!(!pos.make_move(castle));
        assert_eq!(pos, Board::from_fen(fen).unwrap());
    }

    #[test]
    fn kiwipete_has_forty_eight_legal_moves() {
        let moves = legal_moves(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        );
        assert_eq!(moves.len(), 48);
    }
}
