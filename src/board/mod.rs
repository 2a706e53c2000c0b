pub mod evaluation;
pub mod makemove;
pub mod movegen;

use std::fmt::{Debug, Display, Formatter};

use crate::{
    attacks,
    errors::{FenParseError, MoveParseError},
    chessmove::Move,
    piece::{Colour, Piece, PieceType},
    squareset::SquareSet,
    util::{Rank, Square},
};

use self::movegen::MoveList;

pub const WKCA: u8 = 0b0001;
pub const WQCA: u8 = 0b0010;
pub const BKCA: u8 = 0b0100;
pub const BQCA: u8 = 0b1000;

/// Index of the white/black-union occupancy in `occupancies`.
const OCC_BOTH: usize = 2;

/// The position: one square set per piece type, the derived occupancy
/// unions, and the flags that do not live on the squares themselves.
#[derive(Clone)]
pub struct Board {
    pieces: [SquareSet; 12],
    occupancies: [SquareSet; 3],
    side: Colour,
    ep_sq: Square,
    castle_perm: u8,
    ply_count: u32,
}

impl Board {
    pub const STARTING_FEN: &'static str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    pub const fn new() -> Self {
        Self {
            pieces: [SquareSet::EMPTY; 12],
            occupancies: [SquareSet::EMPTY; 3],
            side: Colour::White,
            ep_sq: Square::NONE,
            castle_perm: 0,
            ply_count: 0,
        }
    }

    pub fn reset(&mut self) {
        self.pieces = [SquareSet::EMPTY; 12];
        self.occupancies = [SquareSet::EMPTY; 3];
        self.side = Colour::White;
        self.ep_sq = Square::NONE;
        self.castle_perm = 0;
        self.ply_count = 0;
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenParseError> {
        let mut out = Self::new();
        out.set_from_fen(fen)?;
        Ok(out)
    }

    pub fn set_startpos(&mut self) {
        self.set_from_fen(Self::STARTING_FEN)
            .expect("the starting position FEN is valid");
    }

    pub const fn turn(&self) -> Colour {
        self.side
    }

    pub const fn ep_sq(&self) -> Square {
        self.ep_sq
    }

    pub const fn castle_perm(&self) -> u8 {
        self.castle_perm
    }

    pub const fn ply_count(&self) -> u32 {
        self.ply_count
    }

    pub fn piece_bb(&self, piece: Piece) -> SquareSet {
        self.pieces[piece]
    }

    /// The union occupancy of both colours.
    pub fn occupied(&self) -> SquareSet {
        self.occupancies[OCC_BOTH]
    }

    pub fn occupancy(&self, colour: Colour) -> SquareSet {
        self.occupancies[colour.index()]
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        Piece::all().find(|&piece| self.pieces[piece].contains_square(sq))
    }

    pub fn king_square(&self, colour: Colour) -> Square {
        self.pieces[Piece::new(colour, PieceType::King)].first()
    }

    fn rebuild_occupancies(&mut self) {
        let mut white = SquareSet::EMPTY;
        let mut black = SquareSet::EMPTY;
        for pt in PieceType::all() {
            white |= self.pieces[Piece::new(Colour::White, pt)];
            black |= self.pieces[Piece::new(Colour::Black, pt)];
        }
        self.occupancies[Colour::White.index()] = white;
        self.occupancies[Colour::Black.index()] = black;
        self.occupancies[OCC_BOTH] = white | black;
    }

    /// True iff any piece of `by` attacks `sq`.
    pub fn sq_attacked(&self, sq: Square, by: Colour) -> bool {
        debug_assert!(sq.on_board());
        let blockers = self.occupied();
        // a pawn of `by` attacks `sq` iff a pawn of the other colour on `sq` would attack it.
        (attacks::pawn(by.flip(), sq) & self.pieces[Piece::new(by, PieceType::Pawn)]).non_empty()
            || (attacks::knight(sq) & self.pieces[Piece::new(by, PieceType::Knight)]).non_empty()
            || (attacks::bishop(sq, blockers) & self.pieces[Piece::new(by, PieceType::Bishop)])
                .non_empty()
            || (attacks::rook(sq, blockers) & self.pieces[Piece::new(by, PieceType::Rook)])
                .non_empty()
            || (attacks::queen(sq, blockers) & self.pieces[Piece::new(by, PieceType::Queen)])
                .non_empty()
            || (attacks::king(sq) & self.pieces[Piece::new(by, PieceType::King)]).non_empty()
    }

    pub fn in_check(&self, colour: Colour) -> bool {
        self.sq_attacked(self.king_square(colour), colour.flip())
    }

    pub fn set_from_fen(&mut self, fen: &str) -> Result<(), FenParseError> {
        self.reset();

        let mut parts = fen.split_ascii_whitespace();

        let board_part = parts.next().ok_or(FenParseError::MissingBoard)?;
        let rank_segments: Vec<&str> = board_part.split('/').collect();
        if rank_segments.len() != 8 {
            return Err(FenParseError::BoardSegments(rank_segments.len()));
        }
        for (row, segment) in rank_segments.iter().enumerate() {
            let mut file = 0u8;
            for c in segment.chars() {
                match c {
                    '1'..='8' => file += c as u8 - b'0',
                    c => {
                        let piece =
                            Piece::from_char(c).ok_or(FenParseError::UnexpectedCharacter(c))?;
                        if file >= 8 {
                            return Err(FenParseError::BadSquaresInSegment);
                        }
                        let sq = Square::new(row as u8 * 8 + file);
                        self.pieces[piece] = self.pieces[piece].add_square(sq);
                        file += 1;
                    }
                }
            }
            if file != 8 {
                return Err(FenParseError::BadSquaresInSegment);
            }
        }

        self.side = match parts.next() {
            None => return Err(FenParseError::MissingSide),
            Some("w") => Colour::White,
            Some("b") => Colour::Black,
            Some(other) => return Err(FenParseError::InvalidSide(other.to_string())),
        };

        match parts.next() {
            None => return Err(FenParseError::MissingCastling),
            Some("-") => self.castle_perm = 0,
            Some(castling) => {
                for c in castling.chars() {
                    match c {
                        'K' => self.castle_perm |= WKCA,
                        'Q' => self.castle_perm |= WQCA,
                        'k' => self.castle_perm |= BKCA,
                        'q' => self.castle_perm |= BQCA,
                        _ => return Err(FenParseError::InvalidCastling(castling.to_string())),
                    }
                }
            }
        }

        match parts.next() {
            None => return Err(FenParseError::MissingEnPassant),
            Some("-") => self.ep_sq = Square::NONE,
            Some(ep) => {
                let sq: Square = ep
                    .parse()
                    .map_err(|_| FenParseError::InvalidEnPassant(ep.to_string()))?;
                if sq.rank() != Rank::RANK_3 && sq.rank() != Rank::RANK_6 {
                    return Err(FenParseError::InvalidEnPassant(ep.to_string()));
                }
                self.ep_sq = sq;
            }
        }

        // the halfmove clock and fullmove counter are accepted but ignored.

        for colour in [Colour::White, Colour::Black] {
            let kings = self.pieces[Piece::new(colour, PieceType::King)].count();
            if kings == 0 {
                return Err(FenParseError::MissingKing { colour });
            }
            if kings > 1 {
                return Err(FenParseError::DuplicateKings { colour });
            }
        }

        self.rebuild_occupancies();

        Ok(())
    }

    pub fn fen(&self) -> String {
        let mut fen = String::with_capacity(100);

        for row in 0..8u8 {
            let mut empty = 0;
            for file in 0..8u8 {
                let sq = Square::new(row * 8 + file);
                if let Some(piece) = self.piece_at(sq) {
                    if empty != 0 {
                        fen.push_str(&empty.to_string());
                    }
                    empty = 0;
                    fen.push(piece.char());
                } else {
                    empty += 1;
                }
            }
            if empty != 0 {
                fen.push_str(&empty.to_string());
            }
            if row != 7 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.side == Colour::White { 'w' } else { 'b' });
        fen.push(' ');
        if self.castle_perm == 0 {
            fen.push('-');
        } else {
            for (bit, c) in [(WKCA, 'K'), (WQCA, 'Q'), (BKCA, 'k'), (BQCA, 'q')] {
                if self.castle_perm & bit != 0 {
                    fen.push(c);
                }
            }
        }
        fen.push(' ');
        if self.ep_sq == Square::NONE {
            fen.push('-');
        } else {
            fen.push_str(self.ep_sq.name().unwrap_or("-"));
        }
        fen.push_str(" 0 ");
        fen.push_str(&(self.ply_count / 2 + 1).to_string());

        fen
    }

    /// Resolves an origin-destination move string (with optional promotion
    /// letter) against the current pseudo-legal moves. An unmatched string is
    /// the caller's signal that the move is not playable here.
    pub fn parse_uci(&self, text: &str) -> Result<Move, MoveParseError> {
        if !text.is_ascii() {
            return Err(MoveParseError::InvalidSquare(text.to_string()));
        }
        if !(4..=5).contains(&text.len()) {
            return Err(MoveParseError::InvalidLength(text.len()));
        }
        let from: Square = text[0..2]
            .parse()
            .map_err(|_| MoveParseError::InvalidSquare(text[0..2].to_string()))?;
        let to: Square = text[2..4]
            .parse()
            .map_err(|_| MoveParseError::InvalidSquare(text[2..4].to_string()))?;
        let promo_char = text.chars().nth(4);

        let mut list = MoveList::new();
        self.generate_moves(&mut list);
        for m in list.iter_moves() {
            if m.from() != from || m.to() != to {
                continue;
            }
            match (m.promoted(), promo_char) {
                (None, None) => return Ok(m),
                (Some(p), Some(c)) if p.piece_type().promo_char() == Some(c) => return Ok(m),
                _ => {}
            }
        }

        Err(MoveParseError::IllegalMove(text.to_string()))
    }

    #[cfg(debug_assertions)]
    pub fn check_validity(&self) {
        let mut white = SquareSet::EMPTY;
        let mut black = SquareSet::EMPTY;
        let mut piece_total = 0;
        for piece in Piece::all() {
            piece_total += self.pieces[piece].count();
            if piece.colour() == Colour::White {
                white |= self.pieces[piece];
            } else {
                black |= self.pieces[piece];
            }
        }
        assert_eq!(white, self.occupancies[Colour::White.index()]);
        assert_eq!(black, self.occupancies[Colour::Black.index()]);
        assert_eq!(white | black, self.occupancies[OCC_BOTH]);
        // piece sets are pairwise disjoint iff the counts add up.
        assert_eq!(piece_total, self.occupancies[OCC_BOTH].count());
        assert_eq!(self.pieces[Piece::WK].count(), 1);
        assert_eq!(self.pieces[Piece::BK].count(), 1);
        assert!(
            self.ep_sq == Square::NONE
                || self.ep_sq.rank() == Rank::RANK_3
                || self.ep_sq.rank() == Rank::RANK_6
        );
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Position equality: the move counter is bookkeeping, not position.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.occupancies == other.occupancies
            && self.side == other.side
            && self.ep_sq == other.ep_sq
            && self.castle_perm == other.castle_perm
    }
}

impl Eq for Board {}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(f)?;
        for row in 0..8u8 {
            write!(f, " {} ", 8 - row)?;
            for file in 0..8u8 {
                let sq = Square::new(row * 8 + file);
                let c = self.piece_at(sq).map_or('.', Piece::char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "\n    a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, " side to move: {}", self.side)?;
        writeln!(f, " en passant:   {}", self.ep_sq.name().unwrap_or("-"))?;
        write!(
            f,
            " castling:     {}{}{}{}",
            if self.castle_perm & WKCA != 0 { 'K' } else { '-' },
            if self.castle_perm & WQCA != 0 { 'Q' } else { '-' },
            if self.castle_perm & BKCA != 0 { 'k' } else { '-' },
            if self.castle_perm & BQCA != 0 { 'q' } else { '-' },
        )
    }
}

impl Debug for Board {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(f, "{self}")?;
        writeln!(f, " fen: {}", self.fen())
    }
}

mod tests {
    #[test]
    fn fen_round_trip() {
        use super::Board;
        let fens = [
            Board::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/1pp1pppp/p7/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        ];
        for fen in fens {
            let pos = Board::from_fen(fen).unwrap();
            let out = pos.fen();
            // the position fields survive; the ignored counters are regenerated.
            assert_eq!(
                out.split_whitespace().take(4).collect::<Vec<_>>(),
                fen.split_whitespace().take(4).collect::<Vec<_>>(),
                "round trip failed for {fen}"
            );
            let reparsed = Board::from_fen(&out).unwrap();
            assert_eq!(reparsed, pos);
        }
    }

    #[test]
    fn fen_rejects_garbage() {
        use super::Board;
        use crate::errors::FenParseError;
        assert!(matches!(
            Board::from_fen(""),
            Err(FenParseError::MissingBoard)
        ));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenParseError::BoardSegments(7))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
            Err(FenParseError::InvalidSide(_))
        ));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/KQkq w - - 0 1"),
            Err(FenParseError::BadSquaresInSegment)
        ));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenParseError::MissingKing { .. })
        ));
    }

    #[test]
    fn occupancies_and_kings() {
        use super::Board;
        use crate::piece::Colour;
        use crate::util::Square;
        let pos = Board::from_fen(Board::STARTING_FEN).unwrap();
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.occupancy(Colour::White).count(), 16);
        assert_eq!(pos.occupancy(Colour::Black).count(), 16);
        assert_eq!(
            pos.occupied(),
            pos.occupancy(Colour::White) | pos.occupancy(Colour::Black)
        );
        assert_eq!(pos.king_square(Colour::White), Square::E1);
        assert_eq!(pos.king_square(Colour::Black), Square::E8);
    }

    #[test]
    fn attack_detection() {
        use super::Board;
        use crate::piece::Colour;
        use crate::util::Square;
        let pos = Board::from_fen(Board::STARTING_FEN).unwrap();
        // the white pawns cover the third rank.
        assert!(pos.sq_attacked(Square::E3, Colour::White));
        assert!(!pos.sq_attacked(Square::E3, Colour::Black));
        // knights cover f3 from g1.
        assert!(pos.sq_attacked(Square::F3, Colour::White));
        assert!(!pos.in_check(Colour::White));
        assert!(!pos.in_check(Colour::Black));

        let pos = Board::from_fen("4k3/8/8/8/7b/8/8/4K3 w - - 0 1").unwrap();
        assert!(pos.sq_attacked(Square::E1, Colour::Black));
        assert!(pos.in_check(Colour::White));
        assert!(!pos.in_check(Colour::Black));
    }

    #[test]
    fn uci_move_resolution() {
        use super::Board;
        use crate::errors::MoveParseError;
        use crate::util::Square;
        let pos = Board::from_fen(Board::STARTING_FEN).unwrap();
        let m = pos.parse_uci("e2e4").unwrap();
        assert_eq!(m.from(), Square::E2);
        assert_eq!(m.to(), Square::E4);
        assert!(m.is_double_push());

        assert!(matches!(
            pos.parse_uci("e2e5"),
            Err(MoveParseError::IllegalMove(_))
        ));
        assert!(matches!(
            pos.parse_uci("e2"),
            Err(MoveParseError::InvalidLength(2))
        ));
        assert!(matches!(
            pos.parse_uci("i9e4"),
            Err(MoveParseError::InvalidSquare(_))
        ));

        // promotions need the trailing letter to resolve.
        let pos = Board::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let m = pos.parse_uci("a7a8q").unwrap();
        assert_eq!(m.promoted().map(crate::piece::Piece::char), Some('Q'));
        assert!(matches!(
            pos.parse_uci("a7a8"),
            Err(MoveParseError::IllegalMove(_))
        ));
    }
}
