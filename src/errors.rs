use std::num::ParseIntError;

use thiserror::Error;

use crate::piece::Colour;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenParseError {
    #[error("FEN string is missing the board part")]
    MissingBoard,
    #[error("board part of FEN has {0} segments, expected 8")]
    BoardSegments(usize),
    #[error("wrong number of squares in a board segment")]
    BadSquaresInSegment,
    #[error("unexpected character in piece placement: '{0}'")]
    UnexpectedCharacter(char),
    #[error("expected side part")]
    MissingSide,
    #[error("expected side to be 'w' or 'b', got \"{0}\"")]
    InvalidSide(String),
    #[error("expected castling part")]
    MissingCastling,
    #[error("invalid castling format: \"{0}\"")]
    InvalidCastling(String),
    #[error("expected en passant part")]
    MissingEnPassant,
    #[error("invalid en passant square: \"{0}\"")]
    InvalidEnPassant(String),
    #[error("{colour} king is missing")]
    MissingKing { colour: Colour },
    #[error("more than one {colour} king")]
    DuplicateKings { colour: Colour },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("invalid move length {0}")]
    InvalidLength(usize),
    #[error("invalid square \"{0}\"")]
    InvalidSquare(String),
    #[error("move {0} is not playable in this position")]
    IllegalMove(String),
}

/// Top-level UCI errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UciError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{0}")]
    Fen(#[from] FenParseError),
    #[error("{0}")]
    Move(#[from] MoveParseError),
    #[error("`position` command requires a position specifier (fen or startpos)")]
    MissingPositionSpecifier,
    #[error("unknown position specifier \"{0}\", expected fen or startpos")]
    UnknownPositionSpecifier(String),
    #[error("missing value after `{0}`")]
    MissingValue(&'static str),
    #[error("failed to parse value for `{param}`: {source}")]
    InvalidValue {
        param: &'static str,
        source: ParseIntError,
    },
}
