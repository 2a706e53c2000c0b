//! The text-protocol seam between the engine core and whatever drives it.
//! One command per line on stdin; `info`/`bestmove` records on stdout.

use std::io::Write;

use crate::{
    board::Board,
    errors::UciError,
    perft,
    piece::Colour,
    search::{self, SearchInfo, MAX_SEARCH_DEPTH},
    NAME, VERSION,
};

// position fen <fen>
// position startpos
// ... moves e2e4 e7e5 b7b8q
fn parse_position(text: &str, pos: &mut Board) -> Result<(), UciError> {
    let mut parts = text.split_ascii_whitespace();
    let command = parts.next();
    debug_assert_eq!(command, Some("position"));

    match parts.next() {
        None => return Err(UciError::MissingPositionSpecifier),
        Some("startpos") => pos.set_startpos(),
        Some("fen") => {
            let mut fen = String::new();
            for part in parts.by_ref() {
                if part == "moves" {
                    break;
                }
                fen.push_str(part);
                fen.push(' ');
            }
            pos.set_from_fen(&fen)?;
            for text in parts {
                let m = pos.parse_uci(text)?;
                if !pos.make_move(m) {
                    return Err(crate::errors::MoveParseError::IllegalMove(text.to_string()).into());
                }
            }
            return Ok(());
        }
        Some(other) => return Err(UciError::UnknownPositionSpecifier(other.to_string())),
    }

    // "position startpos" may be followed by a move list.
    match parts.next() {
        None => {}
        Some("moves") => {
            for text in parts {
                let m = pos.parse_uci(text)?;
                if !pos.make_move(m) {
                    return Err(crate::errors::MoveParseError::IllegalMove(text.to_string()).into());
                }
            }
        }
        Some(other) => return Err(UciError::UnknownPositionSpecifier(other.to_string())),
    }

    Ok(())
}

// go depth 6 / go movetime 4000 / go wtime 300000 btime 300000 winc 2000 binc 2000
// go perft 5
fn parse_go(text: &str, info: &mut SearchInfo, pos: &Board) -> Result<(), UciError> {
    let mut depth: Option<usize> = None;
    let mut movetime: Option<u64> = None;
    let mut time: Option<u64> = None;
    let mut inc: u64 = 0;

    let mut parts = text.split_ascii_whitespace();
    let command = parts.next();
    debug_assert_eq!(command, Some("go"));

    while let Some(part) = parts.next() {
        match part {
            "perft" => {
                let depth = part_parse("perft", parts.next())?;
                perft::split_perft(&mut pos.clone(), depth);
                return Ok(());
            }
            "depth" => depth = Some(part_parse("depth", parts.next())?),
            "movetime" => movetime = Some(part_parse("movetime", parts.next())?),
            "wtime" if pos.turn() == Colour::White => {
                time = Some(part_parse("wtime", parts.next())?);
            }
            "btime" if pos.turn() == Colour::Black => {
                time = Some(part_parse("btime", parts.next())?);
            }
            "winc" if pos.turn() == Colour::White => inc = part_parse("winc", parts.next())?,
            "binc" if pos.turn() == Colour::Black => inc = part_parse("binc", parts.next())?,
            _ => {}
        }
    }

    if let Some(movetime) = movetime {
        info.set_time_window(movetime);
    } else if let Some(time) = time {
        info.set_time_window(SearchInfo::allocate_time(time, inc));
    } else {
        info.unset_time_window();
    }

    info.depth = match depth {
        Some(depth) if (1..=MAX_SEARCH_DEPTH).contains(&depth) => depth,
        _ => MAX_SEARCH_DEPTH,
    };

    search::search_position(pos, info);

    Ok(())
}

fn part_parse<T>(param: &'static str, next_part: Option<&str>) -> Result<T, UciError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    next_part
        .ok_or(UciError::MissingValue(param))?
        .parse()
        .map_err(|source| UciError::InvalidValue { param, source })
}

fn print_uci_response() {
    println!("id name {NAME} {VERSION}");
    println!("id author the {NAME} developers");
    println!("uciok");
}

pub fn main_loop() -> anyhow::Result<()> {
    print_uci_response();

    let mut pos = Board::default();
    pos.set_startpos();
    let mut info = SearchInfo::default();

    let mut line = String::new();
    loop {
        std::io::stdout().flush()?;
        line.clear();
        if std::io::stdin().read_line(&mut line)? == 0 {
            // stdin closed; behave as if we were told to quit.
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let res = match input {
            "uci" => {
                print_uci_response();
                Ok(())
            }
            "isready" => {
                println!("readyok");
                Ok(())
            }
            "ucinewgame" => parse_position("position startpos", &mut pos),
            "print" => {
                println!("{pos}");
                Ok(())
            }
            "eval" => {
                println!("{}", pos.evaluate());
                Ok(())
            }
            "quit" => break,
            input if input.starts_with("position") => parse_position(input, &mut pos),
            input if input.starts_with("go") => parse_go(input, &mut info, &pos),
            _ => Err(UciError::UnknownCommand(input.to_string())),
        };

        if let Err(e) = res {
            eprintln!("error: {e}");
        }
    }

    Ok(())
}

mod tests {
    #[test]
    fn position_command_applies_moves() {
        use super::parse_position;
        use crate::board::Board;
        use crate::util::Square;
        let mut pos = Board::default();
        parse_position("position startpos moves e2e4 c7c5 g1f3", &mut pos).unwrap();
        assert_eq!(pos.fen().split_whitespace().next().unwrap(), "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R");
        assert_eq!(pos.turn(), crate::piece::Colour::Black);
        assert_eq!(pos.ep_sq(), Square::NONE);

        let mut pos = Board::default();
        parse_position(
            "position fen 8/P7/8/8/8/8/8/k6K w - - 0 1 moves a7a8q",
            &mut pos,
        )
        .unwrap();
        assert!(pos.piece_bb(crate::piece::Piece::WQ).contains_square(Square::A8));
    }

    #[test]
    fn position_command_rejects_nonsense() {
        use super::parse_position;
        use crate::board::Board;
        use crate::errors::UciError;
        let mut pos = Board::default();
        assert!(matches!(
            parse_position("position", &mut pos),
            Err(UciError::MissingPositionSpecifier)
        ));
        assert!(matches!(
            parse_position("position sidewards", &mut pos),
            Err(UciError::UnknownPositionSpecifier(_))
        ));
        assert!(matches!(
            parse_position("position startpos moves e2e5", &mut pos),
            Err(UciError::Move(_))
        ));
    }

    #[test]
    fn go_depth_runs_and_records_a_best_move() {
        use super::parse_go;
        use crate::board::Board;
        use crate::search::SearchInfo;
        let mut pos = Board::default();
        pos.set_startpos();
        let mut info = SearchInfo::default();
        parse_go("go depth 1", &mut info, &pos).unwrap();
        assert!(!info.best_move.is_null());
        assert_eq!(info.depth, 1);
    }

    #[test]
    fn go_values_must_be_numbers() {
        use super::parse_go;
        use crate::board::Board;
        use crate::errors::UciError;
        use crate::search::SearchInfo;
        let pos = Board::default();
        let mut info = SearchInfo::default();
        assert!(matches!(
            parse_go("go depth", &mut info, &pos),
            Err(UciError::MissingValue("depth"))
        ));
        assert!(matches!(
            parse_go("go movetime soon", &mut info, &pos),
            Err(UciError::InvalidValue { param: "movetime", .. })
        ));
    }
}
