use std::io::Write;
use std::time::{Duration, Instant};

use crate::{
    board::{
        evaluation::{DRAW_SCORE, MATE_SCORE},
        movegen::MoveList,
        Board,
    },
    chessmove::Move,
    lookups::MVV_LVA,
    piece::{Piece, PieceType},
    util::{BOARD_N_SQUARES, INFINITY, MAX_PLY},
};

/// Half-width of the aspiration window seeded from the previous iteration.
const ASPIRATION_WINDOW: i32 = 50;
/// The fraction of the remaining clock spent on one move.
const THINKING_TIME_RATIO: u64 = 20;
/// The deepest search the driver will accept.
pub const MAX_SEARCH_DEPTH: usize = 20;

const CAPTURE_SCORE_BONUS: i32 = 10_000;
const FIRST_KILLER_SCORE: i32 = 9_000;
const SECOND_KILLER_SCORE: i32 = 8_000;

/// Per-search state: the clock, the node counter, and the ordering and
/// principal-variation tables. One of these lives for a whole engine
/// session and is wiped at the start of every top-level search.
pub struct SearchInfo {
    /// The starting time of the search.
    pub start_time: Instant,
    /// The time at which the search will be cut off.
    pub stop_time: Instant,
    /// Whether the clock is live for this search.
    pub time_set: bool,
    /// The maximum depth of the search.
    pub depth: usize,
    /// Visited-node counter.
    pub nodes: u64,
    /// Set once the clock runs out; the search unwinds cooperatively.
    pub stopped: bool,
    /// The best move of the last completed search.
    pub best_move: Move,

    ply: usize,
    killers: [[Move; MAX_PLY]; 2],
    history: [[i32; BOARD_N_SQUARES]; 12],
    pv_length: [usize; MAX_PLY],
    pv_table: [[Move; MAX_PLY]; MAX_PLY],
}

impl Default for SearchInfo {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            stop_time: Instant::now(),
            time_set: false,
            depth: MAX_SEARCH_DEPTH,
            nodes: 0,
            stopped: false,
            best_move: Move::NULL,
            ply: 0,
            killers: [[Move::NULL; MAX_PLY]; 2],
            history: [[0; BOARD_N_SQUARES]; 12],
            pv_length: [0; MAX_PLY],
            pv_table: [[Move::NULL; MAX_PLY]; MAX_PLY],
        }
    }
}

impl SearchInfo {
    pub fn clear_for_search(&mut self) {
        self.nodes = 0;
        self.stopped = false;
        self.ply = 0;
        self.killers = [[Move::NULL; MAX_PLY]; 2];
        self.history = [[0; BOARD_N_SQUARES]; 12];
        self.pv_length = [0; MAX_PLY];
        self.pv_table = [[Move::NULL; MAX_PLY]; MAX_PLY];
    }

    pub fn set_time_window(&mut self, millis: u64) {
        self.start_time = Instant::now();
        self.stop_time = self.start_time + Duration::from_millis(millis);
        self.time_set = true;
    }

    pub fn unset_time_window(&mut self) {
        self.start_time = Instant::now();
        self.time_set = false;
    }

    /// The soft budget for one move: a fixed fraction of the remaining
    /// clock, but never less than the increment.
    pub fn allocate_time(remaining_millis: u64, increment_millis: u64) -> u64 {
        (remaining_millis / THINKING_TIME_RATIO).max(increment_millis)
    }

    fn check_up(&mut self) {
        if self.time_set
            && Instant::now()
                .checked_duration_since(self.stop_time)
                .is_some()
        {
            self.stopped = true;
        }
    }

    fn insert_killer(&mut self, m: Move) {
        debug_assert!(self.ply < MAX_PLY);
        self.killers[1][self.ply] = self.killers[0][self.ply];
        self.killers[0][self.ply] = m;
    }

    /// The principal variation of the last completed iteration.
    pub fn pv_line(&self) -> &[Move] {
        &self.pv_table[0][..self.pv_length[0]]
    }
}

/// Scores a move for ordering: captures by most-valuable-victim /
/// least-valuable-attacker above everything, then the two killers at this
/// ply, then the history accumulator.
fn score_move(pos: &Board, info: &SearchInfo, m: Move) -> i32 {
    if m.is_capture() {
        // en-passant captures have an empty target square; a pawn victim is
        // exactly right for them.
        let mut victim = Piece::new(pos.turn().flip(), PieceType::Pawn);
        for pt in PieceType::all() {
            let candidate = Piece::new(pos.turn().flip(), pt);
            if pos.piece_bb(candidate).contains_square(m.to()) {
                victim = candidate;
                break;
            }
        }
        MVV_LVA[m.piece()][victim] + CAPTURE_SCORE_BONUS
    } else if info.killers[0][info.ply] == m {
        FIRST_KILLER_SCORE
    } else if info.killers[1][info.ply] == m {
        SECOND_KILLER_SCORE
    } else {
        info.history[m.piece()][m.to().index()]
    }
}

fn score_moves(pos: &Board, info: &SearchInfo, move_list: &mut MoveList) {
    for entry in move_list.entries_mut() {
        entry.score = score_move(pos, info, entry.mov);
    }
}

/// Captures-only extension of the main search, to settle the evaluation
/// at the horizon before trusting it.
fn quiescence(pos: &mut Board, info: &mut SearchInfo, mut alpha: i32, beta: i32) -> i32 {
    info.nodes += 1;

    let eval = pos.evaluate();

    if eval >= beta {
        return beta;
    }
    if eval > alpha {
        alpha = eval;
    }

    if info.ply >= MAX_PLY - 1 {
        return eval;
    }

    let mut move_list = MoveList::new();
    pos.generate_moves(&mut move_list);
    score_moves(pos, info, &mut move_list);
    move_list.sort();

    for m in move_list.iter_moves() {
        info.check_up();
        if info.stopped {
            break;
        }
        if !m.is_capture() {
            continue;
        }

        let snapshot = pos.snapshot();
        info.ply += 1;
        if !pos.make_move(m) {
            info.ply -= 1;
            continue;
        }

        let score = -quiescence(pos, info, -beta, -alpha);

        pos.restore(&snapshot);
        info.ply -= 1;

        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

fn negamax(pos: &mut Board, info: &mut SearchInfo, mut alpha: i32, beta: i32, mut depth: usize) -> i32 {
    info.pv_length[info.ply] = info.ply;

    if depth == 0 {
        return quiescence(pos, info, alpha, beta);
    }

    info.nodes += 1;

    if info.ply >= MAX_PLY - 1 {
        return pos.evaluate();
    }

    let in_check = pos.in_check(pos.turn());
    if in_check {
        // extend so a forcing sequence is never cut off mid-check.
        depth += 1;
    }

    let mut move_list = MoveList::new();
    pos.generate_moves(&mut move_list);
    score_moves(pos, info, &mut move_list);
    move_list.sort();

    let mut legal_moves = 0;

    for m in move_list.iter_moves() {
        info.check_up();
        if info.stopped {
            break;
        }

        let snapshot = pos.snapshot();
        info.ply += 1;
        if !pos.make_move(m) {
            info.ply -= 1;
            continue;
        }
        legal_moves += 1;

        let score = -negamax(pos, info, -beta, -alpha, depth - 1);

        pos.restore(&snapshot);
        info.ply -= 1;

        if info.stopped {
            break;
        }

        if score >= beta {
            if !m.is_capture() {
                info.insert_killer(m);
            }
            return beta;
        }

        if score > alpha {
            if !m.is_capture() {
                info.history[m.piece()][m.to().index()] += depth as i32;
            }
            alpha = score;

            // graft this move onto the line the child found.
            let ply = info.ply;
            let next_len = info.pv_length[ply + 1];
            info.pv_table[ply][ply] = m;
            let (rows, rest) = info.pv_table.split_at_mut(ply + 1);
            rows[ply][ply + 1..next_len].copy_from_slice(&rest[0][ply + 1..next_len]);
            info.pv_length[ply] = next_len;
        }
    }

    if legal_moves == 0 {
        if in_check {
            // mated: prefer the longest defence.
            return -MATE_SCORE + info.ply as i32;
        }
        return DRAW_SCORE;
    }

    alpha
}

/// Iterative-deepening driver. Runs on a scratch copy of the caller's
/// board, narrows the window around each completed iteration's score, and
/// on a window miss retries the same depth with the window thrown open.
pub fn search_position(pos: &Board, info: &mut SearchInfo) -> Move {
    info.clear_for_search();

    let mut board = pos.clone();
    let mut alpha = -INFINITY;
    let mut beta = INFINITY;
    let mut depth = 1;

    while depth <= info.depth {
        info.check_up();
        if info.stopped {
            break;
        }

        let score = negamax(&mut board, info, alpha, beta, depth);
        if info.stopped {
            break;
        }

        if score <= alpha || score >= beta {
            alpha = -INFINITY;
            beta = INFINITY;
            continue;
        }
        alpha = score - ASPIRATION_WINDOW;
        beta = score + ASPIRATION_WINDOW;

        print!(
            "info score cp {score} depth {depth} nodes {} pv",
            info.nodes
        );
        for m in info.pv_line() {
            print!(" {m}");
        }
        println!();
        let _ = std::io::stdout().flush();

        depth += 1;
    }

    let mut best = info.pv_table[0][0];
    if best.is_null() {
        // the clock beat even the first iteration; play anything legal.
        best = first_legal_move(&mut board).unwrap_or(Move::NULL);
    }
    println!("bestmove {best}");
    let _ = std::io::stdout().flush();

    info.best_move = best;
    best
}

fn first_legal_move(pos: &mut Board) -> Option<Move> {
    let mut move_list = MoveList::new();
    pos.generate_moves(&mut move_list);
    for m in move_list.iter_moves() {
        let snapshot = pos.snapshot();
        if pos.make_move(m) {
            pos.restore(&snapshot);
            return Some(m);
        }
    }
    None
}

mod tests {
    #[allow(dead_code)]
    fn depth_limited(depth: usize) -> super::SearchInfo {
        let mut info = super::SearchInfo::default();
        info.depth = depth;
        info
    }

    #[test]
    fn the_opening_move_is_legal() {
        use super::search_position;
        use crate::board::Board;
        let pos = Board::from_fen(Board::STARTING_FEN).unwrap();
        let mut info = depth_limited(1);
        let best = search_position(&pos, &mut info);
        assert!(!best.is_null());
        assert_eq!(info.best_move, best);
        // it must be one of white's twenty openers.
        let mut scratch = pos.clone();
        let resolved = scratch.parse_uci(&best.to_string()).unwrap();
        assert!(scratch.make_move(resolved));
        assert!(info.pv_line().first() == Some(&best));
    }

    #[test]
    fn mate_in_one_is_found() {
        use super::search_position;
        use crate::board::{movegen::MoveList, Board};
        let pos = Board::from_fen("6k1/5ppp/8/8/8/8/5PPP/R6K w - - 0 1").unwrap();
        let mut info = depth_limited(3);
        let best = search_position(&pos, &mut info);

        // applying the move must leave black mated: in check, no replies.
        let mut after = pos.clone();
        assert!(after.make_move(best));
        assert!(after.in_check(crate::piece::Colour::Black));
        let mut replies = MoveList::new();
        after.generate_moves(&mut replies);
        let mut legal = 0;
        for m in replies.iter_moves() {
            let snap = after.snapshot();
            if after.make_move(m) {
                after.restore(&snap);
                legal += 1;
            }
        }
        assert_eq!(legal, 0, "{best} did not mate");
    }

    #[test]
    fn stalemate_is_a_draw() {
        use super::negamax;
        use crate::board::{movegen::MoveList, Board};
        use crate::util::INFINITY;
        let mut pos = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();

        // black has no legal moves and is not in check.
        assert!(!pos.in_check(crate::piece::Colour::Black));
        let mut list = MoveList::new();
        pos.generate_moves(&mut list);
        let mut legal = 0;
        for m in list.iter_moves() {
            let snap = pos.snapshot();
            if pos.make_move(m) {
                pos.restore(&snap);
                legal += 1;
            }
        }
        assert_eq!(legal, 0);

        let mut info = depth_limited(2);
        info.clear_for_search();
        let score = negamax(&mut pos, &mut info, -INFINITY, INFINITY, 2);
        assert_eq!(score, super::DRAW_SCORE);
    }

    #[test]
    fn mated_scores_prefer_later_mates() {
        use super::negamax;
        use crate::board::{evaluation::MATE_SCORE, Board};
        use crate::util::INFINITY;
        // black to move, already mated in the corner.
        let mut pos = Board::from_fen("6rk/5Npp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert!(pos.in_check(crate::piece::Colour::Black));
        let mut info = depth_limited(1);
        info.clear_for_search();
        let score = negamax(&mut pos, &mut info, -INFINITY, INFINITY, 1);
        assert_eq!(score, -MATE_SCORE);
    }

    #[test]
    fn time_allocation_clamps_to_the_increment() {
        use super::SearchInfo;
        assert_eq!(SearchInfo::allocate_time(20_000, 0), 1_000);
        assert_eq!(SearchInfo::allocate_time(20_000, 5_000), 5_000);
        assert_eq!(SearchInfo::allocate_time(0, 0), 0);
    }

    #[test]
    fn captures_order_ahead_of_quiets() {
        use super::{score_moves, SearchInfo};
        use crate::board::{movegen::MoveList, Board};
        let pos = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let info = SearchInfo::default();
        let mut list = MoveList::new();
        pos.generate_moves(&mut list);
        score_moves(&pos, &info, &mut list);
        list.sort();
        assert!(list[0].is_capture());
    }
}
