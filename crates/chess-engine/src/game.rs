//! Full game management with history tracking.
//!
//! The [`Game`] struct wraps a [`Position`] with:
//! - a move history that supports undo and redo
//! - reduced-FEN repetition counts for the threefold rule
//! - state classification after every change (mate, stalemate, 50-move
//!   rule, insufficient material, repetition)
//! - loading and writing numbered move lists (`1. e4 e5`)

use crate::config::GameConfig;
use crate::movegen::{generate_legal_ex, has_legal_moves, MoveList};
use crate::notation::{move_from_str, move_to_str, MoveParseError};
use crate::position::PositionInfo;
use crate::Position;
use chess_core::{Color, FenError, Move, MoveFormat, PieceType};
use std::collections::HashMap;
use std::io::{Read, Write};
use thiserror::Error;
use tracing::{debug, trace};

/// Where the game stands after the last change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// The side to move has legal moves and no draw rule applies.
    Active,
    /// Drawn; see [`Game::draw_cause`].
    Draw,
    /// White won by checkmate or on time.
    WhiteWin,
    /// Black won by checkmate or on time.
    BlackWin,
    /// No game has been set up.
    Undefined,
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawCause {
    /// 100 plies without a capture or pawn move.
    Rule50,
    /// Neither side can mate.
    Material,
    /// The same reduced FEN occurred three times.
    ThreefoldRepetition,
    /// The side to move has no legal move and is not in check.
    Stalemate,
}

/// Error type for game operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// The FEN could not be loaded.
    #[error("invalid FEN: {0}")]
    Fen(#[from] FenError),
    /// Move text could not be resolved.
    #[error(transparent)]
    Parse(#[from] MoveParseError),
    /// A White move was not preceded by `<number>.`.
    #[error("missing or wrong move number {expected}")]
    MissingMoveNumber { expected: u32 },
    /// A move of a loaded game could not be played.
    #[error("{side:?} move at ply {ply} is illegal: {text}")]
    IllegalMove {
        ply: u32,
        side: Color,
        text: String,
        #[source]
        source: MoveParseError,
    },
    /// Reading or writing the move list failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A move in game history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    mv: Move,
    prev: PositionInfo,
    notation: [String; 3],
}

impl GameRecord {
    /// The move that was played.
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// State of the position the move was played from.
    pub fn prev(&self) -> &PositionInfo {
        &self.prev
    }

    /// The move written in `format`, as it read when it was played.
    pub fn text(&self, format: MoveFormat) -> &str {
        &self.notation[format.index()]
    }
}

/// A chess game with history, repetition tracking, and result detection.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    /// Position [`Game::reset`] returns to.
    start: Position,
    state: GameState,
    draw_cause: Option<DrawCause>,
    /// Played moves followed by undone ones that can still be redone.
    history: Vec<GameRecord>,
    /// Number of played moves in `history`.
    cursor: usize,
    /// Occurrences of each reduced FEN along the played line.
    repetitions: HashMap<String, usize>,
    config: GameConfig,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_parts(Position::startpos(), GameConfig::default())
    }

    /// Creates a game that starts from the configured position.
    pub fn with_config(config: GameConfig) -> Result<Self, GameError> {
        let start = Position::from_fen(&config.start_fen)?;
        Ok(Self::from_parts(start, config))
    }

    fn from_parts(start: Position, config: GameConfig) -> Self {
        let mut game = Game {
            position: start.clone(),
            start,
            state: GameState::Undefined,
            draw_cause: None,
            history: Vec::new(),
            cursor: 0,
            repetitions: HashMap::new(),
            config,
        };
        game.reset();
        game
    }

    /// Empties the board and forgets the history.
    pub fn clear(&mut self) {
        self.position.clear();
        self.forget_history();
        self.state = GameState::Undefined;
        self.draw_cause = None;
    }

    /// Returns to the start position with an empty history.
    pub fn reset(&mut self) {
        self.position = self.start.clone();
        self.begin();
    }

    /// Sets up a position from FEN with an empty history. On error the game
    /// is unchanged.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), GameError> {
        let position = Position::from_fen(fen).map_err(|err| {
            debug!(%err, fen, "FEN rejected");
            err
        })?;
        self.position = position;
        self.begin();
        Ok(())
    }

    /// FEN of the current position.
    pub fn fen(&self, omit_counters: bool) -> String {
        self.position.to_fen(omit_counters)
    }

    fn forget_history(&mut self) {
        self.history.clear();
        self.cursor = 0;
        self.repetitions.clear();
    }

    fn begin(&mut self) {
        self.forget_history();
        self.count_position(1);
        self.update_state();
    }

    /// The current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The configuration the game was created with.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Where the game stands.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Why the game is drawn, if it is.
    pub fn draw_cause(&self) -> Option<DrawCause> {
        self.draw_cause
    }

    /// Every recorded move, including undone moves that can be redone.
    pub fn history(&self) -> &[GameRecord] {
        &self.history
    }

    /// The moves leading to the current position.
    pub fn moves(&self) -> &[GameRecord] {
        &self.history[..self.cursor]
    }

    /// How often the current position occurred along the played line.
    pub fn repetition_count(&self) -> usize {
        self.repetitions
            .get(&self.position.to_fen(true))
            .copied()
            .unwrap_or(0)
    }

    /// Legal moves of the side to move, every promotion piece included.
    pub fn legal_moves(&mut self) -> MoveList {
        generate_legal_ex(&mut self.position)
    }

    /// Returns true if the side to move has a legal move.
    pub fn has_legal_moves(&mut self) -> bool {
        has_legal_moves(&mut self.position)
    }

    /// Returns true if `user_side` is to move. `None` means both sides are
    /// played locally.
    pub fn is_user_turn(&self, user_side: Option<Color>) -> bool {
        user_side.map_or(true, |side| side == self.position.turn())
    }

    /// [`Game::is_user_turn`] for the configured human side.
    pub fn is_human_turn(&self) -> bool {
        self.is_user_turn(self.config.human_side)
    }

    /// Parses move text against the current position.
    pub fn move_from_str(&mut self, text: &str, format: MoveFormat) -> Result<Move, MoveParseError> {
        move_from_str(&mut self.position, text, format)
    }

    /// Writes a move of the current position as text.
    pub fn move_to_str(&mut self, m: Move, format: MoveFormat) -> Result<String, MoveParseError> {
        move_to_str(&mut self.position, m, format)
    }

    /// The side that ran out of time loses. Ignored unless the game is
    /// active.
    pub fn timeout(&mut self, side: Color) {
        if self.state != GameState::Active {
            return;
        }
        self.set_state(winner(side.opposite()), None);
    }

    /// Plays a legal move. Undone moves that were not redone are dropped.
    /// Returns false, leaving the game unchanged, if the move is illegal.
    pub fn do_move(&mut self, m: Move) -> bool {
        let Ok(san) = move_to_str(&mut self.position, m, MoveFormat::San) else {
            debug!(mv = %m, fen = %self.position, "illegal move rejected");
            return false;
        };
        let Some(prev) = self.position.do_move(m) else {
            debug!(mv = %m, fen = %self.position, "illegal move rejected");
            return false;
        };

        trace!(mv = %m, san = %san, ply = self.position.game_ply(), "move played");
        self.history.truncate(self.cursor);
        self.history.push(GameRecord {
            mv: m,
            prev,
            notation: [m.to_an(), san, m.to_uci()],
        });
        self.cursor += 1;
        self.count_position(1);
        self.update_state();
        true
    }

    /// Parses move text and plays it.
    pub fn do_move_str(&mut self, text: &str, format: MoveFormat) -> Result<(), MoveParseError> {
        let m = self.move_from_str(text, format).map_err(|err| {
            debug!(%err, text, "move text rejected");
            err
        })?;
        if self.do_move(m) {
            Ok(())
        } else {
            Err(MoveParseError::Illegal(text.to_string()))
        }
    }

    /// Takes back the last played move. Returns false if there is none.
    pub fn undo_move(&mut self) -> bool {
        let Some(record) = self.cursor.checked_sub(1).and_then(|i| self.history.get(i)) else {
            return false;
        };
        let (mv, prev) = (record.mv, record.prev);

        self.count_position(-1);
        if !self.position.undo_move(mv, prev) {
            self.count_position(1);
            return false;
        }

        trace!(mv = %mv, ply = self.position.game_ply(), "move undone");
        self.cursor -= 1;
        self.update_state();
        true
    }

    /// Replays the last undone move. Returns false if there is none.
    pub fn redo_move(&mut self) -> bool {
        let Some(mv) = self.history.get(self.cursor).map(|r| r.mv) else {
            return false;
        };
        if self.position.do_move(mv).is_none() {
            return false;
        }

        trace!(mv = %mv, ply = self.position.game_ply(), "move redone");
        self.cursor += 1;
        self.count_position(1);
        self.update_state();
        true
    }

    /// Replays a numbered move list in the configured format.
    pub fn load_game<R: Read>(&mut self, reader: R) -> Result<(), GameError> {
        self.load_game_as(reader, self.config.move_format)
    }

    /// Resets the game and replays a numbered move list (`1. e4 e5 2. Nf3`)
    /// until the input ends or the game is over.
    ///
    /// On error the game holds whatever was replayed before the failure.
    pub fn load_game_as<R: Read>(&mut self, mut reader: R, format: MoveFormat) -> Result<(), GameError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.reset();

        let mut tokens = text.split_whitespace();
        while self.state == GameState::Active {
            let expected = self.position.fullmove_number();
            let side = self.position.turn();

            let Some(mut token) = tokens.next() else {
                break;
            };
            match side {
                Color::White => {
                    token = strip_move_number(token, expected, ".")
                        .ok_or(GameError::MissingMoveNumber { expected })?;
                }
                // A list starting with Black's move numbers it `N...`.
                Color::Black if self.cursor == 0 => {
                    token = strip_move_number(token, expected, "...").unwrap_or(token);
                }
                Color::Black => {}
            }
            if token.is_empty() {
                match tokens.next() {
                    Some(next) => token = next,
                    None => break,
                }
            }

            if let Err(source) = self.do_move_str(token, format) {
                let ply = self.position.game_ply();
                debug!(ply, ?side, token, "game load stopped at illegal move");
                return Err(GameError::IllegalMove {
                    ply,
                    side,
                    text: token.to_string(),
                    source,
                });
            }
        }

        debug!(moves = self.cursor, state = ?self.state, "game loaded");
        Ok(())
    }

    /// Writes the played moves in the configured format.
    pub fn write_game<W: Write>(&self, writer: W) -> Result<(), GameError> {
        self.write_game_as(writer, self.config.move_format)
    }

    /// Writes the played moves as a numbered list, one full move per line.
    pub fn write_game_as<W: Write>(&self, mut writer: W, format: MoveFormat) -> Result<(), GameError> {
        writer.write_all(self.move_text(format).as_bytes())?;
        Ok(())
    }

    /// The played moves as a numbered list, one full move per line.
    pub fn move_text(&self, format: MoveFormat) -> String {
        let first_ply = (self.position.game_ply() as usize).saturating_sub(self.cursor);
        let mut text = String::new();

        for (i, record) in self.moves().iter().enumerate() {
            let ply = first_ply + i;
            let number = ply / 2 + 1;
            if ply % 2 == 0 {
                text.push_str(&format!("{number}. "));
            } else if i == 0 {
                text.push_str(&format!("{number}... "));
            }
            text.push_str(record.text(format));
            text.push(if ply % 2 == 0 { ' ' } else { '\n' });
        }

        if text.ends_with(' ') {
            text.pop();
            text.push('\n');
        }
        text
    }

    fn count_position(&mut self, delta: isize) {
        let key = self.position.to_fen(true);
        let count = self.repetitions.entry(key).or_insert(0);
        *count = count.saturating_add_signed(delta);
    }

    /// Classifies the current position.
    fn update_state(&mut self) {
        let (state, cause) = if !has_legal_moves(&mut self.position) {
            if self.position.is_in_check() {
                (winner(self.position.turn().opposite()), None)
            } else {
                (GameState::Draw, Some(DrawCause::Stalemate))
            }
        } else if self.position.rule50() >= 100 {
            (GameState::Draw, Some(DrawCause::Rule50))
        } else if is_insufficient_material(&self.position) {
            (GameState::Draw, Some(DrawCause::Material))
        } else if self.repetition_count() >= 3 {
            (GameState::Draw, Some(DrawCause::ThreefoldRepetition))
        } else {
            (GameState::Active, None)
        };
        self.set_state(state, cause);
    }

    fn set_state(&mut self, state: GameState, cause: Option<DrawCause>) {
        if (state, cause) != (self.state, self.draw_cause) {
            debug!(from = ?self.state, to = ?state, ?cause, "game state changed");
        }
        self.state = state;
        self.draw_cause = cause;
    }
}

fn winner(color: Color) -> GameState {
    match color {
        Color::White => GameState::WhiteWin,
        Color::Black => GameState::BlackWin,
    }
}

/// Splits `<expected><suffix>` off the front of `token`, returning the rest.
fn strip_move_number<'a>(token: &'a str, expected: u32, suffix: &str) -> Option<&'a str> {
    let digits = token.find(|c: char| !c.is_ascii_digit())?;
    let number: u32 = token[..digits].parse().ok()?;
    let rest = token[digits..].strip_prefix(suffix)?;
    (number == expected && !rest.starts_with('.')).then_some(rest)
}

/// Bare kings, king and one minor piece against a bare king, or one bishop
/// each on squares of the same color.
fn is_insufficient_material(position: &Position) -> bool {
    let white = position.total_pieces(Color::White);
    let black = position.total_pieces(Color::Black);
    if white > 2 || black > 2 {
        return false;
    }
    if white == 1 && black == 1 {
        return true;
    }

    let lone_minor = |color: Color| {
        position.piece_count(color, PieceType::Knight) == 1
            || position.piece_count(color, PieceType::Bishop) == 1
    };
    if (black == 1 && lone_minor(Color::White)) || (white == 1 && lone_minor(Color::Black)) {
        return true;
    }

    match (
        position.piece_list(Color::White, PieceType::Bishop),
        position.piece_list(Color::Black, PieceType::Bishop),
    ) {
        ([w], [b]) => w.color() == b.color(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Square;

    fn play(game: &mut Game, moves: &[&str]) {
        for san in moves {
            game.do_move_str(san, MoveFormat::San)
                .unwrap_or_else(|e| panic!("{san}: {e}"));
        }
    }

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.state(), GameState::Active);
        assert_eq!(game.draw_cause(), None);
        assert!(game.moves().is_empty());
        assert_eq!(game.repetition_count(), 1);
    }

    #[test]
    fn do_move_records_every_format() {
        let mut game = Game::new();
        assert!(game.do_move(Move::new(sq("g1"), sq("f3"))));
        let record = &game.moves()[0];
        assert_eq!(record.text(MoveFormat::An), "g1-f3");
        assert_eq!(record.text(MoveFormat::San), "Nf3");
        assert_eq!(record.text(MoveFormat::Uci), "g1f3");
        assert_eq!(record.prev(), Position::startpos().info());
    }

    #[test]
    fn illegal_move_is_rejected() {
        let mut game = Game::new();
        assert!(!game.do_move(Move::new(sq("e2"), sq("e5"))));
        assert!(game.moves().is_empty());
        assert!(matches!(
            game.do_move_str("e2e5", MoveFormat::Uci),
            Err(MoveParseError::Illegal(_))
        ));
        assert!(matches!(
            game.do_move_str("zz", MoveFormat::San),
            Err(MoveParseError::Malformed(_))
        ));
        assert_eq!(game.fen(false), Position::startpos().to_fen(false));
    }

    #[test]
    fn checkmate_fools_mate() {
        let mut game = Game::new();
        play(&mut game, &["f3", "e5", "g4", "Qh4"]);
        assert_eq!(game.state(), GameState::BlackWin);
        assert_eq!(game.moves()[3].text(MoveFormat::San), "Qh4#");
    }

    #[test]
    fn checkmated_position_from_fen() {
        let mut game = Game::new();
        game.load_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert!(game.legal_moves().is_empty());
        assert!(game.position().is_in_check());
        assert_eq!(game.state(), GameState::BlackWin);
    }

    #[test]
    fn stalemate() {
        let mut game = Game::new();
        game.load_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.state(), GameState::Draw);
        assert_eq!(game.draw_cause(), Some(DrawCause::Stalemate));
    }

    #[test]
    fn threefold_repetition() {
        let mut game = Game::new();
        play(&mut game, &["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1"]);
        assert_eq!(game.state(), GameState::Active);

        play(&mut game, &["Ng8"]);
        assert_eq!(game.repetition_count(), 3);
        assert_eq!(game.state(), GameState::Draw);
        assert_eq!(game.draw_cause(), Some(DrawCause::ThreefoldRepetition));

        play(&mut game, &["Nf3", "Nf6"]);
        assert_eq!(game.state(), GameState::Draw);
        assert_eq!(game.draw_cause(), Some(DrawCause::ThreefoldRepetition));
    }

    #[test]
    fn undo_and_redo_keep_repetition_counts() {
        let mut game = Game::new();
        play(&mut game, &["Nf3", "Nf6", "Ng1", "Ng8"]);
        for _ in 0..4 {
            assert!(game.undo_move());
        }
        for _ in 0..4 {
            assert!(game.redo_move());
        }
        assert_eq!(game.repetition_count(), 2);

        play(&mut game, &["Nf3"]);
        assert_eq!(game.repetition_count(), 2);
        assert_eq!(game.state(), GameState::Active);
    }

    #[test]
    fn fifty_move_rule() {
        let mut game = Game::new();
        game.load_fen("8/8/8/8/8/8/8/R3K2k w Q - 99 1").unwrap();
        assert_eq!(game.state(), GameState::Active);
        assert!(game.do_move(Move::new(sq("a1"), sq("a2"))));
        assert_eq!(game.state(), GameState::Draw);
        assert_eq!(game.draw_cause(), Some(DrawCause::Rule50));
    }

    #[test]
    fn bare_kings_are_a_material_draw() {
        let mut game = Game::new();
        game.load_fen("8/8/8/4k3/8/8/4K3/8 w - - 0 1").unwrap();
        assert!(game.has_legal_moves());
        assert_eq!(game.state(), GameState::Draw);
        assert_eq!(game.draw_cause(), Some(DrawCause::Material));
    }

    #[test]
    fn insufficient_material_cases() {
        let drawn = [
            "8/8/8/4k3/8/8/4K1N1/8 w - - 0 1",
            "8/8/4b3/4k3/8/8/4K3/8 w - - 0 1",
            "8/8/4b3/4k3/8/3B4/4K3/8 w - - 0 1",
        ];
        for fen in drawn {
            let position = Position::from_fen(fen).unwrap();
            assert!(is_insufficient_material(&position), "{fen}");
        }
        let playable = [
            "8/8/3b4/4k3/8/3B4/4K3/8 w - - 0 1",
            "8/8/8/4k3/8/8/4K1R1/8 w - - 0 1",
            "8/8/8/4k3/8/8/4KNN1/8 w - - 0 1",
            "8/8/8/4k3/8/8/4K1P1/8 w - - 0 1",
        ];
        for fen in playable {
            let position = Position::from_fen(fen).unwrap();
            assert!(!is_insufficient_material(&position), "{fen}");
        }
    }

    #[test]
    fn undo_redo() {
        let mut game = Game::new();
        assert!(!game.undo_move());
        assert!(!game.redo_move());

        play(&mut game, &["e4", "e5"]);
        let after_e5 = game.fen(false);
        assert!(game.undo_move());
        assert_eq!(
            game.fen(false),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert!(game.redo_move());
        assert_eq!(game.fen(false), after_e5);
        assert!(!game.redo_move());

        assert!(game.undo_move());
        assert!(game.undo_move());
        assert!(!game.undo_move());
        assert_eq!(game.fen(false), Position::startpos().to_fen(false));
        assert_eq!(game.history().len(), 2);
        assert!(game.moves().is_empty());
    }

    #[test]
    fn new_move_drops_redo_tail() {
        let mut game = Game::new();
        play(&mut game, &["e4", "e5"]);
        assert!(game.undo_move());
        play(&mut game, &["d5"]);
        assert!(!game.redo_move());
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.moves()[1].text(MoveFormat::San), "d5");
    }

    #[test]
    fn undo_restores_active_state_after_mate() {
        let mut game = Game::new();
        play(&mut game, &["f3", "e5", "g4", "Qh4"]);
        assert!(game.undo_move());
        assert_eq!(game.state(), GameState::Active);
        assert!(game.redo_move());
        assert_eq!(game.state(), GameState::BlackWin);
    }

    #[test]
    fn move_text_groups_full_moves() {
        let mut game = Game::new();
        play(&mut game, &["e4", "e5", "Nf3", "Nc6", "Bb5"]);
        assert_eq!(game.move_text(MoveFormat::San), "1. e4 e5\n2. Nf3 Nc6\n3. Bb5\n");
        assert_eq!(
            game.move_text(MoveFormat::Uci),
            "1. e2e4 e7e5\n2. g1f3 b8c6\n3. f1b5\n"
        );
        assert_eq!(
            game.move_text(MoveFormat::An),
            "1. e2-e4 e7-e5\n2. g1-f3 b8-c6\n3. f1-b5\n"
        );
    }

    #[test]
    fn write_and_load_roundtrip() {
        let mut game = Game::new();
        play(&mut game, &["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "O-O"]);

        for format in MoveFormat::ALL {
            let mut out = Vec::new();
            game.write_game_as(&mut out, format).unwrap();

            let mut loaded = Game::new();
            loaded.load_game_as(out.as_slice(), format).unwrap();
            assert_eq!(loaded.fen(false), game.fen(false), "{format:?}");
            assert_eq!(loaded.moves(), game.moves());
        }
    }

    #[test]
    fn load_accepts_number_attached_to_move() {
        let mut game = Game::new();
        game.load_game("1.e4 e5 2.Nf3".as_bytes()).unwrap();
        assert_eq!(game.moves().len(), 3);
    }

    #[test]
    fn load_stops_when_game_ends() {
        let mut game = Game::new();
        game.load_game("1. f3 e5 2. g4 Qh4# 3. a3".as_bytes()).unwrap();
        assert_eq!(game.moves().len(), 4);
        assert_eq!(game.state(), GameState::BlackWin);
    }

    #[test]
    fn load_errors() {
        let mut game = Game::new();
        assert!(matches!(
            game.load_game("e4 e5".as_bytes()),
            Err(GameError::MissingMoveNumber { expected: 1 })
        ));
        assert!(matches!(
            game.load_game("1. e4 e5 3. Nf3".as_bytes()),
            Err(GameError::MissingMoveNumber { expected: 2 })
        ));
        assert!(matches!(
            game.load_game("1. e4 e5 2.. Nf3".as_bytes()),
            Err(GameError::MissingMoveNumber { expected: 2 })
        ));

        let err = game.load_game("1. e4 e5 2. Ke3".as_bytes()).unwrap_err();
        match err {
            GameError::IllegalMove { ply, side, text, .. } => {
                assert_eq!(ply, 2);
                assert_eq!(side, Color::White);
                assert_eq!(text, "Ke3");
            }
            other => panic!("unexpected error {other}"),
        }
        // The replayed prefix stays on the board.
        assert_eq!(game.moves().len(), 2);
    }

    #[test]
    fn load_from_black_to_move_start() {
        let config = GameConfig {
            start_fen: "4k3/8/8/8/8/8/4P3/4K3 b - - 0 7".to_string(),
            ..GameConfig::default()
        };
        let mut game = Game::with_config(config).unwrap();
        play(&mut game, &["Kd7", "e4"]);
        assert_eq!(game.move_text(MoveFormat::San), "7... Kd7\n8. e4\n");

        let text = game.move_text(MoveFormat::San);
        let fen = game.fen(false);
        game.load_game(text.as_bytes()).unwrap();
        assert_eq!(game.fen(false), fen);
    }

    #[test]
    fn timeout_loses_on_time() {
        let mut game = Game::new();
        game.timeout(Color::White);
        assert_eq!(game.state(), GameState::BlackWin);
        game.timeout(Color::Black);
        assert_eq!(game.state(), GameState::BlackWin);
    }

    #[test]
    fn user_turn() {
        let mut game = Game::new();
        assert!(game.is_user_turn(None));
        assert!(game.is_user_turn(Some(Color::White)));
        assert!(!game.is_user_turn(Some(Color::Black)));
        play(&mut game, &["e4"]);
        assert!(game.is_user_turn(Some(Color::Black)));
        assert!(game.is_human_turn());
    }

    #[test]
    fn config_start_position_and_reset() {
        let config = GameConfig::from_toml_str(
            r#"
start_fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"
move_format = "uci"
human_side = "black"
"#,
        )
        .unwrap();
        let mut game = Game::with_config(config).unwrap();
        assert!(!game.is_human_turn());
        game.load_game("1. e2e4".as_bytes()).unwrap();
        assert_eq!(game.fen(false), "4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1");

        game.reset();
        assert_eq!(game.fen(false), "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert!(game.moves().is_empty());
    }

    #[test]
    fn with_config_rejects_bad_fen() {
        let config = GameConfig {
            start_fen: "8/8/8/8/8/8/8/8 w - - 0 1".to_string(),
            ..GameConfig::default()
        };
        assert!(matches!(Game::with_config(config), Err(GameError::Fen(_))));
    }

    #[test]
    fn load_fen_error_leaves_game_unchanged() {
        let mut game = Game::new();
        play(&mut game, &["e4"]);
        let fen = game.fen(false);
        assert!(matches!(game.load_fen("nonsense"), Err(GameError::Fen(_))));
        assert_eq!(game.fen(false), fen);
        assert_eq!(game.moves().len(), 1);
    }

    #[test]
    fn extreme_fen_counters_are_handled() {
        let mut game = Game::new();
        assert!(matches!(
            game.load_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 3000000000"),
            Err(GameError::Fen(FenError::InvalidFullmoveNumber(_)))
        ));

        game.load_fen("4k3/8/8/8/8/8/8/R3K3 w - - 4294967295 1").unwrap();
        assert_eq!(game.state(), GameState::Draw);
        assert!(game.do_move_str("Ra2", MoveFormat::San).is_ok());
        assert_eq!(game.position().rule50(), u32::MAX);
        assert!(game.undo_move());
        assert_eq!(game.fen(false), "4k3/8/8/8/8/8/8/R3K3 w - - 4294967295 1");
    }

    #[test]
    fn clear_empties_the_board() {
        let mut game = Game::new();
        play(&mut game, &["e4"]);
        game.clear();
        assert_eq!(game.state(), GameState::Undefined);
        assert_eq!(game.position().occupied().count(), 0);
        assert!(game.history().is_empty());
        assert!(!game.undo_move());
    }

    #[test]
    fn move_string_helpers() {
        let mut game = Game::new();
        let m = game.move_from_str("e2-e4", MoveFormat::An).unwrap();
        assert_eq!(game.move_to_str(m, MoveFormat::San).unwrap(), "e4");
        assert_eq!(game.legal_moves().len(), 20);
    }
}
