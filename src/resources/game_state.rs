use std::fmt;
use std::ops::{Index, IndexMut};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
#[repr(u8)]
pub enum Mark {
    #[default]
    Empty = 0,
    X = 1,
    O = 2,
}

impl Mark {
    pub fn is_empty(self) -> bool {
        self == Mark::Empty
    }

    fn symbol(self) -> char {
        match self {
            Mark::Empty => ' ',
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Player {
    X = 1,
    O = 2,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn mark(self) -> Mark {
        match self {
            Player::X => Mark::X,
            Player::O => Mark::O,
        }
    }
}

#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
#[repr(u8)]
pub enum Winner {
    #[default]
    None = 0,
    X = 1,
    O = 2,
    Tie = 3,
}

impl Winner {
    pub fn is_decided(self) -> bool {
        self != Winner::None
    }

    /// The mark a winning triple has to hold, if this outcome has one.
    fn mark(self) -> Option<Mark> {
        match self {
            Winner::X => Some(Mark::X),
            Winner::O => Some(Mark::O),
            Winner::None | Winner::Tie => None,
        }
    }
}

impl From<Player> for Winner {
    fn from(player: Player) -> Self {
        match player {
            Player::X => Winner::X,
            Player::O => Winner::O,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0} is not a board position")]
pub struct PositionError(pub u8);

/// Cell index, row-major:
///
/// ```text
/// 0|1|2
/// -+-+-
/// 3|4|5
/// -+-+-
/// 6|7|8
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct Position(u8);

impl Position {
    pub const COUNT: usize = 9;

    pub fn new(index: u8) -> Result<Self, PositionError> {
        if (index as usize) < Self::COUNT {
            Ok(Self(index))
        } else {
            Err(PositionError(index))
        }
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..Self::COUNT as u8).map(Position)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn column(self) -> u8 {
        self.0 % 3
    }

    pub fn row(self) -> u8 {
        self.0 / 3
    }
}

impl TryFrom<u8> for Position {
    type Error = PositionError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Board(pub [Mark; Position::COUNT]);

impl Board {
    /// Largest encodable state number, 3^9 - 1.
    pub const MAX_STATE: u32 = 19_682;

    /// Decodes the base-3 state number the game server stores boards as:
    /// position `i` holds digit `i`.
    pub fn from_state(state: u32) -> Result<Self, GameStateError> {
        if state > Self::MAX_STATE {
            return Err(GameStateError::StateTooLarge(state));
        }
        let mut cells = [Mark::Empty; Position::COUNT];
        let mut rest = state;
        for cell in cells.iter_mut() {
            *cell = match rest % 3 {
                1 => Mark::X,
                2 => Mark::O,
                _ => Mark::Empty,
            };
            rest /= 3;
        }
        Ok(Self(cells))
    }

    pub fn state(&self) -> u32 {
        self.0
            .iter()
            .rev()
            .fold(0, |state, &mark| state * 3 + mark as u32)
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.0.iter().filter(|&&m| m == mark).count()
    }

    /// Positions whose marks differ between `self` and `other`.
    pub fn changed_positions<'a>(&'a self, other: &'a Board) -> impl Iterator<Item = Position> + 'a {
        Position::all().filter(move |&p| self[p] != other[p])
    }
}

impl Index<Position> for Board {
    type Output = Mark;

    fn index(&self, position: Position) -> &Self::Output {
        &self.0[position.index()]
    }
}

impl IndexMut<Position> for Board {
    fn index_mut(&mut self, position: Position) -> &mut Self::Output {
        &mut self.0[position.index()]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.0.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
                writeln!(f, "-+-+-")?;
            }
            write!(
                f,
                "{}|{}|{}",
                cells[0].symbol(),
                cells[1].symbol(),
                cells[2].symbol()
            )?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameStateError {
    #[error("bad state {0}: too big")]
    StateTooLarge(u32),
    #[error("too many O moves ({o} O against {x} X)")]
    TooManyO { x: usize, o: usize },
    #[error("too many X moves ({x} X against {o} O)")]
    TooManyX { x: usize, o: usize },
    #[error("winning positions {0:?} repeat a cell")]
    DegenerateTriple([Position; 3]),
    #[error("winning positions {triple:?} don't hold three {expected:?} marks")]
    TripleMismatch {
        triple: [Position; 3],
        expected: Mark,
    },
    #[error("winner {0:?} declared without winning positions")]
    MissingTriple(Winner),
    #[error("winner {0:?} can't have winning positions")]
    UnexpectedTriple(Winner),
    #[error("malformed game state: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for GameStateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Snapshot of a game as the server reports it.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct GameState {
    pub board: Board,
    pub winner: Winner,
    pub server_player: Player,
    #[serde(default)]
    pub winning_positions: Vec<[Position; 3]>,
    /// Missing from freshly created games; see [`GameState::or_move_url`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub move_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_moves: Option<Vec<Position>>,
}

impl GameState {
    pub fn new(server_player: Player, move_url: impl Into<String>) -> Self {
        Self {
            board: Board::default(),
            winner: Winner::None,
            server_player,
            winning_positions: Vec::new(),
            move_url: move_url.into(),
            url: None,
            next_moves: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, GameStateError> {
        let state: GameState = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }

    /// Fills in a missing move endpoint: `<url>/move/` when the server said
    /// where the game lives, `fallback` otherwise.
    pub fn or_move_url(mut self, fallback: &str) -> Self {
        if self.move_url.is_empty() {
            self.move_url = match &self.url {
                Some(url) => format!("{}/move/", url.trim_end_matches('/')),
                None => fallback.to_string(),
            };
        }
        self
    }

    pub fn human_player(&self) -> Player {
        self.server_player.opponent()
    }

    /// Whether the human may still place a mark at `position`.
    pub fn accepts_move(&self, position: Position) -> bool {
        if self.winner.is_decided() || !self.board[position].is_empty() {
            return false;
        }
        self.next_moves
            .as_ref()
            .is_none_or(|moves| moves.contains(&position))
    }

    pub fn validate(&self) -> Result<(), GameStateError> {
        let x = self.board.count(Mark::X);
        let o = self.board.count(Mark::O);
        if x < o {
            return Err(GameStateError::TooManyO { x, o });
        }
        if x > o + 1 {
            return Err(GameStateError::TooManyX { x, o });
        }

        match self.winner.mark() {
            Some(_) if self.winning_positions.is_empty() => {
                return Err(GameStateError::MissingTriple(self.winner));
            }
            None if !self.winning_positions.is_empty() => {
                return Err(GameStateError::UnexpectedTriple(self.winner));
            }
            _ => {}
        }

        for &triple in &self.winning_positions {
            let [a, b, c] = triple;
            if a == b || b == c || a == c {
                return Err(GameStateError::DegenerateTriple(triple));
            }
            // Checked above: triples only exist alongside an X or O winner.
            let expected = self.winner.mark().unwrap_or_default();
            if triple.iter().any(|&p| self.board[p] != expected) {
                return Err(GameStateError::TripleMismatch { triple, expected });
            }
        }
        Ok(())
    }
}

/// The game the view is currently showing.
#[derive(Resource, Deref, DerefMut, Debug)]
pub struct GameSession(pub GameState);

impl GameSession {
    pub fn new(state: GameState) -> Self {
        Self(state)
    }

    pub fn replace(&mut self, state: GameState) -> GameState {
        std::mem::replace(&mut self.0, state)
    }
}
