//! Board state, turn order and win/draw rules. Nothing in here knows about the UI or audio.

use thiserror::Error;

/// Number of cells on the board, indexed row-major from the top-left corner.
pub const CELL_COUNT: usize = 9;

/// The 8 index-triples that win a round: rows, then columns, then diagonals.
/// When scanning for a winner, the first line in this order wins.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Player::X => "X",
            Player::O => "O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Option<Player>; CELL_COUNT],
}

impl Board {
    pub fn get(&self, index: usize) -> Option<Player> {
        self.cells.get(index).copied().flatten()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Returns the first line (in [`WINNING_LINES`] order) held entirely by one player.
    pub fn winning_line(&self) -> Option<(Player, [usize; 3])> {
        WINNING_LINES.iter().find_map(|&line| {
            let [a, b, c] = line;
            match self.cells[a] {
                Some(p) if self.cells[b] == Some(p) && self.cells[c] == Some(p) => Some((p, line)),
                _ => None,
            }
        })
    }

    pub fn clear(&mut self) {
        self.cells = [None; CELL_COUNT];
    }

    #[cfg(test)]
    pub fn from_cells(cells: [Option<Player>; CELL_COUNT]) -> Self {
        Self { cells }
    }
}

/// Rounds won per player. Survives round resets; only a new game zeroes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scores {
    x: u32,
    o: u32,
}

impl Scores {
    pub fn get(&self, player: Player) -> u32 {
        match player {
            Player::X => self.x,
            Player::O => self.o,
        }
    }

    pub fn record_win(&mut self, player: Player) {
        match player {
            Player::X => self.x += 1,
            Player::O => self.o += 1,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("cell index {0} is off the board")]
    OutOfRange(usize),
    #[error("the round is over")]
    RoundOver,
    #[error("cell {0} is already taken")]
    Occupied(usize),
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Won { player: Player, line: [usize; 3] },
    Draw,
}

/// What an accepted move led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The round goes on and `next` is now to move.
    Continue { next: Player },
    Ended(RoundResult),
}

#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    current_player: Player,
    scores: Scores,
    result: Option<RoundResult>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            board: Board::default(),
            current_player: Player::X,
            scores: Scores::default(),
            result: None,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn is_active(&self) -> bool {
        self.result.is_none()
    }

    /// Checks whether the current player may mark `index`, without changing anything.
    pub fn check_move(&self, index: usize) -> Result<(), MoveError> {
        if index >= CELL_COUNT {
            return Err(MoveError::OutOfRange(index));
        }
        if !self.is_active() {
            return Err(MoveError::RoundOver);
        }
        if self.board.cells[index].is_some() {
            return Err(MoveError::Occupied(index));
        }
        Ok(())
    }

    /// Marks `index` for the current player and evaluates the round.
    ///
    /// A rejected move leaves the state untouched. A win is checked before a draw, so a full
    /// board with three in a row counts as a win. The current player only changes when the
    /// round continues.
    pub fn play(&mut self, index: usize) -> Result<MoveOutcome, MoveError> {
        self.check_move(index)?;
        let player = self.current_player;
        self.board.cells[index] = Some(player);

        if let Some((winner, line)) = self.board.winning_line() {
            self.scores.record_win(winner);
            let result = RoundResult::Won {
                player: winner,
                line,
            };
            self.result = Some(result);
            return Ok(MoveOutcome::Ended(result));
        }
        if self.board.is_full() {
            self.result = Some(RoundResult::Draw);
            return Ok(MoveOutcome::Ended(RoundResult::Draw));
        }

        self.current_player = player.other();
        Ok(MoveOutcome::Continue {
            next: self.current_player,
        })
    }

    /// Clears the board for another round, keeping the scores.
    pub fn reset_round(&mut self) {
        self.board.clear();
        self.current_player = Player::X;
        self.result = None;
    }

    /// Clears the board and the scores.
    pub fn new_game(&mut self) {
        self.reset_round();
        self.scores.clear();
    }

    #[cfg(test)]
    pub fn with_board(board: Board, current_player: Player) -> Self {
        Self {
            board,
            current_player,
            ..Self::default()
        }
    }
}
