mod active_piece;
mod board;
mod drop_timer;
mod pieces;
mod render;
mod tetromino_generators;

use std::{fmt, time::Duration};

pub use active_piece::{collides, ActivePiece, Coord, Offset};
pub use board::{Board, Cell, Line};
pub use drop_timer::DropTimer;
pub use pieces::{Shape, Tetromino, TileColor};
pub use render::{render, DrawSurface};
pub use tetromino_generators::PieceGenerator;

pub type GameTime = Duration;
pub type FeedbackEvents = Vec<Feedback>;

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    MoveLeft,
    MoveRight,
    Rotate,
    DropSoft,
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    #[default]
    Playing,
    GameOver,
}

/// What happened during a call into the game, in order.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feedback {
    Spawned(Tetromino),
    Landed(ActivePiece),
    /// Board rows removed by a landing, bottom first.
    LinesCleared(Vec<usize>),
    GameOver,
    Reset,
}

#[derive(Eq, PartialEq, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Time that has to pass (strictly exceeded) between two forced drops.
    pub drop_interval: Duration,
    pub spawn_pos: Coord,
    /// Seed for piece selection; `None` draws from system entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            drop_interval: Duration::from_millis(1000),
            spawn_pos: (4, 0),
            seed: None,
        }
    }
}

#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub board: Board,
    pub active_piece: ActivePiece,
    pub phase: Phase,
    pub drop_timer: DropTimer,
    pub pieces_landed: usize,
    pub lines_cleared: usize,
}

/// Owns all gameplay state. Every mutation goes through one of its methods.
pub struct Game {
    config: GameConfig,
    state: GameState,
    generator: PieceGenerator,
}

impl fmt::Debug for Game {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Game")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("generator", &self.generator)
            .finish()
    }
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let mut generator = match config.seed {
            Some(seed) => PieceGenerator::seeded(seed),
            None => PieceGenerator::new(),
        };
        let first = Self::next_tetromino(&mut generator);
        let state = GameState {
            board: Board::new(),
            active_piece: ActivePiece::new(first, config.spawn_pos),
            phase: Phase::Playing,
            drop_timer: DropTimer::default(),
            pieces_landed: 0,
            lines_cleared: 0,
        };
        log::debug!("new game, first piece {first:?}");
        Game {
            config,
            state,
            generator,
        }
    }

    fn next_tetromino(generator: &mut PieceGenerator) -> Tetromino {
        // SAFETY: `PieceGenerator` is an infinite iterator.
        generator.next().unwrap()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct board access, for setting up positions.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.state.board
    }

    pub fn ended(&self) -> bool {
        self.state.phase == Phase::GameOver
    }

    /// Replaces the active piece with a fresh copy of a random template at the spawn position.
    pub fn spawn(&mut self) -> Tetromino {
        let kind = Self::next_tetromino(&mut self.generator);
        self.spawn_tetromino(kind);
        kind
    }

    /// Replaces the active piece with a fresh copy of `kind` at the spawn position.
    pub fn spawn_tetromino(&mut self, kind: Tetromino) {
        self.state.active_piece = ActivePiece::new(kind, self.config.spawn_pos);
        log::debug!("spawned {kind:?} at {:?}", self.config.spawn_pos);
    }

    /// Shifts the active piece sideways by `dx` if it fits there.
    pub fn move_horizontal(&mut self, dx: isize) -> bool {
        if self.ended() {
            return false;
        }
        match self.state.active_piece.fits_at(&self.state.board, (dx, 0)) {
            Some(moved) => {
                self.state.active_piece = moved;
                true
            }
            None => false,
        }
    }

    /// Turns the active piece a quarter in place if it fits there.
    pub fn rotate(&mut self) -> bool {
        if self.ended() {
            return false;
        }
        match self.state.active_piece.rotated_fits(&self.state.board) {
            Some(rotated) => {
                self.state.active_piece = rotated;
                true
            }
            None => false,
        }
    }

    /// Moves the active piece down one row, or lands it if the row below is blocked.
    ///
    /// Landing merges the piece, clears full rows and then either spawns the next piece
    /// or, if the piece came to rest on the top row, ends the game.
    pub fn soft_drop(&mut self) -> FeedbackEvents {
        let mut feedback = Vec::new();
        if self.ended() {
            return feedback;
        }
        if let Some(dropped) = self.state.active_piece.fits_at(&self.state.board, (0, 1)) {
            self.state.active_piece = dropped;
            return feedback;
        }
        let landed = self.state.active_piece.clone();
        self.state.board.merge(&landed);
        self.state.pieces_landed += 1;
        log::debug!("{:?} landed at {:?}", landed.kind, landed.pos);
        let cleared = self.state.board.clear_completed_rows();
        let resting_y = landed.pos.1;
        feedback.push(Feedback::Landed(landed));
        if !cleared.is_empty() {
            log::debug!("cleared rows {cleared:?}");
            self.state.lines_cleared += cleared.len();
            feedback.push(Feedback::LinesCleared(cleared));
        }
        if resting_y <= 0 {
            self.state.phase = Phase::GameOver;
            log::info!(
                "game over after {} pieces, {} lines",
                self.state.pieces_landed,
                self.state.lines_cleared
            );
            feedback.push(Feedback::GameOver);
        } else {
            feedback.push(Feedback::Spawned(self.spawn()));
        }
        feedback
    }

    /// Applies the action bound to `button`.
    pub fn press(&mut self, button: Button) -> FeedbackEvents {
        match button {
            Button::MoveLeft => {
                self.move_horizontal(-1);
            }
            Button::MoveRight => {
                self.move_horizontal(1);
            }
            Button::Rotate => {
                self.rotate();
            }
            // Manual drops leave the forced-drop timer alone.
            Button::DropSoft => return self.soft_drop(),
        }
        Vec::new()
    }

    /// Advances the game to the frame at `now`, performing a forced drop when one is due.
    pub fn update(&mut self, now: GameTime) -> FeedbackEvents {
        if self.ended() {
            return Vec::new();
        }
        if self.state.drop_timer.tick(now, self.config.drop_interval) {
            self.soft_drop()
        } else {
            Vec::new()
        }
    }

    /// Acknowledges a game over and starts a new game; does nothing while still playing.
    pub fn acknowledge(&mut self) -> FeedbackEvents {
        if !self.ended() {
            return Vec::new();
        }
        self.reset();
        vec![
            Feedback::Reset,
            Feedback::Spawned(self.state.active_piece.kind),
        ]
    }

    fn reset(&mut self) {
        self.state.board.reset();
        self.state.drop_timer.reset();
        self.state.phase = Phase::Playing;
        self.state.pieces_landed = 0;
        self.state.lines_cleared = 0;
        self.spawn();
        log::info!("game reset");
    }
}
