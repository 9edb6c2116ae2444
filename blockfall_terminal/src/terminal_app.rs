use std::{
    collections::HashMap,
    io::{self, Write},
    sync::mpsc,
};

use blockfall_engine::{
    render, Button, Feedback, FeedbackEvents, Game, GameConfig, GameState, Phase,
};
use crossterm::{
    cursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style, terminal, ExecutableCommand,
};

use crate::{
    frame_ticker::FrameTicker,
    game_input_handler::{CrosstermHandler, Signal},
    settings::{format_keybinds, Settings},
    terminal_surface::TerminalSurface,
};

/// What the main loop has to do after a signal was applied to the game.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Step {
    Idle,
    Draw,
    /// Throw away whatever is on screen and paint from scratch.
    Repaint,
    /// A new round began, the frame ticker must be replaced.
    RestartTicker,
    Quit(String),
}

/// The game together with the generation of the frame ticker feeding it.
#[derive(Debug)]
pub struct Session {
    game: Game,
    generation: u64,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Session {
            game: Game::new(config),
            generation: 0,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn handle(&mut self, signal: Signal) -> Step {
        match signal {
            Signal::Frame {
                generation,
                elapsed,
            } => {
                if generation != self.generation {
                    log::trace!("dropped stale frame from ticker #{generation}");
                    return Step::Idle;
                }
                let feedback = self.game.update(elapsed);
                log_feedback(&feedback);
                Step::Draw
            }
            Signal::Button(button) => {
                let feedback = self.game.press(button);
                log_feedback(&feedback);
                Step::Draw
            }
            Signal::Acknowledge => {
                let feedback = self.game.acknowledge();
                if feedback.is_empty() {
                    return Step::Idle;
                }
                log_feedback(&feedback);
                self.generation += 1;
                Step::RestartTicker
            }
            Signal::Redraw => Step::Repaint,
            Signal::Quit(msg) => Step::Quit(msg),
        }
    }
}

fn log_feedback(feedback: &FeedbackEvents) {
    for event in feedback {
        match event {
            Feedback::Spawned(kind) => log::debug!("spawned {kind:?}"),
            Feedback::Landed(piece) => log::debug!("landed {:?} at {:?}", piece.kind, piece.pos),
            Feedback::LinesCleared(rows) => log::info!("cleared rows {rows:?}"),
            Feedback::GameOver => log::info!("game over"),
            Feedback::Reset => log::info!("new round"),
        }
    }
}

#[derive(Debug)]
pub struct App<T: Write> {
    term: T,
    settings: Settings,
    session: Session,
    surface: TerminalSurface,
    kitty_enabled: bool,
}

impl<T: Write> Drop for App<T> {
    fn drop(&mut self) {
        // Console epilogue: de-initialization.
        if self.kitty_enabled {
            let _ = self.term.execute(PopKeyboardEnhancementFlags);
        }
        let _ = self.term.execute(DisableMouseCapture);
        let _ = terminal::disable_raw_mode();
        let _ = self.term.execute(style::ResetColor);
        let _ = self.term.execute(cursor::Show);
        let _ = self.term.execute(terminal::LeaveAlternateScreen);
    }
}

impl<T: Write> App<T> {
    pub fn new(mut terminal: T, settings: Settings, config: GameConfig) -> io::Result<Self> {
        // Console prologue: initialization.
        terminal.execute(terminal::EnterAlternateScreen)?;
        terminal.execute(terminal::SetTitle("Blockfall"))?;
        terminal.execute(cursor::Hide)?;
        terminal.execute(EnableMouseCapture)?;
        terminal::enable_raw_mode()?;
        // Report held keys as repeats where the terminal can tell them apart.
        let kitty_enabled = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if kitty_enabled {
            terminal.execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        log::info!(
            "starting at {} fps, drop interval {:?}",
            settings.fps,
            config.drop_interval
        );
        Ok(Self {
            term: terminal,
            settings,
            session: Session::new(config),
            surface: TerminalSurface::new(),
            kitty_enabled,
        })
    }

    fn fetch_main_xy() -> (usize, usize) {
        let (w_console, h_console) = terminal::size().unwrap_or((0, 0));
        (
            usize::from(w_console.saturating_sub(TerminalSurface::W_MAIN) / 2),
            usize::from(h_console.saturating_sub(TerminalSurface::H_MAIN) / 2),
        )
    }

    pub fn run(&mut self) -> io::Result<String> {
        let (sender, receiver) = mpsc::channel();
        let _input_handler = CrosstermHandler::new(&sender, &self.settings.keybinds);
        let mut ticker = FrameTicker::start(&sender, self.settings.fps, self.session.generation());
        self.surface.invalidate(Self::fetch_main_xy());
        self.draw()?;
        let msg = loop {
            let Ok(signal) = receiver.recv() else {
                break String::from("input channel closed");
            };
            if let Signal::Frame { generation, .. } = signal {
                if generation == ticker.generation() {
                    ticker.frame_taken();
                }
            }
            match self.session.handle(signal) {
                Step::Idle => {}
                Step::Draw => self.draw()?,
                Step::Repaint => {
                    self.surface.invalidate(Self::fetch_main_xy());
                    self.draw()?;
                }
                Step::RestartTicker => {
                    ticker.cancel();
                    ticker =
                        FrameTicker::start(&sender, self.settings.fps, self.session.generation());
                    self.draw()?;
                }
                Step::Quit(msg) => break msg,
            }
        };
        ticker.cancel();
        let state = self.session.game().state();
        log::info!(
            "leaving after {} pieces and {} lines",
            state.pieces_landed,
            state.lines_cleared
        );
        Ok(msg)
    }

    fn draw(&mut self) -> io::Result<()> {
        compose_frame(
            self.session.game().state(),
            &self.settings.keybinds,
            &mut self.surface,
        );
        self.surface.flush(&mut self.term)
    }
}

/// Lays out one full frame: board, game over banner if due, status lines.
fn compose_frame(
    state: &GameState,
    keybinds: &HashMap<KeyCode, Button>,
    surface: &mut TerminalSurface,
) {
    surface.begin();
    render(state, surface);
    if state.phase == Phase::GameOver {
        surface.overlay(&[
            "",
            "GAME OVER",
            "",
            "click or press Enter",
            "to play again",
            "",
        ]);
    }
    surface.status(
        0,
        &format!(
            "Pieces {:>4}   Lines {:>4}",
            state.pieces_landed, state.lines_cleared
        ),
    );
    surface.status(
        1,
        &format!(
            "{} {} move  {} rotate",
            format_keybinds(Button::MoveLeft, keybinds),
            format_keybinds(Button::MoveRight, keybinds),
            format_keybinds(Button::Rotate, keybinds),
        ),
    );
    surface.status(
        2,
        &format!(
            "{} drop  [Esc] quit",
            format_keybinds(Button::DropSoft, keybinds)
        ),
    );
}
