use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use blockfall_engine::{Button, GameTime};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

/// Everything the main loop reacts to, funneled through one channel.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Signal {
    /// One animation frame from the ticker of the given generation.
    Frame { generation: u64, elapsed: GameTime },
    Button(Button),
    /// Click or confirmation key, used to dismiss the game over screen.
    Acknowledge,
    /// The screen needs a full repaint.
    Redraw,
    Quit(String),
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct CrosstermHandler {
    handles: Option<(JoinHandle<()>, Arc<AtomicBool>)>,
}

impl Drop for CrosstermHandler {
    fn drop(&mut self) {
        if let Some((_handle, running_flag)) = self.handles.take() {
            running_flag.store(false, Ordering::Release);
        }
    }
}

impl CrosstermHandler {
    pub fn new(sender: &Sender<Signal>, keybinds: &HashMap<KeyCode, Button>) -> Self {
        let flag = Arc::new(AtomicBool::new(true));
        let handle = Self::spawn(sender.clone(), flag.clone(), keybinds.clone());
        CrosstermHandler {
            handles: Some((handle, flag)),
        }
    }

    fn spawn(
        sender: Sender<Signal>,
        flag: Arc<AtomicBool>,
        keybinds: HashMap<KeyCode, Button>,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            loop {
                // Maybe stop thread.
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    // Spurious io::Error: ignore.
                    Err(_) => continue,
                }
                let event = match event::read() {
                    Ok(event) => event,
                    Err(_) => continue,
                };
                let Some(signal) = translate(event, &keybinds) else {
                    continue;
                };
                if sender.send(signal).is_err() {
                    // Receiver gone, nobody is listening anymore.
                    break;
                }
            }
        })
    }
}

/// Maps a terminal event to the signal it stands for, if any.
pub fn translate(event: Event, keybinds: &HashMap<KeyCode, Button>) -> Option<Signal> {
    match event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            ..
        }) => Some(Signal::Quit("exited with ctrl-c".to_string())),
        // Keydown, including held-key repeats. Configured bindings take precedence.
        Event::Key(KeyEvent {
            code,
            kind: kind @ (KeyEventKind::Press | KeyEventKind::Repeat),
            ..
        }) => match (keybinds.get(&code), code) {
            (Some(&button), _) => Some(Signal::Button(button)),
            (None, KeyCode::Esc | KeyCode::Char('q')) if kind == KeyEventKind::Press => {
                Some(Signal::Quit("quit. Have a nice day!".to_string()))
            }
            (None, KeyCode::Enter | KeyCode::Char(' ')) => Some(Signal::Acknowledge),
            _ => None,
        },
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            ..
        }) => Some(Signal::Acknowledge),
        Event::Resize(..) | Event::FocusGained => Some(Signal::Redraw),
        // Don't care about other events: ignore.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn click(button: MouseButton) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(button),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn arrow_keys_map_to_buttons() {
        let keybinds = Settings::default_keybinds();
        let expected = [
            (KeyCode::Left, Button::MoveLeft),
            (KeyCode::Right, Button::MoveRight),
            (KeyCode::Up, Button::Rotate),
            (KeyCode::Down, Button::DropSoft),
        ];
        for (code, button) in expected {
            assert_eq!(
                translate(key(code, KeyEventKind::Press), &keybinds),
                Some(Signal::Button(button))
            );
        }
        assert_eq!(
            translate(key(KeyCode::Down, KeyEventKind::Repeat), &keybinds),
            Some(Signal::Button(Button::DropSoft))
        );
    }

    #[test]
    fn unmapped_and_released_keys_are_ignored() {
        let keybinds = Settings::default_keybinds();
        assert_eq!(translate(key(KeyCode::Char('x'), KeyEventKind::Press), &keybinds), None);
        assert_eq!(translate(key(KeyCode::Left, KeyEventKind::Release), &keybinds), None);
    }

    #[test]
    fn clicks_and_confirm_keys_acknowledge() {
        let keybinds = Settings::default_keybinds();
        assert_eq!(translate(click(MouseButton::Left), &keybinds), Some(Signal::Acknowledge));
        assert_eq!(translate(click(MouseButton::Right), &keybinds), None);
        assert_eq!(
            translate(key(KeyCode::Enter, KeyEventKind::Press), &keybinds),
            Some(Signal::Acknowledge)
        );
    }

    #[test]
    fn quit_keys() {
        let keybinds = Settings::default_keybinds();
        assert!(matches!(
            translate(key(KeyCode::Esc, KeyEventKind::Press), &keybinds),
            Some(Signal::Quit(_))
        ));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(translate(ctrl_c, &keybinds), Some(Signal::Quit(_))));
    }

    #[test]
    fn bound_keys_win_over_builtin_meanings() {
        let mut keybinds = Settings::default_keybinds();
        keybinds.insert(KeyCode::Char('q'), Button::Rotate);
        keybinds.insert(KeyCode::Char(' '), Button::DropSoft);
        assert_eq!(
            translate(key(KeyCode::Char('q'), KeyEventKind::Press), &keybinds),
            Some(Signal::Button(Button::Rotate))
        );
        assert_eq!(
            translate(key(KeyCode::Char(' '), KeyEventKind::Press), &keybinds),
            Some(Signal::Button(Button::DropSoft))
        );
        // Unbound builtins keep working, and held quit keys don't fire twice.
        assert!(matches!(
            translate(key(KeyCode::Esc, KeyEventKind::Press), &keybinds),
            Some(Signal::Quit(_))
        ));
        assert_eq!(translate(key(KeyCode::Esc, KeyEventKind::Repeat), &keybinds), None);
    }

    #[test]
    fn resize_requests_redraw() {
        let keybinds = Settings::default_keybinds();
        assert_eq!(translate(Event::Resize(80, 24), &keybinds), Some(Signal::Redraw));
    }
}
