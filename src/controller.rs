use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

use crate::domain::{FvConfig, FvError, Message};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(config: &FvConfig) -> Self {
        Self {
            event_poll_time: config.event_poll_time,
        }
    }

    /// Poll for one terminal event. The poll timeout doubles as the clock
    /// for the model's scheduler tick, so returning `None` regularly is
    /// part of the design.
    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, FvError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    // While a prompt is active the model consumes raw keys.
                    if model.raw_keyevents() {
                        return Ok(Some(Message::RawKey(key)));
                    }
                    return Ok(self.handle_key(key));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Some(Message::MoveLeft),
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Some(Message::MoveRight),
            (KeyCode::Home, _) => Some(Message::MoveBeginning),
            (KeyCode::End, _) => Some(Message::MoveEnd),
            (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => Some(Message::PageNext),
            (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => Some(Message::PagePrev),
            (KeyCode::Char('g'), _) => Some(Message::GotoPage),
            (KeyCode::Char('f'), _) => Some(Message::Facets),
            (KeyCode::Enter, _) | (KeyCode::Char(' '), _) => Some(Message::Enter),
            (KeyCode::Char('c'), _) => Some(Message::ClearColumn),
            (KeyCode::Char('C'), _) => Some(Message::ClearAllFilters),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Char('v'), _) => Some(Message::HideColumn),
            (KeyCode::Char('V'), _) => Some(Message::ResetProjection),
            (KeyCode::Char('i'), _) => Some(Message::ToggleIndex),
            (KeyCode::Char('y'), _) => Some(Message::CopyCell),
            (KeyCode::Char('Y'), _) => Some(Message::CopyRow),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
