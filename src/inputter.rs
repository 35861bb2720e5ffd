use ratatui::crossterm::event::{KeyCode, KeyEvent};

/// Snapshot of the prompt line after a keystroke. `text` is live on every
/// key so consumers can react while the user is still typing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
    pub finished: bool,
    pub canceled: bool,
}

/// Minimal single line editor for the command prompt. The cursor is a char
/// index, byte positions are only derived when splicing the string.
#[derive(Default)]
pub struct Inputter {
    text: String,
    cursor: usize,
}

impl Inputter {
    pub fn start(&mut self, initial: &str) {
        self.text = initial.to_string();
        self.cursor = self.text.chars().count();
    }

    pub fn state(&self) -> InputState {
        InputState {
            text: self.text.clone(),
            cursor: self.cursor,
            finished: false,
            canceled: false,
        }
    }

    pub fn read(&mut self, key: KeyEvent) -> InputState {
        match key.code {
            KeyCode::Enter => InputState {
                finished: true,
                ..self.state()
            },
            KeyCode::Esc => InputState {
                finished: true,
                canceled: true,
                ..self.state()
            },
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_pos(self.cursor);
                    self.text.remove(at);
                }
                self.state()
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                self.state()
            }
            KeyCode::Right => {
                self.cursor = std::cmp::min(self.cursor + 1, self.text.chars().count());
                self.state()
            }
            KeyCode::Home => {
                self.cursor = 0;
                self.state()
            }
            KeyCode::End => {
                self.cursor = self.text.chars().count();
                self.state()
            }
            code => {
                if let Some(chr) = code.as_char() {
                    let at = self.byte_pos(self.cursor);
                    self.text.insert(at, chr);
                    self.cursor += 1;
                }
                self.state()
            }
        }
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}
