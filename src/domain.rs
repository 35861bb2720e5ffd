use std::io::Error;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum FvError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl From<Error> for FvError {
    fn from(err: Error) -> Self {
        FvError::IoError(err)
    }
}

impl From<PolarsError> for FvError {
    fn from(err: PolarsError) -> Self {
        FvError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveBeginning,
    MoveEnd,
    PageNext,
    PagePrev,
    GotoPage,
    Facets,
    Enter,
    Exit,
    ClearColumn,
    ClearAllFilters,
    Search,
    HideColumn,
    ResetProjection,
    ToggleIndex,
    CopyCell,
    CopyRow,
    Help,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

/// Which prompt the command line is currently collecting input for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptKind {
    SearchGlobal,
    GotoPage,
}

#[derive(Clone, Debug, Setters)]
#[setters(prefix = "with_")]
pub struct FvConfig {
    /// Event poll timeout in ms; this is also the clock for the debounce check.
    pub event_poll_time: u64,
    /// Quiet window before a filter change is handed to the worker.
    pub debounce_ms: u64,
    /// Rows per table page.
    pub page_size: usize,
    pub max_column_width: usize,
}

impl Default for FvConfig {
    fn default() -> Self {
        FvConfig {
            event_poll_time: 100,
            debounce_ms: 300,
            page_size: 100,
            max_column_width: 80,
        }
    }
}

pub const HELP_TEXT: &str = "fv - faceted data viewer

  q               quit
  arrows / hjkl   move selection
  Home / End      first / last row of the page
  n / p           next / previous page
  g               go to page
  Enter / f       open facet panel for the current column
  Space / Enter   toggle a value inside the facet panel
  c               clear the current column's filter
  C               clear all filters
  /               global search (live while typing)
  v               hide the current column from the output
  V               show all columns again
  i               toggle the row number column
  y / Y           copy cell / copy row
  ?               this help
  Esc             close panel / popup, cancel prompt
";
