use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace};

use crate::dataset::{self, Dataset};
use crate::domain::{FvConfig, FvError, HELP_TEXT, Message, PromptKind};
use crate::engine::FacetTable;
use crate::filter::FilterState;
use crate::inputter::Inputter;
use crate::scheduler::{Completion, Scheduler};
use crate::ui::{CMDLINE_HEIGHT, COLUMN_WIDTH_MARGIN, TABLE_BORDER_HEIGHT, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy)]
enum Modus {
    TABLE,
    FACETS,
    POPUP,
    CMDINPUT,
}

/// The published result of the latest accepted filter run. Replaced as one
/// unit so the table and the facet counts can never disagree.
#[derive(Default)]
struct ResultView {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    facets: FacetTable,
    generation: u64,
}

struct FacetPanel {
    column: String,
    curser_row: usize,
    curser_offset: usize,
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let table_width = ui_width.saturating_sub(2);
        let table_height = ui_height
            .saturating_sub(TABLE_HEADER_HEIGHT + TABLE_BORDER_HEIGHT + CMDLINE_HEIGHT)
            .max(1);
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width,
            table_height,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct FacetLine {
    pub value: String,
    pub count: usize,
    pub selected: bool,
}

pub struct FacetPanelView {
    pub column: String,
    pub lines: Vec<FacetLine>,
    pub selected: usize,
    pub total: usize,
}

pub struct PromptView {
    pub kind: PromptKind,
    pub text: String,
    pub curser_pos: usize,
}

pub struct UIData {
    pub title: String,
    pub header: Vec<String>,
    pub widths: Vec<u16>,
    pub rows: Vec<Vec<String>>,
    pub index: Vec<String>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub total_rows: usize,
    pub page: usize,
    pub page_count: usize,
    pub facet_panel: Option<FacetPanelView>,
    pub prompt: Option<PromptView>,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub filter_summary: String,
}

pub struct Model {
    config: FvConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    dataset: Arc<Dataset>,
    dataset_version: u64,
    source_name: String,
    filters: FilterState,
    scheduler: Scheduler,
    view: ResultView,
    page: usize,
    curser_row: usize,
    curser_offset: usize,
    curser_column: usize,
    offset_column: usize,
    hidden_columns: Vec<String>,
    show_index: bool,
    facet_panel: Option<FacetPanel>,
    clipboard: Option<Clipboard>,
    input: Inputter,
    prompt: Option<PromptKind>,
    saved_search: String,
    uilayout: UILayout,
    status_message: String,
    last_status_message_update: Instant,
    popup_message: String,
}

impl Model {
    pub fn init(config: &FvConfig, ui_width: usize, ui_height: usize) -> Result<Self, FvError> {
        Ok(Self {
            config: config.clone(),
            status: Status::EMPTY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            dataset: Arc::new(Dataset::default()),
            dataset_version: 0,
            source_name: String::new(),
            filters: FilterState::default(),
            scheduler: Scheduler::new(Duration::from_millis(config.debounce_ms)),
            view: ResultView::default(),
            page: 0,
            curser_row: 0,
            curser_offset: 0,
            curser_column: 0,
            offset_column: 0,
            hidden_columns: Vec::new(),
            show_index: true,
            facet_panel: None,
            clipboard: None,
            input: Inputter::default(),
            prompt: None,
            saved_search: String::new(),
            uilayout: UILayout::from_values(ui_width, ui_height),
            status_message: "Started fv!".to_string(),
            last_status_message_update: Instant::now(),
            popup_message: String::new(),
        })
    }

    pub fn load_data_file(&mut self, path: PathBuf) -> Result<(), FvError> {
        let name = dataset::source_name(&path);
        let loaded = Dataset::load(&path)?;
        self.install_dataset(loaded, name);
        Ok(())
    }

    /// Replace the row store. This retires the previous filter session:
    /// filters reset, the version bump lets the scheduler drop anything
    /// still in flight for the old dataset.
    pub fn install_dataset(&mut self, loaded: Dataset, name: String) {
        let nrows = loaded.nrows();
        self.dataset = Arc::new(loaded);
        self.dataset_version += 1;
        self.source_name = name;
        self.filters = FilterState::default();
        self.hidden_columns.clear();
        self.view = ResultView::default();
        self.page = 0;
        self.curser_row = 0;
        self.curser_offset = 0;
        self.curser_column = 0;
        self.offset_column = 0;
        self.facet_panel = None;
        self.modus = Modus::TABLE;
        self.status = Status::READY;
        self.schedule_recompute();
        // The first view of a fresh dataset should not wait out the
        // debounce window.
        self.scheduler.flush();
        self.set_status_message(format!("Loaded {} ({} rows)", self.source_name, nrows));
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), FvError> {
        if let Some(completion) = self.scheduler.tick() {
            self.apply_completion(completion);
        }

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MoveLeft => self.move_selection_left(),
                    Message::MoveRight => self.move_selection_right(),
                    Message::MoveBeginning => self.move_selection_beginning(),
                    Message::MoveEnd => self.move_selection_end(),
                    Message::PageNext => self.page_next(),
                    Message::PagePrev => self.page_prev(),
                    Message::GotoPage => self.enter_prompt(PromptKind::GotoPage),
                    Message::Facets | Message::Enter => self.open_facet_panel(),
                    Message::ClearColumn => self.clear_current_column(),
                    Message::ClearAllFilters => self.clear_all_filters(),
                    Message::Search => self.enter_prompt(PromptKind::SearchGlobal),
                    Message::HideColumn => self.hide_current_column(),
                    Message::ResetProjection => self.reset_projection(),
                    Message::ToggleIndex => self.show_index = !self.show_index,
                    Message::CopyCell => self.copy_cell(),
                    Message::CopyRow => self.copy_row(),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::FACETS => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.move_panel_up(1),
                    Message::MoveDown => self.move_panel_down(1),
                    Message::PagePrev => self.move_panel_up(10),
                    Message::PageNext => self.move_panel_down(10),
                    Message::Enter => self.toggle_facet_value(),
                    Message::ClearColumn => self.clear_panel_column(),
                    Message::ClearAllFilters => self.clear_all_filters(),
                    Message::Help => self.show_help(),
                    Message::Exit | Message::Facets => self.close_facet_panel(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Enter => self.close_popup(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::CMDINPUT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn raw_keyevents(&self) -> bool {
        matches!(self.modus, Modus::CMDINPUT)
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    // ------------------------ Result sink ------------------------------ //

    /// Publish a finished run: rows, header and facet table replace the
    /// previous view in one assignment, then every cursor that indexes
    /// into the published data is clamped against the new shape.
    fn apply_completion(&mut self, completion: Completion) {
        info!(
            "Applying generation {} ({} rows)",
            completion.generation,
            completion.outcome.rows.len()
        );
        self.view = ResultView {
            header: completion.outcome.header,
            rows: completion.outcome.rows,
            facets: completion.outcome.facets,
            generation: completion.generation,
        };

        self.page = self.page.min(self.page_count() - 1);
        let page_len = self.current_page_rows().len();
        if self.curser_offset + self.curser_row >= page_len {
            self.curser_offset = 0;
            self.curser_row = page_len.saturating_sub(1);
        }
        self.curser_column = self
            .curser_column
            .min(self.view.header.len().saturating_sub(1));
        self.offset_column = self.offset_column.min(self.curser_column);

        if let Some(panel) = self.facet_panel.as_mut() {
            let total = self.view.facets.get(&panel.column).map_or(0, Vec::len);
            if panel.curser_offset + panel.curser_row >= total {
                panel.curser_offset = 0;
                panel.curser_row = total.saturating_sub(1);
            }
        }

        self.set_status_message(format!("{} rows match", self.view.rows.len()));
    }

    fn schedule_recompute(&mut self) {
        let projection: Vec<String> = if self.hidden_columns.is_empty() {
            Vec::new()
        } else {
            self.dataset
                .columns()
                .iter()
                .filter(|c| !self.hidden_columns.contains(c))
                .cloned()
                .collect()
        };
        self.filters.set_projection(projection);
        self.scheduler.request(
            Arc::clone(&self.dataset),
            self.dataset_version,
            self.filters.clone(),
        );
    }

    /// Whether the published view reflects the latest requested state.
    pub fn is_settled(&self) -> bool {
        !self.scheduler.has_pending() && self.view.generation == self.scheduler.generation()
    }

    // ------------------------ Pagination ------------------------------- //

    fn page_count(&self) -> usize {
        self.view.rows.len().div_ceil(self.config.page_size).max(1)
    }

    fn current_page_rows(&self) -> &[Vec<String>] {
        let begin = self.page * self.config.page_size;
        let end = (begin + self.config.page_size).min(self.view.rows.len());
        if begin >= end {
            &[]
        } else {
            &self.view.rows[begin..end]
        }
    }

    fn page_next(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            self.curser_row = 0;
            self.curser_offset = 0;
        }
    }

    fn page_prev(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.curser_row = 0;
            self.curser_offset = 0;
        }
    }

    fn goto_page(&mut self, page: usize) {
        self.page = page.saturating_sub(1).min(self.page_count() - 1);
        self.curser_row = 0;
        self.curser_offset = 0;
    }

    // ------------------------ Table navigation ------------------------- //

    fn move_selection_up(&mut self, size: usize) {
        if self.curser_row > 0 {
            self.curser_row = self.curser_row.saturating_sub(size);
        } else {
            self.curser_offset = self.curser_offset.saturating_sub(size);
        }
    }

    fn move_selection_down(&mut self, size: usize) {
        let page_len = self.current_page_rows().len();
        if page_len == 0 {
            return;
        }
        let height = self.uilayout.table_height;
        if self.curser_offset + self.curser_row < page_len - 1 {
            if self.curser_row < height - 1 {
                self.curser_row = (self.curser_row + size)
                    .min(height - 1)
                    .min(page_len - 1 - self.curser_offset);
            } else {
                self.curser_offset = (self.curser_offset + size).min(page_len - height);
            }
        }
    }

    fn move_selection_beginning(&mut self) {
        self.curser_row = 0;
        self.curser_offset = 0;
    }

    fn move_selection_end(&mut self) {
        let page_len = self.current_page_rows().len();
        if page_len == 0 {
            return;
        }
        let height = self.uilayout.table_height;
        if page_len <= height {
            self.curser_offset = 0;
            self.curser_row = page_len - 1;
        } else {
            self.curser_offset = page_len - height;
            self.curser_row = height - 1;
        }
    }

    fn move_selection_left(&mut self) {
        if self.curser_column > 0 {
            self.curser_column -= 1;
            if self.curser_column < self.offset_column {
                self.offset_column = self.curser_column;
            }
        }
    }

    fn move_selection_right(&mut self) {
        if self.curser_column + 1 < self.view.header.len() {
            self.curser_column += 1;
            while self.curser_column
                >= self.offset_column + self.visible_column_count(self.offset_column)
            {
                self.offset_column += 1;
            }
        }
    }

    /// How many columns starting at `from` fit into the table width.
    fn visible_column_count(&self, from: usize) -> usize {
        let widths = self.column_widths();
        let mut used = 0;
        let mut count = 0;
        for width in widths.iter().skip(from) {
            used += *width as usize + 1;
            if count > 0 && used > self.uilayout.table_width {
                break;
            }
            count += 1;
        }
        count.max(1)
    }

    fn column_widths(&self) -> Vec<u16> {
        let rows = self.current_page_rows();
        self.view
            .header
            .iter()
            .enumerate()
            .map(|(cidx, name)| {
                let data_width = rows
                    .iter()
                    .map(|row| row.get(cidx).map_or(0, |v| v.chars().count()))
                    .max()
                    .unwrap_or(0);
                (data_width.max(name.chars().count()) + COLUMN_WIDTH_MARGIN)
                    .min(self.config.max_column_width) as u16
            })
            .collect()
    }

    // ------------------------ Facet panel ------------------------------ //

    fn open_facet_panel(&mut self) {
        let Some(column) = self.view.header.get(self.curser_column).cloned() else {
            return;
        };
        self.facet_panel = Some(FacetPanel {
            column,
            curser_row: 0,
            curser_offset: 0,
        });
        self.modus = Modus::FACETS;
    }

    fn close_facet_panel(&mut self) {
        self.facet_panel = None;
        self.modus = Modus::TABLE;
    }

    fn panel_total(&self) -> usize {
        self.facet_panel
            .as_ref()
            .and_then(|panel| self.view.facets.get(&panel.column))
            .map_or(0, Vec::len)
    }

    /// Lines that fit inside the facet popup (70% of the table area,
    /// minus its borders).
    fn panel_height(&self) -> usize {
        (self.uilayout.table_height * 7 / 10).saturating_sub(2).max(1)
    }

    fn move_panel_up(&mut self, size: usize) {
        let Some(panel) = self.facet_panel.as_mut() else {
            return;
        };
        if panel.curser_row > 0 {
            panel.curser_row = panel.curser_row.saturating_sub(size);
        } else {
            panel.curser_offset = panel.curser_offset.saturating_sub(size);
        }
    }

    fn move_panel_down(&mut self, size: usize) {
        let total = self.panel_total();
        let height = self.panel_height();
        let Some(panel) = self.facet_panel.as_mut() else {
            return;
        };
        if total == 0 || panel.curser_offset + panel.curser_row >= total - 1 {
            return;
        }
        if panel.curser_row < height - 1 {
            panel.curser_row = (panel.curser_row + size)
                .min(height - 1)
                .min(total - 1 - panel.curser_offset);
        } else {
            panel.curser_offset = (panel.curser_offset + size).min(total - height);
        }
    }

    fn toggle_facet_value(&mut self) {
        let Some(panel) = self.facet_panel.as_ref() else {
            return;
        };
        let column = panel.column.clone();
        let idx = panel.curser_offset + panel.curser_row;
        let Some(value) = self
            .view
            .facets
            .get(&column)
            .and_then(|options| options.get(idx))
            .map(|option| option.value.clone())
        else {
            return;
        };

        let selected = self.filters.toggle_value(&column, &value);
        if selected {
            self.set_status_message(format!("{column}: selected \"{value}\""));
        } else {
            self.set_status_message(format!("{column}: removed \"{value}\""));
        }
        self.schedule_recompute();
    }

    fn clear_panel_column(&mut self) {
        let Some(column) = self.facet_panel.as_ref().map(|p| p.column.clone()) else {
            return;
        };
        self.filters.clear_column(&column);
        self.set_status_message(format!("Cleared filter on {column}"));
        self.schedule_recompute();
    }

    // ------------------------ Filter actions --------------------------- //

    fn clear_current_column(&mut self) {
        let Some(column) = self.view.header.get(self.curser_column).cloned() else {
            return;
        };
        self.filters.clear_column(&column);
        self.set_status_message(format!("Cleared filter on {column}"));
        self.schedule_recompute();
    }

    fn clear_all_filters(&mut self) {
        let total = self.filters.total_selected();
        self.filters.clear_all();
        self.set_status_message(format!("Cleared {total} selected values"));
        self.schedule_recompute();
    }

    fn hide_current_column(&mut self) {
        let Some(column) = self.view.header.get(self.curser_column).cloned() else {
            return;
        };
        let visible = self.dataset.ncols() - self.hidden_columns.len();
        if visible <= 1 {
            self.set_status_message("Cannot hide the last visible column");
            return;
        }
        if !self.hidden_columns.contains(&column) {
            self.hidden_columns.push(column);
        }
        self.schedule_recompute();
    }

    fn reset_projection(&mut self) {
        if !self.hidden_columns.is_empty() {
            self.hidden_columns.clear();
            self.schedule_recompute();
        }
    }

    // ------------------------ Prompt handling -------------------------- //

    fn enter_prompt(&mut self, kind: PromptKind) {
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.prompt = Some(kind);
        match kind {
            PromptKind::SearchGlobal => {
                self.saved_search = self.filters.search().to_string();
                let initial = self.saved_search.clone();
                self.input.start(&initial);
            }
            PromptKind::GotoPage => self.input.start(""),
        }
    }

    fn leave_prompt(&mut self) {
        self.prompt = None;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        let Some(kind) = self.prompt else {
            return;
        };
        let state = self.input.read(key);
        match kind {
            // The search is live while typing; the debounce window absorbs
            // the keystroke rate.
            PromptKind::SearchGlobal => {
                if state.canceled {
                    let saved = self.saved_search.clone();
                    self.filters.set_search(saved);
                } else {
                    self.filters.set_search(state.text.clone());
                }
                self.schedule_recompute();
                if state.finished {
                    self.leave_prompt();
                }
            }
            PromptKind::GotoPage => {
                if state.finished {
                    if !state.canceled
                        && let Ok(page) = state.text.trim().parse::<usize>()
                    {
                        self.goto_page(page);
                    }
                    self.leave_prompt();
                }
            }
        }
    }

    // ------------------------ Clipboard -------------------------------- //

    fn abs_selected_row(&self) -> usize {
        self.page * self.config.page_size + self.curser_offset + self.curser_row
    }

    fn copy_cell(&mut self) {
        let Some(cell) = self
            .view
            .rows
            .get(self.abs_selected_row())
            .and_then(|row| row.get(self.curser_column))
            .cloned()
        else {
            return;
        };
        trace!("Cell content: {}", cell);
        self.clipboard_set(cell);
    }

    fn copy_row(&mut self) {
        let Some(row) = self.view.rows.get(self.abs_selected_row()) else {
            return;
        };
        let content = row
            .iter()
            .map(|cell| Self::wrap_cell_content(cell))
            .collect::<Vec<String>>();
        self.clipboard_set(content.join(","));
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.chars().any(|c| c == '"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace("\"", "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn clipboard_set(&mut self, content: String) {
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    error!("Clipboard unavailable: {:?}", e);
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(content) {
                Ok(_) => trace!("Copied content to clipboard."),
                Err(e) => trace!("Error copying to clipboard: {:?}", e),
            }
        }
    }

    // ------------------------ Misc ------------------------------------- //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup_message = HELP_TEXT.to_string();
    }

    fn close_popup(&mut self) {
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.popup_message.clear();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    // ------------------------ UI data ---------------------------------- //

    fn display_cell(value: &str) -> String {
        value.replace("\r\n", " ↵ ").replace('\n', " ↵ ")
    }

    fn filter_summary(&self) -> String {
        if !self.filters.is_restricting() && self.hidden_columns.is_empty() {
            return String::new();
        }
        let mut parts: Vec<String> = self
            .filters
            .active_columns()
            .iter()
            .map(|(column, n)| format!("{column} ({n})"))
            .collect();
        let search = self.filters.search().trim();
        if !search.is_empty() {
            parts.push(format!("search \"{search}\""));
        }
        if !self.hidden_columns.is_empty() {
            parts.push(format!("{} hidden", self.hidden_columns.len()));
        }
        parts.join(", ")
    }

    pub fn uidata(&self) -> UIData {
        let page_rows = self.current_page_rows();
        let rbegin = self.curser_offset.min(page_rows.len());
        let rend = (rbegin + self.uilayout.table_height).min(page_rows.len());

        let widths = self.column_widths();
        let cbegin = self.offset_column.min(self.view.header.len());
        let cend = (self.offset_column + self.visible_column_count(self.offset_column))
            .min(self.view.header.len());

        let rows: Vec<Vec<String>> = page_rows[rbegin..rend]
            .iter()
            .map(|row| row[cbegin..cend].iter().map(|v| Self::display_cell(v)).collect())
            .collect();

        let index: Vec<String> = if self.show_index {
            let page_start = self.page * self.config.page_size;
            (rbegin..rend)
                .map(|idx| (page_start + idx + 1).to_string())
                .collect()
        } else {
            Vec::new()
        };

        let facet_panel = self.facet_panel.as_ref().map(|panel| {
            let options = self
                .view
                .facets
                .get(&panel.column)
                .map_or(&[][..], Vec::as_slice);
            let begin = panel.curser_offset.min(options.len());
            let end = (begin + self.panel_height()).min(options.len());
            FacetPanelView {
                column: panel.column.clone(),
                lines: options[begin..end]
                    .iter()
                    .map(|option| FacetLine {
                        value: option.value.clone(),
                        count: option.count,
                        selected: self.filters.is_selected(&panel.column, &option.value),
                    })
                    .collect(),
                selected: panel.curser_row,
                total: options.len(),
            }
        });

        let prompt = self.prompt.map(|kind| {
            let state = self.input.state();
            PromptView {
                kind,
                text: state.text,
                curser_pos: state.cursor,
            }
        });

        // Old status messages fade out instead of lingering forever.
        let status_message = if self.last_status_message_update.elapsed() < Duration::from_secs(10)
        {
            self.status_message.clone()
        } else {
            String::new()
        };

        let mut title = if self.source_name.is_empty() {
            "fv".to_string()
        } else {
            self.source_name.clone()
        };
        if self.page_count() > 1 {
            title = format!("{} [{}/{}]", title, self.page + 1, self.page_count());
        }
        if !self.is_settled() {
            title.push_str(" ~");
        }

        UIData {
            title,
            header: self.view.header[cbegin..cend].to_vec(),
            widths: widths[cbegin..cend].to_vec(),
            rows,
            index,
            selected_row: self.curser_row.min(rend.saturating_sub(rbegin + 1)),
            selected_column: self.curser_column.saturating_sub(cbegin),
            total_rows: self.view.rows.len(),
            page: self.page,
            page_count: self.page_count(),
            facet_panel,
            prompt,
            show_popup: matches!(self.modus, Modus::POPUP),
            popup_message: self.popup_message.clone(),
            status_message,
            filter_summary: self.filter_summary(),
        }
    }
}
