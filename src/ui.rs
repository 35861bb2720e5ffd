use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Block, Cell, Clear, Paragraph, Row, Table},
};

use crate::domain::PromptKind;
use crate::model::UIData;

pub const CMDLINE_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const TABLE_BORDER_HEIGHT: usize = 2;
pub const COLUMN_WIDTH_MARGIN: usize = 2;

pub fn draw(frame: &mut Frame, data: &UIData) {
    let [table_area, cmdline_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(CMDLINE_HEIGHT as u16)])
            .areas(frame.area());

    draw_table(frame, table_area, data);
    draw_cmdline(frame, cmdline_area, data);

    if let Some(panel) = &data.facet_panel {
        draw_facet_panel(frame, table_area, panel);
    }
    if data.show_popup {
        draw_popup(frame, table_area, &data.popup_message);
    }
}

fn draw_table(frame: &mut Frame, area: Rect, data: &UIData) {
    let index_width = data.index.iter().map(String::len).max().unwrap_or(0) as u16;

    let mut constraints: Vec<Constraint> = Vec::new();
    let mut header_cells: Vec<Cell> = Vec::new();
    if !data.index.is_empty() {
        constraints.push(Constraint::Length(index_width));
        header_cells.push(Cell::from(""));
    }
    for (name, width) in data.header.iter().zip(&data.widths) {
        constraints.push(Constraint::Length(*width));
        header_cells.push(Cell::from(name.clone().bold()));
    }

    let rows = data.rows.iter().enumerate().map(|(ridx, row)| {
        let mut cells: Vec<Cell> = Vec::with_capacity(row.len() + 1);
        if let Some(number) = data.index.get(ridx) {
            cells.push(Cell::from(number.clone().dim()));
        }
        for (cidx, value) in row.iter().enumerate() {
            let mut cell = Cell::from(value.clone());
            if ridx == data.selected_row {
                if cidx == data.selected_column {
                    cell = cell.style(Style::new().yellow().reversed());
                } else {
                    cell = cell.style(Style::new().reversed());
                }
            }
            cells.push(cell);
        }
        Row::new(cells)
    });

    let instructions = Line::from(" q quit  / search  f facets  v hide  ? help ".dim());
    let block = Block::bordered()
        .title(Line::from(format!(" {} ", data.title)).centered())
        .title_bottom(instructions.centered());

    let table = Table::new(rows, constraints)
        .header(Row::new(header_cells))
        .block(block);
    frame.render_widget(table, area);
}

fn draw_cmdline(frame: &mut Frame, area: Rect, data: &UIData) {
    if let Some(prompt) = &data.prompt {
        let prefix = match prompt.kind {
            PromptKind::SearchGlobal => "/",
            PromptKind::GotoPage => ":",
        };
        frame.render_widget(Paragraph::new(format!("{prefix}{}", prompt.text)), area);
        let x = area.x + 1 + prompt.curser_pos as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    } else {
        let mut status = data.status_message.clone();
        if !data.filter_summary.is_empty() {
            status = format!("{status}  [{}]", data.filter_summary);
        }
        status = format!("{status}  {} rows", data.total_rows);
        if data.page_count > 1 {
            status = format!("{status}, page {}/{}", data.page + 1, data.page_count);
        }
        frame.render_widget(Paragraph::new(status), area);
    }
}

fn draw_facet_panel(frame: &mut Frame, area: Rect, panel: &crate::model::FacetPanelView) {
    let popup = popup_area(area, 50, 70);
    frame.render_widget(Clear, popup);

    let lines: Vec<Line> = panel
        .lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let mark = if line.selected { "[x]" } else { "[ ]" };
            let text = Line::from(format!("{mark} {} ({})", line.value, line.count));
            if idx == panel.selected {
                text.reversed()
            } else {
                text
            }
        })
        .collect();

    let instructions = Line::from(" Enter toggle  c clear  Esc close ".dim());
    let block = Block::bordered()
        .title(Line::from(format!(" {} ({} values) ", panel.column, panel.total)).centered())
        .title_bottom(instructions.centered());
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn draw_popup(frame: &mut Frame, area: Rect, message: &str) {
    let popup = popup_area(area, 60, 80);
    frame.render_widget(Clear, popup);
    let block = Block::bordered().title(Line::from(" help ").centered());
    frame.render_widget(Paragraph::new(message.to_string()).block(block), popup);
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    area
}
