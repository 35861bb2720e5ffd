use std::collections::HashMap;

const NO_SELECTION: &[String] = &[];

/// The mutable filter state of one session: per-column allow-lists, the
/// global search string and the output column projection.
///
/// Allow-lists keep the user's selection order; the facet panel pins
/// selected values first in exactly that order. An absent column or an
/// empty list means "no restriction".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    filters: HashMap<String, Vec<String>>,
    search: String,
    projection: Vec<String>,
}

impl FilterState {
    pub fn filters(&self) -> &HashMap<String, Vec<String>> {
        &self.filters
    }

    pub fn selected(&self, column: &str) -> &[String] {
        self.filters.get(column).map_or(NO_SELECTION, Vec::as_slice)
    }

    pub fn is_selected(&self, column: &str, value: &str) -> bool {
        self.selected(column).iter().any(|v| v == value)
    }

    /// Add the value to the column's allow-list, or remove it if already
    /// selected. Returns whether the value is selected afterwards.
    pub fn toggle_value(&mut self, column: &str, value: &str) -> bool {
        let selected = self.filters.entry(column.to_string()).or_default();
        if let Some(pos) = selected.iter().position(|v| v == value) {
            selected.remove(pos);
            if selected.is_empty() {
                self.filters.remove(column);
            }
            false
        } else {
            selected.push(value.to_string());
            true
        }
    }

    pub fn clear_column(&mut self, column: &str) {
        self.filters.remove(column);
    }

    pub fn clear_all(&mut self) {
        self.filters.clear();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    pub fn set_projection(&mut self, columns: Vec<String>) {
        self.projection = columns;
    }

    /// Total number of selected values across all columns.
    pub fn total_selected(&self) -> usize {
        self.filters.values().map(Vec::len).sum()
    }

    /// Columns with an active allow-list and how many values each holds,
    /// sorted by name so the status line is stable.
    pub fn active_columns(&self) -> Vec<(&str, usize)> {
        let mut active: Vec<(&str, usize)> = self
            .filters
            .iter()
            .filter(|(_, sel)| !sel.is_empty())
            .map(|(col, sel)| (col.as_str(), sel.len()))
            .collect();
        active.sort_unstable();
        active
    }

    /// Whether any constraint (filter or search) is active.
    pub fn is_restricting(&self) -> bool {
        self.total_selected() > 0 || !self.search.trim().is_empty()
    }
}
