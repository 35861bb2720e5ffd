use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::dataset::Dataset;
use crate::filter::FilterState;

/// Row numbering column injected by some exports. It is presentation only
/// and never scanned by the global search. Compared case-insensitively.
pub const ROW_NUMBER_COLUMN: &str = "sl no";

#[derive(Clone, Debug, PartialEq)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}

/// Per column, the selectable values with their occurrence counts under the
/// leave-one-out rule: selected values first in selection order, then the
/// rest in ascending locale-style order.
pub type FacetTable = HashMap<String, Vec<FacetOption>>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterOutcome {
    /// Column names of the output rows, in projection order.
    pub header: Vec<String>,
    /// The matching rows, in dataset order, projected onto `header`.
    pub rows: Vec<Vec<String>>,
    pub facets: FacetTable,
}

/// The filtering engine. Pure and deterministic: same dataset and state in,
/// same rows and facet table out, value for value and order for order.
///
/// Stage 1 keeps a row if, for every column with a non-empty allow-list,
/// the cell value is one of the allowed values (AND across columns, OR
/// within one). Stage 2 keeps a row if any non-pseudo column contains the
/// trimmed, case-folded search term. Stage 3 projects the survivors onto
/// the requested columns. Facets are computed per column over the rows that
/// pass every OTHER column's filter plus the search, so a column's own list
/// always shows what else would be reachable.
pub fn compute(dataset: &Dataset, state: &FilterState) -> FilterOutcome {
    // Resolve allow-lists against the header; filter keys naming unknown
    // columns are ignored.
    let active: Vec<(usize, HashSet<&str>)> = state
        .filters()
        .iter()
        .filter(|(_, sel)| !sel.is_empty())
        .filter_map(|(col, sel)| {
            dataset
                .column_index(col)
                .map(|cidx| (cidx, sel.iter().map(String::as_str).collect()))
        })
        .collect();

    let term = state.search().trim().to_lowercase();
    let search_pass = search_mask(dataset, &term);

    let survivors: Vec<usize> = (0..dataset.nrows())
        .filter(|&ridx| passes(dataset, ridx, &active, None) && search_pass(ridx))
        .collect();

    let (header, rows) = project(dataset, &survivors, state.projection());

    let mut facets = FacetTable::with_capacity(dataset.ncols());
    for (cidx, column) in dataset.columns().iter().enumerate() {
        facets.insert(
            column.clone(),
            facet_options(dataset, state, &active, &search_pass, cidx, column),
        );
    }

    FilterOutcome {
        header,
        rows,
        facets,
    }
}

/// Stage 1 membership test; `skip` excludes one column's own allow-list
/// (the leave-one-out candidate subset).
fn passes(
    dataset: &Dataset,
    ridx: usize,
    active: &[(usize, HashSet<&str>)],
    skip: Option<usize>,
) -> bool {
    active
        .iter()
        .all(|(cidx, allowed)| skip == Some(*cidx) || allowed.contains(dataset.cell(ridx, *cidx)))
}

/// Stage 2 as a per-row predicate. The mask is computed once and shared by
/// the row filter and every column's candidate subset.
fn search_mask<'a>(dataset: &'a Dataset, term: &str) -> impl Fn(usize) -> bool + 'a {
    let matches: Option<Vec<bool>> = if term.is_empty() {
        None
    } else {
        let scanned: Vec<usize> = dataset
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.eq_ignore_ascii_case(ROW_NUMBER_COLUMN))
            .map(|(cidx, _)| cidx)
            .collect();
        let term = term.to_string();
        Some(
            (0..dataset.nrows())
                .map(|ridx| {
                    scanned
                        .iter()
                        .any(|&cidx| dataset.cell(ridx, cidx).to_lowercase().contains(&term))
                })
                .collect(),
        )
    };
    move |ridx: usize| matches.as_ref().is_none_or(|m| m[ridx])
}

/// Stage 3: materialize the surviving rows, restricted to `projection` when
/// it is non-empty. Projecting a column the dataset does not have yields
/// empty cells under that name.
fn project(
    dataset: &Dataset,
    survivors: &[usize],
    projection: &[String],
) -> (Vec<String>, Vec<Vec<String>>) {
    if projection.is_empty() {
        let rows = survivors
            .iter()
            .map(|&ridx| dataset.rows()[ridx].clone())
            .collect();
        return (dataset.columns().to_vec(), rows);
    }

    let indices: Vec<Option<usize>> = projection
        .iter()
        .map(|col| dataset.column_index(col))
        .collect();
    let rows = survivors
        .iter()
        .map(|&ridx| {
            indices
                .iter()
                .map(|cidx| cidx.map_or_else(String::new, |c| dataset.cell(ridx, c).to_string()))
                .collect()
        })
        .collect();
    (projection.to_vec(), rows)
}

fn facet_options(
    dataset: &Dataset,
    state: &FilterState,
    active: &[(usize, HashSet<&str>)],
    search_pass: &impl Fn(usize) -> bool,
    cidx: usize,
    column: &str,
) -> Vec<FacetOption> {
    // Count distinct non-empty values over the candidate subset. Values are
    // trimmed for counting; stage 1 membership stays untrimmed.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for ridx in 0..dataset.nrows() {
        if !passes(dataset, ridx, active, Some(cidx)) || !search_pass(ridx) {
            continue;
        }
        let value = dataset.cell(ridx, cidx).trim();
        if !value.is_empty() {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let selected = state.selected(column);
    let selected_set: HashSet<&str> = selected.iter().map(String::as_str).collect();

    // Selected values stay pinned first in selection order; one whose count
    // dropped to zero is hidden from the list but stays selected.
    let mut options: Vec<FacetOption> = selected
        .iter()
        .filter_map(|value| {
            counts.get(value.as_str()).map(|&count| FacetOption {
                value: value.clone(),
                count,
            })
        })
        .collect();

    let mut rest: Vec<FacetOption> = counts
        .iter()
        .filter(|(value, _)| !selected_set.contains(*value))
        .map(|(value, &count)| FacetOption {
            value: value.to_string(),
            count,
        })
        .collect();
    rest.sort_by(|a, b| locale_cmp(&a.value, &b.value));
    options.extend(rest);
    options
}

/// Locale-style ordering: case-insensitive, raw comparison as tie-break.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::dataset_from;

    fn values(options: &[FacetOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    fn state_with(filters: &[(&str, &[&str])], search: &str, projection: &[&str]) -> FilterState {
        let mut state = FilterState::default();
        for (column, sel) in filters {
            for value in *sel {
                state.toggle_value(column, value);
            }
        }
        state.set_search(search);
        state.set_projection(projection.iter().map(|c| c.to_string()).collect());
        state
    }

    #[test]
    fn no_filters_returns_everything_with_counted_options() {
        let ds = dataset_from(&["a", "b"], &[&["x", "1"], &["y", "2"]]);
        let out = compute(&ds, &FilterState::default());

        assert_eq!(out.header, &["a", "b"]);
        assert_eq!(out.rows, vec![vec!["x", "1"], vec!["y", "2"]]);
        assert_eq!(
            out.facets["a"],
            vec![
                FacetOption {
                    value: "x".into(),
                    count: 1
                },
                FacetOption {
                    value: "y".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(values(&out.facets["b"]), &["1", "2"]);
    }

    #[test]
    fn column_filter_keeps_matching_rows_and_pins_selected_option() {
        let ds = dataset_from(&["a", "b"], &[&["x", "1"], &["y", "2"], &["x", "2"]]);
        let out = compute(&ds, &state_with(&[("a", &["x"])], "", &[]));

        assert_eq!(out.rows, vec![vec!["x", "1"], vec!["x", "2"]]);
        // Selected first, the unselected alternative still reachable.
        assert_eq!(values(&out.facets["a"]), &["x", "y"]);
        // Column b is counted leave-one-out: a's filter does not apply.
        assert_eq!(
            out.facets["b"],
            vec![
                FacetOption {
                    value: "1".into(),
                    count: 1
                },
                FacetOption {
                    value: "2".into(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn values_within_a_column_combine_with_or_across_columns_with_and() {
        let ds = dataset_from(
            &["a", "b"],
            &[&["x", "1"], &["y", "1"], &["z", "1"], &["x", "2"]],
        );
        let or_only = compute(&ds, &state_with(&[("a", &["x", "y"])], "", &[]));
        assert_eq!(or_only.rows.len(), 3);

        let and_too = compute(&ds, &state_with(&[("a", &["x", "y"]), ("b", &["2"])], "", &[]));
        assert_eq!(and_too.rows, vec![vec!["x", "2"]]);
    }

    #[test]
    fn projection_restricts_and_orders_output_columns() {
        let ds = dataset_from(
            &["a", "b", "c"],
            &[&["x", "1", "foo"], &["y", "2", "bar"]],
        );
        let out = compute(&ds, &state_with(&[], "", &["c", "a"]));

        assert_eq!(out.header, &["c", "a"]);
        assert_eq!(out.rows, vec![vec!["foo", "x"], vec!["bar", "y"]]);
    }

    #[test]
    fn projection_of_unknown_column_yields_empty_cells() {
        let ds = dataset_from(&["a"], &[&["x"]]);
        let out = compute(&ds, &state_with(&[], "", &["a", "ghost"]));
        assert_eq!(out.rows, vec![vec!["x", ""]]);
    }

    #[test]
    fn empty_dataset_yields_empty_rows_and_facets() {
        let ds = dataset_from(&[], &[]);
        let out = compute(&ds, &state_with(&[("a", &["x"])], "foo", &[]));
        assert!(out.rows.is_empty());
        assert!(out.facets.is_empty());
    }

    #[test]
    fn unknown_filter_keys_are_ignored() {
        let ds = dataset_from(&["a"], &[&["x"], &["y"]]);
        let out = compute(&ds, &state_with(&[("ghost", &["nope"])], "", &[]));
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn global_search_is_case_insensitive_substring_over_all_columns() {
        let ds = dataset_from(
            &["name", "city"],
            &[&["Alice", "Vienna"], &["Bob", "Graz"], &["Carol", "Wien"]],
        );
        let out = compute(&ds, &state_with(&[], "  VIE  ", &[]));
        assert_eq!(out.rows, vec![vec!["Alice", "Vienna"]]);
    }

    #[test]
    fn global_search_skips_the_row_number_pseudo_column() {
        let ds = dataset_from(&["Sl No", "name"], &[&["1", "alice"], &["2", "bob"]]);
        let out = compute(&ds, &state_with(&[], "1", &[]));
        assert!(out.rows.is_empty());
    }

    #[test]
    fn search_also_narrows_the_facet_candidates() {
        let ds = dataset_from(
            &["a", "b"],
            &[&["x", "foo"], &["y", "foo"], &["y", "bar"]],
        );
        let out = compute(&ds, &state_with(&[], "foo", &[]));
        assert_eq!(
            out.facets["a"],
            vec![
                FacetOption {
                    value: "x".into(),
                    count: 1
                },
                FacetOption {
                    value: "y".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(values(&out.facets["b"]), &["foo"]);
    }

    #[test]
    fn search_and_column_filters_commute() {
        let ds = dataset_from(
            &["a", "b"],
            &[&["x", "foo"], &["x", "bar"], &["y", "foo"]],
        );
        let out = compute(&ds, &state_with(&[("a", &["x"])], "foo", &[]));
        assert_eq!(out.rows, vec![vec!["x", "foo"]]);
    }

    #[test]
    fn facet_counts_trim_values_and_skip_empty_cells() {
        let ds = dataset_from(&["a"], &[&[" x "], &["x"], &[""], &["   "]]);
        let out = compute(&ds, &FilterState::default());
        assert_eq!(
            out.facets["a"],
            vec![FacetOption {
                value: "x".into(),
                count: 2
            }]
        );
    }

    #[test]
    fn selected_values_stay_in_selection_order() {
        let ds = dataset_from(&["a"], &[&["x"], &["y"], &["z"], &["w"]]);
        let out = compute(&ds, &state_with(&[("a", &["z", "x"])], "", &[]));
        assert_eq!(values(&out.facets["a"]), &["z", "x", "w", "y"]);
    }

    #[test]
    fn selected_value_with_zero_count_is_hidden_not_deselected() {
        // Selecting b=1 leaves no candidate row with a=y, so y disappears
        // from a's list while remaining selected in the state.
        let ds = dataset_from(&["a", "b"], &[&["x", "1"], &["y", "2"]]);
        let state = state_with(&[("a", &["y"]), ("b", &["1"])], "", &[]);
        let out = compute(&ds, &state);

        assert_eq!(values(&out.facets["a"]), &["x"]);
        assert!(state.is_selected("a", "y"));
        assert!(out.rows.is_empty());
    }

    #[test]
    fn leave_one_out_keeps_own_option_set_stable() {
        let ds = dataset_from(&["a", "b"], &[&["x", "1"], &["y", "2"], &["x", "2"]]);

        let before = compute(&ds, &FilterState::default());
        let after = compute(&ds, &state_with(&[("a", &["x"])], "", &[]));

        let mut set_before: Vec<&str> = values(&before.facets["a"]);
        let mut set_after: Vec<&str> = values(&after.facets["a"]);
        set_before.sort_unstable();
        set_after.sort_unstable();
        assert_eq!(set_before, set_after);
    }

    #[test]
    fn filter_monotonicity() {
        let ds = dataset_from(
            &["a"],
            &[&["x"], &["y"], &["z"], &["x"], &["y"]],
        );
        let none = compute(&ds, &FilterState::default()).rows.len();
        let one = compute(&ds, &state_with(&[("a", &["x"])], "", &[])).rows.len();
        let two = compute(&ds, &state_with(&[("a", &["x", "y"])], "", &[]))
            .rows
            .len();
        assert!(one <= two);
        assert!(two <= none);
    }

    #[test]
    fn filtered_rows_preserve_dataset_order() {
        let ds = dataset_from(&["a"], &[&["y"], &["x"], &["y"], &["x"]]);
        let out = compute(&ds, &state_with(&[("a", &["x", "y"])], "", &[]));
        assert_eq!(out.rows, vec![vec!["y"], vec!["x"], vec!["y"], vec!["x"]]);
    }

    #[test]
    fn compute_is_deterministic() {
        let ds = dataset_from(
            &["a", "b"],
            &[&["x", "1"], &["y", "2"], &["x", "2"], &["z", "3"]],
        );
        let state = state_with(&[("a", &["x", "z"])], "2", &["b", "a"]);
        let first = compute(&ds, &state);
        let second = compute(&ds, &state);
        assert_eq!(first, second);
    }

    #[test]
    fn unselected_options_sort_case_insensitively() {
        let ds = dataset_from(&["a"], &[&["banana"], &["Apple"], &["cherry"]]);
        let out = compute(&ds, &FilterState::default());
        assert_eq!(values(&out.facets["a"]), &["Apple", "banana", "cherry"]);
    }

    #[test]
    fn empty_allow_list_does_not_restrict() {
        let mut state = FilterState::default();
        state.toggle_value("a", "x");
        state.toggle_value("a", "x");
        let ds = dataset_from(&["a"], &[&["x"], &["y"]]);
        assert_eq!(compute(&ds, &state).rows.len(), 2);
    }

    #[test]
    fn missing_cells_match_as_empty_and_are_not_counted() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec!["x".into(), "1".into()], vec!["y".into()]],
        );
        let out = compute(&ds, &FilterState::default());
        assert_eq!(values(&out.facets["b"]), &["1"]);
        // The row with the missing cell is still present in the output.
        assert_eq!(out.rows.len(), 2);
    }
}
