use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::FvError;

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

/// The immutable row store for one session.
///
/// Column names and their order come from the header; every cell is
/// materialized as a string at load time, with missing values becoming the
/// empty string. The dataset is never mutated after construction, only
/// replaced wholesale by the next load.
#[derive(Debug, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset directly from rows. Rows shorter than the header are
    /// padded with empty cells, longer ones are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let ncols = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(ncols, String::new());
                row
            })
            .collect();
        Dataset { columns, rows }
    }

    pub fn load(path: &Path) -> Result<Self, FvError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FvError::FileNotFound,
            ErrorKind::PermissionDenied => FvError::PermissionDenied,
            _ => FvError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(FvError::LoadingFailed("Not a file!".into()));
        }

        let file_type = Self::detect_file_type(path)?;
        debug!(
            "Loading {:?} ({:?}, {} bytes)",
            path,
            file_type,
            metadata.len()
        );

        let frame = match file_type {
            FileType::CSV => Self::scan_csv(path)?,
            FileType::PARQUET => Self::scan_parquet(path)?,
            FileType::ARROW => Self::scan_arrow(path)?,
        };

        // Materialize every column as strings, one column per rayon task.
        let start_time = Instant::now();
        let df = frame.collect()?;
        let c_: Result<Vec<Vec<String>>, PolarsError> = df
            .get_column_names()
            .par_iter()
            .map(|name| Self::column_cells(&df, name))
            .collect();
        let cells = c_?;
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        // Pivot the column buffers into row-major form; the filter contract
        // is row oriented.
        let nrows = cells.first().map_or(0, Vec::len);
        let mut rows: Vec<Vec<String>> = (0..nrows)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();
        for column in cells {
            for (ridx, value) in column.into_iter().enumerate() {
                rows[ridx].push(value);
            }
        }

        info!(
            "Loaded {} rows x {} columns in {}ms",
            nrows,
            columns.len(),
            start_time.elapsed().as_millis()
        );

        Ok(Dataset { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn detect_file_type(path: &Path) -> Result<FileType, FvError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
            _ => Err(FvError::UnknownFileType),
        }
    }

    fn column_cells(df: &DataFrame, col_name: &str) -> Result<Vec<String>, PolarsError> {
        let col = df.column(col_name)?.cast(&DataType::String)?;
        let series = col.str()?;
        let mut data = Vec::with_capacity(series.len());
        for value in series.into_iter() {
            // Missing cells behave as empty strings everywhere downstream.
            data.push(value.map_or_else(String::new, str::to_string));
        }
        Ok(data)
    }

    fn scan_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .finish()
    }

    fn scan_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
    }

    fn scan_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_ipc(
            PlPath::Local(path.into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )
    }
}

/// Convenience for tests and small fixtures.
#[cfg(test)]
pub fn dataset_from(columns: &[&str], rows: &[&[&str]]) -> Dataset {
    Dataset::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect(),
    )
}

pub fn source_name(path: &PathBuf) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string()
}
