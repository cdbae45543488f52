//! Reading the source table from disk.

use crate::error::{PipelineError, Result};
use crate::types::Dataset;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads a header-first comma-separated file into a [`Dataset`].
///
/// The schema is inferred from the whole file so that a column whose first
/// rows look like integers but later hold decimals is still read as numbers.
/// The source file is only ever opened for reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn load(&self, path: &Path) -> Result<Dataset> {
        if !path.is_file() {
            return Err(PipelineError::input(path, "file not found"));
        }

        info!("Loading dataset from: {}", path.display());
        let frame = Self::read_with_fallback(path)?;
        if frame.width() == 0 {
            return Err(PipelineError::input(path, "no columns found"));
        }

        let dataset = Dataset::new(frame, path);
        info!(
            "Loaded {} rows, columns: {:?}",
            dataset.height(),
            dataset.column_names()
        );
        Ok(dataset)
    }

    fn read_with_fallback(path: &Path) -> Result<DataFrame> {
        // Strategy 1: standard read with quote handling
        match Self::read_standard(path) {
            Ok(df) => return Ok(df),
            Err(e) => debug!("Standard loading failed: {}", e),
        }

        // Strategy 2: strip blank lines and retry from memory
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::input(path, e.to_string()))?;
        let cleaned = strip_blank_lines(&content);

        CsvReadOptions::default()
            .with_infer_schema_length(None)
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(cleaned))
            .finish()
            .map_err(|e| PipelineError::input(path, e.to_string()))
    }

    fn read_standard(path: &Path) -> PolarsResult<DataFrame> {
        CsvReadOptions::default()
            .with_infer_schema_length(None)
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()
    }
}

fn strip_blank_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
