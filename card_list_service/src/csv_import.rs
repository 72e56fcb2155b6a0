//! CSV extraction of requested cards
//!
//! Reads a card list export with a header row. Only the `name`, `set` and
//! `collector number` columns are used; header matching ignores case.

use crate::error::Result;
use crate::models::RawCardRequest;
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Result of reading one CSV upload
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    /// Requested cards in row order
    pub requests: Vec<RawCardRequest>,
    /// Rows dropped because name or set was empty
    pub skipped: usize,
}

/// Column positions of the recognized headers
#[derive(Debug)]
struct ColumnMap {
    name: Option<usize>,
    set: Option<usize>,
    collector_number: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let lowered: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, header)| (header.to_lowercase(), index))
            .collect();

        let find = |key: &str, literal: &str| {
            lowered
                .get(key)
                .copied()
                .or_else(|| headers.iter().position(|header| header == literal))
        };

        Self {
            name: find("name", "Name"),
            set: find("set", "Set"),
            collector_number: find("collector number", "Collector Number"),
        }
    }

    fn field<'r>(record: &'r StringRecord, column: Option<usize>) -> &'r str {
        column
            .and_then(|index| record.get(index))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Extract card requests from CSV data.
///
/// Rows without a name or set are skipped and counted. Any read or decoding
/// error fails the whole extraction.
pub fn extract_card_requests<R: Read>(reader: R) -> Result<ExtractOutcome> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    log::info!("CSV headers: {:?}", headers.iter().collect::<Vec<_>>());
    let columns = ColumnMap::from_headers(&headers);

    let mut outcome = ExtractOutcome::default();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let row_num = index + 1;

        let name = ColumnMap::field(&record, columns.name);
        let set_code = ColumnMap::field(&record, columns.set);

        if name.is_empty() || set_code.is_empty() {
            log::warn!(
                "Skipping row {} due to missing name or set: {:?}",
                row_num,
                record.iter().collect::<Vec<_>>()
            );
            outcome.skipped += 1;
            continue;
        }

        let collector_number = ColumnMap::field(&record, columns.collector_number);
        log::debug!("Processed row {}: {} ({})", row_num, name, set_code);
        outcome
            .requests
            .push(RawCardRequest::new(name, set_code, collector_number));
    }

    log::info!(
        "Finished processing CSV: {} cards, {} rows skipped",
        outcome.requests.len(),
        outcome.skipped
    );
    Ok(outcome)
}

/// Extract card requests from a CSV file on disk
pub fn extract_card_requests_from_path(path: &Path) -> Result<ExtractOutcome> {
    log::info!("Starting to process CSV file: {}", path.display());
    let file = File::open(path)?;
    extract_card_requests(file)
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
