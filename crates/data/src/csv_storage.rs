use crate::error::{DataError, Result};
use crate::normalize::{market_records, Bar};
use csv::{Reader, Writer};
use flarewatch_core::{FlareRecord, MarketRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct FlareRow {
    date: String,
    flare: f64,
    class: String,
    peak_time: String,
    source_region: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct MarketRow {
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: f64,
    volume: f64,
    volatility: f64,
}

pub struct CsvStorage;

impl CsvStorage {
    /// Writes flare records sorted by date.
    ///
    /// Format: date,flare,class,peak_time,source_region
    ///
    /// # Errors
    /// Returns error if the file cannot be created or writing fails
    pub fn write_flares(path: impl AsRef<Path>, records: &[FlareRecord]) -> Result<()> {
        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));

        let rows = sorted.into_iter().map(|r| FlareRow {
            date: r.date,
            flare: r.flare,
            class: r.class_label,
            peak_time: r.peak_time,
            source_region: r.source_region,
        });
        write_rows(path.as_ref(), rows)
    }

    /// Reads flare records written by [`CsvStorage::write_flares`].
    ///
    /// Malformed rows are skipped.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or has no readable header
    pub fn read_flares(path: impl AsRef<Path>) -> Result<Vec<FlareRecord>> {
        let rows: Vec<FlareRow> = read_rows(path.as_ref())?;
        Ok(rows
            .into_iter()
            .map(|r| FlareRecord {
                date: r.date,
                flare: r.flare,
                class_label: r.class,
                peak_time: r.peak_time,
                source_region: r.source_region,
            })
            .collect())
    }

    /// Writes market records sorted by date.
    ///
    /// Format: date,open,high,low,close,volume,volatility
    ///
    /// # Errors
    /// Returns error if the file cannot be created or writing fails
    pub fn write_market(path: impl AsRef<Path>, records: &[MarketRecord]) -> Result<()> {
        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));

        let rows = sorted.into_iter().map(|r| MarketRow {
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
            volatility: r.volatility,
        });
        write_rows(path.as_ref(), rows)
    }

    /// Reads market records written by [`CsvStorage::write_market`].
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or has no readable header
    pub fn read_market(path: impl AsRef<Path>) -> Result<Vec<MarketRecord>> {
        let rows: Vec<MarketRow> = read_rows(path.as_ref())?;
        Ok(rows
            .into_iter()
            .map(|r| MarketRecord {
                date: r.date,
                close: r.close,
                volume: r.volume,
                volatility: r.volatility,
                open: r.open,
                high: r.high,
                low: r.low,
            })
            .collect())
    }

    /// Reads market records from either a stored market file or a raw OHLCV
    /// export. Files without a `volatility` column are treated as raw bars
    /// and normalized.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or has no readable header
    pub fn load_market(path: impl AsRef<Path>) -> Result<Vec<MarketRecord>> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let mut reader = Reader::from_path(path).map_err(|e| DataError::csv(&shown, e))?;
        let has_volatility = reader
            .headers()
            .map_err(|e| DataError::csv(&shown, e))?
            .iter()
            .any(|h| h.trim() == "volatility");

        if has_volatility {
            Self::read_market(path)
        } else {
            Ok(market_records(Self::read_bars(path)?, None))
        }
    }

    /// Reads raw OHLCV bars from an export with a `date,open,high,low,close,volume`
    /// header. Extra columns are ignored.
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or has no readable header
    pub fn read_bars(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
        read_rows(path.as_ref())
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: impl Iterator<Item = T>) -> Result<()> {
    let shown = path.display().to_string();
    let mut writer = Writer::from_path(path).map_err(|e| DataError::csv(&shown, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| DataError::csv(&shown, e))?;
    }
    writer
        .flush()
        .map_err(|e| DataError::csv(&shown, e.into()))?;
    Ok(())
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let shown = path.display().to_string();
    let mut reader = Reader::from_path(path).map_err(|e| DataError::csv(&shown, e))?;
    reader
        .headers()
        .map_err(|e| DataError::csv(&shown, e))?;

    let mut rows = Vec::new();
    for (line, result) in reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => debug!(path = %shown, line = line + 2, %err, "skipping malformed CSV row"),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_flares_round_trip_sorted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flares.csv");
        let mut late = FlareRecord::new("2024-03-02", 12.0, "X1.2");
        late.source_region = Some(13590);
        let early = FlareRecord::new("2024-03-01", 0.5, "C5.0");

        CsvStorage::write_flares(&path, &[late.clone(), early.clone()]).unwrap();
        let loaded = CsvStorage::read_flares(&path).unwrap();

        assert_eq!(loaded, vec![early, late]);
    }

    #[test]
    fn test_market_round_trip_keeps_optional_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("market.csv");
        let mut record = MarketRecord::new("2024-03-01", 510.0, 1.5e6, 1.2);
        record.high = Some(512.0);

        CsvStorage::write_market(&path, &[record.clone()]).unwrap();
        let loaded = CsvStorage::read_market(&path).unwrap();

        assert_eq!(loaded, vec![record]);
        assert_eq!(loaded[0].low, None);
    }

    #[test]
    fn test_read_bars_skips_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("spy.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "date,open,high,low,close,volume").unwrap();
        writeln!(file, "2024-03-01,500,505,498,503,1000000").unwrap();
        writeln!(file, "2024-03-02,500,505,498,not-a-number,1000000").unwrap();
        writeln!(file, "2024-03-04,,,,504,900000").unwrap();

        let bars = CsvStorage::read_bars(&path).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].high, Some(505.0));
        assert_eq!(bars[1].open, None);
        assert_eq!(bars[1].close, 504.0);
    }

    #[test]
    fn test_load_market_normalizes_raw_exports() {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw.csv");
        let mut file = std::fs::File::create(&raw).unwrap();
        writeln!(file, "date,open,high,low,close,volume").unwrap();
        writeln!(file, "2024-03-01,100,102,98,100,1000").unwrap();
        writeln!(file, "2024-03-04,100,101,99,105,1000").unwrap();
        drop(file);

        let records = CsvStorage::load_market(&raw).unwrap();
        assert_eq!(records.len(), 2);
        assert!((records[0].volatility - 4.0).abs() < 1e-9);
        assert!((records[1].volatility - 5.0).abs() < 1e-9);

        let stored = dir.path().join("stored.csv");
        CsvStorage::write_market(&stored, &records).unwrap();
        assert_eq!(CsvStorage::load_market(&stored).unwrap(), records);
    }

    #[test]
    fn test_missing_file_is_csv_error() {
        let err = CsvStorage::read_bars("/nonexistent/flarewatch.csv").unwrap_err();
        assert!(matches!(err, DataError::Csv { .. }));
    }
}
