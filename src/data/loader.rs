use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::model::{Border, CrossingDataset, CrossingRecord};

pub const COL_PORT_NAME: &str = "Port Name";
pub const COL_STATE: &str = "State";
pub const COL_BORDER: &str = "Border";
pub const COL_MEASURE: &str = "Measure";
pub const COL_VALUE: &str = "Value";
pub const COL_DATE: &str = "Date";
pub const COL_LATITUDE: &str = "Latitude";
pub const COL_LONGITUDE: &str = "Longitude";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Any failure while reading the crossing table. A load either yields the
/// complete dataset or one of these; rows are never skipped.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed Parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("reading Arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: missing value in column '{column}'")]
    MissingField { row: usize, column: &'static str },
    #[error("row {row}: port name is empty")]
    EmptyPortName { row: usize },
    #[error("row {row}: unknown border '{value}'")]
    InvalidBorder { row: usize, value: String },
    #[error("row {row}: '{value}' is not a non-negative integer count")]
    InvalidValue { row: usize, value: String },
    #[error("row {row}: unparseable date '{value}'")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: invalid {column} '{value}'")]
    InvalidCoordinate {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: counts add up past {max}", max = u64::MAX)]
    TotalOverflow { row: usize },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a crossing dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the named columns (the published layout)
/// * `.parquet` – the same columns, strings as Utf8, `Date` as Utf8 or Date32
pub fn load_file(path: &Path) -> Result<CrossingDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let started = Instant::now();
    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} crossing records from {} in {:.2?}",
        dataset.len(),
        path.display(),
        started.elapsed()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Field parsing shared by both formats
// ---------------------------------------------------------------------------

/// Parse a date in any of the layouts the published extracts have used.
/// Month-only layouts resolve to the first of the month.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%m/%d/%Y %I:%M:%S %p", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // "Jan 2024", "2024-01"
    NaiveDate::parse_from_str(&format!("1 {s}"), "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .ok()
}

fn parse_value(s: &str, row: usize) -> Result<u64, LoadError> {
    s.trim().parse::<u64>().map_err(|_| LoadError::InvalidValue {
        row,
        value: s.to_string(),
    })
}

fn parse_coordinate(s: &str, row: usize, column: &'static str) -> Result<Option<f64>, LoadError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(LoadError::InvalidCoordinate {
            row,
            column,
            value: s.to_string(),
        }),
    }
}

/// Build the dataset once every row parsed. The grand total of `Value` must
/// fit in a `u64`, which bounds every per-port, per-month and per-filter sum.
fn finish(records: Vec<CrossingRecord>) -> Result<CrossingDataset, LoadError> {
    let mut total = 0u64;
    for (i, rec) in records.iter().enumerate() {
        total = total
            .checked_add(rec.value)
            .ok_or(LoadError::TotalOverflow { row: i + 1 })?;
    }
    Ok(CrossingDataset::from_records(records))
}

/// The categorical text fields of one row.
struct RowText<'a> {
    port_name: &'a str,
    state: &'a str,
    border: &'a str,
    measure: &'a str,
}

impl RowText<'_> {
    fn into_record(
        self,
        row: usize,
        value: u64,
        date: NaiveDate,
        coords: (Option<f64>, Option<f64>),
    ) -> Result<CrossingRecord, LoadError> {
        let port_name = self.port_name.trim();
        if port_name.is_empty() {
            return Err(LoadError::EmptyPortName { row });
        }
        let border = self
            .border
            .trim()
            .parse::<Border>()
            .map_err(|e| LoadError::InvalidBorder { row, value: e.0 })?;

        Ok(CrossingRecord {
            port_name: port_name.to_string(),
            state: self.state.trim().to_string(),
            border,
            measure: self.measure.trim().to_string(),
            value,
            date,
            latitude: coords.0,
            longitude: coords.1,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Positions of the required columns within a header row.
struct ColumnIndex {
    port_name: usize,
    state: usize,
    border: usize,
    measure: usize,
    value: usize,
    date: usize,
    latitude: usize,
    longitude: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(LoadError::MissingColumn(name))
        };
        Ok(ColumnIndex {
            port_name: find(COL_PORT_NAME)?,
            state: find(COL_STATE)?,
            border: find(COL_BORDER)?,
            measure: find(COL_MEASURE)?,
            value: find(COL_VALUE)?,
            date: find(COL_DATE)?,
            latitude: find(COL_LATITUDE)?,
            longitude: find(COL_LONGITUDE)?,
        })
    }
}

fn load_csv(path: &Path) -> Result<CrossingDataset, LoadError> {
    read_csv(open(path)?)
}

/// CSV layout: one header row naming at least the eight required columns, in
/// any order. Extra columns (Port Code, Point, …) are ignored.
pub fn read_csv<R: Read>(source: R) -> Result<CrossingDataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(false).from_reader(source);
    let columns = ColumnIndex::resolve(reader.headers()?)?;

    let mut records = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let rec = result?;
        let field = |idx: usize| rec.get(idx).unwrap_or("");

        let value = parse_value(field(columns.value), row)?;
        let date_text = field(columns.date);
        let date = parse_date(date_text).ok_or_else(|| LoadError::InvalidDate {
            row,
            value: date_text.to_string(),
        })?;
        let latitude = parse_coordinate(field(columns.latitude), row, COL_LATITUDE)?;
        let longitude = parse_coordinate(field(columns.longitude), row, COL_LONGITUDE)?;

        let text = RowText {
            port_name: field(columns.port_name),
            state: field(columns.state),
            border: field(columns.border),
            measure: field(columns.measure),
        };
        records.push(text.into_record(row, value, date, (latitude, longitude))?);
    }

    finish(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the crossing table.
///
/// Text columns may be any string-like Arrow type; `Value` any integer type;
/// `Date` either Date32 or text in one of the [`parse_date`] layouts;
/// coordinates any nullable numeric type, or text parsed as in CSV.
fn load_parquet(path: &Path) -> Result<CrossingDataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        read_batch(&batch, row_offset, &mut records)?;
        row_offset += batch.num_rows();
    }

    finish(records)
}

fn column(batch: &RecordBatch, name: &'static str) -> Result<ArrayRef, LoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name))?;
    Ok(batch.column(idx).clone())
}

fn cast_column(batch: &RecordBatch, name: &'static str, to: &DataType) -> Result<ArrayRef, LoadError> {
    Ok(cast(&column(batch, name)?, to)?)
}

/// A coordinate column, either numeric or text to be parsed like CSV cells.
/// Text is never cast straight to Float64: the cast turns bad input into
/// nulls, which would read as absent coordinates.
enum Coordinates {
    Numeric(ArrayRef),
    Text(ArrayRef),
}

impl Coordinates {
    fn from_batch(batch: &RecordBatch, name: &'static str) -> Result<Self, LoadError> {
        let col = column(batch, name)?;
        if col.data_type().is_numeric() {
            Ok(Coordinates::Numeric(cast(&col, &DataType::Float64)?))
        } else {
            Ok(Coordinates::Text(cast(&col, &DataType::Utf8)?))
        }
    }

    fn at(&self, i: usize, row: usize, column: &'static str) -> Result<Option<f64>, LoadError> {
        match self {
            Coordinates::Numeric(arr) => {
                let arr = arr.as_primitive::<Float64Type>();
                if arr.is_null(i) {
                    return Ok(None);
                }
                let v = arr.value(i);
                if v.is_finite() {
                    Ok(Some(v))
                } else {
                    Err(LoadError::InvalidCoordinate {
                        row,
                        column,
                        value: v.to_string(),
                    })
                }
            }
            Coordinates::Text(arr) => {
                let arr = arr.as_string::<i32>();
                if arr.is_null(i) {
                    Ok(None)
                } else {
                    parse_coordinate(arr.value(i), row, column)
                }
            }
        }
    }
}

fn read_batch(
    batch: &RecordBatch,
    row_offset: usize,
    out: &mut Vec<CrossingRecord>,
) -> Result<(), LoadError> {
    let port = cast_column(batch, COL_PORT_NAME, &DataType::Utf8)?;
    let state = cast_column(batch, COL_STATE, &DataType::Utf8)?;
    let border = cast_column(batch, COL_BORDER, &DataType::Utf8)?;
    let measure = cast_column(batch, COL_MEASURE, &DataType::Utf8)?;
    let value = column(batch, COL_VALUE)?;
    let date = column(batch, COL_DATE)?;
    let lat = Coordinates::from_batch(batch, COL_LATITUDE)?;
    let lon = Coordinates::from_batch(batch, COL_LONGITUDE)?;

    // Values cast from text would silently null out on bad input, so only
    // integer columns are accepted.
    if !value.data_type().is_integer() {
        return Err(LoadError::InvalidValue {
            row: row_offset + 1,
            value: format!("{:?} column", value.data_type()),
        });
    }
    let value = cast(&value, &DataType::Int64)?;
    let value = value.as_primitive::<Int64Type>();
    let date_text = match date.data_type() {
        DataType::Date32 => None,
        _ => Some(cast(&date, &DataType::Utf8)?),
    };

    let port = port.as_string::<i32>();
    let state = state.as_string::<i32>();
    let border = border.as_string::<i32>();
    let measure = measure.as_string::<i32>();

    for i in 0..batch.num_rows() {
        let row = row_offset + i + 1;

        if value.is_null(i) {
            return Err(LoadError::MissingField { row, column: COL_VALUE });
        }
        let raw = value.value(i);
        let count = u64::try_from(raw).map_err(|_| LoadError::InvalidValue {
            row,
            value: raw.to_string(),
        })?;

        let day = match &date_text {
            Some(text) => {
                let text = text_at(text.as_string::<i32>(), i, row, COL_DATE)?;
                parse_date(text).ok_or_else(|| LoadError::InvalidDate {
                    row,
                    value: text.to_string(),
                })?
            }
            None => {
                let days = date.as_primitive::<Date32Type>();
                if days.is_null(i) {
                    return Err(LoadError::MissingField { row, column: COL_DATE });
                }
                date32_to_naive(days.value(i)).ok_or_else(|| LoadError::InvalidDate {
                    row,
                    value: days.value(i).to_string(),
                })?
            }
        };

        let coords = (
            lat.at(i, row, COL_LATITUDE)?,
            lon.at(i, row, COL_LONGITUDE)?,
        );

        let text = RowText {
            port_name: text_at(port, i, row, COL_PORT_NAME)?,
            state: text_at(state, i, row, COL_STATE)?,
            border: text_at(border, i, row, COL_BORDER)?,
            measure: text_at(measure, i, row, COL_MEASURE)?,
        };
        out.push(text.into_record(row, count, day, coords)?);
    }

    Ok(())
}

fn text_at<'a>(
    arr: &'a StringArray,
    i: usize,
    row: usize,
    column: &'static str,
) -> Result<&'a str, LoadError> {
    if arr.is_null(i) {
        Err(LoadError::MissingField { row, column })
    } else {
        Ok(arr.value(i))
    }
}

fn date32_to_naive(days: i32) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    if days >= 0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new(u64::from(days.unsigned_abs())))
    }
}
