//! CSV loading and datetime normalization for the trip dataset.
//!
//! Reads plain or gzip-compressed CSV files, projects them onto an optional
//! column subset, and converts both datetime columns into [`TRIP_TIME_ZONE`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, TripError};
use crate::record::{DROPOFF_DATETIME, PICKUP_DATETIME, RawTripRecord, TripRecord};

/// Civil time zone every trip timestamp is expressed in.
///
/// Policy choice of the dataset (New York City taxi trips), not runtime
/// configuration.
pub const TRIP_TIME_ZONE: Tz = chrono_tz::US::Eastern;

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Options controlling what the loader reads.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Maximum number of records to read.
    pub row_limit: Option<usize>,
    /// Restrict loading to these columns; `None` loads every column.
    pub column_subset: Option<Vec<String>>,
}

impl LoadOptions {
    pub fn with_row_limit(mut self, rows: usize) -> Self {
        self.row_limit = Some(rows);
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_subset = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Records read from a source together with the names of the loaded columns,
/// in file order.
#[derive(Debug)]
pub struct LoadedTrips {
    pub columns: Vec<String>,
    pub records: Vec<TripRecord>,
}

/// Opens `path` and loads every trip in it.
///
/// Files ending in `.gz` are decompressed on the fly.
///
/// # Errors
///
/// Fails if the file cannot be opened, a requested or required column is
/// absent, a numeric field does not parse, or a datetime cannot be read.
#[tracing::instrument(skip(path, options), fields(path = %path.display()))]
pub fn load_trips(path: &Path, options: &LoadOptions) -> Result<LoadedTrips> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        debug!("Reading gzip-compressed source");
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let loaded = read_trips(reader, options)?;
    info!(
        rows = loaded.records.len(),
        columns = loaded.columns.len(),
        "Trips loaded"
    );
    Ok(loaded)
}

/// Reads trips from any CSV source with a header row.
pub fn read_trips<R: Read>(reader: R, options: &LoadOptions) -> Result<LoadedTrips> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let selected = select_columns(&headers, options.column_subset.as_deref())?;
    let projected: StringRecord = selected.iter().map(|&i| &headers[i]).collect();

    for required in [PICKUP_DATETIME, DROPOFF_DATETIME] {
        if !projected.iter().any(|h| h == required) {
            return Err(TripError::MissingColumn {
                column: required.to_string(),
            });
        }
    }

    debug!(columns = ?projected, row_limit = ?options.row_limit, "Column projection resolved");

    let mut records = Vec::new();
    let mut record = StringRecord::new();
    let mut row = 0usize;

    while options.row_limit.is_none_or(|limit| row < limit) && rdr.read_record(&mut record)? {
        let fields: StringRecord = selected
            .iter()
            .map(|&i| record.get(i).unwrap_or(""))
            .collect();
        let raw: RawTripRecord = fields.deserialize(Some(&projected))?;
        records.push(normalize(raw, row)?);
        row += 1;
    }

    Ok(LoadedTrips {
        columns: projected.iter().map(str::to_string).collect(),
        records,
    })
}

/// Header indices to keep, in file order.
fn select_columns(headers: &StringRecord, subset: Option<&[String]>) -> Result<Vec<usize>> {
    let Some(subset) = subset else {
        return Ok((0..headers.len()).collect());
    };

    if let Some(missing) = subset.iter().find(|c| !headers.iter().any(|h| h == c.as_str())) {
        return Err(TripError::MissingColumn {
            column: missing.clone(),
        });
    }

    Ok(headers
        .iter()
        .enumerate()
        .filter(|(_, h)| subset.iter().any(|c| c == h))
        .map(|(i, _)| i)
        .collect())
}

fn normalize(raw: RawTripRecord, row: usize) -> Result<TripRecord> {
    let pickup = required_datetime(PICKUP_DATETIME, row, raw.pickup_datetime.as_deref())?;
    let dropoff = required_datetime(DROPOFF_DATETIME, row, raw.dropoff_datetime.as_deref())?;

    let mut trip = TripRecord::new(pickup, dropoff);
    trip.id = raw.id;
    trip.vendor_id = raw.vendor_id;
    trip.passenger_count = raw.passenger_count;
    trip.pickup_longitude = raw.pickup_longitude;
    trip.pickup_latitude = raw.pickup_latitude;
    trip.dropoff_longitude = raw.dropoff_longitude;
    trip.dropoff_latitude = raw.dropoff_latitude;
    trip.store_and_fwd_flag = raw.store_and_fwd_flag;
    trip.trip_duration = raw.trip_duration;
    Ok(trip)
}

fn required_datetime(
    column: &'static str,
    row: usize,
    value: Option<&str>,
) -> Result<DateTime<Tz>> {
    let value = value.unwrap_or("");
    match parse_datetime(value) {
        Some(Some(dt)) => Ok(dt),
        Some(None) => Err(TripError::AmbiguousLocalTime {
            column,
            row,
            value: value.to_string(),
        }),
        None => Err(TripError::InvalidDatetime {
            column,
            row,
            value: value.to_string(),
        }),
    }
}

/// Parses a raw datetime into [`TRIP_TIME_ZONE`].
///
/// Values carrying an offset are converted; naive values keep their
/// wall-clock and get the zone attached. Returns `None` when the text is not
/// a datetime at all, and `Some(None)` when a naive wall-clock is ambiguous or
/// skipped in the zone.
pub fn parse_datetime(value: &str) -> Option<Option<DateTime<Tz>>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let zoned = DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        ZONED_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    });
    if let Some(zoned) = zoned {
        return Some(Some(zoned.with_timezone(&TRIP_TIME_ZONE)));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })?;

    Some(TRIP_TIME_ZONE.from_local_datetime(&naive).single())
}
