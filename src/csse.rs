use std::io;

use chrono::NaiveDate;

use log::debug;

use smartstring::alias::{String as SmartString};

use super::context::{parse_count, SnapshotRow};
use super::error::ParseError;
use super::timeseries::{Counters, DateLabel, TimeSeriesKey};


static SERIES_DATE_FORMAT: &'static str = "%m/%d/%y";

static COL_PROVINCE: &'static str = "Province/State";
static COL_COUNTRY: &'static str = "Country/Region";
static COL_LAT: &'static str = "Lat";
static COL_LONG: &'static str = "Long";
static COL_LONG_ALT: &'static str = "Long_";


/// True for headers which name a date column of a wide time series table.
pub fn is_date_column(header: &str) -> bool {
	NaiveDate::parse_from_str(header, SERIES_DATE_FORMAT).is_ok()
}

/// Strips a leading UTF-8 byte order mark, which some of the published
/// files carry.
pub fn strip_bom(data: &[u8]) -> &[u8] {
	if data.starts_with(b"\xef\xbb\xbf") {
		&data[3..]
	} else {
		data
	}
}


#[derive(Debug, Clone)]
pub struct RawSeriesRow {
	pub province_state: Option<SmartString>,
	/// `None` for rows with a blank country cell; their counts still take
	/// part in every sum.
	pub country_region: Option<SmartString>,
	pub lat: Option<f64>,
	pub long: Option<f64>,
	pub values: Vec<i64>,
}

/// A wide time series table: one row per region, one value per date column.
#[derive(Debug, Clone)]
pub struct RawSeries {
	pub dates: Vec<DateLabel>,
	pub rows: Vec<RawSeriesRow>,
}

impl RawSeries {
	/// Builds a counter table keyed by `f(row)`; rows mapping to the same
	/// key are summed, rows mapping to `None` are skipped.
	pub fn counters<K: TimeSeriesKey, F: Fn(&RawSeriesRow) -> Option<K>>(&self, f: F) -> Counters<K> {
		let mut result = Counters::new(self.dates.clone());
		for row in self.rows.iter() {
			if let Some(k) = f(row) {
				result.add_row(k, &row.values[..]);
			}
		}
		result
	}

	/// Collapses subdivisions into one row per `Country/Region`. Rows
	/// without a country end up together under the empty label.
	pub fn by_country(&self) -> Counters<SmartString> {
		self.counters(|row| Some(row.country_region.clone().unwrap_or_default()))
	}
}

fn optional_text(s: Option<&str>) -> Option<SmartString> {
	let s = s?.trim();
	if s.is_empty() {
		None
	} else {
		Some(s.into())
	}
}

fn optional_coord(s: Option<&str>) -> Option<f64> {
	s?.trim().parse::<f64>().ok()
}

pub fn load_wide_series<R: io::Read>(r: R) -> Result<RawSeries, ParseError> {
	let mut r = csv::ReaderBuilder::new().flexible(true).from_reader(r);
	let headers = r.headers()?.clone();

	let mut province_col = None;
	let mut country_col = None;
	let mut lat_col = None;
	let mut long_col = None;
	let mut date_cols = Vec::new();
	let mut dates = Vec::new();
	for (i, header) in headers.iter().enumerate() {
		let header = header.trim();
		if header == COL_PROVINCE {
			province_col = Some(i);
		} else if header == COL_COUNTRY {
			country_col = Some(i);
		} else if header == COL_LAT {
			lat_col = Some(i);
		} else if header == COL_LONG || header == COL_LONG_ALT {
			long_col = Some(i);
		} else if is_date_column(header) {
			date_cols.push(i);
			dates.push(DateLabel::from(header));
		} else {
			debug!("ignoring unknown column {:?}", header);
		}
	}
	let country_col = country_col.ok_or(ParseError::MissingColumn(COL_COUNTRY))?;

	let mut rows = Vec::new();
	for record in r.records() {
		let record = record?;
		let country_region = optional_text(record.get(country_col));
		if country_region.is_none() {
			debug!("row without {} at {:?}", COL_COUNTRY, record.position());
		}
		let mut values = Vec::with_capacity(date_cols.len());
		for (col, label) in date_cols.iter().zip(dates.iter()) {
			// short rows are padded with nulls, which count as zero
			values.push(parse_count(label, record.get(*col).unwrap_or(""))?);
		}
		rows.push(RawSeriesRow{
			province_state: province_col.and_then(|i| optional_text(record.get(i))),
			country_region,
			lat: lat_col.and_then(|i| optional_coord(record.get(i))),
			long: long_col.and_then(|i| optional_coord(record.get(i))),
			values,
		});
	}
	Ok(RawSeries{dates, rows})
}


/// A single day's cumulative counts per reporting unit.
#[derive(Debug, Clone)]
pub struct Snapshot {
	pub date: NaiveDate,
	pub rows: Vec<SnapshotRow>,
}

pub fn load_snapshot<R: io::Read>(date: NaiveDate, r: R) -> Result<Snapshot, ParseError> {
	let mut r = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_reader(r);
	let mut rows = Vec::new();
	for row in r.deserialize() {
		let rec: SnapshotRow = row?;
		rows.push(rec);
	}
	Ok(Snapshot{date, rows})
}
