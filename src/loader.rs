use chrono::NaiveDate;

use log::{info, warn};

use super::csse::{load_snapshot, load_wide_series, strip_bom, RawSeries, Snapshot};
use super::error::Error;
use super::source::{DataSource, Resource};


/// Progress of the daily report retrieval. Starts at the requested date,
/// moves to the previous calendar day on the first failure and gives up on
/// the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotAttempt {
	Requested(NaiveDate),
	PreviousDay(NaiveDate),
	Failed,
}

impl SnapshotAttempt {
	pub fn start(date: NaiveDate) -> Self {
		Self::Requested(date)
	}

	pub fn date(&self) -> Option<NaiveDate> {
		match self {
			Self::Requested(d) | Self::PreviousDay(d) => Some(*d),
			Self::Failed => None,
		}
	}

	pub fn on_failure(self) -> Self {
		match self {
			Self::Requested(d) => match d.pred_opt() {
				Some(prev) => Self::PreviousDay(prev),
				None => Self::Failed,
			},
			Self::PreviousDay(_) | Self::Failed => Self::Failed,
		}
	}
}


#[derive(Debug, Clone)]
pub struct LoadedData {
	pub confirmed: RawSeries,
	pub deaths: RawSeries,
	pub snapshot: Snapshot,
	/// Date of the daily report actually used.
	pub effective_date: NaiveDate,
}


pub fn fetch_series<S: DataSource + ?Sized>(source: &S, resource: Resource) -> Result<RawSeries, Error> {
	let body = source.fetch(&resource).map_err(|e| Error::Fetch(resource, e))?;
	let series = load_wide_series(strip_bom(&body[..])).map_err(|e| Error::Parse(resource, e))?;
	info!("{}: {} rows, {} dates", resource, series.rows.len(), series.dates.len());
	Ok(series)
}

pub fn fetch_snapshot<S: DataSource + ?Sized>(source: &S, date: NaiveDate) -> Result<Snapshot, Error> {
	let resource = Resource::DailyReport(date);
	let body = source.fetch(&resource).map_err(|e| Error::Fetch(resource, e))?;
	let snapshot = load_snapshot(date, strip_bom(&body[..])).map_err(|e| Error::Parse(resource, e))?;
	info!("{}: {} rows", resource, snapshot.rows.len());
	Ok(snapshot)
}

/// Fetches the daily report for `date`, falling back to the day before
/// exactly once. Fetch and parse failures are treated alike.
pub fn load_snapshot_with_fallback<S: DataSource + ?Sized>(source: &S, date: NaiveDate) -> Result<Snapshot, Error> {
	let mut state = SnapshotAttempt::start(date);
	let mut causes = Vec::new();
	while let Some(attempt_date) = state.date() {
		match fetch_snapshot(source, attempt_date) {
			Ok(snapshot) => return Ok(snapshot),
			Err(e) => {
				warn!("daily report for {} unavailable: {}", attempt_date, e);
				causes.push(e);
				state = state.on_failure();
			},
		}
	}
	Err(Error::DataUnavailable{
		requested: date,
		fallback: date.pred_opt().unwrap_or(date),
		causes,
	})
}

pub fn load<S: DataSource + ?Sized>(source: &S, date: NaiveDate) -> Result<LoadedData, Error> {
	let confirmed = fetch_series(source, Resource::ConfirmedGlobal)?;
	let deaths = fetch_series(source, Resource::DeathsGlobal)?;
	let snapshot = load_snapshot_with_fallback(source, date)?;
	let effective_date = snapshot.date;
	if effective_date != date {
		info!("using daily report of {} instead of {}", effective_date, date);
	}
	Ok(LoadedData{
		confirmed,
		deaths,
		snapshot,
		effective_date,
	})
}


#[cfg(test)]
mod tests {
	use super::*;

	use std::cell::RefCell;

	use bytes::Bytes;

	use crate::error::FetchError;
	use crate::source::StaticSource;

	static SERIES: &'static str = "Province/State,Country/Region,Lat,Long,1/22/20\n,Italy,0,0,1\n";
	static REPORT: &'static str = "Province_State,Country_Region,Confirmed,Deaths,Recovered\n,Italy,1,0,0\n";

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	/// Records every requested resource before delegating.
	struct Recording<'a> {
		inner: &'a StaticSource,
		log: RefCell<Vec<Resource>>,
	}

	impl<'a> DataSource for Recording<'a> {
		fn fetch(&self, resource: &Resource) -> Result<Bytes, FetchError> {
			self.log.borrow_mut().push(*resource);
			self.inner.fetch(resource)
		}
	}

	fn series_only() -> StaticSource {
		StaticSource::new()
			.with(Resource::ConfirmedGlobal, SERIES)
			.with(Resource::DeathsGlobal, SERIES)
	}

	fn snapshot_requests(log: &[Resource]) -> Vec<NaiveDate> {
		log.iter().filter_map(|r| match r {
			Resource::DailyReport(d) => Some(*d),
			_ => None,
		}).collect()
	}

	#[test]
	fn attempt_state_machine_has_one_transition() {
		let s = SnapshotAttempt::start(date(2020, 3, 1));
		assert_eq!(s.date(), Some(date(2020, 3, 1)));
		let s = s.on_failure();
		assert_eq!(s, SnapshotAttempt::PreviousDay(date(2020, 2, 29)));
		let s = s.on_failure();
		assert_eq!(s, SnapshotAttempt::Failed);
		assert_eq!(s.date(), None);
		assert_eq!(s.on_failure(), SnapshotAttempt::Failed);
	}

	#[test]
	fn uses_requested_date_when_available() {
		let src = series_only().with(Resource::DailyReport(date(2020, 4, 2)), REPORT);
		let loaded = load(&src, date(2020, 4, 2)).unwrap();
		assert_eq!(loaded.effective_date, date(2020, 4, 2));
		assert_eq!(loaded.snapshot.rows.len(), 1);
		assert_eq!(loaded.confirmed.rows.len(), 1);
	}

	#[test]
	fn falls_back_to_previous_day() {
		let inner = series_only().with(Resource::DailyReport(date(2020, 4, 1)), REPORT);
		let src = Recording{inner: &inner, log: RefCell::new(Vec::new())};
		let loaded = load(&src, date(2020, 4, 2)).unwrap();
		assert_eq!(loaded.effective_date, date(2020, 4, 1));
		assert_eq!(snapshot_requests(&src.log.borrow()), vec![date(2020, 4, 2), date(2020, 4, 1)]);
	}

	#[test]
	fn unparseable_report_also_falls_back() {
		let src = series_only()
			.with(Resource::DailyReport(date(2020, 4, 2)), "Confirmed\n12\n")
			.with(Resource::DailyReport(date(2020, 4, 1)), REPORT);
		let loaded = load(&src, date(2020, 4, 2)).unwrap();
		assert_eq!(loaded.effective_date, date(2020, 4, 1));
	}

	#[test]
	fn gives_up_after_exactly_one_fallback() {
		let inner = series_only();
		let src = Recording{inner: &inner, log: RefCell::new(Vec::new())};
		let err = load(&src, date(2020, 4, 2)).unwrap_err();
		assert!(err.is_fetch_failure());
		match err {
			Error::DataUnavailable{requested, fallback, causes} => {
				assert_eq!(requested, date(2020, 4, 2));
				assert_eq!(fallback, date(2020, 4, 1));
				assert_eq!(causes.len(), 2);
			},
			other => panic!("unexpected error: {}", other),
		}
		assert_eq!(snapshot_requests(&src.log.borrow()), vec![date(2020, 4, 2), date(2020, 4, 1)]);
	}

	#[test]
	fn missing_time_series_is_fatal_without_retry() {
		let src = StaticSource::new()
			.with(Resource::ConfirmedGlobal, SERIES)
			.with(Resource::DailyReport(date(2020, 4, 2)), REPORT);
		match load(&src, date(2020, 4, 2)) {
			Err(Error::Fetch(Resource::DeathsGlobal, FetchError::NotFound)) => (),
			other => panic!("unexpected result: {:?}", other.map(|l| l.effective_date)),
		}
	}
}
