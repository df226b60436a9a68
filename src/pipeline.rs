use chrono::NaiveDate;

use log::{info, warn};

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use super::csse::Snapshot;
use super::error::Error;
use super::geo::{join_global_codes, us_counties, us_states, UsCountyTable, UsStateRow};
use super::loader::load;
use super::rank::LeadingTables;
use super::reshape::{reshape, GlobalLongForm, WorldwideTotals};
use super::resolver::{RegionResolver, StateTable};
use super::source::DataSource;


/// Whole-snapshot sums shown as the dashboard headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SnapshotTotals {
	#[serde(rename = "Total Cases")]
	pub confirmed: i64,
	#[serde(rename = "Total Deaths")]
	pub deaths: i64,
}

impl SnapshotTotals {
	pub fn of(snapshot: &Snapshot) -> Self {
		let mut result = Self::default();
		for row in snapshot.rows.iter() {
			result.confirmed += row.confirmed;
			result.deaths += row.deaths;
		}
		result
	}
}


/// Every table the rendering layer consumes, built from one load.
#[derive(Debug, Clone)]
pub struct Dashboard {
	/// Date of the daily report the snapshot tables are built from.
	pub effective_date: NaiveDate,
	pub worldwide: WorldwideTotals,
	pub global: GlobalLongForm,
	pub leading: LeadingTables,
	pub us_states: Vec<UsStateRow>,
	pub us_counties: UsCountyTable,
	pub totals: SnapshotTotals,
	/// Region names of the global series without an ISO3 code.
	pub unresolved: Vec<SmartString>,
}

pub fn run<S: DataSource + ?Sized>(source: &S, date: NaiveDate, leading_n: usize) -> Result<Dashboard, Error> {
	let resolver = RegionResolver::with_defaults()?;
	let states = StateTable::new();

	let data = load(source, date)?;
	let (worldwide, long_form) = reshape(data.confirmed, data.deaths);
	let (global, unresolved) = join_global_codes(long_form, &resolver);
	for name in unresolved.iter() {
		warn!("no ISO3 code for {:?}, it will be missing from the map", name);
	}

	let leading = LeadingTables::build(&data.snapshot, leading_n);
	let dashboard = Dashboard{
		effective_date: data.effective_date,
		worldwide,
		global,
		leading,
		us_states: us_states(&data.snapshot, &states),
		us_counties: us_counties(&data.snapshot),
		totals: SnapshotTotals::of(&data.snapshot),
		unresolved,
	};
	info!(
		"dashboard for {}: {} cases, {} deaths, {} states, {} counties",
		dashboard.effective_date,
		dashboard.totals.confirmed,
		dashboard.totals.deaths,
		dashboard.us_states.len(),
		dashboard.us_counties.rows.len(),
	);
	Ok(dashboard)
}
