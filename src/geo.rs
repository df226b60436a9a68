use std::collections::BTreeSet;

use log::debug;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use super::context::{Metric, RegionCode, Scope, US_COUNTRY};
use super::csse::Snapshot;
use super::rank::group_by_region;
use super::reshape::GlobalLongForm;
use super::resolver::{CountryLookup, RegionResolver, StateTable};


/// Attaches ISO3 codes to the long-form records. Records whose name does not
/// resolve are kept without a code; their names are returned sorted and
/// deduplicated. Records without any name stay uncoded and are not reported.
pub fn join_global_codes<L: CountryLookup>(mut long_form: GlobalLongForm, resolver: &RegionResolver<L>) -> (GlobalLongForm, Vec<SmartString>) {
	let mut unresolved = BTreeSet::new();
	for record in long_form.records.iter_mut() {
		if record.region_name.is_empty() {
			record.region_code = None;
			continue
		}
		record.region_code = resolver.resolve(&record.region_name);
		if record.region_code.is_none() {
			unresolved.insert(record.region_name.clone());
		}
	}
	if !unresolved.is_empty() {
		debug!("{} region name(s) without ISO3 code: {:?}", unresolved.len(), unresolved);
	}
	(long_form, unresolved.into_iter().collect())
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsStateRow {
	#[serde(rename = "Code")]
	pub code: RegionCode,
	#[serde(rename = "Province_State")]
	pub state: SmartString,
	#[serde(rename = "Confirmed")]
	pub confirmed: i64,
	#[serde(rename = "Deaths")]
	pub deaths: i64,
	#[serde(rename = "Recovered")]
	pub recovered: i64,
}

/// Per-state sums of the US rows, ordered by state name. States without a
/// known abbreviation (cruise ships, "Recovered" pseudo-rows) are left out.
pub fn us_states(snapshot: &Snapshot, states: &StateTable) -> Vec<UsStateRow> {
	let mut result = Vec::new();
	let mut excluded = 0usize;
	for (state, counts) in group_by_region(snapshot, Scope::Us) {
		let code = match states.abbreviation(&state) {
			Some(c) => c,
			None => {
				debug!("no state abbreviation for {:?}, leaving it off the map", state);
				excluded += 1;
				continue
			},
		};
		result.push(UsStateRow{
			code,
			state,
			confirmed: counts[Metric::Confirmed],
			deaths: counts[Metric::Deaths],
			recovered: counts[Metric::Recovered],
		});
	}
	if excluded > 0 {
		debug!("excluded {} US region(s) from the state map", excluded);
	}
	result
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsCountyRow {
	#[serde(rename = "FIPS")]
	pub fips: SmartString,
	#[serde(rename = "Admin2")]
	pub county: Option<SmartString>,
	#[serde(rename = "Province_State")]
	pub state: Option<SmartString>,
	#[serde(rename = "Confirmed")]
	pub confirmed: i64,
	#[serde(rename = "Deaths")]
	pub deaths: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsCountyTable {
	pub rows: Vec<UsCountyRow>,
	/// Upper bound of the colour range of the county map.
	pub max_confirmed: Option<i64>,
}

/// US rows of the snapshot keyed by their FIPS code, in snapshot order.
pub fn us_counties(snapshot: &Snapshot) -> UsCountyTable {
	let mut rows = Vec::new();
	let mut max_confirmed = None;
	let mut excluded = 0usize;
	for row in snapshot.rows.iter() {
		if row.country_region.as_str() != US_COUNTRY {
			continue
		}
		// the colour range covers every US row, mappable or not
		max_confirmed = Some(max_confirmed.map_or(row.confirmed, |m: i64| m.max(row.confirmed)));
		let fips = match row.fips.as_ref() {
			Some(f) => f.clone(),
			None => {
				excluded += 1;
				continue
			},
		};
		rows.push(UsCountyRow{
			fips,
			county: row.admin2.clone(),
			state: row.province_state.clone(),
			confirmed: row.confirmed,
			deaths: row.deaths,
		});
	}
	if excluded > 0 {
		debug!("excluded {} US row(s) without FIPS from the county map", excluded);
	}
	UsCountyTable{rows, max_confirmed}
}
