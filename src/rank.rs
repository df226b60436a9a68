use std::collections::BTreeMap;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use super::context::{Counts, Metric, RankBy, Scope};
use super::csse::Snapshot;


/// Size of the leading-regions tables shown on the dashboard.
pub static DEFAULT_LEADING: usize = 10;


#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
	pub region: SmartString,
	pub counts: Counts,
	/// Confirmed - Recovered - Deaths; only set in confirmed-ranked tables.
	pub active: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord<'r> {
	#[serde(rename = "Region")]
	pub region: &'r str,
	#[serde(rename = "Confirmed")]
	pub confirmed: i64,
	#[serde(rename = "Deaths")]
	pub deaths: i64,
	#[serde(rename = "Recovered")]
	pub recovered: i64,
	#[serde(rename = "Active")]
	pub active: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedTable {
	pub scope: Scope,
	pub by: RankBy,
	pub rows: Vec<RankedRow>,
}

impl RankedTable {
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn regions(&self) -> Vec<&str> {
		self.rows.iter().map(|r| r.region.as_str()).collect()
	}

	pub fn records(&self) -> Vec<RankedRecord<'_>> {
		self.rows.iter().map(|r| RankedRecord{
			region: r.region.as_str(),
			confirmed: r.counts[Metric::Confirmed],
			deaths: r.counts[Metric::Deaths],
			recovered: r.counts[Metric::Recovered],
			active: r.active,
		}).collect()
	}
}


/// Sums every metric per region label of `scope`. Groups come out ordered
/// by label; rows without a label in this scope are left out.
pub fn group_by_region(snapshot: &Snapshot, scope: Scope) -> BTreeMap<SmartString, Counts> {
	let mut groups: BTreeMap<SmartString, Counts> = BTreeMap::new();
	for row in snapshot.rows.iter() {
		let label = match scope.label(row) {
			Some(l) => l,
			None => continue,
		};
		let acc = groups.entry(label.clone()).or_insert_with(Counts::default);
		for (metric, v) in row.counts().iter() {
			acc[metric] += *v;
		}
	}
	groups
}

/// The `n` regions of `scope` with the highest `by` metric, descending.
/// Ties keep label order. An empty scope gives an empty table.
pub fn rank(snapshot: &Snapshot, scope: Scope, by: RankBy, n: usize) -> RankedTable {
	let metric = by.metric();
	let mut rows: Vec<RankedRow> = group_by_region(snapshot, scope)
		.into_iter()
		.map(|(region, counts)| RankedRow{region, counts, active: None})
		.collect();
	// stable, so equal values stay in label order
	rows.sort_by(|a, b| b.counts[metric].cmp(&a.counts[metric]));
	rows.truncate(n);
	if by == RankBy::Confirmed {
		for row in rows.iter_mut() {
			row.active = Some(row.counts[Metric::Confirmed] - row.counts[Metric::Recovered] - row.counts[Metric::Deaths]);
		}
	}
	RankedTable{scope, by, rows}
}


#[derive(Debug, Clone, PartialEq)]
pub struct LeadingTables {
	pub global_confirmed: RankedTable,
	pub global_deaths: RankedTable,
	pub us_confirmed: RankedTable,
	pub us_deaths: RankedTable,
}

impl LeadingTables {
	pub fn build(snapshot: &Snapshot, n: usize) -> Self {
		Self{
			global_confirmed: rank(snapshot, Scope::Global, RankBy::Confirmed, n),
			global_deaths: rank(snapshot, Scope::Global, RankBy::Deaths, n),
			us_confirmed: rank(snapshot, Scope::Us, RankBy::Confirmed, n),
			us_deaths: rank(snapshot, Scope::Us, RankBy::Deaths, n),
		}
	}

	pub fn all(&self) -> [&RankedTable; 4] {
		[&self.global_confirmed, &self.global_deaths, &self.us_confirmed, &self.us_deaths]
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	use chrono::NaiveDate;

	use crate::context::SnapshotRow;

	fn row(country: &str, state: Option<&str>, confirmed: i64, deaths: i64, recovered: i64) -> SnapshotRow {
		SnapshotRow{
			fips: None,
			admin2: None,
			province_state: state.map(Into::into),
			country_region: country.into(),
			confirmed,
			deaths,
			recovered,
		}
	}

	fn snapshot(rows: Vec<SnapshotRow>) -> Snapshot {
		Snapshot{
			date: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
			rows,
		}
	}

	#[test]
	fn ranks_us_states_with_active() {
		let s = snapshot(vec![
			row("US", Some("California"), 500, 10, 100),
			row("US", Some("New York"), 800, 20, 200),
		]);
		let t = rank(&s, Scope::Us, RankBy::Confirmed, 2);
		assert_eq!(t.regions(), vec!["New York", "California"]);
		let active: Vec<Option<i64>> = t.rows.iter().map(|r| r.active).collect();
		assert_eq!(active, vec![Some(580), Some(390)]);
	}

	#[test]
	fn sums_counties_into_states() {
		let s = snapshot(vec![
			row("US", Some("Texas"), 10, 1, 0),
			row("US", Some("Ohio"), 15, 0, 0),
			row("US", Some("Texas"), 7, 2, 0),
			row("US", None, 1000, 1000, 0),
			row("Canada", Some("Ontario"), 999, 999, 0),
		]);
		let t = rank(&s, Scope::Us, RankBy::Deaths, 10);
		assert_eq!(t.regions(), vec!["Texas", "Ohio"]);
		assert_eq!(t.rows[0].counts[Metric::Confirmed], 17);
		assert_eq!(t.rows[0].counts[Metric::Deaths], 3);
		assert!(t.rows.iter().all(|r| r.active.is_none()));
	}

	#[test]
	fn global_scope_groups_by_country_and_truncates() {
		let mut rows = Vec::new();
		for i in 0..15 {
			rows.push(row(&format!("Country {:02}", i), None, i * 10, i, 0));
		}
		rows.push(row("Country 14", Some("Overseas"), 5, 0, 0));
		let t = rank(&snapshot(rows), Scope::Global, RankBy::Confirmed, DEFAULT_LEADING);
		assert_eq!(t.len(), 10);
		assert_eq!(t.rows[0].region.as_str(), "Country 14");
		assert_eq!(t.rows[0].counts[Metric::Confirmed], 145);
		for pair in t.rows.windows(2) {
			assert!(pair[0].counts[Metric::Confirmed] >= pair[1].counts[Metric::Confirmed]);
		}
		for r in t.rows.iter() {
			assert_eq!(r.active, Some(r.counts[Metric::Confirmed] - r.counts[Metric::Recovered] - r.counts[Metric::Deaths]));
		}
	}

	#[test]
	fn ties_keep_label_order() {
		let s = snapshot(vec![
			row("Zambia", None, 5, 0, 0),
			row("Austria", None, 5, 0, 0),
			row("Malta", None, 9, 0, 0),
		]);
		let t = rank(&s, Scope::Global, RankBy::Confirmed, 3);
		assert_eq!(t.regions(), vec!["Malta", "Austria", "Zambia"]);
	}

	#[test]
	fn empty_scope_gives_empty_table() {
		let s = snapshot(vec![row("Italy", None, 5, 0, 0)]);
		assert!(rank(&s, Scope::Us, RankBy::Confirmed, 10).is_empty());
		assert!(rank(&snapshot(Vec::new()), Scope::Global, RankBy::Deaths, 10).is_empty());
	}

	#[test]
	fn leading_tables_cover_both_scopes_and_metrics() {
		let s = snapshot(vec![
			row("US", Some("Utah"), 3, 1, 0),
			row("Italy", None, 9, 4, 1),
		]);
		let t = LeadingTables::build(&s, 10);
		assert_eq!(t.global_confirmed.regions(), vec!["Italy", "US"]);
		assert_eq!(t.us_deaths.regions(), vec!["Utah"]);
		assert_eq!(t.global_confirmed.records()[0].active, Some(4));
		assert_eq!(t.global_deaths.records()[0].active, None);
	}
}
