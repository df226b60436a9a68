use log::warn;

use serde::Serialize;

use smartstring::alias::{String as SmartString};

use super::context::RegionCode;
use super::csse::RawSeries;
use super::timeseries::{Counters, DateLabel};


/// The region split off from the rest of the world in the trend series.
pub static PARTITION_REGION: &'static str = "China";


/// Per-date sums for the global trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldwideTotals {
	pub dates: Vec<DateLabel>,
	/// Confirmed cases in `PARTITION_REGION`.
	pub partition: Vec<i64>,
	pub rest_of_world: Vec<i64>,
	/// Worldwide deaths, laid onto the confirmed series' dates.
	pub deaths: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldwidePoint {
	#[serde(rename = "Date")]
	pub date: DateLabel,
	#[serde(rename = "China")]
	pub partition: i64,
	#[serde(rename = "Rest of World")]
	pub rest_of_world: i64,
	#[serde(rename = "Worldwide Deaths")]
	pub deaths: i64,
}

impl WorldwideTotals {
	/// One point per date; stops at the shortest of the four series.
	pub fn points(&self) -> Vec<WorldwidePoint> {
		self.dates.iter()
			.zip(self.partition.iter())
			.zip(self.rest_of_world.iter())
			.zip(self.deaths.iter())
			.map(|(((date, partition), rest_of_world), deaths)| WorldwidePoint{
				date: date.clone(),
				partition: *partition,
				rest_of_world: *rest_of_world,
				deaths: *deaths,
			})
			.collect()
	}

	/// Confirmed cases over both partitions.
	pub fn confirmed(&self) -> Vec<i64> {
		self.partition.iter().zip(self.rest_of_world.iter()).map(|(a, b)| a + b).collect()
	}
}


/// One region on one date. `region_code` is filled in by the geo join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongFormRecord {
	#[serde(rename = "ISO3")]
	pub region_code: Option<RegionCode>,
	#[serde(rename = "Country/Region")]
	pub region_name: SmartString,
	#[serde(rename = "Date")]
	pub date: DateLabel,
	#[serde(rename = "Confirmed Cases")]
	pub confirmed: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalLongForm {
	pub records: Vec<LongFormRecord>,
}

impl GlobalLongForm {
	/// Upper bound of the colour range of the global map.
	pub fn max_confirmed(&self) -> Option<i64> {
		self.records.iter().map(|r| r.confirmed).max()
	}

	/// Records usable on a map, i.e. those with a region code.
	pub fn coded(&self) -> impl Iterator<Item = &LongFormRecord> + '_ {
		self.records.iter().filter(|r| r.region_code.is_some())
	}
}


fn is_partition(country: &str) -> bool {
	country == PARTITION_REGION
}

/// Melts a per-country table into date-major long form, regions ordered by
/// name within each date. Rows without a country keep the empty name.
pub fn melt(by_country: &Counters<SmartString>) -> GlobalLongForm {
	let mut names: Vec<&SmartString> = by_country.keys().collect();
	names.sort();
	let regions: Vec<(&SmartString, &[i64])> = names.into_iter()
		.filter_map(|name| Some((name, by_country.get(name)?)))
		.collect();
	let mut records = Vec::with_capacity(regions.len() * by_country.len());
	for (i, date) in by_country.dates().iter().enumerate() {
		for (name, values) in regions.iter() {
			records.push(LongFormRecord{
				region_code: None,
				region_name: (*name).clone(),
				date: date.clone(),
				confirmed: values[i],
			});
		}
	}
	GlobalLongForm{records}
}

pub fn reshape(confirmed: RawSeries, deaths: RawSeries) -> (WorldwideTotals, GlobalLongForm) {
	let by_country = confirmed.by_country();
	let partition = by_country.rekeyed(|k| if is_partition(k) { Some(()) } else { None });
	let rest = by_country.rekeyed(|k| if is_partition(k) { None } else { Some(()) });

	let all_deaths = deaths.counters(|_| Some(()));
	let (all_deaths, missing) = all_deaths.aligned(by_country.dates());
	if !missing.is_empty() {
		warn!("deaths series lacks {} date(s) of the confirmed series, e.g. {}", missing.len(), missing[0]);
	}

	let totals = WorldwideTotals{
		dates: by_country.dates().to_vec(),
		partition: partition.totals(),
		rest_of_world: rest.totals(),
		deaths: all_deaths.totals(),
	};
	let long_form = melt(&by_country);
	(totals, long_form)
}


#[cfg(test)]
mod tests {
	use super::*;

	use crate::csse::load_wide_series;

	fn series(data: &str) -> RawSeries {
		load_wide_series(data.as_bytes()).unwrap()
	}

	static CONFIRMED: &'static str = "\
Province/State,Country/Region,Lat,Long,3/1/20,3/2/20
Hubei,China,30.9,112.2,60,70
Beijing,China,40.1,116.4,40,
,Italy,41.8,12.5,50,80
Ontario,Canada,51.2,-85.3,,3
British Columbia,Canada,53.7,-127.6,1,1
";

	static DEATHS: &'static str = "\
Province/State,Country/Region,Lat,Long,3/1/20,3/2/20
Hubei,China,30.9,112.2,5,6
,Italy,41.8,12.5,2,
";

	#[test]
	fn splits_partition_from_rest_of_world() {
		let (totals, _) = reshape(
			series("Province/State,Country/Region,Lat,Long,3/1/20\n,China,0,0,100\n,Italy,0,0,50\n"),
			series("Province/State,Country/Region,Lat,Long,3/1/20\n,China,0,0,3\n"),
		);
		assert_eq!(totals.partition, vec![100]);
		assert_eq!(totals.rest_of_world, vec![50]);
		assert_eq!(totals.deaths, vec![3]);
	}

	#[test]
	fn totals_cover_every_date() {
		let (totals, _) = reshape(series(CONFIRMED), series(DEATHS));
		assert_eq!(totals.dates.len(), 2);
		assert_eq!(totals.partition, vec![100, 70]);
		assert_eq!(totals.rest_of_world, vec![51, 84]);
		assert_eq!(totals.deaths, vec![7, 6]);
		assert_eq!(totals.confirmed(), vec![151, 154]);
	}

	#[test]
	fn long_form_sums_match_partitions() {
		let (totals, long) = reshape(series(CONFIRMED), series(DEATHS));
		let confirmed = totals.confirmed();
		for (i, date) in totals.dates.iter().enumerate() {
			let sum: i64 = long.records.iter()
				.filter(|r| &r.date == date)
				.map(|r| r.confirmed)
				.sum();
			assert_eq!(sum, confirmed[i]);
		}
	}

	#[test]
	fn long_form_is_date_major_and_name_sorted() {
		let (_, long) = reshape(series(CONFIRMED), series(DEATHS));
		let rows: Vec<(&str, &str, i64)> = long.records.iter()
			.map(|r| (r.date.as_str(), r.region_name.as_str(), r.confirmed))
			.collect();
		assert_eq!(rows, vec![
			("3/1/20", "Canada", 1),
			("3/1/20", "China", 100),
			("3/1/20", "Italy", 50),
			("3/2/20", "Canada", 4),
			("3/2/20", "China", 70),
			("3/2/20", "Italy", 80),
		]);
		assert!(long.records.iter().all(|r| r.region_code.is_none()));
		assert_eq!(long.max_confirmed(), Some(100));
	}

	#[test]
	fn blank_country_counts_into_rest_of_world() {
		let (totals, long) = reshape(
			series("Province/State,Country/Region,Lat,Long,3/1/20\n,China,0,0,100\n,Italy,0,0,50\nSomewhere,,0,0,25\n"),
			series("Province/State,Country/Region,Lat,Long,3/1/20\n,China,0,0,3\n"),
		);
		assert_eq!(totals.partition, vec![100]);
		assert_eq!(totals.rest_of_world, vec![75]);
		let sum: i64 = long.records.iter().map(|r| r.confirmed).sum();
		assert_eq!(sum, 175);
		let blank = long.records.iter().find(|r| r.region_name.is_empty()).unwrap();
		assert_eq!(blank.confirmed, 25);
		assert_eq!(blank.region_code, None);
	}

	#[test]
	fn points_stop_at_the_shortest_series() {
		let totals = WorldwideTotals{
			dates: vec!["3/1/20".into(), "3/2/20".into()],
			partition: vec![1, 2],
			rest_of_world: vec![3],
			deaths: vec![0, 0],
		};
		let points = totals.points();
		assert_eq!(points.len(), 1);
		assert_eq!(points[0].rest_of_world, 3);
	}

	#[test]
	fn deaths_with_fewer_dates_are_zero_filled() {
		let (totals, _) = reshape(
			series("Country/Region,3/1/20,3/2/20\nItaly,5,6\n"),
			series("Country/Region,3/1/20\nItaly,1\n"),
		);
		assert_eq!(totals.deaths, vec![1, 0]);
	}

	#[test]
	fn all_null_region_sums_to_zero() {
		let (totals, long) = reshape(
			series("Country/Region,3/1/20,3/2/20\nNauru,,\n"),
			series("Country/Region,3/1/20,3/2/20\nNauru,,\n"),
		);
		assert_eq!(totals.rest_of_world, vec![0, 0]);
		assert_eq!(long.records.len(), 2);
		assert!(long.records.iter().all(|r| r.confirmed == 0));
	}
}
