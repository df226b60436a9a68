use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use smartstring::alias::{String as SmartString};

use enum_map::{Enum, EnumMap};

use super::error::ParseError;


/// `Country_Region` value of rows belonging to the United States.
pub static US_COUNTRY: &'static str = "US";


#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionCode {
	Iso3(SmartString),
	StateAbbrev(SmartString),
}

impl RegionCode {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Iso3(s) => s.as_str(),
			Self::StateAbbrev(s) => s.as_str(),
		}
	}
}

impl fmt::Display for RegionCode {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for RegionCode {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where S: Serializer
	{
		serializer.serialize_str(self.as_str())
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum Metric {
	Confirmed,
	Deaths,
	Recovered,
}

pub type Counts = EnumMap<Metric, i64>;


/// Metric a leading-regions table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankBy {
	Confirmed,
	Deaths,
}

impl RankBy {
	pub fn metric(&self) -> Metric {
		match self {
			Self::Confirmed => Metric::Confirmed,
			Self::Deaths => Metric::Deaths,
		}
	}
}

impl fmt::Display for RankBy {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Confirmed => f.write_str("confirmed"),
			Self::Deaths => f.write_str("deaths"),
		}
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
	Global,
	Us,
}

impl Scope {
	/// The grouping label of `row` in this scope, or `None` if the row is
	/// outside the scope or carries no label.
	pub fn label<'r>(&self, row: &'r SnapshotRow) -> Option<&'r SmartString> {
		match self {
			Self::Global => Some(&row.country_region),
			Self::Us if row.country_region.as_str() == US_COUNTRY => row.province_state.as_ref(),
			Self::Us => None,
		}
	}
}

impl fmt::Display for Scope {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Global => f.write_str("global"),
			Self::Us => f.write_str("us"),
		}
	}
}


/// Parses a count cell. Empty cells are zero and integral floats such as
/// `12.0` are accepted.
pub fn parse_count(column: &str, raw: &str) -> Result<i64, ParseError> {
	let s = raw.trim();
	if s.is_empty() {
		return Ok(0)
	}
	if let Ok(v) = s.parse::<i64>() {
		return Ok(v)
	}
	match s.parse::<f64>() {
		Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(v as i64),
		_ => Err(ParseError::InvalidCount{
			column: column.into(),
			value: s.into(),
		}),
	}
}

fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
	where D: Deserializer<'de>
{
	let s: Option<String> = Option::deserialize(deserializer)?;
	match s {
		Some(s) => parse_count("count", &s).map_err(de::Error::custom),
		None => Ok(0),
	}
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<SmartString>, D::Error>
	where D: Deserializer<'de>
{
	let s: Option<String> = Option::deserialize(deserializer)?;
	Ok(s.and_then(|s| {
		let s = s.trim();
		if s.is_empty() {
			None
		} else {
			Some(s.into())
		}
	}))
}


/// One row of a daily report.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRow {
	// string-typed to keep leading zeros
	#[serde(rename = "FIPS", default, deserialize_with = "non_empty")]
	pub fips: Option<SmartString>,
	#[serde(rename = "Admin2", default, deserialize_with = "non_empty")]
	pub admin2: Option<SmartString>,
	#[serde(rename = "Province_State", alias = "Province/State", default, deserialize_with = "non_empty")]
	pub province_state: Option<SmartString>,
	#[serde(rename = "Country_Region", alias = "Country/Region")]
	pub country_region: SmartString,
	#[serde(rename = "Confirmed", default, deserialize_with = "lenient_count")]
	pub confirmed: i64,
	#[serde(rename = "Deaths", default, deserialize_with = "lenient_count")]
	pub deaths: i64,
	#[serde(rename = "Recovered", default, deserialize_with = "lenient_count")]
	pub recovered: i64,
}

impl SnapshotRow {
	pub fn counts(&self) -> Counts {
		let mut result = Counts::default();
		result[Metric::Confirmed] = self.confirmed;
		result[Metric::Deaths] = self.deaths;
		result[Metric::Recovered] = self.recovered;
		result
	}
}
