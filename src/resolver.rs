use std::collections::HashMap;
use std::io;

use serde::Deserialize;

use smartstring::alias::{String as SmartString};

use super::context::RegionCode;
use super::error::ParseError;


static EMBEDDED_COUNTRIES: &'static str = include_str!("../data/countries.csv");

/// Name of the compiled-in country table, for error reporting.
pub static EMBEDDED_COUNTRIES_NAME: &'static str = "countries.csv";


/// Names the general lookup cannot map on its own: disputed territories,
/// historical variants and the spellings used by the CSSE tables.
static DEFAULT_OVERRIDES: &'static [(&'static str, &'static str)] = &[
	("West Bank and Gaza", "PSE"),
	("Taiwan*", "TWN"),
	("Timor-Leste", "TLS"),
	("Holy See", "VAT"),
	("Republic of the Congo", "COG"),
	("Congo (Brazzaville)", "COG"),
	("Congo (Kinshasa)", "COD"),
	("US", "USA"),
	("Korea, South", "KOR"),
	("Korea, North", "PRK"),
	("Burma", "MMR"),
	("Cote d'Ivoire", "CIV"),
	("Bahamas, The", "BHS"),
	("Gambia, The", "GMB"),
	("Czech Republic", "CZE"),
	("North Macedonia", "MKD"),
	("Micronesia", "FSM"),
	("Mainland China", "CHN"),
];

static US_STATES: &'static [(&'static str, &'static str)] = &[
	("Alabama", "AL"), ("Alaska", "AK"), ("Arizona", "AZ"), ("Arkansas", "AR"),
	("California", "CA"), ("Colorado", "CO"), ("Connecticut", "CT"), ("Delaware", "DE"),
	("District of Columbia", "DC"), ("Florida", "FL"), ("Georgia", "GA"), ("Hawaii", "HI"),
	("Idaho", "ID"), ("Illinois", "IL"), ("Indiana", "IN"), ("Iowa", "IA"),
	("Kansas", "KS"), ("Kentucky", "KY"), ("Louisiana", "LA"), ("Maine", "ME"),
	("Maryland", "MD"), ("Massachusetts", "MA"), ("Michigan", "MI"), ("Minnesota", "MN"),
	("Mississippi", "MS"), ("Missouri", "MO"), ("Montana", "MT"), ("Nebraska", "NE"),
	("Nevada", "NV"), ("New Hampshire", "NH"), ("New Jersey", "NJ"), ("New Mexico", "NM"),
	("New York", "NY"), ("North Carolina", "NC"), ("North Dakota", "ND"),
	("Northern Mariana Islands", "MP"), ("Ohio", "OH"), ("Oklahoma", "OK"), ("Oregon", "OR"),
	("Palau", "PW"), ("Pennsylvania", "PA"), ("Puerto Rico", "PR"), ("Rhode Island", "RI"),
	("South Carolina", "SC"), ("South Dakota", "SD"), ("Tennessee", "TN"), ("Texas", "TX"),
	("Utah", "UT"), ("Vermont", "VT"), ("Virgin Islands", "VI"), ("Virginia", "VA"),
	("Washington", "WA"), ("West Virginia", "WV"), ("Wisconsin", "WI"), ("Wyoming", "WY"),
];


/// General name -> ISO3 lookup consulted after the override table.
pub trait CountryLookup {
	fn iso3(&self, name: &str) -> Option<SmartString>;
}

impl<T: CountryLookup + ?Sized> CountryLookup for &T {
	fn iso3(&self, name: &str) -> Option<SmartString> {
		(**self).iso3(name)
	}
}


#[derive(Debug, Clone, Deserialize)]
struct RawCountryRow {
	name: SmartString,
	iso3: SmartString,
}

/// Exact-match country name table.
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
	by_name: HashMap<SmartString, SmartString>,
}

impl CountryTable {
	pub fn load<R: io::Read>(r: R) -> Result<Self, ParseError> {
		let mut by_name = HashMap::new();
		let mut r = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(r);
		for row in r.deserialize() {
			let rec: RawCountryRow = row?;
			by_name.insert(rec.name, rec.iso3);
		}
		Ok(Self{by_name})
	}

	/// The table compiled into the crate (geonames country names).
	pub fn embedded() -> Result<Self, ParseError> {
		Self::load(EMBEDDED_COUNTRIES.as_bytes())
	}

	pub fn len(&self) -> usize {
		self.by_name.len()
	}
}

impl CountryLookup for CountryTable {
	fn iso3(&self, name: &str) -> Option<SmartString> {
		self.by_name.get(name).cloned()
	}
}


pub fn default_overrides() -> HashMap<SmartString, SmartString> {
	DEFAULT_OVERRIDES.iter().map(|(name, code)| ((*name).into(), (*code).into())).collect()
}


/// Two-tier resolver: the override table wins, the lookup is consulted for
/// everything else.
#[derive(Debug, Clone)]
pub struct RegionResolver<L: CountryLookup = CountryTable> {
	overrides: HashMap<SmartString, SmartString>,
	lookup: L,
}

impl RegionResolver<CountryTable> {
	/// Resolver over the default overrides and the embedded country table.
	pub fn with_defaults() -> Result<Self, ParseError> {
		Ok(Self::new(default_overrides(), CountryTable::embedded()?))
	}
}

impl<L: CountryLookup> RegionResolver<L> {
	pub fn new(overrides: HashMap<SmartString, SmartString>, lookup: L) -> Self {
		Self{overrides, lookup}
	}

	pub fn resolve(&self, name: &str) -> Option<RegionCode> {
		match self.overrides.get(name) {
			Some(code) => Some(RegionCode::Iso3(code.clone())),
			None => self.lookup.iso3(name).map(RegionCode::Iso3),
		}
	}
}


/// Full US state and territory names -> two-letter postal abbreviation.
#[derive(Debug, Clone)]
pub struct StateTable {
	by_name: HashMap<&'static str, &'static str>,
}

impl StateTable {
	pub fn new() -> Self {
		Self{
			by_name: US_STATES.iter().copied().collect(),
		}
	}

	/// Maps a state name to its abbreviation. A label which already is one
	/// of the known abbreviations maps to itself; anything else fails.
	pub fn abbreviation(&self, name: &str) -> Option<RegionCode> {
		if let Some(code) = self.by_name.get(name) {
			return Some(RegionCode::StateAbbrev((*code).into()))
		}
		if self.by_name.values().any(|code| *code == name) {
			return Some(RegionCode::StateAbbrev(name.into()))
		}
		None
	}
}

impl Default for StateTable {
	fn default() -> Self {
		Self::new()
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	struct FixedLookup(&'static str, &'static str);

	impl CountryLookup for FixedLookup {
		fn iso3(&self, name: &str) -> Option<SmartString> {
			if name == self.0 {
				Some(self.1.into())
			} else {
				None
			}
		}
	}

	fn iso3(s: &str) -> Option<RegionCode> {
		Some(RegionCode::Iso3(s.into()))
	}

	#[test]
	fn embedded_table_loads() {
		let table = CountryTable::embedded().unwrap();
		assert!(table.len() > 200);
		assert_eq!(table.iso3("Germany").as_deref(), Some("DEU"));
		assert_eq!(table.iso3("Bonaire, Saint Eustatius and Saba").as_deref(), Some("BES"));
		assert_eq!(table.iso3("germany"), None);
	}

	#[test]
	fn overrides_take_precedence() {
		let resolver = RegionResolver::new(default_overrides(), FixedLookup("Taiwan*", "XXX"));
		assert_eq!(resolver.resolve("Taiwan*"), iso3("TWN"));
		assert_eq!(resolver.resolve("Congo (Kinshasa)"), iso3("COD"));
	}

	#[test]
	fn falls_back_to_lookup_then_nothing() {
		let resolver = RegionResolver::with_defaults().unwrap();
		assert_eq!(resolver.resolve("Italy"), iso3("ITA"));
		assert_eq!(resolver.resolve("US"), iso3("USA"));
		assert_eq!(resolver.resolve("Diamond Princess"), None);
		assert_eq!(resolver.resolve(""), None);
	}

	#[test]
	fn resolve_is_deterministic() {
		let resolver = RegionResolver::with_defaults().unwrap();
		for name in &["Taiwan*", "Korea, South", "France", "MS Zaandam"] {
			assert_eq!(resolver.resolve(name), resolver.resolve(name));
		}
	}

	#[test]
	fn empty_override_table_defers_to_lookup() {
		let resolver = RegionResolver::new(HashMap::new(), FixedLookup("Taiwan*", "XXX"));
		assert_eq!(resolver.resolve("Taiwan*"), iso3("XXX"));
	}

	#[test]
	fn state_abbreviations() {
		let states = StateTable::new();
		assert_eq!(states.abbreviation("New York"), Some(RegionCode::StateAbbrev("NY".into())));
		assert_eq!(states.abbreviation("Virgin Islands"), Some(RegionCode::StateAbbrev("VI".into())));
		assert_eq!(states.abbreviation("DC"), Some(RegionCode::StateAbbrev("DC".into())));
		assert_eq!(states.abbreviation("Grand Princess"), None);
		assert_eq!(states.abbreviation("Recovered"), None);
		// two characters, but not a state
		assert_eq!(states.abbreviation("XX"), None);
	}
}
