use std::fmt;
use std::io;

use chrono::NaiveDate;

use super::resolver::EMBEDDED_COUNTRIES_NAME;
use super::source::Resource;


#[derive(Debug)]
pub enum FetchError {
	Request(reqwest::Error),
	Status(reqwest::StatusCode),
	Io(io::Error),
	NotFound,
}

impl fmt::Display for FetchError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Request(e) => fmt::Display::fmt(e, f),
			Self::Status(s) => write!(f, "unexpected status {}", s),
			Self::Io(e) => fmt::Display::fmt(e, f),
			Self::NotFound => f.write_str("resource not found"),
		}
	}
}

impl From<reqwest::Error> for FetchError {
	fn from(other: reqwest::Error) -> Self {
		Self::Request(other)
	}
}

impl From<io::Error> for FetchError {
	fn from(other: io::Error) -> Self {
		Self::Io(other)
	}
}

impl std::error::Error for FetchError {}


#[derive(Debug)]
pub enum ParseError {
	Csv(csv::Error),
	MissingColumn(&'static str),
	InvalidCount{column: String, value: String},
}

impl fmt::Display for ParseError {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Csv(e) => fmt::Display::fmt(e, f),
			Self::MissingColumn(name) => write!(f, "missing column {:?}", name),
			Self::InvalidCount{column, value} => write!(f, "invalid count {:?} in column {:?}", value, column),
		}
	}
}

impl From<csv::Error> for ParseError {
	fn from(other: csv::Error) -> Self {
		Self::Csv(other)
	}
}

impl std::error::Error for ParseError {}


#[derive(Debug)]
pub enum Error {
	Fetch(Resource, FetchError),
	Parse(Resource, ParseError),
	DataUnavailable{
		requested: NaiveDate,
		fallback: NaiveDate,
		causes: Vec<Error>,
	},
	/// The compiled-in country table could not be read.
	Reference(ParseError),
	Config(String),
}

impl Error {
	/// True for everything that ends a run because upstream data could not
	/// be retrieved, including an exhausted snapshot fallback.
	pub fn is_fetch_failure(&self) -> bool {
		match self {
			Self::Fetch(..) | Self::DataUnavailable{..} => true,
			_ => false,
		}
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Fetch(r, e) => write!(f, "failed to fetch {}: {}", r, e),
			Self::Parse(r, e) => write!(f, "failed to parse {}: {}", r, e),
			Self::DataUnavailable{requested, fallback, causes} => {
				write!(f, "no daily report for {} or {}", requested, fallback)?;
				for cause in causes.iter() {
					write!(f, "; {}", cause)?;
				}
				Ok(())
			},
			Self::Reference(e) => write!(f, "failed to parse embedded {}: {}", EMBEDDED_COUNTRIES_NAME, e),
			Self::Config(msg) => write!(f, "invalid configuration: {}", msg),
		}
	}
}

impl From<ParseError> for Error {
	fn from(other: ParseError) -> Self {
		Self::Reference(other)
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Fetch(_, e) => Some(e),
			Self::Parse(_, e) => Some(e),
			Self::Reference(e) => Some(e),
			_ => None,
		}
	}
}
