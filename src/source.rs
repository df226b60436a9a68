use std::collections::HashMap;
use std::fmt;
use std::io;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;

use chrono::NaiveDate;

use log::{debug, info};

use super::error::FetchError;
use super::ioutil::magic_open_or_gz;


pub static DEFAULT_BASE_URL: &'static str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data";

static DAILY_REPORT_DATE_FORMAT: &'static str = "%m-%d-%Y";


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
	ConfirmedGlobal,
	DeathsGlobal,
	DailyReport(NaiveDate),
}

impl Resource {
	/// Location relative to the root of the CSSE data tree.
	pub fn path(&self) -> String {
		match self {
			Self::ConfirmedGlobal => "csse_covid_19_time_series/time_series_covid19_confirmed_global.csv".into(),
			Self::DeathsGlobal => "csse_covid_19_time_series/time_series_covid19_deaths_global.csv".into(),
			Self::DailyReport(date) => format!("csse_covid_19_daily_reports/{}.csv", date.format(DAILY_REPORT_DATE_FORMAT)),
		}
	}
}

impl fmt::Display for Resource {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.path())
	}
}


pub trait DataSource {
	fn fetch(&self, resource: &Resource) -> Result<Bytes, FetchError>;
}


pub struct HttpSource {
	client: reqwest::blocking::Client,
	base_url: String,
}

impl HttpSource {
	pub fn new(base_url: String, timeout: Option<Duration>) -> Result<Self, FetchError> {
		let client = reqwest::blocking::Client::builder()
			.timeout(timeout)
			.build()?;
		Ok(Self{
			client,
			base_url: base_url.trim_end_matches('/').into(),
		})
	}

	pub fn url(&self, resource: &Resource) -> String {
		format!("{}/{}", self.base_url, resource.path())
	}
}

impl DataSource for HttpSource {
	fn fetch(&self, resource: &Resource) -> Result<Bytes, FetchError> {
		let url = self.url(resource);
		info!("fetching {}", url);
		let resp = self.client.get(&url).send()?;
		match resp.status() {
			s if s.is_success() => (),
			reqwest::StatusCode::NOT_FOUND => return Err(FetchError::NotFound),
			s => return Err(FetchError::Status(s)),
		}
		let body = resp.bytes()?;
		debug!("received {} bytes from {}", body.len(), url);
		Ok(body)
	}
}


/// Reads resources from a local checkout or mirror of the CSSE data tree.
pub struct DirSource {
	root: PathBuf,
}

impl DirSource {
	pub fn new<P: Into<PathBuf>>(root: P) -> Self {
		Self{root: root.into()}
	}
}

impl DataSource for DirSource {
	fn fetch(&self, resource: &Resource) -> Result<Bytes, FetchError> {
		let path = self.root.join(resource.path());
		info!("reading {}", path.display());
		let mut r = match magic_open_or_gz(&path) {
			Ok(r) => r,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(FetchError::NotFound),
			Err(other) => return Err(other.into()),
		};
		let mut buf = Vec::new();
		r.read_to_end(&mut buf)?;
		Ok(buf.into())
	}
}


/// In-memory source; resources that were never inserted are not found.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
	resources: HashMap<Resource, Bytes>,
}

impl StaticSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert<B: Into<Bytes>>(&mut self, resource: Resource, body: B) {
		self.resources.insert(resource, body.into());
	}

	pub fn with<B: Into<Bytes>>(mut self, resource: Resource, body: B) -> Self {
		self.insert(resource, body);
		self
	}
}

impl DataSource for StaticSource {
	fn fetch(&self, resource: &Resource) -> Result<Bytes, FetchError> {
		match self.resources.get(resource) {
			Some(body) => Ok(body.clone()),
			None => Err(FetchError::NotFound),
		}
	}
}
