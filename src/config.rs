use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use log::debug;

use super::error::Error;
use super::rank::DEFAULT_LEADING;
use super::source::{DataSource, DirSource, HttpSource, DEFAULT_BASE_URL};


static ENV_DATA_DIR: &'static str = "CSSE_DATA_DIR";
static ENV_BASE_URL: &'static str = "CSSE_BASE_URL";
static ENV_TIMEOUT: &'static str = "CSSE_TIMEOUT_SECS";
static ENV_LEADING: &'static str = "CSSE_LEADING";
static ENV_DATE: &'static str = "CSSE_DATE";

static DEFAULT_TIMEOUT_SECS: u64 = 30;


#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
	Http{base_url: String},
	Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	pub source: SourceConfig,
	/// `None` disables the request deadline.
	pub timeout: Option<Duration>,
	pub leading: usize,
	pub date: Option<NaiveDate>,
}

impl Default for Config {
	fn default() -> Self {
		Self{
			source: SourceConfig::Http{base_url: DEFAULT_BASE_URL.into()},
			timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
			leading: DEFAULT_LEADING,
			date: None,
		}
	}
}

fn invalid(var: &str, value: &str, why: &str) -> Error {
	Error::Config(format!("{}={:?}: {}", var, value, why))
}

impl Config {
	/// Reads the configuration through `lookup`, which returns the value of
	/// a variable or `None` if it is unset. Empty values count as unset.
	pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, Error> {
		let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
		let mut result = Self::default();

		if let Some(dir) = get(ENV_DATA_DIR) {
			result.source = SourceConfig::Directory(dir.into());
		} else if let Some(url) = get(ENV_BASE_URL) {
			result.source = SourceConfig::Http{base_url: url};
		}

		if let Some(v) = get(ENV_TIMEOUT) {
			let secs: u64 = v.trim().parse().map_err(|_| invalid(ENV_TIMEOUT, &v, "not a number of seconds"))?;
			result.timeout = if secs == 0 {
				None
			} else {
				Some(Duration::from_secs(secs))
			};
		}

		if let Some(v) = get(ENV_LEADING) {
			result.leading = match v.trim().parse::<usize>() {
				Ok(n) if n > 0 => n,
				_ => return Err(invalid(ENV_LEADING, &v, "must be a positive integer")),
			};
		}

		if let Some(v) = get(ENV_DATE) {
			let date = NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| invalid(ENV_DATE, &v, "expected YYYY-MM-DD"))?;
			result.date = Some(date);
		}

		debug!("configuration: {:?}", result);
		Ok(result)
	}

	pub fn from_env() -> Result<Self, Error> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	pub fn build_source(&self) -> Result<Box<dyn DataSource>, Error> {
		match &self.source {
			SourceConfig::Http{base_url} => {
				let src = HttpSource::new(base_url.clone(), self.timeout)
					.map_err(|e| Error::Config(format!("failed to set up HTTP client: {}", e)))?;
				Ok(Box::new(src))
			},
			SourceConfig::Directory(path) => Ok(Box::new(DirSource::new(path.clone()))),
		}
	}

	pub fn date_or_today(&self) -> NaiveDate {
		self.date.unwrap_or_else(super::naive_today)
	}
}
