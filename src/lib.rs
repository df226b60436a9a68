use chrono::{Local, NaiveDate};

mod ioutil;
mod context;
mod error;
mod source;
mod timeseries;
mod csse;
mod resolver;
mod loader;
mod reshape;
mod rank;
mod geo;
mod config;
mod pipeline;
mod export;

pub use ioutil::{magic_open, magic_open_or_gz};
pub use context::*;
pub use error::*;
pub use source::*;
pub use timeseries::*;
pub use csse::*;
pub use resolver::*;
pub use loader::*;
pub use reshape::*;
pub use rank::*;
pub use geo::*;
pub use config::*;
pub use pipeline::*;
pub use export::*;


/// Today's date in the local timezone; the default snapshot date.
pub fn naive_today() -> NaiveDate {
	Local::now().date_naive()
}
