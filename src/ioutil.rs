use std::ffi::OsString;
use std::io;
use std::io::Read;
use std::fs;
use std::path::{Path, PathBuf};

use flate2;


pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => {
			Ok(Box::new(flate2::read::GzDecoder::new(fs::File::open(path)?)))
		},
		_ => Ok(Box::new(fs::File::open(path)?)),
	}
}

/// Like `magic_open`, but falls back to `<path>.gz` when the plain file
/// does not exist. Mirrors are often stored compressed.
pub fn magic_open_or_gz<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	match magic_open(path) {
		Err(e) if e.kind() == io::ErrorKind::NotFound => {
			let mut gz: OsString = path.as_os_str().to_owned();
			gz.push(".gz");
			magic_open(PathBuf::from(gz))
		},
		other => other,
	}
}
