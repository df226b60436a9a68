use std::fs;
use std::io;
use std::path::Path;

use log::info;

use serde::Serialize;

use super::pipeline::Dashboard;
use super::rank::RankedTable;


/// Writes `records` as CSV with a header row taken from the field names.
/// An empty table produces an empty file.
pub fn write_csv<W: io::Write, T: Serialize, I: IntoIterator<Item = T>>(w: W, records: I) -> io::Result<()> {
	let mut w = csv::Writer::from_writer(w);
	for rec in records {
		w.serialize(rec)?;
	}
	w.flush()?;
	Ok(())
}

/// File name of a leading-regions table, e.g. `leading_global_confirmed.csv`.
pub fn leading_file_name(table: &RankedTable) -> String {
	format!("leading_{}_{}.csv", table.scope, table.by)
}

fn write_file<T: Serialize, I: IntoIterator<Item = T>>(dir: &Path, name: &str, records: I) -> io::Result<()> {
	let path = dir.join(name);
	let f = fs::File::create(&path)?;
	write_csv(io::BufWriter::new(f), records)?;
	info!("wrote {}", path.display());
	Ok(())
}

impl Dashboard {
	/// Writes every table into `dir`, creating it if necessary.
	pub fn write_csv_dir<P: AsRef<Path>>(&self, dir: P) -> io::Result<()> {
		let dir = dir.as_ref();
		fs::create_dir_all(dir)?;
		write_file(dir, "worldwide.csv", self.worldwide.points())?;
		write_file(dir, "global_long.csv", self.global.records.iter())?;
		for table in self.leading.all().iter() {
			write_file(dir, &leading_file_name(table), table.records())?;
		}
		write_file(dir, "us_states.csv", self.us_states.iter())?;
		write_file(dir, "us_counties.csv", self.us_counties.rows.iter())?;
		Ok(())
	}
}


fn fmt_active(v: Option<i64>) -> String {
	match v {
		Some(v) => v.to_string(),
		None => "-".into(),
	}
}

/// Renders a leading table as right-aligned text columns for terminals.
pub fn write_text<W: io::Write>(mut w: W, table: &RankedTable) -> io::Result<()> {
	let records = table.records();
	let width = records.iter().map(|r| r.region.chars().count()).max().unwrap_or(0).max(6);
	writeln!(w, "# {} by {}", table.scope, table.by)?;
	writeln!(w, "{:<width$} {:>12} {:>10} {:>12} {:>12}", "Region", "Confirmed", "Deaths", "Recovered", "Active", width = width)?;
	for r in records.iter() {
		writeln!(
			w,
			"{:<width$} {:>12} {:>10} {:>12} {:>12}",
			r.region, r.confirmed, r.deaths, r.recovered, fmt_active(r.active),
			width = width,
		)?;
	}
	Ok(())
}
