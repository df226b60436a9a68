use std::io;
use std::io::Write;

use log::info;

use covid_dash::{run, write_csv, write_text, Config};


fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let argv: Vec<String> = std::env::args().collect();
	let outdir = argv.get(1);

	let config = Config::from_env()?;
	let source = config.build_source()?;
	let date = config.date_or_today();
	info!("building dashboard tables for {}", date);
	let dashboard = run(&*source, date, config.leading)?;

	if let Some(outdir) = outdir {
		dashboard.write_csv_dir(outdir)?;
		return Ok(())
	}

	let stdout = io::stdout();
	let mut out = stdout.lock();
	let pretty = isatty::stdout_isatty();
	writeln!(
		out,
		"# {}: {} cases, {} deaths",
		dashboard.effective_date,
		dashboard.totals.confirmed,
		dashboard.totals.deaths,
	)?;
	for table in dashboard.leading.all().iter() {
		if pretty {
			write_text(&mut out, table)?;
		} else {
			writeln!(out, "# {} by {}", table.scope, table.by)?;
			write_csv(&mut out, table.records())?;
		}
		writeln!(out)?;
	}
	if !dashboard.unresolved.is_empty() {
		let names: Vec<&str> = dashboard.unresolved.iter().map(|s| s.as_str()).collect();
		writeln!(out, "# without ISO3 code: {}", names.join(", "))?;
	}
	Ok(())
}
