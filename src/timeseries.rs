use std::collections::HashMap;
use std::hash::Hash;
use std::ops::AddAssign;

use num_traits::Zero;

use smartstring::alias::{String as SmartString};


/// A date column label exactly as it appears in the source header
/// (e.g. `3/22/20`).
pub type DateLabel = SmartString;

pub trait TimeSeriesKey: Hash + Eq + Clone + std::fmt::Debug {}
impl<T: Hash + Eq + Clone + std::fmt::Debug> TimeSeriesKey for T {}


/// Per-key value vectors over a shared, ordered list of date columns.
///
/// Keys iterate in insertion order, so everything derived from a table is
/// reproducible for the same input.
#[derive(Debug, Clone)]
pub struct TimeSeries<T: Hash + Eq, V: Copy> {
	dates: Vec<DateLabel>,
	keys: HashMap<T, usize>,
	order: Vec<T>,
	time_series: Vec<Vec<V>>,
}

impl<T: Hash + Eq, V: Copy> TimeSeries<T, V> {
	pub fn new(dates: Vec<DateLabel>) -> Self {
		Self{
			dates,
			keys: HashMap::new(),
			order: Vec::new(),
			time_series: Vec::new(),
		}
	}

	#[inline(always)]
	pub fn date_index(&self, label: &str) -> Option<usize> {
		self.dates.iter().position(|d| d.as_str() == label)
	}

	#[inline(always)]
	pub fn dates(&self) -> &[DateLabel] {
		&self.dates[..]
	}

	/// Number of date columns.
	#[inline(always)]
	pub fn len(&self) -> usize {
		self.dates.len()
	}
}

impl<T: TimeSeriesKey, V: Copy + Zero + AddAssign> TimeSeries<T, V> {
	pub fn get_or_create(&mut self, k: T) -> &mut [V] {
		let index = self.get_index_or_create(k);
		&mut self.time_series[index][..]
	}

	pub fn get_index_or_create(&mut self, k: T) -> usize {
		match self.keys.get(&k) {
			Some(v) => *v,
			None => {
				let v = self.time_series.len();
				self.time_series.push(vec![V::zero(); self.dates.len()]);
				self.keys.insert(k.clone(), v);
				self.order.push(k);
				v
			},
		}
	}

	/// Adds `values` onto the row for `k`, creating it if needed. Rows with
	/// the same key are summed.
	pub fn add_row(&mut self, k: T, values: &[V]) {
		assert_eq!(values.len(), self.dates.len());
		let dst = self.get_or_create(k);
		for (d, v) in dst.iter_mut().zip(values.iter()) {
			*d += *v;
		}
	}

	pub fn get(&self, k: &T) -> Option<&[V]> {
		let index = *self.keys.get(k)?;
		Some(&self.time_series[index][..])
	}

	pub fn keys(&self) -> std::slice::Iter<'_, T> {
		self.order.iter()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&T, &[V])> + '_ {
		self.order.iter().map(move |k| {
			let index = self.keys[k];
			(k, &self.time_series[index][..])
		})
	}

	/// Maps every key through `f` and sums rows which end up on the same
	/// key. Keys mapped to `None` are dropped.
	pub fn rekeyed<U: TimeSeriesKey, F: Fn(&T) -> Option<U>>(&self, f: F) -> TimeSeries<U, V> {
		let mut result = TimeSeries::<U, V>::new(self.dates.clone());
		for (k_old, ts_old) in self.iter() {
			let k_new = match f(k_old) {
				Some(k) => k,
				None => continue,
			};
			result.add_row(k_new, ts_old);
		}
		result
	}

	/// Column-wise sum over all keys.
	pub fn totals(&self) -> Vec<V> {
		let mut result = vec![V::zero(); self.dates.len()];
		for ts in self.time_series.iter() {
			for (acc, v) in result.iter_mut().zip(ts.iter()) {
				*acc += *v;
			}
		}
		result
	}

	/// Re-lays the table onto `dates`, matching columns by label. Columns
	/// unknown to `self` are zero-filled; their labels are returned.
	pub fn aligned(&self, dates: &[DateLabel]) -> (Self, Vec<DateLabel>) {
		let mapping: Vec<Option<usize>> = dates.iter().map(|d| self.date_index(d)).collect();
		let missing = dates.iter().zip(mapping.iter())
			.filter(|(_, m)| m.is_none())
			.map(|(d, _)| d.clone())
			.collect();
		let mut result = Self::new(dates.to_vec());
		for (k, ts_old) in self.iter() {
			let dst = result.get_or_create(k.clone());
			for (d, m) in dst.iter_mut().zip(mapping.iter()) {
				if let Some(i) = m {
					*d = ts_old[*i];
				}
			}
		}
		(result, missing)
	}
}

pub type Counters<T> = TimeSeries<T, i64>;
