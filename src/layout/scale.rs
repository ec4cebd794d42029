//! Small numeric and color scales shared by the layouts.

use chrono::{DateTime, TimeZone, Utc};

/// Ten-color categorical palette.
pub const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const YL_GN_BU: &[(u8, u8, u8)] = &[
	(0xff, 0xff, 0xd9),
	(0xed, 0xf8, 0xb1),
	(0xc7, 0xe9, 0xb4),
	(0x7f, 0xcd, 0xbb),
	(0x41, 0xb6, 0xc4),
	(0x1d, 0x91, 0xc0),
	(0x22, 0x5e, 0xa8),
	(0x25, 0x34, 0x94),
	(0x08, 0x1d, 0x58),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	pub domain: (f64, f64),
	pub range: (f64, f64),
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	/// Maps `v` into the range. A degenerate domain maps to the range midpoint.
	pub fn apply(&self, v: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		let t = if d1 - d0 == 0.0 { 0.5 } else { (v - d0) / (d1 - d0) };
		r0 + (r1 - r0) * t
	}
}

/// Linear scale over instants, at millisecond resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
	inner: LinearScale,
}

impl TimeScale {
	pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, range: (f64, f64)) -> Self {
		Self {
			inner: LinearScale::new(
				(start.timestamp_millis() as f64, end.timestamp_millis() as f64),
				range,
			),
		}
	}

	/// Scale spanning the extent of `instants`, or `None` when there are none.
	pub fn extent<I>(instants: I, range: (f64, f64)) -> Option<Self>
	where
		I: IntoIterator<Item = DateTime<Utc>>,
	{
		let mut iter = instants.into_iter();
		let first = iter.next()?;
		let (lo, hi) = iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
		Some(Self::new(lo, hi, range))
	}

	pub fn apply(&self, t: DateTime<Utc>) -> f64 {
		self.inner.apply(t.timestamp_millis() as f64)
	}

	/// `count + 1` evenly spaced ticks across the domain, labelled as dates
	/// (or times of day when the domain spans less than a day).
	pub fn ticks(&self, count: usize) -> Vec<(f64, String)> {
		let (d0, d1) = self.inner.domain;
		let span = d1 - d0;
		if span == 0.0 || count == 0 {
			return label_at(d0).map(|l| vec![(self.inner.apply(d0), l)]).unwrap_or_default();
		}
		let fmt = if span < 86_400_000.0 { "%H:%M" } else { "%Y-%m-%d" };
		(0..=count)
			.filter_map(|i| {
				let ms = d0 + span * i as f64 / count as f64;
				let t = Utc.timestamp_millis_opt(ms as i64).single()?;
				Some((self.inner.apply(ms), t.format(fmt).to_string()))
			})
			.collect()
	}
}

fn label_at(ms: f64) -> Option<String> {
	Utc.timestamp_millis_opt(ms as i64)
		.single()
		.map(|t| t.format("%Y-%m-%d").to_string())
}

/// Evenly divided bands with equal inner and outer padding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandScale {
	len: usize,
	start: f64,
	step: f64,
	bandwidth: f64,
}

impl BandScale {
	pub fn new(len: usize, range: (f64, f64), padding: f64) -> Self {
		let (r0, r1) = range;
		let n = len as f64;
		let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
		let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
		Self {
			len,
			start,
			step,
			bandwidth: step * (1.0 - padding),
		}
	}

	pub fn position(&self, index: usize) -> Option<f64> {
		(index < self.len).then(|| self.start + self.step * index as f64)
	}

	pub fn bandwidth(&self) -> f64 {
		self.bandwidth
	}
}

/// Assigns palette colors to keys in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct OrdinalColors {
	keys: Vec<String>,
}

impl OrdinalColors {
	pub fn color(&mut self, key: &str) -> &'static str {
		let idx = match self.keys.iter().position(|k| k == key) {
			Some(i) => i,
			None => {
				self.keys.push(key.to_owned());
				self.keys.len() - 1
			}
		};
		COLORS[idx % COLORS.len()]
	}
}

/// Yellow-green-blue sequential ramp over `[0, max]`, as an `rgb()` string.
pub fn sequential_yl_gn_bu(value: f64, max: f64) -> String {
	let t = if max <= 0.0 { 0.0 } else { (value / max).clamp(0.0, 1.0) };
	let scaled = t * (YL_GN_BU.len() - 1) as f64;
	let i = (scaled.floor() as usize).min(YL_GN_BU.len() - 2);
	let f = scaled - i as f64;
	let (a, b) = (YL_GN_BU[i], YL_GN_BU[i + 1]);
	let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
	format!("rgb({}, {}, {})", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}
