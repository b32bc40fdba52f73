use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::TapdocError;
use crate::TreeNode;

/// A header line recognised at the start of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Header {
	/// The protocol version, e.g. `TAP version 13`.
	Version,
}

/// A summary counter from the trailing block of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
	Tests,
	Suites,
	Pass,
	Fail,
	Cancelled,
	Skipped,
	Todo,
	/// Total duration in milliseconds.
	Duration,
}

impl Counter {
	pub const ALL: [Counter; 8] = [
		Counter::Tests,
		Counter::Suites,
		Counter::Pass,
		Counter::Fail,
		Counter::Cancelled,
		Counter::Skipped,
		Counter::Todo,
		Counter::Duration,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Tests => "tests",
			Self::Suites => "suites",
			Self::Pass => "pass",
			Self::Fail => "fail",
			Self::Cancelled => "cancelled",
			Self::Skipped => "skipped",
			Self::Todo => "todo",
			Self::Duration => "duration",
		}
	}

	/// The label used in the rendered summary line. Durations are reported as
	/// `duration_ms`.
	fn label(self) -> &'static str {
		match self {
			Self::Duration => "duration_ms",
			other => other.as_str(),
		}
	}
}

impl fmt::Display for Counter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Counter {
	type Err = TapdocError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Counter::ALL
			.into_iter()
			.find(|counter| counter.as_str() == value || counter.label() == value)
			.ok_or_else(|| TapdocError::UnknownCounter(value.to_string()))
	}
}

/// The prefix tables and markers of one report dialect.
///
/// A dialect is immutable configuration injected into [`TestNode`] views, so
/// several dialects can be used side by side without sharing state. Footer
/// tables map each counter to every known rendering of it because different
/// tool revisions print the same summary differently (`# pass 3` versus
/// `ℹ pass 3`). The tables are open for extension through
/// [`Dialect::with_footer_prefix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
	name: String,
	header: BTreeMap<Header, String>,
	footer: BTreeMap<Counter, Vec<String>>,
	fail_markers: Vec<String>,
	skip_marker: String,
	todo_marker: String,
	detects_footer: bool,
}

impl Dialect {
	pub const NODE_TEST: &'static str = "node_test";
	pub const VITEST: &'static str = "vitest";

	/// The TAP output of `node --test`.
	pub fn node_test() -> Self {
		let footer = Counter::ALL
			.into_iter()
			.map(|counter| {
				let label = counter.label();
				(counter, vec![format!("# {label} "), format!("ℹ {label} ")])
			})
			.collect();

		Self {
			name: Self::NODE_TEST.to_string(),
			header: BTreeMap::from([(Header::Version, "TAP version ".to_string())]),
			footer,
			fail_markers: vec!["not ok ".to_string(), "✖ ".to_string()],
			skip_marker: "# SKIP".to_string(),
			todo_marker: "# TODO".to_string(),
			detects_footer: true,
		}
	}

	/// The default reporter output of vitest. Summary lines are not treated
	/// as footers and only `not ok ` marks a failure.
	pub fn vitest() -> Self {
		Self {
			name: Self::VITEST.to_string(),
			header: BTreeMap::from([(Header::Version, "RUN ".to_string())]),
			fail_markers: vec!["not ok ".to_string()],
			detects_footer: false,
			..Self::node_test()
		}
	}

	/// Look up a built-in dialect by name.
	pub fn by_name(name: &str) -> Result<Self, TapdocError> {
		match name {
			Self::NODE_TEST => Ok(Self::node_test()),
			Self::VITEST => Ok(Self::vitest()),
			other => Err(TapdocError::UnknownDialect(other.to_string())),
		}
	}

	/// Register another rendering of a summary counter.
	#[must_use]
	pub fn with_footer_prefix(mut self, counter: Counter, prefix: impl Into<String>) -> Self {
		let prefix = prefix.into();
		let prefixes = self.footer.entry(counter).or_default();
		if !prefixes.contains(&prefix) {
			prefixes.push(prefix);
		}
		self
	}

	/// Replace the prefix of a header line.
	#[must_use]
	pub fn with_header_prefix(mut self, header: Header, prefix: impl Into<String>) -> Self {
		self.header.insert(header, prefix.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn header_prefix(&self, header: Header) -> Option<&str> {
		self.header.get(&header).map(String::as_str)
	}

	pub fn footer_prefixes(&self, counter: Counter) -> &[String] {
		self.footer.get(&counter).map_or(&[], Vec::as_slice)
	}

	/// View `node` through this dialect.
	pub fn view<'a>(&'a self, node: &'a TreeNode) -> TestNode<'a> {
		TestNode {
			node,
			dialect: self,
		}
	}
}

impl Default for Dialect {
	fn default() -> Self {
		Self::node_test()
	}
}

/// A [`TreeNode`] annotated with the metrics of a report [`Dialect`].
///
/// Every metric is derived on demand from the content of the node's direct
/// children. Nothing is cached, and deeper descendants never influence an
/// ancestor's metrics.
#[derive(Debug, Clone, Copy)]
pub struct TestNode<'a> {
	node: &'a TreeNode,
	dialect: &'a Dialect,
}

impl<'a> TestNode<'a> {
	pub fn node(&self) -> &'a TreeNode {
		self.node
	}

	pub fn dialect(&self) -> &'a Dialect {
		self.dialect
	}

	pub fn content(&self) -> &'a str {
		self.node.content()
	}

	/// The direct children, viewed through the same dialect.
	pub fn children(&self) -> impl Iterator<Item = TestNode<'a>> + 'a {
		let dialect = self.dialect;
		self.node
			.children()
			.iter()
			.map(move |node| dialect.view(node))
	}

	/// Find the first direct child starting with any of `candidates` and
	/// return the rest of its content, or an empty string.
	pub fn find_prefix<S: AsRef<str>>(&self, candidates: &[S]) -> &'a str {
		self.node
			.children()
			.iter()
			.find_map(|child| {
				candidates
					.iter()
					.find_map(|prefix| child.content().strip_prefix(prefix.as_ref()))
			})
			.unwrap_or_default()
	}

	fn counter(&self, counter: Counter) -> usize {
		self.find_prefix(self.dialect.footer_prefixes(counter))
			.trim()
			.parse()
			.unwrap_or(0)
	}

	/// The protocol version from the header line, or `0`.
	pub fn version(&self) -> u32 {
		self.dialect
			.header_prefix(Header::Version)
			.map_or("", |prefix| self.find_prefix(&[prefix]))
			.trim()
			.parse()
			.unwrap_or(0)
	}

	pub fn tests_count(&self) -> usize {
		self.counter(Counter::Tests)
	}

	pub fn suites_count(&self) -> usize {
		self.counter(Counter::Suites)
	}

	pub fn pass_count(&self) -> usize {
		self.counter(Counter::Pass)
	}

	pub fn fail_count(&self) -> usize {
		self.counter(Counter::Fail)
	}

	pub fn cancelled_count(&self) -> usize {
		self.counter(Counter::Cancelled)
	}

	pub fn skip_count(&self) -> usize {
		self.counter(Counter::Skipped)
	}

	pub fn todo_count(&self) -> usize {
		self.counter(Counter::Todo)
	}

	/// Reported duration in milliseconds. Digit separators and units are
	/// ignored, so `1_500` and `1500ms` both read as `1500.0`.
	pub fn duration_ms(&self) -> f64 {
		let digits: String = self
			.find_prefix(self.dialect.footer_prefixes(Counter::Duration))
			.chars()
			.filter(|c| c.is_ascii_digit() || matches!(c, '.' | '+'))
			.collect();

		digits.parse().unwrap_or(0.0)
	}

	/// Reported duration in seconds.
	pub fn duration(&self) -> f64 {
		self.duration_ms() / 1_000.0
	}

	pub fn is_skip(&self) -> bool {
		self.content().ends_with(&self.dialect.skip_marker)
	}

	pub fn is_todo(&self) -> bool {
		self.content().ends_with(&self.dialect.todo_marker)
	}

	/// A failed test line. Skipped and todo tests never count as failures.
	pub fn is_fail(&self) -> bool {
		if self.is_skip() || self.is_todo() {
			return false;
		}

		let content = self.content();
		self.dialect
			.fail_markers
			.iter()
			.any(|marker| content.starts_with(marker.as_str()))
	}

	/// A summary line. Only leaves qualify, which keeps subtest headers that
	/// share a prefix with a counter out of the summary.
	pub fn is_footer(&self) -> bool {
		if !self.dialect.detects_footer || !self.node.is_leaf() {
			return false;
		}

		let content = self.content();
		self.dialect
			.footer
			.values()
			.flatten()
			.any(|prefix| content.starts_with(prefix.as_str()))
	}
}
