//! Documentation extraction from test sources.
//!
//! Test files double as documentation: block comments carrying the docs
//! marker hold the prose, and every test case that follows becomes a worked
//! example whose body is copied into a fenced code block.
//!
//! ```js
//! /**
//!  * @docs
//!  * ## Installation
//!  */
//! it("How to install with npm?", () => {
//!   /**
//!    * ```bash
//!    * npm install my-package
//!    * ```
//!    */
//!   assert.ok(true)
//! })
//! ```
//!
//! Extraction runs in two passes over the source lines. The scan pass tracks
//! block comments, docs regions and raw captures, and keeps a [`DocRow`] for
//! every line inside a region. The render pass walks those rows, turning
//! comment bodies into prose and test cases into headed code examples.

use std::sync::LazyLock;

use derive_more::Deref;
use derive_more::Display;
use regex::Regex;

use crate::DocsConfig;
use crate::codec::DEFAULT_INDENT_UNIT;
use crate::codec::detect_indent_unit;
use crate::codec::read_indent;
use crate::lexer::test_declaration;

static EMPTY_FENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\n```[\w+-]*\n```(\n|$)").unwrap_or_else(|e| panic!("{e}")));
pub(crate) static EXTRA_BLANK_LINES: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\n{3,}").unwrap_or_else(|e| panic!("{e}")));

/// The markdown document extracted from a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Display)]
pub struct DocsNode(String);

impl DocsNode {
	pub fn content(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

/// A source line retained by the scan pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRow {
	/// The line with its leading indentation units removed.
	pub text: String,
	/// Indentation units of the line, plus one inside a block comment.
	pub indent_level: usize,
	/// Captured verbatim from a raw docs comment.
	pub raw_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
	/// Lines are not documentation.
	Outside,
	/// Lines are documentation until a stop line.
	Docs,
	/// Lines are copied verbatim until the raw comment closes. `resume_docs`
	/// records whether a docs region continues afterwards.
	Raw { resume_docs: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScanState {
	region: Region,
	in_comment: bool,
}

impl ScanState {
	const START: Self = Self {
		region: Region::Outside,
		in_comment: false,
	};
}

/// What the scan pass does with a line.
#[derive(Debug)]
enum Step {
	Skip,
	Keep(DocRow),
	/// The line opened a raw capture: forget the comment opener kept just
	/// before it.
	DropOpener,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
	Docs,
	Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderMode {
	Prose,
	/// Inside a test case body. `anchor` is the indentation level of the
	/// body; `has_body` is set once any code has been written.
	Example { anchor: usize, has_body: bool },
	/// Inside a block comment that is part of the example code.
	ExampleComment { anchor: usize },
}

/// What the render pass does with a row.
#[derive(Debug)]
enum Emit {
	Nothing,
	Line(String),
	/// Remove the fence opened for the current example; the rows that follow
	/// bring their own code block.
	RetractFence,
}

/// Extracts a markdown document from tagged comments in a test source.
#[derive(Debug, Clone, Default)]
pub struct DocsParser {
	config: DocsConfig,
}

impl DocsParser {
	pub fn new(config: DocsConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &DocsConfig {
		&self.config
	}

	/// Extract the documentation of `source`.
	///
	/// Lines outside docs regions are dropped. Unexpected input never fails;
	/// at worst it produces less documentation.
	pub fn decode(&self, source: &str) -> DocsNode {
		let unit = self
			.config
			.indent
			.clone()
			.filter(|unit| !unit.is_empty())
			.or_else(|| detect_source_indent_unit(source))
			.unwrap_or_else(|| DEFAULT_INDENT_UNIT.to_string());

		let rows = self.scan(source, &unit);
		let lines = self.render(&rows, &unit);
		let content = self.normalize(&lines.join("\n"));
		tracing::debug!(rows = rows.len(), bytes = content.len(), "extracted docs");

		DocsNode(content)
	}

	fn scan(&self, source: &str, unit: &str) -> Vec<DocRow> {
		let mut rows: Vec<DocRow> = vec![];
		let mut state = ScanState::START;

		for (index, line) in source.lines().enumerate() {
			let (next, step) = self.scan_line(state, line, unit);
			if next.region != state.region {
				tracing::trace!(line = index + 1, from = ?state.region, to = ?next.region, "docs region changed");
			}
			state = next;

			match step {
				Step::Skip => {}
				Step::Keep(row) => rows.push(row),
				Step::DropOpener => {
					if rows.last().is_some_and(|row| is_comment_open(row.text.trim())) {
						rows.pop();
					}
				}
			}
		}

		rows
	}

	fn scan_line(&self, state: ScanState, line: &str, unit: &str) -> (ScanState, Step) {
		let depth = read_indent(line, unit);
		let text = &line[depth * unit.len()..];
		let value = text.trim();
		let mut next = state;

		if let Region::Raw { resume_docs } = state.region {
			if value.ends_with("*/") {
				next.region = if resume_docs {
					Region::Docs
				} else {
					Region::Outside
				};
				next.in_comment = false;
				return (next, Step::Skip);
			}

			let row = DocRow {
				text: text.to_string(),
				indent_level: depth + 1,
				raw_mode: true,
			};
			return (next, Step::Keep(row));
		}

		if !state.in_comment && is_comment_open(value) {
			next.in_comment = true;
		}
		let in_block = next.in_comment;
		if next.in_comment && value.ends_with("*/") {
			next.in_comment = false;
		}

		let capturing = state.region == Region::Docs;
		match in_block.then(|| self.docs_marker(value)).flatten() {
			Some(Marker::Raw) => {
				next.region = Region::Raw {
					resume_docs: capturing,
				};
				next.in_comment = true;
				let step = if capturing { Step::DropOpener } else { Step::Skip };
				return (next, step);
			}
			Some(Marker::Docs) => {
				next.region = Region::Docs;
				let step = if capturing { Step::DropOpener } else { Step::Skip };
				return (next, step);
			}
			None => {}
		}

		if !capturing {
			return (next, Step::Skip);
		}

		if self.is_stop(value) {
			next.region = Region::Outside;
		}

		let row = DocRow {
			text: text.trim_end().to_string(),
			indent_level: if in_block { depth + 1 } else { depth },
			raw_mode: false,
		};
		(next, Step::Keep(row))
	}

	/// Recognise `* @docs` and `* @docs raw` comment body lines.
	fn docs_marker(&self, value: &str) -> Option<Marker> {
		let rest = value
			.strip_prefix('*')?
			.trim_start()
			.strip_prefix(self.config.marker.as_str())?;

		if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
			return None;
		}

		let qualifier = rest.trim();
		if qualifier == "raw" || qualifier.starts_with("raw ") {
			Some(Marker::Raw)
		} else {
			Some(Marker::Docs)
		}
	}

	fn is_stop(&self, value: &str) -> bool {
		value.starts_with(&self.config.region_closer())
			|| self
				.config
				.stops
				.iter()
				.any(|stop| value.starts_with(stop.as_str()))
	}

	fn render(&self, rows: &[DocRow], unit: &str) -> Vec<String> {
		let fence = self.config.fence();
		let heading_fence = format!("\n{fence}");
		let mut lines: Vec<String> = vec![];
		let mut mode = RenderMode::Prose;

		for (index, row) in rows.iter().enumerate() {
			let (next, emit) = self.render_row(mode, row, rows.get(index + 1), unit);
			if next != mode {
				tracing::trace!(row = index, from = ?mode, to = ?next, "docs render mode changed");
			}
			mode = next;

			match emit {
				Emit::Nothing => {}
				Emit::Line(line) => lines.push(line),
				Emit::RetractFence => {
					if let Some(line) = lines.iter_mut().rev().find(|line| line.ends_with(&heading_fence)) {
						line.truncate(line.len() - heading_fence.len());
					}
				}
			}
		}

		// Close an example that ran to the end of the source.
		match mode {
			RenderMode::Example { has_body: true, .. } | RenderMode::ExampleComment { .. } => {
				lines.push("```".to_string());
			}
			_ => {}
		}

		lines
	}

	fn render_row(
		&self,
		mode: RenderMode,
		row: &DocRow,
		next: Option<&DocRow>,
		unit: &str,
	) -> (RenderMode, Emit) {
		let indent = |level: usize| unit.repeat(level);

		if row.raw_mode {
			let text = row.text.replace("*\\/", "*/");
			return match mode {
				RenderMode::Example { anchor, .. } => {
					let line = indent(row.indent_level.saturating_sub(anchor + 1)) + &text;
					(
						RenderMode::Example {
							anchor,
							has_body: true,
						},
						Emit::Line(line),
					)
				}
				RenderMode::ExampleComment { anchor } => {
					let line = indent(row.indent_level.saturating_sub(anchor + 1)) + &text;
					(mode, Emit::Line(line))
				}
				RenderMode::Prose => {
					let line = indent(row.indent_level.saturating_sub(1)) + &text;
					(mode, Emit::Line(line))
				}
			};
		}

		let value = row.text.trim();
		if value.is_empty() {
			return (mode, Emit::Line(String::new()));
		}

		if let RenderMode::ExampleComment { anchor } = mode {
			let line = indent(row.indent_level.saturating_sub(anchor + 1)) + &row.text;
			let next_mode = if value.ends_with("*/") {
				RenderMode::Example {
					anchor,
					has_body: true,
				}
			} else {
				mode
			};
			return (next_mode, Emit::Line(line));
		}

		if let Some(declaration) = test_declaration(value, &self.config.callees) {
			tracing::trace!(
				callee = %declaration.callee,
				description = %declaration.description,
				"test case example"
			);
			let heading = format!("{}\n{}", declaration.description, self.config.fence());
			let line = match mode {
				RenderMode::Example { .. } => format!("```\n{heading}"),
				_ => heading,
			};
			let next_mode = RenderMode::Example {
				anchor: row.indent_level + 1,
				has_body: false,
			};
			return (next_mode, Emit::Line(line));
		}

		if self.is_stop(value) {
			let emit = match mode {
				RenderMode::Example { .. } => Emit::Line("```".to_string()),
				_ => Emit::Nothing,
			};
			return (RenderMode::Prose, emit);
		}

		match mode {
			RenderMode::Example { anchor, has_body } => {
				if is_comment_open(value) {
					if !has_body && next.is_some_and(is_fence_row) {
						return (RenderMode::Prose, Emit::RetractFence);
					}

					let line = indent(row.indent_level.saturating_sub(anchor + 1)) + &row.text;
					let next_mode = if value.ends_with("*/") {
						RenderMode::Example {
							anchor,
							has_body: true,
						}
					} else {
						RenderMode::ExampleComment { anchor }
					};
					return (next_mode, Emit::Line(line));
				}

				let code = uncomment(value);
				let line = indent(row.indent_level.saturating_sub(anchor)) + code;
				(
					RenderMode::Example {
						anchor,
						has_body: true,
					},
					Emit::Line(line),
				)
			}
			_ => {
				if is_comment_open(value) {
					return (mode, Emit::Nothing);
				}

				let line = comment_body(&row.text).unwrap_or_else(|| uncomment(value));
				(mode, Emit::Line(line.to_string()))
			}
		}
	}

	/// Apply the final clean-ups: drop empty fenced blocks, collapse runs of
	/// blank lines and drop a fence opener left dangling at the end.
	fn normalize(&self, content: &str) -> String {
		let content = EMPTY_FENCE.replace_all(content, "\n$1");
		let content = EXTRA_BLANK_LINES.replace_all(&content, "\n\n");
		let dangling = format!("\n{}", self.config.fence());

		match content.strip_suffix(&dangling) {
			Some(stripped) => format!("{stripped}\n"),
			None => content.into_owned(),
		}
	}
}

/// Detect the indentation unit of the code, ignoring the single-space
/// alignment of block comment bodies (` * text`).
fn detect_source_indent_unit(source: &str) -> Option<String> {
	let code: Vec<&str> = source
		.lines()
		.filter(|line| !line.trim_start().starts_with('*'))
		.collect();

	detect_indent_unit(&code.join("\n"))
}

fn is_comment_open(value: &str) -> bool {
	value.starts_with("/*")
}

/// A comment body line opening or closing a fenced code block.
fn is_fence_row(row: &DocRow) -> bool {
	!row.raw_mode
		&& row
			.text
			.trim()
			.strip_prefix('*')
			.is_some_and(|body| body.trim_start().starts_with("```"))
}

/// The text of a block comment body line without its `* ` bullet. Closers and
/// bare bullets become blank lines. `None` for lines that are not comment
/// bodies.
fn comment_body(text: &str) -> Option<&str> {
	let body = text.trim_start();

	if body == "*" || body.starts_with("*/") {
		return Some("");
	}

	body.strip_prefix("* ").map(str::trim_end)
}

/// Reveal code that was commented out with `//code`, e.g. imports that only
/// matter for the rendered example. Ordinary `// comments` are kept.
fn uncomment(value: &str) -> &str {
	match value.strip_prefix("//") {
		Some(code) if !code.starts_with([' ', '/']) && !code.is_empty() => code,
		_ => value,
	}
}
