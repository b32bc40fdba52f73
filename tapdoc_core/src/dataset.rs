use std::fmt;

use derive_more::Deref;
use derive_more::IntoIterator;
use markdown::ParseOptions;
use markdown::mdast::Node;
use markdown::to_mdast;
use serde::Deserialize;
use serde::Serialize;

use crate::DatasetConfig;
use crate::TapdocError;
use crate::TapdocResult;
use crate::docs::EXTRA_BLANK_LINES;

/// The deepest markdown heading level.
const MAX_HEADING_DEPTH: u8 = 6;

/// A top-level block of a markdown document, carrying its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownBlock {
	Heading { depth: u8, text: String },
	Paragraph { text: String },
	Code { lang: Option<String>, value: String },
	/// Lists, quotes, tables and anything else, kept verbatim.
	Other { source: String },
}

impl MarkdownBlock {
	/// Split `content` into its top-level blocks.
	///
	/// Markdown never fails to parse in practice, but if it does the document
	/// is treated as empty.
	pub fn parse_document(content: &str) -> Vec<MarkdownBlock> {
		let mdast = match to_mdast(content, &ParseOptions::gfm()) {
			Ok(mdast) => mdast,
			Err(e) => {
				tracing::warn!(error = %e, "failed to parse markdown, no dataset entries generated");
				return vec![];
			}
		};

		let Some(children) = mdast.children() else {
			return vec![];
		};

		children
			.iter()
			.filter_map(|node| Self::from_node(node, content))
			.collect()
	}

	fn from_node(node: &Node, content: &str) -> Option<MarkdownBlock> {
		let position = node.position()?;
		let source = content.get(position.start.offset..position.end.offset)?;

		let block = match node {
			Node::Heading(heading) => {
				Self::Heading {
					depth: heading.depth,
					text: heading_text(source),
				}
			}
			Node::Paragraph(_) => {
				Self::Paragraph {
					text: source.trim().to_string(),
				}
			}
			Node::Code(code) => {
				Self::Code {
					lang: code.lang.clone(),
					value: code.value.clone(),
				}
			}
			_ => {
				Self::Other {
					source: source.trim_end().to_string(),
				}
			}
		};

		Some(block)
	}
}

impl fmt::Display for MarkdownBlock {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Heading { depth, text } => {
				write!(f, "{} {text}", "#".repeat(usize::from(*depth)))
			}
			Self::Paragraph { text } => f.write_str(text),
			Self::Code { lang, value } => {
				write!(f, "```{}\n{value}\n```", lang.as_deref().unwrap_or_default())
			}
			Self::Other { source } => f.write_str(source),
		}
	}
}

/// The text of an ATX (`## Title`) or setext (`Title\n---`) heading.
fn heading_text(source: &str) -> String {
	let trimmed = source.trim();

	if trimmed.starts_with('#') {
		let text = trimmed.trim_start_matches('#').trim();
		let unclosed = text.trim_end_matches('#');

		// A closing `#` run only counts when separated from the text.
		return if unclosed.is_empty() || unclosed.ends_with([' ', '\t']) {
			unclosed.trim_end().to_string()
		} else {
			text.to_string()
		};
	}

	let mut lines: Vec<&str> = trimmed.lines().collect();
	lines.pop();
	lines.join("\n").trim().to_string()
}

/// One instruction/output training record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
	/// The question.
	pub instruction: String,
	/// The fenced code block answering it.
	pub output: String,
	/// Enclosing headings rendered as `hN:text`, outermost first.
	pub context: Vec<String>,
	/// The prose of the question's section.
	pub input: String,
	/// Enclosing heading texts without markup.
	pub tags: Vec<String>,
	/// Marks the example as backed by an executable test of the package.
	pub proven: String,
}

/// The entries generated from one document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, IntoIterator, Serialize, Deserialize)]
#[into_iterator(owned, ref)]
pub struct Dataset(Vec<DatasetEntry>);

impl Dataset {
	pub fn entries(&self) -> &[DatasetEntry] {
		&self.0
	}

	/// Serialize as JSON lines: one entry per line, each line terminated.
	pub fn to_jsonl(&self) -> TapdocResult<String> {
		let mut output = String::new();

		for entry in &self.0 {
			let line =
				serde_json::to_string(entry).map_err(|e| TapdocError::Serialize(e.to_string()))?;
			output.push_str(&line);
			output.push('\n');
		}

		Ok(output)
	}
}

/// Generates question/answer datasets from markdown documentation.
///
/// A paragraph such as `How to install with npm?` followed directly by a
/// fenced code block forms one entry. The headings above the question give it
/// context and the prose of its section becomes the entry's input.
#[derive(Debug, Clone, Default)]
pub struct DatasetParser {
	config: DatasetConfig,
}

impl DatasetParser {
	pub fn new(config: DatasetConfig) -> Self {
		Self { config }
	}

	/// Generate the dataset of a markdown document for `package`.
	pub fn parse(&self, content: &str, package: &str) -> Dataset {
		self.generate(&MarkdownBlock::parse_document(content), package)
	}

	/// Generate the dataset of an already split document.
	pub fn generate(&self, blocks: &[MarkdownBlock], package: &str) -> Dataset {
		let mut entries = vec![];

		for (index, block) in blocks.iter().enumerate() {
			let MarkdownBlock::Paragraph { text } = block else {
				continue;
			};
			if !self.is_question(text) {
				continue;
			}
			let Some(answer @ MarkdownBlock::Code { .. }) = blocks.get(index + 1) else {
				continue;
			};

			let preceding = &blocks[..index];
			let context = heading_context(preceding);
			let tags = context.iter().map(|tag| tag_text(tag)).collect();

			entries.push(DatasetEntry {
				instruction: text.clone(),
				output: answer.to_string(),
				context,
				input: self.input(preceding),
				tags,
				proven: format!("{}{package}", self.config.provenance_prefix),
			});
		}

		tracing::debug!(blocks = blocks.len(), entries = entries.len(), "generated dataset");

		Dataset(entries)
	}

	fn is_question(&self, text: &str) -> bool {
		text.starts_with(&self.config.question_prefix) && text.ends_with(&self.config.question_suffix)
	}

	/// The prose between the closest heading (inclusive) and the question,
	/// without code blocks or other questions.
	fn input(&self, preceding: &[MarkdownBlock]) -> String {
		let start = preceding
			.iter()
			.rposition(|block| matches!(block, MarkdownBlock::Heading { .. }))
			.unwrap_or(0);

		let parts: Vec<String> = preceding[start..]
			.iter()
			.filter(|block| {
				match block {
					MarkdownBlock::Code { .. } => false,
					MarkdownBlock::Paragraph { text } => !self.is_question(text),
					_ => true,
				}
			})
			.map(|block| format!("{block}\n"))
			.collect();

		EXTRA_BLANK_LINES
			.replace_all(&parts.join("\n"), "\n\n")
			.into_owned()
	}
}

/// The `hN:text` tags of the headings enclosing a question. Headings deeper
/// than the closest one belong to earlier, already closed sections and are
/// dropped. Each level keeps its first position and its latest text.
fn heading_context(preceding: &[MarkdownBlock]) -> Vec<String> {
	let headings: Vec<(u8, &str)> = preceding
		.iter()
		.filter_map(|block| {
			match block {
				MarkdownBlock::Heading { depth, text } => Some((*depth, text.as_str())),
				_ => None,
			}
		})
		.collect();

	let max_depth = headings.last().map_or(MAX_HEADING_DEPTH, |(depth, _)| *depth);
	let mut levels: Vec<(u8, &str)> = vec![];

	for (depth, text) in headings {
		if depth > max_depth {
			continue;
		}

		match levels.iter_mut().find(|(level, _)| *level == depth) {
			Some(level) => level.1 = text,
			None => levels.push((depth, text)),
		}
	}

	levels
		.into_iter()
		.map(|(depth, text)| format!("h{depth}:{text}"))
		.collect()
}

fn tag_text(tag: &str) -> String {
	let text = tag.split_once(':').map_or(tag, |(_, text)| text);
	text.replace('`', "")
}
