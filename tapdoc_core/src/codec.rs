use crate::TapdocError;
use crate::TapdocResult;
use crate::TreeNode;

/// Indentation unit used when none is configured and none can be detected.
pub const DEFAULT_INDENT_UNIT: &str = "  ";
/// Line separator used by decoders and encoders.
pub const DEFAULT_LINE_SEPARATOR: &str = "\n";

/// Decodes indentation-structured text into a [`TreeNode`] tree and encodes
/// trees back into text.
///
/// Each non-blank line becomes one node. A line's nesting depth is the number
/// of times the indentation unit prefixes it, and its parent is the closest
/// preceding line with a smaller depth.
///
/// ```rust
/// use tapdoc_core::IndentCodec;
///
/// let mut codec = IndentCodec::new();
/// let text = "TAP version 13\nok 1 - first test\nnot ok 2 - second test\n1..2";
/// let root = codec.decode(text);
///
/// assert_eq!(root.children().len(), 4);
/// assert_eq!(codec.encode(&root), format!("{text}\n"));
/// ```
#[derive(Debug, Clone)]
pub struct IndentCodec {
	/// Explicitly configured unit. Never empty.
	indent_unit: Option<String>,
	/// Unit detected by the most recent decode when none is configured.
	detected_unit: Option<String>,
	line_separator: String,
}

impl Default for IndentCodec {
	fn default() -> Self {
		Self::new()
	}
}

impl IndentCodec {
	/// A codec which detects the indentation unit from its input.
	pub fn new() -> Self {
		Self {
			indent_unit: None,
			detected_unit: None,
			line_separator: DEFAULT_LINE_SEPARATOR.to_string(),
		}
	}

	/// A codec with a fixed indentation unit, e.g. four spaces or a tab.
	pub fn with_indent_unit(unit: impl Into<String>) -> TapdocResult<Self> {
		let unit = unit.into();
		if unit.is_empty() {
			return Err(TapdocError::EmptyIndentUnit);
		}

		Ok(Self {
			indent_unit: Some(unit),
			..Self::new()
		})
	}

	#[must_use]
	pub fn with_line_separator(mut self, separator: impl Into<String>) -> Self {
		self.line_separator = separator.into();
		self
	}

	/// The unit in effect: configured, else detected by the last decode, else
	/// [`DEFAULT_INDENT_UNIT`].
	pub fn indent_unit(&self) -> &str {
		self.indent_unit
			.as_deref()
			.or(self.detected_unit.as_deref())
			.unwrap_or(DEFAULT_INDENT_UNIT)
	}

	pub fn line_separator(&self) -> &str {
		&self.line_separator
	}

	/// Decode `text` into a tree rooted at a synthetic, content-less root.
	///
	/// Blank lines are skipped. Indentation jumps of more than one level are
	/// tolerated: a line simply closes every open frame at its depth or
	/// deeper. This never fails.
	pub fn decode(&mut self, text: &str) -> TreeNode {
		self.detected_unit = match self.indent_unit {
			Some(_) => None,
			None => detect_indent_unit(text),
		};
		let unit = self.indent_unit().to_string();

		// Each frame is an open node whose children may still grow. The root
		// (indent `None`) is never popped because `None` sorts below any level.
		let mut stack = vec![TreeNode::root()];
		let mut lines = 0_usize;

		for raw in text.split(self.line_separator.as_str()) {
			if raw.trim().is_empty() {
				continue;
			}

			let level = read_indent(raw, &unit);
			let payload = raw[level * unit.len()..].trim_end_matches('\r');
			close_frames(&mut stack, Some(level));
			stack.push(TreeNode::with_indent(payload, level));
			lines += 1;
		}

		close_frames(&mut stack, None);
		tracing::debug!(lines, unit = ?unit, "decoded indentation tree");

		stack.pop().unwrap_or_default()
	}

	/// Encode `node` back into text. The root contributes no line of its own;
	/// every other node is written at its depth below the encoded node,
	/// followed by the line separator.
	pub fn encode(&self, node: &TreeNode) -> String {
		let mut output = String::new();

		if node.is_root() {
			for child in node.children() {
				self.encode_into(child, 0, &mut output);
			}
		} else {
			self.encode_into(node, 0, &mut output);
		}

		output
	}

	fn encode_into(&self, node: &TreeNode, depth: usize, output: &mut String) {
		output.push_str(&self.indent_unit().repeat(depth));
		output.push_str(node.content());
		output.push_str(&self.line_separator);

		for child in node.children() {
			self.encode_into(child, depth + 1, output);
		}
	}
}

/// Pop every open frame at `level` or deeper, attaching each popped node to
/// the frame below it. Passing `None` closes everything except the root.
fn close_frames(stack: &mut Vec<TreeNode>, level: Option<usize>) {
	while stack.len() > 1 && stack.last().is_some_and(|frame| frame.indent() >= level) {
		let Some(node) = stack.pop() else {
			break;
		};

		if let Some(parent) = stack.last_mut() {
			parent.attach(node);
		}
	}
}

/// Count how many times `unit` prefixes `line`.
pub fn read_indent(line: &str, unit: &str) -> usize {
	if unit.is_empty() {
		return 0;
	}

	let mut rest = line;
	let mut count = 0;
	while let Some(remaining) = rest.strip_prefix(unit) {
		rest = remaining;
		count += 1;
	}

	count
}

/// Detect the indentation unit from the first indented, non-blank line: a tab
/// when it starts with one, otherwise its run of leading spaces.
pub fn detect_indent_unit(text: &str) -> Option<String> {
	text.lines()
		.filter(|line| !line.trim().is_empty())
		.find_map(|line| {
			if line.starts_with('\t') {
				return Some("\t".to_string());
			}

			let spaces = line.len() - line.trim_start_matches(' ').len();
			(spaces > 0).then(|| " ".repeat(spaces))
		})
}
