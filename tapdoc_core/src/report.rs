use serde::Deserialize;
use serde::Serialize;

use crate::Dialect;
use crate::IndentCodec;
use crate::TreeNode;

/// Selects the interesting parts of a decoded report.
///
/// Summary lines are always kept so a filtered report still shows its
/// totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportFilter {
	/// Keep failed tests.
	pub fail: bool,
	/// Keep skipped tests.
	pub skip: bool,
	/// Keep todo tests.
	pub todo: bool,
}

impl ReportFilter {
	/// Whether any class of tests is selected. An inactive filter keeps the
	/// whole report.
	pub fn is_active(&self) -> bool {
		self.fail || self.skip || self.todo
	}

	fn matches(&self, node: &TreeNode, dialect: &Dialect) -> bool {
		let view = dialect.view(node);

		view.is_footer()
			|| (self.fail && view.is_fail())
			|| (self.skip && view.is_skip())
			|| (self.todo && view.is_todo())
	}

	/// Build a new root holding every matching node of `root`, searched in
	/// document order. A matching node is copied with its whole subtree, so
	/// the diagnostics nested under a failure come along.
	pub fn apply(&self, root: &TreeNode, dialect: &Dialect) -> TreeNode {
		if !self.is_active() {
			return root.clone();
		}

		let mut filtered = TreeNode::root();
		self.collect(root, dialect, &mut filtered);
		tracing::debug!(
			kept = filtered.children().len(),
			dialect = dialect.name(),
			"filtered report"
		);

		filtered
	}

	fn collect(&self, node: &TreeNode, dialect: &Dialect, filtered: &mut TreeNode) {
		for child in node.children() {
			if self.matches(child, dialect) {
				filtered.add(child.clone());
			} else {
				self.collect(child, dialect, filtered);
			}
		}
	}
}

/// The output format of a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
	/// The report text as is.
	#[default]
	Txt,
	/// A fenced `txt` markdown block.
	Md,
	/// An escaped `<pre>` element.
	Html,
}

impl ReportFormat {
	/// Render `root` with two-space indentation in this format.
	pub fn render(self, root: &TreeNode) -> String {
		let text = IndentCodec::new().encode(root);

		match self {
			Self::Txt => text,
			Self::Md => format!("```txt\n{}\n```", text.trim_end()),
			Self::Html => format!("<pre>{}</pre>", html_escape::encode_text(text.trim_end())),
		}
	}
}
