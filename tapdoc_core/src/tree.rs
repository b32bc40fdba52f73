use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::IndentCodec;

/// An ordered, rooted tree of text-bearing nodes.
///
/// Every decoded report is a synthetic root (no content, no indentation)
/// holding one child per top-level line. Each node records the indentation
/// level it was attached at, and a child's level is always strictly greater
/// than its parent's. Levels of siblings are not required to be contiguous.
///
/// ```rust
/// use tapdoc_core::TreeNode;
///
/// let mut root = TreeNode::root();
/// let subtest = root.add(TreeNode::new("# Subtest: math"));
/// subtest.add(TreeNode::new("ok 1 - adds"));
///
/// assert_eq!(root.children().len(), 1);
/// assert_eq!(root.children()[0].children()[0].indent(), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
	content: String,
	indent: Option<usize>,
	children: Vec<TreeNode>,
}

impl TreeNode {
	/// Create the synthetic root of a tree.
	pub fn root() -> Self {
		Self::default()
	}

	/// Create a detached node. Its indentation is assigned when it is added
	/// to a parent.
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			indent: Some(0),
			children: vec![],
		}
	}

	/// Create a node at an explicit indentation level. Used by decoders which
	/// already know the level of the line the node came from.
	pub(crate) fn with_indent(content: impl Into<String>, indent: usize) -> Self {
		Self {
			content: content.into(),
			indent: Some(indent),
			children: vec![],
		}
	}

	pub fn content(&self) -> &str {
		&self.content
	}

	/// The indentation level recorded when the node was attached. `None`
	/// only for the root.
	pub fn indent(&self) -> Option<usize> {
		self.indent
	}

	pub fn children(&self) -> &[TreeNode] {
		&self.children
	}

	pub fn is_root(&self) -> bool {
		self.indent.is_none()
	}

	pub fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}

	/// Append `child` as the last child and return a mutable reference to it.
	///
	/// The indentation of the inserted subtree is recomputed relative to this
	/// node so the recorded levels never go stale.
	pub fn add(&mut self, mut child: TreeNode) -> &mut TreeNode {
		child.reindent(self.child_indent());
		self.attach(child)
	}

	/// Append an already-leveled child without recomputing its indentation.
	pub(crate) fn attach(&mut self, child: TreeNode) -> &mut TreeNode {
		debug_assert!(child.indent > self.indent, "child must be deeper than its parent");
		self.children.push(child);
		let last = self.children.len() - 1;
		&mut self.children[last]
	}

	fn child_indent(&self) -> usize {
		self.indent.map_or(0, |indent| indent + 1)
	}

	fn reindent(&mut self, indent: usize) {
		self.indent = Some(indent);
		for child in &mut self.children {
			child.reindent(indent + 1);
		}
	}

	/// All nodes of the tree in document (pre-)order, starting with `self`.
	pub fn flat(&self) -> Vec<&TreeNode> {
		let mut nodes = vec![self];
		for child in &self.children {
			nodes.extend(child.flat());
		}
		nodes
	}

	/// Find the first child matching `predicate`. When `recursive` is set the
	/// whole subtree is searched in document order.
	pub fn find<F>(&self, predicate: F, recursive: bool) -> Option<&TreeNode>
	where
		F: Fn(&TreeNode) -> bool,
	{
		if recursive {
			self.flat().into_iter().skip(1).find(|node| predicate(*node))
		} else {
			self.children.iter().find(|node| predicate(*node))
		}
	}

	/// Collect every child matching `predicate`. When `recursive` is set the
	/// whole subtree is searched in document order.
	pub fn filter<F>(&self, predicate: F, recursive: bool) -> Vec<&TreeNode>
	where
		F: Fn(&TreeNode) -> bool,
	{
		if recursive {
			self.flat()
				.into_iter()
				.skip(1)
				.filter(|node| predicate(*node))
				.collect()
		} else {
			self.children.iter().filter(|node| predicate(*node)).collect()
		}
	}
}

impl fmt::Display for TreeNode {
	/// Renders the tree with the default two-space indentation.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&IndentCodec::new().encode(self))
	}
}
