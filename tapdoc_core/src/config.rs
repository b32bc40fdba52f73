use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::Counter;
use crate::Dialect;
use crate::IndentCodec;
use crate::TapdocError;
use crate::TapdocResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["tapdoc.toml", ".tapdoc.toml", ".config/tapdoc.toml"];

/// Configuration loaded from a `tapdoc.toml` file.
///
/// ```toml
/// [report]
/// indent = "    "
/// dialect = "node_test"
///
/// [report.footer]
/// tests = ["» tests "]
///
/// [docs]
/// marker = "@docs"
/// callees = ["it", "test"]
/// stops = ["assert."]
/// fence_language = "js"
///
/// [dataset]
/// question_prefix = "How "
/// question_suffix = "?"
/// ```
///
/// Every section and field is optional. An empty file is equivalent to
/// [`TapdocConfig::default`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TapdocConfig {
	/// How test reports are decoded and annotated.
	#[serde(default)]
	pub report: ReportConfig,
	/// How documentation is extracted from test sources.
	#[serde(default)]
	pub docs: DocsConfig,
	/// How question/answer pairs are recognised in markdown.
	#[serde(default)]
	pub dataset: DatasetConfig,
}

/// Report decoding configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
	/// The indentation unit of the report. Auto-detected from the first
	/// indented line when absent.
	pub indent: Option<String>,
	/// Name of the built-in dialect: `node_test` or `vitest`.
	pub dialect: String,
	/// Extra footer prefixes merged into the dialect, keyed by counter name.
	pub footer: BTreeMap<String, Vec<String>>,
}

impl Default for ReportConfig {
	fn default() -> Self {
		Self {
			indent: None,
			dialect: Dialect::NODE_TEST.to_string(),
			footer: BTreeMap::new(),
		}
	}
}

impl ReportConfig {
	/// Resolve the configured dialect, including any extra footer prefixes.
	pub fn dialect(&self) -> TapdocResult<Dialect> {
		let mut dialect = Dialect::by_name(&self.dialect)?;

		for (name, prefixes) in &self.footer {
			let counter: Counter = name.parse()?;
			for prefix in prefixes {
				dialect = dialect.with_footer_prefix(counter, prefix.clone());
			}
		}

		Ok(dialect)
	}

	/// Build the indentation codec for this report configuration.
	pub fn codec(&self) -> TapdocResult<IndentCodec> {
		match &self.indent {
			Some(unit) => IndentCodec::with_indent_unit(unit.clone()),
			None => Ok(IndentCodec::new()),
		}
	}
}

/// Documentation extraction configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocsConfig {
	/// The comment-body token that flags documentation, e.g. `* @docs`.
	/// Followed by `raw` it starts a verbatim capture instead.
	pub marker: String,
	/// Functions whose `callee("description", callback)` calls become
	/// example headings.
	pub callees: Vec<String>,
	/// Line prefixes that end a docs region. The single-line region closer
	/// (`/** @docs */`) always applies in addition to these.
	pub stops: Vec<String>,
	/// Language tag of the fenced block opened for each example.
	pub fence_language: String,
	/// The indentation unit of the source. Auto-detected when absent.
	pub indent: Option<String>,
}

impl Default for DocsConfig {
	fn default() -> Self {
		Self {
			marker: "@docs".to_string(),
			callees: vec!["it".to_string(), "test".to_string()],
			stops: vec!["assert.".to_string()],
			fence_language: "js".to_string(),
			indent: None,
		}
	}
}

impl DocsConfig {
	/// The single-line comment that closes a docs region, e.g.
	/// `/** @docs */`.
	pub fn region_closer(&self) -> String {
		format!("/** {} */", self.marker)
	}

	/// The opening fence emitted for every example.
	pub fn fence(&self) -> String {
		format!("```{}", self.fence_language)
	}
}

/// Dataset generation configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatasetConfig {
	/// Paragraphs starting with this text are candidate questions.
	pub question_prefix: String,
	/// Candidate questions must end with this text.
	pub question_suffix: String,
	/// Joined with the package label to form the `proven` field.
	pub provenance_prefix: String,
}

impl Default for DatasetConfig {
	fn default() -> Self {
		Self {
			question_prefix: "How ".to_string(),
			question_suffix: "?".to_string(),
			provenance_prefix: "assert-in-".to_string(),
		}
	}
}

impl TapdocConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> TapdocResult<Option<TapdocConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded tapdoc config");

		Ok(Some(config))
	}

	/// Parse a config from TOML text.
	pub fn from_toml(content: &str) -> TapdocResult<TapdocConfig> {
		toml::from_str(content).map_err(|e| TapdocError::ConfigParse(e.to_string()))
	}
}
