use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TapdocError {
	#[error(transparent)]
	#[diagnostic(code(tapdoc::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tapdoc::config_parse),
		help("check that tapdoc.toml is valid TOML with [report], [docs] and/or [dataset] sections")
	)]
	ConfigParse(String),

	#[error("unknown report dialect: `{0}`")]
	#[diagnostic(
		code(tapdoc::unknown_dialect),
		help("available dialects: node_test, vitest")
	)]
	UnknownDialect(String),

	#[error("unknown footer counter: `{0}`")]
	#[diagnostic(
		code(tapdoc::unknown_counter),
		help("available counters: tests, suites, pass, fail, cancelled, skipped, todo, duration")
	)]
	UnknownCounter(String),

	#[error("the indentation unit must not be empty")]
	#[diagnostic(
		code(tapdoc::empty_indent_unit),
		help("use a non-empty unit such as `\"  \"`, `\"    \"` or `\"\\t\"`, or omit it to auto-detect")
	)]
	EmptyIndentUnit,

	#[error("failed to serialize dataset: {0}")]
	#[diagnostic(code(tapdoc::serialize))]
	Serialize(String),
}

pub type TapdocResult<T> = Result<T, TapdocError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
