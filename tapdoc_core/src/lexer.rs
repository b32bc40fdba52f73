use logos::Logos;
use snailquote::unescape;

/// Raw tokens of the head of a call expression, e.g. `it("adds", () => {`.
/// Only the first four tokens are ever requested, so whatever follows the
/// description (arrow functions, braces) is never lexed.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
enum CallToken {
	#[regex(r"[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*")]
	Callee,
	#[token("(")]
	ParenOpen,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'([^'\\]|\\.)*'")]
	SingleQuotedString,
	#[regex(r"`([^`\\]|\\.)*`")]
	TemplateString,
	#[token(",")]
	Comma,
}

impl CallToken {
	fn is_string(self) -> bool {
		matches!(
			self,
			Self::DoubleQuotedString | Self::SingleQuotedString | Self::TemplateString
		)
	}
}

/// A test-case declaration: `callee("description", callback)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDeclaration {
	pub callee: String,
	pub description: String,
}

/// Recognise a test-case declaration at the start of `line` when its callee
/// is one of `callees`. Anything else, including a call whose first argument
/// is not a quoted string followed by another argument, yields `None`.
pub fn test_declaration<S: AsRef<str>>(line: &str, callees: &[S]) -> Option<TestDeclaration> {
	let mut lexer = CallToken::lexer(line.trim_start());

	let Some(Ok(CallToken::Callee)) = lexer.next() else {
		return None;
	};
	let callee = lexer.slice();
	if !callees.iter().any(|name| name.as_ref() == callee) {
		return None;
	}

	let Some(Ok(CallToken::ParenOpen)) = lexer.next() else {
		return None;
	};

	let token = lexer.next()?.ok()?;
	if !token.is_string() {
		return None;
	}
	let quoted = lexer.slice();

	let Some(Ok(CallToken::Comma)) = lexer.next() else {
		return None;
	};

	Some(TestDeclaration {
		callee: callee.to_string(),
		description: unquote(quoted),
	})
}

/// Strip the surrounding quotes and resolve escapes. Undecodable escapes are
/// kept verbatim.
fn unquote(quoted: &str) -> String {
	let inner = &quoted[1..quoted.len() - 1];

	if inner.contains('\\') {
		unescape(&double_quoted(inner)).unwrap_or_else(|_| inner.to_string())
	} else {
		inner.to_string()
	}
}

/// Rewrite the body of any JS string literal as a double-quoted literal with
/// the same meaning. Escaped `'` and `` ` `` become literal characters and bare
/// `"` gets escaped.
fn double_quoted(inner: &str) -> String {
	let mut output = String::with_capacity(inner.len() + 2);
	let mut chars = inner.chars();
	output.push('"');

	while let Some(c) = chars.next() {
		match c {
			'\\' => {
				match chars.next() {
					Some(escaped @ ('\'' | '`')) => output.push(escaped),
					Some(escaped) => {
						output.push('\\');
						output.push(escaped);
					}
					None => output.push_str("\\\\"),
				}
			}
			'"' => output.push_str("\\\""),
			other => output.push(other),
		}
	}

	output.push('"');
	output
}
