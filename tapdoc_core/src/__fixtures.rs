/// A `node --test` report with a nested subtest, a yaml diagnostic block and
/// the trailing summary.
pub fn node_test_report() -> &'static str {
	r"TAP version 13
# Subtest: math
  ok 1 - adds
  not ok 2 - subtracts
    ---
    duration_ms: 0.3
    ...
  1..2
not ok 1 - math
ok 2 - strings # SKIP
ok 3 - later # TODO
1..3
# tests 4
# suites 1
# pass 1
# fail 2
# cancelled 0
# skipped 1
# todo 1
# duration_ms 1_500"
}

/// The same summary as printed by the human readable reporter.
pub fn pretty_reporter_summary() -> &'static str {
	"✔ adds (0.4ms)\n✖ subtracts (0.3ms)\nℹ tests 2\nℹ suites 0\nℹ pass 1\nℹ fail 1\nℹ cancelled \
	 0\nℹ skipped 0\nℹ todo 0\nℹ duration_ms 42.5"
}

/// A test source documenting installation through a nested fenced block.
pub fn install_docs_source() -> &'static str {
	r#"/**
 * @docs
 * # Title
 *
 * ## Installation
 */
it("How to install with npm?", () => {
  /**
   * ```bash
   * npm install x
   * ```
   */
  assert.ok(true)
})
"#
}

pub fn install_docs_markdown() -> &'static str {
	"# Title\n\n## Installation\n\nHow to install with npm?\n```bash\nnpm install x\n```\n"
}

/// A test source whose test body is the example.
pub fn usage_docs_source() -> &'static str {
	r#"/**
 * @docs
 * ## Usage
 */
it("How to add numbers?", () => {
  //import { add } from "./add.js"
  // add two numbers
  const sum = add(1, 2)
  if (sum) {
    console.log(sum)
  }
  assert.equal(sum, 3)
})
"#
}

pub fn usage_docs_markdown() -> &'static str {
	"## Usage\n\nHow to add numbers?\n```js\nimport { add } from \"./add.js\"\n// add two numbers\nconst \
	 sum = add(1, 2)\nif (sum) {\n  console.log(sum)\n}\n```"
}

/// A markdown document with two question/code pairs in different sections.
pub fn package_readme() -> &'static str {
	r"# Package Name

## Installation

Install the package locally.

How to install with npm?

```bash
npm install package-name
```

## API

### createFn(options)

Creates a function with given options.

* **Parameters**
  * `options` – Configuration options.

How to create a function?

```js
const fn = createFn({ retries: 3 })
```
"
}
