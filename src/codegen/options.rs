//! Generator configuration
//!
//! Every field has a default, so a TOML file only needs the keys it
//! changes:
//!
//! ```toml
//! indent = "  "
//! trailing_newline = true
//! zero_arg_calls = ["input", "读数"]
//!
//! [exception_names]
//! "零除错误" = "ZeroDivisionError"
//! ```

use crate::errors::CatResult;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Options controlling the shape of generated Python
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// One level of indentation
    pub indent: String,
    /// End the output with a newline
    pub trailing_newline: bool,
    /// Emit the `_catapillar_index_set` helper when an index assignment needs it
    pub runtime_helpers: bool,
    /// Names that become a call when they are the whole value of an assignment
    /// (`置 n 读数` → `n = 读数()`)
    pub zero_arg_calls: BTreeSet<String>,
    /// Localized exception names and their Python spelling.
    /// Names missing here pass through unchanged.
    pub exception_names: BTreeMap<String, String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            trailing_newline: false,
            runtime_helpers: true,
            zero_arg_calls: ["读数", "读运算符", "input", "float", "int", "str"]
                .into_iter()
                .map(String::from)
                .collect(),
            exception_names: [
                ("零除错误", "ZeroDivisionError"),
                ("其他错误", "Exception"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

impl GeneratorOptions {
    /// Parse options from TOML text
    pub fn from_toml(text: &str) -> CatResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> CatResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_trailing_newline(mut self, enabled: bool) -> Self {
        self.trailing_newline = enabled;
        self
    }

    pub fn with_runtime_helpers(mut self, enabled: bool) -> Self {
        self.runtime_helpers = enabled;
        self
    }

    pub fn with_zero_arg_call(mut self, name: impl Into<String>) -> Self {
        self.zero_arg_calls.insert(name.into());
        self
    }

    pub fn with_exception_name(
        mut self,
        localized: impl Into<String>,
        python: impl Into<String>,
    ) -> Self {
        self.exception_names.insert(localized.into(), python.into());
        self
    }

    /// Python spelling of an exception name
    pub fn exception_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.exception_names
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    pub fn is_zero_arg_call(&self, name: &str) -> bool {
        self.zero_arg_calls.contains(name)
    }
}
