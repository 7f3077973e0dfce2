//! Python code generator
//!
//! Walks a [`Program`] flow by flow and emits Python source. Indentation is
//! a simple depth counter: block openers indent after their header, block
//! terminators dedent, and a continuation keyword (`elif`, `else`,
//! `except`, `finally`) dedents on its own when no terminator came first.

use super::options::GeneratorOptions;
use super::CodeGenerator;
use crate::errors::{CatError, CatResult};
use crate::lexer::keyword;
use crate::parser::{is_identifier, Action, Expr, Line, Program, Stmt, UnaryOp};

/// Name of the runtime helper behind index assignment
const INDEX_SET_HELPER: &str = "_catapillar_index_set";

/// Python code generator
pub struct PythonGenerator {
    options: GeneratorOptions,
    /// Current indentation level
    indent: usize,
    /// Whether the previous statement was a block terminator
    last_was_block_end: bool,
    /// Generated lines, without terminators
    lines: Vec<String>,
}

impl PythonGenerator {
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            options,
            indent: 0,
            last_was_block_end: false,
            lines: Vec::new(),
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Indentation depth reached at the end of the last generation
    pub fn depth(&self) -> usize {
        self.indent
    }

    fn writeln(&mut self, s: &str) {
        let mut line = self.options.indent.repeat(self.indent);
        line.push_str(s);
        self.lines.push(line);
    }

    fn indent(&mut self) {
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a block header and open its body
    fn header(&mut self, s: &str) {
        self.writeln(s);
        self.indent();
    }

    /// Generate the runtime helper functions
    fn generate_runtime(&mut self) {
        self.writeln(&format!(
            "def {}(name, container, index, value):",
            INDEX_SET_HELPER
        ));
        self.indent();
        self.writeln("if isinstance(container, str) or not hasattr(container, \"__setitem__\"):");
        self.indent();
        self.writeln(
            "raise TypeError(f\"cannot assign by index into {name}: \
             {type(container).__name__} is not a list or map\")",
        );
        self.dedent();
        self.writeln("container[index] = value");
        self.dedent();
        self.writeln("");
    }

    fn generate_program(&mut self, program: &Program) -> CatResult<()> {
        for flow in &program.flows {
            for segment in &flow.segments {
                for stmt in &segment.stmts {
                    self.generate_stmt(stmt)?;
                }
            }
        }
        Ok(())
    }

    fn generate_stmt(&mut self, stmt: &Stmt) -> CatResult<()> {
        match stmt {
            Stmt::Line(line) => {
                if line.action.word().continues_block() && !self.last_was_block_end {
                    self.dedent();
                }
                self.generate_line(line)?;
                self.last_was_block_end = false;
            }
            Stmt::Block { .. } => {
                self.last_was_block_end = false;
            }
            Stmt::BlockEnd { .. } => {
                self.dedent();
                self.last_was_block_end = true;
            }
            Stmt::Arrow(_) => {}
        }
        Ok(())
    }

    fn generate_line(&mut self, line: &Line) -> CatResult<()> {
        match &line.action {
            Action::Set { name, value } => {
                // An unknown bare word reaches here as an unquoted string
                let value = match value {
                    Expr::Ident { name: word }
                    | Expr::Str {
                        value: word,
                        quoted: false,
                    } if self.options.is_zero_arg_call(word) =>
                    {
                        format!("{}()", word)
                    }
                    _ => self.generate_expr(value),
                };
                self.writeln(&format!("{} = {}", name, value));
            }
            Action::IndexSet {
                container,
                index,
                value,
            } => {
                let index = self.generate_expr(index);
                let value = self.generate_expr(value);
                let stmt = if self.options.runtime_helpers {
                    format!(
                        "{}({}, {}, {}, {})",
                        INDEX_SET_HELPER,
                        py_repr(container),
                        container,
                        index,
                        value
                    )
                } else {
                    format!("{}[{}] = {}", container, index, value)
                };
                self.writeln(&stmt);
            }
            Action::Print { value } => {
                let value = value
                    .as_ref()
                    .map(|v| self.generate_expr(v))
                    .unwrap_or_default();
                self.writeln(&format!("print({})", value));
            }
            Action::If { condition } => {
                let cond = self.generate_expr(condition);
                self.header(&format!("if {}:", cond));
            }
            Action::Elif { condition } => {
                let cond = self.generate_expr(condition);
                self.header(&format!("elif {}:", cond));
            }
            Action::Else => self.header("else:"),
            Action::While { condition } => {
                let cond = self.generate_expr(condition);
                self.header(&format!("while {}:", cond));
            }
            Action::For { var, iterable } => {
                let iterable = self.generate_expr(iterable);
                self.header(&format!("for {} in {}:", var, iterable));
            }
            Action::Def { name, params } => {
                self.header(&format!("def {}({}):", name, params.join(", ")));
            }
            Action::Return { value } => match value {
                Some(value) => {
                    let value = self.generate_expr(value);
                    self.writeln(&format!("return {}", value));
                }
                None => self.writeln("return"),
            },
            Action::Call { func, args } => {
                let args: Vec<String> = args.iter().map(|a| self.generate_expr(a)).collect();
                self.writeln(&format!("{}({})", func, args.join(", ")));
            }
            Action::Global { names } => {
                if names.is_empty() {
                    return Err(CatError::codegen(
                        "GLOBAL expects at least one name",
                        Some(line.span),
                    ));
                }
                self.writeln(&format!("global {}", names.join(", ")));
            }
            Action::Break => self.writeln("break"),
            Action::Continue => self.writeln("continue"),
            Action::Pass => self.writeln("pass"),
            Action::Try => self.header("try:"),
            Action::Except { exception } => match exception {
                Some(name) => {
                    let name = self.options.exception_name(name).to_string();
                    self.header(&format!("except {}:", name));
                }
                None => self.header("except:"),
            },
            Action::Finally => self.header("finally:"),
            Action::Arith { op, args } => {
                let [result, left, right] = args.as_slice() else {
                    return Err(CatError::codegen(
                        format!(
                            "{} expects 3 arguments: result left right, got {}",
                            line.action.word(),
                            args.len()
                        ),
                        Some(line.span),
                    ));
                };
                self.writeln(&format!(
                    "{} = {} {} {}",
                    result,
                    legacy_value(left),
                    op.symbol(),
                    legacy_value(right)
                ));
            }
        }
        Ok(())
    }

    fn generate_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Number { value } => value.clone(),
            Expr::Bool { value } => if *value { "True" } else { "False" }.to_string(),
            Expr::None => "None".to_string(),
            Expr::Ident { name } => name.clone(),
            Expr::Str { value, .. } => format!("\"{}\"", escape_py_string(value)),
            Expr::Binary { op, left, right } => format!(
                "({} {} {})",
                self.generate_expr(left),
                op,
                self.generate_expr(right)
            ),
            Expr::Unary { op, operand } => {
                let operand = self.generate_expr(operand);
                match op {
                    UnaryOp::Not => format!("(not {})", operand),
                    UnaryOp::Neg | UnaryOp::Plus => format!("({}{})", op.as_str(), operand),
                }
            }
            Expr::List { elements } => {
                let elements: Vec<String> = elements.iter().map(|e| self.generate_expr(e)).collect();
                format!("[{}]", elements.join(", "))
            }
            Expr::Dict { entries } => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|entry| {
                        let key = match &entry.key {
                            Expr::Ident { name } => format!("\"{}\"", escape_py_string(name)),
                            key => self.generate_expr(key),
                        };
                        format!("{}: {}", key, self.generate_expr(&entry.value))
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            Expr::Index { container, index } => format!(
                "{}[{}]",
                self.generate_expr(container),
                self.generate_expr(index)
            ),
            Expr::Call { func, args } => {
                let args: Vec<String> = args.iter().map(|a| self.generate_expr(a)).collect();
                format!("{}({})", func, args.join(", "))
            }
        }
    }
}

impl Default for PythonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for PythonGenerator {
    fn generate(&mut self, program: &Program) -> CatResult<String> {
        self.indent = 0;
        self.last_was_block_end = false;
        self.lines.clear();

        let needs_helper = self.options.runtime_helpers
            && program
                .statements()
                .any(|stmt| matches!(stmt, Stmt::Line(Line { action: Action::IndexSet { .. }, .. })));
        if needs_helper {
            self.generate_runtime();
        }

        self.generate_program(program)?;
        tracing::debug!(lines = self.lines.len(), depth = self.indent, "python generated");

        let mut output = self.lines.join("\n");
        if self.options.trailing_newline && !output.is_empty() {
            output.push('\n');
        }
        Ok(output)
    }
}

/// A raw word of the standalone arithmetic form, as a Python operand
fn legacy_value(word: &str) -> String {
    if word == "True" || keyword::is_true(word) {
        return "True".to_string();
    }
    if word == "False" || keyword::is_false(word) {
        return "False".to_string();
    }
    if word == "None" {
        return "None".to_string();
    }
    if word.parse::<f64>().is_ok() || is_identifier(word) {
        return word.to_string();
    }
    format!("\"{}\"", escape_py_string(word))
}

/// Python `repr` of a name: single-quoted
fn py_repr(s: &str) -> String {
    let mut result = String::from("'");
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            _ => result.push(c),
        }
    }
    result.push('\'');
    result
}

fn escape_py_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn generate_with(source: &str, options: GeneratorOptions) -> (String, usize) {
        let program = Parser::new(source).parse().unwrap();
        let mut generator = PythonGenerator::with_options(options);
        let code = generator.generate(&program).unwrap();
        (code, generator.depth())
    }

    fn generate(source: &str) -> String {
        generate_with(source, GeneratorOptions::default()).0
    }

    #[test]
    fn test_set_number() {
        assert_eq!(generate("set x 5"), "x = 5");
    }

    #[test]
    fn test_if_block_returns_to_depth_zero() {
        let (code, depth) = generate_with(
            "置 x 5\nif x > 3:\nprint x\n终",
            GeneratorOptions::default(),
        );
        assert_eq!(code, "x = 5\nif (x > 3):\n    print(x)");
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_list_and_dict_literals() {
        assert_eq!(generate("置 xs [ 1 | 2 | 3 ]"), "xs = [1, 2, 3]");
        assert_eq!(
            generate("置 m map[ a : 1 | b : 2 ]"),
            "m = {\"a\": 1, \"b\": 2}"
        );
    }

    #[test]
    fn test_dict_identifier_keys_are_quoted() {
        assert_eq!(
            generate("置 k 1\n置 m [ k : 2 ]"),
            "k = 1\nm = {\"k\": 2}"
        );
    }

    #[test]
    fn test_try_except_finally_implicit_dedent() {
        let (code, depth) = generate_with(
            "试:\n置 x 1 / 0\n捕 零除错误:\n印 bad\nfinally:\n印 done\n终",
            GeneratorOptions::default(),
        );
        assert_eq!(
            code,
            "try:\n    x = (1 / 0)\nexcept ZeroDivisionError:\n    print(\"bad\")\nfinally:\n    print(\"done\")"
        );
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_explicit_terminator_before_continuation() {
        let (code, depth) = generate_with(
            "置 x 1\n若 x 是 1:\n印 one\n终\n否则:\n印 other\n终",
            GeneratorOptions::default(),
        );
        assert_eq!(
            code,
            "x = 1\nif (x == 1):\n    print(\"one\")\nelse:\n    print(\"other\")"
        );
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_elif_chain_without_terminators() {
        let (code, depth) = generate_with(
            "置 n 2\n若 n < 1:\n印 a\n又若 n < 3:\n印 b\n否则:\n印 c\n终",
            GeneratorOptions::default(),
        );
        assert_eq!(
            code,
            "n = 2\nif (n < 1):\n    print(\"a\")\nelif (n < 3):\n    print(\"b\")\nelse:\n    print(\"c\")"
        );
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_nested_blocks() {
        let (code, depth) = generate_with(
            "定 f n:\n扭扭 i 在 n:\n若 i > 1:\n断\n终\n终\n回 n\n终\n调 f 3",
            GeneratorOptions::default(),
        );
        assert_eq!(
            code,
            "def f(n):\n    for i in n:\n        if (i > 1):\n            break\n    return n\nf(3)"
        );
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_extra_terminators_saturate() {
        let (code, depth) = generate_with("终\n终\n印 1", GeneratorOptions::default());
        assert_eq!(code, "print(1)");
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_arrows_and_blocks_emit_nothing() {
        assert_eq!(generate("main:\na -> b\n印 main"), "print(main)");
    }

    #[test]
    fn test_zero_arg_calls() {
        assert_eq!(generate("置 n 读数"), "n = 读数()");
        assert_eq!(generate("置 n input"), "n = input()");
        let options = GeneratorOptions::default().with_zero_arg_call("now");
        assert_eq!(generate_with("置 t now", options).0, "t = now()");
    }

    #[test]
    fn test_quoted_string_is_never_a_call() {
        assert_eq!(generate("置 s ``input``"), "s = \"input\"");
        assert_eq!(generate("置 s ``读数``"), "s = \"读数\"");
    }

    #[test]
    fn test_unmapped_exception_passes_through() {
        assert_eq!(
            generate("试:\n空\n捕 KeyError\n空\n终"),
            "try:\n    pass\nexcept KeyError:\n    pass"
        );
        assert_eq!(generate("try:\npass\nexcept\npass\nend"), "try:\n    pass\nexcept:\n    pass");
    }

    #[test]
    fn test_index_set_emits_helper() {
        let code = generate("置 xs [1|2]\n置 xs [ 0 ] 5");
        let lines: Vec<&str> = code.lines().collect();
        assert_eq!(lines[0], "def _catapillar_index_set(name, container, index, value):");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "xs = [1, 2]");
        assert_eq!(lines[6], "_catapillar_index_set('xs', xs, 0, 5)");
    }

    #[test]
    fn test_index_set_without_helpers() {
        let options = GeneratorOptions::default().with_runtime_helpers(false);
        assert_eq!(
            generate_with("置 xs [1|2]\n置 xs [ 0 ] 5", options).0,
            "xs = [1, 2]\nxs[0] = 5"
        );
    }

    #[test]
    fn test_no_helper_without_index_set() {
        assert!(!generate("置 x 1").contains(INDEX_SET_HELPER));
    }

    #[test]
    fn test_print_forms() {
        assert_eq!(generate("印"), "print()");
        assert_eq!(generate("印 ``a \"b\"``"), "print(\"a \\\"b\\\"\")");
        assert_eq!(generate("印 真"), "print(True)");
        assert_eq!(generate("印 无"), "print(None)");
    }

    #[test]
    fn test_unary_and_logic() {
        assert_eq!(
            generate("置 a 1\n置 b 非 a 且 - a < 0"),
            "a = 1\nb = ((not a) and ((-a) < 0))"
        );
    }

    #[test]
    fn test_index_and_call_expressions() {
        assert_eq!(
            generate("置 m [1|2]\n置 i 0\n置 v m [ i ]\n置 n ( len m ) * 2\n回 m [ 0 ]"),
            "m = [1, 2]\ni = 0\nv = m[i]\nn = (len(m) * 2)\nreturn m[0]"
        );
    }

    #[test]
    fn test_global_and_loop_control() {
        assert_eq!(
            generate("全局 a b\n当 真:\n续\n终"),
            "global a, b\nwhile True:\n    continue"
        );
    }

    #[test]
    fn test_legacy_arithmetic() {
        assert_eq!(generate("加 r 1 2"), "r = 1 + 2");
        assert_eq!(generate("除 r x 真"), "r = x / True");
        assert_eq!(generate("乘 r a b-c"), "r = a * \"b-c\"");
    }

    #[test]
    fn test_legacy_arithmetic_arity() {
        let program = Parser::new("加 r 1").parse().unwrap();
        let err = PythonGenerator::new().generate(&program).unwrap_err();
        assert!(matches!(err, CatError::CodeGen { .. }));
        assert!(err.to_string().contains("ADD expects 3 arguments"));
    }

    #[test]
    fn test_empty_global_fails() {
        let program = Parser::new("全局").parse().unwrap();
        assert!(PythonGenerator::new().generate(&program).is_err());
    }

    #[test]
    fn test_options_shape_output() {
        let options = GeneratorOptions::default()
            .with_indent("  ")
            .with_trailing_newline(true);
        assert_eq!(
            generate_with("若 真:\n印 1\n终", options).0,
            "if True:\n  print(1)\n"
        );
    }

    #[test]
    fn test_generation_is_repeatable() {
        let program = Parser::new("定 f a:\n回 a * 2\n终\n印 f").parse().unwrap();
        let mut generator = PythonGenerator::new();
        let first = generator.generate(&program).unwrap();
        let second = generator.generate(&program).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_escape_py_string() {
        assert_eq!(escape_py_string("a\\b\"c\nd\te\r"), "a\\\\b\\\"c\\nd\\te\\r");
        assert_eq!(py_repr("it's"), "'it\\'s'");
    }
}
