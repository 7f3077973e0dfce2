//! End-to-end tests: Catapillar source in, Python out.
//!
//! Generated code is checked with inline snapshots. Run `cargo insta review`
//! to update them after intentional changes.

use catapillar::{
    compile, format_source, parse_source, transpile, CatError, GeneratorOptions, LineState,
    Program,
};

fn py(source: &str) -> String {
    transpile(source).expect("transpile failed")
}

// ============================================================================
// Statements
// ============================================================================

mod statements {
    use super::*;

    #[test]
    fn set_number() {
        insta::assert_snapshot!(py("set x 5"), @"x = 5");
    }

    #[test]
    fn if_block_with_known_name() {
        insta::assert_snapshot!(py("置 x 5\nif x > 3:\nprint x\n终"), @r#"
x = 5
if (x > 3):
    print(x)
"#);
    }

    #[test]
    fn list_literal() {
        insta::assert_snapshot!(py("置 xs [ 1 | 2 | 3 ]"), @"xs = [1, 2, 3]");
    }

    #[test]
    fn dict_literal() {
        insta::assert_snapshot!(py("置 m map[ a : 1 | b : 2 ]"), @r#"m = {"a": 1, "b": 2}"#);
    }

    #[test]
    fn try_except_finally_without_terminators() {
        insta::assert_snapshot!(py(
            "试:\n置 r 10 / 0\n捕 零除错误:\n印 ``division by zero``\n终于:\n印 done\n终\n印 after"
        ), @r#"
try:
    r = (10 / 0)
except ZeroDivisionError:
    print("division by zero")
finally:
    print("done")
print("after")
"#);
    }

    #[test]
    fn function_with_loop() {
        insta::assert_snapshot!(py(
            "定 total xs:\n置 s 0\n扭扭 x 在 xs:\n置 s s + x\n终\n回 s\n终\n置 nums [1|2|3]\n调 total nums"
        ), @r#"
def total(xs):
    s = 0
    for x in xs:
        s = (s + x)
    return s
nums = [1, 2, 3]
total(nums)
"#);
    }

    #[test]
    fn while_with_elif_chain() {
        insta::assert_snapshot!(py(
            "置 n 0\n当 n < 10:\n若 n 是 3:\n续\n又若 n > 7:\n断\n否则:\n印 n\n终\n置 n n + 1\n终"
        ), @r#"
n = 0
while (n < 10):
    if (n == 3):
        continue
    elif (n > 7):
        break
    else:
        print(n)
    n = (n + 1)
"#);
    }

    #[test]
    fn index_assignment_uses_runtime_helper() {
        insta::assert_snapshot!(py("置 xs [0|0]\n置 i 1\n置 xs [ i ] 42\n印 xs"), @r#"
def _catapillar_index_set(name, container, index, value):
    if isinstance(container, str) or not hasattr(container, "__setitem__"):
        raise TypeError(f"cannot assign by index into {name}: {type(container).__name__} is not a list or map")
    container[index] = value

xs = [0, 0]
i = 1
_catapillar_index_set('xs', xs, i, 42)
print(xs)
"#);
    }

    #[test]
    fn japanese_and_english_spellings_mix() {
        insta::assert_snapshot!(py("set xs [1|2]\n回す v 中 xs:\nprint v\nend"), @r#"
xs = [1, 2]
for v in xs:
    print(v)
"#);
    }

    #[test]
    fn pictographs_and_state_glyphs_are_annotations() {
        insta::assert_snapshot!(py("🐛 置 x 1\n> (^_^) 印 x\n? 印 x\n© 印 x\n! ° 印 x"), @r#"
x = 1
print(x)
print(x)
print(x)
print(x)
"#);
    }
}

// ============================================================================
// Expressions
// ============================================================================

mod expressions {
    use super::*;

    #[test]
    fn arithmetic_precedence_is_made_explicit() {
        insta::assert_snapshot!(py("置 r 1 + 2 * 3 - 4 / 2"), @"r = ((1 + (2 * 3)) - (4 / 2))");
    }

    #[test]
    fn grouping_parentheses() {
        insta::assert_snapshot!(py("置 a 1\n置 r ( a + 2 ) * 3"), @r#"
a = 1
r = ((a + 2) * 3)
"#);
    }

    #[test]
    fn logic_ladder() {
        insta::assert_snapshot!(
            py("置 a 真\n置 b 假\n置 r 非 a 或 b 且 a"),
            @r#"
a = True
b = False
r = ((not a) or (b and a))
"#
        );
    }

    #[test]
    fn nested_collections() {
        insta::assert_snapshot!(
            py("置 m 映[ k : [1|2] | j : 映[ z : 无 ] ]"),
            @r#"m = {"k": [1, 2], "j": {"z": None}}"#
        );
    }

    #[test]
    fn strings_are_escaped() {
        insta::assert_snapshot!(py(r#"印 ``say "hi" \ bye``"#), @r#"print("say \"hi\" \\ bye")"#);
    }

    #[test]
    fn quoted_call_name_stays_a_string() {
        insta::assert_snapshot!(py("置 a input\n置 b ``input``"), @r#"
a = input()
b = "input"
"#);
    }

    #[test]
    fn unknown_words_print_as_text() {
        insta::assert_snapshot!(py("印 hello world"), @r#"print("hello world")"#);
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;

    #[test]
    fn parsing_and_generation_are_deterministic() {
        let source = "定 f a b:\n若 a > b:\n回 a\n否则:\n回 b\n终\n终\n置 m 映[ x : 1 ]\n印 f 1 2";
        assert_eq!(parse_source(source).unwrap(), parse_source(source).unwrap());
        assert_eq!(py(source), py(source));
    }

    #[test]
    fn names_resolve_only_after_declaration() {
        let names = ["a", "b", "总数", "値"];
        let mut source = String::new();
        for name in names {
            source.push_str(&format!("印 {name}\n置 {name} 1\n印 {name}\n"));
        }

        let expected: Vec<String> = names
            .iter()
            .flat_map(|name| {
                [
                    format!("print(\"{name}\")"),
                    format!("{name} = 1"),
                    format!("print({name})"),
                ]
            })
            .collect();
        assert_eq!(py(&source), expected.join("\n"));
    }

    #[test]
    fn nesting_returns_to_top_level() {
        let sources = [
            "若 真:\n当 真:\n断\n终\n终\n印 top",
            "若 真:\n空\n又若 假:\n空\n否则:\n空\n终\n印 top",
            "试:\n空\n捕\n空\n终于:\n空\n终\n印 top",
            "试:\n空\n终\n捕 其他错误:\n空\n终\n印 top",
        ];
        for source in sources {
            let code = py(source);
            assert_eq!(code.lines().last(), Some("print(\"top\")"), "{source}");
        }
    }

    #[test]
    fn formatting_does_not_change_output() {
        let source = "定 f n:\n若 n < 2:\n回 n\n终\n回 f n - 1\n终\n印 f 5\n";
        let formatted = format_source(source, "    ");
        assert_ne!(formatted, source);
        assert_eq!(py(&formatted), py(source));
    }
}

// ============================================================================
// Errors and diagnostics
// ============================================================================

mod diagnostics {
    use super::*;
    use catapillar::errors::format_error;

    #[test]
    fn unknown_action_names_the_word() {
        let err = transpile("置 x 1\nfrobnicate x").unwrap_err();
        assert!(matches!(err, CatError::Parser { .. }));
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn grouping_parentheses_around_a_name() {
        let source = "置 x 1\n印 ( x )";
        let err = transpile(source).unwrap_err();
        assert!(err.is_grouping());
        let report = format_error(source, &err);
        assert!(report.contains("parentheses are only for expression grouping"));
    }

    #[test]
    fn inline_comment_is_reported_not_fatal() {
        let compiled = compile("印 1 # trailing\n印 2", &GeneratorOptions::default()).unwrap();
        assert_eq!(compiled.code, "print(1)\nprint(2)");
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].line, 1);
        assert!(compiled.diagnostics[0].message.contains("inline comments"));
    }

    #[test]
    fn unclosed_block_comment_is_reported() {
        let compiled = compile("印 1\n~~\n印 2", &GeneratorOptions::default()).unwrap();
        assert_eq!(compiled.code, "print(1)");
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].line, 2);
    }

    #[test]
    fn block_balance_is_reported() {
        let compiled = compile(
            "若 真:\n印 1\n终\n终\n若 真:\n印 2",
            &GeneratorOptions::default(),
        )
        .unwrap();
        let found: Vec<_> = compiled
            .diagnostics
            .iter()
            .map(|d| (d.line, d.message.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                (4, "block end '终' without a matching block opener"),
                (6, "unclosed block(s): expected 1 more '终/end' statement(s)"),
            ]
        );
    }

    #[test]
    fn legacy_arithmetic_arity_is_a_generation_error() {
        let err = transpile("减 r 1 2 3").unwrap_err();
        assert!(matches!(err, CatError::CodeGen { .. }));
    }
}

// ============================================================================
// Configuration and AST
// ============================================================================

mod config {
    use super::*;

    #[test]
    fn options_from_toml() {
        let options = GeneratorOptions::from_toml(
            r#"
indent = "  "
trailing_newline = true
runtime_helpers = false
zero_arg_calls = ["now"]

[exception_names]
"键错误" = "KeyError"
"#,
        )
        .unwrap();

        let compiled = compile(
            "置 t now\n置 xs [1]\n置 xs [ 0 ] t\n试:\n空\n捕 键错误:\n空\n终",
            &options,
        )
        .unwrap();
        insta::assert_snapshot!(compiled.code.trim_end(), @r#"
t = now()
xs = [1]
xs[0] = t
try:
  pass
except KeyError:
  pass
"#);
        assert!(compiled.code.ends_with('\n'));
    }
}

mod ast {
    use super::*;

    #[test]
    fn arrows_are_exposed() {
        let program: Program = parse_source("load -> clean\n> report <- clean\n印 ok").unwrap();
        let edges: Vec<_> = program
            .arrows()
            .map(|a| (a.from.as_str(), a.to.as_str(), a.state))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("load", "clean", LineState::Continue),
                ("clean", "report", LineState::Advance),
            ]
        );
        assert_eq!(program.flows[0].segments.len(), 2);
    }

    #[test]
    fn ast_json() {
        insta::assert_json_snapshot!(parse_source("置 x 1 + 2").unwrap(), @r#"
{
  "flows": [
    {
      "segments": [
        {
          "stmts": [
            {
              "type": "Line",
              "action": {
                "action": "Set",
                "name": "x",
                "value": {
                  "type": "Binary",
                  "op": "Add",
                  "left": {
                    "type": "Number",
                    "value": "1"
                  },
                  "right": {
                    "type": "Number",
                    "value": "2"
                  }
                }
              },
              "state": "Continue",
              "pictograph": null,
              "line": 1
            }
          ]
        }
      ]
    }
  ]
}
"#);
    }
}
