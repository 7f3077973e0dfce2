//! Keyword tables for Catapillar
//!
//! Every localized or alias spelling maps to one canonical word. The tables
//! are plain `match` lookups, so there is nothing to register or initialize.

use std::fmt;

/// Canonical action words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ActionWord {
    Print,
    Set,
    Call,
    Def,
    Return,
    If,
    Elif,
    Else,
    While,
    For,
    Break,
    Continue,
    Try,
    Except,
    Finally,
    Pass,
    Global,
    Add,
    Sub,
    Mul,
    Div,
}

impl ActionWord {
    /// Resolve a surface spelling to its canonical action
    pub fn parse(s: &str) -> Option<ActionWord> {
        match s {
            "print" | "印" => Some(ActionWord::Print),
            "set" | "置" => Some(ActionWord::Set),
            "call" | "调" => Some(ActionWord::Call),
            "def" | "定" => Some(ActionWord::Def),
            "return" | "回" => Some(ActionWord::Return),
            "if" | "若" => Some(ActionWord::If),
            "elif" | "又若" => Some(ActionWord::Elif),
            "else" | "否则" => Some(ActionWord::Else),
            "while" | "当" => Some(ActionWord::While),
            "for" | "扭扭" | "回す" => Some(ActionWord::For),
            "break" | "断" => Some(ActionWord::Break),
            "continue" | "续" => Some(ActionWord::Continue),
            "try" | "试" => Some(ActionWord::Try),
            "except" | "捕" => Some(ActionWord::Except),
            "finally" | "终于" => Some(ActionWord::Finally),
            "pass" | "空" => Some(ActionWord::Pass),
            "global" | "全局" | "全" => Some(ActionWord::Global),
            "add" | "加" => Some(ActionWord::Add),
            "sub" | "减" => Some(ActionWord::Sub),
            "mul" | "乘" => Some(ActionWord::Mul),
            "div" | "除" => Some(ActionWord::Div),
            _ => None,
        }
    }

    /// Actions whose line opens an indented body
    pub fn opens_block(self) -> bool {
        matches!(
            self,
            ActionWord::Def
                | ActionWord::If
                | ActionWord::Elif
                | ActionWord::Else
                | ActionWord::While
                | ActionWord::For
                | ActionWord::Try
                | ActionWord::Except
                | ActionWord::Finally
        )
    }

    /// Whether this continuation extends a chain whose current branch is `previous`
    pub fn follows(self, previous: ActionWord) -> bool {
        match self {
            ActionWord::Elif | ActionWord::Else => {
                matches!(previous, ActionWord::If | ActionWord::Elif)
            }
            ActionWord::Except | ActionWord::Finally => {
                matches!(previous, ActionWord::Try | ActionWord::Except)
            }
            _ => false,
        }
    }

    /// Continuation keywords close the previous body and open a new one
    pub fn continues_block(self) -> bool {
        matches!(
            self,
            ActionWord::Elif | ActionWord::Else | ActionWord::Except | ActionWord::Finally
        )
    }
}

impl fmt::Display for ActionWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionWord::Print => "PRINT",
            ActionWord::Set => "SET",
            ActionWord::Call => "CALL",
            ActionWord::Def => "DEF",
            ActionWord::Return => "RETURN",
            ActionWord::If => "IF",
            ActionWord::Elif => "ELIF",
            ActionWord::Else => "ELSE",
            ActionWord::While => "WHILE",
            ActionWord::For => "FOR",
            ActionWord::Break => "BREAK",
            ActionWord::Continue => "CONTINUE",
            ActionWord::Try => "TRY",
            ActionWord::Except => "EXCEPT",
            ActionWord::Finally => "FINALLY",
            ActionWord::Pass => "PASS",
            ActionWord::Global => "GLOBAL",
            ActionWord::Add => "ADD",
            ActionWord::Sub => "SUB",
            ActionWord::Mul => "MUL",
            ActionWord::Div => "DIV",
        };
        write!(f, "{}", s)
    }
}

/// Explicit block terminator (`end`, `终`, ...)
pub fn is_block_end(s: &str) -> bool {
    matches!(s, "end" | "结束" | "完了" | "终" | "終")
}

/// The `in` of `for x in xs`
pub fn is_in_keyword(s: &str) -> bool {
    matches!(s, "in" | "在" | "中")
}

pub fn is_true(s: &str) -> bool {
    matches!(s, "true" | "真")
}

pub fn is_false(s: &str) -> bool {
    matches!(s, "false" | "假" | "偽")
}

pub fn is_none(s: &str) -> bool {
    matches!(s, "none" | "无" | "無")
}

/// Words that turn a following `[` into a dictionary literal
pub fn is_map_prefix(s: &str) -> bool {
    matches!(s, "map" | "映" | "辞")
}

pub fn is_or(s: &str) -> bool {
    matches!(s, "or" | "或")
}

pub fn is_and(s: &str) -> bool {
    matches!(s, "and" | "且")
}

pub fn is_not(s: &str) -> bool {
    matches!(s, "not" | "非")
}

/// Comparison spelling → canonical operator text
pub fn compare_op(s: &str) -> Option<&'static str> {
    match s {
        "==" | "是" => Some("=="),
        "!=" | "不是" => Some("!="),
        ">" => Some(">"),
        "<" => Some("<"),
        ">=" => Some(">="),
        "<=" => Some("<="),
        _ => None,
    }
}

/// Legacy arithmetic words usable as a SET value prefix (`置 x 加 a b`)
pub fn legacy_arith_op(s: &str) -> Option<&'static str> {
    match s {
        "add" | "加" => Some("+"),
        "sub" | "减" => Some("-"),
        "mul" | "乘" => Some("*"),
        "div" | "除" => Some("/"),
        _ => None,
    }
}

/// Spellings of a colon-suffixed bare header (`else:`, `试:`)
pub fn header_action(name: &str) -> Option<ActionWord> {
    match name {
        "else" | "否则" => Some(ActionWord::Else),
        "try" | "试" => Some(ActionWord::Try),
        "finally" | "终于" => Some(ActionWord::Finally),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_one_action() {
        assert_eq!(ActionWord::parse("印"), Some(ActionWord::Print));
        assert_eq!(ActionWord::parse("print"), Some(ActionWord::Print));
        assert_eq!(ActionWord::parse("回す"), Some(ActionWord::For));
        assert_eq!(ActionWord::parse("扭扭"), Some(ActionWord::For));
        assert_eq!(ActionWord::parse("全"), Some(ActionWord::Global));
        assert_eq!(ActionWord::parse("PRINT"), None);
        assert_eq!(ActionWord::parse("frobnicate"), None);
    }

    #[test]
    fn test_block_words() {
        assert!(is_block_end("终"));
        assert!(is_block_end("終"));
        assert!(is_block_end("end"));
        assert!(!is_block_end("end:"));
        assert!(ActionWord::Except.continues_block());
        assert!(ActionWord::Def.opens_block());
        assert!(!ActionWord::Print.opens_block());
    }

    #[test]
    fn test_branch_chains() {
        assert!(ActionWord::Elif.follows(ActionWord::If));
        assert!(ActionWord::Else.follows(ActionWord::Elif));
        assert!(ActionWord::Finally.follows(ActionWord::Except));
        assert!(!ActionWord::Except.follows(ActionWord::If));
        assert!(!ActionWord::If.follows(ActionWord::If));
    }

    #[test]
    fn test_compare_aliases() {
        assert_eq!(compare_op("是"), Some("=="));
        assert_eq!(compare_op("不是"), Some("!="));
        assert_eq!(compare_op(">="), Some(">="));
        assert_eq!(compare_op("="), None);
    }
}
