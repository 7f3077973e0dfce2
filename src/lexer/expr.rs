//! Expression-level tokenizer
//!
//! The line scanner only splits on whitespace. When the parser needs finer
//! tokens for an expression it re-splits the raw argument words here.

/// Characters that always form a token of their own
fn is_structural(c: char) -> bool {
    matches!(c, '[' | ']' | '|' | '(' | ')' | ':' | '：')
}

pub fn is_colon(s: &str) -> bool {
    s == ":" || s == "："
}

/// Split raw argument words into expression tokens.
///
/// ``` ``quoted text`` ``` runs stay whole, delimiters included.
pub fn tokenize_expression<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let joined = args
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    split_expr_text(&joined)
}

fn split_expr_text(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if rest.starts_with("``") {
            if let Some(end) = rest[2..].find("``") {
                split_structural(&current, &mut tokens);
                current.clear();
                let len = end + 4;
                tokens.push(rest[..len].to_string());
                i += len;
                continue;
            }
            // Unterminated: the backtick is ordinary text
            current.push('`');
            i += 1;
            continue;
        }

        let Some(c) = rest.chars().next() else {
            break;
        };
        if c == ' ' || c == '\t' {
            split_structural(&current, &mut tokens);
            current.clear();
        } else {
            current.push(c);
        }
        i += c.len_utf8();
    }

    split_structural(&current, &mut tokens);
    tokens
}

/// Split one whitespace-free word at structural characters:
/// `"[1"` → `["[", "1"]`, `"映["` → `["映", "["]`, `"key:"` → `["key", ":"]`
fn split_structural(word: &str, out: &mut Vec<String>) {
    let mut current = String::new();
    for c in word.chars() {
        if is_structural(c) {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            out.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
}
