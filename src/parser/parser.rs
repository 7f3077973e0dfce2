//! Statement parser for Catapillar
//!
//! Turns line tokens into a [`Program`]. Each line is dispatched on its
//! action word; expressions inside it are handed to the expression parser
//! together with the names declared so far.

use super::ast::*;
use super::expr::{
    parse_condition, parse_print_value, parse_set_value, strip_trailing_colon, try_parse_full,
    ExprParser,
};
use super::names::KnownNames;
use crate::errors::{CatError, CatResult, Diagnostic, SourceSpan};
use crate::lexer::{keyword, tokenize_expression, ActionWord, Lexer, LineToken};

/// The parser for Catapillar source code
pub struct Parser {
    /// Line tokens from the lexer
    tokens: Vec<LineToken>,
    /// Non-fatal diagnostics from the lexer, then the parser's own
    diagnostics: Vec<Diagnostic>,
    /// Open blocks, innermost last. `None` is a named flow block.
    blocks: Vec<Option<ActionWord>>,
    /// Line and span of the last line seen
    last_line: Option<(usize, SourceSpan)>,
    /// Names visible as variables so far
    known: KnownNames,
    program: Program,
    flow: Flow,
    segment: Segment,
}

impl Parser {
    /// Create a new parser for the given source code
    pub fn new(source: &str) -> Self {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        Self::from_tokens(tokens, diagnostics)
    }

    /// Create a parser over tokens that were lexed elsewhere
    pub fn from_tokens(tokens: Vec<LineToken>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            tokens,
            diagnostics,
            blocks: Vec::new(),
            last_line: None,
            known: KnownNames::new(),
            program: Program::default(),
            flow: Flow::default(),
            segment: Segment::default(),
        }
    }

    /// Diagnostics reported so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Parse the source code into an AST
    pub fn parse(self) -> CatResult<Program> {
        self.parse_with_diagnostics().map(|(program, _)| program)
    }

    /// Parse, also returning the non-fatal diagnostics
    pub fn parse_with_diagnostics(mut self) -> CatResult<(Program, Vec<Diagnostic>)> {
        let tokens = std::mem::take(&mut self.tokens);
        for token in tokens {
            self.last_line = Some((token.line, token.span));
            self.parse_line(token)?;
        }

        if !self.blocks.is_empty()
            && let Some((line, span)) = self.last_line
        {
            let message = format!(
                "unclosed block(s): expected {} more '终/end' statement(s)",
                self.blocks.len()
            );
            tracing::warn!(line, "{message}");
            self.diagnostics.push(Diagnostic::new(message, line, span));
        }

        self.flush_segment();
        if !self.flow.segments.is_empty() {
            let flow = std::mem::take(&mut self.flow);
            tracing::debug!(segments = flow.segments.len(), "flow closed");
            self.program.flows.push(flow);
        }

        Ok((self.program, self.diagnostics))
    }

    // ==================== Line dispatch ====================

    fn parse_line(&mut self, token: LineToken) -> CatResult<()> {
        tracing::trace!(line = token.line, action = %token.action, state = %token.state, "line");

        if keyword::is_block_end(&token.action) {
            self.close_block(&token);
            self.segment.stmts.push(Stmt::BlockEnd {
                state: token.state,
                pictograph: token.pictograph,
            });
            return Ok(());
        }

        if let Some(arrow) = parse_arrow(&token)? {
            self.segment.stmts.push(Stmt::Arrow(arrow));
            self.end_line(&token);
            return Ok(());
        }

        if token.args.is_empty()
            && let Some(name) = token.action.strip_suffix(':')
        {
            let name = name.to_string();
            return self.parse_header(&name, token);
        }

        let Some(word) = ActionWord::parse(&token.action) else {
            return Err(CatError::parser(
                format!("unknown action '{}'", token.action),
                token.span,
            ));
        };

        let action = self.parse_action(word, &token.args, token.span)?;
        self.declare(&action);
        if word.opens_block() {
            self.open_block(Some(word));
        }

        let line = Line {
            action,
            state: token.state,
            pictograph: token.pictograph.clone(),
            line: token.line,
            span: token.span,
        };
        self.segment.stmts.push(Stmt::Line(line));
        self.end_line(&token);
        Ok(())
    }

    /// `name:` on its own line
    fn parse_header(&mut self, name: &str, token: LineToken) -> CatResult<()> {
        if let Some(word) = keyword::header_action(name) {
            let action = match word {
                ActionWord::Else => Action::Else,
                ActionWord::Try => Action::Try,
                _ => Action::Finally,
            };
            self.open_block(Some(word));
            self.segment.stmts.push(Stmt::Line(Line {
                action,
                state: token.state,
                pictograph: token.pictograph,
                line: token.line,
                span: token.span,
            }));
            return Ok(());
        }

        if name.is_empty() {
            return Err(CatError::parser("block header without a name", token.span));
        }

        self.known.declare(name);
        self.open_block(None);
        self.segment.stmts.push(Stmt::Block {
            name: name.to_string(),
            state: token.state,
        });
        Ok(())
    }

    // ==================== Block balance ====================

    /// A continuation replaces the branch it follows instead of nesting
    fn open_block(&mut self, word: Option<ActionWord>) {
        if let Some(word) = word
            && let Some(Some(top)) = self.blocks.last()
            && word.follows(*top)
        {
            self.blocks.pop();
        }
        self.blocks.push(word);
    }

    fn close_block(&mut self, token: &LineToken) {
        if self.blocks.pop().is_none() {
            let message = format!(
                "block end '{}' without a matching block opener",
                token.action
            );
            tracing::warn!(line = token.line, "{message}");
            self.diagnostics
                .push(Diagnostic::new(message, token.line, token.span));
        }
    }

    /// An `Advance` glyph closes the segment the line was appended to
    fn end_line(&mut self, token: &LineToken) {
        if token.state.is_segment_break() {
            tracing::debug!(line = token.line, "segment break");
            self.flush_segment();
        }
    }

    fn flush_segment(&mut self) {
        if self.segment.stmts.is_empty() {
            return;
        }
        let segment = std::mem::take(&mut self.segment);
        tracing::debug!(stmts = segment.stmts.len(), "segment closed");
        self.flow.segments.push(segment);
    }

    /// Record the names a line makes visible to the lines after it
    fn declare(&mut self, action: &Action) {
        match action {
            Action::Set { name, .. } => self.known.declare(name.as_str()),
            Action::IndexSet { container, .. } => self.known.declare(container.as_str()),
            Action::For { var, .. } => self.known.declare(var.as_str()),
            Action::Def { name, params } => {
                self.known.declare(name.as_str());
                for param in params {
                    self.known.declare(param.as_str());
                }
            }
            _ => {}
        }
    }

    // ==================== Actions ====================

    fn parse_action(
        &self,
        word: ActionWord,
        args: &[String],
        span: SourceSpan,
    ) -> CatResult<Action> {
        let known = &self.known;
        let action = match word {
            ActionWord::Set => self.parse_set(args, span)?,
            ActionWord::Print => Action::Print {
                value: parse_print_value(args, known, span)?,
            },
            ActionWord::If => Action::If {
                condition: parse_condition(args, known, span)?,
            },
            ActionWord::Elif => Action::Elif {
                condition: parse_condition(args, known, span)?,
            },
            ActionWord::While => Action::While {
                condition: parse_condition(args, known, span)?,
            },
            ActionWord::For => self.parse_for(args, span)?,
            ActionWord::Def => {
                let mut names = args
                    .iter()
                    .map(|a| a.trim_end_matches(':'))
                    .filter(|a| !a.is_empty())
                    .map(str::to_string);
                let Some(name) = names.next() else {
                    return Err(CatError::parser("DEF expects a function name", span));
                };
                Action::Def {
                    name,
                    params: names.collect(),
                }
            }
            ActionWord::Return => Action::Return {
                value: if args.is_empty() {
                    None
                } else {
                    Some(parse_or_ident(args, known, span)?)
                },
            },
            ActionWord::Call => {
                let Some((func, rest)) = args.split_first() else {
                    return Err(CatError::parser("CALL expects a function name", span));
                };
                let args = rest
                    .iter()
                    .map(|a| parse_or_ident(std::slice::from_ref(a), known, span))
                    .collect::<CatResult<Vec<_>>>()?;
                Action::Call {
                    func: func.clone(),
                    args,
                }
            }
            ActionWord::Global => Action::Global {
                names: args.to_vec(),
            },
            ActionWord::Except => Action::Except {
                exception: strip_trailing_colon(args).into_iter().next(),
            },
            ActionWord::Else => Action::Else,
            ActionWord::Try => Action::Try,
            ActionWord::Finally => Action::Finally,
            ActionWord::Break => Action::Break,
            ActionWord::Continue => Action::Continue,
            ActionWord::Pass => Action::Pass,
            ActionWord::Add => arith(ArithOp::Add, args),
            ActionWord::Sub => arith(ArithOp::Sub, args),
            ActionWord::Mul => arith(ArithOp::Mul, args),
            ActionWord::Div => arith(ArithOp::Div, args),
        };
        Ok(action)
    }

    /// `置 name value...` or `置 container [ index ] value...`
    fn parse_set(&self, args: &[String], span: SourceSpan) -> CatResult<Action> {
        let tokens = tokenize_expression(args);
        let Some(name) = tokens.first() else {
            return Err(CatError::parser("SET expects arguments", span));
        };

        if let Some(close) = index_target_close(&tokens) {
            let index_tokens = &tokens[2..close];
            let mut index_parser = ExprParser::new(index_tokens, &self.known, span);
            let index = index_parser.parse_expression(true)?;
            if !index_parser.is_at_end() {
                return Err(CatError::parser(
                    format!("invalid index: {}", index_tokens.join(" ")),
                    span,
                ));
            }
            let value = parse_set_value(&tokens[close + 1..], &self.known, span)?;
            return Ok(Action::IndexSet {
                container: name.clone(),
                index,
                value,
            });
        }

        let value = if tokens.len() > 1 {
            parse_set_value(&tokens[1..], &self.known, span)?
        } else {
            Expr::None
        };
        Ok(Action::Set {
            name: name.clone(),
            value,
        })
    }

    /// `扭扭 var in iterable...`
    fn parse_for(&self, args: &[String], span: SourceSpan) -> CatResult<Action> {
        let [var, in_word, rest @ ..] = args else {
            return Err(CatError::parser("FOR expects: variable IN iterable", span));
        };
        if rest.is_empty() {
            return Err(CatError::parser("FOR expects: variable IN iterable", span));
        }
        if !keyword::is_in_keyword(in_word) {
            return Err(CatError::parser(
                format!("FOR expects IN keyword, got '{}'", in_word),
                span,
            ));
        }

        let iterable = strip_trailing_colon(rest);
        if iterable.is_empty() {
            return Err(CatError::parser("FOR is missing its iterable", span));
        }

        Ok(Action::For {
            var: var.clone(),
            iterable: parse_or_ident(&iterable, &self.known, span)?,
        })
    }
}

fn arith(op: ArithOp, args: &[String]) -> Action {
    Action::Arith {
        op,
        args: args.to_vec(),
    }
}

/// Full parse in value context, else an identifier spelled by the words
fn parse_or_ident(args: &[String], known: &KnownNames, span: SourceSpan) -> CatResult<Expr> {
    Ok(match try_parse_full(args, true, known, span)? {
        Some(node) => node,
        None => Expr::ident(args.join(" ")),
    })
}

/// For `name [ ... ] value...`, the position of the `]` closing the index
fn index_target_close(tokens: &[String]) -> Option<usize> {
    if tokens.len() < 5 || tokens[1] != "[" {
        return None;
    }
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(1) {
        match token.as_str() {
            "[" => depth += 1,
            "]" => {
                depth -= 1;
                if depth == 0 {
                    return (i + 1 < tokens.len()).then_some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `a -> b` / `a <- b`
fn parse_arrow(token: &LineToken) -> CatResult<Option<Arrow>> {
    let markers = token
        .args
        .iter()
        .filter(|a| ArrowDirection::from_marker(a).is_some())
        .count();
    if markers == 0 {
        return Ok(None);
    }
    if markers > 1 {
        return Err(CatError::parser(
            "only one arrow per line is supported",
            token.span,
        ));
    }

    let Some((at, direction)) = token
        .args
        .iter()
        .enumerate()
        .find_map(|(i, a)| ArrowDirection::from_marker(a).map(|d| (i, d)))
    else {
        return Ok(None);
    };

    let source = match at {
        0 => token.action.as_str(),
        _ => token.args[at - 1].as_str(),
    };
    let Some(target) = token.args.get(at + 1).map(String::as_str) else {
        return Err(CatError::parser("arrow is missing its target", token.span));
    };

    let (from, to) = match direction {
        ArrowDirection::Forward => (source, target),
        ArrowDirection::Backward => (target, source),
    };
    Ok(Some(Arrow {
        from: from.to_string(),
        to: to.to_string(),
        direction,
        state: token.state,
    }))
}
