use std::rc::Rc;

use crate::{
    ast::{Arg, AssignOp, BinaryOp, Expr},
    error::ParseError,
    interpreter::{
        lexer::{Pos, Token},
        parser::core::{describe, precedence, Parser, PREC_ASSIGN, PREC_LOWEST, PREC_PIPE},
    },
};

/// The binary operator a token denotes in infix position, if any.
const fn binary_op_of(token: &Token) -> Option<BinaryOp> {
    Some(match token {
             Token::Plus => BinaryOp::Add,
             Token::Minus => BinaryOp::Sub,
             Token::Star => BinaryOp::Mul,
             Token::Slash => BinaryOp::Div,
             Token::Caret => BinaryOp::Pow,
             Token::Mod => BinaryOp::Mod,
             Token::IntDiv => BinaryOp::IntDiv,
             Token::InOp => BinaryOp::In,
             Token::Colon => BinaryOp::Seq,
             Token::Lt => BinaryOp::Lt,
             Token::Le => BinaryOp::Le,
             Token::Gt => BinaryOp::Gt,
             Token::Ge => BinaryOp::Ge,
             Token::Eq => BinaryOp::Eq,
             Token::Ne => BinaryOp::Ne,
             Token::And => BinaryOp::And,
             Token::AndAnd => BinaryOp::AndAnd,
             Token::Or => BinaryOp::Or,
             Token::OrOr => BinaryOp::OrOr,
             _ => return None,
         })
}

/// Whether an expression may stand on the left of `<-`, `=` or `<<-` (or
/// on the right of `->`): a plain identifier, a bracket index on an
/// identifier, or `$` on an identifier.
fn is_assign_target(expr: &Expr) -> bool {
    match expr {
        Expr::Ident { .. } => true,
        Expr::Index { target, .. } | Expr::Dollar { target, .. } => {
            matches!(&**target, Expr::Ident { .. })
        },
        _ => false,
    }
}

impl Parser {
    /// Continues the expression `left` with the infix construct at the
    /// current token.
    pub(crate) fn parse_infix(&mut self, left: Rc<Expr>) -> Option<Rc<Expr>> {
        let pos = self.cur().pos;
        let token = self.cur_token().clone();

        if let Some(op) = binary_op_of(&token) {
            let prec = precedence(&token);
            // `^` is right-associative.
            let right_prec = if matches!(token, Token::Caret) {
                prec - 1
            } else {
                prec
            };
            self.next();
            self.skip_separators_cur();
            let right = self.parse_expression(right_prec)?;
            return Some(Rc::new(Expr::Binary { op, left, right, pos }));
        }

        match token {
            Token::Pipe => self.parse_pipe(left, pos),
            Token::LeftAssign => self.parse_assign(left, AssignOp::Left, pos),
            Token::Assign => self.parse_assign(left, AssignOp::Eq, pos),
            Token::SuperAssign => self.parse_assign(left, AssignOp::Super, pos),
            Token::RightAssign => self.parse_assign(left, AssignOp::Right, pos),
            Token::LParen => self.parse_call(left, pos),
            Token::LBracket => self.parse_index(left, false, pos),
            Token::LDBracket => self.parse_index(left, true, pos),
            Token::Dollar => self.parse_dollar(left, pos),
            other => {
                self.error(ParseError::UnexpectedToken { token: describe(&other),
                                                         line:  pos.line, });
                None
            },
        }
    }

    /// `lhs |> rhs`, rewritten at parse time: a call on the right gains the
    /// left side as its first positional argument, anything else becomes
    /// `rhs(lhs)`.
    fn parse_pipe(&mut self, left: Rc<Expr>, pos: Pos) -> Option<Rc<Expr>> {
        self.next();
        self.skip_separators_cur();
        let right = self.parse_expression(PREC_PIPE)?;
        if let Expr::Call { callee, args, .. } = &*right {
            let mut new_args = Vec::with_capacity(args.len() + 1);
            new_args.push(Arg { name:  None,
                                value: left, });
            new_args.extend(args.iter().cloned());
            return Some(Rc::new(Expr::Call { callee: callee.clone(),
                                             args: new_args,
                                             pos }));
        }
        Some(Rc::new(Expr::Call { callee: right,
                                  args: vec![Arg { name:  None,
                                                   value: left, }],
                                  pos }))
    }

    /// Any of the four assignment operators. Targets are validated here:
    /// only identifiers, bracket indexes on identifiers and `$` on
    /// identifiers are assignable, and `value -> name` requires a plain
    /// identifier on the right.
    fn parse_assign(&mut self, left: Rc<Expr>, op: AssignOp, pos: Pos) -> Option<Rc<Expr>> {
        // Right-associative: parse the right side one level looser.
        self.next();
        self.skip_separators_cur();
        let right = self.parse_expression(PREC_ASSIGN - 1)?;

        if matches!(op, AssignOp::Right) {
            if !matches!(&*right, Expr::Ident { .. }) {
                self.error(ParseError::InvalidAssignTarget { line: pos.line });
                return None;
            }
            // Normalized so the target is always on the target side.
            return Some(Rc::new(Expr::Assign { op,
                                               target: right,
                                               value: left,
                                               pos }));
        }

        if !is_assign_target(&left) {
            self.error(ParseError::InvalidAssignTarget { line: pos.line });
            return None;
        }
        Some(Rc::new(Expr::Assign { op,
                                    target: left,
                                    value: right,
                                    pos }))
    }

    /// A call argument list: comma-separated positional and `name = value`
    /// arguments, with stray commas tolerated.
    fn parse_call(&mut self, callee: Rc<Expr>, pos: Pos) -> Option<Rc<Expr>> {
        let mut args = Vec::new();
        self.next();
        self.skip_separators_cur();

        if matches!(self.cur_token(), Token::RParen) {
            return Some(Rc::new(Expr::Call { callee, args, pos }));
        }

        while !matches!(self.cur_token(), Token::RParen | Token::Eof) {
            self.skip_separators_cur();
            if matches!(self.cur_token(), Token::Comma) {
                self.next();
                self.skip_separators_cur();
                continue;
            }

            let named = if let Token::Ident(name) = self.cur_token().clone() {
                if matches!(self.peek_token(), Token::Assign) {
                    self.next();
                    self.next();
                    self.skip_separators_cur();
                    Some(name)
                } else {
                    None
                }
            } else {
                None
            };
            let value = self.parse_expression(PREC_LOWEST)?;
            args.push(Arg { name: named, value });

            if matches!(self.peek_token(), Token::Comma) {
                self.next();
                self.next();
                continue;
            }
            if matches!(self.peek_token(), Token::RParen) {
                self.next();
                break;
            }
            if matches!(self.peek_token(), Token::Eof) {
                break;
            }
            let line = self.peek().pos.line;
            let found = describe(self.peek_token());
            self.error(ParseError::ExpectedToken { expected: "',' or ')'".to_string(),
                                                   found,
                                                   line });
            self.next();
        }

        if !matches!(self.cur_token(), Token::RParen) {
            if matches!(self.peek_token(), Token::RParen) {
                self.next();
            } else {
                let line = self.cur().pos.line;
                let found = describe(self.cur_token());
                self.error(ParseError::ExpectedToken { expected: ") to close call".to_string(),
                                                       found,
                                                       line });
            }
        }
        Some(Rc::new(Expr::Call { callee, args, pos }))
    }

    /// `x[expr]` or `x[[expr]]`.
    fn parse_index(&mut self, target: Rc<Expr>, double: bool, pos: Pos) -> Option<Rc<Expr>> {
        self.next();
        self.skip_separators_cur();
        let index = self.parse_expression(PREC_LOWEST)?;
        if double {
            self.expect_peek(&Token::RDBracket, "]]");
        } else {
            self.expect_peek(&Token::RBracket, "]");
        }
        Some(Rc::new(Expr::Index { target,
                                   index,
                                   double,
                                   pos }))
    }

    /// `x$name`, where the member may also be written as a string.
    fn parse_dollar(&mut self, target: Rc<Expr>, pos: Pos) -> Option<Rc<Expr>> {
        self.next();
        self.skip_separators_cur();
        let member = match self.cur_token().clone() {
            Token::Ident(name) => name,
            Token::Str(s) => s,
            other => {
                self.error(ParseError::ExpectedToken { expected: "name after $".to_string(),
                                                       found:    describe(&other),
                                                       line:     pos.line, });
                return None;
            },
        };
        Some(Rc::new(Expr::Dollar { target, member, pos }))
    }
}
