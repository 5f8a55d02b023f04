use std::rc::Rc;

use crate::{
    ast::{Expr, Param, UnaryOp},
    error::ParseError,
    interpreter::{
        lexer::{Pos, Token},
        parser::core::{describe, Parser, PREC_LOWEST, PREC_UNARY},
    },
};

impl Parser {
    /// Parses the expression starting at the current token.
    pub(crate) fn parse_prefix(&mut self) -> Option<Rc<Expr>> {
        let pos = self.cur().pos;
        match self.cur_token().clone() {
            Token::Ident(name) => Some(Rc::new(Expr::Ident { name, pos })),
            Token::Number(value) => self.parse_number(value, pos),
            Token::Str(value) => Some(Rc::new(Expr::Str { value, pos })),
            Token::True => Some(Rc::new(Expr::Bool { value: true, pos })),
            Token::False => Some(Rc::new(Expr::Bool { value: false, pos })),
            Token::Null => Some(Rc::new(Expr::Null { pos })),
            Token::Na => Some(Rc::new(Expr::Na { pos })),
            Token::LParen => self.parse_grouped(),
            Token::LBrace => self.parse_block(pos),
            Token::If => self.parse_if(pos),
            Token::For => self.parse_for(pos),
            Token::While => self.parse_while(pos),
            Token::Repeat => self.parse_repeat(pos),
            Token::Break => Some(Rc::new(Expr::Break { pos })),
            Token::Next => Some(Rc::new(Expr::Next { pos })),
            Token::Return => self.parse_return(pos),
            Token::Function => self.parse_function(pos),
            Token::Plus | Token::Minus | Token::Bang => {
                let op = match self.cur_token() {
                    Token::Plus => UnaryOp::Plus,
                    Token::Minus => UnaryOp::Minus,
                    _ => UnaryOp::Not,
                };
                self.next();
                self.skip_separators_cur();
                let operand = self.parse_expression(PREC_UNARY)?;
                Some(Rc::new(Expr::Unary { op, operand, pos }))
            },
            other => {
                self.error(ParseError::UnexpectedToken { token: describe(&other),
                                                         line:  pos.line, });
                None
            },
        }
    }

    /// Builds a number literal; the integer/double split is decided by the
    /// literal text (`.`, `e` or `E` make it a double).
    fn parse_number(&mut self, value: f64, pos: Pos) -> Option<Rc<Expr>> {
        let text = self.cur().text.clone();
        let is_int = !text.contains(['.', 'e', 'E']);
        Some(Rc::new(Expr::Number { text,
                                    value,
                                    is_int,
                                    pos }))
    }

    /// `( expr )` — the parentheses only group.
    fn parse_grouped(&mut self) -> Option<Rc<Expr>> {
        self.next();
        self.skip_separators_cur();
        let expr = self.parse_expression(PREC_LOWEST)?;
        self.expect_peek(&Token::RParen, ")");
        Some(expr)
    }

    /// `{ expr; expr; ... }` — statement sequences separated by newlines
    /// or semicolons.
    fn parse_block(&mut self, pos: Pos) -> Option<Rc<Expr>> {
        let mut exprs = Vec::new();
        self.next();
        self.skip_separators_cur();
        while !matches!(self.cur_token(), Token::RBrace | Token::Eof) {
            if let Some(e) = self.parse_expression(PREC_LOWEST) {
                exprs.push(e);
            }
            while !matches!(self.cur_token(),
                            Token::Eof | Token::RBrace | Token::Newline | Token::Semi)
            {
                self.next();
            }
            self.skip_separators_cur();
        }
        if !matches!(self.cur_token(), Token::RBrace) {
            let line = self.cur().pos.line;
            let found = describe(self.cur_token());
            self.error(ParseError::ExpectedToken { expected: "}".to_string(),
                                                   found,
                                                   line });
        }
        Some(Rc::new(Expr::Block { exprs, pos }))
    }

    /// `if (cond) then [else alt]`. The `else` may sit on the next line;
    /// the lookahead only commits to consuming separators when an `else`
    /// actually follows them.
    fn parse_if(&mut self, pos: Pos) -> Option<Rc<Expr>> {
        if !self.expect_peek(&Token::LParen, "(") {
            return None;
        }
        self.next();
        self.skip_separators_cur();
        let cond = self.parse_expression(PREC_LOWEST)?;
        if !self.expect_peek(&Token::RParen, ")") {
            return None;
        }
        self.next();
        self.skip_separators_cur();
        let then_branch = self.parse_expression(PREC_LOWEST)?;

        let mut has_else = false;
        if matches!(self.peek_token(), Token::Else) {
            self.next();
            has_else = true;
        } else if matches!(self.peek_token(), Token::Newline | Token::Semi) {
            let save = self.pos;
            self.skip_separators_peek();
            if matches!(self.peek_token(), Token::Else) {
                self.next();
                has_else = true;
            } else {
                self.pos = save;
            }
        }

        let else_branch = if has_else {
            // The current token is `else`.
            self.next();
            self.skip_separators_cur();
            Some(self.parse_expression(PREC_LOWEST)?)
        } else {
            None
        };

        Some(Rc::new(Expr::If { cond,
                                then_branch,
                                else_branch,
                                pos }))
    }

    /// `for (var in seq) body`.
    fn parse_for(&mut self, pos: Pos) -> Option<Rc<Expr>> {
        if !self.expect_peek(&Token::LParen, "(") {
            return None;
        }
        self.next();
        self.skip_separators_cur();
        let Token::Ident(var) = self.cur_token().clone() else {
            let line = self.cur().pos.line;
            let found = describe(self.cur_token());
            self.error(ParseError::ExpectedToken { expected: "identifier in for()".to_string(),
                                                   found,
                                                   line });
            return None;
        };
        if !self.expect_peek(&Token::In, "in") {
            return None;
        }
        self.next();
        self.skip_separators_cur();
        let seq = self.parse_expression(PREC_LOWEST)?;
        if !self.expect_peek(&Token::RParen, ")") {
            return None;
        }
        self.next();
        self.skip_separators_cur();
        let body = self.parse_expression(PREC_LOWEST)?;
        Some(Rc::new(Expr::For { var, seq, body, pos }))
    }

    /// `while (cond) body`.
    fn parse_while(&mut self, pos: Pos) -> Option<Rc<Expr>> {
        if !self.expect_peek(&Token::LParen, "(") {
            return None;
        }
        self.next();
        self.skip_separators_cur();
        let cond = self.parse_expression(PREC_LOWEST)?;
        if !self.expect_peek(&Token::RParen, ")") {
            return None;
        }
        self.next();
        self.skip_separators_cur();
        let body = self.parse_expression(PREC_LOWEST)?;
        Some(Rc::new(Expr::While { cond, body, pos }))
    }

    /// `repeat body`.
    fn parse_repeat(&mut self, pos: Pos) -> Option<Rc<Expr>> {
        self.next();
        self.skip_separators_cur();
        let body = self.parse_expression(PREC_LOWEST)?;
        Some(Rc::new(Expr::Repeat { body, pos }))
    }

    /// `return` or `return(expr)`.
    fn parse_return(&mut self, pos: Pos) -> Option<Rc<Expr>> {
        if !matches!(self.peek_token(), Token::LParen) {
            return Some(Rc::new(Expr::Return { value: None, pos }));
        }
        self.next();
        self.next();
        self.skip_separators_cur();
        if matches!(self.cur_token(), Token::RParen) {
            return Some(Rc::new(Expr::Return { value: None, pos }));
        }
        let value = self.parse_expression(PREC_LOWEST)?;
        self.expect_peek(&Token::RParen, ")");
        Some(Rc::new(Expr::Return { value: Some(value), pos }))
    }

    /// `function(params) body`. Parameters use `=` for defaults and may
    /// include a `...` parameter in any position.
    fn parse_function(&mut self, pos: Pos) -> Option<Rc<Expr>> {
        if !self.expect_peek(&Token::LParen, "(") {
            return None;
        }
        let mut params = Vec::new();
        self.next();
        self.skip_separators_cur();
        while !matches!(self.cur_token(), Token::RParen | Token::Eof) {
            match self.cur_token().clone() {
                Token::Ident(name) if name == "..." => {
                    params.push(Param { name,
                                        default: None,
                                        dots: true });
                    self.next();
                },
                Token::Ident(name) => {
                    let mut default = None;
                    if matches!(self.peek_token(), Token::Assign) {
                        self.next();
                        self.next();
                        self.skip_separators_cur();
                        default = Some(self.parse_expression(PREC_LOWEST)?);
                        // Step past the end of the default so the current
                        // token is the comma or ')' for the next iteration.
                        self.next();
                    } else {
                        self.next();
                    }
                    params.push(Param { name,
                                        default,
                                        dots: false });
                },
                Token::Comma => {
                    self.next();
                    self.skip_separators_cur();
                    continue;
                },
                other => {
                    self.error(ParseError::BadParameter { token: describe(&other),
                                                          line:  self.cur().pos.line, });
                    return None;
                },
            }
            if matches!(self.cur_token(), Token::Comma) {
                self.next();
                self.skip_separators_cur();
            } else if matches!(self.cur_token(), Token::RParen) {
                break;
            }
        }
        if !matches!(self.cur_token(), Token::RParen) {
            let line = self.cur().pos.line;
            let found = describe(self.cur_token());
            self.error(ParseError::ExpectedToken { expected: ") to close parameter list"
                                                                                        .to_string(),
                                                   found,
                                                   line });
            return None;
        }
        self.next();
        self.skip_separators_cur();
        let body = self.parse_expression(PREC_LOWEST)?;
        Some(Rc::new(Expr::Function { params, body, pos }))
    }
}
