//! Statement parsing for procedural blocks.
//!
//! **`<=` disambiguation:** the target of an assignment is parsed as an
//! lvalue (name, bit select or concatenation) first. If `=` follows it is a
//! blocking assignment, if `<=` follows it is non-blocking. Inside
//! expressions `<=` is a comparison handled by the Pratt parser.

use crate::ast::*;
use crate::parser::VerilogParser;
use crate::token::VerilogToken;

impl VerilogParser<'_> {
    /// Parses a single statement.
    pub fn parse_statement(&mut self) -> Statement {
        match self.current() {
            VerilogToken::Begin => self.parse_begin_end_block(),
            VerilogToken::If => self.parse_if_statement(),
            VerilogToken::At => self.parse_event_control(),
            VerilogToken::Hash => {
                let start = self.current_span();
                self.advance();
                self.parse_delay_value();
                let body = self.parse_statement();
                Statement::Other {
                    kind: "delay".to_string(),
                    span: start.merge(body.span()),
                }
            }
            VerilogToken::Case | VerilogToken::Casex | VerilogToken::Casez => {
                let start = self.current_span();
                self.skip_region();
                Statement::Other {
                    kind: "case".to_string(),
                    span: start.merge(self.prev_span()),
                }
            }
            VerilogToken::SystemIdentifier => {
                let start = self.current_span();
                self.skip_to_semicolon();
                Statement::Other {
                    kind: "system task call".to_string(),
                    span: start.merge(self.prev_span()),
                }
            }
            VerilogToken::Semicolon => {
                let span = self.current_span();
                self.advance();
                Statement::Null { span }
            }
            VerilogToken::Attribute => {
                self.advance();
                self.parse_statement()
            }
            VerilogToken::Identifier | VerilogToken::LeftBrace => self.parse_assignment(),
            _ => {
                let span = self.current_span();
                self.expected("statement");
                self.advance();
                self.recover_to_semicolon();
                Statement::Error(span)
            }
        }
    }

    /// Parses `begin [: label] {stmt} end`.
    fn parse_begin_end_block(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(VerilogToken::Begin);
        let label = if self.eat(VerilogToken::Colon) {
            Some(self.expect_ident())
        } else {
            None
        };
        let mut stmts = Vec::new();
        while !self.at(VerilogToken::End) && !self.at_eof() {
            stmts.push(self.parse_statement());
        }
        self.expect(VerilogToken::End);
        Statement::Block {
            label,
            stmts,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `if (cond) stmt [else stmt]`.
    fn parse_if_statement(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(VerilogToken::If);
        self.expect(VerilogToken::LeftParen);
        let condition = self.parse_expr();
        self.expect(VerilogToken::RightParen);
        let then_stmt = Box::new(self.parse_statement());
        let else_stmt = if self.eat(VerilogToken::Else) {
            Some(Box::new(self.parse_statement()))
        } else {
            None
        };
        Statement::If {
            condition,
            then_stmt,
            else_stmt,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `@(...) stmt`, `@* stmt` or `@name stmt`.
    fn parse_event_control(&mut self) -> Statement {
        let start = self.current_span();
        self.expect(VerilogToken::At);
        let sensitivity = if self.eat(VerilogToken::Star) {
            SensitivityList::Star
        } else if self.eat(VerilogToken::LeftParen) {
            let list = if self.eat(VerilogToken::Star) {
                SensitivityList::Star
            } else {
                SensitivityList::List(self.parse_sensitivity_items())
            };
            self.expect(VerilogToken::RightParen);
            list
        } else {
            let item_start = self.current_span();
            let name = self.expect_ident();
            SensitivityList::List(vec![SensitivityItem {
                edge: None,
                signal: Expr::Identifier {
                    name,
                    span: item_start,
                },
                span: item_start,
            }])
        };
        let body = Box::new(self.parse_statement());
        Statement::EventControl {
            sensitivity,
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `[edge] expr {(or|,) [edge] expr}`.
    fn parse_sensitivity_items(&mut self) -> Vec<SensitivityItem> {
        let mut items = Vec::new();
        loop {
            let start = self.current_span();
            let edge = if self.eat(VerilogToken::Posedge) {
                Some(EdgeKind::Posedge)
            } else if self.eat(VerilogToken::Negedge) {
                Some(EdgeKind::Negedge)
            } else {
                None
            };
            let signal = self.parse_expr();
            items.push(SensitivityItem {
                edge,
                signal,
                span: start.merge(self.prev_span()),
            });
            if !self.eat(VerilogToken::Or) && !self.eat(VerilogToken::Comma) {
                break;
            }
        }
        items
    }

    /// Skips the value after `#`: a number, a name or a parenthesized group.
    fn parse_delay_value(&mut self) {
        if self.at(VerilogToken::LeftParen) {
            self.skip_parens();
        } else {
            self.advance();
        }
    }

    /// Parses `lvalue (= | <=) [#delay] expr ;`.
    fn parse_assignment(&mut self) -> Statement {
        let start = self.current_span();
        let target = self.parse_lvalue();
        let blocking = if self.eat(VerilogToken::Equals) {
            true
        } else if self.eat(VerilogToken::LessEquals) {
            false
        } else {
            self.expected("'=' or '<='");
            self.recover_to_semicolon();
            return Statement::Error(start.merge(self.prev_span()));
        };
        if self.eat(VerilogToken::Hash) {
            self.parse_delay_value();
        }
        let value = self.parse_expr();
        self.expect(VerilogToken::Semicolon);
        let span = start.merge(self.prev_span());
        if blocking {
            Statement::Blocking {
                target,
                value,
                span,
            }
        } else {
            Statement::NonBlocking {
                target,
                value,
                span,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::lex;
    use crate::parser::VerilogParser;
    use degate_diagnostics::DiagnosticSink;

    fn parse_stmt(source: &str) -> Statement {
        let sink = DiagnosticSink::new();
        let tokens = lex(source, &sink);
        let stmt = VerilogParser::new(tokens, source, &sink).parse_statement();
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        stmt
    }

    #[test]
    fn posedge_if_nonblocking() {
        let stmt = parse_stmt("@(posedge clk) if (en) q <= !d;");
        let Statement::EventControl { sensitivity, body, .. } = stmt else {
            panic!("expected event control");
        };
        let SensitivityList::List(items) = sensitivity else {
            panic!("expected list");
        };
        assert_eq!(items[0].edge, Some(EdgeKind::Posedge));
        assert_eq!(items[0].signal.as_identifier(), Some("clk"));
        let Statement::If { condition, then_stmt, else_stmt, .. } = *body else {
            panic!("expected if");
        };
        assert_eq!(condition.as_identifier(), Some("en"));
        assert!(else_stmt.is_none());
        assert!(matches!(*then_stmt, Statement::NonBlocking { .. }));
    }

    #[test]
    fn sensitivity_list_separators() {
        let stmt = parse_stmt("@(posedge clk or negedge rst, a) ;");
        let Statement::EventControl { sensitivity: SensitivityList::List(items), .. } = stmt else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].edge, Some(EdgeKind::Negedge));
        assert_eq!(items[2].edge, None);
    }

    #[test]
    fn star_sensitivity() {
        let stmt = parse_stmt("@(*) y = a;");
        assert!(matches!(
            stmt,
            Statement::EventControl { sensitivity: SensitivityList::Star, .. }
        ));
    }

    #[test]
    fn labeled_block_with_else() {
        let stmt = parse_stmt("begin : blk if (a) x = 1; else x = 0; end");
        let Statement::Block { label, stmts, .. } = stmt else {
            panic!("expected block");
        };
        assert_eq!(label.as_deref(), Some("blk"));
        assert!(matches!(&stmts[0], Statement::If { else_stmt: Some(_), .. }));
    }

    #[test]
    fn case_is_skipped() {
        let stmt = parse_stmt("case (s) 1'b0: y = a; default: y = b; endcase");
        assert_eq!(stmt.kind_name(), "case");
    }

    #[test]
    fn delayed_assignment() {
        let stmt = parse_stmt("q <= #1 d;");
        assert!(matches!(stmt, Statement::NonBlocking { .. }));
    }
}
