//! Module item parsing: declarations, continuous assignments, `always`
//! blocks and attribute instances.
//!
//! Constructs a flattened netlist never needs to be understood (instances,
//! gate primitives, parameters, `initial` blocks, functions) are skipped as
//! a whole and kept as [`ModuleItem::Other`].

use crate::ast::*;
use crate::parser::VerilogParser;
use crate::token::VerilogToken;

impl VerilogParser<'_> {
    /// Parses module items until `endmodule` or end of file.
    pub(crate) fn parse_module_items(&mut self) -> Vec<ModuleItem> {
        let mut items = Vec::new();
        while !self.at(VerilogToken::Endmodule) && !self.at_eof() {
            self.parse_module_item(&mut items);
        }
        items
    }

    /// Parses one module item; `assign a = x, b = y;` yields one item per
    /// assignment.
    fn parse_module_item(&mut self, items: &mut Vec<ModuleItem>) {
        let token = self.current();
        match token {
            VerilogToken::Input | VerilogToken::Output | VerilogToken::Inout => {
                items.push(ModuleItem::PortDecl(self.parse_port_decl()));
            }
            VerilogToken::Wire
            | VerilogToken::Tri
            | VerilogToken::Supply0
            | VerilogToken::Supply1
            | VerilogToken::Reg => {
                items.push(ModuleItem::NetDecl(self.parse_net_decl()));
            }
            VerilogToken::Assign => self.parse_continuous_assign(items),
            VerilogToken::Always => items.push(ModuleItem::AlwaysBlock(self.parse_always())),
            VerilogToken::Attribute => items.push(ModuleItem::Pragma(self.parse_pragma())),
            VerilogToken::Initial => {
                let from = self.pos;
                let start = self.current_span();
                self.advance();
                self.parse_statement();
                items.push(self.other_item("initial", from, start));
            }
            VerilogToken::Function | VerilogToken::Task | VerilogToken::Generate => {
                let from = self.pos;
                let start = self.current_span();
                self.skip_region();
                let kind = self.text(start).to_string();
                items.push(self.other_item(&kind, from, start));
            }
            VerilogToken::Parameter | VerilogToken::Localparam | VerilogToken::Integer => {
                let from = self.pos;
                let start = self.current_span();
                self.skip_to_semicolon();
                let kind = self.text(start).to_string();
                items.push(self.other_item(&kind, from, start));
            }
            _ if token.is_gate() => {
                let from = self.pos;
                let start = self.current_span();
                self.skip_to_semicolon();
                items.push(self.other_item("gate", from, start));
            }
            VerilogToken::Identifier => {
                let from = self.pos;
                let start = self.current_span();
                self.skip_to_semicolon();
                items.push(self.other_item("instance", from, start));
            }
            VerilogToken::Semicolon => self.advance(),
            _ => {
                let span = self.current_span();
                self.expected("module item");
                self.advance();
                self.recover_to_semicolon();
                items.push(ModuleItem::Error(span));
            }
        }
    }

    fn other_item(&self, kind: &str, from: usize, start: degate_common::Span) -> ModuleItem {
        ModuleItem::Other(OtherItem {
            kind: kind.to_string(),
            attributes: self.identifiers_between(from, self.pos),
            span: start.merge(self.prev_span()),
        })
    }

    /// Parses a body port declaration: `input [range] a, b;`.
    fn parse_port_decl(&mut self) -> PortDecl {
        let start = self.current_span();
        let direction = self.eat_direction().unwrap_or(Direction::Input);
        let net_type = self.eat_net_type();
        self.eat(VerilogToken::Signed);
        let range = self.parse_optional_range();
        let mut names = vec![self.expect_ident()];
        while self.eat(VerilogToken::Comma) {
            names.push(self.expect_ident());
        }
        self.expect(VerilogToken::Semicolon);
        PortDecl {
            direction,
            net_type,
            range,
            names,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `wire|reg [range] name [= init] {, name [= init]};`.
    fn parse_net_decl(&mut self) -> NetDecl {
        let start = self.current_span();
        let net_type = self.eat_net_type().unwrap_or(NetType::Wire);
        self.eat(VerilogToken::Signed);
        let range = self.parse_optional_range();

        let mut names = Vec::new();
        loop {
            let name_start = self.current_span();
            let name = self.expect_ident();
            let init = if self.eat(VerilogToken::Equals) {
                Some(self.parse_expr())
            } else {
                None
            };
            names.push(DeclName {
                name,
                init,
                span: name_start.merge(self.prev_span()),
            });
            if !self.eat(VerilogToken::Comma) {
                break;
            }
        }
        self.expect(VerilogToken::Semicolon);

        NetDecl {
            net_type,
            range,
            names,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses `assign target = value {, target = value};`.
    fn parse_continuous_assign(&mut self, items: &mut Vec<ModuleItem>) {
        self.expect(VerilogToken::Assign);
        loop {
            let start = self.current_span();
            let target = self.parse_lvalue();
            self.expect(VerilogToken::Equals);
            let value = self.parse_expr();
            items.push(ModuleItem::ContinuousAssign(ContinuousAssign {
                target,
                value,
                span: start.merge(self.prev_span()),
            }));
            if !self.eat(VerilogToken::Comma) {
                break;
            }
        }
        self.expect(VerilogToken::Semicolon);
    }

    /// Parses `always stmt`.
    fn parse_always(&mut self) -> AlwaysBlock {
        let start = self.current_span();
        self.expect(VerilogToken::Always);
        let body = self.parse_statement();
        AlwaysBlock {
            body,
            span: start.merge(self.prev_span()),
        }
    }

    /// Parses the current attribute token into its entry names.
    fn parse_pragma(&mut self) -> Pragma {
        let span = self.current_span();
        let text = self.current_text();
        self.advance();
        let inner = text
            .strip_prefix("(*")
            .and_then(|t| t.strip_suffix("*)"))
            .unwrap_or("");
        let entries = inner
            .split(',')
            .filter_map(|entry| {
                let name = entry.split('=').next().unwrap_or("").trim();
                (!name.is_empty()).then(|| name.to_string())
            })
            .collect();
        Pragma { entries, span }
    }
}
