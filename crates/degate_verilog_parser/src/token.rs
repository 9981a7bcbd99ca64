//! Token types for the netlist lexer.
//!
//! The keyword set covers what synthesized gate-level netlists contain plus
//! the block keywords the parser must balance when it skips a construct.

use degate_common::Span;
use serde::{Deserialize, Serialize};

/// A token kind.
///
/// Literal values are not stored in the token; they are sliced from the
/// source text using the token's span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum VerilogToken {
    // === Keywords ===
    /// `always`
    Always,
    /// `and`
    And,
    /// `assign`
    Assign,
    /// `begin`
    Begin,
    /// `buf`
    Buf,
    /// `case`
    Case,
    /// `casex`
    Casex,
    /// `casez`
    Casez,
    /// `else`
    Else,
    /// `end`
    End,
    /// `endcase`
    Endcase,
    /// `endfunction`
    Endfunction,
    /// `endgenerate`
    Endgenerate,
    /// `endmodule`
    Endmodule,
    /// `endtask`
    Endtask,
    /// `function`
    Function,
    /// `generate`
    Generate,
    /// `if`
    If,
    /// `initial`
    Initial,
    /// `inout`
    Inout,
    /// `input`
    Input,
    /// `integer`
    Integer,
    /// `localparam`
    Localparam,
    /// `module`
    Module,
    /// `nand`
    Nand,
    /// `negedge`
    Negedge,
    /// `nor`
    Nor,
    /// `not`
    Not,
    /// `or`
    Or,
    /// `output`
    Output,
    /// `parameter`
    Parameter,
    /// `posedge`
    Posedge,
    /// `reg`
    Reg,
    /// `signed`
    Signed,
    /// `supply0`
    Supply0,
    /// `supply1`
    Supply1,
    /// `task`
    Task,
    /// `tri`
    Tri,
    /// `wire`
    Wire,
    /// `xnor`
    Xnor,
    /// `xor`
    Xor,

    // === Literals ===
    /// Unsized decimal literal (e.g., `0`, `42`)
    IntLiteral,
    /// Sized or based literal (e.g., `1'b0`, `'hFF`)
    SizedLiteral,
    /// String literal (e.g., `"hello"`)
    StringLiteral,

    // === Operators and punctuation ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `#`
    Hash,
    /// `@`
    At,
    /// `=`
    Equals,
    /// `==`
    DoubleEquals,
    /// `!=`
    BangEquals,
    /// `===`
    TripleEquals,
    /// `!==`
    BangDoubleEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEquals,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&`
    Ampersand,
    /// `&&`
    DoubleAmpersand,
    /// `|`
    Pipe,
    /// `||`
    DoublePipe,
    /// `^`
    Caret,
    /// `~^` or `^~`
    TildeCaret,
    /// `~`
    Tilde,
    /// `~&`
    TildeAmpersand,
    /// `~|`
    TildePipe,
    /// `!`
    Bang,
    /// `<<`
    DoubleLess,
    /// `>>`
    DoubleGreater,
    /// `<<<`
    TripleLess,
    /// `>>>`
    TripleGreater,
    /// `?`
    Question,

    // === Identifiers and special ===
    /// An attribute instance `(* ... *)`, lexed as one token.
    Attribute,
    /// A regular identifier (e.g., `_017_`, `clk`)
    Identifier,
    /// A system identifier (e.g., `$display`)
    SystemIdentifier,
    /// End of file
    Eof,
    /// Lexer error: unrecognized or malformed token
    Error,
}

impl VerilogToken {
    /// Returns `true` if this token is a direction keyword (`input`, `output`, `inout`).
    pub fn is_direction(self) -> bool {
        matches!(
            self,
            VerilogToken::Input | VerilogToken::Output | VerilogToken::Inout
        )
    }

    /// Returns `true` if this token is a gate primitive keyword.
    pub fn is_gate(self) -> bool {
        matches!(
            self,
            VerilogToken::And
                | VerilogToken::Nand
                | VerilogToken::Or
                | VerilogToken::Nor
                | VerilogToken::Xor
                | VerilogToken::Xnor
                | VerilogToken::Not
                | VerilogToken::Buf
        )
    }

    /// For a keyword opening a region that must be skipped as a whole,
    /// returns the keyword closing it.
    pub fn closing_keyword(self) -> Option<VerilogToken> {
        match self {
            VerilogToken::Function => Some(VerilogToken::Endfunction),
            VerilogToken::Task => Some(VerilogToken::Endtask),
            VerilogToken::Generate => Some(VerilogToken::Endgenerate),
            VerilogToken::Case | VerilogToken::Casex | VerilogToken::Casez => {
                Some(VerilogToken::Endcase)
            }
            VerilogToken::Begin => Some(VerilogToken::End),
            _ => None,
        }
    }
}

/// A lexed token with its kind and source location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// The kind of this token.
    pub kind: VerilogToken,
    /// The source span covering this token's text.
    pub span: Span,
}

/// Looks up a keyword from an identifier string. Keywords are case-sensitive.
pub fn lookup_keyword(s: &str) -> Option<VerilogToken> {
    match s {
        "always" => Some(VerilogToken::Always),
        "and" => Some(VerilogToken::And),
        "assign" => Some(VerilogToken::Assign),
        "begin" => Some(VerilogToken::Begin),
        "buf" => Some(VerilogToken::Buf),
        "case" => Some(VerilogToken::Case),
        "casex" => Some(VerilogToken::Casex),
        "casez" => Some(VerilogToken::Casez),
        "else" => Some(VerilogToken::Else),
        "end" => Some(VerilogToken::End),
        "endcase" => Some(VerilogToken::Endcase),
        "endfunction" => Some(VerilogToken::Endfunction),
        "endgenerate" => Some(VerilogToken::Endgenerate),
        "endmodule" => Some(VerilogToken::Endmodule),
        "endtask" => Some(VerilogToken::Endtask),
        "function" => Some(VerilogToken::Function),
        "generate" => Some(VerilogToken::Generate),
        "if" => Some(VerilogToken::If),
        "initial" => Some(VerilogToken::Initial),
        "inout" => Some(VerilogToken::Inout),
        "input" => Some(VerilogToken::Input),
        "integer" => Some(VerilogToken::Integer),
        "localparam" => Some(VerilogToken::Localparam),
        "module" => Some(VerilogToken::Module),
        "nand" => Some(VerilogToken::Nand),
        "negedge" => Some(VerilogToken::Negedge),
        "nor" => Some(VerilogToken::Nor),
        "not" => Some(VerilogToken::Not),
        "or" => Some(VerilogToken::Or),
        "output" => Some(VerilogToken::Output),
        "parameter" => Some(VerilogToken::Parameter),
        "posedge" => Some(VerilogToken::Posedge),
        "reg" => Some(VerilogToken::Reg),
        "signed" => Some(VerilogToken::Signed),
        "supply0" => Some(VerilogToken::Supply0),
        "supply1" => Some(VerilogToken::Supply1),
        "task" => Some(VerilogToken::Task),
        "tri" => Some(VerilogToken::Tri),
        "wire" => Some(VerilogToken::Wire),
        "xnor" => Some(VerilogToken::Xnor),
        "xor" => Some(VerilogToken::Xor),
        _ => None,
    }
}
