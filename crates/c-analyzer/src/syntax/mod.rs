pub mod kind;
pub mod lexer;

pub use kind::TokenKind;
pub use lexer::{Lexer, Token, significant_tokens};
