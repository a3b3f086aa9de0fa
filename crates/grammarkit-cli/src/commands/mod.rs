pub mod check;
pub mod dump;
pub mod grammar_source;
pub mod input;
pub mod lex;
pub mod parse;
