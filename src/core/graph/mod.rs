mod builder;
mod lexer;
mod model;

pub use builder::{GraphBuilder, ParseReport};
pub use lexer::{Lexer, Token, TokenKind};
pub use model::{DepGraph, Edge, Module, Node, NodeId, UNPREFIXED_MODULE};
