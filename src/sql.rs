// SQL module - AST representation and tree traversal

pub mod ast;
pub mod node;
pub mod rewriter;
pub mod visitor;

pub use ast::*;
pub use node::{NodeKind, NodeRef};
pub use rewriter::{NodeRewriter, RewriteError, RewriteResult, TreeRewriter};
pub use visitor::{AstVisitor, UnhandledNode};
