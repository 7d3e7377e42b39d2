mod semantic_visitor;
mod symbol_table;
mod types;

pub use semantic_visitor::*;
pub use symbol_table::*;
pub use types::*;
