//! Grammar definitions and Chomsky normal form conversion.

pub mod cnf;
pub mod grammar;
pub mod syntax;
pub mod types;
