//! Ready-to-use visitors.

pub mod variable;

pub use variable::VariableCollector;
