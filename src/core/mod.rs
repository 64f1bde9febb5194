// Core modules implementing the operations and error modeling.
pub mod error;
pub mod ops;
