//! Selection and assembly of the unsigned transaction

pub mod input_selector;
pub mod maturity;
pub mod transaction_builder;

pub use input_selector::{InputSelector, SelectionResult, DEFAULT_MAX_INPUTS};
pub use maturity::{MaturityFilter, MIN_CONFIRMATIONS};
pub use transaction_builder::TransactionBuilder;
