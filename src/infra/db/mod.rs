pub mod dialect;
pub mod gateway;
pub mod migrate;

pub use dialect::Dialect;
pub use gateway::{Gateway, Record, Transaction, Value};
