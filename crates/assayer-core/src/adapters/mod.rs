//! Provider adapter implementations.

mod eodhd;

pub use eodhd::EodhdAdapter;
