//! pigcoin-domain
//!
//! Pure domain models (Transaction, Goal, Installment, Ledger, summaries).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod common;
pub mod goal;
pub mod ledger;
pub mod stats;
pub mod transaction;

pub use common::*;
pub use goal::*;
pub use ledger::*;
pub use stats::*;
pub use transaction::*;
