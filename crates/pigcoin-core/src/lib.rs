//! pigcoin-core
//!
//! Business logic and services for PigCoin.
//! Depends on pigcoin-domain. No CLI, no terminal I/O, no direct file access.

pub mod amount;
pub mod error;
pub mod goal_service;
pub mod schedule;
pub mod statistics_service;
pub mod storage;
pub mod transaction_service;

pub use amount::*;
pub use error::CoreError;
pub use goal_service::*;
pub use schedule::*;
pub use statistics_service::*;
pub use storage::*;
pub use transaction_service::*;
