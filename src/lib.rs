#![doc(test(attr(deny(warnings))))]

//! PigCoin tracks personal income and expenses alongside savings goals that
//! are split into installments, persisting everything as local JSON.

pub mod cli;
pub mod errors;
pub mod store;
pub mod utils;

pub use store::FinanceStore;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing, using `directive` when `RUST_LOG` is unset.
/// Only the first call has any effect.
pub fn init_with_filter(directive: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::info!("PigCoin tracing initialized.");
    });
}
