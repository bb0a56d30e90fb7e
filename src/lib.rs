#![doc(test(attr(deny(warnings))))]

//! Quote Core drives the multi-step quote request and job application forms
//! of a commercial cleaning company: field rules, step gating, the monthly
//! price estimate and lead submission.

pub mod cli;
pub mod config;
pub mod errors;
pub mod estimate;
pub mod forms;
pub mod submission;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Quote Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
