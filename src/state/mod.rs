/// State management module
///
/// This module handles all inspection state, including:
/// - Shared data structures (data.rs)
/// - The subject store and its single mutation entry point (store.rs)
/// - The comparison session state machine (session.rs)
/// - Data set loading and the demo data set (source.rs)
/// - Notifications (notify.rs)
/// - Report summary and export actions (report.rs)

pub mod data;
pub mod notify;
pub mod report;
pub mod session;
pub mod source;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;
