//! Accepting connections and handing them to bounded workers.

pub mod listener;
