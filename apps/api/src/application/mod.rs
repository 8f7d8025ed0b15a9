// Application processing: concurrent generation fan-out, record building, and
// the HTTP handlers that persist and serve the results.

pub mod aggregator;
pub mod builder;
pub mod handlers;
pub mod models;
