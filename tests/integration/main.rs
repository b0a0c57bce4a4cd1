//! HTTP integration tests driving the full router in process.

mod helpers;

mod avatar_test;
mod proxy_test;
mod static_test;
