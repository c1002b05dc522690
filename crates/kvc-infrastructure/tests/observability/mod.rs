//! Health, Metrics and Bootstrap Tests

mod bootstrap_test;
mod health_test;
