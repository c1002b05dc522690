//! Cache Repository Tests

mod repository_test;
