//! Connection Provider Tests
