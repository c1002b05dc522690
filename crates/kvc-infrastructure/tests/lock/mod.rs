//! Lock Service Tests
