//! Test-only support code shared by the integration test suites.
//!
//! `inflate` is a from-scratch RFC 1951/1950 reference decoder. It exists
//! purely to verify this crate's encoder output and is never compiled into
//! the published library.

pub mod inflate;
