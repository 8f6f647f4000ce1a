//! Shell loop tests driven through the public API.

pub mod dispatch_test;
pub mod headless_test;
