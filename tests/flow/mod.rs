//! Component flow tests. Each flow runs on its own thread while the test
//! thread plays the user.

pub mod component_flow_test;
