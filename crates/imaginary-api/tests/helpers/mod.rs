//! Test helpers: build the application router for integration tests.
//!
//! Run from workspace root: `cargo test -p imaginary-api`.

#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashMap;

use axum_test::TestServer;
use imaginary_api::setup;
use imaginary_core::Config;

/// Configuration from defaults plus the given variables; never reads the process environment.
pub fn test_config(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config = Config::from_lookup(|key| vars.get(key).cloned()).expect("test config");
    config.validate().expect("valid test config");
    config
}

pub fn setup_test_app() -> TestServer {
    setup_test_app_with(&[])
}

pub fn setup_test_app_with(vars: &[(&str, &str)]) -> TestServer {
    let (_state, router) = setup::build_app(test_config(vars)).expect("Failed to build app");
    TestServer::new(router.into_make_service()).expect("Failed to create test server")
}
