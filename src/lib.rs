// Library surface for the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod logging;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod ui;
pub mod util;
