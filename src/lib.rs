#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

pub mod config;

#[path = "../linalg/mod.rs"]
pub mod linalg;

#[path = "../regression/mod.rs"]
pub mod regression;
