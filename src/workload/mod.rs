//! Sample workload used to produce traces for the `generate` command.

pub mod demo;

pub use demo::{DemoApplication, DemoMethod, ARG_TYPE, OWNER_TYPE};
