#![doc = include_str!("../README.md")]

pub use tangle_schema as schema;
pub use tangle_wire as wire;
