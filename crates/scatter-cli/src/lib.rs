//! Library half of the `scatter` binary: argument parsing, config layering,
//! the operator prompt and the commands themselves.

pub mod args;
pub mod config;
pub mod prompt;
pub mod run;
pub mod sample;
