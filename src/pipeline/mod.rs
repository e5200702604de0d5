//! Component 4.J: wires the nine feature modules into one synchronous run.

pub mod orchestrator;

pub use orchestrator::run;
