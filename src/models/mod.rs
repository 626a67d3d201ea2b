//! Control-plane resources consumed by the streaming core.

mod execution;

pub use execution::{decode_execution, Execution, ExecutionStatus};
