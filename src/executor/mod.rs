//! Background executor for screening
//!
//! This module provides:
//! - The request/response message protocol
//! - A dedicated worker thread that owns the dictionary

pub mod protocol;
pub mod worker;

pub use protocol::{ExecutorRequest, ExecutorResponse, RequestId};
pub use worker::{ExecutorError, ExecutorHandle, ScreeningExecutor};
