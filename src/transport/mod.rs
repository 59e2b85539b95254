//! Transport layer for the MCP server
//!
//! The server speaks to exactly one client over stdin/stdout. This module owns
//! the process lifecycle around that connection: signal handling, optional
//! traffic logging and shutdown.

/// Byte-logging decorators for stdin/stdout
pub mod io_logger;

/// Termination signals and shutdown arbitration
pub mod lifecycle;

/// Standard I/O transport for subprocess-based MCP communication
pub mod stdio;
