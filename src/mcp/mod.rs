//! Model Context Protocol (MCP) server handling and JSON-RPC implementations
//!
//! Provides protocol-level specifics surrounding JSON-RPC formatting, method routing,
//! and the newline-delimited stream transport.

pub mod rpc;
pub mod server;
pub mod stdio;
