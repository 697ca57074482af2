//! Domain objects and tool integrations
//!
//! Provides the registry of callable tools exposed over the MCP protocol.

pub mod tools;
