mod mcp_session;
mod persistence;
