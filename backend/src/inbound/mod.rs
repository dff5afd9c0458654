//! Inbound adapters that translate HTTP requests into domain port calls.
//!
//! Framework details stay here; handlers only see the ports bundled in
//! [`http::state::HttpState`].

pub mod http;
