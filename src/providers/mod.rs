//! Market API provider implementations

pub mod http;

pub use http::HttpMarketApi;
