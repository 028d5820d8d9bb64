//! HTTP client for the remote analysis service.

mod dto;
pub mod http_gateway;

pub use http_gateway::HttpAnalysisGateway;
