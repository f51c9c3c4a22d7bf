/// Mapping of engine errors onto HTTP responses
pub mod error_handling;
