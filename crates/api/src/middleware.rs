/// Request-scoped context extraction
pub mod context;
/// Domain error to HTTP response mapping
pub mod error_handling;
