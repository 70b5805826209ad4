pub mod normalizer;
pub mod quote_service;
