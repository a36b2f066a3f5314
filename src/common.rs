pub mod error;
pub mod identifier;
pub mod ids;
pub mod payload;
pub mod response;
pub mod validation;
