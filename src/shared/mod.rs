pub mod constants;
pub mod locale;
pub mod types;
pub mod validation;
