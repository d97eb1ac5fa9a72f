pub mod annotation;
pub mod bbox;
