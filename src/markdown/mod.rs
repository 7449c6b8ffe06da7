pub mod annotation;
pub(crate) mod blocks;
pub mod elements;
pub mod parse;
