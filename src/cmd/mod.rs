pub mod convert;
pub mod output;
