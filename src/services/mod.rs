pub mod remove_bg;
pub mod transcoder;
pub mod upload;
pub mod worker;
