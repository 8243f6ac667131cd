pub mod animate;
pub mod encoder;
