pub mod measure;
pub mod padding;
