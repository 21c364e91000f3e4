pub mod animate;
pub mod args;
pub mod class;
pub mod data;
pub mod frame;
pub mod iterator;
pub mod options;
pub mod param;
pub mod renderable;
pub mod text;

#[cfg(test)]
#[path = "../../tests/unit/render/support.rs"]
pub(crate) mod test_support;
