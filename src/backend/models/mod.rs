pub mod binding;
pub mod value;

pub use binding::{Binding, LoadPath};
pub use value::Value;
