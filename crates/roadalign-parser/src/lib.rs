pub mod error;
pub mod fields;
pub mod value;

pub use error::Error;
pub use fields::{parse_number, Fields};
pub use value::Value;
