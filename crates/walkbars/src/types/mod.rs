mod escape;
mod function;
mod value;

pub use escape::{escape_expression, escape_html};
pub use function::Function;
pub use value::{Map, Value};

pub(crate) use value::format_number;
