pub mod interpreter;
pub mod parser;
pub mod types;

pub use interpreter::{
    BlockOverlay, Call, CallKind, CallSite, CallType, CompileOptions, Decorator, DecoratorCall,
    Evaluator, FrameScope, HelperOptions, Partial, PrecompileOptions, Precompiled, ProgramFn,
    Registry, RenderError, RuntimeOptions, Template, Walkbars, classify_static, compile,
    compute_suggestions, precompile, render,
};
pub use parser::{ParseError, parse, parse_template};
pub use types::{Function, Map, Value, escape_expression, escape_html};

/// Creates an object [`Value`] from key-value pairs, keeping their order.
///
/// Values are converted via `Into<Value>`, so strings, numbers, booleans,
/// vectors and nested `object!` calls can be passed directly.
///
/// # Example
///
/// ```
/// use walkbars::{object, Value};
///
/// let context = object! {
///     "name" => "Alice",
///     "tags" => vec!["a", "b"],
///     "address" => object! { "city" => "Paris" },
/// };
/// assert_eq!(context.get_own_property("name"), Some(Value::from("Alice")));
/// assert_eq!(object! {}, Value::empty_object());
/// ```
#[macro_export]
macro_rules! object {
    {} => {
        $crate::Value::empty_object()
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut map = $crate::Map::new();
            $(
                map.insert($key.to_string(), ::std::convert::Into::<$crate::Value>::into($value));
            )+
            $crate::Value::object(map)
        }
    };
}
