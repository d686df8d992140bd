/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// `undefined`, `null`, `true` and `false` map to their keywords, `[...]` to an
/// array without holes, and `{ "key": value }` to an object. Anything else goes
/// through [`to_value`](crate::to_value); a value that fails to serialize
/// becomes `undefined`.
///
/// ```rust
/// use serde_eson::{eson, parse};
///
/// let value = eson!({ "name": "Ada", "tags": ["x", null], "born": 1815 });
/// assert_eq!(value, parse("{name: 'Ada', tags: ['x', null], born: 1815}").unwrap());
/// ```
#[macro_export]
macro_rules! eson {
    (undefined) => {
        $crate::Value::Undefined
    };

    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$(Some($crate::eson!($elem))),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.insert($key.to_string(), $crate::eson!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($s:expr) => {
        $crate::to_value(&$s).unwrap_or($crate::Value::Undefined)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Map, Value};

    #[test]
    fn test_eson_macro_keywords() {
        assert_eq!(eson!(undefined), Value::Undefined);
        assert_eq!(eson!(null), Value::Null);
        assert_eq!(eson!(true), Value::Bool(true));
        assert_eq!(eson!(false), Value::Bool(false));
        assert_eq!(eson!(42), Value::Number(42.0));
        assert_eq!(eson!("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_eson_macro_nesting() {
        assert_eq!(eson!([]), Value::Array(vec![]));
        assert_eq!(eson!({}), Value::Object(Map::new()));

        let value = eson!({ "list": [1, [2, undefined]], "empty": {} });
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);

        let list = obj.get("list").unwrap().as_array().unwrap();
        assert_eq!(list[0], Some(Value::Number(1.0)));
        assert_eq!(
            list[1],
            Some(Value::Array(vec![Some(Value::Number(2.0)), Some(Value::Undefined)]))
        );
    }

    #[test]
    fn test_eson_macro_expressions() {
        let n = 7;
        assert_eq!(eson!(n), Value::Number(7.0));
        assert_eq!(eson!((n * 2)), Value::Number(14.0));
        assert_eq!(eson!(u64::MAX), Value::BigInt(u64::MAX.into()));
    }
}
