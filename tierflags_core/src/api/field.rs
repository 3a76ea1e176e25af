use std::marker::PhantomData;
use std::time::Duration;

use crate::model::{Kind, Value};

mod sealed {
    pub trait Sealed {}

    impl Sealed for String {}
    impl Sealed for i64 {}
    impl Sealed for bool {}
    impl Sealed for f64 {}
    impl Sealed for std::time::Duration {}
    impl Sealed for Vec<String> {}
}

/// A Rust type that a flag may hold.
///
/// Implemented for exactly the six flag kinds:
///
/// | Rust type      | [`Kind`]               |
/// |----------------|------------------------|
/// | `String`       | [`Kind::String`]       |
/// | `i64`          | [`Kind::Int`]          |
/// | `bool`         | [`Kind::Bool`]         |
/// | `f64`          | [`Kind::Float64`]      |
/// | `Duration`     | [`Kind::Duration`]     |
/// | `Vec<String>`  | [`Kind::StringList`]   |
pub trait FlagType: sealed::Sealed + Clone + Default + 'static {
    /// The kind this type maps onto.
    const KIND: Kind;

    /// Borrow the typed content of `value`, or `None` if it holds another kind.
    fn from_value(value: &Value) -> Option<&Self>;

    /// Wrap into a [`Value`].
    fn into_value(self) -> Value;
}

macro_rules! flag_type {
    ($type:ty, $variant:ident) => {
        impl FlagType for $type {
            const KIND: Kind = Kind::$variant;

            fn from_value(value: &Value) -> Option<&Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }
    };
}

flag_type!(String, String);
flag_type!(i64, Int);
flag_type!(bool, Bool);
flag_type!(f64, Float64);
flag_type!(Duration, Duration);
flag_type!(Vec<String>, StringList);

/// A typed reference to a registered flag.
///
/// Handles do not own or alias the value: read it through [`FlagSet::get`](crate::FlagSet::get).
/// ```
/// use tierflags_core::FlagSet;
///
/// let mut flags = FlagSet::new("program");
/// let port = flags.int("port", 8080, "Server port");
///
/// flags.parse(&["--port", "3000"]).unwrap();
/// assert_eq!(flags.get(&port), 3000);
/// assert_eq!(port.name(), "port");
/// ```
pub struct Handle<T> {
    name: String,
    _type: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _type: PhantomData,
        }
    }

    /// The long name of the flag.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("name", &self.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::assert_contains;
    use rstest::rstest;

    #[rstest]
    #[case(String::KIND, Kind::String)]
    #[case(i64::KIND, Kind::Int)]
    #[case(bool::KIND, Kind::Bool)]
    #[case(f64::KIND, Kind::Float64)]
    #[case(Duration::KIND, Kind::Duration)]
    #[case(<Vec<String>>::KIND, Kind::StringList)]
    fn flag_type_kind(#[case] kind: Kind, #[case] expected: Kind) {
        assert_eq!(kind, expected);
    }

    #[test]
    fn flag_type_value() {
        let value = 7i64.into_value();
        assert_eq!(value, Value::Int(7));
        assert_eq!(i64::from_value(&value), Some(&7));
        assert_eq!(bool::from_value(&value), None);

        let value = vec!["a".to_string()].into_value();
        assert_eq!(value.kind(), Kind::StringList);
        assert_eq!(
            <Vec<String>>::from_value(&value),
            Some(&vec!["a".to_string()])
        );
    }

    #[test]
    fn handle() {
        let handle: Handle<Duration> = Handle::new("timeout");
        let copy = handle.clone();

        assert_eq!(copy.name(), "timeout");
        let debug = format!("{handle:?}");
        assert_contains!(debug, "\"timeout\"");
        assert_contains!(debug, "Duration");
    }
}
