use crate::convert::IntoValue;
use crate::error::BoxError;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

/// The return type of a registered function.
///
/// Plain values are results. `Result<T, E>` additionally carries a failure
/// slot: `Err` becomes the call's error and no result is produced.
pub trait IntoToolOutput {
    /// Whether this return type has a failure slot.
    const RETURNS_FAILURE: bool;

    fn into_output(self) -> Result<Value, BoxError>;
}

macro_rules! plain_output {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoToolOutput for $t {
                const RETURNS_FAILURE: bool = false;

                fn into_output(self) -> Result<Value, BoxError> {
                    Ok(self.into_value())
                }
            }
        )*
    };
}

plain_output!(
    Value,
    serde_json::Value,
    (),
    bool,
    String,
    &'static str,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
);

impl<T: IntoValue> IntoToolOutput for Option<T> {
    const RETURNS_FAILURE: bool = false;

    fn into_output(self) -> Result<Value, BoxError> {
        Ok(self.into_value())
    }
}

impl<T: IntoValue> IntoToolOutput for Vec<T> {
    const RETURNS_FAILURE: bool = false;

    fn into_output(self) -> Result<Value, BoxError> {
        Ok(self.into_value())
    }
}

impl<V: IntoValue, S> IntoToolOutput for HashMap<String, V, S> {
    const RETURNS_FAILURE: bool = false;

    fn into_output(self) -> Result<Value, BoxError> {
        Ok(self.into_value())
    }
}

impl<V: IntoValue> IntoToolOutput for BTreeMap<String, V> {
    const RETURNS_FAILURE: bool = false;

    fn into_output(self) -> Result<Value, BoxError> {
        Ok(self.into_value())
    }
}

impl<T, E> IntoToolOutput for Result<T, E>
where
    T: IntoValue,
    E: Into<BoxError>,
{
    const RETURNS_FAILURE: bool = true;

    fn into_output(self) -> Result<Value, BoxError> {
        self.map(IntoValue::into_value).map_err(Into::into)
    }
}
