use serde::Serialize;
use strata_core::BoxError;

/// A source that always yields `value` under `key`.
pub fn constant<V>(
    key: impl Into<String>,
    value: V,
) -> impl Fn() -> Result<(String, V), BoxError> + Send + Sync + 'static
where
    V: Serialize + Clone + Send + Sync + 'static,
{
    let key = key.into();
    move || Ok((key.clone(), value.clone()))
}
