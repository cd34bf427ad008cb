//! Serde encoding for a stage's last attempt.
//!
//! `Option<Result<T, E>>` is written as `null`, `{"success": T}` or
//! `{"failure": E}`. Use with `#[serde(with = "crate::encoding")]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Borrowed<'a, T, E> {
    Success(&'a T),
    Failure(&'a E),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum Owned<T, E> {
    Success(T),
    Failure(E),
}

pub fn serialize<S, T, E>(value: &Option<Result<T, E>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
    E: Serialize,
{
    value
        .as_ref()
        .map(|attempt| match attempt {
            Ok(success) => Borrowed::Success(success),
            Err(failure) => Borrowed::Failure(failure),
        })
        .serialize(serializer)
}

pub fn deserialize<'de, D, T, E>(deserializer: D) -> Result<Option<Result<T, E>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
    E: Deserialize<'de>,
{
    let encoded = Option::<Owned<T, E>>::deserialize(deserializer)?;
    Ok(encoded.map(|attempt| match attempt {
        Owned::Success(success) => Ok(success),
        Owned::Failure(failure) => Err(failure),
    }))
}
