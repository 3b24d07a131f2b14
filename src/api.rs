
pub mod artifact;
pub mod client;
pub mod error;
pub mod experiment;
pub mod id;
pub mod limits;
pub mod model;
pub mod run;
pub mod search;
pub mod tag;
pub mod trace;

// The tracking server renders int64 fields as strings in some responses and as
// numbers in others, so accept both and always write numbers.
mod int64 {
    use std::str::FromStr;

    use serde::de::{self, Deserializer};
    use serde::ser::Serializer;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum Lenient {
        Int(i64),
        Str(String),
    }

    impl Lenient {
        pub(super) fn into_i64<E: de::Error>(self) -> Result<i64, E> {
            match self {
                Lenient::Int(int) => Ok(int),
                Lenient::Str(s) => i64::from_str(&s).map_err(de::Error::custom),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>
    {
        Lenient::deserialize(deserializer)?.into_i64()
    }

    pub fn serialize<S>(int: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(*int)
    }
}
// Option<i64> variant of `int64`
mod opt_int64 {
    use serde::de::Deserializer;
    use serde::ser::Serializer;
    use serde::Deserialize;

    use super::int64::Lenient;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>
    {
        match Option::<Lenient>::deserialize(deserializer)? {
            Some(int) => Ok(Some(int.into_i64()?)),
            None => Ok(None),
        }
    }

    pub fn serialize<S>(int: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match int {
            Some(int) => serializer.serialize_some(int),
            None => serializer.serialize_none(),
        }
    }
}
