use crate::domain::value_objects::offline::local_id::is_temporary_id;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// An entity kept in a client-side collection.
pub trait StoredEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key under which the collection snapshot is persisted.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn is_provisional(&self) -> bool {
        is_temporary_id(self.id())
    }
}

/// Accepts ids sent as JSON strings or numbers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value,
        RawId::Int(value) => value.to_string(),
        RawId::Uint(value) => value.to_string(),
    })
}

pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_id")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(id)| id))
}
