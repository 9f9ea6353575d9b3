//! three-valued boolean
//!
//! `Unset` means "not specified at this layer", so a lower layer (named node, app defaults) may
//! still decide. A plain `bool` can not tell that apart from an explicit `false`.
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TriState {
    #[default]
    Unset,
    True,
    False,
}

impl TriState {
    pub fn is_unset(&self) -> bool {
        matches!(self, TriState::Unset)
    }

    pub fn get(self) -> Option<bool> {
        match self {
            TriState::Unset => None,
            TriState::True => Some(true),
            TriState::False => Some(false),
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::True
        } else {
            TriState::False
        }
    }
}

/// `Unset` is written as `null`; fields holding a [TriState] skip it with
/// `skip_serializing_if = "TriState::is_unset"`.
impl Serialize for TriState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.get() {
            Some(value) => serializer.serialize_bool(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for TriState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bool(bool),
            String(String),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(TriState::Unset),
            Some(Repr::Bool(value)) => Ok(value.into()),
            Some(Repr::String(value)) => match value.as_str() {
                "" | "unset" => Ok(TriState::Unset),
                other => crate::options::parse_bool(other)
                    .map(Into::into)
                    .map_err(serde::de::Error::custom),
            },
        }
    }
}
