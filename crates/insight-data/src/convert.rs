//! Re-typing values through the exchange format

use crate::Result;
use crate::codec::{deserialize, serialize};
use serde::{Serialize, de::DeserializeOwned};

/// Produce a deep, independent copy of `value` by encoding and decoding it.
///
/// The source is only borrowed; nothing in the copy shares storage with it.
pub fn clone_value<T>(value: &T) -> Result<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    let text = serialize(value)?;
    deserialize(Some(&text))
}

/// Re-type `value` as `T` by encoding it and decoding the text as `T`.
///
/// This is a best-effort coercion rather than a validated cast. Fields that
/// `T` does not declare are dropped, and fields the source lacks are filled
/// from `T`'s defaults when `T` is `#[serde(default)]`.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] when a shared field holds a value of an
/// incompatible kind, or when `T` requires a field the source does not have.
pub fn convert_to<T>(value: &(impl Serialize + ?Sized)) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let text = serialize(value)?;
    tracing::trace!(target_type = std::any::type_name::<T>(), "Converting value");
    deserialize(Some(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Account {
        name: String,
        roles: Vec<String>,
        limits: BTreeMap<String, u32>,
    }

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct AccountSummary {
        name: String,
        active: bool,
    }

    #[test]
    fn clone_is_independent_of_source() {
        let original = Account {
            name: "ops".into(),
            roles: vec!["read".into()],
            limits: BTreeMap::from([("disk".into(), 10)]),
        };

        let mut copy = clone_value(&original).unwrap();
        assert_eq!(copy, original);

        copy.roles.push("write".into());
        copy.limits.insert("disk".into(), 99);

        assert_eq!(original.roles, vec!["read".to_string()]);
        assert_eq!(original.limits["disk"], 10);
    }

    #[test]
    fn convert_drops_unknown_and_defaults_missing() {
        let account = Account {
            name: "svc".into(),
            ..Default::default()
        };

        let summary: AccountSummary = convert_to(&account).unwrap();
        assert_eq!(
            summary,
            AccountSummary {
                name: "svc".into(),
                active: false,
            }
        );
    }

    #[test]
    fn convert_with_incompatible_field_kind_fails() {
        #[derive(Serialize)]
        struct Wrong {
            name: u64,
        }

        let result: Result<AccountSummary> = convert_to(&Wrong { name: 5 });
        assert!(matches!(result, Err(Error::Decode { .. })));
    }
}
