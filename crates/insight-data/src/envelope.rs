//! Response envelope carried by service calls
//!
//! The envelope is a flat object whose `data` member holds a payload already
//! encoded as exchange text:
//!
//! ```json
//! {"successful":true,"code":"200","name":"OK","message":"","data":"{\"id\":1}"}
//! ```

use crate::codec::{deserialize, serialize};
use crate::convert;
use crate::Result;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Outcome of a service call, with an optional encoded payload.
///
/// A fresh envelope describes an unknown failure (`500`) until it is filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub successful: bool,
    pub code: String,
    pub name: String,
    pub message: String,
    pub data: Option<String>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            successful: false,
            code: "500".into(),
            name: "UnknownError".into(),
            message: "Unknown error".into(),
            data: None,
        }
    }
}

impl Envelope {
    /// A successful envelope carrying `payload` encoded as exchange text.
    pub fn success<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        Ok(Self {
            successful: true,
            code: "200".into(),
            name: "OK".into(),
            message: String::new(),
            data: Some(serialize(payload)?),
        })
    }

    pub fn failure(
        code: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            successful: false,
            code: code.into(),
            name: name.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Decode the payload, or `T::default()` when there is none.
    pub fn payload<T: DeserializeOwned + Default>(&self) -> Result<T> {
        deserialize(self.data.as_deref())
    }

    /// Re-type the whole envelope, e.g. into a caller-specific response type.
    pub fn convert_to<T: DeserializeOwned + Default>(&self) -> Result<T> {
        convert::convert_to(self)
    }
}
