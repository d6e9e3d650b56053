use crate::error::Result;
use serde::Serialize;

/// A JSON document exchanged with a REST service under a vendor media type
///
/// # Examples
///
/// ```
/// use gateway_http::DataStructure;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Sensor {
///     id: String,
/// }
///
/// impl DataStructure for Sensor {
///     const NAME: &'static str = "immotronic.sensor";
///     const VERSION: u32 = 2;
/// }
///
/// assert_eq!(Sensor::media_type(), "application/vnd.immotronic.sensor-2+json");
/// ```
pub trait DataStructure: Serialize {
    const NAME: &'static str;
    const VERSION: u32;

    fn media_type() -> String {
        format!("application/vnd.{}-{}+json", Self::NAME, Self::VERSION)
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
