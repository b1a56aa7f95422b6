// API wire types module
// Request payloads and query parameter parsing for the address endpoints

use serde::Deserialize;

/// Body of `POST /address` and `PUT /address/{id}`.
///
/// Every field is optional at the serde level so presence can be validated
/// explicitly instead of failing deserialization.
#[derive(Debug, Deserialize)]
pub struct AddressPayload {
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A validated create/update payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewAddress {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl AddressPayload {
    /// Presence validation: `address` must be present and non-empty,
    /// both coordinates must be present.
    ///
    /// Coordinate value `0.0` passes. A truthiness check would reject it as
    /// incomplete data; the check here is explicit presence instead.
    pub fn validate(self) -> Option<NewAddress> {
        let address = self.address.filter(|a| !a.is_empty())?;
        let latitude = self.latitude?;
        let longitude = self.longitude?;
        Some(NewAddress {
            address,
            latitude,
            longitude,
        })
    }
}

/// Query of `GET /address/nearby`
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub distance: f64,
}

impl NearbyQuery {
    /// Parse from the raw URL query string. All three parameters are
    /// required and must parse as floats.
    ///
    /// Failures here surface as a 500 with an `error` body, not a 400;
    /// the handler funnels them through the same path as storage failures.
    pub fn from_query(query: Option<&str>) -> Result<Self, String> {
        let query = query.unwrap_or("");

        let mut latitude = None;
        let mut longitude = None;
        let mut distance = None;

        for pair in query.split('&') {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("");
            match key {
                "latitude" => latitude = Some(parse_float(key, value)?),
                "longitude" => longitude = Some(parse_float(key, value)?),
                "distance" => distance = Some(parse_float(key, value)?),
                // Unknown parameters are ignored
                _ => {}
            }
        }

        Ok(Self {
            latitude: latitude.ok_or("missing query parameter: latitude")?,
            longitude: longitude.ok_or("missing query parameter: longitude")?,
            distance: distance.ok_or("missing query parameter: distance")?,
        })
    }
}

fn parse_float(key: &str, value: &str) -> Result<f64, String> {
    value
        .parse()
        .map_err(|_| format!("could not convert query parameter {key} to float: '{value}'"))
}
