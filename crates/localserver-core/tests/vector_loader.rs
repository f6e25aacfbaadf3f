//! JSON test vector loader for request parsing tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TestVector {
    pub description: String,
    pub request: RawData,
    #[serde(default)]
    pub expect: Option<serde_json::Value>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub status: u16,
}

#[derive(Debug, Deserialize)]
pub struct RawData {
    pub encoding: String,
    pub data: String,
}

impl RawData {
    pub fn decode(&self) -> Vec<u8> {
        match self.encoding.as_str() {
            "text" => self.data.as_bytes().to_vec(),
            "hex" => hex::decode(&self.data).expect("invalid hex in test vector"),
            other => panic!("unsupported encoding: {other}"),
        }
    }
}
