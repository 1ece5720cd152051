use crate::extensions::date_time_ext::ToIso8601;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Body of SteVe's `updateFirmware` call. The retry fields are forwarded to the charger, they are not
/// applied by this tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFirmwareRequest {
    pub charge_box_id: String,
    pub location: String,
    #[serde(serialize_with = "serialize_iso8601")]
    pub retrieve_date: DateTime<Utc>,
    pub retries: u32,
    pub retry_interval: u32,
}

fn serialize_iso8601<S: Serializer>(date_time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date_time.to_iso8601())
}
