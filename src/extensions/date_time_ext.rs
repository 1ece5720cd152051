use chrono::{DateTime, SecondsFormat, Utc};

pub trait ToIso8601 {
    /// Formats as ISO-8601 in UTC with whole seconds and a `Z` designator, e.g. `2024-05-01T12:02:00Z`.
    fn to_iso8601(&self) -> String;
}

impl ToIso8601 for DateTime<Utc> {
    fn to_iso8601(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
