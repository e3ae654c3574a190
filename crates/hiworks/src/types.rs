/// Core data types for schedule extraction.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown when the calendar's current period label could not be resolved.
pub const NO_PERIOD_INFO: &str = "날짜 정보 없음";

/// Cell values that mean "no schedule" rather than real data.
pub const NO_SCHEDULE_SENTINELS: [&str; 8] = [
    "",
    "일정 없음",
    "스케줄 없음",
    "예약 없음",
    "No schedule",
    "No events",
    "Empty",
    "없음",
];

/// One calendar entry as extracted from the portal.
///
/// The `date` field is an opaque display label in the source locale (e.g.
/// "7.1 화"); the source format is too inconsistent for a calendar date type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: String,
    pub time: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub attendees: String,
    pub status: String,
}

impl ScheduleRow {
    /// Returns true if at least one field, after trimming, is non-empty and
    /// not a recognized "no schedule" sentinel.
    pub fn has_content(&self) -> bool {
        self.fields()
            .iter()
            .any(|f| {
                let trimmed = f.trim();
                !NO_SCHEDULE_SENTINELS.contains(&trimmed)
            })
    }

    fn fields(&self) -> [&str; 7] {
        [
            &self.date,
            &self.time,
            &self.title,
            &self.description,
            &self.location,
            &self.attendees,
            &self.status,
        ]
    }
}

/// Outcome of one extraction pass over the rendered calendar.
///
/// Constructed fresh per call and consumed immediately by the caller; rows
/// preserve DOM traversal order.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub rows: Vec<ScheduleRow>,
    pub current_period_label: String,
    pub error: Option<String>,
    pub extracted_at: String,
}

impl ExtractionResult {
    pub fn ok(rows: Vec<ScheduleRow>, current_period_label: String) -> Self {
        Self {
            success: true,
            rows,
            current_period_label,
            error: None,
            extracted_at: now_timestamp(),
        }
    }

    pub fn failed(current_period_label: String, error: impl Into<String>) -> Self {
        Self {
            success: false,
            rows: Vec::new(),
            current_period_label,
            error: Some(error.into()),
            extracted_at: now_timestamp(),
        }
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Point-in-time snapshot of the browser session's cookies.
///
/// An independent copy: later browser-side cookie changes are not reflected,
/// and the snapshot must be retaken after any re-login.
#[derive(Debug, Clone)]
pub struct SessionCookies(Vec<(String, String)>);

impl SessionCookies {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Converts the schedule endpoint's JSON payload into rows.
///
/// Entries are expected under a `schedules` array (falling back to `data`),
/// each an object keyed by the seven row fields. Rows failing the content
/// invariant are dropped.
pub fn rows_from_json(payload: &Value) -> Vec<ScheduleRow> {
    let entries = payload
        .get("schedules")
        .and_then(Value::as_array)
        .or_else(|| payload.get("data").and_then(Value::as_array));

    let Some(entries) = entries else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            let field = |key: &str| {
                obj.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            ScheduleRow {
                date: field("date"),
                time: field("time"),
                title: field("title"),
                description: field("description"),
                location: field("location"),
                attendees: field("attendees"),
                status: field("status"),
            }
        })
        .filter(ScheduleRow::has_content)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_row_has_no_content() {
        assert!(!ScheduleRow::default().has_content());
    }

    #[test]
    fn test_sentinel_only_row_has_no_content() {
        let row = ScheduleRow {
            date: "일정 없음".into(),
            title: "No schedule".into(),
            status: "  없음  ".into(),
            ..Default::default()
        };
        assert!(!row.has_content());
    }

    #[test]
    fn test_any_real_field_gives_content() {
        for i in 0..7 {
            let mut row = ScheduleRow::default();
            let field = match i {
                0 => &mut row.date,
                1 => &mut row.time,
                2 => &mut row.title,
                3 => &mut row.description,
                4 => &mut row.location,
                5 => &mut row.attendees,
                _ => &mut row.status,
            };
            *field = "회의".into();
            assert!(row.has_content(), "field {i} should count as content");
        }
    }

    #[test]
    fn test_rows_from_json_schedules_key() {
        let payload = json!({
            "schedules": [
                {"date": "7.1 화", "time": "오후 2시", "title": "외부 회의"},
                {"date": "", "time": "", "title": "일정 없음"},
            ]
        });
        let rows = rows_from_json(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "외부 회의");
        assert_eq!(rows[0].description, "");
    }

    #[test]
    fn test_rows_from_json_data_fallback() {
        let payload = json!({"data": [{"title": "출장"}]});
        let rows = rows_from_json(&payload);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "출장");
    }

    #[test]
    fn test_rows_from_json_no_array() {
        assert!(rows_from_json(&json!({"ok": true})).is_empty());
    }
}
