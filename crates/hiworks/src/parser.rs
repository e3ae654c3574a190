//! Schedule text parser.
//!
//! The portal renders calendar cells as loosely structured text with no
//! markup-level fields, so extraction is line-oriented and heuristic: lines
//! are classified as date markers or schedule entries, and schedule lines are
//! decomposed into time / title / attendee / status by pattern matching.

use crate::types::ScheduleRow;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Substrings marking a time of day (AM/PM markers and hour/minute units).
const TIME_MARKERS: [&str; 4] = ["오전", "오후", "시", "분"];

/// Activity keywords that mark a line as a schedule entry.
const ACTIVITY_KEYWORDS: [&str; 5] = ["외근", "출장", "회의", "전시회", "업데이트"];

// Compiled once; the date pattern is a strict full-line match
// ("7.1 화" style: digits '.' digits, whitespace, one weekday glyph).
static DATE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\s+[월화수목금토일]$").unwrap());
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(오전|오후)\s*\d+시").unwrap());
static BRACKET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());
static BRACKET_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Returns true if the line is a date marker like "7.1 화".
pub fn is_date_line(line: &str) -> bool {
    DATE_LINE_RE.is_match(line)
}

/// Returns true if the line is a candidate schedule entry.
///
/// A candidate is any non-date line carrying a time marker, an activity
/// keyword, or a `[` bracket.
pub fn is_schedule_line(line: &str) -> bool {
    if line.is_empty() || is_date_line(line) {
        return false;
    }

    let has_time = TIME_MARKERS.iter().any(|m| line.contains(m));
    let has_activity = ACTIVITY_KEYWORDS.iter().any(|k| line.contains(k));

    has_time || has_activity || line.contains('[')
}

/// Parses the raw visible text of one calendar cell into schedule rows.
///
/// Date lines set the date for subsequent entries and never produce rows
/// themselves; lines matching neither classification are silently dropped.
pub fn parse_schedule_text(text: &str) -> Vec<ScheduleRow> {
    let mut rows = Vec::new();
    let mut current_date = String::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_date_line(line) {
            current_date = line.to_string();
            continue;
        }

        if is_schedule_line(line) {
            let row = parse_schedule_line(line, &current_date);
            if row.has_content() {
                rows.push(row);
            }
        }
    }

    debug!(rows = rows.len(), "parsed schedule cell text");
    rows
}

/// Decomposes a single schedule line into row fields.
///
/// Field absence degrades to an empty string; this function never fails.
fn parse_schedule_line(line: &str, date: &str) -> ScheduleRow {
    let time = TIME_RE
        .find(line)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let (attendees, status) = match BRACKET_RE.captures(line) {
        Some(caps) => split_bracket_content(&caps[1]),
        None => (String::new(), String::new()),
    };

    // Title is the residue after removing bracketed segments and the time.
    let title = BRACKET_STRIP_RE.replace_all(line, "");
    let title = TIME_RE.replace_all(title.trim(), "").trim().to_string();

    ScheduleRow {
        date: date.to_string(),
        time,
        title,
        attendees,
        status,
        ..Default::default()
    }
}

/// Splits bracket content on commas into (attendees, status).
///
/// Attendees is the first chunk and status the second; any chunks past the
/// second are dropped. With no comma the whole content is attendees and
/// status stays empty.
fn split_bracket_content(content: &str) -> (String, String) {
    let mut parts = content.split(',');
    let attendees = parts.next().unwrap_or("").trim().to_string();
    let status = parts.next().unwrap_or("").trim().to_string();
    (attendees, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_line_matches() {
        assert!(is_date_line("7.1 화"));
        assert!(is_date_line("7.10 수"));
        assert!(is_date_line("12.31  일"));
    }

    #[test]
    fn test_date_line_rejects_near_misses() {
        assert!(!is_date_line("7.1화")); // no whitespace
        assert!(!is_date_line("7.1 화요일")); // more than one glyph
        assert!(!is_date_line("7.1 x")); // not a weekday glyph
        assert!(!is_date_line("7 화")); // missing dot
        assert!(!is_date_line("7.1 화 회의")); // trailing content
        assert!(!is_date_line(""));
        assert!(!is_date_line("오후 2시 회의"));
    }

    #[test]
    fn test_schedule_line_classification() {
        assert!(is_schedule_line("오후 2시 외부 미팅"));
        assert!(is_schedule_line("회의"));
        assert!(is_schedule_line("[김철수] 방문"));
        assert!(is_schedule_line("30분 스탠드업"));
        assert!(!is_schedule_line("7.1 화"));
        assert!(!is_schedule_line(""));
        assert!(!is_schedule_line("그냥 텍스트"));
    }

    #[test]
    fn test_parse_line_full_scenario() {
        let rows = parse_schedule_text("7.1 화\n오후 2시 [김철수, 완료] 외부 회의");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.date, "7.1 화");
        assert_eq!(row.time, "오후 2시");
        assert_eq!(row.attendees, "김철수");
        assert_eq!(row.status, "완료");
        assert_eq!(row.title, "외부 회의");
        assert_eq!(row.description, "");
        assert_eq!(row.location, "");
    }

    #[test]
    fn test_bracket_without_comma() {
        let rows = parse_schedule_text("오전 9시 [영업팀] 출장");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attendees, "영업팀");
        assert_eq!(rows[0].status, "");
        assert_eq!(rows[0].title, "출장");
    }

    #[test]
    fn test_bracket_with_extra_commas_keeps_second_chunk() {
        let (attendees, status) = split_bracket_content("김철수, 완료, 추가");
        assert_eq!(attendees, "김철수");
        assert_eq!(status, "완료");
    }

    #[test]
    fn test_title_has_no_residual_brackets_or_time() {
        let rows = parse_schedule_text("오후 3시 [a][b, c] 회의 준비");
        assert_eq!(rows.len(), 1);
        let title = &rows[0].title;
        assert!(!title.contains('['), "title still has brackets: {title}");
        assert!(!title.contains(']'));
        assert!(!TIME_RE.is_match(title));
        // Re-running the stripping step over the title is a no-op.
        assert_eq!(BRACKET_STRIP_RE.replace_all(title, "").as_ref(), title);
    }

    #[test]
    fn test_date_carries_across_lines() {
        let text = "7.1 화\n오전 10시 회의\n오후 2시 외근\n7.2 수\n전시회 방문";
        let rows = parse_schedule_text(text);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, "7.1 화");
        assert_eq!(rows[1].date, "7.1 화");
        assert_eq!(rows[2].date, "7.2 수");
        assert_eq!(rows[2].title, "전시회 방문");
    }

    #[test]
    fn test_date_line_alone_produces_no_rows() {
        assert!(parse_schedule_text("7.1 화").is_empty());
    }

    #[test]
    fn test_unclassified_lines_are_dropped_silently() {
        assert!(parse_schedule_text("아무 내용 없음?\n---").is_empty());
    }

    #[test]
    fn test_time_without_leading_date() {
        // No date line seen yet: rows carry an empty date but survive
        // because other fields have content.
        let rows = parse_schedule_text("오후 2시 회의");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "");
        assert_eq!(rows[0].title, "회의");
    }

    #[test]
    fn test_sentinel_only_line_dropped() {
        // "일정 없음 [없음]" classifies as a schedule line via the bracket,
        // but every extracted field is empty or a sentinel.
        let rows = parse_schedule_text("7.1 화\n없음 [없음]");
        // date field carries "7.1 화" which is real content, so the row
        // survives only through the date; title "없음" is a sentinel.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "없음");

        // Without a date accumulator the row is all-sentinel and dropped.
        assert!(parse_schedule_text("없음 [없음]").is_empty());
    }
}
