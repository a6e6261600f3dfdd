//! Natural-language schedule annotations on to-do text.
//!
//! A todo like `"call mom @friday at 3pm"` carries a trailing annotation
//! introduced by `@`. The annotation is stripped from the display text
//! and resolved to a concrete due instant. Anything that doesn't resolve
//! degrades to "no schedule" — this function never fails.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;

#[derive(Debug, Clone, PartialEq)]
pub struct SmartSchedule {
    pub text: String,
    pub due_at: Option<NaiveDateTime>,
    pub schedule_token: Option<String>,
}

/// Parse a trailing `@...` annotation out of free-form todo text.
///
/// The token is kept verbatim (re-displayed as typed) only when it
/// resolved to a due instant. If stripping the annotation would leave an
/// empty title, the original text is kept instead.
pub fn parse_smart_schedule(input: &str, now: NaiveDateTime) -> SmartSchedule {
    let re = Regex::new(r"(?:^|\s)@([a-zA-Z0-9:\s]+)$").expect("schedule token regex");

    let Some(caps) = re.captures(input) else {
        return SmartSchedule {
            text: input.trim().to_string(),
            due_at: None,
            schedule_token: None,
        };
    };

    let token = caps
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    let annotation_start = caps.get(0).map(|m| m.start()).unwrap_or(0);
    let clean = input[..annotation_start].trim();
    let text = if clean.is_empty() {
        input.trim().to_string()
    } else {
        clean.to_string()
    };

    let due_at = parse_smart_token(&token, now);
    SmartSchedule {
        text,
        schedule_token: due_at.is_some().then(|| token.clone()),
        due_at,
    }
}

fn parse_smart_token(token: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let normalized = token
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if normalized.is_empty() {
        return None;
    }

    let (base, time_segment) = match normalized.split_once(" at ") {
        Some((base, rest)) => (base, rest.trim()),
        None => (normalized.as_str(), ""),
    };

    let anchor = resolve_base_date(base, now.date())?;

    if time_segment.is_empty() {
        return anchor.and_hms_opt(9, 0, 0);
    }
    parse_time_segment(time_segment).map(|time| anchor.and_time(time))
}

fn resolve_base_date(base: &str, today: NaiveDate) -> Option<NaiveDate> {
    if base == "today" {
        Some(today)
    } else if base == "tomorrow" {
        Some(today + Duration::days(1))
    } else if let Some(weekday_name) = base.strip_prefix("next ") {
        // "next friday": strictly after today, so never today.
        weekday_from_name(weekday_name.trim()).map(|wd| next_weekday_after(today, wd))
    } else if let Some(wd) = weekday_from_name(base) {
        // Bare weekday: strictly after yesterday, so today still counts.
        Some(next_weekday_after(today - Duration::days(1), wd))
    } else {
        resolve_month_day(base, today)
    }
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name {
        "sunday" => Weekday::Sun,
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        _ => return None,
    };
    Some(weekday)
}

fn next_weekday_after(date: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut candidate = date + Duration::days(1);
    while candidate.weekday() != weekday {
        candidate += Duration::days(1);
    }
    candidate
}

/// Resolve "mar 5" to the soonest matching date that isn't in the past:
/// this year if it hasn't gone by yet, otherwise next year.
fn resolve_month_day(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parse_with_year =
        |year: i32| NaiveDate::parse_from_str(&format!("{token} {year}"), "%b %d %Y").ok();

    let this_year = parse_with_year(today.year())?;
    if this_year >= today {
        return Some(this_year);
    }
    parse_with_year(today.year() + 1)
}

fn parse_time_segment(segment: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(segment, "%I:%M%p")
        .or_else(|_| NaiveTime::parse_from_str(segment, "%I%p"))
        .or_else(|_| NaiveTime::parse_from_str(segment, "%H:%M"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn it_passes_text_through_when_there_is_no_annotation() {
        let parsed = parse_smart_schedule("  buy milk  ", at(2024, 1, 1, 12, 0));
        assert_eq!(parsed.text, "buy milk");
        assert_eq!(parsed.due_at, None);
        assert_eq!(parsed.schedule_token, None);
    }

    #[test]
    fn it_resolves_tomorrow_at_nine_by_default() {
        // 2024-01-01 is a Monday.
        let parsed = parse_smart_schedule("buy milk @tomorrow", at(2024, 1, 1, 12, 0));
        assert_eq!(parsed.text, "buy milk");
        assert_eq!(parsed.due_at, Some(at(2024, 1, 2, 9, 0)));
        assert_eq!(parsed.schedule_token.as_deref(), Some("tomorrow"));
    }

    #[test]
    fn it_resolves_today() {
        let parsed = parse_smart_schedule("standup notes @today", at(2024, 1, 1, 18, 30));
        assert_eq!(parsed.due_at, Some(at(2024, 1, 1, 9, 0)));
    }

    #[test]
    fn it_resolves_a_weekday_with_a_twelve_hour_time() {
        // 2024-01-03 is a Wednesday; the upcoming Friday is 2024-01-05.
        let parsed = parse_smart_schedule("call mom @friday at 3pm", at(2024, 1, 3, 8, 0));
        assert_eq!(parsed.text, "call mom");
        assert_eq!(parsed.due_at, Some(at(2024, 1, 5, 15, 0)));
        assert_eq!(parsed.schedule_token.as_deref(), Some("friday at 3pm"));
    }

    #[test]
    fn it_parses_minutes_and_24_hour_times() {
        let parsed = parse_smart_schedule("dentist @tomorrow at 3:30pm", at(2024, 1, 1, 8, 0));
        assert_eq!(parsed.due_at, Some(at(2024, 1, 2, 15, 30)));

        let parsed = parse_smart_schedule("dentist @tomorrow at 15:30", at(2024, 1, 1, 8, 0));
        assert_eq!(parsed.due_at, Some(at(2024, 1, 2, 15, 30)));
    }

    #[test]
    fn it_lets_a_bare_weekday_resolve_to_today() {
        // Bare weekday scans strictly after yesterday, so on a Monday
        // "@monday" is today while "@next monday" is a week out.
        let parsed = parse_smart_schedule("review @monday", at(2024, 1, 1, 8, 0));
        assert_eq!(parsed.due_at, Some(at(2024, 1, 1, 9, 0)));

        let parsed = parse_smart_schedule("review @next monday", at(2024, 1, 1, 8, 0));
        assert_eq!(parsed.due_at, Some(at(2024, 1, 8, 9, 0)));
    }

    #[test]
    fn it_resolves_month_day_tokens_to_the_soonest_future_match() {
        let parsed = parse_smart_schedule("taxes @mar 5", at(2024, 1, 1, 8, 0));
        assert_eq!(parsed.due_at, Some(at(2024, 3, 5, 9, 0)));

        // Already past in June, so it rolls to next year.
        let parsed = parse_smart_schedule("taxes @mar 5", at(2024, 6, 1, 8, 0));
        assert_eq!(parsed.due_at, Some(at(2025, 3, 5, 9, 0)));
    }

    #[test]
    fn it_strips_unresolvable_annotations_without_a_due_date() {
        let parsed = parse_smart_schedule("water plants @someday maybe", at(2024, 1, 1, 8, 0));
        assert_eq!(parsed.text, "water plants");
        assert_eq!(parsed.due_at, None);
        assert_eq!(parsed.schedule_token, None);
    }

    #[test]
    fn it_strips_annotations_whose_time_segment_fails_to_parse() {
        // The date base resolves but the time doesn't; the annotation is
        // still stripped and no due date is reported.
        let parsed = parse_smart_schedule("gym @friday at 99:99", at(2024, 1, 3, 8, 0));
        assert_eq!(parsed.text, "gym");
        assert_eq!(parsed.due_at, None);
        assert_eq!(parsed.schedule_token, None);
    }

    #[test]
    fn it_keeps_the_original_text_when_stripping_would_empty_it() {
        let parsed = parse_smart_schedule("@tomorrow", at(2024, 1, 1, 8, 0));
        assert_eq!(parsed.text, "@tomorrow");
        assert_eq!(parsed.due_at, Some(at(2024, 1, 2, 9, 0)));
        assert_eq!(parsed.schedule_token.as_deref(), Some("tomorrow"));
    }

    #[test]
    fn it_ignores_annotations_that_do_not_reach_the_end_of_input() {
        // The token run is broken by punctuation, so nothing anchors to
        // the end of the string and the text is untouched.
        let parsed = parse_smart_schedule("email @alice, then lunch", at(2024, 1, 1, 8, 0));
        assert_eq!(parsed.text, "email @alice, then lunch");
        assert_eq!(parsed.due_at, None);
        assert_eq!(parsed.schedule_token, None);
    }
}
