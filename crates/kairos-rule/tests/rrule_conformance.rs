//! Cross-checks the engine against the `rrule` crate on RFC 5545 examples.
//! All start dates are UTC, so wall-clock and UTC values coincide.

use kairos_rule::{DateTime, Rule, RuleOptions};
use rrule::RRuleSet;

struct ConformanceCase {
    name: &'static str,
    rruleset: &'static str,
    options: &'static str,
}

#[expect(clippy::too_many_lines)]
fn conformance_cases() -> Vec<ConformanceCase> {
    vec![
        ConformanceCase {
            name: "daily_count",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=DAILY;COUNT=10",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "DAILY", "count": 10}"#,
        },
        ConformanceCase {
            name: "every_other_day",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=DAILY;INTERVAL=2;COUNT=5",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "DAILY", "interval": 2, "count": 5}"#,
        },
        ConformanceCase {
            name: "weekly_tuesday_thursday",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=WEEKLY;COUNT=10;WKST=SU;BYDAY=TU,TH",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "WEEKLY", "count": 10, "weekStart": "SU", "byDayOfWeek": ["TU", "TH"]}"#,
        },
        ConformanceCase {
            name: "every_other_week_tuesday_thursday",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=WEEKLY;INTERVAL=2;COUNT=8;WKST=SU;BYDAY=TU,TH",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "WEEKLY", "interval": 2, "count": 8, "weekStart": "SU", "byDayOfWeek": ["TU", "TH"]}"#,
        },
        ConformanceCase {
            name: "week_start_monday",
            rruleset: "DTSTART:19970805T090000Z\nRRULE:FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=MO",
            options: r#"{"start": "1997-08-05T09:00:00", "frequency": "WEEKLY", "interval": 2, "count": 4, "weekStart": "MO", "byDayOfWeek": ["TU", "SU"]}"#,
        },
        ConformanceCase {
            name: "week_start_sunday",
            rruleset: "DTSTART:19970805T090000Z\nRRULE:FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=SU",
            options: r#"{"start": "1997-08-05T09:00:00", "frequency": "WEEKLY", "interval": 2, "count": 4, "weekStart": "SU", "byDayOfWeek": ["TU", "SU"]}"#,
        },
        ConformanceCase {
            name: "monthly_first_friday",
            rruleset: "DTSTART:19970905T090000Z\nRRULE:FREQ=MONTHLY;COUNT=10;BYDAY=1FR",
            options: r#"{"start": "1997-09-05T09:00:00", "frequency": "MONTHLY", "count": 10, "byDayOfWeek": [["FR", 1]]}"#,
        },
        ConformanceCase {
            name: "monthly_second_to_last_monday",
            rruleset: "DTSTART:19970922T090000Z\nRRULE:FREQ=MONTHLY;COUNT=6;BYDAY=-2MO",
            options: r#"{"start": "1997-09-22T09:00:00", "frequency": "MONTHLY", "count": 6, "byDayOfWeek": [["MO", -2]]}"#,
        },
        ConformanceCase {
            name: "every_other_month_first_and_last_sunday",
            rruleset: "DTSTART:19970907T090000Z\nRRULE:FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=1SU,-1SU",
            options: r#"{"start": "1997-09-07T09:00:00", "frequency": "MONTHLY", "interval": 2, "count": 10, "byDayOfWeek": [["SU", 1], ["SU", -1]]}"#,
        },
        ConformanceCase {
            name: "monthly_third_to_last_day",
            rruleset: "DTSTART:19970928T090000Z\nRRULE:FREQ=MONTHLY;BYMONTHDAY=-3;COUNT=6",
            options: r#"{"start": "1997-09-28T09:00:00", "frequency": "MONTHLY", "count": 6, "byDayOfMonth": [-3]}"#,
        },
        ConformanceCase {
            name: "monthly_2nd_and_15th",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=MONTHLY;COUNT=10;BYMONTHDAY=2,15",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "MONTHLY", "count": 10, "byDayOfMonth": [2, 15]}"#,
        },
        ConformanceCase {
            name: "monthly_friday_13th",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13;COUNT=5",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "MONTHLY", "count": 5, "byDayOfWeek": ["FR"], "byDayOfMonth": [13]}"#,
        },
        ConformanceCase {
            name: "yearly_june_and_july",
            rruleset: "DTSTART:19970610T090000Z\nRRULE:FREQ=YEARLY;COUNT=10;BYMONTH=6,7",
            options: r#"{"start": "1997-06-10T09:00:00", "frequency": "YEARLY", "count": 10, "byMonthOfYear": [6, 7]}"#,
        },
        ConformanceCase {
            name: "yearly_20th_monday",
            rruleset: "DTSTART:19970519T090000Z\nRRULE:FREQ=YEARLY;BYDAY=20MO;COUNT=3",
            options: r#"{"start": "1997-05-19T09:00:00", "frequency": "YEARLY", "count": 3, "byDayOfWeek": [["MO", 20]]}"#,
        },
        ConformanceCase {
            name: "yearly_thursdays_in_march",
            rruleset: "DTSTART:19970313T090000Z\nRRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=TH;COUNT=11",
            options: r#"{"start": "1997-03-13T09:00:00", "frequency": "YEARLY", "count": 11, "byMonthOfYear": [3], "byDayOfWeek": ["TH"]}"#,
        },
        ConformanceCase {
            name: "every_other_year_sundays_in_january",
            rruleset: "DTSTART:19970105T090000Z\nRRULE:FREQ=YEARLY;INTERVAL=2;BYMONTH=1;BYDAY=SU;COUNT=8",
            options: r#"{"start": "1997-01-05T09:00:00", "frequency": "YEARLY", "interval": 2, "count": 8, "byMonthOfYear": [1], "byDayOfWeek": ["SU"]}"#,
        },
        ConformanceCase {
            name: "yearly_days_of_year",
            rruleset: "DTSTART:19970101T090000Z\nRRULE:FREQ=YEARLY;INTERVAL=3;COUNT=10;BYYEARDAY=1,100,200",
            options: r#"{"start": "1997-01-01T09:00:00", "frequency": "YEARLY", "interval": 3, "count": 10, "byDayOfYear": [1, 100, 200]}"#,
        },
        ConformanceCase {
            name: "daily_every_20_minutes",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=DAILY;BYHOUR=9,10,11,12,13,14,15,16;BYMINUTE=0,20,40;COUNT=30",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "DAILY", "count": 30, "byHourOfDay": [9, 10, 11, 12, 13, 14, 15, 16], "byMinuteOfHour": [0, 20, 40]}"#,
        },
        ConformanceCase {
            name: "every_three_hours",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=HOURLY;INTERVAL=3;UNTIL=19970902T210000Z",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "HOURLY", "interval": 3, "end": "1997-09-02T21:00:00"}"#,
        },
        ConformanceCase {
            name: "every_fifteen_minutes",
            rruleset: "DTSTART:19970902T090000Z\nRRULE:FREQ=MINUTELY;INTERVAL=15;COUNT=6",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "MINUTELY", "interval": 15, "count": 6}"#,
        },
    ]
}

fn rrule_dates(case: &ConformanceCase) -> Vec<DateTime> {
    let rrule_set: RRuleSet = case
        .rruleset
        .parse()
        .unwrap_or_else(|err| panic!("Failed to parse {}: {err}", case.name));
    rrule_set
        .all(500)
        .dates
        .iter()
        .map(|date| DateTime::new(date.naive_utc()))
        .collect()
}

fn engine_dates(case: &ConformanceCase) -> Vec<DateTime> {
    let options: RuleOptions = serde_json::from_str(case.options)
        .unwrap_or_else(|err| panic!("Failed to parse options of {}: {err}", case.name));
    Rule::new(options)
        .and_then(|rule| rule.all())
        .unwrap_or_else(|err| panic!("Case {} failed: {err}", case.name))
        .into_iter()
        .map(|occurrence| occurrence.date)
        .collect()
}

/// ## Summary
/// The engine and the `rrule` crate agree on every RFC 5545 example.
#[test_log::test]
fn matches_rrule_crate() {
    for case in conformance_cases() {
        let expected = rrule_dates(&case);
        assert!(!expected.is_empty(), "Case {} produced nothing", case.name);
        assert_eq!(engine_dates(&case), expected, "Case {} did not match", case.name);
    }
}

/// ## Summary
/// Reverse iteration yields the same set, newest first.
#[test_log::test]
fn reverse_matches_rrule_crate() {
    for case in conformance_cases() {
        let mut expected = rrule_dates(&case);
        expected.reverse();

        let options: RuleOptions = serde_json::from_str(case.options).expect("valid options");
        let rule = Rule::new(options).expect("valid rule");
        let actual: Vec<DateTime> = rule
            .occurrences(kairos_rule::OccurrenceArgs {
                reverse: true,
                ..kairos_rule::OccurrenceArgs::default()
            })
            .expect("valid iterator")
            .map(|occurrence| occurrence.expect("valid occurrence").date)
            .collect();

        assert_eq!(actual, expected, "Case {} did not match in reverse", case.name);
    }
}
