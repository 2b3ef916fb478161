use kairos_rule::{DateTime, Rule, RuleOptions, RuleResult};

pub struct RuleCase {
    pub name: &'static str,
    /// `RuleOptions` as JSON.
    pub options: &'static str,
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
    /// Iteration must fail instead of producing occurrences.
    pub fails: bool,
}

#[expect(clippy::too_many_lines)]
pub fn rule_cases() -> Vec<RuleCase> {
    vec![
        RuleCase {
            name: "daily_basic",
            options: r#"{"start": "2012-02-01T09:30:00", "frequency": "DAILY", "count": 3}"#,
            expected: Some(&[
                "2012-02-01T09:30:00",
                "2012-02-02T09:30:00",
                "2012-02-03T09:30:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "weekly_basic",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "WEEKLY", "count": 3, "byDayOfWeek": ["TU", "TH"]}"#,
            expected: Some(&[
                "1997-09-02T09:00:00",
                "1997-09-04T09:00:00",
                "1997-09-09T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "weekly_interval_monday_week_start",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "WEEKLY", "interval": 2, "count": 3, "weekStart": "MO", "byDayOfWeek": ["TU", "SU"]}"#,
            expected: Some(&[
                "1997-09-02T09:00:00",
                "1997-09-07T09:00:00",
                "1997-09-16T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "weekly_interval_sunday_week_start",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "WEEKLY", "interval": 2, "count": 3, "weekStart": "SU", "byDayOfWeek": ["TU", "SU"]}"#,
            expected: Some(&[
                "1997-09-02T09:00:00",
                "1997-09-14T09:00:00",
                "1997-09-16T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "weekly_until",
            options: r#"{"start": "2020-01-01T09:00:00", "frequency": "WEEKLY", "end": "2020-01-10T09:00:00", "byDayOfWeek": ["MO", "WE", "FR"]}"#,
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-01-03T09:00:00",
                "2020-01-06T09:00:00",
                "2020-01-08T09:00:00",
                "2020-01-10T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "monthly_last_day",
            options: r#"{"start": "2013-12-01T00:00:00", "frequency": "MONTHLY", "count": 4, "byDayOfMonth": [-1]}"#,
            expected: Some(&[
                "2013-12-31T00:00:00",
                "2014-01-31T00:00:00",
                "2014-02-28T00:00:00",
                "2014-03-31T00:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "monthly_last_day_leap_year",
            options: r#"{"start": "2015-12-01T00:00:00", "frequency": "MONTHLY", "count": 4, "byDayOfMonth": [-1]}"#,
            expected: Some(&[
                "2015-12-31T00:00:00",
                "2016-01-31T00:00:00",
                "2016-02-29T00:00:00",
                "2016-03-31T00:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "monthly_day_31_skips_short_months",
            options: r#"{"start": "2021-01-31T09:00:00", "frequency": "MONTHLY", "count": 4, "byDayOfMonth": [31]}"#,
            expected: Some(&[
                "2021-01-31T09:00:00",
                "2021-03-31T09:00:00",
                "2021-05-31T09:00:00",
                "2021-07-31T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "monthly_last_friday",
            options: r#"{"start": "2021-01-01T00:00:00", "frequency": "MONTHLY", "count": 3, "byDayOfWeek": [["FR", -1]]}"#,
            expected: Some(&[
                "2021-01-29T00:00:00",
                "2021-02-26T00:00:00",
                "2021-03-26T00:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "monthly_friday_the_13th",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "MONTHLY", "count": 5, "byDayOfWeek": ["FR"], "byDayOfMonth": [13]}"#,
            expected: Some(&[
                "1998-02-13T09:00:00",
                "1998-03-13T09:00:00",
                "1998-11-13T09:00:00",
                "1999-08-13T09:00:00",
                "2000-10-13T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "yearly_first_tuesday_last_thursday",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "YEARLY", "count": 3, "byDayOfWeek": [["TU", 1], ["TH", -1]]}"#,
            expected: Some(&[
                "1997-12-25T09:00:00",
                "1998-01-06T09:00:00",
                "1998-12-31T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "yearly_by_day_of_year",
            options: r#"{"start": "1997-09-02T09:00:00", "frequency": "YEARLY", "count": 4, "byDayOfYear": [1, 100, 200]}"#,
            expected: Some(&[
                "1998-01-01T09:00:00",
                "1998-04-10T09:00:00",
                "1998-07-19T09:00:00",
                "1999-01-01T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "yearly_anniversary_on_leap_day",
            options: r#"{"start": "2016-02-29T12:00:00", "frequency": "YEARLY", "count": 3}"#,
            expected: Some(&[
                "2016-02-29T12:00:00",
                "2020-02-29T12:00:00",
                "2024-02-29T12:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "yearly_every_day_in_january",
            options: r#"{"start": "1998-01-01T09:00:00", "frequency": "YEARLY", "end": "2000-01-31T09:00:00", "byMonthOfYear": [1], "byDayOfWeek": ["SU", "MO", "TU", "WE", "TH", "FR", "SA"]}"#,
            expected: None,
            expected_len: Some(93),
            fails: false,
        },
        RuleCase {
            name: "daily_in_january_only",
            options: r#"{"start": "2020-01-30T08:00:00", "frequency": "DAILY", "count": 4, "byMonthOfYear": [1]}"#,
            expected: Some(&[
                "2020-01-30T08:00:00",
                "2020-01-31T08:00:00",
                "2021-01-01T08:00:00",
                "2021-01-02T08:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "daily_hours_and_minutes",
            options: r#"{"start": "2020-01-01T00:00:00", "frequency": "DAILY", "count": 5, "byHourOfDay": [17, 9], "byMinuteOfHour": [0, 30]}"#,
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-01-01T09:30:00",
                "2020-01-01T17:00:00",
                "2020-01-01T17:30:00",
                "2020-01-02T09:00:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "hourly_interval",
            options: r#"{"start": "2020-01-01T01:30:00", "frequency": "HOURLY", "interval": 6, "count": 4}"#,
            expected: Some(&[
                "2020-01-01T01:30:00",
                "2020-01-01T07:30:00",
                "2020-01-01T13:30:00",
                "2020-01-01T19:30:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "minutely_interval",
            options: r#"{"start": "2020-01-01T09:00:00", "frequency": "MINUTELY", "interval": 15, "count": 3}"#,
            expected: Some(&[
                "2020-01-01T09:00:00",
                "2020-01-01T09:15:00",
                "2020-01-01T09:30:00",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "secondly_basic",
            options: r#"{"start": "2012-01-01T09:00:00", "frequency": "SECONDLY", "count": 3}"#,
            expected: Some(&[
                "2012-01-01T09:00:00",
                "2012-01-01T09:00:01",
                "2012-01-01T09:00:02",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "millisecondly_interval",
            options: r#"{"start": "2020-01-01T00:00:00", "frequency": "MILLISECONDLY", "interval": 250, "count": 3}"#,
            expected: Some(&[
                "2020-01-01T00:00:00",
                "2020-01-01T00:00:00.250",
                "2020-01-01T00:00:00.500",
            ]),
            expected_len: None,
            fails: false,
        },
        RuleCase {
            name: "yearly_february_31st_never_occurs",
            options: r#"{"start": "2020-01-01T00:00:00", "frequency": "YEARLY", "byMonthOfYear": [2], "byDayOfMonth": [31]}"#,
            expected: None,
            expected_len: None,
            fails: true,
        },
        RuleCase {
            name: "leap_second_only",
            options: r#"{"start": "2020-01-01T00:00:00", "frequency": "DAILY", "bySecondOfMinute": [60]}"#,
            expected: None,
            expected_len: None,
            fails: true,
        },
    ]
}

pub fn case_rule(case: &RuleCase) -> Rule {
    let options: RuleOptions = serde_json::from_str(case.options)
        .unwrap_or_else(|err| panic!("Failed to parse options of {}: {err}", case.name));
    Rule::new(options).unwrap_or_else(|err| panic!("Failed to build rule {}: {err}", case.name))
}

pub fn collect_dates(
    occurrences: impl Iterator<Item = RuleResult<kairos_rule::Occurrence>>,
) -> RuleResult<Vec<DateTime>> {
    occurrences
        .map(|occurrence| occurrence.map(|occurrence| occurrence.date))
        .collect()
}

pub fn parse_date(value: &str) -> DateTime {
    value
        .parse()
        .unwrap_or_else(|err| panic!("Failed to parse date {value}: {err}"))
}

pub fn assert_case(case: &RuleCase) {
    let rule = case_rule(case);
    let iterator = rule
        .iter()
        .unwrap_or_else(|err| panic!("Failed to iterate {}: {err}", case.name));
    let result = collect_dates(iterator.take(1000));

    if case.fails {
        assert!(result.is_err(), "Case {} should fail, got {result:?}", case.name);
        return;
    }
    let dates = result.unwrap_or_else(|err| panic!("Case {} failed: {err}", case.name));

    if let Some(expected) = case.expected {
        let expected: Vec<DateTime> = expected.iter().map(|value| parse_date(value)).collect();
        assert_eq!(dates, expected, "Case {} did not match", case.name);
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            dates.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}
