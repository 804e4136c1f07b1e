use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::error::{Result, SchedulerError};

const MINUTE_RANGE: (u32, u32) = (0, 59);
const HOUR_RANGE: (u32, u32) = (0, 23);
const DAY_OF_MONTH_RANGE: (u32, u32) = (1, 31);
const MONTH_RANGE: (u32, u32) = (1, 12);
const DAY_OF_WEEK_RANGE: (u32, u32) = (0, 6);

/// How far ahead `next_fire` will search before giving up. Generous enough
/// to cover any expression that fires at all (e.g. Feb 29 on a leap year).
const MAX_LOOKAHEAD_MINUTES: i64 = 60 * 24 * 366 * 5;

/// A parsed standard five-field cron expression (`minute hour
/// day-of-month month day-of-week`). Each field is stored as a bitset over
/// its legal range.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expression: String,
    minute: Vec<bool>,
    hour: Vec<bool>,
    day_of_month: Vec<bool>,
    month: Vec<bool>,
    day_of_week: Vec<bool>,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(SchedulerError::InvalidCronExpression {
                expression: expression.to_string(),
                reason: format!("expected 5 fields, got {}", fields.len()),
            });
        }

        let parse = |spec: &str, range: (u32, u32)| {
            parse_field(spec, range).map_err(|reason| SchedulerError::InvalidCronExpression {
                expression: expression.to_string(),
                reason,
            })
        };

        Ok(Self {
            expression: expression.to_string(),
            minute: parse(fields[0], MINUTE_RANGE)?,
            hour: parse(fields[1], HOUR_RANGE)?,
            day_of_month: parse(fields[2], DAY_OF_MONTH_RANGE)?,
            month: parse(fields[3], MONTH_RANGE)?,
            day_of_week: parse(fields[4], DAY_OF_WEEK_RANGE)?,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    fn matches(&self, dt: DateTime<Utc>) -> bool {
        self.minute[(dt.minute() - MINUTE_RANGE.0) as usize]
            && self.hour[(dt.hour() - HOUR_RANGE.0) as usize]
            && self.day_of_month[(dt.day() - DAY_OF_MONTH_RANGE.0) as usize]
            && self.month[(dt.month() - MONTH_RANGE.0) as usize]
            && self.day_of_week[dt.weekday().num_days_from_sunday() as usize]
    }

    /// The next minute-aligned instant strictly after `from` that matches
    /// this schedule, or `None` if none is found within the lookahead bound.
    pub fn next_fire(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = from
            .with_second(0)?
            .with_nanosecond(0)?
            + Duration::minutes(1);

        for _ in 0..MAX_LOOKAHEAD_MINUTES {
            if self.matches(candidate) {
                return Some(candidate);
            }
            candidate += Duration::minutes(1);
        }
        None
    }
}

fn parse_field(spec: &str, (min, max): (u32, u32)) -> std::result::Result<Vec<bool>, String> {
    let mut slots = vec![false; (max - min + 1) as usize];
    for item in spec.split(',') {
        parse_item(item, min, max, &mut slots)?;
    }
    Ok(slots)
}

fn parse_item(item: &str, min: u32, max: u32, slots: &mut [bool]) -> std::result::Result<(), String> {
    let (base, step) = match item.split_once('/') {
        Some((base, step_str)) => {
            let step: u32 = step_str.parse().map_err(|_| format!("invalid step '{step_str}'"))?;
            if step == 0 {
                return Err("step must be non-zero".to_string());
            }
            (base, step)
        }
        None => (item, 1),
    };

    let (lo, hi) = if base == "*" {
        (min, max)
    } else if let Some((a, b)) = base.split_once('-') {
        let lo: u32 = a.parse().map_err(|_| format!("invalid range start '{a}'"))?;
        let hi: u32 = b.parse().map_err(|_| format!("invalid range end '{b}'"))?;
        (lo, hi)
    } else {
        let v: u32 = base.parse().map_err(|_| format!("invalid value '{base}'"))?;
        (v, v)
    };

    if lo < min || hi > max || lo > hi {
        return Err(format!("value out of range [{min}, {max}]: '{item}'"));
    }

    let mut v = lo;
    while v <= hi {
        slots[(v - min) as usize] = true;
        v += step;
    }
    Ok(())
}
