use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone, Utc, Weekday,
};

use crate::models::Timeframe;

/// Calendar unit that moves a consistency goal to its adjacent period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarUnit {
    Day,
    Week,
    Month,
}

/// Week start and the offset that defines local midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalCalendar {
    first_weekday: Weekday,
    offset: FixedOffset,
}

impl Default for GoalCalendar {
    fn default() -> Self {
        Self {
            first_weekday: Weekday::Sun,
            offset: Utc.fix(),
        }
    }
}

impl GoalCalendar {
    pub fn new(first_weekday: Weekday, offset: FixedOffset) -> Self {
        Self {
            first_weekday,
            offset,
        }
    }

    /// Build from a 1-based weekday index (1 = Sunday ... 7 = Saturday) and
    /// an offset from UTC in minutes. Returns `None` when either is out of range.
    pub fn from_settings(first_weekday_index: u8, utc_offset_minutes: i32) -> Option<Self> {
        let first_weekday = match first_weekday_index {
            1 => Weekday::Sun,
            2 => Weekday::Mon,
            3 => Weekday::Tue,
            4 => Weekday::Wed,
            5 => Weekday::Thu,
            6 => Weekday::Fri,
            7 => Weekday::Sat,
            _ => return None,
        };
        let offset = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
        Some(Self::new(first_weekday, offset))
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let shift = Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&(local - shift))
    }

    fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        self.to_utc(date.and_time(NaiveTime::MIN))
    }
}

pub fn moving_unit(timeframe: Timeframe) -> CalendarUnit {
    match timeframe {
        Timeframe::Daily => CalendarUnit::Day,
        Timeframe::Weekly => CalendarUnit::Week,
        Timeframe::Monthly => CalendarUnit::Month,
    }
}

/// First instant of the period containing `reference`
pub fn start_of_period(
    timeframe: Timeframe,
    reference: DateTime<Utc>,
    calendar: &GoalCalendar,
) -> DateTime<Utc> {
    let date = calendar.local(reference).date();

    let start = match timeframe {
        Timeframe::Daily => date,
        Timeframe::Weekly => {
            let days_back = (7 + date.weekday().num_days_from_sunday()
                - calendar.first_weekday.num_days_from_sunday())
                % 7;
            date - Duration::days(i64::from(days_back))
        }
        Timeframe::Monthly => date.with_day(1).unwrap_or(date),
    };

    calendar.midnight(start)
}

/// Move a period start by `periods` moving units (negative goes back)
pub fn shift_period(
    timeframe: Timeframe,
    period_start: DateTime<Utc>,
    periods: i32,
    calendar: &GoalCalendar,
) -> DateTime<Utc> {
    let local = calendar.local(period_start);

    let shifted = match moving_unit(timeframe) {
        CalendarUnit::Day => Some(local + Duration::days(i64::from(periods))),
        CalendarUnit::Week => Some(local + Duration::weeks(i64::from(periods))),
        CalendarUnit::Month => {
            let months = Months::new(periods.unsigned_abs());
            if periods >= 0 {
                local.checked_add_months(months)
            } else {
                local.checked_sub_months(months)
            }
        }
    };

    calendar.to_utc(shifted.unwrap_or(local))
}

/// Half-open `[start, end)` bounds of the period containing `reference`
pub fn period_bounds(
    timeframe: Timeframe,
    reference: DateTime<Utc>,
    calendar: &GoalCalendar,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_period(timeframe, reference, calendar);
    (start, shift_period(timeframe, start, 1, calendar))
}
