//! Hourly schedules: days, weeks of days, and years of repeated weeks.

use serde::{Deserialize, Serialize};

use super::check_range;
use crate::composer::{SchemaField, SchemaType};

/// Hours in a day schedule.
pub const HOURS_PER_DAY: usize = 24;

/// Value range a schedule is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleTypeLimit {
    /// Values in `[0, 1]`
    Fraction,
    /// Values in °C
    Temperature,
}

/// A 24-hour schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DayComponent {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_limit: ScheduleTypeLimit,
    /// One value per hour, starting at midnight
    pub values: Vec<f64>,
}

impl SchemaType for DayComponent {
    const TYPE_NAME: &'static str = "Day";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("Type"),
            SchemaField::list("Values"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        if self.values.len() != HOURS_PER_DAY {
            return Err(format!(
                "Day schedule needs {HOURS_PER_DAY} hourly values, got {}",
                self.values.len()
            ));
        }
        if self.type_limit == ScheduleTypeLimit::Fraction {
            for value in &self.values {
                check_range("Fraction schedule value", *value, 0.0, 1.0)?;
            }
        }
        Ok(())
    }
}

/// Seven day schedules sharing one type limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct WeekComponent {
    pub name: String,
    pub monday: DayComponent,
    pub tuesday: DayComponent,
    pub wednesday: DayComponent,
    pub thursday: DayComponent,
    pub friday: DayComponent,
    pub saturday: DayComponent,
    pub sunday: DayComponent,
}

impl WeekComponent {
    /// Days from Monday to Sunday.
    #[must_use]
    pub fn days(&self) -> [&DayComponent; 7] {
        [
            &self.monday,
            &self.tuesday,
            &self.wednesday,
            &self.thursday,
            &self.friday,
            &self.saturday,
            &self.sunday,
        ]
    }

    /// Type limit shared by every day.
    #[must_use]
    pub const fn type_limit(&self) -> ScheduleTypeLimit {
        self.monday.type_limit
    }
}

impl SchemaType for WeekComponent {
    const TYPE_NAME: &'static str = "Week";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::nested::<DayComponent>("Monday"),
            SchemaField::nested::<DayComponent>("Tuesday"),
            SchemaField::nested::<DayComponent>("Wednesday"),
            SchemaField::nested::<DayComponent>("Thursday"),
            SchemaField::nested::<DayComponent>("Friday"),
            SchemaField::nested::<DayComponent>("Saturday"),
            SchemaField::nested::<DayComponent>("Sunday"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        for day in self.days() {
            day.validate()?;
            if day.type_limit != self.type_limit() {
                return Err(format!("Week '{}' mixes schedule type limits", self.name));
            }
        }
        Ok(())
    }
}

/// A week applied over a date range within the year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RepeatedWeekComponent {
    pub start_day: u8,
    pub start_month: u8,
    pub end_day: u8,
    pub end_month: u8,
    pub week: WeekComponent,
}

impl RepeatedWeekComponent {
    fn validate(&self) -> Result<(), String> {
        for (label, month, day) in [
            ("Start", self.start_month, self.start_day),
            ("End", self.end_month, self.end_day),
        ] {
            let days_in_month = match month {
                1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
                4 | 6 | 9 | 11 => 30,
                2 => 29,
                _ => return Err(format!("Invalid month: {month}")),
            };
            if day == 0 || day > days_in_month {
                return Err(format!("{label} day {day} is invalid for month {month}"));
            }
        }

        if (self.start_month, self.start_day) > (self.end_month, self.end_day) {
            return Err("Start date must not be after end date".to_string());
        }
        self.week.validate()
    }
}

/// A year schedule built from repeated weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct YearComponent {
    pub name: String,
    #[serde(rename = "Type")]
    pub type_limit: ScheduleTypeLimit,
    pub weeks: Vec<RepeatedWeekComponent>,
}

impl SchemaType for YearComponent {
    const TYPE_NAME: &'static str = "Year";

    fn schema_fields() -> Vec<SchemaField> {
        vec![
            SchemaField::scalar("Name"),
            SchemaField::scalar("Type"),
            SchemaField::list("Weeks"),
        ]
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), String> {
        if self.weeks.is_empty() {
            return Err(format!("Year '{}' has no weeks", self.name));
        }
        for repeated in &self.weeks {
            repeated.validate()?;
            if repeated.week.type_limit() != self.type_limit {
                return Err(format!(
                    "Week '{}' does not match the type limit of year '{}'",
                    repeated.week.name, self.name
                ));
            }
        }
        Ok(())
    }
}
