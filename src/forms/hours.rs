use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{FieldErrors, FieldKind, FieldMeta, Form, REQUIRED};
use crate::hours::{parse_date, parse_time};

name_form!(
    /// A role an employee works a shift in, e.g. barista.
    PositionForm,
    "position",
    "Barista"
);

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct WorkedHoursForm {
    pub start_time: String,
    pub end_time: String,
    pub date: String,
    pub position: Option<i64>,
    /// Defaults to the acting employee.
    pub employee: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanWorkedHours {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub date: NaiveDate,
    pub position_id: Option<i64>,
    pub employee_id: Option<i64>,
}

fn time_field(errors: &mut FieldErrors, field: &str, value: &str) -> Option<NaiveTime> {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    let parsed = parse_time(value);
    if parsed.is_none() {
        errors.add(field, "Enter a valid time.");
    }
    parsed
}

impl Form for WorkedHoursForm {
    const NAME: &'static str = "worked_hours";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("start_time", "Start time", FieldKind::Time).with_placeholder("12:30"),
        FieldMeta::required("end_time", "End time", FieldKind::Time).with_placeholder("12:30"),
        FieldMeta::required("date", "Day", FieldKind::Date).with_placeholder("22.03.2016"),
        FieldMeta::optional("position", "Position", FieldKind::Choice),
        FieldMeta::optional("employee", "Employee", FieldKind::Choice),
    ];
    type Cleaned = CleanWorkedHours;

    fn clean(&self) -> Result<CleanWorkedHours, FieldErrors> {
        match self.parse() {
            (Some(cleaned), errors) if errors.is_empty() => Ok(cleaned),
            (_, errors) => Err(errors),
        }
    }
}

impl WorkedHoursForm {
    /// Parses every field and collects errors. The shift is returned whenever
    /// the times and date parse, even if the start is after the end, so the
    /// caller can still check it for overlaps.
    pub fn parse(&self) -> (Option<CleanWorkedHours>, FieldErrors) {
        let mut errors = FieldErrors::default();
        let start_time = time_field(&mut errors, "start_time", &self.start_time);
        let end_time = time_field(&mut errors, "end_time", &self.end_time);

        let date = if self.date.trim().is_empty() {
            errors.add("date", REQUIRED);
            None
        } else {
            let parsed = parse_date(&self.date);
            if parsed.is_none() {
                errors.add("date", "Enter a valid date.");
            }
            parsed
        };

        if let (Some(start), Some(end)) = (start_time, end_time) {
            if start > end {
                errors.add("start_time", "Start time is later than end time.");
            }
        }

        let parsed = match (start_time, end_time, date) {
            (Some(start_time), Some(end_time), Some(date)) => Some(CleanWorkedHours {
                start_time,
                end_time,
                date,
                position_id: self.position,
                employee_id: self.employee,
            }),
            _ => None,
        };
        (parsed, errors)
    }
}
