use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::{
    catalog::Catalog,
    error::SubmissionError,
    records::{time::validate_submission, NewRecord},
};

/// A time as a player submits it, with everything still referred to by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Submission {
    pub course_key: String,
    pub machine_name: String,
    pub character_name: String,
    pub time: String,
    #[serde(default)]
    pub lap1: Option<f32>,
    #[serde(default)]
    pub lap2: Option<f32>,
    #[serde(default)]
    pub lap3: Option<f32>,
    pub proof_url: String,
}

fn check_lap(lap: u8, value: Option<f32>) -> Result<Option<f32>, SubmissionError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(SubmissionError::BadLap { lap: lap, value: v }),
        v => Ok(v),
    }
}

impl Submission {
    pub fn resolve(
        &self,
        catalog: &Catalog,
        user_id: u32,
        date_set: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Result<NewRecord, SubmissionError> {
        // the time is checked first so a typo'd time is what the player hears about
        let time_ms = validate_submission(&self.time)?;
        let course = catalog
            .course_by_key(self.course_key.trim())
            .ok_or_else(|| SubmissionError::UnknownCourse(self.course_key.clone()))?;
        let machine = catalog
            .machine_by_name(self.machine_name.trim())
            .ok_or_else(|| SubmissionError::UnknownMachine(self.machine_name.clone()))?;
        let character = catalog
            .character_by_name(self.character_name.trim())
            .ok_or_else(|| SubmissionError::UnknownCharacter(self.character_name.clone()))?;
        if catalog.user(user_id).is_none() {
            return Err(SubmissionError::UnknownUser(user_id));
        }

        Ok(NewRecord {
            course_id: course.id,
            machine_id: machine.id,
            character_id: character.id,
            user_id: user_id,
            time_str: self.time.trim().to_owned(),
            time_ms: time_ms,
            date_set: date_set,
            lap1: check_lap(1, self.lap1)?,
            lap2: check_lap(2, self.lap2)?,
            lap3: check_lap(3, self.lap3)?,
            proof_url: self.proof_url.clone(),
            created_at: created_at,
        })
    }
}
