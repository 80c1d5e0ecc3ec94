use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    InvalidFormat(String),
    OutOfRange { seconds: u32, millis: u32 },
    /// The total doesn't fit in a u32 millisecond count.
    TooLong { minutes: u32, seconds: u32, millis: u32 },
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TimeError::InvalidFormat(s) => {
                write!(f, "Invalid time \"{}\", expected something like 1'05\"780", s)
            }
            TimeError::OutOfRange { seconds, millis } => write!(
                f,
                "Time component out of range (seconds: {}, milliseconds: {})",
                seconds, millis
            ),
            TimeError::TooLong {
                minutes,
                seconds,
                millis,
            } => write!(
                f,
                "Time {}'{:0>2}\"{:0>3} is too long to store",
                minutes, seconds, millis
            ),
        }
    }
}

impl Error for TimeError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionError {
    Time(TimeError),
    UnknownCourse(String),
    UnknownMachine(String),
    UnknownCharacter(String),
    UnknownUser(u32),
    BadLap { lap: u8, value: f32 },
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubmissionError::Time(e) => write!(f, "{}", e),
            SubmissionError::UnknownCourse(k) => write!(f, "Course not found: {}", k),
            SubmissionError::UnknownMachine(n) => write!(f, "Machine not found: {}", n),
            SubmissionError::UnknownCharacter(n) => write!(f, "Character not found: {}", n),
            SubmissionError::UnknownUser(id) => write!(f, "User not found: {}", id),
            SubmissionError::BadLap { lap, value } => {
                write!(f, "lap{} must be a non-negative number, got {}", lap, value)
            }
        }
    }
}

impl Error for SubmissionError {}

impl From<TimeError> for SubmissionError {
    fn from(err: TimeError) -> Self {
        SubmissionError::Time(err)
    }
}

/// A stored record whose millisecond value can't be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InconsistentRecord {
    pub record_id: u32,
    pub time_str: String,
    pub stored_ms: u32,
    pub decoded: Result<u32, TimeError>,
}

impl fmt::Display for InconsistentRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.decoded {
            Ok(ms) => write!(
                f,
                "Record {} stores {}ms but \"{}\" decodes to {}ms",
                self.record_id, self.stored_ms, self.time_str, ms
            ),
            Err(e) => write!(f, "Record {} has an unreadable time: {}", self.record_id, e),
        }
    }
}

impl Error for InconsistentRecord {}
