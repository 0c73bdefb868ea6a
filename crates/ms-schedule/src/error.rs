use thiserror::Error;

use ms_core::Event;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("event time must be finite ({0})")]
    NonFiniteTime(Event),

    #[error("event period must be a non-negative number ({0})")]
    InvalidPeriod(Event),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
