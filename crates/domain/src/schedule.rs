use std::fmt;

use derive_more::{Deref, Into};
use uuid::Uuid;

use crate::{
    CreateError, DeleteError, Name, ReadError, TemplateID, UpdateError, Weight, WorkoutTemplate,
};

#[allow(async_fn_in_trait)]
pub trait ScheduleRepository {
    async fn read_scheduled_workouts(&self) -> Result<Vec<ScheduledWorkoutWithDetails>, ReadError>;
    async fn create_scheduled_workout(
        &self,
        template_id: TemplateID,
        day_of_week: DayOfWeek,
        exercises: Vec<ScheduledExercise>,
    ) -> Result<ScheduledWorkoutWithDetails, CreateError>;
    /// Replaces the complete list of weight overrides.
    async fn replace_scheduled_exercises(
        &self,
        id: ScheduledWorkoutID,
        exercises: Vec<ScheduledExercise>,
    ) -> Result<(), UpdateError>;
    async fn delete_scheduled_workout(
        &self,
        id: ScheduledWorkoutID,
    ) -> Result<ScheduledWorkoutID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait ScheduleService {
    /// All scheduled workouts ordered by day of week.
    async fn get_scheduled_workouts(&self) -> Result<Vec<ScheduledWorkoutWithDetails>, ReadError>;
    async fn get_scheduled_workouts_on(
        &self,
        day_of_week: DayOfWeek,
    ) -> Result<Vec<ScheduledWorkoutWithDetails>, ReadError>;
    async fn schedule_workout(
        &self,
        template_id: TemplateID,
        day_of_week: DayOfWeek,
        exercises: Vec<ScheduledExercise>,
    ) -> Result<ScheduledWorkoutWithDetails, CreateError>;
    async fn replace_scheduled_exercises(
        &self,
        id: ScheduledWorkoutID,
        exercises: Vec<ScheduledExercise>,
    ) -> Result<(), UpdateError>;
    async fn unschedule_workout(
        &self,
        id: ScheduledWorkoutID,
    ) -> Result<ScheduledWorkoutID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledWorkout {
    pub id: ScheduledWorkoutID,
    pub template_id: TemplateID,
    pub day_of_week: DayOfWeek,
    pub exercises: Vec<ScheduledExercise>,
}

/// Scheduled workout joined with its template.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledWorkoutWithDetails {
    pub workout: ScheduledWorkout,
    pub template: WorkoutTemplate,
}

impl ScheduledWorkoutWithDetails {
    /// Weight override of an exercise, zero when no override is set.
    #[must_use]
    pub fn target_weight(&self, exercise_name: &Name) -> Weight {
        self.workout
            .exercises
            .iter()
            .find(|e| e.exercise_name == *exercise_name)
            .map(|e| e.target_weight)
            .unwrap_or_default()
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScheduledWorkoutID(Uuid);

impl ScheduledWorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ScheduledWorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ScheduledWorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledExercise {
    pub exercise_name: Name,
    pub target_weight: Weight,
}

/// Day of week, Sunday is 0.
#[derive(Debug, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: DayOfWeek = DayOfWeek(0);
    pub const MONDAY: DayOfWeek = DayOfWeek(1);
    pub const TUESDAY: DayOfWeek = DayOfWeek(2);
    pub const WEDNESDAY: DayOfWeek = DayOfWeek(3);
    pub const THURSDAY: DayOfWeek = DayOfWeek(4);
    pub const FRIDAY: DayOfWeek = DayOfWeek(5);
    pub const SATURDAY: DayOfWeek = DayOfWeek(6);

    pub fn new(value: u8) -> Result<Self, DayOfWeekError> {
        if value > 6 {
            return Err(DayOfWeekError::OutOfRange);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "Sunday",
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            _ => "Saturday",
        }
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    #[allow(clippy::cast_possible_truncation)]
    fn from(value: chrono::Weekday) -> Self {
        Self(value.num_days_from_sunday() as u8)
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DayOfWeekError {
    #[error("Day of week must be in the range 0 to 6")]
    OutOfRange,
}
