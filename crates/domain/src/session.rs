use chrono::NaiveDate;
use derive_more::Deref;
use uuid::Uuid;

use crate::{CreateError, DeleteError, Name, ReadError, Reps, Rpe, TemplateID, UpdateError, Weight};

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn read_workout_sessions(
        &self,
        since: Option<NaiveDate>,
    ) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn read_workout_session(
        &self,
        id: SessionID,
    ) -> Result<Option<WorkoutSession>, ReadError>;
    async fn read_logged_sets(&self, session_id: SessionID) -> Result<Vec<LoggedSet>, ReadError>;
    async fn read_logged_sets_of_sessions(
        &self,
        session_ids: &[SessionID],
    ) -> Result<Vec<LoggedSet>, ReadError>;
    async fn create_workout_session(
        &self,
        template_id: Option<TemplateID>,
        date: NaiveDate,
    ) -> Result<WorkoutSession, CreateError>;
    async fn create_logged_set(
        &self,
        session_id: SessionID,
        set: NewLoggedSet,
    ) -> Result<LoggedSet, CreateError>;
    async fn modify_workout_session(
        &self,
        id: SessionID,
        completed: Option<bool>,
        duration_minutes: Option<u32>,
        notes: Option<String>,
    ) -> Result<WorkoutSession, UpdateError>;
    /// Deletes the session and, by cascade, all of its logged sets.
    async fn delete_workout_session(&self, id: SessionID) -> Result<SessionID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn start_workout_session(
        &self,
        template_id: Option<TemplateID>,
        date: NaiveDate,
    ) -> Result<WorkoutSession, CreateError>;
    async fn log_set(
        &self,
        session_id: SessionID,
        set: NewLoggedSet,
    ) -> Result<LoggedSet, CreateError>;
    async fn complete_workout_session(
        &self,
        id: SessionID,
        duration_minutes: u32,
        notes: Option<String>,
    ) -> Result<WorkoutSession, UpdateError>;
    async fn abandon_workout_session(&self, id: SessionID) -> Result<SessionID, DeleteError>;
    async fn get_workout_session_with_sets(
        &self,
        id: SessionID,
    ) -> Result<Option<SessionWithSets>, ReadError>;
    async fn get_recent_workout_sessions(
        &self,
        limit: usize,
    ) -> Result<Vec<SessionWithSets>, ReadError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: SessionID,
    pub template_id: Option<TemplateID>,
    pub date: NaiveDate,
    pub completed: bool,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionID(Uuid);

impl SessionID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for SessionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SessionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSet {
    pub id: LoggedSetID,
    pub session_id: SessionID,
    pub exercise_name: Name,
    pub set_number: u32,
    pub weight: Weight,
    pub reps: Reps,
    pub rpe: Option<Rpe>,
    pub notes: Option<String>,
}

impl LoggedSet {
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.weight * self.reps
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoggedSetID(Uuid);

impl LoggedSetID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for LoggedSetID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for LoggedSetID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Set data as logged during a workout, before the storage assigned an ID.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoggedSet {
    pub exercise_name: Name,
    pub set_number: u32,
    pub weight: Weight,
    pub reps: Reps,
    pub rpe: Option<Rpe>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionWithSets {
    pub session: WorkoutSession,
    pub sets: Vec<LoggedSet>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_session_id_nil() {
        assert!(SessionID::nil().is_nil());
        assert!(!SessionID::from(1).is_nil());
    }

    #[test]
    fn test_logged_set_id_nil() {
        assert!(LoggedSetID::nil().is_nil());
        assert!(!LoggedSetID::from(1).is_nil());
    }

    #[rstest]
    #[case(100.0, 10, 1000.0)]
    #[case(0.0, 10, 0.0)]
    #[case(62.5, 8, 500.0)]
    fn test_logged_set_volume(#[case] weight: f32, #[case] reps: u32, #[case] expected: f32) {
        let set = LoggedSet {
            id: 1.into(),
            session_id: 2.into(),
            exercise_name: Name::new("Bench Press").unwrap(),
            set_number: 1,
            weight: Weight::new(weight).unwrap(),
            reps: Reps::new(reps).unwrap(),
            rpe: None,
            notes: None,
        };

        assert_eq!(set.volume(), expected);
    }
}
