use std::fmt;

use derive_more::Deref;
use uuid::Uuid;

use crate::{CreateError, DeleteError, MergeError, Name, ReadError, UpdateError};

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(
        &self,
        name: Name,
        exercise_type: ExerciseType,
        category: Option<String>,
    ) -> Result<Exercise, CreateError>;
    async fn modify_exercise(
        &self,
        id: ExerciseID,
        name: Option<Name>,
        exercise_type: Option<ExerciseType>,
        category: Option<Option<String>>,
    ) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
    /// Rewrite the exercise name on all logged sets, template exercises and
    /// scheduled exercises referring to `source`.
    async fn rewrite_exercise_name(
        &self,
        source: &Name,
        target: &Name,
    ) -> Result<MergeOutcome, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(
        &self,
        name: Name,
        exercise_type: ExerciseType,
        category: Option<String>,
    ) -> Result<Exercise, CreateError>;
    async fn modify_exercise(
        &self,
        id: ExerciseID,
        name: Option<Name>,
        exercise_type: Option<ExerciseType>,
        category: Option<Option<String>>,
    ) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
    async fn merge_exercises(&self, source: &Name, target: &Name)
    -> Result<MergeOutcome, MergeError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub category: Option<String>,
    pub exercise_type: ExerciseType,
    pub is_custom: bool,
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseType {
    #[default]
    Weighted,
    Bodyweight,
    Cardio,
}

impl ExerciseType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseType::Weighted => "weighted",
            ExerciseType::Bodyweight => "bodyweight",
            ExerciseType::Cardio => "cardio",
        }
    }
}

impl TryFrom<&str> for ExerciseType {
    type Error = ExerciseTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weighted" => Ok(ExerciseType::Weighted),
            "bodyweight" => Ok(ExerciseType::Bodyweight),
            "cardio" => Ok(ExerciseType::Cardio),
            _ => Err(ExerciseTypeError::Unknown(value.to_string())),
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseTypeError {
    #[error("Unknown exercise type: {0}")]
    Unknown(String),
}

/// Per-table rewrite counts of an exercise merge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    pub logged_sets: usize,
    pub template_exercises: usize,
    pub scheduled_exercises: usize,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_exercise_id_nil() {
        assert!(ExerciseID::nil().is_nil());
        assert!(!ExerciseID::from(1).is_nil());
    }

    #[rstest]
    #[case("weighted", Ok(ExerciseType::Weighted))]
    #[case("bodyweight", Ok(ExerciseType::Bodyweight))]
    #[case("cardio", Ok(ExerciseType::Cardio))]
    #[case(
        "isometric",
        Err(ExerciseTypeError::Unknown("isometric".to_string()))
    )]
    fn test_exercise_type_from_str(
        #[case] input: &str,
        #[case] expected: Result<ExerciseType, ExerciseTypeError>,
    ) {
        assert_eq!(ExerciseType::try_from(input), expected);
    }

    #[rstest]
    #[case(ExerciseType::Weighted, "weighted")]
    #[case(ExerciseType::Bodyweight, "bodyweight")]
    #[case(ExerciseType::Cardio, "cardio")]
    fn test_exercise_type_display(#[case] input: ExerciseType, #[case] expected: &str) {
        assert_eq!(input.to_string(), expected);
    }
}
