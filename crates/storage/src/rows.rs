//! Row representations of the hosted tables.
//!
//! Rows carry the raw column values. Validation happens when a row is
//! converted into its domain type.

use chrono::NaiveDate;
use repbook_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RowError {
    #[error(transparent)]
    Name(#[from] domain::NameError),
    #[error(transparent)]
    ExerciseType(#[from] domain::ExerciseTypeError),
    #[error(transparent)]
    Reps(#[from] domain::RepsError),
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
    #[error(transparent)]
    Rpe(#[from] domain::RpeError),
    #[error(transparent)]
    RepTarget(#[from] domain::RepTargetError),
    #[error(transparent)]
    DayOfWeek(#[from] domain::DayOfWeekError),
}

impl From<RowError> for domain::StorageError {
    fn from(value: RowError) -> Self {
        domain::StorageError::Other(Box::new(value))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExerciseRow {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub exercise_type: String,
    pub is_custom: bool,
}

impl TryFrom<ExerciseRow> for domain::Exercise {
    type Error = RowError;

    fn try_from(row: ExerciseRow) -> Result<Self, Self::Error> {
        Ok(domain::Exercise {
            id: row.id.into(),
            name: domain::Name::new(&row.name)?,
            category: row.category,
            exercise_type: domain::ExerciseType::try_from(&*row.exercise_type)?,
            is_custom: row.is_custom,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TemplateRow {
    pub id: Uuid,
    pub name: String,
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TemplateExerciseRow {
    pub template_id: Uuid,
    pub exercise_name: String,
    pub target_sets: u32,
    pub target_reps_min: u32,
    pub target_reps_max: Option<u32>,
    pub is_amrap: bool,
    pub order_index: u32,
    pub notes: Option<String>,
}

impl TryFrom<TemplateExerciseRow> for domain::TemplateExercise {
    type Error = RowError;

    fn try_from(row: TemplateExerciseRow) -> Result<Self, Self::Error> {
        let min = domain::Reps::new(row.target_reps_min)?;
        let target_reps = match row.target_reps_max {
            Some(max) if max > row.target_reps_min => {
                domain::RepTarget::range(min, domain::Reps::new(max)?)?
            }
            _ => domain::RepTarget::Fixed(min),
        };
        Ok(domain::TemplateExercise {
            exercise_name: domain::Name::new(&row.exercise_name)?,
            target_sets: row.target_sets,
            target_reps,
            is_amrap: row.is_amrap,
            notes: row.notes,
        })
    }
}

/// Assembles a template from its parent row and its ordered exercise rows.
pub fn template(
    row: TemplateRow,
    exercises: Vec<TemplateExerciseRow>,
) -> Result<domain::WorkoutTemplate, RowError> {
    Ok(domain::WorkoutTemplate {
        id: row.id.into(),
        name: domain::Name::new(&row.name)?,
        notes: row.notes,
        exercises: exercises
            .into_iter()
            .map(domain::TemplateExercise::try_from)
            .collect::<Result<_, _>>()?,
    })
}

/// Column values of a template exercise to be inserted.
#[must_use]
pub fn template_exercise_columns(
    template_id: Uuid,
    order_index: u32,
    exercise: &domain::TemplateExercise,
) -> serde_json::Value {
    let (target_reps_min, target_reps_max) = match exercise.target_reps {
        domain::RepTarget::Fixed(reps) => (u32::from(reps), None),
        domain::RepTarget::Range { min, max } => (u32::from(min), Some(u32::from(max))),
    };
    serde_json::json!({
        "template_id": template_id,
        "exercise_name": exercise.exercise_name.as_str(),
        "target_sets": exercise.target_sets,
        "target_reps_min": target_reps_min,
        "target_reps_max": target_reps_max,
        "is_amrap": exercise.is_amrap,
        "order_index": order_index,
        "notes": exercise.notes,
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduledWorkoutRow {
    pub id: Uuid,
    pub template_id: Uuid,
    pub day_of_week: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduledExerciseRow {
    pub scheduled_workout_id: Uuid,
    pub exercise_name: String,
    pub target_weight: f32,
}

impl TryFrom<ScheduledExerciseRow> for domain::ScheduledExercise {
    type Error = RowError;

    fn try_from(row: ScheduledExerciseRow) -> Result<Self, Self::Error> {
        Ok(domain::ScheduledExercise {
            exercise_name: domain::Name::new(&row.exercise_name)?,
            target_weight: domain::Weight::new(row.target_weight)?,
        })
    }
}

/// Assembles a scheduled workout from its parent row and its exercise rows.
pub fn scheduled_workout(
    row: ScheduledWorkoutRow,
    exercises: Vec<ScheduledExerciseRow>,
) -> Result<domain::ScheduledWorkout, RowError> {
    Ok(domain::ScheduledWorkout {
        id: row.id.into(),
        template_id: row.template_id.into(),
        day_of_week: domain::DayOfWeek::new(row.day_of_week)?,
        exercises: exercises
            .into_iter()
            .map(domain::ScheduledExercise::try_from)
            .collect::<Result<_, _>>()?,
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub id: Uuid,
    pub template_id: Option<Uuid>,
    pub date: NaiveDate,
    pub completed: bool,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

impl From<SessionRow> for domain::WorkoutSession {
    fn from(row: SessionRow) -> Self {
        domain::WorkoutSession {
            id: row.id.into(),
            template_id: row.template_id.map(Into::into),
            date: row.date,
            completed: row.completed,
            duration_minutes: row.duration_minutes,
            notes: row.notes,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggedSetRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub exercise_name: String,
    pub set_number: u32,
    pub weight: f32,
    pub reps: u32,
    pub rpe: Option<f32>,
    pub notes: Option<String>,
}

impl TryFrom<LoggedSetRow> for domain::LoggedSet {
    type Error = RowError;

    fn try_from(row: LoggedSetRow) -> Result<Self, Self::Error> {
        Ok(domain::LoggedSet {
            id: row.id.into(),
            session_id: row.session_id.into(),
            exercise_name: domain::Name::new(&row.exercise_name)?,
            set_number: row.set_number,
            weight: domain::Weight::new(row.weight)?,
            reps: domain::Reps::new(row.reps)?,
            rpe: row.rpe.map(domain::Rpe::new).transpose()?,
            notes: row.notes,
        })
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: TokenUser,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TokenUser {
    pub id: Uuid,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_exercise_row_conversion() {
        let exercise = domain::Exercise::try_from(ExerciseRow {
            id: Uuid::from_u128(1),
            name: String::from("Bench Press"),
            category: Some(String::from("Chest")),
            exercise_type: String::from("weighted"),
            is_custom: false,
        })
        .unwrap();

        assert_eq!(exercise.name, domain::Name::new("Bench Press").unwrap());
        assert_eq!(exercise.exercise_type, domain::ExerciseType::Weighted);
        assert!(!exercise.is_custom);
    }

    #[test]
    fn test_exercise_row_conversion_with_unknown_type() {
        let result = domain::Exercise::try_from(ExerciseRow {
            id: Uuid::from_u128(1),
            name: String::from("Bench Press"),
            category: None,
            exercise_type: String::from("isometric"),
            is_custom: false,
        });

        assert_eq!(
            result,
            Err(RowError::ExerciseType(
                domain::ExerciseTypeError::Unknown(String::from("isometric"))
            ))
        );
    }

    #[rstest]
    #[case(5, None, domain::RepTarget::Fixed(domain::Reps::new(5).unwrap()))]
    #[case(5, Some(5), domain::RepTarget::Fixed(domain::Reps::new(5).unwrap()))]
    #[case(
        5,
        Some(8),
        domain::RepTarget::Range {
            min: domain::Reps::new(5).unwrap(),
            max: domain::Reps::new(8).unwrap()
        }
    )]
    fn test_template_exercise_row_rep_target(
        #[case] target_reps_min: u32,
        #[case] target_reps_max: Option<u32>,
        #[case] expected: domain::RepTarget,
    ) {
        let exercise = domain::TemplateExercise::try_from(TemplateExerciseRow {
            template_id: Uuid::from_u128(1),
            exercise_name: String::from("Pull Ups"),
            target_sets: 3,
            target_reps_min,
            target_reps_max,
            is_amrap: false,
            order_index: 0,
            notes: None,
        })
        .unwrap();

        assert_eq!(exercise.target_reps, expected);
    }

    #[test]
    fn test_template_exercise_columns_round_trip() {
        let exercise = domain::TemplateExercise {
            exercise_name: domain::Name::new("Pull Ups").unwrap(),
            target_sets: 3,
            target_reps: domain::RepTarget::range(
                domain::Reps::new(5).unwrap(),
                domain::Reps::new(8).unwrap(),
            )
            .unwrap(),
            is_amrap: true,
            notes: Some(String::from("full range of motion")),
        };

        let columns = template_exercise_columns(Uuid::from_u128(1), 2, &exercise);
        let row: TemplateExerciseRow = serde_json::from_value(columns).unwrap();

        assert_eq!(row.order_index, 2);
        assert_eq!(
            domain::TemplateExercise::try_from(row).unwrap(),
            exercise
        );
    }

    #[test]
    fn test_scheduled_workout_assembly() {
        let workout = scheduled_workout(
            ScheduledWorkoutRow {
                id: Uuid::from_u128(1),
                template_id: Uuid::from_u128(2),
                day_of_week: 3,
            },
            vec![ScheduledExerciseRow {
                scheduled_workout_id: Uuid::from_u128(1),
                exercise_name: String::from("Squat"),
                target_weight: 102.5,
            }],
        )
        .unwrap();

        assert_eq!(workout.day_of_week, domain::DayOfWeek::WEDNESDAY);
        assert_eq!(
            workout.exercises[0].target_weight,
            domain::Weight::new(102.5).unwrap()
        );
    }

    #[test]
    fn test_logged_set_row_conversion() {
        let set = domain::LoggedSet::try_from(LoggedSetRow {
            id: Uuid::from_u128(1),
            session_id: Uuid::from_u128(2),
            exercise_name: String::from("Deadlift"),
            set_number: 1,
            weight: 140.0,
            reps: 5,
            rpe: Some(8.5),
            notes: None,
        })
        .unwrap();

        assert_eq!(set.weight, domain::Weight::new(140.0).unwrap());
        assert_eq!(set.rpe, Some(domain::Rpe::new(8.5).unwrap()));
    }

    #[test]
    fn test_logged_set_row_conversion_with_invalid_rpe() {
        let result = domain::LoggedSet::try_from(LoggedSetRow {
            id: Uuid::from_u128(1),
            session_id: Uuid::from_u128(2),
            exercise_name: String::from("Deadlift"),
            set_number: 1,
            weight: 140.0,
            reps: 5,
            rpe: Some(11.0),
            notes: None,
        });

        assert!(matches!(result, Err(RowError::Rpe(_))));
    }

    #[test]
    fn test_session_row_deserialization() {
        let row: SessionRow = serde_json::from_str(
            r#"{
                "id": "00000000-0000-0000-0000-000000000001",
                "template_id": null,
                "date": "2025-03-12",
                "completed": true,
                "duration_minutes": 42,
                "notes": "felt strong"
            }"#,
        )
        .unwrap();

        let session = domain::WorkoutSession::from(row);
        assert_eq!(session.template_id, None);
        assert_eq!(session.duration_minutes, Some(42));
    }
}
