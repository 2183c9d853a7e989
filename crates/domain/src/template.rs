use derive_more::Deref;
use uuid::Uuid;

use crate::{CreateError, DeleteError, Name, ReadError, Reps, UpdateError};

#[allow(async_fn_in_trait)]
pub trait TemplateRepository {
    async fn read_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError>;
    async fn read_template(&self, id: TemplateID) -> Result<Option<WorkoutTemplate>, ReadError>;
    async fn create_template(
        &self,
        name: Name,
        notes: Option<String>,
        exercises: Vec<TemplateExercise>,
    ) -> Result<WorkoutTemplate, CreateError>;
    /// Replaces name, notes and the complete exercise list.
    async fn replace_template(
        &self,
        template: WorkoutTemplate,
    ) -> Result<WorkoutTemplate, UpdateError>;
    async fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait TemplateService {
    async fn get_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError>;
    async fn get_template(&self, id: TemplateID) -> Result<Option<WorkoutTemplate>, ReadError>;
    async fn create_template(
        &self,
        name: Name,
        notes: Option<String>,
        exercises: Vec<TemplateExercise>,
    ) -> Result<WorkoutTemplate, CreateError>;
    async fn replace_template(
        &self,
        template: WorkoutTemplate,
    ) -> Result<WorkoutTemplate, UpdateError>;
    async fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError>;
    async fn duplicate_template(&self, id: TemplateID) -> Result<WorkoutTemplate, CreateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutTemplate {
    pub id: TemplateID,
    pub name: Name,
    pub notes: Option<String>,
    pub exercises: Vec<TemplateExercise>,
}

impl WorkoutTemplate {
    /// Name of a copy created by duplication.
    pub fn copy_name(&self) -> Result<Name, crate::NameError> {
        Name::new(&format!("{} (Copy)", self.name))
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TemplateID(Uuid);

impl TemplateID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for TemplateID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for TemplateID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExercise {
    pub exercise_name: Name,
    pub target_sets: u32,
    pub target_reps: RepTarget,
    pub is_amrap: bool,
    pub notes: Option<String>,
}

/// Prescribed repetitions of a template exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepTarget {
    Fixed(Reps),
    Range { min: Reps, max: Reps },
}

impl RepTarget {
    pub fn range(min: Reps, max: Reps) -> Result<Self, RepTargetError> {
        if min > max {
            return Err(RepTargetError::InvertedRange);
        }

        Ok(RepTarget::Range { min, max })
    }

    /// Effective prescription when pre-filling a set.
    #[must_use]
    pub fn prescription(self) -> Reps {
        match self {
            RepTarget::Fixed(reps) | RepTarget::Range { min: reps, .. } => reps,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepTargetError {
    #[error("Minimum must not exceed maximum")]
    InvertedRange,
}
