#![warn(clippy::pedantic)]

pub mod context;
pub mod guided_workout;
pub mod log;
pub mod service;
pub mod settings;
pub mod speculative;
pub mod templates;

pub use context::{AppContext, AuthUser};
pub use guided_workout::{
    ExercisePlan, GuidedWorkout, GuidedWorkoutController, Phase, PlannedSet, WorkoutError,
};
pub use service::Service;
pub use settings::{Settings, SettingsRepository, SettingsService, Theme};
pub use templates::TemplateList;
