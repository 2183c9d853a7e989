#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod exercise;
pub mod measurement;
pub mod metrics;
pub mod name;
pub mod schedule;
pub mod service;
pub mod session;
pub mod template;

pub use error::{CreateError, DeleteError, MergeError, ReadError, StorageError, UpdateError};
pub use exercise::{
    Exercise, ExerciseID, ExerciseRepository, ExerciseService, ExerciseType, ExerciseTypeError,
    MergeOutcome,
};
pub use measurement::{Reps, RepsError, Rpe, RpeError, Weight, WeightError};
pub use metrics::{
    BestE1rm, ExerciseStats, LoggedExercise, PrCheck, ProgressPoint, ProgressService, SessionSets,
    VolumeComparison, WeekComparison, WeeklyVolume, best_set, check_for_prs,
    estimated_one_rep_max, exercise_stats, monday_week_start, pr_session, progress_data,
    session_best_e1rm, sunday_week_start, volume_comparison, week_over_week, weekly_volume,
};
pub use name::{Name, NameError};
pub use schedule::{
    DayOfWeek, DayOfWeekError, ScheduleRepository, ScheduleService, ScheduledExercise,
    ScheduledWorkout, ScheduledWorkoutID, ScheduledWorkoutWithDetails,
};
pub use service::Service;
pub use session::{
    LoggedSet, LoggedSetID, NewLoggedSet, SessionID, SessionRepository, SessionService,
    SessionWithSets, WorkoutSession,
};
pub use template::{
    RepTarget, RepTargetError, TemplateExercise, TemplateID, TemplateRepository, TemplateService,
    WorkoutTemplate,
};
