use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, Local, NaiveDate};
use log::{debug, error};

use crate::{
    CreateError, DayOfWeek, DeleteError, Exercise, ExerciseID, ExerciseRepository, ExerciseService,
    ExerciseStats, ExerciseType, LoggedExercise, LoggedSet, MergeError, MergeOutcome, Name,
    NewLoggedSet, PrCheck,
    ProgressPoint, ProgressService, ReadError, RepTarget, Reps, ScheduleRepository,
    ScheduleService, ScheduledExercise, ScheduledWorkoutID, ScheduledWorkoutWithDetails,
    SessionID, SessionRepository, SessionService, SessionSets, SessionWithSets, TemplateExercise,
    TemplateID, TemplateRepository, TemplateService, UpdateError, VolumeComparison,
    WeekComparison, WeeklyVolume, Weight, WorkoutSession, WorkoutTemplate, metrics,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn create_exercise(
        &self,
        name: Name,
        exercise_type: ExerciseType,
        category: Option<String>,
    ) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.repository.create_exercise(name, exercise_type, category),
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn modify_exercise(
        &self,
        id: ExerciseID,
        name: Option<Name>,
        exercise_type: Option<ExerciseType>,
        category: Option<Option<String>>,
    ) -> Result<Exercise, UpdateError> {
        log_on_error!(
            self.repository
                .modify_exercise(id, name, exercise_type, category),
            UpdateError,
            "modify",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
        let exercises = self
            .repository
            .read_exercises()
            .await
            .map_err(|err| match err {
                ReadError::Storage(storage) => DeleteError::Storage(storage),
                ReadError::Other(other) => DeleteError::Other(other),
            })?;

        if exercises.iter().any(|e| e.id == id && !e.is_custom) {
            return Err(DeleteError::Protected);
        }

        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }

    async fn merge_exercises(
        &self,
        source: &Name,
        target: &Name,
    ) -> Result<MergeOutcome, MergeError> {
        if source == target {
            return Err(MergeError::SourceIsTarget);
        }

        let exercises = self.repository.read_exercises().await?;

        if !exercises.iter().any(|e| e.name == *target) {
            return Err(MergeError::TargetMissing);
        }

        log_on_error!(
            self.repository.rewrite_exercise_name(source, target),
            UpdateError,
            "merge",
            "exercises"
        )
        .map_err(MergeError::from)
    }
}

impl<R: TemplateRepository> TemplateService for Service<R> {
    async fn get_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError> {
        log_on_error!(
            self.repository.read_templates(),
            ReadError,
            "get",
            "templates"
        )
    }

    async fn get_template(&self, id: TemplateID) -> Result<Option<WorkoutTemplate>, ReadError> {
        log_on_error!(
            self.repository.read_template(id),
            ReadError,
            "get",
            "template"
        )
    }

    async fn create_template(
        &self,
        name: Name,
        notes: Option<String>,
        exercises: Vec<TemplateExercise>,
    ) -> Result<WorkoutTemplate, CreateError> {
        log_on_error!(
            self.repository.create_template(name, notes, exercises),
            CreateError,
            "create",
            "template"
        )
    }

    async fn replace_template(
        &self,
        template: WorkoutTemplate,
    ) -> Result<WorkoutTemplate, UpdateError> {
        log_on_error!(
            self.repository.replace_template(template),
            UpdateError,
            "replace",
            "template"
        )
    }

    async fn delete_template(&self, id: TemplateID) -> Result<TemplateID, DeleteError> {
        log_on_error!(
            self.repository.delete_template(id),
            DeleteError,
            "delete",
            "template"
        )
    }

    async fn duplicate_template(&self, id: TemplateID) -> Result<WorkoutTemplate, CreateError> {
        let Some(template) = self.get_template(id).await? else {
            return Err(CreateError::Other("template not found".into()));
        };

        let name = template
            .copy_name()
            .map_err(|err| CreateError::Other(Box::new(err)))?;

        self.create_template(name, template.notes.clone(), template.exercises)
            .await
    }
}

impl<R: ScheduleRepository> ScheduleService for Service<R> {
    async fn get_scheduled_workouts(&self) -> Result<Vec<ScheduledWorkoutWithDetails>, ReadError> {
        let mut workouts = log_on_error!(
            self.repository.read_scheduled_workouts(),
            ReadError,
            "get",
            "scheduled workouts"
        )?;
        workouts.sort_by_key(|w| w.workout.day_of_week);
        Ok(workouts)
    }

    async fn get_scheduled_workouts_on(
        &self,
        day_of_week: DayOfWeek,
    ) -> Result<Vec<ScheduledWorkoutWithDetails>, ReadError> {
        Ok(self
            .get_scheduled_workouts()
            .await?
            .into_iter()
            .filter(|w| w.workout.day_of_week == day_of_week)
            .collect())
    }

    async fn schedule_workout(
        &self,
        template_id: TemplateID,
        day_of_week: DayOfWeek,
        exercises: Vec<ScheduledExercise>,
    ) -> Result<ScheduledWorkoutWithDetails, CreateError> {
        log_on_error!(
            self.repository
                .create_scheduled_workout(template_id, day_of_week, exercises),
            CreateError,
            "create",
            "scheduled workout"
        )
    }

    async fn replace_scheduled_exercises(
        &self,
        id: ScheduledWorkoutID,
        exercises: Vec<ScheduledExercise>,
    ) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.replace_scheduled_exercises(id, exercises),
            UpdateError,
            "replace",
            "scheduled exercises"
        )
    }

    async fn unschedule_workout(
        &self,
        id: ScheduledWorkoutID,
    ) -> Result<ScheduledWorkoutID, DeleteError> {
        log_on_error!(
            self.repository.delete_scheduled_workout(id),
            DeleteError,
            "delete",
            "scheduled workout"
        )
    }
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn start_workout_session(
        &self,
        template_id: Option<TemplateID>,
        date: NaiveDate,
    ) -> Result<WorkoutSession, CreateError> {
        log_on_error!(
            self.repository.create_workout_session(template_id, date),
            CreateError,
            "create",
            "workout session"
        )
    }

    async fn log_set(
        &self,
        session_id: SessionID,
        set: NewLoggedSet,
    ) -> Result<LoggedSet, CreateError> {
        log_on_error!(
            self.repository.create_logged_set(session_id, set),
            CreateError,
            "create",
            "logged set"
        )
    }

    async fn complete_workout_session(
        &self,
        id: SessionID,
        duration_minutes: u32,
        notes: Option<String>,
    ) -> Result<WorkoutSession, UpdateError> {
        log_on_error!(
            self.repository
                .modify_workout_session(id, Some(true), Some(duration_minutes), notes),
            UpdateError,
            "complete",
            "workout session"
        )
    }

    async fn abandon_workout_session(&self, id: SessionID) -> Result<SessionID, DeleteError> {
        log_on_error!(
            self.repository.delete_workout_session(id),
            DeleteError,
            "delete",
            "workout session"
        )
    }

    async fn get_workout_session_with_sets(
        &self,
        id: SessionID,
    ) -> Result<Option<SessionWithSets>, ReadError> {
        let Some(session) = log_on_error!(
            self.repository.read_workout_session(id),
            ReadError,
            "get",
            "workout session"
        )?
        else {
            return Ok(None);
        };

        let sets = log_on_error!(
            self.repository.read_logged_sets(id),
            ReadError,
            "get",
            "logged sets"
        )?;

        Ok(Some(SessionWithSets { session, sets }))
    }

    async fn get_recent_workout_sessions(
        &self,
        limit: usize,
    ) -> Result<Vec<SessionWithSets>, ReadError> {
        let mut sessions = log_on_error!(
            self.repository.read_workout_sessions(None),
            ReadError,
            "get",
            "workout sessions"
        )?
        .into_iter()
        .filter(|s| s.completed)
        .collect::<Vec<_>>();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));
        sessions.truncate(limit);

        let ids = sessions.iter().map(|s| s.id).collect::<Vec<_>>();
        let mut sets_by_session = group_by_session(log_on_error!(
            self.repository.read_logged_sets_of_sessions(&ids),
            ReadError,
            "get",
            "logged sets"
        )?);

        Ok(sessions
            .into_iter()
            .map(|session| {
                let sets = sets_by_session.remove(&session.id).unwrap_or_default();
                SessionWithSets { session, sets }
            })
            .collect())
    }
}

impl<R: SessionRepository> Service<R> {
    /// Sets of all completed sessions not older than `since`, grouped by
    /// session, most recent first.
    async fn completed_session_sets(
        &self,
        since: Option<NaiveDate>,
    ) -> Result<Vec<SessionSets>, ReadError> {
        let mut sessions = log_on_error!(
            self.repository.read_workout_sessions(since),
            ReadError,
            "get",
            "workout sessions"
        )?
        .into_iter()
        .filter(|s| s.completed)
        .collect::<Vec<_>>();
        sessions.sort_by(|a, b| b.date.cmp(&a.date));

        let ids = sessions.iter().map(|s| s.id).collect::<Vec<_>>();
        let mut sets_by_session = group_by_session(log_on_error!(
            self.repository.read_logged_sets_of_sessions(&ids),
            ReadError,
            "get",
            "logged sets"
        )?);

        Ok(sessions
            .into_iter()
            .map(|session| SessionSets {
                session_id: session.id,
                date: session.date,
                sets: sets_by_session.remove(&session.id).unwrap_or_default(),
            })
            .collect())
    }
}

impl<R: SessionRepository + ExerciseRepository> ProgressService for Service<R> {
    async fn get_logged_exercises(&self) -> Result<Vec<LoggedExercise>, ReadError> {
        let sessions = self.completed_session_sets(None).await?;
        let exercises = log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )?;

        let mut names = BTreeSet::new();
        for session in &sessions {
            for set in &session.sets {
                names.insert(set.exercise_name.clone());
            }
        }

        Ok(names
            .into_iter()
            .map(|name| {
                let exercise_type = exercises
                    .iter()
                    .find(|e| e.name == name)
                    .map(|e| e.exercise_type)
                    .unwrap_or_default();
                LoggedExercise {
                    name,
                    exercise_type,
                }
            })
            .collect())
    }

    async fn get_exercise_history(
        &self,
        exercise_name: &Name,
    ) -> Result<Vec<SessionSets>, ReadError> {
        Ok(self
            .completed_session_sets(None)
            .await?
            .into_iter()
            .map(|mut session| {
                session.sets.retain(|s| s.exercise_name == *exercise_name);
                session
            })
            .filter(|session| !session.sets.is_empty())
            .collect())
    }

    async fn get_exercise_stats(
        &self,
        exercise_name: &Name,
    ) -> Result<Option<ExerciseStats>, ReadError> {
        let history = self.get_exercise_history(exercise_name).await?;
        Ok(metrics::exercise_stats(exercise_name, &history))
    }

    async fn check_for_prs(
        &self,
        exercise_name: &Name,
        weight: Weight,
        reps: Reps,
    ) -> Result<PrCheck, ReadError> {
        let stats = self.get_exercise_stats(exercise_name).await?;
        Ok(metrics::check_for_prs(weight, reps, stats.as_ref()))
    }

    async fn get_progress_data(
        &self,
        exercise_name: &Name,
    ) -> Result<Vec<ProgressPoint>, ReadError> {
        let history = self.get_exercise_history(exercise_name).await?;
        Ok(metrics::progress_data(&history))
    }

    async fn get_weekly_volume(&self, weeks: usize) -> Result<Vec<WeeklyVolume>, ReadError> {
        let today = Local::now().date_naive();
        #[allow(clippy::cast_possible_wrap)]
        let since = metrics::monday_week_start(today) - Duration::weeks(weeks as i64 - 1);
        let sessions = self.completed_session_sets(Some(since)).await?;
        Ok(metrics::weekly_volume(&sessions, today, weeks))
    }

    async fn get_week_comparisons(
        &self,
        weeks_back: u32,
    ) -> Result<Vec<WeekComparison>, ReadError> {
        let today = Local::now().date_naive();
        let since =
            metrics::sunday_week_start(today) - Duration::weeks(i64::from(weeks_back));
        let sessions = self.completed_session_sets(Some(since)).await?;
        Ok(metrics::week_over_week(&sessions, today, weeks_back))
    }

    async fn get_volume_comparison(&self) -> Result<VolumeComparison, ReadError> {
        let today = Local::now().date_naive();
        let since = metrics::monday_week_start(today) - Duration::days(7);
        let sessions = self.completed_session_sets(Some(since)).await?;
        Ok(metrics::volume_comparison(&sessions, today))
    }
}

fn group_by_session(sets: Vec<LoggedSet>) -> BTreeMap<SessionID, Vec<LoggedSet>> {
    let mut result: BTreeMap<SessionID, Vec<LoggedSet>> = BTreeMap::new();
    for set in sets {
        result.entry(set.session_id).or_default().push(set);
    }
    result
}
