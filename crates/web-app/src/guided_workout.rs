use chrono::{DateTime, Duration, Utc};
use repbook_domain::{
    CreateError, DeleteError, LoggedSetID, Name, NewLoggedSet, Reps, ScheduledWorkoutWithDetails,
    SessionID, SessionService, UpdateError, Weight, WorkoutSession,
};

pub const REST_SECONDS: i64 = 90;

/// State of a guided workout.
///
/// All transitions are pure and take the current time as an argument. Set
/// completion is applied only after the logged set has been persisted, so a
/// failed request leaves the workout unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct GuidedWorkout {
    session_id: SessionID,
    start_time: DateTime<Utc>,
    exercises: Vec<ExercisePlan>,
    phase: Phase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExercisePlan {
    pub name: Name,
    pub is_amrap: bool,
    pub sets: Vec<PlannedSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSet {
    pub logged_id: Option<LoggedSetID>,
    pub weight: Weight,
    pub reps: Reps,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ActiveSet {
        exercise: usize,
        set: usize,
    },
    Resting {
        until: DateTime<Utc>,
        exercise: usize,
        set: usize,
    },
    Complete,
    Aborted,
}

impl GuidedWorkout {
    /// Pre-fills the set skeleton from the template targets and the
    /// schedule's weight overrides.
    #[must_use]
    pub fn new(
        session_id: SessionID,
        schedule: &ScheduledWorkoutWithDetails,
        start_time: DateTime<Utc>,
    ) -> Self {
        let exercises = schedule
            .template
            .exercises
            .iter()
            .filter(|e| e.target_sets > 0)
            .map(|e| {
                let weight = schedule.target_weight(&e.exercise_name);
                let reps = e.target_reps.prescription();
                ExercisePlan {
                    name: e.exercise_name.clone(),
                    is_amrap: e.is_amrap,
                    sets: (0..e.target_sets)
                        .map(|_| PlannedSet {
                            logged_id: None,
                            weight,
                            reps,
                            completed: false,
                        })
                        .collect(),
                }
            })
            .collect::<Vec<_>>();

        let phase = if exercises.is_empty() {
            Phase::Complete
        } else {
            Phase::ActiveSet {
                exercise: 0,
                set: 0,
            }
        };

        Self {
            session_id,
            start_time,
            exercises,
            phase,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionID {
        self.session_id
    }

    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub fn exercises(&self) -> &[ExercisePlan] {
        &self.exercises
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.phase == Phase::Aborted
    }

    /// Active or upcoming set.
    #[must_use]
    pub fn current_set(&self) -> Option<(&ExercisePlan, &PlannedSet)> {
        match self.phase {
            Phase::ActiveSet { exercise, set } | Phase::Resting { exercise, set, .. } => {
                let plan = &self.exercises[exercise];
                Some((plan, &plan.sets[set]))
            }
            Phase::Complete | Phase::Aborted => None,
        }
    }

    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .count()
    }

    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Weight of the active set, clamped at zero. Ignored while resting.
    pub fn adjust_weight(&mut self, delta: f32) {
        if let Phase::ActiveSet { exercise, set } = self.phase {
            let set = &mut self.exercises[exercise].sets[set];
            set.weight = set.weight.saturating_add(delta);
        }
    }

    /// Reps of the active set, floored at one. While resting only the
    /// upcoming set of an AMRAP exercise is adjustable.
    pub fn adjust_reps(&mut self, delta: i32) {
        let (exercise, set) = match self.phase {
            Phase::ActiveSet { exercise, set } => (exercise, set),
            Phase::Resting { exercise, set, .. } if self.exercises[exercise].is_amrap => {
                (exercise, set)
            }
            _ => return,
        };
        let set = &mut self.exercises[exercise].sets[set];
        let adjusted = set.reps.saturating_add(delta);
        set.reps = if adjusted < Reps::ONE {
            Reps::ONE
        } else {
            adjusted
        };
    }

    /// Insert payload of the active set.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn draft_current_set(&self) -> Option<NewLoggedSet> {
        let Phase::ActiveSet { exercise, set } = self.phase else {
            return None;
        };
        let plan = &self.exercises[exercise];
        let planned = &plan.sets[set];
        Some(NewLoggedSet {
            exercise_name: plan.name.clone(),
            set_number: set as u32 + 1,
            weight: planned.weight,
            reps: planned.reps,
            rpe: None,
            notes: None,
        })
    }

    /// Marks the active set as completed and advances the cursor.
    ///
    /// For AMRAP exercises the performed reps carry over to the next set of
    /// the same exercise. Advancing past the last exercise yields `Complete`
    /// without a rest interval. A repeated call has no effect.
    pub fn apply_set_logged(&mut self, id: LoggedSetID, now: DateTime<Utc>) {
        let Phase::ActiveSet { exercise, set } = self.phase else {
            return;
        };

        let has_next_set = {
            let plan = &mut self.exercises[exercise];
            let current = &mut plan.sets[set];
            current.logged_id = Some(id);
            current.completed = true;
            let performed = current.reps;
            if plan.is_amrap && set + 1 < plan.sets.len() {
                plan.sets[set + 1].reps = performed;
            }
            set + 1 < plan.sets.len()
        };

        let (next_exercise, next_set) = if has_next_set {
            (exercise, set + 1)
        } else {
            (exercise + 1, 0)
        };

        self.phase = if next_exercise < self.exercises.len() {
            Phase::Resting {
                until: now + Duration::seconds(REST_SECONDS),
                exercise: next_exercise,
                set: next_set,
            }
        } else {
            Phase::Complete
        };
    }

    /// Ends the rest when its interval has expired.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Phase::Resting {
            until,
            exercise,
            set,
        } = self.phase
        {
            if now >= until {
                self.phase = Phase::ActiveSet { exercise, set };
            }
        }
    }

    pub fn skip_rest(&mut self) {
        if let Phase::Resting { exercise, set, .. } = self.phase {
            self.phase = Phase::ActiveSet { exercise, set };
        }
    }

    pub fn mark_aborted(&mut self) {
        self.phase = Phase::Aborted;
    }

    #[must_use]
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss
        )]
        {
            ((now - self.start_time).num_seconds().max(0) as f64 / 60.0).round() as u32
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WorkoutError {
    #[error("failed to start workout: {0}")]
    Start(#[source] CreateError),
    #[error("failed to log set: {0}")]
    LogSet(#[source] CreateError),
    #[error("no active set")]
    NoActiveSet,
    #[error("workout is not complete")]
    NotComplete,
    #[error("failed to save workout: {0}")]
    Finish(#[source] UpdateError),
    #[error("failed to abandon workout: {0}")]
    Abandon(#[source] DeleteError),
}

/// Coordinates the guided workout with the session service.
///
/// Every mutating call awaits the service first and applies the state
/// transition only on success, so failures are retryable. There are no
/// automatic retries and no overlapping in-flight requests.
pub struct GuidedWorkoutController<S> {
    service: S,
    workout: GuidedWorkout,
}

impl<S: SessionService> GuidedWorkoutController<S> {
    /// Creates the workout session. Failure is fatal, no local state exists
    /// yet.
    pub async fn start(
        service: S,
        schedule: &ScheduledWorkoutWithDetails,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkoutError> {
        let session = service
            .start_workout_session(Some(schedule.workout.template_id), now.date_naive())
            .await
            .map_err(WorkoutError::Start)?;

        Ok(Self {
            service,
            workout: GuidedWorkout::new(session.id, schedule, now),
        })
    }

    #[must_use]
    pub fn workout(&self) -> &GuidedWorkout {
        &self.workout
    }

    pub fn workout_mut(&mut self) -> &mut GuidedWorkout {
        &mut self.workout
    }

    pub async fn complete_set(&mut self, now: DateTime<Utc>) -> Result<(), WorkoutError> {
        let set = self
            .workout
            .draft_current_set()
            .ok_or(WorkoutError::NoActiveSet)?;
        let logged = self
            .service
            .log_set(self.workout.session_id, set)
            .await
            .map_err(WorkoutError::LogSet)?;
        self.workout.apply_set_logged(logged.id, now);
        Ok(())
    }

    pub async fn finish(
        &mut self,
        now: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<WorkoutSession, WorkoutError> {
        if !self.workout.is_complete() {
            return Err(WorkoutError::NotComplete);
        }
        self.service
            .complete_workout_session(
                self.workout.session_id,
                self.workout.elapsed_minutes(now),
                notes,
            )
            .await
            .map_err(WorkoutError::Finish)
    }

    /// Deletes the session and all of its sets.
    pub async fn abandon(&mut self) -> Result<SessionID, WorkoutError> {
        let id = self
            .service
            .abandon_workout_session(self.workout.session_id)
            .await
            .map_err(WorkoutError::Abandon)?;
        self.workout.mark_aborted();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use repbook_domain::{
        DayOfWeek, LoggedSet, ReadError, RepTarget, ScheduledExercise, ScheduledWorkout,
        SessionWithSets, StorageError, TemplateExercise, TemplateID, WorkoutTemplate,
    };
    use rstest::rstest;

    use super::*;

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, 18, 0, 0).unwrap()
    }

    fn schedule() -> ScheduledWorkoutWithDetails {
        ScheduledWorkoutWithDetails {
            workout: ScheduledWorkout {
                id: 1.into(),
                template_id: 2.into(),
                day_of_week: DayOfWeek::WEDNESDAY,
                exercises: vec![ScheduledExercise {
                    exercise_name: Name::new("Bench Press").unwrap(),
                    target_weight: Weight::new(100.0).unwrap(),
                }],
            },
            template: WorkoutTemplate {
                id: 2.into(),
                name: Name::new("Push Day").unwrap(),
                notes: None,
                exercises: vec![
                    TemplateExercise {
                        exercise_name: Name::new("Bench Press").unwrap(),
                        target_sets: 2,
                        target_reps: RepTarget::Fixed(Reps::new(5).unwrap()),
                        is_amrap: false,
                        notes: None,
                    },
                    TemplateExercise {
                        exercise_name: Name::new("Pull Ups").unwrap(),
                        target_sets: 3,
                        target_reps: RepTarget::range(
                            Reps::new(5).unwrap(),
                            Reps::new(8).unwrap(),
                        )
                        .unwrap(),
                        is_amrap: true,
                        notes: None,
                    },
                ],
            },
        }
    }

    fn workout() -> GuidedWorkout {
        GuidedWorkout::new(1.into(), &schedule(), start_time())
    }

    #[test]
    fn test_new_prefills_sets() {
        let workout = workout();

        assert_eq!(workout.exercises().len(), 2);
        assert_eq!(workout.exercises()[0].sets.len(), 2);
        assert_eq!(
            workout.exercises()[0].sets[0].weight,
            Weight::new(100.0).unwrap()
        );
        assert_eq!(workout.exercises()[0].sets[0].reps, Reps::new(5).unwrap());
        assert!(!workout.exercises()[1].sets[0].completed);
        // no weight override for the second exercise
        assert_eq!(workout.exercises()[1].sets[0].weight, Weight::default());
        assert_eq!(workout.exercises()[1].sets[0].reps, Reps::new(5).unwrap());
        assert_eq!(
            workout.phase(),
            Phase::ActiveSet {
                exercise: 0,
                set: 0
            }
        );
        assert_eq!(workout.total_sets(), 5);
        assert_eq!(workout.completed_sets(), 0);
    }

    #[test]
    fn test_new_empty_plan_is_complete() {
        let mut schedule = schedule();
        schedule.template.exercises.clear();

        let workout = GuidedWorkout::new(1.into(), &schedule, start_time());

        assert!(workout.is_complete());
        assert_eq!(workout.current_set(), None);
    }

    #[test]
    fn test_adjust_weight() {
        let mut workout = workout();

        workout.adjust_weight(2.5);
        workout.adjust_weight(5.0);
        assert_eq!(
            workout.current_set().unwrap().1.weight,
            Weight::new(107.5).unwrap()
        );

        // floored at zero
        for _ in 0..25 {
            workout.adjust_weight(-5.0);
        }
        assert_eq!(workout.current_set().unwrap().1.weight, Weight::default());
    }

    #[test]
    fn test_adjust_reps_floor() {
        let mut workout = workout();

        for _ in 0..5 {
            workout.adjust_reps(-1);
        }
        assert_eq!(workout.current_set().unwrap().1.reps, Reps::ONE);

        workout.adjust_reps(1);
        assert_eq!(workout.current_set().unwrap().1.reps, Reps::new(2).unwrap());
    }

    #[test]
    fn test_set_completion_opens_rest() {
        let mut workout = workout();
        let now = start_time();

        workout.apply_set_logged(1.into(), now);

        assert_eq!(workout.exercises()[0].sets[0].logged_id, Some(1.into()));
        assert!(workout.exercises()[0].sets[0].completed);
        assert_eq!(
            workout.phase(),
            Phase::Resting {
                until: now + Duration::seconds(REST_SECONDS),
                exercise: 0,
                set: 1
            }
        );

        // rest ends on expiry, not before
        workout.tick(now + Duration::seconds(89));
        assert!(matches!(workout.phase(), Phase::Resting { .. }));
        workout.tick(now + Duration::seconds(90));
        assert_eq!(
            workout.phase(),
            Phase::ActiveSet {
                exercise: 0,
                set: 1
            }
        );
    }

    #[test]
    fn test_set_completion_rolls_to_next_exercise() {
        let mut workout = workout();
        let now = start_time();

        workout.apply_set_logged(1.into(), now);
        workout.skip_rest();
        workout.apply_set_logged(2.into(), now);

        assert!(matches!(
            workout.phase(),
            Phase::Resting {
                exercise: 1,
                set: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_amrap_carry_over() {
        let mut workout = workout();
        let now = start_time();

        // finish the bench press sets
        workout.apply_set_logged(1.into(), now);
        workout.skip_rest();
        workout.apply_set_logged(2.into(), now);
        workout.skip_rest();

        // 8 reps performed on the first pull up set
        workout.adjust_reps(3);
        workout.apply_set_logged(3.into(), now);

        assert_eq!(workout.exercises()[1].sets[1].reps, Reps::new(8).unwrap());
        // the set after the next keeps its prescription
        assert_eq!(workout.exercises()[1].sets[2].reps, Reps::new(5).unwrap());
    }

    #[test]
    fn test_resting_adjustments() {
        let mut workout = workout();
        let now = start_time();

        // rest before the second bench press set
        workout.apply_set_logged(1.into(), now);

        workout.adjust_weight(2.5);
        workout.adjust_reps(1);
        assert_eq!(
            workout.exercises()[0].sets[1].weight,
            Weight::new(100.0).unwrap()
        );
        assert_eq!(workout.exercises()[0].sets[1].reps, Reps::new(5).unwrap());

        // rest before the first pull up set (AMRAP)
        workout.skip_rest();
        workout.apply_set_logged(2.into(), now);

        workout.adjust_reps(1);
        workout.adjust_weight(2.5);
        assert_eq!(workout.exercises()[1].sets[0].reps, Reps::new(6).unwrap());
        assert_eq!(workout.exercises()[1].sets[0].weight, Weight::default());
    }

    #[test]
    fn test_completion_is_exactly_once() {
        let mut workout = workout();
        let now = start_time();

        for id in 1..=5u128 {
            workout.apply_set_logged(id.into(), now);
            workout.skip_rest();
        }

        assert!(workout.is_complete());
        assert_eq!(workout.completed_sets(), 5);

        // no rest after the final set and no effect of further calls
        workout.apply_set_logged(99.into(), now);
        assert!(workout.is_complete());
        assert_eq!(workout.completed_sets(), 5);
        assert_eq!(workout.exercises()[1].sets[2].logged_id, Some(5.into()));
    }

    #[rstest]
    #[case(Duration::seconds(0), 0)]
    #[case(Duration::seconds(90), 2)]
    #[case(Duration::minutes(35) + Duration::seconds(20), 35)]
    #[case(Duration::minutes(35) + Duration::seconds(40), 36)]
    fn test_elapsed_minutes(#[case] elapsed: Duration, #[case] expected: u32) {
        let workout = workout();
        assert_eq!(workout.elapsed_minutes(start_time() + elapsed), expected);
    }

    struct MockService {
        sessions: RefCell<Vec<WorkoutSession>>,
        sets: RefCell<Vec<LoggedSet>>,
        next_id: Cell<u128>,
        fail_log_set: Cell<bool>,
    }

    impl MockService {
        fn new() -> Self {
            Self {
                sessions: RefCell::new(vec![]),
                sets: RefCell::new(vec![]),
                next_id: Cell::new(1),
                fail_log_set: Cell::new(false),
            }
        }
    }

    impl SessionService for &MockService {
        async fn start_workout_session(
            &self,
            template_id: Option<TemplateID>,
            date: chrono::NaiveDate,
        ) -> Result<WorkoutSession, CreateError> {
            let session = WorkoutSession {
                id: 1.into(),
                template_id,
                date,
                completed: false,
                duration_minutes: None,
                notes: None,
            };
            self.sessions.borrow_mut().push(session.clone());
            Ok(session)
        }

        async fn log_set(
            &self,
            session_id: SessionID,
            set: NewLoggedSet,
        ) -> Result<LoggedSet, CreateError> {
            if self.fail_log_set.get() {
                return Err(CreateError::Storage(StorageError::NoConnection));
            }
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let logged = LoggedSet {
                id: id.into(),
                session_id,
                exercise_name: set.exercise_name,
                set_number: set.set_number,
                weight: set.weight,
                reps: set.reps,
                rpe: set.rpe,
                notes: set.notes,
            };
            self.sets.borrow_mut().push(logged.clone());
            Ok(logged)
        }

        async fn complete_workout_session(
            &self,
            id: SessionID,
            duration_minutes: u32,
            notes: Option<String>,
        ) -> Result<WorkoutSession, UpdateError> {
            let mut sessions = self.sessions.borrow_mut();
            let session = sessions
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(UpdateError::Conflict)?;
            session.completed = true;
            session.duration_minutes = Some(duration_minutes);
            session.notes = notes;
            Ok(session.clone())
        }

        async fn abandon_workout_session(&self, id: SessionID) -> Result<SessionID, DeleteError> {
            self.sessions.borrow_mut().retain(|s| s.id != id);
            self.sets.borrow_mut().retain(|s| s.session_id != id);
            Ok(id)
        }

        async fn get_workout_session_with_sets(
            &self,
            _id: SessionID,
        ) -> Result<Option<SessionWithSets>, ReadError> {
            Ok(None)
        }

        async fn get_recent_workout_sessions(
            &self,
            _limit: usize,
        ) -> Result<Vec<SessionWithSets>, ReadError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_controller_start_and_log() {
        let service = MockService::new();
        let now = start_time();

        let mut controller = GuidedWorkoutController::start(&service, &schedule(), now)
            .await
            .unwrap();

        controller.complete_set(now).await.unwrap();

        assert_eq!(service.sets.borrow().len(), 1);
        assert_eq!(service.sets.borrow()[0].set_number, 1);
        assert!(matches!(
            controller.workout().phase(),
            Phase::Resting {
                exercise: 0,
                set: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_controller_failed_log_keeps_state() {
        let service = MockService::new();
        let now = start_time();

        let mut controller = GuidedWorkoutController::start(&service, &schedule(), now)
            .await
            .unwrap();

        service.fail_log_set.set(true);
        assert!(matches!(
            controller.complete_set(now).await,
            Err(WorkoutError::LogSet(_))
        ));
        assert_eq!(
            controller.workout().phase(),
            Phase::ActiveSet {
                exercise: 0,
                set: 0
            }
        );
        assert!(!controller.workout().exercises()[0].sets[0].completed);
        assert!(service.sets.borrow().is_empty());

        // the same completion can be retried
        service.fail_log_set.set(false);
        controller.complete_set(now).await.unwrap();
        assert_eq!(service.sets.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_controller_finish() {
        let service = MockService::new();
        let now = start_time();

        let mut controller = GuidedWorkoutController::start(&service, &schedule(), now)
            .await
            .unwrap();

        assert!(matches!(
            controller.finish(now, None).await,
            Err(WorkoutError::NotComplete)
        ));

        for _ in 0..5 {
            controller.complete_set(now).await.unwrap();
            controller.workout_mut().skip_rest();
        }

        let session = controller
            .finish(now + Duration::minutes(42), None)
            .await
            .unwrap();

        assert!(session.completed);
        assert_eq!(session.duration_minutes, Some(42));
    }

    #[tokio::test]
    async fn test_controller_abandon() {
        let service = MockService::new();
        let now = start_time();

        let mut controller = GuidedWorkoutController::start(&service, &schedule(), now)
            .await
            .unwrap();
        controller.complete_set(now).await.unwrap();

        controller.abandon().await.unwrap();

        assert!(service.sessions.borrow().is_empty());
        assert!(service.sets.borrow().is_empty());
        assert!(controller.workout().is_aborted());
    }
}
