use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::{ExerciseType, LoggedSet, Name, ReadError, Reps, SessionID, Weight};

#[allow(async_fn_in_trait)]
pub trait ProgressService {
    /// Distinct exercises with logged history, sorted by name.
    async fn get_logged_exercises(&self) -> Result<Vec<LoggedExercise>, ReadError>;
    /// Sets of one exercise grouped by completed session, most recent first.
    async fn get_exercise_history(
        &self,
        exercise_name: &Name,
    ) -> Result<Vec<SessionSets>, ReadError>;
    async fn get_exercise_stats(
        &self,
        exercise_name: &Name,
    ) -> Result<Option<ExerciseStats>, ReadError>;
    async fn check_for_prs(
        &self,
        exercise_name: &Name,
        weight: Weight,
        reps: Reps,
    ) -> Result<PrCheck, ReadError>;
    async fn get_progress_data(
        &self,
        exercise_name: &Name,
    ) -> Result<Vec<ProgressPoint>, ReadError>;
    async fn get_weekly_volume(&self, weeks: usize) -> Result<Vec<WeeklyVolume>, ReadError>;
    async fn get_week_comparisons(
        &self,
        weeks_back: u32,
    ) -> Result<Vec<WeekComparison>, ReadError>;
    async fn get_volume_comparison(&self) -> Result<VolumeComparison, ReadError>;
}

/// Exercise that appears in the logged history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedExercise {
    pub name: Name,
    pub exercise_type: ExerciseType,
}

/// One exercise's sets within one workout session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSets {
    pub session_id: SessionID,
    pub date: NaiveDate,
    pub sets: Vec<LoggedSet>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseStats {
    pub exercise_name: Name,
    pub total_sessions: usize,
    pub total_sets: usize,
    pub total_volume: f32,
    pub best_weight: Weight,
    pub best_reps: Reps,
    pub best_volume: f32,
    pub best_e1rm: f32,
    pub last_performed: NaiveDate,
}

/// Independent personal record flags of a single set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrCheck {
    pub weight: bool,
    pub reps: bool,
    pub volume: bool,
    pub e1rm: bool,
}

impl PrCheck {
    #[must_use]
    pub fn any(&self) -> bool {
        self.weight || self.reps || self.volume || self.e1rm
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub e1rm: f32,
    pub best_weight: Weight,
    pub total_volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestE1rm {
    pub e1rm: f32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekComparison {
    pub exercise_name: Name,
    pub current: Option<BestE1rm>,
    pub past: Option<BestE1rm>,
    pub change_percent: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyVolume {
    pub week_start: NaiveDate,
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeComparison {
    pub current: WeeklyVolume,
    pub past: WeeklyVolume,
    pub change_percent: Option<i32>,
}

/// Estimated one-repetition maximum (Epley).
///
/// A single is taken at face value, impossible inputs yield zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimated_one_rep_max(weight: Weight, reps: Reps) -> f32 {
    let weight = f32::from(weight);
    let reps = u32::from(reps);

    if reps == 1 {
        return weight;
    }

    if reps == 0 || weight == 0.0 {
        return 0.0;
    }

    (weight * (1.0 + reps as f32 / 30.0)).round()
}

#[must_use]
pub fn session_best_e1rm(sets: &[LoggedSet]) -> f32 {
    sets.iter()
        .map(|s| estimated_one_rep_max(s.weight, s.reps))
        .fold(0.0, f32::max)
}

/// Set with the highest estimated 1RM, first occurrence wins on ties.
#[must_use]
pub fn best_set(sets: &[LoggedSet]) -> Option<&LoggedSet> {
    let mut result = sets.first()?;
    let mut best = 0.0;

    for set in sets {
        let e1rm = estimated_one_rep_max(set.weight, set.reps);
        if e1rm > best {
            best = e1rm;
            result = set;
        }
    }

    Some(result)
}

#[must_use]
pub fn exercise_stats(exercise_name: &Name, history: &[SessionSets]) -> Option<ExerciseStats> {
    let first = history.first()?;
    let mut stats = ExerciseStats {
        exercise_name: exercise_name.clone(),
        total_sessions: history.len(),
        total_sets: 0,
        total_volume: 0.0,
        best_weight: Weight::default(),
        best_reps: Reps::default(),
        best_volume: 0.0,
        best_e1rm: 0.0,
        last_performed: first.date,
    };

    for session in history {
        for set in &session.sets {
            let volume = set.volume();
            let e1rm = estimated_one_rep_max(set.weight, set.reps);
            stats.total_sets += 1;
            stats.total_volume += volume;
            if set.weight > stats.best_weight {
                stats.best_weight = set.weight;
            }
            if set.reps > stats.best_reps {
                stats.best_reps = set.reps;
            }
            if volume > stats.best_volume {
                stats.best_volume = volume;
            }
            if e1rm > stats.best_e1rm {
                stats.best_e1rm = e1rm;
            }
        }
    }

    Some(stats)
}

/// Session holding the global best estimated 1RM, ties broken by the
/// strictly earlier date.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn pr_session(history: &[SessionSets]) -> Option<SessionID> {
    let first = history.first()?;
    let mut best_id = first.session_id;
    let mut best_e1rm = session_best_e1rm(&first.sets);
    let mut best_date = first.date;

    for session in &history[1..] {
        let e1rm = session_best_e1rm(&session.sets);
        if e1rm > best_e1rm || (e1rm == best_e1rm && session.date < best_date) {
            best_id = session.session_id;
            best_e1rm = e1rm;
            best_date = session.date;
        }
    }

    Some(best_id)
}

/// All flags are true when there is no prior history.
#[must_use]
pub fn check_for_prs(weight: Weight, reps: Reps, stats: Option<&ExerciseStats>) -> PrCheck {
    let Some(stats) = stats else {
        return PrCheck {
            weight: true,
            reps: true,
            volume: true,
            e1rm: true,
        };
    };

    PrCheck {
        weight: weight > stats.best_weight,
        reps: reps > stats.best_reps,
        volume: weight * reps > stats.best_volume,
        e1rm: estimated_one_rep_max(weight, reps) > stats.best_e1rm,
    }
}

/// Chart-ready per-session series, ascending by date.
#[must_use]
pub fn progress_data(history: &[SessionSets]) -> Vec<ProgressPoint> {
    let mut points = history
        .iter()
        .map(|session| {
            let mut best_weight = Weight::default();
            for set in &session.sets {
                if set.weight > best_weight {
                    best_weight = set.weight;
                }
            }
            ProgressPoint {
                date: session.date,
                e1rm: session_best_e1rm(&session.sets),
                best_weight,
                total_volume: session.sets.iter().map(LoggedSet::volume).sum(),
            }
        })
        .collect::<Vec<_>>();
    points.sort_by_key(|p| p.date);
    points
}

/// Best estimated 1RM per exercise in the current week compared with the
/// week `weeks_back` weeks earlier.
///
/// The current week runs from the most recent Sunday through today, the past
/// week is the matching Sunday-aligned 7-day span. The change is only
/// reported when both windows have data and the past best is positive.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn week_over_week(
    sessions: &[SessionSets],
    today: NaiveDate,
    weeks_back: u32,
) -> Vec<WeekComparison> {
    let current_start = sunday_week_start(today);
    let past_start = current_start - Duration::days(i64::from(weeks_back) * 7);
    let past_end = past_start + Duration::days(6);

    let mut best: BTreeMap<Name, (Option<BestE1rm>, Option<BestE1rm>)> = BTreeMap::new();

    for session in sessions {
        let in_current = (current_start..=today).contains(&session.date);
        let in_past = (past_start..=past_end).contains(&session.date);
        if !in_current && !in_past {
            continue;
        }
        for set in &session.sets {
            let e1rm = estimated_one_rep_max(set.weight, set.reps);
            let entry = best.entry(set.exercise_name.clone()).or_default();
            let window = if in_current { &mut entry.0 } else { &mut entry.1 };
            match window {
                Some(best) if e1rm < best.e1rm || (e1rm == best.e1rm && session.date >= best.date) => {}
                _ => {
                    *window = Some(BestE1rm {
                        e1rm,
                        date: session.date,
                    });
                }
            }
        }
    }

    best.into_iter()
        .map(|(exercise_name, (current, past))| {
            let change = match (&current, &past) {
                (Some(current), Some(past)) => change_percent(current.e1rm, past.e1rm),
                _ => None,
            };
            WeekComparison {
                exercise_name,
                current,
                past,
                change_percent: change,
            }
        })
        .collect()
}

/// Total volume bucketed by Monday week start, ascending, limited to the
/// last `weeks` buckets.
#[must_use]
pub fn weekly_volume(sessions: &[SessionSets], today: NaiveDate, weeks: usize) -> Vec<WeeklyVolume> {
    let current_week = monday_week_start(today);
    #[allow(clippy::cast_possible_wrap)]
    let first_week = current_week - Duration::weeks(weeks as i64 - 1);

    let mut buckets: BTreeMap<NaiveDate, f32> = BTreeMap::new();

    for session in sessions {
        let week_start = monday_week_start(session.date);
        if !(first_week..=current_week).contains(&week_start) {
            continue;
        }
        let volume = session.sets.iter().map(LoggedSet::volume).sum::<f32>();
        *buckets.entry(week_start).or_insert(0.0) += volume;
    }

    buckets
        .into_iter()
        .map(|(week_start, volume)| WeeklyVolume { week_start, volume })
        .collect()
}

/// This Monday-aligned week compared with the previous one.
#[must_use]
pub fn volume_comparison(sessions: &[SessionSets], today: NaiveDate) -> VolumeComparison {
    let current_start = monday_week_start(today);
    let past_start = current_start - Duration::days(7);

    let mut current = 0.0;
    let mut past = 0.0;

    for session in sessions {
        let volume = session.sets.iter().map(LoggedSet::volume).sum::<f32>();
        if (current_start..=today).contains(&session.date) {
            current += volume;
        } else if (past_start..current_start).contains(&session.date) {
            past += volume;
        }
    }

    VolumeComparison {
        current: WeeklyVolume {
            week_start: current_start,
            volume: current,
        },
        past: WeeklyVolume {
            week_start: past_start,
            volume: past,
        },
        change_percent: change_percent(current, past),
    }
}

#[must_use]
pub fn sunday_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

#[must_use]
pub fn monday_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[allow(clippy::cast_possible_truncation)]
fn change_percent(current: f32, past: f32) -> Option<i32> {
    if past > 0.0 {
        Some(((current - past) / past * 100.0).round() as i32)
    } else {
        None
    }
}
