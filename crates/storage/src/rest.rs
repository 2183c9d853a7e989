//! Client for the hosted PostgREST-style API.
//!
//! The server is the authoritative data source. All data operations require
//! an authenticated session, requests carry the API key and the access token
//! of the signed-in user. Row-level security on the server scopes every table
//! to that user.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use gloo_net::http::Request;
use log::warn;
use repbook_domain as domain;
use repbook_web_app::AuthUser;
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::rows;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, gloo_net::Error>;
}

pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, gloo_net::Error> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Patch => Request::patch(&request.url),
            Method::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        let request = if let Some(body) = request.body {
            builder.header("Content-Type", "application/json").body(body)?
        } else {
            builder.build()?
        };
        let response = request.send().await?;
        Ok(HttpResponse {
            status: response.status(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

struct AuthSession {
    user_id: Uuid,
    access_token: String,
}

pub struct Client<S = GlooNetSendRequest> {
    base_url: String,
    api_key: String,
    auth: RefCell<Option<AuthSession>>,
    transport: S,
}

impl Client<GlooNetSendRequest> {
    #[must_use]
    pub fn new(base_url: String, api_key: String) -> Self {
        Self::with_transport(base_url, api_key, GlooNetSendRequest)
    }
}

impl<S: SendRequest> Client<S> {
    #[must_use]
    pub fn with_transport(base_url: String, api_key: String, transport: S) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            auth: RefCell::new(None),
            transport,
        }
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, domain::StorageError> {
        let body = serde_json::to_string(&json!({ "email": email, "password": password }))
            .map_err(|err| domain::StorageError::Other(err.into()))?;
        let request = HttpRequest {
            method: Method::Post,
            url: format!("{}/auth/v1/token?grant_type=password", self.base_url),
            headers: vec![
                (String::from("apikey"), self.api_key.clone()),
                (String::from("Content-Type"), String::from("application/json")),
            ],
            body: Some(body),
        };
        let response = self
            .transport
            .send_request(request)
            .await
            .map_err(|_| domain::StorageError::NoConnection)?;
        if !(200..300).contains(&response.status) {
            return Err(domain::StorageError::Other(
                format!("sign in failed with status {}", response.status).into(),
            ));
        }
        let token: rows::TokenResponse = serde_json::from_str(&response.body)
            .map_err(|err| domain::StorageError::Other(err.into()))?;
        *self.auth.borrow_mut() = Some(AuthSession {
            user_id: token.user.id,
            access_token: token.access_token,
        });
        Ok(AuthUser {
            id: token.user.id,
            email: token.user.email,
        })
    }

    pub fn sign_out(&self) {
        *self.auth.borrow_mut() = None;
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.auth.borrow().is_some()
    }

    fn session(&self) -> Result<(Uuid, Vec<(String, String)>), domain::StorageError> {
        let auth = self.auth.borrow();
        let Some(session) = auth.as_ref() else {
            return Err(domain::StorageError::NoSession);
        };
        Ok((
            session.user_id,
            vec![
                (String::from("apikey"), self.api_key.clone()),
                (
                    String::from("Authorization"),
                    format!("Bearer {}", session.access_token),
                ),
            ],
        ))
    }

    async fn send(
        &self,
        method: Method,
        table_query: &str,
        body: Option<serde_json::Value>,
        returning: bool,
    ) -> Result<HttpResponse, domain::StorageError> {
        let (_, mut headers) = self.session()?;
        if returning {
            headers.push((String::from("Prefer"), String::from("return=representation")));
        }
        let body = body
            .map(|value| serde_json::to_string(&value))
            .transpose()
            .map_err(|err| domain::StorageError::Other(err.into()))?;
        let request = HttpRequest {
            method,
            url: format!("{}/rest/v1/{table_query}", self.base_url),
            headers,
            body,
        };
        let response = self
            .transport
            .send_request(request)
            .await
            .map_err(|_| domain::StorageError::NoConnection)?;
        match response.status {
            200..300 => Ok(response),
            401 | 403 => Err(domain::StorageError::NoSession),
            status => Err(domain::StorageError::Other(
                format!("unexpected status {status}").into(),
            )),
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table_query: &str,
    ) -> Result<T, domain::StorageError> {
        let response = self.send(Method::Get, table_query, None, false).await?;
        serde_json::from_str(&response.body).map_err(|err| domain::StorageError::Other(err.into()))
    }

    async fn insert<T: DeserializeOwned>(
        &self,
        table: &str,
        body: serde_json::Value,
    ) -> Result<T, domain::StorageError> {
        let response = self.send(Method::Post, table, Some(body), true).await?;
        let mut rows: Vec<T> = serde_json::from_str(&response.body)
            .map_err(|err| domain::StorageError::Other(err.into()))?;
        if rows.is_empty() {
            return Err(domain::StorageError::Other("empty insert response".into()));
        }
        Ok(rows.swap_remove(0))
    }

    async fn insert_all(
        &self,
        table: &str,
        body: Vec<serde_json::Value>,
    ) -> Result<(), domain::StorageError> {
        if body.is_empty() {
            return Ok(());
        }
        self.send(Method::Post, table, Some(serde_json::Value::Array(body)), false)
            .await?;
        Ok(())
    }

    async fn patch<T: DeserializeOwned>(
        &self,
        table_query: &str,
        body: serde_json::Value,
    ) -> Result<Vec<T>, domain::StorageError> {
        let response = self.send(Method::Patch, table_query, Some(body), true).await?;
        serde_json::from_str(&response.body).map_err(|err| domain::StorageError::Other(err.into()))
    }

    async fn delete(&self, table_query: &str) -> Result<(), domain::StorageError> {
        self.send(Method::Delete, table_query, None, false).await?;
        Ok(())
    }

    async fn read_template_rows(
        &self,
        query: &str,
    ) -> Result<Vec<domain::WorkoutTemplate>, domain::StorageError> {
        let parents: Vec<rows::TemplateRow> = self.select(query).await?;
        if parents.is_empty() {
            return Ok(vec![]);
        }
        let ids = id_list(parents.iter().map(|row| row.id));
        let children: Vec<rows::TemplateExerciseRow> = self
            .select(&format!(
                "template_exercises?select=*&template_id=in.({ids})&order=order_index.asc"
            ))
            .await?;
        let mut by_parent: BTreeMap<Uuid, Vec<rows::TemplateExerciseRow>> = BTreeMap::new();
        for child in children {
            by_parent.entry(child.template_id).or_default().push(child);
        }
        parents
            .into_iter()
            .map(|row| {
                let exercises = by_parent.remove(&row.id).unwrap_or_default();
                rows::template(row, exercises).map_err(domain::StorageError::from)
            })
            .collect()
    }
}

impl<S: SendRequest> domain::ExerciseRepository for Client<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let rows: Vec<rows::ExerciseRow> =
            self.select("exercises?select=*&order=name.asc").await?;
        Ok(rows
            .into_iter()
            .map(domain::Exercise::try_from)
            .collect::<Result<_, _>>()
            .map_err(domain::StorageError::from)?)
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
        exercise_type: domain::ExerciseType,
        category: Option<String>,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let (user_id, _) = self.session().map_err(domain::StorageError::from)?;
        let row: rows::ExerciseRow = self
            .insert(
                "exercises",
                json!({
                    "user_id": user_id,
                    "name": name.as_str(),
                    "exercise_type": exercise_type.as_str(),
                    "category": category,
                    "is_custom": true,
                }),
            )
            .await?;
        Ok(domain::Exercise::try_from(row).map_err(domain::StorageError::from)?)
    }

    async fn modify_exercise(
        &self,
        id: domain::ExerciseID,
        name: Option<domain::Name>,
        exercise_type: Option<domain::ExerciseType>,
        category: Option<Option<String>>,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        let mut content = serde_json::Map::new();
        if let Some(name) = name {
            content.insert("name".into(), json!(name.as_str()));
        }
        if let Some(exercise_type) = exercise_type {
            content.insert("exercise_type".into(), json!(exercise_type.as_str()));
        }
        if let Some(category) = category {
            content.insert("category".into(), json!(category));
        }
        let mut rows: Vec<rows::ExerciseRow> = self
            .patch(
                &format!("exercises?id=eq.{}", *id),
                serde_json::Value::Object(content),
            )
            .await?;
        if rows.is_empty() {
            return Err(domain::UpdateError::Other("exercise not found".into()));
        }
        Ok(domain::Exercise::try_from(rows.swap_remove(0)).map_err(domain::StorageError::from)?)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        self.delete(&format!("exercises?id=eq.{}", *id)).await?;
        Ok(id)
    }

    async fn rewrite_exercise_name(
        &self,
        source: &domain::Name,
        target: &domain::Name,
    ) -> Result<domain::MergeOutcome, domain::UpdateError> {
        let mut outcome = domain::MergeOutcome::default();
        for (table, count) in [
            ("logged_sets", &mut outcome.logged_sets),
            ("template_exercises", &mut outcome.template_exercises),
            ("scheduled_exercises", &mut outcome.scheduled_exercises),
        ] {
            let rewritten: Vec<serde_json::Value> = self
                .patch(
                    &format!(
                        "{table}?exercise_name=eq.{}",
                        urlencoding::encode(source.as_str())
                    ),
                    json!({ "exercise_name": target.as_str() }),
                )
                .await?;
            *count = rewritten.len();
        }
        Ok(outcome)
    }
}

impl<S: SendRequest> domain::TemplateRepository for Client<S> {
    async fn read_templates(&self) -> Result<Vec<domain::WorkoutTemplate>, domain::ReadError> {
        Ok(self
            .read_template_rows("workout_templates?select=*&order=name.asc")
            .await?)
    }

    async fn read_template(
        &self,
        id: domain::TemplateID,
    ) -> Result<Option<domain::WorkoutTemplate>, domain::ReadError> {
        let mut templates = self
            .read_template_rows(&format!("workout_templates?select=*&id=eq.{}", *id))
            .await?;
        if templates.is_empty() {
            return Ok(None);
        }
        Ok(Some(templates.swap_remove(0)))
    }

    async fn create_template(
        &self,
        name: domain::Name,
        notes: Option<String>,
        exercises: Vec<domain::TemplateExercise>,
    ) -> Result<domain::WorkoutTemplate, domain::CreateError> {
        let (user_id, _) = self.session().map_err(domain::StorageError::from)?;
        let parent: rows::TemplateRow = self
            .insert(
                "workout_templates",
                json!({
                    "user_id": user_id,
                    "name": name.as_str(),
                    "notes": notes,
                }),
            )
            .await?;
        self.insert_all(
            "template_exercises",
            template_exercise_rows(user_id, parent.id, &exercises),
        )
        .await?;
        Ok(domain::WorkoutTemplate {
            id: parent.id.into(),
            name,
            notes,
            exercises,
        })
    }

    async fn replace_template(
        &self,
        template: domain::WorkoutTemplate,
    ) -> Result<domain::WorkoutTemplate, domain::UpdateError> {
        let (user_id, _) = self.session().map_err(domain::StorageError::from)?;
        let parents: Vec<rows::TemplateRow> = self
            .patch(
                &format!("workout_templates?id=eq.{}", *template.id),
                json!({
                    "name": template.name.as_str(),
                    "notes": template.notes,
                }),
            )
            .await?;
        if parents.is_empty() {
            return Err(domain::UpdateError::Other("template not found".into()));
        }
        self.delete(&format!(
            "template_exercises?template_id=eq.{}",
            *template.id
        ))
        .await?;
        self.insert_all(
            "template_exercises",
            template_exercise_rows(user_id, *template.id, &template.exercises),
        )
        .await?;
        Ok(template)
    }

    async fn delete_template(
        &self,
        id: domain::TemplateID,
    ) -> Result<domain::TemplateID, domain::DeleteError> {
        self.delete(&format!("workout_templates?id=eq.{}", *id))
            .await?;
        Ok(id)
    }
}

impl<S: SendRequest> domain::ScheduleRepository for Client<S> {
    async fn read_scheduled_workouts(
        &self,
    ) -> Result<Vec<domain::ScheduledWorkoutWithDetails>, domain::ReadError> {
        let parents: Vec<rows::ScheduledWorkoutRow> = self
            .select("scheduled_workouts?select=*&order=day_of_week.asc")
            .await?;
        if parents.is_empty() {
            return Ok(vec![]);
        }
        let ids = id_list(parents.iter().map(|row| row.id));
        let children: Vec<rows::ScheduledExerciseRow> = self
            .select(&format!(
                "scheduled_exercises?select=*&scheduled_workout_id=in.({ids})"
            ))
            .await?;
        let template_ids = id_list(parents.iter().map(|row| row.template_id));
        let templates = self
            .read_template_rows(&format!("workout_templates?select=*&id=in.({template_ids})"))
            .await?;

        let mut by_parent: BTreeMap<Uuid, Vec<rows::ScheduledExerciseRow>> = BTreeMap::new();
        for child in children {
            by_parent
                .entry(child.scheduled_workout_id)
                .or_default()
                .push(child);
        }
        let mut details = vec![];
        for parent in parents {
            // Workouts whose template has been deleted in the meantime are dropped.
            let Some(template) = templates.iter().find(|t| *t.id == parent.template_id) else {
                warn!("dropping scheduled workout without template: {}", parent.id);
                continue;
            };
            let exercises = by_parent.remove(&parent.id).unwrap_or_default();
            details.push(domain::ScheduledWorkoutWithDetails {
                workout: rows::scheduled_workout(parent, exercises)
                    .map_err(domain::StorageError::from)?,
                template: template.clone(),
            });
        }
        Ok(details)
    }

    async fn create_scheduled_workout(
        &self,
        template_id: domain::TemplateID,
        day_of_week: domain::DayOfWeek,
        exercises: Vec<domain::ScheduledExercise>,
    ) -> Result<domain::ScheduledWorkoutWithDetails, domain::CreateError> {
        use domain::TemplateRepository;

        let (user_id, _) = self.session().map_err(domain::StorageError::from)?;
        let Some(template) = self.read_template(template_id).await? else {
            return Err(domain::CreateError::Other("template not found".into()));
        };
        let parent: rows::ScheduledWorkoutRow = self
            .insert(
                "scheduled_workouts",
                json!({
                    "user_id": user_id,
                    "template_id": *template_id,
                    "day_of_week": u8::from(day_of_week),
                }),
            )
            .await?;
        self.insert_all(
            "scheduled_exercises",
            scheduled_exercise_rows(user_id, parent.id, &exercises),
        )
        .await?;
        Ok(domain::ScheduledWorkoutWithDetails {
            workout: domain::ScheduledWorkout {
                id: parent.id.into(),
                template_id,
                day_of_week,
                exercises,
            },
            template,
        })
    }

    async fn replace_scheduled_exercises(
        &self,
        id: domain::ScheduledWorkoutID,
        exercises: Vec<domain::ScheduledExercise>,
    ) -> Result<(), domain::UpdateError> {
        let (user_id, _) = self.session().map_err(domain::StorageError::from)?;
        self.delete(&format!(
            "scheduled_exercises?scheduled_workout_id=eq.{}",
            *id
        ))
        .await?;
        self.insert_all(
            "scheduled_exercises",
            scheduled_exercise_rows(user_id, *id, &exercises),
        )
        .await?;
        Ok(())
    }

    async fn delete_scheduled_workout(
        &self,
        id: domain::ScheduledWorkoutID,
    ) -> Result<domain::ScheduledWorkoutID, domain::DeleteError> {
        self.delete(&format!("scheduled_workouts?id=eq.{}", *id))
            .await?;
        Ok(id)
    }
}

impl<S: SendRequest> domain::SessionRepository for Client<S> {
    async fn read_workout_sessions(
        &self,
        since: Option<NaiveDate>,
    ) -> Result<Vec<domain::WorkoutSession>, domain::ReadError> {
        let mut query = String::from("workout_sessions?select=*&order=date.desc");
        if let Some(since) = since {
            query.push_str(&format!("&date=gte.{since}"));
        }
        let rows: Vec<rows::SessionRow> = self.select(&query).await?;
        Ok(rows.into_iter().map(domain::WorkoutSession::from).collect())
    }

    async fn read_workout_session(
        &self,
        id: domain::SessionID,
    ) -> Result<Option<domain::WorkoutSession>, domain::ReadError> {
        let mut rows: Vec<rows::SessionRow> = self
            .select(&format!("workout_sessions?select=*&id=eq.{}", *id))
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(domain::WorkoutSession::from(rows.swap_remove(0))))
    }

    async fn read_logged_sets(
        &self,
        session_id: domain::SessionID,
    ) -> Result<Vec<domain::LoggedSet>, domain::ReadError> {
        let rows: Vec<rows::LoggedSetRow> = self
            .select(&format!(
                "logged_sets?select=*&session_id=eq.{}&order=set_number.asc",
                *session_id
            ))
            .await?;
        Ok(rows
            .into_iter()
            .map(domain::LoggedSet::try_from)
            .collect::<Result<_, _>>()
            .map_err(domain::StorageError::from)?)
    }

    async fn read_logged_sets_of_sessions(
        &self,
        session_ids: &[domain::SessionID],
    ) -> Result<Vec<domain::LoggedSet>, domain::ReadError> {
        if session_ids.is_empty() {
            return Ok(vec![]);
        }
        let ids = id_list(session_ids.iter().map(|id| **id));
        let rows: Vec<rows::LoggedSetRow> = self
            .select(&format!(
                "logged_sets?select=*&session_id=in.({ids})&order=set_number.asc"
            ))
            .await?;
        Ok(rows
            .into_iter()
            .map(domain::LoggedSet::try_from)
            .collect::<Result<_, _>>()
            .map_err(domain::StorageError::from)?)
    }

    async fn create_workout_session(
        &self,
        template_id: Option<domain::TemplateID>,
        date: NaiveDate,
    ) -> Result<domain::WorkoutSession, domain::CreateError> {
        let (user_id, _) = self.session().map_err(domain::StorageError::from)?;
        let row: rows::SessionRow = self
            .insert(
                "workout_sessions",
                json!({
                    "user_id": user_id,
                    "template_id": template_id.map(|id| *id),
                    "date": date,
                    "completed": false,
                }),
            )
            .await?;
        Ok(domain::WorkoutSession::from(row))
    }

    async fn create_logged_set(
        &self,
        session_id: domain::SessionID,
        set: domain::NewLoggedSet,
    ) -> Result<domain::LoggedSet, domain::CreateError> {
        let (user_id, _) = self.session().map_err(domain::StorageError::from)?;
        let row: rows::LoggedSetRow = self
            .insert(
                "logged_sets",
                json!({
                    "user_id": user_id,
                    "session_id": *session_id,
                    "exercise_name": set.exercise_name.as_str(),
                    "set_number": set.set_number,
                    "weight": f32::from(set.weight),
                    "reps": u32::from(set.reps),
                    "rpe": set.rpe.map(f32::from),
                    "notes": set.notes,
                }),
            )
            .await?;
        Ok(domain::LoggedSet::try_from(row).map_err(domain::StorageError::from)?)
    }

    async fn modify_workout_session(
        &self,
        id: domain::SessionID,
        completed: Option<bool>,
        duration_minutes: Option<u32>,
        notes: Option<String>,
    ) -> Result<domain::WorkoutSession, domain::UpdateError> {
        let mut content = serde_json::Map::new();
        if let Some(completed) = completed {
            content.insert("completed".into(), json!(completed));
        }
        if let Some(duration_minutes) = duration_minutes {
            content.insert("duration_minutes".into(), json!(duration_minutes));
        }
        if let Some(notes) = notes {
            content.insert("notes".into(), json!(notes));
        }
        let mut rows: Vec<rows::SessionRow> = self
            .patch(
                &format!("workout_sessions?id=eq.{}", *id),
                serde_json::Value::Object(content),
            )
            .await?;
        if rows.is_empty() {
            return Err(domain::UpdateError::Other("session not found".into()));
        }
        Ok(domain::WorkoutSession::from(rows.swap_remove(0)))
    }

    async fn delete_workout_session(
        &self,
        id: domain::SessionID,
    ) -> Result<domain::SessionID, domain::DeleteError> {
        self.delete(&format!("workout_sessions?id=eq.{}", *id))
            .await?;
        Ok(id)
    }
}

fn id_list(ids: impl Iterator<Item = Uuid>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

fn template_exercise_rows(
    user_id: Uuid,
    template_id: Uuid,
    exercises: &[domain::TemplateExercise],
) -> Vec<serde_json::Value> {
    exercises
        .iter()
        .enumerate()
        .map(|(index, exercise)| {
            #[allow(clippy::cast_possible_truncation)]
            let mut columns = rows::template_exercise_columns(template_id, index as u32, exercise);
            if let Some(object) = columns.as_object_mut() {
                object.insert("user_id".into(), json!(user_id));
            }
            columns
        })
        .collect()
}

fn scheduled_exercise_rows(
    user_id: Uuid,
    scheduled_workout_id: Uuid,
    exercises: &[domain::ScheduledExercise],
) -> Vec<serde_json::Value> {
    exercises
        .iter()
        .map(|exercise| {
            json!({
                "user_id": user_id,
                "scheduled_workout_id": scheduled_workout_id,
                "exercise_name": exercise.exercise_name.as_str(),
                "target_weight": f32::from(exercise.target_weight),
            })
        })
        .collect()
}
