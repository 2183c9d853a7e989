use uuid::Uuid;

use crate::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Application-wide state passed explicitly to the views.
///
/// Initialized once at startup and torn down on sign-out.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    user: Option<AuthUser>,
    settings: Settings,
}

impl AppContext {
    #[must_use]
    pub fn init(user: Option<AuthUser>, settings: Settings) -> Self {
        Self { user, settings }
    }

    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn sign_in(&mut self, user: AuthUser) {
        self.user = Some(user);
    }

    /// Drops the authenticated user, settings are kept.
    pub fn teardown(&mut self) {
        self.user = None;
    }
}
