//! Authentication service - registration, login, session resumption and logout.
//!
//! Session state lives on the client, sealed by the [`Vault`]. A session cookie
//! verified within the trust window is accepted as-is; older ones are
//! re-checked against the database. Without a usable session cookie a
//! remember-me token can re-establish the login; tokens are single use and
//! rotate on every such resumption.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::SqlErr;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, VAULT_PURPOSE_SESSION};
use crate::domain::registration::check_new_password;
use crate::domain::{
    Password, Registration, RememberToken, SessionState, Trust, User, Violation, Violations,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{NewUser, UnitOfWork};
use crate::vault::Vault;

/// Credentials submitted to log in
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    /// Username or email address
    pub login: String,
    pub password: String,
    /// Issue a persistent ("remember me") login
    pub remember: bool,
}

/// Raw cookie values presented by the client
#[derive(Debug, Clone, Default)]
pub struct PresentedCookies {
    pub session: Option<String>,
    pub remember: Option<String>,
}

/// What the HTTP layer must do with one cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieChange {
    Keep,
    Set(String),
    Clear,
}

/// How an identity was established for this request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeSource {
    Anonymous,
    /// Session cookie accepted inside the trust window
    Trusted,
    /// Session cookie confirmed against the database
    Verified,
    /// Re-established from a remember-me token
    Remembered,
}

/// Result of resuming a request's session
#[derive(Debug, Clone)]
pub struct Resumption {
    pub state: Option<SessionState>,
    pub session: CookieChange,
    pub remember: CookieChange,
    pub source: ResumeSource,
}

impl Resumption {
    fn anonymous() -> Self {
        Self {
            state: None,
            session: CookieChange::Keep,
            remember: CookieChange::Keep,
            source: ResumeSource::Anonymous,
        }
    }
}

/// A freshly established login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub state: SessionState,
    /// Sealed session state for the session cookie
    pub session_cookie: String,
    /// Raw token for the remember cookie, when requested
    pub remember_token: Option<RememberToken>,
}

/// Session timing knobs
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub session_ttl: Duration,
    pub trust_window: Duration,
    pub remember_lifetime: Duration,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            session_ttl: config.session_ttl(),
            trust_window: config.trust_window(),
            remember_lifetime: config.remember_lifetime(),
        }
    }
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Validate and store a new account
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Check credentials and open a session
    async fn login(&self, attempt: LoginAttempt) -> AppResult<Session>;

    /// Establish the identity behind the presented cookies
    async fn resume(&self, presented: PresentedCookies) -> AppResult<Resumption>;

    /// Forget the presented remember token; with `everywhere`, all of the user's tokens
    async fn logout(&self, presented: PresentedCookies, everywhere: bool) -> AppResult<()>;

    /// Replace the password and revoke every remember token; returns the number revoked
    async fn change_password(
        &self,
        user_id: Uuid,
        current: String,
        new: String,
        confirmation: String,
    ) -> AppResult<u64>;

    /// Soft delete the account after re-checking the password
    async fn close_account(&self, user_id: Uuid, password: String) -> AppResult<()>;

    /// Drop expired remember tokens
    async fn purge_expired_tokens(&self) -> AppResult<u64>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    vault: Vault,
    settings: SessionSettings,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, vault: Vault, settings: SessionSettings) -> Self {
        Self {
            uow,
            vault,
            settings,
        }
    }

    fn seal(&self, state: &SessionState) -> AppResult<String> {
        Ok(self.vault.seal(VAULT_PURPOSE_SESSION, state)?)
    }

    /// Open a session cookie; undecryptable or expired cookies yield `None`.
    fn open_session(&self, raw: &str, now: DateTime<Utc>) -> Option<SessionState> {
        let state: SessionState = match self.vault.open(VAULT_PURPOSE_SESSION, raw) {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding unreadable session cookie");
                return None;
            }
        };

        if state.is_expired(now, self.settings.session_ttl) {
            tracing::debug!(user_id = %state.user_id, "Session expired");
            return None;
        }

        Some(state)
    }

    async fn resume_session(
        &self,
        mut state: SessionState,
        remember_presented: bool,
        now: DateTime<Utc>,
    ) -> AppResult<Resumption> {
        if state.trust(now, self.settings.trust_window) == Trust::Trusted {
            return Ok(Resumption {
                state: Some(state),
                session: CookieChange::Keep,
                remember: CookieChange::Keep,
                source: ResumeSource::Trusted,
            });
        }

        match self.uow.users().find_by_id(state.user_id).await? {
            Some(user) => {
                state.reverify(&user, now);
                let sealed = self.seal(&state)?;
                tracing::debug!(user_id = %user.id, "Session re-verified");

                Ok(Resumption {
                    state: Some(state),
                    session: CookieChange::Set(sealed),
                    remember: CookieChange::Keep,
                    source: ResumeSource::Verified,
                })
            }
            None => {
                tracing::warn!(user_id = %state.user_id, "Session refers to a missing account");
                Ok(Resumption {
                    session: CookieChange::Clear,
                    remember: if remember_presented {
                        CookieChange::Clear
                    } else {
                        CookieChange::Keep
                    },
                    ..Resumption::anonymous()
                })
            }
        }
    }

    async fn resume_remembered(
        &self,
        raw: &str,
        now: DateTime<Utc>,
        mut outcome: Resumption,
    ) -> AppResult<Resumption> {
        outcome.remember = CookieChange::Clear;

        let Some(token) = RememberToken::parse(raw) else {
            tracing::debug!("Discarding malformed remember cookie");
            return Ok(outcome);
        };

        let fingerprint = token.fingerprint();
        let Some(stored) = self.uow.tokens().find_by_fingerprint(&fingerprint).await? else {
            // Either forged or an already rotated token being replayed.
            tracing::warn!("Unknown remember token presented");
            return Ok(outcome);
        };

        if stored.is_expired(now) {
            self.uow.tokens().delete_by_fingerprint(&fingerprint).await?;
            tracing::debug!(user_id = %stored.user_id, "Remember token expired");
            return Ok(outcome);
        }

        let Some(user) = self.uow.users().find_by_id(stored.user_id).await? else {
            self.uow.tokens().delete_by_fingerprint(&fingerprint).await?;
            tracing::warn!(user_id = %stored.user_id, "Remember token for inactive account");
            return Ok(outcome);
        };

        let replacement = RememberToken::generate();
        let rotated = self
            .uow
            .tokens()
            .rotate(
                &fingerprint,
                user.id,
                replacement.fingerprint(),
                now + self.settings.remember_lifetime,
            )
            .await?;

        if !rotated {
            // The concurrent winner already sent the rotated cookie.
            tracing::warn!(user_id = %user.id, "Remember token already consumed");
            outcome.remember = CookieChange::Keep;
            return Ok(outcome);
        }

        let state = SessionState::new(&user, true, now);
        let sealed = self.seal(&state)?;
        tracing::info!(user_id = %user.id, "Login restored from remember token");

        Ok(Resumption {
            state: Some(state),
            session: CookieChange::Set(sealed),
            remember: CookieChange::Set(replacement.as_str().to_string()),
            source: ResumeSource::Remembered,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let registration = registration.normalized();
        let mut violations = registration.check();
        let users = self.uow.users();

        let username_well_formed = !violations.contains(Violation::EmptyUsername)
            && !violations.contains(Violation::InvalidUsername);
        if username_well_formed && users.username_taken(&registration.username).await? {
            violations.push(Violation::UsernameTaken);
        }
        if !violations.contains(Violation::InvalidEmail)
            && users.email_taken(&registration.email).await?
        {
            violations.push(Violation::EmailTaken);
        }

        if !violations.is_empty() {
            tracing::debug!(codes = ?violations.codes(), "Registration rejected");
            return Err(AppError::Rejected(violations));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let user = users
            .create(NewUser {
                username: registration.username,
                email: registration.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race against a concurrent registration
                AppError::Database(ref db)
                    if matches!(db.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    AppError::conflict("User")
                }
                other => other,
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, attempt: LoginAttempt) -> AppResult<Session> {
        let login = attempt.login.trim();

        let mut violations = Violations::new();
        if login.is_empty() {
            violations.push(Violation::EmptyUsername);
        }
        if attempt.password.is_empty() {
            violations.push(Violation::EmptyPassword);
        }
        violations.into_result()?;

        let found = self.uow.users().find_by_login(login).await?;

        // Verify even when the account does not exist so both failures cost the same.
        let stored = found
            .as_ref()
            .map(|user| Password::from_hash(user.password_hash.clone()))
            .unwrap_or_else(Password::dummy);
        let password_valid = stored.verify(&attempt.password);

        let user = match found {
            Some(user) if password_valid => user,
            _ => {
                tracing::debug!("Login failed");
                return Err(AppError::InvalidCredentials);
            }
        };

        let now = Utc::now();
        self.uow.users().touch_login(user.id, now).await?;

        let remember_token = if attempt.remember {
            let token = RememberToken::generate();
            self.uow
                .tokens()
                .insert(
                    user.id,
                    token.fingerprint(),
                    now + self.settings.remember_lifetime,
                )
                .await?;
            Some(token)
        } else {
            None
        };

        let state = SessionState::new(&user, attempt.remember, now);
        let session_cookie = self.seal(&state)?;

        tracing::info!(user_id = %user.id, persistent = attempt.remember, "User logged in");

        Ok(Session {
            user: User {
                last_login_at: Some(now),
                ..user
            },
            state,
            session_cookie,
            remember_token,
        })
    }

    async fn resume(&self, presented: PresentedCookies) -> AppResult<Resumption> {
        let now = Utc::now();
        let mut outcome = Resumption::anonymous();

        if let Some(raw) = presented.session.as_deref() {
            match self.open_session(raw, now) {
                Some(state) => {
                    return self
                        .resume_session(state, presented.remember.is_some(), now)
                        .await;
                }
                None => outcome.session = CookieChange::Clear,
            }
        }

        match presented.remember.as_deref() {
            Some(raw) => self.resume_remembered(raw, now, outcome).await,
            None => Ok(outcome),
        }
    }

    async fn logout(&self, presented: PresentedCookies, everywhere: bool) -> AppResult<()> {
        if let Some(token) = presented.remember.as_deref().and_then(RememberToken::parse) {
            self.uow
                .tokens()
                .delete_by_fingerprint(&token.fingerprint())
                .await?;
        }

        if everywhere {
            let state = presented
                .session
                .as_deref()
                .and_then(|raw| self.open_session(raw, Utc::now()));
            if let Some(state) = state {
                let revoked = self.uow.tokens().delete_for_user(state.user_id).await?;
                tracing::info!(user_id = %state.user_id, revoked, "Logged out everywhere");
            }
        }

        Ok(())
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        current: String,
        new: String,
        confirmation: String,
    ) -> AppResult<u64> {
        check_new_password(&new, &confirmation).into_result()?;

        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !Password::from_hash(user.password_hash).verify(&current) {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = Password::new(&new)?.into_string();
        let revoked = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.users().set_password(user_id, password_hash).await?;
                    ctx.tokens().delete_for_user(user_id).await
                })
            })
            .await?;

        tracing::info!(user_id = %user_id, revoked, "Password changed");
        Ok(revoked)
    }

    async fn close_account(&self, user_id: Uuid, password: String) -> AppResult<()> {
        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !Password::from_hash(user.password_hash).verify(&password) {
            return Err(AppError::InvalidCredentials);
        }

        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    ctx.tokens().delete_for_user(user_id).await?;
                    ctx.users().delete(user_id).await
                })
            })
            .await?;

        tracing::info!(user_id = %user_id, "Account closed");
        Ok(())
    }

    async fn purge_expired_tokens(&self) -> AppResult<u64> {
        let purged = self.uow.tokens().purge_expired(Utc::now()).await?;
        tracing::info!(purged, "Expired remember tokens purged");
        Ok(purged)
    }
}
