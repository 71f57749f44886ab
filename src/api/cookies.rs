//! Cookie naming and issuance.
//!
//! Cookie names are derived from the site secret so they differ between
//! deployments and reveal nothing about their purpose.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sha2::{Digest, Sha512};
use time::Duration;

use crate::config::{
    Config, MAX_COOKIE_NAME_LENGTH, MIN_COOKIE_NAME_LENGTH, REMEMBER_COOKIE_LABEL,
    SESSION_COOKIE_LABEL,
};
use crate::services::{CookieChange, PresentedCookies, Resumption};

/// Per-deployment cookie names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieNames {
    pub session: String,
    pub remember: String,
}

impl CookieNames {
    /// Derive both names from the site secret; `length` is clamped to the allowed range.
    pub fn derive(secret: &str, length: usize) -> Self {
        let length = length.clamp(MIN_COOKIE_NAME_LENGTH, MAX_COOKIE_NAME_LENGTH);
        Self {
            session: format!("s{}", derive_name(secret, SESSION_COOKIE_LABEL, length)),
            remember: format!("r{}", derive_name(secret, REMEMBER_COOKIE_LABEL, length)),
        }
    }
}

fn derive_name(secret: &str, label: &str, length: usize) -> String {
    let digest = Sha512::new()
        .chain_update(secret.as_bytes())
        .chain_update(b":")
        .chain_update(label.as_bytes())
        .finalize();
    let mut name = hex::encode(digest);
    name.truncate(length);
    name
}

/// Builds, reads and clears the session and remember cookies
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    names: CookieNames,
    secure: bool,
    remember_max_age: Duration,
}

impl CookiePolicy {
    pub fn new(names: CookieNames, secure: bool, remember_max_age: Duration) -> Self {
        Self {
            names,
            secure,
            remember_max_age,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            CookieNames::derive(config.cookie_secret(), config.cookie_name_length),
            config.secure_cookies,
            Duration::seconds(config.remember_lifetime().num_seconds()),
        )
    }

    pub fn names(&self) -> &CookieNames {
        &self.names
    }

    /// Raw values of our cookies as sent by the client; empty values count as absent.
    pub fn presented(&self, jar: &CookieJar) -> PresentedCookies {
        let value = |name: &str| {
            jar.get(name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
        };

        PresentedCookies {
            session: value(&self.names.session),
            remember: value(&self.names.remember),
        }
    }

    /// Session cookie; persistent logins outlive the browser session.
    pub fn session_cookie(&self, value: String, persistent: bool) -> Cookie<'static> {
        let mut cookie = self.base(self.names.session.clone(), value);
        if persistent {
            cookie.set_max_age(self.remember_max_age);
        }
        cookie
    }

    pub fn remember_cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = self.base(self.names.remember.clone(), token);
        cookie.set_max_age(self.remember_max_age);
        cookie
    }

    /// Apply the cookie changes decided while resuming a session
    pub fn apply(&self, jar: CookieJar, resumption: &Resumption) -> CookieJar {
        let persistent = resumption.state.as_ref().is_some_and(|s| s.persistent);

        let jar = match &resumption.session {
            CookieChange::Keep => jar,
            CookieChange::Set(value) => jar.add(self.session_cookie(value.clone(), persistent)),
            CookieChange::Clear => jar.remove(self.removal(self.names.session.clone())),
        };

        match &resumption.remember {
            CookieChange::Keep => jar,
            CookieChange::Set(token) => jar.add(self.remember_cookie(token.clone())),
            CookieChange::Clear => jar.remove(self.removal(self.names.remember.clone())),
        }
    }

    /// Remove both cookies
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(self.removal(self.names.session.clone()))
            .remove(self.removal(self.names.remember.clone()))
    }

    fn base(&self, name: String, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    fn removal(&self, name: String) -> Cookie<'static> {
        self.base(name, String::new())
    }
}
