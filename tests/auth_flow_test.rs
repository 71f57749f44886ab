//! Authentication flows against a real (in-memory SQLite) database.

mod common;

use chrono::{Duration, Utc};

use common::{harness, harness_with, registration, test_config, PASSWORD};
use doorman::config::VAULT_PURPOSE_SESSION;
use doorman::domain::{RememberToken, SessionState};
use doorman::errors::AppError;
use doorman::infra::{TokenRepository, TokenStore};
use doorman::services::{CookieChange, LoginAttempt, PresentedCookies, ResumeSource};

fn attempt(login: &str, password: &str, remember: bool) -> LoginAttempt {
    LoginAttempt {
        login: login.to_string(),
        password: password.to_string(),
        remember,
    }
}

fn session_only(value: String) -> PresentedCookies {
    PresentedCookies {
        session: Some(value),
        remember: None,
    }
}

fn remember_only(token: &RememberToken) -> PresentedCookies {
    PresentedCookies {
        session: None,
        remember: Some(token.as_str().to_string()),
    }
}

#[tokio::test]
async fn test_register_and_login_by_username_or_email() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("  alice ", "Alice@Example.COM"))
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_ne!(user.password_hash, PASSWORD);

    let by_name = h.auth.login(attempt("alice", PASSWORD, false)).await.unwrap();
    assert_eq!(by_name.user.id, user.id);
    assert!(by_name.remember_token.is_none());

    let by_email = h
        .auth
        .login(attempt("ALICE@example.com", PASSWORD, false))
        .await
        .unwrap();
    assert_eq!(by_email.user.id, user.id);

    let stored = h.users.get_user(user.id).await.unwrap();
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn test_register_reports_taken_username_and_email() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    let err = h
        .auth
        .register(registration("alice", "ALICE@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.violation_codes(), Some(vec![3, 8]));
}

#[tokio::test]
async fn test_usernames_differing_only_in_case_collide() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("jdoe", "jdoe@example.com"))
        .await
        .unwrap();

    let err = h
        .auth
        .register(registration("JDoe", "other@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.violation_codes(), Some(vec![3]));

    let session = h.auth.login(attempt("JDOE", PASSWORD, false)).await.unwrap();
    assert_eq!(session.user.id, user.id);
    assert_eq!(session.user.username, "jdoe");
}

#[tokio::test]
async fn test_soft_deleted_names_stay_taken() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    h.users.delete_user(user.id).await.unwrap();

    let err = h
        .auth
        .register(registration("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.violation_codes(), Some(vec![3]));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    let wrong_password = h
        .auth
        .login(attempt("alice", "Password999", false))
        .await
        .unwrap_err();
    let unknown_user = h
        .auth
        .login(attempt("mallory", PASSWORD, false))
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AppError::InvalidCredentials));
    assert!(matches!(unknown_user, AppError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_fresh_session_is_trusted_without_database() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let session = h.auth.login(attempt("alice", PASSWORD, false)).await.unwrap();

    let resumed = h
        .auth
        .resume(session_only(session.session_cookie))
        .await
        .unwrap();

    assert_eq!(resumed.source, ResumeSource::Trusted);
    assert_eq!(resumed.session, CookieChange::Keep);
    assert_eq!(resumed.state.unwrap().user_id, session.user.id);
}

#[tokio::test]
async fn test_zero_trust_window_rechecks_every_request() {
    let mut config = test_config();
    config.cookie_trust_seconds = 0;
    let h = harness_with(config).await;

    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let session = h.auth.login(attempt("alice", PASSWORD, false)).await.unwrap();

    let resumed = h
        .auth
        .resume(session_only(session.session_cookie))
        .await
        .unwrap();

    assert_eq!(resumed.source, ResumeSource::Verified);
    assert!(matches!(resumed.session, CookieChange::Set(_)));
}

#[tokio::test]
async fn test_recheck_drops_session_of_closed_account() {
    let mut config = test_config();
    config.cookie_trust_seconds = 0;
    let h = harness_with(config).await;

    let user = h
        .auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let session = h.auth.login(attempt("alice", PASSWORD, false)).await.unwrap();
    h.auth
        .close_account(user.id, PASSWORD.to_string())
        .await
        .unwrap();

    let resumed = h
        .auth
        .resume(session_only(session.session_cookie))
        .await
        .unwrap();

    assert!(resumed.state.is_none());
    assert_eq!(resumed.session, CookieChange::Clear);

    let err = h
        .auth
        .login(attempt("alice", PASSWORD, false))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_expired_session_is_cleared() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    let issued = Utc::now() - h.config.session_ttl() - Duration::minutes(1);
    let stale = SessionState::new(&user, false, issued);
    let sealed = h.vault.seal(VAULT_PURPOSE_SESSION, &stale).unwrap();

    let resumed = h.auth.resume(session_only(sealed)).await.unwrap();

    assert!(resumed.state.is_none());
    assert_eq!(resumed.session, CookieChange::Clear);
    assert_eq!(resumed.remember, CookieChange::Keep);
}

#[tokio::test]
async fn test_session_sealed_with_another_key_is_rejected() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    let foreign = doorman::Vault::from_base64(&doorman::Vault::generate_key()).unwrap();
    let forged = foreign
        .seal(VAULT_PURPOSE_SESSION, &SessionState::new(&user, false, Utc::now()))
        .unwrap();

    let resumed = h.auth.resume(session_only(forged)).await.unwrap();
    assert!(resumed.state.is_none());
    assert_eq!(resumed.session, CookieChange::Clear);
}

#[tokio::test]
async fn test_remember_token_rotates_and_old_one_dies() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let session = h.auth.login(attempt("alice", PASSWORD, true)).await.unwrap();
    let original = session.remember_token.expect("remember token");

    let resumed = h.auth.resume(remember_only(&original)).await.unwrap();
    assert_eq!(resumed.source, ResumeSource::Remembered);
    assert!(resumed.state.as_ref().unwrap().persistent);
    assert!(matches!(resumed.session, CookieChange::Set(_)));

    let rotated = match resumed.remember {
        CookieChange::Set(value) => RememberToken::parse(&value).expect("well formed token"),
        other => panic!("expected a rotated token, got {:?}", other),
    };
    assert_ne!(rotated.as_str(), original.as_str());

    let replay = h.auth.resume(remember_only(&original)).await.unwrap();
    assert!(replay.state.is_none());
    assert_eq!(replay.remember, CookieChange::Clear);

    let again = h.auth.resume(remember_only(&rotated)).await.unwrap();
    assert_eq!(again.source, ResumeSource::Remembered);
}

#[tokio::test]
async fn test_invalid_session_falls_back_to_remember_token() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let session = h.auth.login(attempt("alice", PASSWORD, true)).await.unwrap();
    let token = session.remember_token.unwrap();

    let resumed = h
        .auth
        .resume(PresentedCookies {
            session: Some("tampered".to_string()),
            remember: Some(token.as_str().to_string()),
        })
        .await
        .unwrap();

    assert_eq!(resumed.source, ResumeSource::Remembered);
    assert!(matches!(resumed.session, CookieChange::Set(_)));
}

#[tokio::test]
async fn test_logout_everywhere_revokes_all_tokens() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let laptop = h.auth.login(attempt("alice", PASSWORD, true)).await.unwrap();
    let phone = h.auth.login(attempt("alice", PASSWORD, true)).await.unwrap();
    let phone_token = phone.remember_token.unwrap();

    h.auth
        .logout(
            PresentedCookies {
                session: Some(laptop.session_cookie),
                remember: laptop.remember_token.map(|t| t.as_str().to_string()),
            },
            true,
        )
        .await
        .unwrap();

    let resumed = h.auth.resume(remember_only(&phone_token)).await.unwrap();
    assert!(resumed.state.is_none());
}

#[tokio::test]
async fn test_plain_logout_keeps_other_devices() {
    let h = harness().await;
    h.auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let laptop = h.auth.login(attempt("alice", PASSWORD, true)).await.unwrap();
    let phone = h.auth.login(attempt("alice", PASSWORD, true)).await.unwrap();
    let laptop_token = laptop.remember_token.unwrap();

    h.auth
        .logout(remember_only(&laptop_token), false)
        .await
        .unwrap();

    let laptop_resumed = h.auth.resume(remember_only(&laptop_token)).await.unwrap();
    assert!(laptop_resumed.state.is_none());

    let phone_resumed = h
        .auth
        .resume(remember_only(phone.remember_token.as_ref().unwrap()))
        .await
        .unwrap();
    assert_eq!(phone_resumed.source, ResumeSource::Remembered);
}

#[tokio::test]
async fn test_change_password_revokes_tokens() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    let session = h.auth.login(attempt("alice", PASSWORD, true)).await.unwrap();

    let wrong = h
        .auth
        .change_password(
            user.id,
            "not-my-password".to_string(),
            "NewPassword456".to_string(),
            "NewPassword456".to_string(),
        )
        .await
        .unwrap_err();
    assert!(matches!(wrong, AppError::InvalidCredentials));

    let revoked = h
        .auth
        .change_password(
            user.id,
            PASSWORD.to_string(),
            "NewPassword456".to_string(),
            "NewPassword456".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(revoked, 1);

    let resumed = h
        .auth
        .resume(remember_only(session.remember_token.as_ref().unwrap()))
        .await
        .unwrap();
    assert!(resumed.state.is_none());

    assert!(h.auth.login(attempt("alice", PASSWORD, false)).await.is_err());
    assert!(h
        .auth
        .login(attempt("alice", "NewPassword456", false))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_expired_remember_token_is_removed() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();

    let token = RememberToken::generate();
    let store = TokenStore::new(h.database.get_connection());
    store
        .insert(user.id, token.fingerprint(), Utc::now() - Duration::days(1))
        .await
        .unwrap();

    let resumed = h.auth.resume(remember_only(&token)).await.unwrap();
    assert!(resumed.state.is_none());
    assert_eq!(resumed.remember, CookieChange::Clear);
    assert!(store
        .find_by_fingerprint(&token.fingerprint())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_purge_expired_tokens() {
    let h = harness().await;
    let user = h
        .auth
        .register(registration("alice", "alice@example.com"))
        .await
        .unwrap();
    h.auth.login(attempt("alice", PASSWORD, true)).await.unwrap();

    let store = TokenStore::new(h.database.get_connection());
    for _ in 0..2 {
        store
            .insert(
                user.id,
                RememberToken::generate().fingerprint(),
                Utc::now() - Duration::hours(1),
            )
            .await
            .unwrap();
    }

    assert_eq!(h.auth.purge_expired_tokens().await.unwrap(), 2);
    assert_eq!(h.auth.purge_expired_tokens().await.unwrap(), 0);
}
