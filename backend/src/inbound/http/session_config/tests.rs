//! Unit tests for session configuration parsing.

use std::collections::HashMap;

use mockable::MockEnv;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;

/// Key file removed again when dropped.
struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    fn with_len(len: usize) -> Self {
        let path = std::env::temp_dir().join(format!("relay-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len]).expect("write key file");
        Self { path }
    }

    fn path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for KeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn env_from(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn key_file() -> KeyFile {
    KeyFile::with_len(SESSION_KEY_MIN_LEN)
}

fn release_vars(key_file: &KeyFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (KEY_FILE_ENV, key_file.path()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

#[rstest]
fn release_accepts_complete_configuration(key_file: KeyFile) {
    let env = env_from(release_vars(&key_file));

    let settings =
        session_settings_from_env(&env, BuildMode::Release).expect("valid release settings");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_rejects_missing_toggle(key_file: KeyFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&key_file);
    vars.remove(missing);

    let Err(err) = session_settings_from_env(&env_from(vars), BuildMode::Release) else {
        panic!("missing {missing} must fail");
    };

    assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(SAMESITE_ENV, "sometimes")]
#[case(ALLOW_EPHEMERAL_ENV, "")]
fn release_rejects_invalid_toggle(
    key_file: KeyFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&key_file);
    vars.insert(name, value.to_owned());

    let Err(err) = session_settings_from_env(&env_from(vars), BuildMode::Release) else {
        panic!("invalid {name} must fail");
    };

    assert!(matches!(err, SessionConfigError::InvalidEnv { name: n, .. } if n == name));
}

#[rstest]
fn release_rejects_same_site_none_without_secure_cookie(key_file: KeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());

    let result = session_settings_from_env(&env_from(vars), BuildMode::Release);

    assert!(matches!(result, Err(SessionConfigError::InsecureSameSiteNone)));
}

#[rstest]
fn release_rejects_ephemeral_keys(key_file: KeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());

    let result = session_settings_from_env(&env_from(vars), BuildMode::Release);

    assert!(matches!(result, Err(SessionConfigError::EphemeralNotAllowed)));
}

#[rstest]
fn release_rejects_short_key() {
    let short = KeyFile::with_len(SESSION_KEY_MIN_LEN - 1);
    let env = env_from(release_vars(&short));

    let result = session_settings_from_env(&env, BuildMode::Release);

    assert!(matches!(
        result,
        Err(SessionConfigError::KeyTooShort { length, .. }) if length == SESSION_KEY_MIN_LEN - 1
    ));
}

#[rstest]
fn release_requires_readable_key_file(key_file: KeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(KEY_FILE_ENV, format!("{}.missing", key_file.path()));

    let result = session_settings_from_env(&env_from(vars), BuildMode::Release);

    assert!(matches!(result, Err(SessionConfigError::KeyRead { .. })));
}

#[rstest]
fn debug_falls_back_to_defaults() {
    let env = env_from(HashMap::from([(COOKIE_SECURE_ENV, "perhaps".to_owned())]));

    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");

    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_rejects_key_too_short_to_derive() {
    let tiny = KeyFile::with_len(SESSION_KEY_DERIVE_MIN_LEN - 1);
    let env = env_from(HashMap::from([(KEY_FILE_ENV, tiny.path())]));

    let result = session_settings_from_env(&env, BuildMode::Debug);

    assert!(matches!(result, Err(SessionConfigError::KeyTooShort { .. })));
}

#[rstest]
fn same_key_file_yields_same_key(key_file: KeyFile) {
    let first = session_settings_from_env(&env_from(release_vars(&key_file)), BuildMode::Release)
        .expect("first load");
    let second = session_settings_from_env(&env_from(release_vars(&key_file)), BuildMode::Release)
        .expect("second load");

    assert_eq!(first.key.master(), second.key.master());
}
