//! Behaviour tests for reading session cookie settings in production builds.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use mockable::MockEnv;
use recipes::inbound::http::session_config::{
    BuildMode, KEY_FILE_ENV, SessionConfigError, SessionSettings, session_settings_from_env,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::NamedTempFile;

type Outcome = Result<SessionSettings, SessionConfigError>;

/// Environment assembled by the steps, plus the key files it points at.
struct SessionWorld {
    mode: RefCell<BuildMode>,
    vars: RefCell<HashMap<String, String>>,
    key_file: RefCell<Option<NamedTempFile>>,
    outcome: RefCell<Option<Outcome>>,
}

impl SessionWorld {
    fn env(&self) -> MockEnv {
        let vars = self.vars.borrow().clone();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |name| vars.get(name).cloned());
        env
    }

    fn accepted(&self) -> std::cell::Ref<'_, SessionSettings> {
        std::cell::Ref::map(self.outcome.borrow(), |outcome| {
            match outcome.as_ref().expect("settings were read") {
                Ok(settings) => settings,
                Err(error) => panic!("settings rejected: {error}"),
            }
        })
    }

    fn rejection(&self) -> std::cell::Ref<'_, SessionConfigError> {
        std::cell::Ref::map(self.outcome.borrow(), |outcome| {
            match outcome.as_ref().expect("settings were read") {
                Ok(_) => panic!("settings were accepted"),
                Err(error) => error,
            }
        })
    }
}

fn rejection_kind(error: &SessionConfigError) -> &'static str {
    match error {
        SessionConfigError::MissingEnv { .. } => "missing",
        SessionConfigError::InvalidEnv { .. } => "invalid",
        SessionConfigError::KeyRead { .. } => "key_read",
        SessionConfigError::KeyTooShort { .. } => "key_too_short",
        SessionConfigError::InsecureSameSiteNone => "samesite_none",
        SessionConfigError::EphemeralNotAllowed => "ephemeral",
    }
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld {
        mode: RefCell::new(BuildMode::Debug),
        vars: RefCell::new(HashMap::new()),
        key_file: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

#[given("a production build")]
fn a_production_build(world: &SessionWorld) {
    *world.mode.borrow_mut() = BuildMode::Release;
}

#[given("the variable {name} holds \"{value}\"")]
fn the_variable_holds(world: &SessionWorld, name: String, value: String) {
    world.vars.borrow_mut().insert(name, value);
}

#[given("a key file of {len} bytes")]
fn a_key_file_of(world: &SessionWorld, len: usize) {
    let mut file = NamedTempFile::new().expect("key file");
    file.write_all(&vec![b'k'; len]).expect("key bytes");
    world.vars.borrow_mut().insert(
        KEY_FILE_ENV.to_owned(),
        file.path().to_string_lossy().into_owned(),
    );
    *world.key_file.borrow_mut() = Some(file);
}

#[when("the session settings are read")]
fn the_session_settings_are_read(world: &SessionWorld) {
    let mode = *world.mode.borrow();
    let outcome = session_settings_from_env(&world.env(), mode);
    *world.outcome.borrow_mut() = Some(outcome);
}

#[then("the settings are accepted")]
fn the_settings_are_accepted(world: &SessionWorld) {
    drop(world.accepted());
}

#[then("the cookie is marked secure")]
fn the_cookie_is_marked_secure(world: &SessionWorld) {
    assert!(world.accepted().cookie_secure);
}

#[then("the cookie uses SameSite \"{policy}\"")]
fn the_cookie_uses_same_site(world: &SessionWorld, policy: String) {
    assert_eq!(world.accepted().same_site.to_string(), policy);
}

#[then("the settings are rejected because {name} is unset")]
fn the_settings_are_rejected_because_unset(world: &SessionWorld, name: String) {
    match &*world.rejection() {
        SessionConfigError::MissingEnv { name: missing } => assert_eq!(*missing, name),
        other => panic!("expected a missing variable, got {other}"),
    }
}

#[then("the settings are rejected with \"{kind}\"")]
fn the_settings_are_rejected_with(world: &SessionWorld, kind: String) {
    assert_eq!(rejection_kind(&world.rejection()), kind);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Production settings load when every toggle is present"
)]
fn complete_production_settings(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Production settings need the secure toggle"
)]
fn secure_toggle_is_required(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Production settings refuse ephemeral keys"
)]
fn ephemeral_keys_are_refused(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "SameSite None requires a secure cookie"
)]
fn same_site_none_needs_secure(world: SessionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/session_config.feature",
    name = "Production settings refuse short keys"
)]
fn short_keys_are_refused(world: SessionWorld) {
    drop(world);
}
