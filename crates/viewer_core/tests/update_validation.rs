use std::sync::Once;
use std::time::Duration;

use viewer_core::{
    update, AppState, Effect, Msg, ValidationError, ValidationResult, ValidationRules,
    ValidationStatus, VALIDATION_DEBOUNCE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(viewer_logging::initialize_for_tests);
}

fn reachability_rules() -> ValidationRules {
    ValidationRules {
        check_host_pattern: true,
        check_reachability: true,
    }
}

/// Types `text` and lets the debounce timer fire.
fn type_and_settle(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    let (state, effects) = update(state, Msg::InputChanged(text.to_string()));
    let generation = match effects.as_slice() {
        [Effect::ScheduleValidation { generation, .. }] => *generation,
        other => panic!("expected a debounce effect, got {other:?}"),
    };
    update(state, Msg::DebounceElapsed { generation })
}

#[test]
fn input_change_schedules_debounced_validation() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::InputChanged("example.com".into()));

    assert_eq!(
        effects,
        vec![Effect::ScheduleValidation {
            generation: 1,
            delay: VALIDATION_DEBOUNCE,
        }]
    );
    assert_eq!(*state.validation(), ValidationStatus::Pending);
    assert_eq!(state.view().input_valid, None);
}

#[test]
fn custom_debounce_is_carried_in_effect() {
    let state = AppState::new().with_debounce(Duration::from_millis(20));
    let (_, effects) = update(state, Msg::InputChanged("a.com".into()));
    assert_eq!(
        effects,
        vec![Effect::ScheduleValidation {
            generation: 1,
            delay: Duration::from_millis(20),
        }]
    );
}

#[test]
fn clearing_input_resets_without_effects() {
    init_logging();
    let (state, _) = type_and_settle(AppState::new(), "example.com");
    let (state, effects) = update(state, Msg::InputChanged(String::new()));

    assert!(effects.is_empty());
    assert_eq!(*state.validation(), ValidationStatus::Empty);
    assert_eq!(state.view().validation_message, None);
}

#[test]
fn bare_domain_becomes_valid_after_debounce() {
    init_logging();
    let (state, effects) = type_and_settle(AppState::new(), "example.com");

    assert!(effects.is_empty());
    assert_eq!(
        *state.validation(),
        ValidationStatus::Done(ValidationResult::Valid)
    );
    let view = state.view();
    assert_eq!(view.input_valid, Some(true));
    assert!(view.can_submit);
}

#[test]
fn invalid_text_reports_scheme_hint() {
    init_logging();
    let (state, _) = type_and_settle(AppState::new(), "not a url");

    assert_eq!(
        *state.validation(),
        ValidationStatus::Done(ValidationResult::Invalid(ValidationError::MissingScheme))
    );
    let view = state.view();
    assert_eq!(view.input_valid, Some(false));
    assert!(view
        .validation_message
        .unwrap()
        .contains("starting with http:// or https://"));
    assert!(!view.can_submit);
}

#[test]
fn stale_debounce_is_ignored() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::InputChanged("exa".into()));
    let (state, _) = update(state, Msg::InputChanged("example.com".into()));
    assert_eq!(state.generation(), 2);

    let (mut state, effects) = update(state, Msg::DebounceElapsed { generation: 1 });
    assert!(effects.is_empty());
    assert_eq!(*state.validation(), ValidationStatus::Pending);
    state.consume_dirty();

    let (state, _) = update(state, Msg::DebounceElapsed { generation: 2 });
    assert_eq!(
        *state.validation(),
        ValidationStatus::Done(ValidationResult::Valid)
    );
}

#[test]
fn reachability_check_requested_for_valid_input() {
    init_logging();
    let state = AppState::new().with_rules(reachability_rules());
    let (state, effects) = type_and_settle(state, "example.com");

    assert_eq!(
        effects,
        vec![Effect::CheckReachability {
            generation: 1,
            url: "https://example.com".to_string(),
        }]
    );
    assert_eq!(*state.validation(), ValidationStatus::Checking);
    assert!(state.view().checking);

    let (state, _) = update(
        state,
        Msg::ReachabilityChecked {
            generation: 1,
            result: ValidationResult::Invalid(ValidationError::Timeout),
        },
    );
    assert_eq!(state.view().input_valid, Some(false));
}

#[test]
fn reachability_not_requested_for_invalid_input() {
    init_logging();
    let state = AppState::new().with_rules(reachability_rules());
    let (_, effects) = type_and_settle(state, "https://intranet");
    assert!(effects.is_empty());
}

#[test]
fn stale_reachability_result_does_not_overwrite_newer_input() {
    init_logging();
    let state = AppState::new().with_rules(reachability_rules());
    let (state, _) = type_and_settle(state, "slow.example.com");
    let (state, _) = type_and_settle(state, "fast.example.com");
    assert_eq!(state.generation(), 2);

    // The newer check finishes first.
    let (state, _) = update(
        state,
        Msg::ReachabilityChecked {
            generation: 2,
            result: ValidationResult::Valid,
        },
    );
    // The older one arrives late and must be dropped.
    let (state, _) = update(
        state,
        Msg::ReachabilityChecked {
            generation: 1,
            result: ValidationResult::Invalid(ValidationError::Unreachable("dns".into())),
        },
    );

    assert_eq!(
        *state.validation(),
        ValidationStatus::Done(ValidationResult::Valid)
    );
}

#[test]
fn submit_requires_valid_input() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::UrlSubmitted);
    assert!(effects.is_empty());
    assert_eq!(state.current_url(), None);

    let (state, _) = update(state, Msg::InputChanged("example.com".into()));
    let (state, effects) = update(state, Msg::UrlSubmitted);
    assert!(effects.is_empty(), "pending input cannot be submitted");

    let (state, _) = update(state, Msg::DebounceElapsed { generation: 1 });
    let (state, effects) = update(state, Msg::UrlSubmitted);
    assert_eq!(
        effects,
        vec![Effect::NavigateFrame {
            nav_id: 1,
            url: "https://example.com".to_string(),
        }]
    );
    assert_eq!(state.current_url(), Some("https://example.com"));
}
