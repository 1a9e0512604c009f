use viewer_core::{
    resolve_theme, update, AppState, Effect, Msg, ResolvedTheme, ThemePreference, ThemeSettings,
};

fn state_with(preference: ThemePreference, system_dark: bool) -> AppState {
    AppState::new().with_theme(ThemeSettings::new(preference, system_dark))
}

#[test]
fn system_preference_follows_os_signal() {
    assert_eq!(resolve_theme(ThemePreference::System, true), ResolvedTheme::Dark);
    assert_eq!(resolve_theme(ThemePreference::System, false), ResolvedTheme::Light);
}

#[test]
fn explicit_preference_ignores_os_signal() {
    for dark in [false, true] {
        assert_eq!(resolve_theme(ThemePreference::Light, dark), ResolvedTheme::Light);
        assert_eq!(resolve_theme(ThemePreference::Dark, dark), ResolvedTheme::Dark);
    }
}

#[test]
fn default_preference_is_system() {
    assert_eq!(ThemePreference::default(), ThemePreference::System);
    assert_eq!("dark".parse::<ThemePreference>(), Ok(ThemePreference::Dark));
    assert!("sepia".parse::<ThemePreference>().is_err());
}

#[test]
fn toggle_from_dark_yields_light_and_persists() {
    let state = state_with(ThemePreference::System, true);
    let (state, effects) = update(state, Msg::ThemeToggled);

    assert_eq!(state.theme().preference(), ThemePreference::Light);
    assert_eq!(
        effects,
        vec![
            Effect::PersistTheme(ThemePreference::Light),
            Effect::ApplyTheme(ResolvedTheme::Light),
        ]
    );
}

#[test]
fn toggle_never_produces_system() {
    let mut state = state_with(ThemePreference::System, false);
    for _ in 0..4 {
        let (next, _) = update(state, Msg::ThemeToggled);
        assert_ne!(next.theme().preference(), ThemePreference::System);
        state = next;
    }
}

#[test]
fn os_change_reapplies_while_system() {
    let (state, effects) = update(
        state_with(ThemePreference::System, false),
        Msg::SystemThemeChanged { dark: true },
    );
    assert_eq!(effects, vec![Effect::ApplyTheme(ResolvedTheme::Dark)]);
    assert_eq!(state.view().resolved_theme, ResolvedTheme::Dark);
}

#[test]
fn os_change_is_silent_for_explicit_preference() {
    let (state, effects) = update(
        state_with(ThemePreference::Light, false),
        Msg::SystemThemeChanged { dark: true },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().resolved_theme, ResolvedTheme::Light);

    // Switching back to system picks up the remembered OS signal.
    let (state, effects) = update(state, Msg::ThemeSelected(ThemePreference::System));
    assert_eq!(
        effects,
        vec![
            Effect::PersistTheme(ThemePreference::System),
            Effect::ApplyTheme(ResolvedTheme::Dark),
        ]
    );
    assert_eq!(state.view().theme_preference, ThemePreference::System);
}
