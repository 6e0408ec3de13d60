use super::Themes;

#[test]
fn it_lists_bundled_themes() {
    let themes = Themes::list();

    assert!(themes.contains(&"base16-ocean.dark".to_string()));
    let mut sorted = themes.clone();
    sorted.sort();
    assert_eq!(themes, sorted);
}

#[test]
fn it_gets_a_bundled_theme() {
    assert!(Themes::get("base16-ocean.dark", "").is_ok());
}

#[test]
fn it_fails_on_unknown_themes() {
    let err = Themes::get("nope", "").unwrap_err();
    assert_eq!(err.to_string(), "Theme nope does not exist");
}

#[test]
fn it_fails_on_missing_theme_files() {
    assert!(Themes::get("base16-ocean.dark", "./does-not-exist.tmTheme").is_err());
}
