use super::*;

fn red() -> DecorationRenderOptions {
    DecorationRenderOptions {
        color: Some("red".into()),
        ..DecorationRenderOptions::default()
    }
}

#[test]
fn test_hash_is_stable_for_equal_options() {
    assert_eq!(render_options_hash(&red()), render_options_hash(&red()));
    assert_ne!(
        render_options_hash(&red()),
        render_options_hash(&DecorationRenderOptions::default())
    );
}

#[test]
fn test_subtype_key_format() {
    assert_eq!(subtype_key("lint", "1f"), "lint-1f");
}

#[test]
fn test_register_is_reference_counted() {
    let mut service = DecorationTypeService::new();
    service.register_decoration_type("k", red(), None);
    service.register_decoration_type("k", red(), None);
    service.remove_decoration_type("k");
    assert!(service.has_type("k"));
    service.remove_decoration_type("k");
    assert!(!service.has_type("k"));
    // Removing an unknown key is a no-op.
    service.remove_decoration_type("k");
}

#[test]
fn test_subtype_merges_over_parent() {
    let mut service = DecorationTypeService::new();
    service.register_decoration_type(
        "lint",
        DecorationRenderOptions {
            class_name: Some("squiggly".into()),
            z_index: Some(3),
            ..DecorationRenderOptions::default()
        },
        None,
    );
    service.register_decoration_type("lint-ab", red(), Some("lint"));
    assert_eq!(service.subtype_count("lint"), 1);

    let merged = service.render_options("lint-ab").expect("registered");
    assert_eq!(merged.class_name.as_deref(), Some("squiggly"));
    assert_eq!(merged.color.as_deref(), Some("red"));

    let resolved = service.resolve_decoration_options("lint-ab").expect("resolve");
    assert_eq!(resolved.class_name.as_deref(), Some("squiggly"));
    assert_eq!(resolved.z_index, 3);
}

#[test]
fn test_styled_type_gets_generated_class() {
    let mut service = DecorationTypeService::new();
    service.register_decoration_type(
        "my.key",
        DecorationRenderOptions {
            background_color: Some("#ff0".into()),
            after_content: Some("!".into()),
            ..DecorationRenderOptions::default()
        },
        None,
    );
    let resolved = service.resolve_decoration_options("my.key").expect("resolve");
    assert_eq!(resolved.class_name.as_deref(), Some("ced-my_key"));
    assert_eq!(resolved.inline_class_name.as_deref(), Some("ced-my_key-inline"));
}

#[test]
fn test_resolving_unknown_key_fails() {
    let service = DecorationTypeService::new();
    let err = service.resolve_decoration_options("nope").unwrap_err();
    assert!(matches!(err, EditorError::InvalidArgument(_)));
}

#[test]
fn test_explicit_class_names_win_over_generated_ones() {
    let mut service = DecorationTypeService::new();
    service.register_decoration_type(
        "lint",
        DecorationRenderOptions {
            class_name: Some("squiggly".into()),
            inline_class_name: Some("marker".into()),
            color: Some("red".into()),
            before_content: Some(">".into()),
            ..DecorationRenderOptions::default()
        },
        None,
    );
    let resolved = service.resolve_decoration_options("lint").expect("resolve");
    assert_eq!(resolved.class_name.as_deref(), Some("squiggly"));
    assert_eq!(resolved.inline_class_name.as_deref(), Some("marker"));
}

#[test]
fn test_unstyled_type_has_no_class() {
    let mut service = DecorationTypeService::new();
    service.register_decoration_type("plain", DecorationRenderOptions::default(), None);
    let resolved = service.resolve_decoration_options("plain").expect("resolve");
    assert_eq!(resolved.class_name, None);
    assert_eq!(resolved.inline_class_name, None);
}
