use super::*;

#[test]
fn test_insert_and_lookup_by_id() {
    let mut registry = WidgetRegistry::new();
    assert!(!registry.insert("hover", 1));
    assert!(!registry.insert("find", 2));
    assert_eq!(registry.get("hover"), Some(&1));
    assert_eq!(registry.len(), 2);
    assert!(registry.contains("find"));
}

#[test]
fn test_insert_same_id_overwrites() {
    let mut registry = WidgetRegistry::new();
    registry.insert("hover", 1);
    assert!(registry.insert("hover", 5));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("hover"), Some(&5));
}

#[test]
fn test_remove_frees_id() {
    let mut registry = WidgetRegistry::new();
    registry.insert("hover", 1);
    assert_eq!(registry.remove("hover"), Some(1));
    assert_eq!(registry.remove("hover"), None);
    assert!(registry.is_empty());
    assert!(!registry.insert("hover", 2));
}

#[test]
fn test_get_mut_and_ids() {
    let mut registry = WidgetRegistry::new();
    registry.insert("a", 1);
    registry.insert("b", 2);
    if let Some(value) = registry.get_mut("b") {
        *value = 20;
    }
    let mut ids: Vec<&str> = registry.ids().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(registry.values().sum::<i32>(), 21);
}
