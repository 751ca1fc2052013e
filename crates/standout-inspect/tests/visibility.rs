//! Field visibility filtering and field failure sentinels.

use standout_inspect::{ChannelRenderer, Object, Options, TermRenderer, Value, Visibility};

fn account() -> Object {
    Object::new("Account")
        .with("id", Visibility::Public, 1)
        .with("owner", Visibility::Protected, "ada")
        .with("secret", Visibility::Private, "hunter2")
}

fn render(options: Options, value: &Object) -> String {
    TermRenderer::plain()
        .with_options(options)
        .render_to_string(&[value], None)
}

#[test]
fn test_all_fields_by_default() {
    let out = render(Options::default(), &account());
    assert_eq!(
        out,
        "Account #1 {\n  +id: int(1)\n  #owner: string(3) \"ada\"\n  -secret: string(7) \"hunter2\"\n}\n"
    );
}

#[test]
fn test_private_fields_excluded() {
    let out = render(Options::default().include_private_fields(false), &account());
    assert!(out.contains("#owner"));
    assert!(!out.contains("secret"));
    assert!(!out.contains("hunter2"));
}

#[test]
fn test_protected_fields_excluded() {
    let out = render(Options::default().include_protected_fields(false), &account());
    assert!(!out.contains("owner"));
    assert!(out.contains("-secret"));
}

#[test]
fn test_only_public_fields() {
    let options = Options::default()
        .include_protected_fields(false)
        .include_private_fields(false);
    let out = render(options, &account());
    assert_eq!(out, "Account #1 {\n  +id: int(1)\n}\n");
}

#[test]
fn test_toggling_private_fields_back_on() {
    let value = account();
    let mut renderer = TermRenderer::plain();

    renderer.set_option("includePrivateFields", false).unwrap();
    let hidden = renderer.render_to_string(&[&value], None);
    assert_eq!(
        hidden,
        "Account #1 {\n  +id: int(1)\n  #owner: string(3) \"ada\"\n}\n"
    );

    renderer.set_option("includePrivateFields", true).unwrap();
    let shown = renderer.render_to_string(&[&value], None);
    assert_eq!(
        shown,
        hidden.replace("}\n", "  -secret: string(7) \"hunter2\"\n}\n")
    );
    assert_eq!(shown, render(Options::default(), &value));
}

#[test]
fn test_public_fields_always_shown() {
    let obj = Object::new("Empty").with("x", Visibility::Private, 1);
    let options = Options::default().include_private_fields(false);
    assert_eq!(render(options, &obj), "Empty #1 {}\n");
}

#[test]
fn test_uninitialized_and_failing_fields() {
    let conn = Object::new("Conn");
    conn.declare("socket", Visibility::Private);
    conn.computed("peer", Visibility::Public, || Err("not connected".to_string()));
    conn.computed("port", Visibility::Public, || Ok(Value::Int(8080)));

    let out = render(Options::default(), &conn);
    assert_eq!(
        out,
        "Conn #1 {\n  -socket: *uninitialized*\n  +peer: *error: not connected*\n  +port: int(8080)\n}\n"
    );
}

#[test]
fn test_computed_field_yielding_object() {
    let obj = Object::new("Busy");
    obj.set("x", 1);
    let parent = Object::new("Parent");
    parent.computed("busy", Visibility::Public, {
        let obj = obj.clone();
        move || Ok(Value::Object(obj.clone()))
    });
    let out = render(Options::default(), &parent);
    assert!(out.contains("+busy: Busy #2 {"));
}
