//! Integration tests for the Inspect derive macro.

#![cfg(feature = "macros")]
#![allow(dead_code)] // Some fields exist only to be skipped or filtered

use std::fmt;
use std::rc::Rc;

use standout_inspect::{
    classify, ChannelRenderer, FieldDescriptor, Inspect, Kind, Options, Record, TermRenderer,
    Visibility,
};

fn plain(value: &dyn Inspect) -> String {
    TermRenderer::plain().render_to_string(&[value], None)
}

mod model {
    use standout_inspect::Inspect;

    #[derive(Inspect)]
    pub struct User {
        pub name: String,
        pub(crate) role: String,
        token: Option<String>,
    }

    impl User {
        pub fn new(name: &str, role: &str) -> Self {
            Self {
                name: name.into(),
                role: role.into(),
                token: None,
            }
        }
    }
}

#[derive(Inspect)]
#[inspect(rename = "Point2D", display)]
struct Point {
    pub x: i32,
    pub y: i32,
    #[inspect(skip)]
    cache: Vec<u8>,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Inspect)]
#[inspect(display)]
struct Unprintable {
    pub x: i32,
}

impl fmt::Display for Unprintable {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }
}

#[derive(Inspect)]
struct Renamed {
    #[inspect(rename = "type", visibility = "public")]
    kind: String,
}

#[derive(Inspect)]
struct Wrapper<T> {
    pub inner: T,
}

#[derive(Inspect)]
struct Tree {
    pub label: &'static str,
    pub children: Vec<Rc<Tree>>,
}

#[test]
fn test_derived_struct_is_a_record() {
    let user = model::User::new("ada", "admin");
    assert_eq!(classify(&user), Kind::Record);
}

#[test]
fn test_field_descriptors_follow_rust_visibility() {
    let user = model::User::new("ada", "admin");
    let fields = user.fields().unwrap();
    assert_eq!(
        fields,
        vec![
            FieldDescriptor::public("name"),
            FieldDescriptor::protected("role"),
            FieldDescriptor::private("token"),
        ]
    );
}

#[test]
fn test_derived_rendering() {
    let user = model::User::new("ada", "admin");
    assert_eq!(
        plain(&user),
        "User {\n  +name: string(3) \"ada\"\n  #role: string(5) \"admin\"\n  -token: null\n}\n"
    );
}

#[test]
fn test_visibility_filters_apply_to_derived_fields() {
    let user = model::User::new("ada", "admin");
    let renderer = TermRenderer::plain().with_options(
        Options::default()
            .include_protected_fields(false)
            .include_private_fields(false),
    );
    assert_eq!(
        renderer.render_to_string(&[&user], None),
        "User {\n  +name: string(3) \"ada\"\n}\n"
    );
}

#[test]
fn test_container_rename_display_and_skip() {
    let point = Point {
        x: 1,
        y: 2,
        cache: vec![0; 4],
    };
    assert_eq!(
        plain(&point),
        "Point2D \"(1, 2)\" {\n  +x: int(1)\n  +y: int(2)\n}\n"
    );
}

#[test]
fn test_failing_display_renders_conversion_error() {
    let value = Unprintable { x: 1 };
    assert_eq!(
        plain(&value),
        "Unprintable *conversion error: Display returned an error* {\n  +x: int(1)\n}\n"
    );
}

#[test]
fn test_field_rename_and_visibility_override() {
    let value = Renamed {
        kind: "circle".into(),
    };
    let fields = value.fields().unwrap();
    assert_eq!(fields[0].name(), "type");
    assert_eq!(fields[0].visibility(), Visibility::Public);
    assert!(plain(&value).contains("+type: string(6) \"circle\""));
}

#[test]
fn test_generic_struct() {
    let value = Wrapper { inner: vec![1, 2] };
    assert_eq!(
        plain(&value),
        "Wrapper {\n  +inner: array(2) [\n    0 => int(1)\n    1 => int(2)\n  ]\n}\n"
    );
}

#[test]
fn test_read_unknown_field_is_missing() {
    let value = Wrapper { inner: 1 };
    let err = value
        .read_field(&FieldDescriptor::public("nope"), &mut |_| {})
        .unwrap_err();
    assert_eq!(err.to_string(), "no such field: nope");
}

#[test]
fn test_shared_subtrees_get_handles() {
    let leaf = Rc::new(Tree {
        label: "leaf",
        children: vec![],
    });
    let root = Tree {
        label: "root",
        children: vec![leaf.clone(), leaf],
    };
    let out = plain(&root);
    assert_eq!(out.matches("0 => Tree #1 {").count(), 1);
    assert_eq!(out.matches("1 => Tree #1 {").count(), 1);
    assert!(!out.contains("RECURSION"));
}
