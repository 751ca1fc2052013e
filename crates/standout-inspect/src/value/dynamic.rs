//! Dynamically shaped values and shared, mutable objects.
//!
//! [`Value`] is a small dynamic data model for callers that build inspectable data
//! at runtime (script bindings, decoded payloads, test fixtures). Its [`Object`]
//! variant is a shared, interior-mutable record, which is what makes reference
//! cycles possible:
//!
//! ```rust
//! use standout_inspect::{Object, Value, Visibility};
//!
//! let node = Object::new("Node").with("name", Visibility::Public, "root");
//! node.set("parent", node.clone());
//! assert!(node.get("parent").is_some());
//! ```
//!
//! Objects also model the field states the engine has to tolerate: fields that are
//! declared but never assigned, and computed fields whose accessor can fail.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;

use super::{
    ConversionError, FieldDescriptor, FieldError, Handle, Identity, Inspect, Key, Node, Record,
    Sequence, Visibility,
};

/// A dynamically shaped value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Map),
    Object(Object),
    Resource(Handle),
    /// A value with no inspectable structure; holds its type name.
    Opaque(String),
}

impl Value {
    /// Builds a list from anything convertible into values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds an opaque value naming its type.
    pub fn opaque(type_name: impl Into<String>) -> Self {
        Value::Opaque(type_name.into())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Map(map) => f
                .debug_map()
                .entries(map.0.iter().map(|(k, v)| (k, v)))
                .finish(),
            // Objects may be cyclic; never recurse here.
            Value::Object(object) => write!(f, "Object({})", object.class_name()),
            Value::Resource(handle) => write!(f, "Resource({})", handle.kind()),
            Value::Opaque(name) => write!(f, "Opaque({})", name),
        }
    }
}

impl Inspect for Value {
    fn inspect(&self) -> Node<'_> {
        match self {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Int(i) => Node::Int(i128::from(*i)),
            Value::Float(x) => Node::Float(*x),
            Value::Str(s) => Node::Str(Cow::Borrowed(s.as_str())),
            Value::List(items) => Node::sequence(items),
            Value::Map(map) => Node::sequence(map),
            Value::Object(object) => object.inspect(),
            Value::Resource(handle) => Node::Handle(handle.clone()),
            Value::Opaque(name) => Node::Unsupported(Cow::Borrowed(name.as_str())),
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Str,
    &str => Str,
    Vec<Value> => List,
    Map => Map,
    Object => Object,
    Handle => Resource,
);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Insertion-ordered string-keyed map.
#[derive(Debug, Clone, Default)]
pub struct Map(Vec<(String, Value)>);

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Sequence for Map {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("array")
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        for (key, value) in &self.0 {
            if visit(Key::Name(Cow::Borrowed(key.as_str())), value).is_break() {
                break;
            }
        }
    }
}

impl Inspect for Map {
    fn inspect(&self) -> Node<'_> {
        Node::sequence(self)
    }
}

type Accessor = Rc<dyn Fn() -> Result<Value, String>>;
type PreviewHook = Rc<dyn Fn(&Object) -> Result<String, String>>;

#[derive(Clone)]
enum Slot {
    Set(Value),
    Unset,
    Computed(Accessor),
}

struct Field {
    name: String,
    visibility: Visibility,
    slot: Slot,
}

struct ObjectData {
    class: String,
    fields: Vec<Field>,
    preview: Option<PreviewHook>,
}

/// A shared record with interior mutability.
///
/// Cloning an `Object` clones the handle, not the data: both handles see the same
/// fields and share one identity.
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    pub fn new(class: impl Into<String>) -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            class: class.into(),
            fields: Vec::new(),
            preview: None,
        })))
    }

    /// Builder form of [`set_field`](Self::set_field).
    pub fn with(self, name: impl Into<String>, visibility: Visibility, value: impl Into<Value>) -> Self {
        self.set_field(name, visibility, value);
        self
    }

    /// Installs a preview hook, shown next to the class name when rendered.
    pub fn with_preview<F>(self, hook: F) -> Self
    where
        F: Fn(&Object) -> Result<String, String> + 'static,
    {
        self.0.borrow_mut().preview = Some(Rc::new(hook));
        self
    }

    /// Assigns a field, declaring it public if it does not exist yet.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently being read, like any `RefCell` write.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let visibility = self
            .0
            .borrow()
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.visibility)
            .unwrap_or(Visibility::Public);
        self.set_field(name, visibility, value);
    }

    /// Declares or replaces a field with a value and visibility.
    pub fn set_field(&self, name: impl Into<String>, visibility: Visibility, value: impl Into<Value>) {
        self.put(name.into(), visibility, Slot::Set(value.into()));
    }

    /// Declares a field without assigning it.
    pub fn declare(&self, name: impl Into<String>, visibility: Visibility) {
        self.put(name.into(), visibility, Slot::Unset);
    }

    /// Declares a field whose value is produced on every read.
    pub fn computed<F>(&self, name: impl Into<String>, visibility: Visibility, accessor: F)
    where
        F: Fn() -> Result<Value, String> + 'static,
    {
        self.put(name.into(), visibility, Slot::Computed(Rc::new(accessor)));
    }

    fn put(&self, name: String, visibility: Visibility, slot: Slot) {
        let mut data = self.0.borrow_mut();
        match data.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.visibility = visibility;
                field.slot = slot;
            }
            None => data.fields.push(Field {
                name,
                visibility,
                slot,
            }),
        }
    }

    /// Current value of an assigned field. Unset and computed fields return `None`.
    pub fn get(&self, name: &str) -> Option<Value> {
        let data = self.0.borrow();
        data.fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| match &f.slot {
                Slot::Set(value) => Some(value.clone()),
                _ => None,
            })
    }

    pub fn class_name(&self) -> String {
        self.0
            .try_borrow()
            .map(|data| data.class.clone())
            .unwrap_or_else(|_| "object".to_string())
    }

    pub fn identity(&self) -> Identity {
        Identity::of(Rc::as_ptr(&self.0))
    }

    /// True when both handles point at the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[cfg(test)]
    pub(crate) fn lock(&self) -> std::cell::RefMut<'_, impl Sized> {
        self.0.borrow_mut()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.class_name())
    }
}

const BORROWED: &str = "object is mutably borrowed";

impl Record for Object {
    fn class_name(&self) -> Cow<'_, str> {
        Cow::Owned(Object::class_name(self))
    }

    fn fields(&self) -> Result<Vec<FieldDescriptor>, FieldError> {
        let data = self
            .0
            .try_borrow()
            .map_err(|_| FieldError::Failed(BORROWED.to_string()))?;
        Ok(data
            .fields
            .iter()
            .map(|f| FieldDescriptor::new(f.name.clone(), f.visibility))
            .collect())
    }

    fn read_field(
        &self,
        field: &FieldDescriptor,
        visit: &mut dyn FnMut(&dyn Inspect),
    ) -> Result<(), FieldError> {
        // Release the borrow before recursing so accessors and nested
        // reads of this same object see a free cell.
        let slot = {
            let data = self
                .0
                .try_borrow()
                .map_err(|_| FieldError::Failed(BORROWED.to_string()))?;
            data.fields
                .iter()
                .find(|f| f.name == field.name())
                .map(|f| f.slot.clone())
                .ok_or_else(|| FieldError::Missing(field.name().to_string()))?
        };

        match slot {
            Slot::Set(value) => visit(&value),
            Slot::Unset => return Err(FieldError::Uninitialized),
            Slot::Computed(accessor) => {
                let value = accessor().map_err(FieldError::Failed)?;
                visit(&value);
            }
        }
        Ok(())
    }

    fn preview(&self) -> Option<Result<String, ConversionError>> {
        let hook = self.0.try_borrow().ok()?.preview.clone()?;
        Some(hook(self).map_err(ConversionError))
    }
}

impl Inspect for Object {
    fn inspect(&self) -> Node<'_> {
        Node::Record {
            record: self,
            identity: Some(self.identity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(object: &Object, name: &str) -> Result<String, FieldError> {
        let mut seen = String::new();
        object.read_field(&FieldDescriptor::public(name.to_string()), &mut |v| {
            seen = format!("{:?}", v.inspect());
        })?;
        Ok(seen)
    }

    #[test]
    fn test_map_insert_keeps_position() {
        let mut map = Map::new().with("a", 1).with("b", 2);
        map.insert("a", 3);
        let keys: Vec<_> = map.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(matches!(map.get("a"), Some(Value::Int(3))));
    }

    #[test]
    fn test_object_clone_shares_identity() {
        let a = Object::new("A");
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), Object::new("A").identity());
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let obj = Object::new("P")
            .with("x", Visibility::Public, 1)
            .with("y", Visibility::Private, 2);
        let names: Vec<_> = obj
            .fields()
            .unwrap()
            .iter()
            .map(|f| (f.name().to_string(), f.visibility()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("x".to_string(), Visibility::Public),
                ("y".to_string(), Visibility::Private)
            ]
        );
    }

    #[test]
    fn test_set_keeps_visibility() {
        let obj = Object::new("P").with("secret", Visibility::Private, 1);
        obj.set("secret", 2);
        let field = obj.fields().unwrap().remove(0);
        assert_eq!(field.visibility(), Visibility::Private);
        assert!(matches!(obj.get("secret"), Some(Value::Int(2))));
    }

    #[test]
    fn test_unset_field_reports_uninitialized() {
        let obj = Object::new("P");
        obj.declare("later", Visibility::Protected);
        assert_eq!(read(&obj, "later"), Err(FieldError::Uninitialized));
    }

    #[test]
    fn test_failing_accessor_reports_message() {
        let obj = Object::new("P");
        obj.computed("conn", Visibility::Public, || Err("connection closed".into()));
        assert_eq!(
            read(&obj, "conn"),
            Err(FieldError::Failed("connection closed".into()))
        );
    }

    #[test]
    fn test_computed_field_value() {
        let obj = Object::new("P");
        obj.computed("n", Visibility::Public, || Ok(Value::Int(4)));
        assert_eq!(read(&obj, "n").unwrap(), "Int(4)");
    }

    #[test]
    fn test_missing_field() {
        let obj = Object::new("P");
        assert_eq!(read(&obj, "nope"), Err(FieldError::Missing("nope".into())));
    }

    #[test]
    fn test_borrowed_object_reports_failure() {
        let obj = Object::new("P").with("x", Visibility::Public, 1);
        let _guard = obj.lock();
        assert!(matches!(obj.fields(), Err(FieldError::Failed(_))));
        assert!(matches!(read(&obj, "x"), Err(FieldError::Failed(_))));
    }

    #[test]
    fn test_self_reference_reads_back_same_object() {
        let obj = Object::new("Node");
        obj.set("me", obj.clone());
        match obj.get("me") {
            Some(Value::Object(inner)) => assert!(inner.ptr_eq(&obj)),
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_preview_hook() {
        let obj = Object::new("Money")
            .with("cents", Visibility::Private, 1250)
            .with_preview(|o| match o.get("cents") {
                Some(Value::Int(c)) => Ok(format!("${}.{:02}", c / 100, c % 100)),
                _ => Err("no cents".into()),
            });
        assert_eq!(obj.preview(), Some(Ok("$12.50".to_string())));
    }

    #[test]
    fn test_preview_failure() {
        let obj = Object::new("Broken").with_preview(|_| Err("boom".into()));
        assert_eq!(obj.preview(), Some(Err(ConversionError("boom".into()))));
    }

    #[test]
    fn test_option_into_value() {
        assert!(matches!(Value::from(None::<i32>), Value::Null));
        assert!(matches!(Value::from(Some("x")), Value::Str(ref s) if s == "x"));
    }
}
