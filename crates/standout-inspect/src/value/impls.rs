//! [`Inspect`] adapters for standard library and ecosystem types.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::sync::Arc;

use super::{Handle, Identity, Inspect, Key, Node, Sequence};

macro_rules! inspect_int {
    ($($t:ty),*) => {
        $(
            impl Inspect for $t {
                fn inspect(&self) -> Node<'_> {
                    Node::Int(*self as i128)
                }
            }
        )*
    };
}

inspect_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl Inspect for u128 {
    fn inspect(&self) -> Node<'_> {
        match i128::try_from(*self) {
            Ok(n) => Node::Int(n),
            Err(_) => Node::Float(*self as f64),
        }
    }
}

impl Inspect for f32 {
    fn inspect(&self) -> Node<'_> {
        Node::Float(f64::from(*self))
    }
}

impl Inspect for f64 {
    fn inspect(&self) -> Node<'_> {
        Node::Float(*self)
    }
}

impl Inspect for bool {
    fn inspect(&self) -> Node<'_> {
        Node::Bool(*self)
    }
}

impl Inspect for char {
    fn inspect(&self) -> Node<'_> {
        Node::Str(Cow::Owned(self.to_string()))
    }
}

impl Inspect for str {
    fn inspect(&self) -> Node<'_> {
        Node::Str(Cow::Borrowed(self))
    }
}

impl Inspect for String {
    fn inspect(&self) -> Node<'_> {
        Node::Str(Cow::Borrowed(self.as_str()))
    }
}

impl Inspect for Cow<'_, str> {
    fn inspect(&self) -> Node<'_> {
        Node::Str(Cow::Borrowed(self.as_ref()))
    }
}

impl Inspect for () {
    fn inspect(&self) -> Node<'_> {
        Node::Null
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn inspect(&self) -> Node<'_> {
        match self {
            Some(value) => value.inspect(),
            None => Node::Null,
        }
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn inspect(&self) -> Node<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for &mut T {
    fn inspect(&self) -> Node<'_> {
        (**self).inspect()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn inspect(&self) -> Node<'_> {
        (**self).inspect()
    }
}

// Shared pointers are where cycles come from, so they contribute identity.
impl<T: Inspect + ?Sized> Inspect for Rc<T> {
    fn inspect(&self) -> Node<'_> {
        (**self)
            .inspect()
            .with_identity(Identity::of(Rc::as_ptr(self)))
    }
}

impl<T: Inspect + ?Sized> Inspect for Arc<T> {
    fn inspect(&self) -> Node<'_> {
        (**self)
            .inspect()
            .with_identity(Identity::of(Arc::as_ptr(self)))
    }
}

fn visit_indexed<'i, T, I>(items: I, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>)
where
    T: Inspect + 'i,
    I: Iterator<Item = &'i T>,
{
    for (index, item) in items.enumerate() {
        if visit(Key::Index(index), item).is_break() {
            break;
        }
    }
}

fn visit_named<'i, K, V, I>(entries: I, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>)
where
    K: Display + 'i,
    V: Inspect + 'i,
    I: Iterator<Item = (&'i K, &'i V)>,
{
    for (key, value) in entries {
        if visit(Key::Name(Cow::Owned(key.to_string())), value).is_break() {
            break;
        }
    }
}

impl<T: Inspect> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        visit_indexed(self.iter(), visit);
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect(&self) -> Node<'_> {
        Node::sequence(self)
    }
}

impl<T: Inspect, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        visit_indexed(self.iter(), visit);
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn inspect(&self) -> Node<'_> {
        Node::sequence(self)
    }
}

impl<T: Inspect> Sequence for VecDeque<T> {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("deque")
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        visit_indexed(self.iter(), visit);
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn inspect(&self) -> Node<'_> {
        Node::sequence(self)
    }
}

impl<T: Inspect> Sequence for BTreeSet<T> {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("set")
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        visit_indexed(self.iter(), visit);
    }
}

impl<T: Inspect> Inspect for BTreeSet<T> {
    fn inspect(&self) -> Node<'_> {
        Node::sequence(self)
    }
}

impl<T: Inspect, S> Sequence for HashSet<T, S> {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("set")
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        visit_indexed(self.iter(), visit);
    }
}

impl<T: Inspect, S> Inspect for HashSet<T, S> {
    fn inspect(&self) -> Node<'_> {
        Node::sequence(self)
    }
}

impl<K: Display, V: Inspect> Sequence for BTreeMap<K, V> {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("map")
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        visit_named(self.iter(), visit);
    }
}

impl<K: Display, V: Inspect> Inspect for BTreeMap<K, V> {
    fn inspect(&self) -> Node<'_> {
        Node::sequence(self)
    }
}

impl<K: Display, V: Inspect, S> Sequence for HashMap<K, V, S> {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("map")
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        visit_named(self.iter(), visit);
    }
}

impl<K: Display, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn inspect(&self) -> Node<'_> {
        Node::sequence(self)
    }
}

impl Inspect for serde_json::Value {
    fn inspect(&self) -> Node<'_> {
        use serde_json::Value as Json;

        match self {
            Json::Null => Node::Null,
            Json::Bool(b) => Node::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Node::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Node::Int(i128::from(u))
                } else {
                    Node::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Node::Str(Cow::Borrowed(s.as_str())),
            Json::Array(items) => Node::sequence(items),
            Json::Object(map) => Node::sequence(map),
        }
    }
}

impl Sequence for serde_json::Map<String, serde_json::Value> {
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("object")
    }

    fn len(&self) -> usize {
        serde_json::Map::len(self)
    }

    fn for_each_entry(&self, visit: &mut dyn FnMut(Key<'_>, &dyn Inspect) -> ControlFlow<()>) {
        for (key, value) in self.iter() {
            if visit(Key::Name(Cow::Borrowed(key.as_str())), value).is_break() {
                break;
            }
        }
    }
}

impl Inspect for std::fs::File {
    fn inspect(&self) -> Node<'_> {
        Node::Handle(Handle::new("file"))
    }
}

impl Inspect for std::net::TcpStream {
    fn inspect(&self) -> Node<'_> {
        Node::Handle(Handle::new("tcp stream"))
    }
}

impl Inspect for std::process::Child {
    fn inspect(&self) -> Node<'_> {
        Node::Handle(Handle::new("process").with_id(u64::from(self.id())))
    }
}

/// Wraps a value that has no inspectable structure, such as a closure.
///
/// It renders as the "unsupported" sentinel naming the wrapped type.
///
/// ```rust
/// use standout_inspect::{classify, Kind, Opaque};
///
/// let callback = |x: i32| x + 1;
/// assert_eq!(classify(&Opaque(&callback)), Kind::Unsupported);
/// ```
pub struct Opaque<'a, T: ?Sized>(pub &'a T);

impl<T: ?Sized> Inspect for Opaque<'_, T> {
    fn inspect(&self) -> Node<'_> {
        Node::Unsupported(Cow::Borrowed(std::any::type_name::<T>()))
    }
}

#[cfg(feature = "chrono")]
mod datetime {
    use std::borrow::Cow;
    use std::fmt::Display;

    use chrono::{DateTime, TimeZone};

    use crate::value::{ConversionError, FieldDescriptor, FieldError, Inspect, Node, Record};

    impl<Tz: TimeZone> Inspect for DateTime<Tz>
    where
        Tz::Offset: Display,
    {
        fn inspect(&self) -> Node<'_> {
            Node::record(self)
        }
    }

    impl<Tz: TimeZone> Record for DateTime<Tz>
    where
        Tz::Offset: Display,
    {
        fn class_name(&self) -> Cow<'_, str> {
            Cow::Borrowed("DateTime")
        }

        fn fields(&self) -> Result<Vec<FieldDescriptor>, FieldError> {
            Ok(vec![
                FieldDescriptor::public("timestamp"),
                FieldDescriptor::public("offset"),
            ])
        }

        fn read_field(
            &self,
            field: &FieldDescriptor,
            visit: &mut dyn FnMut(&dyn Inspect),
        ) -> Result<(), FieldError> {
            match field.name() {
                "timestamp" => visit(&self.timestamp()),
                "offset" => visit(&self.offset().to_string()),
                other => return Err(FieldError::Missing(other.to_string())),
            }
            Ok(())
        }

        fn preview(&self) -> Option<Result<String, ConversionError>> {
            Some(Ok(self.to_rfc3339()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of(seq: &dyn Sequence) -> Vec<String> {
        let mut keys = Vec::new();
        seq.for_each_entry(&mut |key, _| {
            keys.push(key.to_string());
            ControlFlow::Continue(())
        });
        keys
    }

    #[test]
    fn test_integers_widen() {
        assert!(matches!(7u8.inspect(), Node::Int(7)));
        assert!(matches!((-3i64).inspect(), Node::Int(-3)));
        assert!(matches!(u64::MAX.inspect(), Node::Int(n) if n == u64::MAX as i128));
    }

    #[test]
    fn test_option_maps_none_to_null() {
        let missing: Option<i32> = None;
        assert!(matches!(Inspect::inspect(&missing), Node::Null));
        assert!(matches!(Inspect::inspect(&Some(2)), Node::Int(2)));
    }

    #[test]
    fn test_vec_entries_are_indexed() {
        let items = vec!["a", "b"];
        match items.inspect() {
            Node::Sequence { seq, identity } => {
                assert_eq!(identity, None);
                assert_eq!(keys_of(seq), vec!["0", "1"]);
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_btreemap_entries_are_named() {
        let mut map = BTreeMap::new();
        map.insert("b", 2);
        map.insert("a", 1);
        match map.inspect() {
            Node::Sequence { seq, .. } => {
                assert_eq!(seq.type_name(), "map");
                assert_eq!(keys_of(seq), vec!["\"a\"", "\"b\""]);
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_visit_stops_on_break() {
        let items: Vec<i32> = (0..10).collect();
        let mut seen = 0;
        items.for_each_entry(&mut |_, _| {
            seen += 1;
            if seen == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_rc_carries_identity() {
        let shared = Rc::new(vec![1, 2]);
        let other = Rc::clone(&shared);
        assert!(shared.inspect().identity().is_some());
        assert_eq!(shared.inspect().identity(), other.inspect().identity());
        assert_ne!(
            shared.inspect().identity(),
            Rc::new(vec![1, 2]).inspect().identity()
        );
    }

    #[test]
    fn test_rc_scalar_has_no_identity() {
        let shared = Rc::new(5);
        assert_eq!(shared.inspect().identity(), None);
    }

    #[test]
    fn test_json_numbers() {
        let value = serde_json::json!([1, -2, 1.5, u64::MAX]);
        let mut nodes = Vec::new();
        if let Node::Sequence { seq, .. } = value.inspect() {
            seq.for_each_entry(&mut |_, item| {
                nodes.push(format!("{:?}", item.inspect()));
                ControlFlow::Continue(())
            });
        }
        assert_eq!(nodes[0], "Int(1)");
        assert_eq!(nodes[1], "Int(-2)");
        assert_eq!(nodes[2], "Float(1.5)");
        assert_eq!(nodes[3], format!("Int({})", u64::MAX));
    }

    #[test]
    fn test_json_object_keeps_keys() {
        let value = serde_json::json!({"name": "x"});
        match value.inspect() {
            Node::Sequence { seq, .. } => {
                assert_eq!(seq.type_name(), "object");
                assert_eq!(keys_of(seq), vec!["\"name\""]);
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_opaque_names_type() {
        let value = 3u8;
        match Opaque(&value).inspect() {
            Node::Unsupported(name) => assert_eq!(name, "u8"),
            other => panic!("expected unsupported, got {:?}", other),
        }
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn test_datetime_preview() {
        use crate::value::Record;
        use chrono::{TimeZone, Utc};

        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let preview = at.preview().unwrap().unwrap();
        assert_eq!(preview, "2024-01-02T03:04:05+00:00");
    }
}
