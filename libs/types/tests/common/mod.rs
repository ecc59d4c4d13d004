//! Shared fixtures for the container integration suites

#![allow(dead_code)]

use vessel_types::{Container, Long, NamedValue, StoragePolicy, ULong, Value};

/// One value of every scalar kind
pub fn scalar_samples() -> Vec<NamedValue> {
    vec![
        NamedValue::new("null", ()),
        NamedValue::new("bool", true),
        NamedValue::new("short", i16::MIN),
        NamedValue::new("ushort", u16::MAX),
        NamedValue::new("int", -42i32),
        NamedValue::new("uint", 42u32),
        NamedValue::new("long", Long(i32::MIN)),
        NamedValue::new("ulong", ULong(u32::MAX)),
        NamedValue::new("llong", i64::MIN),
        NamedValue::new("ullong", u64::MAX),
        NamedValue::new("float", 1.5f32),
        NamedValue::new("double", -0.25f64),
        NamedValue::new("string", "hello"),
        NamedValue::new("bytes", vec![0u8, 1, 2, 255]),
    ]
}

/// Container holding `count` int fields named `field_<i>`
pub fn numbered<S: StoragePolicy>(count: usize) -> Container<S> {
    let container = Container::new();
    for i in 0..count {
        container.set(format!("field_{i}"), i as i32);
    }
    container
}

/// Chain of `depth` containers, each holding the next under "child"
pub fn nested_chain(depth: usize) -> Container {
    let mut current = Container::new();
    current.set("leaf", true);
    for level in 0..depth {
        let parent = Container::new();
        parent.set("level", level as i32);
        parent.set("child", Value::from(current));
        current = parent;
    }
    current
}
