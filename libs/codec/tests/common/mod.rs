//! Shared fixtures for the codec suites

#![allow(dead_code)]

use vessel_types::{Container, Long, NamedValue, ULong, Value};

/// Every scalar kind at its numeric boundaries
pub fn boundary_values() -> Vec<NamedValue> {
    vec![
        NamedValue::new("null", ()),
        NamedValue::new("true", true),
        NamedValue::new("false", false),
        NamedValue::new("short_min", i16::MIN),
        NamedValue::new("short_max", i16::MAX),
        NamedValue::new("ushort_max", u16::MAX),
        NamedValue::new("int_zero", 0i32),
        NamedValue::new("int_min", i32::MIN),
        NamedValue::new("int_max", i32::MAX),
        NamedValue::new("uint_max", u32::MAX),
        NamedValue::new("long_min", Long(i32::MIN)),
        NamedValue::new("ulong_max", ULong(u32::MAX)),
        NamedValue::new("llong_min", i64::MIN),
        NamedValue::new("llong_max", i64::MAX),
        NamedValue::new("ullong_zero", 0u64),
        NamedValue::new("ullong_max", u64::MAX),
        NamedValue::new("float_min", f32::MIN),
        NamedValue::new("float_max", f32::MAX),
        NamedValue::new("float_inf", f32::INFINITY),
        NamedValue::new("float_neg_inf", f32::NEG_INFINITY),
        NamedValue::new("float_nan", f32::NAN),
        NamedValue::new("double_min", f64::MIN),
        NamedValue::new("double_max", f64::MAX),
        NamedValue::new("double_inf", f64::INFINITY),
        NamedValue::new("double_neg_inf", f64::NEG_INFINITY),
        NamedValue::new("double_nan", f64::NAN),
        NamedValue::new("double_neg_zero", -0.0f64),
        NamedValue::new("string_empty", ""),
        NamedValue::new("string_unicode", "héllo, wörld; [ok] {1}"),
        NamedValue::new("string_long", "x".repeat(70_000)),
        NamedValue::new("bytes_empty", Vec::<u8>::new()),
        NamedValue::new("bytes", (0..=255u8).collect::<Vec<_>>()),
    ]
}

pub fn boundary_container() -> Container {
    boundary_values().into_iter().collect()
}

/// `depth` containers nested under "child", innermost holding "leaf"
pub fn nested_chain(depth: usize) -> Container {
    let mut current: Container = Container::new();
    current.set("leaf", true);
    for level in 0..depth {
        let parent: Container = Container::new();
        parent.set("level", level as i32);
        parent.set("child", Value::from(current));
        current = parent;
    }
    current
}

/// Same number regardless of integer width
pub fn same_number(a: &Value, b: &Value) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_u64().is_some() && a.as_u64() == b.as_u64(),
    }
}
