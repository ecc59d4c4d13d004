use super::error::ValidationError;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use vessel_types::{Container, ContainerError, NamedValue, StoragePolicy, Value, ValueKind};

/// Custom check: `Some(reason)` on failure
pub type CustomValidator = Arc<dyn Fn(&NamedValue) -> Option<String> + Send + Sync>;

#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    /// `None` when the pattern failed to compile; every string then mismatches
    regex: Option<Regex>,
}

impl Pattern {
    fn compile(source: &str) -> Self {
        let regex = match Regex::new(&format!("^(?:{source})$")) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(pattern = source, error = %err, "invalid schema pattern");
                None
            }
        };
        Self {
            source: source.to_string(),
            regex,
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }
}

#[derive(Clone)]
struct FieldDef {
    name: String,
    kind: ValueKind,
    required: bool,
    int_range: Option<(i64, i64)>,
    double_range: Option<(f64, f64)>,
    length: Option<(usize, usize)>,
    pattern: Option<Pattern>,
    allowed: Option<Vec<String>>,
    custom: Vec<CustomValidator>,
    nested: Option<Box<Schema>>,
}

impl FieldDef {
    fn new(name: String, kind: ValueKind, required: bool) -> Self {
        Self {
            name,
            kind,
            required,
            int_range: None,
            double_range: None,
            length: None,
            pattern: None,
            allowed: None,
            custom: Vec::new(),
            nested: None,
        }
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("int_range", &self.int_range)
            .field("double_range", &self.double_range)
            .field("length", &self.length)
            .field("pattern", &self.pattern.as_ref().map(|p| &p.source))
            .field("allowed", &self.allowed)
            .field("custom", &self.custom.len())
            .field("nested", &self.nested)
            .finish()
    }
}

/// Collects violations; in fail-fast mode it is full after the first one
struct Report {
    errors: Vec<ValidationError>,
    fail_fast: bool,
}

impl Report {
    fn new(fail_fast: bool) -> Self {
        Self {
            errors: Vec::new(),
            fail_fast,
        }
    }

    fn push(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    fn done(&self) -> bool {
        self.fail_fast && !self.errors.is_empty()
    }
}

/// Ordered set of field constraints
///
/// Built by chaining; constraint methods naming a field that was never
/// declared with [`require`](Self::require) or [`optional`](Self::optional)
/// are ignored. Validation never mutates the schema and holds no state between
/// calls, so one schema can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.declare(name.into(), kind, true)
    }

    pub fn optional(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.declare(name.into(), kind, false)
    }

    /// Declare a container field checked against `schema`
    pub fn require_nested(self, name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        self.declare(name.clone(), ValueKind::Container, true)
            .nested(&name, schema)
    }

    pub fn optional_nested(self, name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        self.declare(name.clone(), ValueKind::Container, false)
            .nested(&name, schema)
    }

    /// Attach a nested schema to a declared container field
    pub fn nested(self, name: &str, schema: Schema) -> Self {
        self.with_field(name, |field| field.nested = Some(Box::new(schema)))
    }

    /// Inclusive range for integer kinds
    pub fn range(self, name: &str, min: i64, max: i64) -> Self {
        self.with_field(name, |field| field.int_range = Some((min, max)))
    }

    /// Inclusive range for `float` and `double`
    pub fn range_double(self, name: &str, min: f64, max: f64) -> Self {
        self.with_field(name, |field| field.double_range = Some((min, max)))
    }

    /// Inclusive byte-length bounds for strings and byte arrays
    pub fn length(self, name: &str, min: usize, max: usize) -> Self {
        self.with_field(name, |field| field.length = Some((min, max)))
    }

    /// Regex the whole string must match
    pub fn pattern(self, name: &str, pattern: &str) -> Self {
        let compiled = Pattern::compile(pattern);
        self.with_field(name, |field| field.pattern = Some(compiled))
    }

    pub fn one_of<I, T>(self, name: &str, allowed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        self.with_field(name, |field| field.allowed = Some(allowed))
    }

    pub fn custom<F>(self, name: &str, validator: F) -> Self
    where
        F: Fn(&NamedValue) -> Option<String> + Send + Sync + 'static,
    {
        self.with_field(name, |field| field.custom.push(Arc::new(validator)))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.find(name).is_some_and(|field| field.required)
    }

    /// First violation in field-definition order
    pub fn validate<S: StoragePolicy>(&self, container: &Container<S>) -> Option<ValidationError> {
        let mut report = Report::new(true);
        self.check(&container.values(), &mut report);
        report.errors.into_iter().next()
    }

    /// Every violation in field-definition order
    pub fn validate_all<S: StoragePolicy>(&self, container: &Container<S>) -> Vec<ValidationError> {
        let mut report = Report::new(false);
        self.check(&container.values(), &mut report);
        if !report.errors.is_empty() {
            debug!(fields = self.fields.len(), errors = report.errors.len(), "schema validation failed");
        }
        report.errors
    }

    /// [`validate`](Self::validate) as a `Result` carrying the violation's 31x code
    pub fn validate_result<S: StoragePolicy>(&self, container: &Container<S>) -> Result<(), ContainerError> {
        match self.validate(container) {
            None => Ok(()),
            Some(err) => Err(err.into()),
        }
    }

    fn declare(mut self, name: String, kind: ValueKind, required: bool) -> Self {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.kind = kind;
                field.required = required;
            }
            None => self.fields.push(FieldDef::new(name, kind, required)),
        }
        self
    }

    fn with_field(mut self, name: &str, apply: impl FnOnce(&mut FieldDef)) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|field| field.name == name) {
            apply(field);
        }
        self
    }

    fn find(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn check(&self, entries: &[NamedValue], report: &mut Report) {
        for field in &self.fields {
            if report.done() {
                return;
            }
            match entries.iter().find(|entry| entry.name == field.name) {
                Some(entry) => check_field(field, entry, report),
                None if field.required => report.push(ValidationError::missing_required(&field.name)),
                None => {}
            }
        }
    }
}

fn check_field(field: &FieldDef, entry: &NamedValue, report: &mut Report) {
    let value = &entry.value;
    let kind = value.kind();
    if kind != field.kind {
        report.push(ValidationError::type_mismatch(&field.name, field.kind, kind));
        return;
    }

    if let Some(err) = check_range(field, value) {
        report.push(err);
    }
    if report.done() {
        return;
    }

    if let Some((min, max)) = field.length {
        let len = match value {
            Value::String(s) => Some(s.len()),
            Value::Bytes(b) => Some(b.len()),
            _ => None,
        };
        if let Some(len) = len.filter(|len| *len < min || *len > max) {
            report.push(ValidationError::invalid_length(&field.name, len, min, max));
            if report.done() {
                return;
            }
        }
    }

    if let (Some(pattern), Some(text)) = (&field.pattern, value.as_str()) {
        if !pattern.matches(text) {
            report.push(ValidationError::pattern_mismatch(&field.name, &pattern.source));
            if report.done() {
                return;
            }
        }
    }

    if let (Some(allowed), Some(text)) = (&field.allowed, value.as_str()) {
        if !allowed.iter().any(|candidate| candidate == text) {
            report.push(ValidationError::not_allowed(&field.name, text));
            if report.done() {
                return;
            }
        }
    }

    for validator in &field.custom {
        if let Some(reason) = validator(entry) {
            report.push(ValidationError::custom_failed(&field.name, &reason));
            if report.done() {
                return;
            }
        }
    }

    if let (Some(schema), Some(child)) = (&field.nested, value.as_container()) {
        let mut nested = Report::new(report.fail_fast);
        schema.check(&child.values(), &mut nested);
        if !nested.errors.is_empty() {
            report.push(ValidationError::nested_failed(&field.name, nested.errors.len()));
            for err in nested.errors {
                report.push(err.under(&field.name));
            }
        }
    }
}

fn check_range(field: &FieldDef, value: &Value) -> Option<ValidationError> {
    if let Some((min, max)) = field.int_range {
        let wide = value
            .as_i64()
            .map(i128::from)
            .or_else(|| value.as_u64().map(i128::from));
        if let Some(v) = wide {
            if v < min as i128 || v > max as i128 {
                return Some(ValidationError::out_of_range(&field.name, v, min as i128, max as i128));
            }
        }
    }

    if let Some((min, max)) = field.double_range {
        if let Some(v) = value.as_f64() {
            // NaN is outside every range
            if !(min..=max).contains(&v) {
                return Some(ValidationError::out_of_range(&field.name, v, min, max));
            }
        }
    }
    None
}
