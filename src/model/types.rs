//! Record type descriptors: the structural metadata the analyzer consumes.
//! Descriptors are plain data and serde-loadable, so a model set can live in
//! code or in a JSON config document.

use serde::{Deserialize, Serialize};

/// Integer widths, including the machine-width `Int`/`Uint`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    Int,
    U8,
    U16,
    U32,
    U64,
    Uint,
}

impl IntKind {
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            IntKind::U8 | IntKind::U16 | IntKind::U32 | IntKind::U64 | IntKind::Uint
        )
    }

    pub fn is_wide(self) -> bool {
        matches!(self, IntKind::I64 | IntKind::U64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatKind {
    F32,
    F64,
}

/// Structural kind of a field or of a registerable type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Int(IntKind),
    Float(FloatKind),
    Str,
    Time,
    Record(RecordSchema),
    Sequence(Box<FieldKind>),
    Mapping(Box<FieldKind>),
    Pointer(Box<FieldKind>),
}

impl FieldKind {
    pub fn record(schema: RecordSchema) -> Self {
        FieldKind::Record(schema)
    }

    pub fn sequence(element: FieldKind) -> Self {
        FieldKind::Sequence(Box::new(element))
    }

    pub fn mapping(value: FieldKind) -> Self {
        FieldKind::Mapping(Box::new(value))
    }

    pub fn pointer(target: FieldKind) -> Self {
        FieldKind::Pointer(Box::new(target))
    }

    /// Kind name for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int(_) => "int",
            FieldKind::Float(_) => "float",
            FieldKind::Str => "string",
            FieldKind::Time => "time",
            FieldKind::Record(_) => "record",
            FieldKind::Sequence(_) => "sequence",
            FieldKind::Mapping(_) => "mapping",
            FieldKind::Pointer(_) => "pointer",
        }
    }
}

/// Declared shape of a record type: type name plus fields in declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        RecordSchema {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Name-only stub for nested positions in cyclic model graphs. The
    /// registry resolves the stub by name at request and schema time, so the
    /// embedded field list is only consulted for unregistered nested types.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name)
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// One declared field: identifier, structural kind, raw serialization tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    /// Raw serialization tag. `None` and `"-"` exclude the field from the
    /// API entirely; otherwise the first comma-segment is the external name
    /// and `omitempty` marks the field optional on output.
    #[serde(default)]
    pub json: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldDef {
            name: name.into(),
            kind,
            json: None,
        }
    }

    pub fn json(mut self, tag: impl Into<String>) -> Self {
        self.json = Some(tag.into());
        self
    }
}
