use std::fmt;

use crate::Format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Object,
    Array,
    Record,
    DateTime,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Record => "record",
            FieldType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction a property is excluded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    Serialize,
    Deserialize,
}

/// Shape of a single wire value: its type plus the structural and format
/// constraints checked while decoding it.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub ty: FieldType,
    pub format: Option<Format>,
    pub trim: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// `null` decodes to an absent value instead of failing.
    pub nullable: bool,
    /// Element shape for arrays and records.
    pub items: Option<Box<FieldDecl>>,
    /// Type name of the nested model an object value materializes into.
    pub target: Option<&'static str>,
}

impl FieldDecl {
    pub fn new(ty: FieldType) -> Self {
        Self {
            ty,
            format: None,
            trim: false,
            min: None,
            max: None,
            nullable: false,
            items: None,
            target: None,
        }
    }

    pub fn items(&self) -> Option<&FieldDecl> {
        self.items.as_deref()
    }
}

/// Per-property declaration: how the property is named on the wire and how
/// it takes part in each direction.
#[derive(Debug, Clone)]
pub struct PropertyDecl {
    /// Name the property is declared under.
    pub property: String,
    /// Explicit wire name, overriding any case convention.
    pub name: Option<String>,
    /// Per-property override of the class snake_case convention.
    pub snake_case: Option<bool>,
    pub required: bool,
    pub skip: Option<Skip>,
    /// Properties that must be applied before this one.
    pub dependencies: Vec<String>,
    pub decl: FieldDecl,
}

impl PropertyDecl {
    pub(crate) fn new(property: impl Into<String>, decl: FieldDecl) -> Self {
        Self {
            property: property.into(),
            name: None,
            snake_case: None,
            required: false,
            skip: None,
            dependencies: Vec::new(),
            decl,
        }
    }

    pub fn required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn snake_case(&mut self, enabled: bool) -> &mut Self {
        self.snake_case = Some(enabled);
        self
    }

    pub fn skip(&mut self, skip: Skip) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    pub fn depends_on<I, S>(&mut self, properties: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .extend(properties.into_iter().map(Into::into));
        self
    }

    pub fn format(&mut self, format: Format) -> &mut Self {
        self.decl.format = Some(format);
        self
    }

    pub fn trim(&mut self) -> &mut Self {
        self.decl.trim = true;
        self
    }

    pub fn min(&mut self, min: f64) -> &mut Self {
        self.decl.min = Some(min);
        self
    }

    pub fn max(&mut self, max: f64) -> &mut Self {
        self.decl.max = Some(max);
        self
    }

    pub fn skips(&self, direction: Skip) -> bool {
        self.skip == Some(direction)
    }
}
