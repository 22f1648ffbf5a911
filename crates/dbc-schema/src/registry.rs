use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use convert_case::{Boundary, Case, Casing};
use indexmap::IndexMap;
use once_cell::sync::{Lazy, OnceCell};
use petgraph::{Direction, algo::is_cyclic_directed, graphmap::DiGraphMap};
use serde_json::Value;
use tracing::debug;

use crate::{Codec, DeserializeError, FieldDecl, FieldPath, PropertyDecl, SchemaError, Skip};

/// A type that takes part in wire (de)serialization.
///
/// `declare` lists the wire properties of the type; it runs once per type
/// per process and the compiled [`Schema`] is cached.
pub trait Model: Default + Send + Sync + 'static {
    fn declare(schema: &mut SchemaBuilder<Self>);
}

type CachedSchema = Result<Arc<dyn Any + Send + Sync>, SchemaError>;

// One slot per type; the slot's cell serializes compilation of that type.
static REGISTRY: Lazy<Mutex<HashMap<TypeId, Arc<OnceCell<CachedSchema>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns the compiled schema of `T`, compiling it on first use.
pub fn schema_of<T: Model>() -> Result<Arc<Schema<T>>, SchemaError> {
    let slot = {
        let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(registry.entry(TypeId::of::<T>()).or_default())
    };
    let cached = slot.get_or_init(|| {
        Schema::<T>::compile().map(|schema| Arc::new(schema) as Arc<dyn Any + Send + Sync>)
    });
    match cached {
        Ok(schema) => Ok(Arc::clone(schema)
            .downcast::<Schema<T>>()
            .unwrap_or_else(|_| {
                unreachable!("registry slot of {} holds another type", type_name::<T>())
            })),
        Err(err) => Err(err.clone()),
    }
}

pub(crate) trait Binding<T>: Send + Sync {
    fn apply(
        &self,
        target: &mut T,
        decl: &FieldDecl,
        raw: &Value,
        path: &FieldPath,
    ) -> Result<(), DeserializeError>;

    fn extract(&self, source: &T, decl: &FieldDecl) -> Result<Option<Value>, SchemaError>;
}

type Setter<T, V> = dyn Fn(&mut T, V) -> Result<(), String> + Send + Sync;

struct Bound<T, V> {
    codec: Codec<V>,
    get: fn(&T) -> &V,
    set: Box<Setter<T, V>>,
}

impl<T: 'static, V: 'static> Binding<T> for Bound<T, V> {
    fn apply(
        &self,
        target: &mut T,
        decl: &FieldDecl,
        raw: &Value,
        path: &FieldPath,
    ) -> Result<(), DeserializeError> {
        let value = self.codec.decode_with(decl, raw, path)?;
        (self.set)(target, value).map_err(|message| DeserializeError::Rejected {
            path: path.to_string(),
            message,
        })
    }

    fn extract(&self, source: &T, decl: &FieldDecl) -> Result<Option<Value>, SchemaError> {
        self.codec.encode_with(decl, (self.get)(source))
    }
}

// Property of a base model reached through the derived model's lens.
struct Inherited<T, B> {
    binding: Arc<dyn Binding<B>>,
    get: fn(&T) -> &B,
    get_mut: fn(&mut T) -> &mut B,
}

impl<T: 'static, B: 'static> Binding<T> for Inherited<T, B> {
    fn apply(
        &self,
        target: &mut T,
        decl: &FieldDecl,
        raw: &Value,
        path: &FieldPath,
    ) -> Result<(), DeserializeError> {
        self.binding.apply((self.get_mut)(target), decl, raw, path)
    }

    fn extract(&self, source: &T, decl: &FieldDecl) -> Result<Option<Value>, SchemaError> {
        self.binding.extract((self.get)(source), decl)
    }
}

pub struct SchemaBuilder<T> {
    snake_case: bool,
    entries: Vec<(PropertyDecl, Arc<dyn Binding<T>>)>,
    error: Option<SchemaError>,
}

impl<T: Model> SchemaBuilder<T> {
    fn new() -> Self {
        Self {
            snake_case: false,
            entries: Vec::new(),
            error: None,
        }
    }

    /// Use snake_case wire names for every property without an override.
    pub fn snake_case(&mut self) -> &mut Self {
        self.snake_case = true;
        self
    }

    /// Declares a property read through `get` and assigned through `get_mut`.
    pub fn field<V: 'static>(
        &mut self,
        property: &str,
        codec: Codec<V>,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut PropertyDecl {
        self.field_with(property, codec, get, move |target, value| {
            *get_mut(target) = value;
            Ok(())
        })
    }

    /// Declares a property assigned through a custom setter. The setter sees
    /// the instance under construction, with every declared dependency
    /// already applied, and may refuse the value.
    pub fn field_with<V, S>(
        &mut self,
        property: &str,
        codec: Codec<V>,
        get: fn(&T) -> &V,
        set: S,
    ) -> &mut PropertyDecl
    where
        V: 'static,
        S: Fn(&mut T, V) -> Result<(), String> + Send + Sync + 'static,
    {
        let decl = PropertyDecl::new(property, codec.decl().clone());
        let binding = Bound {
            codec,
            get,
            set: Box::new(set),
        };
        let index = self.entries.len();
        self.entries.push((decl, Arc::new(binding)));
        &mut self.entries[index].0
    }

    /// Adds every property of the base model `B`, stored in `T` at the field
    /// reached through `get`/`get_mut`. Wire names, requiredness, skips and
    /// dependencies are taken from `B`'s compiled schema, and wire names must
    /// stay unique across `B` and `T`.
    pub fn inherit<B: Model>(
        &mut self,
        get: fn(&T) -> &B,
        get_mut: fn(&mut T) -> &mut B,
    ) -> &mut Self {
        let base = match schema_of::<B>() {
            Ok(base) => base,
            Err(err) => {
                self.error.get_or_insert(err);
                return self;
            }
        };
        for property in base.properties() {
            let mut decl = property.decl.clone();
            decl.name = Some(property.wire_name.clone());
            let binding = Inherited {
                binding: Arc::clone(&property.binding),
                get,
                get_mut,
            };
            self.entries.push((decl, Arc::new(binding)));
        }
        self
    }

    fn finish(self) -> Result<Schema<T>, SchemaError> {
        let type_name = type_name::<T>();
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut properties: IndexMap<String, Property<T>> = IndexMap::new();
        for (decl, binding) in self.entries {
            let wire_name = wire_name(&decl, self.snake_case);
            if properties.contains_key(&wire_name) {
                return Err(SchemaError::DuplicateWireName {
                    type_name,
                    wire_name,
                });
            }
            properties.insert(
                wire_name.clone(),
                Property {
                    wire_name,
                    decl,
                    binding,
                },
            );
        }
        let apply_order = apply_order(type_name, &properties)?;
        debug!(type_name, properties = properties.len(), "compiled schema");
        Ok(Schema {
            type_name,
            properties,
            apply_order,
        })
    }
}

fn wire_name(decl: &PropertyDecl, class_snake_case: bool) -> String {
    if let Some(name) = &decl.name {
        return name.clone();
    }
    if decl.snake_case.unwrap_or(class_snake_case) {
        // Digits stay attached to the word before them: `address2`,
        // `utf8Name` -> `utf8_name`, `ipV4Address` -> `ip_v4_address`.
        decl.property
            .remove_boundaries(&[
                Boundary::LowerDigit,
                Boundary::UpperDigit,
                Boundary::DigitLower,
            ])
            .to_case(Case::Snake)
    } else {
        decl.property.clone()
    }
}

// Declaration order, except that a property never precedes its dependencies.
fn apply_order<T>(
    type_name: &'static str,
    properties: &IndexMap<String, Property<T>>,
) -> Result<Vec<usize>, SchemaError> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (index, property) in properties.values().enumerate() {
        by_name.entry(property.decl.property.as_str()).or_insert(index);
    }

    let mut graph = DiGraphMap::<usize, ()>::new();
    for index in 0..properties.len() {
        graph.add_node(index);
    }
    for (index, property) in properties.values().enumerate() {
        for dependency in &property.decl.dependencies {
            let Some(&required) = by_name.get(dependency.as_str()) else {
                return Err(SchemaError::UnknownDependency {
                    type_name,
                    property: property.decl.property.clone(),
                    dependency: dependency.clone(),
                });
            };
            graph.add_edge(required, index, ());
        }
    }
    if is_cyclic_directed(&graph) {
        return Err(SchemaError::DependencyCycle { type_name });
    }

    let mut placed = vec![false; properties.len()];
    let mut order = Vec::with_capacity(properties.len());
    while order.len() < properties.len() {
        let next = (0..properties.len()).find(|&index| {
            !placed[index]
                && graph
                    .neighbors_directed(index, Direction::Incoming)
                    .all(|required| placed[required])
        });
        let Some(index) = next else {
            return Err(SchemaError::DependencyCycle { type_name });
        };
        placed[index] = true;
        order.push(index);
    }
    Ok(order)
}

pub struct Property<T> {
    wire_name: String,
    decl: PropertyDecl,
    binding: Arc<dyn Binding<T>>,
}

impl<T> Property<T> {
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn decl(&self) -> &PropertyDecl {
        &self.decl
    }

    pub fn skips(&self, direction: Skip) -> bool {
        self.decl.skips(direction)
    }

    pub(crate) fn apply(
        &self,
        target: &mut T,
        raw: &Value,
        path: &FieldPath,
    ) -> Result<(), DeserializeError> {
        self.binding.apply(target, &self.decl.decl, raw, path)
    }

    pub(crate) fn extract(&self, source: &T) -> Result<Option<Value>, SchemaError> {
        self.binding.extract(source, &self.decl.decl)
    }
}

/// Compiled, immutable property table of a model type, keyed by wire name in
/// declaration order.
pub struct Schema<T> {
    type_name: &'static str,
    properties: IndexMap<String, Property<T>>,
    apply_order: Vec<usize>,
}

impl<T: Model> Schema<T> {
    fn compile() -> Result<Self, SchemaError> {
        let mut builder = SchemaBuilder::new();
        T::declare(&mut builder);
        builder.finish()
    }
}

impl<T> Schema<T> {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn get(&self, wire_name: &str) -> Option<&Property<T>> {
        self.properties.get(wire_name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property<T>> {
        self.properties.values()
    }

    /// Properties in the order they are applied while deserializing.
    pub fn apply_order(&self) -> impl Iterator<Item = &Property<T>> {
        self.apply_order
            .iter()
            .filter_map(|&index| self.properties.get_index(index).map(|(_, property)| property))
    }
}
