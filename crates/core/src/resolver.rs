//! Type resolution for `Type` constraints.
//!
//! Enum and XML parameters name their concrete type by a qualified name.
//! The host decides what those names mean by supplying a [`TypeResolver`];
//! [`TypeRegistry`] is the in-memory implementation, loadable from config
//! through [`TypeDefinition`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::data_type::ParameterDataType;
use crate::value::{EnumDefinition, EnumMemberError};

/// Maps qualified type names to type descriptions.
pub trait TypeResolver: fmt::Debug + Send + Sync {
    fn resolve(&self, qualified_name: &str) -> Option<ResolvedType>;
}

/// Resolver that knows no types.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypes;

impl TypeResolver for NoTypes {
    fn resolve(&self, _qualified_name: &str) -> Option<ResolvedType> {
        None
    }
}

/// A resolved type description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Enum(Arc<EnumType>),
    Xml(Arc<XmlType>),
}

impl ResolvedType {
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(ty) => ty.name(),
            Self::Xml(ty) => ty.name(),
        }
    }
}

/// A named enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    definition: EnumDefinition,
}

impl EnumType {
    pub fn new(name: impl Into<String>, definition: EnumDefinition) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &EnumDefinition {
        &self.definition
    }
}

/// A named XML document type, identified by its root element name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlType {
    name: String,
    element: String,
}

impl XmlType {
    pub fn new(name: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element: element.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expected root element name.
    pub fn element(&self) -> &str {
        &self.element
    }
}

/// Serializable description of a type, as found in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDefinition {
    Enum {
        name: String,
        #[serde(default = "default_underlying")]
        underlying: ParameterDataType,
        #[serde(default)]
        flags: bool,
        members: IndexMap<String, i64>,
    },
    Xml {
        name: String,
        /// Root element name; defaults to the last `.` segment of `name`.
        #[serde(default)]
        element: Option<String>,
    },
}

const fn default_underlying() -> ParameterDataType {
    ParameterDataType::Int32
}

/// Error loading a [`TypeDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("type `{name}` is invalid: {source}")]
pub struct TypeDefinitionError {
    pub name: String,
    #[source]
    pub source: EnumMemberError,
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            Self::Enum { name, .. } | Self::Xml { name, .. } => name,
        }
    }

    /// Builds the resolved form.
    pub fn build(&self) -> Result<ResolvedType, TypeDefinitionError> {
        match self {
            Self::Enum {
                name,
                underlying,
                flags,
                members,
            } => {
                let wrap = |source| TypeDefinitionError {
                    name: name.clone(),
                    source,
                };
                let mut definition = EnumDefinition::new(*underlying, *flags).map_err(wrap)?;
                for (member, value) in members {
                    definition
                        .add_member(member.clone(), i128::from(*value))
                        .map_err(wrap)?;
                }
                Ok(ResolvedType::Enum(Arc::new(EnumType::new(
                    name.clone(),
                    definition,
                ))))
            }
            Self::Xml { name, element } => {
                let element = element.clone().unwrap_or_else(|| {
                    name.rsplit('.').next().unwrap_or(name.as_str()).to_owned()
                });
                Ok(ResolvedType::Xml(Arc::new(XmlType::new(name.clone(), element))))
            }
        }
    }
}

/// Thread-safe in-memory [`TypeResolver`].
///
/// Hosts may keep registering types while parsers hold an `Arc` to the
/// registry.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<String, ResolvedType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from serialized definitions.
    pub fn from_definitions<'a>(
        definitions: impl IntoIterator<Item = &'a TypeDefinition>,
    ) -> Result<Self, TypeDefinitionError> {
        let registry = Self::new();
        for definition in definitions {
            registry.define(definition)?;
        }
        Ok(registry)
    }

    pub fn define(&self, definition: &TypeDefinition) -> Result<(), TypeDefinitionError> {
        let resolved = definition.build()?;
        self.insert(resolved);
        Ok(())
    }

    pub fn register_enum(&self, ty: EnumType) {
        self.insert(ResolvedType::Enum(Arc::new(ty)));
    }

    pub fn register_xml(&self, ty: XmlType) {
        self.insert(ResolvedType::Xml(Arc::new(ty)));
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    fn insert(&self, resolved: ResolvedType) {
        let name = resolved.name().to_owned();
        paramguard_log::trace!(type_name = %name, "registered type");
        self.types.write().insert(name, resolved);
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, qualified_name: &str) -> Option<ResolvedType> {
        self.types.read().get(qualified_name).cloned()
    }
}
