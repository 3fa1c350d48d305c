//! Documentation node data model
//!
//! The JSON shape follows the one produced by documentation extractors for
//! TypeScript modules: a `kind` tag next to the common fields, with the
//! kind-specific payload under `<kind>Def`.

use serde::{Deserialize, Serialize};

/// Where in a module a node was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub filename: String,
    pub line: u32,
    #[serde(default)]
    pub col: u32,
}

/// Discriminates what kind of program element a node documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocNodeKind {
    ModuleDoc,
    Import,
    Namespace,
    Class,
    Enum,
    Variable,
    Function,
    Interface,
    TypeAlias,
}

impl DocNodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocNodeKind::ModuleDoc => "moduleDoc",
            DocNodeKind::Import => "import",
            DocNodeKind::Namespace => "namespace",
            DocNodeKind::Class => "class",
            DocNodeKind::Enum => "enum",
            DocNodeKind::Variable => "variable",
            DocNodeKind::Function => "function",
            DocNodeKind::Interface => "interface",
            DocNodeKind::TypeAlias => "typeAlias",
        }
    }
}

impl std::fmt::Display for DocNodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One documented program element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js_doc: Option<String>,
    #[serde(flatten)]
    pub def: DocNodeDef,
}

/// Kind-specific payload. The serde tag doubles as the node's `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DocNodeDef {
    ModuleDoc,
    #[serde(rename_all = "camelCase")]
    Import { import_def: ImportDef },
    #[serde(rename_all = "camelCase")]
    Namespace { namespace_def: NamespaceDef },
    #[serde(rename_all = "camelCase")]
    Class { class_def: ClassDef },
    #[serde(rename_all = "camelCase")]
    Enum { enum_def: EnumDef },
    #[serde(rename_all = "camelCase")]
    Variable { variable_def: VariableDef },
    #[serde(rename_all = "camelCase")]
    Function { function_def: FunctionDef },
    #[serde(rename_all = "camelCase")]
    Interface { interface_def: InterfaceDef },
    #[serde(rename_all = "camelCase")]
    TypeAlias { type_alias_def: TypeAliasDef },
}

impl DocNodeDef {
    pub fn kind(&self) -> DocNodeKind {
        match self {
            DocNodeDef::ModuleDoc => DocNodeKind::ModuleDoc,
            DocNodeDef::Import { .. } => DocNodeKind::Import,
            DocNodeDef::Namespace { .. } => DocNodeKind::Namespace,
            DocNodeDef::Class { .. } => DocNodeKind::Class,
            DocNodeDef::Enum { .. } => DocNodeKind::Enum,
            DocNodeDef::Variable { .. } => DocNodeKind::Variable,
            DocNodeDef::Function { .. } => DocNodeKind::Function,
            DocNodeDef::Interface { .. } => DocNodeKind::Interface,
            DocNodeDef::TypeAlias { .. } => DocNodeKind::TypeAlias,
        }
    }
}

impl DocNode {
    pub fn new(name: impl Into<String>, def: DocNodeDef) -> Self {
        DocNode {
            name: name.into(),
            location: None,
            js_doc: None,
            def,
        }
    }

    pub fn with_js_doc(mut self, js_doc: Option<String>) -> Self {
        self.js_doc = js_doc;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn kind(&self) -> DocNodeKind {
        self.def.kind()
    }

    /// Nested elements when this node is a namespace.
    pub fn namespace_elements(&self) -> Option<&[DocNode]> {
        match &self.def {
            DocNodeDef::Namespace { namespace_def } => Some(&namespace_def.elements),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDef {
    /// Resolved specifier of the module the name is imported from.
    pub src: String,
    /// Name in the source module; `None` for namespace imports.
    #[serde(default)]
    pub imported: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDef {
    pub elements: Vec<DocNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDef {
    pub name: String,
    #[serde(default)]
    pub ts_type: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_generator: bool,
    #[serde(default)]
    pub type_params: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accessibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodKind {
    #[default]
    Method,
    Getter,
    Setter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassConstructorDef {
    #[serde(default)]
    pub js_doc: Option<String>,
    #[serde(default)]
    pub accessibility: Option<Accessibility>,
    #[serde(default)]
    pub params: Vec<ParamDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPropertyDef {
    pub name: String,
    #[serde(default)]
    pub js_doc: Option<String>,
    #[serde(default)]
    pub ts_type: Option<String>,
    #[serde(default)]
    pub accessibility: Option<Accessibility>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub is_static: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMethodDef {
    pub name: String,
    #[serde(default)]
    pub js_doc: Option<String>,
    #[serde(default)]
    pub accessibility: Option<Accessibility>,
    #[serde(default)]
    pub kind: MethodKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_abstract: bool,
    pub function_def: FunctionDef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDef {
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub constructors: Vec<ClassConstructorDef>,
    #[serde(default)]
    pub properties: Vec<ClassPropertyDef>,
    #[serde(default)]
    pub index_signatures: Vec<IndexSignatureDef>,
    #[serde(default)]
    pub methods: Vec<ClassMethodDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMemberDef {
    pub name: String,
    #[serde(default)]
    pub init: Option<String>,
    #[serde(default)]
    pub js_doc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    pub members: Vec<EnumMemberDef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableKind {
    #[default]
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDef {
    #[serde(default)]
    pub ts_type: Option<String>,
    #[serde(default)]
    pub kind: VariableKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSignatureDef {
    #[serde(default)]
    pub js_doc: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub ts_type: Option<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSignatureDef {
    #[serde(default)]
    pub readonly: bool,
    /// The bracketed key, e.g. `key: string`.
    pub key: String,
    #[serde(default)]
    pub ts_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceMethodDef {
    pub name: String,
    #[serde(default)]
    pub js_doc: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfacePropertyDef {
    pub name: String,
    #[serde(default)]
    pub js_doc: Option<String>,
    #[serde(default)]
    pub ts_type: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub readonly: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDef {
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub call_signatures: Vec<CallSignatureDef>,
    #[serde(default)]
    pub index_signatures: Vec<IndexSignatureDef>,
    #[serde(default)]
    pub methods: Vec<InterfaceMethodDef>,
    #[serde(default)]
    pub properties: Vec<InterfacePropertyDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDef {
    pub ts_type: String,
    #[serde(default)]
    pub type_params: Vec<String>,
}
