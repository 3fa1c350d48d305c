//! Per-module documentation summary built from a tree-sitter parse
//!
//! A [`ModuleSummary`] is everything the extractor needs from one module
//! without holding on to the syntax tree: documented declarations, local
//! declarations that an export list may expose, import bindings and export
//! items that point into other modules.

use std::collections::HashSet;

use docserve_core::ExtractError;
use docserve_core::model::{
    Accessibility, CallSignatureDef, ClassConstructorDef, ClassDef, ClassMethodDef,
    ClassPropertyDef, DocNode, DocNodeDef, EnumDef, EnumMemberDef, FunctionDef, IndexSignatureDef,
    InterfaceDef, InterfaceMethodDef, InterfacePropertyDef, Location, MethodKind, NamespaceDef,
    ParamDef, TypeAliasDef, VariableDef, VariableKind,
};
use tree_sitter::Node;

use crate::jsdoc;
use crate::module_graph::resolve_specifier;
use crate::parser::{self, Dialect};

/// A module specifier as written, plus its absolute form when it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub raw: String,
    pub resolved: Option<String>,
}

impl ModuleRef {
    fn new(raw: &str, base: &str) -> Self {
        ModuleRef {
            raw: raw.to_string(),
            resolved: resolve_specifier(base, raw),
        }
    }

    /// What to show for this reference: the absolute URL if known.
    pub fn display(&self) -> &str {
        self.resolved.as_deref().unwrap_or(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportBinding {
    pub local: String,
    pub src: ModuleRef,
    /// Name in the source module; `None` for `* as ns` imports.
    pub imported: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportItem {
    /// `export { local as exported }`
    Local { local: String, exported: String },
    /// `export * from "src"`
    All { src: ModuleRef },
    /// `export * as name from "src"`
    Namespace {
        src: ModuleRef,
        name: String,
        location: Location,
        js_doc: Option<String>,
    },
    /// `export { imported as exported } from "src"`
    Named {
        src: ModuleRef,
        imported: String,
        exported: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ModuleSummary {
    pub specifier: String,
    pub final_url: String,
    pub syntax_error: Option<(u32, u32)>,
    pub module_doc: Option<DocNode>,
    /// Exported and ambient declarations.
    pub declarations: Vec<DocNode>,
    /// Top-level declarations that are not exported directly.
    pub locals: Vec<DocNode>,
    /// Every module named by an import statement, side-effect imports included.
    pub import_sources: Vec<ModuleRef>,
    pub imports: Vec<ImportBinding>,
    pub exports: Vec<ExportItem>,
}

impl ModuleSummary {
    pub fn analyze(specifier: &str, final_url: &str, content: &str) -> Result<Self, ExtractError> {
        let tree = parser::parse(content, Dialect::for_url(final_url))?;
        let mut summary = ModuleSummary {
            specifier: specifier.to_string(),
            final_url: final_url.to_string(),
            syntax_error: parser::first_error(&tree),
            ..Default::default()
        };
        let mut walker = Walker {
            source: content,
            filename: final_url,
            summary: &mut summary,
        };
        walker.program(tree.root_node());
        Ok(summary)
    }

    /// Absolute specifiers this module imports or re-exports from.
    pub fn dependencies(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let imports = self.import_sources.iter();
        let exports = self.exports.iter().filter_map(|e| match e {
            ExportItem::Local { .. } => None,
            ExportItem::All { src }
            | ExportItem::Namespace { src, .. }
            | ExportItem::Named { src, .. } => Some(src),
        });
        imports
            .chain(exports)
            .filter_map(|src| src.resolved.clone())
            .filter(|s| seen.insert(s.clone()))
            .collect()
    }

    /// Specifiers whose exports this module re-exports.
    pub fn reexport_sources(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |src: &ModuleRef| {
            if let Some(resolved) = &src.resolved {
                if !out.contains(resolved) {
                    out.push(resolved.clone());
                }
            }
        };
        for export in &self.exports {
            match export {
                ExportItem::All { src }
                | ExportItem::Namespace { src, .. }
                | ExportItem::Named { src, .. } => push(src),
                ExportItem::Local { local, .. } => {
                    if let Some(binding) = self.imports.iter().find(|i| &i.local == local) {
                        push(&binding.src);
                    }
                }
            }
        }
        out
    }

    pub fn locals_named(&self, name: &str) -> Vec<DocNode> {
        self.locals
            .iter()
            .filter(|n| n.name == name)
            .cloned()
            .collect()
    }

    pub fn import_binding(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.iter().find(|i| i.local == local)
    }
}

struct Walker<'a> {
    source: &'a str,
    filename: &'a str,
    summary: &'a mut ModuleSummary,
}

impl<'a> Walker<'a> {
    fn program(&mut self, root: Node) {
        let overloaded = self.overloaded_functions(root);
        let mut cursor = root.walk();
        let statements: Vec<Node> = root.named_children(&mut cursor).collect();

        for statement in statements {
            match statement.kind() {
                "comment" => {
                    if self.summary.module_doc.is_none() && self.summary.declarations.is_empty() {
                        self.summary.module_doc = self.module_doc(statement);
                    }
                }
                "import_statement" => self.import_statement(statement),
                "export_statement" => {
                    let nodes = self.export_statement(statement, &overloaded, true);
                    self.summary.declarations.extend(nodes);
                }
                "ambient_declaration" => {
                    let js_doc = jsdoc::preceding(statement, self.source);
                    let nodes = self.ambient(statement, js_doc);
                    self.summary.declarations.extend(nodes);
                }
                _ => {
                    let js_doc = jsdoc::preceding(statement, self.source);
                    let nodes = self.declaration(statement, statement, js_doc, &overloaded, false);
                    self.summary.locals.extend(nodes);
                }
            }
        }
    }

    /// Documented members of a namespace body.
    fn block(&mut self, block: Node, ambient: bool) -> Vec<DocNode> {
        let overloaded = self.overloaded_functions(block);
        let mut out = Vec::new();
        let mut cursor = block.walk();
        let statements: Vec<Node> = block.named_children(&mut cursor).collect();

        for statement in statements {
            match statement.kind() {
                "export_statement" => {
                    out.extend(self.export_statement(statement, &overloaded, false));
                }
                "ambient_declaration" => {
                    let js_doc = jsdoc::preceding(statement, self.source);
                    out.extend(self.ambient(statement, js_doc));
                }
                _ if ambient => {
                    let js_doc = jsdoc::preceding(statement, self.source);
                    out.extend(self.declaration(statement, statement, js_doc, &overloaded, true));
                }
                _ => {}
            }
        }
        out
    }

    /// Names of functions declared with overload signatures in `scope`.
    fn overloaded_functions(&self, scope: Node) -> HashSet<String> {
        let mut names = HashSet::new();
        let mut cursor = scope.walk();
        for statement in scope.named_children(&mut cursor) {
            let decl = match statement.kind() {
                "export_statement" => statement.child_by_field_name("declaration"),
                _ => Some(statement),
            };
            if let Some(decl) = decl.filter(|d| d.kind() == "function_signature") {
                if let Some(name) = decl.child_by_field_name("name") {
                    names.insert(self.text(name).to_string());
                }
            }
        }
        names
    }

    fn import_statement(&mut self, node: Node) {
        let Some(source) = node.child_by_field_name("source") else {
            return;
        };
        let src = ModuleRef::new(string_value(self.text(source)), self.filename);
        self.summary.import_sources.push(src.clone());
        let location = self.location(node);

        let mut cursor = node.walk();
        let Some(clause) = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "import_clause")
        else {
            return;
        };

        let mut clause_cursor = clause.walk();
        for part in clause.named_children(&mut clause_cursor) {
            match part.kind() {
                "identifier" => self.summary.imports.push(ImportBinding {
                    local: self.text(part).to_string(),
                    src: src.clone(),
                    imported: Some("default".to_string()),
                    location: location.clone(),
                }),
                "namespace_import" => {
                    let mut ns_cursor = part.walk();
                    let local = part
                        .named_children(&mut ns_cursor)
                        .find(|c| c.kind() == "identifier");
                    if let Some(local) = local {
                        self.summary.imports.push(ImportBinding {
                            local: self.text(local).to_string(),
                            src: src.clone(),
                            imported: None,
                            location: location.clone(),
                        });
                    }
                }
                "named_imports" => {
                    let mut spec_cursor = part.walk();
                    for spec in part.named_children(&mut spec_cursor) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let Some(name) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let imported = string_value(self.text(name)).to_string();
                        let local = spec
                            .child_by_field_name("alias")
                            .map(|a| self.text(a).to_string())
                            .unwrap_or_else(|| imported.clone());
                        self.summary.imports.push(ImportBinding {
                            local,
                            src: src.clone(),
                            imported: Some(imported),
                            location: location.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn export_statement(
        &mut self,
        node: Node,
        overloaded: &HashSet<String>,
        top_level: bool,
    ) -> Vec<DocNode> {
        let js_doc = jsdoc::preceding(node, self.source);
        let is_default = has_child(node, "default");

        if let Some(source) = node.child_by_field_name("source") {
            if top_level {
                let src = ModuleRef::new(string_value(self.text(source)), self.filename);
                self.reexport(node, src, js_doc);
            }
            return Vec::new();
        }

        if let Some(decl) = node.child_by_field_name("declaration") {
            let mut nodes = self.declaration(decl, node, js_doc, overloaded, true);
            if is_default {
                for n in &mut nodes {
                    n.name = "default".to_string();
                }
            }
            return nodes;
        }

        if let Some(value) = node.child_by_field_name("value") {
            if value.kind() == "identifier" && top_level {
                self.summary.exports.push(ExportItem::Local {
                    local: self.text(value).to_string(),
                    exported: "default".to_string(),
                });
                return Vec::new();
            }
            return vec![self.default_expression(value, node, js_doc)];
        }

        if top_level {
            let mut cursor = node.walk();
            let clause = node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "export_clause");
            if let Some(clause) = clause {
                for (local, exported) in self.export_specifiers(clause) {
                    self.summary.exports.push(ExportItem::Local { local, exported });
                }
            }
        }
        Vec::new()
    }

    fn reexport(&mut self, node: Node, src: ModuleRef, js_doc: Option<String>) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();

        if let Some(ns) = children.iter().find(|c| c.kind() == "namespace_export") {
            let mut ns_cursor = ns.walk();
            let name = ns
                .named_children(&mut ns_cursor)
                .last()
                .map(|n| string_value(self.text(n)).to_string());
            if let Some(name) = name {
                let location = self.location(node);
                self.summary.exports.push(ExportItem::Namespace {
                    src,
                    name,
                    location,
                    js_doc,
                });
            }
        } else if let Some(clause) = children.iter().find(|c| c.kind() == "export_clause") {
            for (imported, exported) in self.export_specifiers(*clause) {
                self.summary.exports.push(ExportItem::Named {
                    src: src.clone(),
                    imported,
                    exported,
                });
            }
        } else {
            self.summary.exports.push(ExportItem::All { src });
        }
    }

    /// `(name, alias)` pairs of an export clause, alias defaulting to name.
    fn export_specifiers(&self, clause: Node) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut cursor = clause.walk();
        for spec in clause.named_children(&mut cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let name = string_value(self.text(name)).to_string();
            let alias = spec
                .child_by_field_name("alias")
                .map(|a| string_value(self.text(a)).to_string())
                .unwrap_or_else(|| name.clone());
            out.push((name, alias));
        }
        out
    }

    fn default_expression(&self, value: Node, anchor: Node, js_doc: Option<String>) -> DocNode {
        let def = match value.kind() {
            "arrow_function" | "function_expression" | "function" | "generator_function" => {
                DocNodeDef::Function {
                    function_def: self.function_def(value),
                }
            }
            "class" => DocNodeDef::Class {
                class_def: self.class_def(value),
            },
            _ => DocNodeDef::Variable {
                variable_def: VariableDef {
                    ts_type: literal_type(value.kind()).map(str::to_string),
                    kind: VariableKind::Const,
                },
            },
        };
        DocNode::new("default", def)
            .with_js_doc(js_doc)
            .with_location(self.location(anchor))
    }

    fn ambient(&mut self, node: Node, js_doc: Option<String>) -> Vec<DocNode> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children {
            if child.kind() == "statement_block" {
                // declare global { ... }
                out.extend(self.block(child, true));
            } else {
                let overloaded = HashSet::new();
                out.extend(self.declaration(child, node, js_doc.clone(), &overloaded, true));
            }
        }
        out
    }

    /// Doc nodes for one declaration. `anchor` is the statement used for the
    /// location, usually the enclosing export statement.
    fn declaration(
        &mut self,
        decl: Node,
        anchor: Node,
        js_doc: Option<String>,
        overloaded: &HashSet<String>,
        ambient: bool,
    ) -> Vec<DocNode> {
        let location = self.location(anchor);
        let named = |name: &str, def: DocNodeDef| {
            vec![DocNode::new(name, def)
                .with_js_doc(js_doc.clone())
                .with_location(location.clone())]
        };
        let name = decl
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        match decl.kind() {
            "function_declaration" | "generator_function_declaration" => {
                if overloaded.contains(&name) {
                    return Vec::new();
                }
                named(&name, DocNodeDef::Function {
                    function_def: self.function_def(decl),
                })
            }
            "function_signature" => named(&name, DocNodeDef::Function {
                function_def: self.function_def(decl),
            }),
            "class_declaration" | "abstract_class_declaration" => named(&name, DocNodeDef::Class {
                class_def: self.class_def(decl),
            }),
            "interface_declaration" => named(&name, DocNodeDef::Interface {
                interface_def: self.interface_def(decl),
            }),
            "enum_declaration" => named(&name, DocNodeDef::Enum {
                enum_def: self.enum_def(decl),
            }),
            "type_alias_declaration" => {
                let ts_type = decl
                    .child_by_field_name("value")
                    .map(|v| self.text(v).to_string())
                    .unwrap_or_default();
                named(&name, DocNodeDef::TypeAlias {
                    type_alias_def: TypeAliasDef {
                        ts_type,
                        type_params: self.type_params(decl),
                    },
                })
            }
            "lexical_declaration" | "variable_declaration" => {
                self.variables(decl, js_doc, location)
            }
            "internal_module" | "module" => {
                let Some(name_node) = decl.child_by_field_name("name") else {
                    return Vec::new();
                };
                if name_node.kind() == "string" {
                    // declare module "specifier" describes another module.
                    return Vec::new();
                }
                let elements = decl
                    .child_by_field_name("body")
                    .map(|body| self.block(body, ambient))
                    .unwrap_or_default();
                vec![nested_namespace(self.text(name_node), elements)
                    .with_js_doc(js_doc)
                    .with_location(location)]
            }
            "expression_statement" => {
                let mut cursor = decl.walk();
                let inner = decl
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "internal_module");
                match inner {
                    Some(inner) => self.declaration(inner, anchor, js_doc, overloaded, ambient),
                    None => Vec::new(),
                }
            }
            "ambient_declaration" => self.ambient(decl, js_doc),
            _ => Vec::new(),
        }
    }

    fn variables(&self, decl: Node, js_doc: Option<String>, location: Location) -> Vec<DocNode> {
        let kind = if decl.kind() == "variable_declaration" {
            VariableKind::Var
        } else {
            match decl.child_by_field_name("kind").map(|k| self.text(k)) {
                Some("let") => VariableKind::Let,
                _ => VariableKind::Const,
            }
        };

        let mut out = Vec::new();
        let mut cursor = decl.walk();
        for declarator in decl.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = declarator
                .child_by_field_name("name")
                .filter(|n| n.kind() == "identifier")
            else {
                continue;
            };
            let ts_type = declarator
                .child_by_field_name("type")
                .map(|t| self.type_text(t))
                .or_else(|| {
                    let value = declarator.child_by_field_name("value")?;
                    literal_type(value.kind()).map(str::to_string)
                });
            out.push(
                DocNode::new(self.text(name), DocNodeDef::Variable {
                    variable_def: VariableDef { ts_type, kind },
                })
                .with_js_doc(js_doc.clone())
                .with_location(location.clone()),
            );
        }
        out
    }

    fn function_def(&self, node: Node) -> FunctionDef {
        let params = match node.child_by_field_name("parameters") {
            Some(params) => self.params(params),
            None => node
                .child_by_field_name("parameter")
                .map(|p| {
                    vec![ParamDef {
                        name: self.text(p).to_string(),
                        ..Default::default()
                    }]
                })
                .unwrap_or_default(),
        };
        FunctionDef {
            params,
            return_type: node
                .child_by_field_name("return_type")
                .map(|t| self.type_text(t)),
            is_async: has_child(node, "async"),
            is_generator: node.kind().starts_with("generator") || has_child(node, "*"),
            type_params: self.type_params(node),
        }
    }

    fn params(&self, params: Node) -> Vec<ParamDef> {
        let mut out = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            let optional = match param.kind() {
                "required_parameter" => false,
                "optional_parameter" => true,
                _ => continue,
            };
            let name = param
                .child_by_field_name("pattern")
                .map(|p| self.text(p).to_string())
                .unwrap_or_default();
            out.push(ParamDef {
                name,
                ts_type: param.child_by_field_name("type").map(|t| self.type_text(t)),
                optional: optional || param.child_by_field_name("value").is_some(),
            });
        }
        out
    }

    fn type_params(&self, node: Node) -> Vec<String> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .filter(|p| p.kind() == "type_parameter")
            .map(|p| self.text(p).to_string())
            .collect()
    }

    fn class_def(&self, node: Node) -> ClassDef {
        let mut def = ClassDef {
            is_abstract: node.kind() == "abstract_class_declaration",
            type_params: self.type_params(node),
            ..Default::default()
        };

        let mut cursor = node.walk();
        let heritage = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "class_heritage");
        if let Some(heritage) = heritage {
            let mut h_cursor = heritage.walk();
            for clause in heritage.named_children(&mut h_cursor) {
                match clause.kind() {
                    "extends_clause" => {
                        let text = self.text(clause);
                        def.extends = Some(text.trim_start_matches("extends").trim().to_string());
                    }
                    "implements_clause" => {
                        let mut i_cursor = clause.walk();
                        def.implements = clause
                            .named_children(&mut i_cursor)
                            .map(|t| self.text(t).to_string())
                            .collect();
                    }
                    _ => {}
                }
            }
        }

        let Some(body) = node.child_by_field_name("body") else {
            return def;
        };
        let mut body_cursor = body.walk();
        let members: Vec<Node> = body.named_children(&mut body_cursor).collect();
        let signatures: HashSet<&str> = members
            .iter()
            .filter(|m| m.kind() == "method_signature")
            .filter_map(|m| m.child_by_field_name("name"))
            .map(|n| self.text(n))
            .collect();

        for member in members {
            let js_doc = jsdoc::preceding(member, self.source);
            let accessibility = self.accessibility(member);
            let member_name = member
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            match member.kind() {
                "method_definition" | "method_signature" | "abstract_method_signature" => {
                    if member.kind() == "method_definition"
                        && signatures.contains(member_name.as_str())
                    {
                        continue;
                    }
                    let function_def = self.function_def(member);
                    if member_name == "constructor" {
                        def.constructors.push(ClassConstructorDef {
                            js_doc,
                            accessibility,
                            params: function_def.params,
                        });
                        continue;
                    }
                    let kind = if has_child(member, "get") {
                        MethodKind::Getter
                    } else if has_child(member, "set") {
                        MethodKind::Setter
                    } else {
                        MethodKind::Method
                    };
                    def.methods.push(ClassMethodDef {
                        name: member_name,
                        js_doc,
                        accessibility,
                        kind,
                        optional: has_child(member, "?"),
                        is_static: has_child(member, "static"),
                        is_abstract: member.kind() == "abstract_method_signature",
                        function_def,
                    });
                }
                "public_field_definition" => def.properties.push(ClassPropertyDef {
                    name: member_name,
                    js_doc,
                    ts_type: member.child_by_field_name("type").map(|t| self.type_text(t)),
                    accessibility,
                    optional: has_child(member, "?"),
                    readonly: has_child(member, "readonly"),
                    is_static: has_child(member, "static"),
                }),
                "index_signature" => def.index_signatures.push(self.index_signature(member)),
                _ => {}
            }
        }
        def
    }

    fn accessibility(&self, member: Node) -> Option<Accessibility> {
        let mut cursor = member.walk();
        let modifier = member
            .named_children(&mut cursor)
            .find(|c| c.kind() == "accessibility_modifier")?;
        match self.text(modifier) {
            "private" => Some(Accessibility::Private),
            "protected" => Some(Accessibility::Protected),
            _ => Some(Accessibility::Public),
        }
    }

    fn index_signature(&self, node: Node) -> IndexSignatureDef {
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "identifier");
        let key = match (name, node.child_by_field_name("index_type")) {
            (Some(name), Some(index_type)) => {
                format!("{}: {}", self.text(name), self.text(index_type))
            }
            _ => String::new(),
        };
        IndexSignatureDef {
            readonly: has_child(node, "readonly"),
            key,
            ts_type: node.child_by_field_name("type").map(|t| self.type_text(t)),
        }
    }

    fn interface_def(&self, node: Node) -> InterfaceDef {
        let mut def = InterfaceDef {
            type_params: self.type_params(node),
            ..Default::default()
        };

        let mut cursor = node.walk();
        let extends = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "extends_type_clause");
        if let Some(extends) = extends {
            let mut e_cursor = extends.walk();
            def.extends = extends
                .named_children(&mut e_cursor)
                .map(|t| self.text(t).to_string())
                .collect();
        }

        let Some(body) = node.child_by_field_name("body") else {
            return def;
        };
        let mut body_cursor = body.walk();
        for member in body.named_children(&mut body_cursor) {
            let js_doc = jsdoc::preceding(member, self.source);
            let name = member
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            match member.kind() {
                "property_signature" => def.properties.push(InterfacePropertyDef {
                    name,
                    js_doc,
                    ts_type: member.child_by_field_name("type").map(|t| self.type_text(t)),
                    optional: has_child(member, "?"),
                    readonly: has_child(member, "readonly"),
                }),
                "method_signature" => {
                    let function_def = self.function_def(member);
                    def.methods.push(InterfaceMethodDef {
                        name,
                        js_doc,
                        optional: has_child(member, "?"),
                        params: function_def.params,
                        return_type: function_def.return_type,
                        type_params: function_def.type_params,
                    });
                }
                "call_signature" => {
                    let function_def = self.function_def(member);
                    def.call_signatures.push(CallSignatureDef {
                        js_doc,
                        params: function_def.params,
                        ts_type: function_def.return_type,
                        type_params: function_def.type_params,
                    });
                }
                "index_signature" => def.index_signatures.push(self.index_signature(member)),
                _ => {}
            }
        }
        def
    }

    fn enum_def(&self, node: Node) -> EnumDef {
        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                let js_doc = jsdoc::preceding(member, self.source);
                let (name, init) = match member.kind() {
                    "enum_assignment" => (
                        member.child_by_field_name("name"),
                        member
                            .child_by_field_name("value")
                            .map(|v| self.text(v).to_string()),
                    ),
                    "property_identifier" | "string" => (Some(member), None),
                    _ => continue,
                };
                let Some(name) = name else {
                    continue;
                };
                members.push(EnumMemberDef {
                    name: string_value(self.text(name)).to_string(),
                    init,
                    js_doc,
                });
            }
        }
        EnumDef { members }
    }

    fn module_doc(&self, comment: Node) -> Option<DocNode> {
        let text = jsdoc::clean(self.text(comment))?;
        if !text.lines().any(|l| l.trim_start().starts_with("@module")) {
            return None;
        }
        let body: Vec<&str> = text
            .lines()
            .filter(|l| !l.trim_start().starts_with("@module"))
            .collect();
        let body = body.join("\n").trim().to_string();
        Some(
            DocNode::new("", DocNodeDef::ModuleDoc)
                .with_js_doc((!body.is_empty()).then_some(body))
                .with_location(self.location(comment)),
        )
    }

    /// Text of a type annotation without its leading colon.
    fn type_text(&self, annotation: Node) -> String {
        self.text(annotation)
            .trim_start_matches(':')
            .trim()
            .to_string()
    }

    fn location(&self, node: Node) -> Location {
        let point = node.start_position();
        Location {
            filename: self.filename.to_string(),
            line: point.row as u32 + 1,
            col: point.column as u32,
        }
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

fn has_child(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == kind);
    found
}

fn string_value(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

fn literal_type(kind: &str) -> Option<&'static str> {
    match kind {
        "number" => Some("number"),
        "string" | "template_string" => Some("string"),
        "true" | "false" => Some("boolean"),
        _ => None,
    }
}

/// `A.B.C` declares `C` inside `B` inside `A`.
fn nested_namespace(name: &str, elements: Vec<DocNode>) -> DocNode {
    let mut segments = name.rsplit('.');
    let innermost = segments.next().unwrap_or(name);
    let mut node = namespace_node(innermost, elements);
    for segment in segments {
        node = namespace_node(segment, vec![node]);
    }
    node
}

fn namespace_node(name: &str, elements: Vec<DocNode>) -> DocNode {
    DocNode::new(name.trim(), DocNodeDef::Namespace {
        namespace_def: NamespaceDef { elements },
    })
}
