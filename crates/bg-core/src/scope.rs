use serde::{Deserialize, Serialize};

use crate::{BgError, FieldSet, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Package,
    Module,
    Class,
    Function,
}

impl ScopeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
        }
    }
}

/// What a walker knows about one scope before it is attached to a tree.
#[derive(Debug, Clone, Default)]
pub struct ScopeDecl {
    pub name: String,
    pub docstring: String,
    pub fields: FieldSet,
    pub warnings: Vec<Warning>,
}

impl ScopeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, docstring: impl Into<String>, fields: FieldSet) -> Self {
        self.docstring = docstring.into();
        self.fields = fields;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings = warnings;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ScopeNode {
    kind: ScopeKind,
    name: String,
    qualified_name: String,
    docstring: String,
    fields: FieldSet,
    warnings: Vec<Warning>,
    line_number: Option<usize>,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
}

impl ScopeNode {
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn docstring(&self) -> &str {
        &self.docstring
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }
}

/// Package → module → class → function hierarchy for one source module.
///
/// Nodes live in an arena and point at their parent by index, so walking an
/// ancestor chain never needs shared ownership.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    source_path: String,
    nodes: Vec<ScopeNode>,
}

impl ScopeTree {
    pub fn new(source_path: impl Into<String>, package: ScopeDecl) -> Self {
        let qualified_name = package.name.clone();
        let root = ScopeNode {
            kind: ScopeKind::Package,
            name: package.name,
            qualified_name,
            docstring: package.docstring,
            fields: package.fields,
            warnings: package.warnings,
            line_number: None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            source_path: source_path.into(),
            nodes: vec![root],
        }
    }

    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Modules carry their own dotted path because it comes from the file
    /// location, not from the package name.
    pub fn add_module(
        &mut self,
        parent: ScopeId,
        decl: ScopeDecl,
        dotted_path: impl Into<String>,
    ) -> Result<ScopeId, BgError> {
        self.expect_parent(parent, ScopeKind::Module, &[ScopeKind::Package])?;
        Ok(self.push(parent, ScopeKind::Module, decl, dotted_path.into(), None))
    }

    pub fn add_class(&mut self, parent: ScopeId, decl: ScopeDecl) -> Result<ScopeId, BgError> {
        self.expect_parent(parent, ScopeKind::Class, &[ScopeKind::Module])?;
        let qualified_name = format!("{}.{}", self.nodes[parent.0].qualified_name, decl.name);
        Ok(self.push(parent, ScopeKind::Class, decl, qualified_name, None))
    }

    pub fn add_function(
        &mut self,
        parent: ScopeId,
        decl: ScopeDecl,
        line_number: usize,
    ) -> Result<ScopeId, BgError> {
        self.expect_parent(
            parent,
            ScopeKind::Function,
            &[ScopeKind::Module, ScopeKind::Class],
        )?;
        let qualified_name = format!("{}.{}", self.nodes[parent.0].qualified_name, decl.name);
        Ok(self.push(
            parent,
            ScopeKind::Function,
            decl,
            qualified_name,
            Some(line_number),
        ))
    }

    pub fn node(&self, id: ScopeId) -> Option<&ScopeNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ScopeNode> {
        self.nodes.iter()
    }

    /// Function scopes in the order they were attached.
    pub fn functions(&self) -> impl Iterator<Item = ScopeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind == ScopeKind::Function)
            .map(|(index, _)| ScopeId(index))
    }

    /// `id` first, then each parent up to the package root.
    pub fn ancestors(&self, id: ScopeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).map(|_| id),
        }
    }

    /// The nearest enclosing module of `id`, if any.
    pub fn module_of(&self, id: ScopeId) -> Option<&ScopeNode> {
        self.ancestors(id)
            .find(|node| node.kind == ScopeKind::Module)
    }

    fn expect_parent(
        &self,
        parent: ScopeId,
        child_kind: ScopeKind,
        allowed: &[ScopeKind],
    ) -> Result<(), BgError> {
        let Some(node) = self.node(parent) else {
            return Err(BgError::new(
                "SCOPE_PARENT_INVALID",
                format!("Unknown parent scope for {}.", child_kind.as_str()),
            ));
        };
        if !allowed.contains(&node.kind) {
            return Err(BgError::new(
                "SCOPE_PARENT_INVALID",
                format!(
                    "A {} cannot be nested in {} \"{}\".",
                    child_kind.as_str(),
                    node.kind.as_str(),
                    node.qualified_name
                ),
            ));
        }
        Ok(())
    }

    fn push(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        decl: ScopeDecl,
        qualified_name: String,
        line_number: Option<usize>,
    ) -> ScopeId {
        let id = ScopeId(self.nodes.len());
        self.nodes.push(ScopeNode {
            kind,
            name: decl.name,
            qualified_name,
            docstring: decl.docstring,
            fields: decl.fields,
            warnings: decl.warnings,
            line_number,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

pub struct Ancestors<'a> {
    tree: &'a ScopeTree,
    next: Option<ScopeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ScopeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.node(self.next?)?;
        self.next = node.parent;
        Some(node)
    }
}

#[cfg(test)]
mod scope_tests {
    use super::*;

    fn sample_tree() -> (ScopeTree, ScopeId, ScopeId) {
        let mut tree = ScopeTree::new("pkg/mod.py", ScopeDecl::new("pkg"));
        let module = tree
            .add_module(tree.root(), ScopeDecl::new("mod"), "pkg.mod")
            .expect("module attaches to package");
        let class = tree
            .add_class(module, ScopeDecl::new("Bar"))
            .expect("class attaches to module");
        let method = tree
            .add_function(class, ScopeDecl::new("test_foo"), 12)
            .expect("function attaches to class");
        let free = tree
            .add_function(module, ScopeDecl::new("test_free"), 30)
            .expect("function attaches to module");
        (tree, method, free)
    }

    #[test]
    fn ancestor_chain_lengths_follow_nesting() {
        let (tree, method, free) = sample_tree();

        let chain = tree
            .ancestors(method)
            .map(|node| node.kind())
            .collect::<Vec<_>>();
        assert_eq!(
            chain,
            vec![
                ScopeKind::Function,
                ScopeKind::Class,
                ScopeKind::Module,
                ScopeKind::Package
            ]
        );
        assert_eq!(tree.ancestors(free).count(), 3);
    }

    #[test]
    fn qualified_names_and_lines_are_recorded() {
        let (tree, method, _) = sample_tree();
        let node = tree.node(method).expect("method exists");
        assert_eq!(node.qualified_name(), "pkg.mod.Bar.test_foo");
        assert_eq!(node.line_number(), Some(12));
        assert_eq!(
            tree.module_of(method).map(ScopeNode::name),
            Some("mod")
        );
        assert_eq!(tree.functions().count(), 2);
        assert_eq!(tree.source_path(), "pkg/mod.py");
    }

    #[test]
    fn invalid_parents_are_rejected() {
        let (mut tree, method, _) = sample_tree();
        let error = tree
            .add_class(tree.root(), ScopeDecl::new("Orphan"))
            .expect_err("class under package should fail");
        assert_eq!(error.code, "SCOPE_PARENT_INVALID");

        let error = tree
            .add_function(method, ScopeDecl::new("test_inner"), 1)
            .expect_err("nested function should fail");
        assert_eq!(error.code, "SCOPE_PARENT_INVALID");
    }
}
