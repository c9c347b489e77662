use bg_core::{BgError, ScopeDecl, ScopeId, ScopeTree};
use bg_parser::{extract_fields, parse_python_module, ModuleItem, PythonFunction};

/// Name and docstring of the package that holds a test module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub docstring: String,
}

/// `./tests/test_a.py` becomes `tests.test_a`.
pub fn module_dotted_path(path: &str) -> String {
    let mut path = path.replace('\\', "/");
    while let Some(rest) = path.strip_prefix("./") {
        path = rest.to_string();
    }
    let path = path.trim_start_matches('/');
    let path = path.strip_suffix(".py").unwrap_or(path);
    path.replace('/', ".")
}

/// Builds the scope tree of one test module: package, module, top-level
/// classes, then `test_*` functions at module level or directly inside a
/// top-level class.
pub fn module_tree(
    source_path: &str,
    source: &str,
    package: &PackageInfo,
) -> Result<ScopeTree, BgError> {
    let module = parse_python_module(source)?;
    let dotted_path = module_dotted_path(source_path);
    let module_name = dotted_path
        .rsplit('.')
        .next()
        .unwrap_or(&dotted_path)
        .to_string();

    let mut tree = ScopeTree::new(
        source_path,
        decl(&package.name, Some(package.docstring.as_str()), &package.name),
    );
    let module_id = tree.add_module(
        tree.root(),
        decl(&module_name, module.docstring.as_deref(), &dotted_path),
        dotted_path.clone(),
    )?;

    for item in &module.items {
        match item {
            ModuleItem::Class(class) => {
                let class_scope = format!("{}.{}", dotted_path, class.name);
                let class_id = tree.add_class(
                    module_id,
                    decl(&class.name, class.docstring.as_deref(), &class_scope),
                )?;
                for method in class.methods.iter().filter(|method| is_test_function(method)) {
                    add_function(&mut tree, class_id, method, &class_scope)?;
                }
            }
            ModuleItem::Function(function) if is_test_function(function) => {
                add_function(&mut tree, module_id, function, &dotted_path)?;
            }
            ModuleItem::Function(_) => {}
        }
    }
    Ok(tree)
}

fn is_test_function(function: &PythonFunction) -> bool {
    function.name.starts_with("test_")
}

fn add_function(
    tree: &mut ScopeTree,
    parent: ScopeId,
    function: &PythonFunction,
    parent_scope: &str,
) -> Result<(), BgError> {
    let scope = format!("{}.{}", parent_scope, function.name);
    tree.add_function(
        parent,
        decl(&function.name, function.docstring.as_deref(), &scope),
        function.line_number,
    )?;
    Ok(())
}

fn decl(name: &str, docstring: Option<&str>, scope: &str) -> ScopeDecl {
    let docstring = docstring.unwrap_or_default();
    let extraction = extract_fields(docstring, scope);
    ScopeDecl::new(name)
        .with_fields(docstring, extraction.fields)
        .with_warnings(extraction.warnings)
}
