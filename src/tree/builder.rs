//! TreeBuilder - sequential assembly of per-file declarations
//!
//! Extraction may run on any number of workers; this is the single
//! reduction step. Input order does not matter: modules are sorted by
//! relative path before identities are assigned.
//!
//! A module path is a pure function of the file's relative path. The one
//! dotted-path clash left after escaping is `a/b.py` next to a package
//! directory `a/b/`; the file module then takes the `~file` marker so
//! `a.b.C` can only ever mean the module `a/b/C.py`.

use super::identity::{child_path, stable_id, OccurrenceCounter, SHADOWED_MODULE_MARKER};
use super::{ComponentNode, ComponentTree};
use crate::error::{Result, SurfaceError};
use crate::extractors::base::{
    ComponentKind, Declaration, DeclarationMetadata, ModuleDeclarations, Span, Visibility,
};
use crate::utils::paths::{ancestor_directories, module_path, strip_extension};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct TreeBuilder {
    source_paths: Vec<String>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every scanned relative path, including files that failed to extract
    ///
    /// Package directories are derived from these plus the built files, so a
    /// file that fails to parse does not change which modules are shadowed.
    pub fn with_source_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Assemble one tree from every file's declarations
    ///
    /// Modules without any surviving declarations are dropped. Fails with
    /// `IdentityCollision` only if two nodes end up with the same id.
    pub fn build(&self, mut files: Vec<ModuleDeclarations>) -> Result<ComponentTree> {
        files.sort_by(|a, b| a.file_path.cmp(&b.file_path));

        let packages: BTreeSet<String> = self
            .source_paths
            .iter()
            .map(String::as_str)
            .chain(files.iter().map(|file| file.file_path.as_str()))
            .flat_map(ancestor_directories)
            .collect();

        let mut ids = BTreeSet::new();
        let mut modules = Vec::new();

        for file in files {
            if file.declarations.is_empty() {
                debug!("Dropping {}: no public surface", file.file_path);
                continue;
            }

            let dotted = module_path(&file.file_path);
            let path = if packages.contains(&strip_extension(&file.file_path)) {
                format!("{}{}", dotted, SHADOWED_MODULE_MARKER)
            } else {
                dotted.clone()
            };
            let id = register(&mut ids, stable_id(&path, ComponentKind::Module))?;

            let children = self.build_children(file.declarations, &path, &mut ids)?;
            modules.push(ComponentNode {
                kind: ComponentKind::Module,
                visibility: module_visibility(&dotted),
                name: dotted,
                signature: String::new(),
                doc_text: file.doc_text,
                span: Span {
                    file_path: file.file_path,
                    start_line: 1,
                    end_line: file.end_line.max(1),
                },
                metadata: DeclarationMetadata::default(),
                children,
                stable_id: id,
            });
        }

        debug!("Built tree: {} modules, {} ids", modules.len(), ids.len());
        Ok(ComponentTree::from_parts(modules, ids))
    }

    fn build_children(
        &self,
        declarations: Vec<Declaration>,
        parent_path: &str,
        ids: &mut BTreeSet<String>,
    ) -> Result<Vec<ComponentNode>> {
        let mut counter = OccurrenceCounter::new();
        let mut nodes = Vec::with_capacity(declarations.len());

        for declaration in declarations {
            let segment = counter.next_segment(declaration.kind, &declaration.name);
            let path = child_path(parent_path, &segment);
            let id = register(ids, stable_id(&path, declaration.kind))?;
            let children = self.build_children(declaration.children, &path, ids)?;

            nodes.push(ComponentNode {
                kind: declaration.kind,
                name: declaration.name,
                visibility: declaration.visibility,
                signature: declaration.signature,
                doc_text: declaration.doc_text,
                span: declaration.span,
                metadata: declaration.metadata,
                children,
                stable_id: id,
            });
        }

        Ok(nodes)
    }
}

fn register(ids: &mut BTreeSet<String>, id: String) -> Result<String> {
    if !ids.insert(id.clone()) {
        return Err(SurfaceError::IdentityCollision(id));
    }
    Ok(id)
}

// `pkg._internal` is private; `pkg.__init__` is not
fn module_visibility(dotted: &str) -> Visibility {
    let last = dotted.rsplit('.').next().unwrap_or(dotted);
    let is_dunder = last.len() > 4 && last.starts_with("__") && last.ends_with("__");
    if last.starts_with('_') && !is_dunder {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(kind: ComponentKind, name: &str, line: u32, children: Vec<Declaration>) -> Declaration {
        Declaration {
            kind,
            name: name.to_string(),
            visibility: Visibility::Public,
            signature: String::new(),
            doc_text: String::new(),
            span: Span {
                file_path: "pkg/mod.py".to_string(),
                start_line: line,
                end_line: line,
            },
            metadata: DeclarationMetadata::default(),
            children,
        }
    }

    fn module(path: &str, declarations: Vec<Declaration>) -> ModuleDeclarations {
        ModuleDeclarations {
            file_path: path.to_string(),
            doc_text: String::new(),
            end_line: 10,
            declarations,
        }
    }

    #[test]
    fn test_duplicate_siblings_get_distinct_ids() {
        let files = vec![module(
            "pkg/mod.py",
            vec![
                decl(ComponentKind::Function, "handler", 1, vec![]),
                decl(ComponentKind::Function, "handler", 5, vec![]),
            ],
        )];

        let tree = TreeBuilder::new().build(files).unwrap();
        let module = &tree.modules()[0];
        assert_eq!(module.children[0].stable_id, "pkg.mod.handler#function");
        assert_eq!(module.children[1].stable_id, "pkg.mod.handler~1#function");
        assert_ne!(module.children[0].stable_id, module.children[1].stable_id);
    }

    #[test]
    fn test_duplicate_class_children_stay_unique() {
        let files = vec![module(
            "pkg/mod.py",
            vec![
                decl(
                    ComponentKind::Class,
                    "Foo",
                    1,
                    vec![decl(ComponentKind::Method, "run", 2, vec![])],
                ),
                decl(
                    ComponentKind::Class,
                    "Foo",
                    6,
                    vec![decl(ComponentKind::Method, "run", 7, vec![])],
                ),
            ],
        )];

        let tree = TreeBuilder::new().build(files).unwrap();
        assert!(tree.contains("pkg.mod.Foo.run#method"));
        assert!(tree.contains("pkg.mod.Foo~1.run#method"));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_property_and_method_share_name() {
        let files = vec![module(
            "pkg/mod.py",
            vec![decl(
                ComponentKind::Class,
                "Foo",
                1,
                vec![
                    decl(ComponentKind::Property, "value", 2, vec![]),
                    decl(ComponentKind::Method, "value", 5, vec![]),
                ],
            )],
        )];

        let tree = TreeBuilder::new().build(files).unwrap();
        assert!(tree.contains("pkg.mod.Foo.value#property"));
        assert!(tree.contains("pkg.mod.Foo.value#method"));
    }

    #[test]
    fn test_ids_ignore_lines_and_input_order() {
        let build = |offset: u32, reversed: bool| {
            let mut files = vec![
                module("a.py", vec![decl(ComponentKind::Function, "f", 1 + offset, vec![])]),
                module("b/c.py", vec![decl(ComponentKind::Class, "C", 3 + offset, vec![])]),
            ];
            if reversed {
                files.reverse();
            }
            TreeBuilder::new().build(files).unwrap()
        };

        let first = build(0, false);
        let second = build(40, true);
        assert_eq!(first.ids(), second.ids());
        assert_eq!(first.modules()[0].span.file_path, "a.py");
        assert_eq!(second.modules()[0].span.file_path, "a.py");
    }

    #[test]
    fn test_empty_modules_dropped() {
        let files = vec![
            module("pkg/empty.py", vec![]),
            module("pkg/full.py", vec![decl(ComponentKind::Function, "f", 1, vec![])]),
        ];
        let tree = TreeBuilder::new().build(files).unwrap();
        assert_eq!(tree.modules().len(), 1);
        assert!(!tree.contains("pkg.empty#module"));
    }

    #[test]
    fn test_module_file_beside_package_directory() {
        let files = vec![
            module(
                "a/b.py",
                vec![decl(
                    ComponentKind::Class,
                    "C",
                    1,
                    vec![decl(ComponentKind::Property, "X", 2, vec![])],
                )],
            ),
            module("a/b/C.py", vec![decl(ComponentKind::Property, "X", 1, vec![])]),
        ];

        let tree = TreeBuilder::new().build(files).unwrap();
        assert!(tree.contains("a.b~file#module"));
        assert!(tree.contains("a.b~file.C.X#property"));
        assert!(tree.contains("a.b.C#module"));
        assert!(tree.contains("a.b.C.X#property"));
        assert_eq!(tree.modules()[0].name, "a.b");
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_dotted_directory_does_not_shift_existing_ids() {
        let nested = || module("pkg/v2/mod.py", vec![decl(ComponentKind::Function, "f", 1, vec![])]);

        let before = TreeBuilder::new().build(vec![nested()]).unwrap();
        let after = TreeBuilder::new()
            .build(vec![
                nested(),
                module("pkg.v2/mod.py", vec![decl(ComponentKind::Function, "f", 1, vec![])]),
            ])
            .unwrap();

        assert!(before.ids().is_subset(after.ids()));
        assert!(after.contains("pkg.v2.mod.f#function"));
        assert!(after.contains("pkg%2Ev2.mod.f#function"));
    }

    #[test]
    fn test_unparsed_package_member_still_shadows() {
        let files = vec![module("a/b.py", vec![decl(ComponentKind::Function, "f", 1, vec![])])];
        let tree = TreeBuilder::new()
            .with_source_paths(["a/b.py", "a/b/broken.py"])
            .build(files)
            .unwrap();
        assert!(tree.contains("a.b~file.f#function"));
    }

    #[test]
    fn test_repeated_file_path_is_collision() {
        let files = vec![
            module("pkg/mod.py", vec![decl(ComponentKind::Function, "f", 1, vec![])]),
            module("pkg/mod.py", vec![decl(ComponentKind::Function, "g", 1, vec![])]),
        ];

        let err = TreeBuilder::new().build(files).unwrap_err();
        assert!(matches!(err, SurfaceError::IdentityCollision(id) if id == "pkg.mod#module"));
    }

    #[test]
    fn test_module_visibility() {
        assert_eq!(module_visibility("pkg._internal"), Visibility::Private);
        assert_eq!(module_visibility("pkg.__init__"), Visibility::Public);
        assert_eq!(module_visibility("pkg.core"), Visibility::Public);
    }
}
