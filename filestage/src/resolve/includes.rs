//! Include resolution across configuration documents.
//!
//! An include directive (`__include__: [alias.label, other]`) splices the
//! resolved target subtrees of another document into the current node's
//! children. The referenced document is located by its source alias and
//! parsed with the same pipeline recursively.
//!
//! Termination on cyclic or diamond-shaped include graphs is guaranteed by
//! the visited set in [`ResolveContext`]: each `(document, label)` pair is
//! resolved at most once per run. That set — not recursion depth — is the
//! correctness guarantee, and it is part of this module's public contract.

use crate::config::{ConfigDocument, IncludeRef};
use crate::resolve::context::ResolveContext;
use crate::resolve::node::TargetNode;
use crate::resolve::parser::TreeParser;

/// Resolves include directives against the current document's source
/// aliases, returning the spliced subtrees.
///
/// Node-local failures — an unknown alias, a missing or unreadable
/// referenced document — are logged and skipped; they never abort the
/// surrounding resolution. Spliced roots keep their own source directory
/// and map into the including node's destination (`"."` basename);
/// nothing else is inherited from the including node.
pub fn resolve_includes(
    includes: &[IncludeRef],
    document: &ConfigDocument,
    ctx: &mut ResolveContext,
) -> Vec<TargetNode> {
    let mut nodes = Vec::new();

    for include in includes {
        let Some(root) = document.source_aliases.get(&include.alias) else {
            log::warn!(
                "{}: unknown source alias '{}' in include",
                document.path.display(),
                include.alias
            );
            continue;
        };

        let referenced_path = ConfigDocument::locate(root);
        let referenced = match ConfigDocument::load(&referenced_path) {
            Ok(referenced) => referenced,
            Err(e) => {
                log::warn!("skipping include '{include}': {e}");
                continue;
            }
        };

        // A bare alias pulls every label the referenced document declares
        let labels = match &include.label {
            Some(label) => vec![label.clone()],
            None => referenced.labels(),
        };

        for label in &labels {
            if ctx.is_visited(&referenced.path, label) {
                log::debug!("skipping include '{}.{label}': already resolved", include.alias);
                continue;
            }
            let parser = TreeParser::new(&referenced, &labels);
            nodes.extend(parser.parse_label(label, ctx));
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_BASENAME;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_doc(dir: &Path, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(CONFIG_BASENAME), contents).unwrap();
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }

    fn load(dir: &Path) -> ConfigDocument {
        ConfigDocument::load(&dir.join(CONFIG_BASENAME)).unwrap()
    }

    fn include_refs(refs: &[&str]) -> Vec<IncludeRef> {
        refs.iter().map(|r| r.parse().unwrap()).collect()
    }

    #[test]
    fn test_resolve_include_splices_subtree() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        let app = temp.path().join("app");
        touch(&lib.join("util.txt"));
        write_doc(&lib, "targets:\n  default:\n    \"*.txt\": true\n");
        write_doc(&app, "sources:\n  lib: ../lib\ntargets: {}\n");

        let document = load(&app);
        let mut ctx = ResolveContext::new(Vec::new());
        let nodes = resolve_includes(&include_refs(&["lib.default"]), &document, &mut ctx);

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].target_basename, ".");
        assert_eq!(nodes[0].files.len(), 1);
        assert!(nodes[0].source_dir.ends_with("lib"));
    }

    #[test]
    fn test_bare_alias_pulls_all_labels() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        let app = temp.path().join("app");
        touch(&lib.join("a.txt"));
        touch(&lib.join("b.md"));
        write_doc(
            &lib,
            "targets:\n  docs:\n    \"*.md\": true\n  text:\n    \"*.txt\": true\n",
        );
        write_doc(&app, "sources:\n  lib: ../lib\ntargets: {}\n");

        let document = load(&app);
        let mut ctx = ResolveContext::new(Vec::new());
        let nodes = resolve_includes(&include_refs(&["lib"]), &document, &mut ctx);

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.iter().map(TargetNode::file_count).sum::<usize>(), 2);
    }

    #[test]
    fn test_unknown_alias_is_skipped() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        write_doc(&app, "targets: {}\n");

        let document = load(&app);
        let mut ctx = ResolveContext::new(Vec::new());
        let nodes = resolve_includes(&include_refs(&["ghost.default"]), &document, &mut ctx);
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_missing_referenced_document_is_skipped() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        write_doc(&app, "sources:\n  lib: ../lib-without-config\ntargets: {}\n");

        let document = load(&app);
        let mut ctx = ResolveContext::new(Vec::new());
        let nodes = resolve_includes(&include_refs(&["lib.default"]), &document, &mut ctx);
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_visited_pair_contributes_nothing() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("lib");
        let app = temp.path().join("app");
        touch(&lib.join("util.txt"));
        write_doc(&lib, "targets:\n  default:\n    \"*.txt\": true\n");
        write_doc(&app, "sources:\n  lib: ../lib\ntargets: {}\n");

        let document = load(&app);
        let mut ctx = ResolveContext::new(Vec::new());
        let refs = include_refs(&["lib.default"]);

        let first = resolve_includes(&refs, &document, &mut ctx);
        assert_eq!(first.len(), 1);

        // Diamond / duplicate include: the pair is already visited
        let second = resolve_includes(&refs, &document, &mut ctx);
        assert!(second.is_empty());
    }

    #[test]
    fn test_mutual_includes_terminate() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        touch(&a.join("from-a.txt"));
        touch(&b.join("from-b.txt"));
        write_doc(
            &a,
            "sources:\n  b: ../b\ntargets:\n  default:\n    \"*.txt\": true\n    __include__: [b.default]\n",
        );
        write_doc(
            &b,
            "sources:\n  a: ../a\ntargets:\n  default:\n    \"*.txt\": true\n    __include__: [a.default]\n",
        );

        let document = load(&a);
        let parser = TreeParser::new(&document, &["default".to_string()]);
        let mut ctx = ResolveContext::new(Vec::new());

        // Terminates despite the cycle; each document contributes once
        let nodes = parser.parse_label("default", &mut ctx);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].file_count(), 2);
    }
}
