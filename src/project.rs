//! The project: shared context for settings, the node registry and source files.

use crate::config::{ManipulationSettings, ProjectConfig};
use crate::error::{MorphError, Result};
use crate::fs::{FileSystemHost, InMemoryFileSystem, RealFileSystem};
use crate::kinds::SourceFile;
use crate::manipulation::PipelinePhase;
use crate::node::{Located, Node};
use crate::printer::{DefaultPrinter, Printer};
use crate::registry::{FileId, NodeRegistry};
use crate::syntax::{
    NodeData, ParseError, ParseService, Reparse, SourceLanguage, SyntaxTree,
    TreeSitterParser,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub(crate) struct SourceFileState {
    pub path: PathBuf,
    pub text: Rc<str>,
    pub tree: Rc<SyntaxTree>,
    pub phase: PipelinePhase,
    pub saved: bool,
}

pub(crate) struct ProjectState {
    pub settings: ManipulationSettings,
    pub language: SourceLanguage,
    pub registry: NodeRegistry,
    pub files: HashMap<FileId, SourceFileState>,
    pub paths: HashMap<PathBuf, FileId>,
    pub fs: Box<dyn FileSystemHost>,
    pub printer: Box<dyn Printer>,
    next_file: u64,
}

impl ProjectState {
    pub fn file(&self, id: FileId) -> Result<&SourceFileState> {
        self.files
            .get(&id)
            .ok_or_else(|| MorphError::UnknownFile(PathBuf::new()))
    }

    pub fn file_mut(&mut self, id: FileId) -> Result<&mut SourceFileState> {
        self.files
            .get_mut(&id)
            .ok_or_else(|| MorphError::UnknownFile(PathBuf::new()))
    }
}

/// Handle to one editing session. Clones share the same project.
///
/// Projects are independent: wrappers, files and settings never leak between two
/// `Project` values created separately.
#[derive(Clone)]
pub struct Project {
    pub(crate) state: Rc<RefCell<ProjectState>>,
    parser: Rc<RefCell<Box<dyn ParseService>>>,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("Project")
                .field("language", &state.language)
                .field("files", &state.files.len())
                .field("wrappers", &state.registry.len())
                .finish(),
            Err(_) => f.write_str("Project { .. }"),
        }
    }
}

pub struct ProjectBuilder {
    settings: ManipulationSettings,
    language: SourceLanguage,
    parser: Option<Box<dyn ParseService>>,
    fs: Option<Box<dyn FileSystemHost>>,
    printer: Option<Box<dyn Printer>>,
}

impl ProjectBuilder {
    pub fn settings(mut self, settings: ManipulationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn language(mut self, language: SourceLanguage) -> Self {
        self.language = language;
        self
    }

    /// Replace the default tree-sitter parser.
    pub fn parser(mut self, parser: impl ParseService + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn file_system(mut self, fs: impl FileSystemHost + 'static) -> Self {
        self.fs = Some(Box::new(fs));
        self
    }

    pub fn printer(mut self, printer: impl Printer + 'static) -> Self {
        self.printer = Some(Box::new(printer));
        self
    }

    pub fn build(self) -> Result<Project> {
        let parser = match self.parser {
            Some(parser) => parser,
            None => Box::new(TreeSitterParser::new(self.language)?),
        };
        let state = ProjectState {
            settings: self.settings,
            language: self.language,
            registry: NodeRegistry::new(),
            files: HashMap::new(),
            paths: HashMap::new(),
            fs: self.fs.unwrap_or_else(|| Box::new(RealFileSystem)),
            printer: self.printer.unwrap_or_else(|| Box::new(DefaultPrinter)),
            next_file: 0,
        };
        Ok(Project {
            state: Rc::new(RefCell::new(state)),
            parser: Rc::new(RefCell::new(parser)),
        })
    }
}

impl Project {
    /// A TypeScript project on the real file system with default settings.
    pub fn new() -> Result<Project> {
        Project::builder().build()
    }

    /// A TypeScript project whose files live only in memory.
    pub fn in_memory() -> Result<Project> {
        Project::builder()
            .file_system(InMemoryFileSystem::new())
            .build()
    }

    pub fn builder() -> ProjectBuilder {
        ProjectBuilder {
            settings: ManipulationSettings::default(),
            language: SourceLanguage::default(),
            parser: None,
            fs: None,
            printer: None,
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Result<Project> {
        Project::builder()
            .language(config.language)
            .settings(config.manipulation.clone())
            .build()
    }

    pub fn settings(&self) -> ManipulationSettings {
        self.state.borrow().settings.clone()
    }

    pub fn set_settings(&self, settings: ManipulationSettings) {
        self.state.borrow_mut().settings = settings;
    }

    pub fn language(&self) -> SourceLanguage {
        self.state.borrow().language
    }

    /// Number of live wrappers across all files.
    pub fn wrapper_count(&self) -> usize {
        self.state.borrow().registry.len()
    }

    pub fn ptr_eq(&self, other: &Project) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Add a new in-memory file. Fails if the path is taken in the project or on disk.
    pub fn create_source_file(&self, path: impl AsRef<Path>, text: &str) -> Result<SourceFile> {
        let path = path.as_ref();
        {
            let state = self.state.borrow();
            if state.paths.contains_key(path) || state.fs.file_exists(path) {
                return Err(MorphError::FileExists(path.to_path_buf()));
            }
        }
        self.insert_file(path, text, false)
    }

    /// Read a file through the file-system host; returns the existing file if already added.
    pub fn add_source_file_at_path(&self, path: impl AsRef<Path>) -> Result<SourceFile> {
        let path = path.as_ref();
        if let Some(existing) = self.source_file(path) {
            return Ok(existing);
        }
        let text = self
            .state
            .borrow()
            .fs
            .read_file(path)
            .map_err(|source| MorphError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        self.insert_file(path, &text, true)
    }

    fn insert_file(&self, path: &Path, text: &str, saved: bool) -> Result<SourceFile> {
        let tree = self.parse(text, None)?;
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_file += 1;
            let id = FileId(state.next_file);
            state.paths.insert(path.to_path_buf(), id);
            state.files.insert(
                id,
                SourceFileState {
                    path: path.to_path_buf(),
                    text: Rc::from(text),
                    tree: Rc::new(tree),
                    phase: PipelinePhase::Stable,
                    saved,
                },
            );
            id
        };
        tracing::debug!(path = %path.display(), bytes = text.len(), "source file added");
        self.root_of(id)
    }

    pub(crate) fn root_of(&self, file: FileId) -> Result<SourceFile> {
        let located = {
            let state = self.state.borrow();
            let tree = &state.file(file)?.tree;
            Located {
                file,
                handle: tree.root(),
                syntax_kind: tree.node(0).kind,
            }
        };
        self.wrap(located).cast_or_err::<SourceFile>()
    }

    pub fn source_file(&self, path: impl AsRef<Path>) -> Option<SourceFile> {
        let id = *self.state.borrow().paths.get(path.as_ref())?;
        self.root_of(id).ok()
    }

    pub fn source_file_or_err(&self, path: impl AsRef<Path>) -> Result<SourceFile> {
        let path = path.as_ref();
        self.source_file(path).ok_or_else(|| {
            let known: Vec<String> = self
                .state
                .borrow()
                .paths
                .keys()
                .map(|p| p.display().to_string())
                .collect();
            let wanted = path.display().to_string();
            MorphError::not_found_among(
                format!("source file `{wanted}`"),
                &wanted,
                known.iter().map(String::as_str),
            )
        })
    }

    /// All files, ordered by path.
    pub fn source_files(&self) -> Vec<SourceFile> {
        let mut ids: Vec<(PathBuf, FileId)> = self
            .state
            .borrow()
            .paths
            .iter()
            .map(|(p, id)| (p.clone(), *id))
            .collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|(_, id)| self.root_of(id).ok())
            .collect()
    }

    /// Drop a file and forget all of its wrappers. Returns false if it was not in the project.
    pub fn remove_source_file(&self, file: &SourceFile) -> Result<bool> {
        let id = file.file_id()?;
        let mut state = self.state.borrow_mut();
        let Some(removed) = state.files.remove(&id) else {
            return Ok(false);
        };
        state.paths.remove(&removed.path);
        let forgotten = state.registry.forget_file(id);
        tracing::debug!(path = %removed.path.display(), forgotten, "source file removed");
        Ok(true)
    }

    /// Write every unsaved file through the file-system host.
    pub fn save(&self) -> Result<()> {
        for file in self.source_files() {
            if !file.is_saved()? {
                file.save()?;
            }
        }
        Ok(())
    }

    pub(crate) fn parse(&self, text: &str, previous: Option<Reparse<'_>>) -> Result<SyntaxTree> {
        let mut parser = self.parser.try_borrow_mut().map_err(|_| {
            MorphError::Parse(ParseError::Service {
                message: "parser is already running".to_string(),
            })
        })?;
        Ok(parser.parse(text, previous)?)
    }

    /// The one wrapper for a located node.
    pub(crate) fn wrap(&self, located: Located) -> Node {
        let (id, kind) = self.state.borrow_mut().registry.get_or_create(
            located.handle,
            located.file,
            located.syntax_kind,
        );
        Node::new(self.clone(), id, kind)
    }

    /// Outermost node within `span` of `file` matching `predicate`.
    pub(crate) fn find_in_span(
        &self,
        file: FileId,
        span: &Range<usize>,
        predicate: impl Fn(&NodeData) -> bool,
    ) -> Result<Option<Node>> {
        let located = {
            let state = self.state.borrow();
            let tree = &state.file(file)?.tree;
            tree.find_within(span, predicate).first().map(|&i| Located {
                file,
                handle: tree.handle(i),
                syntax_kind: tree.node(i).kind,
            })
        };
        Ok(located.map(|l| self.wrap(l)))
    }

    /// Every outermost node within `span` of `file` matching `predicate`.
    pub(crate) fn find_all_in_span(
        &self,
        file: FileId,
        span: &Range<usize>,
        predicate: impl Fn(&NodeData) -> bool,
    ) -> Result<Vec<Node>> {
        let located: Vec<Located> = {
            let state = self.state.borrow();
            let tree = &state.file(file)?.tree;
            tree.find_within(span, predicate)
                .into_iter()
                .map(|i| Located {
                    file,
                    handle: tree.handle(i),
                    syntax_kind: tree.node(i).kind,
                })
                .collect()
        };
        Ok(located.into_iter().map(|l| self.wrap(l)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_lookup_files() {
        let project = Project::in_memory().unwrap();
        let file = project.create_source_file("/a.ts", "let a = 1;").unwrap();
        assert_eq!(file.full_text().unwrap(), "let a = 1;");
        assert_eq!(project.source_file("/a.ts").unwrap(), file);
        assert!(project.source_file("/b.ts").is_none());

        let err = project.create_source_file("/a.ts", "").unwrap_err();
        assert!(matches!(err, MorphError::FileExists(_)));
    }

    #[test]
    fn lookup_error_suggests_existing_path() {
        let project = Project::in_memory().unwrap();
        project.create_source_file("/src/main.ts", "").unwrap();
        let err = project.source_file_or_err("/src/mian.ts").unwrap_err();
        assert!(err.to_string().contains("did you mean `/src/main.ts`"));
    }

    #[test]
    fn projects_do_not_share_wrappers() {
        let a = Project::in_memory().unwrap();
        let b = Project::in_memory().unwrap();
        let fa = a.create_source_file("/x.ts", "let x = 1;").unwrap();
        let fb = b.create_source_file("/x.ts", "let x = 1;").unwrap();
        assert_ne!(fa, fb);
        assert!(b.source_file("/x.ts").is_some());
        assert_eq!(a.wrapper_count(), 1);
    }

    #[test]
    fn remove_forgets_wrappers() {
        let project = Project::in_memory().unwrap();
        let file = project.create_source_file("/x.ts", "let x = 1;").unwrap();
        let statement = file.statements().unwrap().remove(0);
        assert!(project.remove_source_file(&file).unwrap());
        assert!(statement.was_forgotten());
        assert!(file.was_forgotten());
        assert!(project.source_files().is_empty());
    }
}
