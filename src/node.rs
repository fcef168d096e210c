//! Defines the [`ContentNode`] and [`NodeId`] types and the discovery logic
//! which reads content documents from the file system into memory. Discovery
//! is the only place where the build blocks on I/O; everything downstream of
//! [`discover`] operates on the fully-materialized nodes.

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use walkdir::WalkDir;

/// The file extensions which are treated as content documents.
pub const CONTENT_EXTENSIONS: &[&str] = &["md", "markdown"];

/// An opaque identifier for a [`ContentNode`]. It's derived from the node's
/// source path relative to the content root (always `/`-separated), so it is
/// stable across builds and unique within one content tree.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> NodeId {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One discovered content document. The metadata is the raw frontmatter
/// mapping; it only acquires a shape once it passes through
/// [`crate::schema::Schema::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct ContentNode {
    /// The node's identifier. See [`NodeId`].
    pub id: NodeId,

    /// The location of the source file relative to the content root.
    pub source_path: PathBuf,

    /// The frontmatter, as parsed from YAML.
    pub metadata: Mapping,

    /// The document body (markdown). The pipeline never looks inside it.
    pub body: String,
}

impl ContentNode {
    /// Parses a node from the contents of a source file. `relative_path` is
    /// the path of the file relative to the content root (e.g., the node for
    /// `{content_root}/blog/hello.md` has the relative path `blog/hello.md`
    /// and the ID `blog/hello.md`).
    ///
    /// The source is structured as:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter mapping
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Body
    ///
    /// A document that doesn't begin with a fence has no frontmatter at all,
    /// and its whole contents become the body.
    pub fn parse(relative_path: &Path, input: &str) -> Result<ContentNode> {
        let id = NodeId::new(
            relative_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        );

        let (metadata, body) = match frontmatter_indices(input)? {
            None => (Mapping::new(), input),
            Some((yaml_start, yaml_stop, body_start)) => {
                let yaml = &input[yaml_start..yaml_stop];
                let metadata = if yaml.trim().is_empty() {
                    Mapping::new()
                } else {
                    match serde_yaml::from_str(yaml)? {
                        Value::Null => Mapping::new(),
                        Value::Mapping(mapping) => mapping,
                        _ => return Err(Error::FrontmatterNotMapping),
                    }
                };
                let body = input[body_start..]
                    .trim_start_matches(|c: char| c == '\r' || c == '\n');
                (metadata, body)
            }
        };

        Ok(ContentNode {
            id,
            source_path: relative_path.to_owned(),
            metadata,
            body: body.to_owned(),
        })
    }
}

// Returns `(yaml_start, yaml_stop, body_start)` or `None` if the input has no
// frontmatter. The closing fence must begin a line.
fn frontmatter_indices(input: &str) -> Result<Option<(usize, usize, usize)>> {
    const FENCE: &str = "---";
    const CLOSING_FENCE: &str = "\n---";
    if !input.starts_with(FENCE) {
        return Ok(None);
    }
    match input[FENCE.len()..].find(CLOSING_FENCE) {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => Ok(Some((
            FENCE.len(),                                // yaml_start
            FENCE.len() + offset,                       // yaml_stop
            FENCE.len() + offset + CLOSING_FENCE.len(), // body_start
        ))),
    }
}

/// Walks `root` and returns a [`ContentNode`] for every file whose extension
/// is one of `extensions`. Entries are visited in file-name order, so the
/// returned nodes are in the same order on every build.
pub fn discover(root: &Path, extensions: &[&str]) -> Result<Vec<ContentNode>> {
    let mut nodes = Vec::new();
    let walker =
        WalkDir::new(root).sort_by(|a, b| a.file_name().cmp(b.file_name()));
    for result in walker {
        let entry = result?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extensions)
        {
            continue;
        }

        // strip_prefix() should never fail since `root` is an ancestor of
        // every entry WalkDir yields.
        let relative_path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path());
        nodes.push(read_node(entry.path(), relative_path).map_err(|e| {
            Error::Annotated(
                format!("reading content `{}`", relative_path.display()),
                Box::new(e),
            )
        })?);
        debug!("discovered `{}`", relative_path.display());
    }
    Ok(nodes)
}

fn read_node(path: &Path, relative_path: &Path) -> Result<ContentNode> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    ContentNode::parse(relative_path, &contents)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Represents the result of a discovery operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error discovering or parsing a [`ContentNode`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file opens a frontmatter fence (`---`) but
    /// never closes it.
    FrontmatterMissingEndFence,

    /// Returned when the frontmatter is valid YAML but not a mapping.
    FrontmatterNotMapping,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned for I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::FrontmatterNotMapping => {
                write!(f, "Frontmatter must be a YAML mapping")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingEndFence => None,
            Error::FrontmatterNotMapping => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
