//! Renders a [`Manifest`] to HTML files on disk. Each [`PageDescriptor`] is
//! rendered with the template for its [`TemplateId`] and written to
//! `{output_directory}/{path}/index.html`.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    fs::File,
    io,
    path::{Component, Path, PathBuf},
};

use gtmpl::{Context as TemplateContext, Template};
use gtmpl_value::Value;
use log::debug;

use crate::{
    collection::{Collections, Entry},
    manifest::{Manifest, PageDescriptor, TemplateId},
    node::NodeId,
    value::{context_to_value, entry_to_summary, entry_to_value},
};

/// Site-wide values made available to every template as `site`.
#[derive(Clone, Debug)]
pub struct Site {
    pub title: String,
    pub url: String,
}

/// Responsible for templating and writing manifest pages to disk.
pub struct Renderer {
    templates: HashMap<TemplateId, Template>,
    site: Site,
}

impl Renderer {
    /// Loads one template per [`TemplateId`] from `theme_directory`. See
    /// [`template_file_name`] for the file names.
    pub fn load(theme_directory: &Path, site: Site) -> Result<Renderer> {
        let mut templates = HashMap::new();
        for template_id in TemplateId::ALL.iter() {
            let path = theme_directory.join(template_file_name(*template_id));
            templates.insert(*template_id, parse_template(&path)?);
        }
        Ok(Renderer { templates, site })
    }

    /// Builds a renderer from template sources directly.
    pub fn from_sources(
        sources: &[(TemplateId, &str)],
        site: Site,
    ) -> Result<Renderer> {
        let mut templates = HashMap::new();
        for (template_id, source) in sources {
            let mut template = Template::default();
            template.parse(*source).map_err(Error::ParseTemplate)?;
            templates.insert(*template_id, template);
        }
        Ok(Renderer { templates, site })
    }

    /// Renders every page of `manifest` into `output_directory`. IDs in page
    /// contexts are resolved against `collections`.
    pub fn render(
        &self,
        manifest: &Manifest,
        collections: &Collections,
        output_directory: &Path,
    ) -> Result<()> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in manifest.pages() {
            let dir = page_directory(output_directory, &page.path);
            if seen_dirs.insert(dir.clone()) {
                std::fs::create_dir_all(&dir)?;
            }
            let file_path = dir.join("index.html");
            debug!("rendering `{}` to `{}`", page.path, file_path.display());
            self.render_page(page, collections, &mut File::create(&file_path)?)?;
        }
        Ok(())
    }

    /// Templates a single [`PageDescriptor`] into `w`.
    pub fn render_page<W: io::Write>(
        &self,
        page: &PageDescriptor,
        collections: &Collections,
        w: &mut W,
    ) -> Result<()> {
        let template = self
            .templates
            .get(&page.template)
            .ok_or(Error::MissingTemplate(page.template))?;
        let value = self.page_value(page, collections)?;
        template.execute(w, &TemplateContext::from(value)?)?;
        Ok(())
    }

    // The template data for a page: `page` is the descriptor's context,
    // `site` the site-wide values, and then either `node` (post and
    // standalone pages) or `items` (listing pages).
    fn page_value(
        &self,
        page: &PageDescriptor,
        collections: &Collections,
    ) -> Result<Value> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("path".to_owned(), Value::String(page.path.clone()));
        m.insert("page".to_owned(), context_to_value(&page.context));
        m.insert("site".to_owned(), self.site_value());
        match page.template {
            TemplateId::IndividualPost | TemplateId::StandaloneItem => {
                if let Some(id) = page.context.get("id").and_then(|v| v.as_str()) {
                    m.insert("node".to_owned(), entry_to_value(lookup(collections, id)?));
                }
            }
            TemplateId::ListingPage => {
                let ids = page
                    .context
                    .get("items")
                    .and_then(|v| v.as_list())
                    .unwrap_or(&[]);
                let items = ids
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|id| Ok(entry_to_summary(lookup(collections, id)?)))
                    .collect::<Result<Vec<Value>>>()?;
                m.insert("items".to_owned(), Value::Array(items));
            }
        }
        Ok(Value::Object(m))
    }

    fn site_value(&self) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(self.site.title.clone()));
        m.insert("url".to_owned(), Value::String(self.site.url.clone()));
        Value::Object(m)
    }
}

fn lookup<'c, 'a>(collections: &'c Collections<'a>, id: &str) -> Result<&'c Entry<'a>> {
    collections
        .entry(&NodeId::new(id))
        .ok_or_else(|| Error::UnknownNode(id.to_owned()))
}

/// The file name of the template for `template_id` inside the theme
/// directory.
pub fn template_file_name(template_id: TemplateId) -> &'static str {
    match template_id {
        TemplateId::IndividualPost => "post.html",
        TemplateId::ListingPage => "listing.html",
        TemplateId::StandaloneItem => "work.html",
    }
}

/// Returns the directory a page with route `path` is written to. Only plain
/// path segments are kept, so a route can never escape `output_directory`.
pub fn page_directory(output_directory: &Path, path: &str) -> PathBuf {
    let mut dir = output_directory.to_owned();
    for component in Path::new(path.trim_start_matches('/')).components() {
        if let Component::Normal(segment) = component {
            dir.push(segment);
        }
    }
    dir
}

fn parse_template(path: &Path) -> Result<Template> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)
        .map_err(|e| Error::OpenTemplateFile {
            path: path.to_owned(),
            err: e,
        })?
        .read_to_string(&mut contents)?;

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a rendering operation.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned when no template was loaded for a page's template ID.
    MissingTemplate(TemplateId),

    /// Returned when a page context refers to a node that isn't in any
    /// collection.
    UnknownNode(String),

    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::MissingTemplate(template_id) => {
                write!(f, "No template loaded for `{}` pages", template_id)
            }
            Error::UnknownNode(id) => write!(f, "Unknown content node `{}`", id),
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::MissingTemplate(_) => None,
            Error::UnknownNode(_) => None,
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
