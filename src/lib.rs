//! The library code for the `folio` static site generator. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Planning the site: turning the content tree into a [`manifest::Manifest`]
//!    ([`crate::pipeline`])
//! 2. Rendering every page of the manifest to disk ([`crate::render`])
//!
//! Of the two, the first step is the more involved. It is itself composed of
//! several sub-steps, each of which runs to completion before the next:
//!
//! 1. Validating each node's frontmatter against the [`schema::Schema`]
//! 2. Classifying documents into collections and deriving their routes
//!    ([`crate::collection`], [`crate::slug`])
//! 3. Paginating the post listings ([`crate::paginate`]), linking each post to
//!    its chronological neighbors ([`crate::sequence`]), and collecting every
//!    page into the manifest ([`crate::manifest`])
//!
//! The second step is pretty straight-forward: for each page, apply the
//! template for its [`manifest::TemplateId`] and write the result to disk.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod collection;
pub mod config;
pub mod context;
pub mod feed;
pub mod manifest;
pub mod markdown;
pub mod node;
pub mod paginate;
pub mod pipeline;
pub mod render;
pub mod schema;
pub mod sequence;
pub mod slug;
pub mod tag;
pub mod value;
