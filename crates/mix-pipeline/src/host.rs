//! Host documents
//!
//! The host document is the container that receives enriched records as
//! technical metadata sections and links them from the page showing the
//! image.

use chrono::{DateTime, Utc};
use mix_ir::Element;
use tracing::debug;

use crate::{Error, Result};

/// A document that technical metadata records can be attached to
pub trait HostDocument {
    /// Handle for a page
    type Page: Copy;

    /// The page displaying `image_name`, if any
    fn find_page(&self, image_name: &str) -> Option<Self::Page>;

    /// Store a record as a technical metadata section and return its id
    fn add_tech_md(&mut self, record: Element) -> String;

    /// Point `page` at the technical metadata section `tech_md_id`
    ///
    /// # Errors
    ///
    /// Implementations fail when the page or section does not exist.
    fn link_page(&mut self, page: Self::Page, tech_md_id: &str) -> Result<()>;
}

/// A page of an [`InMemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub image_name: String,
    /// Administrative metadata reference, replaced on every link
    pub adm_id: Option<String>,
}

/// A technical metadata section of an [`InMemoryHost`]
#[derive(Debug, Clone, PartialEq)]
pub struct TechMd {
    pub id: String,
    pub record: Element,
    pub created: DateTime<Utc>,
}

/// Host document kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    pages: Vec<Page>,
    tech_md: Vec<TechMd>,
}

impl InMemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Host with one page per image name, in order
    pub fn with_pages<I, S>(image_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut host = Self::new();
        for name in image_names {
            host.add_page(name);
        }
        host
    }

    /// Append a page and return its handle
    pub fn add_page(&mut self, image_name: impl Into<String>) -> usize {
        self.pages.push(Page {
            image_name: image_name.into(),
            adm_id: None,
        });
        self.pages.len() - 1
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn tech_md(&self) -> &[TechMd] {
        &self.tech_md
    }

    /// Section with the given id
    #[must_use]
    pub fn tech_md_by_id(&self, id: &str) -> Option<&TechMd> {
        self.tech_md.iter().find(|section| section.id == id)
    }

    /// Record linked from the page showing `image_name`
    #[must_use]
    pub fn record_for(&self, image_name: &str) -> Option<&Element> {
        let page = self.pages.iter().find(|p| p.image_name == image_name)?;
        let id = page.adm_id.as_deref()?;
        self.tech_md_by_id(id).map(|section| &section.record)
    }
}

impl HostDocument for InMemoryHost {
    type Page = usize;

    fn find_page(&self, image_name: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.image_name == image_name)
    }

    fn add_tech_md(&mut self, record: Element) -> String {
        let id = format!("techMD_{}", self.tech_md.len() + 1);
        self.tech_md.push(TechMd {
            id: id.clone(),
            record,
            created: Utc::now(),
        });
        debug!(id = %id, "added technical metadata section");
        id
    }

    fn link_page(&mut self, page: usize, tech_md_id: &str) -> Result<()> {
        if self.tech_md_by_id(tech_md_id).is_none() {
            return Err(Error::pipeline(
                "link page",
                tech_md_id,
                "no technical metadata section with this id",
            ));
        }
        let page = self.pages.get_mut(page).ok_or_else(|| {
            Error::pipeline("link page", tech_md_id, format!("page {page} does not exist"))
        })?;
        page.adm_id = Some(tech_md_id.to_string());
        Ok(())
    }
}
