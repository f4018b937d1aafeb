//! Schema loader
//!
//! Extracts the element order from an XML Schema document: every element
//! whose local name is `element` and that carries a `name` attribute counts
//! as a declaration, taken in document order. Declarations that only `ref`
//! another element have no name of their own and are skipped.

use std::io::Read;
use std::path::Path;

use mix_adapter_xml::XmlParser;
use mix_ir::{Descendants, Document};
use tracing::{debug, info, trace};

use crate::model::SchemaElementOrder;
use crate::{Error, Result};

const DECLARATION: &str = "element";

/// Loads [`SchemaElementOrder`]s from schema documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaLoader {
    parser: XmlParser,
}

impl SchemaLoader {
    /// Create a new schema loader
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: XmlParser::new(),
        }
    }

    /// Load an element order from schema text
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaLoad`] if the text is not well-formed XML or
    /// contains no element declarations.
    pub fn load_from_str(&self, xsd: &str, source_name: &str) -> Result<SchemaElementOrder> {
        let document = self
            .parser
            .parse_str(xsd, source_name)
            .map_err(|e| Error::schema_load(source_name, e.to_string()))?;
        Self::element_order(&document)
    }

    /// Load an element order from an already opened byte stream
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaLoad`] if the stream cannot be read as UTF-8,
    /// is not well-formed XML, or contains no element declarations.
    pub fn load_from_reader<R: Read>(
        &self,
        mut reader: R,
        source_name: &str,
    ) -> Result<SchemaElementOrder> {
        let mut xsd = String::new();
        reader
            .read_to_string(&mut xsd)
            .map_err(|e| Error::schema_load(source_name, e.to_string()))?;
        self.load_from_str(&xsd, source_name)
    }

    /// Load an element order from a schema file
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaLoad`] if the file cannot be read, is not
    /// well-formed XML, or contains no element declarations.
    pub fn load_from_file(&self, path: &Path) -> Result<SchemaElementOrder> {
        trace!("Loading schema from file: {:?}", path);
        let source_name = path.display().to_string();
        let file =
            std::fs::File::open(path).map_err(|e| Error::schema_load(&source_name, e.to_string()))?;
        let order = self.load_from_reader(std::io::BufReader::new(file), &source_name)?;
        info!(schema = %source_name, elements = order.len(), "Loaded schema element order");
        Ok(order)
    }

    fn element_order(document: &Document) -> Result<SchemaElementOrder> {
        let names = Descendants::new(&document.root)
            .filter(|element| element.name == DECLARATION)
            .filter_map(|element| element.attribute("name"));
        let order = SchemaElementOrder::new(names);

        if order.is_empty() {
            return Err(Error::schema_load(
                document.source_name(),
                "schema declares no named elements",
            ));
        }

        debug!(
            schema = document.source_name(),
            elements = order.len(),
            "Collected element declarations"
        );
        Ok(order)
    }
}
