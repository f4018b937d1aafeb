//! Traversal and cursor APIs for navigating the element tree

use crate::node::Element;
use crate::Error;
use crate::Result;

/// A cursor for navigating the element tree
pub struct Cursor<'a> {
    /// Current element
    element: &'a Element,

    /// Path to current element (for error reporting)
    path: Vec<String>,
}

/// Trait for traversing the element tree
pub trait Traversal {
    /// Visit an element
    fn visit(&mut self, element: &Element, path: &[String]);

    /// Called when entering an element with children
    fn enter(&mut self, _element: &Element, _path: &[String]) {}

    /// Called when leaving an element with children
    fn leave(&mut self, _element: &Element, _path: &[String]) {}

    /// Returns true if traversal should continue
    fn should_continue(&self) -> bool {
        true
    }
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given element
    #[must_use]
    pub fn new(element: &'a Element) -> Self {
        Self {
            element,
            path: vec![element.name.clone()],
        }
    }

    /// Get the current element
    #[must_use]
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Get the current path
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Navigate to a child element by local name
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] when no child has that name.
    pub fn child(&self, name: &str) -> Result<Cursor<'a>> {
        match self.element.find_child(name) {
            Some(child) => {
                let mut new_path = self.path.clone();
                new_path.push(name.to_string());
                Ok(Cursor {
                    element: child,
                    path: new_path,
                })
            }
            None => Err(Error::node_not_found(format!(
                "{}/{}",
                self.path.join("/"),
                name
            ))),
        }
    }

    /// Get all children matching a local name
    #[must_use]
    pub fn children(&self, name: &str) -> Vec<Cursor<'a>> {
        self.element
            .find_children(name)
            .into_iter()
            .enumerate()
            .map(|(idx, child)| {
                let mut new_path = self.path.clone();
                new_path.push(format!("{name}[{idx}]"));
                Cursor {
                    element: child,
                    path: new_path,
                }
            })
            .collect()
    }

    /// Navigate using a path (e.g., "ImageInformation/BasicImageCharacteristics[0]/imageWidth")
    ///
    /// Indices are zero-based and count only siblings with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] for malformed index segments and
    /// [`Error::NodeNotFound`] when a segment does not resolve.
    pub fn navigate(&self, path: &str) -> Result<Cursor<'a>> {
        let mut current = self.element;
        let mut current_path = self.path.clone();

        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }

            if let Some(open_bracket) = segment.find('[') {
                let name = &segment[..open_bracket];
                let close_bracket = segment.find(']').ok_or_else(|| {
                    Error::invalid_path(path, format!("unclosed bracket in '{segment}'"))
                })?;
                let index: usize = segment[open_bracket + 1..close_bracket]
                    .parse()
                    .map_err(|_| {
                        Error::invalid_path(path, format!("invalid index in '{segment}'"))
                    })?;

                current = current.find_children(name).get(index).copied().ok_or_else(|| {
                    Error::node_not_found(format!("{}/{}", current_path.join("/"), segment))
                })?;
                current_path.push(format!("{name}[{index}]"));
            } else {
                current = current.find_child(segment).ok_or_else(|| {
                    Error::node_not_found(format!("{}/{}", current_path.join("/"), segment))
                })?;
                current_path.push(segment.to_string());
            }
        }

        tracing::trace!(path = %current_path.join("/"), "cursor navigated");

        Ok(Cursor {
            element: current,
            path: current_path,
        })
    }
}

/// Walk the tree using a visitor
pub fn walk<T: Traversal>(element: &Element, visitor: &mut T) {
    walk_recursive(element, visitor, &mut vec![]);
}

fn walk_recursive<T: Traversal>(element: &Element, visitor: &mut T, path: &mut Vec<String>) {
    if !visitor.should_continue() {
        return;
    }

    visitor.visit(element, path);

    if !element.children.is_empty() {
        visitor.enter(element, path);
        path.push(element.name.clone());

        for child in &element.children {
            walk_recursive(child, visitor, path);
        }

        path.pop();
        visitor.leave(element, path);
    }
}

/// Depth-first iterator over an element and all of its descendants, in document order
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Descendants<'a> {
    /// Start iterating at `root` (which is yielded first)
    #[must_use]
    pub fn new(root: &'a Element) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> Element {
        Element::new("mix")
            .with_child(
                Element::new("BasicImageInformation").with_child(
                    Element::new("BasicImageCharacteristics")
                        .with_child(Element::new("imageWidth").with_text("1024"))
                        .with_child(Element::new("imageHeight").with_text("768")),
                ),
            )
            .with_child(Element::new("ImageCaptureMetadata"))
    }

    #[test]
    fn test_cursor_creation() {
        let root = Element::new("mix");
        let cursor = Cursor::new(&root);

        assert_eq!(cursor.element().name, "mix");
        assert_eq!(cursor.path(), &["mix"]);
    }

    #[test]
    fn test_cursor_child() {
        let root = sample_tree();
        let cursor = Cursor::new(&root);
        let child = cursor.child("ImageCaptureMetadata").unwrap();

        assert_eq!(child.element().name, "ImageCaptureMetadata");
        assert_eq!(child.path(), &["mix", "ImageCaptureMetadata"]);
    }

    #[test]
    fn test_cursor_child_not_found() {
        let root = Element::new("mix");
        let cursor = Cursor::new(&root);

        match cursor.child("Missing") {
            Err(Error::NodeNotFound { path }) => {
                assert!(path.contains("mix"));
                assert!(path.contains("Missing"));
            }
            _ => panic!("Expected NodeNotFound error"),
        }
    }

    #[test]
    fn test_cursor_children() {
        let root = Element::new("root")
            .with_child(Element::new("item"))
            .with_child(Element::new("other"))
            .with_child(Element::new("item"));

        let cursor = Cursor::new(&root);
        let items = cursor.children("item");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path(), &["root", "item[0]"]);
        assert_eq!(items[1].path(), &["root", "item[1]"]);
        assert!(cursor.children("none").is_empty());
    }

    #[test]
    fn test_cursor_navigate() {
        let root = sample_tree();
        let leaf = Cursor::new(&root)
            .navigate("BasicImageInformation/BasicImageCharacteristics/imageHeight")
            .unwrap();

        assert_eq!(leaf.element().text(), "768");
        assert_eq!(leaf.path().len(), 4);
    }

    #[test]
    fn test_cursor_navigate_with_index() {
        let root = Element::new("root")
            .with_child(Element::new("item").with_text("first"))
            .with_child(Element::new("item").with_text("second"));

        let cursor = Cursor::new(&root);
        assert_eq!(cursor.navigate("item[0]").unwrap().element().text(), "first");
        assert_eq!(cursor.navigate("item[1]").unwrap().element().text(), "second");
        assert!(matches!(
            cursor.navigate("item[5]"),
            Err(Error::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_cursor_navigate_invalid_path() {
        let root = Element::new("root");
        let cursor = Cursor::new(&root);

        assert!(matches!(
            cursor.navigate("item[0"),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            cursor.navigate("item[abc]"),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_cursor_navigate_empty_segments() {
        let root = sample_tree();
        let cursor = Cursor::new(&root);

        let child = cursor.navigate("//ImageCaptureMetadata//").unwrap();
        assert_eq!(child.element().name, "ImageCaptureMetadata");
    }

    struct TestVisitor {
        visited: Vec<String>,
        entered: Vec<String>,
        left: Vec<String>,
        max_visits: usize,
    }

    impl TestVisitor {
        fn with_max_visits(max_visits: usize) -> Self {
            Self {
                visited: Vec::new(),
                entered: Vec::new(),
                left: Vec::new(),
                max_visits,
            }
        }
    }

    impl Traversal for TestVisitor {
        fn visit(&mut self, element: &Element, _path: &[String]) {
            self.visited.push(element.name.clone());
        }

        fn enter(&mut self, element: &Element, _path: &[String]) {
            self.entered.push(element.name.clone());
        }

        fn leave(&mut self, element: &Element, _path: &[String]) {
            self.left.push(element.name.clone());
        }

        fn should_continue(&self) -> bool {
            self.visited.len() < self.max_visits
        }
    }

    #[test]
    fn test_traversal_walk_enter_leave() {
        let root = sample_tree();
        let mut visitor = TestVisitor::with_max_visits(usize::MAX);
        walk(&root, &mut visitor);

        assert_eq!(
            visitor.visited,
            vec![
                "mix",
                "BasicImageInformation",
                "BasicImageCharacteristics",
                "imageWidth",
                "imageHeight",
                "ImageCaptureMetadata"
            ]
        );
        assert_eq!(
            visitor.entered,
            vec!["mix", "BasicImageInformation", "BasicImageCharacteristics"]
        );
        assert_eq!(
            visitor.left,
            vec!["BasicImageCharacteristics", "BasicImageInformation", "mix"]
        );
    }

    #[test]
    fn test_traversal_should_continue() {
        let root = sample_tree();
        let mut visitor = TestVisitor::with_max_visits(2);
        walk(&root, &mut visitor);

        assert_eq!(visitor.visited, vec!["mix", "BasicImageInformation"]);
    }

    #[test]
    fn test_descendants_document_order() {
        let root = sample_tree();
        let names: Vec<&str> = Descendants::new(&root).map(|e| e.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "mix",
                "BasicImageInformation",
                "BasicImageCharacteristics",
                "imageWidth",
                "imageHeight",
                "ImageCaptureMetadata"
            ]
        );
    }
}
