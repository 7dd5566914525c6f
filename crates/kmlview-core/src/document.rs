//! In-memory XML element tree
//!
//! Parses KML text with quick-xml into a small owned tree that the summary
//! walkers query by qualified tag name, in document order.

use crate::error::KmlViewError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Tag name of a KML feature container
pub const PLACEMARK_TAG: &str = "Placemark";

/// Deepest element nesting `parse` accepts
pub const MAX_DEPTH: usize = 1024;

/// A node inside an element: either a child element or a run of text
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its qualified name (prefix included, e.g. `kml:Point`)
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Self {
        Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            children: Vec::new(),
        }
    }

    /// Child elements in document order, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First element child regardless of its name, `None` if there is none
    pub fn first_child_element(&self) -> Option<&Element> {
        self.child_elements().next()
    }

    /// Concatenated text of this element and all its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Serialize this element and its subtree back to XML
    pub fn to_xml(&self) -> Result<String, KmlViewError> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| KmlViewError::Serialization(e.to_string()))
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), KmlViewError> {
        writer.write_event(Event::Start(BytesStart::new(self.name.as_str())))?;
        for node in &self.children {
            match node {
                Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
                Node::Element(el) => el.write_to(writer)?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }

    /// All descendant elements in document (pre-)order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// First descendant with the given qualified name
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|el| el.name == name)
    }
}

/// Pre-order iterator over descendant elements
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(current.child_elements());
        self.stack[start..].reverse();
        Some(current)
    }
}

/// A parsed KML document, kept together with the text it came from
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    source: String,
    root: Element,
}

impl ParsedDocument {
    /// Root element of the document
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The text this document was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every element (root included) with the given qualified name, in document order
    pub fn elements_by_tag_name<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        std::iter::once(&self.root)
            .chain(self.root.descendants())
            .filter(move |el| el.name == name)
    }

    /// Every `Placemark` element in document order
    pub fn placemarks(&self) -> impl Iterator<Item = &Element> {
        self.elements_by_tag_name(PLACEMARK_TAG)
    }
}

/// Parse text as XML into a [`ParsedDocument`]
///
/// Declarations, comments, processing instructions and doctypes are dropped.
/// Text outside the root element is ignored. Nesting deeper than
/// [`MAX_DEPTH`] is rejected.
pub fn parse(text: &str) -> Result<ParsedDocument, KmlViewError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(KmlViewError::Parse(format!(
                        "elements nested deeper than {}",
                        MAX_DEPTH
                    )));
                }
                stack.push(Element::from_start(&start));
            }
            Event::Empty(start) => attach(&mut stack, &mut root, Element::from_start(&start))?,
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    KmlViewError::Parse(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(end.name().as_ref())
                    ))
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent
                        .children
                        .push(Node::Text(text.unescape()?.into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(KmlViewError::Parse(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    let root = root.ok_or_else(|| {
        KmlViewError::UnsupportedStructure("document has no root element".to_string())
    })?;

    Ok(ParsedDocument {
        source: text.to_string(),
        root,
    })
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), KmlViewError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(KmlViewError::Parse(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NESTED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark><Point><coordinates>1,2,0</coordinates></Point></Placemark>
    <Folder>
      <Placemark><LineString><coordinates>1,1 2,2</coordinates></LineString></Placemark>
    </Folder>
  </Document>
</kml>"#;

    fn names<'a>(it: impl Iterator<Item = &'a Element>) -> Vec<&'a str> {
        it.map(|el| el.name.as_str()).collect()
    }

    #[test]
    fn test_parse_builds_tree() {
        let doc = parse(NESTED).unwrap();
        assert_eq!(doc.root().name, "kml");
        assert_eq!(names(doc.root().child_elements()), vec!["Document"]);
        assert_eq!(doc.source(), NESTED);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = parse(NESTED).unwrap();
        assert_eq!(
            names(doc.root().descendants()),
            vec![
                "Document",
                "Placemark",
                "Point",
                "coordinates",
                "Folder",
                "Placemark",
                "LineString",
                "coordinates",
            ]
        );
    }

    #[test]
    fn test_placemarks_found_at_any_depth() {
        let doc = parse(NESTED).unwrap();
        let firsts: Vec<_> = doc
            .placemarks()
            .filter_map(|p| p.first_child_element())
            .map(|el| el.name.as_str())
            .collect();
        assert_eq!(firsts, vec!["Point", "LineString"]);
    }

    #[test]
    fn test_root_included_in_tag_search() {
        let doc = parse("<Placemark><Point/></Placemark>").unwrap();
        assert_eq!(doc.placemarks().count(), 1);
    }

    #[test]
    fn test_first_child_element_skips_text() {
        let doc = parse("<a>  text <b/><c/></a>").unwrap();
        assert_eq!(doc.root().first_child_element().unwrap().name, "b");
    }

    #[test]
    fn test_first_child_element_absent() {
        let doc = parse("<a>only text</a>").unwrap();
        assert!(doc.root().first_child_element().is_none());
    }

    #[test]
    fn test_text_content_unescapes_and_keeps_cdata() {
        let doc = parse("<a>x &amp; <b>y</b><![CDATA[<z>]]></a>").unwrap();
        assert_eq!(doc.root().text_content(), "x & y<z>");
    }

    #[test]
    fn test_prefixed_names_are_kept() {
        let doc = parse("<kml:kml xmlns:kml=\"urn:x\"><kml:Placemark/></kml:kml>").unwrap();
        assert_eq!(doc.root().name, "kml:kml");
        assert_eq!(doc.placemarks().count(), 0);
        assert_eq!(doc.elements_by_tag_name("kml:Placemark").count(), 1);
    }

    #[test]
    fn test_find_descendant() {
        let doc = parse(NESTED).unwrap();
        let coords = doc.root().find_descendant("coordinates").unwrap();
        assert_eq!(coords.text_content(), "1,2,0");
        assert!(doc.root().find_descendant("Polygon").is_none());
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        let result = parse("<a><b></a>");
        assert!(matches!(result, Err(KmlViewError::Parse(_))));
    }

    #[test]
    fn test_unclosed_element_rejected() {
        let result = parse("<a><b></b>");
        assert!(matches!(result, Err(KmlViewError::Parse(_))));
    }

    #[test]
    fn test_empty_input_has_no_root() {
        let result = parse("<?xml version=\"1.0\"?><!-- nothing -->");
        assert!(matches!(
            result,
            Err(KmlViewError::UnsupportedStructure(_))
        ));
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let depth = MAX_DEPTH + 1;
        let text = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        let result = parse(&text);
        assert!(matches!(result, Err(KmlViewError::Parse(_))));
    }

    #[test]
    fn test_nesting_at_limit_accepted() {
        let text = format!("{}{}", "<a>".repeat(MAX_DEPTH), "</a>".repeat(MAX_DEPTH));
        let doc = parse(&text).unwrap();
        assert_eq!(doc.root().descendants().count(), MAX_DEPTH - 1);
    }

    #[test]
    fn test_to_xml_escapes_text() {
        let doc = parse("<Placemark><name>A &amp; B</name><Point/></Placemark>").unwrap();
        assert_eq!(
            doc.root().to_xml().unwrap(),
            "<Placemark><name>A &amp; B</name><Point></Point></Placemark>"
        );
    }

    #[test]
    fn test_second_root_rejected() {
        let result = parse("<a/><b/>");
        assert!(matches!(result, Err(KmlViewError::Parse(_))));
    }
}
