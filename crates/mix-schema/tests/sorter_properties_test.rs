//! Behavioural properties of schema-order sorting over parsed documents.

use std::collections::BTreeMap;

use mix_adapter_xml::{XmlParser, XmlSerializer};
use mix_ir::{Descendants, Element, Traversal, walk};
use mix_schema::{SchemaLoader, SchemaOrderSorter, UnknownPlacement};

const XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <xsd:element name="mix"/>
  <xsd:element name="BasicDigitalObjectInformation"/>
  <xsd:element name="byteOrder"/>
  <xsd:element name="Compression"/>
  <xsd:element name="compressionScheme"/>
  <xsd:element name="BasicImageInformation"/>
  <xsd:element name="imageWidth"/>
  <xsd:element name="imageHeight"/>
  <xsd:element name="ImageAssessmentMetadata"/>
  <xsd:element name="SpatialMetrics"/>
  <xsd:element name="samplingFrequencyUnit"/>
  <xsd:element name="xSamplingFrequency"/>
  <xsd:element name="ySamplingFrequency"/>
  <xsd:element name="numerator"/>
  <xsd:element name="denominator"/>
</xsd:schema>"#;

const MIX: &str = r#"<mix:mix xmlns:mix="http://www.loc.gov/mix/v20">
  <mix:ImageAssessmentMetadata>
    <mix:SpatialMetrics>
      <mix:ySamplingFrequency><mix:denominator>1</mix:denominator><mix:numerator>300</mix:numerator></mix:ySamplingFrequency>
      <mix:vendorNote>first</mix:vendorNote>
      <mix:xSamplingFrequency><mix:denominator>1</mix:denominator><mix:numerator>300</mix:numerator></mix:xSamplingFrequency>
      <mix:samplingFrequencyUnit>2</mix:samplingFrequencyUnit>
      <mix:vendorNote>second</mix:vendorNote>
    </mix:SpatialMetrics>
  </mix:ImageAssessmentMetadata>
  <mix:BasicImageInformation>
    <mix:imageHeight>768</mix:imageHeight>
    <mix:imageWidth>1024</mix:imageWidth>
  </mix:BasicImageInformation>
  <mix:BasicDigitalObjectInformation>
    <mix:Compression><mix:compressionScheme>1</mix:compressionScheme></mix:Compression>
    <mix:byteOrder>little endian</mix:byteOrder>
  </mix:BasicDigitalObjectInformation>
</mix:mix>"#;

fn sorter(placement: UnknownPlacement) -> SchemaOrderSorter {
    let order = SchemaLoader::new()
        .load_from_str(XSD, "mix.xsd")
        .expect("schema should load");
    SchemaOrderSorter::with_placement(order, placement)
}

fn parse_mix() -> Element {
    XmlParser::new()
        .parse_str(MIX, "mix.xml")
        .expect("fixture should parse")
        .root
}

fn child_names(element: &Element) -> Vec<&str> {
    element.children.iter().map(|c| c.name.as_str()).collect()
}

/// Counts (name, text) pairs per parent name, so reordering never changes the result.
#[derive(Default)]
struct Census {
    counts: BTreeMap<(Vec<String>, String, String), usize>,
}

impl Traversal for Census {
    fn visit(&mut self, element: &Element, path: &[String]) {
        let key = (path.to_vec(), element.name.clone(), element.text().to_string());
        *self.counts.entry(key).or_default() += 1;
    }
}

fn census(element: &Element) -> BTreeMap<(Vec<String>, String, String), usize> {
    let mut census = Census::default();
    walk(element, &mut census);
    census.counts
}

#[test]
fn fix_order_follows_schema_order_at_every_level() {
    let mut mix = parse_mix();
    sorter(UnknownPlacement::First).fix_order(&mut mix);

    assert_eq!(
        child_names(&mix),
        vec![
            "BasicDigitalObjectInformation",
            "BasicImageInformation",
            "ImageAssessmentMetadata"
        ]
    );
    assert_eq!(child_names(&mix.children[0]), vec!["byteOrder", "Compression"]);
    assert_eq!(child_names(&mix.children[1]), vec!["imageWidth", "imageHeight"]);

    let metrics = &mix.children[2].children[0];
    assert_eq!(
        child_names(metrics),
        vec![
            "vendorNote",
            "vendorNote",
            "samplingFrequencyUnit",
            "xSamplingFrequency",
            "ySamplingFrequency"
        ]
    );
    assert_eq!(child_names(&metrics.children[3]), vec!["numerator", "denominator"]);
}

#[test]
fn fix_order_keeps_undeclared_siblings_in_input_order() {
    for placement in [UnknownPlacement::First, UnknownPlacement::Last] {
        let mut mix = parse_mix();
        sorter(placement).fix_order(&mut mix);

        let notes: Vec<&str> = Descendants::new(&mix)
            .filter(|e| e.name == "vendorNote")
            .map(Element::text)
            .collect();
        assert_eq!(notes, vec!["first", "second"], "placement {placement:?}");
    }
}

#[test]
fn fix_order_places_undeclared_names_last_when_configured() {
    let mut mix = parse_mix();
    sorter(UnknownPlacement::Last).fix_order(&mut mix);

    let metrics = &mix.children[2].children[0];
    assert_eq!(
        child_names(metrics),
        vec![
            "samplingFrequencyUnit",
            "xSamplingFrequency",
            "ySamplingFrequency",
            "vendorNote",
            "vendorNote"
        ]
    );
}

#[test]
fn fix_order_is_idempotent() {
    let sorter = sorter(UnknownPlacement::First);
    let mut once = parse_mix();
    sorter.fix_order(&mut once);
    let mut twice = once.clone();
    sorter.fix_order(&mut twice);

    assert_eq!(once, twice);
}

#[test]
fn fix_order_preserves_the_multiset_of_elements_per_level() {
    let original = parse_mix();
    let mut sorted = original.clone();
    sorter(UnknownPlacement::First).fix_order(&mut sorted);

    assert_eq!(census(&original), census(&sorted));
    assert_eq!(original.descendant_count(), sorted.descendant_count());
}

#[test]
fn declared_siblings_follow_declaration_positions() {
    let sorter = sorter(UnknownPlacement::Last);
    let mut mix = parse_mix();
    sorter.fix_order(&mut mix);

    for element in Descendants::new(&mix) {
        let positions: Vec<usize> = element
            .children
            .iter()
            .filter_map(|c| sorter.order().position(&c.name))
            .collect();
        assert!(
            positions.windows(2).all(|pair| pair[0] <= pair[1]),
            "children of {} out of order: {positions:?}",
            element.name
        );
    }
}

#[test]
fn sorted_tree_serializes_in_schema_order() {
    let order = SchemaLoader::new()
        .load_from_str(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                 <xs:element name="A"/><xs:element name="B"/><xs:element name="C"/>
               </xs:schema>"#,
            "abc.xsd",
        )
        .expect("schema should load");
    let mut root = XmlParser::new()
        .parse_str("<root><C/><A/><B/></root>", "abc.xml")
        .expect("xml should parse")
        .root;

    SchemaOrderSorter::new(order).fix_order(&mut root);

    let xml = XmlSerializer::compact().to_string(&root).expect("serialize");
    assert!(xml.ends_with("<root><A/><B/><C/></root>"));
}
