//! ReqIF document serialization.
//!
//! Streams an [`ExportBundle`] to XML: header, datatypes, spec types,
//! objects, relations, and the hierarchy, in that order. Every
//! identifiable element is stamped with the bundle's creation time.
//! Rich-text payloads are embedded as-is; they already carry the
//! `xhtml:` prefix and escaped text.

use std::io::Write;

use chrono::SecondsFormat;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use thiserror::Error;

use crate::model::{
    AttributeValue, Datatype, DatatypeKind, ExportBundle, SpecHierarchy, SpecObject,
    SpecObjectType, SpecRelation, SpecRelationType, Value,
};

const REQIF_NAMESPACE: &str = "http://www.omg.org/spec/ReqIF/20110401/reqif.xsd";
const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Failure to serialize a bundle.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The XML writer rejected an event.
    #[error("XML write failed: {0}")]
    Xml(String),
    /// The serialized document was not valid UTF-8.
    #[error("serialized document is not UTF-8: {0}")]
    Utf8(String),
}

/// Serializes `bundle` as a ReqIF document to `writer`.
///
/// # Errors
///
/// Returns [`WriteError`] if an event cannot be written.
pub fn write_reqif<W: Write>(bundle: &ExportBundle, writer: W) -> Result<(), WriteError> {
    DocumentWriter::new(bundle, writer).write()
}

/// Serializes `bundle` as a ReqIF document into a string.
///
/// # Errors
///
/// Returns [`WriteError`] if an event cannot be written.
pub fn to_xml_string(bundle: &ExportBundle) -> Result<String, WriteError> {
    let mut output = Vec::new();
    write_reqif(bundle, &mut output)?;
    String::from_utf8(output).map_err(|e| WriteError::Utf8(e.to_string()))
}

/// Element-name suffix for a datatype kind, shared by datatype,
/// definition, and value elements.
const fn kind_suffix(kind: DatatypeKind) -> &'static str {
    match kind {
        DatatypeKind::String => "STRING",
        DatatypeKind::Integer => "INTEGER",
        DatatypeKind::Real => "REAL",
        DatatypeKind::Boolean => "BOOLEAN",
        DatatypeKind::Date => "DATE",
        DatatypeKind::Enumeration => "ENUMERATION",
        DatatypeKind::RichText => "XHTML",
    }
}

struct DocumentWriter<'a, W: Write> {
    bundle: &'a ExportBundle,
    writer: Writer<W>,
    timestamp: String,
}

impl<'a, W: Write> DocumentWriter<'a, W> {
    fn new(bundle: &'a ExportBundle, writer: W) -> Self {
        Self {
            bundle,
            writer: Writer::new_with_indent(writer, b' ', 2),
            timestamp: bundle
                .header
                .creation_time
                .to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }

    fn write(mut self) -> Result<(), WriteError> {
        let bundle = self.bundle;

        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| WriteError::Xml(e.to_string()))?;

        let mut root = BytesStart::new("REQ-IF");
        root.push_attribute(("xmlns", REQIF_NAMESPACE));
        root.push_attribute(("xmlns:xhtml", XHTML_NAMESPACE));
        self.write_start(root)?;

        self.write_header()?;

        self.start("CORE-CONTENT")?;
        self.start("REQ-IF-CONTENT")?;

        self.start("DATATYPES")?;
        for datatype in &bundle.datatypes {
            self.write_datatype(datatype)?;
        }
        self.end("DATATYPES")?;

        self.start("SPEC-TYPES")?;
        self.write_specification_type()?;
        for object_type in &bundle.spec_object_types {
            self.write_object_type(object_type)?;
        }
        for relation_type in &bundle.relation_types {
            self.write_relation_type(relation_type)?;
        }
        self.end("SPEC-TYPES")?;

        self.start("SPEC-OBJECTS")?;
        for object in &bundle.spec_objects {
            self.write_object(object)?;
        }
        self.end("SPEC-OBJECTS")?;

        self.start("SPEC-RELATIONS")?;
        for relation in &bundle.relations {
            self.write_relation(relation)?;
        }
        self.end("SPEC-RELATIONS")?;

        self.start("SPECIFICATIONS")?;
        self.write_specification()?;
        self.end("SPECIFICATIONS")?;

        self.end("REQ-IF-CONTENT")?;
        self.end("CORE-CONTENT")?;
        self.end("REQ-IF")
    }

    fn write_header(&mut self) -> Result<(), WriteError> {
        let header = &self.bundle.header;

        self.start("THE-HEADER")?;
        let mut element = BytesStart::new("REQ-IF-HEADER");
        element.push_attribute(("IDENTIFIER", header.identifier.as_str()));
        self.write_start(element)?;

        let creation_time = self.timestamp.clone();
        self.text_element("CREATION-TIME", &creation_time)?;
        self.text_element("REPOSITORY-ID", &header.repository_id)?;
        self.text_element("REQ-IF-TOOL-ID", &header.req_if_tool_id)?;
        self.text_element("REQ-IF-VERSION", &header.req_if_version)?;
        self.text_element("SOURCE-TOOL-ID", &header.source_tool_id)?;
        self.text_element("TITLE", &header.title)?;

        self.end("REQ-IF-HEADER")?;
        self.end("THE-HEADER")
    }

    fn write_datatype(&mut self, datatype: &Datatype) -> Result<(), WriteError> {
        let name = format!("DATATYPE-DEFINITION-{}", kind_suffix(datatype.kind));
        let element = self.identifiable(&name, datatype.identifier.as_str(), &datatype.long_name);

        if datatype.kind == DatatypeKind::Enumeration {
            self.write_start(element)?;
            self.start("SPECIFIED-VALUES")?;
            for literal in &datatype.literals {
                let mut value = BytesStart::new("ENUM-VALUE");
                value.push_attribute(("IDENTIFIER", literal.identifier.as_str()));
                value.push_attribute(("LAST-CHANGE", self.timestamp.as_str()));
                self.write_start(value)?;
                self.start("PROPERTIES")?;
                let mut embedded = BytesStart::new("EMBEDDED-VALUE");
                embedded.push_attribute(("KEY", literal.key.as_str()));
                embedded.push_attribute(("OTHER-CONTENT", ""));
                self.write_empty(embedded)?;
                self.end("PROPERTIES")?;
                self.end("ENUM-VALUE")?;
            }
            self.end("SPECIFIED-VALUES")?;
            self.end(&name)
        } else {
            self.write_empty(element)
        }
    }

    fn write_specification_type(&mut self) -> Result<(), WriteError> {
        let spec_type = &self.bundle.specification_type;
        let element = self.identifiable(
            "SPECIFICATION-TYPE",
            spec_type.identifier.as_str(),
            &spec_type.long_name,
        );
        self.write_empty(element)
    }

    fn write_object_type(&mut self, object_type: &SpecObjectType) -> Result<(), WriteError> {
        let mut element = self.identifiable(
            "SPEC-OBJECT-TYPE",
            object_type.identifier.as_str(),
            &object_type.long_name,
        );
        if let Some(description) = &object_type.description {
            element.push_attribute(("DESC", description.as_str()));
        }
        self.write_start(element)?;

        self.start("SPEC-ATTRIBUTES")?;
        for definition in &object_type.attributes {
            let suffix = kind_suffix(definition.kind);
            let name = format!("ATTRIBUTE-DEFINITION-{suffix}");
            let element =
                self.identifiable(&name, definition.identifier.as_str(), &definition.long_name);
            self.write_start(element)?;
            self.reference(
                "TYPE",
                &format!("DATATYPE-DEFINITION-{suffix}-REF"),
                definition.datatype.as_str(),
            )?;
            self.end(&name)?;
        }
        self.end("SPEC-ATTRIBUTES")?;

        self.end("SPEC-OBJECT-TYPE")
    }

    fn write_relation_type(&mut self, relation_type: &SpecRelationType) -> Result<(), WriteError> {
        let mut element = self.identifiable(
            "SPEC-RELATION-TYPE",
            relation_type.identifier.as_str(),
            &relation_type.long_name,
        );
        if let Some(description) = &relation_type.description {
            element.push_attribute(("DESC", description.as_str()));
        }
        self.write_empty(element)
    }

    fn write_object(&mut self, object: &SpecObject) -> Result<(), WriteError> {
        let element = self.identifiable(
            "SPEC-OBJECT",
            object.identifier.as_str(),
            &object.long_name,
        );
        self.write_start(element)?;

        self.start("VALUES")?;
        for value in &object.values {
            self.write_value(value)?;
        }
        self.end("VALUES")?;

        self.reference("TYPE", "SPEC-OBJECT-TYPE-REF", object.object_type.as_str())?;
        self.end("SPEC-OBJECT")
    }

    fn write_value(&mut self, attribute: &AttributeValue) -> Result<(), WriteError> {
        let suffix = kind_suffix(attribute.value.kind());
        let name = format!("ATTRIBUTE-VALUE-{suffix}");
        let definition_ref = format!("ATTRIBUTE-DEFINITION-{suffix}-REF");

        match &attribute.value {
            Value::Str(text) | Value::Date(text) => {
                self.scalar_value(&name, &definition_ref, attribute, text)
            }
            Value::Int(int) => {
                self.scalar_value(&name, &definition_ref, attribute, &int.to_string())
            }
            Value::Real(real) => {
                self.scalar_value(&name, &definition_ref, attribute, &real.to_string())
            }
            Value::Bool(boolean) => {
                self.scalar_value(&name, &definition_ref, attribute, &boolean.to_string())
            }
            Value::EnumRefs(refs) => {
                self.write_start(BytesStart::new(name.as_str()))?;
                self.reference("DEFINITION", &definition_ref, attribute.definition.as_str())?;
                self.start("VALUES")?;
                for enum_ref in refs {
                    self.text_element("ENUM-VALUE-REF", enum_ref.as_str())?;
                }
                self.end("VALUES")?;
                self.end(&name)
            }
            Value::RichText(fragment) => {
                self.write_start(BytesStart::new(name.as_str()))?;
                self.reference("DEFINITION", &definition_ref, attribute.definition.as_str())?;
                self.start("THE-VALUE")?;
                // Already escaped and namespace-prefixed.
                self.writer
                    .write_event(Event::Text(BytesText::from_escaped(fragment.as_str())))
                    .map_err(|e| WriteError::Xml(e.to_string()))?;
                self.end("THE-VALUE")?;
                self.end(&name)
            }
        }
    }

    fn scalar_value(
        &mut self,
        name: &str,
        definition_ref: &str,
        attribute: &AttributeValue,
        text: &str,
    ) -> Result<(), WriteError> {
        let mut element = BytesStart::new(name);
        element.push_attribute(("THE-VALUE", text));
        self.write_start(element)?;
        self.reference("DEFINITION", definition_ref, attribute.definition.as_str())?;
        self.end(name)
    }

    fn write_relation(&mut self, relation: &SpecRelation) -> Result<(), WriteError> {
        let mut element = BytesStart::new("SPEC-RELATION");
        element.push_attribute(("IDENTIFIER", relation.identifier.as_str()));
        element.push_attribute(("LAST-CHANGE", self.timestamp.as_str()));
        self.write_start(element)?;

        self.reference(
            "TYPE",
            "SPEC-RELATION-TYPE-REF",
            relation.relation_type.as_str(),
        )?;
        self.reference("SOURCE", "SPEC-OBJECT-REF", relation.source.as_str())?;
        self.reference("TARGET", "SPEC-OBJECT-REF", relation.target.as_str())?;
        self.end("SPEC-RELATION")
    }

    fn write_specification(&mut self) -> Result<(), WriteError> {
        let specification = &self.bundle.specification;
        let element = self.identifiable(
            "SPECIFICATION",
            specification.identifier.as_str(),
            &specification.long_name,
        );
        self.write_start(element)?;

        self.reference(
            "TYPE",
            "SPECIFICATION-TYPE-REF",
            specification.specification_type.as_str(),
        )?;

        self.start("CHILDREN")?;
        for child in &specification.children {
            self.write_hierarchy(child)?;
        }
        self.end("CHILDREN")?;

        self.end("SPECIFICATION")
    }

    fn write_hierarchy(&mut self, node: &SpecHierarchy) -> Result<(), WriteError> {
        let mut element = BytesStart::new("SPEC-HIERARCHY");
        element.push_attribute(("IDENTIFIER", node.identifier.as_str()));
        element.push_attribute(("LAST-CHANGE", self.timestamp.as_str()));
        self.write_start(element)?;

        self.reference("OBJECT", "SPEC-OBJECT-REF", node.object.as_str())?;

        if !node.children.is_empty() {
            self.start("CHILDREN")?;
            for child in &node.children {
                self.write_hierarchy(child)?;
            }
            self.end("CHILDREN")?;
        }

        self.end("SPEC-HIERARCHY")
    }

    fn identifiable(&self, name: &str, identifier: &str, long_name: &str) -> BytesStart<'static> {
        let mut element = BytesStart::new(name.to_string());
        element.push_attribute(("IDENTIFIER", identifier));
        element.push_attribute(("LAST-CHANGE", self.timestamp.as_str()));
        element.push_attribute(("LONG-NAME", long_name));
        element
    }

    fn reference(&mut self, wrapper: &str, ref_name: &str, target: &str) -> Result<(), WriteError> {
        self.start(wrapper)?;
        self.text_element(ref_name, target)?;
        self.end(wrapper)
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), WriteError> {
        self.start(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| WriteError::Xml(e.to_string()))?;
        self.end(name)
    }

    fn start(&mut self, name: &str) -> Result<(), WriteError> {
        self.write_start(BytesStart::new(name))
    }

    fn write_start(&mut self, element: BytesStart<'_>) -> Result<(), WriteError> {
        self.writer
            .write_event(Event::Start(element))
            .map_err(|e| WriteError::Xml(e.to_string()))
    }

    fn write_empty(&mut self, element: BytesStart<'_>) -> Result<(), WriteError> {
        self.writer
            .write_event(Event::Empty(element))
            .map_err(|e| WriteError::Xml(e.to_string()))
    }

    fn end(&mut self, name: &str) -> Result<(), WriteError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| WriteError::Xml(e.to_string()))
    }
}
