//! XML driver
//!
//! ```xml
//! <configuration>
//!   <category name="MYOBJECT">
//!     <parameter name="six" value="6" type="int"/>
//!     <parameter name="twelve">=@six * 2.0</parameter>
//!   </category>
//! </configuration>
//! ```

use super::{raw_text, tree_from_configuration};
use crate::driver::Driver;
use crate::{Error, Result};
use conf_model::{Configuration, Layer, TYPE_SUFFIX, Value};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

/// Driver for XML resources.
#[derive(Debug, Default)]
pub struct XmlDriver;

impl XmlDriver {
    pub fn new() -> Self {
        Self
    }
}

/// A `<parameter>` element whose text content is still being read.
struct OpenParameter {
    name: String,
    value: Option<String>,
    ptype: Option<String>,
    text: String,
}

#[derive(Default)]
struct Attributes {
    name: Option<String>,
    value: Option<String>,
    ptype: Option<String>,
}

impl Driver for XmlDriver {
    fn name(&self) -> &str {
        "XML"
    }

    fn extensions(&self) -> &[&str] {
        &["xml"]
    }

    fn parse(&self, layer_name: &str, text: &str) -> Result<Layer> {
        let mut reader = Reader::from_str(text);
        let mut layer = Layer::new(layer_name);
        let mut category: Option<(String, Vec<(String, Value)>)> = None;
        let mut open: Option<OpenParameter> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"configuration" => {}
                    b"category" => category = Some((required_name(&e, "category")?, Vec::new())),
                    b"parameter" => {
                        let attrs = attributes(&e)?;
                        open = Some(OpenParameter {
                            name: attrs.name.ok_or_else(|| missing_name("parameter"))?,
                            value: attrs.value,
                            ptype: attrs.ptype,
                            text: String::new(),
                        });
                    }
                    other => return Err(unexpected(other)),
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"configuration" => {}
                    b"category" => layer.add_category(&required_name(&e, "category")?),
                    b"parameter" => {
                        let attrs = attributes(&e)?;
                        let name = attrs.name.ok_or_else(|| missing_name("parameter"))?;
                        let pairs = category_pairs(&mut category)?;
                        push_parameter(pairs, name, attrs.value.unwrap_or_default(), attrs.ptype);
                    }
                    other => return Err(unexpected(other)),
                },
                Ok(Event::Text(e)) => {
                    if let Some(param) = open.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::parse("XML", err.to_string()))?;
                        param.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(param) = open.as_mut() {
                        param.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"parameter" => {
                        if let Some(param) = open.take() {
                            let value = param
                                .value
                                .unwrap_or_else(|| param.text.trim().to_string());
                            let pairs = category_pairs(&mut category)?;
                            push_parameter(pairs, param.name, value, param.ptype);
                        }
                    }
                    b"category" => {
                        if let Some((name, pairs)) = category.take() {
                            layer.push_category(&name, pairs)?;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(Error::parse(
                        "XML",
                        format!("at byte {}: {}", reader.error_position(), e),
                    ));
                }
            }
        }

        if category.is_some() || open.is_some() {
            return Err(Error::parse("XML", "unexpected end of document"));
        }
        Ok(layer)
    }

    fn render(&self, conf: &Configuration) -> Result<String> {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<configuration>\n");
        for (category, params) in tree_from_configuration(conf) {
            out.push_str(&format!("  <category name=\"{}\">\n", escape(category.as_str())));
            let params = match params {
                Value::Map(params) => params,
                _ => Default::default(),
            };
            for (name, value) in &params {
                if name.ends_with(TYPE_SUFFIX) {
                    continue;
                }
                out.push_str(&format!(
                    "    <parameter name=\"{}\" value=\"{}\"",
                    escape(name.as_str()),
                    escape(raw_text(value).as_str())
                ));
                if let Some(ptype) = params.get(&format!("{}{}", name, TYPE_SUFFIX)) {
                    out.push_str(&format!(" type=\"{}\"", escape(ptype.to_string().as_str())));
                }
                out.push_str("/>\n");
            }
            out.push_str("  </category>\n");
        }
        out.push_str("</configuration>\n");
        Ok(out)
    }
}

fn attributes(e: &BytesStart<'_>) -> Result<Attributes> {
    let mut attrs = Attributes::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::parse("XML", err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| Error::parse("XML", err.to_string()))?
            .into_owned();
        match attr.key.as_ref() {
            b"name" => attrs.name = Some(value),
            b"value" => attrs.value = Some(value),
            b"type" => attrs.ptype = Some(value),
            _ => {}
        }
    }
    Ok(attrs)
}

fn required_name(e: &BytesStart<'_>, element: &str) -> Result<String> {
    attributes(e)?.name.ok_or_else(|| missing_name(element))
}

fn missing_name(element: &str) -> Error {
    Error::parse("XML", format!("<{}> without a name attribute", element))
}

fn unexpected(element: &[u8]) -> Error {
    Error::parse(
        "XML",
        format!("unexpected element <{}>", String::from_utf8_lossy(element)),
    )
}

fn category_pairs(
    category: &mut Option<(String, Vec<(String, Value)>)>,
) -> Result<&mut Vec<(String, Value)>> {
    category
        .as_mut()
        .map(|(_, pairs)| pairs)
        .ok_or_else(|| Error::parse("XML", "<parameter> outside of a <category>"))
}

/// A `type` attribute becomes the sibling type key.
fn push_parameter(
    pairs: &mut Vec<(String, Value)>,
    name: String,
    value: String,
    ptype: Option<String>,
) {
    if let Some(ptype) = ptype {
        pairs.push((format!("{}{}", name, TYPE_SUFFIX), Value::Str(ptype)));
    }
    pairs.push((name, Value::Str(value)));
}
