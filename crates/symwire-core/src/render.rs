//! Rendering of wire trees to text, and the top-level driver.
//!
//! The layout is fixed: one node per line, no indentation, literal newlines.
//! An element holding only text stays on one line and an empty element is
//! self-closed.
//!
//! ```text
//! <?xml version="1.0" ?>
//! <output_block>
//! <list>
//! <item>
//! <f>1001</f>
//! <f>5</f>
//! </item>
//! </list>
//! </output_block>
//! ```

use std::io::{self, Write};

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::encoder::Encoder;
use crate::engine::ExpressionEngine;
use crate::fallback::internal_error;
use crate::value::RuntimeValue;
use crate::wire::{Item, WireValue};

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" ?>";
pub const ROOT_ELEMENT: &str = "output_block";

/// Knobs for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Emit the `<?xml version="1.0" ?>` line first.
    pub xml_declaration: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            xml_declaration: true,
        }
    }
}

/// `&`, `<`, `>` and `"`; apostrophes are left alone.
fn escape_content(s: &str) -> String {
    partial_escape(s).replace('"', "&quot;")
}

/// Event writer that ends every node with a newline.
struct Writer<W: Write> {
    xml: quick_xml::Writer<W>,
}

impl<W: Write> Writer<W> {
    fn new(inner: W) -> Self {
        Writer {
            xml: quick_xml::Writer::new(inner),
        }
    }

    fn newline(&mut self) -> io::Result<()> {
        self.xml.get_mut().write_all(b"\n")
    }

    fn event(&mut self, event: Event<'_>) -> io::Result<()> {
        self.xml.write_event(event)?;
        self.newline()
    }

    fn declaration(&mut self) -> io::Result<()> {
        self.xml.get_mut().write_all(XML_DECLARATION.as_bytes())?;
        self.newline()
    }

    fn open(&mut self, tag: &str) -> io::Result<()> {
        self.event(Event::Start(BytesStart::new(tag)))
    }

    fn close(&mut self, tag: &str) -> io::Result<()> {
        self.event(Event::End(BytesEnd::new(tag)))
    }

    fn empty(&mut self, tag: &str) -> io::Result<()> {
        self.event(Event::Empty(BytesStart::new(tag)))
    }

    fn field(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return self.empty("f");
        }
        self.xml.write_event(Event::Start(BytesStart::new("f")))?;
        self.xml
            .write_event(Event::Text(BytesText::from_escaped(escape_content(text))))?;
        self.close("f")
    }

    fn node(&mut self, node: &WireValue) -> io::Result<()> {
        match node {
            WireValue::Item(item) => self.item(item),
            WireValue::List(children) if children.is_empty() => self.empty("list"),
            WireValue::List(children) => {
                self.open("list")?;
                for child in children {
                    self.node(child)?;
                }
                self.close("list")
            }
        }
    }

    fn item(&mut self, item: &Item) -> io::Result<()> {
        self.open("item")?;
        self.field(&item.tag().code().to_string())?;
        for field in item.fields() {
            self.field(field)?;
        }
        for child in item.children() {
            self.node(child)?;
        }
        self.close("item")
    }

    fn document(&mut self, tree: &WireValue, options: &RenderOptions) -> io::Result<()> {
        if options.xml_declaration {
            self.declaration()?;
        }
        self.open(ROOT_ELEMENT)?;
        self.node(tree)?;
        self.close(ROOT_ELEMENT)
    }
}

/// Stream the document for `tree` into `out`.
pub fn render_to<W: Write>(out: W, tree: &WireValue, options: &RenderOptions) -> io::Result<()> {
    Writer::new(out).document(tree, options)
}

/// Render `tree` as a complete document.
pub fn render(tree: &WireValue, options: &RenderOptions) -> String {
    let mut buf = Vec::new();
    if let Err(err) = render_to(&mut buf, tree, options) {
        // writing into a Vec does not fail
        warn!(error = %err, "rendering into memory failed");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Encode `x` and render it. Never fails: an encode error is reported as an
/// `INTERNAL_ERROR` item in place of the value.
pub fn encode_and_render<E>(encoder: &Encoder<'_, E>, x: &RuntimeValue, options: &RenderOptions) -> String
where
    E: ExpressionEngine + ?Sized,
{
    let document = match encoder.encode(x) {
        Ok(tree) => render(&tree, options),
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "encode failed, reporting internal error");
            internal_error(&err, options)
        }
    };
    debug!(bytes = document.len(), "rendered document");
    document
}

/// Write a rendered document followed by a blank line, then flush.
pub fn write_output<W: io::Write>(writer: &mut W, document: &str) -> io::Result<()> {
    writer.write_all(document.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TreeEngine;
    use crate::error::WireError;
    use crate::value::Mapping;

    fn doc(x: &RuntimeValue) -> String {
        let engine = TreeEngine::new();
        encode_and_render(&Encoder::new(&engine), x, &RenderOptions::default())
    }

    #[test]
    fn test_int_document() {
        assert_eq!(
            doc(&RuntimeValue::Int(5)),
            "<?xml version=\"1.0\" ?>\n<output_block>\n<item>\n<f>1001</f>\n<f>5</f>\n</item>\n</output_block>\n"
        );
    }

    #[test]
    fn test_without_declaration() {
        let tree = WireValue::List(vec![Item::boolean(false).into()]);
        let out = render(
            &tree,
            &RenderOptions {
                xml_declaration: false,
            },
        );
        assert_eq!(
            out,
            "<output_block>\n<list>\n<item>\n<f>1005</f>\n<f>False</f>\n</item>\n</list>\n</output_block>\n"
        );
    }

    #[test]
    fn test_empty_nodes_self_close() {
        let tree = WireValue::List(vec![WireValue::List(Vec::new()), Item::string("").into()]);
        let out = render(&tree, &RenderOptions::default());
        assert!(out.contains("<list>\n<list/>\n<item>\n<f>1003</f>\n<f/>\n</item>\n</list>\n"));
    }

    #[test]
    fn test_markup_is_escaped() {
        let out = doc(&RuntimeValue::text("a<b & \"c\">"));
        assert!(out.contains("<f>a&lt;b &amp; &quot;c&quot;&gt;</f>\n"));
    }

    #[test]
    fn test_dict_layout() {
        let mut m = Mapping::new();
        m.insert("x", RuntimeValue::Int(1));
        let out = doc(&RuntimeValue::Mapping(m));
        assert_eq!(
            out,
            concat!(
                "<?xml version=\"1.0\" ?>\n<output_block>\n",
                "<item>\n<f>1010</f>\n",
                "<list>\n<item>\n<f>1003</f>\n<f>x</f>\n</item>\n</list>\n",
                "<list>\n<item>\n<f>1001</f>\n<f>1</f>\n</item>\n</list>\n",
                "</item>\n</output_block>\n"
            )
        );
    }

    #[test]
    fn test_encode_failure_becomes_internal_error() {
        let out = doc(&RuntimeValue::list(vec![RuntimeValue::opaque("_io.TextIOWrapper")]));
        assert_eq!(
            out,
            concat!(
                "<?xml version=\"1.0\" ?>\n<output_block>\n",
                "<item>\n<f>1099</f>\n<f>UnsupportedType</f>\n<f>_io.TextIOWrapper</f>\n</item>\n",
                "</output_block>\n"
            )
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut m = Mapping::new();
        m.insert("b", RuntimeValue::Real(0.1));
        m.insert("a", RuntimeValue::text("é\n"));
        let x = RuntimeValue::tuple(vec![RuntimeValue::Mapping(m), RuntimeValue::Absent]);
        assert_eq!(doc(&x), doc(&x));
    }

    #[test]
    fn test_apostrophes_are_not_escaped() {
        let out = render(&Item::string("it's").into(), &RenderOptions::default());
        assert!(out.contains("<f>it's</f>\n"));
    }

    #[test]
    fn test_internal_error_stays_on_one_line() {
        let x = RuntimeValue::opaque("weird\ntype\u{1}");
        let out = encode_and_render(
            &Encoder::new(&TreeEngine::new()),
            &x,
            &RenderOptions {
                xml_declaration: false,
            },
        );
        assert_eq!(
            out,
            "<output_block>\n<item>\n<f>1099</f>\n<f>UnsupportedType</f>\n<f>weird\\ntype\\x01</f>\n</item>\n</output_block>\n"
        );
        assert_eq!(out.lines().count(), 7);
        assert!(!out.contains('\u{1}'));
    }

    #[test]
    fn test_multi_line_engine_error_is_escaped() {
        let err = WireError::Engine("line one\nline <two>".into());
        let out = internal_error(&err, &RenderOptions::default());
        assert!(out.contains("<f>line one\\nline &lt;two&gt;</f>\n"));
        assert_eq!(out.lines().count(), 8);
    }

    #[test]
    fn test_render_to_streams_the_same_document() {
        let tree = WireValue::List(vec![Item::int(1).into()]);
        let mut buf = Vec::new();
        render_to(&mut buf, &tree, &RenderOptions::default()).unwrap();
        assert_eq!(buf, render(&tree, &RenderOptions::default()).into_bytes());
    }

    #[test]
    fn test_write_output_appends_newline() {
        let mut buf = Vec::new();
        write_output(&mut buf, "<output_block>\n</output_block>\n").unwrap();
        assert_eq!(buf, b"<output_block>\n</output_block>\n\n");
    }
}
