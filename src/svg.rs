use crate::document::{Document, Primitive};
use crate::xml::{escape_xml, format_number};

/// Serialize a document to standalone SVG 1.1 text.
///
/// Canvas width and height are written with full precision so that reading
/// them back yields exactly the computed canvas size.
pub fn to_svg(doc: &Document) -> String {
    let mut content = String::new();

    if let Some(background) = &doc.background {
        content.push_str(&format!(
            r#"<rect width="100%" height="100%" fill="{}" />"#,
            escape_xml(background)
        ));
    }

    for child in &doc.children {
        write_primitive(child, &mut content);
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>{css}</style>{content}</svg>
"#,
        w = doc.width,
        h = doc.height,
        css = escape_xml(&doc.style),
        content = content,
    )
}

fn write_primitive(node: &Primitive, out: &mut String) {
    match node {
        Primitive::Group {
            class,
            translate,
            children,
        } => {
            out.push_str("<g");
            if let Some(class) = class {
                out.push_str(&format!(r#" class="{}""#, escape_xml(class)));
            }
            if *translate != (0.0, 0.0) {
                out.push_str(&format!(
                    r#" transform="translate({},{})""#,
                    format_number(translate.0),
                    format_number(translate.1)
                ));
            }
            out.push('>');
            for child in children {
                write_primitive(child, out);
            }
            out.push_str("</g>");
        }
        Primitive::Rect {
            bounds,
            fill,
            stroke,
            stroke_width,
            title,
        } => {
            out.push_str(&format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="{}""#,
                format_number(bounds.x),
                format_number(bounds.y),
                format_number(bounds.width),
                format_number(bounds.height),
                escape_xml(fill),
                escape_xml(stroke),
                format_number(*stroke_width),
            ));
            match title {
                Some(title) => {
                    out.push_str(&format!("><title>{}</title></rect>", escape_xml(title)))
                }
                None => out.push_str(" />"),
            }
        }
        Primitive::Text {
            x,
            y,
            content,
            fill,
            font_family,
            font_size,
        } => {
            out.push_str(&format!(
                r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
                format_number(*x),
                format_number(*y),
                escape_xml(font_family),
                format_number(*font_size),
                escape_xml(fill),
                escape_xml(content),
            ));
        }
        Primitive::Link { href, children } => {
            let href = escape_xml(href);
            out.push_str(&format!(r#"<a href="{href}" xlink:href="{href}">"#));
            for child in children {
                write_primitive(child, out);
            }
            out.push_str("</a>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::to_svg;
    use crate::document::{Document, Primitive};
    use crate::layout::BBox;

    fn doc(children: Vec<Primitive>) -> Document {
        Document {
            width: 350.0,
            height: 1100.0,
            style: "a:hover rect { fill-opacity: 0.6; }".to_string(),
            background: None,
            children,
        }
    }

    #[test]
    fn header_carries_canvas_size() {
        let svg = to_svg(&doc(Vec::new()));
        assert!(svg.starts_with("<?xml version=\"1.0\""));
        assert!(svg.contains(r#"version="1.1" width="350" height="1100" viewBox="0 0 350 1100""#));
        assert!(svg.contains("<style>a:hover rect { fill-opacity: 0.6; }</style>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn link_and_text_are_escaped() {
        let svg = to_svg(&doc(vec![Primitive::Link {
            href: "http://x/?a=1&b=2".to_string(),
            children: vec![Primitive::Text {
                x: 150.0,
                y: 12.5,
                content: "R&D <lab>".to_string(),
                fill: "#000000".to_string(),
                font_family: "sans-serif".to_string(),
                font_size: 14.0,
            }],
        }]));

        assert!(svg.contains(r#"<a href="http://x/?a=1&amp;b=2" xlink:href="http://x/?a=1&amp;b=2">"#));
        assert!(svg.contains(r#"x="150" y="12.5""#));
        assert!(svg.contains(">R&amp;D &lt;lab&gt;</text></a>"));
    }

    #[test]
    fn group_translate_and_rect_title() {
        let svg = to_svg(&doc(vec![Primitive::Group {
            class: Some("rack".to_string()),
            translate: (25.0, 0.0),
            children: vec![Primitive::Rect {
                bounds: BBox::new(0.0, 25.0, 300.0, 50.0),
                fill: "white".to_string(),
                stroke: "#333333".to_string(),
                stroke_width: 1.0,
                title: Some("server U1".to_string()),
            }],
        }]));

        assert!(svg.contains(r#"<g class="rack" transform="translate(25,0)">"#));
        assert!(svg.contains(
            r##"<rect x="0" y="25" width="300" height="50" fill="white" stroke="#333333" stroke-width="1"><title>server U1</title></rect></g>"##
        ));
    }

    #[test]
    fn background_is_drawn_first() {
        let mut d = doc(Vec::new());
        d.background = Some("#fafafa".to_string());
        let svg = to_svg(&d);
        assert!(svg.contains(r##"</style><rect width="100%" height="100%" fill="#fafafa" />"##));
    }
}
