mod common;

use common::{PageFixture, PdfBuilder, encode_ops, op};
use lopdf::{Dictionary, Object, Stream, StringFormat, dictionary};
use ragchunk::layout::{PdfPage, TextSpan, read_pdf_pages};

fn line_texts(page: &PdfPage) -> Vec<String> {
    page.layout
        .lines
        .iter()
        .map(|line| {
            page.layout
                .line_spans(line)
                .iter()
                .map(|span| span.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn span<'a>(page: &'a PdfPage, text: &str) -> &'a TextSpan {
    page.layout
        .spans
        .iter()
        .find(|span| span.text == text)
        .unwrap_or_else(|| panic!("no span {text:?} in {:?}", line_texts(page)))
}

fn show(font: &str, size: i64, x: i64, y: i64, body: &str) -> Vec<lopdf::content::Operation> {
    vec![
        op("BT", vec![]),
        op("Tf", vec![font.into(), size.into()]),
        op("Td", vec![x.into(), y.into()]),
        op("Tj", vec![Object::string_literal(body)]),
        op("ET", vec![]),
    ]
}

fn single_page(pdf: PdfBuilder, page: PageFixture) -> anyhow::Result<PdfPage> {
    let mut pages = read_pdf_pages(&pdf.build(vec![page]))?;
    Ok(pages.remove(0))
}

#[test]
fn tj_kerning_opens_a_word_gap_only_when_wide() -> anyhow::Result<()> {
    let page = single_page(
        PdfBuilder::new(),
        PageFixture::default().ops([
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Hel"),
                    (-20).into(),
                    Object::string_literal("lo"),
                    (-400).into(),
                    Object::string_literal("World"),
                ])],
            ),
            op("ET", vec![]),
        ]),
    )?;

    assert_eq!(line_texts(&page), vec!["Hello World"]);
    Ok(())
}

#[test]
fn text_matrix_scales_the_font_size() -> anyhow::Result<()> {
    let page = single_page(
        PdfBuilder::new(),
        PageFixture::default().ops([
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 1.into()]),
            op(
                "Tm",
                vec![12.into(), 0.into(), 0.into(), 12.into(), 72.into(), 700.into()],
            ),
            op("Tj", vec![Object::string_literal("Scaled")]),
            op("ET", vec![]),
        ]),
    )?;

    let scaled = span(&page, "Scaled");
    assert_eq!(scaled.rounded_size(), 12);
    assert!((scaled.bbox.left - 72.0).abs() < 0.01);
    assert!((scaled.bbox.width() - 36.0).abs() < 0.01);
    Ok(())
}

#[test]
fn next_line_operators_step_by_the_leading() -> anyhow::Result<()> {
    let page = single_page(
        PdfBuilder::new(),
        PageFixture::default().ops([
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("TL", vec![14.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op("Tj", vec![Object::string_literal("first")]),
            op("T*", vec![]),
            op("Tj", vec![Object::string_literal("second")]),
            op("'", vec![Object::string_literal("third")]),
            op(
                "\"",
                vec![2.into(), 0.into(), Object::string_literal("fourth")],
            ),
            op("ET", vec![]),
        ]),
    )?;

    assert_eq!(line_texts(&page), vec!["first", "second", "third", "fourth"]);
    let baselines: Vec<f32> = page.layout.lines.iter().map(|line| line.bbox.bottom).collect();
    for pair in baselines.windows(2) {
        assert!((pair[1] - pair[0] - 14.0).abs() < 0.01, "{baselines:?}");
    }
    Ok(())
}

#[test]
fn cm_is_scoped_by_save_and_restore() -> anyhow::Result<()> {
    let mut ops = vec![
        op("q", vec![]),
        op(
            "cm",
            vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 0.into()],
        ),
    ];
    ops.extend(show("F1", 10, 0, 700, "shifted"));
    ops.push(op("Q", vec![]));
    ops.extend(show("F1", 10, 0, 600, "restored"));

    let page = single_page(PdfBuilder::new(), PageFixture::default().ops(ops))?;

    assert!((span(&page, "shifted").bbox.left - 100.0).abs() < 0.01);
    assert!(span(&page, "restored").bbox.left.abs() < 0.01);
    Ok(())
}

fn form(matrix: [i64; 6], operations: Vec<lopdf::content::Operation>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Matrix" => matrix.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
        },
        encode_ops(operations),
    )
}

#[test]
fn form_xobject_text_is_placed_through_both_matrices() -> anyhow::Result<()> {
    let mut pdf = PdfBuilder::new();
    let form_id = pdf.add_object(form([1, 0, 0, 1, 50, 0], show("F1", 10, 0, 500, "inside")));
    let pdf = pdf.xobject("Fm1", form_id);

    let page = single_page(
        pdf,
        PageFixture::default().ops([
            op("q", vec![]),
            op(
                "cm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), 20.into(), 0.into()],
            ),
            op("Do", vec!["Fm1".into()]),
            op("Q", vec![]),
        ]),
    )?;

    assert!((span(&page, "inside").bbox.left - 70.0).abs() < 0.01);
    Ok(())
}

#[test]
fn self_referencing_form_stops_at_the_nesting_limit() -> anyhow::Result<()> {
    let mut pdf = PdfBuilder::new();
    let form_id = pdf.reserve();
    let mut body = show("F1", 10, 0, 400, "loop");
    body.push(op("Do", vec!["Loop".into()]));
    pdf.insert(form_id, form([1, 0, 0, 1, 0, 0], body));
    let pdf = pdf.xobject("Loop", form_id);

    let page = single_page(
        pdf,
        PageFixture::default().ops([op("Do", vec!["Loop".into()])]),
    )?;

    assert!(!page.layout.spans.is_empty());
    Ok(())
}

#[test]
fn type0_font_decodes_two_byte_codes_through_to_unicode() -> anyhow::Result<()> {
    let mut pdf = PdfBuilder::new();
    let cmap = b"/CIDInit /ProcSet findresource begin\n\
        12 dict begin\n\
        begincmap\n\
        1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n\
        2 beginbfchar\n<0001> <0048>\n<0002> <0069>\nendbfchar\n\
        endcmap\nend\nend\n";
    let to_unicode = pdf.add_object(Stream::new(Dictionary::new(), cmap.to_vec()));
    let descendant = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "Custom",
        "DW" => 1000,
        "W" => vec![Object::Integer(1), Object::Array(vec![500.into(), 500.into()])],
    });
    let pdf = pdf.font(
        "T0",
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "Custom",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(descendant)],
            "ToUnicode" => to_unicode,
        },
    );

    let page = single_page(
        pdf,
        PageFixture::default().ops([
            op("BT", vec![]),
            op("Tf", vec!["T0".into(), 12.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op(
                "Tj",
                vec![Object::String(vec![0, 1, 0, 2], StringFormat::Hexadecimal)],
            ),
            op("ET", vec![]),
        ]),
    )?;

    let hi = span(&page, "Hi");
    assert!((hi.bbox.width() - 12.0).abs() < 0.01);
    Ok(())
}

#[test]
fn encoding_differences_override_win_ansi() -> anyhow::Result<()> {
    let pdf = PdfBuilder::new().font(
        "F3",
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => dictionary! {
                "Type" => "Encoding",
                "BaseEncoding" => "WinAnsiEncoding",
                "Differences" => vec![Object::Integer(65), "bullet".into(), "uni00E9".into()],
            },
        },
    );

    let page = single_page(
        pdf,
        PageFixture::default().ops(show("F3", 12, 72, 700, "ABC")),
    )?;

    assert_eq!(line_texts(&page), vec!["\u{2022}\u{e9}C"]);
    Ok(())
}

#[test]
fn inline_image_does_not_hide_later_text() -> anyhow::Result<()> {
    let mut ops = show("F1", 12, 72, 700, "before");
    ops.push(op("BI", vec![]));
    ops.extend(show("F1", 12, 72, 650, "after"));
    let mut pdf = PdfBuilder::new();
    let mut content = encode_ops(ops);
    // Splice a binary inline image payload in place of the bare BI marker.
    let marker = content
        .windows(3)
        .position(|window| window == b"BI\n")
        .expect("BI marker");
    content.splice(
        marker..marker + 3,
        b"BI /W 2 /H 1 /BPC 8 /CS /G ID \xff) EI\n".iter().copied(),
    );
    let form_id = pdf.add_object(Stream::new(
        dictionary! { "Type" => "XObject", "Subtype" => "Form" },
        content,
    ));
    let pdf = pdf.xobject("Img", form_id);

    let page = single_page(
        pdf,
        PageFixture::default().ops([op("Do", vec!["Img".into()])]),
    )?;

    assert_eq!(line_texts(&page), vec!["before", "after"]);
    Ok(())
}
