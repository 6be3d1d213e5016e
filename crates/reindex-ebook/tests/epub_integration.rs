//! Integration test: build a minimal EPUB 2 package on disk and run the
//! full extraction + mapping + rendering pipeline over it.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use reindex_core::{group_by_chapter, IndexReport, MarkdownSerializer};
use reindex_ebook::parse_epub;

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const CONTENT_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="uid" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Field Notes</dc:title>
    <dc:identifier id="uid">urn:uuid:3b9d1c9e-0000-4c7e-8c11-feedfacecafe</dc:identifier>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="intro" href="intro.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch01" href="ch01.xhtml" media-type="application/xhtml+xml"/>
    <item id="bookindex" href="index.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="intro"/>
    <itemref idref="ch01"/>
    <itemref idref="bookindex"/>
  </spine>
</package>"#;

const TOC_NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="urn:uuid:3b9d1c9e-0000-4c7e-8c11-feedfacecafe"/>
  </head>
  <docTitle><text>Field Notes</text></docTitle>
  <navMap>
    <navPoint id="nav-1" playOrder="1">
      <navLabel><text>Intro</text></navLabel>
      <content src="intro.xhtml"/>
    </navPoint>
    <navPoint id="nav-2" playOrder="2">
      <navLabel><text>Chapter One</text></navLabel>
      <content src="ch01.xhtml"/>
    </navPoint>
    <navPoint id="nav-3" playOrder="3">
      <navLabel><text>Index</text></navLabel>
      <content src="index.xhtml"/>
    </navPoint>
  </navMap>
  <pageList>
    <pageTarget id="pt-1" type="normal" value="1" playOrder="4">
      <navLabel><text>1</text></navLabel>
      <content src="intro.xhtml#page_1"/>
    </pageTarget>
    <pageTarget id="pt-10" type="normal" value="10" playOrder="5">
      <navLabel><text>10</text></navLabel>
      <content src="ch01.xhtml#page_10"/>
    </pageTarget>
    <pageTarget id="pt-15" type="normal" value="15" playOrder="6">
      <navLabel><text>15</text></navLabel>
      <content src="index.xhtml#page_15"/>
    </pageTarget>
  </pageList>
</ncx>"#;

const INTRO_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Intro</title></head>
<body><span id="page_1"/><p>Before the first chapter.</p></body></html>"#;

const CH01_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Chapter One</title></head>
<body><span id="page_10"/><p>The first chapter proper.</p>
<h2>Forecasts</h2><span id="page_11"/><p>Reading the sky.</p></body></html>"#;

const INDEX_XHTML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>Index</title></head>
<body>
<p class="Index-Head">INDEX</p>
<p class="Index-1">Gathering, <a href="intro.xhtml#page_9">9</a>, <a href="ch01.xhtml#page_11">11</a></p>
<p class="Index-1">Decision, <a href="ch01.xhtml#page_10">10</a></p>
</body></html>"#;

fn write_fixture_epub(path: &Path) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);

    // EPUB requires the mimetype entry first and uncompressed.
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    let deflated = SimpleFileOptions::default();
    let entries = [
        ("META-INF/container.xml", CONTAINER_XML),
        ("OEBPS/content.opf", CONTENT_OPF),
        ("OEBPS/toc.ncx", TOC_NCX),
        ("OEBPS/intro.xhtml", INTRO_XHTML),
        ("OEBPS/ch01.xhtml", CH01_XHTML),
        ("OEBPS/index.xhtml", INDEX_XHTML),
    ];
    for (name, content) in entries {
        zip.start_file(name, deflated).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn test_extracts_title_chapters_and_occurrences() {
    let dir = tempfile::tempdir().unwrap();
    let epub_path = dir.path().join("field_notes.epub");
    write_fixture_epub(&epub_path);

    let book = parse_epub(&epub_path).unwrap();
    assert_eq!(book.title, "Field Notes");

    let boundaries: Vec<_> = book
        .chapters
        .iter()
        .map(|c| (c.title.as_str(), c.start_position))
        .collect();
    assert_eq!(
        boundaries,
        vec![("Intro", 1), ("Chapter One", 10), ("Index", 15)]
    );

    let refs: Vec<_> = book
        .occurrences
        .iter()
        .map(|o| (o.term.as_str(), o.page))
        .collect();
    assert_eq!(
        refs,
        vec![("Gathering", 9), ("Gathering", 11), ("Decision", 10)]
    );

    // Page 11 falls under the "Forecasts" heading inside ch01; the other
    // references precede any heading in their files.
    let subs: Vec<_> = book
        .occurrences
        .iter()
        .map(|o| o.subheading.as_deref())
        .collect();
    assert_eq!(subs, vec![None, Some("Forecasts"), None]);
}

#[test]
fn test_full_pipeline_renders_by_order_of_appearance() {
    let dir = tempfile::tempdir().unwrap();
    let epub_path = dir.path().join("field_notes.epub");
    write_fixture_epub(&epub_path);

    let book = parse_epub(&epub_path).unwrap();
    let groups = group_by_chapter(&book.chapters, &book.occurrences).unwrap();
    let report = IndexReport::new(book.title, groups);
    let markdown = MarkdownSerializer::new().serialize(&report);

    assert!(markdown.starts_with("# Field Notes"));
    assert!(markdown.contains("### Intro\n\n- **Gathering** — p. 9"));
    assert!(markdown.contains(
        "### Chapter One\n\n- **Decision** — p. 10\n\n#### Forecasts\n\n- **Gathering** — p. 11"
    ));
    // The Index chapter has no occurrences of its own and is hidden.
    assert!(!markdown.contains("### Index"));
}

#[test]
fn test_missing_file_is_an_error() {
    let err = parse_epub("does-not-exist.epub");
    assert!(err.is_err());
}
