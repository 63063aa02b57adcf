//! EPUB fixtures built in memory

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A JPEG-ish payload; the pipeline never decodes images
pub const IMAGE_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

/// One spine document
pub struct Chapter {
    pub id: &'static str,
    pub file: &'static str,
    pub title: &'static str,
    pub body: String,
}

impl Chapter {
    pub fn new(id: &'static str, file: &'static str, title: &'static str, body: impl Into<String>) -> Self {
        Self {
            id,
            file,
            title,
            body: body.into(),
        }
    }
}

/// Builder for a small EPUB archive rooted at `OEBPS/content.opf`
pub struct EpubFixture {
    title: &'static str,
    chapters: Vec<Chapter>,
    images: Vec<(&'static str, &'static str)>,
    with_nav_points: bool,
    nav_document: Option<&'static str>,
}

impl EpubFixture {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            chapters: Vec::new(),
            images: Vec::new(),
            with_nav_points: true,
            nav_document: None,
        }
    }

    pub fn chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Add an image at an href relative to `OEBPS/`
    pub fn image(mut self, id: &'static str, href: &'static str) -> Self {
        self.images.push((id, href));
        self
    }

    /// Keep the NCX but leave its navMap empty
    pub fn without_nav_points(mut self) -> Self {
        self.with_nav_points = false;
        self
    }

    /// Make it an EPUB 3 package whose only navigation is `OEBPS/nav.xhtml`
    pub fn nav_document(mut self, markup: &'static str) -> Self {
        self.nav_document = Some(markup);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default();

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        zip.start_file("META-INF/container.xml", deflated).unwrap();
        zip.write_all(CONTAINER.as_bytes()).unwrap();

        zip.start_file("OEBPS/content.opf", deflated).unwrap();
        zip.write_all(self.opf().as_bytes()).unwrap();

        match self.nav_document {
            Some(nav) => {
                zip.start_file("OEBPS/nav.xhtml", deflated).unwrap();
                zip.write_all(nav.as_bytes()).unwrap();
            }
            None => {
                zip.start_file("OEBPS/toc.ncx", deflated).unwrap();
                zip.write_all(self.ncx().as_bytes()).unwrap();
            }
        }

        for chapter in &self.chapters {
            zip.start_file(format!("OEBPS/{}", chapter.file), deflated)
                .unwrap();
            zip.write_all(xhtml(chapter.title, &chapter.body).as_bytes())
                .unwrap();
        }
        for (_, href) in &self.images {
            zip.start_file(format!("OEBPS/{}", href), stored).unwrap();
            zip.write_all(IMAGE_BYTES).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    fn opf(&self) -> String {
        let mut manifest = String::from(match self.nav_document {
            Some(_) => {
                r#"    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>"#
            }
            None => r#"    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>"#,
        });
        for chapter in &self.chapters {
            manifest.push_str(&format!(
                "\n    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>",
                chapter.id, chapter.file
            ));
        }
        for (id, href) in &self.images {
            manifest.push_str(&format!(
                "\n    <item id=\"{}\" href=\"{}\" media-type=\"image/jpeg\"/>",
                id, href
            ));
        }

        let spine: String = self
            .chapters
            .iter()
            .map(|c| format!("\n    <itemref idref=\"{}\"/>", c.id))
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="{version}" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:creator>Test Author</dc:creator>
    <dc:language>en</dc:language>
    <dc:identifier id="bookid">urn:uuid:00000000-0000-0000-0000-000000000001</dc:identifier>
  </metadata>
  <manifest>
{manifest}
  </manifest>
  <spine{toc}>{spine}
  </spine>
</package>
"#,
            version = if self.nav_document.is_some() { "3.0" } else { "2.0" },
            toc = if self.nav_document.is_some() { "" } else { r#" toc="ncx""# },
            title = self.title,
            manifest = manifest,
            spine = spine,
        )
    }

    fn ncx(&self) -> String {
        let nav_points: String = if self.with_nav_points {
            self.chapters
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    format!(
                        r#"
    <navPoint id="np{n}" playOrder="{n}">
      <navLabel><text>{title}</text></navLabel>
      <content src="{file}"/>
    </navPoint>"#,
                        n = i + 1,
                        title = c.title,
                        file = c.file
                    )
                })
                .collect()
        } else {
            String::new()
        };

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:00000000-0000-0000-0000-000000000001"/></head>
  <docTitle><text>{}</text></docTitle>
  <navMap>{}
  </navMap>
</ncx>
"#,
            self.title, nav_points
        )
    }
}

const CONTAINER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

fn xhtml(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>{}</title><style>p {{ margin: 0 }}</style></head>
<body>
{}
</body>
</html>
"#,
        title, body
    )
}

/// The single-chapter, single-image archive used by the end-to-end checks
pub fn one_chapter_with_image() -> EpubFixture {
    EpubFixture::new("Fixture Book")
        .chapter(Chapter::new(
            "chapter1",
            "chapter1.xhtml",
            "Chapter One",
            r#"<p>It was a bright cold day in April. <img src="img/1.jpg" alt="figure"/></p>
<!-- a comment that must go -->
<script>document.write("nope")</script>
<p>The clocks were striking thirteen.</p>"#,
        ))
        .image("img1", "img/1.jpg")
}
