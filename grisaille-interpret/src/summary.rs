//! Per-document records of which pages are colored or marked.

use crate::detect::ColorDetector;
use crate::error::Result;
use crate::mark::MarkingDetector;
use crate::resources::ResourceScope;
use grisaille_syntax::Operator;
use log::debug;

/// Convert a length in points into millimeters, rounded to the nearest 0.1 mm.
///
/// The sign is dropped.
pub fn to_mm(points: f64) -> f64 {
    let mm = points.abs() / 72.0 * 25.4;

    (mm * 10.0 + 0.5).floor() / 10.0
}

/// The size of a page in millimeters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PageSize {
    /// The width.
    pub width: f64,
    /// The height.
    pub height: f64,
}

impl PageSize {
    /// The size of a page with the media box `[llx lly urx ury]`, given in points.
    pub fn from_media_box(media_box: [f32; 4]) -> Self {
        let [llx, lly, urx, ury] = media_box.map(f64::from);

        Self {
            width: to_mm(urx - llx),
            height: to_mm(ury - lly),
        }
    }
}

/// A page as seen by the summaries.
#[derive(Clone, Copy)]
pub struct Page<'a> {
    /// The content stream of the page.
    pub content: &'a [Operator],
    /// The resources of the page.
    pub resources: &'a dyn ResourceScope,
    /// The media box of the page, in points.
    pub media_box: [f32; 4],
}

/// The pages of a document that were selected by a detector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSelection {
    /// The number of pages of the document.
    pub num_pages: u32,
    /// The largest width and the largest height of all pages.
    pub size: PageSize,
    /// The selected pages, numbered from 1.
    pub pages: Vec<u32>,
}

/// Which pages of a document are colored.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct DocumentSummary {
    /// The number of pages.
    pub num_pages: u32,
    /// The largest page width in millimeters.
    pub width: f64,
    /// The largest page height in millimeters.
    pub height: f64,
    /// The colored pages, numbered from 1.
    pub color_pages: Vec<u32>,
}

impl From<PageSelection> for DocumentSummary {
    fn from(selection: PageSelection) -> Self {
        Self {
            num_pages: selection.num_pages,
            width: selection.size.width,
            height: selection.size.height,
            color_pages: selection.pages,
        }
    }
}

/// Which pages of a document are marked.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct MarkedSummary {
    /// The number of pages.
    pub num_pages: u32,
    /// The largest page width in millimeters.
    pub width: f64,
    /// The largest page height in millimeters.
    pub height: f64,
    /// The marked pages, numbered from 1.
    pub marked_pages: Vec<u32>,
}

impl From<PageSelection> for MarkedSummary {
    fn from(selection: PageSelection) -> Self {
        Self {
            num_pages: selection.num_pages,
            width: selection.size.width,
            height: selection.size.height,
            marked_pages: selection.pages,
        }
    }
}

/// Run `predicate` over all pages and collect the pages it selects.
///
/// The first error aborts the summary.
pub fn summarize_pages<'a>(
    pages: impl IntoIterator<Item = Page<'a>>,
    mut predicate: impl FnMut(&[Operator], &dyn ResourceScope) -> Result<bool>,
) -> Result<PageSelection> {
    let mut selection = PageSelection::default();

    for (page, page_num) in pages.into_iter().zip(1..) {
        let size = PageSize::from_media_box(page.media_box);
        selection.size.width = selection.size.width.max(size.width);
        selection.size.height = selection.size.height.max(size.height);
        selection.num_pages = page_num;

        if predicate(page.content, page.resources)? {
            debug!("page {page_num} is selected");
            selection.pages.push(page_num);
        }
    }

    Ok(selection)
}

/// Summarize which pages of a document are colored.
pub fn summarize_colors<'a>(
    pages: impl IntoIterator<Item = Page<'a>>,
    detector: &ColorDetector,
) -> Result<DocumentSummary> {
    summarize_pages(pages, |ops, resources| detector.is_colored(ops, resources)).map(Into::into)
}

/// Summarize which pages of a document are marked.
pub fn summarize_marks<'a>(
    pages: impl IntoIterator<Item = Page<'a>>,
    detector: &MarkingDetector,
) -> Result<MarkedSummary> {
    summarize_pages(pages, |ops, resources| detector.is_marked(ops, resources)).map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::resources::Resources;
    use grisaille_syntax::object::Name;
    use grisaille_syntax::parse;

    #[test]
    fn millimeters() {
        assert_eq!(to_mm(72.0), 25.4);
        assert_eq!(to_mm(-72.0), 25.4);
        assert_eq!(to_mm(612.0), 215.9);
        assert_eq!(to_mm(0.0), 0.0);
    }

    #[test]
    fn media_box() {
        let size = PageSize::from_media_box([0.0, 0.0, 595.0, 842.0]);

        assert_eq!(size, PageSize { width: 209.9, height: 297.0 });
        assert_eq!(PageSize::from_media_box([10.0, 10.0, -62.0, 82.0]).width, 25.4);
    }

    #[test]
    fn summaries() {
        let resources = Resources::new();
        let gray = parse(b"0 g 0 0 10 10 re f").unwrap();
        let red = parse(b"1 0 0 rg 0 0 10 10 re f").unwrap();
        let blank = parse(b"0 0 10 10 re n").unwrap();

        let pages = [
            Page { content: &gray, resources: &resources, media_box: [0.0, 0.0, 612.0, 792.0] },
            Page { content: &red, resources: &resources, media_box: [0.0, 0.0, 792.0, 612.0] },
            Page { content: &blank, resources: &resources, media_box: [0.0, 0.0, 612.0, 792.0] },
        ];

        let colors = summarize_colors(pages, &ColorDetector::default()).unwrap();
        assert_eq!(colors.num_pages, 3);
        assert_eq!(colors.color_pages, [2]);
        assert_eq!((colors.width, colors.height), (279.4, 279.4));

        let marks = summarize_marks(pages, &MarkingDetector::default()).unwrap();
        assert_eq!(marks.marked_pages, [1, 2]);
    }

    #[test]
    fn errors_abort() {
        let resources = Resources::new();
        let broken = parse(b"/Sh0 sh").unwrap();
        let pages = [Page { content: &broken, resources: &resources, media_box: [0.0; 4] }];

        assert_eq!(
            summarize_colors(pages, &ColorDetector::default()),
            Err(Error::UndefinedShading(Name::new("Sh0")))
        );
    }
}
