use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::catalog::FeedResponse;
use crate::content::Media;

const MEDIA_RSS_NS: &str = "http://search.yahoo.com/mrss/";

/// Render a feed view as an RSS 2.0 document with the Media RSS namespace.
///
/// Links are built from `site_url`: the channel points at the scoped
/// category (or the category index), items at their media page.
pub fn render_mrss(response: &FeedResponse, site_url: &str) -> Result<String> {
    let base = site_url.trim_end_matches('/');
    let channel_link = match &response.scope.category {
        Some(category) => format!("{base}/categories/{}", category.slug),
        None => format!("{base}/categories"),
    };

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .context("Failed to write XML declaration")?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:media", MEDIA_RSS_NS));
    writer
        .write_event(Event::Start(rss))
        .context("Failed to write rss element")?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .context("Failed to write channel element")?;

    write_text_element(&mut writer, "title", &response.feed.title)?;
    write_text_element(&mut writer, "link", &channel_link)?;
    write_text_element(&mut writer, "description", &response.feed.title)?;

    for media in &response.feed.items {
        write_item(&mut writer, media, base)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .context("Failed to write channel end")?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .context("Failed to write rss end")?;

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).context("Generated feed contains invalid UTF-8")
}

fn write_item(writer: &mut Writer<Cursor<Vec<u8>>>, media: &Media, base: &str) -> Result<()> {
    let link = format!("{base}/media/{}", media.slug);

    writer
        .write_event(Event::Start(BytesStart::new("item")))
        .context("Failed to write item element")?;

    write_text_element(writer, "title", &media.title)?;
    write_text_element(writer, "link", &link)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "true"));
    writer
        .write_event(Event::Start(guid))
        .context("Failed to write guid element")?;
    writer
        .write_event(Event::Text(BytesText::new(&link)))
        .context("Failed to write guid text")?;
    writer
        .write_event(Event::End(BytesEnd::new("guid")))
        .context("Failed to write guid end")?;

    write_text_element(writer, "pubDate", &media.publish_on.to_rfc2822())?;
    if let Some(description) = &media.description {
        write_text_element(writer, "description", description)?;
        write_text_element(writer, "media:description", description)?;
    }
    write_text_element(writer, "media:title", &media.title)?;

    writer
        .write_event(Event::End(BytesEnd::new("item")))
        .context("Failed to write item end")?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .with_context(|| format!("Failed to write {name} element"))?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .with_context(|| format!("Failed to write {name} text"))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .with_context(|| format!("Failed to write {name} end"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ContextSummary;
    use crate::category::Category;
    use crate::content::FeedView;
    use chrono::{TimeZone, Utc};

    fn response(category: Option<Category>, items: Vec<Media>) -> FeedResponse {
        FeedResponse {
            scope: ContextSummary {
                category,
                breadcrumb: Vec::new(),
                sidebar: Vec::new(),
            },
            feed: FeedView {
                title: "Jazz Media".to_string(),
                items,
            },
        }
    }

    fn clip() -> Media {
        Media {
            id: 1,
            title: "Tom & Jerry <live>".to_string(),
            slug: "tom-and-jerry".to_string(),
            description: Some("A set".to_string()),
            publish_on: Utc.with_ymd_and_hms(2024, 2, 13, 4, 5, 6).unwrap(),
            popularity_points: 3,
            published: true,
            category_ids: Default::default(),
        }
    }

    #[test]
    fn test_render_channel_and_items() {
        let jazz = Category::new(2, "Jazz", "jazz", None);
        let xml = render_mrss(&response(Some(jazz), vec![clip()]), "https://example.org/").unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns:media=\"http://search.yahoo.com/mrss/\""));
        assert!(xml.contains("<title>Jazz Media</title>"));
        assert!(xml.contains("<link>https://example.org/categories/jazz</link>"));
        assert!(xml.contains("<link>https://example.org/media/tom-and-jerry</link>"));
        assert!(xml.contains("<pubDate>Tue, 13 Feb 2024 04:05:06 +0000</pubDate>"));
        assert!(xml.contains("<media:description>A set</media:description>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = render_mrss(&response(None, vec![clip()]), "https://example.org").unwrap();
        assert!(xml.contains("Tom &amp; Jerry &lt;live&gt;"));
        assert!(!xml.contains("<live>"));
    }

    #[test]
    fn test_unscoped_channel_link_and_empty_feed() {
        let xml = render_mrss(&response(None, Vec::new()), "https://example.org").unwrap();
        assert!(xml.contains("<link>https://example.org/categories</link>"));
        assert!(!xml.contains("<item>"));
    }
}
