use scraper::error::SelectorErrorKind;
use scraper::{Html, Selector};

use crate::TrackHit;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    SelectorError(#[from] SelectorErrorKind<'static>),
}

pub(crate) fn parse_search_results(raw_html: &str, host: &str) -> Result<Vec<TrackHit>, ParseError> {
    let html = Html::parse_document(raw_html);

    let item_selector = Selector::parse(r#"ul.sounds-list li.sound-item"#)?;
    let title_selector = Selector::parse(r#"a.sound-title"#)?;
    let author_selector = Selector::parse(r#"span.sound-author"#)?;
    let duration_selector = Selector::parse(r#"span.sound-duration"#)?;
    let art_selector = Selector::parse(r#"img.sound-art"#)?;

    let hits = html
        .select(&item_selector)
        .filter_map(|item| {
            let title_link = item.select(&title_selector).next()?;
            let title = title_link.inner_html().trim().to_string();
            let href = title_link.value().attr("href")?;

            if title.is_empty() {
                return None;
            }

            let url = if href.starts_with("http://") || href.starts_with("https://") {
                href.to_string()
            } else {
                format!("{}{}", host, href)
            };

            let author = item
                .select(&author_selector)
                .next()
                .map(|el| el.inner_html().trim().to_string())
                .filter(|author| !author.is_empty());
            let duration = item
                .select(&duration_selector)
                .next()
                .map(|el| el.inner_html().trim().to_string())
                .filter(|duration| !duration.is_empty());
            let thumbnail = item
                .select(&art_selector)
                .next()
                .and_then(|el| el.value().attr("src"))
                .map(ToString::to_string);

            Some(TrackHit {
                title,
                author,
                duration,
                thumbnail,
                url,
            })
        })
        .collect();

    Ok(hits)
}
