//! In-page JavaScript evaluated by the extraction engine
//!
//! Every script is a self-contained expression that returns plain JSON, so it
//! can be sent as-is through `Runtime.evaluate` with `returnByValue`.

/// True once the navigated document has left the `loading` state.
///
/// The initial `about:blank` document of a fresh target never counts.
pub const DOM_READY_PROBE: &str =
    "document.readyState !== 'loading' && location.href !== 'about:blank'";

/// Build a probe that is true when `selector` matches an element
pub fn selector_probe(selector: &str) -> String {
    // A JSON string literal is a valid JS string literal
    let literal = serde_json::Value::from(selector).to_string();
    format!("document.querySelector({}) !== null", literal)
}

/// Reads one post from the rendered DOM.
///
/// Returns `null` when no content container exists, otherwise an object with
/// `text`, `timestamp`, `author {name, userName, url, uid, avatar}`,
/// `images [string]` and `videos [{url, cover}]`.
pub const EXTRACTION_SCRIPT: &str = r#"(() => {
    const article = document.querySelector('article[data-testid="tweet"]')
        || document.querySelector('article[role="article"]')
        || document.querySelector('article');
    if (!article) return null;

    const data = { text: '', timestamp: '', author: {}, images: [], videos: [] };

    const textElement = article.querySelector('[data-testid="tweetText"]');
    if (textElement) {
        data.text = textElement.innerText || textElement.textContent || '';
    }

    const shortLinks = [];
    article.querySelectorAll('a[href^="https://t.co"]').forEach(link => {
        if (link.textContent && link.textContent.includes('t.co')) {
            shortLinks.push(link.textContent);
        }
    });
    if (shortLinks.length > 0 && !data.text.includes('t.co')) {
        data.text += ' ' + shortLinks.join(' ');
    }

    const authorName = article.querySelector('[data-testid="User-Name"] span span');
    if (authorName) {
        data.author.name = authorName.innerText || authorName.textContent || '';
    }
    const authorLink = article.querySelector('[data-testid="User-Name"] a[role="link"]');
    if (authorLink && authorLink.href) {
        data.author.userName = authorLink.href.split('/').filter(Boolean).pop() || '';
        data.author.url = authorLink.href;
    }

    const profileImage = article.querySelector('img[src*="profile_images"]');
    if (profileImage && profileImage.src) {
        const match = profileImage.src.match(/profile_images\/(\d+)/);
        if (match) data.author.uid = match[1];
    }
    const avatar = article.querySelector('img[alt][src*="profile"]') || profileImage;
    if (avatar && avatar.src) {
        data.author.avatar = avatar.src;
    }

    const timeElement = article.querySelector('time');
    if (timeElement) {
        data.timestamp = timeElement.getAttribute('datetime') || '';
    }

    article.querySelectorAll('img[src*="media"]').forEach(img => {
        if (!img.src || img.src.includes('profile')) return;
        let imageUrl = img.src.split('?')[0];
        if (!/\.(jpg|jpeg|png|gif|webp)$/i.test(imageUrl)) imageUrl += '.jpg';
        if (!imageUrl.endsWith(':orig')) imageUrl += ':orig';
        data.images.push(imageUrl);
    });

    article.querySelectorAll('video').forEach(video => {
        const nested = video.querySelector('source[src]');
        const source = video.currentSrc || video.src || (nested ? nested.src : '');
        const poster = video.poster || '';
        if (source) {
            data.videos.push({ url: source, cover: poster || null });
        } else if (poster) {
            data.videos.push({ url: poster, cover: null });
        }
    });

    return data;
})()"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_probe_quotes_selector() {
        let probe = selector_probe(r#"article[data-testid="tweet"]"#);
        assert_eq!(
            probe,
            r#"document.querySelector("article[data-testid=\"tweet\"]") !== null"#
        );
    }

    #[test]
    fn test_extraction_script_is_an_expression() {
        assert!(EXTRACTION_SCRIPT.starts_with("(() =>"));
        assert!(EXTRACTION_SCRIPT.ends_with("})()"));
        assert!(EXTRACTION_SCRIPT.contains("return null"));
    }

    fn position(needle: &str) -> usize {
        EXTRACTION_SCRIPT
            .find(needle)
            .unwrap_or_else(|| panic!("script lacks {}", needle))
    }

    #[test]
    fn test_container_selectors_in_priority_order() {
        let tweet = position(r#"document.querySelector('article[data-testid="tweet"]')"#);
        let role = position(r#"document.querySelector('article[role="article"]')"#);
        let bare = position("document.querySelector('article')");

        assert!(tweet < role && role < bare);
        assert!(bare < position("if (!article) return null"));
    }

    #[test]
    fn test_short_links_only_appended_when_absent_from_text() {
        let collect = position(r#"querySelectorAll('a[href^="https://t.co"]')"#);
        let guard = position("shortLinks.length > 0 && !data.text.includes('t.co')");
        let append = position("data.text += ' ' + shortLinks.join(' ')");

        assert!(collect < guard && guard < append);
    }

    #[test]
    fn test_media_rules() {
        // Profile pictures never count as media
        assert!(position(r#"querySelectorAll('img[src*="media"]')"#) < position("img.src.includes('profile')) return;"));

        // A source keeps the poster as cover; otherwise the poster is the video
        let with_source = position("data.videos.push({ url: source, cover: poster || null })");
        let poster_only = position("data.videos.push({ url: poster, cover: null })");
        assert!(with_source < poster_only);
        assert!(position("video.currentSrc || video.src || (nested ? nested.src : '')") < with_source);
    }
}
