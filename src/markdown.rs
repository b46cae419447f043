use pulldown_cmark::{Event, Options, Parser};

/// Renders entry content. Raw HTML in the markdown is shown as text.
pub fn render(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(html) => Event::Text(html),
        other => other,
    });

    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut rendered, parser);
    rendered
}

/// First `chars` characters of the content, for list previews.
pub fn excerpt(content: &str, chars: usize) -> String {
    let mut ret = content.chars().take(chars).collect::<String>();
    if content.chars().nth(chars).is_some() {
        ret.push('…');
    }
    ret
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renders_markdown() {
        assert_eq!(render("*today*"), "<p><em>today</em></p>\n");
    }

    #[test]
    fn escapes_html() {
        let rendered = render("<script>alert(1)</script>");
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }

    #[test]
    fn excerpts() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("a longer entry", 8), "a longer…");
    }
}
