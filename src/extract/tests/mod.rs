mod field_tests;

/// Shared HTML fixtures for extraction tests
pub mod fixtures {
    /// A classic organic result with an h3 nested inside the anchor
    pub fn organic(title: &str, url: &str, snippet: &str) -> String {
        format!(
            r#"<div class="g">
                 <a href="{url}"><h3>{title}</h3></a>
                 <div class="TbwUpd"><cite>example.com › page</cite></div>
                 <div class="VwiC3b">{snippet}</div>
               </div>"#
        )
    }

    /// A redirect-wrapped organic result
    pub fn wrapped(title: &str, destination: &str, snippet: &str) -> String {
        format!(
            r#"<div class="g">
                 <a href="/url?q={destination}&sa=U&ved=abc123"><h3>{title}</h3></a>
                 <cite>example.com</cite>
                 <div class="VwiC3b">{snippet}</div>
               </div>"#
        )
    }

    /// A video-style result: role=heading block instead of an h3
    pub fn video(title: &str, url: &str) -> String {
        format!(
            r#"<div class="g">
                 <a href="{url}">
                   <div role="heading" aria-level="3"><span>{title}</span></div>
                 </a>
                 <cite>video.example.com</cite>
               </div>"#
        )
    }

    /// A candidate that must fail extraction: pseudo-link href, no heading
    pub fn broken() -> String {
        r#"<div class="g">
             <a href="javascript:void(0)">sponsored chrome</a>
           </div>"#
            .to_string()
    }

    /// Wrap result bodies into a full results-page document, optionally with
    /// a next-page control
    pub fn results_page(bodies: &[String], with_next: bool) -> String {
        let mut body = bodies.concat();
        if with_next {
            body.push_str(r#"<a id="pnnext" href="/search?q=x&start=10"><span>Next</span></a>"#);
        }
        format!("<html><body><div id=\"search\">{body}</div></body></html>")
    }
}
