//! HTML pages served next to the feed.
//!
//! The only page is the stream demo at `GET /test`: it shows what is
//! currently in the test stream and opens a WebSocket that continues from
//! there. Templates are compiled into the binary and rendered with
//! `minijinja`; the `.html` suffix turns on HTML auto-escaping.

use minijinja::Environment;

use crate::error::HandlerError;

/// Name of the stream demo template.
const TEST_PAGE: &str = "test.html";

const TEST_PAGE_SOURCE: &str = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8">
        <title>WebSocket Example</title>
    </head>
    <body>
        <pre id="fileData">{{ data }}</pre>
        <script type="text/javascript">
            (function() {
                var data = document.getElementById("fileData");
                var conn = new WebSocket("ws://{{ host }}/ws?lastMod={{ last_mod }}&Stream={{ stream }}");
                conn.onclose = function(evt) {
                    data.textContent = 'Connection closed';
                }
                conn.onmessage = function(evt) {
                    data.textContent = evt.data;
                }
            })();
        </script>
    </body>
</html>
"#;

/// Values rendered into the stream demo page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TestPage<'a> {
    /// `Host` the browser used, for the WebSocket URL.
    pub host: &'a str,
    /// Current payload: a JSON batch, an error message, or empty.
    pub data: &'a str,
    /// Cursor the page's WebSocket resumes from.
    pub last_mod: String,
    /// Stream the page follows.
    pub stream: &'a str,
}

/// Compiled page templates.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Compile the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Template`] if a template fails to parse.
    pub fn new() -> Result<Self, HandlerError> {
        let mut env = Environment::new();
        env.add_template(TEST_PAGE, TEST_PAGE_SOURCE)?;
        Ok(Self { env })
    }

    /// Render the stream demo page.
    pub fn render_test_page(&self, page: &TestPage<'_>) -> Result<String, HandlerError> {
        let html = self.env.get_template(TEST_PAGE)?.render(page)?;
        Ok(html)
    }
}
