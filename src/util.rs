use crate::{document::Document, param::reason_phrase};

pub struct HtmlBuilder {
    title: String,
    css: String,
    script: String,
    head: String,
    body: String,
}

impl HtmlBuilder {
    pub fn from_status_code(code: u16, note: Option<&str>) -> Self {
        let title = format!("{}", code);
        let css = r"
            body {
                width: 35em;
                margin: 0 auto;
                font-family: Tahoma, Verdana, Arial, sans-serif;
            }
            "
        .to_string();
        let description = match note {
            Some(n) => n,
            None => reason_phrase(code),
        };
        let body = format!(
            r"
            <h1>{} {}</h1>
            <p>{}</p>
            ",
            code,
            reason_phrase(code),
            escape_html(description)
        );
        Self {
            title,
            css,
            script: "".to_string(),
            head: "".to_string(),
            body,
        }
    }

    /// 用共享的 Document（标题、脚本、样式、onload）包裹组件渲染出的正文
    pub fn from_document(document: &Document, body: &str) -> Self {
        let mut head = String::new();
        for style in document.styles() {
            head.push_str(&format!(
                r#"<link rel="stylesheet" href="{}">"#,
                escape_html(style)
            ));
        }
        for script in document.scripts() {
            head.push_str(&format!(
                r#"<script src="{}"></script>"#,
                escape_html(script)
            ));
        }
        let script = if document.onload().is_empty() {
            "".to_string()
        } else {
            format!(
                "window.onload = function() {{ {} }};",
                document.onload().join("; ")
            )
        };
        Self {
            title: escape_html(document.title()),
            css: "".to_string(),
            script,
            head,
            body: body.to_string(),
        }
    }

    pub fn build(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
            <html>
                <head>
                    <meta charset="utf-8">
                    {}
                    <script>{}</script>
                    <title>{}</title>
                    <style>{}</style>
                </head>
                <body>
                {}
                </body>
            </html>"##,
            self.head, self.script, self.title, self.css, self.body
        )
    }
}

pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#039;"),
            _ => output.push(c),
        }
    }
    output
}
