// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 模板辅助
//!
//! 这里没有模板语言：`Template` 只是一个渲染函数，
//! 每次渲染时拿到一组只在本次调用内有效的辅助函数（`e`、`t`、`url`）以及一个 JSON 模型。

use serde_json::Value;

use crate::{
    context::{Context, UrlParams},
    util::escape_html,
};

/// 渲染期间可用的辅助函数
pub struct TemplateHelpers<'t> {
    /// HTML 转义
    pub e: fn(&str) -> String,
    /// 翻译，默认原样返回
    pub t: &'t dyn Fn(&str) -> String,
    /// 相对于渲染上下文生成 URL
    pub url: &'t dyn Fn(&str, &UrlParams) -> String,
}

pub type RenderFn = fn(&TemplateHelpers<'_>, &Value) -> String;

#[derive(Clone, Copy)]
pub struct Template {
    render: RenderFn,
}

impl Template {
    pub const fn new(render: RenderFn) -> Self {
        Self { render }
    }

    pub fn render(&self, context: &dyn Context, model: &Value) -> String {
        self.render_with(context, &|s: &str| s.to_string(), model)
    }

    pub fn render_with(
        &self,
        context: &dyn Context,
        translate: &dyn Fn(&str) -> String,
        model: &Value,
    ) -> String {
        let url = |path: &str, params: &UrlParams| context.url(path, params);
        let helpers = TemplateHelpers {
            e: escape_html,
            t: translate,
            url: &url,
        };
        (self.render)(&helpers, model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Globals;
    use crate::request::Request;
    use serde_json::json;

    fn greeting(h: &TemplateHelpers<'_>, model: &Value) -> String {
        format!(
            r#"<a href="{}">{} {}</a>"#,
            (h.url)("/people", &UrlParams::new()),
            (h.t)("Hello"),
            (h.e)(model["name"].as_str().unwrap_or(""))
        )
    }

    #[test]
    fn test_render_uses_helpers() {
        let req = Request::builder(Globals::new("get", "/"))
            .href_base("/app")
            .build()
            .unwrap();
        let html = Template::new(greeting).render(&req, &json!({ "name": "<Ann>" }));
        assert_eq!(html, r#"<a href="/app/people">Hello &lt;Ann&gt;</a>"#);
    }

    #[test]
    fn test_render_with_translator() {
        let req = Request::builder(Globals::new("get", "/")).href_base("").build().unwrap();
        let html = Template::new(greeting).render_with(
            &req,
            &|s: &str| if s == "Hello" { "Hej".to_string() } else { s.to_string() },
            &json!({ "name": "Bo" }),
        );
        assert_eq!(html, r#"<a href="/people">Hej Bo</a>"#);
    }
}
