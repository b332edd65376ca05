// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 演示站点的组件树：
//!
//! ```text
//! /                 root   (html)
//! /hello            hello  (html, json, text；page 参数默认为 1)
//! /greet            greet  (html；POST 后 303 回到自身，参数命名空间 gb_)
//! /old              永久重定向到 /hello
//! ```

use serde_json::{json, Value};

use webtree::{
    context::params, util::escape_html, Component, Context, Dispatch, HtmlBuilder, HttpResponse,
    Registry, Renderer, Resource, Route, Template, TemplateHelpers, UrlParams, UrlState,
};

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_default::<Root>("root")
        .register_default::<Hello>("hello")
        .register_default::<Greeter>("greet")
        .register_default::<Old>("old");
    registry
}

fn page(cx: &Component<'_>, body: &str) -> String {
    HtmlBuilder::from_document(&cx.document(), body).build()
}

fn root_body(h: &TemplateHelpers<'_>, model: &Value) -> String {
    format!(
        r#"<h1>{}</h1><ul><li><a href="{}">hello</a></li><li><a href="{}">hello;json</a></li><li><a href="{}">greet</a></li></ul>"#,
        (h.e)(model["title"].as_str().unwrap_or("")),
        (h.url)("hello", &UrlParams::new()),
        (h.url)("hello;json", &UrlParams::new()),
        (h.url)("greet", &UrlParams::new()),
    )
}

const ROOT: Template = Template::new(root_body);

#[derive(Default)]
pub struct Root;

impl Resource for Root {
    fn map(&self, name: &str) -> Option<Route> {
        match name {
            "hello" => Some("hello".into()),
            "greet" => Some(Route::namespaced("greet", "gb_")),
            "old" => Some("old".into()),
            _ => None,
        }
    }

    fn renders(&self) -> &[Renderer] {
        &[Renderer::Html]
    }

    fn render(&self, cx: &Component<'_>, _renderer: Renderer) -> Dispatch<String> {
        cx.document_mut().set_title("webtree");
        let body = ROOT.render(cx, &json!({ "title": "webtree" }));
        Ok(page(cx, &body))
    }
}

#[derive(Default)]
pub struct Hello;

impl Resource for Hello {
    fn url_init(&self, state: &mut UrlState<'_>) {
        state.init("page", 1);
    }

    fn renders(&self) -> &[Renderer] {
        &[Renderer::Html, Renderer::Json, Renderer::Text]
    }

    fn render(&self, cx: &Component<'_>, renderer: Renderer) -> Dispatch<String> {
        let page_no: u32 = cx.query("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let next_page = (page_no + 1).to_string();
        let next = cx.url("", &params(&[("page", next_page.as_str())]));
        cx.debug(&format!("hello page {}", page_no));
        match renderer {
            Renderer::Json => Ok(json!({ "greeting": "hello", "page": page_no, "next": next }).to_string()),
            Renderer::Text => Ok(format!("hello (page {})\n", page_no)),
            _ => {
                cx.document_mut().set_title("hello");
                Ok(page(
                    cx,
                    &format!(r#"<p>hello, page {}</p><a href="{}">next</a>"#, page_no, next),
                ))
            }
        }
    }
}

/// 提交名字后通过 303 回到自身，名字保存在带命名空间的查询参数里
#[derive(Default)]
pub struct Greeter;

impl Resource for Greeter {
    fn url_init(&self, state: &mut UrlState<'_>) {
        state.init("name", "");
    }

    fn renders(&self) -> &[Renderer] {
        &[Renderer::Html]
    }

    fn render(&self, cx: &Component<'_>, _renderer: Renderer) -> Dispatch<String> {
        let name = cx.query("name").unwrap_or_default();
        let greeting = if name.is_empty() {
            "Who are you?".to_string()
        } else {
            format!("Hello, {}!", escape_html(&name))
        };
        Ok(page(
            cx,
            &format!(
                r#"<p>{}</p><form method="post" action="{}"><input name="name"><button>greet</button></form>"#,
                greeting,
                cx.url(";", &UrlParams::new())
            ),
        ))
    }

    fn post(&self, cx: &Component<'_>) -> Dispatch {
        match cx.body("name") {
            Some(name) if !name.trim().is_empty() => {
                cx.state_mut().set("name", name.trim());
                Err(HttpResponse::see_other(&cx.url("", &UrlParams::new())).into())
            }
            _ => Err(HttpResponse::from_status_code(400, Some("name is required")).into()),
        }
    }
}

#[derive(Default)]
pub struct Old;

impl Resource for Old {
    fn get(&self, cx: &Component<'_>) -> Dispatch {
        Err(HttpResponse::moved_permanently(&cx.url("/hello", &UrlParams::new())).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webtree::{Bootstrap, Globals, Request};

    fn run(method: &str, uri: &str) -> HttpResponse {
        run_with(Globals::new(method, uri))
    }

    fn run_with(globals: Globals) -> HttpResponse {
        let registry = registry();
        let request = Request::builder(globals).build().unwrap();
        Bootstrap::new(&registry).run("root", &request)
    }

    #[test]
    fn test_root_page() {
        let response = run("get", "/");
        assert_eq!(response.status(), 200);
        assert!(response.text().contains("<title>webtree</title>"));
        assert!(response.text().contains(r#"href="/hello;json""#));
    }

    #[test]
    fn test_hello_json() {
        let mut globals = Globals::new("get", "/hello;json?page=2");
        globals.query.insert("page".to_string(), "2".to_string());
        let response = run_with(globals);
        assert_eq!(response.content_type(), Some("application/json"));
        let value: Value = serde_json::from_str(&response.text()).unwrap();
        assert_eq!(value["page"], 2);
        assert_eq!(value["next"], "/hello;json?page=3");
    }

    #[test]
    fn test_old_redirects() {
        let response = run("get", "/old");
        assert_eq!(response.status(), 301);
        assert_eq!(response.header("location"), Some("/hello"));
    }

    #[test]
    fn test_greet_requires_name() {
        let response = run("post", "/greet");
        assert_eq!(response.status(), 400);
    }

    #[test]
    fn test_greet_post_redirects_with_namespaced_state() {
        let mut globals = Globals::new("post", "/greet");
        globals.body.insert("name".to_string(), "Ann".to_string());
        let response = run_with(globals);
        assert_eq!(response.status(), 303);
        assert_eq!(response.header("location"), Some("/greet?gb_name=Ann"));

        let mut globals = Globals::new("get", "/greet?gb_name=Ann");
        globals.query.insert("gb_name".to_string(), "Ann".to_string());
        assert!(run_with(globals).text().contains("Hello, Ann!"));
    }
}
