// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 调试/观测模块
//!
//! 分发核心通过 `DebugListener` 汇报异常、每一步分发以及组件的调试输出，
//! 并在引导结束时给监听器一次改写最终响应的机会。
//! 监听器自身不能让响应路径失败：所有方法都不返回错误。

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, info};

use crate::{exception::Exception, response::HttpResponse, util::escape_html};

#[cfg_attr(test, mockall::automock)]
pub trait DebugListener {
    fn log_exception(&self, exception: &Exception);
    fn log_dispatch(&self, component: &str, name: &str, next: &str);
    fn log(&self, message: &str);
    /// 在引导结束时运行一次的响应改写钩子
    fn decorate(&self, response: HttpResponse) -> HttpResponse;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VoidDebugListener;

impl DebugListener for VoidDebugListener {
    fn log_exception(&self, _exception: &Exception) {}

    fn log_dispatch(&self, _component: &str, _name: &str, _next: &str) {}

    fn log(&self, _message: &str) {}

    fn decorate(&self, response: HttpResponse) -> HttpResponse {
        response
    }
}

/// 把每个事件依次转发给所有子监听器；`decorate` 按添加顺序串联
#[derive(Default)]
pub struct MultiDebugListener {
    listeners: Vec<Rc<dyn DebugListener>>,
}

impl MultiDebugListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: Rc<dyn DebugListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl DebugListener for MultiDebugListener {
    fn log_exception(&self, exception: &Exception) {
        for listener in &self.listeners {
            listener.log_exception(exception);
        }
    }

    fn log_dispatch(&self, component: &str, name: &str, next: &str) {
        for listener in &self.listeners {
            listener.log_dispatch(component, name, next);
        }
    }

    fn log(&self, message: &str) {
        for listener in &self.listeners {
            listener.log(message);
        }
    }

    fn decorate(&self, response: HttpResponse) -> HttpResponse {
        self.listeners
            .iter()
            .fold(response, |response, listener| listener.decorate(response))
    }
}

/// 写入 `log` 门面的监听器，目标为 `webtree::dispatch`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDebugListener {
    id: u128,
}

impl LogDebugListener {
    pub fn new(id: u128) -> Self {
        Self { id }
    }
}

impl DebugListener for LogDebugListener {
    fn log_exception(&self, exception: &Exception) {
        match exception {
            Exception::Meta(_) | Exception::Response(_) => {
                info!(target: "webtree::dispatch", "[ID{}]分发中断：{}", self.id, exception)
            }
            _ => error!(target: "webtree::dispatch", "[ID{}]分发出错：{}", self.id, exception),
        }
    }

    fn log_dispatch(&self, component: &str, name: &str, next: &str) {
        debug!(
            target: "webtree::dispatch",
            "[ID{}]dispatch {} (name='{}', next='{}')", self.id, component, name, next
        );
    }

    fn log(&self, message: &str) {
        debug!(target: "webtree::dispatch", "[ID{}]{}", self.id, message);
    }

    fn decorate(&self, response: HttpResponse) -> HttpResponse {
        response
    }
}

/// 收集本次请求的调试信息，并附加到 HTML 响应的末尾
#[derive(Debug, Default)]
pub struct WebDebugListener {
    lines: RefCell<Vec<String>>,
}

impl WebDebugListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl DebugListener for WebDebugListener {
    fn log_exception(&self, exception: &Exception) {
        self.lines.borrow_mut().push(format!("exception: {}", exception));
    }

    fn log_dispatch(&self, component: &str, name: &str, next: &str) {
        self.lines
            .borrow_mut()
            .push(format!("dispatch: {} name='{}' next='{}'", component, name, next));
    }

    fn log(&self, message: &str) {
        self.lines.borrow_mut().push(format!("log: {}", message));
    }

    fn decorate(&self, mut response: HttpResponse) -> HttpResponse {
        let is_html = response
            .content_type()
            .map_or(false, |t| t.starts_with("text/html"));
        let lines = self.lines.borrow();
        if !is_html || lines.is_empty() {
            return response;
        }
        let panel = format!(
            "<pre class=\"webtree-debug\">{}</pre>",
            escape_html(&lines.join("\n"))
        );
        let text = response.text();
        let decorated = match text.rfind("</body>") {
            Some(index) => format!("{}{}{}", &text[..index], panel, &text[index..]),
            None => format!("{}{}", text, panel),
        };
        response.set_content(decorated);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::MetaResponse;

    #[test]
    fn test_multi_listener_fans_out() {
        let mut first = MockDebugListener::new();
        first.expect_log().withf(|m| m == "hello").times(1).return_const(());
        first
            .expect_log_dispatch()
            .withf(|c, n, x| c == "root" && n.is_empty() && x == "foo")
            .times(1)
            .return_const(());
        let mut second = MockDebugListener::new();
        second.expect_log().times(1).return_const(());
        second.expect_log_dispatch().times(1).return_const(());

        let mut multi = MultiDebugListener::new();
        multi.add(Rc::new(first));
        multi.add(Rc::new(second));
        multi.log("hello");
        multi.log_dispatch("root", "", "foo");
        assert_eq!(multi.len(), 2);
    }

    #[test]
    fn test_multi_listener_chains_decorate() {
        let mut first = MockDebugListener::new();
        first.expect_decorate().times(1).returning(|mut r| {
            r.set_header("x-first", "1").unwrap();
            r
        });
        let mut second = MockDebugListener::new();
        second.expect_decorate().times(1).returning(|mut r| {
            let seen = r.header("x-first").unwrap_or("").to_string();
            r.set_header("x-second", &seen).unwrap();
            r
        });

        let mut multi = MultiDebugListener::new();
        multi.add(Rc::new(first));
        multi.add(Rc::new(second));
        let response = multi.decorate(HttpResponse::new(200, ""));
        assert_eq!(response.header("x-second"), Some("1"));
    }

    #[test]
    fn test_web_listener_injects_panel() {
        let web = WebDebugListener::new();
        web.log_dispatch("root", "", "");
        web.log_exception(&Exception::Meta(MetaResponse::PageNotFound));
        web.log("a < b");
        let response = web.decorate(HttpResponse::new(200, "<html><body>x</body></html>"));
        let text = response.text();
        assert!(text.contains("webtree-debug"));
        assert!(text.contains("a &lt; b"));
        assert!(text.ends_with("</pre></body></html>"));
        assert_eq!(web.lines().len(), 3);
    }

    #[test]
    fn test_web_listener_skips_non_html() {
        let web = WebDebugListener::new();
        web.log("x");
        let mut response = HttpResponse::new(200, "{}");
        response.set_content_type("application/json");
        let response = web.decorate(response);
        assert_eq!(response.text(), "{}");
    }

    #[test]
    fn test_void_listener_passes_through() {
        let response = VoidDebugListener.decorate(HttpResponse::new(404, "gone"));
        assert_eq!(response.status(), 404);
        assert_eq!(response.text(), "gone");
    }
}
