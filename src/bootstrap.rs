// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 引导模块
//!
//! 一次请求的入口：从根组件开始分发，把成功的内容包装成 200 响应；
//! 遇到 `MetaResponse` 时换成对应的兜底组件重试；遇到终止响应则直接返回。
//! 无论分发结果如何，调试监听器的 `decorate` 都只在最后运行一次。

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use log::{error, info};

use crate::{
    component::Content,
    context::Context,
    creator::{ComponentCreator, DefaultComponentCreator, Registry},
    debug::{DebugListener, LogDebugListener, MultiDebugListener, WebDebugListener},
    document::Document,
    exception::Exception,
    param::{DEFAULT_CHARSET, DEFAULT_CONTENT_TYPE},
    response::HttpResponse,
};

pub struct Bootstrap<'r> {
    registry: &'r Registry,
    debug: bool,
    log_dispatch: bool,
    listeners: Vec<Rc<dyn DebugListener>>,
    id: u128,
}

impl<'r> Bootstrap<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            debug: false,
            log_dispatch: false,
            listeners: Vec::new(),
            id: 0,
        }
    }

    /// 在 HTML 响应末尾附加本次请求的调试信息
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// 把每一步分发写入日志
    pub fn log_dispatch(mut self, log_dispatch: bool) -> Self {
        self.log_dispatch = log_dispatch;
        self
    }

    pub fn listener(mut self, listener: Rc<dyn DebugListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// 日志中使用的请求编号
    pub fn id(mut self, id: u128) -> Self {
        self.id = id;
        self
    }

    /// 以 `root` 为根组件处理一次请求，总是返回一个完整的响应
    pub fn run(&self, root: &str, context: &dyn Context) -> HttpResponse {
        let mut debugger = MultiDebugListener::new();
        if self.debug {
            debugger.add(Rc::new(WebDebugListener::new()));
        }
        if self.log_dispatch {
            debugger.add(Rc::new(LogDebugListener::new(self.id)));
        }
        for listener in &self.listeners {
            debugger.add(listener.clone());
        }
        let debugger: Rc<dyn DebugListener> = Rc::new(debugger);

        let creator = DefaultComponentCreator::new(
            self.registry,
            Rc::new(RefCell::new(Document::new())),
            debugger.clone(),
        );
        let response = self.dispatch_root(root, context, &creator, &*debugger);
        debugger.decorate(response)
    }

    fn dispatch_root(
        &self,
        root: &str,
        context: &dyn Context,
        creator: &dyn ComponentCreator,
        debugger: &dyn DebugListener,
    ) -> HttpResponse {
        let mut name = root.to_string();
        let mut fallbacks: HashSet<&'static str> = HashSet::new();
        loop {
            let outcome = creator
                .create(&name, context, "")
                .and_then(|component| component.dispatch());
            match outcome {
                Ok(content) => return self.wrap(content),
                Err(Exception::Meta(meta)) => {
                    debugger.log_exception(&Exception::Meta(meta));
                    let fallback = meta.component_name();
                    if !fallbacks.insert(fallback) {
                        error!(
                            "[ID{}]兜底组件 '{}' 再次触发了 {:?}，终止分发",
                            self.id, fallback, meta
                        );
                        return HttpResponse::from_status_code(500, None);
                    }
                    info!("[ID{}]{}，切换到组件 '{}'", self.id, meta, fallback);
                    name = fallback.to_string();
                }
                Err(Exception::Response(response)) => {
                    debugger.log_exception(&Exception::Response(response.clone()));
                    return *response;
                }
                Err(ex) => {
                    debugger.log_exception(&ex);
                    error!("[ID{}]分发失败：{}", self.id, ex);
                    return HttpResponse::from_status_code(500, None);
                }
            }
        }
    }

    fn wrap(&self, content: Content) -> HttpResponse {
        let mut response = HttpResponse::new(200, content.body);
        response
            .set_content_type(
                content
                    .content_type
                    .as_deref()
                    .unwrap_or(DEFAULT_CONTENT_TYPE),
            )
            .set_charset(DEFAULT_CHARSET);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Globals;
    use crate::component::{Component, Dispatch, Resource};
    use crate::debug::MockDebugListener;
    use crate::exception::MetaResponse;
    use crate::request::Request;

    #[derive(Default)]
    struct Hello;

    impl Resource for Hello {
        fn get(&self, _cx: &Component<'_>) -> Dispatch {
            Ok("hello".into())
        }
    }

    #[derive(Default)]
    struct Forbidding;

    impl Resource for Forbidding {
        fn dispatch(&self, _cx: &Component<'_>) -> Dispatch {
            Err(MetaResponse::Forbidden.into())
        }
    }

    #[derive(Default)]
    struct Broken;

    impl Resource for Broken {
        fn dispatch(&self, _cx: &Component<'_>) -> Dispatch {
            Err(Exception::fault("database is down"))
        }
    }

    /// 一个本身又抛出 404 的 404 页面
    #[derive(Default)]
    struct Looping;

    impl Resource for Looping {
        fn dispatch(&self, _cx: &Component<'_>) -> Dispatch {
            Err(MetaResponse::PageNotFound.into())
        }
    }

    fn request(method: &str, uri: &str) -> Request {
        Request::builder(Globals::new(method, uri))
            .href_base("")
            .build()
            .unwrap()
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register_default::<Hello>("hello")
            .register_default::<Forbidding>("forbidding")
            .register_default::<Broken>("broken");
        registry
    }

    #[test]
    fn test_success_is_wrapped_in_200() {
        let registry = registry();
        let response = Bootstrap::new(&registry).run("hello", &request("get", "/"));
        assert_eq!(response.status(), 200);
        assert_eq!(response.text(), "hello");
        assert_eq!(response.content_type(), Some("text/html"));
        assert_eq!(response.charset(), "utf-8");
    }

    #[test]
    fn test_meta_response_switches_to_fallback() {
        let registry = registry();
        let mut listener = MockDebugListener::new();
        listener
            .expect_log_exception()
            .withf(|ex| matches!(ex, Exception::Meta(MetaResponse::Forbidden)))
            .times(1)
            .return_const(());
        listener
            .expect_log_exception()
            .withf(|ex| matches!(ex, Exception::Response(_)))
            .times(1)
            .return_const(());
        listener.expect_log_dispatch().return_const(());
        listener.expect_decorate().times(1).returning(|r| r);

        let response = Bootstrap::new(&registry)
            .listener(Rc::new(listener))
            .run("forbidding", &request("get", "/"));
        assert_eq!(response.status(), 403);
        assert!(response.text().contains("forbidden"));
    }

    #[test]
    fn test_method_not_allowed() {
        let registry = registry();
        let response = Bootstrap::new(&registry).run("hello", &request("trace", "/"));
        assert_eq!(response.status(), 405);
    }

    #[test]
    fn test_fault_becomes_500() {
        let registry = registry();
        let response = Bootstrap::new(&registry).run("broken", &request("get", "/"));
        assert_eq!(response.status(), 500);
        assert!(!response.text().contains("database"));
    }

    #[test]
    fn test_unknown_root_becomes_500() {
        let registry = registry();
        let response = Bootstrap::new(&registry).run("missing", &request("get", "/"));
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn test_loop_guard() {
        let mut registry = registry();
        registry.register_default::<Looping>("page_not_found");
        let response = Bootstrap::new(&registry).run("hello", &request("get", "/nowhere"));
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn test_decorate_runs_once() {
        let registry = registry();
        let mut listener = MockDebugListener::new();
        listener.expect_log_dispatch().return_const(());
        listener.expect_log_exception().never();
        listener
            .expect_decorate()
            .times(1)
            .returning(|mut r| {
                r.set_header("x-decorated", "yes").unwrap();
                r
            });
        let response = Bootstrap::new(&registry)
            .listener(Rc::new(listener))
            .run("hello", &request("get", "/"));
        assert_eq!(response.header("x-decorated"), Some("yes"));
    }

    #[test]
    fn test_dispatch_is_logged() {
        let registry = registry();
        let mut listener = MockDebugListener::new();
        listener
            .expect_log_dispatch()
            .withf(|component, name, next| component == "hello" && name.is_empty() && next.is_empty())
            .times(1)
            .return_const(());
        listener.expect_decorate().returning(|r| r);
        Bootstrap::new(&registry)
            .listener(Rc::new(listener))
            .run("hello", &request("get", "/"));
    }

    #[test]
    fn test_debug_panel_is_appended() {
        let registry = registry();
        let response = Bootstrap::new(&registry)
            .debug(true)
            .log_dispatch(true)
            .id(7)
            .run("hello", &request("get", "/"));
        assert!(response.text().starts_with("hello"));
        assert!(response.text().contains("webtree-debug"));
    }
}
