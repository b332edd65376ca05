// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 组件模块
//!
//! 组件树的节点。每个 `Component` 在构造时从父上下文的 `subspace` 中消费一个路径段，
//! 然后要么把控制权转交给子组件（`forward`），要么在最后一段上执行 HTTP 动词。
//!
//! 具体的业务行为由 [`Resource`] 提供：`map` 决定下一段路由到哪个组件，
//! `renders` / `render` 声明并实现 GET 的各种表示形式，其余动词可以按需覆盖。
//! 所有中断（404、405、重定向……）都以 `Err(Exception)` 的形式原样向上传播到引导层。

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    adapter::UploadedFile,
    context::{Context, UrlParams},
    creator::ComponentCreator,
    debug::DebugListener,
    document::Document,
    exception::{Exception, MetaResponse},
    identity::Identity,
    param::{Renderer, Verb, RENDERERS},
    url_state::UrlState,
};

lazy_static! {
    static ref SEGMENT: Regex = Regex::new(r"^([^/]+)").unwrap();
    static ref SEGMENT_PREFIX: Regex = Regex::new(r"^[^/]*/?").unwrap();
    static ref NEXT: Regex = Regex::new(r"^[^/;]+").unwrap();
    static ref SUBTYPE: Regex = Regex::new(r";(.+)$").unwrap();
    static ref SUBTYPE_SUFFIX: Regex = Regex::new(r";.*$").unwrap();
    static ref SUBTYPE_PATH: Regex = Regex::new(r"^;([^/;]*)").unwrap();
}

/// 分发的结果：成功时是内容，失败时是需要向上传播的中断
pub type Dispatch<T = Content> = Result<T, Exception>;

/// 组件返回的响应体，以及（可选的）协商出的内容类型
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Content {
    pub body: String,
    pub content_type: Option<String>,
}

impl Content {
    pub fn new(body: impl Into<String>, content_type: &str) -> Self {
        Self {
            body: body.into(),
            content_type: Some(content_type.to_string()),
        }
    }
}

impl From<String> for Content {
    fn from(body: String) -> Self {
        Self {
            body,
            content_type: None,
        }
    }
}

impl From<&str> for Content {
    fn from(body: &str) -> Self {
        Self::from(body.to_string())
    }
}

/// 路由目标：注册表中的组件名，以及子组件查询参数使用的命名空间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub namespace: String,
}

impl Route {
    pub fn new(name: &str) -> Self {
        Self::namespaced(name, "")
    }

    pub fn namespaced(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

impl From<&str> for Route {
    fn from(name: &str) -> Self {
        Route::new(name)
    }
}

/// 组件的业务行为。除了 `renders` / `render` 之外，默认实现都回到 `Component` 的标准流程。
pub trait Resource {
    /// 构造组件时调用一次，用于登记 URL 状态及其默认值
    fn url_init(&self, _state: &mut UrlState<'_>) {}

    /// 把下一个路径段映射到子组件；返回 `None` 表示 404
    fn map(&self, _name: &str) -> Option<Route> {
        None
    }

    /// 该组件实现了哪些 GET 表示形式
    fn renders(&self) -> &[Renderer] {
        &[]
    }

    fn render(&self, _cx: &Component<'_>, _renderer: Renderer) -> Dispatch<String> {
        Err(MetaResponse::NotImplemented.into())
    }

    fn dispatch(&self, cx: &Component<'_>) -> Dispatch {
        cx.descend()
    }

    fn execute(&self, cx: &Component<'_>) -> Dispatch {
        cx.execute()
    }

    fn get(&self, cx: &Component<'_>) -> Dispatch {
        cx.render_negotiated()
    }

    fn post(&self, _cx: &Component<'_>) -> Dispatch {
        Err(MetaResponse::NotImplemented.into())
    }

    fn head(&self, _cx: &Component<'_>) -> Dispatch {
        Err(MetaResponse::NotImplemented.into())
    }

    fn put(&self, _cx: &Component<'_>) -> Dispatch {
        Err(MetaResponse::NotImplemented.into())
    }

    fn delete(&self, _cx: &Component<'_>) -> Dispatch {
        Err(MetaResponse::NotImplemented.into())
    }
}

pub struct Component<'a> {
    route: String,
    resource: Box<dyn Resource>,
    context: &'a dyn Context,
    url_state: RefCell<UrlState<'a>>,
    document: Rc<RefCell<Document>>,
    creator: &'a dyn ComponentCreator,
    debugger: Rc<dyn DebugListener>,
    segment: Option<String>,
    subspace: String,
}

impl<'a> Component<'a> {
    /// 所有依赖在这里一次性注入，此后不可替换。
    /// 路径段在构造时从 `context.subspace()` 中计算出来，之后不再变化。
    pub fn new(
        route: &str,
        resource: Box<dyn Resource>,
        context: &'a dyn Context,
        namespace: &str,
        creator: &'a dyn ComponentCreator,
    ) -> Self {
        let parent_subspace = context.subspace();
        let segment = SEGMENT
            .captures(&parent_subspace)
            .map(|caps| caps[1].to_string());
        let subspace = SEGMENT_PREFIX.replace(&parent_subspace, "").into_owned();

        let mut url_state = UrlState::new(context, namespace);
        resource.url_init(&mut url_state);

        Self {
            route: route.to_string(),
            resource,
            context,
            url_state: RefCell::new(url_state),
            document: creator.document(),
            creator,
            debugger: creator.debugger(),
            segment,
            subspace,
        }
    }

    /// 创建该组件时使用的注册名
    pub fn route(&self) -> &str {
        &self.route
    }

    /// 当前路径段，包含 `;subtype` 后缀。根组件没有路径段。
    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    /// 去掉 `;subtype` 后缀的路径段
    pub fn name(&self) -> String {
        self.segment
            .as_deref()
            .map(|s| SUBTYPE_SUFFIX.replace(s, "").into_owned())
            .unwrap_or_default()
    }

    pub fn subtype(&self) -> Option<String> {
        self.segment
            .as_deref()
            .and_then(|s| SUBTYPE.captures(s))
            .map(|caps| caps[1].to_string())
    }

    /// 剩余路径中的下一个段名（不含子类型）；为空时由本组件执行请求
    pub fn next(&self) -> String {
        NEXT.find(&self.subspace)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn state(&self) -> Ref<'_, UrlState<'a>> {
        self.url_state.borrow()
    }

    /// 调用 `url()` 之前必须先释放这里返回的引用
    pub fn state_mut(&self) -> RefMut<'_, UrlState<'a>> {
        self.url_state.borrow_mut()
    }

    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    pub fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    pub fn debug(&self, message: &str) {
        self.debugger.log(message);
    }

    pub fn dispatch(&self) -> Dispatch {
        self.resource.dispatch(self)
    }

    /// 实例化子组件，并立即把分发交给它
    pub fn forward(&self, route: impl Into<Route>) -> Dispatch {
        let route = route.into();
        let child = self.creator.create(&route.name, self, &route.namespace)?;
        child.dispatch()
    }

    /// 标准分发：还有下一段就路由过去，否则执行本组件
    pub fn descend(&self) -> Dispatch {
        let next = self.next();
        self.debugger.log_dispatch(&self.route, &self.name(), &next);
        if next.is_empty() {
            return self.resource.execute(self);
        }
        match self.resource.map(&next) {
            Some(route) => self.forward(route),
            None => Err(MetaResponse::PageNotFound.into()),
        }
    }

    /// 按 HTTP 方法调用对应的动词处理器
    pub fn execute(&self) -> Dispatch {
        let verb =
            Verb::parse(&self.method()).ok_or(Exception::Meta(MetaResponse::MethodNotAllowed))?;
        match verb {
            Verb::Head => self.resource.head(self),
            Verb::Get => self.resource.get(self),
            Verb::Post => self.resource.post(self),
            Verb::Put => self.resource.put(self),
            Verb::Delete => self.resource.delete(self),
        }
    }

    /// 标准 GET：在已实现的表示形式中协商，`;subtype` 后缀优先于 `Accept` 头
    pub fn render_negotiated(&self) -> Dispatch {
        let implemented = self.resource.renders();
        let accept: Vec<(&'static str, Renderer)> = RENDERERS
            .iter()
            .filter(|(_, renderer)| implemented.contains(renderer))
            .flat_map(|(types, renderer)| types.iter().map(move |t| (*t, *renderer)))
            .collect();
        let candidates: Vec<&str> = accept.iter().map(|(t, _)| *t).collect();

        let subtype = self.subtype();
        let renderer = self
            .negotiate_content_type(&candidates, subtype.as_deref())
            .and_then(|chosen| {
                accept
                    .iter()
                    .find(|(t, _)| *t == chosen)
                    .map(|(_, renderer)| *renderer)
            });
        match renderer {
            Some(renderer) => {
                let body = self.resource.render(self, renderer)?;
                Ok(Content::new(body, renderer.mime()))
            }
            None => Err(MetaResponse::NotImplemented.into()),
        }
    }
}

impl Context for Component<'_> {
    /// 经由 URL 状态读取：本地跟踪的值优先
    fn query(&self, key: &str) -> Option<String> {
        self.url_state.borrow().get(key)
    }

    fn body(&self, key: &str) -> Option<String> {
        self.context.body(key)
    }

    fn header(&self, key: &str) -> Option<String> {
        self.context.header(key)
    }

    fn cookie(&self, key: &str) -> Option<String> {
        self.context.cookie(key)
    }

    fn session(&self, key: &str) -> Option<String> {
        self.context.session(key)
    }

    fn file(&self, key: &str) -> Option<UploadedFile> {
        self.context.file(key)
    }

    fn method(&self) -> String {
        self.context.method()
    }

    fn identity(&self) -> Rc<dyn Identity> {
        self.context.identity()
    }

    fn url(&self, path: &str, params: &UrlParams) -> String {
        let segment = self.segment.as_deref().unwrap_or("");
        let target = if path.is_empty() {
            segment.to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else if path == ";" {
            self.name()
        } else if let Some(caps) = SUBTYPE_PATH.captures(path) {
            format!("{};{}", self.name(), &caps[1])
        } else {
            format!("{}/{}", segment, path)
        };
        let merged = self.url_state.borrow().merge(params);
        self.context.url(&target, &merged)
    }

    fn subspace(&self) -> String {
        self.subspace.clone()
    }

    fn negotiate_content_type(
        &self,
        candidates: &[&str],
        user_override: Option<&str>,
    ) -> Option<String> {
        self.context.negotiate_content_type(candidates, user_override)
    }
}
