// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 组件注册与创建
//!
//! `Registry` 把路由名映射到资源工厂，进程内共享、只读；
//! `ComponentCreator` 则在一次请求内为每个路径段创建完全装配好的 `Component`。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use log::debug;

use crate::{
    component::{Component, Dispatch, Resource},
    context::Context,
    debug::DebugListener,
    document::Document,
    exception::{Exception, MetaResponse},
    response::HttpResponse,
};

pub type ResourceFactory = Arc<dyn Fn() -> Box<dyn Resource> + Send + Sync>;

/// 路由名 -> 资源工厂。新建的注册表已包含四个兜底组件。
pub struct Registry {
    factories: HashMap<String, ResourceFactory>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        for meta in [
            MetaResponse::Forbidden,
            MetaResponse::PageNotFound,
            MetaResponse::MethodNotAllowed,
            MetaResponse::NotImplemented,
        ] {
            registry.register(meta.component_name(), move || Box::new(Fallback(meta)));
        }
        registry
    }

    /// 注册（或覆盖）一个组件
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Resource> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
        self
    }

    pub fn register_default<T>(&mut self, name: &str) -> &mut Self
    where
        T: Resource + Default + 'static,
    {
        self.register(name, || Box::new(T::default()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Resource>> {
        self.factories.get(name).map(|factory| factory())
    }
}

/// 兜底组件：直接以对应状态码终止分发，保证引导循环不会再次重试
struct Fallback(MetaResponse);

impl Resource for Fallback {
    fn dispatch(&self, _cx: &Component<'_>) -> Dispatch {
        Err(HttpResponse::from_status_code(self.0.status(), Some(self.0.message())).into())
    }
}

pub trait ComponentCreator {
    /// 创建名为 `name` 的组件，父上下文为 `context`，查询参数带 `namespace` 前缀
    fn create<'c>(
        &'c self,
        name: &str,
        context: &'c dyn Context,
        namespace: &str,
    ) -> Result<Component<'c>, Exception>;

    /// 本次请求共享的文档
    fn document(&self) -> Rc<RefCell<Document>>;

    fn debugger(&self) -> Rc<dyn DebugListener>;
}

pub struct DefaultComponentCreator<'r> {
    registry: &'r Registry,
    document: Rc<RefCell<Document>>,
    debugger: Rc<dyn DebugListener>,
}

impl<'r> DefaultComponentCreator<'r> {
    pub fn new(
        registry: &'r Registry,
        document: Rc<RefCell<Document>>,
        debugger: Rc<dyn DebugListener>,
    ) -> Self {
        Self {
            registry,
            document,
            debugger,
        }
    }
}

impl ComponentCreator for DefaultComponentCreator<'_> {
    fn create<'c>(
        &'c self,
        name: &str,
        context: &'c dyn Context,
        namespace: &str,
    ) -> Result<Component<'c>, Exception> {
        let resource = self
            .registry
            .instantiate(name)
            .ok_or_else(|| Exception::UnknownComponent(name.to_string()))?;
        debug!("创建组件 '{}'（命名空间 '{}'）", name, namespace);
        Ok(Component::new(name, resource, context, namespace, self))
    }

    fn document(&self) -> Rc<RefCell<Document>> {
        self.document.clone()
    }

    fn debugger(&self) -> Rc<dyn DebugListener> {
        self.debugger.clone()
    }
}
