// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求上下文模块
//!
//! `Request` 是组件树的顶层上下文，负责：
//! 1. 持有传输适配层给出的规范化请求数据（查询、表单、标头、Cookie、会话、上传文件）。
//! 2. 根据 `href_base` 计算出组件树需要逐段消费的 `subspace`。
//! 3. 按 `href_base` 生成站内 URL。
//! 4. 基于 `Accept` 头进行内容协商。

use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{
    adapter::{
        CookieAccess, DefaultCookieAccess, Globals, MemorySessionAccess, ServerInfo,
        SessionAccess, UploadedFile,
    },
    context::{build_query, Context, UrlParams},
    exception::ConfigError,
    identity::{DefaultIdentityLoader, Identity, IdentityLoader},
    negotiate::ContentTypeNegotiator,
};

lazy_static! {
    static ref HOSTNAME_PREFIX: Regex = Regex::new(r"^\w+://\w+\.").unwrap();
}

/// 校验 `href_base`：不得以斜杠结尾，也不得包含主机名
pub fn validate_href_base(href_base: &str) -> Result<(), ConfigError> {
    if href_base.ends_with('/') {
        return Err(ConfigError::TrailingSlash(href_base.to_string()));
    }
    if HOSTNAME_PREFIX.is_match(href_base) {
        return Err(ConfigError::EmbeddedHostname(href_base.to_string()));
    }
    Ok(())
}

pub struct Request {
    href_base: String,
    subspace: String,
    query: HashMap<String, String>,
    body: HashMap<String, String>,
    headers: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
    server: ServerInfo,
    cookie_access: Box<dyn CookieAccess>,
    session_access: Box<dyn SessionAccess>,
    identity_loader: Box<dyn IdentityLoader>,
    identity: OnceCell<Rc<dyn Identity>>,
    negotiator: ContentTypeNegotiator,
}

/// Builder for [`Request`].
pub struct RequestBuilder {
    globals: Globals,
    href_base: Option<String>,
    request_uri: Option<String>,
    identity_loader: Option<Box<dyn IdentityLoader>>,
    cookie_access: Option<Box<dyn CookieAccess>>,
    session_access: Option<Box<dyn SessionAccess>>,
}

impl RequestBuilder {
    pub fn href_base(mut self, href_base: impl Into<String>) -> Self {
        self.href_base = Some(href_base.into());
        self
    }

    /// 覆盖服务器元数据中的请求 URI
    pub fn request_uri(mut self, request_uri: impl Into<String>) -> Self {
        self.request_uri = Some(request_uri.into());
        self
    }

    pub fn identity_loader(mut self, loader: Box<dyn IdentityLoader>) -> Self {
        self.identity_loader = Some(loader);
        self
    }

    pub fn cookie_access(mut self, cookie_access: Box<dyn CookieAccess>) -> Self {
        self.cookie_access = Some(cookie_access);
        self
    }

    pub fn session_access(mut self, session_access: Box<dyn SessionAccess>) -> Self {
        self.session_access = Some(session_access);
        self
    }

    /// 构造请求上下文。`href_base` 不合法时立即返回致命错误。
    pub fn build(self) -> Result<Request, ConfigError> {
        if let Some(base) = &self.href_base {
            validate_href_base(base)?;
        }
        let globals = self.globals.lower_keys();
        let server = globals.server;

        // 未指定时取入口脚本所在目录
        let href_base = match self.href_base {
            Some(base) => base,
            None => match server.script_name.rsplit_once('/') {
                Some((dir, _)) => dir.to_string(),
                None => server.script_name.clone(),
            },
        };

        let request_uri = self.request_uri.unwrap_or_else(|| server.request_uri.clone());
        let path = request_uri.split('?').next().unwrap_or("");
        let subspace = path.strip_prefix(href_base.as_str()).unwrap_or(path).to_string();
        debug!("href_base='{}', subspace='{}'", href_base, subspace);

        let cookie_access = self.cookie_access.unwrap_or_else(|| {
            Box::new(DefaultCookieAccess::new(&server.server_name, globals.cookies))
        });
        let negotiator =
            ContentTypeNegotiator::new(globals.headers.get("accept").map_or("", String::as_str));

        Ok(Request {
            href_base,
            subspace,
            query: globals.query,
            body: globals.body,
            headers: globals.headers,
            files: globals.files,
            server,
            cookie_access,
            session_access: self
                .session_access
                .unwrap_or_else(|| Box::new(MemorySessionAccess::new())),
            identity_loader: self
                .identity_loader
                .unwrap_or_else(|| Box::new(DefaultIdentityLoader)),
            identity: OnceCell::new(),
            negotiator,
        })
    }
}

impl Request {
    pub fn builder(globals: Globals) -> RequestBuilder {
        RequestBuilder {
            globals,
            href_base: None,
            request_uri: None,
            identity_loader: None,
            cookie_access: None,
            session_access: None,
        }
    }

    pub fn href_base(&self) -> &str {
        &self.href_base
    }

    pub fn server(&self) -> &ServerInfo {
        &self.server
    }

    pub fn cookies(&self) -> &dyn CookieAccess {
        self.cookie_access.as_ref()
    }

    pub fn sessions(&self) -> &dyn SessionAccess {
        self.session_access.as_ref()
    }
}

impl Context for Request {
    fn query(&self, key: &str) -> Option<String> {
        self.query.get(&key.to_lowercase()).cloned()
    }

    fn body(&self, key: &str) -> Option<String> {
        self.body.get(&key.to_lowercase()).cloned()
    }

    fn header(&self, key: &str) -> Option<String> {
        self.headers.get(&key.to_lowercase()).cloned()
    }

    fn cookie(&self, key: &str) -> Option<String> {
        self.cookie_access.get(&key.to_lowercase())
    }

    fn session(&self, key: &str) -> Option<String> {
        self.session_access.get(&key.to_lowercase())
    }

    fn file(&self, key: &str) -> Option<UploadedFile> {
        self.files.get(&key.to_lowercase()).cloned()
    }

    fn method(&self) -> String {
        self.server.request_method.to_lowercase()
    }

    fn identity(&self) -> Rc<dyn Identity> {
        self.identity
            .get_or_init(|| self.identity_loader.load(self))
            .clone()
    }

    /// 在 `href_base` 之后拼接路径，消解 `..` 段，并附加非空的查询参数
    fn url(&self, path: &str, params: &UrlParams) -> String {
        let joined = format!("{}{}", self.href_base, path);
        let mut stack: Vec<&str> = Vec::new();
        for name in joined.split('/') {
            if name == ".." && !stack.is_empty() {
                stack.pop();
            } else {
                stack.push(name);
            }
        }
        let normalised = stack.join("/");
        let mut url = if normalised == self.href_base {
            format!("{}/", normalised)
        } else {
            normalised
        };
        let query = build_query(params);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    fn subspace(&self) -> String {
        self.subspace.clone()
    }

    fn negotiate_content_type(
        &self,
        candidates: &[&str],
        user_override: Option<&str>,
    ) -> Option<String> {
        self.negotiator.best_match(candidates, user_override)
    }
}
