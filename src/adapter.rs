// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 传输适配模块
//!
//! 把传输层的原始数据整理成分发核心需要的规范化视图：
//! 1. `Globals`：查询参数、表单参数、请求头、Cookie、上传文件与服务器元数据，所有键均为小写。
//! 2. `CookieAccess` / `SessionAccess`：Cookie 与会话存储的访问接口及默认实现。
//! 3. `Globals::try_from`：从 TCP 流读取的原始 HTTP/1.1 字节中解析出上述数据。

use std::cell::RefCell;
use std::collections::HashMap;

use log::error;

use crate::{exception::RequestError, param::CRLF};

/// 服务器元数据
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// 请求方法（小写）
    pub request_method: String,
    /// 入口脚本路径，用于推导默认的 `href_base`
    pub script_name: String,
    /// 完整的请求 URI（包含查询字符串）
    pub request_uri: String,
    pub server_name: String,
}

/// 一个上传的文件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedFile {
    pub key: String,
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub tmp_name: String,
}

/// 规范化后的请求数据快照
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub query: HashMap<String, String>,
    pub body: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
    pub server: ServerInfo,
}

impl Globals {
    /// 仅包含方法与 URI 的最小快照，常用于测试和内部转发
    pub fn new(method: &str, request_uri: &str) -> Self {
        Self {
            server: ServerInfo {
                request_method: method.to_lowercase(),
                script_name: "/".to_string(),
                request_uri: request_uri.to_string(),
                server_name: "localhost".to_string(),
            },
            ..Default::default()
        }
    }

    /// 把所有映射的键转换为小写
    pub fn lower_keys(mut self) -> Self {
        fn lower<V>(map: HashMap<String, V>) -> HashMap<String, V> {
            map.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
        }
        self.query = lower(self.query);
        self.body = lower(self.body);
        self.headers = lower(self.headers);
        self.cookies = lower(self.cookies);
        self.files = lower(self.files);
        self.server.request_method = self.server.request_method.to_lowercase();
        self
    }

    /// 从原始字节缓冲区构建请求数据快照。
    ///
    /// # 逻辑步骤
    /// 1. 验证编码：确保请求数据是合法的 UTF-8 字符串。
    /// 2. 解析请求行：提取方法与 URI，URI 中的查询字符串被解析为查询参数。
    /// 3. 迭代解析标头，其中 `Cookie` 与 `Host` 会被单独处理。
    /// 4. 对 `application/x-www-form-urlencoded` 类型的请求体解析表单参数。
    pub fn try_from(buffer: &[u8], id: u128) -> Result<Self, RequestError> {
        let request_string = match std::str::from_utf8(buffer) {
            Ok(string) => string.trim_end_matches('\0'),
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(RequestError::RequestIsNotUtf8);
            }
        };

        let (head, body) = request_string
            .split_once("\r\n\r\n")
            .unwrap_or((request_string, ""));
        let mut lines = head.split(CRLF);

        // 请求行 (e.g., "GET /index.html?x=1 HTTP/1.1")
        let request_line = lines.next().unwrap_or("");
        let parts: Vec<&str> = request_line.split(' ').collect();
        if parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_line);
            return Err(RequestError::MalformedRequestLine);
        }
        let method = parts[0].to_lowercase();
        let request_uri = parts[1].to_string();

        let mut globals = Globals::new(&method, &request_uri);
        if let Some((_, query)) = request_uri.split_once('?') {
            globals.query = parse_urlencoded(query);
        }

        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                globals
                    .headers
                    .insert(name.trim().to_lowercase(), value.trim().to_string());
            }
        }

        if let Some(cookie) = globals.headers.get("cookie") {
            globals.cookies = cookie
                .split(';')
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect();
        }
        if let Some(host) = globals.headers.get("host") {
            let name = host.split(':').next().unwrap_or(host);
            globals.server.server_name = name.to_string();
        }
        let is_form = globals
            .headers
            .get("content-type")
            .map_or(false, |t| t.starts_with("application/x-www-form-urlencoded"));
        if is_form {
            globals.body = parse_urlencoded(body);
        }

        Ok(globals.lower_keys())
    }
}

fn parse_urlencoded(input: &str) -> HashMap<String, String> {
    form_urlencoded::parse(input.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Cookie 存储的访问接口
pub trait CookieAccess {
    fn domain(&self) -> &str;
    fn get(&self, key: &str) -> Option<String>;
    /// 值为 `None` 表示删除该 Cookie
    fn set(&self, key: &str, value: Option<&str>);
    fn all(&self) -> HashMap<String, String>;
}

/// 基于请求中 Cookie 头的默认实现
pub struct DefaultCookieAccess {
    domain: String,
    cookies: RefCell<HashMap<String, String>>,
}

impl DefaultCookieAccess {
    pub fn new(domain: &str, cookies: HashMap<String, String>) -> Self {
        Self {
            domain: domain.to_string(),
            cookies: RefCell::new(cookies),
        }
    }
}

impl CookieAccess for DefaultCookieAccess {
    fn domain(&self) -> &str {
        &self.domain
    }

    fn get(&self, key: &str) -> Option<String> {
        self.cookies.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) {
        let mut cookies = self.cookies.borrow_mut();
        match value {
            Some(v) => {
                cookies.insert(key.to_string(), v.to_string());
            }
            None => {
                cookies.remove(key);
            }
        }
    }

    fn all(&self) -> HashMap<String, String> {
        self.cookies.borrow().clone()
    }
}

/// 会话存储的访问接口
pub trait SessionAccess {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: Option<&str>);
    fn all(&self) -> HashMap<String, String>;
}

/// 仅在一次请求内有效的内存会话
#[derive(Default)]
pub struct MemorySessionAccess {
    values: RefCell<HashMap<String, String>>,
}

impl MemorySessionAccess {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionAccess for MemorySessionAccess {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Option<&str>) {
        let mut values = self.values.borrow_mut();
        match value {
            Some(v) => {
                values.insert(key.to_string(), v.to_string());
            }
            None => {
                values.remove(key);
            }
        }
    }

    fn all(&self) -> HashMap<String, String> {
        self.values.borrow().clone()
    }
}
