// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! 应用用户的身份表示，以及负责识别和加载身份的提供者接口。

use std::rc::Rc;

use crate::context::Context;

pub trait Identity {
    fn user(&self) -> String;
    fn anonymous(&self) -> bool;
}

/// 默认身份：匿名用户
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Identity for Anonymous {
    fn user(&self) -> String {
        String::new()
    }

    fn anonymous(&self) -> bool {
        true
    }
}

/// 已登录用户
#[derive(Debug, Clone)]
pub struct User {
    name: String,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Identity for User {
    fn user(&self) -> String {
        self.name.clone()
    }

    fn anonymous(&self) -> bool {
        false
    }
}

pub trait IdentityLoader {
    fn load(&self, context: &dyn Context) -> Rc<dyn Identity>;
}

/// 总是返回 [`Anonymous`] 的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIdentityLoader;

impl IdentityLoader for DefaultIdentityLoader {
    fn load(&self, _context: &dyn Context) -> Rc<dyn Identity> {
        Rc::new(Anonymous)
    }
}

/// 从会话中读取 `username` 的实现；会话中没有用户名时视为匿名
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionIdentityLoader;

impl IdentityLoader for SessionIdentityLoader {
    fn load(&self, context: &dyn Context) -> Rc<dyn Identity> {
        match context.session("username") {
            Some(name) if !name.is_empty() => Rc::new(User::new(&name)),
            _ => Rc::new(Anonymous),
        }
    }
}
