// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

/// HTML 文档的属性容器，在一次请求的所有组件之间共享。
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    title: String,
    scripts: Vec<String>,
    styles: Vec<String>,
    onload: Vec<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            title: "No Title".to_string(),
            scripts: Vec::new(),
            styles: Vec::new(),
            onload: Vec::new(),
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn add_script(&mut self, script: &str) {
        self.scripts.push(script.to_string());
    }

    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    pub fn add_style(&mut self, style: &str) {
        self.styles.push(style.to_string());
    }

    pub fn onload(&self) -> &[String] {
        &self.onload
    }

    pub fn add_onload(&mut self, onload: &str) {
        self.onload.push(onload.to_string());
    }
}
