pub mod adapter;
pub mod bootstrap;
pub mod component;
pub mod config;
pub mod context;
pub mod creator;
pub mod debug;
pub mod document;
pub mod exception;
pub mod identity;
pub mod negotiate;
pub mod param;
pub mod request;
pub mod response;
pub mod template;
pub mod url_state;
pub mod util;

pub use adapter::Globals;
pub use bootstrap::Bootstrap;
pub use component::{Component, Content, Dispatch, Resource, Route};
pub use config::Config;
pub use context::{Context, UrlParams};
pub use creator::{ComponentCreator, DefaultComponentCreator, Registry};
pub use debug::DebugListener;
pub use exception::{ConfigError, Exception, MetaResponse};
pub use negotiate::ContentTypeNegotiator;
pub use param::{Renderer, Verb};
pub use request::Request;
pub use response::HttpResponse;
pub use template::{Template, TemplateHelpers};
pub use url_state::UrlState;
pub use util::HtmlBuilder;
