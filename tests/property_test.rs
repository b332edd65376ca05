use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;

use webtree::{
    debug::VoidDebugListener, document::Document, url_state::UrlState, ComponentCreator,
    ContentTypeNegotiator, Context, DefaultComponentCreator, Globals, Registry, Request,
    Resource, Route, UrlParams,
};

fn media_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("*".to_string()),
        "[a-z]{1,6}".prop_map(|s| s),
    ]
    .prop_flat_map(|major| {
        prop_oneof![Just("*".to_string()), "[a-z+]{1,6}"]
            .prop_map(move |minor| format!("{}/{}", major, minor))
    })
}

fn accept_header() -> impl Strategy<Value = String> {
    prop::collection::vec((media_type(), prop::option::of(0u8..=10)), 0..5).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(t, q)| match q {
                Some(q) => format!("{};q={}", t, f32::from(q) / 10.0),
                None => t,
            })
            .collect::<Vec<_>>()
            .join(", ")
    })
}

#[derive(Default)]
struct Node;

impl Resource for Node {
    fn map(&self, _name: &str) -> Option<Route> {
        Some("node".into())
    }
}

fn request(uri: &str, query: &[(String, String)]) -> Request {
    let mut globals = Globals::new("get", uri);
    globals.query = query.iter().cloned().collect();
    Request::builder(globals).href_base("").build().unwrap()
}

proptest! {
    #[test]
    fn negotiated_type_is_a_candidate(
        accept in accept_header(),
        candidates in prop::collection::vec(media_type(), 0..6),
    ) {
        let negotiator = ContentTypeNegotiator::new(&accept);
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        if let Some(chosen) = negotiator.best_match(&refs, None) {
            prop_assert!(candidates.contains(&chosen));
        }
    }

    #[test]
    fn wildcard_accept_takes_first_candidate(
        candidates in prop::collection::vec(media_type(), 1..6),
    ) {
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        let negotiator = ContentTypeNegotiator::new("*/*");
        prop_assert_eq!(negotiator.best_match(&refs, None), Some(candidates[0].clone()));
    }

    #[test]
    fn no_preference_takes_first_candidate(
        candidates in prop::collection::vec("[ -~]{0,12}", 1..6),
    ) {
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        let negotiator = ContentTypeNegotiator::new("");
        prop_assert_eq!(negotiator.best_match(&refs, None), Some(candidates[0].clone()));
    }

    #[test]
    fn merge_never_emits_defaults(
        defaults in prop::collection::btree_map("[a-z]{1,4}", "[a-z0-9]{0,3}", 0..5),
        overrides in prop::collection::btree_map("[a-z]{1,4}", "[a-z0-9]{0,3}", 0..5),
        query in prop::collection::vec(("[a-z]{1,4}", "[a-z0-9]{0,3}"), 0..5),
    ) {
        let req = request("/", &query);
        let mut state = UrlState::new(&req, "ns_");
        for (key, default) in &defaults {
            state.init(key, default);
        }
        let extra: UrlParams = overrides
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect();
        let merged = state.merge(&extra);
        for (key, default) in &defaults {
            let value = merged.get(&format!("ns_{}", key)).cloned().flatten();
            prop_assert_ne!(value, Some(default.clone()));
        }
    }

    #[test]
    fn relative_url_extends_own_url(
        segments in prop::collection::vec("[a-z]{1,5}", 1..4),
        path in "[a-z][a-z/]{0,8}",
    ) {
        let uri = format!("/{}", segments.join("/"));
        let req = request(&uri, &[]);
        let registry = {
            let mut registry = Registry::new();
            registry.register_default::<Node>("node");
            registry
        };
        let creator = DefaultComponentCreator::new(
            &registry,
            Rc::new(RefCell::new(Document::new())),
            Rc::new(VoidDebugListener),
        );
        let root = creator.create("node", &req, "").unwrap();
        let child = creator.create("node", &root, "").unwrap();
        let own = child.url("", &UrlParams::new());
        let relative = child.url(&path, &UrlParams::new());
        prop_assert!(relative.starts_with(&own));
        prop_assert!(relative.len() > own.len());
    }
}
