#![allow(dead_code)]

use async_trait::async_trait;
use cert_crawl::domain::model::Link;
use cert_crawl::domain::ports::Browser;
use cert_crawl::{CrawlError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory browser: each URL maps to the links its page shows. Unknown URLs
/// fail to navigate. Selectors are ignored.
#[derive(Clone, Default)]
pub struct ScriptedBrowser {
    pages: HashMap<String, Vec<Link>>,
    current: Option<String>,
    pub visited: Arc<Mutex<Vec<String>>>,
    pub quits: Arc<AtomicUsize>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, links: Vec<Link>) -> Self {
        self.pages.insert(url.to_string(), links);
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn quit_count(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        if !self.pages.contains_key(url) {
            self.current = None;
            return Err(CrawlError::NavigationError {
                url: url.to_string(),
                message: "connection refused".to_string(),
            });
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn find_elements(&mut self, _selector: &str) -> Result<Vec<Link>> {
        let url = self.current.as_ref().ok_or_else(|| CrawlError::BrowserError {
            message: "no page loaded".to_string(),
        })?;
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }

    async fn sleep(&mut self, _duration: Duration) {}

    async fn quit(&mut self) -> Result<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn link(text: &str, href: &str) -> Link {
    Link::new(text, Some(href))
}

/// One-page letter-size PDF that only draws a border.
pub fn blank_template() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let border = Content {
        operations: vec![
            Operation::new(
                "re",
                vec![
                    Object::Integer(36),
                    Object::Integer(36),
                    Object::Integer(540),
                    Object::Integer(720),
                ],
            ),
            Operation::new("S", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), border.encode().unwrap()));
    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
        ("Resources", Object::Dictionary(Dictionary::new())),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
    ]));
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(1)),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
