use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

mod dom;
mod html;
mod selector;
mod xpath;


pub use dom::NodeId;
pub(crate) use dom::*;
pub(crate) use html::*;
pub(crate) use xpath::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    XpathParse(String),
    ElementNotFound(String),
    Storage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::XpathParse(expr) => write!(f, "unsupported xpath: {expr}"),
            Self::ElementNotFound(target) => write!(f, "element not found: {target}"),
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl StdError for Error {}

/// Backslash-escapes both quote kinds for safe embedding in generated
/// selector or script strings.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}

/// How an element is addressed. Strings containing `//` are XPath
/// expressions, every other string is a CSS selector, and a [`NodeId`]
/// passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
    Node(NodeId),
}

impl Locator {
    pub fn parse(selector: &str) -> Self {
        if selector.contains("//") {
            Self::XPath(selector.to_string())
        } else {
            Self::Css(selector.to_string())
        }
    }

    pub(crate) fn escaped(self) -> Self {
        match self {
            Self::Css(selector) => Self::Css(escape(&selector)),
            Self::XPath(expr) => Self::XPath(escape(&expr)),
            Self::Node(node) => Self::Node(node),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Css(selector) => selector.clone(),
            Self::XPath(expr) => expr.clone(),
            Self::Node(node) => format!("node #{}", node.0),
        }
    }
}

impl From<&str> for Locator {
    fn from(selector: &str) -> Self {
        Self::parse(selector)
    }
}

impl From<String> for Locator {
    fn from(selector: String) -> Self {
        Self::parse(&selector)
    }
}

impl From<NodeId> for Locator {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

/// Which facet of an element an inspection returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttrQuery {
    Path,
    Value,
    #[default]
    Text,
}

impl AttrQuery {
    /// `"path"` and `"value"` select their facets; anything else is the
    /// trimmed-text default.
    pub fn parse(attr: &str) -> Self {
        match attr {
            "path" => Self::Path,
            "value" => Self::Value,
            _ => Self::Text,
        }
    }
}

/// What `set_value` writes: randomized text, a randomized integer, or a
/// literal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text,
    Int,
    Literal(String),
}

impl FieldValue {
    /// `"text"` and `"int"` request randomized values; anything else is
    /// assigned verbatim.
    pub fn parse(value: &str) -> Self {
        match value {
            "text" => Self::Text,
            "int" => Self::Int,
            other => Self::Literal(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Parallel, equally long sequences describing every match of a locator:
/// the XPath of each element and its zero-based position in match order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementList {
    pub xpaths: Vec<String>,
    pub indexes: Vec<usize>,
}

impl ElementList {
    pub fn len(&self) -> usize {
        self.xpaths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xpaths.is_empty()
    }
}

/// Mocked bounding rectangle, in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// One dispatched event, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub event_type: String,
    pub target: String,
}

#[derive(Debug, Default)]
struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<ListenerId>>>,
    hits: Vec<usize>,
}

impl ListenerStore {
    fn add(&mut self, node_id: NodeId, event: String) -> ListenerId {
        let id = ListenerId(self.hits.len());
        self.hits.push(0);
        self.map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default()
            .push(id);
        id
    }

    fn record(&mut self, node_id: NodeId, event: &str) {
        let Some(listeners) = self.map.get(&node_id).and_then(|events| events.get(event)) else {
            return;
        };
        for id in listeners.clone() {
            self.hits[id.0] += 1;
        }
    }

    fn hits(&self, id: ListenerId) -> usize {
        self.hits.get(id.0).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
struct LayoutState {
    viewport_width: f64,
    viewport_height: f64,
    rects: HashMap<NodeId, Rect>,
}

impl LayoutState {
    fn new() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            rects: HashMap::new(),
        }
    }
}

const DEFAULT_DOCUMENT_URL: &str = "http://localhost";
const RANDOM_TEXT_LEN: usize = 10;
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A loaded document plus the per-tab state the helpers touch: session
/// storage, layout mocks, listeners, and the deterministic RNG.
#[derive(Debug)]
pub struct Page {
    dom: Dom,
    listeners: ListenerStore,
    events: Vec<EventRecord>,
    storage: HashMap<String, String>,
    layout: LayoutState,
    document_url: String,
    rng_state: u64,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_url(DEFAULT_DOCUMENT_URL, html)
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        let dom = stacker::grow(32 * 1024 * 1024, || parse_html(html))?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            events: Vec::new(),
            storage: HashMap::new(),
            layout: LayoutState::new(),
            document_url: url.to_string(),
            rng_state: 0x9E37_79B9_7F4A_7C15,
        })
    }

    /// `scheme://host` of the document URL, port included.
    pub fn host(&self) -> String {
        let url = self.document_url.as_str();
        let Some((scheme, rest)) = url.split_once("://") else {
            return url.to_string();
        };
        let host = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        format!("{scheme}://{host}")
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.rng_state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.layout.viewport_width = width;
        self.layout.viewport_height = height;
    }

    pub fn set_element_rect<L: Into<Locator>>(&mut self, target: L, rect: Rect) -> Result<()> {
        let node = self.require(&target.into())?;
        self.layout.rects.insert(node, rect);
        Ok(())
    }

    pub fn element_rect(&self, node: NodeId) -> Rect {
        self.layout.rects.get(&node).copied().unwrap_or_default()
    }

    /// Partial-visibility test: any edge inside the viewport counts, not
    /// full containment.
    pub fn in_viewport(&self, node: NodeId) -> bool {
        let rect = self.element_rect(node);
        (rect.top >= 0.0 || rect.bottom >= 0.0)
            && (rect.left >= 0.0 || rect.right >= 0.0)
            && rect.bottom <= self.layout.viewport_height
            && rect.right <= self.layout.viewport_width
    }

    // ---- selector resolution ----------------------------------------------

    pub fn resolve(&self, target: &Locator) -> Result<Option<NodeId>> {
        match target {
            Locator::Node(node) => {
                Ok((self.dom.contains(*node) && self.dom.element(*node).is_some())
                    .then_some(*node))
            }
            Locator::XPath(expr) => Ok(evaluate_xpath(&self.dom, expr)?.into_iter().next()),
            Locator::Css(selector) => self.dom.query_selector(selector),
        }
    }

    pub fn resolve_all(&self, target: &Locator) -> Result<Vec<NodeId>> {
        match target {
            Locator::Node(node) => {
                Ok((self.dom.contains(*node) && self.dom.element(*node).is_some())
                    .then_some(*node)
                    .into_iter()
                    .collect())
            }
            Locator::XPath(expr) => evaluate_xpath(&self.dom, expr),
            Locator::Css(selector) => self.dom.query_selector_all(selector),
        }
    }

    fn require(&self, target: &Locator) -> Result<NodeId> {
        self.resolve(target)?
            .ok_or_else(|| Error::ElementNotFound(target.describe()))
    }

    // ---- inspection -------------------------------------------------------

    pub fn element<L: Into<Locator>>(&self, target: L) -> Result<Option<NodeId>> {
        self.resolve(&target.into())
    }

    pub fn elements<L: Into<Locator>>(&self, target: L) -> Result<ElementList> {
        let matches = self.resolve_all(&target.into())?;
        let mut out = ElementList::default();
        for (index, node) in matches.into_iter().enumerate() {
            out.xpaths.push(self.xpath_to(node));
            out.indexes.push(index);
        }
        Ok(out)
    }

    pub fn count<L: Into<Locator>>(&self, target: L) -> Result<usize> {
        Ok(self.resolve_all(&target.into())?.len())
    }

    pub fn element_attr<L: Into<Locator>>(&self, target: L, query: AttrQuery) -> Result<String> {
        let node = self.require(&target.into())?;
        Ok(self.node_attr(node, query))
    }

    /// Picks one of the element's options with a non-empty `value` uniformly
    /// at random and reads the requested facet from it.
    pub fn dropdown_option<L: Into<Locator>>(
        &mut self,
        target: L,
        query: AttrQuery,
    ) -> Result<Option<String>> {
        let Some(element) = self.resolve(&target.into())? else {
            return Ok(None);
        };

        let options = self
            .dom
            .query_selector_all_from(element, "option:not([value=''])")?;
        if options.is_empty() {
            return Ok(None);
        }

        let pick = options[self.random_index(options.len())];
        Ok(Some(self.node_attr(pick, query)))
    }

    pub fn xpath_to(&self, node: NodeId) -> String {
        xpath_to(&self.dom, node)
    }

    pub fn element_by_xpath(&self, expr: &str) -> Result<Option<NodeId>> {
        Ok(evaluate_xpath(&self.dom, expr)?.into_iter().next())
    }

    fn node_attr(&self, node: NodeId, query: AttrQuery) -> String {
        match query {
            AttrQuery::Path => self.xpath_to(node),
            AttrQuery::Value => self.dom.value(node),
            AttrQuery::Text => self.dom.text_content(node).trim().to_string(),
        }
    }

    // ---- interaction ------------------------------------------------------

    /// Clicks the first match if it is in the viewport; off-screen elements
    /// are left untouched.
    pub fn click<L: Into<Locator>>(&mut self, target: L) -> Result<()> {
        let node = self.require(&target.into())?;
        if !self.in_viewport(node) {
            return Ok(());
        }
        stacker::grow(32 * 1024 * 1024, || self.click_node(node))
    }

    /// Clicks every match. With `has_class` the class filter replaces the
    /// viewport gate entirely; without it only visible elements are clicked.
    pub fn click_all<L: Into<Locator>>(
        &mut self,
        target: L,
        has_class: Option<&str>,
    ) -> Result<()> {
        let matches = self.resolve_all(&target.into())?;
        for node in matches {
            let eligible = match has_class {
                Some(class_name) => self.dom.class_contains(node, class_name),
                None => self.in_viewport(node),
            };
            if eligible {
                stacker::grow(32 * 1024 * 1024, || self.click_node(node))?;
            }
        }
        Ok(())
    }

    fn click_node(&mut self, node: NodeId) -> Result<()> {
        if self.dom.disabled(node) {
            return Ok(());
        }

        self.dispatch_event(node, "click");

        if is_checkbox_input(&self.dom, node) {
            let current = self.dom.checked(node);
            self.dom.set_checked(node, !current);
            self.dispatch_event(node, "input");
            self.dispatch_event(node, "change");
        } else if is_radio_input(&self.dom, node) && !self.dom.checked(node) {
            self.dom.set_checked(node, true);
            self.dispatch_event(node, "input");
            self.dispatch_event(node, "change");
        }

        Ok(())
    }

    /// Assigns the value, then dispatches `change` and `input` in that order
    /// so frameworks listening to either observe the update.
    pub fn set_value<L: Into<Locator>>(&mut self, target: L, value: FieldValue) -> Result<()> {
        let node = self.require(&target.into())?;

        let assigned = match value {
            FieldValue::Text => self.random_text(RANDOM_TEXT_LEN),
            FieldValue::Int => self.random_number().to_string(),
            FieldValue::Literal(literal) => literal,
        };
        self.dom.set_value(node, &assigned);

        self.dispatch_event(node, "change");
        self.dispatch_event(node, "input");
        Ok(())
    }

    // ---- events -----------------------------------------------------------

    pub fn add_listener<L: Into<Locator>>(&mut self, target: L, event: &str) -> Result<ListenerId> {
        let node = self.require(&target.into())?;
        Ok(self.listeners.add(node, event.to_string()))
    }

    pub fn listener_hits(&self, id: ListenerId) -> usize {
        self.listeners.hits(id)
    }

    /// Drains the dispatched-event log, oldest first.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    // Target first, then ancestors: the bubble order page scripts would see.
    fn dispatch_event(&mut self, target: NodeId, event_type: &str) {
        let record = EventRecord {
            event_type: event_type.to_string(),
            target: self.xpath_to(target),
        };
        self.events.push(record);

        let mut cursor = Some(target);
        while let Some(node) = cursor {
            self.listeners.record(node, event_type);
            cursor = self.dom.parent(node);
        }
    }

    // ---- randomization ----------------------------------------------------

    pub fn random_number(&mut self) -> i64 {
        self.random_range(2000, 3000)
    }

    pub fn random_zip(&mut self) -> i64 {
        self.random_range(30000, 38888)
    }

    pub fn random_text(&mut self, length: usize) -> String {
        let mut out = String::with_capacity(length);
        for _ in 0..length {
            let ix = self.random_index(ALPHANUMERIC.len());
            out.push(ALPHANUMERIC[ix] as char);
        }
        out
    }

    fn random_range(&mut self, low: i64, high: i64) -> i64 {
        let span = (high - low + 1) as f64;
        low + (self.next_random_f64() * span).floor() as i64
    }

    fn random_index(&mut self, len: usize) -> usize {
        (self.next_random_f64() * len as f64).floor() as usize
    }

    fn next_random_f64(&mut self) -> f64 {
        // xorshift64*: simple deterministic PRNG for test data.
        let mut x = self.rng_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.rng_state = if x == 0 { 0xA5A5_A5A5_A5A5_A5A5 } else { x };
        let out = x.wrapping_mul(0x2545_F491_4F6C_DD1D);
        // Convert top 53 bits to [0.0, 1.0).
        let mantissa = out >> 11;
        (mantissa as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    // ---- session storage --------------------------------------------------

    /// JSON-serializes `item` under `id`, overwriting any prior value.
    pub fn store<T: Serialize>(&mut self, id: &str, item: &T) -> Result<()> {
        let encoded =
            serde_json::to_string(item).map_err(|err| Error::Storage(err.to_string()))?;
        self.storage.insert(id.to_string(), encoded);
        Ok(())
    }

    /// Reads back a stored value; an absent key is `None`, an undecodable
    /// value is an error.
    pub fn fetch<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        let Some(raw) = self.storage.get(id) else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|err| Error::Storage(err.to_string()))
    }

    // ---- chaining ---------------------------------------------------------

    /// Binds a locator for chained calls. String selectors are escaped
    /// before parsing, node handles pass through untouched.
    pub fn select<L: Into<Locator>>(&mut self, target: L) -> Selection<'_> {
        Selection {
            target: target.into().escaped(),
            page: self,
        }
    }
}

/// A locator bound to its page. The locator is fixed at creation; chained
/// calls never repeat it.
#[derive(Debug)]
pub struct Selection<'p> {
    page: &'p mut Page,
    target: Locator,
}

impl Selection<'_> {
    pub fn locator(&self) -> &Locator {
        &self.target
    }

    pub fn element(&self) -> Result<Option<NodeId>> {
        self.page.resolve(&self.target)
    }

    pub fn elements(&self) -> Result<ElementList> {
        self.page.elements(self.target.clone())
    }

    pub fn count(&self) -> Result<usize> {
        self.page.count(self.target.clone())
    }

    pub fn attr(&self, query: AttrQuery) -> Result<String> {
        self.page.element_attr(self.target.clone(), query)
    }

    pub fn dropdown_option(&mut self, query: AttrQuery) -> Result<Option<String>> {
        self.page.dropdown_option(self.target.clone(), query)
    }

    pub fn click(self) -> Result<Self> {
        self.page.click(self.target.clone())?;
        Ok(self)
    }

    pub fn click_all(self, has_class: Option<&str>) -> Result<Self> {
        self.page.click_all(self.target.clone(), has_class)?;
        Ok(self)
    }

    pub fn set_value<V: Into<FieldValue>>(self, value: V) -> Result<Self> {
        self.page.set_value(self.target.clone(), value.into())?;
        Ok(self)
    }
}
