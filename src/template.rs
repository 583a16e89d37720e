//! Template engine rendering the table markup.
//!
//! Workflow:
//! 1. `render_template` loads the named template, from `TemplateSettings::dir` when the
//!    file exists there, else from the templates bundled with the crate.
//! 2. `tokenize_template` splits content into Text, Variable, and Tag tokens.
//! 3. `parse_tokens` and `parse_nodes` build an AST of `Node`.
//! 4. `{% include "x.html" %}` nodes are replaced by the parsed included template.
//! 5. Child `Block` definitions and `Extends` tag are collected and merged into the base.
//! 6. `render_nodes` walks the merged AST, escaping variables unless marked `|safe`.
//!
//! Runtime logging is controlled via `set_display_logs`.

use crate::error::{Result, TableError};
use crate::settings::TemplateSettings;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

/// Global switch for enabling/disabling internal template logs
static DISPLAY_LOGS: Lazy<AtomicBool> = Lazy::new(|| AtomicBool::new(false));

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(\{\{.*?\}\}|\{%.*?%\})").expect("token pattern is valid"));

const MAX_INCLUDE_DEPTH: usize = 8;

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("table.html", include_str!("../templates/table.html")),
    ("thead.html", include_str!("../templates/thead.html")),
    ("tbody.html", include_str!("../templates/tbody.html")),
    ("results.html", include_str!("../templates/results.html")),
    ("tfoot.html", include_str!("../templates/tfoot.html")),
];

/// Enable or disable internal debug logs for the template engine
pub fn set_display_logs(enabled: bool) {
    DISPLAY_LOGS.store(enabled, Ordering::Relaxed);
}

/// Internal debug: logs only if DISPLAY_LOGS is true
macro_rules! tdebug {
    ($($arg:tt)+) => {
        if DISPLAY_LOGS.load(Ordering::Relaxed) {
            debug!($($arg)+);
        }
    }
}

pub type Context = HashMap<String, TemplateValue>;

/// Supported value types for template context
#[derive(Clone, Debug)]
pub enum TemplateValue {
    String(String),
    Bool(bool),
    Number(f64),
    List(Vec<TemplateValue>),
    Object(HashMap<String, TemplateValue>),
}

impl TemplateValue {
    /// Convert the value to a string for rendering
    pub fn as_string(&self) -> String {
        match self {
            TemplateValue::String(s) => s.clone(),
            TemplateValue::Bool(b) => b.to_string(),
            TemplateValue::Number(n) => n.to_string(),
            TemplateValue::List(_) | TemplateValue::Object(_) => String::new(),
        }
    }

    /// Truthiness used by `{% if %}`
    pub fn is_truthy(&self) -> bool {
        match self {
            TemplateValue::String(s) => !s.is_empty(),
            TemplateValue::Bool(b) => *b,
            TemplateValue::Number(n) => *n != 0.0,
            TemplateValue::List(items) => !items.is_empty(),
            TemplateValue::Object(map) => !map.is_empty(),
        }
    }
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        TemplateValue::String(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        TemplateValue::String(value)
    }
}

impl From<bool> for TemplateValue {
    fn from(value: bool) -> Self {
        TemplateValue::Bool(value)
    }
}

impl From<usize> for TemplateValue {
    fn from(value: usize) -> Self {
        TemplateValue::Number(value as f64)
    }
}

impl From<u32> for TemplateValue {
    fn from(value: u32) -> Self {
        TemplateValue::Number(value as f64)
    }
}

impl From<u64> for TemplateValue {
    fn from(value: u64) -> Self {
        TemplateValue::Number(value as f64)
    }
}

impl<T: Into<TemplateValue>> From<Vec<T>> for TemplateValue {
    fn from(values: Vec<T>) -> Self {
        TemplateValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<HashMap<String, TemplateValue>> for TemplateValue {
    fn from(map: HashMap<String, TemplateValue>) -> Self {
        TemplateValue::Object(map)
    }
}

/// Token types extracted from the template
#[derive(Debug, Clone)]
pub enum Token {
    Text(String),     // Plain text
    Variable(String), // {{ variable }}
    Tag(String),      // {% tag %}
}

/// AST node types for the template engine
#[derive(Debug, Clone)]
pub enum Node {
    Text(String),
    Variable(String),
    If {
        condition: String,
        then_body: Vec<Node>,
        else_body: Vec<Node>,
    },
    For {
        var_name: String,
        list_name: String,
        body: Vec<Node>,
    },
    Block {
        name: String,
        body: Vec<Node>,
    },
    Extends(String), // {% extends "base.html" %}
    Include(String), // {% include "thead.html" %}
}

/// Tokenizes the template content into a Vec<Token>
pub fn tokenize_template(content: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last_end = 0;
    for mat in TOKEN_RE.find_iter(content) {
        let start = mat.start();
        let end = mat.end();
        if start > last_end {
            tokens.push(Token::Text(content[last_end..start].to_string()));
        }
        let m = mat.as_str().trim();
        if m.starts_with("{{") {
            let inner = m
                .trim_start_matches("{{")
                .trim_end_matches("}}")
                .trim()
                .to_string();
            tdebug!("tokenize: Variable '{{ {{ {} }} }}'", inner);
            tokens.push(Token::Variable(inner));
        } else {
            let inner = m
                .trim_start_matches("{%")
                .trim_end_matches("%}")
                .trim()
                .to_string();
            tdebug!("tokenize: Tag '{{% {} %}}'", inner);
            tokens.push(Token::Tag(inner));
        }
        last_end = end;
    }
    if last_end < content.len() {
        tokens.push(Token::Text(content[last_end..].to_string()));
    }
    tokens
}

/// Parses a sequence of Token into an AST of Node
pub fn parse_tokens(tokens: &[Token]) -> Vec<Node> {
    let mut idx = 0;
    parse_nodes(tokens, &mut idx, &[])
}

/// Recursive parser: consumes tokens until an `end_tag` is found
fn parse_nodes(tokens: &[Token], idx: &mut usize, end_tags: &[&str]) -> Vec<Node> {
    let mut nodes = Vec::new();
    while *idx < tokens.len() {
        match &tokens[*idx] {
            Token::Text(t) => {
                nodes.push(Node::Text(t.clone()));
                *idx += 1;
            }
            Token::Variable(v) => {
                nodes.push(Node::Variable(v.clone()));
                *idx += 1;
            }
            Token::Tag(tag) => {
                let t = tag.trim();
                if end_tags.contains(&t) {
                    break;
                }
                if let Some(rest) = t.strip_prefix("extends ") {
                    nodes.push(Node::Extends(rest.trim().trim_matches('"').to_string()));
                    *idx += 1;
                    continue;
                }
                if let Some(rest) = t.strip_prefix("include ") {
                    nodes.push(Node::Include(rest.trim().trim_matches('"').to_string()));
                    *idx += 1;
                    continue;
                }
                if let Some(name) = t.strip_prefix("block ") {
                    *idx += 1;
                    let body = parse_nodes(tokens, idx, &["endblock"]);
                    *idx += 1; // skip endblock
                    nodes.push(Node::Block {
                        name: name.trim().to_string(),
                        body,
                    });
                    continue;
                }
                if let Some(cond) = t.strip_prefix("if ") {
                    *idx += 1;
                    let then_body = parse_nodes(tokens, idx, &["else", "endif"]);
                    let mut else_body = Vec::new();
                    if let Some(Token::Tag(tt)) = tokens.get(*idx) {
                        if tt.trim() == "else" {
                            *idx += 1;
                            else_body = parse_nodes(tokens, idx, &["endif"]);
                        }
                    }
                    *idx += 1; // skip endif
                    nodes.push(Node::If {
                        condition: cond.trim().to_string(),
                        then_body,
                        else_body,
                    });
                    continue;
                }
                if let Some(rest) = t.strip_prefix("for ") {
                    let parts: Vec<&str> = rest.split_whitespace().collect();
                    if parts.len() == 3 && parts[1] == "in" {
                        *idx += 1;
                        let body = parse_nodes(tokens, idx, &["endfor"]);
                        *idx += 1; // skip endfor
                        nodes.push(Node::For {
                            var_name: parts[0].to_string(),
                            list_name: parts[2].to_string(),
                            body,
                        });
                        continue;
                    }
                }
                tdebug!("parse: skipping unknown tag '{}'", t);
                *idx += 1;
            }
        }
    }
    nodes
}

/// Variable lookup for rendering: loop variables chained over the root context.
struct Scope<'a> {
    local: Option<(&'a str, &'a TemplateValue)>,
    parent: Option<&'a Scope<'a>>,
    root: &'a Context,
}

impl<'a> Scope<'a> {
    fn root(context: &'a Context) -> Self {
        Scope {
            local: None,
            parent: None,
            root: context,
        }
    }

    fn get(&self, key: &str) -> Option<&'a TemplateValue> {
        match self.local {
            Some((name, value)) if name == key => Some(value),
            _ => match self.parent {
                Some(parent) => parent.get(key),
                None => self.root.get(key),
            },
        }
    }
}

/// Resolves a dotted variable path 'a.b.c' within the scope
fn resolve_variable<'a>(name: &str, scope: &Scope<'a>) -> Option<&'a TemplateValue> {
    let mut current: Option<&TemplateValue> = None;
    for (i, key) in name.split('.').enumerate() {
        if i == 0 {
            current = scope.get(key);
        } else if let Some(TemplateValue::Object(map)) = current {
            current = map.get(key);
        } else {
            return None;
        }
    }
    current
}

fn evaluate_condition(condition: &str, scope: &Scope<'_>) -> bool {
    match condition.strip_prefix("not ") {
        Some(inner) => !evaluate_condition(inner.trim(), scope),
        None => resolve_variable(condition, scope)
            .map(TemplateValue::is_truthy)
            .unwrap_or(false),
    }
}

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Merges child blocks into base AST by matching block names
fn merge_blocks(nodes: &[Node], child_blocks: &HashMap<String, Vec<Node>>) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Block { name, body } => Node::Block {
                name: name.clone(),
                body: match child_blocks.get(name) {
                    Some(child) => child.clone(),
                    None => merge_blocks(body, child_blocks),
                },
            },
            Node::If {
                condition,
                then_body,
                else_body,
            } => Node::If {
                condition: condition.clone(),
                then_body: merge_blocks(then_body, child_blocks),
                else_body: merge_blocks(else_body, child_blocks),
            },
            Node::For {
                var_name,
                list_name,
                body,
            } => Node::For {
                var_name: var_name.clone(),
                list_name: list_name.clone(),
                body: merge_blocks(body, child_blocks),
            },
            other => other.clone(),
        })
        .collect()
}

/// Renders the AST into HTML string using the context
pub fn render_nodes(nodes: &[Node], context: &Context) -> String {
    let mut out = String::new();
    render_into(nodes, &Scope::root(context), &mut out);
    out
}

fn render_into(nodes: &[Node], scope: &Scope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Variable(expr) => {
                let (name, safe) = match expr.split_once('|') {
                    Some((name, filter)) => (name.trim(), filter.trim() == "safe"),
                    None => (expr.as_str(), false),
                };
                if let Some(val) = resolve_variable(name, scope) {
                    if safe {
                        out.push_str(&val.as_string());
                    } else {
                        out.push_str(&escape_html(&val.as_string()));
                    }
                }
            }
            Node::If {
                condition,
                then_body,
                else_body,
            } => {
                if evaluate_condition(condition, scope) {
                    render_into(then_body, scope, out);
                } else {
                    render_into(else_body, scope, out);
                }
            }
            Node::For {
                var_name,
                list_name,
                body,
            } => {
                if let Some(TemplateValue::List(items)) = resolve_variable(list_name, scope) {
                    for item in items {
                        let frame = Scope {
                            local: Some((var_name.as_str(), item)),
                            parent: Some(scope),
                            root: scope.root,
                        };
                        render_into(body, &frame, out);
                    }
                }
            }
            Node::Block { body, .. } => render_into(body, scope, out),
            Node::Extends(_) | Node::Include(_) => {}
        }
    }
}

/// Template source: the override directory first, then the bundled templates.
pub fn load_template_source(name: &str, settings: &TemplateSettings) -> Result<String> {
    if let Some(dir) = &settings.dir {
        let path = Path::new(dir).join(name);
        if path.is_file() {
            tdebug!("Loading template override {}", path.display());
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    BUILTIN_TEMPLATES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| source.to_string())
        .ok_or_else(|| TableError::TemplateNotFound {
            name: name.to_string(),
        })
}

/// Replaces include nodes with the parsed included templates
fn expand_includes(nodes: Vec<Node>, settings: &TemplateSettings, depth: usize) -> Result<Vec<Node>> {
    let mut expanded = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Include(name) if depth < MAX_INCLUDE_DEPTH => {
                let source = load_template_source(&name, settings)?;
                let included = parse_tokens(&tokenize_template(&source));
                expanded.extend(expand_includes(included, settings, depth + 1)?);
            }
            Node::Include(name) => {
                log::warn!("Include depth exceeded while including `{}`", name);
            }
            Node::Block { name, body } => expanded.push(Node::Block {
                name,
                body: expand_includes(body, settings, depth)?,
            }),
            Node::If {
                condition,
                then_body,
                else_body,
            } => expanded.push(Node::If {
                condition,
                then_body: expand_includes(then_body, settings, depth)?,
                else_body: expand_includes(else_body, settings, depth)?,
            }),
            Node::For {
                var_name,
                list_name,
                body,
            } => expanded.push(Node::For {
                var_name,
                list_name,
                body: expand_includes(body, settings, depth)?,
            }),
            other => expanded.push(other),
        }
    }
    Ok(expanded)
}

fn load_nodes(name: &str, settings: &TemplateSettings) -> Result<Vec<Node>> {
    let source = load_template_source(name, settings)?;
    expand_includes(parse_tokens(&tokenize_template(&source)), settings, 0)
}

/// Main entry: loads the template, merges it with its base if it extends one, and renders HTML
pub fn render_template(name: &str, context: &Context, settings: &TemplateSettings) -> Result<String> {
    let child_nodes = load_nodes(name, settings)?;
    tdebug!("Child AST: {:?}", child_nodes);

    let mut child_blocks = HashMap::new();
    let mut base_t: Option<String> = None;
    for node in &child_nodes {
        if let Node::Extends(b) = node {
            base_t = Some(b.clone());
        }
        if let Node::Block { name, body } = node {
            child_blocks.insert(name.clone(), body.clone());
        }
    }

    let html = match base_t {
        Some(base) => {
            let base_nodes = load_nodes(&base, settings)?;
            tdebug!("Base AST: {:?}", base_nodes);
            let merged = merge_blocks(&base_nodes, &child_blocks);
            tdebug!("Merged AST: {:?}", merged);
            render_nodes(&merged, context)
        }
        None => render_nodes(&child_nodes, context),
    };
    Ok(html)
}
