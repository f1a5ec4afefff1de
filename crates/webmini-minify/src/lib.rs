//! webmini minifiers
//!
//! Single-pass minifiers for CSS, HTML, JavaScript, JSON, SVG and XML. Each
//! minifier pulls tokens from a `webmini-lexer` tokenizer and writes a
//! shorter, equivalent byte stream. A [`Minifier`] maps media types to
//! minifiers so that embedded resources (CSS in a `style` attribute, JS in a
//! `<script>`, a data URI payload) are minified by recursion.
//!
//! ```text
//! media type → Minifier::lookup → Minify::minify(tokens) → output
//!                    ↑                       │
//!                    └── embedded resource ──┘
//! ```

pub mod color;
pub mod common;
pub mod config;
pub mod css;
pub mod html;
pub mod js;
pub mod json;
pub mod pathdata;
pub mod svg;
pub mod xml;

use std::collections::HashMap;
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;

use log::{debug, warn};
use regex::Regex;
use webmini_lexer::LexerError;

pub use config::Config;

/// Nesting limit for embedded resources. Deeper fragments are copied verbatim.
pub const MAX_DEPTH: usize = 16;

/// Minification error.
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    #[error("minifier does not exist for media type '{0}'")]
    NotExist(String),
    #[error("invalid media type '{0}'")]
    InvalidMediaType(String),
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("external minifier failed: {0}")]
    Command(String),
    #[error("embedded resources nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Parameters passed down to a minifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    /// The input is a fragment such as a `style` attribute value rather than
    /// a whole document.
    pub inline: bool,
    /// Number of enclosing embedded resources.
    pub depth: usize,
    /// Media type parameters, e.g. `charset` in `text/css;charset=utf-8`.
    pub media: Vec<(String, String)>,
}

impl Params {
    /// Parameters for a resource embedded in the current one.
    pub fn nested(&self) -> Self {
        Self {
            inline: false,
            depth: self.depth + 1,
            media: Vec::new(),
        }
    }

    /// Like `nested`, for an inline fragment.
    pub fn nested_inline(&self) -> Self {
        Self {
            inline: true,
            ..self.nested()
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.media
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A minifier for one format.
///
/// `out` is a scratch buffer owned by the caller; on error its content is
/// discarded, so implementations may write to it as they go.
pub trait Minify: Send + Sync {
    fn minify(
        &self,
        m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        params: &Params,
    ) -> Result<(), MinifyError>;
}

impl<F> Minify for F
where
    F: Fn(&Minifier, &mut Vec<u8>, &[u8], &Params) -> Result<(), MinifyError> + Send + Sync,
{
    fn minify(
        &self,
        m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        params: &Params,
    ) -> Result<(), MinifyError> {
        self(m, out, input, params)
    }
}

/// An external program that reads the resource on stdin and writes the
/// minified resource to stdout.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Minify for ExternalCommand {
    fn minify(
        &self,
        _m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        _params: &Params,
    ) -> Result<(), MinifyError> {
        debug!("running {} {:?}", self.program, self.args);
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| MinifyError::Command(format!("{}: stdin unavailable", self.program)))?;

        let (written, output) = std::thread::scope(|s| {
            let writer = s.spawn(move || stdin.write_all(input));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (written, output)
        });
        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MinifyError::Command(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        // a filter may legitimately close stdin early once it has what it needs
        if let Err(err) = written {
            if err.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(err.into());
            }
        }
        out.extend_from_slice(&output.stdout);
        Ok(())
    }
}

/// Media type dispatch table.
///
/// Exact media types are looked up first, then patterns in the order they
/// were added. The table is immutable while minifying, so one `Minifier` can
/// be shared between threads.
#[derive(Default, Clone)]
pub struct Minifier {
    exact: HashMap<String, Arc<dyn Minify>>,
    patterns: Vec<(Regex, Arc<dyn Minify>)>,
}

impl Minifier {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with every built-in minifier, configured by `config`.
    pub fn from_config(config: &Config) -> Self {
        let mut m = Self::new();
        m.add("text/css", config.css.clone());
        m.add("text/html", config.html.clone());
        m.add("image/svg+xml", config.svg.clone());
        let templates = [
            (html::ASP_TEMPLATE_DELIMS, &["text/asp", "text/x-ejs-template"][..]),
            (html::PHP_TEMPLATE_DELIMS, &["application/x-httpd-php"][..]),
            (
                html::GO_TEMPLATE_DELIMS,
                &[
                    "text/x-template",
                    "text/x-go-template",
                    "text/x-mustache-template",
                    "text/x-handlebars-template",
                ][..],
            ),
        ];
        for (delims, media_types) in templates {
            for media_type in media_types {
                m.add(media_type, config.html.with_template_delims(delims));
            }
        }
        let patterns: [(&str, Arc<dyn Minify>); 3] = [
            (r"^(application|text)/(x-)?(java|ecma)script$", Arc::new(config.js.clone())),
            (r"[/+]json$", Arc::new(config.json.clone())),
            (r"[/+]xml$", Arc::new(config.xml.clone())),
        ];
        for (pattern, minifier) in patterns {
            match Regex::new(pattern) {
                Ok(re) => m.patterns.push((re, minifier)),
                Err(err) => warn!("skipping media type pattern {pattern}: {err}"),
            }
        }
        for cmd in &config.commands {
            m.add_command(&cmd.media_type, cmd.program.clone(), cmd.args.clone());
        }
        m
    }

    /// Register a minifier for an exact media type, replacing any previous one.
    pub fn add(&mut self, media_type: &str, minifier: impl Minify + 'static) {
        self.exact
            .insert(media_type.trim().to_ascii_lowercase(), Arc::new(minifier));
    }

    /// Register a minifier for every media type matching `pattern`.
    pub fn add_pattern(&mut self, pattern: Regex, minifier: impl Minify + 'static) {
        self.patterns.push((pattern, Arc::new(minifier)));
    }

    /// Register an external program as the minifier for `media_type`.
    /// Exact entries take precedence over patterns, so this also overrides a
    /// built-in minifier.
    pub fn add_command(&mut self, media_type: &str, program: impl Into<String>, args: Vec<String>) {
        self.add(
            media_type,
            ExternalCommand {
                program: program.into(),
                args,
            },
        );
    }

    fn lookup(&self, media_type: &str) -> Option<&Arc<dyn Minify>> {
        self.exact.get(media_type).or_else(|| {
            self.patterns
                .iter()
                .find(|(re, _)| re.is_match(media_type))
                .map(|(_, f)| f)
        })
    }

    /// Check that `media_type` is well formed and has a minifier.
    pub fn check(&self, media_type: &str) -> Result<(), MinifyError> {
        let (essence, _) = split_media_type(media_type)?;
        match self.lookup(&essence) {
            Some(_) => Ok(()),
            None => Err(MinifyError::NotExist(essence)),
        }
    }

    /// Minify `input` as `media_type` and append the result to `out`.
    ///
    /// Nothing is appended when an error is returned. Media type parameters
    /// are merged into `params`.
    pub fn minify_with(
        &self,
        media_type: &str,
        params: &Params,
        out: &mut Vec<u8>,
        input: &[u8],
    ) -> Result<(), MinifyError> {
        let (essence, media) = split_media_type(media_type)?;
        if params.depth > MAX_DEPTH {
            return Err(MinifyError::TooDeep(MAX_DEPTH));
        }
        let Some(f) = self.lookup(&essence) else {
            return Err(MinifyError::NotExist(essence));
        };
        debug!("minifying {} bytes as {essence} at depth {}", input.len(), params.depth);

        let params = Params {
            media,
            ..params.clone()
        };
        let mut buf = Vec::with_capacity(input.len());
        f.minify(self, &mut buf, input, &params)?;
        out.extend_from_slice(&buf);
        Ok(())
    }

    /// Minify an embedded resource, writing it verbatim when it cannot be
    /// minified.
    pub fn minify_embedded(&self, media_type: &str, params: &Params, out: &mut Vec<u8>, input: &[u8]) {
        match self.minify_with(media_type, params, out, input) {
            Ok(()) => {}
            Err(MinifyError::NotExist(mt)) => {
                debug!("no minifier for embedded {mt}, copying");
                out.extend_from_slice(input);
            }
            Err(err) => {
                warn!("embedded {media_type} left as is: {err}");
                out.extend_from_slice(input);
            }
        }
    }

    /// Read everything from `r`, minify it and write the result to `w`.
    /// Nothing is written when minification fails.
    pub fn minify<W: Write, R: Read>(&self, media_type: &str, mut w: W, mut r: R) -> Result<(), MinifyError> {
        split_media_type(media_type)?;
        let mut input = Vec::new();
        r.read_to_end(&mut input)?;
        let out = self.bytes(media_type, &input)?;
        w.write_all(&out)?;
        Ok(())
    }

    pub fn bytes(&self, media_type: &str, input: &[u8]) -> Result<Vec<u8>, MinifyError> {
        let mut out = Vec::with_capacity(input.len());
        self.minify_with(media_type, &Params::default(), &mut out, input)?;
        Ok(out)
    }

    pub fn string(&self, media_type: &str, input: &str) -> Result<String, MinifyError> {
        let out = self.bytes(media_type, input.as_bytes())?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Split `type/subtype; key=value` into the lowercase essence and its
/// parameters.
fn split_media_type(media_type: &str) -> Result<(String, Vec<(String, String)>), MinifyError> {
    let mut parts = media_type.split(';');
    let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let valid = match essence.split_once('/') {
        Some((t, s)) => is_token(t) && is_token(s),
        None => false,
    };
    if !valid {
        return Err(MinifyError::InvalidMediaType(media_type.to_string()));
    }
    let media = parts
        .filter_map(|p| {
            let (k, v) = p.split_once('=')?;
            Some((
                k.trim().to_ascii_lowercase(),
                v.trim().trim_matches('"').to_string(),
            ))
        })
        .collect();
    Ok((essence, media))
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|c| c.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&c))
}

fn with_default(media_type: &str, input: &[u8]) -> Result<Vec<u8>, MinifyError> {
    Minifier::from_config(&Config::default()).bytes(media_type, input)
}

/// Minify a stylesheet with the default options.
pub fn css(input: &[u8]) -> Result<Vec<u8>, MinifyError> {
    with_default("text/css", input)
}

/// Minify an HTML document with the default options.
pub fn html(input: &[u8]) -> Result<Vec<u8>, MinifyError> {
    with_default("text/html", input)
}

/// Minify a script with the default options.
pub fn js(input: &[u8]) -> Result<Vec<u8>, MinifyError> {
    with_default("application/javascript", input)
}

/// Minify a JSON document with the default options.
pub fn json(input: &[u8]) -> Result<Vec<u8>, MinifyError> {
    with_default("application/json", input)
}

/// Minify an SVG image with the default options.
pub fn svg(input: &[u8]) -> Result<Vec<u8>, MinifyError> {
    with_default("image/svg+xml", input)
}

/// Minify an XML document with the default options.
pub fn xml(input: &[u8]) -> Result<Vec<u8>, MinifyError> {
    with_default("text/xml", input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upper(_: &Minifier, out: &mut Vec<u8>, input: &[u8], _: &Params) -> Result<(), MinifyError> {
        out.extend(input.iter().map(u8::to_ascii_uppercase));
        Ok(())
    }

    fn failing(_: &Minifier, out: &mut Vec<u8>, _: &[u8], _: &Params) -> Result<(), MinifyError> {
        out.extend_from_slice(b"partial");
        Err(MinifyError::Command("boom".into()))
    }

    #[test]
    fn test_exact_before_pattern() {
        let mut m = Minifier::new();
        m.add_pattern(Regex::new("^text/").unwrap(), failing);
        m.add("text/plain", upper);
        assert_eq!(m.string("text/plain", "abc").unwrap(), "ABC");
        assert!(m.bytes("text/other", b"abc").is_err());
    }

    #[test]
    fn test_media_type_normalized() {
        let mut m = Minifier::new();
        m.add("text/plain", upper);
        assert_eq!(m.string(" Text/Plain ; charset=UTF-8", "a").unwrap(), "A");
    }

    #[test]
    fn test_not_exist() {
        let m = Minifier::new();
        assert!(matches!(
            m.bytes("text/plain", b"x"),
            Err(MinifyError::NotExist(mt)) if mt == "text/plain"
        ));
    }

    #[test]
    fn test_invalid_media_type() {
        let m = Minifier::from_config(&Config::default());
        for mt in ["", "css", "text/", "/css", "te xt/css"] {
            assert!(
                matches!(m.bytes(mt, b"x"), Err(MinifyError::InvalidMediaType(_))),
                "{mt}"
            );
        }
    }

    #[test]
    fn test_failed_minify_writes_nothing() {
        let mut m = Minifier::new();
        m.add("text/plain", failing);
        let mut sink = Vec::new();
        assert!(m.minify("text/plain", &mut sink, &b"abc"[..]).is_err());
        assert!(sink.is_empty());

        let mut out = b"keep".to_vec();
        assert!(m.minify_with("text/plain", &Params::default(), &mut out, b"abc").is_err());
        assert_eq!(out, b"keep");
    }

    #[test]
    fn test_embedded_fallback() {
        let mut m = Minifier::new();
        m.add("text/plain", failing);
        let mut out = Vec::new();
        m.minify_embedded("text/plain", &Params::default(), &mut out, b"abc");
        m.minify_embedded("text/unknown", &Params::default(), &mut out, b"def");
        assert_eq!(out, b"abcdef");
    }

    #[test]
    fn test_depth_limit() {
        let mut m = Minifier::new();
        m.add("text/plain", upper);
        let params = Params {
            depth: MAX_DEPTH + 1,
            ..Params::default()
        };
        let mut out = Vec::new();
        assert!(matches!(
            m.minify_with("text/plain", &params, &mut out, b"x"),
            Err(MinifyError::TooDeep(MAX_DEPTH))
        ));
    }

    #[test]
    fn test_params() {
        let mut m = Minifier::new();
        m.add("text/plain", |_: &Minifier, out: &mut Vec<u8>, _: &[u8], p: &Params| -> Result<(), MinifyError> {
            out.extend_from_slice(p.get("charset").unwrap_or("none").as_bytes());
            Ok(())
        });
        assert_eq!(m.string("text/plain;charset=\"utf-8\"", "").unwrap(), "utf-8");
        assert_eq!(Params::default().nested_inline().depth, 1);
        assert!(Params::default().nested_inline().inline);
    }

    #[test]
    fn test_default_table() {
        let m = Minifier::from_config(&Config::default());
        for mt in [
            "text/css",
            "text/html",
            "image/svg+xml",
            "application/javascript",
            "text/x-ecmascript",
            "application/ld+json",
            "application/rss+xml",
        ] {
            assert!(m.lookup(mt).is_some(), "{mt}");
        }
        assert!(m.lookup("text/plain").is_none());
    }

    #[test]
    fn test_template_media_types() {
        let m = Minifier::from_config(&Config::default());
        let src = "<p>{{ printf \"  !  \" }}</p>";
        assert_eq!(m.string("text/html", src).unwrap(), "<p>{{ printf \" ! \" }}");
        assert_eq!(m.string("text/x-go-template", src).unwrap(), "<p>{{ printf \"  !  \" }}");
        assert_eq!(m.string("text/x-handlebars-template", src).unwrap(), "<p>{{ printf \"  !  \" }}");
        assert_eq!(
            m.string("application/x-httpd-php", "<b><?php echo  1; ?></b>").unwrap(),
            "<b><?php echo  1; ?></b>"
        );
        assert_eq!(m.string("text/asp", "<b><%= a  b %></b>").unwrap(), "<b><%= a  b %></b>");
    }

    #[cfg(unix)]
    #[test]
    fn test_external_command() {
        let mut m = Minifier::new();
        m.add_command("text/plain", "tr", vec!["a-z".into(), "A-Z".into()]);
        assert_eq!(m.string("text/plain", "abc").unwrap(), "ABC");

        m.add_command("text/plain", "false", Vec::new());
        assert!(matches!(m.bytes("text/plain", b"abc"), Err(MinifyError::Command(_))));
    }

    #[test]
    fn test_convenience_functions() {
        assert_eq!(json(br#"{ "a": [1, 2] }"#).unwrap(), br#"{"a":[1,2]}"#);
        assert_eq!(css(b"a { color : red ; }").unwrap(), b"a{color:red}");
        assert_eq!(js(b"a + ++b").unwrap(), b"a+ ++b");
    }
}
