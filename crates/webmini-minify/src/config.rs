//! Minifier configuration.
//!
//! Every format has its own options struct; missing fields take their
//! defaults, so a configuration file only lists what it changes:
//!
//! ```toml
//! [css]
//! precision = 3
//!
//! [html]
//! keep_end_tags = true
//!
//! [[commands]]
//! media_type = "text/x-scss"
//! program = "sass"
//! args = ["--stdin", "--style=compressed"]
//! ```

use serde::{Deserialize, Serialize};

use crate::{css, html, js, json, svg, xml};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub css: css::Options,
    pub html: html::Options,
    pub js: js::Options,
    pub json: json::Options,
    pub svg: svg::Options,
    pub xml: xml::Options,
    /// External programs registered on top of the built-in minifiers.
    pub commands: Vec<CommandConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    pub media_type: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}
