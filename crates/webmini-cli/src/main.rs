use clap::Parser;
use log::{debug, info, LevelFilter};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use webmini_minify::{Config, Minifier, MinifyError};

#[derive(Parser)]
#[command(name = "webmini")]
#[command(about = "Minify HTML, CSS, JavaScript, JSON, SVG and XML")]
#[command(version)]
struct Cli {
    /// Media type or file extension of the input, e.g. `text/css` or `css`.
    /// Defaults to the extension of each input file.
    #[arg(long = "type", value_name = "TYPE")]
    media_type: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// TOML file with minifier options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Significant digits kept in numbers, overrides every format's precision
    #[arg(long, value_name = "N")]
    precision: Option<usize>,

    /// Keep HTML, SVG and license comments
    #[arg(long)]
    keep_comments: bool,

    /// Log dispatch decisions and embedded fallbacks
    #[arg(short, long)]
    verbose: bool,

    /// Input files, stdin when none are given
    files: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: String, source: std::io::Error },
    #[error("invalid config {path}: {source}")]
    Config { path: String, source: toml::de::Error },
    #[error("cannot tell the media type of {0}, use --type")]
    UnknownType(String),
    #[error("{path}: {source}")]
    Minify { path: String, source: MinifyError },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    apply_flags(cli, &mut config);
    let m = Minifier::from_config(&config);

    let mut out = Vec::new();
    if cli.files.is_empty() {
        let media_type = match &cli.media_type {
            Some(t) => resolve_type(t).ok_or_else(|| CliError::UnknownType(t.clone()))?,
            None => return Err(CliError::UnknownType("stdin".into())),
        };
        m.check(&media_type)
            .map_err(|source| CliError::Minify { path: "stdin".into(), source })?;
        let mut input = Vec::new();
        std::io::stdin()
            .read_to_end(&mut input)
            .map_err(|source| CliError::Read { path: "stdin".into(), source })?;
        minify(&m, &media_type, "stdin", &input, &mut out)?;
    } else {
        for path in &cli.files {
            let name = path.display().to_string();
            let media_type = cli
                .media_type
                .as_deref()
                .or_else(|| path.extension().and_then(|e| e.to_str()))
                .and_then(resolve_type)
                .ok_or_else(|| CliError::UnknownType(name.clone()))?;
            m.check(&media_type)
                .map_err(|source| CliError::Minify { path: name.clone(), source })?;
            let input = std::fs::read(path).map_err(|source| CliError::Read { path: name.clone(), source })?;
            minify(&m, &media_type, &name, &input, &mut out)?;
        }
    }

    match &cli.output {
        Some(path) => std::fs::write(path, &out).map_err(|source| CliError::Write {
            path: path.display().to_string(),
            source,
        }),
        None => std::io::stdout().write_all(&out).map_err(|source| CliError::Write {
            path: "stdout".into(),
            source,
        }),
    }
}

fn minify(m: &Minifier, media_type: &str, name: &str, input: &[u8], out: &mut Vec<u8>) -> Result<(), CliError> {
    debug!("{name}: minifying as {media_type}");
    let minified = m.bytes(media_type, input).map_err(|source| CliError::Minify {
        path: name.to_string(),
        source,
    })?;
    info!("{name}: {} -> {} bytes", input.len(), minified.len());
    out.extend(minified);
    Ok(())
}

fn load_config(path: &Path) -> Result<Config, CliError> {
    let name = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read { path: name.clone(), source })?;
    toml::from_str(&content).map_err(|source| CliError::Config { path: name, source })
}

fn apply_flags(cli: &Cli, config: &mut Config) {
    if let Some(p) = cli.precision {
        config.css.precision = p;
        config.js.precision = p;
        config.json.precision = p;
        config.svg.precision = p;
    }
    if cli.keep_comments {
        config.html.keep_comments = true;
        config.svg.keep_comments = true;
        config.js.keep_license_comments = true;
    }
}

/// Map a file extension to its media type. Anything containing a `/` is
/// taken as a media type already.
fn resolve_type(t: &str) -> Option<String> {
    if t.contains('/') {
        return Some(t.to_string());
    }
    let media_type = match t.to_ascii_lowercase().as_str() {
        "css" => "text/css",
        "htm" | "html" | "xhtml" => "text/html",
        "js" | "mjs" | "cjs" => "application/javascript",
        "json" | "webmanifest" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "xml" | "rss" | "atom" => "text/xml",
        _ => return None,
    };
    Some(media_type.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_type() {
        assert_eq!(resolve_type("CSS").as_deref(), Some("text/css"));
        assert_eq!(resolve_type("mjs").as_deref(), Some("application/javascript"));
        assert_eq!(resolve_type("text/x-scss").as_deref(), Some("text/x-scss"));
        assert_eq!(resolve_type("docx"), None);
    }

    #[test]
    fn test_args() {
        let cli = Cli::parse_from(["webmini", "--type", "css", "-o", "out.css", "-v", "a.css", "b.css"]);
        assert_eq!(cli.media_type.as_deref(), Some("css"));
        assert_eq!(cli.output, Some(PathBuf::from("out.css")));
        assert!(cli.verbose);
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn test_minify_concatenates() {
        let m = Minifier::from_config(&Config::default());
        let mut out = Vec::new();
        minify(&m, "text/css", "a", b"a { color : red }", &mut out).unwrap();
        minify(&m, "application/json", "b", b"[ 1 ]", &mut out).unwrap();
        assert_eq!(out, b"a{color:red}[1]");
    }

    #[test]
    fn test_errors_name_the_input() {
        let m = Minifier::from_config(&Config::default());
        let err = minify(&m, "application/json", "data.json", b"[1,]", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().starts_with("data.json: unexpected character ']'"));
    }

    #[test]
    fn test_type_checked_before_reading() {
        let cli = Cli::parse_from(["webmini", "--type", "text/", "missing.css"]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(err, CliError::Minify { source: MinifyError::InvalidMediaType(_), .. }));

        let cli = Cli::parse_from(["webmini", "--type", "text/plain", "missing.txt"]);
        let err = run(&cli).unwrap_err();
        assert!(matches!(err, CliError::Minify { source: MinifyError::NotExist(_), .. }));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["webmini", "--precision", "2", "--keep-comments"]);
        let mut config: Config = toml::from_str("[css]\nprecision = 5\n").unwrap();
        apply_flags(&cli, &mut config);
        assert_eq!(config.css.precision, 2);
        assert_eq!(config.svg.precision, 2);
        assert!(config.html.keep_comments);
        assert!(!config.html.keep_quotes);
    }

    #[test]
    fn test_config_file() {
        let config: Config = toml::from_str("[css]\nprecision = 3\n[html]\nkeep_end_tags = true\n").unwrap();
        assert_eq!(config.css.precision, 3);
        assert!(config.html.keep_end_tags);
        assert!(!config.html.keep_quotes);
    }
}
