use pretty_assertions::assert_eq;
use webmini_minify::common::data_uri;
use webmini_minify::{Config, Minifier, Params};

fn minifier() -> Minifier {
    Minifier::from_config(&Config::default())
}

fn min(media_type: &str, src: &str) -> String {
    minifier().string(media_type, src).unwrap()
}

#[test]
fn html_structure() {
    assert_eq!(min("text/html", "<html><head></head><body>x</body></html>"), "x");
    assert_eq!(min("text/html", "<p></p><p></p>"), "<p><p>");
    assert_eq!(min("text/html", "<option selected=\"selected\">a</option>"), "<option selected>a");
}

#[test]
fn colors() {
    assert_eq!(min("text/css", "a{color:#FF0000}"), "a{color:red}");
    assert_eq!(min("text/css", "a{color:#000000}"), "a{color:#000}");
    assert_eq!(min("text/css", "a{color:rgb(255,255,255)}"), "a{color:#fff}");
    assert_eq!(min("text/css", "a{color:rgba(255,0,0,1)}"), "a{color:red}");
}

#[test]
fn js_tokens_do_not_merge() {
    assert_eq!(min("application/javascript", "a + ++b"), "a+ ++b");
    assert_eq!(min("application/javascript", "a - -b"), "a- -b");
    assert_eq!(min("application/javascript", "var x = y"), "var x=y");
}

#[test]
fn json_separators() {
    assert_eq!(min("application/json", "{ \"a\": [1, 2] }"), "{\"a\":[1,2]}");
    assert_eq!(
        min("application/ld+json", "[ { \"a\" : { } } , [ ] ]"),
        "[{\"a\":{}},[]]"
    );
}

#[test]
fn data_uri_encoding() {
    let m = minifier();
    let p = Params::default();
    assert_eq!(data_uri(&m, b"data:,======", &p), b"data:;base64,PT09PT09");
    assert_eq!(data_uri(&m, b"data:text/plain;base64,YWJj", &p), b"data:,abc");
    assert_eq!(data_uri(&m, b"data:text/css,a%20%7B%20color%3A%20red%20%7D", &p), b"data:text/css,a%7Bcolor%3Ared%7D");
}

#[test]
fn whitespace_and_comments_are_insignificant() {
    let pairs = [
        ("text/css", "a{color:red}", "a { color : red }\n/* comment */\n"),
        ("text/html", "<div><p>x</p></div>", "<div>\n  <p>x</p>\n  <!-- c -->\n</div>"),
        ("text/xml", "<a><b>x</b></a>", "<a>\n  <b>x</b>\n  <!-- c -->\n</a>"),
        ("application/json", "{\"a\":[1,2]}", "{\n  \"a\": [\n    1,\n    2\n  ]\n}"),
    ];
    for (media_type, compact, spaced) in pairs {
        assert_eq!(min(media_type, spaced), min(media_type, compact), "{media_type}");
    }
}

#[test]
fn minifying_twice_changes_nothing() {
    let samples = [
        ("text/css", "a { color : #FF0000 ; margin : 0px auto }\n@media screen { b > i { font-weight : bold } }"),
        (
            "text/html",
            "<!DOCTYPE html><html><body><ul>\n<li>one</li>\n<li>two</li>\n</ul><p>text <b>bold</b> more</p></body></html>",
        ),
        ("application/javascript", "var a = 1 ;\nfunction f ( x ) { return x + 1 ; }\nf ( a ) ;"),
        ("application/json", "{ \"a\" : [ 1.50 , true , null ] }"),
        ("text/xml", "<?xml version=\"1.0\" ?>\n<a x = 'y'>\n  <b> text </b>\n  <c></c>\n</a>"),
        ("image/svg+xml", "<svg version=\"1.1\"><path d=\"M 10 10 L 20 10\" fill=\"#ff0000\"/></svg>"),
    ];
    for (media_type, src) in samples {
        let once = min(media_type, src);
        let twice = min(media_type, &once);
        assert_eq!(twice, once, "{media_type}");
    }
}

#[test]
fn embedded_resources() {
    assert_eq!(
        min(
            "text/html",
            "<style>a { color : #FF0000 }</style><script>var a = 1 ;</script><p style=\"color : red ;\">x</p>"
        ),
        "<style>a{color:red}</style><script>var a=1</script><p style=color:red>x"
    );
    assert_eq!(min("text/html", "<img src=\"data:image/svg+xml,%3Cg%3E%3C/g%3E\">"), "<img src=data:image/svg+xml,%3Cg%2F%3E>");
}

#[test]
fn convenience_functions() {
    assert_eq!(webmini_minify::css(b"a { b : c }").unwrap(), b"a{b:c}");
    assert_eq!(webmini_minify::json(b" [ 1 ] ").unwrap(), b"[1]");
    assert_eq!(webmini_minify::xml(b"<a> </a>").unwrap(), b"<a/>");
    assert!(webmini_minify::json(b"[").is_err());
}
