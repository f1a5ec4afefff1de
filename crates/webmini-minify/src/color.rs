//! Color folding.
//!
//! Colors are written in the shortest of their hex and named forms.

/// The named colors of CSS Color Level 4 with their RGB values.
pub const NAMED_COLORS: [(&str, u32); 148] = [
    ("aliceblue", 0xf0f8ff),
    ("antiquewhite", 0xfaebd7),
    ("aqua", 0x00ffff),
    ("aquamarine", 0x7fffd4),
    ("azure", 0xf0ffff),
    ("beige", 0xf5f5dc),
    ("bisque", 0xffe4c4),
    ("black", 0x000000),
    ("blanchedalmond", 0xffebcd),
    ("blue", 0x0000ff),
    ("blueviolet", 0x8a2be2),
    ("brown", 0xa52a2a),
    ("burlywood", 0xdeb887),
    ("cadetblue", 0x5f9ea0),
    ("chartreuse", 0x7fff00),
    ("chocolate", 0xd2691e),
    ("coral", 0xff7f50),
    ("cornflowerblue", 0x6495ed),
    ("cornsilk", 0xfff8dc),
    ("crimson", 0xdc143c),
    ("cyan", 0x00ffff),
    ("darkblue", 0x00008b),
    ("darkcyan", 0x008b8b),
    ("darkgoldenrod", 0xb8860b),
    ("darkgray", 0xa9a9a9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xa9a9a9),
    ("darkkhaki", 0xbdb76b),
    ("darkmagenta", 0x8b008b),
    ("darkolivegreen", 0x556b2f),
    ("darkorange", 0xff8c00),
    ("darkorchid", 0x9932cc),
    ("darkred", 0x8b0000),
    ("darksalmon", 0xe9967a),
    ("darkseagreen", 0x8fbc8f),
    ("darkslateblue", 0x483d8b),
    ("darkslategray", 0x2f4f4f),
    ("darkslategrey", 0x2f4f4f),
    ("darkturquoise", 0x00ced1),
    ("darkviolet", 0x9400d3),
    ("deeppink", 0xff1493),
    ("deepskyblue", 0x00bfff),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1e90ff),
    ("firebrick", 0xb22222),
    ("floralwhite", 0xfffaf0),
    ("forestgreen", 0x228b22),
    ("fuchsia", 0xff00ff),
    ("gainsboro", 0xdcdcdc),
    ("ghostwhite", 0xf8f8ff),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xadff2f),
    ("grey", 0x808080),
    ("honeydew", 0xf0fff0),
    ("hotpink", 0xff69b4),
    ("indianred", 0xcd5c5c),
    ("indigo", 0x4b0082),
    ("ivory", 0xfffff0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
    ("lavenderblush", 0xfff0f5),
    ("lawngreen", 0x7cfc00),
    ("lemonchiffon", 0xfffacd),
    ("lightblue", 0xadd8e6),
    ("lightcoral", 0xf08080),
    ("lightcyan", 0xe0ffff),
    ("lightgoldenrodyellow", 0xfafad2),
    ("lightgray", 0xd3d3d3),
    ("lightgreen", 0x90ee90),
    ("lightgrey", 0xd3d3d3),
    ("lightpink", 0xffb6c1),
    ("lightsalmon", 0xffa07a),
    ("lightseagreen", 0x20b2aa),
    ("lightskyblue", 0x87cefa),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xb0c4de),
    ("lightyellow", 0xffffe0),
    ("lime", 0x00ff00),
    ("limegreen", 0x32cd32),
    ("linen", 0xfaf0e6),
    ("magenta", 0xff00ff),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66cdaa),
    ("mediumblue", 0x0000cd),
    ("mediumorchid", 0xba55d3),
    ("mediumpurple", 0x9370db),
    ("mediumseagreen", 0x3cb371),
    ("mediumslateblue", 0x7b68ee),
    ("mediumspringgreen", 0x00fa9a),
    ("mediumturquoise", 0x48d1cc),
    ("mediumvioletred", 0xc71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xf5fffa),
    ("mistyrose", 0xffe4e1),
    ("moccasin", 0xffe4b5),
    ("navajowhite", 0xffdead),
    ("navy", 0x000080),
    ("oldlace", 0xfdf5e6),
    ("olive", 0x808000),
    ("olivedrab", 0x6b8e23),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("orchid", 0xda70d6),
    ("palegoldenrod", 0xeee8aa),
    ("palegreen", 0x98fb98),
    ("paleturquoise", 0xafeeee),
    ("palevioletred", 0xdb7093),
    ("papayawhip", 0xffefd5),
    ("peachpuff", 0xffdab9),
    ("peru", 0xcd853f),
    ("pink", 0xffc0cb),
    ("plum", 0xdda0dd),
    ("powderblue", 0xb0e0e6),
    ("purple", 0x800080),
    ("rebeccapurple", 0x663399),
    ("red", 0xff0000),
    ("rosybrown", 0xbc8f8f),
    ("royalblue", 0x4169e1),
    ("saddlebrown", 0x8b4513),
    ("salmon", 0xfa8072),
    ("sandybrown", 0xf4a460),
    ("seagreen", 0x2e8b57),
    ("seashell", 0xfff5ee),
    ("sienna", 0xa0522d),
    ("silver", 0xc0c0c0),
    ("skyblue", 0x87ceeb),
    ("slateblue", 0x6a5acd),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xfffafa),
    ("springgreen", 0x00ff7f),
    ("steelblue", 0x4682b4),
    ("tan", 0xd2b48c),
    ("teal", 0x008080),
    ("thistle", 0xd8bfd8),
    ("tomato", 0xff6347),
    ("turquoise", 0x40e0d0),
    ("violet", 0xee82ee),
    ("wheat", 0xf5deb3),
    ("white", 0xffffff),
    ("whitesmoke", 0xf5f5f5),
    ("yellow", 0xffff00),
    ("yellowgreen", 0x9acd32),
];

/// RGB value of a named color, ignoring case.
pub fn by_name(name: &[u8]) -> Option<[u8; 3]> {
    NAMED_COLORS
        .iter()
        .find(|(n, _)| webmini_lexer::eq_lower(name, n.as_bytes()))
        .map(|&(_, rgb)| split_rgb(rgb))
}

/// The shortest name of an RGB value.
fn name_of(rgb: [u8; 3]) -> Option<&'static str> {
    let value = u32::from_be_bytes([0, rgb[0], rgb[1], rgb[2]]);
    NAMED_COLORS
        .iter()
        .filter(|&&(_, v)| v == value)
        .map(|&(n, _)| n)
        .min_by_key(|n| n.len())
}

fn split_rgb(rgb: u32) -> [u8; 3] {
    let [_, r, g, b] = rgb.to_be_bytes();
    [r, g, b]
}

/// Parse the digits of a 3, 4, 6 or 8 digit hex color (without `#`).
pub fn parse_hex(hex: &[u8]) -> Option<[u8; 4]> {
    fn digit(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }
    let mut rgba = [0, 0, 0, 255];
    match hex.len() {
        3 | 4 => {
            for (i, &c) in hex.iter().enumerate() {
                let d = digit(c)?;
                rgba[i] = d * 17;
            }
        }
        6 | 8 => {
            for (i, pair) in hex.chunks(2).enumerate() {
                rgba[i] = digit(pair[0])? * 16 + digit(pair[1])?;
            }
        }
        _ => return None,
    }
    Some(rgba)
}

/// Shortest hex or named form of a color.
///
/// An opaque color uses 3 or 6 digits, or a name when that is shorter.
/// Translucent colors use 4 or 8 digits.
pub fn shortest(rgba: [u8; 4]) -> Vec<u8> {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let channels = if rgba[3] == 255 { &rgba[..3] } else { &rgba[..] };
    let short = channels.iter().all(|&c| c % 17 == 0);

    let mut out = vec![b'#'];
    for &c in channels {
        if short {
            out.push(HEX[usize::from(c / 17)]);
        } else {
            out.push(HEX[usize::from(c >> 4)]);
            out.push(HEX[usize::from(c & 15)]);
        }
    }
    if rgba[3] == 255 {
        if let Some(name) = name_of([rgba[0], rgba[1], rgba[2]]) {
            if name.len() < out.len() {
                return name.as_bytes().to_vec();
            }
        }
    }
    out
}

/// Minify a hex color or a color name. Anything else is returned unchanged.
pub fn minify_color(color: &[u8]) -> Vec<u8> {
    if let Some(hex) = color.strip_prefix(b"#") {
        return match parse_hex(hex) {
            Some(rgba) => shortest(rgba),
            None => color.to_vec(),
        };
    }
    if let Some([r, g, b]) = by_name(color) {
        let folded = shortest([r, g, b, 255]);
        if folded.len() < color.len() {
            return folded;
        }
        return color.to_ascii_lowercase();
    }
    color.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn color(s: &str) -> std::string::String {
        std::string::String::from_utf8(minify_color(s.as_bytes())).unwrap()
    }

    #[test]
    fn test_hex() {
        assert_eq!(color("#FF0000"), "red");
        assert_eq!(color("#000000"), "#000");
        assert_eq!(color("#AABBCC"), "#abc");
        assert_eq!(color("#abcdef"), "#abcdef");
        assert_eq!(color("#000080"), "navy");
        assert_eq!(color("#808080"), "gray");
        assert_eq!(color("#ff000080"), "#ff000080");
        assert_eq!(color("#ff0000ff"), "red");
        assert_eq!(color("#f00f"), "red");
        assert_eq!(color("#ffffff88"), "#fff8");
        assert_eq!(color("#xyz"), "#xyz");
        assert_eq!(color("#12345"), "#12345");
    }

    #[test]
    fn test_names() {
        assert_eq!(color("white"), "#fff");
        assert_eq!(color("Black"), "#000");
        assert_eq!(color("lightgoldenrodyellow"), "#fafad2");
        assert_eq!(color("RED"), "red");
        assert_eq!(color("aqua"), "aqua");
        assert_eq!(color("notacolor"), "notacolor");
    }

    #[test]
    fn test_table_is_sorted_and_unique() {
        for pair in NAMED_COLORS.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} >= {}", pair[0].0, pair[1].0);
        }
    }
}
