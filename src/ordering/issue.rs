use std::cmp::Ordering;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Vulgar fraction glyphs and the value each one stands for.
const VULGAR_FRACTIONS: [(char, f64); 18] = [
    ('¼', 1.0 / 4.0),
    ('½', 1.0 / 2.0),
    ('¾', 3.0 / 4.0),
    ('⅐', 1.0 / 7.0),
    ('⅑', 1.0 / 9.0),
    ('⅒', 1.0 / 10.0),
    ('⅓', 1.0 / 3.0),
    ('⅔', 2.0 / 3.0),
    ('⅕', 1.0 / 5.0),
    ('⅖', 2.0 / 5.0),
    ('⅗', 3.0 / 5.0),
    ('⅘', 4.0 / 5.0),
    ('⅙', 1.0 / 6.0),
    ('⅚', 5.0 / 6.0),
    ('⅛', 1.0 / 8.0),
    ('⅜', 3.0 / 8.0),
    ('⅝', 5.0 / 8.0),
    ('⅞', 7.0 / 8.0),
];

/// Sort value of a free-text issue designator. Used for ordering only; the
/// raw designator stays the identity.
///
/// Strategies, first success wins: integer, finite decimal, vulgar fraction
/// glyph or `n/d` rational, then the FNV-1a hash of the raw text.
pub fn issue_value(issue: &str) -> f64 {
    parse_integer(issue)
        .or_else(|| parse_decimal(issue))
        .or_else(|| parse_fraction(issue))
        .unwrap_or_else(|| fnv1a_32(issue.as_bytes()) as f64)
}

/// Total order over issue designators, by [`issue_value`].
pub fn compare_issues(a: &str, b: &str) -> Ordering {
    issue_value(a).total_cmp(&issue_value(b))
}

fn parse_integer(s: &str) -> Option<f64> {
    s.parse::<i64>().ok().map(|i| i as f64)
}

fn parse_decimal(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_fraction(s: &str) -> Option<f64> {
    let mut chars = s.chars();
    if let (Some(glyph), None) = (chars.next(), chars.next()) {
        if let Some((_, value)) = VULGAR_FRACTIONS.iter().find(|(g, _)| *g == glyph) {
            return Some(*value);
        }
    }
    parse_rational(s)
}

fn parse_rational(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num = num.parse::<i64>().ok()?;
    let den = den.parse::<i64>().ok()?;
    if den == 0 {
        return None;
    }
    Some(num as f64 / den as f64)
}

pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ *b as u32).wrapping_mul(FNV_PRIME)
    })
}
