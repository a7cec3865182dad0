//! The Signature Encoder — deterministic text → visual/audio parameters.
//!
//! `encode()` is pure and total: the same text always yields the same
//! `Signature`, on any platform, in any session. Everything downstream
//! (orb color, shape silhouette, wobble, tone pitch, the obscured
//! "encrypted" display string) is derived from this one bundle.
//!
//! Pipeline:
//! 1. Rolling 32-bit hash over UTF-16 code units (JS `charCodeAt`
//!    semantics, wrapping signed arithmetic).
//! 2. Ordered keyword classification (anger → calm → secrecy), first
//!    match wins — see `rules`.
//! 3. Matched category → fixed style tuple; no match → hash-keyed pick
//!    from the fallback palette and shape list.

pub mod rules;

use rules::match_rule;

// ─── Shapes ──────────────────────────────────────────────────────────────────

/// Fixed set of orb silhouettes. The renderer has a drawing arm for every
/// variant plus a sphere default, so an unsupported shape can never fail a
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Sphere,
    Icosahedron,
    TorusKnot,
    Cube,
    Octahedron,
    Torus,
}

// ─── Fallback tables ─────────────────────────────────────────────────────────

/// Palette for uncategorized messages, indexed by `|hash| % len`.
const FALLBACK_COLORS: &[&str] = &[
    "#22d3ee", // cyan
    "#f59e0b", // amber
    "#10b981", // emerald
    "#e879f9", // fuchsia
    "#94a3b8", // slate
    "#facc15", // yellow
    "#fb7185", // rose
    "#34d399", // mint
];

/// Shape list for uncategorized messages, indexed by `|hash| % len`.
const FALLBACK_SHAPES: &[Shape] = &[
    Shape::Sphere,
    Shape::Cube,
    Shape::Octahedron,
    Shape::Torus,
];

/// Glyph alphabet for the obscured display string.
const CIPHER_GLYPHS: &[char] = &[
    '▚', '▞', '◆', '◇', '✦', '✧', '†', '‡', '♦', '⌁', '∴', '∷', '⟁', '⟐', '◈', '▣',
];

// ─── Signature ───────────────────────────────────────────────────────────────

/// Immutable visual/audio parameter bundle for one message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signature {
    /// Hex color, always drawn from a fixed static table.
    pub color: &'static str,
    pub shape: Shape,
    /// Surface wobble amount, 0.0–1.0.
    pub distort: f32,
    /// Animation speed multiplier.
    pub speed: f32,
    pub roughness: f32,
    pub metalness: f32,
    /// Matched category name, `None` for the fallback branch.
    pub category: Option<&'static str>,
    /// Raw rolling hash of the source text.
    pub hash: i32,
}

// ─── Hash ────────────────────────────────────────────────────────────────────

/// Rolling polynomial hash: `h = c + ((h << 5) - h)` over UTF-16 code
/// units with wrapping 32-bit arithmetic. Empty text hashes to 0.
pub fn text_hash(text: &str) -> i32 {
    let mut h: i32 = 0;
    for unit in text.encode_utf16() {
        h = (unit as i32).wrapping_add((h << 5).wrapping_sub(h));
    }
    h
}

// ─── Encode ──────────────────────────────────────────────────────────────────

/// Map text to its deterministic `Signature`. Total: never panics, any
/// input (empty, non-ASCII, astral-plane) produces a valid bundle.
pub fn encode(text: &str) -> Signature {
    let hash = text_hash(text);
    let lowered = text.to_lowercase();

    if let Some(rule) = match_rule(&lowered) {
        let s = rule.style;
        return Signature {
            color: s.color,
            shape: s.shape,
            distort: s.distort,
            speed: s.speed,
            roughness: s.roughness,
            metalness: s.metalness,
            category: Some(s.name),
            hash,
        };
    }

    // Hash-keyed fallback: pseudo-random but stable per text.
    let h = hash.unsigned_abs();
    let color = FALLBACK_COLORS[h as usize % FALLBACK_COLORS.len()];
    let shape = FALLBACK_SHAPES[h as usize % FALLBACK_SHAPES.len()];
    let metallic = h % 3 == 0;

    Signature {
        color,
        shape,
        distort: 0.3 + (h % 40) as f32 / 100.0,
        speed: 0.8 + (h % 17) as f32 / 10.0,
        roughness: if metallic { 0.2 } else { 0.6 },
        metalness: if metallic { 0.9 } else { 0.1 },
        category: None,
        hash,
    }
}

// ─── Derived displays ────────────────────────────────────────────────────────

/// Hash-keyed "encrypted" rendition of the text: every non-whitespace
/// character is substituted with a glyph, whitespace is preserved. Same
/// text → same glyph string.
pub fn obscured_text(text: &str, hash: i32) -> String {
    let h = hash.unsigned_abs();
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_whitespace() {
                c
            } else {
                let idx = h.wrapping_add((i as u32).wrapping_mul(2654435761));
                CIPHER_GLYPHS[idx as usize % CIPHER_GLYPHS.len()]
            }
        })
        .collect()
}

/// Tone pitch for a signature, in Hz. Bounded band so every message is
/// audible; pure so it is testable without an audio device.
pub fn tone_frequency(sig: &Signature) -> f32 {
    160.0 + (sig.hash.unsigned_abs() % 240) as f32
}

/// Parse a `#rrggbb` table color. Tables are fixed, so a malformed entry
/// falls back to mid-gray rather than failing a frame.
pub fn color_rgb(hex: &str) -> [u8; 3] {
    fn nibble(b: u8) -> Option<u8> {
        (b as char).to_digit(16).map(|d| d as u8)
    }
    let bytes = hex.as_bytes();
    if bytes.len() == 7 && bytes[0] == b'#' {
        let mut out = [0u8; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            match (nibble(bytes[1 + i * 2]), nibble(bytes[2 + i * 2])) {
                (Some(hi), Some(lo)) => *slot = hi * 16 + lo,
                _ => return [0x80, 0x80, 0x80],
            }
        }
        return out;
    }
    [0x80, 0x80, 0x80]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_pure() {
        for text in ["hello", "", "I am angry!", "日本語のテキスト", "🦀 crab"] {
            assert_eq!(encode(text), encode(text), "text {text:?}");
        }
    }

    #[test]
    fn empty_string_is_valid_fallback() {
        let sig = encode("");
        assert_eq!(sig.hash, 0);
        assert_eq!(sig.category, None);
        assert_eq!(sig.color, FALLBACK_COLORS[0]);
        assert_eq!(sig.shape, FALLBACK_SHAPES[0]);
    }

    #[test]
    fn anger_fixed_tuple() {
        let sig = encode("I am ANGRY about this");
        assert_eq!(sig.color, "#ef4444");
        assert_eq!(sig.shape, Shape::Icosahedron);
        assert_eq!(sig.distort, 0.8);
        assert_eq!(sig.category, Some("ANGER"));
    }

    #[test]
    fn calm_fixed_tuple() {
        let sig = encode("calm waves on the shore");
        assert_eq!(sig.color, "#3b82f6");
        assert_eq!(sig.shape, Shape::Sphere);
        assert_eq!(sig.distort, 0.2);
        assert_eq!(sig.category, Some("CALM"));
    }

    #[test]
    fn secrecy_fixed_tuple() {
        let sig = encode("Secrets hide in plain sight");
        assert_eq!(sig.color, "#a855f7");
        assert_eq!(sig.shape, Shape::TorusKnot);
        assert_eq!(sig.category, Some("SECRECY"));
    }

    #[test]
    fn fallback_is_hash_indexed_and_stable() {
        let text = "totally neutral words";
        let sig = encode(text);
        assert_eq!(sig.category, None);

        let h = sig.hash.unsigned_abs() as usize;
        assert_eq!(sig.color, FALLBACK_COLORS[h % FALLBACK_COLORS.len()]);
        assert_eq!(sig.shape, FALLBACK_SHAPES[h % FALLBACK_SHAPES.len()]);

        // Stable across repeated calls.
        assert_eq!(encode(text).color, sig.color);
        assert_eq!(encode(text).shape, sig.shape);
    }

    #[test]
    fn hash_matches_js_recurrence() {
        // h("a") = 97; h("ab") = 98 + 31*97 = 3105.
        assert_eq!(text_hash("a"), 97);
        assert_eq!(text_hash("ab"), 3105);
        assert_eq!(text_hash(""), 0);
    }

    #[test]
    fn hash_wraps_on_long_input() {
        // Long input must wrap instead of overflowing; value only needs to
        // be stable.
        let long = "x".repeat(10_000);
        assert_eq!(text_hash(&long), text_hash(&long));
    }

    #[test]
    fn non_ascii_hash_uses_utf16_units() {
        // "𝄞" is one astral-plane char = two UTF-16 surrogates, so its
        // hash must differ from the single-unit BMP recurrence.
        let g_clef = text_hash("𝄞");
        let units: Vec<u16> = "𝄞".encode_utf16().collect();
        assert_eq!(units.len(), 2);
        let expected = (units[1] as i32)
            .wrapping_add(((units[0] as i32) << 5).wrapping_sub(units[0] as i32));
        assert_eq!(g_clef, expected);
    }

    #[test]
    fn obscured_preserves_whitespace_and_length() {
        let text = "two words";
        let sig = encode(text);
        let obscured = obscured_text(text, sig.hash);
        assert_eq!(obscured.chars().count(), text.chars().count());
        assert_eq!(obscured.chars().nth(3), Some(' '));
        assert!(obscured.chars().filter(|c| !c.is_whitespace()).all(|c| CIPHER_GLYPHS.contains(&c)));
        // Deterministic.
        assert_eq!(obscured, obscured_text(text, sig.hash));
    }

    #[test]
    fn tone_frequency_in_band() {
        for text in ["", "hello", "angry storm", "ゆっくり"] {
            let f = tone_frequency(&encode(text));
            assert!((160.0..400.0).contains(&f), "freq {f} for {text:?}");
        }
    }

    #[test]
    fn color_rgb_parses_table_entries() {
        assert_eq!(color_rgb("#ef4444"), [0xef, 0x44, 0x44]);
        assert_eq!(color_rgb("#3b82f6"), [0x3b, 0x82, 0xf6]);
        assert_eq!(color_rgb("not-a-color"), [0x80, 0x80, 0x80]);
    }
}
