//! Category rules for the signature encoder.
//!
//! Each rule is a keyword set plus the fixed visual style it maps to.
//! Rules are evaluated in order, first match wins: anger → calm → secrecy.
//! A message matching none of them falls into the hash-derived branch in
//! `encode()`.

use super::Shape;

/// Fixed visual parameters assigned to a matched category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryStyle {
    pub name: &'static str,
    pub color: &'static str,
    pub shape: Shape,
    pub distort: f32,
    pub speed: f32,
    pub roughness: f32,
    pub metalness: f32,
}

/// One classification rule: ordered keyword containment → fixed style.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub keywords: &'static [&'static str],
    pub style: CategoryStyle,
}

/// Ordered rule table. Evaluation order is part of the contract.
pub const RULES: &[CategoryRule] = &[
    CategoryRule {
        keywords: &["angry", "anger", "hate", "rage", "furious", "mad"],
        style: CategoryStyle {
            name: "ANGER",
            color: "#ef4444",
            shape: Shape::Icosahedron,
            distort: 0.8,
            speed: 2.4,
            roughness: 0.25,
            metalness: 0.1,
        },
    },
    CategoryRule {
        keywords: &["calm", "peace", "serene", "gentle", "quiet", "still"],
        style: CategoryStyle {
            name: "CALM",
            color: "#3b82f6",
            shape: Shape::Sphere,
            distort: 0.2,
            speed: 0.6,
            roughness: 0.15,
            metalness: 0.3,
        },
    },
    // No "cipher" here: the welcome seed message must stay uncategorized.
    CategoryRule {
        keywords: &["secret", "hidden", "hush", "whisper", "conceal", "encrypt"],
        style: CategoryStyle {
            name: "SECRECY",
            color: "#a855f7",
            shape: Shape::TorusKnot,
            distort: 0.45,
            speed: 1.1,
            roughness: 0.4,
            metalness: 0.7,
        },
    },
];

/// Find the first rule whose keyword set matches the lower-cased text.
pub fn match_rule(lowered: &str) -> Option<&'static CategoryRule> {
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anger_wins_over_later_rules() {
        // Contains both an anger and a secrecy keyword; anger is first.
        let rule = match_rule("an angry secret").expect("should match");
        assert_eq!(rule.style.name, "ANGER");
    }

    #[test]
    fn each_rule_matches_its_own_keywords() {
        for rule in RULES {
            for kw in rule.keywords {
                let matched = match_rule(kw).expect("keyword should match");
                assert_eq!(matched.style.name, rule.style.name, "keyword {kw}");
            }
        }
    }

    #[test]
    fn welcome_message_stays_uncategorized() {
        assert!(match_rule("welcome to ciphercanvas").is_none());
    }

    #[test]
    fn containment_not_equality() {
        let rule = match_rule("secrets hide in plain sight").expect("should match");
        assert_eq!(rule.style.name, "SECRECY");
    }
}
