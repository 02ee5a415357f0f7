// Java primitive conversion tables (JLS 5.1.2, 5.1.3, 5.1.7).

/// Primitive name → its `java.lang` wrapper class.
pub const WRAPPERS: [(&str, &str); 9] = [
    ("boolean", "java.lang.Boolean"),
    ("byte", "java.lang.Byte"),
    ("char", "java.lang.Character"),
    ("short", "java.lang.Short"),
    ("int", "java.lang.Integer"),
    ("long", "java.lang.Long"),
    ("float", "java.lang.Float"),
    ("double", "java.lang.Double"),
    ("void", "java.lang.Void"),
];

const WIDENING: &[(&str, &[&str])] = &[
    ("byte", &["short", "int", "long", "float", "double"]),
    ("short", &["int", "long", "float", "double"]),
    ("char", &["int", "long", "float", "double"]),
    ("int", &["long", "float", "double"]),
    ("long", &["float", "double"]),
    ("float", &["double"]),
];

const NARROWING: &[(&str, &[&str])] = &[
    ("short", &["byte", "char"]),
    ("char", &["byte", "short"]),
    ("int", &["byte", "short", "char"]),
    ("long", &["byte", "short", "char", "int"]),
    ("float", &["byte", "short", "char", "int", "long"]),
    ("double", &["byte", "short", "char", "int", "long", "float"]),
];

pub fn wrapper_of(primitive: &str) -> Option<&'static str> {
    WRAPPERS
        .iter()
        .find(|(p, _)| *p == primitive)
        .map(|(_, w)| *w)
}

pub fn primitive_of(wrapper: &str) -> Option<&'static str> {
    WRAPPERS
        .iter()
        .find(|(_, w)| *w == wrapper)
        .map(|(p, _)| *p)
}

/// `primitive` → `wrapper` is an autoboxing conversion.
pub fn is_boxing(primitive: &str, wrapper: &str) -> bool {
    wrapper_of(primitive) == Some(wrapper)
}

pub fn is_unboxing(wrapper: &str, primitive: &str) -> bool {
    is_boxing(primitive, wrapper)
}

pub fn is_widening(from: &str, to: &str) -> bool {
    in_table(WIDENING, from, to)
}

pub fn is_narrowing(from: &str, to: &str) -> bool {
    in_table(NARROWING, from, to)
}

fn in_table(table: &[(&str, &[&str])], from: &str, to: &str) -> bool {
    table
        .iter()
        .any(|(source, targets)| *source == from && targets.contains(&to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PRIMITIVES: [&str; 9] = [
        "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
    ];

    #[test]
    fn common_conversions() {
        assert!(is_widening("int", "long"));
        assert!(!is_narrowing("int", "long"));
        assert!(is_narrowing("double", "float"));
        assert!(is_widening("char", "int"));
        assert!(!is_widening("char", "short"));
        assert!(!is_widening("short", "short"));
        // byte → char widens and then narrows, so it belongs to neither table.
        assert!(!is_widening("byte", "char") && !is_narrowing("byte", "char"));
        assert!(!is_widening("boolean", "int"));
    }

    #[test]
    fn boxing_pairs() {
        assert!(is_boxing("int", "java.lang.Integer"));
        assert!(is_unboxing("java.lang.Character", "char"));
        assert!(!is_boxing("int", "java.lang.Long"));
        assert!(!is_boxing("int", "Integer"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn widening_and_narrowing_are_exclusive(
            a in prop::sample::select(PRIMITIVES.to_vec()),
            b in prop::sample::select(PRIMITIVES.to_vec()),
        ) {
            prop_assert!(!(is_widening(a, b) && is_narrowing(a, b)));
            prop_assert!(!(is_widening(a, b) && is_widening(b, a)));
        }

        #[test]
        fn wrapper_table_is_a_bijection(p in prop::sample::select(PRIMITIVES.to_vec())) {
            let wrapper = wrapper_of(p);
            prop_assert!(wrapper.is_some());
            prop_assert_eq!(wrapper.and_then(primitive_of), Some(p));
            let others = PRIMITIVES.iter().filter(|q| **q != p);
            for q in others {
                prop_assert_ne!(wrapper_of(q), wrapper);
            }
        }
    }
}
