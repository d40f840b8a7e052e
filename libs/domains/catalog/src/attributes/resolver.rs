//! Which attribute definitions apply to a (main, sub) category pair.

use uuid::Uuid;

use super::models::{AttributeDefinition, ResolvedAttributes};

/// Keep the definitions assigned to `main` whose subcategory set contains
/// `None` (all subcategories) or `sub`, ordered by `sort_order` then `key`.
///
/// No status filtering happens here; callers pass the candidates they want
/// considered.
pub fn resolve(
    definitions: impl IntoIterator<Item = AttributeDefinition>,
    main: Uuid,
    sub: Option<Uuid>,
) -> ResolvedAttributes {
    let mut definitions: Vec<AttributeDefinition> = definitions
        .into_iter()
        .filter(|def| def.applies_to(main, sub))
        .collect();

    definitions.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.key.cmp(&b.key)));

    let keys = definitions.iter().map(|def| def.key.clone()).collect();
    ResolvedAttributes { definitions, keys }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::models::{AttributeType, CreateAttribute};

    fn def(key: &str, sort_order: i32, mains: Vec<Uuid>, subs: Vec<Option<Uuid>>) -> AttributeDefinition {
        let mut def = AttributeDefinition::new(CreateAttribute {
            key: key.into(),
            label: key.into(),
            value_type: AttributeType::String,
            constraints: Default::default(),
            main_category_ids: mains,
            sub_category_ids: vec![],
            sort_order,
        });
        // bypass the empty -> [None] default so tests can express any set
        def.sub_category_ids = subs;
        def
    }

    #[test]
    fn test_unions_main_wide_and_sub_specific() {
        let (electronics, home) = (Uuid::now_v7(), Uuid::now_v7());
        let (phones, laptops) = (Uuid::now_v7(), Uuid::now_v7());

        let defs = vec![
            def("warranty", 0, vec![electronics], vec![None]),
            def("screen_size", 1, vec![electronics], vec![Some(phones), Some(laptops)]),
            def("keyboard_layout", 2, vec![electronics], vec![Some(laptops)]),
            def("material", 0, vec![home], vec![None]),
        ];

        let resolved = resolve(defs.clone(), electronics, Some(phones));
        assert_eq!(resolved.keys, vec!["warranty", "screen_size"]);

        let resolved = resolve(defs.clone(), electronics, Some(laptops));
        assert_eq!(resolved.keys, vec!["warranty", "screen_size", "keyboard_layout"]);

        let resolved = resolve(defs, electronics, None);
        assert_eq!(resolved.keys, vec!["warranty"]);
    }

    #[test]
    fn test_matches_predicate_exactly() {
        let main = Uuid::now_v7();
        let sub = Uuid::now_v7();
        let other = Uuid::now_v7();

        let defs = vec![
            def("a", 0, vec![main], vec![None]),
            def("b", 0, vec![main], vec![Some(sub)]),
            def("c", 0, vec![main], vec![Some(other)]),
            def("d", 0, vec![other], vec![None, Some(sub)]),
            def("e", 0, vec![main, other], vec![Some(other), None]),
            def("f", 0, vec![main], vec![]),
        ];

        let resolved = resolve(defs.clone(), main, Some(sub));
        let expected: Vec<String> = defs
            .iter()
            .filter(|d| {
                d.main_category_ids.contains(&main)
                    && (d.sub_category_ids.contains(&None)
                        || d.sub_category_ids.contains(&Some(sub)))
            })
            .map(|d| d.key.clone())
            .collect();

        assert_eq!(resolved.keys, expected);
        assert_eq!(resolved.keys, vec!["a", "b", "e"]);
    }

    #[test]
    fn test_orders_by_sort_order_then_key() {
        let main = Uuid::now_v7();
        let defs = vec![
            def("zeta", 1, vec![main], vec![None]),
            def("beta", 2, vec![main], vec![None]),
            def("alpha", 1, vec![main], vec![None]),
        ];

        assert_eq!(resolve(defs, main, None).keys, vec!["alpha", "zeta", "beta"]);
    }
}
