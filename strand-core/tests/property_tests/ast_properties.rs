//! Hash-consing properties of the term manager.

use proptest::prelude::*;
use strand_core::ast::TermManager;

proptest! {
    /// Interning the same literal twice yields the same id.
    #[test]
    fn string_literal_uniqueness(s in "[ab]{0,4}") {
        let mut tm = TermManager::new();
        let t1 = tm.mk_string_lit(&s);
        let t2 = tm.mk_string_lit(&s);
        prop_assert_eq!(t1, t2);
    }

    /// Variables are identified by name and sort.
    #[test]
    fn variable_uniqueness(name in "[a-z][0-9]?") {
        let mut tm = TermManager::new();
        let sort = tm.sorts.string_sort();
        let v1 = tm.mk_var(&name, sort);
        let v2 = tm.mk_var(&name, sort);
        prop_assert_eq!(v1, v2);
        let int_sort = tm.sorts.int_sort;
        let v3 = tm.mk_var(&name, int_sort);
        prop_assert_ne!(v1, v3);
    }

    /// Structurally equal concatenations share one id.
    #[test]
    fn concat_uniqueness(a in "[ab]{1,3}", b in "[ab]{1,3}") {
        let mut tm = TermManager::new();
        let la = tm.mk_string_lit(&a);
        let lb = tm.mk_string_lit(&b);
        let c1 = tm.mk_str_concat(la, lb);
        let c2 = tm.mk_str_concat(la, lb);
        prop_assert_eq!(c1, c2);
    }
}
