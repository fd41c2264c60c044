use dom_probe::{Page, escape};
use proptest::prelude::*;

fn seeded_page(seed: u64) -> Page {
    let mut page = Page::from_html("<div></div>").expect("static html parses");
    page.set_random_seed(seed);
    page
}

proptest! {
    #[test]
    fn random_text_has_exact_length_and_alphabet(seed in any::<u64>(), len in 0usize..128) {
        let mut page = seeded_page(seed);
        let text = page.random_text(len);
        prop_assert_eq!(text.len(), len);
        prop_assert!(text.chars().all(|ch| ch.is_ascii_alphanumeric()));
    }

    #[test]
    fn random_number_stays_in_its_documented_range(seed in any::<u64>()) {
        let mut page = seeded_page(seed);
        for _ in 0..32 {
            let n = page.random_number();
            prop_assert!((2000..=3000).contains(&n));
        }
    }

    #[test]
    fn random_zip_stays_in_its_documented_range(seed in any::<u64>()) {
        let mut page = seeded_page(seed);
        for _ in 0..32 {
            let zip = page.random_zip();
            prop_assert!((30000..=38888).contains(&zip));
        }
    }

    #[test]
    fn equal_seeds_generate_equal_sequences(seed in any::<u64>()) {
        let mut a = seeded_page(seed);
        let mut b = seeded_page(seed);
        prop_assert_eq!(a.random_text(16), b.random_text(16));
        prop_assert_eq!(a.random_number(), b.random_number());
        prop_assert_eq!(a.random_zip(), b.random_zip());
    }

    #[test]
    fn escape_leaves_no_bare_quote_behind(input in ".*") {
        let escaped = escape(&input);

        let mut previous = None;
        for ch in escaped.chars() {
            if ch == '"' || ch == '\'' {
                prop_assert_eq!(previous, Some('\\'), "unescaped quote in {:?}", escaped);
            }
            previous = Some(ch);
        }

        let quote_count = input.chars().filter(|ch| *ch == '"' || *ch == '\'').count();
        prop_assert_eq!(escaped.len(), input.len() + quote_count);
    }
}
