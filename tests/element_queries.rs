use dom_probe::{AttrQuery, Error, Locator, Page};

#[test]
fn get_element_resolves_first_match_in_document_order() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <div class='card'>first</div>
        <div class='card'>second</div>
    </body>
    "#;

    let page = Page::from_html(html)?;
    let node = page.element(".card")?.expect("card resolves");
    assert_eq!(page.element_attr(Locator::Node(node), AttrQuery::Text)?, "first");
    Ok(())
}

#[test]
fn xpath_locators_resolve_through_the_same_entry_point() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <section>
            <h2>Cart</h2>
            <h2>Checkout</h2>
        </section>
    </body>
    "#;

    let page = Page::from_html(html)?;
    let node = page.element("//BODY/SECTION[1]/H2[2]")?.expect("h2 resolves");
    assert_eq!(page.element_attr(Locator::Node(node), AttrQuery::Text)?, "Checkout");
    Ok(())
}

#[test]
fn get_elements_returns_parallel_xpath_and_index_sequences() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <ul>
            <li class='item'>a</li>
            <li class='item'>b</li>
            <li class='item'>c</li>
        </ul>
    </body>
    "#;

    let page = Page::from_html(html)?;
    let list = page.elements(".item")?;

    assert_eq!(list.len(), page.count(".item")?);
    assert_eq!(list.indexes, vec![0, 1, 2]);
    assert_eq!(list.xpaths.len(), list.indexes.len());
    for (xpath, index) in list.xpaths.iter().zip(&list.indexes) {
        let node = page.element_by_xpath(xpath)?.expect("xpath resolves");
        let text = page.element_attr(Locator::Node(node), AttrQuery::Text)?;
        assert_eq!(text, ["a", "b", "c"][*index]);
    }
    Ok(())
}

#[test]
fn count_is_zero_for_unmatched_selectors() -> dom_probe::Result<()> {
    let page = Page::from_html("<div class='only'></div>")?;
    assert_eq!(page.count(".only")?, 1);
    assert_eq!(page.count(".absent")?, 0);
    assert_eq!(page.element(".absent")?, None);
    Ok(())
}

#[test]
fn element_attr_reads_path_value_and_trimmed_text() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <input id='qty' value='3'>
        <p class='note'>
            spaced out
        </p>
    </body>
    "#;

    let page = Page::from_html(html)?;
    assert_eq!(page.element_attr("#qty", AttrQuery::Value)?, "3");
    assert_eq!(page.element_attr("#qty", AttrQuery::Path)?, "//*[@id='qty']");
    assert_eq!(page.element_attr(".note", AttrQuery::Text)?, "spaced out");
    Ok(())
}

#[test]
fn element_attr_on_missing_element_is_a_typed_error() {
    let page = Page::from_html("<div></div>").unwrap();
    let err = page.element_attr("#ghost", AttrQuery::Text).unwrap_err();
    assert!(matches!(err, Error::ElementNotFound(_)));
}

#[test]
fn dropdown_option_picks_only_options_with_non_empty_values() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <select id='color'>
            <option value=''>Choose a color</option>
            <option value='red'>Red</option>
            <option value='blue'>Blue</option>
        </select>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    for _ in 0..20 {
        let text = page
            .dropdown_option("#color", AttrQuery::Text)?
            .expect("an option is picked");
        assert!(text == "Red" || text == "Blue", "picked placeholder: {text}");

        let value = page
            .dropdown_option("#color", AttrQuery::Value)?
            .expect("an option is picked");
        assert!(value == "red" || value == "blue");
    }
    Ok(())
}

#[test]
fn dropdown_option_is_none_when_nothing_resolves() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<select id='empty'></select>")?;
    assert_eq!(page.dropdown_option("#ghost", AttrQuery::Text)?, None);
    assert_eq!(page.dropdown_option("#empty", AttrQuery::Text)?, None);
    Ok(())
}

#[test]
fn node_locators_survive_round_trips() -> dom_probe::Result<()> {
    let page = Page::from_html("<body><div id='x'>hi</div></body>")?;
    let node = page.element("#x")?.expect("div resolves");
    assert_eq!(page.element(node)?, Some(node));
    assert_eq!(page.count(node)?, 1);
    Ok(())
}
