use dom_probe::{AttrQuery, FieldValue, Locator, Page};
use serde::{Deserialize, Serialize};

#[test]
fn select_binds_the_locator_for_chained_calls() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <input id='qty'>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    let change = page.add_listener("#qty", "change")?;
    let input = page.add_listener("#qty", "input")?;

    page.select("#qty").set_value(FieldValue::Int)?.click()?;

    let value: i64 = page
        .element_attr("#qty", AttrQuery::Value)?
        .parse()
        .expect("numeric value");
    assert!((2000..=3000).contains(&value));
    assert_eq!(page.listener_hits(change), 1);
    assert_eq!(page.listener_hits(input), 1);

    let events: Vec<String> = page
        .take_events()
        .into_iter()
        .map(|record| record.event_type)
        .collect();
    assert_eq!(events, ["change", "input", "click"]);
    Ok(())
}

#[test]
fn selection_inspects_without_repeating_the_selector() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <ul>
            <li class='item'>alpha</li>
            <li class='item'>beta</li>
        </ul>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    let selection = page.select(".item");

    assert_eq!(selection.count()?, 2);
    assert_eq!(selection.attr(AttrQuery::Text)?, "alpha");
    let list = selection.elements()?;
    assert_eq!(list.indexes, vec![0, 1]);
    Ok(())
}

#[test]
fn select_escapes_quotes_in_string_selectors() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<div></div>")?;
    let selection = page.select("button[aria-label='Don't']");
    assert_eq!(
        selection.locator(),
        &Locator::Css("button[aria-label=\\'Don\\'t\\']".to_string())
    );
    Ok(())
}

#[test]
fn select_passes_node_handles_through_unescaped() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<body><p id='msg'>hi</p></body>")?;
    let node = page.element("#msg")?.expect("p resolves");

    let selection = page.select(node);
    assert_eq!(selection.locator(), &Locator::Node(node));
    assert_eq!(selection.attr(AttrQuery::Text)?, "hi");
    Ok(())
}

#[test]
fn string_payloads_keep_the_text_and_int_shorthands() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<body><input id='name'></body>")?;
    page.select("#name").set_value("text")?;

    let value = page.element_attr("#name", AttrQuery::Value)?;
    assert_eq!(value.len(), 10);
    assert!(value.chars().all(|ch| ch.is_ascii_alphanumeric()));

    page.select("#name").set_value("Grace")?;
    assert_eq!(page.element_attr("#name", AttrQuery::Value)?, "Grace");
    Ok(())
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Checkout {
    sku: String,
    quantity: u32,
}

#[test]
fn store_then_fetch_round_trips_json_values() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<div></div>")?;

    let order = Checkout {
        sku: "A-100".into(),
        quantity: 2,
    };
    page.store("order", &order)?;

    let fetched: Option<Checkout> = page.fetch("order")?;
    assert_eq!(fetched, Some(order));
    Ok(())
}

#[test]
fn store_overwrites_and_fetch_misses_are_none() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<div></div>")?;

    page.store("k", &1u32)?;
    page.store("k", &2u32)?;
    assert_eq!(page.fetch::<u32>("k")?, Some(2));

    assert_eq!(page.fetch::<u32>("missing")?, None);
    Ok(())
}

#[test]
fn host_is_available_alongside_storage() -> dom_probe::Result<()> {
    let mut page = Page::from_html_with_url("http://app.local:3000/login", "<div></div>")?;
    page.store("origin", &page.host())?;
    assert_eq!(page.fetch::<String>("origin")?, Some("http://app.local:3000".into()));
    Ok(())
}
