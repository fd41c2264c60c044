use dom_probe::{AttrQuery, FieldValue, Page, Rect};

const OFFSCREEN: Rect = Rect {
    top: 2000.0,
    left: 0.0,
    bottom: 2100.0,
    right: 120.0,
};

#[test]
fn click_dispatches_to_visible_elements() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <button id='go'>Go</button>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    let listener = page.add_listener("#go", "click")?;

    page.click("#go")?;
    assert_eq!(page.listener_hits(listener), 1);

    let events = page.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "click");
    assert_eq!(events[0].target, "//*[@id='go']");
    Ok(())
}

#[test]
fn click_is_a_no_op_outside_the_viewport() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<body><button id='go'>Go</button></body>")?;
    let listener = page.add_listener("#go", "click")?;
    page.set_element_rect("#go", OFFSCREEN)?;

    page.click("#go")?;
    assert_eq!(page.listener_hits(listener), 0);
    assert!(page.take_events().is_empty());
    Ok(())
}

#[test]
fn click_toggles_checkboxes_and_reports_input_then_change() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <input id='agree' type='checkbox'>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    page.click("#agree")?;

    let events: Vec<String> = page
        .take_events()
        .into_iter()
        .map(|record| record.event_type)
        .collect();
    assert_eq!(events, ["click", "input", "change"]);

    assert_eq!(page.count("#agree:checked")?, 1);
    page.click("#agree")?;
    assert_eq!(page.count("#agree:checked")?, 0);
    Ok(())
}

#[test]
fn click_skips_disabled_controls() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<body><button id='go' disabled>Go</button></body>")?;
    page.click("#go")?;
    assert!(page.take_events().is_empty());
    Ok(())
}

#[test]
fn click_all_without_class_gates_on_visibility() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <button class='row'>one</button>
        <button class='row'>two</button>
        <button class='row'>three</button>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    page.set_element_rect("//BODY/BUTTON[2]", OFFSCREEN)?;

    page.click_all(".row", None)?;
    let clicked: Vec<String> = page
        .take_events()
        .into_iter()
        .map(|record| record.target)
        .collect();
    assert_eq!(clicked, ["//BODY/BUTTON[1]", "//BODY/BUTTON[3]"]);
    Ok(())
}

#[test]
fn click_all_with_class_ignores_the_viewport() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <button class='row primary'>one</button>
        <button class='row'>two</button>
        <button class='row primary'>three</button>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    // Off-screen, but the class branch clicks it anyway.
    page.set_element_rect("//BODY/BUTTON[1]", OFFSCREEN)?;

    page.click_all(".row", Some("primary"))?;
    let clicked: Vec<String> = page
        .take_events()
        .into_iter()
        .map(|record| record.target)
        .collect();
    assert_eq!(clicked, ["//BODY/BUTTON[1]", "//BODY/BUTTON[3]"]);
    Ok(())
}

#[test]
fn set_value_assigns_literals_and_fires_change_then_input() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<body><input id='name'></body>")?;
    let change = page.add_listener("#name", "change")?;
    let input = page.add_listener("#name", "input")?;

    page.set_value("#name", FieldValue::Literal("Ada".into()))?;

    assert_eq!(page.element_attr("#name", AttrQuery::Value)?, "Ada");
    assert_eq!(page.listener_hits(change), 1);
    assert_eq!(page.listener_hits(input), 1);

    let events: Vec<String> = page
        .take_events()
        .into_iter()
        .map(|record| record.event_type)
        .collect();
    assert_eq!(events, ["change", "input"]);
    Ok(())
}

#[test]
fn set_value_int_assigns_a_number_in_range() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<body><input id='qty'></body>")?;
    page.set_value("#qty", FieldValue::Int)?;

    let value: i64 = page
        .element_attr("#qty", AttrQuery::Value)?
        .parse()
        .expect("numeric value");
    assert!((2000..=3000).contains(&value));
    Ok(())
}

#[test]
fn set_value_text_assigns_ten_alphanumeric_characters() -> dom_probe::Result<()> {
    let mut page = Page::from_html("<body><input id='name'></body>")?;
    page.set_value("#name", FieldValue::Text)?;

    let value = page.element_attr("#name", AttrQuery::Value)?;
    assert_eq!(value.len(), 10);
    assert!(value.chars().all(|ch| ch.is_ascii_alphanumeric()));
    Ok(())
}

#[test]
fn set_value_on_a_select_settles_on_the_matching_option() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <select id='color'>
            <option value='red'>Red</option>
            <option value='blue'>Blue</option>
        </select>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    page.set_value("#color", FieldValue::Literal("blue".into()))?;
    assert_eq!(page.element_attr("#color", AttrQuery::Value)?, "blue");
    assert_eq!(page.count("option[selected]")?, 1);
    Ok(())
}

#[test]
fn listeners_hear_events_bubbling_from_descendants() -> dom_probe::Result<()> {
    let html = r#"
    <body>
        <form id='f'>
            <input id='name'>
        </form>
    </body>
    "#;

    let mut page = Page::from_html(html)?;
    let on_form = page.add_listener("#f", "input")?;
    page.set_value("#name", FieldValue::Literal("x".into()))?;
    assert_eq!(page.listener_hits(on_form), 1);
    Ok(())
}
