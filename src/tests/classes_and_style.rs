use super::*;

#[test]
fn add_then_has_class_works() -> Result<()> {
    let page = Page::from_html("<p id='p'>x</p>")?;
    let p = page.select("#p")?;
    p.add_class("highlight");
    assert!(p.has_class("highlight"));
    assert_eq!(p.attr("class")?, Some("highlight".to_string()));
    Ok(())
}

#[test]
fn remove_class_clears_membership() -> Result<()> {
    let page = Page::from_html("<p id='p' class='a b'>x</p>")?;
    let p = page.select("#p")?;
    p.remove_class("a");
    assert!(!p.has_class("a"));
    assert!(p.has_class("b"));
    Ok(())
}

#[test]
fn add_class_does_not_duplicate_tokens() -> Result<()> {
    let page = Page::from_html("<p id='p' class='on'>x</p>")?;
    let p = page.select("#p")?;
    p.add_class("on");
    assert_eq!(p.attr("class")?, Some("on".to_string()));
    Ok(())
}

#[test]
fn has_class_is_true_when_any_match_carries_it() -> Result<()> {
    let page = Page::from_html("<li class='item on'>1</li><li class='item'>2</li>")?;
    assert!(page.select(".item")?.has_class("on"));
    assert!(!page.select(".item")?.has_class("off"));
    Ok(())
}

#[test]
fn toggle_class_twice_returns_to_start() -> Result<()> {
    let page = Page::from_html("<p id='p' class='keep'>x</p>")?;
    let p = page.select("#p")?;
    p.toggle_class("flip").toggle_class("flip");
    assert!(!p.has_class("flip"));
    assert!(p.has_class("keep"));
    Ok(())
}

#[test]
fn toggle_class_evaluates_each_element_independently() -> Result<()> {
    let page = Page::from_html("<li id='a' class='item on'>1</li><li id='b' class='item'>2</li>")?;
    page.select(".item")?.toggle_class("on");
    assert!(!page.select("#a")?.has_class("on"));
    assert!(page.select("#b")?.has_class("on"));
    Ok(())
}

#[test]
fn css_reads_inline_style_declarations() -> Result<()> {
    let page = Page::from_html("<div id='d' style='color: red; margin-top: 4px'>x</div>")?;
    let d = page.select("#d")?;
    assert_eq!(d.css("color")?, Some("red".to_string()));
    assert_eq!(d.css("margin-top")?, Some("4px".to_string()));
    assert_eq!(d.css("padding")?, None);
    Ok(())
}

#[test]
fn css_write_then_read_round_trips() -> Result<()> {
    let page = Page::from_html("<div id='d'>x</div>")?;
    let d = page.select("#d")?;
    d.set_css("color", "blue");
    assert_eq!(d.css("color")?, Some("blue".to_string()));
    Ok(())
}

#[test]
fn css_write_preserves_other_declarations() -> Result<()> {
    let page = Page::from_html("<div id='d' style='color: red'>x</div>")?;
    let d = page.select("#d")?;
    d.set_css("display", "none");
    assert_eq!(d.css("color")?, Some("red".to_string()));
    assert_eq!(d.css("display")?, Some("none".to_string()));
    Ok(())
}

#[test]
fn camel_case_property_maps_to_css_name() -> Result<()> {
    let page = Page::from_html("<div id='d'>x</div>")?;
    let d = page.select("#d")?;
    d.set_css("backgroundColor", "teal");
    assert_eq!(d.attr("style")?, Some("background-color: teal;".to_string()));
    assert_eq!(d.css("background-color")?, Some("teal".to_string()));
    assert_eq!(d.css("backgroundColor")?, Some("teal".to_string()));
    Ok(())
}

#[test]
fn hide_show_and_visibility_work() -> Result<()> {
    let page = Page::from_html("<div id='d'>x</div>")?;
    let d = page.select("#d")?;
    assert!(d.is_visible()?);

    d.hide();
    assert!(!d.is_visible()?);
    assert_eq!(d.css("display")?, Some("none".to_string()));

    d.show();
    assert!(d.is_visible()?);
    assert_eq!(d.css("display")?, Some("block".to_string()));
    Ok(())
}

#[test]
fn toggle_flips_visibility_exactly_once_per_call() -> Result<()> {
    let page = Page::from_html("<div id='d'>x</div>")?;
    let d = page.select("#d")?;
    d.toggle()?;
    assert!(!d.is_visible()?);
    d.toggle()?;
    assert!(d.is_visible()?);
    Ok(())
}

#[test]
fn show_after_hide_restores_block_not_prior_display() -> Result<()> {
    let page = Page::from_html("<div id='d' style='display: flex'>x</div>")?;
    let d = page.select("#d")?;
    d.hide();
    d.show();
    assert_eq!(d.css("display")?, Some("block".to_string()));
    Ok(())
}

#[test]
fn visibility_writes_apply_to_every_match() -> Result<()> {
    let page = Page::from_html("<li class='item'>1</li><li class='item'>2</li>")?;
    page.select(".item")?.hide();
    let mut visible = Vec::new();
    page.select(".item")?.each(|item| {
        visible.push(item.is_visible().unwrap_or(true));
    })?;
    assert_eq!(visible, vec![false, false]);
    Ok(())
}
