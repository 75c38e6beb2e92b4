use super::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn when_receives_dispatched_clicks() -> Result<()> {
    let page = Page::from_html("<button id='go'>go</button>")?;
    let clicks = Rc::new(Cell::new(0usize));

    let seen = Rc::clone(&clicks);
    page.select("#go")?.when("click", move |_| {
        seen.set(seen.get() + 1);
    });

    page.click("#go")?;
    page.click("#go")?;
    assert_eq!(clicks.get(), 2);
    Ok(())
}

#[test]
fn listeners_are_scoped_to_their_event_type() -> Result<()> {
    let page = Page::from_html("<input id='field'>")?;
    let fired = Rc::new(Cell::new(0usize));

    let seen = Rc::clone(&fired);
    page.select("#field")?.when("change", move |_| {
        seen.set(seen.get() + 1);
    });

    page.click("#field")?;
    assert_eq!(fired.get(), 0);
    page.dispatch("#field", "change")?;
    assert_eq!(fired.get(), 1);
    Ok(())
}

#[test]
fn events_bubble_from_target_to_ancestors() -> Result<()> {
    let page = Page::from_html("<div id='outer'><button id='inner'>x</button></div>")?;
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&order);
    page.select("#inner")?.when("click", move |_| {
        log.borrow_mut().push("inner");
    });
    let log = Rc::clone(&order);
    page.select("#outer")?.when("click", move |_| {
        log.borrow_mut().push("outer");
    });

    page.click("#inner")?;
    assert_eq!(*order.borrow(), vec!["inner", "outer"]);
    Ok(())
}

#[test]
fn capture_listeners_run_before_bubble_listeners() -> Result<()> {
    let page = Page::from_html("<div id='outer'><button id='inner'>x</button></div>")?;
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&order);
    page.select("#outer")?.when("click", move |_| {
        log.borrow_mut().push("outer-bubble");
    });
    let log = Rc::clone(&order);
    page.select("#outer")?.when_capture("click", move |_| {
        log.borrow_mut().push("outer-capture");
    });
    let log = Rc::clone(&order);
    page.select("#inner")?.when("click", move |_| {
        log.borrow_mut().push("inner");
    });

    page.click("#inner")?;
    assert_eq!(
        *order.borrow(),
        vec!["outer-capture", "inner", "outer-bubble"]
    );
    Ok(())
}

#[test]
fn stop_propagation_halts_bubbling() -> Result<()> {
    let page = Page::from_html("<div id='outer'><button id='inner'>x</button></div>")?;
    let outer_fired = Rc::new(Cell::new(false));

    page.select("#inner")?.when("click", |event| {
        event.stop_propagation();
    });
    let seen = Rc::clone(&outer_fired);
    page.select("#outer")?.when("click", move |_| {
        seen.set(true);
    });

    page.click("#inner")?;
    assert!(!outer_fired.get());
    Ok(())
}

#[test]
fn stop_immediate_propagation_skips_remaining_listeners() -> Result<()> {
    let page = Page::from_html("<button id='go'>x</button>")?;
    let later_fired = Rc::new(Cell::new(false));

    page.select("#go")?.when("click", |event| {
        event.stop_immediate_propagation();
    });
    let seen = Rc::clone(&later_fired);
    page.select("#go")?.when("click", move |_| {
        seen.set(true);
    });

    page.click("#go")?;
    assert!(!later_fired.get());
    Ok(())
}

#[test]
fn event_exposes_target_and_current_target() -> Result<()> {
    let page = Page::from_html("<div id='outer'><button id='inner'>x</button></div>")?;
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&seen);
    page.select("#outer")?.when("click", move |event| {
        let target = event
            .target()
            .ok()
            .and_then(|t| t.attr("id").ok().flatten())
            .unwrap_or_default();
        let current = event
            .current_target()
            .ok()
            .and_then(|t| t.attr("id").ok().flatten())
            .unwrap_or_default();
        log.borrow_mut().push((target, current));
    });

    page.click("#inner")?;
    assert_eq!(
        *seen.borrow(),
        vec![("inner".to_string(), "outer".to_string())]
    );
    Ok(())
}

#[test]
fn default_prevented_is_reported_on_the_returned_event() -> Result<()> {
    let page = Page::from_html("<a id='link' href='/x'>x</a>")?;
    page.select("#link")?.when("click", |event| {
        event.prevent_default();
    });
    let event = page.click("#link")?;
    assert!(event.default_prevented());
    Ok(())
}

#[test]
fn selection_dispatch_reaches_every_match() -> Result<()> {
    let page = Page::from_html("<li class='item'>1</li><li class='item'>2</li>")?;
    let count = Rc::new(Cell::new(0usize));

    let seen = Rc::clone(&count);
    page.select(".item")?.when("refresh", move |_| {
        seen.set(seen.get() + 1);
    });
    page.select(".item")?.dispatch("refresh");
    assert_eq!(count.get(), 2);
    Ok(())
}

#[test]
fn click_on_missing_selector_reports_no_match() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    assert!(matches!(page.click("#missing"), Err(Error::NoMatch(_))));
    Ok(())
}

#[test]
fn ready_runs_immediately_on_a_loaded_page() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    let ran = Rc::new(Cell::new(false));
    let seen = Rc::clone(&ran);
    page.ready(move |_| {
        seen.set(true);
    });
    assert!(ran.get());
    Ok(())
}

#[test]
fn ready_queues_until_the_document_loads() -> Result<()> {
    let page = Page::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&order);
    page.ready(move |_| {
        log.borrow_mut().push("first");
    });
    let log = Rc::clone(&order);
    page.ready(move |_| {
        log.borrow_mut().push("second");
    });
    assert!(order.borrow().is_empty());
    assert!(!page.is_loaded());

    page.load_html("<p>x</p>")?;
    assert!(page.is_loaded());
    assert_eq!(*order.borrow(), vec!["first", "second"]);
    Ok(())
}

#[test]
fn ready_callback_sees_the_loaded_document() -> Result<()> {
    let page = Page::new();
    let found = Rc::new(Cell::new(false));

    let seen = Rc::clone(&found);
    page.ready(move |page| {
        seen.set(page.select("#late").map(|s| s.exists()).unwrap_or(false));
    });
    page.load_html("<p id='late'>x</p>")?;
    assert!(found.get());
    Ok(())
}

#[test]
fn trace_logs_capture_event_dispatch() -> Result<()> {
    let page = Page::from_html("<button id='go'>x</button>")?;
    page.enable_trace(true);
    page.set_trace_stderr(false);

    page.click("#go")?;
    let logs = page.take_trace_logs();
    assert!(!logs.is_empty());
    assert!(logs.iter().any(|line| line.contains("[event] click")));
    assert!(logs.iter().any(|line| line.contains("button#go")));
    Ok(())
}

#[test]
fn trace_log_limit_caps_the_buffer() -> Result<()> {
    let page = Page::from_html("<button id='go'>x</button>")?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_log_limit(2);

    for _ in 0..5 {
        page.click("#go")?;
    }
    assert_eq!(page.take_trace_logs().len(), 2);
    Ok(())
}
