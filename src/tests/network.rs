use super::*;
use serde_json::json;

#[test]
fn fetch_json_resolves_the_decoded_body() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.route("GET", "/x", MockResponse::ok(r#"{"k":1}"#))?;

    let value = page.fetch_json("/x", &RequestOptions::default()).resolve()?;
    assert_eq!(value, json!({"k": 1}));
    Ok(())
}

#[test]
fn fetch_text_resolves_the_body_text() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.route("GET", "/greeting", MockResponse::ok("hello world"))?;

    let text = page
        .fetch_text("/greeting", &RequestOptions::default())
        .resolve()?;
    assert_eq!(text, "hello world");
    Ok(())
}

#[test]
fn http_error_status_is_a_failed_result() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.route("GET", "/x", MockResponse::with_status(500, "boom"))?;

    // The call itself never fails; the failure surfaces at resolve time.
    let pending = page.fetch_json("/x", &RequestOptions::default());
    assert!(matches!(
        pending.resolve(),
        Err(Error::HttpStatus { status: 500, .. })
    ));
    Ok(())
}

#[test]
fn transport_failure_is_a_failed_result() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.route_error("GET", "/x", "connection reset")?;

    let outcome = page.fetch_text("/x", &RequestOptions::default()).resolve();
    match outcome {
        Err(Error::FetchFailed { detail, .. }) => assert_eq!(detail, "connection reset"),
        other => panic!("expected transport failure, got {other:?}"),
    }
    Ok(())
}

#[test]
fn undecodable_json_body_is_a_failed_result() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.route("GET", "/x", MockResponse::ok("not json"))?;

    assert!(matches!(
        page.fetch_json("/x", &RequestOptions::default()).resolve(),
        Err(Error::JsonDecode { .. })
    ));
    Ok(())
}

#[test]
fn unrouted_request_fails_at_resolve_time() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    let outcome = page.fetch_text("/nowhere", &RequestOptions::default()).resolve();
    match outcome {
        Err(Error::FetchFailed { detail, .. }) => {
            assert!(detail.contains("no route"), "unexpected detail: {detail}");
        }
        other => panic!("expected a failed result, got {other:?}"),
    }
    Ok(())
}

#[test]
fn relative_and_absolute_urls_reach_the_same_route() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.route("GET", "/data", MockResponse::ok("d"))?;

    let via_relative = page.fetch_text("/data", &RequestOptions::default()).resolve()?;
    let via_absolute = page
        .fetch_text("https://page.local/data", &RequestOptions::default())
        .resolve()?;
    assert_eq!(via_relative, "d");
    assert_eq!(via_absolute, "d");
    Ok(())
}

#[test]
fn base_url_controls_relative_resolution() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.set_base_url("https://app.local/section/")?;
    page.route("GET", "https://app.local/section/data", MockResponse::ok("d"))?;

    let text = page.fetch_text("data", &RequestOptions::default()).resolve()?;
    assert_eq!(text, "d");
    Ok(())
}

#[test]
fn latest_registered_route_wins() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.route("GET", "/x", MockResponse::ok("old"))?;
    page.route("GET", "/x", MockResponse::ok("new"))?;

    let text = page.fetch_text("/x", &RequestOptions::default()).resolve()?;
    assert_eq!(text, "new");
    Ok(())
}

#[test]
fn routes_distinguish_methods() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.route("POST", "/submit", MockResponse::ok("accepted"))?;

    let get = page.fetch_text("/submit", &RequestOptions::default()).resolve();
    assert!(matches!(get, Err(Error::FetchFailed { .. })));

    let post = page
        .fetch_text("/submit", &RequestOptions::method("post"))
        .resolve()?;
    assert_eq!(post, "accepted");
    Ok(())
}

#[test]
fn requests_settle_in_fifo_order_on_flush() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.route("GET", "/first", MockResponse::ok("1"))?;
    page.route("GET", "/second", MockResponse::ok("2"))?;

    let first = page.fetch_text("/first", &RequestOptions::default());
    let second = page.fetch_text("/second", &RequestOptions::default());
    page.flush()?;

    let logs = page.take_trace_logs();
    let first_pos = logs.iter().position(|l| l.contains("/first"));
    let second_pos = logs.iter().position(|l| l.contains("/second"));
    assert!(first_pos.is_some() && second_pos.is_some(), "missing fetch traces: {logs:?}");
    assert!(first_pos < second_pos, "settled out of order: {logs:?}");

    assert_eq!(first.resolve()?, "1");
    assert_eq!(second.resolve()?, "2");
    Ok(())
}

#[test]
fn fetch_helpers_are_reachable_from_a_selection() -> Result<()> {
    let page = Page::from_html("<p id='p'>x</p>")?;
    page.route("GET", "/x", MockResponse::ok("body"))?;

    let text = page
        .select("#p")?
        .fetch_text("/x", &RequestOptions::default())
        .resolve()?;
    assert_eq!(text, "body");
    Ok(())
}

#[test]
fn unresolvable_url_fails_at_resolve_not_enqueue() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    page.set_base_url("data:text/plain,hi")?;

    // Enqueue succeeds; the resolution failure is deferred to the outcome.
    let pending = page.fetch_text("/x", &RequestOptions::default());
    assert!(matches!(pending.resolve(), Err(Error::FetchFailed { .. })));
    Ok(())
}

#[test]
fn set_base_url_rejects_garbage() -> Result<()> {
    let page = Page::from_html("<p>x</p>")?;
    assert!(matches!(
        page.set_base_url("not a url"),
        Err(Error::InvalidUrl(_))
    ));
    Ok(())
}
