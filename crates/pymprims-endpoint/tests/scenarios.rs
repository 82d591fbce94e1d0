use std::cell::RefCell;
use std::rc::Rc;

use pymprims_endpoint::{
    Child, ChildConfig, Direction, Dispatch, Harness, HarnessConfig, InstanceRegistry, Parent,
    ParentConfig,
};
use pymprims_host::{FrameState, HostEvent, InboundMessage, MemoryFrame, MemoryPage, ParentHost};
use pymprims_wire::SizeValue;

fn recording_child(config: ChildConfig) -> (ChildConfig, Rc<RefCell<Vec<SizeValue>>>) {
    let renders = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&renders);
    let config = config.with_render_callback(move |width| sink.borrow_mut().push(width));
    (config, renders)
}

#[test]
fn resize_round_trip_sets_frame_height() {
    let harness = Harness::new(HarnessConfig::default()).expect("harness should boot");

    assert!(harness.parent.frame_src().contains("initialWidth=800"));
    assert_eq!(harness.child.initial_width(), SizeValue::from(800));
    assert_eq!(
        harness.page.frame_attribute("graphic", "height").as_deref(),
        Some("400px")
    );
}

#[test]
fn container_resize_reaches_child_and_height_comes_back() {
    let (child, renders) = recording_child(ChildConfig::default());
    let mut harness = Harness::new(HarnessConfig {
        child,
        ..HarnessConfig::default()
    })
    .expect("harness should boot");

    harness.frame.set_body_height(720);
    harness.resize(400.0);

    assert_eq!(
        *renders.borrow(),
        [SizeValue::from(800), SizeValue::from(400)]
    );
    assert_eq!(
        harness.page.frame_attribute("graphic", "height").as_deref(),
        Some("720px")
    );
    let widths = harness.exchanges_of("width");
    assert_eq!(widths.len(), 1);
    assert_eq!(widths[0].direction, Direction::ToChild);
    assert_eq!(widths[0].payload, "400");
}

#[test]
fn scroll_to_child_position() {
    let mut harness = Harness::new(HarnessConfig {
        container_top: 150.0,
        ..HarnessConfig::default()
    })
    .expect("harness should boot");

    harness.child.scroll_parent_to_child_pos(50.0);
    harness.pump();

    assert_eq!(harness.page.scrolls(), [(0.0, 200.0)]);
}

#[test]
fn scroll_to_child_element_accounts_for_both_offsets() {
    let mut harness = Harness::new(HarnessConfig {
        container_top: 1000.0,
        ..HarnessConfig::default()
    })
    .expect("harness should boot");
    harness.page.set_scroll_y(400.0);
    harness.frame.add_element("footnote", 250.0);

    harness
        .child
        .scroll_parent_to_child_el("footnote")
        .expect("element should exist");
    harness.pump();

    assert_eq!(harness.page.scrolls(), [(0.0, 1250.0)]);
}

#[test]
fn throttled_scroll_reporting() {
    let mut harness = Harness::new(HarnessConfig {
        parent: ParentConfig {
            track_scroll: Some(true),
            scroll_wait: Some(100),
            ..ParentConfig::default()
        },
        ..HarnessConfig::default()
    })
    .expect("harness should boot");

    for step in 1..=5 {
        harness.scroll(f64::from(step) * 20.0);
        harness.advance(10);
    }
    harness.advance(500);

    let reports = harness.exchanges_of("viewport-iframe-position");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].at_ms, 0);
    assert_eq!(reports[1].at_ms, 100);
    assert!(reports[1].payload.starts_with("1024 768 -100 "));
}

#[test]
fn orphaned_child_is_removed_and_swept() {
    let page = MemoryPage::default();
    page.add_element("first", 0.0, 0.0, 600.0);
    page.add_element("second", 800.0, 0.0, 600.0);
    let registry = InstanceRegistry::new();
    let first = registry
        .create(page.clone(), "first", "child.html", ParentConfig::default())
        .expect("first parent should mount");
    registry
        .create(page.clone(), "second", "child.html", ParentConfig::default())
        .expect("second parent should mount");

    page.remove_frame_externally("first");
    first
        .borrow_mut()
        .send_message("custom", "ping")
        .expect("send should not fail");

    assert!(first.borrow().is_removed());
    assert!(page.posted().is_empty());
    assert_eq!(registry.container_ids(), ["second"]);
    assert_eq!(registry.sweep(), 0);
}

#[test]
fn repeated_width_renders_once() {
    let (child, renders) = recording_child(ChildConfig::default());
    let mut harness = Harness::new(HarnessConfig {
        child,
        ..HarnessConfig::default()
    })
    .expect("harness should boot");

    harness.page.set_element_width("graphic", 640.0);
    harness.parent.send_width().expect("container exists");
    harness.parent.send_width().expect("container exists");
    harness.pump();

    assert_eq!(
        *renders.borrow(),
        [SizeValue::from(800), SizeValue::from(640)]
    );
    assert_eq!(harness.exchanges_of("height").len(), 2);

    harness.page.set_element_width("graphic", 320.0);
    harness.parent.send_width().expect("container exists");
    harness.pump();
    assert_eq!(renders.borrow().len(), 3);
    assert_eq!(harness.exchanges_of("height").len(), 3);
}

#[test]
fn position_info_round_trip() {
    let mut harness = Harness::new(HarnessConfig {
        container_top: 300.0,
        ..HarnessConfig::default()
    })
    .expect("harness should boot");
    let replies = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&replies);
    harness
        .child
        .on_message("viewport-iframe-position", move |_, payload| {
            sink.borrow_mut().push(payload.to_string());
        });

    harness.child.get_parent_position_info();
    harness.pump();

    assert_eq!(*replies.borrow(), ["1024 768 300 0 700 800"]);
}

#[test]
fn polling_keeps_height_current() {
    let mut harness = Harness::new(HarnessConfig {
        child: ChildConfig {
            polling: Some(250),
            ..ChildConfig::default()
        },
        ..HarnessConfig::default()
    })
    .expect("harness should boot");

    harness.frame.set_body_height(900);
    harness.advance(250);
    assert_eq!(
        harness.page.frame_attribute("graphic", "height").as_deref(),
        Some("900px")
    );

    harness.child.remove();
    harness.frame.set_body_height(50);
    harness.advance(1000);
    assert_eq!(
        harness.page.frame_attribute("graphic", "height").as_deref(),
        Some("900px")
    );
}

#[test]
fn channels_on_one_page_do_not_cross_talk() {
    let page = MemoryPage::default();
    page.add_element("left", 0.0, 0.0, 400.0);
    page.add_element("right", 0.0, 400.0, 300.0);
    let mut left = Parent::new(page.clone(), "left", "a.html", ParentConfig::default())
        .expect("left parent should mount");
    let mut right = Parent::new(page.clone(), "right", "b.html", ParentConfig::default())
        .expect("right parent should mount");

    let left_frame = MemoryFrame::from_src(left.frame_src());
    left_frame.set_body_height(111);
    let _left_child = Child::new(left_frame.clone(), ChildConfig::default())
        .expect("left child should boot");

    // The browser hands every message to every listener on the page.
    for posted in left_frame.take_posted() {
        let event = HostEvent::Message(InboundMessage::text("https://c.example", posted.message));
        left.handle_event(&event);
        right.handle_event(&event);
    }

    assert_eq!(page.frame_attribute("left", "height").as_deref(), Some("111px"));
    assert_eq!(page.frame_attribute("right", "height"), None);
    assert_eq!(page.frame_state("right"), FrameState::Live);
}

#[test]
fn child_navigation_request_is_validated_by_parent() {
    let mut harness = Harness::new(HarnessConfig::default()).expect("harness should boot");

    harness.child.navigate_parent_to("javascript:alert(document.cookie)");
    harness.child.scroll_parent_to("methodology");
    harness.pump();

    assert_eq!(harness.page.navigations(), ["#methodology"]);
}
