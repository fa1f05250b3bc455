mod fixture;

use agent_chat::render::FixedClock;
use agent_chat::tokens::resolve;
use agent_chat::{GfmMarkdown, MessageRenderer, Origin, OriginKind};
use chat_protocol::{file_token, widget_token, FileRef, InboundEvent};
use pretty_assertions::assert_eq;
use time::OffsetDateTime;

fn renderer() -> MessageRenderer<GfmMarkdown, FixedClock> {
    let at = OffsetDateTime::from_unix_timestamp(14 * 3600 + 30 * 60).expect("valid timestamp");
    MessageRenderer::new(GfmMarkdown, FixedClock(at))
}

#[test]
fn file_token_without_side_channel_renders_tabular_block() {
    let message =
        renderer().render_agent("Alex", "See [FILE:report.csv:Report] for details", &[], &[]);
    let html = &message.body_html;

    assert_eq!(html.matches("class=\"artifact-preview csv-artifact\"").count(), 1);
    assert!(html.contains("data-file-id=\"report.csv\""));
    assert!(html.contains("<span class=\"artifact-title\">Report</span>"));
    assert!(html.starts_with("<p>See "));
    assert!(html.contains(" for details</p>"));
    assert!(!html.contains("[FILE:"));
}

#[test]
fn unrecognized_widget_renders_generic_block() {
    let message = renderer().render_agent(
        "SupportAgent",
        "Your points: [WIDGET:loyalty_points:[\"LP-1\"]]",
        &[],
        &[],
    );
    assert!(message.body_html.contains("generic-widget"));
    assert!(message.body_html.contains("Widget type: loyalty_points"));
    assert!(!message.body_html.contains("[WIDGET:"));
}

#[test]
fn text_without_tokens_resolves_to_itself() {
    for text in ["", "plain", "[not a token]", "[FILE:missing-description]", "a *b* `c`"] {
        assert_eq!(resolve(text, &[], &[]).text(), text);
    }
}

#[test]
fn fallback_file_uses_token_groups() {
    let resolved = resolve("[FILE:q3 summary.pdf:Q3 *summary*]", &[], &[]);
    let resolution = &resolved.resolutions()[0];
    assert_eq!(resolution.origin, Origin::Fallback);
    assert_eq!(resolution.reference.id, "q3 summary.pdf");
    assert_eq!(resolution.reference.type_tag, "pdf");

    let html = resolved.convert(&GfmMarkdown);
    assert!(html.contains("<span class=\"artifact-title\">Q3 *summary*</span>"));
    assert!(!html.contains("[FILE:"));
}

#[test]
fn side_channel_description_wins() {
    let files = [FileRef {
        file_id: "bill.csv".to_string(),
        description: "November bill".to_string(),
        file_type: "csv".to_string(),
        file_path: "/tmp/bill.csv".to_string(),
    }];
    let message = renderer().render_agent("BillingAgent", "[FILE:bill.csv:bill]", &files, &[]);
    assert!(message.body_html.contains("November bill"));
    assert!(!message.body_html.contains(">bill<"));
}

#[test]
fn markdown_specials_do_not_break_restoration() {
    for text in [
        "*[FILE:a.csv:d]*",
        "**[FILE:a.csv:d]**",
        "_[FILE:a.csv:d]_",
        "> [FILE:a.csv:d]",
        "- [FILE:a.csv:d]\n- [WIDGET:addons:[]]",
        "| col |\n| --- |\n| [FILE:a.csv:d] |",
    ] {
        let message = renderer().render_agent("Alex", text, &[], &[]);
        assert!(
            message.body_html.contains("data-file-id=\"a.csv\""),
            "token lost in {text:?}: {}",
            message.body_html
        );
        assert!(!message.body_html.contains("QZSLOT"), "placeholder leaked in {text:?}");
    }
}

#[test]
fn token_inside_attribute_renders_as_plain_label() {
    let chart = file_token("a.png", "Chart");
    let text = format!("![usage {chart}](https://x.test/i.png)");
    let message = renderer().render_agent("Alex", &text, &[], &[]);
    let html = &message.body_html;
    assert!(html.contains("alt=\"usage Chart\""), "{html}");
    assert!(!html.contains("artifact-preview"));
    assert!(!html.contains("QZSLOT"));

    let csv = file_token("a.csv", "d");
    let text = format!("[open](https://x.test/{csv})");
    let message = renderer().render_agent("Alex", &text, &[], &[]);
    let html = &message.body_html;
    assert!(html.contains("href=\"https://x.test/d\""), "{html}");
    assert!(html.contains(">open</a>"));
    assert!(!html.contains("<div"));
}

#[test]
fn token_on_its_own_line_is_not_wrapped_in_paragraph() {
    let text = format!(
        "Here is your plan:\n\n{}\n\nAnd the chart:\n\n{}",
        widget_token("current_plan", &["PLAN-1"]),
        file_token("usage.png", "Usage")
    );
    let message = renderer().render_agent("PlanAgent", &text, &[], &[]);
    let html = &message.body_html;
    assert!(html.contains("<p>Here is your plan:</p>"));
    assert!(html.contains("<p>And the chart:</p>"));
    assert!(!html.contains("<p><div"), "{html}");
    assert!(!html.contains("</div></p>"), "{html}");
    assert!(html.contains("image-artifact"));
}

#[test]
fn fixture_frame_renders_side_channel_and_fallback_artifacts() {
    let event = InboundEvent::parse(&fixture::read_fixture("agent_message_plan.json"))
        .expect("fixture decodes");
    let InboundEvent::AgentMessage {
        agent,
        content,
        files,
        widgets,
    } = event
    else {
        panic!("fixture is an agent message");
    };

    let resolved = resolve(&content, &files, &widgets);
    let origins: Vec<Origin> = resolved.resolutions().iter().map(|r| r.origin).collect();
    assert_eq!(
        origins,
        vec![Origin::SideChannel, Origin::SideChannel, Origin::SideChannel, Origin::Fallback]
    );

    let message = renderer().render(OriginKind::Agent, &agent, &content, &files, &widgets);
    let html = &message.body_html;
    assert!(html.contains("Contoso Ultimate Entertainment"));
    assert!(html.contains("£45.00/month"));
    assert!(html.contains("USA Roaming Pass - 7 Days"));
    assert!(html.contains("12-month usage history"));
    assert!(html.contains("image-artifact"));
    assert!(html.contains("<strong>cheapest</strong>"));
    assert!(!html.contains("[WIDGET:"));
    assert!(!html.contains("[FILE:"));
    assert_eq!(message.timestamp.as_deref(), Some("14:30"));
    assert_eq!(message.completes_agent(), Some("PlanAgent"));
}
